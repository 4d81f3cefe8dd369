use crate::config::SmsConfig;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Delivery channel for one-time passwords.
#[async_trait]
pub trait OtpSender: Send + Sync {
    async fn send_otp(&self, phone: &str, code: &str) -> AppResult<()>;
}

#[derive(Debug, Serialize)]
pub struct SendSmsRequest<'a> {
    pub receptor: &'a str,
    pub sender: &'a str,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct SendSmsResponse {
    pub status: Option<String>,
    pub message_id: Option<String>,
}

/// HTTP SMS gateway client.
#[derive(Clone)]
pub struct SmsService {
    client: Client,
    config: SmsConfig,
}

impl SmsService {
    pub fn new(config: SmsConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn render(&self, code: &str) -> String {
        self.config.template.replace("{code}", code)
    }
}

#[async_trait]
impl OtpSender for SmsService {
    async fn send_otp(&self, phone: &str, code: &str) -> AppResult<()> {
        let body = SendSmsRequest {
            receptor: phone,
            sender: &self.config.sender,
            message: self.render(code),
        };

        let response = self
            .client
            .post(&self.config.base_url)
            .header("apikey", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("SMS gateway unreachable: {e}")))?;

        if response.status().is_success() {
            let parsed = response.json::<SendSmsResponse>().await.ok();
            log::info!(
                "OTP SMS sent to {phone} (message id: {})",
                parsed
                    .and_then(|r| r.message_id.or(r.status))
                    .unwrap_or_else(|| "-".to_string())
            );
            Ok(())
        } else {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            log::error!("OTP SMS to {phone} failed with {status}: {error_text}");
            Err(AppError::ExternalApiError(format!(
                "SMS sending failed: {status} {error_text}"
            )))
        }
    }
}
