use crate::error::{AppError, AppResult};
use actix_web::HttpRequest;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Fixed-window counter per caller key (usually the client address).
#[derive(Clone)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    trust_forwarded: bool,
    windows: Arc<Mutex<HashMap<String, (Instant, u32)>>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window_seconds: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_seconds),
            trust_forwarded: false,
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Honour `Forwarded`/`X-Forwarded-For` only behind a trusted reverse proxy.
    pub fn trust_forwarded(mut self, trust: bool) -> Self {
        self.trust_forwarded = trust;
        self
    }

    /// Key identifying the caller: the socket peer address, or the forwarded
    /// client address when the proxy is trusted.
    pub fn client_key(&self, req: &HttpRequest) -> String {
        if self.trust_forwarded {
            if let Some(addr) = req.connection_info().realip_remote_addr() {
                return addr.to_string();
            }
        }
        req.peer_addr()
            .map(|addr| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }

    pub async fn check(&self, key: &str) -> AppResult<()> {
        self.check_at(key, Instant::now()).await
    }

    async fn check_at(&self, key: &str, now: Instant) -> AppResult<()> {
        let mut windows = self.windows.lock().await;

        // prune stale windows
        if windows.len() > 10_000 {
            let window = self.window;
            windows.retain(|_, (started, _)| now.duration_since(*started) < window);
        }

        let entry = windows.entry(key.to_string()).or_insert((now, 0));
        if now.duration_since(entry.0) >= self.window {
            *entry = (now, 0);
        }

        if entry.1 >= self.max_requests {
            log::warn!("Rate limit exceeded for {key}");
            return Err(AppError::RateLimited);
        }
        entry.1 += 1;
        Ok(())
    }
}
