//! Recurring background jobs. Call `spawn_all` once during startup.

use crate::services::AuthService;
use std::time::Duration;

const PURGE_INTERVAL: Duration = Duration::from_secs(3600);

/// Detaches every background task via `tokio::spawn`; does not block.
pub fn spawn_all(auth_service: AuthService) {
    // expired OTP codes and blacklisted refresh tokens, hourly
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PURGE_INTERVAL);
        loop {
            interval.tick().await;
            match auth_service.purge_expired().await {
                Ok((otps, tokens)) if otps + tokens > 0 => {
                    log::info!("Purged {otps} expired OTP codes and {tokens} blacklisted tokens")
                }
                Ok(_) => {}
                Err(e) => log::error!("Failed to purge expired auth records: {e:?}"),
            }
        }
    });
}
