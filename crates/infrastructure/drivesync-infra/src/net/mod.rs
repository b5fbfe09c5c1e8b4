use std::time::Duration;

use reqwest::Client;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// HTTP client shared by every remote call. `request_timeout` bounds each
/// request end to end; hitting it surfaces as a retryable `RemoteError::Timeout`.
pub fn default_http_client(request_timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(concat!("drivesync/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(CONNECT_TIMEOUT.min(request_timeout))
        .timeout(request_timeout)
        .build()
}

/// Delay before retry number `attempt` (1-based): 500ms doubling, capped at 8s.
pub fn backoff(attempt: u32) -> Duration {
    let base = Duration::from_millis(500);
    let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
    std::cmp::min(base.saturating_mul(factor), Duration::from_secs(8))
}
