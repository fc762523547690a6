use reqwest::Client;
use std::time::Duration;
use tracing::warn;

pub struct HttpClientFactory;

impl HttpClientFactory {
    /// Creates the client used for gateway pushes.
    ///
    /// No retry middleware: a push is attempted exactly once and any failure
    /// is handed back to the caller.
    pub fn create_client(timeout: Duration, connect_timeout: Duration) -> Client {
        Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to build configured HTTP client, using defaults: {}", e);
                Client::new()
            })
    }
}
