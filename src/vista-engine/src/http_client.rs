//! Shared HTTP client construction.
//!
//! All clients carry a `vista/{version}` User-Agent and `tcp_nodelay`.

use std::time::Duration;

use reqwest::Client;

use crate::error::{Result, VistaError};

/// User-Agent sent with every request.
pub const USER_AGENT: &str = concat!("vista/", env!("CARGO_PKG_VERSION"));

/// Connection establishment timeout.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Overall timeout for streaming completions. Chunk inactivity is handled separately.
pub const STREAMING_TIMEOUT: Duration = Duration::from_secs(300);

/// Overall timeout for plain downloads (tool inputs).
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Creates a client suitable for long-lived SSE responses.
pub fn create_streaming_client() -> Result<Client> {
    create_client_with_timeout(STREAMING_TIMEOUT)
}

/// Creates a client for short downloads.
pub fn create_download_client() -> Result<Client> {
    create_client_with_timeout(DOWNLOAD_TIMEOUT)
}

/// Creates a client with a custom overall timeout.
pub fn create_client_with_timeout(timeout: Duration) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(timeout)
        .tcp_nodelay(true)
        .build()
        .map_err(|e| VistaError::internal(format!("Failed to build HTTP client: {e}")))
}
