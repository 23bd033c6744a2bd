//! Shared HTTP client construction.

use std::time::Duration;

use reqwest::blocking::Client;

const USER_AGENT: &str = concat!("lekompo/", env!("CARGO_PKG_VERSION"));

/// Build a blocking client. `None` disables the request timeout entirely
/// (reqwest's blocking client otherwise defaults to 30 seconds).
pub fn build_client(timeout: Option<Duration>) -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
}

/// Join a project base URL and an absolute API path without doubling slashes.
pub fn endpoint(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
