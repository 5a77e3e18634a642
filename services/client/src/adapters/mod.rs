pub mod identity;
pub mod veritas_api;

pub use identity::IdentityToolkitAdapter;
pub use veritas_api::VeritasApiAdapter;

use std::time::Duration;

/// Builds the shared HTTP client. `timeout` bounds both connecting and waiting
/// for the complete response.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .connect_timeout(timeout)
        .timeout(timeout)
        .build()
}

/// Describes a `reqwest` failure for the `PortError::Transport` variant.
pub(crate) fn describe_transport(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("request timed out: {err}")
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else if err.is_decode() {
        format!("malformed response body: {err}")
    } else {
        err.to_string()
    }
}
