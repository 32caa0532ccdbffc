use reqwest::{Client, RequestBuilder, StatusCode};
use url::Url;

use crate::auth::Token;
use crate::error::{Result, SweepError};

const USER_AGENT: &str = concat!("sonarsweep/", env!("CARGO_PKG_VERSION"));

/// Status and body of a completed exchange, whatever the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Builds the shared client. No timeout or retry is configured; a single
/// attempt is final.
pub fn build_client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| SweepError::Config(format!("Failed to create HTTP client: {e}")))
}

/// Parses `base_url` and appends `segments` to its path.
///
/// Keeps any context path on the base (`https://host/bitbucket`) and
/// percent-encodes each segment.
pub fn endpoint(base_url: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(base_url)?;

    url.path_segments_mut()
        .map_err(|()| SweepError::Config(format!("Base URL cannot carry a path: {base_url}")))?
        .pop_if_empty()
        .extend(segments);

    Ok(url)
}

/// Sends `request` with bearer auth and reads the whole body.
pub async fn send(request: RequestBuilder, token: &Token) -> Result<HttpResponse> {
    let response = request.bearer_auth(token.as_str()).send().await?;

    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read response body".to_string());

    Ok(HttpResponse { status, body })
}

/// Base URL of a local port that was just released, so nothing listens on it.
#[cfg(test)]
pub fn closed_local_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local address");
    drop(listener);
    format!("http://{addr}")
}
