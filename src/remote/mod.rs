//! Remote store access: HTTP client for the user list and a cancellable
//! background fetch whose result is polled from the UI loop.

use std::time::Duration;

use reqwest::Client;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::FetchError;
use crate::model::UserRecord;

/// Endpoint used when neither settings nor CLI name one.
pub const DEFAULT_ENDPOINT: &str = "https://jsonplaceholder.typicode.com/users";

/// Lifecycle of the user-list fetch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed { message: Option<String> },
}

impl FetchStatus {
    /// Text shown in the error alert; `None` unless the fetch failed.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            FetchStatus::Failed { message } => Some(message.as_deref().unwrap_or("Unknown error")),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FetchStatus::Idle => "idle",
            FetchStatus::Loading => "loading",
            FetchStatus::Succeeded => "succeeded",
            FetchStatus::Failed { .. } => "failed",
        }
    }
}

/// HTTP client for the remote user list.
#[derive(Clone, Debug)]
pub struct UsersClient {
    http: Client,
    url: String,
}

impl UsersClient {
    /// Build a client for `url`.
    ///
    /// # Arguments
    ///
    /// * `url` - Endpoint returning a JSON array of users. Surrounding
    ///   whitespace is dropped.
    /// * `timeout` - Whole-request timeout.
    ///
    /// # Returns
    ///
    /// The client, or [`FetchError::InvalidUrl`] when the URL is empty or not
    /// http/https.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let url = url.into().trim().to_string();
        if url.is_empty() {
            return Err(FetchError::InvalidUrl("URL cannot be empty".into()));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(FetchError::InvalidUrl(format!(
                "{url} (must start with http:// or https://)"
            )));
        }
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(format!("usertable/{}", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// GET the endpoint and decode the full record list.
    pub async fn fetch_users(&self) -> Result<Vec<UserRecord>, FetchError> {
        debug!(url = %self.url, "fetching users");
        let response = self.http.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(url = %self.url, status = status.as_u16(), "user fetch rejected");
            return Err(FetchError::Status {
                status: status.as_u16(),
                message: if message.trim().is_empty() {
                    status.canonical_reason().unwrap_or("no body").to_string()
                } else {
                    message.trim().to_string()
                },
            });
        }
        let body = response.bytes().await?;
        let users: Vec<UserRecord> =
            serde_json::from_slice(&body).map_err(|e| FetchError::Parse(e.to_string()))?;
        info!(url = %self.url, count = users.len(), "users fetched");
        Ok(users)
    }
}

/// A fetch running on the tokio runtime.
///
/// Dropping the handle cancels the task, so a view that goes away (or a
/// reload that replaces the handle) never receives a stale result.
#[derive(Debug)]
pub struct FetchHandle {
    token: CancellationToken,
    rx: oneshot::Receiver<Result<Vec<UserRecord>, FetchError>>,
}

impl FetchHandle {
    pub fn spawn(client: UsersClient, runtime: &Handle) -> Self {
        let token = CancellationToken::new();
        let (tx, rx) = oneshot::channel();
        let task_token = token.clone();
        runtime.spawn(async move {
            let result = tokio::select! {
                _ = task_token.cancelled() => {
                    debug!(url = %client.url(), "fetch cancelled before completion");
                    Err(FetchError::Cancelled)
                }
                res = client.fetch_users() => res,
            };
            // receiver gone means nobody is interested any more
            let _ = tx.send(result);
        });
        Self { token, rx }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Non-blocking poll: `None` while the request is still in flight.
    pub fn try_take(&mut self) -> Option<Result<Vec<UserRecord>, FetchError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(FetchError::Cancelled)),
        }
    }
}

impl Drop for FetchHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_without_message_reads_unknown_error() {
        let status = FetchStatus::Failed { message: None };
        assert_eq!(status.error_message(), Some("Unknown error"));
        assert_eq!(FetchStatus::Loading.error_message(), None);
    }

    #[test]
    fn rejects_non_http_urls() {
        let err = UsersClient::new("ftp://example.com/users", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_)));
        let err = UsersClient::new("   ", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_)));
    }

    #[test]
    fn accepts_default_endpoint() {
        let client = UsersClient::new(DEFAULT_ENDPOINT, Duration::from_secs(5)).unwrap();
        assert_eq!(client.url(), DEFAULT_ENDPOINT);
    }
}
