//! Response helpers shared by the session and the screens.

use std::future::Future;

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::error::{ClientError, ClientResult, extract_detail};

/// Run `fut` unless `cancel` fires first, in which case its result is dropped.
pub(crate) async fn cancellable<F, T>(cancel: Option<&CancellationToken>, fut: F) -> ClientResult<T>
where
    F: Future<Output = ClientResult<T>>,
{
    match cancel {
        Some(token) => {
            tokio::select! {
                biased;
                _ = token.cancelled() => Err(ClientError::Cancelled),
                result = fut => result,
            }
        }
        None => fut.await,
    }
}

/// Turn a non-2xx response into [`ClientError::Api`], keeping the backend's
/// `detail` when it sent one.
pub(crate) async fn ensure_success(resp: Response) -> ClientResult<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    let detail = extract_detail(&body).unwrap_or_else(|| fallback_detail(status));
    Err(ClientError::Api {
        status: status.as_u16(),
        detail,
    })
}

pub(crate) async fn read_json<T: DeserializeOwned>(resp: Response) -> ClientResult<T> {
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
}

fn fallback_detail(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("request failed: {} {reason}", status.as_u16()),
        None => format!("request failed with status {}", status.as_u16()),
    }
}
