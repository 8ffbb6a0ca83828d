use farefinder_core::GatewayError;
use reqwest::Response;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub(crate) fn transport(err: reqwest::Error) -> GatewayError {
    GatewayError::Transport(err.to_string())
}

/// Maps a non-2xx response to `GatewayError::Status`, keeping the body's
/// `message` when the body is JSON and has one.
pub(crate) async fn status_error(response: Response) -> GatewayError {
    let status = response.status().as_u16();
    let message = response
        .json::<Value>()
        .await
        .ok()
        .and_then(|body| body.get("message").and_then(Value::as_str).map(str::to_string));
    tracing::debug!("Upstream returned {} ({:?})", status, message);
    GatewayError::Status { status, message }
}

pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
    if !response.status().is_success() {
        return Err(status_error(response).await);
    }
    response.json::<T>().await.map_err(|e| GatewayError::Decode(e.to_string()))
}

/// For calls whose response body is irrelevant.
pub(crate) async fn expect_success(response: Response) -> Result<(), GatewayError> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(status_error(response).await)
    }
}
