use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use shared::{
    domain::{Case, Metrics},
    protocol::{BackendStatus, DecisionSubmission, OperationAck},
};
use thiserror::Error;

/// A single-attempt failure from the backend. The gateway never retries and
/// never catches; callers decide how to surface these.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request never produced a response (connect failure, refused
    /// connection, broken stream).
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
    /// The server answered with a non-2xx status. `detail` carries the
    /// server's human-readable message when the error body had one.
    #[error("server returned {status}")]
    Server {
        status: StatusCode,
        detail: Option<String>,
    },
    /// A 2xx response whose body failed to decode.
    #[error("invalid response payload: {0}")]
    Payload(#[source] reqwest::Error),
    #[error("case id must not be empty")]
    EmptyCaseId,
}

impl GatewayError {
    /// Display string for the UI error slot. A server-provided detail wins;
    /// failures without a usable message fall back to the operation default.
    pub fn display_message(&self, fallback: &str) -> String {
        match self {
            GatewayError::Transport(err) => err.to_string(),
            GatewayError::Server {
                detail: Some(detail),
                ..
            } => detail.clone(),
            GatewayError::Server { detail: None, .. } | GatewayError::Payload(_) => {
                fallback.to_string()
            }
            GatewayError::EmptyCaseId => self.to_string(),
        }
    }
}

/// Typed request/response surface of the PA review backend. One network round
/// trip per operation, stateless, no retries, no caching.
#[async_trait]
pub trait CaseGateway: Send + Sync {
    async fn list_cases(&self) -> Result<Vec<Case>, GatewayError>;
    async fn get_case(&self, id: &str) -> Result<Case, GatewayError>;
    async fn process_case(&self, id: &str) -> Result<OperationAck, GatewayError>;
    async fn submit_decision(
        &self,
        id: &str,
        submission: &DecisionSubmission,
    ) -> Result<OperationAck, GatewayError>;
    async fn metrics(&self) -> Result<Metrics, GatewayError>;
    async fn status(&self) -> Result<BackendStatus, GatewayError>;
}

// Backend error body: {"detail": "..."}.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

pub struct HttpCaseGateway {
    http: Client,
    base_url: String,
}

impl HttpCaseGateway {
    /// `base_url` is the API root, e.g. `http://127.0.0.1:8000/api`. No
    /// request timeout is configured; a non-responding backend leaves the
    /// caller's in-flight flag set until the request resolves.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            http: Client::new(),
            base_url,
        }
    }

    fn case_path(id: &str, suffix: &str) -> Result<String, GatewayError> {
        if id.is_empty() {
            return Err(GatewayError::EmptyCaseId);
        }
        Ok(format!("/cases/{id}{suffix}"))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        let response = self
            .http
            .get(format!("{}{path}", self.base_url))
            .send()
            .await
            .map_err(GatewayError::Transport)?;
        decode(response).await
    }

    async fn post_json<T, B>(&self, path: &str, body: Option<&B>) -> Result<T, GatewayError>
    where
        T: DeserializeOwned,
        B: Serialize + Sync,
    {
        let mut request = self.http.post(format!("{}{path}", self.base_url));
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await.map_err(GatewayError::Transport)?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
    let status = response.status();
    if !status.is_success() {
        let detail = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.detail);
        return Err(GatewayError::Server { status, detail });
    }
    response.json().await.map_err(GatewayError::Payload)
}

#[async_trait]
impl CaseGateway for HttpCaseGateway {
    async fn list_cases(&self) -> Result<Vec<Case>, GatewayError> {
        self.get_json("/cases").await
    }

    async fn get_case(&self, id: &str) -> Result<Case, GatewayError> {
        let path = Self::case_path(id, "")?;
        self.get_json(&path).await
    }

    async fn process_case(&self, id: &str) -> Result<OperationAck, GatewayError> {
        let path = Self::case_path(id, "/process")?;
        self.post_json::<OperationAck, ()>(&path, None).await
    }

    async fn submit_decision(
        &self,
        id: &str,
        submission: &DecisionSubmission,
    ) -> Result<OperationAck, GatewayError> {
        let path = Self::case_path(id, "/decide")?;
        self.post_json(&path, Some(submission)).await
    }

    async fn metrics(&self) -> Result<Metrics, GatewayError> {
        self.get_json("/metrics").await
    }

    async fn status(&self) -> Result<BackendStatus, GatewayError> {
        self.get_json("/status").await
    }
}

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod tests;
