use crate::application::ports::remote_api::{
    CreateInspectionRequest, CreateItemRequest, InspectionRemote, PhotoUpload,
    SignatureSubmission,
};
use crate::domain::value_objects::offline::ServerId;
use crate::shared::config::RemoteConfig;
use crate::shared::error::{AppError, RemoteError};
use async_trait::async_trait;
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const LOG_TARGET: &str = "inspection::remote";
const MAX_LOG_BODY_CHARS: usize = 512;

#[derive(Debug, Deserialize)]
struct CreatedResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct UploadedResponse {
    path: String,
}

#[derive(Debug, Default, Deserialize)]
struct OptionalIdResponse {
    #[serde(default)]
    id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse {
    #[serde(default)]
    existing_id: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// [`InspectionRemote`] over the JSON HTTP API of the system of record.
#[derive(Debug, Clone)]
pub struct HttpInspectionRemote {
    client: reqwest::Client,
    base_url: Url,
    auth_token: Option<String>,
}

impl HttpInspectionRemote {
    pub fn new(config: &RemoteConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| AppError::ConfigurationError(format!("HTTP client: {err}")))?;

        let base_url = Url::parse(&config.base_url)
            .map_err(|err| AppError::ConfigurationError(format!("remote base URL: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::ConfigurationError(format!(
                "remote base URL cannot carry a path: {}",
                config.base_url
            )));
        }

        Ok(Self {
            client,
            base_url,
            auth_token: config.auth_token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Appends each segment percent-encoded, so identifiers never change the route.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, RemoteError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| RemoteError::InvalidRequest(format!("cannot extend {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send_json<B, T>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> Result<T, RemoteError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned + Default,
    {
        let url = self.endpoint(segments)?;
        let mut request = self.client.request(method, url).json(body);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(transport_error)?;
        parse_response(response).await
    }
}

/// Any failure before a status line arrives is a network failure.
fn transport_error(err: reqwest::Error) -> RemoteError {
    RemoteError::Network(err.to_string())
}

async fn parse_response<T: DeserializeOwned + Default>(
    response: reqwest::Response,
) -> Result<T, RemoteError> {
    let status = response.status();
    let body = response.text().await.map_err(transport_error)?;
    log_response(status, &body);

    if status == StatusCode::CONFLICT {
        let error = serde_json::from_str::<ErrorResponse>(&body).unwrap_or_default();
        return Err(RemoteError::conflict(
            error.existing_id.or(error.id).filter(|id| !id.trim().is_empty()),
        ));
    }

    if !status.is_success() {
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .ok()
            .and_then(|error| error.message.or(error.error))
            .unwrap_or_else(|| format!("Request failed: {body}"));
        return Err(RemoteError::api(status.as_u16(), message));
    }

    if body.trim().is_empty() {
        return Ok(T::default());
    }

    serde_json::from_str(&body).map_err(|err| {
        tracing::error!(target: LOG_TARGET, error = %err, "failed to decode response body");
        RemoteError::InvalidResponse(format!("Failed to parse response: {err}"))
    })
}

fn log_response(status: StatusCode, body: &str) {
    if status.is_success() {
        tracing::debug!(target: LOG_TARGET, status = %status, "remote response");
        return;
    }

    let mut preview = body.chars().take(MAX_LOG_BODY_CHARS).collect::<String>();
    if body.chars().count() > MAX_LOG_BODY_CHARS {
        preview.push_str("...");
    }
    tracing::debug!(target: LOG_TARGET, status = %status, body = %preview, "remote error response");
}

fn server_id(value: String) -> Result<ServerId, RemoteError> {
    ServerId::new(value).map_err(RemoteError::InvalidResponse)
}

#[async_trait]
impl InspectionRemote for HttpInspectionRemote {
    async fn create_inspection(
        &self,
        request: &CreateInspectionRequest,
    ) -> Result<ServerId, RemoteError> {
        let response: Option<CreatedResponse> = self
            .send_json(Method::POST, &["api", "inspections"], request)
            .await?;
        let created = response
            .ok_or_else(|| RemoteError::InvalidResponse("missing inspection id".to_string()))?;
        server_id(created.id)
    }

    async fn update_inspection(
        &self,
        server_id: &ServerId,
        request: &CreateInspectionRequest,
    ) -> Result<(), RemoteError> {
        let _: OptionalIdResponse = self
            .send_json(
                Method::PUT,
                &["api", "inspections", server_id.as_str()],
                request,
            )
            .await?;
        Ok(())
    }

    async fn upload_photo(&self, upload: &PhotoUpload) -> Result<String, RemoteError> {
        let segments = ["api", "inspections", upload.inspection_id.as_str(), "photos"];
        let response: Option<UploadedResponse> =
            self.send_json(Method::POST, &segments, upload).await?;
        response
            .map(|uploaded| uploaded.path)
            .filter(|path| !path.trim().is_empty())
            .ok_or_else(|| RemoteError::InvalidResponse("missing storage path".to_string()))
    }

    async fn create_item(
        &self,
        request: &CreateItemRequest,
    ) -> Result<Option<ServerId>, RemoteError> {
        let segments = ["api", "inspections", request.inspection_id.as_str(), "items"];
        let response: OptionalIdResponse =
            self.send_json(Method::POST, &segments, request).await?;
        response.id.map(server_id).transpose()
    }

    async fn submit_signature(&self, submission: &SignatureSubmission) -> Result<(), RemoteError> {
        let _: OptionalIdResponse = self
            .send_json(Method::POST, &["api", "signatures"], submission)
            .await?;
        Ok(())
    }
}
