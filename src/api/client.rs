// ABOUTME: HTTP implementation of the ticket API using reqwest

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error, info};
use url::Url;

use super::{ApiError, ReachabilityCheck, SubmitResponse, TempUploadResponse, TicketApi};
use crate::models::TicketSubmission;

const SUBMIT_PATH: &str = "api/tickets";
const UPLOAD_PATH: &str = "api/uploads/temp";
const HEALTH_PATH: &str = "api/health";

#[derive(Debug, Clone)]
pub struct HttpTicketApi {
    client: Client,
    base_url: Url,
}

impl HttpTicketApi {
    /// Create a client for the backend at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        // A trailing slash makes Url::join append rather than replace the last segment
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url = Url::parse(&normalized)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let client = Client::builder()
            .user_agent(concat!("simple-tracker/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", path, e)))
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), body = %message, "API request failed");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }
}

/// Best-effort content type from the file extension
fn content_type_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        _ => "application/octet-stream",
    }
}

impl TicketApi for HttpTicketApi {
    async fn submit_ticket(&self, submission: &TicketSubmission) -> Result<SubmitResponse, ApiError> {
        let url = self.endpoint(SUBMIT_PATH)?;
        info!(session_id = %submission.session_id, "Submitting ticket");

        let response = self.client.post(url).json(submission).send().await?;
        let body: SubmitResponse = Self::decode(response).await?;

        info!(ticket_id = %body.ticket_id, "Ticket accepted");
        Ok(body)
    }

    async fn upload_temp_image(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<TempUploadResponse, ApiError> {
        let url = self.endpoint(UPLOAD_PATH)?;
        debug!(file_name, size = bytes.len(), "Uploading temporary image");

        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type_for(file_name))?;
        let form = Form::new().part("file", part);

        let response = self.client.post(url).multipart(form).send().await?;
        Self::decode(response).await
    }
}

impl ReachabilityCheck for HttpTicketApi {
    async fn is_reachable(&self) -> bool {
        let Ok(url) = self.endpoint(HEALTH_PATH) else {
            return false;
        };
        // Any HTTP answer means the network path works
        match self.client.get(url).send().await {
            Ok(_) => true,
            Err(e) => {
                debug!(error = %e, "Reachability check failed");
                false
            }
        }
    }
}
