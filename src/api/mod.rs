// ABOUTME: Backend endpoints the wizard depends on: ticket submit and temporary image upload
//
// The wizard only needs two calls from the backend, so they sit behind the
// `TicketApi` trait. `HttpTicketApi` talks to the real service; tests supply
// their own implementation.

pub mod client;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use thiserror::Error;

use crate::models::TicketSubmission;

pub use client::HttpTicketApi;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Whether retrying the same request later could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

/// Response of the submit endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub ticket_id: String,
}

/// Response of the temporary upload endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TempUploadResponse {
    pub temp_id: String,
    pub url: String,
    /// Some deployments omit this; the configured image TTL applies then
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

pub trait TicketApi: Send + Sync {
    /// Submit an assembled ticket, returning its id
    fn submit_ticket(
        &self,
        submission: &TicketSubmission,
    ) -> impl Future<Output = Result<SubmitResponse, ApiError>> + Send;

    /// Store an image temporarily until the ticket is submitted
    fn upload_temp_image(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> impl Future<Output = Result<TempUploadResponse, ApiError>> + Send;
}

/// Cheap reachability check used by the connectivity probe
pub trait ReachabilityCheck: Send + Sync {
    fn is_reachable(&self) -> impl Future<Output = bool> + Send;
}
