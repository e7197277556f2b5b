// Backend communication with the book service over HTTP

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::action::{Action, Effect};
use crate::config::Config;
use crate::ui_state::SelectedFile;

/// Body of a successful `/upload`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct UploadResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Body of a successful `/ask`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AskResponse {
    pub answer: String,
}

#[derive(Debug, Clone, Serialize)]
struct AskRequest<'a> {
    question: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BackendError {
    #[error("service returned {status}{}", detail(.message))]
    Status { status: u16, message: Option<String> },
    #[error("request failed: {0}")]
    Transport(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("parse error: {0}")]
    Parse(String),
}

impl BackendError {
    /// Build a status error, keeping the body's `message` when it has one.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.is_empty());
        BackendError::Status {
            status: status.as_u16(),
            message,
        }
    }

    /// The `message` the service put in its error body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            BackendError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

fn detail(message: &Option<String>) -> String {
    message.as_deref().map(|m| format!(": {}", m)).unwrap_or_default()
}

fn transport(e: reqwest::Error) -> BackendError {
    BackendError::Transport(e.to_string())
}

/// The two operations the book service offers.
#[async_trait]
pub trait BookService: Send + Sync {
    async fn upload(&self, file: &SelectedFile) -> Result<UploadResponse, BackendError>;
    async fn ask(&self, question: &str) -> Result<AskResponse, BackendError>;
}

pub struct HttpBackend {
    client: Client,
    upload_url: String,
    ask_url: String,
}

impl HttpBackend {
    pub fn new(config: &Config) -> Result<Self, BackendError> {
        let client = Client::builder().build().map_err(transport)?;
        Ok(Self {
            client,
            upload_url: config.upload_url(),
            ask_url: config.ask_url(),
        })
    }

    async fn read_body(response: reqwest::Response) -> Result<String, BackendError> {
        let status = response.status();
        let body = response.text().await.map_err(transport)?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(BackendError::from_status(status, &body))
        }
    }
}

#[async_trait]
impl BookService for HttpBackend {
    async fn upload(&self, file: &SelectedFile) -> Result<UploadResponse, BackendError> {
        let bytes = tokio::fs::read(file.path())
            .await
            .map_err(|e| BackendError::Io(e.to_string()))?;
        debug!(bytes = bytes.len(), url = %self.upload_url, "posting multipart upload");

        let part = Part::bytes(bytes)
            .file_name(file.name.clone())
            .mime_str("application/pdf")
            .map_err(transport)?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;

        let body = Self::read_body(response).await?;
        // Any 2xx counts as success, even with an unexpected body
        Ok(serde_json::from_str(&body).unwrap_or_default())
    }

    async fn ask(&self, question: &str) -> Result<AskResponse, BackendError> {
        debug!(url = %self.ask_url, "posting question");
        let response = self
            .client
            .post(&self.ask_url)
            .json(&AskRequest { question })
            .send()
            .await
            .map_err(transport)?;

        let body = Self::read_body(response).await?;
        serde_json::from_str(&body).map_err(|e| BackendError::Parse(e.to_string()))
    }
}

/// Run an effect against the service and produce the action that settles it.
pub async fn perform(service: &dyn BookService, effect: Effect) -> Action {
    match effect {
        Effect::Upload(file) => {
            info!(file = %file.name, "uploading book");
            let result = service.upload(&file).await;
            Action::UploadFinished { file, result }
        }
        Effect::Ask(question) => {
            info!(chars = question.chars().count(), "asking question");
            Action::AskFinished(service.ask(&question).await)
        }
    }
}
