//! HTTP client for the chat service

use crate::api::{BAZI_PATH, CHAT_PATH, GatewayError, UPLOAD_FIELD, UPLOAD_PATH};
use crate::api::gateway::schemas::{ChatRequest, ChatResponse, UploadResponse};
use crate::core::intake::IntakeForm;
use crate::core::traits::ChatGateway;
use crate::infrastructure::config::ClientConfig;
use crate::infrastructure::entities::SelectedFile;
use async_trait::async_trait;
use di::{Ref, inject, injectable};
use log::debug;
use reqwest::RequestBuilder;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;

/// [`ChatGateway`] over JSON/multipart HTTP. No request timeout is applied.
pub struct HttpChatGateway {
    client: reqwest::Client,
    config: ClientConfig,
}

#[injectable(ChatGateway)]
impl HttpChatGateway {
    #[inject]
    pub fn create(config: Ref<ClientConfig>) -> HttpChatGateway {
        HttpChatGateway::new((*config).clone())
    }
}

impl HttpChatGateway {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_client(config, reqwest::Client::new())
    }

    pub fn with_client(config: ClientConfig, client: reqwest::Client) -> Self {
        HttpChatGateway { client, config }
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, GatewayError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl ChatGateway for HttpChatGateway {
    async fn send_message(&self, message: &str) -> Result<String, GatewayError> {
        let url = self.config.endpoint(CHAT_PATH);
        debug!("POST {url}");

        let reply: ChatResponse = self
            .fetch_json(self.client.post(url).json(&ChatRequest { message }))
            .await?;

        Ok(reply.response)
    }

    async fn upload_file(&self, file: &SelectedFile) -> Result<String, GatewayError> {
        let url = self.config.endpoint(UPLOAD_PATH);
        debug!("POST {url} ({}, {} bytes)", file.name, file.bytes.len());

        let mut part = Part::bytes(file.bytes.clone()).file_name(file.name.clone());
        if let Some(mime_type) = &file.mime_type {
            part = part.mime_str(mime_type)?;
        }
        let form = Form::new().part(UPLOAD_FIELD, part);

        let reply: UploadResponse = self.fetch_json(self.client.post(url).multipart(form)).await?;

        if !reply.success {
            return Err(GatewayError::Rejected);
        }
        reply.analysis.ok_or(GatewayError::MissingField("analysis"))
    }

    async fn analyze_bazi(&self, form: &IntakeForm) -> Result<String, GatewayError> {
        let url = self.config.endpoint(BAZI_PATH);
        debug!("POST {url}");

        let reply: ChatResponse = self.fetch_json(self.client.post(url).json(form)).await?;

        Ok(reply.response)
    }
}

pub mod schemas {
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Debug)]
    pub struct ChatRequest<'a> {
        pub message: &'a str,
    }

    #[derive(Deserialize, Debug)]
    pub struct ChatResponse {
        pub response: String,
    }

    #[derive(Deserialize, Debug)]
    pub struct UploadResponse {
        pub success: bool,
        #[serde(default)]
        pub analysis: Option<String>,
    }
}
