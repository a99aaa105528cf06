use thiserror::Error;

pub mod gateway;

pub const CHAT_PATH: &str = "/chat";
pub const UPLOAD_PATH: &str = "/upload";
pub const BAZI_PATH: &str = "/bazi";

/// Multipart field carrying the uploaded file.
pub const UPLOAD_FIELD: &str = "file";

/// Why a request to the chat service did not produce a usable reply.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("service answered with status {0}")]
    Status(u16),
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("response is missing `{0}`")]
    MissingField(&'static str),
    #[error("service rejected the upload")]
    Rejected,
}
