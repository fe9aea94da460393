use std::io;

use axum::{Json, http::StatusCode, response::IntoResponse};

use crate::notice::Notice;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// 表单必填字段缺失，发生在任何存储调用之前
    #[error("{0}")]
    Validation(String),

    #[error("Not Found")]
    NotFound,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("upload failed: {0}")]
    Upload(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            Error::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Error::NotFound => (StatusCode::NOT_FOUND, "Not Found".to_string()),
            Error::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            Error::Upload(msg) => {
                tracing::error!(%msg, "object storage error");
                (StatusCode::BAD_GATEWAY, self.to_string())
            }
            Error::Reqwest(e) => {
                tracing::error!(%e, "baas request error");
                (StatusCode::BAD_GATEWAY, "Bad Gateway".to_string())
            }
            Error::Sqlx(e) => {
                tracing::error!(%e, "sqlx error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            Error::Config(_) | Error::Toml(_) | Error::Json(_) | Error::Io(_) => {
                tracing::error!(e = %self, "server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        (status, Json(Notice::error(message))).into_response()
    }
}
