use axum::response::{IntoResponse, Response};
use http::StatusCode;
use thiserror;

use dockyard_core::Error as CoreError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("http invalid header value")]
    HTTPInvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    #[error("invalid static prefix: {0:?}")]
    InvalidStaticPrefix(String),

    #[error("No tags found: {0}")]
    NoTags(CoreError),

    #[error(transparent)]
    DockyardCoreError(#[from] CoreError),

    #[error("blocking task failed: {0}")]
    BlockingTask(#[from] tokio::task::JoinError),
}

impl Error {
    /// Tag listings report missing repositories with a dedicated message.
    pub(crate) fn for_tags(self) -> Self {
        match self {
            Error::DockyardCoreError(e) if e.is_not_found() => Error::NoTags(e),
            e => e,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::NoTags(_) => StatusCode::NOT_FOUND,
            Error::DockyardCoreError(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!("{:?}", self);
        } else {
            tracing::debug!("{}", self);
        }
        (status, format!("{}", self)).into_response()
    }
}
