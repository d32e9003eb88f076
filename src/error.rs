use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use validator::ValidationErrors;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Validation(#[from] ValidationErrors),
    #[error("Isahc Error: {0}")]
    Isahc(#[from] isahc::Error),
    #[error("lookup service responded with status {0}")]
    UpstreamStatus(u16),
    #[error("failed to read lookup response: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse lookup response: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unusable coordinates: latitude {latitude}, longitude {longitude}")]
    Coordinates { latitude: f64, longitude: f64 },
    #[error("{reason}")]
    Custom {
        status: StatusCode,
        reason: String,
        code: Option<&'static str>,
    },
}

/// Coarse classification of a failed submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Transport,
    Parse,
    Other,
}

#[derive(Serialize)]
struct ErrorJson {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self.kind() {
            ErrorKind::Validation => warn!("{}", self),
            _ => error!("{}", self),
        }

        let status = self.status_code();
        let code = self.code().map(str::to_owned);
        (
            status,
            Json(ErrorJson {
                error: self.to_string(),
                code,
            }),
        )
            .into_response()
    }
}

impl Error {
    pub fn not_found(reason: impl Into<String>) -> Self {
        Self::Custom {
            status: StatusCode::NOT_FOUND,
            reason: reason.into(),
            code: Some("not_found"),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::Isahc(_) | Error::UpstreamStatus(_) | Error::Io(_) => ErrorKind::Transport,
            Error::Parse(_) | Error::Coordinates { .. } => ErrorKind::Parse,
            Error::Custom { .. } => ErrorKind::Other,
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Error::Custom { status, .. } => *status,
            _ => match self.kind() {
                ErrorKind::Validation => StatusCode::BAD_REQUEST,
                ErrorKind::Transport | ErrorKind::Parse => StatusCode::BAD_GATEWAY,
                ErrorKind::Other => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn code(&self) -> Option<&'static str> {
        match self {
            Error::Validation(errors) => Some(validation_code(errors)),
            Error::Isahc(_) => Some("http_client_error"),
            Error::UpstreamStatus(_) => Some("upstream_status"),
            Error::Io(_) => Some("io_error"),
            Error::Parse(_) => Some("parse_error"),
            Error::Coordinates { .. } => Some("invalid_coordinates"),
            Error::Custom { code, .. } => *code,
        }
    }
}

fn validation_code(errors: &ValidationErrors) -> &'static str {
    let empty = errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .any(|err| err.code == "empty");
    if empty { "empty_ip" } else { "invalid_ip" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(Error::UpstreamStatus(500).kind(), ErrorKind::Transport);
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(Error::from(parse).kind(), ErrorKind::Parse);
        let coords = Error::Coordinates {
            latitude: f64::NAN,
            longitude: 0.0,
        };
        assert_eq!(coords.kind(), ErrorKind::Parse);
        assert_eq!(Error::not_found("nope").kind(), ErrorKind::Other);
    }

    #[test]
    fn transport_failures_map_to_bad_gateway() {
        let response = Error::UpstreamStatus(503).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn custom_keeps_its_status() {
        let response = Error::not_found("no such route").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
