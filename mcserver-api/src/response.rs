// Response envelope shared by the control endpoints
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use mcserver_common::{ControlError, Lookup};
use serde::Serialize;
use utoipa::ToSchema;

use crate::lifecycle::{StartOutcome, StopOutcome};

pub const ALLOW_HEADERS: &str = "Content-Type,Authorization";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
}

/// Per-endpoint configuration: which verb it serves. Everything the gate and
/// the shaper need to differ between endpoints is derived from this value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Endpoint {
    pub name: &'static str,
    pub verb: Verb,
}

impl Endpoint {
    pub const STATUS: Endpoint = Endpoint {
        name: "server-status",
        verb: Verb::Get,
    };
    pub const START: Endpoint = Endpoint {
        name: "start-server",
        verb: Verb::Post,
    };
    pub const STOP: Endpoint = Endpoint {
        name: "stop-server",
        verb: Verb::Post,
    };

    pub fn path(&self) -> String {
        format!("/{}", self.name)
    }

    pub fn accepts(&self, method: &axum::http::Method) -> bool {
        match self.verb {
            Verb::Get => *method == axum::http::Method::GET,
            Verb::Post => *method == axum::http::Method::POST,
        }
    }

    pub fn allow_methods(&self) -> &'static str {
        match self.verb {
            Verb::Get => "GET,OPTIONS",
            Verb::Post => "POST,OPTIONS",
        }
    }

    fn with_cors(&self, mut resp: Response) -> Response {
        let headers = resp.headers_mut();
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(self.allow_methods()),
        );
        resp
    }

    pub fn json<T: Serialize>(&self, status: StatusCode, body: T) -> Response {
        self.with_cors((status, Json(body)).into_response())
    }

    pub fn message(&self, status: StatusCode, message: impl Into<String>) -> Response {
        self.json(
            status,
            MessageResponse {
                message: message.into(),
            },
        )
    }

    pub fn error(&self, status: StatusCode, error: impl Into<String>) -> Response {
        self.json(
            status,
            ErrorResponse {
                error: error.into(),
            },
        )
    }

    /// 200 with an empty body.
    pub fn preflight(&self) -> Response {
        self.with_cors(StatusCode::OK.into_response())
    }

    pub fn method_not_allowed(&self) -> Response {
        let mut resp = self.error(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
        resp.headers_mut().insert(
            header::ALLOW,
            HeaderValue::from_static(self.allow_methods()),
        );
        resp
    }

    pub fn shape<T: Envelope>(&self, value: T) -> Response {
        value.into_envelope(*self)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    /// Provider-reported status, verbatim (RUNNING, STOPPED, ...).
    pub status: String,
    /// External NAT IP; null unless RUNNING.
    pub ip_address: Option<String>,
    pub creation_timestamp: String,
    pub machine_type: String,
    pub zone: String,
}

pub const NOT_FOUND_MESSAGE: &str = "Server not found";

/// Anything a control endpoint can answer with.
pub trait Envelope {
    fn into_envelope(self, endpoint: Endpoint) -> Response;
}

impl Envelope for Lookup {
    fn into_envelope(self, endpoint: Endpoint) -> Response {
        match self {
            Lookup::Absent => endpoint.message(StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE),
            Lookup::Found(d) => endpoint.json(
                StatusCode::OK,
                StatusResponse {
                    status: d.status.to_string(),
                    ip_address: d.external_address,
                    creation_timestamp: d.creation_timestamp,
                    machine_type: d.machine_type,
                    zone: d.zone,
                },
            ),
        }
    }
}

impl Envelope for StartOutcome {
    fn into_envelope(self, endpoint: Endpoint) -> Response {
        let message = match self {
            StartOutcome::Creating => "Server is being created and started",
            StartOutcome::Starting => "Server is starting",
            StartOutcome::AlreadyRunning => "Server is already running",
        };
        endpoint.message(StatusCode::OK, message)
    }
}

impl Envelope for StopOutcome {
    fn into_envelope(self, endpoint: Endpoint) -> Response {
        match self {
            StopOutcome::NotFound => endpoint.message(StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE),
            StopOutcome::Stopping => endpoint.message(StatusCode::OK, "Server is stopping"),
            StopOutcome::AlreadyStopped(state) => endpoint.message(
                StatusCode::OK,
                format!("Server is already in {} state", state),
            ),
        }
    }
}

impl Envelope for ControlError {
    fn into_envelope(self, endpoint: Endpoint) -> Response {
        match self {
            ControlError::Unauthorized => endpoint.error(StatusCode::UNAUTHORIZED, "Unauthorized"),
            ControlError::NotFound => endpoint.message(StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE),
            other => {
                tracing::error!("[{}] request failed: {}", endpoint.name, other);
                endpoint.error(StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
            }
        }
    }
}

impl<T: Envelope, E: Into<ControlError>> Envelope for Result<T, E> {
    fn into_envelope(self, endpoint: Endpoint) -> Response {
        match self {
            Ok(value) => value.into_envelope(endpoint),
            Err(e) => e.into().into_envelope(endpoint),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcserver_common::{CredentialError, InstanceState, ProviderError};

    fn header_value<'a>(resp: &'a Response, name: header::HeaderName) -> &'a str {
        resp.headers().get(name).unwrap().to_str().unwrap()
    }

    #[test]
    fn test_cors_headers_scoped_to_endpoint() {
        let resp = Endpoint::STATUS.preflight();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(header_value(&resp, header::ACCESS_CONTROL_ALLOW_ORIGIN), "*");
        assert_eq!(
            header_value(&resp, header::ACCESS_CONTROL_ALLOW_HEADERS),
            "Content-Type,Authorization"
        );
        assert_eq!(header_value(&resp, header::ACCESS_CONTROL_ALLOW_METHODS), "GET,OPTIONS");

        let resp = Endpoint::STOP.shape(StopOutcome::Stopping);
        assert_eq!(header_value(&resp, header::ACCESS_CONTROL_ALLOW_METHODS), "POST,OPTIONS");
        assert_eq!(header_value(&resp, header::CONTENT_TYPE), "application/json");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(Endpoint::STOP.shape(StopOutcome::NotFound).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            Endpoint::STOP
                .shape(StopOutcome::AlreadyStopped(InstanceState::Stopped))
                .status(),
            StatusCode::OK
        );
        assert_eq!(Endpoint::STATUS.shape(Lookup::Absent).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            Endpoint::START.shape(ControlError::Unauthorized).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            Endpoint::START
                .shape(ControlError::from(CredentialError::Missing("GCP_SERVICE_ACCOUNT_KEY".into())))
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        let result: Result<StartOutcome, ProviderError> =
            Err(ProviderError::http(403, None, "denied"));
        assert_eq!(
            Endpoint::START.shape(result).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_method_not_allowed_lists_verb() {
        let resp = Endpoint::START.method_not_allowed();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(header_value(&resp, header::ALLOW), "POST,OPTIONS");
    }

    #[test]
    fn test_accepts_only_its_verb() {
        assert!(Endpoint::STATUS.accepts(&axum::http::Method::GET));
        assert!(!Endpoint::STATUS.accepts(&axum::http::Method::POST));
        assert!(Endpoint::START.accepts(&axum::http::Method::POST));
        assert_eq!(Endpoint::STOP.path(), "/stop-server");
    }
}
