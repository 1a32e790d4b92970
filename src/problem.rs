//! Structured error model: the body of every non-2xx response.
//!
//! A [`StructuredError`] carries a status code, a human-readable message, a
//! remediation hint (`action`), a stable `error_location_code` of the form
//! `LAYER:MODULE:FUNCTION:REASON`, and two correlation ids that are fresh
//! for every occurrence.
//!
//! The wire format is snake_case, produced by an explicit [`Serialize`] impl
//! walking a fixed field table:
//!
//! ```json
//! {
//!   "name": "ForbiddenError",
//!   "message": "...",
//!   "action": "...",
//!   "status_code": 403,
//!   "error_id": "6f1c...",
//!   "request_id": "b7e0...",
//!   "error_location_code": "MODEL:AUTHORIZATION:CAN_REQUEST:FEATURE_NOT_FOUND"
//! }
//! ```

use http::StatusCode;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use uuid::Uuid;

use crate::response::{IntoResponse, Response};

// ── ErrorKind ─────────────────────────────────────────────────────────────────

/// The family of structured errors the fixture can produce.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorKind {
    Validation,       // 400
    Unauthorized,     // 401
    Forbidden,        // 403
    NotFound,         // 404
    MethodNotAllowed, // 405
    TooManyRequests,  // 429
    InternalServer,   // 500
}

impl ErrorKind {
    pub const ALL: [Self; 7] = [
        Self::Validation,
        Self::Unauthorized,
        Self::Forbidden,
        Self::NotFound,
        Self::MethodNotAllowed,
        Self::TooManyRequests,
        Self::InternalServer,
    ];

    pub fn status(self) -> StatusCode {
        match self {
            Self::Validation       => StatusCode::BAD_REQUEST,
            Self::Unauthorized     => StatusCode::UNAUTHORIZED,
            Self::Forbidden        => StatusCode::FORBIDDEN,
            Self::NotFound         => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::TooManyRequests  => StatusCode::TOO_MANY_REQUESTS,
            Self::InternalServer   => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Class name emitted in the `name` field.
    pub fn name(self) -> &'static str {
        match self {
            Self::Validation       => "ValidationError",
            Self::Unauthorized     => "UnauthorizedError",
            Self::Forbidden        => "ForbiddenError",
            Self::NotFound         => "NotFoundError",
            Self::MethodNotAllowed => "MethodNotAllowedError",
            Self::TooManyRequests  => "TooManyRequestsError",
            Self::InternalServer   => "InternalServerError",
        }
    }

    pub fn default_location_code(self) -> &'static str {
        match self {
            Self::Validation       => "MODEL:VALIDATOR:FINAL_SCHEMA:INVALID_FIELD",
            Self::Unauthorized     => "MODEL:AUTHENTICATION:VERIFY:NOT_AUTHENTICATED",
            Self::Forbidden        => "MODEL:AUTHORIZATION:CAN_REQUEST:FEATURE_NOT_FOUND",
            Self::NotFound         => "CONTROLLER:ROUTER:DISPATCH:NO_MATCH",
            Self::MethodNotAllowed => "CONTROLLER:ROUTER:DISPATCH:METHOD_NOT_ALLOWED",
            Self::TooManyRequests  => "CONTROLLER:RATE_LIMIT:LOG_REQUEST:LIMIT_REACHED",
            Self::InternalServer   => "CONTROLLER:SERVER:DISPATCH:UNEXPECTED",
        }
    }

    fn default_message(self) -> &'static str {
        match self {
            Self::Validation       => "Um erro de validação ocorreu.",
            Self::Unauthorized     => "Usuário não autenticado.",
            Self::Forbidden        => "Você não possui permissão para executar esta ação.",
            Self::NotFound         => "Não foi possível encontrar este recurso no sistema.",
            Self::MethodNotAllowed => "Método não permitido para este recurso.",
            Self::TooManyRequests  => "Você realizou muitas requisições recentemente.",
            Self::InternalServer   => "Um erro interno não esperado aconteceu.",
        }
    }

    fn default_action(self) -> &'static str {
        match self {
            Self::Validation => "Ajuste os dados enviados e tente novamente.",
            Self::Unauthorized => {
                "Verifique se você está autenticado com uma sessão ativa e tente novamente."
            }
            Self::Forbidden => "Verifique se você possui permissão para executar esta ação.",
            Self::NotFound => "Verifique se o caminho (PATH) está correto.",
            Self::MethodNotAllowed => "Utilize um método HTTP válido para este recurso.",
            Self::TooManyRequests => {
                "Tente novamente mais tarde ou contate o suporte caso acredite que isso seja um erro."
            }
            Self::InternalServer => "Informe ao suporte o valor encontrado no campo \"error_id\".",
        }
    }
}

// ── StructuredError ───────────────────────────────────────────────────────────

/// One error occurrence. Built once, serialized, then dropped.
///
/// ```rust
/// use sessions_fixture::{ErrorKind, StructuredError};
///
/// let err = StructuredError::new(ErrorKind::Forbidden)
///     .with_message("no")
///     .with_location_code("MODEL:AUTHORIZATION:CAN_REQUEST:FEATURE_NOT_FOUND");
/// assert_eq!(err.status().as_u16(), 403);
/// ```
#[derive(Clone, Debug)]
pub struct StructuredError {
    kind: ErrorKind,
    message: String,
    action: String,
    request_id: Uuid,
    error_id: Uuid,
    error_location_code: String,
    key: Option<String>,
    constraint: Option<String>,
    context: Option<Value>,
}

impl StructuredError {
    /// A fresh occurrence of `kind` with its default texts and new ids.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: kind.default_message().to_owned(),
            action: kind.default_action().to_owned(),
            request_id: Uuid::new_v4(),
            error_id: Uuid::new_v4(),
            error_location_code: kind.default_location_code().to_owned(),
            key: None,
            constraint: None,
            context: None,
        }
    }

    pub fn forbidden() -> Self { Self::new(ErrorKind::Forbidden) }
    pub fn unauthorized() -> Self { Self::new(ErrorKind::Unauthorized) }
    pub fn too_many_requests() -> Self { Self::new(ErrorKind::TooManyRequests) }
    pub fn validation() -> Self { Self::new(ErrorKind::Validation) }
    pub fn not_found() -> Self { Self::new(ErrorKind::NotFound) }
    pub fn method_not_allowed() -> Self { Self::new(ErrorKind::MethodNotAllowed) }
    pub fn internal() -> Self { Self::new(ErrorKind::InternalServer) }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = action.into();
        self
    }

    pub fn with_location_code(mut self, code: impl Into<String>) -> Self {
        self.error_location_code = code.into();
        self
    }

    /// Offending input field (validation errors).
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Violated constraint token, emitted as `type` (validation errors).
    pub fn with_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraint = Some(constraint.into());
        self
    }

    /// Free-form context attached to logged events.
    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self
    }

    pub fn kind(&self) -> ErrorKind { self.kind }
    pub fn status(&self) -> StatusCode { self.kind.status() }
    pub fn message(&self) -> &str { &self.message }
    pub fn action(&self) -> &str { &self.action }
    pub fn request_id(&self) -> Uuid { self.request_id }
    pub fn error_id(&self) -> Uuid { self.error_id }
    pub fn location_code(&self) -> &str { &self.error_location_code }
    pub fn key(&self) -> Option<&str> { self.key.as_deref() }
    pub fn constraint(&self) -> Option<&str> { self.constraint.as_deref() }
    pub fn context(&self) -> Option<&Value> { self.context.as_ref() }

    /// The wire form as a JSON value.
    pub fn to_json(&self) -> Value {
        // Only strings, integers, uuids and an existing `Value` go in.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl std::fmt::Display for StructuredError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.kind.name(), self.error_location_code, self.message)
    }
}

impl std::error::Error for StructuredError {}

// ── Wire format ───────────────────────────────────────────────────────────────

/// Output order and snake_case name of every field that can reach the wire.
#[derive(Clone, Copy)]
enum WireField {
    Name,
    Message,
    Action,
    StatusCode,
    ErrorId,
    RequestId,
    ErrorLocationCode,
    Key,
    Type,
    Context,
}

impl WireField {
    const ALL: [Self; 10] = [
        Self::Name,
        Self::Message,
        Self::Action,
        Self::StatusCode,
        Self::ErrorId,
        Self::RequestId,
        Self::ErrorLocationCode,
        Self::Key,
        Self::Type,
        Self::Context,
    ];

    fn wire_name(self) -> &'static str {
        match self {
            Self::Name              => "name",
            Self::Message           => "message",
            Self::Action            => "action",
            Self::StatusCode        => "status_code",
            Self::ErrorId           => "error_id",
            Self::RequestId         => "request_id",
            Self::ErrorLocationCode => "error_location_code",
            Self::Key               => "key",
            Self::Type              => "type",
            Self::Context           => "context",
        }
    }
}

impl Serialize for StructuredError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for field in WireField::ALL {
            let name = field.wire_name();
            match field {
                WireField::Name              => map.serialize_entry(name, self.kind.name())?,
                WireField::Message           => map.serialize_entry(name, &self.message)?,
                WireField::Action            => map.serialize_entry(name, &self.action)?,
                WireField::StatusCode        => map.serialize_entry(name, &self.status().as_u16())?,
                WireField::ErrorId           => map.serialize_entry(name, &self.error_id)?,
                WireField::RequestId         => map.serialize_entry(name, &self.request_id)?,
                WireField::ErrorLocationCode => map.serialize_entry(name, &self.error_location_code)?,
                WireField::Key => {
                    if let Some(key) = &self.key {
                        map.serialize_entry(name, key)?;
                    }
                }
                WireField::Type => {
                    if let Some(constraint) = &self.constraint {
                        map.serialize_entry(name, constraint)?;
                    }
                }
                WireField::Context => {
                    if let Some(context) = &self.context {
                        map.serialize_entry(name, context)?;
                    }
                }
            }
        }
        map.end()
    }
}

/// Return a `StructuredError` directly from a handler or stage.
impl IntoResponse for StructuredError {
    fn into_response(self) -> Response {
        match serde_json::to_vec(&self) {
            Ok(body) => Response::builder().status(self.status()).json(body),
            Err(_) => Response::status(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }
}
