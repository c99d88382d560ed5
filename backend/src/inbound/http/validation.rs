//! Shared validation helpers for inbound HTTP adapters.

use serde_json::json;

use crate::domain::{CredentialsValidationError, Error, TicketId};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidField,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidField => "invalid_field",
        }
    }
}

/// Newtype wrapper for HTTP field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &'static str {
        self.0
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("missing required field: {field}")).with_details(json!({
        "field": field,
        "code": ErrorCode::MissingField.as_str(),
    }))
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("{field} must be a valid UUID")).with_details(json!({
        "field": field,
        "value": value,
        "code": ErrorCode::InvalidUuid.as_str(),
    }))
}

/// Require a field that serde left as `None`.
pub(crate) fn require(value: Option<String>, field: FieldName) -> Result<String, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

/// Parse a ticket identifier taken from the request path.
pub(crate) fn parse_ticket_id(value: &str) -> Result<TicketId, Error> {
    TicketId::new(value).map_err(|_| invalid_uuid_error(FieldName::new("id"), value))
}

/// Map registration or login validation failures to a 400 payload.
pub(crate) fn credentials_error(error: CredentialsValidationError) -> Error {
    let field = error.field();
    Error::invalid_request(error.to_string()).with_details(json!({
        "field": field,
        "code": ErrorCode::InvalidField.as_str(),
    }))
}
