//! Identifier validation. Runs before any store access.

use crate::error::{AppError, Result};
use uuid::Uuid;

/// Parse a client-supplied identifier; `what` names it in the error message.
pub fn parse_id(what: &str, raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| AppError::invalid(format!("Invalid {} id format", what)))
}
