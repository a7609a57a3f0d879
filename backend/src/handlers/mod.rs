pub mod block;
pub mod events;
pub mod health;
pub mod stats;
pub mod users;

use crate::error::{AppError, AppResult};

const MAX_IDENTIFIER_LEN: usize = 64;

/// Usernames and site ids come straight from the path.
pub(crate) fn check_identifier(kind: &str, value: &str) -> AppResult<()> {
    if value.is_empty() || value.len() > MAX_IDENTIFIER_LEN {
        return Err(AppError::InvalidInput(format!(
            "{} must be 1-{} characters",
            kind, MAX_IDENTIFIER_LEN
        )));
    }
    if value.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(AppError::InvalidInput(format!(
            "{} must not contain whitespace",
            kind
        )));
    }
    Ok(())
}
