//! Pre-flight checks before operations that call the inference collaborator.

use crate::error::{Result, TunegrabError};
use crate::openai::is_api_key_configured;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Search and URL resolution call the inference collaborator.
    Resolve,
    /// History only reads the session store.
    History,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation) -> Result<()> {
    match operation {
        Operation::Resolve => check_api_key(),
        Operation::History => Ok(()),
    }
}

fn check_api_key() -> Result<()> {
    if is_api_key_configured() {
        Ok(())
    } else {
        Err(TunegrabError::Config(
            "OPENAI_API_KEY is not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        ))
    }
}
