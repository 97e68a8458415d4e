//! Request context carrying the caller identity supplied by the substrate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use lostfound_core::error::AppError;
use lostfound_core::types::Identity;

/// Context for the current operation.
///
/// Every command is attributed to exactly one caller; the identity
/// substrate is responsible for having authenticated it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated caller.
    pub caller: Identity,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(caller: impl Into<Identity>) -> Self {
        Self {
            caller: caller.into(),
            request_time: Utc::now(),
        }
    }

    /// The caller, rejecting a blank identity.
    pub fn caller(&self) -> Result<&Identity, AppError> {
        if self.caller.is_empty() {
            return Err(AppError::invalid_input("Caller identity is required"));
        }
        Ok(&self.caller)
    }
}
