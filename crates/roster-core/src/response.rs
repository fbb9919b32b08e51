//! The request/response envelope every action returns to its caller.

use crate::error::RosterError;
use serde::{Deserialize, Serialize};

/// `{ success, data?, error? }`: the contract surrounding applications
/// invoke actions through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ActionResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }

    pub fn into_result(self) -> std::result::Result<T, String> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            (_, _) => Err(self.error.unwrap_or_else(|| "unknown error".to_string())),
        }
    }
}

impl<T> From<crate::Result<T>> for ActionResult<T> {
    fn from(result: crate::Result<T>) -> Self {
        match result {
            Ok(data) => ActionResult::ok(data),
            Err(e) => ActionResult::err(e.to_string()),
        }
    }
}

impl<T> From<RosterError> for ActionResult<T> {
    fn from(e: RosterError) -> Self {
        ActionResult::err(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_serializes_without_error_field() {
        let json = serde_json::to_value(ActionResult::ok(3)).unwrap();
        assert_eq!(json, serde_json::json!({ "success": true, "data": 3 }));
    }

    #[test]
    fn err_from_result() {
        let r: crate::Result<u8> = Err(RosterError::MemberNotFound("m9".into()));
        let action: ActionResult<u8> = r.into();
        assert!(!action.success);
        assert_eq!(action.error.as_deref(), Some("member not found: m9"));
        assert_eq!(action.into_result(), Err("member not found: m9".to_string()));
    }
}
