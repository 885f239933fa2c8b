//! Shared constants for test infrastructure

/// Path the mock update service answers on
pub const CHECK_PATH: &str = "/check";

/// Binary content for testing
pub const ORIGINAL_CONTENT: &[u8] = b"original application binary";
pub const NEW_CONTENT: &[u8] = &[1, 2, 3];

/// Body of a successful update response carrying `NEW_CONTENT`
pub const UPDATE_BODY_ARRAY: &str = r#"{"Data":[1,2,3]}"#;

/// Same payload encoded as base64
pub const UPDATE_BODY_BASE64: &str = r#"{"data":"AQID"}"#;
