//! Response types for post endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A post as returned to callers.
///
/// The author is exposed as username only; no other identity fields leave the
/// service.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct PostResponse {
    pub id: String,
    pub username: String,
    pub text: Option<String>,
    pub media_type: Option<String>,
    pub media_url: Option<String>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::PostResponse;
    use anyhow::Result;
    use chrono::Utc;

    #[test]
    fn post_response_serializes_optional_fields() -> Result<()> {
        let post = PostResponse {
            id: "0".to_string(),
            username: "alice".to_string(),
            text: Some("hello".to_string()),
            media_type: None,
            media_url: None,
            is_public: true,
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&post)?;
        assert_eq!(value["username"], "alice");
        assert!(value["media_url"].is_null());
        Ok(())
    }
}
