use serde::{Deserialize, Serialize};

use crate::SchoolRecord;

/// Body of a `201 Created` reply from `/api/addSchool`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CreatedResponse {
    /// Always `true`.
    pub success: bool,
    /// Identifier of the inserted row.
    pub id: i64,
    /// Where the uploaded image can be fetched.
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

impl CreatedResponse {
    /// Builds a successful reply.
    #[must_use]
    pub fn new(id: i64, image_url: impl Into<String>) -> Self {
        Self {
            success: true,
            id,
            image_url: image_url.into(),
        }
    }
}

/// Body of a `200 OK` reply from `/api/getSchools`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ListResponse {
    /// Always `true`.
    pub success: bool,
    /// Every record, newest first.
    #[serde(default)]
    pub data: Vec<SchoolRecord>,
}

impl ListResponse {
    /// Builds a successful reply.
    #[must_use]
    pub fn new(data: Vec<SchoolRecord>) -> Self {
        Self { success: true, data }
    }
}

/// Body of every failed reply.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Always `false`.
    pub success: bool,
    /// Human readable reason.
    #[serde(default)]
    pub message: String,
}

impl ErrorResponse {
    /// Builds a failed reply.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_created_uses_camel_case_image_url() {
        let value = serde_json::to_value(CreatedResponse::new(3, "/schoolImages/a.png")).unwrap();
        assert_eq!(value, json!({"success": true, "id": 3, "imageUrl": "/schoolImages/a.png"}));
    }

    #[test]
    fn test_error_shape() {
        let value = serde_json::to_value(ErrorResponse::new("Image is required")).unwrap();
        assert_eq!(value, json!({"success": false, "message": "Image is required"}));
    }

    #[test]
    fn test_list_tolerates_missing_data() {
        let list: ListResponse = serde_json::from_value(json!({"success": true})).unwrap();
        assert!(list.data.is_empty());
    }
}
