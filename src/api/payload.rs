use serde::Deserialize;
use std::collections::HashMap;

use crate::database::models::TrailChanges;
use crate::error::ApiError;

pub const TRAIL_NAME_MAX_LEN: usize = 255;
pub const DESCRIPTION_MAX_LEN: usize = 2000;

/// Body of `POST /api/trails` and `PUT /api/trails/:trail_id`. Unknown keys
/// (including attempts to set `TrailID`, `DateCreated` or `CreatedBy`) are
/// rejected rather than ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrailPayload {
    #[serde(rename = "TrailName")]
    pub trail_name: String,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
}

impl TrailPayload {
    /// Check field constraints and normalize: the name is trimmed and a
    /// blank description becomes `None`.
    pub fn validate(self) -> Result<TrailChanges, ApiError> {
        let mut field_errors = HashMap::new();

        let trail_name = self.trail_name.trim().to_string();
        if trail_name.is_empty() {
            field_errors.insert("TrailName".to_string(), "must not be empty".to_string());
        } else if trail_name.chars().count() > TRAIL_NAME_MAX_LEN {
            field_errors.insert(
                "TrailName".to_string(),
                format!("must be at most {} characters", TRAIL_NAME_MAX_LEN),
            );
        }

        let description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        if let Some(d) = &description {
            if d.chars().count() > DESCRIPTION_MAX_LEN {
                field_errors.insert(
                    "Description".to_string(),
                    format!("must be at most {} characters", DESCRIPTION_MAX_LEN),
                );
            }
        }

        if !field_errors.is_empty() {
            return Err(ApiError::validation_error("Invalid trail", Some(field_errors)));
        }

        Ok(TrailChanges {
            trail_name,
            description,
        })
    }
}

/// OAuth2 password-flow form posted to `/token`. `username` carries the email.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenForm {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub grant_type: Option<String>,
}

impl TokenForm {
    pub fn validate(&self) -> Result<(), ApiError> {
        if let Some(grant_type) = &self.grant_type {
            if grant_type != "password" {
                return Err(ApiError::field_error("grant_type", "must be \"password\""));
            }
        }
        if self.username.trim().is_empty() {
            return Err(ApiError::field_error("username", "must not be empty"));
        }
        if self.password.is_empty() {
            return Err(ApiError::field_error("password", "must not be empty"));
        }
        Ok(())
    }
}
