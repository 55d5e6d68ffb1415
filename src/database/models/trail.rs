use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, FromRow, Row};

/// A trail row from `cw1.trail`. Serialized with the column names the API
/// has always exposed (`TrailID`, `TrailName`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trail {
    #[serde(rename = "TrailID")]
    pub trail_id: i32,
    #[serde(rename = "TrailName")]
    pub trail_name: String,
    #[serde(rename = "Description")]
    pub description: Option<String>,
    #[serde(rename = "DateCreated")]
    pub date_created: NaiveDate,
    #[serde(rename = "CreatedBy")]
    pub created_by: i32,
}

/// Fields supplied when inserting a trail. The id is assigned by the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTrail {
    pub trail_name: String,
    pub description: Option<String>,
    pub date_created: NaiveDate,
    pub created_by: i32,
}

/// The only two columns an update may touch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrailChanges {
    pub trail_name: String,
    pub description: Option<String>,
}

/// Row of the `cw1.trail_details` view: a trail plus its creator's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrailDetails {
    #[serde(flatten)]
    pub trail: Trail,
    #[serde(rename = "CreatorName")]
    pub creator_name: String,
}

/// Append-only audit entry written by the trail insert trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrailLogEntry {
    #[serde(rename = "LogID")]
    pub log_id: i64,
    #[serde(rename = "TrailID")]
    pub trail_id: i32,
    #[serde(rename = "Action")]
    pub action: String,
    #[serde(rename = "ActionTime")]
    pub action_time: DateTime<Utc>,
}

fn invalid(column: &str, reason: &str) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: reason.to_string().into(),
    }
}

impl<'r> FromRow<'r, PgRow> for Trail {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let trail_id: i32 = row.try_get("trail_id")?;
        if trail_id <= 0 {
            return Err(invalid("trail_id", "trail id must be positive"));
        }

        let trail_name: String = row.try_get("trail_name")?;
        if trail_name.trim().is_empty() {
            return Err(invalid("trail_name", "trail name is empty"));
        }

        let created_by: i32 = row.try_get("created_by")?;
        if created_by <= 0 {
            return Err(invalid("created_by", "creator id must be positive"));
        }

        Ok(Self {
            trail_id,
            trail_name,
            description: row.try_get("description")?,
            date_created: row.try_get("date_created")?,
            created_by,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for TrailDetails {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            trail: Trail::from_row(row)?,
            creator_name: row.try_get("creator_name")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for TrailLogEntry {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            log_id: row.try_get("log_id")?,
            trail_id: row.try_get("trail_id")?,
            action: row.try_get("action")?,
            action_time: row.try_get("action_time")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn coastal_path() -> Trail {
        Trail {
            trail_id: 7,
            trail_name: "Coastal Path".to_string(),
            description: Some("Scenic coastal walk".to_string()),
            date_created: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            created_by: 1,
        }
    }

    #[test]
    fn trail_serializes_with_column_names() {
        let value = serde_json::to_value(coastal_path()).unwrap();
        assert_eq!(
            value,
            json!({
                "TrailID": 7,
                "TrailName": "Coastal Path",
                "Description": "Scenic coastal walk",
                "DateCreated": "2024-05-01",
                "CreatedBy": 1
            })
        );
    }

    #[test]
    fn details_flatten_trail_fields() {
        let details = TrailDetails {
            trail: coastal_path(),
            creator_name: "Grace Hopper".to_string(),
        };
        let value = serde_json::to_value(details).unwrap();
        assert_eq!(value["TrailID"], 7);
        assert_eq!(value["CreatorName"], "Grace Hopper");
        assert!(value.get("trail").is_none());
    }
}
