use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, FromRow, Row};

/// Marker stored in `cw1.users.password` for accounts whose credentials are
/// checked by the external identity provider.
pub const EXTERNAL_AUTH_PASSWORD: &str = "external_auth";

/// A user as exposed by the API. The password column is never loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
}

impl<'r> FromRow<'r, PgRow> for User {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let email: String = row.try_get("email")?;
        if !email.contains('@') {
            return Err(sqlx::Error::ColumnDecode {
                index: "email".to_string(),
                source: format!("not an email address: {}", email).into(),
            });
        }

        Ok(Self {
            id: row.try_get("user_id")?,
            name: row.try_get("name")?,
            email,
        })
    }
}
