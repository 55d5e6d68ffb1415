use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{
    NewTrail, Trail, TrailChanges, TrailDetails, TrailLogEntry, User, EXTERNAL_AUTH_PASSWORD,
};
use crate::database::repository::Repository;

const CREATE_USER_ATTEMPTS: u32 = 3;

const TRAIL_COLUMNS: &str = "trail_id, trail_name, description, date_created, created_by";

/// Repository over the `cw1` Postgres schema. Writes go through the stored
/// procedures; reads are plain parameterized selects.
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Insert with the next free id. The no-op update makes RETURNING yield
    /// the existing row when another login created this email first.
    async fn insert_user(&self, email: &str, name: &str) -> Result<User, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO cw1.users (user_id, name, email, password)
            SELECT COALESCE(MAX(user_id), 0) + 1, $1, $2, $3 FROM cw1.users
            ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
            RETURNING user_id, name, email
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(EXTERNAL_AUTH_PASSWORD)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }
}

fn trail_not_found(trail_id: i32) -> DatabaseError {
    DatabaseError::NotFound(format!("Trail {} not found", trail_id))
}

#[async_trait]
impl Repository for PgRepository {
    async fn create_trail(&self, trail: NewTrail) -> Result<i32, DatabaseError> {
        let trail_id: i32 = sqlx::query_scalar("SELECT cw1.add_new_trail($1, $2, $3, $4)")
            .bind(&trail.trail_name)
            .bind(&trail.description)
            .bind(trail.date_created)
            .bind(trail.created_by)
            .fetch_one(&self.pool)
            .await?;

        tracing::debug!("Created trail {} for user {}", trail_id, trail.created_by);
        Ok(trail_id)
    }

    async fn list_trails(&self) -> Result<Vec<Trail>, DatabaseError> {
        let query = format!("SELECT {} FROM cw1.list_trails()", TRAIL_COLUMNS);
        let trails = sqlx::query_as::<_, Trail>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(trails)
    }

    async fn get_trail(&self, trail_id: i32) -> Result<Trail, DatabaseError> {
        let query = format!("SELECT {} FROM cw1.trail WHERE trail_id = $1", TRAIL_COLUMNS);
        sqlx::query_as::<_, Trail>(&query)
            .bind(trail_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| trail_not_found(trail_id))
    }

    async fn update_trail(&self, trail_id: i32, changes: TrailChanges) -> Result<(), DatabaseError> {
        let updated: i32 = sqlx::query_scalar("SELECT cw1.update_trail($1, $2, $3)")
            .bind(trail_id)
            .bind(&changes.trail_name)
            .bind(&changes.description)
            .fetch_one(&self.pool)
            .await?;

        if updated == 0 {
            return Err(trail_not_found(trail_id));
        }
        Ok(())
    }

    async fn delete_trail(&self, trail_id: i32) -> Result<(), DatabaseError> {
        let deleted: i32 = sqlx::query_scalar("SELECT cw1.delete_trail($1)")
            .bind(trail_id)
            .fetch_one(&self.pool)
            .await?;

        if deleted == 0 {
            return Err(trail_not_found(trail_id));
        }
        Ok(())
    }

    async fn list_user_trails(&self, user_id: i32) -> Result<Vec<Trail>, DatabaseError> {
        let trails = sqlx::query_as::<_, Trail>(
            r#"
            SELECT t.trail_id, t.trail_name, t.description, t.date_created, t.created_by
            FROM cw1.trail t
            JOIN cw1.user_trail ut ON ut.trail_id = t.trail_id
            WHERE ut.user_id = $1
            ORDER BY t.trail_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(trails)
    }

    async fn trail_details(&self, trail_id: i32) -> Result<TrailDetails, DatabaseError> {
        let query = format!(
            "SELECT {}, creator_name FROM cw1.trail_details WHERE trail_id = $1",
            TRAIL_COLUMNS
        );
        sqlx::query_as::<_, TrailDetails>(&query)
            .bind(trail_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| trail_not_found(trail_id))
    }

    async fn trail_log(&self, trail_id: i32) -> Result<Vec<TrailLogEntry>, DatabaseError> {
        let entries = sqlx::query_as::<_, TrailLogEntry>(
            "SELECT log_id, trail_id, action, action_time FROM cw1.trail_log WHERE trail_id = $1 ORDER BY log_id",
        )
        .bind(trail_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    async fn find_user(&self, user_id: i32) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT user_id, name, email FROM cw1.users WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT user_id, name, email FROM cw1.users WHERE lower(email) = lower($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create_user(&self, email: &str, name: &str) -> Result<User, DatabaseError> {
        // Two first logins can pick the same next id; the loser retries.
        let mut attempts = 0;
        let user = loop {
            attempts += 1;
            match self.insert_user(email, name).await {
                Err(DatabaseError::Duplicate(msg)) if attempts < CREATE_USER_ATTEMPTS => {
                    tracing::debug!("Retrying user insert for {}: {}", email, msg);
                }
                result => break result?,
            }
        };

        tracing::info!("Provisioned user {} ({})", user.id, user.email);
        Ok(user)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}
