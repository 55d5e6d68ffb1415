use async_trait::async_trait;

use crate::database::manager::DatabaseError;
use crate::database::models::{NewTrail, Trail, TrailChanges, TrailDetails, TrailLogEntry, User};

/// Data access operations behind the HTTP handlers.
///
/// `PgRepository` is the production implementation; handler tests swap in
/// the in-memory one from `testing`.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Insert a trail and return its assigned id. A `created_by` that does
    /// not reference a user yields `DatabaseError::ForeignKey`.
    async fn create_trail(&self, trail: NewTrail) -> Result<i32, DatabaseError>;

    /// Every trail, ordered by id. No pagination.
    async fn list_trails(&self) -> Result<Vec<Trail>, DatabaseError>;

    async fn get_trail(&self, trail_id: i32) -> Result<Trail, DatabaseError>;

    /// Overwrite name and description only.
    async fn update_trail(&self, trail_id: i32, changes: TrailChanges) -> Result<(), DatabaseError>;

    /// Remove a trail. Its user associations go with it.
    async fn delete_trail(&self, trail_id: i32) -> Result<(), DatabaseError>;

    /// Trails linked to `user_id` through `cw1.user_trail`.
    async fn list_user_trails(&self, user_id: i32) -> Result<Vec<Trail>, DatabaseError>;

    async fn trail_details(&self, trail_id: i32) -> Result<TrailDetails, DatabaseError>;

    /// Audit entries for a trail, oldest first. Entries survive trail deletion.
    async fn trail_log(&self, trail_id: i32) -> Result<Vec<TrailLogEntry>, DatabaseError>;

    async fn find_user(&self, user_id: i32) -> Result<Option<User>, DatabaseError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;

    /// Create an externally authenticated user with the next free id. If the
    /// email already exists the existing row is returned.
    async fn create_user(&self, email: &str, name: &str) -> Result<User, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}
