//! In-memory stand-ins for the database and identity provider, used by the
//! unit tests and by integration tests through the `test-support` feature.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::auth::{self, CredentialVerifier, ProviderError};
use crate::config::AppConfig;
use crate::database::models::{NewTrail, Trail, TrailChanges, TrailDetails, TrailLogEntry, User};
use crate::database::{DatabaseError, Repository};
use crate::state::AppState;

pub const TEST_SECRET_KEY: &str = "test-secret-key";

#[derive(Default)]
struct Tables {
    users: BTreeMap<i32, User>,
    trails: BTreeMap<i32, Trail>,
    user_trails: HashSet<(i32, i32)>,
    trail_log: Vec<TrailLogEntry>,
    next_trail_id: i32,
}

/// Repository backed by maps, mirroring the constraints of the `cw1` schema:
/// unknown creators are foreign key violations, inserts are logged, and
/// deleting a trail drops its user associations. Emails match without
/// regard to case.
#[derive(Default)]
pub struct MemoryRepository {
    tables: RwLock<Tables>,
    unreachable: AtomicBool,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository holding the three seed users (ids 1..=3)
    pub fn seeded() -> Self {
        let mut tables = Tables::default();
        for (id, name, email) in [
            (1, "Grace Hopper", "grace@plymouth.ac.uk"),
            (2, "Tim Berners-Lee", "tim@plymouth.ac.uk"),
            (3, "Ada Lovelace", "ada@plymouth.ac.uk"),
        ] {
            tables.users.insert(
                id,
                User {
                    id,
                    name: name.to_string(),
                    email: email.to_string(),
                },
            );
        }
        Self {
            tables: RwLock::new(tables),
            unreachable: AtomicBool::new(false),
        }
    }

    /// Make `health_check` fail as if the database could not be reached
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// Record that `user_id` follows `trail_id`
    pub async fn link_user_trail(&self, user_id: i32, trail_id: i32) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user_id) || !tables.trails.contains_key(&trail_id) {
            return Err(DatabaseError::ForeignKey(format!(
                "user_trail ({}, {})",
                user_id, trail_id
            )));
        }
        if !tables.user_trails.insert((user_id, trail_id)) {
            return Err(DatabaseError::Duplicate(format!(
                "user_trail ({}, {})",
                user_id, trail_id
            )));
        }
        Ok(())
    }

    pub async fn user_trail_count(&self) -> usize {
        self.tables.read().await.user_trails.len()
    }
}

fn trail_not_found(trail_id: i32) -> DatabaseError {
    DatabaseError::NotFound(format!("Trail {} not found", trail_id))
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn create_trail(&self, trail: NewTrail) -> Result<i32, DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&trail.created_by) {
            return Err(DatabaseError::ForeignKey(format!(
                "created_by {} does not exist",
                trail.created_by
            )));
        }

        tables.next_trail_id += 1;
        let trail_id = tables.next_trail_id;
        tables.trails.insert(
            trail_id,
            Trail {
                trail_id,
                trail_name: trail.trail_name,
                description: trail.description,
                date_created: trail.date_created,
                created_by: trail.created_by,
            },
        );

        let log_id = tables.trail_log.len() as i64 + 1;
        tables.trail_log.push(TrailLogEntry {
            log_id,
            trail_id,
            action: "INSERT".to_string(),
            action_time: Utc::now(),
        });

        Ok(trail_id)
    }

    async fn list_trails(&self) -> Result<Vec<Trail>, DatabaseError> {
        Ok(self.tables.read().await.trails.values().cloned().collect())
    }

    async fn get_trail(&self, trail_id: i32) -> Result<Trail, DatabaseError> {
        self.tables
            .read()
            .await
            .trails
            .get(&trail_id)
            .cloned()
            .ok_or_else(|| trail_not_found(trail_id))
    }

    async fn update_trail(&self, trail_id: i32, changes: TrailChanges) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        let trail = tables
            .trails
            .get_mut(&trail_id)
            .ok_or_else(|| trail_not_found(trail_id))?;
        trail.trail_name = changes.trail_name;
        trail.description = changes.description;
        Ok(())
    }

    async fn delete_trail(&self, trail_id: i32) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.trails.remove(&trail_id).is_none() {
            return Err(trail_not_found(trail_id));
        }
        tables.user_trails.retain(|(_, t)| *t != trail_id);
        Ok(())
    }

    async fn list_user_trails(&self, user_id: i32) -> Result<Vec<Trail>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .trails
            .values()
            .filter(|t| tables.user_trails.contains(&(user_id, t.trail_id)))
            .cloned()
            .collect())
    }

    async fn trail_details(&self, trail_id: i32) -> Result<TrailDetails, DatabaseError> {
        let tables = self.tables.read().await;
        let trail = tables
            .trails
            .get(&trail_id)
            .cloned()
            .ok_or_else(|| trail_not_found(trail_id))?;
        let creator_name = tables
            .users
            .get(&trail.created_by)
            .map(|u| u.name.clone())
            .ok_or_else(|| trail_not_found(trail_id))?;
        Ok(TrailDetails {
            trail,
            creator_name,
        })
    }

    async fn trail_log(&self, trail_id: i32) -> Result<Vec<TrailLogEntry>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .trail_log
            .iter()
            .filter(|e| e.trail_id == trail_id)
            .cloned()
            .collect())
    }

    async fn find_user(&self, user_id: i32) -> Result<Option<User>, DatabaseError> {
        Ok(self.tables.read().await.users.get(&user_id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create_user(&self, email: &str, name: &str) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables.users.values().find(|u| u.email.eq_ignore_ascii_case(email)) {
            return Ok(existing.clone());
        }
        let id = tables.users.keys().next_back().copied().unwrap_or(0) + 1;
        let user = User {
            id,
            name: name.to_string(),
            email: email.to_string(),
        };
        tables.users.insert(id, user.clone());
        Ok(user)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(DatabaseError::Sqlx(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

/// Identity provider double: accepts exactly one email/password pair, or
/// fails every call as if the provider were unreachable.
pub struct StubVerifier {
    accepted: Option<(String, String)>,
}

impl StubVerifier {
    pub fn accepting(email: &str, password: &str) -> Self {
        Self {
            accepted: Some((email.to_string(), password.to_string())),
        }
    }

    pub fn unavailable() -> Self {
        Self { accepted: None }
    }
}

#[async_trait]
impl CredentialVerifier for StubVerifier {
    async fn verify(&self, email: &str, password: &str) -> Result<bool, ProviderError> {
        match &self.accepted {
            Some((e, p)) => Ok(e == email && p == password),
            None => Err(ProviderError::Unavailable("connection refused".to_string())),
        }
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.security.secret_key = TEST_SECRET_KEY.to_string();
    config
}

/// App state over a seeded in-memory repository. Returns the repository too
/// so tests can inspect or seed it directly.
pub fn test_state(verifier: StubVerifier) -> (AppState, Arc<MemoryRepository>) {
    let repo = Arc::new(MemoryRepository::seeded());
    let state = AppState::new(test_config(), repo.clone(), Arc::new(verifier));
    (state, repo)
}

/// `Authorization` header value carrying a fresh token for `user`
pub fn bearer_for(user: &User, config: &AppConfig) -> String {
    let token = auth::issue_token(user, &config.security).expect("test token");
    format!("Bearer {}", token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn new_trail(created_by: i32) -> NewTrail {
        NewTrail {
            trail_name: "Coastal Path".to_string(),
            description: None,
            date_created: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            created_by,
        }
    }

    #[tokio::test]
    async fn unknown_creator_is_foreign_key_violation() {
        let repo = MemoryRepository::seeded();
        let result = repo.create_trail(new_trail(42)).await;
        assert!(matches!(result, Err(DatabaseError::ForeignKey(_))));
    }

    #[tokio::test]
    async fn delete_cascades_associations_but_keeps_log() {
        let repo = MemoryRepository::seeded();
        let id = repo.create_trail(new_trail(1)).await.unwrap();
        repo.link_user_trail(2, id).await.unwrap();

        repo.delete_trail(id).await.unwrap();

        assert_eq!(repo.user_trail_count().await, 0);
        assert_eq!(repo.trail_log(id).await.unwrap().len(), 1);
    }
}
