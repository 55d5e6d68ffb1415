//! Repository tests against a real database. Set TEST_DATABASE_URL to a
//! scratch Postgres database to run them; they are skipped otherwise.

use anyhow::Result;
use chrono::NaiveDate;
use sqlx::PgPool;

use trail_service::config::DatabaseConfig;
use trail_service::database::models::{NewTrail, TrailChanges};
use trail_service::database::{DatabaseError, DatabaseManager, PgRepository, Repository};

async fn repository() -> Result<Option<PgRepository>> {
    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set; skipping");
        return Ok(None);
    };

    let pool = DatabaseManager::connect(&DatabaseConfig {
        url,
        max_connections: 2,
        connection_timeout: 10,
    })
    .await?;
    DatabaseManager::migrate(&pool).await?;
    Ok(Some(PgRepository::new(pool)))
}

fn new_trail(name: &str, created_by: i32) -> NewTrail {
    NewTrail {
        trail_name: name.to_string(),
        description: Some("Test trail".to_string()),
        date_created: NaiveDate::from_ymd_opt(2024, 5, 1).expect("valid date"),
        created_by,
    }
}

async fn link(pool: &PgPool, user_id: i32, trail_id: i32) -> Result<()> {
    sqlx::query("INSERT INTO cw1.user_trail (user_id, trail_id) VALUES ($1, $2)")
        .bind(user_id)
        .bind(trail_id)
        .execute(pool)
        .await?;
    Ok(())
}

#[tokio::test]
async fn procedures_round_trip() -> Result<()> {
    let Some(repo) = repository().await? else { return Ok(()) };

    let id = repo.create_trail(new_trail("Coastal Path", 1)).await?;
    let trail = repo.get_trail(id).await?;
    assert_eq!(trail.trail_name, "Coastal Path");
    assert_eq!(trail.created_by, 1);
    assert!(repo.list_trails().await?.iter().any(|t| t.trail_id == id));

    repo.update_trail(
        id,
        TrailChanges {
            trail_name: "Coastal Path (North)".to_string(),
            description: None,
        },
    )
    .await?;
    let updated = repo.get_trail(id).await?;
    assert_eq!(updated.trail_name, "Coastal Path (North)");
    assert_eq!(updated.description, None);
    assert_eq!(updated.date_created, trail.date_created);

    let details = repo.trail_details(id).await?;
    assert_eq!(details.creator_name, "Grace Hopper");

    let log = repo.trail_log(id).await?;
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].action, "INSERT");

    repo.delete_trail(id).await?;
    assert!(matches!(repo.get_trail(id).await, Err(DatabaseError::NotFound(_))));
    Ok(())
}

#[tokio::test]
async fn missing_rows_are_not_found() -> Result<()> {
    let Some(repo) = repository().await? else { return Ok(()) };

    let changes = TrailChanges {
        trail_name: "Nowhere".to_string(),
        description: None,
    };
    assert!(matches!(
        repo.update_trail(i32::MAX, changes).await,
        Err(DatabaseError::NotFound(_))
    ));
    assert!(matches!(
        repo.delete_trail(i32::MAX).await,
        Err(DatabaseError::NotFound(_))
    ));
    Ok(())
}

#[tokio::test]
async fn unknown_creator_is_foreign_key_violation() -> Result<()> {
    let Some(repo) = repository().await? else { return Ok(()) };

    let result = repo.create_trail(new_trail("Orphan", i32::MAX)).await;
    assert!(matches!(result, Err(DatabaseError::ForeignKey(_))));
    Ok(())
}

#[tokio::test]
async fn delete_cascades_user_trails() -> Result<()> {
    let Some(repo) = repository().await? else { return Ok(()) };

    let id = repo.create_trail(new_trail("Dartmoor Loop", 1)).await?;
    link(repo.pool(), 2, id).await?;
    assert!(repo.list_user_trails(2).await?.iter().any(|t| t.trail_id == id));

    // Same association twice is a duplicate
    let dup = link(repo.pool(), 2, id).await;
    assert!(dup.is_err());

    repo.delete_trail(id).await?;
    assert!(!repo.list_user_trails(2).await?.iter().any(|t| t.trail_id == id));
    assert_eq!(repo.trail_log(id).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn create_user_is_idempotent_per_email() -> Result<()> {
    let Some(repo) = repository().await? else { return Ok(()) };

    let email = format!("walker-{}@plymouth.ac.uk", uuid::Uuid::new_v4().simple());
    let first = repo.create_user(&email, "walker").await?;
    let second = repo.create_user(&email, "walker").await?;
    assert_eq!(first, second);
    assert_eq!(repo.find_user_by_email(&email).await?, Some(first.clone()));
    assert_eq!(repo.find_user(first.id).await?, Some(first));

    assert!(repo.find_user(1).await?.is_some());
    Ok(())
}

#[tokio::test]
async fn concurrent_first_logins_get_distinct_ids() -> Result<()> {
    let Some(repo) = repository().await? else { return Ok(()) };

    let tag = uuid::Uuid::new_v4().simple().to_string();
    let a = format!("a-{}@plymouth.ac.uk", tag);
    let b = format!("b-{}@plymouth.ac.uk", tag);
    let (first, second) = tokio::join!(repo.create_user(&a, "a"), repo.create_user(&b, "b"));
    let (first, second) = (first?, second?);
    assert_ne!(first.id, second.id);

    // Lookup ignores case
    let upper = a.to_uppercase();
    assert_eq!(repo.find_user_by_email(&upper).await?, Some(first));
    Ok(())
}
