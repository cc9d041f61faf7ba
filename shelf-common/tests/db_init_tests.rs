//! Database initialization tests against real files

use shelf_common::db::init_database;
use tempfile::TempDir;

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("nested").join("warehouse.db");

    let result = init_database(&db_path).await;

    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("warehouse.db");

    let pool1 = init_database(&db_path).await.unwrap();
    sqlx::query("INSERT INTO jobs (title, author) VALUES ('Dune', 'Frank Herbert')")
        .execute(&pool1)
        .await
        .unwrap();
    pool1.close().await;

    let pool2 = init_database(&db_path).await.unwrap();
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM jobs")
        .fetch_one(&pool2)
        .await
        .unwrap();

    assert_eq!(count, 1, "existing rows must survive reopening");
}

#[tokio::test]
async fn test_job_identity_unique() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("warehouse.db")).await.unwrap();

    sqlx::query("INSERT INTO jobs (title, author) VALUES ('Dune', 'Frank Herbert')")
        .execute(&pool)
        .await
        .unwrap();
    let duplicate = sqlx::query("INSERT INTO jobs (title, author) VALUES ('Dune', 'Frank Herbert')")
        .execute(&pool)
        .await;

    assert!(duplicate.is_err());
}
