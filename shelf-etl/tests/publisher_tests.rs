//! CSV publishing against a file-backed database

mod helpers;

use helpers::*;
use shelf_etl::db::jobs;
use shelf_etl::publisher::publish_csv;
use shelf_etl::JobStatus;
use std::io::Write;
use tempfile::NamedTempFile;

#[tokio::test]
async fn test_publish_csv_file_enqueues_pending_jobs() {
    let (_dir, pool) = create_test_db().await.unwrap();
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "Title,Author,ISBN").unwrap();
    writeln!(file, "Dune,Frank Herbert,978-0-441-17271-9").unwrap();
    writeln!(file, "\"Good Omens\",\"Terry Pratchett, Neil Gaiman\",").unwrap();
    file.flush().unwrap();

    let summary = publish_csv(&pool, file.path()).await.unwrap();

    assert_eq!(summary.jobs_created, 2);
    assert!(summary.is_success());
    assert_eq!(jobs::count_by_status(&pool, JobStatus::Pending).await.unwrap(), 2);

    let pending = jobs::fetch_pending(&pool, 10).await.unwrap();
    assert_eq!(pending[0].isbn.as_deref(), Some("978-0-441-17271-9"));
    assert_eq!(pending[1].author, "Terry Pratchett, Neil Gaiman");
    assert_eq!(pending[1].isbn, None);
}

#[tokio::test]
async fn test_republishing_skips_existing_jobs() {
    let (_dir, pool) = create_test_db().await.unwrap();
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "Title,Author").unwrap();
    writeln!(file, "Dune,Frank Herbert").unwrap();
    file.flush().unwrap();

    publish_csv(&pool, file.path()).await.unwrap();
    let summary = publish_csv(&pool, file.path()).await.unwrap();

    assert_eq!(summary.jobs_created, 0);
    assert_eq!(summary.duplicates_skipped, 1);
    assert_eq!(count_rows(&pool, "jobs").await, 1);
}

#[tokio::test]
async fn test_missing_file_is_error() {
    let (dir, pool) = create_test_db().await.unwrap();

    let result = publish_csv(&pool, &dir.path().join("absent.csv")).await;

    assert!(result.is_err());
}
