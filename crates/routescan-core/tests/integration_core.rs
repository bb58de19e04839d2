//! Integration tests for the full walk-recognize-store pipeline.

use std::path::{Path, PathBuf};
use tempfile::tempdir;

use routescan_core::{IndexCoordinator, ScanConfig};

/// Helper to create a small FastAPI-style project.
fn create_test_project(base: &Path) -> PathBuf {
    let project = base.join("test_project");
    std::fs::create_dir_all(&project).unwrap();

    std::fs::write(
        project.join("main.py"),
        r#"from fastapi import FastAPI

app = FastAPI()

@app.get("/")
async def root():
    return {"message": "hello"}

@app.post("/items/")
async def create_item(item):
    return item

@app.delete("/items/{item_id}")
async def delete_item(item_id):
    return {"deleted": item_id}
"#,
    )
    .unwrap();

    std::fs::write(
        project.join("wallet.py"),
        r#"from fastapi import APIRouter

wallet_router = APIRouter()

@wallet_router.put('/update/{item_id}')
def update_item(item_id):
    return {"updated": item_id}
"#,
    )
    .unwrap();

    project
}

fn config_for(project: &Path, data_dir: &Path) -> ScanConfig {
    ScanConfig {
        roots: vec![project.to_path_buf()],
        data_dir: data_dir.to_path_buf(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_full_pass_end_to_end() {
    let temp_dir = tempdir().unwrap();
    let project = create_test_project(temp_dir.path());
    let config = config_for(&project, &temp_dir.path().join("data"));

    let mut coordinator = IndexCoordinator::new(config).await.unwrap();
    let summary = coordinator.refresh().await.unwrap().unwrap();

    assert_eq!(summary.processed, 2);
    assert_eq!(summary.endpoints_found, 4);

    let records = coordinator.list_all();
    assert_eq!(records.len(), 4);

    // Ordered by file path: main.py endpoints before wallet.py.
    assert_eq!(records[0].declaring_name, "app");
    assert_eq!(records[3].declaring_name, "wallet_router");
    assert_eq!(records[3].method, "put");
    assert_eq!(records[3].path, "/update/{item_id}");
    assert_eq!(records[3].handler_name, "update_item");
}

#[tokio::test]
async fn test_unchanged_files_are_idempotent() {
    let temp_dir = tempdir().unwrap();
    let project = create_test_project(temp_dir.path());
    let config = config_for(&project, &temp_dir.path().join("data"));

    let mut coordinator = IndexCoordinator::new(config).await.unwrap();
    coordinator.refresh().await.unwrap();
    let before = coordinator.list_all();

    let second = coordinator.refresh().await.unwrap().unwrap();
    assert_eq!(second.processed, 0);
    assert_eq!(second.skipped, 2);

    // The endpoint collection is untouched, ids included.
    assert_eq!(coordinator.list_all(), before);
}

#[tokio::test]
async fn test_changed_file_replaces_prior_records() {
    let temp_dir = tempdir().unwrap();
    let project = create_test_project(temp_dir.path());
    let config = config_for(&project, &temp_dir.path().join("data"));

    let mut coordinator = IndexCoordinator::new(config).await.unwrap();
    coordinator.refresh().await.unwrap();

    // Rewrite main.py with a single different endpoint.
    std::fs::write(
        project.join("main.py"),
        "@app.patch(\"/only\")\nasync def only():\n    pass\n",
    )
    .unwrap();

    coordinator.refresh().await.unwrap();

    let main_path = project.join("main.py").canonicalize().unwrap();
    let records = coordinator.list_for_file(&main_path);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].method, "patch");
    assert_eq!(records[0].path, "/only");

    // Nothing from the prior version of the file survives.
    assert!(coordinator.list_all().iter().all(|e| e.path != "/items/"));
    // The other file is untouched.
    assert_eq!(coordinator.list_all().len(), 2);
}

#[tokio::test]
async fn test_deleted_file_records_cleared() {
    let temp_dir = tempdir().unwrap();
    let project = create_test_project(temp_dir.path());
    let config = config_for(&project, &temp_dir.path().join("data"));

    let mut coordinator = IndexCoordinator::new(config).await.unwrap();
    coordinator.refresh().await.unwrap();

    let wallet_path = project.join("wallet.py").canonicalize().unwrap();
    std::fs::remove_file(project.join("wallet.py")).unwrap();
    coordinator.on_file_deleted(&wallet_path).await.unwrap();

    assert_eq!(coordinator.list_all().len(), 3);
    assert!(coordinator.list_for_file(&wallet_path).is_empty());
    assert_eq!(coordinator.stats().total_files, 1);
}

#[tokio::test]
async fn test_index_survives_restart() {
    let temp_dir = tempdir().unwrap();
    let project = create_test_project(temp_dir.path());
    let data_dir = temp_dir.path().join("data");

    {
        let mut coordinator = IndexCoordinator::new(config_for(&project, &data_dir))
            .await
            .unwrap();
        coordinator.refresh().await.unwrap();
        coordinator.close().await.unwrap();
    }

    // A fresh coordinator sees the persisted index and skips everything.
    let mut coordinator = IndexCoordinator::new(config_for(&project, &data_dir))
        .await
        .unwrap();
    assert_eq!(coordinator.list_all().len(), 4);

    let summary = coordinator.refresh().await.unwrap().unwrap();
    assert_eq!(summary.processed, 0);
    assert_eq!(summary.skipped, 2);
}

#[tokio::test]
async fn test_exclusion_patterns_prune_files() {
    let temp_dir = tempdir().unwrap();
    let project = create_test_project(temp_dir.path());

    let venv = project.join("venv/lib");
    std::fs::create_dir_all(&venv).unwrap();
    std::fs::write(
        venv.join("vendored.py"),
        "@app.get('/vendored')\ndef vendored():\n    pass\n",
    )
    .unwrap();

    let config = config_for(&project, &temp_dir.path().join("data"));
    let mut coordinator = IndexCoordinator::new(config).await.unwrap();
    coordinator.refresh().await.unwrap();

    assert!(coordinator
        .list_all()
        .iter()
        .all(|e| e.path != "/vendored"));
}

#[tokio::test]
async fn test_scope_isolation_through_coordinators() {
    let temp_dir = tempdir().unwrap();
    let project = create_test_project(temp_dir.path());
    let data_dir = temp_dir.path().join("data");

    let mut alpha = IndexCoordinator::new(ScanConfig {
        roots: vec![project.to_path_buf()],
        data_dir: data_dir.clone(),
        scope: "alpha".to_string(),
        ..Default::default()
    })
    .await
    .unwrap();

    let mut beta = IndexCoordinator::new(ScanConfig {
        roots: vec![project.to_path_buf()],
        data_dir: data_dir.clone(),
        scope: "beta".to_string(),
        ..Default::default()
    })
    .await
    .unwrap();

    alpha.refresh().await.unwrap();
    beta.refresh().await.unwrap();

    assert_eq!(alpha.list_all().len(), 4);
    assert_eq!(beta.list_all().len(), 4);

    // Clearing a file in one scope leaves the other scope untouched.
    let main_path = project.join("main.py").canonicalize().unwrap();
    alpha.on_file_deleted(&main_path).await.unwrap();

    assert_eq!(alpha.list_all().len(), 1);
    assert_eq!(beta.list_all().len(), 4);
}

#[tokio::test]
async fn test_search_across_files() {
    let temp_dir = tempdir().unwrap();
    let project = create_test_project(temp_dir.path());
    let config = config_for(&project, &temp_dir.path().join("data"));

    let mut coordinator = IndexCoordinator::new(config).await.unwrap();
    coordinator.refresh().await.unwrap();

    let items = coordinator.search("ITEM");
    assert_eq!(items.len(), 3);
    // Verb-priority ordering: post before put before delete.
    assert_eq!(items[0].method, "post");
    assert_eq!(items[1].method, "put");
    assert_eq!(items[2].method, "delete");
}
