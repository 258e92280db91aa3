//! Panoptes catalog tests against a local HTTP server.
//!
//! Tests verify:
//! - A taken display name becomes `CreateOutcome::AlreadyExists`
//! - Other rejections surface as `CatalogError::Api`
//! - Attaching images creates the subject, uploads each file, then links it
//! - The batch uploader skips a set whose name Panoptes reports as taken

use serde_json::json;
use subject_stacker::catalog::{
    Catalog, CreateOutcome, PanoptesCatalog, SubjectId, SubjectMetadata, SubjectSetHandle,
};
use subject_stacker::error::CatalogError;
use subject_stacker::upload::{BatchUploader, UploadBatch};
use subject_stacker::window::SubjectSetName;
use tempfile::TempDir;

use super::test_utils::MockHttpServer;

const TAKEN: &str =
    r#"{"errors":[{"message":"Validation failed: Display name has already been taken"}]}"#;

fn catalog(server: &MockHttpServer) -> PanoptesCatalog {
    PanoptesCatalog::new(server.base_url(), "42", "secret-token").unwrap()
}

// =============================================================================
// Subject Sets
// =============================================================================

#[tokio::test]
async fn test_taken_name_is_already_exists() {
    let server = MockHttpServer::bind().await;
    let catalog = catalog(&server);
    let requests = server.serve(vec![(422, TAKEN.to_string())]);

    let outcome = catalog
        .create_subject_set("emb_span1_step1_z0000-0002")
        .await
        .unwrap();
    assert_eq!(outcome, CreateOutcome::AlreadyExists);

    let requests = requests.lock().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].path, "/subject_sets");
    assert_eq!(
        requests[0].header("authorization"),
        Some("Bearer secret-token")
    );
    assert_eq!(
        requests[0].json(),
        json!({
            "subject_sets": {
                "display_name": "emb_span1_step1_z0000-0002",
                "links": { "project": "42" }
            }
        })
    );
}

#[tokio::test]
async fn test_other_rejection_is_api_error() {
    let server = MockHttpServer::bind().await;
    let catalog = catalog(&server);
    let _requests = server.serve(vec![(
        422,
        r#"{"errors":[{"message":"Project is not valid"}]}"#.to_string(),
    )]);

    match catalog.create_subject_set("emb").await {
        Err(CatalogError::Api { status, message }) => {
            assert_eq!(status, 422);
            assert!(message.contains("Project is not valid"));
        }
        other => panic!("Expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_created_set_returns_handle() {
    let server = MockHttpServer::bind().await;
    let catalog = catalog(&server);
    let _requests = server.serve(vec![(
        201,
        r#"{"subject_sets":[{"id":"7","display_name":"emb"}]}"#.to_string(),
    )]);

    let outcome = catalog.create_subject_set("emb").await.unwrap();
    assert_eq!(
        outcome,
        CreateOutcome::Created(SubjectSetHandle::new("7", "emb"))
    );
}

// =============================================================================
// Subjects
// =============================================================================

#[tokio::test]
async fn test_attach_uploads_then_links() {
    let files_dir = TempDir::new().unwrap();
    let files: Vec<_> = (0..2)
        .map(|z| {
            let path = files_dir.path().join(format!("emb_Z{:04}.jpg", z));
            std::fs::write(&path, format!("jpeg-{}", z)).unwrap();
            path
        })
        .collect();

    let server = MockHttpServer::bind().await;
    let base = server.base_url();
    let catalog = catalog(&server);
    let subject = json!({
        "subjects": [{
            "id": "99",
            "locations": [
                { "image/jpeg": format!("{}/upload/0", base) },
                { "image/jpeg": format!("{}/upload/1", base) }
            ]
        }]
    });
    let requests = server.serve(vec![
        (201, subject.to_string()),
        (201, String::new()),
        (201, String::new()),
        (200, "{}".to_string()),
    ]);

    let mut metadata = SubjectMetadata::new();
    metadata.insert_hidden("z_start", 0);
    let id = catalog
        .attach_images(&SubjectSetHandle::new("7", "emb"), &files, &metadata)
        .await
        .unwrap();
    assert_eq!(id, SubjectId("99".to_string()));

    let requests = requests.lock().await;
    let routes: Vec<(&str, &str)> = requests
        .iter()
        .map(|r| (r.method.as_str(), r.path.as_str()))
        .collect();
    assert_eq!(
        routes,
        vec![
            ("POST", "/subjects"),
            ("PUT", "/upload/0"),
            ("PUT", "/upload/1"),
            ("POST", "/subject_sets/7/links/subjects"),
        ]
    );

    let created = requests[0].json();
    assert_eq!(
        created["subjects"]["locations"],
        json!(["image/jpeg", "image/jpeg"])
    );
    assert_eq!(created["subjects"]["metadata"]["#z_start"], json!(0));

    assert_eq!(requests[1].body, b"jpeg-0");
    assert_eq!(requests[2].body, b"jpeg-1");
    assert_eq!(requests[1].header("content-type"), Some("image/jpeg"));
    assert_eq!(requests[3].json(), json!({ "subjects": ["99"] }));
}

#[tokio::test]
async fn test_missing_upload_locations_is_invalid_response() {
    let files_dir = TempDir::new().unwrap();
    let file = files_dir.path().join("emb_Z0000.jpg");
    std::fs::write(&file, b"jpeg").unwrap();

    let server = MockHttpServer::bind().await;
    let catalog = catalog(&server);
    let _requests = server.serve(vec![(
        201,
        r#"{"subjects":[{"id":"99","locations":[]}]}"#.to_string(),
    )]);

    let result = catalog
        .attach_images(
            &SubjectSetHandle::new("7", "emb"),
            &[file],
            &SubjectMetadata::new(),
        )
        .await;
    assert!(matches!(result, Err(CatalogError::InvalidResponse(_))));
}

// =============================================================================
// Uploader
// =============================================================================

#[tokio::test]
async fn test_uploader_skips_taken_set() {
    let server = MockHttpServer::bind().await;
    let catalog = catalog(&server);
    let requests = server.serve(vec![(422, TAKEN.to_string())]);

    let batch = |part| UploadBatch {
        subject_set: SubjectSetName::from_raw("emb_span1_step1_z0000-0002"),
        files: Vec::new(),
        metadata: SubjectMetadata::new(),
        part,
        parts: 2,
    };

    let report = BatchUploader::new(catalog)
        .upload(&[batch(1), batch(2)])
        .await
        .unwrap();

    assert!(report.created.is_empty());
    assert_eq!(report.skipped, vec!["emb_span1_step1_z0000-0002"]);
    assert_eq!(report.subjects, 0);

    // One create attempt, no subject requests
    assert_eq!(requests.lock().await.len(), 1);
}
