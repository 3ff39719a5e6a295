mod common;

use common::SECRET_ARN;
use secret_rotation::handler::handle_request;
use secret_rotation::store::FileStore;
use secret_rotation::{Rotator, SecretGenerator, SecretStore};
use tempfile::TempDir;

#[tokio::test]
async fn test_rotate_key_value_secret_on_disk() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::new(dir.path()).unwrap();
    let initial = store
        .put_secret_value(SECRET_ARN, r#"{"username":"app","password":"changeme"}"#)
        .await
        .unwrap();

    let generator = SecretGenerator::new();
    let rotator = Rotator::new(&store, &generator);
    let payload = format!(
        r#"{{"secret_arn":"{}","secret_type":"key-value","generator_options":{{"length":20,"include_lowercase":true,"include_special_chars":true,"min_number_special":2}},"key_value_config":{{"keys_to_rotate":["password"]}}}}"#,
        SECRET_ARN
    );

    let response = handle_request(&rotator, &payload, None).await.unwrap();
    assert!(response.success);
    assert_ne!(response.version_id.as_deref(), Some(initial.as_str()));

    let body: serde_json::Value =
        serde_json::from_str(&store.get_secret_value(SECRET_ARN).await.unwrap()).unwrap();
    assert_eq!(body["username"], "app");
    let password = body["password"].as_str().unwrap();
    assert_ne!(password, "changeme");
    assert_eq!(password.len(), 20);
}

#[tokio::test]
async fn test_rotate_missing_secret_on_disk() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::new(dir.path()).unwrap();
    let generator = SecretGenerator::new();
    let rotator = Rotator::new(&store, &generator);

    let payload = format!(
        r#"{{"secret_arn":"{}","secret_type":"json","generator_options":{{"length":16,"include_digits":true}}}}"#,
        SECRET_ARN
    );
    let failure = handle_request(&rotator, &payload, None).await.unwrap_err();
    assert!(!failure.response.success);
    assert!(failure.response.error_msg.unwrap().contains("was not found"));
}
