//! # Signup Tests

use super::*;
use lib_core::create_pool;
use lib_core::model::store::{DbSession, UserRepository};

#[tokio::test]
async fn test_signup_success() {
    // Arrange
    let (app, pool) = default_app().await;

    // Act
    let (status, body) = signup(&app, "A", "alice", "pw1").await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "User registered successfully"}));

    let mut session = DbSession::acquire(&pool).await.unwrap();
    let user = UserRepository::find_by_username(&mut session, "alice")
        .await
        .unwrap()
        .expect("User should be stored");
    assert_eq!(user.name, "A");
    assert_ne!(user.password_hash, "pw1");
    assert!(lib_auth::verify_password("pw1", &user.password_hash));
}

#[tokio::test]
async fn test_signup_does_not_issue_token() {
    let (app, _pool) = default_app().await;

    let (_, body) = signup(&app, "A", "alice", "pw1").await;

    assert!(body.get("token").is_none());
}

#[tokio::test]
async fn test_signup_duplicate_username() {
    // Arrange
    let (app, pool) = default_app().await;
    signup(&app, "A", "alice", "pw1").await;

    // Act
    let (status, body) = signup(&app, "Other", "alice", "pw2").await;

    // Assert
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Username already taken");
    assert_eq!(body["code"], "Conflict");

    // The original row is unchanged.
    let mut session = DbSession::acquire(&pool).await.unwrap();
    let user = UserRepository::find_by_username(&mut session, "alice")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.name, "A");
    assert!(lib_auth::verify_password("pw1", &user.password_hash));
    assert_eq!(UserRepository::count(&mut session).await.unwrap(), 1);
}

#[tokio::test]
async fn test_signup_username_case_sensitive() {
    let (app, _pool) = default_app().await;

    let (first, _) = signup(&app, "A", "alice", "pw1").await;
    let (second, _) = signup(&app, "A", "Alice", "pw1").await;

    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::OK);
}

#[tokio::test]
async fn test_signup_empty_field() {
    let (app, pool) = default_app().await;

    for (name, username, password, field) in [
        ("", "alice", "pw1", "name"),
        ("A", "  ", "pw1", "username"),
        ("A", "alice", "", "password"),
    ] {
        let (status, body) = signup(&app, name, username, password).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], format!("{} cannot be empty", field));
    }

    let mut session = DbSession::acquire(&pool).await.unwrap();
    assert_eq!(UserRepository::count(&mut session).await.unwrap(), 0);
}

#[tokio::test]
async fn test_signup_missing_field() {
    let (app, _pool) = default_app().await;

    let (status, _) = send(
        &app,
        json_request("/signup", json!({"username": "alice", "password": "pw1"})),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_signup_malformed_json() {
    let (app, _pool) = default_app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/signup")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, _) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_signup_with_special_characters() {
    let (app, _pool) = default_app().await;

    let (status, _) = signup(&app, "Zoë O'Brien", "user_test-123", "P@ssw0rd!#$% ünï").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = login(&app, "user_test-123", "P@ssw0rd!#$% ünï").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_signup_same_username() {
    // Arrange: a file-backed pool so requests really run on separate connections
    let path = std::env::temp_dir().join(format!("authgate-signup-race-{}.db", std::process::id()));
    let pool = create_pool(&format!("sqlite:{}", path.display())).await.unwrap();
    init_schema(&pool).await.unwrap();
    let app = test_app(pool.clone(), test_tokens());

    // Act
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let app = app.clone();
            tokio::spawn(async move { signup(&app, "A", "alice", "pw1").await })
        })
        .collect();

    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap());
    }

    // Assert: one winner, every loser sees Conflict
    let created = results.iter().filter(|(status, _)| *status == StatusCode::OK).count();
    assert_eq!(created, 1, "results: {:?}", results);
    for (status, body) in results.iter().filter(|(status, _)| *status != StatusCode::OK) {
        assert_eq!(*status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "Conflict");
    }

    let mut session = DbSession::acquire(&pool).await.unwrap();
    assert_eq!(UserRepository::count(&mut session).await.unwrap(), 1);
    drop(session);

    pool.close().await;
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
    }
}
