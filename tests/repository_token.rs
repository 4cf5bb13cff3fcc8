use alias_shortener::domain::repositories::TokenRepository;
use alias_shortener::error::AppError;
use alias_shortener::infrastructure::persistence::PgTokenRepository;
use sqlx::PgPool;
use std::sync::Arc;

#[sqlx::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_create_token(pool: PgPool) {
    let repo = PgTokenRepository::new(Arc::new(pool));

    let token = repo
        .create_token("ci", "dev@example.com", "hash123")
        .await
        .unwrap();

    assert_eq!(token.name, "ci");
    assert_eq!(token.owner, "dev@example.com");
    assert_eq!(token.token_hash, "hash123");
    assert!(token.revoked_at.is_none());
    assert!(token.last_used_at.is_none());
}

#[sqlx::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_create_token_duplicate_name(pool: PgPool) {
    let repo = PgTokenRepository::new(Arc::new(pool));
    repo.create_token("ci", "a@example.com", "hash-a").await.unwrap();

    let result = repo.create_token("ci", "b@example.com", "hash-b").await;

    assert!(matches!(result, Err(AppError::Conflict { .. })));
}

#[sqlx::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_find_owner(pool: PgPool) {
    let repo = PgTokenRepository::new(Arc::new(pool));
    repo.create_token("ci", "dev@example.com", "validhash")
        .await
        .unwrap();

    assert_eq!(
        repo.find_owner("validhash").await.unwrap().as_deref(),
        Some("dev@example.com")
    );
    assert!(repo.find_owner("nonexistent").await.unwrap().is_none());
}

#[sqlx::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_revoked_token_has_no_owner(pool: PgPool) {
    let repo = PgTokenRepository::new(Arc::new(pool));
    let token = repo
        .create_token("old", "dev@example.com", "revokedhash")
        .await
        .unwrap();

    repo.revoke_token(token.id).await.unwrap();

    assert!(repo.find_owner("revokedhash").await.unwrap().is_none());
    let stored = repo.find_by_id(token.id).await.unwrap().unwrap();
    assert!(stored.revoked_at.is_some());
}

#[sqlx::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_revoke_twice_is_not_found(pool: PgPool) {
    let repo = PgTokenRepository::new(Arc::new(pool));
    let token = repo
        .create_token("once", "dev@example.com", "oncehash")
        .await
        .unwrap();

    repo.revoke_token(token.id).await.unwrap();
    let result = repo.revoke_token(token.id).await;

    assert!(matches!(result, Err(AppError::NotFound { .. })));
}

#[sqlx::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_update_last_used(pool: PgPool) {
    let repo = PgTokenRepository::new(Arc::new(pool));
    let token = repo
        .create_token("used", "dev@example.com", "usedhash")
        .await
        .unwrap();

    repo.update_last_used("usedhash").await.unwrap();

    let stored = repo.find_by_name("used").await.unwrap().unwrap();
    assert_eq!(stored.id, token.id);
    assert!(stored.last_used_at.is_some());
}

#[sqlx::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_list_tokens(pool: PgPool) {
    let repo = PgTokenRepository::new(Arc::new(pool));
    repo.create_token("one", "a@example.com", "h1").await.unwrap();
    repo.create_token("two", "b@example.com", "h2").await.unwrap();

    let tokens = repo.list_tokens().await.unwrap();

    assert_eq!(tokens.len(), 2);
}
