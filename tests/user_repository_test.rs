use bulletin::{
    domain::{CreateUserRequest, UpdateUserRequest, UserRole},
    repository::{SqliteUserRepository, UserRepository},
};
use sqlx::SqlitePool;

fn new_user(username: &str, email: &str) -> CreateUserRequest {
    CreateUserRequest {
        username: username.to_string(),
        email: email.to_string(),
        password: "secure_password123".to_string(),
        full_name: "Test User".to_string(),
        role: UserRole::User,
        is_active: false,
    }
}

async fn setup() -> anyhow::Result<SqlitePool> {
    let pool = SqlitePool::connect(":memory:").await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await?;

    Ok(pool)
}

#[tokio::test]
async fn test_user_crud() -> anyhow::Result<()> {
    let pool = setup().await?;
    let repo = SqliteUserRepository::new(pool.clone());

    // Registration-shaped create: inactive by default
    let user = repo.create(new_user("testuser", "test@example.com")).await?;
    assert_eq!(user.username, "testuser");
    assert_eq!(user.email, "test@example.com");
    assert_eq!(user.role, UserRole::User);
    assert!(!user.is_active);
    assert_ne!(user.password_hash, "secure_password123");

    let found = repo.find_by_id(user.id).await?;
    assert!(found.is_some());
    assert_eq!(found.unwrap().id, user.id);

    let found_by_username = repo.find_by_username("testuser").await?;
    assert!(found_by_username.is_some());

    let found_by_email = repo.find_by_email("test@example.com").await?;
    assert!(found_by_email.is_some());

    let users = repo.list(10, 0).await?;
    assert_eq!(users.len(), 1);
    assert_eq!(repo.count().await?, 1);

    let updated = repo
        .update(
            user.id,
            UpdateUserRequest {
                full_name: Some("Renamed User".to_string()),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(updated.full_name, "Renamed User");
    assert!(updated.updated_at.is_some());

    repo.delete(user.id).await?;
    assert!(repo.find_by_id(user.id).await?.is_none());

    Ok(())
}

#[tokio::test]
async fn test_duplicate_username_is_rejected() -> anyhow::Result<()> {
    let pool = setup().await?;
    let repo = SqliteUserRepository::new(pool.clone());

    repo.create(new_user("taken", "first@example.com")).await?;

    // The username column is UNIQUE; a second insert fails
    let result = repo.create(new_user("taken", "second@example.com")).await;
    assert!(result.is_err());

    let result = repo.create(new_user("other", "first@example.com")).await;
    assert!(result.is_err());

    Ok(())
}

#[tokio::test]
async fn test_activation_and_active_listing() -> anyhow::Result<()> {
    let pool = setup().await?;
    let repo = SqliteUserRepository::new(pool.clone());

    let a = repo.create(new_user("a", "a@example.com")).await?;
    let b = repo.create(new_user("b", "b@example.com")).await?;
    repo.create(new_user("c", "c@example.com")).await?;

    repo.set_active(a.id, true).await?;
    repo.set_active(b.id, true).await?;
    repo.set_active(b.id, false).await?;

    let active = repo.list_active().await?;
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, a.id);

    Ok(())
}
