use std::sync::Arc;

use bulletin::{
    domain::{CreateUserRequest, NotificationKind, User, UserRole},
    repository::{
        NotificationRepository, SqliteNotificationRepository, SqliteUserRepository, UserRepository,
    },
    service::NotificationService,
};
use sqlx::SqlitePool;

struct Fixture {
    user_repo: Arc<SqliteUserRepository>,
    notification_repo: Arc<SqliteNotificationRepository>,
    service: NotificationService,
}

async fn setup() -> anyhow::Result<Fixture> {
    let pool = SqlitePool::connect(":memory:").await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await?;

    let user_repo = Arc::new(SqliteUserRepository::new(pool.clone()));
    let notification_repo = Arc::new(SqliteNotificationRepository::new(pool.clone()));
    let service = NotificationService::new(notification_repo.clone(), user_repo.clone());

    Ok(Fixture {
        user_repo,
        notification_repo,
        service,
    })
}

async fn create_user(fixture: &Fixture, username: &str, active: bool) -> anyhow::Result<User> {
    let user = fixture
        .user_repo
        .create(CreateUserRequest {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password: "secure_password123".to_string(),
            full_name: format!("User {}", username),
            role: UserRole::User,
            is_active: active,
        })
        .await?;

    Ok(user)
}

#[tokio::test]
async fn test_broadcast_reaches_every_active_user_except_actor() -> anyhow::Result<()> {
    let fixture = setup().await?;

    let actor = create_user(&fixture, "actor", true).await?;
    let mut others = Vec::new();
    for i in 0..5 {
        others.push(create_user(&fixture, &format!("user{}", i), true).await?);
    }
    // Inactive users never receive broadcasts
    let inactive = create_user(&fixture, "inactive", false).await?;

    let created = fixture
        .service
        .broadcast(
            NotificationKind::NewAnnouncement,
            "New announcement: Q1 Plan",
            "Actor posted a new announcement",
            Some(42),
            Some(actor.id),
        )
        .await?;

    assert_eq!(created, 5);

    for user in &others {
        let notifications = fixture.service.get_notifications(user.id, false, 20, 0).await?;
        assert_eq!(notifications.len(), 1);
        let n = &notifications[0];
        assert_eq!(n.kind, NotificationKind::NewAnnouncement);
        assert_eq!(n.title, "New announcement: Q1 Plan");
        assert_eq!(n.content, "Actor posted a new announcement");
        assert_eq!(n.related_id, Some(42));
        assert!(!n.is_read);
    }

    assert_eq!(fixture.service.get_unread_count(actor.id).await?, 0);
    assert_eq!(fixture.service.get_unread_count(inactive.id).await?, 0);

    Ok(())
}

#[tokio::test]
async fn test_broadcast_twice_duplicates() -> anyhow::Result<()> {
    let fixture = setup().await?;

    create_user(&fixture, "actor", true).await?;
    let recipient = create_user(&fixture, "recipient", true).await?;

    for _ in 0..2 {
        fixture
            .service
            .broadcast(NotificationKind::System, "Maintenance", "Back at 5pm", None, None)
            .await?;
    }

    // No idempotency key: each call inserts its own rows
    assert_eq!(fixture.service.get_unread_count(recipient.id).await?, 2);

    Ok(())
}

#[tokio::test]
async fn test_send_targets_a_single_user() -> anyhow::Result<()> {
    let fixture = setup().await?;

    let user = create_user(&fixture, "user", true).await?;
    let other = create_user(&fixture, "other", true).await?;

    let notification = fixture
        .service
        .send(user.id, NotificationKind::System, "Hello", "Just you", None)
        .await?;

    assert_eq!(notification.user_id, user.id);
    assert_eq!(fixture.service.get_unread_count(user.id).await?, 1);
    assert_eq!(fixture.service.get_unread_count(other.id).await?, 0);

    Ok(())
}

#[tokio::test]
async fn test_read_state_transitions() -> anyhow::Result<()> {
    let fixture = setup().await?;

    let user = create_user(&fixture, "reader", true).await?;

    for i in 0..3 {
        fixture
            .service
            .send(user.id, NotificationKind::System, &format!("n{}", i), "body", None)
            .await?;
    }

    assert_eq!(fixture.service.get_unread_count(user.id).await?, 3);

    let unread = fixture.service.get_notifications(user.id, true, 20, 0).await?;
    assert_eq!(unread.len(), 3);

    // Marking one succeeds, marking it again still reports success
    assert!(fixture.service.mark_as_read(unread[0].id).await?);
    assert!(fixture.service.mark_as_read(unread[0].id).await?);
    assert_eq!(fixture.service.get_unread_count(user.id).await?, 2);

    // A missing notification is the only false
    assert!(!fixture.service.mark_as_read(999_999).await?);

    assert_eq!(fixture.service.mark_all_as_read(user.id).await?, 2);
    assert_eq!(fixture.service.get_unread_count(user.id).await?, 0);
    assert_eq!(fixture.service.mark_all_as_read(user.id).await?, 0);

    Ok(())
}

#[tokio::test]
async fn test_delete_notification() -> anyhow::Result<()> {
    let fixture = setup().await?;

    let user = create_user(&fixture, "owner", true).await?;
    let notification = fixture
        .service
        .send(user.id, NotificationKind::System, "bye", "soon gone", None)
        .await?;

    assert!(fixture.service.delete_notification(notification.id).await?);
    assert!(!fixture.service.delete_notification(notification.id).await?);
    assert!(fixture
        .notification_repo
        .find_by_id(notification.id)
        .await?
        .is_none());

    Ok(())
}

#[tokio::test]
async fn test_delete_old_notifications() -> anyhow::Result<()> {
    let fixture = setup().await?;

    let user = create_user(&fixture, "hoarder", true).await?;
    fixture
        .service
        .send(user.id, NotificationKind::System, "old", "one", None)
        .await?;
    fixture
        .service
        .send(user.id, NotificationKind::System, "old", "two", None)
        .await?;

    // Nothing is 30 days old yet
    assert_eq!(fixture.service.delete_old_notifications(30).await?, 0);

    // A zero-day cutoff purges everything created before this instant
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    assert_eq!(fixture.service.delete_old_notifications(0).await?, 2);
    assert_eq!(fixture.service.get_unread_count(user.id).await?, 0);

    Ok(())
}
