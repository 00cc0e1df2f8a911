use pawhaven_backend::entities::notifications::NotificationKind;
use pawhaven_backend::errors::domain::{DomainError, NotFoundKind};
use pawhaven_backend::services::notifications;
use pawhaven_backend::AppError;

use crate::support::build_test_env;
use crate::support::factory;

#[tokio::test]
async fn inbox_read_flow() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let user = factory::seeker(env.db()).await?;

    for n in 0..3 {
        notifications::notify(
            env.db(),
            user.id(),
            NotificationKind::ApplicationStatusChanged,
            "Application updated",
            format!("Update {n}"),
            None,
        )
        .await?;
    }
    assert_eq!(notifications::unread_count(env.db(), user.id()).await?, 3);

    let inbox = notifications::list(env.db(), user.id(), false).await?;
    assert_eq!(inbox.len(), 3);
    assert_eq!(inbox[0].body, "Update 2", "newest first");

    let read = notifications::mark_read(env.db(), user.id(), inbox[0].id).await?;
    assert!(read.read_at.is_some());
    // Marking twice is harmless
    notifications::mark_read(env.db(), user.id(), inbox[0].id).await?;
    assert_eq!(notifications::unread_count(env.db(), user.id()).await?, 2);
    assert_eq!(notifications::list(env.db(), user.id(), true).await?.len(), 2);

    assert_eq!(notifications::mark_all_read(env.db(), user.id()).await?, 2);
    assert_eq!(notifications::unread_count(env.db(), user.id()).await?, 0);
    assert_eq!(notifications::mark_all_read(env.db(), user.id()).await?, 0);
    Ok(())
}

#[tokio::test]
async fn notifications_are_private() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let owner = factory::seeker(env.db()).await?;
    let other = factory::seeker(env.db()).await?;

    notifications::notify(
        env.db(),
        owner.id(),
        NotificationKind::PaymentFailed,
        "Payment failed",
        "Try again",
        Some("/applications/1".to_string()),
    )
    .await?;
    let id = notifications::list(env.db(), owner.id(), false).await?[0].id;

    let err = notifications::mark_read(env.db(), other.id(), id).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound(NotFoundKind::Notification, _)));
    assert!(notifications::list(env.db(), other.id(), false).await?.is_empty());
    assert_eq!(notifications::mark_all_read(env.db(), other.id()).await?, 0);
    assert_eq!(notifications::unread_count(env.db(), owner.id()).await?, 1);
    Ok(())
}
