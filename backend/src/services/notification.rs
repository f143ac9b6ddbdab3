//! In-app notification service
//!
//! Notifications are created when a request changes hands (assignment,
//! completion, cancellation) and read back by the front-end's periodic
//! poll. Marking read is idempotent.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::Notification;

/// Notification service for managing in-app notifications
#[derive(Clone)]
pub struct NotificationService {
    db: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct NotificationRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    message: String,
    request_id: Option<Uuid>,
    read: bool,
    read_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        Notification {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            message: row.message,
            request_id: row.request_id,
            read: row.read,
            read_at: row.read_at,
            created_at: row.created_at,
        }
    }
}

/// A user's notifications plus the unread count the badge needs
#[derive(Debug, serde::Serialize)]
pub struct NotificationList {
    pub notifications: Vec<Notification>,
    pub unread: i64,
}

impl NotificationService {
    /// Create a new NotificationService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Get all notifications for a user, newest first
    pub async fn get_notifications(&self, user_id: Uuid) -> AppResult<NotificationList> {
        let rows = sqlx::query_as::<_, NotificationRow>(
            r#"
            SELECT id, user_id, title, message, request_id, read, read_at, created_at
            FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        let unread = rows.iter().filter(|r| !r.read).count() as i64;

        Ok(NotificationList {
            notifications: rows.into_iter().map(Notification::from).collect(),
            unread,
        })
    }

    /// Mark one notification as read
    pub async fn mark_read(&self, user_id: Uuid, notification_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE notifications
            SET read = TRUE, read_at = COALESCE(read_at, now())
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(notification_id)
        .bind(user_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Notification".to_string()));
        }
        Ok(())
    }

    /// Mark every notification of a user as read
    pub async fn mark_all_read(&self, user_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE notifications
            SET read = TRUE, read_at = COALESCE(read_at, now())
            WHERE user_id = $1 AND read = FALSE
            "#,
        )
        .bind(user_id)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected())
    }

    /// Create a notification for a user
    pub async fn notify(
        &self,
        user_id: Uuid,
        title: &str,
        message: &str,
        request_id: Option<Uuid>,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO notifications (user_id, title, message, request_id)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(user_id)
        .bind(title)
        .bind(message)
        .bind(request_id)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// Notify the user behind a farmer profile, if the profile has one.
    ///
    /// A farmer without a linked account is not an error; the notification
    /// is simply skipped.
    pub async fn notify_farmer(
        &self,
        farmer_id: Uuid,
        title: &str,
        message: &str,
        request_id: Option<Uuid>,
    ) -> AppResult<()> {
        let user_id =
            sqlx::query_scalar::<_, Option<Uuid>>("SELECT user_id FROM farmers WHERE id = $1")
                .bind(farmer_id)
                .fetch_optional(&self.db)
                .await?
                .flatten();

        if let Some(user_id) = user_id {
            self.notify(user_id, title, message, request_id).await?;
        }
        Ok(())
    }

    /// Notify the user behind a staff profile, if the profile has one
    pub async fn notify_staff(
        &self,
        staff_id: Uuid,
        title: &str,
        message: &str,
        request_id: Option<Uuid>,
    ) -> AppResult<()> {
        let user_id = sqlx::query_scalar::<_, Option<Uuid>>(
            "SELECT user_id FROM staff_members WHERE id = $1",
        )
        .bind(staff_id)
        .fetch_optional(&self.db)
        .await?
        .flatten();

        if let Some(user_id) = user_id {
            self.notify(user_id, title, message, request_id).await?;
        }
        Ok(())
    }
}
