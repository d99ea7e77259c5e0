//! Message repository.

use crate::entities::message::{self, ActiveModel, Column, Entity as Message};
use campus_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, prelude::DateTimeWithTimeZone, sea_query::Expr,
};
use std::sync::Arc;

/// Repository for private message operations.
///
/// The `*_on` variants run against any connection, so a caller can put
/// several writes inside one transaction.
#[derive(Clone)]
pub struct MessageRepository {
    db: Arc<DatabaseConnection>,
}

impl MessageRepository {
    /// Create a new message repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Get reference to the database connection.
    pub fn db(&self) -> &DatabaseConnection {
        self.db.as_ref()
    }

    /// Create a new message.
    pub async fn create(&self, model: ActiveModel) -> AppResult<message::Model> {
        self.create_on(self.db.as_ref(), model).await
    }

    /// Create a new message on the given connection.
    pub async fn create_on<C>(&self, conn: &C, model: ActiveModel) -> AppResult<message::Model>
    where
        C: ConnectionTrait,
    {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Stamp `replied_at` on a message, on the given connection.
    pub async fn mark_replied_on<C>(
        &self,
        conn: &C,
        id: &str,
        at: DateTimeWithTimeZone,
    ) -> AppResult<()>
    where
        C: ConnectionTrait,
    {
        let result = Message::update_many()
            .col_expr(Column::RepliedAt, Expr::value(at))
            .filter(Column::Id.eq(id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Message not found: {id}")));
        }

        Ok(())
    }

    /// Find a message by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<message::Model>> {
        Message::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a message by ID, returning error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<message::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Message not found: {id}")))
    }

    /// Messages received by a user, newest first.
    pub async fn find_inbox(&self, user_id: &str, limit: u64) -> AppResult<Vec<message::Model>> {
        Message::find()
            .filter(Column::RecipientId.eq(user_id))
            .order_by_desc(Column::SentAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Messages sent by a user, newest first.
    pub async fn find_outbox(&self, user_id: &str, limit: u64) -> AppResult<Vec<message::Model>> {
        Message::find()
            .filter(Column::SenderId.eq(user_id))
            .order_by_desc(Column::SentAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Set `read_at` if it is still unset. Returns whether a row changed.
    pub async fn mark_read(&self, id: &str, at: DateTimeWithTimeZone) -> AppResult<bool> {
        let result = Message::update_many()
            .col_expr(Column::ReadAt, Expr::value(at))
            .filter(Column::Id.eq(id))
            .filter(Column::ReadAt.is_null())
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult, Set};

    fn create_test_message(id: &str, sender: &str, recipient: &str) -> message::Model {
        message::Model {
            id: id.to_string(),
            sender_id: sender.to_string(),
            recipient_id: recipient.to_string(),
            subject: "Hi".to_string(),
            body: "Hello".to_string(),
            parent_id: None,
            sent_at: Utc::now().into(),
            read_at: None,
            replied_at: None,
        }
    }

    #[tokio::test]
    async fn test_create() {
        let msg = create_test_message("msg1", "user1", "user2");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[msg.clone()]])
                .into_connection(),
        );

        let repo = MessageRepository::new(db);
        let model = ActiveModel {
            id: Set(msg.id.clone()),
            sender_id: Set(msg.sender_id.clone()),
            recipient_id: Set(msg.recipient_id.clone()),
            subject: Set(msg.subject.clone()),
            body: Set(msg.body.clone()),
            parent_id: Set(None),
            sent_at: Set(msg.sent_at),
            read_at: Set(None),
            replied_at: Set(None),
        };
        let created = repo.create(model).await.unwrap();

        assert_eq!(created, msg);
    }

    #[tokio::test]
    async fn test_create_maps_db_error() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_errors([DbErr::Custom("disk full".to_string())])
                .into_connection(),
        );

        let repo = MessageRepository::new(db);
        let model = ActiveModel {
            id: Set("msg1".to_string()),
            ..Default::default()
        };
        let result = repo.create(model).await;

        assert!(matches!(result, Err(AppError::Database(_))));
    }

    #[tokio::test]
    async fn test_mark_replied_missing_parent() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = MessageRepository::new(db);
        let result = repo
            .mark_replied_on(repo.db(), "missing", Utc::now().into())
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_find_inbox() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    create_test_message("msg2", "user3", "user1"),
                    create_test_message("msg1", "user2", "user1"),
                ]])
                .into_connection(),
        );

        let repo = MessageRepository::new(db);
        let inbox = repo.find_inbox("user1", 10).await.unwrap();

        assert_eq!(inbox.len(), 2);
        assert!(inbox.iter().all(|m| m.recipient_id == "user1"));
    }

    #[tokio::test]
    async fn test_mark_read_already_read() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = MessageRepository::new(db);
        let changed = repo.mark_read("msg1", Utc::now().into()).await.unwrap();

        assert!(!changed);
    }

    #[test]
    fn test_involves() {
        let msg = create_test_message("msg1", "user1", "user2");
        assert!(msg.involves("user1"));
        assert!(msg.involves("user2"));
        assert!(!msg.involves("user3"));
    }
}
