//! Notice repository.

use crate::entities::notice::{self, ActiveModel, Column, Entity as Notice};
use campus_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use std::sync::Arc;

/// Repository for stored message notices.
#[derive(Clone)]
pub struct NoticeRepository {
    db: Arc<DatabaseConnection>,
}

impl NoticeRepository {
    /// Create a new notice repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a new notice.
    pub async fn create(&self, model: ActiveModel) -> AppResult<notice::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Notices for a user, newest first.
    pub async fn find_by_user(&self, user_id: &str, limit: u64) -> AppResult<Vec<notice::Model>> {
        Notice::find()
            .filter(Column::UserId.eq(user_id))
            .order_by_desc(Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count unseen notices for a user.
    pub async fn count_unseen(&self, user_id: &str) -> AppResult<u64> {
        Notice::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::IsUnseen.eq(true))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::notice::NoticeLabel;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_find_by_user() {
        let notice = notice::Model {
            id: "n1".to_string(),
            user_id: "user2".to_string(),
            label: NoticeLabel::MessagesReceived,
            message_id: "msg1".to_string(),
            is_unseen: true,
            created_at: Utc::now().into(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[notice]])
                .into_connection(),
        );

        let repo = NoticeRepository::new(db);
        let found = repo.find_by_user("user2", 20).await.unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].label.as_str(), "messages_received");
    }
}
