//! Notice service.

use campus_common::AppResult;
use campus_db::{entities::notice, repositories::NoticeRepository};

/// Reads the stored message notices of a user.
#[derive(Clone)]
pub struct NoticeService {
    notice_repo: NoticeRepository,
    page_limit: u64,
}

impl NoticeService {
    /// Create a new notice service.
    #[must_use]
    pub const fn new(notice_repo: NoticeRepository, page_limit: u64) -> Self {
        Self {
            notice_repo,
            page_limit,
        }
    }

    /// Notices for a user, newest first.
    pub async fn list(&self, user_id: &str, limit: u64) -> AppResult<Vec<notice::Model>> {
        self.notice_repo
            .find_by_user(user_id, limit.max(1).min(self.page_limit.max(1)))
            .await
    }

    /// Number of notices the user has not seen yet.
    pub async fn unseen_count(&self, user_id: &str) -> AppResult<u64> {
        self.notice_repo.count_unseen(user_id).await
    }
}
