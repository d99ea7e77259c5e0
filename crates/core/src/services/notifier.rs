//! Message notification dispatch.
//!
//! The messaging service calls a [`Notifier`] after a message row is
//! written. Backends are swappable; the stored backend keeps a notice row
//! per user so clients can poll for them.

use async_trait::async_trait;
use campus_common::{AppResult, IdGenerator};
use campus_db::{
    entities::{message, notice, notice::NoticeLabel},
    repositories::NoticeRepository,
};
use chrono::Utc;
use sea_orm::Set;
use std::sync::Arc;

/// Message events a user can be notified about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// The user sent a new message.
    Sent,
    /// The user received a new message.
    Received,
    /// The user sent a reply.
    Replied,
    /// The user received a reply.
    ReplyReceived,
}

impl NoticeKind {
    /// Sender and recipient events for a message.
    #[must_use]
    pub const fn pair(is_reply: bool) -> (Self, Self) {
        if is_reply {
            (Self::Replied, Self::ReplyReceived)
        } else {
            (Self::Sent, Self::Received)
        }
    }

    /// Stored label.
    #[must_use]
    pub const fn label(self) -> NoticeLabel {
        match self {
            Self::Sent => NoticeLabel::MessagesSent,
            Self::Received => NoticeLabel::MessagesReceived,
            Self::Replied => NoticeLabel::MessagesReplied,
            Self::ReplyReceived => NoticeLabel::MessagesReplyReceived,
        }
    }
}

/// Delivers message events to users.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Notify `users` that `kind` happened to `message`.
    async fn send(
        &self,
        users: &[String],
        kind: NoticeKind,
        message: &message::Model,
    ) -> AppResult<()>;
}

/// Accepts every event and drops it.
#[derive(Clone, Default)]
pub struct NoOpNotifier;

#[async_trait]
impl Notifier for NoOpNotifier {
    async fn send(
        &self,
        _users: &[String],
        _kind: NoticeKind,
        _message: &message::Model,
    ) -> AppResult<()> {
        Ok(())
    }
}

/// Writes one notice row per user and event.
#[derive(Clone)]
pub struct StoredNotifier {
    notice_repo: NoticeRepository,
    id_gen: IdGenerator,
}

impl StoredNotifier {
    /// Create a new stored notifier.
    #[must_use]
    pub const fn new(notice_repo: NoticeRepository) -> Self {
        Self {
            notice_repo,
            id_gen: IdGenerator::new(),
        }
    }
}

#[async_trait]
impl Notifier for StoredNotifier {
    async fn send(
        &self,
        users: &[String],
        kind: NoticeKind,
        message: &message::Model,
    ) -> AppResult<()> {
        for user_id in users {
            let model = notice::ActiveModel {
                id: Set(self.id_gen.generate()),
                user_id: Set(user_id.clone()),
                label: Set(kind.label()),
                message_id: Set(message.id.clone()),
                is_unseen: Set(true),
                created_at: Set(Utc::now().into()),
            };
            self.notice_repo.create(model).await?;
        }

        tracing::debug!(
            message_id = %message.id,
            label = kind.label().as_str(),
            count = users.len(),
            "Stored message notices"
        );
        Ok(())
    }
}

/// Wrapper for boxed Notifier trait object.
pub type NotifierService = Arc<dyn Notifier>;
