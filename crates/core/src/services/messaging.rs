//! Messaging service for private messages.

use crate::services::{
    forms::MessageDraft,
    notifier::{NoticeKind, NotifierService},
    recipient::{RecipientResolver, RecipientSpec},
};
use campus_common::{AppError, AppResult, FanOutPolicy, IdGenerator, config::MessagingConfig};
use campus_db::{
    entities::message,
    repositories::{MessageRepository, OfferingRepository},
};
use chrono::Utc;
use sea_orm::{ConnectionTrait, Set, TransactionTrait, prelude::DateTimeWithTimeZone};
use tracing::{debug, info};
use validator::Validate;

/// Messaging service.
///
/// `compose` writes one message row per resolved recipient. With a parent,
/// each row is a reply and the parent gets its `replied_at` stamped.
#[derive(Clone)]
pub struct MessagingService {
    message_repo: MessageRepository,
    resolver: RecipientResolver,
    notifier: Option<NotifierService>,
    policy: FanOutPolicy,
    page_limit: u64,
    id_gen: IdGenerator,
}

impl MessagingService {
    /// Create a new messaging service.
    ///
    /// With `notifier` set to `None` every notification is skipped.
    #[must_use]
    pub const fn new(
        message_repo: MessageRepository,
        offering_repo: OfferingRepository,
        notifier: Option<NotifierService>,
        config: &MessagingConfig,
    ) -> Self {
        Self {
            message_repo,
            resolver: RecipientResolver::new(offering_repo),
            notifier,
            policy: config.fan_out,
            page_limit: config.inbox_limit,
            id_gen: IdGenerator::new(),
        }
    }

    /// Compose a message to every recipient in `recipients`.
    ///
    /// Returns the created messages in resolution order. An empty recipient
    /// set writes nothing and returns an empty list.
    pub async fn compose(
        &self,
        sender_id: &str,
        recipients: &RecipientSpec,
        draft: &MessageDraft,
        mut parent: Option<&mut message::Model>,
    ) -> AppResult<Vec<message::Model>> {
        draft.validate()?;

        let recipient_ids = self.resolver.resolve(recipients).await?;
        if recipient_ids.is_empty() {
            info!(sender = %sender_id, "No recipients resolved, nothing to send");
            return Ok(vec![]);
        }

        let now: DateTimeWithTimeZone = Utc::now().into();
        let parent_id = parent.as_deref().map(|p| p.id.clone());

        let messages = match self.policy {
            FanOutPolicy::BestEffort => {
                self.fan_out_best_effort(
                    sender_id,
                    &recipient_ids,
                    draft,
                    parent.as_deref_mut(),
                    now,
                )
                .await?
            }
            FanOutPolicy::Atomic => {
                self.fan_out_atomic(sender_id, &recipient_ids, draft, parent.as_deref_mut(), now)
                    .await?
            }
        };

        info!(
            sender = %sender_id,
            count = messages.len(),
            parent = ?parent_id,
            "Messages composed"
        );

        Ok(messages)
    }

    /// Write and notify row by row. A failure leaves earlier rows in place.
    async fn fan_out_best_effort(
        &self,
        sender_id: &str,
        recipient_ids: &[String],
        draft: &MessageDraft,
        parent: Option<&mut message::Model>,
        now: DateTimeWithTimeZone,
    ) -> AppResult<Vec<message::Model>> {
        let conn = self.message_repo.db();
        let is_reply = parent.is_some();
        let parent_id = match parent {
            Some(p) => {
                self.message_repo.mark_replied_on(conn, &p.id, now).await?;
                p.replied_at = Some(now);
                Some(p.id.clone())
            }
            None => None,
        };

        let mut created = Vec::with_capacity(recipient_ids.len());
        for recipient_id in recipient_ids {
            let model = self.build(sender_id, recipient_id, draft, parent_id.as_deref(), now);
            let message = self.message_repo.create_on(conn, model).await?;
            self.notify(&message, is_reply).await;
            created.push(message);
        }

        Ok(created)
    }

    /// Write every row in one transaction, then notify after commit.
    async fn fan_out_atomic(
        &self,
        sender_id: &str,
        recipient_ids: &[String],
        draft: &MessageDraft,
        parent: Option<&mut message::Model>,
        now: DateTimeWithTimeZone,
    ) -> AppResult<Vec<message::Model>> {
        let txn = self
            .message_repo
            .db()
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let parent_id = parent.as_deref().map(|p| p.id.clone());
        let written = self
            .write_rows(&txn, sender_id, recipient_ids, draft, parent_id.as_deref(), now)
            .await;

        let created = match written {
            Ok(created) => created,
            Err(e) => {
                if let Err(rollback) = txn.rollback().await {
                    tracing::warn!(error = %rollback, "Fan-out rollback failed");
                }
                return Err(e);
            }
        };

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        debug!(count = created.len(), "Fan-out transaction committed");

        if let Some(p) = parent {
            p.replied_at = Some(now);
        }
        for message in &created {
            self.notify(message, parent_id.is_some()).await;
        }

        Ok(created)
    }

    /// Stamp the parent, then insert one row per recipient on `conn`.
    async fn write_rows<C>(
        &self,
        conn: &C,
        sender_id: &str,
        recipient_ids: &[String],
        draft: &MessageDraft,
        parent_id: Option<&str>,
        now: DateTimeWithTimeZone,
    ) -> AppResult<Vec<message::Model>>
    where
        C: ConnectionTrait,
    {
        if let Some(id) = parent_id {
            self.message_repo.mark_replied_on(conn, id, now).await?;
        }

        let mut created = Vec::with_capacity(recipient_ids.len());
        for recipient_id in recipient_ids {
            let model = self.build(sender_id, recipient_id, draft, parent_id, now);
            created.push(self.message_repo.create_on(conn, model).await?);
        }
        Ok(created)
    }

    fn build(
        &self,
        sender_id: &str,
        recipient_id: &str,
        draft: &MessageDraft,
        parent_id: Option<&str>,
        now: DateTimeWithTimeZone,
    ) -> message::ActiveModel {
        message::ActiveModel {
            id: Set(self.id_gen.generate()),
            sender_id: Set(sender_id.to_string()),
            recipient_id: Set(recipient_id.to_string()),
            subject: Set(draft.subject.clone()),
            body: Set(draft.body.clone()),
            parent_id: Set(parent_id.map(str::to_string)),
            sent_at: Set(now),
            read_at: Set(None),
            replied_at: Set(None),
        }
    }

    /// Send the sender/recipient pair for one message. Failures are logged.
    async fn notify(&self, message: &message::Model, is_reply: bool) {
        let Some(ref notifier) = self.notifier else {
            return;
        };

        let (to_sender, to_recipient) = NoticeKind::pair(is_reply);
        let deliveries = [
            (message.sender_id.clone(), to_sender),
            (message.recipient_id.clone(), to_recipient),
        ];
        for (user_id, kind) in deliveries {
            if let Err(e) = notifier.send(&[user_id], kind, message).await {
                tracing::warn!(
                    error = %e,
                    message_id = %message.id,
                    kind = ?kind,
                    "Failed to send message notification"
                );
            }
        }
    }

    /// Get a message by ID.
    pub async fn get_message(&self, id: &str) -> AppResult<message::Model> {
        self.message_repo.get_by_id(id).await
    }

    /// Open a message as `user_id`, marking it read for the recipient.
    pub async fn open_message(&self, user_id: &str, id: &str) -> AppResult<message::Model> {
        let mut message = self.get_message(id).await?;

        if !message.involves(user_id) {
            return Err(AppError::Forbidden(
                "Not a participant of this message".to_string(),
            ));
        }

        if message.recipient_id == user_id && message.read_at.is_none() {
            let now: DateTimeWithTimeZone = Utc::now().into();
            if self.message_repo.mark_read(id, now).await? {
                message.read_at = Some(now);
            }
        }

        Ok(message)
    }

    /// Load the message `user_id` wants to reply to.
    pub async fn reply_parent(&self, user_id: &str, parent_id: &str) -> AppResult<message::Model> {
        let parent = self.get_message(parent_id).await?;

        if !parent.involves(user_id) {
            return Err(AppError::Forbidden(
                "Cannot reply to a message you are not part of".to_string(),
            ));
        }

        Ok(parent)
    }

    /// Messages received by a user, newest first.
    pub async fn inbox(&self, user_id: &str, limit: u64) -> AppResult<Vec<message::Model>> {
        self.message_repo
            .find_inbox(user_id, self.page_size(limit))
            .await
    }

    /// Messages sent by a user, newest first.
    pub async fn outbox(&self, user_id: &str, limit: u64) -> AppResult<Vec<message::Model>> {
        self.message_repo
            .find_outbox(user_id, self.page_size(limit))
            .await
    }

    /// Requested page size bounded to `1..=page_limit`. A zero limit in
    /// config still allows one row per page.
    const fn page_size(&self, limit: u64) -> u64 {
        let max = if self.page_limit == 0 { 1 } else { self.page_limit };
        if limit == 0 {
            1
        } else if limit > max {
            max
        } else {
            limit
        }
    }
}
