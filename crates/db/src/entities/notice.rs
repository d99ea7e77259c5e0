//! Stored notice entity, one row per notified user and message event.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Message event labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum NoticeLabel {
    #[sea_orm(string_value = "messages_sent")]
    #[serde(rename = "messages_sent")]
    MessagesSent,
    #[sea_orm(string_value = "messages_received")]
    #[serde(rename = "messages_received")]
    MessagesReceived,
    #[sea_orm(string_value = "messages_replied")]
    #[serde(rename = "messages_replied")]
    MessagesReplied,
    #[sea_orm(string_value = "messages_reply_received")]
    #[serde(rename = "messages_reply_received")]
    MessagesReplyReceived,
}

impl NoticeLabel {
    /// Wire name of the label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MessagesSent => "messages_sent",
            Self::MessagesReceived => "messages_received",
            Self::MessagesReplied => "messages_replied",
            Self::MessagesReplyReceived => "messages_reply_received",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notice")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The user being notified
    #[sea_orm(indexed)]
    pub user_id: String,

    pub label: NoticeLabel,

    #[sea_orm(indexed)]
    pub message_id: String,

    #[sea_orm(default_value = true)]
    pub is_unseen: bool,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,

    #[sea_orm(
        belongs_to = "super::message::Entity",
        from = "Column::MessageId",
        to = "super::message::Column::Id",
        on_delete = "Cascade"
    )]
    Message,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::message::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Message.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
