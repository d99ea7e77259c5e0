//! Private message entity.
//!
//! Every row has exactly one sender and one recipient; group sends are
//! stored as one row per resolved recipient.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Maximum subject length, in characters.
pub const SUBJECT_MAX_LEN: u64 = 120;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "message")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Sender user ID
    #[sea_orm(indexed)]
    pub sender_id: String,

    /// Recipient user ID
    #[sea_orm(indexed)]
    pub recipient_id: String,

    pub subject: String,

    #[sea_orm(column_type = "Text")]
    pub body: String,

    /// Message this one replies to
    #[sea_orm(nullable, indexed)]
    pub parent_id: Option<String>,

    pub sent_at: DateTimeWithTimeZone,

    /// Set when the recipient first opens the message
    #[sea_orm(nullable)]
    pub read_at: Option<DateTimeWithTimeZone>,

    /// Set on the parent whenever a reply to it is created
    #[sea_orm(nullable)]
    pub replied_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// Whether `user_id` sent or received this message.
    #[must_use]
    pub fn involves(&self, user_id: &str) -> bool {
        self.sender_id == user_id || self.recipient_id == user_id
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::SenderId",
        to = "super::user::Column::Id"
    )]
    Sender,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::RecipientId",
        to = "super::user::Column::Id"
    )]
    Recipient,

    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentId",
        to = "Column::Id"
    )]
    Parent,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sender.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
