//! Business logic services.

#![allow(missing_docs)]

pub mod forms;
pub mod messaging;
pub mod notice;
pub mod notifier;
pub mod recipient;
pub mod user;

pub use forms::{CleanedCompose, ComposeForm, ComposeGroupForm, MessageDraft, RecipientFilter};
pub use messaging::MessagingService;
pub use notice::NoticeService;
pub use notifier::{NoOpNotifier, NoticeKind, Notifier, NotifierService, StoredNotifier};
pub use recipient::{GroupKind, RecipientResolver, RecipientSpec};
pub use user::UserService;
