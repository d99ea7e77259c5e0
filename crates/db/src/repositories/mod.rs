//! Repositories wrapping sea-orm queries.

mod message;
mod notice;
mod offering;
mod user;

pub use message::MessageRepository;
pub use notice::NoticeRepository;
pub use offering::OfferingRepository;
pub use user::UserRepository;
