//! Database entities.

#![allow(missing_docs)]

pub mod message;
pub mod notice;
pub mod offering;
pub mod offering_student;
pub mod user;

pub use message::Entity as Message;
pub use notice::Entity as Notice;
pub use offering::Entity as Offering;
pub use offering_student::Entity as OfferingStudent;
pub use user::Entity as User;
