//! Identity context and authorization guard

pub mod guard;
pub mod identity;

pub use guard::{authorize_create, authorize_integration, authorize_list, authorize_read};
pub use identity::Identity;
