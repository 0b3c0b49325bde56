//! Tenant identity and credential types attached to every request.

pub mod secret;
pub mod slug;

pub use secret::*;
pub use slug::*;
