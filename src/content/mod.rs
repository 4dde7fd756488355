//! Role-gated content: navigation tabs and pages.

pub mod api;
pub mod models;
pub mod store;
pub mod visibility;

pub use models::{Page, Tab};
pub use store::ContentStore;
pub use visibility::{caller_roles, filter_visible, RoleGated};
