//! Content Models
//! Mission: Define the role-gated navigation and page resources

use crate::auth::models::Role;
use serde::{Deserialize, Serialize};

/// A navigation tab. `uisref` is the client-side router state the tab
/// links to; `visible_roles` is the set of roles allowed to see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tab {
    pub id: i64,
    pub title: String,
    pub uisref: String,
    #[serde(rename = "visibleRoles")]
    pub visible_roles: Vec<Role>,
}

/// A content page, gated the same way tabs are.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub id: i64,
    pub title: String,
    pub slug: String,
    #[serde(rename = "visibleRoles")]
    pub visible_roles: Vec<Role>,
}
