//! Resource Visibility Resolver
//! Mission: Filter role-gated resources down to what a caller may see

use crate::auth::models::Role;
use crate::content::models::{Page, Tab};
use std::collections::HashSet;

/// Anything whose visibility is decided by an allowed-roles set.
pub trait RoleGated {
    fn allowed_roles(&self) -> &[Role];
}

impl RoleGated for Tab {
    fn allowed_roles(&self) -> &[Role] {
        &self.visible_roles
    }
}

impl RoleGated for Page {
    fn allowed_roles(&self) -> &[Role] {
        &self.visible_roles
    }
}

/// Keep the resources whose allowed-roles set intersects the caller's
/// roles. Stable: input order is preserved. An empty caller set sees
/// nothing, since no resource can intersect it.
pub fn filter_visible<T: RoleGated>(resources: Vec<T>, caller_roles: &HashSet<Role>) -> Vec<T> {
    resources
        .into_iter()
        .filter(|resource| {
            resource
                .allowed_roles()
                .iter()
                .any(|role| caller_roles.contains(role))
        })
        .collect()
}

/// The role set a caller resolves to: the token's roles when
/// authenticated, otherwise just `public`.
pub fn caller_roles(claims_roles: Option<&[Role]>) -> HashSet<Role> {
    match claims_roles {
        Some(roles) => roles.iter().cloned().collect(),
        None => HashSet::from([Role::public()]),
    }
}
