//! Actor facts for capability checks.
//!
//! Identity management is external to this system. Requests arrive with the
//! acting user's id, capabilities and roles already resolved; this module
//! extracts them and answers yes/no capability questions. Nothing else in the
//! codebase talks to an auth subsystem.

use async_trait::async_trait;
use axum::http::request::Parts;
use axum::{extract::FromRequestParts, http::HeaderMap};
use std::collections::HashSet;
use uuid::Uuid;

use crate::errors::ApiError;

pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_CAPABILITIES_HEADER: &str = "x-actor-capabilities";
pub const ACTOR_ROLES_HEADER: &str = "x-actor-roles";

/// Capability name constants, one per guarded action per document type.
pub mod consts {
    pub const CASHBOOKS_APPROVE1: &str = "cashbooks:approve1";
    pub const CASHBOOKS_SUSPEND: &str = "cashbooks:suspend";

    pub const INDENTS_APPROVE1: &str = "indents:approve1";
    pub const INDENTS_APPROVE2: &str = "indents:approve2";
    pub const INDENTS_COMPLETE: &str = "indents:complete";
    pub const INDENTS_SUSPEND: &str = "indents:suspend";

    pub const PURCHASE_ORDERS_APPROVE1: &str = "purchase-orders:approve1";
    pub const PURCHASE_ORDERS_APPROVE2: &str = "purchase-orders:approve2";
    pub const PURCHASE_ORDERS_COMPLETE: &str = "purchase-orders:complete";
    pub const PURCHASE_ORDERS_SUSPEND: &str = "purchase-orders:suspend";
}

/// Role name constants.
pub mod roles {
    /// Head-office users holding level-2 capability get purchase orders
    /// auto-escalated past level 1.
    pub const HEAD_OFFICE: &str = "head-office";
}

/// The acting user, with resolved capability and role facts.
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: Uuid,
    capabilities: HashSet<String>,
    roles: HashSet<String>,
}

impl Actor {
    pub fn new(
        id: Uuid,
        capabilities: impl IntoIterator<Item = String>,
        roles: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            id,
            capabilities: capabilities.into_iter().collect(),
            roles: roles.into_iter().collect(),
        }
    }

    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities.contains(capability)
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

fn split_header(headers: &HeaderMap, name: &str) -> Vec<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| {
            v.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(ACTOR_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing X-Actor-Id header".to_string()))?;
        let id = Uuid::parse_str(id)
            .map_err(|_| ApiError::Unauthorized("X-Actor-Id is not a valid UUID".to_string()))?;

        let capabilities = split_header(&parts.headers, ACTOR_CAPABILITIES_HEADER);
        let roles = split_header(&parts.headers, ACTOR_ROLES_HEADER);

        Ok(Actor::new(id, capabilities, roles))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_and_role_lookup() {
        let actor = Actor::new(
            Uuid::new_v4(),
            vec![consts::INDENTS_APPROVE1.to_string()],
            vec![roles::HEAD_OFFICE.to_string()],
        );
        assert!(actor.has_capability(consts::INDENTS_APPROVE1));
        assert!(!actor.has_capability(consts::INDENTS_APPROVE2));
        assert!(actor.has_role(roles::HEAD_OFFICE));
    }
}
