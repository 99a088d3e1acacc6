//! Access Model
//!
//! The authenticated [`Actor`] supplied by the upstream identity gateway and
//! the [`AccessChecker`] port deciding whether an actor may mutate an
//! application's directories.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Authenticated caller of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl Actor {
    pub fn new(id: impl Into<String>, roles: Vec<String>) -> Self {
        Self {
            id: id.into(),
            roles,
        }
    }

    /// True when `allowed` is empty (unrestricted) or shares a role with the actor.
    pub fn has_any_role(&self, allowed: &[String]) -> bool {
        allowed.is_empty() || allowed.iter().any(|role| self.roles.contains(role))
    }

    /// Fail with `Forbidden` unless the actor holds one of `allowed`.
    pub fn verify_roles(&self, allowed: &[String], what: &str) -> Result<(), ApiError> {
        if self.has_any_role(allowed) {
            Ok(())
        } else {
            Err(ApiError::Forbidden(format!(
                "actor {} lacks a role permitted to {}",
                self.id, what
            )))
        }
    }
}

/// Authorization collaborator: may `actor_id` act on `application_id`?
pub trait AccessChecker: Send + Sync {
    fn check_access(&self, application_id: &str, actor_id: &str) -> bool;
}

/// How the configured policy decides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessMode {
    /// Every authenticated actor may act on every application.
    #[default]
    Open,
    /// Only actors listed under the application in `grants`.
    Grants,
}

/// `[access]` section of the config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessConfig {
    #[serde(default)]
    pub mode: AccessMode,

    /// application id -> actor ids
    #[serde(default)]
    pub grants: HashMap<String, Vec<String>>,
}

/// Access policy driven by [`AccessConfig`].
#[derive(Debug, Clone, Default)]
pub struct ConfigAccessPolicy {
    config: AccessConfig,
}

impl ConfigAccessPolicy {
    pub fn new(config: AccessConfig) -> Self {
        Self { config }
    }

    /// Policy that lets every actor through.
    pub fn open() -> Self {
        Self::default()
    }
}

impl AccessChecker for ConfigAccessPolicy {
    fn check_access(&self, application_id: &str, actor_id: &str) -> bool {
        match self.config.mode {
            AccessMode::Open => true,
            AccessMode::Grants => self
                .config
                .grants
                .get(application_id)
                .map(|actors| actors.iter().any(|a| a == actor_id))
                .unwrap_or(false),
        }
    }
}

/// Fail with `Forbidden` when the checker denies the actor.
pub fn ensure_access(
    checker: &dyn AccessChecker,
    application_id: &str,
    actor: &Actor,
) -> Result<(), ApiError> {
    if checker.check_access(application_id, &actor.id) {
        Ok(())
    } else {
        tracing::warn!(application_id, actor_id = %actor.id, "access denied");
        Err(ApiError::Forbidden(format!(
            "actor {} has no access to application {}",
            actor.id, application_id
        )))
    }
}
