//! The `Acl` registry: entities addressed by ID, loaded from TOML or built
//! programmatically, with every authorization decision recorded.
//!
//! Resolution for `is_allowed(entity_id, action, resource, ..)`:
//!
//! 1. Look the entity up by case-insensitive ID. Unknown entities are denied.
//! 2. Delegate to `Entity::is_allowed`: own permissions first (first match
//!    wins), inherited permissions only if no own permission matched.
//! 3. Append a `DecisionRecord` to the decision trail.

use std::path::Path;

use serde_json::Value;
use tracing::{debug, info, warn};

use trellis_contracts::{AclError, AclResult, Assertion, GenericPermission, Permission};
use trellis_core::{Entity, EntityCollection};

use crate::audit::{DecisionRecord, DecisionTrail};
use crate::config::AclConfig;

/// A registry of entities using `GenericPermission`.
///
/// ```rust,ignore
/// use trellis_policy::Acl;
///
/// let mut acl = Acl::from_file(Path::new("acl/example.toml"))?;
/// assert!(acl.is_allowed("alice", "read", "wiki", None, &[]));
/// ```
#[derive(Debug, Default)]
pub struct Acl {
    entities: EntityCollection<GenericPermission>,
    trail: DecisionTrail,
}

impl Acl {
    /// Create an empty registry with an empty decision trail.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `s` as TOML and build an `Acl`.
    ///
    /// Returns `AclError::ConfigError` if the TOML is malformed or does not
    /// match the `AclConfig` schema.
    pub fn from_toml_str(s: &str) -> AclResult<Self> {
        let config: AclConfig = toml::from_str(s).map_err(|e| AclError::ConfigError {
            reason: format!("failed to parse ACL TOML: {}", e),
        })?;
        Self::from_config(&config)
    }

    /// Read the file at `path` and parse it as a TOML ACL document.
    pub fn from_file(path: &Path) -> AclResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| AclError::ConfigError {
            reason: format!("failed to read ACL file '{}': {}", path.display(), e),
        })?;
        let acl = Self::from_toml_str(&contents)?;
        info!(
            path = %path.display(),
            entity_count = acl.entities.len(),
            "ACL file loaded"
        );
        Ok(acl)
    }

    /// Build an `Acl` from an already-parsed configuration.
    ///
    /// Entities and their permissions are registered first; parent links are
    /// made in a second pass. A parent ID that names no declared entity is a
    /// `ConfigError`; a cyclic declaration is a `CycleViolation`.
    pub fn from_config(config: &AclConfig) -> AclResult<Self> {
        let mut acl = Self::new();

        for decl in &config.entities {
            let entity = acl.add_entity(&decl.id);
            for perm in &decl.permissions {
                entity.add_permission(perm.to_permission());
            }
        }

        for decl in &config.entities {
            for parent_id in &decl.parents {
                let parent = acl.get_entity(parent_id).ok_or_else(|| AclError::ConfigError {
                    reason: format!("entity '{}' lists unknown parent '{}'", decl.id, parent_id),
                })?;
                let child = acl.get_entity(&decl.id).ok_or_else(|| AclError::EntityNotFound {
                    id: decl.id.clone(),
                })?;
                child.add_parent(&parent)?;
            }
        }

        Ok(acl)
    }

    // ── Entities ─────────────────────────────────────────────────────────────

    /// Register an entity, or return the one already registered under `id`.
    pub fn add_entity(&mut self, id: &str) -> Entity<GenericPermission> {
        if let Some(existing) = self.entities.find(id) {
            return existing.clone();
        }
        let entity = Entity::new(id);
        self.entities.add(entity.clone());
        debug!(entity = %id, "entity registered");
        entity
    }

    /// The registered entity whose ID equals `id`, ignoring case.
    pub fn get_entity(&self, id: &str) -> Option<Entity<GenericPermission>> {
        self.entities.find(id).cloned()
    }

    /// Unregister the entity with `id` and return it.
    ///
    /// Entities that list it as a parent keep that link.
    pub fn remove_entity(&mut self, id: &str) -> Option<Entity<GenericPermission>> {
        let entity = self.entities.find(id)?.clone();
        self.entities.remove(&entity);
        debug!(entity = %id, "entity unregistered");
        Some(entity)
    }

    /// All registered entities, in registration order.
    pub fn entities(&self) -> &EntityCollection<GenericPermission> {
        &self.entities
    }

    /// Link `parent_id` as a parent of `child_id`, registering either on demand.
    pub fn add_parent_entity(&mut self, child_id: &str, parent_id: &str) -> AclResult<()> {
        let child = self.add_entity(child_id);
        let parent = self.add_entity(parent_id);
        child.add_parent(&parent)?;
        Ok(())
    }

    /// Unlink `parent_id` from `child_id`.
    ///
    /// Returns `EntityNotFound` if `child_id` is not registered. A parent that
    /// is not linked is ignored.
    pub fn remove_parent_entity(&mut self, child_id: &str, parent_id: &str) -> AclResult<()> {
        let child = self.require_entity(child_id)?;
        child.remove_parent(&Entity::new(parent_id));
        Ok(())
    }

    // ── Permissions ──────────────────────────────────────────────────────────

    /// Grant (or explicitly deny) `action` on `resource` to `entity_id`,
    /// registering the entity on demand.
    pub fn add_permission(
        &mut self,
        entity_id: &str,
        action: &str,
        resource: &str,
        allow: bool,
    ) -> Entity<GenericPermission> {
        let entity = self.add_entity(entity_id);
        entity.add_permission(GenericPermission::new(action, resource, allow));
        entity
    }

    /// Revoke a direct permission from `entity_id`.
    ///
    /// Returns `EntityNotFound` if `entity_id` is not registered.
    pub fn remove_permission(
        &mut self,
        entity_id: &str,
        action: &str,
        resource: &str,
        allow: bool,
    ) -> AclResult<()> {
        let entity = self.require_entity(entity_id)?;
        entity.remove_permission(&GenericPermission::new(action, resource, allow));
        Ok(())
    }

    // ── Authorization ────────────────────────────────────────────────────────

    /// Decide whether `entity_id` may perform `action` on `resource`, and
    /// record the decision.
    pub fn is_allowed(
        &mut self,
        entity_id: &str,
        action: &str,
        resource: &str,
        assertion: Option<&Assertion<'_>>,
        args: &[Value],
    ) -> bool {
        let (known, allowed) = match self.get_entity(entity_id) {
            Some(entity) => (true, entity.is_allowed(action, resource, assertion, args)),
            None => {
                warn!(entity = %entity_id, "authorization requested for unregistered entity");
                (false, false)
            }
        };

        let record = self.trail.record(entity_id, action, resource, known, allowed);
        info!(
            sequence = record.sequence,
            entity = %entity_id,
            action = %action,
            resource = %resource,
            allowed,
            "authorization decided"
        );
        allowed
    }

    /// Every decision recorded since the last `clear_audit_trail`.
    pub fn audit_trail(&self) -> &[DecisionRecord] {
        self.trail.records()
    }

    /// Forget recorded decisions. Sequence numbers keep counting.
    pub fn clear_audit_trail(&mut self) {
        self.trail.clear();
    }

    /// The decision trail as a pretty-printed JSON array.
    pub fn audit_trail_json(&self) -> serde_json::Result<String> {
        self.trail.to_json()
    }

    /// Human-readable dump of an entity: its parents, own permissions and
    /// inherited permissions, in match order.
    pub fn describe_entity(&self, id: &str) -> Option<String> {
        let entity = self.get_entity(id)?;

        let parents = entity.get_parents().ids();
        let mut lines = vec![format!("entity: {}", entity.id())];
        if parents.is_empty() {
            lines.push("parents: (none)".to_string());
        } else {
            lines.push(format!("parents: {}", parents.join(", ")));
        }

        lines.extend(permission_lines("permissions", entity.get_permissions().iter()));
        lines.extend(permission_lines(
            "inherited",
            entity.get_inherited_permissions().iter(),
        ));

        let mut out = lines.join("\n");
        out.push('\n');
        Some(out)
    }

    fn require_entity(&self, id: &str) -> AclResult<Entity<GenericPermission>> {
        self.get_entity(id).ok_or_else(|| AclError::EntityNotFound { id: id.to_string() })
    }
}

/// A heading line followed by one bullet per permission, or a single
/// `(none)` line when `perms` is empty.
fn permission_lines<'a>(
    heading: &str,
    perms: impl Iterator<Item = &'a GenericPermission>,
) -> Vec<String> {
    let bullets: Vec<String> = perms
        .map(|p| format!("  - {} {} on {}", verdict(p), p.action(), p.resource()))
        .collect();
    if bullets.is_empty() {
        return vec![format!("{}: (none)", heading)];
    }
    let mut lines = Vec::with_capacity(bullets.len() + 1);
    lines.push(format!("{}:", heading));
    lines.extend(bullets);
    lines
}

fn verdict(perm: &GenericPermission) -> &'static str {
    if perm.allows() {
        "allow"
    } else {
        "deny"
    }
}
