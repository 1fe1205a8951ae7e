//! `Entity`: a named, permission-bearing node in an acyclic parent graph.
//!
//! An entity owns its permissions but only references its parents. Parents
//! are shared handles, so a role linked under many users is a single node and
//! changes to it are visible to every descendant.
//!
//! The parent graph never contains a cycle. `add_parent` checks this on every
//! call instead of caching any global graph state, which is what lets the
//! recursive walks below always terminate.

use std::cell::{Ref, RefCell};
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;
use tracing::{debug, warn};

use trellis_contracts::{
    eq_ignore_case, AclError, AclResult, Assertion, GenericPermission, Permission,
};

use crate::entities::EntityCollection;
use crate::permissions::PermissionCollection;

/// Mutable interior of an entity.
struct EntityState<P: Permission> {
    permissions: PermissionCollection<P>,
    parents: EntityCollection<P>,
}

struct EntityNode<P: Permission> {
    id: String,
    state: RefCell<EntityState<P>>,
}

/// A user, role or group: an ID, its own permissions, and its parents.
///
/// `Entity` is a handle. Cloning it yields another handle to the same node;
/// use [`Entity::is_equal_to`] (case-insensitive ID equality) to compare.
///
/// The graph is single-threaded: handles are neither `Send` nor `Sync`.
pub struct Entity<P: Permission = GenericPermission> {
    node: Rc<EntityNode<P>>,
}

impl<P: Permission> Clone for Entity<P> {
    fn clone(&self) -> Self {
        Self {
            node: Rc::clone(&self.node),
        }
    }
}

impl<P: Permission> Entity<P> {
    /// Create an entity with no permissions and no parents.
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_permissions(id, PermissionCollection::new())
    }

    /// Create an entity seeded with `permissions`.
    pub fn with_permissions(id: impl Into<String>, permissions: PermissionCollection<P>) -> Self {
        let state = EntityState {
            permissions,
            parents: EntityCollection::new(),
        };
        Self {
            node: Rc::new(EntityNode {
                id: id.into(),
                state: RefCell::new(state),
            }),
        }
    }

    /// A new, empty collection suitable for holding entities of this type.
    pub fn create_collection() -> EntityCollection<P> {
        EntityCollection::new()
    }

    /// The entity's identifier. Unique per collection, compared ignoring case.
    pub fn id(&self) -> &str {
        &self.node.id
    }

    /// Two entities are equal when their IDs match case-insensitively.
    pub fn is_equal_to(&self, other: &Entity<P>) -> bool {
        eq_ignore_case(self.id(), other.id())
    }

    fn state(&self) -> Ref<'_, EntityState<P>> {
        self.node.state.borrow()
    }

    /// Node identity. IDs are only unique per collection, so graph walks
    /// track visited nodes by identity rather than by ID.
    fn node_ptr(&self) -> *const EntityNode<P> {
        Rc::as_ptr(&self.node)
    }

    // ── Parents ──────────────────────────────────────────────────────────────

    /// Link `parent` as a direct parent of this entity.
    ///
    /// Returns `AclError::CycleViolation` if `parent` is this entity or
    /// already has this entity among its ancestors. Linking an existing
    /// direct parent again is a no-op.
    pub fn add_parent(&self, parent: &Entity<P>) -> AclResult<&Self> {
        if self.is_equal_to(parent) || parent.has_ancestor(self) {
            warn!(
                child = %self.id(),
                parent = %parent.id(),
                "rejected parent link that would create a cycle"
            );
            return Err(AclError::CycleViolation {
                child: self.id().to_string(),
                parent: parent.id().to_string(),
            });
        }

        if self.is_child_of(parent) {
            return Ok(self);
        }

        self.node.state.borrow_mut().parents.add(parent.clone());
        debug!(child = %self.id(), parent = %parent.id(), "parent linked");
        Ok(self)
    }

    /// `add_parent` each entity of `parents` in order.
    ///
    /// Stops at the first cycle violation. Parents linked before the failing
    /// one stay linked.
    pub fn add_parents(&self, parents: &EntityCollection<P>) -> AclResult<&Self> {
        for parent in parents.iter() {
            self.add_parent(parent)?;
        }
        Ok(self)
    }

    /// Return true if some direct parent is equal to `entity`.
    pub fn is_child_of(&self, entity: &Entity<P>) -> bool {
        self.state().parents.has(entity)
    }

    /// Return true if some direct parent's ID equals `id`, ignoring case.
    pub fn is_child_of_id(&self, id: &str) -> bool {
        self.state().parents.find(id).is_some()
    }

    /// Return true if `entity` is reachable through the transitive parent graph.
    pub fn has_ancestor(&self, entity: &Entity<P>) -> bool {
        let mut visited = HashSet::new();
        let mut pending: Vec<Entity<P>> = self.state().parents.iter().cloned().collect();

        while let Some(next) = pending.pop() {
            if next.is_equal_to(entity) {
                return true;
            }
            if visited.insert(next.node_ptr()) {
                pending.extend(next.state().parents.iter().cloned());
            }
        }
        false
    }

    /// Unlink every direct parent equal to `parent`. Absence is not an error.
    pub fn remove_parent(&self, parent: &Entity<P>) -> &Self {
        self.node.state.borrow_mut().parents.remove(parent);
        self
    }

    /// `remove_parent` each entity of `parents`.
    pub fn remove_parents(&self, parents: &EntityCollection<P>) -> &Self {
        self.node.state.borrow_mut().parents.remove_all(parents);
        self
    }

    /// Snapshot of the direct parents. Not transitive.
    pub fn get_parents(&self) -> EntityCollection<P> {
        self.state().parents.clone()
    }

    // ── Permissions ──────────────────────────────────────────────────────────

    /// Grant `perm` directly, replacing an equal permission in place.
    pub fn add_permission(&self, perm: P) -> &Self {
        self.node.state.borrow_mut().permissions.add(perm);
        self
    }

    /// `add_permission` each permission of `perms`, in order.
    pub fn add_permissions(&self, perms: &PermissionCollection<P>) -> &Self {
        self.node.state.borrow_mut().permissions.add_all(perms);
        self
    }

    /// Revoke the direct permission equal to `perm`, if present.
    pub fn remove_permission(&self, perm: &P) -> &Self {
        self.node.state.borrow_mut().permissions.remove(perm);
        self
    }

    /// `remove_permission` each permission of `perms`.
    pub fn remove_permissions(&self, perms: &PermissionCollection<P>) -> &Self {
        self.node.state.borrow_mut().permissions.remove_all(perms);
        self
    }

    /// Return true if this entity's own permissions include one equal to `perm`.
    pub fn has_permission(&self, perm: &P) -> bool {
        self.state().permissions.has(perm)
    }

    /// Snapshot of the permissions granted directly to this entity.
    pub fn get_permissions(&self) -> PermissionCollection<P> {
        self.state().permissions.clone()
    }

    /// Union of the direct permissions of every ancestor.
    ///
    /// Ancestors are walked depth-first in parent order; each ancestor node is
    /// visited once even when reachable along several paths. Distinct nodes
    /// sharing an ID all contribute.
    pub fn get_inherited_permissions(&self) -> PermissionCollection<P> {
        let mut inherited = PermissionCollection::new();
        let mut visited = HashSet::new();
        self.collect_inherited(&mut inherited, &mut visited);
        inherited
    }

    fn collect_inherited(
        &self,
        into: &mut PermissionCollection<P>,
        visited: &mut HashSet<*const EntityNode<P>>,
    ) {
        for parent in self.state().parents.iter() {
            if !visited.insert(parent.node_ptr()) {
                continue;
            }
            into.add_all(&parent.state().permissions);
            parent.collect_inherited(into, visited);
        }
    }

    /// Decide whether this entity may perform `action` on `resource`.
    ///
    /// The entity's own permissions are consulted first. Inherited permissions
    /// are only consulted when no own permission structurally matches. In both
    /// cases the first match decides, together with `assertion(args)`.
    pub fn is_allowed(
        &self,
        action: &str,
        resource: &str,
        assertion: Option<&Assertion<'_>>,
        args: &[Value],
    ) -> bool {
        // Clone the deciding permission so no borrow is held while the
        // caller's assertion runs.
        let own = self.state().permissions.find_match(action, resource).cloned();
        let (decisive, source) = match own {
            Some(perm) => (perm, "own"),
            None => match self
                .get_inherited_permissions()
                .find_match(action, resource)
                .cloned()
            {
                Some(perm) => (perm, "inherited"),
                None => {
                    debug!(
                        entity = %self.id(),
                        action = %action,
                        resource = %resource,
                        "no own or inherited permission matched"
                    );
                    return false;
                }
            },
        };

        let allowed = decisive.is_allowed(action, resource, assertion, args);
        debug!(
            entity = %self.id(),
            action = %action,
            resource = %resource,
            source,
            allowed,
            "entity authorization resolved"
        );
        allowed
    }
}

impl<P: Permission> PartialEq for Entity<P> {
    fn eq(&self, other: &Self) -> bool {
        self.is_equal_to(other)
    }
}

impl<P: Permission> Eq for Entity<P> {}

impl<P: Permission> fmt::Debug for Entity<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("Entity")
            .field("id", &self.node.id)
            .field("permissions", &state.permissions)
            .field("parents", &state.parents.ids())
            .finish()
    }
}
