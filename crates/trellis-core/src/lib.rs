//! # trellis-core
//!
//! The entity/permission graph and its resolution algorithm.
//!
//! This crate provides:
//! - [`PermissionCollection`]: ordered permissions, dedup-by-equality, and the
//!   first-match-wins `is_allowed` matcher
//! - [`Entity`]: a node with its own permissions and an acyclic set of shared
//!   parents it inherits from
//! - [`EntityCollection`]: ordered entities with case-insensitive `find`
//! - [`KeyedStore`]: the ordered, key-addressable storage both collections
//!   are built on
//!
//! ## Usage
//!
//! ```rust,ignore
//! use trellis_contracts::GenericPermission;
//! use trellis_core::Entity;
//!
//! let staff: Entity = Entity::new("staff");
//! staff.add_permission(GenericPermission::new("read", "wiki", true));
//!
//! let alice: Entity = Entity::new("alice");
//! alice.add_parent(&staff)?;
//! assert!(alice.is_allowed("read", "wiki", None, &[]));
//! ```

pub mod collection;
pub mod entities;
pub mod entity;
pub mod permissions;

pub use collection::{CollectionKey, KeyedStore};
pub use entities::EntityCollection;
pub use entity::Entity;
pub use permissions::PermissionCollection;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use trellis_contracts::{AclError, GenericPermission, Permission, WildcardAware};

    use super::*;

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn perm(action: &str, resource: &str, allow: bool) -> GenericPermission {
        GenericPermission::new(action, resource, allow)
    }

    /// A permission type with its own wildcard tokens and an extra field that
    /// takes no part in equality.
    #[derive(Debug, Clone)]
    struct TaggedPermission {
        action: String,
        resource: String,
        allow: bool,
        tag: u32,
    }

    impl TaggedPermission {
        fn new(action: &str, resource: &str, allow: bool, tag: u32) -> Self {
            Self {
                action: action.to_string(),
                resource: resource.to_string(),
                allow,
                tag,
            }
        }
    }

    impl WildcardAware for TaggedPermission {
        fn all_actions_token(&self) -> &str {
            "any-action"
        }

        fn all_resources_token(&self) -> &str {
            "any-resource"
        }
    }

    impl Permission for TaggedPermission {
        fn action(&self) -> &str {
            &self.action
        }

        fn resource(&self) -> &str {
            &self.resource
        }

        fn allows(&self) -> bool {
            self.allow
        }

        fn is_equal_to(&self, other: &Self) -> bool {
            self.allow == other.allow
                && self.action.eq_ignore_ascii_case(&other.action)
                && self.resource.eq_ignore_ascii_case(&other.resource)
        }
    }

    // ── 1. add replaces equal permissions with the newest instance ────────────

    #[test]
    fn add_keeps_size_and_stores_newest_instance() {
        let mut perms = PermissionCollection::new();
        perms.add(TaggedPermission::new("read", "files", true, 1));
        perms.add(TaggedPermission::new("READ", "files", true, 2));

        assert_eq!(perms.len(), 1);
        assert_eq!(perms.get(&CollectionKey::Index(0)).map(|p| p.tag), Some(2));
    }

    // ── 2. wildcard tokens come from the permission type ─────────────────────

    #[test]
    fn custom_wildcard_tokens_are_honoured() {
        let perms: PermissionCollection<TaggedPermission> = [
            TaggedPermission::new("any-action", "files", true, 0),
            TaggedPermission::new("read", "any-resource", false, 0),
        ]
        .into_iter()
        .collect();

        assert!(perms.is_allowed("delete", "files", None, &[]));
        assert!(!perms.is_allowed("read", "reports", None, &[]));
        // "*" means nothing special for this type.
        let star: PermissionCollection<TaggedPermission> =
            [TaggedPermission::new("*", "*", true, 0)].into_iter().collect();
        assert!(!star.is_allowed("read", "files", None, &[]));
    }

    // ── 3. cycle prevention across three levels ──────────────────────────────

    #[test]
    fn ancestor_can_never_become_descendant() {
        let a: Entity = Entity::new("A");
        let b: Entity = Entity::new("B");
        let c: Entity = Entity::new("C");
        a.add_parent(&b).unwrap();
        b.add_parent(&c).unwrap();

        for (child, parent) in [(&b, &a), (&c, &a), (&c, &b)] {
            match child.add_parent(parent) {
                Err(AclError::CycleViolation { .. }) => {}
                other => panic!(
                    "expected cycle error linking {} under {}, got ok={}",
                    child.id(),
                    parent.id(),
                    other.is_ok()
                ),
            }
        }
    }

    // ── 4. a role hierarchy end to end ───────────────────────────────────────

    #[test]
    fn role_hierarchy_resolution() {
        let guest: Entity = Entity::new("guest");
        let member: Entity = Entity::new("member");
        let moderator: Entity = Entity::new("moderator");
        let carol: Entity = Entity::new("carol");

        guest.add_permission(perm("read", "forum", true));
        member
            .add_permission(perm("post", "forum", true))
            .add_permission(perm("*", "profile", true));
        moderator.add_permission(perm("delete", "forum", true));

        member.add_parent(&guest).unwrap();
        moderator.add_parent(&member).unwrap();
        carol.add_parent(&moderator).unwrap();
        carol.add_permission(perm("post", "forum", false));

        assert!(carol.is_allowed("read", "forum", None, &[]));
        assert!(carol.is_allowed("delete", "forum", None, &[]));
        assert!(carol.is_allowed("edit", "profile", None, &[]));
        // Carol's own deny shadows the inherited allow.
        assert!(!carol.is_allowed("post", "forum", None, &[]));
        assert!(!carol.is_allowed("ban", "forum", None, &[]));

        let mut inherited = carol.get_inherited_permissions();
        inherited.sort();
        let rendered: Vec<String> = inherited.iter().map(|p| p.to_string()).collect();
        assert_eq!(
            rendered,
            vec![
                "allow delete on forum",
                "allow post on forum",
                "allow read on forum",
                "allow * on profile",
            ]
        );
    }

    // ── 5. entity collections as parent sets ─────────────────────────────────

    #[test]
    fn parents_collection_supports_find() {
        let user: Entity = Entity::new("user");
        let mut roles: EntityCollection = Entity::create_collection();
        roles.add(Entity::new("Editor")).add(Entity::new("Viewer"));
        user.add_parents(&roles).unwrap();

        let parents = user.get_parents();
        assert_eq!(parents.find("editor").map(|e| e.id()), Some("Editor"));
        assert!(parents.find("admin").is_none());
        assert!(user.is_child_of_id("VIEWER"));
    }
}
