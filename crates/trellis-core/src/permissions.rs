//! `PermissionCollection`: ordered permissions with dedup-by-equality and the
//! first-match-wins matcher.
//!
//! Resolution algorithm for `is_allowed(action, resource, ..)`:
//!
//! 1. Iterate permissions in slot order.
//! 2. The first permission whose action (or the all-actions token) and
//!    resource (or the all-resources token) match case-insensitively decides:
//!    allowed iff its allow flag is set and the optional assertion passes.
//!    Later entries are never consulted, even if the first match denies.
//! 3. If nothing matches, the request is denied.
//!
//! Ordering is therefore significant; use `sort` / `sort_by` to control it.

use std::cmp::Ordering;

use serde_json::Value;
use tracing::debug;

use trellis_contracts::{Assertion, GenericPermission, Permission};

use crate::collection::{CollectionKey, KeyedStore};

/// An ordered, key-addressable set of permissions.
///
/// No two stored permissions are equal under [`Permission::is_equal_to`]
/// as long as slots are only written through `add` / `add_all`.
#[derive(Debug, Clone)]
pub struct PermissionCollection<P: Permission = GenericPermission> {
    store: KeyedStore<P>,
}

impl<P: Permission> Default for PermissionCollection<P> {
    fn default() -> Self {
        Self {
            store: KeyedStore::new(),
        }
    }
}

impl<P: Permission> PermissionCollection<P> {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return true if some stored permission is equal to `perm`.
    pub fn has(&self, perm: &P) -> bool {
        self.store.items().any(|other| perm.is_equal_to(other))
    }

    /// Add `perm`, or overwrite the slot of the equal permission already
    /// stored so the newest instance wins while keeping its position.
    pub fn add(&mut self, perm: P) -> &mut Self {
        match self.get_key(&perm) {
            Some(key) => self.store.put(key, perm),
            None => {
                self.store.push(perm);
            }
        }
        self
    }

    /// `add` every permission of `perms`, in iteration order.
    pub fn add_all(&mut self, perms: &PermissionCollection<P>) -> &mut Self {
        for perm in perms.iter() {
            self.add(perm.clone());
        }
        self
    }

    /// Remove every stored permission equal to `perm`. Absence is not an error.
    pub fn remove(&mut self, perm: &P) -> &mut Self {
        while let Some(key) = self.get_key(perm) {
            self.store.remove_by_key(&key);
        }
        self
    }

    /// `remove` every permission of `perms`.
    pub fn remove_all(&mut self, perms: &PermissionCollection<P>) -> &mut Self {
        for perm in perms.iter() {
            self.remove(perm);
        }
        self
    }

    /// Drop every permission.
    pub fn remove_everything(&mut self) -> &mut Self {
        self.store.clear();
        self
    }

    /// The permission stored at `key`, if any.
    pub fn get(&self, key: &CollectionKey) -> Option<&P> {
        self.store.get(key)
    }

    /// Store `perm` directly at `key`, bypassing deduplication.
    pub fn put(&mut self, perm: P, key: impl Into<CollectionKey>) -> &mut Self {
        self.store.put(key.into(), perm);
        self
    }

    /// The key of the first stored permission equal to `perm`.
    pub fn get_key(&self, perm: &P) -> Option<CollectionKey> {
        self.store.find_key(|other| perm.is_equal_to(other))
    }

    /// Remove the slot at `key` and return its permission.
    pub fn remove_by_key(&mut self, key: &CollectionKey) -> Option<P> {
        self.store.remove_by_key(key)
    }

    /// Return true if a slot with `key` exists.
    pub fn key_exists(&self, key: &CollectionKey) -> bool {
        self.store.key_exists(key)
    }

    /// Number of stored permissions.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Return true if no permission is stored.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Permissions in slot (match) order.
    pub fn iter(&self) -> impl Iterator<Item = &P> {
        self.store.items()
    }

    /// `(key, permission)` pairs in slot order.
    pub fn iter_with_keys(&self) -> impl Iterator<Item = (&CollectionKey, &P)> {
        self.store.iter()
    }

    /// The first permission, in slot order, that structurally matches
    /// `action` on `resource`. Its allow flag is not consulted.
    pub fn find_match(&self, action: &str, resource: &str) -> Option<&P> {
        self.store.items().find(|perm| perm.matches(action, resource))
    }

    /// First-match-wins authorization check.
    ///
    /// Returns the decision of the first structurally matching permission:
    /// its allow flag AND `assertion(args)` when an assertion is supplied.
    /// Returns false when no permission matches.
    pub fn is_allowed(
        &self,
        action: &str,
        resource: &str,
        assertion: Option<&Assertion<'_>>,
        args: &[Value],
    ) -> bool {
        match self.find_match(action, resource) {
            Some(perm) => {
                let allowed = perm.is_allowed(action, resource, assertion, args);
                debug!(
                    action = %action,
                    resource = %resource,
                    matched_action = %perm.action(),
                    matched_resource = %perm.resource(),
                    allowed,
                    "permission matched"
                );
                allowed
            }
            None => {
                debug!(action = %action, resource = %resource, "no permission matched");
                false
            }
        }
    }

    /// Sort ascending by resource, then action, then allow flag (deny first).
    pub fn sort(&mut self) -> &mut Self {
        self.sort_by(default_order)
    }

    /// Stable sort with a caller-supplied comparator.
    pub fn sort_by(&mut self, compare: impl FnMut(&P, &P) -> Ordering) -> &mut Self {
        self.store.sort_by(compare);
        self
    }
}

fn default_order<P: Permission>(a: &P, b: &P) -> Ordering {
    a.resource()
        .cmp(b.resource())
        .then_with(|| a.action().cmp(b.action()))
        .then_with(|| a.allows().cmp(&b.allows()))
}

impl<P: Permission> FromIterator<P> for PermissionCollection<P> {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        let mut perms = Self::new();
        perms.extend(iter);
        perms
    }
}

impl<P: Permission> Extend<P> for PermissionCollection<P> {
    fn extend<I: IntoIterator<Item = P>>(&mut self, iter: I) {
        for perm in iter {
            self.add(perm);
        }
    }
}
