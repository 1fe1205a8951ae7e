//! `EntityCollection`: ordered entities with dedup-by-equality and
//! case-insensitive ID lookup.

use std::cmp::Ordering;

use trellis_contracts::{eq_ignore_case, GenericPermission, Permission};

use crate::collection::{CollectionKey, KeyedStore};
use crate::entity::Entity;

/// An ordered, key-addressable set of entity handles.
///
/// The collection holds handles, not entities: removing an entity from a
/// collection leaves the entity and its own parent links untouched.
#[derive(Debug, Clone)]
pub struct EntityCollection<P: Permission = GenericPermission> {
    store: KeyedStore<Entity<P>>,
}

impl<P: Permission> Default for EntityCollection<P> {
    fn default() -> Self {
        Self {
            store: KeyedStore::new(),
        }
    }
}

impl<P: Permission> EntityCollection<P> {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return true if some stored entity is equal to `entity`.
    pub fn has(&self, entity: &Entity<P>) -> bool {
        self.store.items().any(|other| entity.is_equal_to(other))
    }

    /// Add `entity`, or overwrite the slot of the equal entity already stored.
    pub fn add(&mut self, entity: Entity<P>) -> &mut Self {
        match self.get_key(&entity) {
            Some(key) => self.store.put(key, entity),
            None => {
                self.store.push(entity);
            }
        }
        self
    }

    /// `add` every entity of `entities`, in iteration order.
    pub fn add_all(&mut self, entities: &EntityCollection<P>) -> &mut Self {
        for entity in entities.iter() {
            self.add(entity.clone());
        }
        self
    }

    /// Remove every stored entity equal to `entity`. Absence is not an error.
    pub fn remove(&mut self, entity: &Entity<P>) -> &mut Self {
        while let Some(key) = self.get_key(entity) {
            self.store.remove_by_key(&key);
        }
        self
    }

    /// `remove` every entity of `entities`.
    pub fn remove_all(&mut self, entities: &EntityCollection<P>) -> &mut Self {
        for entity in entities.iter() {
            self.remove(entity);
        }
        self
    }

    /// Drop every entity handle. The entities themselves are untouched.
    pub fn remove_everything(&mut self) -> &mut Self {
        self.store.clear();
        self
    }

    /// The entity stored at `key`, if any.
    pub fn get(&self, key: &CollectionKey) -> Option<&Entity<P>> {
        self.store.get(key)
    }

    /// Store `entity` directly at `key`, bypassing deduplication.
    pub fn put(&mut self, entity: Entity<P>, key: impl Into<CollectionKey>) -> &mut Self {
        self.store.put(key.into(), entity);
        self
    }

    /// The key of the first stored entity equal to `entity`.
    pub fn get_key(&self, entity: &Entity<P>) -> Option<CollectionKey> {
        self.store.find_key(|other| entity.is_equal_to(other))
    }

    /// The first stored entity whose ID equals `id`, ignoring case.
    ///
    /// Only entities stored in this collection are searched, never their
    /// ancestors.
    pub fn find(&self, id: &str) -> Option<&Entity<P>> {
        self.store.items().find(|entity| eq_ignore_case(entity.id(), id))
    }

    /// Remove the slot at `key` and return its entity.
    pub fn remove_by_key(&mut self, key: &CollectionKey) -> Option<Entity<P>> {
        self.store.remove_by_key(key)
    }

    /// Return true if a slot with `key` exists.
    pub fn key_exists(&self, key: &CollectionKey) -> bool {
        self.store.key_exists(key)
    }

    /// Number of stored entities.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Return true if no entity is stored.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Entities in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity<P>> {
        self.store.items()
    }

    /// `(key, entity)` pairs in slot order.
    pub fn iter_with_keys(&self) -> impl Iterator<Item = (&CollectionKey, &Entity<P>)> {
        self.store.iter()
    }

    /// IDs of the stored entities, in slot order.
    pub fn ids(&self) -> Vec<String> {
        self.store.items().map(|entity| entity.id().to_string()).collect()
    }

    /// Sort ascending by case-folded ID.
    pub fn sort(&mut self) -> &mut Self {
        self.sort_by(|a, b| a.id().to_lowercase().cmp(&b.id().to_lowercase()))
    }

    /// Stable sort with a caller-supplied comparator.
    pub fn sort_by(&mut self, compare: impl FnMut(&Entity<P>, &Entity<P>) -> Ordering) -> &mut Self {
        self.store.sort_by(compare);
        self
    }
}

impl<P: Permission> FromIterator<Entity<P>> for EntityCollection<P> {
    fn from_iter<I: IntoIterator<Item = Entity<P>>>(iter: I) -> Self {
        let mut entities = Self::new();
        entities.extend(iter);
        entities
    }
}

impl<P: Permission> Extend<Entity<P>> for EntityCollection<P> {
    fn extend<I: IntoIterator<Item = Entity<P>>>(&mut self, iter: I) {
        for entity in iter {
            self.add(entity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entities(ids: &[&str]) -> EntityCollection {
        ids.iter().map(|id| Entity::new(*id)).collect()
    }

    // ── 1. dedup ─────────────────────────────────────────────────────────────

    #[test]
    fn add_deduplicates_by_case_insensitive_id() {
        let mut coll: EntityCollection = EntityCollection::new();
        coll.add(Entity::new("bob")).add(Entity::new("alice")).add(Entity::new("BOB"));

        assert_eq!(coll.len(), 2);
        // The newest handle replaces the old one in its original slot.
        assert_eq!(coll.ids(), vec!["BOB", "alice"]);
        assert!(coll.has(&Entity::new("Alice")));
    }

    #[test]
    fn add_all_merges_collections() {
        let mut coll = entities(&["a", "b"]);
        coll.add_all(&entities(&["B", "c"]));
        assert_eq!(coll.ids(), vec!["a", "B", "c"]);
    }

    // ── 2. find ──────────────────────────────────────────────────────────────

    #[test]
    fn find_is_case_insensitive() {
        for stored in ["bob", "BOB", "Bob"] {
            let coll = entities(&["alice", stored]);
            let found = coll.find("BOB").expect("bob should be found");
            assert_eq!(found.id(), stored);
        }
        assert!(entities(&["alice"]).find("bob").is_none());
    }

    #[test]
    fn find_does_not_search_ancestors() {
        let child: Entity = Entity::new("child");
        let parent: Entity = Entity::new("parent");
        child.add_parent(&parent).unwrap();

        let coll: EntityCollection = [child].into_iter().collect();
        assert!(coll.find("parent").is_none());
    }

    // ── 3. removal and keys ──────────────────────────────────────────────────

    #[test]
    fn remove_by_equality_and_key() {
        let mut coll = entities(&["a", "b", "c"]);
        coll.remove(&Entity::new("B"));
        assert_eq!(coll.ids(), vec!["a", "c"]);

        coll.remove(&Entity::new("zzz"));
        assert_eq!(coll.len(), 2);

        assert_eq!(coll.get_key(&Entity::new("c")), Some(CollectionKey::Index(2)));
        let removed = coll.remove_by_key(&CollectionKey::Index(2)).unwrap();
        assert_eq!(removed.id(), "c");

        coll.remove_all(&entities(&["a"]));
        assert!(coll.is_empty());
    }

    #[test]
    fn removing_from_collection_keeps_entity_links() {
        let child: Entity = Entity::new("child");
        let parent: Entity = Entity::new("parent");
        child.add_parent(&parent).unwrap();

        let mut coll: EntityCollection = [child.clone(), parent.clone()].into_iter().collect();
        coll.remove(&parent);

        assert!(child.is_child_of(&parent));
    }

    #[test]
    fn put_and_get() {
        let mut coll: EntityCollection = EntityCollection::new();
        coll.put(Entity::new("root"), "root-slot");
        assert_eq!(coll.get(&CollectionKey::from("root-slot")).map(|e| e.id()), Some("root"));
        assert!(coll.get(&CollectionKey::from("other")).is_none());
        assert!(coll.key_exists(&CollectionKey::from("root-slot")));

        coll.remove_everything();
        assert!(coll.is_empty());
    }

    // ── 4. sorting ───────────────────────────────────────────────────────────

    #[test]
    fn default_sort_orders_by_folded_id() {
        let mut coll = entities(&["carol", "Alice", "bob"]);
        coll.sort();
        assert_eq!(coll.ids(), vec!["Alice", "bob", "carol"]);

        coll.sort_by(|a, b| b.id().cmp(a.id()));
        assert_eq!(coll.ids(), vec!["carol", "bob", "Alice"]);
    }
}
