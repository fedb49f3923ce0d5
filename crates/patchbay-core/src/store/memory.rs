//! In-memory entity store
//!
//! Document-shaped store used by tests and demos. Updates are applied by
//! round-tripping the entity through its JSON representation, so any
//! storage key the entity serializes is patchable, mirroring the
//! schemaless behavior of a document database.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{Error, Result};
use crate::models::Syncable;

use super::{EntityStore, UpdatePayload};

/// In-memory [`EntityStore`] for one entity family
pub struct MemoryStore<E: Syncable> {
    entities: Mutex<HashMap<String, E>>,
}

impl<E: Syncable> MemoryStore<E> {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self {
            entities: Mutex::new(HashMap::new()),
        }
    }

    /// Seed the store with an existing entity, keyed by its own ID
    pub fn insert(&self, entity: E) {
        let mut entities = self.entities.lock().expect("store lock poisoned");
        entities.insert(entity.id_str(), entity);
    }

    /// Number of stored entities
    pub fn len(&self) -> usize {
        self.entities.lock().expect("store lock poisoned").len()
    }

    /// Whether the store holds no entities
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E: Syncable> Default for MemoryStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Syncable> EntityStore for MemoryStore<E> {
    type Entity = E;

    fn fetch(&self, id: &str) -> Result<Option<E>> {
        let entities = self.entities.lock().expect("store lock poisoned");
        Ok(entities.get(id).cloned())
    }

    fn create(&self, entity: &E) -> Result<E> {
        let mut entities = self.entities.lock().expect("store lock poisoned");
        entities.insert(entity.id_str(), entity.clone());
        Ok(entity.clone())
    }

    fn apply_update(&self, id: &str, payload: &UpdatePayload) -> Result<E> {
        let mut entities = self.entities.lock().expect("store lock poisoned");
        let entity = entities
            .get(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;

        let mut doc = serde_json::to_value(entity)?;
        let Some(map) = doc.as_object_mut() else {
            return Err(Error::InvalidInput(format!(
                "entity {id} does not serialize to an object"
            )));
        };
        for (key, value) in payload {
            map.insert(key.clone(), value.clone().into_json());
        }

        let updated: E = serde_json::from_value(doc)?;
        entities.insert(id.to_string(), updated.clone());
        Ok(updated)
    }

    fn delete(&self, id: &str) -> Result<()> {
        let mut entities = self.entities.lock().expect("store lock poisoned");
        entities.remove(id);
        Ok(())
    }
}
