use std::collections::HashMap;
use std::sync::RwLock;

use scope_types::ObjectId;

use crate::error::StoreResult;
use crate::traits::ObjectStore;

/// In-memory, HashMap-based blob store for tests.
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<ObjectId, Vec<u8>>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().expect("lock poisoned").is_empty()
    }

    /// Sorted list of all blob IDs in the store.
    pub fn all_ids(&self) -> Vec<ObjectId> {
        let map = self.objects.read().expect("lock poisoned");
        let mut ids: Vec<ObjectId> = map.keys().copied().collect();
        ids.sort();
        ids
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn read(&self, id: &ObjectId) -> StoreResult<Option<Vec<u8>>> {
        let map = self.objects.read().expect("lock poisoned");
        Ok(map.get(id).cloned())
    }

    fn write(&self, data: &[u8]) -> StoreResult<ObjectId> {
        let id = ObjectId::digest(data);
        let mut map = self.objects.write().expect("lock poisoned");
        map.entry(id).or_insert_with(|| data.to_vec());
        Ok(id)
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        let map = self.objects.read().expect("lock poisoned");
        Ok(map.contains_key(id))
    }

    fn delete(&self, id: &ObjectId) -> StoreResult<bool> {
        let mut map = self.objects.write().expect("lock poisoned");
        Ok(map.remove(id).is_some())
    }
}

impl std::fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryObjectStore")
            .field("object_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_and_read() {
        let store = InMemoryObjectStore::new();
        let id = store.write(b"module.exports = 42;").unwrap();
        assert_eq!(store.read(&id).unwrap().unwrap(), b"module.exports = 42;");
        assert!(store.exists(&id).unwrap());
    }

    #[test]
    fn write_is_idempotent() {
        let store = InMemoryObjectStore::new();
        let a = store.write(b"same").unwrap();
        let b = store.write(b"same").unwrap();
        assert_eq!(a, b);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn delete_reports_presence() {
        let store = InMemoryObjectStore::new();
        let id = store.write(b"gone").unwrap();
        assert!(store.delete(&id).unwrap());
        assert!(!store.delete(&id).unwrap());
        assert!(store.read(&id).unwrap().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn read_batch_preserves_order() {
        let store = InMemoryObjectStore::new();
        let a = store.write(b"a").unwrap();
        let missing = ObjectId::digest(b"missing");
        let batch = store.read_batch(&[missing, a]).unwrap();
        assert!(batch[0].is_none());
        assert_eq!(batch[1].as_deref(), Some(&b"a"[..]));
        assert_eq!(store.all_ids(), vec![a]);
    }
}
