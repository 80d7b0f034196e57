use scope_types::ObjectId;

use crate::error::StoreResult;

/// Content-addressed blob store.
///
/// All implementations must satisfy these invariants:
/// - Blobs are immutable once written. The same bytes always produce the same
///   ID, so writing an existing blob is a no-op.
/// - Reads verify content against the ID.
/// - The store never interprets blob contents.
/// - All I/O errors are propagated, never silently ignored.
pub trait ObjectStore: Send + Sync {
    /// Read a blob by its content-addressed ID.
    ///
    /// Returns `Ok(None)` if the blob does not exist.
    fn read(&self, id: &ObjectId) -> StoreResult<Option<Vec<u8>>>;

    /// Write a blob and return its content-addressed ID.
    fn write(&self, data: &[u8]) -> StoreResult<ObjectId>;

    /// Check whether a blob exists in the store.
    fn exists(&self, id: &ObjectId) -> StoreResult<bool>;

    /// Delete a blob by ID. Returns `true` if the blob existed.
    fn delete(&self, id: &ObjectId) -> StoreResult<bool>;

    /// Read multiple blobs in a batch.
    fn read_batch(&self, ids: &[ObjectId]) -> StoreResult<Vec<Option<Vec<u8>>>> {
        ids.iter().map(|id| self.read(id)).collect()
    }
}
