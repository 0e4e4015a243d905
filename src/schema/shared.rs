use super::SchemaPool;
use parking_lot::RwLock;
use std::sync::Arc;

/// A schema pool that can be replaced while decoding continues.
///
/// Decoding works on a [`snapshot`](Self::snapshot). Replacing the pool swaps in a new snapshot
/// atomically; decodes that already hold the previous snapshot keep using it until they finish.
#[derive(Debug, Default)]
pub struct SharedSchema
{
    current: RwLock<Arc<SchemaPool>>,
}

impl SharedSchema
{
    /// Create a shared schema with an initial pool.
    pub fn new(pool: SchemaPool) -> Self
    {
        SharedSchema {
            current: RwLock::new(Arc::new(pool)),
        }
    }

    /// The pool that is currently active.
    pub fn snapshot(&self) -> Arc<SchemaPool>
    {
        self.current.read().clone()
    }

    /// Replace the active pool. Returns the previous one.
    pub fn replace(&self, pool: SchemaPool) -> Arc<SchemaPool>
    {
        let pool = Arc::new(pool);
        tracing::debug!(
            messages = pool.messages.len(),
            enums = pool.enums.len(),
            services = pool.services.len(),
            "Replacing schema pool"
        );
        std::mem::replace(&mut *self.current.write(), pool)
    }
}

#[cfg(test)]
mod test
{
    use super::*;

    #[test]
    fn snapshot_survives_replace()
    {
        let mut first = SchemaPool::new();
        first.insert_message("First").unwrap();
        let shared = SharedSchema::new(first);

        let snapshot = shared.snapshot();

        let mut second = SchemaPool::new();
        second.insert_message("Second").unwrap();
        let previous = shared.replace(second);

        assert!(Arc::ptr_eq(&snapshot, &previous));
        assert!(snapshot.get_message("First").is_some());
        assert!(snapshot.get_message("Second").is_none());
        assert!(shared.snapshot().get_message("Second").is_some());
    }
}
