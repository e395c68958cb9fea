use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::collections::HashMap;
use std::sync::Arc;

/// A handle to one named read-write lock.
///
/// The handle keeps the underlying lock alive even if it is removed from the
/// registry while a guard is held.
pub struct LockHandle {
    lock: Arc<RwLock<()>>,
}

impl LockHandle {
    /// Creates a new, unregistered lock handle.
    pub fn new() -> Self {
        LockHandle {
            lock: Arc::new(RwLock::new(())),
        }
    }

    /// Acquires a read lock
    pub fn read(&self) -> RwLockReadGuard<'_, ()> {
        self.lock.read()
    }

    /// Acquires a write lock
    pub fn write(&self) -> RwLockWriteGuard<'_, ()> {
        self.lock.write()
    }
}

impl Default for LockHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry of read-write locks keyed by collection name.
///
/// Every operation on a collection goes through the lock registered under the
/// collection's name: readers share it, writers hold it exclusively for the whole
/// load-mutate-save cycle. This only orders callers inside one process; other
/// processes writing the same file are not coordinated.
///
/// # Examples
///
/// ```
/// use jsondb::common::LockRegistry;
/// let lock_registry = LockRegistry::new();
/// let lock = lock_registry.get_lock("users");
/// {
///     let _read_guard = lock.read();
/// }
/// {
///     let _write_guard = lock.write();
/// }
/// ```
#[derive(Clone)]
pub struct LockRegistry {
    locks: Arc<RwLock<HashMap<String, Arc<RwLock<()>>>>>,
}

impl LockRegistry {
    /// Creates a new empty lock registry.
    pub fn new() -> Self {
        LockRegistry {
            locks: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Gets the lock for the given name, creating it on first use.
    pub fn get_lock(&self, name: &str) -> LockHandle {
        if let Some(lock) = self.locks.read().get(name) {
            return LockHandle { lock: lock.clone() };
        }

        let lock = {
            let mut locks = self.locks.write();
            locks
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(RwLock::new(())))
                .clone()
        };
        LockHandle { lock }
    }

    /// Returns the number of locks currently registered.
    pub fn lock_count(&self) -> usize {
        let locks = self.locks.read();
        locks.len()
    }
}

impl Default for LockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn test_new_lock_registry() {
        let lock_registry = LockRegistry::new();
        assert_eq!(lock_registry.lock_count(), 0);
    }

    #[test]
    fn test_get_lock_registers_once_per_name() {
        let lock_registry = LockRegistry::new();
        let _first = lock_registry.get_lock("users");
        let _second = lock_registry.get_lock("users");
        let _other = lock_registry.get_lock("orders");
        assert_eq!(lock_registry.lock_count(), 2);
    }

    #[test]
    fn test_write_lock_is_exclusive_per_name() {
        let lock_registry = LockRegistry::new();
        let handle = lock_registry.get_lock("users");
        let _write_guard = handle.write();

        let same = lock_registry.get_lock("users");
        assert!(same.lock.try_read().is_none());

        let other = lock_registry.get_lock("orders");
        assert!(other.lock.try_write().is_some());
    }

    #[test]
    fn test_writers_are_serialized() {
        let lock_registry = LockRegistry::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let mut handles = vec![];
        for _ in 0..4 {
            let registry = lock_registry.clone();
            let cnt = counter.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    let lock_handle = registry.get_lock("users");
                    let _guard = lock_handle.write();
                    // non-atomic read-modify-write made safe by the lock
                    let current = cnt.load(Ordering::SeqCst);
                    cnt.store(current + 1, Ordering::SeqCst);
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(counter.load(Ordering::SeqCst), 400);
        assert_eq!(lock_registry.lock_count(), 1);
    }
}
