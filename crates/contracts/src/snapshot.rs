//! SnapshotVec - copy-on-write collection for fan-out paths
//!
//! Readers clone an `Arc` to the current vector and iterate without holding
//! any lock; writers rebuild the vector and swap the `Arc` in. A snapshot
//! taken before a mutation keeps seeing the pre-mutation elements, so
//! removing an element mid-iteration can never invalidate an iterator and
//! user callbacks are never invoked under a lock.

use std::sync::Arc;

use parking_lot::RwLock;

/// Concurrency-safe ordered collection with snapshot iteration.
pub struct SnapshotVec<T> {
    inner: RwLock<Arc<Vec<T>>>,
}

impl<T> SnapshotVec<T> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Point-in-time view of the current elements.
    pub fn snapshot(&self) -> Arc<Vec<T>> {
        Arc::clone(&self.inner.read())
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

impl<T: Clone> SnapshotVec<T> {
    /// Append an element.
    pub fn push(&self, item: T) {
        let mut guard = self.inner.write();
        let mut next = Vec::with_capacity(guard.len() + 1);
        next.extend(guard.iter().cloned());
        next.push(item);
        *guard = Arc::new(next);
    }

    /// Append unless `same` matches an existing element.
    ///
    /// Returns `false` (and leaves the collection untouched) on a duplicate.
    pub fn push_unique<F>(&self, item: T, same: F) -> bool
    where
        F: Fn(&T, &T) -> bool,
    {
        let mut guard = self.inner.write();
        if guard.iter().any(|existing| same(existing, &item)) {
            return false;
        }
        let mut next = Vec::with_capacity(guard.len() + 1);
        next.extend(guard.iter().cloned());
        next.push(item);
        *guard = Arc::new(next);
        true
    }

    /// Remove and return the first element matching `pred`.
    pub fn remove_first<F>(&self, pred: F) -> Option<T>
    where
        F: Fn(&T) -> bool,
    {
        let mut guard = self.inner.write();
        let index = guard.iter().position(|item| pred(item))?;
        let mut next: Vec<T> = guard.iter().cloned().collect();
        let removed = next.remove(index);
        *guard = Arc::new(next);
        Some(removed)
    }

    /// Clone of the first element, if any.
    pub fn first(&self) -> Option<T> {
        self.inner.read().first().cloned()
    }

    /// Remove every element, returning them in order.
    pub fn take_all(&self) -> Vec<T> {
        let mut guard = self.inner.write();
        let drained = guard.iter().cloned().collect();
        *guard = Arc::new(Vec::new());
        drained
    }
}

impl<T> Default for SnapshotVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn snapshot_is_isolated_from_later_mutation() {
        let vec: SnapshotVec<u32> = SnapshotVec::new();
        vec.push(1);
        vec.push(2);

        let snapshot = vec.snapshot();
        vec.push(3);
        vec.remove_first(|n| *n == 1);

        assert_eq!(snapshot.as_slice(), &[1, 2]);
        assert_eq!(vec.snapshot().as_slice(), &[2, 3]);
    }

    #[test]
    fn push_unique_rejects_same_arc() {
        let vec: SnapshotVec<Arc<String>> = SnapshotVec::new();
        let item = Arc::new("sink".to_string());

        assert!(vec.push_unique(Arc::clone(&item), |a, b| Arc::ptr_eq(a, b)));
        assert!(!vec.push_unique(Arc::clone(&item), |a, b| Arc::ptr_eq(a, b)));
        assert_eq!(vec.len(), 1);

        // A different allocation with equal contents is not a duplicate
        let other = Arc::new("sink".to_string());
        assert!(vec.push_unique(other, |a, b| Arc::ptr_eq(a, b)));
        assert_eq!(vec.len(), 2);
    }

    #[test]
    fn remove_first_returns_removed() {
        let vec: SnapshotVec<u32> = SnapshotVec::new();
        vec.push(10);
        vec.push(20);

        assert_eq!(vec.remove_first(|n| *n == 10), Some(10));
        assert_eq!(vec.remove_first(|n| *n == 10), None);
        assert_eq!(vec.len(), 1);
    }

    #[test]
    fn take_all_drains_in_order() {
        let vec: SnapshotVec<u32> = SnapshotVec::new();
        vec.push(1);
        vec.push(2);
        vec.push(3);

        assert_eq!(vec.take_all(), vec![1, 2, 3]);
        assert!(vec.is_empty());
        assert_eq!(vec.take_all(), Vec::<u32>::new());
    }

    #[test]
    fn concurrent_pushes_all_land() {
        let vec = Arc::new(SnapshotVec::<usize>::new());
        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let vec = Arc::clone(&vec);
                thread::spawn(move || {
                    for i in 0..100 {
                        vec.push(worker * 100 + i);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(vec.len(), 800);
    }
}
