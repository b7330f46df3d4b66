use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::marker::PhantomData;

use super::handle::{HandleIndex, HandleLike};

struct Slot<T> {
    // Odd while occupied.
    generation: HandleIndex,
    value: Option<T>,
}

/// Owns values of `T` and hands out versioned handles naming them. Freed slots
/// are reused lowest index first, with a bumped generation.
pub struct ObjectPool<H: HandleLike, T> {
    slots: Vec<Slot<T>>,
    vacant: BinaryHeap<Reverse<HandleIndex>>,
    _marker: PhantomData<H>,
}

impl<H: HandleLike, T> Default for ObjectPool<H, T> {
    fn default() -> Self {
        ObjectPool::new()
    }
}

impl<H: HandleLike, T> ObjectPool<H, T> {
    pub fn new() -> Self {
        ObjectPool {
            slots: Vec::new(),
            vacant: BinaryHeap::new(),
            _marker: PhantomData,
        }
    }

    pub fn create(&mut self, value: T) -> H {
        match self.vacant.pop() {
            Some(Reverse(index)) => {
                let slot = &mut self.slots[index as usize];
                slot.generation += 1;
                slot.value = Some(value);
                H::new(index, slot.generation)
            }
            None => {
                let index = self.slots.len() as HandleIndex;
                self.slots.push(Slot {
                    generation: 1,
                    value: Some(value),
                });
                H::new(index, 1)
            }
        }
    }

    fn slot(&self, handle: H) -> Option<&Slot<T>> {
        self.slots
            .get(handle.index() as usize)
            .filter(|v| v.generation & 1 == 1 && v.generation == handle.version())
    }

    #[inline]
    pub fn contains(&self, handle: H) -> bool {
        self.slot(handle).is_some()
    }

    #[inline]
    pub fn get(&self, handle: H) -> Option<&T> {
        self.slot(handle).and_then(|v| v.value.as_ref())
    }

    pub fn get_mut(&mut self, handle: H) -> Option<&mut T> {
        if !self.contains(handle) {
            return None;
        }

        self.slots[handle.index() as usize].value.as_mut()
    }

    /// Drops the handle and returns the value it named. Stale handles are ignored.
    pub fn free(&mut self, handle: H) -> Option<T> {
        if !self.contains(handle) {
            return None;
        }

        let slot = &mut self.slots[handle.index() as usize];
        slot.generation += 1;
        self.vacant.push(Reverse(handle.index()));
        slot.value.take()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len() - self.vacant.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::utils::handle::Handle;

    #[test]
    fn lifetime() {
        let mut pool = ObjectPool::<Handle, &str>::new();
        let bolt = pool.create("bolt");
        assert_eq!(pool.get(bolt), Some(&"bolt"));
        assert_eq!(pool.len(), 1);

        *pool.get_mut(bolt).unwrap() = "arc";
        assert_eq!(pool.free(bolt), Some("arc"));
        assert_eq!(pool.free(bolt), None);
        assert!(!pool.contains(bolt));
        assert!(pool.is_empty());
    }

    #[test]
    fn lowest_index_is_reused() {
        let mut pool = ObjectPool::<Handle, u32>::new();
        let handles: Vec<Handle> = (0..4).map(|v| pool.create(v)).collect();
        pool.free(handles[2]);
        pool.free(handles[1]);

        let reused = pool.create(10);
        assert_eq!(reused.index(), 1);
        assert_eq!(reused.version(), 3);
        assert_eq!(pool.get(handles[1]), None);
        assert_eq!(pool.get(reused), Some(&10));
        assert_eq!(pool.create(11).index(), 2);
        assert_eq!(pool.create(12).index(), 4);
    }
}
