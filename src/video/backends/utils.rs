use crate::utils::handle::{HandleIndex, HandleLike};

/// Backend-side mirror of a frontend pool. Entries are keyed by the slot index
/// of their handle and only resolve for the generation they were created with.
#[derive(Debug)]
pub struct DataVec<T> {
    slots: Vec<Option<(HandleIndex, T)>>,
}

impl<T> Default for DataVec<T> {
    fn default() -> Self {
        DataVec::new()
    }
}

impl<T> DataVec<T> {
    pub fn new() -> Self {
        DataVec { slots: Vec::new() }
    }

    pub fn get<H: HandleLike>(&self, handle: H) -> Option<&T> {
        match self.slots.get(handle.index() as usize) {
            Some(Some((version, value))) if *version == handle.version() => Some(value),
            _ => None,
        }
    }

    /// Stores `value` under `handle`, replacing whatever a stale handle of the
    /// same slot left behind.
    pub fn create<H: HandleLike>(&mut self, handle: H, value: T) {
        let index = handle.index() as usize;
        if self.slots.len() <= index {
            self.slots.resize_with(index + 1, || None);
        }

        self.slots[index] = Some((handle.version(), value));
    }

    pub fn free<H: HandleLike>(&mut self, handle: H) -> Option<T> {
        let slot = self.slots.get_mut(handle.index() as usize)?;
        match *slot {
            Some((version, _)) if version == handle.version() => slot.take().map(|(_, v)| v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::utils::handle::Handle;

    #[test]
    fn stale_generations_miss() {
        let mut vec = DataVec::<u32>::new();
        let h1 = Handle::new(2, 1);
        vec.create(h1, 7);
        assert_eq!(vec.get(h1), Some(&7));
        assert_eq!(vec.get(Handle::new(2, 3)), None);
        assert_eq!(vec.get(Handle::new(5, 1)), None);
        assert_eq!(vec.free(Handle::new(2, 3)), None);
        assert_eq!(vec.free(h1), Some(7));
        assert_eq!(vec.get(h1), None);

        let h2 = Handle::new(2, 3);
        vec.create(h2, 9);
        assert_eq!(vec.get(h1), None);
        assert_eq!(vec.get(h2), Some(&9));
    }
}
