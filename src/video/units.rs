use crate::video::assets::texture::TextureHandle;

/// Assigns textures to a fixed number of texture units, evicting the least
/// recently used one when every unit is taken.
pub struct TextureUnits {
    slots: Vec<Option<TextureHandle>>,
    stamps: Vec<u64>,
    clock: u64,
}

impl TextureUnits {
    pub fn new(len: usize) -> Self {
        let len = len.max(1);
        TextureUnits {
            slots: vec![None; len],
            stamps: vec![0; len],
            clock: 0,
        }
    }

    #[inline]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns the unit `handle` resides in, and whether it has just been
    /// assigned there (and hence must be bound).
    pub fn assign(&mut self, handle: TextureHandle) -> (usize, bool) {
        self.clock += 1;

        if let Some(unit) = self.slots.iter().position(|v| *v == Some(handle)) {
            self.stamps[unit] = self.clock;
            return (unit, false);
        }

        let unit = self
            .slots
            .iter()
            .position(|v| v.is_none())
            .unwrap_or_else(|| {
                let mut lru = 0;
                for (i, stamp) in self.stamps.iter().enumerate() {
                    if *stamp < self.stamps[lru] {
                        lru = i;
                    }
                }
                lru
            });

        self.slots[unit] = Some(handle);
        self.stamps[unit] = self.clock;
        (unit, true)
    }

    /// Returns the unit `handle` currently resides in.
    #[cfg(test)]
    pub fn unit(&self, handle: TextureHandle) -> Option<usize> {
        self.slots.iter().position(|v| *v == Some(handle))
    }

    /// Forgets `handle`, e.g. after the texture has been deleted.
    pub fn evict(&mut self, handle: TextureHandle) {
        for v in self.slots.iter_mut() {
            if *v == Some(handle) {
                *v = None;
            }
        }
    }

    /// Forgets whatever resides in `unit`, e.g. after the backend rebound it.
    pub fn release(&mut self, unit: usize) {
        if let Some(v) = self.slots.get_mut(unit) {
            *v = None;
        }
    }
}
