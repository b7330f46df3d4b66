use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};

/// Maps keyed with `ahash`. Construct them with `default()`.
pub type FastHashMap<K, V> = HashMap<K, V, ahash::RandomState>;
pub type FastHashSet<K> = HashSet<K, ahash::RandomState>;

/// A hash which is stable across runs, unlike the seeded `FastHashMap` hasher.
#[inline]
pub fn hash64<T: Hash + ?Sized>(v: &T) -> u64 {
    let mut state = DefaultHasher::new();
    v.hash(&mut state);
    state.finish()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn fast_maps() {
        let mut names = FastHashMap::default();
        names.insert("bolt", 1);
        names.insert("arc", 2);
        assert_eq!(names.get("arc"), Some(&2));

        let mut seen = FastHashSet::default();
        assert!(seen.insert("bolt"));
        assert!(!seen.insert("bolt"));

        assert_eq!(hash64("bolt"), hash64("bolt"));
        assert_ne!(hash64("bolt"), hash64("arc"));
    }
}
