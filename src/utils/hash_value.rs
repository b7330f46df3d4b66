use std::fmt;

use super::hash;

/// The 64-bit hash of a name, for keying lookups without keeping the string
/// around. Collisions are not detected.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashValue(u64);

impl HashValue {
    #[inline]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for HashValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "HashValue({:016x})", self.0)
    }
}

impl<'a> From<&'a str> for HashValue {
    fn from(name: &'a str) -> Self {
        HashValue(hash::hash64(name))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::utils::hash::FastHashMap;

    #[test]
    fn keys_by_name() {
        let owned = String::from("u_ModelViewMatrix");
        assert_eq!(HashValue::from("u_ModelViewMatrix"), HashValue::from(owned.as_str()));
        assert_ne!(HashValue::from("u_ModelViewMatrix"), HashValue::from("u_ViewMatrix"));

        let mut locations = FastHashMap::default();
        locations.insert(HashValue::from("u_Color"), 3);
        assert_eq!(locations.get(&HashValue::from("u_Color")), Some(&3));
        assert_eq!(locations.get(&HashValue::from("u_Colour")), None);
    }
}
