use std::fmt;
use std::hash::Hash;

pub type HandleIndex = u32;

/// A weak reference into a pool. The slot `index` is reused after the object
/// it named is freed, and `generation` is bumped on every reuse so stale
/// handles stop resolving. Generation zero never names anything.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Handle {
    index: HandleIndex,
    generation: HandleIndex,
}

impl Handle {
    #[inline]
    pub fn new(index: HandleIndex, generation: HandleIndex) -> Self {
        Handle { index, generation }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.generation != 0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// Implemented by every typed handle, so pools and backend tables can be
/// generic over them.
pub trait HandleLike: fmt::Debug + fmt::Display + Copy + Hash + Eq + Send + Sync {
    fn new(index: HandleIndex, version: HandleIndex) -> Self;
    fn index(&self) -> HandleIndex;
    fn version(&self) -> HandleIndex;
}

impl HandleLike for Handle {
    fn new(index: HandleIndex, version: HandleIndex) -> Self {
        Handle::new(index, version)
    }

    fn index(&self) -> HandleIndex {
        self.index
    }

    fn version(&self) -> HandleIndex {
        self.generation
    }
}

/// Declares `$name` as a distinct handle type, so a texture handle can never
/// be passed where a mesh handle is expected.
#[macro_export]
macro_rules! impl_handle {
    ($name:ident) => {
        #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name($crate::utils::handle::Handle);

        impl From<$crate::utils::handle::Handle> for $name {
            fn from(handle: $crate::utils::handle::Handle) -> Self {
                $name(handle)
            }
        }

        impl $crate::utils::handle::HandleLike for $name {
            fn new(
                index: $crate::utils::handle::HandleIndex,
                version: $crate::utils::handle::HandleIndex,
            ) -> Self {
                $name($crate::utils::handle::Handle::new(index, version))
            }

            fn index(&self) -> $crate::utils::handle::HandleIndex {
                $crate::utils::handle::HandleLike::index(&self.0)
            }

            fn version(&self) -> $crate::utils::handle::HandleIndex {
                $crate::utils::handle::HandleLike::version(&self.0)
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                write!(f, "{}{}", stringify!($name), self.0)
            }
        }
    };
}
