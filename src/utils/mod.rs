//! Handles, pools and the hashing helpers shared by the video and scene layers.

#[macro_use]
pub mod handle;
pub mod double_buf;
pub mod hash;
pub mod hash_value;
pub mod object_pool;

pub use self::double_buf::DoubleBuf;
pub use self::handle::{Handle, HandleIndex, HandleLike};
pub use self::hash_value::HashValue;
pub use self::object_pool::ObjectPool;
