use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A pair of buffers where a producer fills the write side while a consumer
/// reads the other. `swap` publishes the write side atomically.
pub struct DoubleBuf<T> {
    wbuf: RwLock<T>,
    rbuf: RwLock<T>,
}

impl<T: Default> Default for DoubleBuf<T> {
    fn default() -> Self {
        DoubleBuf {
            wbuf: RwLock::new(Default::default()),
            rbuf: RwLock::new(Default::default()),
        }
    }
}

impl<T> DoubleBuf<T> {
    #[inline]
    pub fn new(w: T, r: T) -> Self {
        DoubleBuf {
            wbuf: RwLock::new(w),
            rbuf: RwLock::new(r),
        }
    }

    #[inline]
    pub fn write(&self) -> RwLockWriteGuard<T> {
        self.wbuf.write()
    }

    #[inline]
    pub fn read(&self) -> RwLockReadGuard<T> {
        self.rbuf.read()
    }

    #[inline]
    pub fn swap(&self) {
        let mut wbuf = self.wbuf.write();
        let mut rbuf = self.rbuf.write();
        ::std::mem::swap::<T>(&mut wbuf, &mut rbuf);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn swap() {
        let buf = DoubleBuf::<Vec<u32>>::default();
        buf.write().push(1);
        assert!(buf.read().is_empty());

        buf.swap();
        assert_eq!(&*buf.read(), &[1]);
        assert!(buf.write().is_empty());
    }
}
