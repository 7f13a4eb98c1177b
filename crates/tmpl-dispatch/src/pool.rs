//! Reusable output buffers.
//!
//! [`BufferPool::acquire`] hands out a [`PooledBuffer`] lease. The lease owns
//! its buffer exclusively and returns it to the pool when dropped, so every
//! exit path (including `?` and panics unwinding through the caller) releases
//! exactly once.

use std::ops::{Deref, DerefMut};
use std::str::Utf8Error;
use std::sync::{Mutex, PoisonError};

use crate::config::PoolConfig;

/// A thread-safe pool of byte buffers.
#[derive(Debug)]
pub struct BufferPool {
    idle: Mutex<Vec<Vec<u8>>>,
    max_retained: usize,
    max_buffer_capacity: usize,
}

impl BufferPool {
    pub fn new(config: PoolConfig) -> Self {
        Self {
            idle: Mutex::new(Vec::new()),
            max_retained: config.max_retained,
            max_buffer_capacity: config.max_buffer_capacity,
        }
    }

    /// Leases an empty buffer, reusing an idle one when available.
    pub fn acquire(&self) -> PooledBuffer<'_> {
        let buf = self
            .idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop()
            .unwrap_or_default();
        debug_assert!(buf.is_empty());
        PooledBuffer { pool: self, buf }
    }

    /// Number of buffers waiting for reuse.
    pub fn idle_count(&self) -> usize {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn release(&self, mut buf: Vec<u8>) {
        if buf.capacity() > self.max_buffer_capacity {
            return;
        }
        buf.clear();
        let mut idle = self.idle.lock().unwrap_or_else(PoisonError::into_inner);
        if idle.len() < self.max_retained {
            idle.push(buf);
        }
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}

/// An exclusive lease on a pooled buffer; released on drop.
#[derive(Debug)]
pub struct PooledBuffer<'pool> {
    pool: &'pool BufferPool,
    buf: Vec<u8>,
}

impl PooledBuffer<'_> {
    /// Copies the contents out as text. The buffer itself stays with the
    /// lease, so the copy is needed before it goes back to the pool.
    pub fn to_utf8_string(&self) -> Result<String, Utf8Error> {
        std::str::from_utf8(&self.buf).map(str::to_owned)
    }
}

impl Deref for PooledBuffer<'_> {
    type Target = Vec<u8>;

    fn deref(&self) -> &Vec<u8> {
        &self.buf
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut Vec<u8> {
        &mut self.buf
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.buf));
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_acquire_returns_empty_buffer_after_reuse() {
        let pool = BufferPool::default();
        {
            let mut buf = pool.acquire();
            buf.extend_from_slice(b"leftover");
        }
        assert_eq!(pool.idle_count(), 1);

        let buf = pool.acquire();
        assert!(buf.is_empty());
        assert!(buf.capacity() >= b"leftover".len());
        assert_eq!(pool.idle_count(), 0);
    }

    #[test]
    fn test_to_utf8_string_rejects_invalid_bytes() {
        let pool = BufferPool::default();
        let mut buf = pool.acquire();
        buf.extend_from_slice("héllo".as_bytes());
        assert_eq!(buf.to_utf8_string().unwrap(), "héllo");

        buf.push(0xff);
        assert!(buf.to_utf8_string().is_err());
    }

    #[test]
    fn test_release_on_error_path() {
        fn fails(pool: &BufferPool) -> Result<(), std::io::Error> {
            let mut buf = pool.acquire();
            write!(buf, "partial output")?;
            Err(std::io::Error::other("boom"))
        }

        let pool = BufferPool::default();
        assert!(fails(&pool).is_err());
        assert_eq!(pool.idle_count(), 1);
        assert!(pool.acquire().is_empty());
    }

    #[test]
    fn test_oversized_buffers_are_dropped() {
        let pool = BufferPool::new(PoolConfig {
            max_retained: 4,
            max_buffer_capacity: 16,
        });
        {
            let mut buf = pool.acquire();
            buf.extend_from_slice(&[0u8; 64]);
        }
        assert_eq!(pool.idle_count(), 0);
    }

    #[test]
    fn test_retention_limit() {
        let pool = BufferPool::new(PoolConfig {
            max_retained: 2,
            max_buffer_capacity: 1024,
        });
        let leases: Vec<_> = (0..5).map(|_| pool.acquire()).collect();
        drop(leases);
        assert_eq!(pool.idle_count(), 2);
    }

    #[test]
    fn test_concurrent_leases_are_exclusive() {
        let pool = BufferPool::default();
        std::thread::scope(|s| {
            for i in 0..32u8 {
                let pool = &pool;
                s.spawn(move || {
                    for _ in 0..200 {
                        let mut buf = pool.acquire();
                        assert!(buf.is_empty());
                        buf.extend(std::iter::repeat(i).take(128));
                        assert!(buf.iter().all(|&b| b == i));
                    }
                });
            }
        });
        assert!(pool.idle_count() <= PoolConfig::default().max_retained);
    }
}
