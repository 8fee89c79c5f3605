//! Memory Block Registry
//!
//! Process-wide table of buffers handed across the boundary, keyed by each
//! buffer's own starting address. The host requests scratch blocks to write
//! input into, and result buffers are parked here until the host releases
//! them by address. Blocks that are never released persist for the process
//! lifetime; there is no garbage collection.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

lazy_static::lazy_static! {
    /// Live blocks, keyed by the address of their payload.
    static ref BLOCKS: Mutex<HashMap<usize, Vec<u8>>> = Mutex::new(HashMap::new());
}

fn blocks() -> MutexGuard<'static, HashMap<usize, Vec<u8>>> {
    BLOCKS.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Allocate a zero-filled buffer of `size` bytes and register it under its
/// own address. A zero-size request still yields a unique, valid, registered
/// block; no two live blocks ever share an address.
pub fn request(size: usize) -> *mut u8 {
    let mut data = Vec::with_capacity(size.max(1));
    data.resize(size, 0);
    adopt(data)
}

/// Register a buffer built inside the guest and hand out its address. Used
/// for result buffers, whose ownership transfers to the caller.
pub(crate) fn adopt(mut data: Vec<u8>) -> *mut u8 {
    if data.capacity() == 0 {
        data.reserve(1);
    }
    let addr = data.as_mut_ptr();
    blocks().insert(addr as usize, data);
    addr
}

/// Destroy the block registered at `addr`. Releasing an unknown or
/// already-released address is a silent no-op, so double frees and stray
/// frees stay harmless. A later `request` may legitimately hand the same
/// address out again.
pub fn release(addr: *mut u8) {
    blocks().remove(&(addr as usize));
}

#[cfg(test)]
pub(crate) fn is_registered(addr: *const u8) -> bool {
    blocks().contains_key(&(addr as usize))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_returns_live_block() {
        let addr = request(16);
        assert!(!addr.is_null());
        assert!(is_registered(addr));
        release(addr);
        assert!(!is_registered(addr));
    }

    #[test]
    fn test_zero_size_requests_get_unique_addresses() {
        let a = request(0);
        let b = request(0);
        assert!(!a.is_null());
        assert!(!b.is_null());
        assert_ne!(a, b);
        release(a);
        release(b);
    }

    #[test]
    fn test_buffer_is_zero_filled_and_writable() {
        let addr = request(4);
        unsafe {
            for i in 0..4 {
                assert_eq!(*addr.add(i), 0);
            }
            addr.write(0xAB);
            assert_eq!(*addr, 0xAB);
        }
        release(addr);
    }

    #[test]
    fn test_double_release_is_noop() {
        let keep = request(8);
        let addr = request(8);
        release(addr);
        release(addr);
        assert!(is_registered(keep));
        release(keep);
    }

    #[test]
    fn test_release_of_unknown_address_is_noop() {
        release(0x1 as *mut u8);
        release(std::ptr::null_mut());
    }

    #[test]
    fn test_release_then_request_pairs_cleanly() {
        let first = request(32);
        release(first);
        let second = request(32);
        assert!(!second.is_null());
        assert!(is_registered(second));
        release(second);
    }

    #[test]
    fn test_adopt_registers_existing_buffer() {
        let addr = adopt(vec![1, 2, 3]);
        assert!(is_registered(addr));
        unsafe {
            assert_eq!(*addr, 1);
            assert_eq!(*addr.add(2), 3);
        }
        release(addr);
    }
}
