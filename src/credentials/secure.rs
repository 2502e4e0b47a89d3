//! Secure memory-clearing utilities.
//!
//! Best-effort zeroing of secrets using volatile writes so the compiler
//! cannot optimise the clear away.

/// Overwrite a `String`'s backing buffer with zeros, then truncate it.
///
/// Copies made by earlier reallocations, or handed to other libraries, are
/// out of reach.
pub fn secure_clear(s: &mut String) {
    // SAFETY: only zero bytes (valid single-byte UTF-8) are written and the
    // string is cleared immediately afterwards.
    let bytes = unsafe { s.as_mut_vec() };
    for byte in bytes.iter_mut() {
        // SAFETY: the pointer comes from a mutable reference into the Vec's
        // allocation, so it is valid, aligned and dereferenceable.
        unsafe {
            std::ptr::write_volatile(byte, 0);
        }
    }
    s.clear();
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn secure_clear_zeros_memory() {
        let mut s = String::from("gotify-app-token-12345");
        let ptr = s.as_ptr();
        let len = s.len();

        secure_clear(&mut s);

        assert!(s.is_empty());
        assert!(s.capacity() >= len);
        for i in 0..len {
            // SAFETY: the allocation is still owned (capacity >= len) and the
            // read stays within the original bounds.
            let byte = unsafe { *ptr.add(i) };
            assert_eq!(byte, 0, "byte at offset {i} was not zeroed");
        }
    }

    #[test]
    fn secure_clear_empty_string() {
        let mut s = String::new();
        secure_clear(&mut s);
        assert!(s.is_empty());
    }
}
