//! Payload generation.
//!
//! Every timed write carries a freshly generated buffer. The content only needs
//! to be unique per call, so the thread-local RNG is used rather than a seeded one.

use rand::RngCore;

/// Generate `size` random bytes.
pub fn generate(size: usize) -> Vec<u8> {
    let mut buf = vec![0u8; size];
    rand::thread_rng().fill_bytes(&mut buf);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_length() {
        for size in [1, 7, 256, 4096] {
            assert_eq!(generate(size).len(), size);
        }
    }

    #[test]
    fn test_successive_calls_differ() {
        let a = generate(64);
        let b = generate(64);
        assert_ne!(a, b);
    }
}
