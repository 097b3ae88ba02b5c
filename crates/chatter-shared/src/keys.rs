//! Push key generation.
//!
//! Keys are 20 characters: 8 encode the millisecond timestamp and 12 are
//! random. Keys generated later sort after earlier ones, including several
//! generated within the same millisecond (the random tail is incremented).

use std::sync::Mutex;

use rand::Rng;

use crate::constants::PUSH_ID_LEN;

/// Alphabet in ASCII order, so lexicographic key order is creation order.
const PUSH_CHARS: &[u8; 64] = b"-0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";

const TIME_LEN: usize = 8;
const RANDOM_LEN: usize = PUSH_ID_LEN - TIME_LEN;

#[derive(Debug, Default)]
struct KeyState {
    last_time: i64,
    last_random: [u8; RANDOM_LEN],
}

#[derive(Debug, Default)]
pub struct PushKeyGenerator {
    state: Mutex<KeyState>,
}

impl PushKeyGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key for the current wall-clock time. `None` if the generator state is
    /// poisoned.
    pub fn next_key(&self) -> Option<String> {
        self.next_key_at(chrono::Utc::now().timestamp_millis())
    }

    pub fn next_key_at(&self, now_ms: i64) -> Option<String> {
        let mut state = self.state.lock().ok()?;

        if now_ms == state.last_time {
            // Same millisecond: bump the random tail by one, carrying leftward.
            for digit in state.last_random.iter_mut().rev() {
                if *digit == 63 {
                    *digit = 0;
                } else {
                    *digit += 1;
                    break;
                }
            }
        } else {
            let mut rng = rand::thread_rng();
            for digit in state.last_random.iter_mut() {
                *digit = rng.gen_range(0..64);
            }
            state.last_time = now_ms;
        }

        let mut out = [0u8; PUSH_ID_LEN];
        let mut time = now_ms.max(0) as u64;
        for slot in out[..TIME_LEN].iter_mut().rev() {
            *slot = PUSH_CHARS[(time % 64) as usize];
            time /= 64;
        }
        for (slot, digit) in out[TIME_LEN..].iter_mut().zip(state.last_random.iter()) {
            *slot = PUSH_CHARS[*digit as usize];
        }

        String::from_utf8(out.to_vec()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_have_fixed_length() {
        let gen = PushKeyGenerator::new();
        let key = gen.next_key().unwrap();
        assert_eq!(key.len(), PUSH_ID_LEN);
    }

    #[test]
    fn keys_sort_chronologically() {
        let gen = PushKeyGenerator::new();
        let a = gen.next_key_at(1_000).unwrap();
        let b = gen.next_key_at(1_000).unwrap();
        let c = gen.next_key_at(2_000).unwrap();
        assert!(a < b, "{a} should sort before {b}");
        assert!(b < c, "{b} should sort before {c}");
    }

    #[test]
    fn keys_are_unique_within_a_millisecond() {
        let gen = PushKeyGenerator::new();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            assert!(seen.insert(gen.next_key_at(42).unwrap()));
        }
    }
}
