//! Chronologically sortable node keys.
//!
//! A key is 20 characters from a 64-character alphabet ordered by ASCII
//! value: 8 characters encode the creation time in milliseconds, the other
//! 12 are random. When two keys are generated in the same millisecond the
//! random part of the previous key is incremented instead of redrawn, so
//! keys from one generator always sort in creation order.

use rand::Rng;

const PUSH_CHARS: &[u8; 64] = b"-0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";
const TIME_CHARS: usize = 8;
const RANDOM_CHARS: usize = 12;

pub const PUSH_ID_LEN: usize = TIME_CHARS + RANDOM_CHARS;

#[derive(Debug, Default)]
pub struct PushIdGenerator {
    last_time: Option<i64>,
    last_random: [u8; RANDOM_CHARS],
}

impl PushIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generates a key for the current wall-clock time.
    pub fn next(&mut self) -> String {
        self.next_at(chrono::Utc::now().timestamp_millis())
    }

    /// Generates a key for `now_ms` milliseconds since the epoch.
    pub fn next_at(&mut self, now_ms: i64) -> String {
        let duplicate = self.last_time == Some(now_ms);
        self.last_time = Some(now_ms);

        let mut key = Vec::with_capacity(PUSH_ID_LEN);
        let mut time = now_ms.max(0);
        let mut time_chars = [0u8; TIME_CHARS];
        for slot in time_chars.iter_mut().rev() {
            *slot = PUSH_CHARS[(time % 64) as usize];
            time /= 64;
        }
        key.extend_from_slice(&time_chars);

        if duplicate {
            self.increment_random();
        } else {
            let mut rng = rand::rng();
            for slot in self.last_random.iter_mut() {
                *slot = rng.random_range(0..64);
            }
        }
        key.extend(self.last_random.iter().map(|&index| PUSH_CHARS[index as usize]));

        // Only alphabet bytes were pushed.
        String::from_utf8(key).unwrap_or_default()
    }

    fn increment_random(&mut self) {
        for slot in self.last_random.iter_mut().rev() {
            if *slot == 63 {
                *slot = 0;
            } else {
                *slot += 1;
                return;
            }
        }
    }
}
