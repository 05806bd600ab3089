/// Random sources for the jittered line strategies
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of uniform samples in `[0, 1)`.
///
/// The quantum strategy draws from one of these so that tests can pin the
/// sequence with a fixed seed.
pub trait JitterSource {
    fn next_unit(&mut self) -> f32;

    /// Uniform sample in `[-0.5, 0.5)`
    fn deviation(&mut self) -> f32 {
        self.next_unit() - 0.5
    }
}

/// Non-cryptographic xorshift64* generator
#[derive(Debug, Clone)]
pub struct XorShiftJitter {
    state: u64,
}

impl XorShiftJitter {
    pub fn new(seed: u64) -> Self {
        // A zero state never leaves zero.
        let state = if seed == 0 {
            0x9E37_79B9_7F4A_7C15
        } else {
            seed
        };
        Self { state }
    }

    /// Seed from the wall clock
    pub fn from_time() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        Self::new(nanos ^ 0x9E37_79B9_7F4A_7C15)
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut state = self.state;
        state ^= state >> 12;
        state ^= state << 25;
        state ^= state >> 27;
        self.state = state;
        state.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }
}

impl JitterSource for XorShiftJitter {
    fn next_unit(&mut self) -> f32 {
        // Top 24 bits fill the f32 mantissa exactly.
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }
}

/// A source that always yields the same value, for deterministic tests
#[derive(Debug, Clone, Copy)]
pub struct FixedJitter(pub f32);

impl JitterSource for FixedJitter {
    fn next_unit(&mut self) -> f32 {
        self.0
    }
}
