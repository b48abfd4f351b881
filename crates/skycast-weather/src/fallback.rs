//! Placeholder air-quality values used when the real lookup fails.

use rand::Rng;

/// Supplies a PM2.5 value when the air-quality request fails.
pub trait AqiFallback: Send + Sync {
    fn placeholder(&self) -> u32;
}

/// Uniform integer in `[1, 50]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomAqiFallback;

impl RandomAqiFallback {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 50;
}

impl AqiFallback for RandomAqiFallback {
    fn placeholder(&self) -> u32 {
        rand::thread_rng().gen_range(Self::MIN..=Self::MAX)
    }
}

/// Always the same value. Used by tests and by callers that prefer a stable placeholder.
#[derive(Debug, Clone, Copy)]
pub struct FixedAqiFallback(pub u32);

impl AqiFallback for FixedAqiFallback {
    fn placeholder(&self) -> u32 {
        self.0
    }
}
