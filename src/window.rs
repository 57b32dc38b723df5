//! Memory window sizes used for visibility analysis
//!
//! A window size is a power-of-two byte granularity. The analyzer evaluates a
//! whole family of them at once, by default 2^6 (64 B) through 2^16 (64 KiB).

use serde::Serialize;
use std::fmt;

/// Largest supported exponent; keeps `1 << exp` inside `u64` and `i128` math simple
pub const MAX_WINDOW_EXP: u32 = 62;

/// Default smallest window exponent (64 bytes)
pub const DEFAULT_MIN_WINDOW_EXP: u32 = 6;

/// Default largest window exponent (65536 bytes)
pub const DEFAULT_MAX_WINDOW_EXP: u32 = 16;

/// A power-of-two window size in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct WindowSize(u64);

impl WindowSize {
    /// Window of `2^exp` bytes
    pub fn from_exponent(exp: u32) -> Option<Self> {
        if exp > MAX_WINDOW_EXP {
            return None;
        }
        Some(Self(1u64 << exp))
    }

    /// Window of `bytes` bytes; `bytes` must be a power of two
    pub fn from_bytes(bytes: u64) -> Option<Self> {
        if bytes.is_power_of_two() && bytes.trailing_zeros() <= MAX_WINDOW_EXP {
            Some(Self(bytes))
        } else {
            None
        }
    }

    pub fn bytes(self) -> u64 {
        self.0
    }

    /// Index of the `self`-aligned window containing `addr` (floor division)
    #[inline]
    pub fn window_of(self, addr: i128) -> i128 {
        addr.div_euclid(self.0 as i128)
    }
}

impl fmt::Display for WindowSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered family of window sizes, ascending
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSizes {
    sizes: Vec<WindowSize>,
}

impl WindowSizes {
    /// All windows `2^min ..= 2^max`
    pub fn from_exponents(min: u32, max: u32) -> Result<Self, String> {
        if min > max {
            return Err(format!(
                "min window exponent ({}) must not exceed max window exponent ({})",
                min, max
            ));
        }
        if max > MAX_WINDOW_EXP {
            return Err(format!(
                "max window exponent must be <= {}, got {}",
                MAX_WINDOW_EXP, max
            ));
        }
        let sizes = (min..=max)
            .filter_map(WindowSize::from_exponent)
            .collect();
        Ok(Self { sizes })
    }

    pub fn iter(&self) -> impl Iterator<Item = WindowSize> + '_ {
        self.sizes.iter().copied()
    }

    pub fn as_slice(&self) -> &[WindowSize] {
        &self.sizes
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}

impl Default for WindowSizes {
    fn default() -> Self {
        let sizes = (DEFAULT_MIN_WINDOW_EXP..=DEFAULT_MAX_WINDOW_EXP)
            .filter_map(WindowSize::from_exponent)
            .collect();
        Self { sizes }
    }
}
