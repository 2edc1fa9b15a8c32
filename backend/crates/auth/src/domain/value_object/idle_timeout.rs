//! Idle Timeout Flag
//!
//! Stored as 0/1 next to each session. Callers may send any integer; only
//! `1` means idle, everything else collapses to `0`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(i16)]
pub enum IdleTimeout {
    /// Explicit logout, or still active
    #[default]
    NotIdle = 0,
    /// Ended by inactivity, or superseded by a newer login
    Idle = 1,
}

impl IdleTimeout {
    /// Normalize a caller-supplied flag
    pub fn from_flag(flag: i64) -> Self {
        if flag == 1 { Self::Idle } else { Self::NotIdle }
    }

    /// Get numeric ID for database storage
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    pub fn from_id(id: i16) -> Self {
        Self::from_flag(i64::from(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_defaults_to_not_idle() {
        assert_eq!(IdleTimeout::from_flag(1), IdleTimeout::Idle);
        assert_eq!(IdleTimeout::from_flag(0), IdleTimeout::NotIdle);
        assert_eq!(IdleTimeout::from_flag(7), IdleTimeout::NotIdle);
        assert_eq!(IdleTimeout::from_flag(-1), IdleTimeout::NotIdle);
        assert_eq!(IdleTimeout::Idle.id(), 1);
    }
}
