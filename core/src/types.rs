//! Shared primitive types used across the board.

/// A scheduler tick count. One tick = one firing of a periodic timer.
pub type Tick = u64;

/// Master seed for the metric walk.
pub type Seed = u64;
