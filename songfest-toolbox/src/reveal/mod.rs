//! Staged reveal sequences for a results board.
//!
//! Every scheduler here is a plain state machine: `tick()` performs the
//! next step and `next_delay()` tells the driver how long to wait before
//! calling it again. Nothing inside touches the wall clock, so tests can
//! run a whole show synchronously while the CLI sleeps for real between
//! ticks. Starting a scheduler that is already mid-flight is always a
//! silent no-op, and dropping or resetting one cancels everything pending
//! because the pending step only lives in its state.

mod distribution;
mod draw;
mod guard;
mod sequential;

pub use distribution::{Bucket, DistributionEvent, DistributionReveal, DISTRIBUTION_BUFFER};
pub use draw::{
    DrawEvent, DrawReveal, Seed, FINALIST_CUT, SETTLE_HOLD, TRAVEL_FIRST_HOP, TRAVEL_HOP_GROWTH,
    TRAVEL_MAX, TRAVEL_MIN,
};
pub use guard::{ResetGuard, RESET_COUNTDOWN_SECS};
pub use sequential::{SequentialEvent, SequentialReveal, REVEAL_INTERVAL, SORT_PAUSE};
