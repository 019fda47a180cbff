// crates/weir-escrow/src/boost.rs
//
// Lock-duration boost curve.
//
// Locking principal for longer earns proportionally more weight: the boost
// is a linear interpolation from 1.0x at the minimum lock duration to 2.0x
// at the maximum. Boosts are expressed in basis points so the endpoints
// are exact under integer math.

use weir_core::error::WeirError;
use weir_core::types::{Amount, BPS_DENOMINATOR};

/// Minimum lock duration: 1 week in seconds.
pub const MIN_LOCK_SECS: u64 = 604_800;

/// Maximum lock duration: 4 years (1,460 days) in seconds.
pub const MAX_LOCK_SECS: u64 = 126_144_000;

/// Boost at the minimum lock duration: 10,000 bps = 1.0x.
pub const BOOST_MIN_BPS: u64 = 10_000;

/// Boost at the maximum lock duration: 20,000 bps = 2.0x.
pub const BOOST_MAX_BPS: u64 = 20_000;

/// Compute the boost (in bps) for a lock of `duration` seconds.
///
/// Durations outside `[MIN_LOCK_SECS, MAX_LOCK_SECS]` are rejected, not
/// clamped.
///
/// # Errors
/// Returns `WeirError::InvalidInput` if the duration is out of bounds.
pub fn boost_bps(duration: u64) -> Result<u64, WeirError> {
    if duration < MIN_LOCK_SECS {
        return Err(WeirError::InvalidInput(format!(
            "lock duration {}s is below the minimum of {}s",
            duration, MIN_LOCK_SECS
        )));
    }
    if duration > MAX_LOCK_SECS {
        return Err(WeirError::InvalidInput(format!(
            "lock duration {}s exceeds the maximum of {}s",
            duration, MAX_LOCK_SECS
        )));
    }
    Ok(interpolate(duration))
}

/// Boost for a remaining duration when recomputing an existing lock.
///
/// Existing locks drift below the minimum duration as time passes; the
/// recompute path floors them at the minimum boost instead of rejecting.
pub fn boost_bps_remaining(duration: u64) -> u64 {
    if duration <= MIN_LOCK_SECS {
        return BOOST_MIN_BPS;
    }
    if duration >= MAX_LOCK_SECS {
        return BOOST_MAX_BPS;
    }
    interpolate(duration)
}

fn interpolate(duration: u64) -> u64 {
    let span = MAX_LOCK_SECS - MIN_LOCK_SECS;
    let range = BOOST_MAX_BPS - BOOST_MIN_BPS;
    BOOST_MIN_BPS + (duration - MIN_LOCK_SECS) * range / span
}

/// Weight minted for `principal` locked for `duration` seconds:
/// `principal * boost / 10_000`.
pub fn weight_for(principal: Amount, boost_bps: u64) -> Amount {
    principal * boost_bps as Amount / BPS_DENOMINATOR as Amount
}
