// crates/weir-distribution/src/scan.rs
//
// Bounded epoch-scan window shared by every claim path.
//
// A caller who claims rarely against a frequently-depositing system would
// otherwise face an unbounded-cost call; clamping each claim to a fixed
// number of epochs makes worst-case per-call cost constant at the price of
// possibly needing several calls to catch up.

/// Hard per-call bound on the number of epochs one claim may fold in.
pub const MAX_EPOCHS_PER_CLAIM: u64 = 100;

/// Resolve the half-open epoch window `[start, end)` a claim will scan.
///
/// `start` is the caller's cursor. `end` is the requested end clamped to
/// the log length and to `start + MAX_EPOCHS_PER_CLAIM`, and never below
/// `start` (a request entirely behind the cursor yields an empty window).
pub fn scan_window(start: u64, requested_end: u64, len: u64) -> (u64, u64) {
    let end = requested_end
        .min(len)
        .min(start.saturating_add(MAX_EPOCHS_PER_CLAIM))
        .max(start);
    (start, end)
}
