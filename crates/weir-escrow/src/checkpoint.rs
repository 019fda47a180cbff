// crates/weir-escrow/src/checkpoint.rs
//
// Append-only weight checkpoint series.
//
// Every weight-changing operation records (sequence_point, weight); the
// series answers "weight as of sequence point S" by binary search for the
// greatest recorded point <= S. Recording twice at one sequence point
// replaces the last entry, so each point maps to at most one weight.

use serde::{Deserialize, Serialize};

use weir_core::error::WeirError;
use weir_core::types::{Amount, SequencePoint};

/// One recorded weight change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Sequence point at which the weight took effect.
    pub sequence_point: SequencePoint,
    /// Weight in effect from this point until the next checkpoint.
    pub weight: Amount,
}

/// A per-account (or total) checkpoint history, sorted by sequence point.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckpointSeries {
    points: Vec<Checkpoint>,
}

impl CheckpointSeries {
    /// Empty series.
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Record the weight in effect from `sequence_point` on.
    ///
    /// # Errors
    /// Returns `WeirError::InvalidInput` if `sequence_point` is earlier
    /// than the latest recorded point; history is append-only.
    pub fn record(
        &mut self,
        sequence_point: SequencePoint,
        weight: Amount,
    ) -> Result<(), WeirError> {
        if let Some(last) = self.points.last_mut() {
            if sequence_point < last.sequence_point {
                return Err(WeirError::InvalidInput(format!(
                    "checkpoint sequence point {} precedes the latest recorded point {}",
                    sequence_point, last.sequence_point
                )));
            }
            if sequence_point == last.sequence_point {
                last.weight = weight;
                return Ok(());
            }
        }
        self.points.push(Checkpoint {
            sequence_point,
            weight,
        });
        Ok(())
    }

    /// Weight in effect at `sequence_point`: the weight of the checkpoint
    /// with the greatest sequence point <= the query. Returns 0 before the
    /// first checkpoint.
    pub fn value_at(&self, sequence_point: SequencePoint) -> Amount {
        let idx = self
            .points
            .partition_point(|c| c.sequence_point <= sequence_point);
        if idx == 0 {
            0
        } else {
            self.points[idx - 1].weight
        }
    }

    /// Weight recorded by the latest checkpoint, or 0 if none.
    pub fn latest(&self) -> Amount {
        self.points.last().map(|c| c.weight).unwrap_or(0)
    }

    /// Sequence point of the latest checkpoint, if any.
    pub fn last_sequence_point(&self) -> Option<SequencePoint> {
        self.points.last().map(|c| c.sequence_point)
    }

    /// Number of checkpoints recorded.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True if no checkpoint has been recorded.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
