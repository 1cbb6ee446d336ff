use tracing::debug;

use crate::error::{PlanError, Result};
use crate::types::{BarOrigin, CutRecord, Length, PlanConfig, RemnantInstance, UnitPiece, WorkingBar};

/// Supplies identifiers for newly opened standard bars.
pub trait IdSource {
    fn next_id(&mut self) -> String;
}

/// Monotonic `prefix-1`, `prefix-2`, ... identifiers.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 0,
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new("new")
    }
}

impl IdSource for SequentialIds {
    fn next_id(&mut self) -> String {
        self.next += 1;
        format!("{}-{}", self.prefix, self.next)
    }
}

/// Best-fit-decreasing packer for the pieces of a single diameter class.
pub struct Packer<I> {
    config: PlanConfig,
    ids: I,
}

impl<I: IdSource> Packer<I> {
    pub fn new(config: PlanConfig, ids: I) -> Self {
        Self { config, ids }
    }

    /// Places every piece, trying open bars first, then unused remnants,
    /// then a fresh standard bar. Bars come back in opening order.
    pub fn pack(
        &mut self,
        mut pieces: Vec<UnitPiece>,
        mut remnants: Vec<RemnantInstance>,
    ) -> Result<Vec<WorkingBar>> {
        // Both sorts are stable: equal lengths keep their input order.
        pieces.sort_by(|a, b| b.length.cmp(&a.length));
        remnants.sort_by(|a, b| a.length.cmp(&b.length));

        let kerf = self.config.kerf_loss;
        let mut bars: Vec<WorkingBar> = Vec::new();

        for piece in pieces {
            if let Some(bi) = self.best_open_bar(&bars, piece.length) {
                let bar = &mut bars[bi];
                bar.remaining = bar.remaining.saturating_sub(piece.length.saturating_add(kerf));
                debug!(
                    bar = %bar.id,
                    piece = %piece.length,
                    remaining = %bar.remaining,
                    "piece added to open bar"
                );
                bar.cuts.push(CutRecord {
                    length: piece.length,
                    metadata: piece.metadata,
                });
            } else if let Some(ri) = best_remnant(&remnants, piece.length) {
                let remnant = &mut remnants[ri];
                remnant.consumed = true;
                let origin = BarOrigin::FromRemnant {
                    remnant_id: remnant.stock_id.clone(),
                };
                let bar = self.open_bar(remnant.stock_id.clone(), origin, remnant.length, piece);
                debug!(
                    remnant = %bar.id,
                    length = %bar.original_length,
                    remaining = %bar.remaining,
                    "remnant opened"
                );
                bars.push(bar);
            } else {
                let standard = self.config.standard_bar_length;
                if piece.length > standard {
                    return Err(PlanError::ExceedsMaximumLength {
                        diameter: piece.diameter,
                        length: piece.length,
                        max: standard,
                        metadata: piece.metadata,
                    });
                }
                let id = self.ids.next_id();
                let bar = self.open_bar(id, BarOrigin::NewStandard, standard, piece);
                debug!(bar = %bar.id, remaining = %bar.remaining, "new standard bar opened");
                bars.push(bar);
            }
        }

        Ok(bars)
    }

    /// Open bar leaving the least waste; the earliest bar wins ties.
    fn best_open_bar(&self, bars: &[WorkingBar], piece: Length) -> Option<usize> {
        let needed = piece.checked_add(self.config.kerf_loss)?;
        let mut best: Option<(usize, Length)> = None;
        for (bi, bar) in bars.iter().enumerate() {
            if let Some(waste) = bar.remaining.checked_sub(needed)
                && best.is_none_or(|(_, w)| waste < w)
            {
                best = Some((bi, waste));
            }
        }
        best.map(|(bi, _)| bi)
    }

    fn open_bar(&self, id: String, origin: BarOrigin, length: Length, piece: UnitPiece) -> WorkingBar {
        // A cut that ends at the bar end may lose less than a full kerf.
        let remaining = length.saturating_sub(piece.length.saturating_add(self.config.kerf_loss));
        WorkingBar {
            id,
            origin,
            original_length: length,
            remaining,
            cuts: vec![CutRecord {
                length: piece.length,
                metadata: piece.metadata,
            }],
        }
    }
}

/// Remnants are sorted ascending, so the first unconsumed one that is long
/// enough is also the one leaving the least waste.
fn best_remnant(remnants: &[RemnantInstance], piece: Length) -> Option<usize> {
    remnants
        .iter()
        .position(|r| !r.consumed && r.length >= piece)
}
