//! Cars closest to the player on track.
//!
//! Gaps are measured along the lap, not by position: a car half a lap or less
//! in front is ahead, anything further round the lap is behind.

use std::cmp::Ordering;

use super::builder::{CarDataBuilder, round_to};
use super::context::SessionContext;
use super::record::{LapStatus, NeighborRecord, Neighbors};

/// Forward lap-fraction gap from `from` to `to`, in `[0, 1)`.
pub fn circular_gap(from: f64, to: f64) -> f64 {
    (to - from).rem_euclid(1.0)
}

#[derive(Debug, Clone, Copy)]
pub struct NeighborsService {
    limit: usize,
}

struct Candidate {
    idx: usize,
    /// Positive ahead, negative behind
    gap: f64,
}

impl NeighborsService {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    /// Up to `limit` cars each side of `player_idx`, closest first.
    ///
    /// `lap_time` converts gaps into seconds; without it `gap_sec` is `None`.
    pub fn get_neighbors(
        &self,
        player_idx: usize,
        ctx: &SessionContext<'_>,
        builder: &mut CarDataBuilder,
        lap_time: Option<f64>,
    ) -> Neighbors {
        let Some(my_dist) = ctx.lap_dist(player_idx) else {
            return Neighbors::default();
        };

        let (mut ahead, mut behind): (Vec<_>, Vec<_>) = ctx
            .car_indices()
            .filter(|&idx| idx != player_idx)
            .filter_map(|idx| {
                let gap = circular_gap(my_dist, ctx.lap_dist(idx)?);
                match gap {
                    g if g == 0.0 => None,
                    g if g <= 0.5 => Some(Candidate { idx, gap: g }),
                    g => Some(Candidate { idx, gap: g - 1.0 }),
                }
            })
            .partition(|candidate| candidate.gap > 0.0);

        ahead.sort_by(|a, b| a.gap.partial_cmp(&b.gap).unwrap_or(Ordering::Equal));
        behind.sort_by(|a, b| b.gap.partial_cmp(&a.gap).unwrap_or(Ordering::Equal));

        let my_laps = ctx.laps_started(player_idx);
        let mut finish = |candidates: Vec<Candidate>| -> Vec<NeighborRecord> {
            candidates
                .into_iter()
                .filter_map(|candidate| {
                    let car = builder.build(candidate.idx, ctx)?;
                    let lap_status = match car.laps_started.cmp(&my_laps) {
                        Ordering::Greater => Some(LapStatus::AheadLap),
                        Ordering::Less => Some(LapStatus::BehindLap),
                        Ordering::Equal => None,
                    };
                    Some(NeighborRecord {
                        car,
                        lap_status,
                        gap_pct: round_to(candidate.gap.abs(), 3),
                        gap_sec: lap_time.map(|t| round_to((candidate.gap * t).abs(), 2)),
                    })
                })
                .take(self.limit)
                .collect()
        };

        let ahead = finish(ahead);
        let behind = finish(behind);
        Neighbors { ahead, behind }
    }
}
