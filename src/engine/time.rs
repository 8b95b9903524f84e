//! Time management.
//!
//! Turns `go` parameters into [`SearchLimits`]: an optional depth and node
//! limit plus a soft/hard [`TimeBudget`] for the clock.

use crate::board::Color;

use super::clock::TimeBudget;

/// Configuration for time management calculations.
#[derive(Debug, Clone, Copy)]
pub struct TimeConfig {
    /// Time to reserve for move overhead (communication latency, etc.)
    pub move_overhead_ms: u64,
    /// No budget is ever smaller than this
    pub min_think_ms: u64,
    /// Hard budget as a multiple of the soft one
    pub hard_multiplier: u64,
    /// Hard budget never exceeds remaining time divided by this
    pub hard_cap_divisor: u64,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            move_overhead_ms: 30,
            min_think_ms: 10,
            hard_multiplier: 3,
            hard_cap_divisor: 2,
        }
    }
}

/// Time control settings for a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeControl {
    /// Infinite search - no time limit
    #[default]
    Infinite,
    /// Fixed depth search - no time limit, depth controlled externally
    Depth,
    /// Fixed time per move
    MoveTime { time_ms: u64 },
    /// Standard time control with remaining time and increment
    Incremental {
        time_left_ms: u64,
        inc_ms: u64,
        movestogo: Option<u64>,
    },
}

impl TimeControl {
    /// Create a fixed move time control from milliseconds.
    #[must_use]
    pub fn move_time_ms(time_ms: u64) -> Self {
        TimeControl::MoveTime { time_ms }
    }

    /// Budget for this time control; `None` when unlimited.
    ///
    /// `phase` is the material phase of the position (24 = opening, 0 =
    /// pawn endgame), used to estimate how many moves remain.
    #[must_use]
    pub fn compute_limits(&self, phase: i32, config: &TimeConfig) -> Option<TimeBudget> {
        match *self {
            TimeControl::Infinite | TimeControl::Depth => None,
            TimeControl::MoveTime { time_ms } => Some(TimeBudget::fixed(
                time_ms
                    .saturating_sub(config.move_overhead_ms)
                    .max(config.min_think_ms),
            )),
            TimeControl::Incremental {
                time_left_ms,
                inc_ms,
                movestogo,
            } => Some(incremental_budget(
                time_left_ms,
                inc_ms,
                movestogo,
                phase,
                config,
            )),
        }
    }
}

/// Moves still to play when the GUI does not say: more material, longer game.
fn expected_moves(phase: i32) -> u64 {
    (20 + phase).clamp(15, 50) as u64
}

fn incremental_budget(
    time_left_ms: u64,
    inc_ms: u64,
    movestogo: Option<u64>,
    phase: i32,
    config: &TimeConfig,
) -> TimeBudget {
    let usable = time_left_ms.saturating_sub(config.move_overhead_ms);
    let moves = movestogo
        .filter(|&n| n > 0)
        .unwrap_or_else(|| expected_moves(phase));

    let mut alloc = usable / moves + inc_ms * 4 / 5;
    if phase > 16 {
        alloc = alloc * 11 / 10;
    }

    // Never spend more than a fraction of the clock, tighter when short
    let (cap_divisor, margin) = match time_left_ms {
        t if t > 60_000 => (5, 30),
        t if t > 10_000 => (6, 10),
        t if t > 3_000 => (8, 5),
        _ => (10, 5),
    };
    alloc = alloc.min(time_left_ms / cap_divisor);
    let soft = alloc.saturating_sub(margin).max(config.min_think_ms);

    let hard = soft
        .saturating_mul(config.hard_multiplier)
        .min(usable / config.hard_cap_divisor.max(1))
        .max(soft);

    TimeBudget {
        soft_ms: soft,
        hard_ms: hard,
    }
}

/// Raw `go` parameters, as sent by the GUI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GoOptions {
    pub depth: Option<u32>,
    pub movetime: Option<u64>,
    pub wtime: Option<u64>,
    pub btime: Option<u64>,
    pub winc: Option<u64>,
    pub binc: Option<u64>,
    pub movestogo: Option<u64>,
    pub nodes: Option<u64>,
    pub infinite: bool,
    pub ponder: bool,
}

impl GoOptions {
    /// Time control for the side to move.
    #[must_use]
    pub fn time_control(&self, side: Color) -> TimeControl {
        if let Some(time_ms) = self.movetime {
            return TimeControl::move_time_ms(time_ms);
        }
        let (time_left, inc) = match side {
            Color::White => (self.wtime, self.winc),
            Color::Black => (self.btime, self.binc),
        };
        match time_left {
            Some(time_left_ms) => TimeControl::Incremental {
                time_left_ms,
                inc_ms: inc.unwrap_or(0),
                movestogo: self.movestogo,
            },
            None if self.depth.is_some() => TimeControl::Depth,
            None => TimeControl::Infinite,
        }
    }
}

/// Everything that bounds one search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchLimits {
    pub depth: Option<u32>,
    /// 0 = unlimited
    pub nodes: u64,
    /// Applies immediately, or after `ponderhit` when pondering
    pub budget: Option<TimeBudget>,
    pub ponder: bool,
    /// Hold the result until `stop`
    pub infinite: bool,
}

impl SearchLimits {
    /// Limits for a fixed-depth search.
    #[must_use]
    pub fn depth(depth: u32) -> Self {
        SearchLimits {
            depth: Some(depth),
            ..Default::default()
        }
    }

    /// Resolve `go` options for `side` in a position of material `phase`.
    #[must_use]
    pub fn from_go(go: &GoOptions, side: Color, phase: i32, config: &TimeConfig) -> Self {
        let budget = if go.infinite {
            None
        } else {
            go.time_control(side).compute_limits(phase, config)
        };
        SearchLimits {
            depth: go.depth,
            nodes: go.nodes.unwrap_or(0),
            budget,
            ponder: go.ponder,
            infinite: go.infinite,
        }
    }
}
