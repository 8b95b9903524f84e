//! Search constants.
//!
//! Tunable margins live in [`SearchParams`](super::SearchParams); the values
//! here are structural and never change at runtime.

use crate::board::MAX_PLY;

// ============================================================================
// SCORE BOUNDS
// ============================================================================

/// Larger than any reachable score; the initial search window is `(-INF, INF)`.
pub const INF: i32 = 50_000;

/// Score of delivering mate at the root. Mate found at ply `p` scores `MATE - p`.
pub const MATE: i32 = 49_000;

/// Scores with absolute value above this encode a forced mate.
pub const MATE_BOUND: i32 = MATE - MAX_PLY as i32;

// ============================================================================
// MOVE ORDERING PRIORITIES
// ============================================================================
// Higher scores = tried earlier. TT > good captures > killers > counter > quiets > bad captures

/// Hash move (from transposition table)
pub const TT_MOVE_SCORE: i32 = 2_000_000;

/// Base for captures and promotions that do not lose material
pub const CAPTURE_BASE: i32 = 1_000_000;

/// Subtracted from captures that lose material (SEE < 0); drops them below quiets
pub const BAD_CAPTURE_PENALTY: i32 = 1_200_000;

/// First killer move (quiet that caused beta cutoff at same ply)
pub const KILLER1_SCORE: i32 = 900_000;

/// Second killer move
pub const KILLER2_SCORE: i32 = 800_000;

/// Counter move (quiet that refuted the opponent's previous move)
pub const COUNTER_SCORE: i32 = 700_000;

// ============================================================================
// HISTORY
// ============================================================================

/// Saturation bound for history gravity updates
pub const HISTORY_MAX: i32 = 32_768;

/// Largest single history bonus (depth² is capped to this)
pub const HISTORY_BONUS_MAX: i32 = 400;

// ============================================================================
// REDUCTIONS
// ============================================================================

/// LMR reduction table dimensions (depth x move index)
pub const LMR_TABLE_MAX_DEPTH: usize = 64;
pub const LMR_TABLE_MAX_IDX: usize = 64;

// ============================================================================
// CANCELLATION
// ============================================================================

/// Stop conditions are polled when `nodes & NODE_POLL_MASK == 0`
pub const NODE_POLL_MASK: u64 = 2047;

/// Upper bound on iterative deepening depth
pub const MAX_SEARCH_DEPTH: u32 = MAX_PLY as u32 - 1;
