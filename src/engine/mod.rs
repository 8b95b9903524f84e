//! Engine controller for managing search and game state.
//!
//! This module sits between the protocol layer and the search: it owns the
//! game position and search state, runs searches on a background thread,
//! and turns clock parameters into time budgets.

pub mod clock;
mod controller;
pub mod time;

pub use clock::{SearchClock, StopToken, TimeBudget};
pub use controller::{EngineController, SearchJob};
pub use time::{GoOptions, SearchLimits, TimeConfig, TimeControl};
