//! Board module tests.
//!
//! Tests are organized into separate files by category:
//! - `perft.rs` - node counts against published reference values
//! - `make_move.rs` - move execution, special moves and hashing
//! - `fen.rs` - FEN parsing, validation and serialization
//! - `see.rs` - static exchange evaluation
//! - `search.rs` - end-to-end search behaviour
//! - `proptest.rs` - property-based tests

mod fen;
mod perft;
mod search;
