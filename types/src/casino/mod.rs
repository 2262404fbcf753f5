//! Casino domain types.
//!
//! Defines bet identifiers, settlement records, player and pot state, and constants used by the
//! execution layer and clients.

mod bet;
mod constants;
mod player;
mod settlement;

pub use bet::*;
pub use constants::*;
pub use player::*;
pub use settlement::*;
