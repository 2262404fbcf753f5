//! European roulette (single zero) with the full inside and outside board.
//!
//! Bets:
//! - Straight (35:1), Split (17:1), Street (11:1), Corner (8:1), Line (5:1)
//! - Column, Dozen (2:1)
//! - Red/Black, Even/Odd, Low/High (1:1)
//!
//! Zero is covered by `Straight(0)` alone; every outside bet loses on zero.
//!
//! A round is a [`BetLedger`] plus its [`HistoryStack`]. Chips can be placed, undone and redone
//! freely until the round settles; only settlement moves money.

mod bets;
mod geometry;
mod history;
mod repeat;
pub mod resolver;
mod table;

#[cfg(test)]
mod proptests;

pub use bets::BetLedger;
pub use geometry::{
    all_bets, bets_covering, color_of, composites_at, members_of, neighbors_of,
    payout_multiplier, total_return, Hotspot, Neighbors, EVEN_MONEY,
};
pub use history::{HistoryEntry, HistoryStack};
pub use repeat::RepeatBuffer;
pub use table::RouletteTable;

use crate::state::LedgerError;
use babapoly_types::casino::BetIdError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum RouletteError {
    #[error("insufficient funds (staked={staked}, requested={requested}, balance={balance})")]
    InsufficientFunds {
        staked: u64,
        requested: u64,
        balance: u64,
    },
    #[error("place at least one bet")]
    EmptyRound,
    #[error("nothing to repeat")]
    EmptyBuffer,
    #[error("bet amount must be positive")]
    InvalidAmount,
    #[error("unknown player: {0}")]
    UnknownPlayer(String),
    #[error("amount {0} exceeds the ledger's signed range")]
    AmountOutOfRange(u64),
    /// The round settled in memory but the ledger could not be flushed.
    #[error("round settled but not saved: {0}")]
    Unsaved(#[source] LedgerError),
    #[error(transparent)]
    Bet(#[from] BetIdError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
