//! Babapoly execution layer.
//!
//! This crate contains the roulette betting engine and the player ledger it settles against.
//!
//! ## Execution model
//! - Every operation runs synchronously to completion; nothing suspends mid-way.
//! - The engine is not thread-safe. A multi-threaded host must own a [`RouletteTable`] from a
//!   single task or guard it with one mutex, since every operation reads and writes the same
//!   open stake.
//! - Money only moves inside [`RouletteTable::settle`]. Placing, undoing, redoing and clearing
//!   bets never touch a balance.
//! - Persistence is explicit: the ledger is committed once per settled round, never on a timer.
//!
//! ## Minimal round (example)
//! ```rust,ignore
//! use babapoly_execution::{GameLedger, MemoryStore, RouletteTable};
//! use babapoly_types::casino::{BetId, Pocket};
//!
//! let mut ledger = GameLedger::open(MemoryStore::default())?;
//! let player_id = ledger.state().players[0].id.clone();
//! let mut table = RouletteTable::new(&mut ledger, &player_id)?;
//! table.place("straight-17".parse::<BetId>()?, 100)?;
//! let record = table.settle(Pocket::new(17)?)?;
//! assert_eq!(record.total_returned, 3_600);
//! ```

pub mod casino;
pub mod persistence;
pub mod state;

pub use casino::roulette::{
    BetLedger, HistoryEntry, HistoryStack, RepeatBuffer, RouletteError, RouletteTable,
};
pub use persistence::{JsonFileStore, MemoryStore, Store, StoreError};
pub use state::{GameLedger, LedgerError, Participant, PlayerLedger};
