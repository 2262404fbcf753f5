//! Shared domain types for babapoly.
//!
//! Everything in this crate is pure data: bet identifiers and the board arithmetic needed to
//! validate them, the settlement record produced by a resolved roulette round, and the persisted
//! player/pot state consumed by the ledger.

pub mod casino;
