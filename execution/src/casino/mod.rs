//! Casino games settled against the shared player ledger.

pub mod logging;
pub mod roulette;
