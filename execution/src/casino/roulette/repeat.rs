use babapoly_types::casino::BetId;
use std::collections::BTreeMap;

use super::{BetLedger, HistoryStack, RouletteError};

/// Stakes of the last settled round.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RepeatBuffer {
    stakes: BTreeMap<BetId, u64>,
}

impl RepeatBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the buffer with a copy of `ledger`'s stakes.
    pub fn capture(&mut self, ledger: &BetLedger) {
        self.stakes = ledger.stakes().clone();
    }

    pub fn total(&self) -> u64 {
        self.stakes
            .values()
            .fold(0u64, |total, amount| total.saturating_add(*amount))
    }

    pub fn is_empty(&self) -> bool {
        self.stakes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BetId, u64)> + '_ {
        self.stakes.iter().map(|(bet, amount)| (*bet, *amount))
    }

    pub fn clear(&mut self) {
        self.stakes.clear();
    }

    pub fn can_repeat(&self, balance: u64) -> bool {
        !self.is_empty() && self.total() <= balance
    }

    /// Open a new round with the buffered stakes, one history entry per bet.
    ///
    /// Checked up front; on failure `ledger` and `history` are left as they were.
    pub fn replay_into(
        &self,
        ledger: &mut BetLedger,
        history: &mut HistoryStack,
        balance: u64,
    ) -> Result<(), RouletteError> {
        if self.is_empty() {
            return Err(RouletteError::EmptyBuffer);
        }
        let total = self.total();
        if total > balance {
            return Err(RouletteError::InsufficientFunds {
                staked: 0,
                requested: total,
                balance,
            });
        }
        ledger.clear();
        history.reset();
        for (bet, amount) in self.iter() {
            ledger.place(bet, amount, balance)?;
            history.record(bet, amount);
        }
        Ok(())
    }
}
