use babapoly_types::casino::BetId;
use std::collections::BTreeMap;

use super::RouletteError;

/// Stakes of the open round.
///
/// Entries are always positive; a bet reduced to zero is removed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BetLedger {
    stakes: BTreeMap<BetId, u64>,
    total: u64,
}

impl BetLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` to `bet` if the round total stays within `balance`.
    ///
    /// Returns the new total on `bet`. Nothing changes on failure.
    pub fn place(&mut self, bet: BetId, amount: u64, balance: u64) -> Result<u64, RouletteError> {
        if amount == 0 {
            return Err(RouletteError::InvalidAmount);
        }
        let affordable = self
            .total
            .checked_add(amount)
            .is_some_and(|requested| requested <= balance);
        if !affordable {
            return Err(RouletteError::InsufficientFunds {
                staked: self.total,
                requested: amount,
                balance,
            });
        }
        Ok(self.credit(bet, amount))
    }

    /// Add `amount` to `bet` against an unlimited balance. Used to redo an undone placement.
    pub fn place_unchecked(&mut self, bet: BetId, amount: u64) -> u64 {
        if amount == 0 {
            return self.get(bet);
        }
        self.credit(bet, amount)
    }

    fn credit(&mut self, bet: BetId, amount: u64) -> u64 {
        let entry = self.stakes.entry(bet).or_insert(0);
        *entry = entry.saturating_add(amount);
        self.total = self.total.saturating_add(amount);
        *entry
    }

    /// Take up to `amount` off `bet`. Returns what is left on it.
    pub fn remove(&mut self, bet: BetId, amount: u64) -> u64 {
        let Some(current) = self.stakes.get_mut(&bet) else {
            return 0;
        };
        let taken = amount.min(*current);
        *current -= taken;
        self.total -= taken;
        let left = *current;
        if left == 0 {
            self.stakes.remove(&bet);
        }
        left
    }

    pub fn total_staked(&self) -> u64 {
        self.total
    }

    pub fn get(&self, bet: BetId) -> u64 {
        self.stakes.get(&bet).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (BetId, u64)> + '_ {
        self.stakes.iter().map(|(bet, amount)| (*bet, *amount))
    }

    pub fn stakes(&self) -> &BTreeMap<BetId, u64> {
        &self.stakes
    }

    pub fn len(&self) -> usize {
        self.stakes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stakes.is_empty()
    }

    pub fn clear(&mut self) {
        self.stakes.clear();
        self.total = 0;
    }
}
