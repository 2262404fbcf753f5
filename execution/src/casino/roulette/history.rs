//! Undo/redo over bet placements in the open round.

use babapoly_types::casino::BetId;
use serde::{Deserialize, Serialize};

use super::BetLedger;

/// One "add `amount` to `bet_id`" action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub bet_id: BetId,
    pub amount: u64,
}

/// Undo and redo stacks. Folding the undo stack from an empty ledger always yields the current
/// stakes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HistoryStack {
    undo_stack: Vec<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
}

impl HistoryStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a placement. Any redo history is discarded.
    pub fn record(&mut self, bet_id: BetId, amount: u64) {
        self.undo_stack.push(HistoryEntry { bet_id, amount });
        self.redo_stack.clear();
    }

    /// Reverse the most recent placement on `ledger`.
    pub fn undo(&mut self, ledger: &mut BetLedger) -> Option<HistoryEntry> {
        let entry = self.undo_stack.pop()?;
        ledger.remove(entry.bet_id, entry.amount);
        self.redo_stack.push(entry);
        Some(entry)
    }

    /// Re-apply the most recently undone placement. Affordability is not re-checked.
    pub fn redo(&mut self, ledger: &mut BetLedger) -> Option<HistoryEntry> {
        let entry = self.redo_stack.pop()?;
        ledger.place_unchecked(entry.bet_id, entry.amount);
        self.undo_stack.push(entry);
        Some(entry)
    }

    pub fn reset(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Applied placements, oldest first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.undo_stack
    }

    /// Rebuild the stakes implied by the applied placements.
    pub fn fold(&self) -> BetLedger {
        let mut ledger = BetLedger::new();
        for entry in &self.undo_stack {
            ledger.place_unchecked(entry.bet_id, entry.amount);
        }
        ledger
    }
}
