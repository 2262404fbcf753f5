//! Property tests for the open-round state machine.
//!
//! 1. **Conservation**: the staked total always equals the sum of applied history entries.
//! 2. **History folds to the ledger**: replaying the undo stack from empty rebuilds the stakes.
//! 3. **Undo/redo inverse**: `redo` after `undo` (and the reverse) restores the round exactly.
//! 4. **Affordability**: `place` fails iff the new total would exceed the balance, and a failed
//!    `place` changes nothing.
//! 5. **Settlement conservation**: money leaving the player equals money entering the pot or
//!    coming back as payout.

use super::*;
use crate::persistence::MemoryStore;
use crate::state::{GameLedger, PlayerLedger};
use babapoly_types::casino::{BetId, GameState, Player, Pocket, MAX_POCKET};
use proptest::prelude::*;

// ─────────────────────────────────────────────────────────────────────────────
// Generators
// ─────────────────────────────────────────────────────────────────────────────

fn arb_bet() -> impl Strategy<Value = BetId> {
    prop::sample::select(all_bets())
}

#[derive(Clone, Debug)]
enum Action {
    Place(BetId, u64),
    Undo,
    Redo,
}

fn arb_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        3 => (arb_bet(), 1u64..200).prop_map(|(bet, amount)| Action::Place(bet, amount)),
        1 => Just(Action::Undo),
        1 => Just(Action::Redo),
    ]
}

struct Round {
    bets: BetLedger,
    history: HistoryStack,
}

impl Round {
    fn new() -> Self {
        Self {
            bets: BetLedger::new(),
            history: HistoryStack::new(),
        }
    }

    fn apply(&mut self, action: &Action, balance: u64) {
        match *action {
            Action::Place(bet, amount) => {
                if self.bets.place(bet, amount, balance).is_ok() {
                    self.history.record(bet, amount);
                }
            }
            Action::Undo => {
                self.history.undo(&mut self.bets);
            }
            Action::Redo => {
                self.history.redo(&mut self.bets);
            }
        }
    }
}

proptest! {
    /// Property: the ledger total matches the applied history after any action sequence.
    #[test]
    fn prop_conservation_and_fold(
        actions in prop::collection::vec(arb_action(), 0..64),
        balance in 0u64..2_000,
    ) {
        let mut round = Round::new();
        for action in &actions {
            round.apply(action, balance);
            let applied: u64 = round.history.entries().iter().map(|entry| entry.amount).sum();
            prop_assert_eq!(round.bets.total_staked(), applied);
            prop_assert_eq!(&round.history.fold(), &round.bets);
        }
    }

    /// Property: undo and redo are inverses whenever the relevant stack is non-empty.
    #[test]
    fn prop_undo_redo_inverse(actions in prop::collection::vec(arb_action(), 0..64)) {
        let mut round = Round::new();
        for action in &actions {
            round.apply(action, 10_000);
        }

        if round.history.can_undo() {
            let (bets, history) = (round.bets.clone(), round.history.clone());
            round.history.undo(&mut round.bets);
            round.history.redo(&mut round.bets);
            prop_assert_eq!(&round.bets, &bets);
            prop_assert_eq!(&round.history, &history);
        }
        if round.history.can_redo() {
            let (bets, history) = (round.bets.clone(), round.history.clone());
            round.history.redo(&mut round.bets);
            round.history.undo(&mut round.bets);
            prop_assert_eq!(&round.bets, &bets);
            prop_assert_eq!(&round.history, &history);
        }
    }

    /// Property: place fails iff staked + amount > balance, and never mutates on failure.
    #[test]
    fn prop_affordability(
        stakes in prop::collection::vec((arb_bet(), 1u64..300), 0..16),
        bet in arb_bet(),
        amount in 1u64..600,
        balance in 0u64..2_000,
    ) {
        let mut bets = BetLedger::new();
        for (stake_bet, stake) in stakes {
            let _ = bets.place(stake_bet, stake, balance);
        }
        let before = bets.clone();
        let over = before.total_staked() + amount > balance;
        match bets.place(bet, amount, balance) {
            Ok(total) => {
                prop_assert!(!over);
                prop_assert_eq!(total, before.get(bet) + amount);
            }
            Err(_) => {
                prop_assert!(over);
                prop_assert_eq!(&bets, &before);
            }
        }
    }

    /// Property: settlement moves exactly the stake out and the payout (or pot share) back in.
    #[test]
    fn prop_settlement_conservation(
        stakes in prop::collection::vec((arb_bet(), 1u64..100), 1..12),
        winning in 0u8..=MAX_POCKET,
    ) {
        let state = GameState::with_players(vec![Player::new("p", "P", 2_000)]);
        let mut players = GameLedger::open(MemoryStore::with_state(state)).unwrap();
        let mut bets = BetLedger::new();
        let mut history = HistoryStack::new();
        let mut repeat = RepeatBuffer::new();
        for (bet, amount) in stakes {
            bets.place(bet, amount, 2_000).unwrap();
            history.record(bet, amount);
        }
        let staked = bets.total_staked();

        let record = resolver::settle(
            &mut players,
            "p",
            &mut bets,
            &mut history,
            &mut repeat,
            Pocket::new(winning).unwrap(),
        )
        .unwrap();

        let money = players.player("p").unwrap().money;
        prop_assert_eq!(record.total_staked, staked);
        prop_assert_eq!(money as i64, 2_000 + record.net_delta);
        prop_assert_eq!(players.pot(), record.pot_contribution());
        prop_assert_eq!(repeat.total(), staked);
        for outcome in &record.outcomes {
            prop_assert_eq!(outcome.won, outcome.bet_id.covers(winning));
        }
    }
}
