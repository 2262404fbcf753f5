use babapoly_types::casino::{BetId, Pocket, SettlementRecord, MAX_POCKET};
use rand::Rng;
use tracing::{debug, info, warn};

use super::{resolver, BetLedger, HistoryEntry, HistoryStack, RepeatBuffer, RouletteError};
use crate::casino::logging::format_stakes;
use crate::state::PlayerLedger;

/// One roulette table bound to a player ledger.
///
/// The table owns the open round for the selected player. Hosts poll it after every call
/// (`chips`, `total_staked`, `can_undo`, ...) to redraw; it emits nothing on its own.
pub struct RouletteTable<L: PlayerLedger> {
    players: L,
    player_id: String,
    bets: BetLedger,
    history: HistoryStack,
    repeat: RepeatBuffer,
    last_settlement: Option<SettlementRecord>,
}

impl<L: PlayerLedger> RouletteTable<L> {
    pub fn new(players: L, player_id: impl Into<String>) -> Result<Self, RouletteError> {
        let player_id = player_id.into();
        if players.player(&player_id).is_none() {
            return Err(RouletteError::UnknownPlayer(player_id));
        }
        Ok(Self {
            players,
            player_id,
            bets: BetLedger::new(),
            history: HistoryStack::new(),
            repeat: RepeatBuffer::new(),
            last_settlement: None,
        })
    }

    pub fn players(&self) -> &L {
        &self.players
    }

    pub fn into_players(self) -> L {
        self.players
    }

    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    /// Seat another player. Starts a fresh round and forgets the repeatable stakes.
    pub fn select_player(&mut self, player_id: impl Into<String>) -> Result<(), RouletteError> {
        let player_id = player_id.into();
        if self.players.player(&player_id).is_none() {
            warn!(player = %player_id, "select rejected: unknown player");
            return Err(RouletteError::UnknownPlayer(player_id));
        }
        debug!(player = %player_id, "player selected");
        self.player_id = player_id;
        self.bets.clear();
        self.history.reset();
        self.repeat.clear();
        self.last_settlement = None;
        Ok(())
    }

    /// Current money of the selected player.
    pub fn balance(&self) -> Result<u64, RouletteError> {
        self.players
            .player(&self.player_id)
            .map(|player| player.money)
            .ok_or_else(|| RouletteError::UnknownPlayer(self.player_id.clone()))
    }

    /// Stake `amount` on `bet`. Returns the new total on that bet.
    pub fn place(&mut self, bet: BetId, amount: u64) -> Result<u64, RouletteError> {
        let balance = self.balance()?;
        match self.bets.place(bet, amount, balance) {
            Ok(total) => {
                self.history.record(bet, amount);
                debug!(player = %self.player_id, %bet, amount, total, staked = self.bets.total_staked(), "bet placed");
                Ok(total)
            }
            Err(err) => {
                warn!(player = %self.player_id, %bet, amount, balance, error = %err, "bet rejected");
                Err(err)
            }
        }
    }

    pub fn undo(&mut self) -> Option<HistoryEntry> {
        let entry = self.history.undo(&mut self.bets)?;
        debug!(player = %self.player_id, bet = %entry.bet_id, amount = entry.amount, "bet undone");
        Some(entry)
    }

    pub fn redo(&mut self) -> Option<HistoryEntry> {
        let entry = self.history.redo(&mut self.bets)?;
        debug!(player = %self.player_id, bet = %entry.bet_id, amount = entry.amount, "bet redone");
        Some(entry)
    }

    /// Abandon the open round. No money moves.
    pub fn clear(&mut self) {
        debug!(player = %self.player_id, staked = self.bets.total_staked(), "bets cleared");
        self.bets.clear();
        self.history.reset();
    }

    /// Settle the open round against `winning` and flush the player ledger.
    ///
    /// A flush failure is reported as [`RouletteError::Unsaved`] after the round has settled: the
    /// record is still available from [`Self::last_settlement`] and [`Self::commit`] retries the
    /// write.
    pub fn settle(&mut self, winning: Pocket) -> Result<&SettlementRecord, RouletteError> {
        let record = resolver::settle(
            &mut self.players,
            &self.player_id,
            &mut self.bets,
            &mut self.history,
            &mut self.repeat,
            winning,
        )
        .inspect_err(|err| warn!(player = %self.player_id, error = %err, "settle rejected"))?;
        let record = self.last_settlement.insert(record);
        match self.players.commit() {
            Ok(()) => Ok(&*record),
            Err(err) => {
                warn!(player = %self.player_id, error = %err, "settled round not saved");
                Err(RouletteError::Unsaved(err))
            }
        }
    }

    /// Flush pending ledger changes.
    pub fn commit(&mut self) -> Result<(), RouletteError> {
        self.players.commit().map_err(RouletteError::Unsaved)
    }

    /// Draw a pocket uniformly from `0..=36` and settle against it.
    pub fn spin<R: Rng>(&mut self, rng: &mut R) -> Result<&SettlementRecord, RouletteError> {
        if self.bets.is_empty() {
            warn!(player = %self.player_id, "spin rejected: no bets");
            return Err(RouletteError::EmptyRound);
        }
        let winning = Pocket::new(rng.gen_range(0..=MAX_POCKET))?;
        self.settle(winning)
    }

    /// Re-place the stakes of the last settled round.
    pub fn repeat_last(&mut self) -> Result<(), RouletteError> {
        let balance = self.balance()?;
        self.repeat
            .replay_into(&mut self.bets, &mut self.history, balance)
            .inspect_err(|err| warn!(player = %self.player_id, error = %err, "repeat rejected"))?;
        info!(
            player = %self.player_id,
            staked = self.bets.total_staked(),
            bets = %format_stakes(self.bets.iter()),
            "round repeated"
        );
        Ok(())
    }

    pub fn can_repeat(&self) -> bool {
        self.balance()
            .map(|balance| self.repeat.can_repeat(balance))
            .unwrap_or(false)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn total_staked(&self) -> u64 {
        self.bets.total_staked()
    }

    pub fn stake_on(&self, bet: BetId) -> u64 {
        self.bets.get(bet)
    }

    /// Chips on the board, in `BetId` order.
    pub fn chips(&self) -> impl Iterator<Item = (BetId, u64)> + '_ {
        self.bets.iter()
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    pub fn last_settlement(&self) -> Option<&SettlementRecord> {
        self.last_settlement.as_ref()
    }
}
