use babapoly_types::casino::{
    GameState, Player, PlayerInvariantError, BANK_ID, MAX_STARTING_MONEY, MIN_STARTING_MONEY,
    POT_ID,
};
use std::fmt;
use std::str::FromStr;
use thiserror::Error as ThisError;
use tracing::{debug, info};
use uuid::Uuid;

use crate::persistence::{Store, StoreError};

#[derive(Debug, ThisError)]
pub enum LedgerError {
    #[error("unknown player: {0}")]
    UnknownPlayer(String),
    #[error("insufficient funds (balance={balance}, requested={requested})")]
    InsufficientFunds { balance: u64, requested: u64 },
    #[error("pot is empty")]
    EmptyPot,
    #[error("amount must be positive")]
    InvalidAmount,
    #[error("invalid transfer: {0}")]
    InvalidTransfer(&'static str),
    #[error(transparent)]
    Invariant(#[from] PlayerInvariantError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Balances consumed by the casino games.
///
/// Implementations own persistence; callers signal when a batch of mutations is complete with
/// [`PlayerLedger::commit`].
pub trait PlayerLedger {
    fn player(&self, id: &str) -> Option<&Player>;

    /// Apply a signed delta to a player's money, clamping at zero. Returns the new balance.
    fn adjust_money(&mut self, id: &str, delta: i64) -> Result<u64, LedgerError>;

    /// Add to the communal pot. Returns the new pot total.
    fn add_to_pot(&mut self, amount: u64) -> u64;

    /// Pay the entire pot to a player. Returns the amount paid.
    fn take_pot(&mut self, player_id: &str) -> Result<u64, LedgerError>;

    fn pot(&self) -> u64;

    /// Flush pending mutations to storage.
    fn commit(&mut self) -> Result<(), LedgerError>;
}

impl<L: PlayerLedger + ?Sized> PlayerLedger for &mut L {
    fn player(&self, id: &str) -> Option<&Player> {
        (**self).player(id)
    }

    fn adjust_money(&mut self, id: &str, delta: i64) -> Result<u64, LedgerError> {
        (**self).adjust_money(id, delta)
    }

    fn add_to_pot(&mut self, amount: u64) -> u64 {
        (**self).add_to_pot(amount)
    }

    fn take_pot(&mut self, player_id: &str) -> Result<u64, LedgerError> {
        (**self).take_pot(player_id)
    }

    fn pot(&self) -> u64 {
        (**self).pot()
    }

    fn commit(&mut self) -> Result<(), LedgerError> {
        (**self).commit()
    }
}

/// Source or destination of a transfer on the home screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Participant {
    /// Unlimited source and sink.
    Bank,
    /// Communal pot. Only paid out through [`PlayerLedger::take_pot`].
    Pot,
    Player(String),
}

impl FromStr for Participant {
    type Err = std::convert::Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(match value.trim() {
            BANK_ID => Participant::Bank,
            POT_ID => Participant::Pot,
            id => Participant::Player(id.to_string()),
        })
    }
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Participant::Bank => f.write_str(BANK_ID),
            Participant::Pot => f.write_str(POT_ID),
            Participant::Player(id) => f.write_str(id),
        }
    }
}

/// Seed state for a fresh install.
pub fn default_state() -> GameState {
    let mut pilar = Player::new(Uuid::new_v4().to_string(), "Pilar", 900);
    pilar.pet.level = 2;
    pilar.pet.xp = 0.5;
    GameState::with_players(vec![
        Player::new(Uuid::new_v4().to_string(), "Rosi", 800),
        Player::new(Uuid::new_v4().to_string(), "Nico", 650),
        pilar,
    ])
}

/// The persisted player/pot ledger.
///
/// Mutations only mark the ledger dirty; [`PlayerLedger::commit`] writes the whole state once.
pub struct GameLedger<S: Store> {
    state: GameState,
    store: S,
    dirty: bool,
}

impl<S: Store> GameLedger<S> {
    /// Load from `store`, seeding the default players when nothing was saved yet.
    pub fn open(store: S) -> Result<Self, LedgerError> {
        let (state, dirty) = match store.load()? {
            Some(state) => (state, false),
            None => (default_state(), true),
        };
        state.validate_invariants()?;
        Ok(Self {
            state,
            store,
            dirty,
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Seat a new player. Starting money is clamped to the allowed range.
    pub fn add_player(&mut self, name: &str, money: u64) -> Result<Player, LedgerError> {
        let money = money.clamp(MIN_STARTING_MONEY, MAX_STARTING_MONEY);
        let player = Player::new(Uuid::new_v4().to_string(), name.trim(), money);
        player.validate_invariants()?;
        info!(player = %player.id, name = %player.name, money, "player added");
        self.state.upsert_created_player(player.clone());
        self.state.players.push(player.clone());
        self.dirty = true;
        Ok(player)
    }

    /// Unseat a player. The created-players catalog keeps their entry.
    pub fn remove_player(&mut self, id: &str) -> Result<Player, LedgerError> {
        let index = self
            .state
            .players
            .iter()
            .position(|player| player.id == id)
            .ok_or_else(|| LedgerError::UnknownPlayer(id.to_string()))?;
        let player = self.state.players.remove(index);
        info!(player = %player.id, "player removed");
        self.dirty = true;
        Ok(player)
    }

    /// Move money between players and the bank. The pot can be neither source nor destination.
    pub fn transfer(
        &mut self,
        from: &Participant,
        to: &Participant,
        amount: u64,
    ) -> Result<(), LedgerError> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount);
        }
        if from == to {
            return Err(LedgerError::InvalidTransfer("source and destination are the same"));
        }
        if matches!(from, Participant::Pot) || matches!(to, Participant::Pot) {
            return Err(LedgerError::InvalidTransfer("the pot is paid out with take_pot"));
        }
        if let Participant::Player(id) = to {
            if self.state.player(id).is_none() {
                return Err(LedgerError::UnknownPlayer(id.clone()));
            }
        }
        if let Participant::Player(id) = from {
            let player = self
                .state
                .player_mut(id)
                .ok_or_else(|| LedgerError::UnknownPlayer(id.clone()))?;
            if player.money < amount {
                return Err(LedgerError::InsufficientFunds {
                    balance: player.money,
                    requested: amount,
                });
            }
            player.money -= amount;
        }
        if let Participant::Player(id) = to {
            if let Some(player) = self.state.player_mut(id) {
                player.money = player.money.saturating_add(amount);
            }
        }
        info!(%from, %to, amount, "transfer");
        self.dirty = true;
        Ok(())
    }
}

impl<S: Store> PlayerLedger for GameLedger<S> {
    fn player(&self, id: &str) -> Option<&Player> {
        self.state.player(id)
    }

    fn adjust_money(&mut self, id: &str, delta: i64) -> Result<u64, LedgerError> {
        let player = self
            .state
            .player_mut(id)
            .ok_or_else(|| LedgerError::UnknownPlayer(id.to_string()))?;
        let next = (player.money as i128 + delta as i128).clamp(0, u64::MAX as i128) as u64;
        player.money = next;
        self.dirty = true;
        debug!(player = %id, delta, balance = next, "money adjusted");
        Ok(next)
    }

    fn add_to_pot(&mut self, amount: u64) -> u64 {
        if amount > 0 {
            self.state.pot = self.state.pot.saturating_add(amount);
            self.dirty = true;
            debug!(amount, pot = self.state.pot, "pot increased");
        }
        self.state.pot
    }

    fn take_pot(&mut self, player_id: &str) -> Result<u64, LedgerError> {
        let amount = self.state.pot;
        if amount == 0 {
            return Err(LedgerError::EmptyPot);
        }
        let player = self
            .state
            .player_mut(player_id)
            .ok_or_else(|| LedgerError::UnknownPlayer(player_id.to_string()))?;
        player.money = player.money.saturating_add(amount);
        self.state.pot = 0;
        self.dirty = true;
        info!(player = %player_id, amount, "pot taken");
        Ok(amount)
    }

    fn pot(&self) -> u64 {
        self.state.pot
    }

    fn commit(&mut self) -> Result<(), LedgerError> {
        if !self.dirty {
            return Ok(());
        }
        self.store.save(&self.state)?;
        self.dirty = false;
        Ok(())
    }
}
