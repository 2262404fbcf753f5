use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error as ThisError;

use super::{BANK_ID, DEFAULT_PLAYER_COLOR, MAX_NAME_LENGTH, POT_ID};

#[derive(Debug, ThisError, PartialEq, Eq)]
pub enum PlayerInvariantError {
    #[error("player name is empty")]
    EmptyName,
    #[error("player name too long (len={len}, max={max})")]
    NameTooLong { len: usize, max: usize },
    #[error("player id is reserved: {0}")]
    ReservedId(String),
    #[error("duplicate player id: {0}")]
    DuplicateId(String),
}

/// Companion pet progress, carried through the persisted state untouched by the casino games.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PetState {
    pub level: u32,
    pub xp: f64,
}

impl Default for PetState {
    fn default() -> Self {
        Self { level: 1, xp: 0.0 }
    }
}

fn default_color() -> String {
    DEFAULT_PLAYER_COLOR.to_string()
}

/// A player seated at the table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    pub name: String,
    pub money: u64,
    #[serde(default = "default_color")]
    pub color_hex: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default)]
    pub pet: PetState,
}

impl Player {
    pub fn new(id: impl Into<String>, name: impl Into<String>, money: u64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            money,
            color_hex: default_color(),
            avatar: None,
            pet: PetState::default(),
        }
    }

    pub fn validate_invariants(&self) -> Result<(), PlayerInvariantError> {
        if self.name.trim().is_empty() {
            return Err(PlayerInvariantError::EmptyName);
        }
        let len = self.name.chars().count();
        if len > MAX_NAME_LENGTH {
            return Err(PlayerInvariantError::NameTooLong {
                len,
                max: MAX_NAME_LENGTH,
            });
        }
        if self.id == BANK_ID || self.id == POT_ID {
            return Err(PlayerInvariantError::ReservedId(self.id.clone()));
        }
        Ok(())
    }
}

/// The single persisted blob: active players, the catalog of every player ever created, and the
/// communal pot.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub players: Vec<Player>,
    #[serde(default)]
    pub created_players: Vec<Player>,
    #[serde(default)]
    pub pot: u64,
}

impl GameState {
    pub fn with_players(players: Vec<Player>) -> Self {
        Self {
            players,
            created_players: Vec::new(),
            pot: 0,
        }
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|player| player.id == id)
    }

    pub fn player_mut(&mut self, id: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|player| player.id == id)
    }

    pub fn is_player_active(&self, id: &str) -> bool {
        self.player(id).is_some()
    }

    /// Insert or replace an entry in the created-players catalog.
    pub fn upsert_created_player(&mut self, player: Player) {
        match self
            .created_players
            .iter_mut()
            .find(|existing| existing.id == player.id)
        {
            Some(existing) => *existing = player,
            None => self.created_players.push(player),
        }
    }

    pub fn validate_invariants(&self) -> Result<(), PlayerInvariantError> {
        let mut seen = HashSet::new();
        for player in &self.players {
            player.validate_invariants()?;
            if !seen.insert(player.id.as_str()) {
                return Err(PlayerInvariantError::DuplicateId(player.id.clone()));
            }
        }
        Ok(())
    }
}
