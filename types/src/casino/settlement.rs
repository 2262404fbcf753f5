use serde::{Deserialize, Serialize};

use super::{BetId, Pocket, PocketColor};

/// Result of one wager in a settled round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BetOutcome {
    pub bet_id: BetId,
    pub amount: u64,
    pub won: bool,
    /// Total returned for this wager (stake included); zero when lost.
    pub payout: u64,
}

impl BetOutcome {
    /// Signed profit of this wager alone.
    pub fn pnl(&self) -> i64 {
        clamp_i64(self.payout as i128 - self.amount as i128)
    }
}

/// Immutable record of a resolved roulette round, kept for display and logging.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementRecord {
    pub winning_number: Pocket,
    pub color: PocketColor,
    #[serde(rename = "perBetOutcome")]
    pub outcomes: Vec<BetOutcome>,
    pub total_staked: u64,
    pub total_returned: u64,
    pub net_delta: i64,
}

impl SettlementRecord {
    pub fn is_win(&self) -> bool {
        self.total_returned > 0
    }

    /// Amount routed to the communal pot by this round.
    pub fn pot_contribution(&self) -> u64 {
        if self.is_win() {
            0
        } else {
            self.total_staked
        }
    }

    pub fn winning_bets(&self) -> impl Iterator<Item = &BetOutcome> {
        self.outcomes.iter().filter(|outcome| outcome.won)
    }
}

pub fn clamp_i64(value: i128) -> i64 {
    value.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}
