//! Round settlement.
//!
//! The full stake is debited when the round settles, not when chips are placed. Winning bets pay
//! independently and additively. A round with no winning bet sends its whole stake to the pot.

use babapoly_types::casino::{clamp_i64, BetOutcome, Pocket, SettlementRecord};
use tracing::info;

use super::{total_return, BetLedger, HistoryStack, RepeatBuffer, RouletteError};
use crate::casino::logging::format_outcomes;
use crate::state::PlayerLedger;

/// Evaluate every stake against `winning` without moving any money.
pub fn resolve(bets: &BetLedger, winning: Pocket) -> SettlementRecord {
    let outcomes: Vec<BetOutcome> = bets
        .iter()
        .map(|(bet_id, amount)| {
            let won = bet_id.covers(winning.number());
            BetOutcome {
                bet_id,
                amount,
                won,
                payout: if won { total_return(bet_id, amount) } else { 0 },
            }
        })
        .collect();
    let total_staked = bets.total_staked();
    let total_returned = outcomes
        .iter()
        .fold(0u64, |total, outcome| total.saturating_add(outcome.payout));
    SettlementRecord {
        winning_number: winning,
        color: winning.color(),
        outcomes,
        total_staked,
        total_returned,
        net_delta: clamp_i64(total_returned as i128 - total_staked as i128),
    }
}

/// Settle the open round for `player_id`.
///
/// Moves money on `players`, copies the stakes into `repeat` and empties `bets` and `history`.
/// Flushing `players` is left to the caller. Every failure is reported before anything is
/// touched.
pub fn settle<L: PlayerLedger>(
    players: &mut L,
    player_id: &str,
    bets: &mut BetLedger,
    history: &mut HistoryStack,
    repeat: &mut RepeatBuffer,
    winning: Pocket,
) -> Result<SettlementRecord, RouletteError> {
    if bets.is_empty() {
        return Err(RouletteError::EmptyRound);
    }
    if players.player(player_id).is_none() {
        return Err(RouletteError::UnknownPlayer(player_id.to_string()));
    }

    let record = resolve(bets, winning);
    let debit = ledger_delta(record.total_staked)?;
    let credit = ledger_delta(record.total_returned)?;
    players.adjust_money(player_id, -debit)?;
    if credit > 0 {
        players.adjust_money(player_id, credit)?;
    } else {
        players.add_to_pot(record.total_staked);
    }

    repeat.capture(bets);
    bets.clear();
    history.reset();

    info!(
        player = %player_id,
        winning_number = winning.number(),
        color = %record.color,
        staked = record.total_staked,
        returned = record.total_returned,
        net = record.net_delta,
        pot = players.pot(),
        outcomes = %format_outcomes(&record.outcomes),
        "round settled"
    );
    Ok(record)
}

fn ledger_delta(amount: u64) -> Result<i64, RouletteError> {
    i64::try_from(amount).map_err(|_| RouletteError::AmountOutOfRange(amount))
}
