use babapoly_types::casino::{BetId, BetOutcome};
use std::fmt::Write;

pub fn push_outcome_entry(out: &mut String, bet: &str, pnl: i64) {
    if !out.is_empty() {
        out.push(',');
    }
    let _ = write!(out, r#"{{"bet":"{}","pnl":{}}}"#, bet, pnl);
}

/// Per-bet results of a settled round as a compact log field.
pub fn format_outcomes(outcomes: &[BetOutcome]) -> String {
    let mut out = String::with_capacity(outcomes.len().saturating_mul(32));
    for outcome in outcomes {
        push_outcome_entry(&mut out, &outcome.bet_id.to_string(), outcome.pnl());
    }
    out
}

/// `label:amount` pairs, comma separated.
pub fn format_stakes(stakes: impl IntoIterator<Item = (BetId, u64)>) -> String {
    let mut out = String::new();
    for (idx, (bet, amount)) in stakes.into_iter().enumerate() {
        if idx > 0 {
            out.push(',');
        }
        let _ = write!(out, "{}:{}", bet, amount);
    }
    out
}
