//! Line-driven roulette table.

use anyhow::{anyhow, Context, Result};
use babapoly_execution::casino::roulette::{bets_covering, payout_multiplier};
use babapoly_execution::{PlayerLedger, RouletteError, RouletteTable};
use babapoly_types::casino::{BetId, Pocket, SettlementRecord};
use rand::Rng;
use std::io::{BufRead, Write};

struct CommandDef {
    usage: &'static str,
    desc: &'static str,
}

const fn cmd(usage: &'static str, desc: &'static str) -> CommandDef {
    CommandDef { usage, desc }
}

const COMMANDS: [CommandDef; 10] = [
    cmd("bet <label> <amount>", "Stake on a bet (straight-17, split-3-6, red, dozen-2, ...)"),
    cmd("undo", "Take back the last chip"),
    cmd("redo", "Put back the last undone chip"),
    cmd("clear", "Remove every chip; no money moves"),
    cmd("spin [n]", "Spin the wheel, or settle against pocket n"),
    cmd("repeat", "Re-place the last settled round"),
    cmd("status", "Balance, pot and chips"),
    cmd("bets <n>", "Every bet that wins on pocket n"),
    cmd("help", "This list"),
    cmd("quit", "Leave the table"),
];

#[derive(Debug, PartialEq, Eq)]
pub enum TableAction {
    Bet { bet: BetId, amount: u64 },
    Undo,
    Redo,
    Clear,
    Spin(Option<Pocket>),
    Repeat,
    Status,
    Covering(Pocket),
    Help,
    Quit,
}

fn parse_pocket(raw: &str) -> Result<Pocket> {
    let number = raw
        .parse::<u8>()
        .map_err(|_| anyhow!("pocket must be a number between 0 and 36"))?;
    Ok(Pocket::new(number)?)
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<TableAction>> {
    let mut parts = line.split_whitespace();
    let Some(command) = parts.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = parts.collect();
    let action = match (command.to_lowercase().as_str(), args.as_slice()) {
        ("bet" | "b", [label, amount]) => TableAction::Bet {
            bet: label.parse()?,
            amount: amount
                .parse()
                .map_err(|_| anyhow!("amount must be a positive whole number"))?,
        },
        ("bet" | "b", _) => return Err(anyhow!("Usage: bet <label> <amount>")),
        ("undo" | "u", []) => TableAction::Undo,
        ("redo" | "r", []) => TableAction::Redo,
        ("clear", []) => TableAction::Clear,
        ("spin" | "s", []) => TableAction::Spin(None),
        ("spin" | "s", [number]) => TableAction::Spin(Some(parse_pocket(number)?)),
        ("repeat", []) => TableAction::Repeat,
        ("status", []) => TableAction::Status,
        ("bets", [number]) => TableAction::Covering(parse_pocket(number)?),
        ("help" | "?", _) => TableAction::Help,
        ("quit" | "exit" | "q", _) => TableAction::Quit,
        (other, _) => return Err(anyhow!("Unknown command '{other}' (try help)")),
    };
    Ok(Some(action))
}

pub fn render_help() -> String {
    COMMANDS
        .iter()
        .map(|def| format!("  {:<22} {}", def.usage, def.desc))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_status<L: PlayerLedger>(table: &RouletteTable<L>) -> String {
    let player = table.players().player(table.player_id());
    let name = player.map(|player| player.name.as_str()).unwrap_or("?");
    let money = player.map(|player| player.money).unwrap_or(0);
    let mut out = format!(
        "{name} · {money} | staked {} | pot {}",
        table.total_staked(),
        table.players().pot()
    );
    let flags: Vec<&str> = [
        (table.can_undo(), "undo"),
        (table.can_redo(), "redo"),
        (table.can_repeat(), "repeat"),
    ]
    .into_iter()
    .filter_map(|(enabled, name)| enabled.then_some(name))
    .collect();
    if !flags.is_empty() {
        out.push_str(&format!(" | {}", flags.join(" ")));
    }
    for (bet, amount) in table.chips() {
        out.push_str(&format!("\n  {:<20} {amount}", bet.to_string()));
    }
    out
}

pub fn render_settlement(record: &SettlementRecord) -> String {
    let mut out = format!(
        "→ {} {} | staked {} | returned {} | net {:+}",
        record.winning_number, record.color, record.total_staked, record.total_returned, record.net_delta
    );
    for outcome in &record.outcomes {
        let mark = if outcome.won { "✓" } else { "✗" };
        out.push_str(&format!(
            "\n  {mark} {:<20} {} → {}",
            outcome.bet_id.to_string(),
            outcome.amount,
            outcome.payout
        ));
    }
    if record.pot_contribution() > 0 {
        out.push_str(&format!("\n  {} to the pot", record.pot_contribution()));
    }
    out
}

fn render_covering(pocket: Pocket) -> String {
    let bets = bets_covering(pocket.number());
    let mut out = format!("{} bets win on {pocket}:", bets.len());
    for bet in bets {
        out.push_str(&format!("\n  {:<20} {}:1", bet.to_string(), payout_multiplier(bet)));
    }
    out
}

fn apply<L: PlayerLedger, R: Rng>(
    table: &mut RouletteTable<L>,
    rng: &mut R,
    action: TableAction,
) -> Result<String> {
    Ok(match action {
        TableAction::Bet { bet, amount } => {
            let total = table.place(bet, amount)?;
            format!("{bet}: {total}\n{}", render_status(table))
        }
        TableAction::Undo => match table.undo() {
            Some(entry) => format!("undid {} {}\n{}", entry.bet_id, entry.amount, render_status(table)),
            None => format!("nothing to undo\n{}", render_status(table)),
        },
        TableAction::Redo => match table.redo() {
            Some(entry) => format!("redid {} {}\n{}", entry.bet_id, entry.amount, render_status(table)),
            None => format!("nothing to redo\n{}", render_status(table)),
        },
        TableAction::Clear => {
            table.clear();
            render_status(table)
        }
        TableAction::Spin(pocket) => {
            let settled = match pocket {
                Some(pocket) => table.settle(pocket).map(render_settlement),
                None => table.spin(rng).map(render_settlement),
            };
            match settled {
                Ok(settled) => format!("{settled}\n{}", render_status(table)),
                Err(err @ RouletteError::Unsaved(_)) => {
                    let settled = table.last_settlement().map(render_settlement).unwrap_or_default();
                    format!("{settled}\nwarning: {err}\n{}", render_status(table))
                }
                Err(err) => return Err(err.into()),
            }
        }
        TableAction::Repeat => {
            table.repeat_last()?;
            render_status(table)
        }
        TableAction::Status => render_status(table),
        TableAction::Covering(pocket) => render_covering(pocket),
        TableAction::Help => render_help(),
        TableAction::Quit => String::new(),
    })
}

/// Read commands from `input` until EOF or `quit`, writing responses to `out`.
///
/// Pending ledger changes are flushed before returning.
pub fn run<L, R, I, W>(table: &mut RouletteTable<L>, rng: &mut R, input: I, out: &mut W) -> Result<()>
where
    L: PlayerLedger,
    R: Rng,
    I: BufRead,
    W: Write,
{
    writeln!(out, "{}", render_status(table))?;
    for line in input.lines() {
        let line = line.context("failed to read command")?;
        let action = match parse_line(&line) {
            Ok(Some(action)) => action,
            Ok(None) => continue,
            Err(err) => {
                writeln!(out, "error: {err}")?;
                continue;
            }
        };
        if action == TableAction::Quit {
            break;
        }
        match apply(table, rng, action) {
            Ok(text) => writeln!(out, "{text}")?,
            Err(err) => writeln!(out, "error: {err}")?,
        }
    }
    table.commit().context("failed to save state on exit")
}

#[cfg(test)]
mod tests {
    use super::*;
    use babapoly_execution::{GameLedger, MemoryStore, Store, StoreError};
    use babapoly_types::casino::{GameState, Player, RedBlack};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::io::Cursor;

    fn table() -> RouletteTable<GameLedger<MemoryStore>> {
        let state = GameState::with_players(vec![Player::new("rosi", "Rosi", 800)]);
        let ledger = GameLedger::open(MemoryStore::with_state(state)).unwrap();
        RouletteTable::new(ledger, "rosi").unwrap()
    }

    fn session(script: &str) -> (RouletteTable<GameLedger<MemoryStore>>, String) {
        let mut table = table();
        let mut rng = StdRng::seed_from_u64(1);
        let mut out = Vec::new();
        run(&mut table, &mut rng, Cursor::new(script), &mut out).unwrap();
        (table, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_parse_line() {
        assert_eq!(parse_line("   ").unwrap(), None);
        assert_eq!(
            parse_line("bet red 25").unwrap(),
            Some(TableAction::Bet {
                bet: BetId::Color(RedBlack::Red),
                amount: 25
            })
        );
        assert_eq!(
            parse_line("SPIN 17").unwrap(),
            Some(TableAction::Spin(Some(Pocket::new(17).unwrap())))
        );
        assert_eq!(parse_line("spin").unwrap(), Some(TableAction::Spin(None)));
        assert_eq!(parse_line("q").unwrap(), Some(TableAction::Quit));
        assert!(parse_line("bet red").is_err());
        assert!(parse_line("bet red -5").is_err());
        assert!(parse_line("bet corner-3-4-6-7 5").is_err());
        assert!(parse_line("spin 37").is_err());
        assert!(parse_line("dance").is_err());
    }

    #[test]
    fn test_session_win_and_repeat() {
        let (table, out) = session("bet straight-17 100\nbet dozen-2 50\nspin 17\nrepeat\nquit\nbet red 1\n");
        assert!(out.contains("returned 3750"));
        assert!(out.contains("net +3600"));
        assert_eq!(table.players().player("rosi").unwrap().money, 4_400);
        // Repeat re-placed the round; the line after quit was never read.
        assert_eq!(table.total_staked(), 150);
        assert_eq!(table.players().store().writes(), 1);
    }

    #[test]
    fn test_session_reports_errors_and_continues() {
        let (table, out) = session("bet red 900\nspin\nundo\nbet black 10\nundo\nredo\nstatus\n");
        assert!(out.contains("error: insufficient funds"));
        assert!(out.contains("error: place at least one bet"));
        assert!(out.contains("nothing to undo"));
        assert!(out.contains("redid black 10"));
        assert_eq!(table.stake_on(BetId::Color(RedBlack::Black)), 10);
        assert_eq!(table.players().player("rosi").unwrap().money, 800);
    }

    struct FlakyStore {
        initial: GameState,
        failures: usize,
        saved: Option<GameState>,
    }

    impl Store for FlakyStore {
        fn load(&self) -> Result<Option<GameState>, StoreError> {
            Ok(Some(self.initial.clone()))
        }

        fn save(&mut self, state: &GameState) -> Result<(), StoreError> {
            if self.failures > 0 {
                self.failures -= 1;
                return Err(std::io::Error::other("disk full").into());
            }
            self.saved = Some(state.clone());
            Ok(())
        }
    }

    fn flaky_table(failures: usize) -> RouletteTable<GameLedger<FlakyStore>> {
        let store = FlakyStore {
            initial: GameState::with_players(vec![Player::new("rosi", "Rosi", 800)]),
            failures,
            saved: None,
        };
        RouletteTable::new(GameLedger::open(store).unwrap(), "rosi").unwrap()
    }

    #[test]
    fn test_unsaved_spin_shows_outcome_and_saves_on_exit() {
        let mut table = flaky_table(1);
        let mut rng = StdRng::seed_from_u64(1);
        let mut out = Vec::new();
        run(&mut table, &mut rng, Cursor::new("bet red 200\nspin 2\n"), &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("net -200"));
        assert!(out.contains("warning: round settled but not saved"));

        let saved = table.players().store().saved.as_ref().unwrap();
        assert_eq!(saved.player("rosi").unwrap().money, 600);
        assert_eq!(saved.pot, 200);
    }

    #[test]
    fn test_exit_reports_state_that_cannot_be_saved() {
        let mut table = flaky_table(2);
        let mut rng = StdRng::seed_from_u64(1);
        let mut out = Vec::new();
        let err = run(&mut table, &mut rng, Cursor::new("bet red 200\nspin 2\nquit\n"), &mut out)
            .unwrap_err();
        assert!(err.to_string().contains("failed to save state on exit"));
        assert!(table.players().is_dirty());
    }

    #[test]
    fn test_covering_listing() {
        let (_, out) = session("bets 0\n");
        assert!(out.contains("1 bets win on 0:"));
        assert!(out.contains("straight-0"));
    }

    #[test]
    fn test_help_lists_every_command() {
        let help = render_help();
        for def in &COMMANDS {
            assert!(help.contains(def.usage));
        }
    }
}
