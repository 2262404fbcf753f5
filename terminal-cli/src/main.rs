use std::io;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use babapoly_execution::{GameLedger, JsonFileStore, Participant, PlayerLedger, RouletteTable, Store};
use babapoly_types::casino::{GameState, DEFAULT_STARTING_MONEY, STORAGE_KEY};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod repl;

/// CLI flags
#[derive(Parser, Debug)]
#[command(name = "babapoly-cli", about = "Babapoly bank, pot and roulette table")]
struct Args {
    /// Saved game state (created with the default players when missing)
    #[arg(long, env = "BABAPOLY_STATE_FILE", default_value_t = default_state_file(), global = true)]
    state_file: String,

    /// Seed the roulette wheel for reproducible spins
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List seated players and the pot
    Players,
    /// Move money between the bank and players (names or ids; `bank` for the bank)
    Transfer {
        #[arg(long)]
        from: Participant,
        #[arg(long)]
        to: Participant,
        #[arg(long)]
        amount: u64,
    },
    /// Pay the whole pot to a player
    TakePot {
        #[arg(long)]
        player: String,
    },
    /// Seat a new player
    AddPlayer {
        #[arg(long)]
        name: String,
        #[arg(long, default_value_t = DEFAULT_STARTING_MONEY)]
        money: u64,
    },
    /// Unseat a player
    RemovePlayer {
        #[arg(long)]
        player: String,
    },
    /// Sit a player at the roulette table (commands on stdin)
    Roulette {
        #[arg(long)]
        player: String,
    },
}

fn default_state_file() -> String {
    format!("{STORAGE_KEY}.json")
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();
}

/// Find a seated player by id, or by case-insensitive name.
fn resolve_player(state: &GameState, key: &str) -> Result<String> {
    let key = key.trim();
    state
        .player(key)
        .or_else(|| {
            state
                .players
                .iter()
                .find(|player| player.name.eq_ignore_ascii_case(key))
        })
        .map(|player| player.id.clone())
        .ok_or_else(|| anyhow!("no player named or identified by '{key}'"))
}

fn resolve_participant(state: &GameState, participant: Participant) -> Result<Participant> {
    Ok(match participant {
        Participant::Player(key) => Participant::Player(resolve_player(state, &key)?),
        other => other,
    })
}

fn render_players(state: &GameState) -> String {
    let mut out = String::new();
    for player in &state.players {
        out.push_str(&format!(
            "{:<16} {:>8}  pet lv{}  {}\n",
            player.name, player.money, player.pet.level, player.id
        ));
    }
    out.push_str(&format!("{:<16} {:>8}", "pot", state.pot));
    out
}

fn run_command<S: Store>(ledger: &mut GameLedger<S>, command: Command, seed: Option<u64>) -> Result<String> {
    let output = match command {
        Command::Players => render_players(ledger.state()),
        Command::Transfer { from, to, amount } => {
            let from = resolve_participant(ledger.state(), from)?;
            let to = resolve_participant(ledger.state(), to)?;
            ledger.transfer(&from, &to, amount)?;
            ledger.commit()?;
            render_players(ledger.state())
        }
        Command::TakePot { player } => {
            let id = resolve_player(ledger.state(), &player)?;
            let paid = ledger.take_pot(&id)?;
            ledger.commit()?;
            format!("{player} takes the pot: {paid}\n{}", render_players(ledger.state()))
        }
        Command::AddPlayer { name, money } => {
            let player = ledger.add_player(&name, money)?;
            ledger.commit()?;
            format!("seated {} with {}", player.name, player.money)
        }
        Command::RemovePlayer { player } => {
            let id = resolve_player(ledger.state(), &player)?;
            let removed = ledger.remove_player(&id)?;
            ledger.commit()?;
            format!("{} left the table", removed.name)
        }
        Command::Roulette { player } => {
            let id = resolve_player(ledger.state(), &player)?;
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            // Persist a freshly seeded state before play starts.
            ledger.commit()?;
            let mut table = RouletteTable::new(&mut *ledger, id)?;
            let stdin = io::stdin();
            let mut stdout = io::stdout();
            repl::run(&mut table, &mut rng, stdin.lock(), &mut stdout)?;
            String::new()
        }
    };
    Ok(output)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing();

    let store = JsonFileStore::new(PathBuf::from(&args.state_file));
    let mut ledger = GameLedger::open(store)
        .with_context(|| format!("failed to open state file {}", args.state_file))?;
    info!(path = %args.state_file, players = ledger.state().players.len(), "state loaded");

    let output = run_command(&mut ledger, args.command, args.seed)?;
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}
