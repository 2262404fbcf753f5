/// Key under which the whole game state is persisted.
pub const STORAGE_KEY: &str = "baba-poly-state-v1";

/// Maximum name length for player registration
pub const MAX_NAME_LENGTH: usize = 32;

/// Highest pocket on a single-zero wheel.
pub const MAX_POCKET: u8 = 36;

/// Number of pockets on the wheel (0 through 36).
pub const POCKET_COUNT: usize = 37;

/// Red pockets on a European wheel.
pub const RED_NUMBERS: [u8; 18] = [1, 3, 5, 7, 9, 12, 14, 16, 18, 19, 21, 23, 25, 27, 30, 32, 34, 36];

/// Rows on the betting board (one per column bet).
pub const BOARD_ROWS: u8 = 3;

/// Columns of three on the betting board (one per street).
pub const BOARD_STREETS: u8 = 12;

/// Colour assigned to players created without an explicit choice.
pub const DEFAULT_PLAYER_COLOR: &str = "#ffd23f";

/// Bounds and default for a new player's starting money.
pub const MIN_STARTING_MONEY: u64 = 100;
pub const MAX_STARTING_MONEY: u64 = 2_000;
pub const DEFAULT_STARTING_MONEY: u64 = 500;

/// Participant id of the bank, an unlimited source and sink of money.
pub const BANK_ID: &str = "bank";
pub const BANK_NAME: &str = "Banca";

/// Participant id of the communal pot fed by losing roulette rounds.
pub const POT_ID: &str = "pot";
pub const POT_NAME: &str = "Bote";
