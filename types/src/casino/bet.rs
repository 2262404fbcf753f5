//! Roulette bet identifiers.
//!
//! Board layout as seen by the player (single zero):
//!
//! ```text
//!       3  6  9 12 15 18 21 24 27 30 33 36   column 3
//!   0   2  5  8 11 14 17 20 23 26 29 32 35   column 2
//!       1  4  7 10 13 16 19 22 25 28 31 34   column 1
//! ```
//!
//! The right neighbour of `n` is `n + 3` and the bottom neighbour is `n - 1`. Every identifier
//! carries its operands structurally and is validated on construction, so the member set of a
//! [`BetId`] is always derivable from the identifier alone.
//!
//! Labels follow the table convention used for chip keys: `straight-17`, `split-3-6`,
//! `street-1-2-3`, `corner-1-2-4-5`, `line-1-2-3-4-5-6`, `column-1`, `dozen-2`, `red`, `black`,
//! `even`, `odd`, `low`, `high`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error as ThisError;

use super::{MAX_POCKET, RED_NUMBERS};

#[derive(Debug, ThisError, Clone, PartialEq, Eq)]
pub enum BetIdError {
    #[error("pocket out of range (got={got}, max={max})")]
    PocketOutOfRange { got: u8, max: u8 },
    #[error("{kind} is not a valid board position: {numbers:?}")]
    InvalidGeometry {
        kind: &'static str,
        numbers: Vec<u8>,
    },
    #[error("{kind} index out of range (got={index}, expected 1..=3)")]
    IndexOutOfRange { kind: &'static str, index: u8 },
    #[error("unknown bet kind: {0}")]
    UnknownKind(String),
    #[error("malformed bet label: {0}")]
    Malformed(String),
}

/// A single pocket on the wheel, 0 through 36.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Pocket(u8);

impl Pocket {
    pub const ZERO: Pocket = Pocket(0);

    pub fn new(number: u8) -> Result<Self, BetIdError> {
        if number > MAX_POCKET {
            return Err(BetIdError::PocketOutOfRange {
                got: number,
                max: MAX_POCKET,
            });
        }
        Ok(Self(number))
    }

    pub const fn number(self) -> u8 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn color(self) -> PocketColor {
        if self.0 == 0 {
            PocketColor::Green
        } else if RED_NUMBERS.contains(&self.0) {
            PocketColor::Red
        } else {
            PocketColor::Black
        }
    }

    /// Every pocket on the wheel, zero first.
    pub fn all() -> impl Iterator<Item = Pocket> {
        (0..=MAX_POCKET).map(Pocket)
    }
}

impl TryFrom<u8> for Pocket {
    type Error = BetIdError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Pocket> for u8 {
    fn from(pocket: Pocket) -> Self {
        pocket.0
    }
}

impl fmt::Display for Pocket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PocketColor {
    Green,
    Red,
    Black,
}

impl PocketColor {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PocketColor::Green => "green",
            PocketColor::Red => "red",
            PocketColor::Black => "black",
        }
    }
}

impl fmt::Display for PocketColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Outside bet operands
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RedBlack {
    Red,
    Black,
}

impl RedBlack {
    pub const fn as_str(&self) -> &'static str {
        match self {
            RedBlack::Red => "red",
            RedBlack::Black => "black",
        }
    }

    fn covers(self, number: u8) -> bool {
        match (self, Pocket(number).color()) {
            (RedBlack::Red, PocketColor::Red) | (RedBlack::Black, PocketColor::Black) => true,
            _ => false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Parity {
    Even,
    Odd,
}

impl Parity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Parity::Even => "even",
            Parity::Odd => "odd",
        }
    }

    fn covers(self, number: u8) -> bool {
        // Zero is neither even nor odd on the table.
        number != 0
            && match self {
                Parity::Even => number % 2 == 0,
                Parity::Odd => number % 2 == 1,
            }
    }
}

/// Low (1-18) or high (19-36) half of the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Half {
    Low,
    High,
}

impl Half {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Half::Low => "low",
            Half::High => "high",
        }
    }

    fn covers(self, number: u8) -> bool {
        match self {
            Half::Low => (1..=18).contains(&number),
            Half::High => (19..=MAX_POCKET).contains(&number),
        }
    }
}

/// Twelve-number column. Column 1 holds `1, 4, ..., 34`, column 3 holds `3, 6, ..., 36`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    First,
    Second,
    Third,
}

/// Twelve-number dozen: `1-12`, `13-24`, `25-36`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dozen {
    First,
    Second,
    Third,
}

macro_rules! indexed_third {
    ($ty:ident, $kind:literal) => {
        impl $ty {
            pub const ALL: [Self; 3] = [Self::First, Self::Second, Self::Third];

            pub fn from_index(index: u8) -> Result<Self, BetIdError> {
                match index {
                    1 => Ok(Self::First),
                    2 => Ok(Self::Second),
                    3 => Ok(Self::Third),
                    _ => Err(BetIdError::IndexOutOfRange { kind: $kind, index }),
                }
            }

            /// One-based index as printed on the board.
            pub const fn index(&self) -> u8 {
                match self {
                    Self::First => 1,
                    Self::Second => 2,
                    Self::Third => 3,
                }
            }
        }
    };
}

indexed_third!(Column, "column");
indexed_third!(Dozen, "dozen");

impl Column {
    fn covers(self, number: u8) -> bool {
        number != 0 && (number - 1) % 3 + 1 == self.index()
    }
}

impl Dozen {
    fn covers(self, number: u8) -> bool {
        number != 0 && (number - 1) / 12 + 1 == self.index()
    }
}

// ============================================================================
// Inside bet operands
// ============================================================================

/// Two pockets sharing a board edge (board-adjacent, not wheel-adjacent).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Split {
    low: u8,
    high: u8,
}

impl Split {
    /// Accepts the two pockets in either order.
    pub fn new(a: u8, b: u8) -> Result<Self, BetIdError> {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let in_range = low >= 1 && high <= MAX_POCKET;
        let horizontal = high - low == 3;
        let vertical = high - low == 1 && low % 3 != 0;
        if !in_range || !(horizontal || vertical) {
            return Err(BetIdError::InvalidGeometry {
                kind: "split",
                numbers: vec![a, b],
            });
        }
        Ok(Self { low, high })
    }

    pub const fn low(&self) -> u8 {
        self.low
    }

    pub const fn high(&self) -> u8 {
        self.high
    }
}

/// A row of three: `first, first + 1, first + 2` where `first % 3 == 1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Street {
    first: u8,
}

impl Street {
    pub fn new(first: u8) -> Result<Self, BetIdError> {
        if !(1..=34).contains(&first) || first % 3 != 1 {
            return Err(BetIdError::InvalidGeometry {
                kind: "street",
                numbers: vec![first],
            });
        }
        Ok(Self { first })
    }

    /// The street a non-zero pocket belongs to.
    pub fn containing(number: u8) -> Result<Self, BetIdError> {
        if number == 0 || number > MAX_POCKET {
            return Err(BetIdError::InvalidGeometry {
                kind: "street",
                numbers: vec![number],
            });
        }
        Self::new(number - (number - 1) % 3)
    }

    pub const fn first(&self) -> u8 {
        self.first
    }
}

/// Four pockets meeting at one grid corner, identified by the lowest of them:
/// `low, low + 1, low + 3, low + 4`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Corner {
    low: u8,
}

impl Corner {
    pub fn new(low: u8) -> Result<Self, BetIdError> {
        if !(1..=32).contains(&low) || low % 3 == 0 {
            return Err(BetIdError::InvalidGeometry {
                kind: "corner",
                numbers: vec![low],
            });
        }
        Ok(Self { low })
    }

    pub const fn low(&self) -> u8 {
        self.low
    }
}

/// Two adjacent streets: `first ..= first + 5` where `first % 3 == 1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Line {
    first: u8,
}

impl Line {
    pub fn new(first: u8) -> Result<Self, BetIdError> {
        if !(1..=31).contains(&first) || first % 3 != 1 {
            return Err(BetIdError::InvalidGeometry {
                kind: "line",
                numbers: vec![first],
            });
        }
        Ok(Self { first })
    }

    pub const fn first(&self) -> u8 {
        self.first
    }
}

// ============================================================================
// Bet identifier
// ============================================================================

/// A wager target on the roulette board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BetId {
    Straight(Pocket),
    Split(Split),
    Street(Street),
    Corner(Corner),
    Line(Line),
    Column(Column),
    Dozen(Dozen),
    Color(RedBlack),
    Parity(Parity),
    Range(Half),
}

impl BetId {
    pub const fn kind(&self) -> &'static str {
        match self {
            BetId::Straight(_) => "straight",
            BetId::Split(_) => "split",
            BetId::Street(_) => "street",
            BetId::Corner(_) => "corner",
            BetId::Line(_) => "line",
            BetId::Column(_) => "column",
            BetId::Dozen(_) => "dozen",
            BetId::Color(color) => color.as_str(),
            BetId::Parity(parity) => parity.as_str(),
            BetId::Range(half) => half.as_str(),
        }
    }

    /// Inside bets name specific pockets; outside bets name a category.
    pub const fn is_inside(&self) -> bool {
        matches!(
            self,
            BetId::Straight(_) | BetId::Split(_) | BetId::Street(_) | BetId::Corner(_) | BetId::Line(_)
        )
    }

    /// Member pockets in ascending order.
    pub fn members(&self) -> Vec<u8> {
        match *self {
            BetId::Straight(pocket) => vec![pocket.number()],
            BetId::Split(split) => vec![split.low, split.high],
            BetId::Street(street) => (street.first..street.first + 3).collect(),
            BetId::Corner(corner) => {
                let low = corner.low;
                vec![low, low + 1, low + 3, low + 4]
            }
            BetId::Line(line) => (line.first..line.first + 6).collect(),
            _ => (1..=MAX_POCKET).filter(|n| self.covers(*n)).collect(),
        }
    }

    /// Whether `number` is one of this bet's members.
    pub fn covers(&self, number: u8) -> bool {
        if number > MAX_POCKET {
            return false;
        }
        match *self {
            BetId::Straight(pocket) => pocket.number() == number,
            BetId::Split(split) => split.low == number || split.high == number,
            BetId::Street(street) => (street.first..street.first + 3).contains(&number),
            BetId::Corner(corner) => {
                let low = corner.low;
                number == low || number == low + 1 || number == low + 3 || number == low + 4
            }
            BetId::Line(line) => (line.first..line.first + 6).contains(&number),
            BetId::Column(column) => column.covers(number),
            BetId::Dozen(dozen) => dozen.covers(number),
            BetId::Color(color) => color.covers(number),
            BetId::Parity(parity) => parity.covers(number),
            BetId::Range(half) => half.covers(number),
        }
    }
}

impl fmt::Display for BetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BetId::Column(column) => write!(f, "column-{}", column.index()),
            BetId::Dozen(dozen) => write!(f, "dozen-{}", dozen.index()),
            BetId::Color(_) | BetId::Parity(_) | BetId::Range(_) => f.write_str(self.kind()),
            _ => {
                f.write_str(self.kind())?;
                for member in self.members() {
                    write!(f, "-{member}")?;
                }
                Ok(())
            }
        }
    }
}

/// Build a multi-member bet from its lowest member and check the label listed exactly its members.
fn anchored(
    kind: &'static str,
    numbers: &[u8],
    build: impl FnOnce(u8) -> Result<BetId, BetIdError>,
) -> Result<BetId, BetIdError> {
    let mut sorted = numbers.to_vec();
    sorted.sort_unstable();
    let invalid = || BetIdError::InvalidGeometry {
        kind,
        numbers: numbers.to_vec(),
    };
    let bet = build(sorted[0]).map_err(|_| invalid())?;
    if bet.members() != sorted {
        return Err(invalid());
    }
    Ok(bet)
}

impl FromStr for BetId {
    type Err = BetIdError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        let label = label.trim().to_ascii_lowercase();
        let mut parts = label.split('-');
        let kind = parts.next().unwrap_or_default();
        let numbers = parts
            .map(|part| part.parse::<u8>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| BetIdError::Malformed(label.clone()))?;

        let bet = match (kind, numbers.as_slice()) {
            ("straight", [n]) => BetId::Straight(Pocket::new(*n)?),
            ("split", [a, b]) => BetId::Split(Split::new(*a, *b)?),
            ("street", nums) if nums.len() == 3 => {
                anchored("street", nums, |n| Street::new(n).map(BetId::Street))?
            }
            ("corner", nums) if nums.len() == 4 => {
                anchored("corner", nums, |n| Corner::new(n).map(BetId::Corner))?
            }
            ("line", nums) if nums.len() == 6 => {
                anchored("line", nums, |n| Line::new(n).map(BetId::Line))?
            }
            ("column", [index]) => BetId::Column(Column::from_index(*index)?),
            ("dozen", [index]) => BetId::Dozen(Dozen::from_index(*index)?),
            ("red", []) => BetId::Color(RedBlack::Red),
            ("black", []) => BetId::Color(RedBlack::Black),
            ("even", []) => BetId::Parity(Parity::Even),
            ("odd", []) => BetId::Parity(Parity::Odd),
            ("low", []) => BetId::Range(Half::Low),
            ("high", []) => BetId::Range(Half::High),
            (
                "straight" | "split" | "street" | "corner" | "line" | "column" | "dozen" | "red"
                | "black" | "even" | "odd" | "low" | "high",
                _,
            ) => return Err(BetIdError::Malformed(label.clone())),
            _ => return Err(BetIdError::UnknownKind(kind.to_string())),
        };
        Ok(bet)
    }
}

impl TryFrom<String> for BetId {
    type Error = BetIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BetId> for String {
    fn from(bet: BetId) -> Self {
        bet.to_string()
    }
}
