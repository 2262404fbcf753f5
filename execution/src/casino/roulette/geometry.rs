//! Board topology.
//!
//! The board is three rows of twelve streets. Pocket `n` sits in street `ceil(n / 3)`; within a
//! street `n % 3 == 1` is the bottom row and `n % 3 == 0` the top row. Every composite bet is
//! derived from two neighbour rules, so the set of legal bets is fixed arithmetic rather than a
//! property of the rendered board.

use babapoly_types::casino::{
    BetId, Column, Corner, Dozen, Half, Line, Parity, Pocket, PocketColor, RedBlack, Split, Street,
    BOARD_ROWS, BOARD_STREETS, MAX_POCKET,
};
use std::collections::BTreeSet;

/// Board neighbours of a pocket. Zero has none.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Neighbors {
    /// Same row, next street (`n + 3`).
    pub right: Option<u8>,
    /// Same street, one row down (`n - 1`).
    pub bottom: Option<u8>,
}

pub fn neighbors_of(number: u8) -> Neighbors {
    if number == 0 || number > MAX_POCKET {
        return Neighbors::default();
    }
    let street = number.div_ceil(BOARD_ROWS);
    Neighbors {
        right: (street < BOARD_STREETS).then_some(number + BOARD_ROWS),
        bottom: (number % BOARD_ROWS != 1).then_some(number - 1),
    }
}

pub fn members_of(bet: BetId) -> Vec<u8> {
    bet.members()
}

/// Winnings per unit staked. A winning bet returns `amount * (multiplier + 1)`.
pub const fn payout_multiplier(bet: BetId) -> u64 {
    match bet {
        BetId::Straight(_) => 35,
        BetId::Split(_) => 17,
        BetId::Street(_) => 11,
        BetId::Corner(_) => 8,
        BetId::Line(_) => 5,
        BetId::Column(_) | BetId::Dozen(_) => 2,
        BetId::Color(_) | BetId::Parity(_) | BetId::Range(_) => 1,
    }
}

/// Total returned to the player for a winning stake.
pub fn total_return(bet: BetId, amount: u64) -> u64 {
    amount.saturating_mul(payout_multiplier(bet) + 1)
}

pub fn color_of(pocket: Pocket) -> PocketColor {
    pocket.color()
}

/// Clickable regions of a pocket's cell. Each region maps to at most one bet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Hotspot {
    /// Centre of the cell.
    Cell(Pocket),
    /// Edge shared with the right neighbour.
    RightEdge(Pocket),
    /// Edge shared with the bottom neighbour.
    BottomEdge(Pocket),
    /// Bottom-right corner, shared by four cells.
    Corner(Pocket),
    /// Outer edge below a bottom-row cell.
    StreetEdge(Pocket),
    /// Outer corner between two bottom-row cells.
    LineEdge(Pocket),
}

impl Hotspot {
    /// The bet placed by clicking this region, or `None` where the board has no neighbour.
    pub fn resolve(self) -> Option<BetId> {
        match self {
            Hotspot::Cell(pocket) => Some(BetId::Straight(pocket)),
            Hotspot::RightEdge(pocket) => {
                let right = neighbors_of(pocket.number()).right?;
                Split::new(pocket.number(), right).ok().map(BetId::Split)
            }
            Hotspot::BottomEdge(pocket) => {
                let bottom = neighbors_of(pocket.number()).bottom?;
                Split::new(bottom, pocket.number()).ok().map(BetId::Split)
            }
            Hotspot::Corner(pocket) => {
                let neighbors = neighbors_of(pocket.number());
                let bottom = neighbors.bottom?;
                neighbors.right?;
                Corner::new(bottom).ok().map(BetId::Corner)
            }
            Hotspot::StreetEdge(pocket) => {
                if pocket.is_zero() || pocket.number() % BOARD_ROWS != 1 {
                    return None;
                }
                Street::new(pocket.number()).ok().map(BetId::Street)
            }
            Hotspot::LineEdge(pocket) => {
                if pocket.is_zero() || pocket.number() % BOARD_ROWS != 1 {
                    return None;
                }
                neighbors_of(pocket.number()).right?;
                Line::new(pocket.number()).ok().map(BetId::Line)
            }
        }
    }
}

/// Splits, corners, streets and lines anchored at `number`'s cell.
pub fn composites_at(number: u8) -> Vec<BetId> {
    let Ok(pocket) = Pocket::new(number) else {
        return Vec::new();
    };
    [
        Hotspot::RightEdge(pocket),
        Hotspot::BottomEdge(pocket),
        Hotspot::Corner(pocket),
        Hotspot::StreetEdge(pocket),
        Hotspot::LineEdge(pocket),
    ]
    .into_iter()
    .filter_map(Hotspot::resolve)
    .collect()
}

/// The six even-money bets.
pub const EVEN_MONEY: [BetId; 6] = [
    BetId::Color(RedBlack::Red),
    BetId::Color(RedBlack::Black),
    BetId::Parity(Parity::Even),
    BetId::Parity(Parity::Odd),
    BetId::Range(Half::Low),
    BetId::Range(Half::High),
];

/// Every legal bet on the board, in `BetId` order.
pub fn all_bets() -> Vec<BetId> {
    let mut bets = BTreeSet::new();
    for pocket in Pocket::all() {
        bets.insert(BetId::Straight(pocket));
        bets.extend(composites_at(pocket.number()));
    }
    bets.extend(Column::ALL.map(BetId::Column));
    bets.extend(Dozen::ALL.map(BetId::Dozen));
    bets.extend(EVEN_MONEY);
    bets.into_iter().collect()
}

/// Every legal bet that wins when `number` comes up.
pub fn bets_covering(number: u8) -> Vec<BetId> {
    all_bets()
        .into_iter()
        .filter(|bet| bet.covers(number))
        .collect()
}
