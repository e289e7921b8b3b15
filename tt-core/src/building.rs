//! Building catalog: names, base patterns and scoring rules.
//!
//! Every building is one `BuildingTemplate` record. The scoring engine only
//! ever dispatches on `ScoringRule`, so adding a building is one new entry
//! in `CATALOG` (plus its `BuildingKind` variant).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::resource::Color::{Blue, Brown, Gray, Red, Yellow};
use crate::shape::ShapeCell;

pub const NUM_BUILDINGS: usize = 8;

/// Cottages a single Farm can feed.
pub const FARM_CAPACITY: i32 = 4;

/// Points per stored Factory resource. Currently zero-weighted: the stock
/// model is complete but no point value has been assigned to it yet.
pub const FACTORY_STOCK_WEIGHT: i32 = 0;

/// Tavern group table, indexed by `min(taverns, 5)`.
pub const TAVERN_TABLE: [i32; 6] = [0, 2, 5, 9, 14, 20];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseNameError {
    #[error("unknown building: {0:?}")]
    Building(String),
    #[error("unknown resource: {0:?}")]
    Resource(String),
    #[error("unknown cell content: {0:?}")]
    Cell(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BuildingKind {
    Cottage,
    Farm,
    Chapel,
    Tavern,
    Well,
    Theater,
    Factory,
    #[serde(alias = "Catedral")]
    Cathedral,
}

impl BuildingKind {
    pub const ALL: [BuildingKind; NUM_BUILDINGS] = [
        BuildingKind::Cottage,
        BuildingKind::Farm,
        BuildingKind::Chapel,
        BuildingKind::Tavern,
        BuildingKind::Well,
        BuildingKind::Theater,
        BuildingKind::Factory,
        BuildingKind::Cathedral,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BuildingKind::Cottage => "Cottage",
            BuildingKind::Farm => "Farm",
            BuildingKind::Chapel => "Chapel",
            BuildingKind::Tavern => "Tavern",
            BuildingKind::Well => "Well",
            BuildingKind::Theater => "Theater",
            BuildingKind::Factory => "Factory",
            BuildingKind::Cathedral => "Cathedral",
        }
    }

    /// Position of this kind in `ALL` (and in `CATALOG`).
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn template(self) -> &'static BuildingTemplate {
        &CATALOG[self.index()]
    }
}

impl fmt::Display for BuildingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for BuildingKind {
    type Err = ParseNameError;

    /// Exact, case-sensitive catalog names. "Catedral" is accepted for
    /// boards saved under the old spelling.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "Catedral" {
            return Ok(BuildingKind::Cathedral);
        }
        BuildingKind::ALL
            .iter()
            .copied()
            .find(|k| k.name() == s)
            .ok_or_else(|| ParseNameError::Building(s.to_string()))
    }
}

/// How a building kind contributes to the final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoringRule {
    /// Scores `points` per fed instance (fed = min(instances, feeding capacity)).
    Fed { points: i32 },
    /// Supplies feeding capacity; no direct points.
    Feeds { capacity: i32 },
    /// One point per fed building on the whole board, per instance.
    PerFed,
    /// Group score looked up by instance count, clamped to the last entry.
    GroupTable { table: &'static [i32] },
    /// `points` per orthogonally adjacent `neighbor`, per instance.
    Adjacent { neighbor: BuildingKind, points: i32 },
    /// Distinct other building kinds in the same row or column, per instance.
    LineVariety,
    /// Flat points per instance; optionally waives the empty-cell penalty.
    Monument {
        points: i32,
        waives_empty_penalty: bool,
    },
    /// `weight` per stored resource recorded in the Factory annotations.
    Stockpile { weight: i32 },
}

#[derive(Debug)]
pub struct BuildingTemplate {
    pub kind: BuildingKind,
    pub patterns: &'static [&'static [ShapeCell]],
    pub rule: ScoringRule,
}

const fn c(color: crate::resource::Color, row: i32, col: i32) -> ShapeCell {
    ShapeCell::new(color, row, col)
}

/// The building catalog, in `BuildingKind::ALL` order.
pub static CATALOG: [BuildingTemplate; NUM_BUILDINGS] = [
    BuildingTemplate {
        kind: BuildingKind::Cottage,
        patterns: &[&[c(Yellow, 0, 1), c(Red, 1, 0), c(Blue, 1, 1)]],
        rule: ScoringRule::Fed { points: 3 },
    },
    BuildingTemplate {
        kind: BuildingKind::Farm,
        patterns: &[&[
            c(Yellow, 0, 0),
            c(Yellow, 0, 1),
            c(Brown, 1, 0),
            c(Brown, 1, 1),
        ]],
        rule: ScoringRule::Feeds {
            capacity: FARM_CAPACITY,
        },
    },
    BuildingTemplate {
        kind: BuildingKind::Chapel,
        patterns: &[&[
            c(Blue, 0, 2),
            c(Gray, 1, 0),
            c(Blue, 1, 1),
            c(Gray, 1, 2),
        ]],
        rule: ScoringRule::PerFed,
    },
    BuildingTemplate {
        kind: BuildingKind::Tavern,
        patterns: &[&[c(Red, 0, 0), c(Red, 0, 1), c(Blue, 0, 2)]],
        rule: ScoringRule::GroupTable {
            table: &TAVERN_TABLE,
        },
    },
    BuildingTemplate {
        kind: BuildingKind::Well,
        patterns: &[&[c(Brown, 0, 0), c(Gray, 0, 1)]],
        rule: ScoringRule::Adjacent {
            neighbor: BuildingKind::Cottage,
            points: 1,
        },
    },
    BuildingTemplate {
        kind: BuildingKind::Theater,
        patterns: &[&[
            c(Gray, 0, 1),
            c(Brown, 1, 0),
            c(Blue, 1, 1),
            c(Brown, 1, 2),
        ]],
        rule: ScoringRule::LineVariety,
    },
    BuildingTemplate {
        kind: BuildingKind::Factory,
        patterns: &[&[
            c(Brown, 0, 0),
            c(Red, 1, 0),
            c(Gray, 1, 1),
            c(Gray, 1, 2),
            c(Red, 1, 3),
        ]],
        rule: ScoringRule::Stockpile {
            weight: FACTORY_STOCK_WEIGHT,
        },
    },
    BuildingTemplate {
        kind: BuildingKind::Cathedral,
        patterns: &[&[c(Yellow, 0, 1), c(Gray, 1, 0), c(Blue, 1, 1)]],
        rule: ScoringRule::Monument {
            points: 2,
            waives_empty_penalty: true,
        },
    },
];

/// Look up a catalog entry by building name. `None` for unknown names.
pub fn template_for(name: &str) -> Option<&'static BuildingTemplate> {
    name.parse::<BuildingKind>().ok().map(BuildingKind::template)
}
