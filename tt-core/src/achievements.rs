//! Achievement definitions and end-of-game evaluation.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::building::BuildingKind;
use crate::grid::Grid;

/// Unlock condition, evaluated against a finished board and its score.
///
/// Serialized with a `kind` tag and snake_case names. Reading also accepts
/// the camelCase form keyed by `type` (`{type: minScore, requiredValue: 20}`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(
    tag = "kind",
    rename_all = "snake_case",
    try_from = "CriteriaRepr"
)]
pub enum Criteria {
    /// Every square is covered.
    NoEmptyTiles,
    /// `score >= required_value`.
    MinScore { required_value: i32 },
    /// `min <= score <= max`.
    Range { min: i32, max: i32 },
    /// At least `required_count` buildings of one kind.
    CountBuilding {
        building: BuildingKind,
        required_count: usize,
    },
}

/// Flat, unvalidated serde form of [`Criteria`].
#[derive(Debug, Clone, Deserialize)]
pub struct CriteriaRepr {
    #[serde(alias = "type")]
    kind: String,
    #[serde(default, alias = "requiredValue")]
    required_value: Option<i32>,
    #[serde(default)]
    min: Option<i32>,
    #[serde(default)]
    max: Option<i32>,
    #[serde(default)]
    building: Option<BuildingKind>,
    #[serde(default, alias = "requiredCount")]
    required_count: Option<usize>,
}

impl TryFrom<CriteriaRepr> for Criteria {
    type Error = String;

    fn try_from(r: CriteriaRepr) -> Result<Self, Self::Error> {
        let missing = |field: &str| format!("criteria {:?} needs `{field}`", r.kind);
        match r.kind.as_str() {
            "no_empty_tiles" | "noEmptyTiles" => Ok(Criteria::NoEmptyTiles),
            "min_score" | "minScore" => Ok(Criteria::MinScore {
                required_value: r.required_value.ok_or_else(|| missing("required_value"))?,
            }),
            "range" => Ok(Criteria::Range {
                min: r.min.ok_or_else(|| missing("min"))?,
                max: r.max.ok_or_else(|| missing("max"))?,
            }),
            "count_building" | "countBuilding" => Ok(Criteria::CountBuilding {
                building: r.building.ok_or_else(|| missing("building"))?,
                required_count: r.required_count.ok_or_else(|| missing("required_count"))?,
            }),
            other => Err(format!("unknown criteria kind: {other:?}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AchievementDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "iconUrl")]
    pub icon_url: Option<String>,
    pub criteria: Criteria,
}

impl Criteria {
    pub fn is_met(&self, grid: &Grid, score: i32) -> bool {
        match *self {
            Criteria::NoEmptyTiles => grid.is_full(),
            Criteria::MinScore { required_value } => score >= required_value,
            Criteria::Range { min, max } => (min..=max).contains(&score),
            Criteria::CountBuilding {
                building,
                required_count,
            } => grid.count_building(building) >= required_count,
        }
    }
}

/// Definitions whose criteria hold and whose id is not yet in `unlocked`,
/// in definition order. Duplicate ids are reported once.
pub fn newly_earned<'a>(
    defs: &'a [AchievementDef],
    grid: &Grid,
    score: i32,
    unlocked: &BTreeSet<String>,
) -> Vec<&'a AchievementDef> {
    let mut seen: BTreeSet<String> = BTreeSet::new();
    defs.iter()
        .filter(|d| !unlocked.contains(&d.id))
        .filter(|d| d.criteria.is_met(grid, score))
        .filter(|d| seen.insert(d.id.clone()))
        .collect()
}

/// Built-in set used when the config does not list any.
pub fn default_achievements() -> Vec<AchievementDef> {
    vec![
        AchievementDef {
            id: "perfect_town".to_string(),
            name: "Perfect Town".to_string(),
            description: "Finish a town with every square covered.".to_string(),
            icon_url: None,
            criteria: Criteria::NoEmptyTiles,
        },
        AchievementDef {
            id: "master_builder".to_string(),
            name: "Master Builder".to_string(),
            description: "Score 20 points or more.".to_string(),
            icon_url: None,
            criteria: Criteria::MinScore { required_value: 20 },
        },
        AchievementDef {
            id: "break_even".to_string(),
            name: "Break Even".to_string(),
            description: "Finish with a score between 0 and 5.".to_string(),
            icon_url: None,
            criteria: Criteria::Range { min: 0, max: 5 },
        },
        AchievementDef {
            id: "cottage_core".to_string(),
            name: "Cottage Core".to_string(),
            description: "Build four cottages.".to_string(),
            icon_url: None,
            criteria: Criteria::CountBuilding {
                building: BuildingKind::Cottage,
                required_count: 4,
            },
        },
    ]
}
