//! Scoring engine.
//!
//! A score is always recomputed from the whole board. Each catalog entry
//! contributes through its `ScoringRule`; the empty-cell penalty is applied
//! last unless some building on the board waives it.

use serde::{Deserialize, Serialize};

use crate::building::{BuildingKind, ScoringRule, CATALOG, NUM_BUILDINGS};
use crate::grid::{Cell, FactoryAnnotations, Grid};

/// Points lost per empty cell.
pub const EMPTY_CELL_PENALTY: i32 = 1;

/// Points one building kind earned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
    pub building: BuildingKind,
    pub count: i32,
    pub points: i32,
}

/// Full score with per-building detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// One entry per catalog building, in catalog order.
    pub contributions: Vec<Contribution>,
    /// Buildings credited as fed.
    pub fed: i32,
    pub empty_cells: i32,
    /// Zero or negative.
    pub empty_penalty: i32,
    pub total: i32,
}

impl ScoreBreakdown {
    pub fn points_for(&self, kind: BuildingKind) -> i32 {
        self.contributions
            .iter()
            .find(|c| c.building == kind)
            .map_or(0, |c| c.points)
    }
}

/// Total score of `grid`. Pure and idempotent.
pub fn compute_score(grid: &Grid, factory: &FactoryAnnotations) -> i32 {
    score_breakdown(grid, factory).total
}

pub fn score_breakdown(grid: &Grid, factory: &FactoryAnnotations) -> ScoreBreakdown {
    let counts = tally(grid);
    let fed = fed_count(&counts);

    let mut capacity_left = fed;
    let mut waived = false;
    let mut contributions = Vec::with_capacity(NUM_BUILDINGS);

    for template in CATALOG.iter() {
        let kind = template.kind;
        let count = counts[kind.index()];
        let points = match template.rule {
            ScoringRule::Fed { points } => {
                let fed_here = count.min(capacity_left);
                capacity_left -= fed_here;
                fed_here * points
            }
            ScoringRule::Feeds { .. } => 0,
            ScoringRule::PerFed => count * fed,
            ScoringRule::GroupTable { table } => group_points(table, count),
            ScoringRule::Adjacent { neighbor, points } => {
                adjacent_pairs(grid, kind, neighbor) * points
            }
            ScoringRule::LineVariety => line_variety(grid, kind),
            ScoringRule::Monument {
                points,
                waives_empty_penalty,
            } => {
                waived |= waives_empty_penalty && count > 0;
                count * points
            }
            ScoringRule::Stockpile { weight } => stored_resources(grid, factory, kind) * weight,
        };
        contributions.push(Contribution {
            building: kind,
            count,
            points,
        });
    }

    let empty_cells = grid.empty_count() as i32;
    let empty_penalty = if waived {
        0
    } else {
        -empty_cells * EMPTY_CELL_PENALTY
    };
    let total = contributions.iter().map(|c| c.points).sum::<i32>() + empty_penalty;

    ScoreBreakdown {
        contributions,
        fed,
        empty_cells,
        empty_penalty,
        total,
    }
}

/// Instances of each building kind, indexed by `BuildingKind::index`.
pub fn tally(grid: &Grid) -> [i32; NUM_BUILDINGS] {
    let mut counts = [0i32; NUM_BUILDINGS];
    for cell in grid.cells() {
        if let Cell::Building(kind) = cell {
            counts[kind.index()] += 1;
        }
    }
    counts
}

/// `min(buildings that want feeding, total feeding capacity)`.
pub fn fed_count(counts: &[i32; NUM_BUILDINGS]) -> i32 {
    let mut hungry = 0;
    let mut capacity = 0;
    for template in CATALOG.iter() {
        let count = counts[template.kind.index()];
        match template.rule {
            ScoringRule::Fed { .. } => hungry += count,
            ScoringRule::Feeds { capacity: per } => capacity += count * per,
            _ => {}
        }
    }
    hungry.min(capacity)
}

fn group_points(table: &[i32], count: i32) -> i32 {
    let Some(last) = table.len().checked_sub(1) else {
        return 0;
    };
    let idx = usize::try_from(count).unwrap_or(0).min(last);
    table[idx]
}

/// For every `kind` cell, the number of orthogonal `neighbor` cells.
fn adjacent_pairs(grid: &Grid, kind: BuildingKind, neighbor: BuildingKind) -> i32 {
    let mut pairs = 0;
    for (i, cell) in grid.cells().iter().enumerate() {
        if cell.building() != Some(kind) {
            continue;
        }
        pairs += grid
            .neighbors(i)
            .filter(|&j| grid.get(j).and_then(Cell::building) == Some(neighbor))
            .count() as i32;
    }
    pairs
}

/// For every `kind` cell, the number of distinct other building kinds in
/// its row and column combined.
fn line_variety(grid: &Grid, kind: BuildingKind) -> i32 {
    let mut total = 0;
    for (i, cell) in grid.cells().iter().enumerate() {
        if cell.building() != Some(kind) {
            continue;
        }
        let mut seen = 0u32;
        for j in grid.lines_through(i) {
            if let Some(other) = grid.get(j).and_then(Cell::building) {
                if other != kind {
                    seen |= 1 << other.index();
                }
            }
        }
        total += seen.count_ones() as i32;
    }
    total
}

/// Sum of stock counts annotated on cells that actually hold `kind`.
fn stored_resources(grid: &Grid, factory: &FactoryAnnotations, kind: BuildingKind) -> i32 {
    factory
        .iter()
        .filter(|(&idx, _)| grid.get(idx).and_then(Cell::building) == Some(kind))
        .map(|(_, stock)| stock.count as i32)
        .sum()
}
