//! Pattern matcher: does a selection of grid cells form a building?

use crate::building::{template_for, BuildingKind, BuildingTemplate, CATALOG};
use crate::grid::Grid;
use crate::shape::{normalize, orientations, patterns_equal, Pattern, ShapeCell};

/// Result of validating a selection against a building.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MatchOutcome {
    pub matched: bool,
    /// The caller's selection, unchanged, when matched; empty otherwise.
    pub cells_to_clear: Vec<usize>,
}

impl MatchOutcome {
    pub fn no_match() -> Self {
        Self::default()
    }
}

/// Map selected flat indices to pattern cells using `cols` for row/col.
///
/// Cells without a resource (empty, built on, or out of range) get no color.
pub fn selection_pattern(grid: &Grid, selected: &[usize], cols: usize) -> Pattern {
    let cols = cols.max(1);
    selected
        .iter()
        .map(|&idx| ShapeCell {
            color: grid
                .get(idx)
                .and_then(|cell| cell.resource())
                .map(|r| r.color()),
            row: (idx / cols) as i32,
            col: (idx % cols) as i32,
        })
        .collect()
}

/// Validate `selected` against the building called `building_name`.
///
/// Unknown names never match. On success `cells_to_clear` is `selected` in
/// the caller's order. Neither input is modified.
pub fn match_building(
    grid: &Grid,
    selected: &[usize],
    building_name: &str,
    cols: usize,
) -> MatchOutcome {
    match template_for(building_name) {
        Some(template) => match_template(grid, selected, template, cols),
        None => MatchOutcome::no_match(),
    }
}

/// Validate `selected` against a catalog entry.
pub fn match_template(
    grid: &Grid,
    selected: &[usize],
    template: &BuildingTemplate,
    cols: usize,
) -> MatchOutcome {
    let player = normalize(&selection_pattern(grid, selected, cols));
    if player.is_empty() {
        return MatchOutcome::no_match();
    }

    let hit = template.patterns.iter().any(|base| {
        // Cheap reject before enumerating orientations.
        base.len() == player.len()
            && orientations(base)
                .iter()
                .any(|variant| patterns_equal(&player, variant))
    });

    if hit {
        MatchOutcome {
            matched: true,
            cells_to_clear: selected.to_vec(),
        }
    } else {
        MatchOutcome::no_match()
    }
}

/// Every catalog building the selection satisfies, in catalog order.
pub fn matching_buildings(grid: &Grid, selected: &[usize], cols: usize) -> Vec<BuildingKind> {
    CATALOG
        .iter()
        .filter(|t| match_template(grid, selected, t, cols).matched)
        .map(|t| t.kind)
        .collect()
}
