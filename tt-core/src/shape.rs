//! Shape canonicalizer: translation-independent normal form and the 8
//! dihedral orientations of a pattern.
//!
//! Coordinates are signed integers relative to an arbitrary origin. A
//! pattern is compared only after `normalize`, which shifts the minimum row
//! and column to 0 and sorts row-major.

use serde::{Deserialize, Serialize};

use crate::resource::Color;

/// Number of orientations produced by [`orientations`].
pub const NUM_ORIENTATIONS: usize = 8;

/// One colored cell of a pattern, at a relative position.
///
/// `color` is `None` for a selected grid cell that carries no resource; such
/// a cell never equals a template cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShapeCell {
    pub color: Option<Color>,
    pub row: i32,
    pub col: i32,
}

impl ShapeCell {
    pub const fn new(color: Color, row: i32, col: i32) -> Self {
        Self {
            color: Some(color),
            row,
            col,
        }
    }
}

pub type Pattern = Vec<ShapeCell>;

/// Shift so that min row and min col are 0, then sort by `(row, col)`.
///
/// The sort is stable. An empty input yields an empty pattern, which never
/// equals a catalog template.
pub fn normalize(pattern: &[ShapeCell]) -> Pattern {
    let (Some(min_row), Some(min_col)) = (
        pattern.iter().map(|c| c.row).min(),
        pattern.iter().map(|c| c.col).min(),
    ) else {
        return Vec::new();
    };

    let mut out: Pattern = pattern
        .iter()
        .map(|c| ShapeCell {
            color: c.color,
            row: c.row - min_row,
            col: c.col - min_col,
        })
        .collect();
    out.sort_by_key(|c| (c.row, c.col));
    out
}

/// Quarter turn clockwise about the origin: `(row, col) -> (col, -row)`.
/// The result is not normalized.
pub fn rotate90(pattern: &[ShapeCell]) -> Pattern {
    pattern
        .iter()
        .map(|c| ShapeCell {
            color: c.color,
            row: c.col,
            col: -c.row,
        })
        .collect()
}

/// Mirror across the row axis: `(row, col) -> (row, -col)`.
/// The result is not normalized.
pub fn flip_horizontal(pattern: &[ShapeCell]) -> Pattern {
    pattern
        .iter()
        .map(|c| ShapeCell {
            color: c.color,
            row: c.row,
            col: -c.col,
        })
        .collect()
}

/// All 8 orientations of `base`, each normalized:
/// identity, 3 successive quarter turns, then the horizontal flip followed
/// by its 3 successive quarter turns.
///
/// Symmetric shapes produce repeated entries; nothing is deduplicated.
pub fn orientations(base: &[ShapeCell]) -> [Pattern; NUM_ORIENTATIONS] {
    let original = normalize(base);
    let r1 = normalize(&rotate90(&original));
    let r2 = normalize(&rotate90(&r1));
    let r3 = normalize(&rotate90(&r2));

    let flipped = normalize(&flip_horizontal(&original));
    let f1 = normalize(&rotate90(&flipped));
    let f2 = normalize(&rotate90(&f1));
    let f3 = normalize(&rotate90(&f2));

    [original, r1, r2, r3, flipped, f1, f2, f3]
}

/// Element-wise equality of two patterns normalized the same way.
pub fn patterns_equal(a: &[ShapeCell], b: &[ShapeCell]) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b)
            .all(|(x, y)| x.color == y.color && x.row == y.row && x.col == y.col)
}
