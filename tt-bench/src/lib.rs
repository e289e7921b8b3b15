//! Deterministic sample boards and selections for the benches.

use tt_core::{
    orientations, BuildingKind, Cell, Grid, Resource, ShapeCell, CATALOG, NUM_BUILDINGS,
};

/// Simple deterministic xorshift64, no rand dependency.
pub struct XorShift(u64);

impl XorShift {
    pub fn new(seed: u64) -> Self {
        Self(seed.max(1))
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    pub fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }
}

/// `n` random `rows x cols` towns: roughly a quarter empty, the rest split
/// between resources and buildings.
pub fn gen_boards(n: usize, rows: usize, cols: usize) -> Vec<Grid> {
    let mut rng = XorShift::new(0x1234_5678_9ABC_DEF0);
    let mut out = Vec::with_capacity(n);
    for _ in 0..n {
        let cells = (0..rows * cols)
            .map(|_| match rng.below(4) {
                0 => Cell::Empty,
                1 => Cell::Resource(Resource::ALL[rng.below(Resource::ALL.len())]),
                _ => Cell::Building(BuildingKind::ALL[rng.below(NUM_BUILDINGS)]),
            })
            .collect();
        if let Ok(g) = Grid::from_cells(rows, cols, cells) {
            out.push(g);
        }
    }
    out
}

/// Rows and columns spanned by a normalized pattern.
fn extent(pattern: &[ShapeCell]) -> Option<(usize, usize)> {
    let height = pattern.iter().map(|c| c.row).max()? as usize + 1;
    let width = pattern.iter().map(|c| c.col).max()? as usize + 1;
    Some((height, width))
}

/// A selection that should be tested against one building.
pub struct MatchSample {
    pub grid: Grid,
    pub selected: Vec<usize>,
    pub building: BuildingKind,
}

/// `n` selections on a `size x size` board. Every other sample is a real
/// orientation of its building; the rest are the same cells shuffled to
/// other resources so the matcher has to scan all variants.
pub fn gen_match_samples(n: usize, size: usize) -> Vec<MatchSample> {
    let fits_any = CATALOG.iter().any(|t| {
        t.patterns
            .iter()
            .flat_map(|p| orientations(p))
            .any(|v| extent(&v).map_or(false, |(h, w)| h <= size && w <= size))
    });
    if !fits_any {
        return Vec::new();
    }

    let mut rng = XorShift::new(0xC0FF_EE00_D15E_A5E5);
    let mut out = Vec::with_capacity(n);
    while out.len() < n {
        let template = &CATALOG[rng.below(CATALOG.len())];
        let base = template.patterns[rng.below(template.patterns.len())];
        let variants = orientations(base);
        let variant = &variants[rng.below(variants.len())];

        let Some((height, width)) = extent(variant) else {
            continue;
        };
        if height > size || width > size {
            continue;
        }
        let row0 = rng.below(size - height + 1);
        let col0 = rng.below(size - width + 1);
        let scramble = out.len() % 2 == 1;

        let Ok(mut grid) = Grid::new(size, size) else {
            break;
        };
        let mut selected = Vec::with_capacity(variant.len());
        for c in variant {
            let idx = (row0 + c.row as usize) * size + col0 + c.col as usize;
            let resource = if scramble {
                Resource::ALL[rng.below(Resource::ALL.len())]
            } else {
                match c.color {
                    Some(color) => color.resource(),
                    None => continue,
                }
            };
            if grid.set(idx, Cell::Resource(resource)).is_ok() {
                selected.push(idx);
            }
        }
        out.push(MatchSample {
            grid,
            selected,
            building: template.kind,
        });
    }
    out
}
