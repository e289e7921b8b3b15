#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use crate::resource::Color::{self, Blue, Brown, Gray, Red, Yellow};
    use crate::{
        flip_horizontal, normalize, orientations, patterns_equal, rotate90, BuildingKind,
        ShapeCell, CATALOG, NUM_ORIENTATIONS,
    };

    fn sc(color: Color, row: i32, col: i32) -> ShapeCell {
        ShapeCell::new(color, row, col)
    }

    /// A few awkward raw patterns: offset, negative, unsorted.
    fn samples() -> Vec<Vec<ShapeCell>> {
        vec![
            vec![sc(Yellow, 2, 3), sc(Red, 2, 4), sc(Blue, 3, 3)],
            vec![sc(Gray, -1, -5), sc(Brown, 0, -5), sc(Gray, 0, -4), sc(Red, 0, -3)],
            vec![sc(Blue, 7, 1), sc(Blue, 5, 2), sc(Red, 6, 0)],
            vec![sc(Brown, 0, 0)],
        ]
    }

    #[test]
    fn normalize_shifts_to_origin_and_sorts() {
        let norm = normalize(&[sc(Yellow, 2, 3), sc(Red, 2, 4), sc(Blue, 3, 3)]);
        assert_eq!(
            norm,
            vec![sc(Yellow, 0, 0), sc(Red, 0, 1), sc(Blue, 1, 0)]
        );

        let unsorted = normalize(&[sc(Blue, 1, 1), sc(Yellow, 0, 1), sc(Red, 1, 0)]);
        assert_eq!(
            unsorted,
            vec![sc(Yellow, 0, 1), sc(Red, 1, 0), sc(Blue, 1, 1)]
        );
    }

    #[test]
    fn normalize_of_empty_is_empty() {
        assert!(normalize(&[]).is_empty());
    }

    #[test]
    fn normalization_is_idempotent() {
        for p in samples() {
            let once = normalize(&p);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn four_quarter_turns_are_identity() {
        for p in samples() {
            let start = normalize(&p);
            let mut cur = start.clone();
            for _ in 0..4 {
                cur = normalize(&rotate90(&cur));
            }
            assert_eq!(cur, start);
        }
    }

    #[test]
    fn rotate90_maps_row_col_to_col_minus_row() {
        let r = rotate90(&[sc(Red, 1, 2), sc(Blue, 0, 0)]);
        assert_eq!(r, vec![sc(Red, 2, -1), sc(Blue, 0, 0)]);
    }

    #[test]
    fn flip_is_an_involution() {
        for p in samples() {
            let twice = flip_horizontal(&flip_horizontal(&p));
            assert_eq!(normalize(&twice), normalize(&p));
        }
    }

    #[test]
    fn always_eight_orientations_all_normalized() {
        for p in samples() {
            let all = orientations(&p);
            assert_eq!(all.len(), NUM_ORIENTATIONS);
            for o in &all {
                assert_eq!(&normalize(o), o);
                assert_eq!(o.len(), p.len());
            }
        }
    }

    #[test]
    fn single_cell_orientations_are_all_identical() {
        // Nothing is deduplicated: a symmetric shape yields repeats.
        let all = orientations(&[sc(Gray, 4, 4)]);
        for o in &all {
            assert_eq!(o, &vec![sc(Gray, 0, 0)]);
        }
    }

    #[test]
    fn catalog_orientation_counts() {
        for t in CATALOG.iter() {
            for base in t.patterns {
                let all = orientations(base);
                let uniq: HashSet<Vec<ShapeCell>> = all.iter().cloned().collect();
                // These four are mirror-symmetric once colors are included.
                match t.kind {
                    BuildingKind::Farm
                    | BuildingKind::Tavern
                    | BuildingKind::Well
                    | BuildingKind::Theater => assert_eq!(uniq.len(), 4, "{}", t.kind),
                    _ => assert_eq!(uniq.len(), 8, "{} orientations collide", t.kind),
                }
            }
        }
    }

    #[test]
    fn cottage_identity_and_first_turn() {
        let all = orientations(BuildingKind::Cottage.template().patterns[0]);
        assert_eq!(
            all[0],
            vec![sc(Yellow, 0, 1), sc(Red, 1, 0), sc(Blue, 1, 1)]
        );
        // (0,1)->(1,0), (1,0)->(0,-1), (1,1)->(1,-1); shift col by +1.
        assert_eq!(
            all[1],
            vec![sc(Red, 0, 0), sc(Blue, 1, 0), sc(Yellow, 1, 1)]
        );
    }

    #[test]
    fn patterns_equal_is_order_and_color_sensitive() {
        let a = [sc(Red, 0, 0), sc(Blue, 0, 1)];
        let b = [sc(Red, 0, 0), sc(Blue, 0, 1)];
        let c = [sc(Blue, 0, 0), sc(Red, 0, 1)];
        let d = [sc(Red, 0, 0)];
        assert!(patterns_equal(&a, &b));
        assert!(!patterns_equal(&a, &c));
        assert!(!patterns_equal(&a, &d));

        let uncolored = [
            ShapeCell {
                color: None,
                row: 0,
                col: 0,
            },
            sc(Blue, 0, 1),
        ];
        assert!(!patterns_equal(&a, &uncolored));
    }
}
