use crate::resource::Resource::{Brick, Glass, Stone, Wheat, Wood};
use crate::{
    apply_action, Action, ApplyError, BuildingKind, Cell, Config, FactoryAnnotations, Grid, Mode,
    Resource, Session, SessionContext,
};

fn fresh() -> (Session, SessionContext) {
    (Session::new(4, 4, 3).unwrap(), SessionContext::new(7))
}

fn step(s: Session, a: Action, ctx: &mut SessionContext) -> Session {
    apply_action(s, a, ctx).unwrap_or_else(|e| panic!("{a:?} failed: {e}"))
}

/// Put resources straight on the board, bypassing the deck.
fn seed_board(s: &mut Session, cells: &[(usize, Resource)]) {
    for &(i, r) in cells {
        s.grid.set(i, Cell::Resource(r)).unwrap();
    }
}

fn select_all(mut s: Session, cells: &[usize], ctx: &mut SessionContext) -> Session {
    for &i in cells {
        s = step(s, Action::ToggleCell { index: i }, ctx);
    }
    s
}

#[test]
fn new_session_is_empty_and_normal() {
    let (s, _) = fresh();
    assert_eq!(s.grid.empty_count(), 16);
    assert_eq!(s.deck, vec![Wheat, Brick, Glass]);
    assert_eq!(s.mode, Mode::Normal);
    assert!(s.selection.is_empty());
    assert_eq!(s.selected_card, None);
}

#[test]
fn select_card_toggles() {
    let (s, mut ctx) = fresh();
    let s = step(s, Action::SelectCard { slot: 1 }, &mut ctx);
    assert_eq!(s.selected_card, Some(1));
    let s = step(s, Action::SelectCard { slot: 2 }, &mut ctx);
    assert_eq!(s.selected_card, Some(2));
    let s = step(s, Action::SelectCard { slot: 2 }, &mut ctx);
    assert_eq!(s.selected_card, None);

    let err = apply_action(s, Action::SelectCard { slot: 3 }, &mut ctx).unwrap_err();
    assert_eq!(err, ApplyError::CardOutOfRange { slot: 3, size: 3 });
}

#[test]
fn selecting_a_card_clears_the_cell_selection() {
    let (mut s, mut ctx) = fresh();
    seed_board(&mut s, &[(0, Wood)]);
    let s = step(s, Action::ToggleCell { index: 0 }, &mut ctx);
    assert_eq!(s.selection, vec![0]);
    let s = step(s, Action::SelectCard { slot: 0 }, &mut ctx);
    assert!(s.selection.is_empty());
}

#[test]
fn place_resource_uses_and_redraws_the_card() {
    let (s, mut ctx) = fresh();
    let s = step(s, Action::SelectCard { slot: 1 }, &mut ctx);
    let s = step(s, Action::PlaceResource { index: 6 }, &mut ctx);
    assert_eq!(s.grid.get(6), Some(Cell::Resource(Brick)));
    assert_eq!(s.selected_card, None);
    assert_eq!(s.deck.len(), 3);
    assert_eq!(s.deck[0], Wheat);
    assert_eq!(s.deck[2], Glass);
}

#[test]
fn place_resource_errors() {
    let (s, mut ctx) = fresh();
    let err = apply_action(s.clone(), Action::PlaceResource { index: 0 }, &mut ctx).unwrap_err();
    assert_eq!(err, ApplyError::NoCardSelected);

    let s = step(s, Action::SelectCard { slot: 0 }, &mut ctx);
    let err = apply_action(s.clone(), Action::PlaceResource { index: 16 }, &mut ctx).unwrap_err();
    assert_eq!(err, ApplyError::CellOutOfRange { index: 16, len: 16 });

    let s = step(s, Action::PlaceResource { index: 0 }, &mut ctx);
    let s = step(s, Action::SelectCard { slot: 0 }, &mut ctx);
    let err = apply_action(s, Action::PlaceResource { index: 0 }, &mut ctx).unwrap_err();
    assert_eq!(err, ApplyError::CellOccupied { index: 0 });
}

#[test]
fn toggle_cell_requires_a_resource() {
    let (mut s, mut ctx) = fresh();
    let err = apply_action(s.clone(), Action::ToggleCell { index: 3 }, &mut ctx).unwrap_err();
    assert_eq!(err, ApplyError::NoResourceAt { index: 3 });

    s.grid.set(3, Cell::Building(BuildingKind::Well)).unwrap();
    let err = apply_action(s, Action::ToggleCell { index: 3 }, &mut ctx).unwrap_err();
    assert_eq!(err, ApplyError::NoResourceAt { index: 3 });
}

#[test]
fn toggle_twice_deselects_and_keeps_click_order() {
    let (mut s, mut ctx) = fresh();
    seed_board(&mut s, &[(0, Wood), (1, Stone), (2, Brick)]);
    let s = select_all(s, &[2, 0, 1, 0], &mut ctx);
    assert_eq!(s.selection, vec![2, 1]);
}

#[test]
fn build_a_cottage_from_dealt_cards() {
    let (s, mut ctx) = fresh();
    // Opening deck is Wheat, Brick, Glass; each slot is used once.
    let mut s = s;
    for (slot, index) in [(0, 1), (1, 4), (2, 5)] {
        s = step(s, Action::SelectCard { slot }, &mut ctx);
        s = step(s, Action::PlaceResource { index }, &mut ctx);
    }
    let s = select_all(s, &[1, 4, 5], &mut ctx);
    let s = step(
        s,
        Action::CommitBuilding {
            building: BuildingKind::Cottage,
        },
        &mut ctx,
    );
    assert_eq!(
        s.mode,
        Mode::PlacingBuilding {
            building: BuildingKind::Cottage,
            pattern: vec![1, 4, 5],
        }
    );

    let s = step(
        s,
        Action::PlaceBuilding {
            index: 4,
            stock: None,
        },
        &mut ctx,
    );
    assert_eq!(s.mode, Mode::Normal);
    assert_eq!(s.grid.get(4), Some(Cell::Building(BuildingKind::Cottage)));
    assert_eq!(s.grid.get(1), Some(Cell::Empty));
    assert_eq!(s.grid.get(5), Some(Cell::Empty));
    assert!(s.selection.is_empty());
    // Unfed cottage, 15 empty squares.
    assert_eq!(s.score, -15);
}

#[test]
fn commit_errors() {
    let (mut s, mut ctx) = fresh();
    let err = apply_action(
        s.clone(),
        Action::CommitBuilding {
            building: BuildingKind::Well,
        },
        &mut ctx,
    )
    .unwrap_err();
    assert_eq!(err, ApplyError::EmptySelection);

    seed_board(&mut s, &[(0, Wood), (5, Stone)]);
    let s = select_all(s, &[0, 5], &mut ctx);
    let err = apply_action(
        s.clone(),
        Action::CommitBuilding {
            building: BuildingKind::Well,
        },
        &mut ctx,
    )
    .unwrap_err();
    assert_eq!(
        err,
        ApplyError::PatternMismatch {
            building: BuildingKind::Well
        }
    );
    // A failed commit leaves the selection alone.
    assert_eq!(s.selection, vec![0, 5]);
}

#[test]
fn place_building_must_target_the_pattern() {
    let (mut s, mut ctx) = fresh();
    seed_board(&mut s, &[(0, Wood), (1, Stone)]);
    let s = select_all(s, &[0, 1], &mut ctx);
    let s = step(
        s,
        Action::CommitBuilding {
            building: BuildingKind::Well,
        },
        &mut ctx,
    );
    let err = apply_action(
        s.clone(),
        Action::PlaceBuilding {
            index: 2,
            stock: None,
        },
        &mut ctx,
    )
    .unwrap_err();
    assert_eq!(
        err,
        ApplyError::NotInPattern {
            index: 2,
            building: BuildingKind::Well
        }
    );

    // Resource placement and toggling are blocked while placing.
    let err = apply_action(s.clone(), Action::ToggleCell { index: 0 }, &mut ctx).unwrap_err();
    assert!(matches!(err, ApplyError::NotAllowed { .. }));
    let s = step(s, Action::SelectCard { slot: 0 }, &mut ctx);
    let err = apply_action(s, Action::PlaceResource { index: 9 }, &mut ctx).unwrap_err();
    assert_eq!(
        err,
        ApplyError::NotAllowed {
            action: "place_resource",
            mode: "placing_building"
        }
    );
}

#[test]
fn place_building_outside_placing_mode_is_rejected() {
    let (s, mut ctx) = fresh();
    let err = apply_action(
        s,
        Action::PlaceBuilding {
            index: 0,
            stock: None,
        },
        &mut ctx,
    )
    .unwrap_err();
    assert_eq!(
        err,
        ApplyError::NotAllowed {
            action: "place_building",
            mode: "normal"
        }
    );
}

#[test]
fn factory_needs_stock_and_records_it() {
    let (mut s, mut ctx) = fresh();
    // Wood / Brick Stone Stone Brick, the reference Factory layout.
    seed_board(&mut s, &[(0, Wood), (4, Brick), (5, Stone), (6, Stone), (7, Brick)]);
    let s = select_all(s, &[0, 4, 5, 6, 7], &mut ctx);
    let s = step(
        s,
        Action::CommitBuilding {
            building: BuildingKind::Factory,
        },
        &mut ctx,
    );

    let err = apply_action(
        s.clone(),
        Action::PlaceBuilding {
            index: 5,
            stock: None,
        },
        &mut ctx,
    )
    .unwrap_err();
    assert_eq!(err, ApplyError::MissingStock);

    let s = step(
        s,
        Action::PlaceBuilding {
            index: 5,
            stock: Some(Glass),
        },
        &mut ctx,
    );
    assert_eq!(s.grid.get(5), Some(Cell::Building(BuildingKind::Factory)));
    let stock = s.factory.get(&5).copied().unwrap();
    assert_eq!(stock.resource, Glass);
    assert_eq!(stock.count, 1);
    assert_eq!(s.grid.empty_count(), 15);
    assert_eq!(s.score, -15);
}

#[test]
fn stock_is_ignored_for_other_buildings() {
    let (mut s, mut ctx) = fresh();
    seed_board(&mut s, &[(0, Wood), (1, Stone)]);
    let s = select_all(s, &[0, 1], &mut ctx);
    let s = step(
        s,
        Action::CommitBuilding {
            building: BuildingKind::Well,
        },
        &mut ctx,
    );
    let s = step(
        s,
        Action::PlaceBuilding {
            index: 1,
            stock: Some(Wheat),
        },
        &mut ctx,
    );
    assert!(s.factory.is_empty());
}

#[test]
fn filling_the_last_square_ends_the_game() {
    let (mut s, mut ctx) = fresh();
    for i in 0..15 {
        s.grid.set(i, Cell::Resource(Wood)).unwrap();
    }
    let s = step(s, Action::SelectCard { slot: 0 }, &mut ctx);
    let s = step(s, Action::PlaceResource { index: 15 }, &mut ctx);
    assert!(s.is_over());
    assert_eq!(s.score, 0);

    for a in [
        Action::SelectCard { slot: 0 },
        Action::ToggleCell { index: 0 },
        Action::EndGame,
    ] {
        let err = apply_action(s.clone(), a, &mut ctx).unwrap_err();
        assert!(matches!(err, ApplyError::NotAllowed { mode: "game_over", .. }));
    }
}

#[test]
fn end_game_scores_the_board() {
    let (mut s, mut ctx) = fresh();
    s.grid
        .set(0, Cell::Building(BuildingKind::Cathedral))
        .unwrap();
    let s = step(s, Action::EndGame, &mut ctx);
    assert!(s.is_over());
    assert_eq!(s.score, 2);
}

#[test]
fn reset_starts_over_with_the_same_dimensions() {
    let mut s = Session::new(3, 5, 4).unwrap();
    let mut ctx = SessionContext::new(1);
    s.grid.set(2, Cell::Resource(Glass)).unwrap();
    let s = step(s, Action::EndGame, &mut ctx);
    let s = step(s, Action::Reset, &mut ctx);
    assert_eq!(s, Session::new(3, 5, 4).unwrap());
}

#[test]
fn same_seed_same_deck() {
    let run = |seed: u64| {
        let mut s = Session::new(4, 4, 3).unwrap();
        let mut ctx = SessionContext::new(seed);
        for slot in [0, 1, 2, 0, 1, 2] {
            s = step(s, Action::RefreshCard { slot }, &mut ctx);
        }
        s.deck
    };
    assert_eq!(run(42), run(42));
}

#[test]
fn refresh_clears_the_card_selection() {
    let (s, mut ctx) = fresh();
    let s = step(s, Action::SelectCard { slot: 0 }, &mut ctx);
    let s = step(s, Action::RefreshCard { slot: 2 }, &mut ctx);
    assert_eq!(s.selected_card, None);
}

#[test]
fn load_rescores_and_detects_full_boards() {
    let mut g = Grid::new(2, 2).unwrap();
    for i in 0..4 {
        g.set(i, Cell::Resource(Brick)).unwrap();
    }
    let s = Session::load(g, FactoryAnnotations::new(), 3);
    assert!(s.is_over());
    assert_eq!(s.score, 0);

    let s = Session::load(Grid::new(2, 2).unwrap(), FactoryAnnotations::new(), 3);
    assert_eq!(s.mode, Mode::Normal);
    assert_eq!(s.score, -4);
}

#[test]
fn from_config_uses_grid_and_deck_sizes() {
    let cfg = Config::from_yaml("grid: {rows: 3, cols: 6}\ndeck: {size: 5}\n").unwrap();
    let s = Session::from_config(&cfg).unwrap();
    assert_eq!(s.grid.rows(), 3);
    assert_eq!(s.grid.cols(), 6);
    assert_eq!(s.deck, vec![Wheat, Brick, Glass, Wood, Stone]);
}

#[test]
fn action_scripts_parse_from_yaml() {
    let yaml = r#"
- action: select_card
  slot: 0
- action: place_resource
  index: 5
- action: commit_building
  building: Catedral
- action: place_building
  index: 5
  stock: Wood
- action: end_game
"#;
    let actions: Vec<Action> = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(
        actions,
        vec![
            Action::SelectCard { slot: 0 },
            Action::PlaceResource { index: 5 },
            Action::CommitBuilding {
                building: BuildingKind::Cathedral
            },
            Action::PlaceBuilding {
                index: 5,
                stock: Some(Wood)
            },
            Action::EndGame,
        ]
    );
}

#[test]
fn pending_building_cannot_be_recommitted() {
    let (mut s, mut ctx) = fresh();
    seed_board(&mut s, &[(0, Wood), (1, Stone)]);
    let s = select_all(s, &[0, 1], &mut ctx);
    let s = step(
        s,
        Action::CommitBuilding {
            building: BuildingKind::Well,
        },
        &mut ctx,
    );
    let err = apply_action(
        s.clone(),
        Action::CommitBuilding {
            building: BuildingKind::Well,
        },
        &mut ctx,
    )
    .unwrap_err();
    assert_eq!(
        err,
        ApplyError::NotAllowed {
            action: "commit_building",
            mode: "placing_building"
        }
    );
    assert_eq!(
        s.mode,
        Mode::PlacingBuilding {
            building: BuildingKind::Well,
            pattern: vec![0, 1],
        }
    );
}
