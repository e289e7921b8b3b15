//! Session state machine: the single place that mutates a live game via rules.
//!
//! The pure engine (`matcher`, `scoring`) never owns state; a `Session`
//! holds the grid, the resource deck, the current cell selection and the
//! Factory annotations, and `apply_action` is the only transition function.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_core::SeedableRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::building::BuildingKind;
use crate::config::Config;
use crate::grid::{Cell, FactoryAnnotations, FactoryStock, Grid, GridError};
use crate::matcher::match_building;
use crate::resource::{Resource, NUM_RESOURCES};
use crate::scoring::compute_score;

/// Randomness for card redraws.
pub struct SessionContext {
    rng: ChaCha8Rng,
}

impl SessionContext {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    fn draw(&mut self) -> Resource {
        Resource::ALL[self.rng.gen_range(0..NUM_RESOURCES)]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Mode {
    /// Placing resources and selecting cells.
    Normal,
    /// A selection matched `building`; waiting for the cell to build on.
    PlacingBuilding {
        building: BuildingKind,
        pattern: Vec<usize>,
    },
    /// Board complete or game ended; only `Reset` is accepted.
    GameOver,
}

impl Mode {
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Normal => "normal",
            Mode::PlacingBuilding { .. } => "placing_building",
            Mode::GameOver => "game_over",
        }
    }
}

/// A player input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Toggle the selected resource card; clears the cell selection.
    SelectCard { slot: usize },
    /// Replace a card with a fresh draw; clears the card selection.
    RefreshCard { slot: usize },
    /// Put the selected card's resource on an empty cell.
    PlaceResource { index: usize },
    /// Add or remove a resource cell from the selection.
    ToggleCell { index: usize },
    /// Validate the selection as `building`.
    CommitBuilding { building: BuildingKind },
    /// Build on one cell of the pending pattern. Factories need `stock`.
    PlaceBuilding {
        index: usize,
        #[serde(default)]
        stock: Option<Resource>,
    },
    EndGame,
    Reset,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::SelectCard { .. } => "select_card",
            Action::RefreshCard { .. } => "refresh_card",
            Action::PlaceResource { .. } => "place_resource",
            Action::ToggleCell { .. } => "toggle_cell",
            Action::CommitBuilding { .. } => "commit_building",
            Action::PlaceBuilding { .. } => "place_building",
            Action::EndGame => "end_game",
            Action::Reset => "reset",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyError {
    #[error("card slot {slot} out of range (deck size {size})")]
    CardOutOfRange { slot: usize, size: usize },
    #[error("no resource card selected")]
    NoCardSelected,
    #[error("cell {index} out of range (grid has {len} cells)")]
    CellOutOfRange { index: usize, len: usize },
    #[error("cell {index} is already occupied")]
    CellOccupied { index: usize },
    #[error("cell {index} holds no resource")]
    NoResourceAt { index: usize },
    #[error("select squares first")]
    EmptySelection,
    #[error("invalid {building} pattern")]
    PatternMismatch { building: BuildingKind },
    #[error("cell {index} is not part of the pending {building} pattern")]
    NotInPattern { index: usize, building: BuildingKind },
    #[error("a Factory must be stocked with a resource")]
    MissingStock,
    #[error("{action} is not allowed in {mode} mode")]
    NotAllowed {
        action: &'static str,
        mode: &'static str,
    },
    #[error("grid error: {0}")]
    Grid(#[from] GridError),
}

/// Live game state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub grid: Grid,
    /// Resource cards on offer, one per slot.
    pub deck: Vec<Resource>,
    pub selected_card: Option<usize>,
    /// Selected cells in click order.
    pub selection: Vec<usize>,
    pub mode: Mode,
    pub factory: FactoryAnnotations,
    /// Result of the most recent scoring request.
    pub score: i32,
}

fn initial_deck(size: usize) -> Vec<Resource> {
    (0..size).map(|i| Resource::ALL[i % NUM_RESOURCES]).collect()
}

impl Session {
    /// Fresh session: empty board, deck cycling Wheat, Brick, Glass, ...
    pub fn new(rows: usize, cols: usize, deck_size: usize) -> Result<Self, GridError> {
        Ok(Self {
            grid: Grid::new(rows, cols)?,
            deck: initial_deck(deck_size),
            selected_card: None,
            selection: Vec::new(),
            mode: Mode::Normal,
            factory: FactoryAnnotations::new(),
            score: 0,
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self, GridError> {
        Self::new(cfg.grid.rows, cfg.grid.cols, cfg.deck.size)
    }

    /// Resume a saved board. The score is recomputed, not trusted.
    pub fn load(grid: Grid, factory: FactoryAnnotations, deck_size: usize) -> Self {
        let score = compute_score(&grid, &factory);
        let mode = if grid.is_full() {
            Mode::GameOver
        } else {
            Mode::Normal
        };
        Self {
            grid,
            deck: initial_deck(deck_size),
            selected_card: None,
            selection: Vec::new(),
            mode,
            factory,
            score,
        }
    }

    pub fn is_full(&self) -> bool {
        self.grid.is_full()
    }

    pub fn is_over(&self) -> bool {
        self.mode == Mode::GameOver
    }

    /// Recompute `score` from the board.
    pub fn rescore(&mut self) {
        self.score = compute_score(&self.grid, &self.factory);
    }

    fn check_slot(&self, slot: usize) -> Result<(), ApplyError> {
        if slot >= self.deck.len() {
            return Err(ApplyError::CardOutOfRange {
                slot,
                size: self.deck.len(),
            });
        }
        Ok(())
    }

    fn cell(&self, index: usize) -> Result<Cell, ApplyError> {
        self.grid.get(index).ok_or(ApplyError::CellOutOfRange {
            index,
            len: self.grid.len(),
        })
    }
}

/// Apply an action to a session, producing the next session (or an error
/// if the action is not legal in the current state).
pub fn apply_action(
    mut session: Session,
    action: Action,
    ctx: &mut SessionContext,
) -> Result<Session, ApplyError> {
    let not_allowed = |s: &Session| ApplyError::NotAllowed {
        action: action.name(),
        mode: s.mode.name(),
    };

    if session.is_over() && action != Action::Reset {
        return Err(not_allowed(&session));
    }

    match action {
        Action::SelectCard { slot } => {
            session.check_slot(slot)?;
            session.selected_card = if session.selected_card == Some(slot) {
                None
            } else {
                Some(slot)
            };
            session.selection.clear();
        }
        Action::RefreshCard { slot } => {
            session.check_slot(slot)?;
            session.deck[slot] = ctx.draw();
            session.selected_card = None;
        }
        Action::PlaceResource { index } => {
            if session.mode != Mode::Normal {
                return Err(not_allowed(&session));
            }
            let slot = session.selected_card.ok_or(ApplyError::NoCardSelected)?;
            session.check_slot(slot)?;
            if !session.cell(index)?.is_empty() {
                return Err(ApplyError::CellOccupied { index });
            }
            session.grid.set(index, Cell::Resource(session.deck[slot]))?;
            session.deck[slot] = ctx.draw();
            session.selected_card = None;

            if session.is_full() {
                session.rescore();
                session.mode = Mode::GameOver;
            }
        }
        Action::ToggleCell { index } => {
            if session.mode != Mode::Normal {
                return Err(not_allowed(&session));
            }
            if session.cell(index)?.resource().is_none() {
                return Err(ApplyError::NoResourceAt { index });
            }
            if let Some(pos) = session.selection.iter().position(|&i| i == index) {
                session.selection.remove(pos);
            } else {
                session.selection.push(index);
            }
        }
        Action::CommitBuilding { building } => {
            if session.mode != Mode::Normal {
                return Err(not_allowed(&session));
            }
            if session.selection.is_empty() {
                return Err(ApplyError::EmptySelection);
            }
            let outcome = match_building(
                &session.grid,
                &session.selection,
                building.name(),
                session.grid.cols(),
            );
            if !outcome.matched {
                return Err(ApplyError::PatternMismatch { building });
            }
            session.mode = Mode::PlacingBuilding {
                building,
                pattern: outcome.cells_to_clear,
            };
        }
        Action::PlaceBuilding { index, stock } => {
            let (building, pattern) = match &session.mode {
                Mode::PlacingBuilding { building, pattern } => (*building, pattern.clone()),
                _ => return Err(not_allowed(&session)),
            };
            if !pattern.contains(&index) {
                return Err(ApplyError::NotInPattern { index, building });
            }
            let stock = match (building, stock) {
                (BuildingKind::Factory, None) => return Err(ApplyError::MissingStock),
                (BuildingKind::Factory, Some(resource)) => {
                    Some(FactoryStock { resource, count: 1 })
                }
                _ => None,
            };

            for &i in &pattern {
                let cell = if i == index {
                    Cell::Building(building)
                } else {
                    Cell::Empty
                };
                session.grid.set(i, cell)?;
            }
            if let Some(stock) = stock {
                session.factory.insert(index, stock);
            }

            session.selection.clear();
            session.mode = Mode::Normal;
            session.rescore();
        }
        Action::EndGame => {
            session.rescore();
            session.mode = Mode::GameOver;
        }
        Action::Reset => {
            session = Session::new(
                session.grid.rows(),
                session.grid.cols(),
                session.deck.len(),
            )?;
        }
    }

    Ok(session)
}
