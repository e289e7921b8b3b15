//! tt-core: Tiny Towns rules. Building catalog, shape matching, scoring,
//! achievements and the session state machine.

pub mod achievements;
pub mod building;
pub mod config;
pub mod grid;
pub mod matcher;
pub mod resource;
pub mod scoring;
pub mod session;
pub mod shape;

pub use achievements::{default_achievements, newly_earned, AchievementDef, Criteria};
pub use building::{
    template_for, BuildingKind, BuildingTemplate, ParseNameError, ScoringRule, CATALOG,
    FACTORY_STOCK_WEIGHT, FARM_CAPACITY, NUM_BUILDINGS, TAVERN_TABLE,
};
pub use config::{Config, ConfigError};
pub use grid::{Cell, FactoryAnnotations, FactoryStock, Grid, GridError};
pub use matcher::{match_building, match_template, matching_buildings, MatchOutcome};
pub use resource::{Color, Resource, NUM_RESOURCES};
pub use scoring::{compute_score, score_breakdown, Contribution, ScoreBreakdown};
pub use session::{apply_action, Action, ApplyError, Mode, Session, SessionContext};
pub use shape::{
    flip_horizontal, normalize, orientations, patterns_equal, rotate90, Pattern, ShapeCell,
    NUM_ORIENTATIONS,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod session_tests;
#[cfg(test)]
mod shape_tests;
