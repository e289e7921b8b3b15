//! Game records and the persistence collaborator.
//!
//! `SessionStore` is the narrow contract the game needs from storage: keep a
//! game, reload it, and remember which achievements a user has unlocked.
//! `NdjsonStore` implements it with two append-only files in one directory.
//! A game saved more than once is represented by its latest line.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tt_core::{FactoryAnnotations, Grid};

use crate::{now_ms, read_ndjson_lenient, NdjsonError, NdjsonWriter};

pub const RECORD_VERSION: u32 = 1;
pub const GAMES_FILE: &str = "games.ndjson";
pub const ACHIEVEMENTS_FILE: &str = "achievements.ndjson";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("user id must be non-empty")]
    EmptyUserId,
}

impl From<NdjsonError> for StoreError {
    fn from(e: NdjsonError) -> Self {
        match e {
            NdjsonError::Io(e) => Self::Io(e),
            NdjsonError::Json(e) => Self::Json(e),
        }
    }
}

/// Opaque authenticated user identifier, supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Result<Self, StoreError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(StoreError::EmptyUserId);
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

fn default_true() -> bool {
    true
}

/// A saved game. `final` is false for a manual mid-game save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecordV1 {
    pub record_version: u32,
    pub game_id: String,
    pub user_id: UserId,
    #[serde(rename = "final", default = "default_true")]
    pub is_final: bool,

    pub board: Grid,
    #[serde(default)]
    pub factory: FactoryAnnotations,
    pub score: i32,

    pub start_ts_ms: u64,
    pub end_ts_ms: u64,
    pub config_hash: Option<String>,
}

/// One `(user, achievement)` unlock. Unique per pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementUnlockV1 {
    pub user_id: UserId,
    pub achievement_id: String,
    /// Game that earned it, if any.
    pub via_game: Option<String>,
    pub unlocked_ts_ms: u64,
}

impl AchievementUnlockV1 {
    pub fn is_for(&self, user: &UserId, achievement_id: &str) -> bool {
        (&self.user_id, self.achievement_id.as_str()) == (user, achievement_id)
    }
}

pub trait SessionStore {
    /// Durably keep a game. Saving the same `game_id` again supersedes it.
    fn save_game(&mut self, record: &GameRecordV1) -> Result<(), StoreError>;

    /// Latest saved state of one of `user`'s games.
    fn load_game(
        &self,
        user: &UserId,
        game_id: &str,
    ) -> Result<Option<GameRecordV1>, StoreError>;

    /// Record an unlock. Returns `false` if the user already had it.
    fn unlock_achievement(
        &mut self,
        user: &UserId,
        achievement_id: &str,
        via_game: Option<&str>,
    ) -> Result<bool, StoreError>;

    fn unlocked_for(&self, user: &UserId) -> Result<BTreeSet<String>, StoreError>;

    /// Games of `user`, one entry per game id, newest first.
    fn games_for(&self, user: &UserId) -> Result<Vec<GameRecordV1>, StoreError>;
}

/// File-backed store: `games.ndjson` and `achievements.ndjson` under `root`.
pub struct NdjsonStore {
    root: PathBuf,
}

impl NdjsonStore {
    /// Use `root` as the store directory, creating it if needed.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn games_path(&self) -> PathBuf {
        self.root.join(GAMES_FILE)
    }

    fn achievements_path(&self) -> PathBuf {
        self.root.join(ACHIEVEMENTS_FILE)
    }

    fn append<T: Serialize>(&self, path: &Path, line: &T) -> Result<(), StoreError> {
        let mut w = NdjsonWriter::open_append(path)?;
        w.write_event(line)?;
        w.flush()?;
        Ok(())
    }

    fn unlocks(&self) -> Result<Vec<AchievementUnlockV1>, StoreError> {
        Ok(read_ndjson_lenient(self.achievements_path())?)
    }

    /// `user`'s records, latest line first, earlier saves of the same id dropped.
    fn latest_games(&self, user: &UserId) -> Result<Vec<GameRecordV1>, StoreError> {
        let mut games: Vec<GameRecordV1> = read_ndjson_lenient(self.games_path())?;
        games.retain(|g| &g.user_id == user);
        games.reverse();
        let mut seen = HashSet::new();
        games.retain(|g| seen.insert(g.game_id.clone()));
        Ok(games)
    }
}

impl SessionStore for NdjsonStore {
    fn save_game(&mut self, record: &GameRecordV1) -> Result<(), StoreError> {
        self.append(&self.games_path(), record)
    }

    fn load_game(
        &self,
        user: &UserId,
        game_id: &str,
    ) -> Result<Option<GameRecordV1>, StoreError> {
        Ok(self
            .latest_games(user)?
            .into_iter()
            .find(|g| g.game_id == game_id))
    }

    fn unlock_achievement(
        &mut self,
        user: &UserId,
        achievement_id: &str,
        via_game: Option<&str>,
    ) -> Result<bool, StoreError> {
        let unlock = AchievementUnlockV1 {
            user_id: user.clone(),
            achievement_id: achievement_id.to_string(),
            via_game: via_game.map(str::to_string),
            unlocked_ts_ms: now_ms(),
        };
        if self
            .unlocks()?
            .iter()
            .any(|u| u.is_for(user, achievement_id))
        {
            return Ok(false);
        }
        self.append(&self.achievements_path(), &unlock)?;
        Ok(true)
    }

    fn unlocked_for(&self, user: &UserId) -> Result<BTreeSet<String>, StoreError> {
        Ok(self
            .unlocks()?
            .into_iter()
            .filter(|u| &u.user_id == user)
            .map(|u| u.achievement_id)
            .collect())
    }

    fn games_for(&self, user: &UserId) -> Result<Vec<GameRecordV1>, StoreError> {
        let mut games = self.latest_games(user)?;
        // Stable: equal end times keep reverse file order.
        games.sort_by(|a, b| b.end_ts_ms.cmp(&a.end_ts_ms));
        Ok(games)
    }
}
