//! tt-logging: NDJSON events, an env-gated debug log, and game records.
//!
//! Everything here is append-only NDJSON or atomically replaced JSON so a
//! crashed process leaves readable files behind.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::de::DeserializeOwned;
use serde::Serialize;

use tt_core::{Action, ScoreBreakdown};

pub mod store;

pub use store::{
    AchievementUnlockV1, GameRecordV1, NdjsonStore, SessionStore, StoreError, UserId,
    ACHIEVEMENTS_FILE, GAMES_FILE, RECORD_VERSION,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Schema version stamped on every event line.
pub const EVENT_SCHEMA_VERSION: u32 = 1;

pub fn now_ms() -> u64 {
    let d = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    d.as_millis() as u64
}

pub fn hash_config_bytes(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

/// Short stable id for a game: user, start time and deck seed.
pub fn new_game_id(user: &UserId, start_ts_ms: u64, seed: u64) -> String {
    let mut h = blake3::Hasher::new();
    h.update(user.as_str().as_bytes());
    h.update(&start_ts_ms.to_le_bytes());
    h.update(&seed.to_le_bytes());
    h.finalize().to_hex().as_str()[..16].to_string()
}

// region debug log
fn debug_enabled() -> bool {
    static ON: OnceLock<bool> = OnceLock::new();
    *ON.get_or_init(|| {
        matches!(
            std::env::var("TT_DEBUG_LOG").as_deref(),
            Ok("1" | "true" | "yes")
        )
    })
}

/// One JSON line on stderr when `TT_DEBUG_LOG` is set; otherwise nothing.
pub fn debug_event(location: &str, message: &str, data: serde_json::Value) {
    if !debug_enabled() {
        return;
    }
    let payload = serde_json::json!({
        "ts_ms": now_ms(),
        "location": location,
        "message": message,
        "data": data,
    });
    if let Ok(line) = serde_json::to_string(&payload) {
        eprintln!("{line}");
    }
}
// endregion debug log

/// One applied (or rejected) session action.
#[derive(Debug, Clone, Serialize)]
pub struct ActionEventV1 {
    pub event: &'static str,
    pub v: u32,
    pub ts_ms: u64,

    pub game_id: String,
    pub seq: u64,
    pub action: Action,

    pub accepted: bool,
    pub error: Option<String>,
    /// Mode after the action.
    pub mode: &'static str,
    pub score: i32,
}

impl ActionEventV1 {
    pub fn new(game_id: &str, seq: u64, action: Action) -> Self {
        Self {
            event: "action",
            v: EVENT_SCHEMA_VERSION,
            ts_ms: now_ms(),
            game_id: game_id.to_string(),
            seq,
            action,
            accepted: true,
            error: None,
            mode: "normal",
            score: 0,
        }
    }
}

/// Final score of a game with its per-building breakdown.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreEventV1 {
    pub event: &'static str,
    pub v: u32,
    pub ts_ms: u64,

    pub game_id: String,
    pub breakdown: ScoreBreakdown,
    /// Achievement ids unlocked by this game.
    pub unlocked: Vec<String>,
}

impl ScoreEventV1 {
    pub fn new(game_id: &str, breakdown: ScoreBreakdown, unlocked: Vec<String>) -> Self {
        Self {
            event: "score",
            v: EVENT_SCHEMA_VERSION,
            ts_ms: now_ms(),
            game_id: game_id.to_string(),
            breakdown,
            unlocked,
        }
    }
}

#[derive(Debug)]
pub enum NdjsonError {
    Io(io::Error),
    Json(serde_json::Error),
}

impl From<io::Error> for NdjsonError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for NdjsonError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// Append-only NDJSON writer.
///
/// Contract: each call writes exactly one JSON object followed by a newline.
pub struct NdjsonWriter {
    w: BufWriter<File>,
    lines_since_flush: u64,
    flush_every_lines: u64,
}

impl NdjsonWriter {
    /// Open a file for append. Creates it if it doesn't exist.
    pub fn open_append(path: impl AsRef<Path>) -> Result<Self, NdjsonError> {
        Self::open_append_with_flush(path, 0)
    }

    /// `flush_every_lines=0` disables periodic flushing.
    pub fn open_append_with_flush(
        path: impl AsRef<Path>,
        flush_every_lines: u64,
    ) -> Result<Self, NdjsonError> {
        let f = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            w: BufWriter::new(f),
            lines_since_flush: 0,
            flush_every_lines,
        })
    }

    pub fn write_event<T: Serialize>(&mut self, event: &T) -> Result<(), NdjsonError> {
        let mut buf = serde_json::to_vec(event)?;
        buf.push(b'\n');
        self.w.write_all(&buf)?;
        self.lines_since_flush += 1;
        if self.flush_every_lines > 0 && self.lines_since_flush >= self.flush_every_lines {
            self.flush()?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), NdjsonError> {
        self.w.flush()?;
        self.lines_since_flush = 0;
        Ok(())
    }
}

/// Every parseable line of an NDJSON file. A missing file reads as empty;
/// blank and malformed lines (e.g. a torn last write) are skipped.
pub fn read_ndjson_lenient<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<Vec<T>, NdjsonError> {
    let path = path.as_ref();
    let s = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    let mut out = Vec::new();
    for (lineno, line) in s.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<T>(line) {
            Ok(v) => out.push(v),
            Err(e) => debug_event(
                "tt_logging::read_ndjson_lenient",
                "skipping unreadable line",
                serde_json::json!({
                    "path": path.display().to_string(),
                    "line": lineno + 1,
                    "error": e.to_string(),
                }),
            ),
        }
    }
    Ok(out)
}

pub fn read_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, NdjsonError> {
    let bytes = std::fs::read(path)?;
    Ok(serde_json::from_slice::<T>(&bytes)?)
}

/// Write pretty JSON to `path` via a sibling tmp file and rename.
pub fn write_json_atomic<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<(), NdjsonError> {
    let path = path.as_ref();
    let tmp = path.with_extension("json.tmp");
    let bytes = serde_json::to_vec_pretty(value)?;
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}
