//! tt: CLI binary for the Tiny Towns engine.
//!
//! Subcommands:
//! - catalog
//! - orientations
//! - match
//! - score
//! - play
//! - profile

use std::env;
use std::path::{Path, PathBuf};
use std::process;

use serde::Deserialize;

use tt_core::{
    apply_action, match_building, newly_earned, orientations, score_breakdown, template_for,
    AchievementDef, Action, Config, FactoryAnnotations, Grid, Pattern, Session, SessionContext,
    CATALOG,
};
use tt_logging::{
    ActionEventV1, GameRecordV1, NdjsonStore, NdjsonWriter, ScoreEventV1, SessionStore,
    StoreError, UserId, RECORD_VERSION,
};

/// Board file contents (YAML or JSON).
#[derive(Debug, Deserialize)]
struct BoardFile {
    grid: Grid,
    #[serde(default)]
    factory: FactoryAnnotations,
}

fn load_board(path: &str) -> BoardFile {
    let text = std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Failed to read board file {path}: {e}");
        process::exit(1);
    });
    serde_yaml::from_str(&text).unwrap_or_else(|e| {
        eprintln!("Failed to parse board file {path}: {e}");
        process::exit(1);
    })
}

fn take_value(args: &[String], i: usize, flag: &str) -> String {
    args.get(i + 1).cloned().unwrap_or_else(|| {
        eprintln!("Missing value for {flag}");
        process::exit(1);
    })
}

/// Render a pattern as a small grid of resource names.
fn render_pattern(p: &Pattern) -> Vec<String> {
    let rows = p.iter().map(|c| c.row).max().unwrap_or(-1) + 1;
    let cols = p.iter().map(|c| c.col).max().unwrap_or(-1) + 1;
    let mut lines = Vec::with_capacity(rows as usize);
    for r in 0..rows {
        let mut cells = Vec::with_capacity(cols as usize);
        for c in 0..cols {
            let name = p
                .iter()
                .find(|sc| sc.row == r && sc.col == c)
                .and_then(|sc| sc.color)
                .map_or(".", |color| color.resource().name());
            cells.push(format!("{name:<5}"));
        }
        lines.push(cells.join(" ").trim_end().to_string());
    }
    lines
}

fn cmd_catalog() {
    for t in CATALOG.iter() {
        println!("{} ({:?})", t.kind, t.rule);
        for (n, base) in t.patterns.iter().enumerate() {
            if t.patterns.len() > 1 {
                println!("  pattern {n}:");
            }
            for line in render_pattern(&base.to_vec()) {
                println!("    {line}");
            }
        }
    }
}

fn cmd_orientations(args: &[String]) {
    let Some(name) = args.first() else {
        eprintln!("Usage: tt orientations <BUILDING>");
        process::exit(1);
    };
    let template = template_for(name).unwrap_or_else(|| {
        eprintln!("Unknown building: {name}");
        process::exit(1);
    });
    for (n, base) in template.patterns.iter().enumerate() {
        for (k, variant) in orientations(base).iter().enumerate() {
            println!("{} pattern {n} orientation {k}:", template.kind);
            for line in render_pattern(variant) {
                println!("    {line}");
            }
        }
    }
}

fn parse_selection(s: &str) -> Vec<usize> {
    s.split(',')
        .filter(|t| !t.trim().is_empty())
        .map(|t| {
            t.trim().parse().unwrap_or_else(|_| {
                eprintln!("Invalid cell index in --select: {t}");
                process::exit(1);
            })
        })
        .collect()
}

fn cmd_match(args: &[String]) {
    let mut board: Option<String> = None;
    let mut building: Option<String> = None;
    let mut select: Option<String> = None;

    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                println!(
                    r#"tt match

USAGE:
    tt match --board FILE --building NAME --select I,J,K

OPTIONS:
    --board FILE       Board file (YAML or JSON) (required)
    --building NAME    Building to match, e.g. Cottage (required)
    --select LIST      Comma-separated cell indices in selection order (required)
"#
                );
                return;
            }
            "--board" => {
                board = Some(take_value(args, i, "--board"));
                i += 2;
            }
            "--building" => {
                building = Some(take_value(args, i, "--building"));
                i += 2;
            }
            "--select" => {
                select = Some(take_value(args, i, "--select"));
                i += 2;
            }
            other => {
                eprintln!("Unknown option for `tt match`: {}", other);
                eprintln!("Run `tt match --help` for usage.");
                process::exit(1);
            }
        }
    }

    let board = board.unwrap_or_else(|| {
        eprintln!("Missing --board");
        process::exit(1);
    });
    let building = building.unwrap_or_else(|| {
        eprintln!("Missing --building");
        process::exit(1);
    });
    let select = select.unwrap_or_else(|| {
        eprintln!("Missing --select");
        process::exit(1);
    });

    let board = load_board(&board);
    let selected = parse_selection(&select);
    let out = match_building(&board.grid, &selected, &building, board.grid.cols());
    println!(
        "matched={} cells_to_clear={:?}",
        out.matched, out.cells_to_clear
    );
}

fn cmd_score(args: &[String]) {
    let mut board: Option<String> = None;
    let mut breakdown = false;

    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                println!(
                    r#"tt score

USAGE:
    tt score --board FILE [--breakdown]

OPTIONS:
    --board FILE    Board file (YAML or JSON) (required)
    --breakdown     Print per-building points
"#
                );
                return;
            }
            "--board" => {
                board = Some(take_value(args, i, "--board"));
                i += 2;
            }
            "--breakdown" => {
                breakdown = true;
                i += 1;
            }
            other => {
                eprintln!("Unknown option for `tt score`: {}", other);
                eprintln!("Run `tt score --help` for usage.");
                process::exit(1);
            }
        }
    }

    let board = board.unwrap_or_else(|| {
        eprintln!("Missing --board");
        process::exit(1);
    });
    let board = load_board(&board);
    let b = score_breakdown(&board.grid, &board.factory);

    if breakdown {
        print!("{}", board.grid);
        println!();
        for c in &b.contributions {
            if c.count > 0 {
                println!("  {:<10} x{:<2} {:>4}", c.building, c.count, c.points);
            }
        }
        println!("  {:<10} x{:<2} {:>4}", "empty", b.empty_cells, b.empty_penalty);
    }
    println!("score={}", b.total);
}

/// Identity of the game being played, shared by every save of it.
struct GameMeta {
    game_id: String,
    start_ts_ms: u64,
    config_hash: Option<String>,
}

fn save_record(
    store: &mut dyn SessionStore,
    user: &UserId,
    session: &Session,
    meta: &GameMeta,
    is_final: bool,
) -> Result<(), StoreError> {
    let record = GameRecordV1 {
        record_version: RECORD_VERSION,
        game_id: meta.game_id.clone(),
        user_id: user.clone(),
        is_final,
        board: session.grid.clone(),
        factory: session.factory.clone(),
        score: session.score,
        start_ts_ms: meta.start_ts_ms,
        end_ts_ms: tt_logging::now_ms(),
        config_hash: meta.config_hash.clone(),
    };
    store.save_game(&record)
}

/// Persist a finished game and unlock whatever it earned.
///
/// Returns the ids unlocked by this call, in definition order.
fn finish_game(
    store: &mut dyn SessionStore,
    user: &UserId,
    session: &Session,
    defs: &[AchievementDef],
    meta: &GameMeta,
) -> Result<Vec<String>, StoreError> {
    save_record(store, user, session, meta, true)?;
    let game_id = meta.game_id.as_str();

    let unlocked = store.unlocked_for(user)?;
    let mut got = Vec::new();
    for def in newly_earned(defs, &session.grid, session.score, &unlocked) {
        if store.unlock_achievement(user, &def.id, Some(game_id))? {
            got.push(def.id.clone());
        }
    }
    Ok(got)
}

fn cmd_play(args: &[String]) {
    let mut script: Option<String> = None;
    let mut out: Option<String> = None;
    let mut config_path: Option<String> = None;
    let mut user = "local".to_string();
    let mut seed: Option<u64> = None;
    let mut log_flush_every: u64 = 100;
    let mut save_partial = false;
    let mut resume: Option<String> = None;

    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                println!(
                    r#"tt play

USAGE:
    tt play --script actions.yaml --out DIR [--config cfg.yaml] [--user ID] [--seed S]
            [--save-partial] [--resume GAME_ID]

OPTIONS:
    --script PATH           YAML list of actions (required)
    --out DIR               Output directory for events and records (required)
    --config PATH           Path to YAML config (default: built-in)
    --user ID               User id for records (default: local)
    --seed S                Deck seed (default: deck.seed from config)
    --log-flush-every N     Flush NDJSON logs every N lines (0 disables) (default: 100)
    --save-partial          Save an unfinished game as an in-progress record
    --resume GAME_ID        Continue an in-progress game saved under --out
"#
                );
                return;
            }
            "--script" => {
                script = Some(take_value(args, i, "--script"));
                i += 2;
            }
            "--out" => {
                out = Some(take_value(args, i, "--out"));
                i += 2;
            }
            "--config" => {
                config_path = Some(take_value(args, i, "--config"));
                i += 2;
            }
            "--user" => {
                user = take_value(args, i, "--user");
                i += 2;
            }
            "--seed" => {
                seed = Some(take_value(args, i, "--seed").parse().unwrap_or_else(|_| {
                    eprintln!("Invalid --seed value: {}", args[i + 1]);
                    process::exit(1);
                }));
                i += 2;
            }
            "--save-partial" => {
                save_partial = true;
                i += 1;
            }
            "--resume" => {
                resume = Some(take_value(args, i, "--resume"));
                i += 2;
            }
            "--log-flush-every" => {
                log_flush_every = args
                    .get(i + 1)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(|| {
                        eprintln!("Invalid --log-flush-every value");
                        process::exit(1);
                    });
                i += 2;
            }
            other => {
                eprintln!("Unknown option for `tt play`: {}", other);
                eprintln!("Run `tt play --help` for usage.");
                process::exit(1);
            }
        }
    }

    let script = script.unwrap_or_else(|| {
        eprintln!("Missing --script");
        process::exit(1);
    });
    let out = out.unwrap_or_else(|| {
        eprintln!("Missing --out");
        process::exit(1);
    });
    let user = UserId::new(user).unwrap_or_else(|e| {
        eprintln!("Invalid --user: {e}");
        process::exit(1);
    });

    let (cfg, config_hash) = match &config_path {
        Some(p) => {
            let bytes = std::fs::read(p).unwrap_or_else(|e| {
                eprintln!("Failed to read config file: {e}");
                process::exit(1);
            });
            let cfg = Config::load(p).unwrap_or_else(|e| {
                eprintln!("Failed to load config: {e}");
                process::exit(1);
            });
            (cfg, Some(tt_logging::hash_config_bytes(&bytes)))
        }
        None => (Config::default(), None),
    };

    let script_text = std::fs::read_to_string(&script).unwrap_or_else(|e| {
        eprintln!("Failed to read script {script}: {e}");
        process::exit(1);
    });
    let actions: Vec<Action> = serde_yaml::from_str(&script_text).unwrap_or_else(|e| {
        eprintln!("Failed to parse script {script}: {e}");
        process::exit(1);
    });

    let out_dir = PathBuf::from(&out);
    let mut store = NdjsonStore::open(&out_dir).unwrap_or_else(|e| {
        eprintln!("Failed to create output dir: {e}");
        process::exit(1);
    });

    let seed = seed.unwrap_or(cfg.deck.seed);
    let mut ctx = SessionContext::new(seed);
    let (meta, mut session) = match &resume {
        Some(id) => {
            let record = store
                .load_game(&user, id)
                .unwrap_or_else(|e| {
                    eprintln!("Failed to read saved games: {e}");
                    process::exit(1);
                })
                .unwrap_or_else(|| {
                    eprintln!("No saved game {id} for user {user}");
                    process::exit(1);
                });
            if record.is_final {
                eprintln!("Game {id} is already finished");
                process::exit(1);
            }
            let meta = GameMeta {
                game_id: record.game_id,
                start_ts_ms: record.start_ts_ms,
                config_hash: config_hash.or(record.config_hash),
            };
            (meta, Session::load(record.board, record.factory, cfg.deck.size))
        }
        None => {
            let start_ts_ms = tt_logging::now_ms();
            let meta = GameMeta {
                game_id: tt_logging::new_game_id(&user, start_ts_ms, seed),
                start_ts_ms,
                config_hash,
            };
            let session = Session::from_config(&cfg).unwrap_or_else(|e| {
                eprintln!("Invalid grid: {e}");
                process::exit(1);
            });
            (meta, session)
        }
    };
    let game_id = meta.game_id.clone();

    let mut events =
        NdjsonWriter::open_append_with_flush(out_dir.join("events.ndjson"), log_flush_every)
            .unwrap_or_else(|e| {
                eprintln!("Failed to create event log: {e:?}");
                process::exit(1);
            });

    let mut rejected = 0u64;
    for (seq, action) in actions.into_iter().enumerate() {
        let mut ev = ActionEventV1::new(&game_id, seq as u64, action);
        match apply_action(session.clone(), action, &mut ctx) {
            Ok(next) => session = next,
            Err(e) => {
                tt_logging::debug_event(
                    "tt_cli::cmd_play",
                    "action rejected",
                    serde_json::json!({ "seq": seq, "error": e.to_string() }),
                );
                eprintln!("step {seq}: {} rejected: {e}", action.name());
                ev.accepted = false;
                ev.error = Some(e.to_string());
                rejected += 1;
            }
        }
        ev.mode = session.mode.name();
        ev.score = session.score;
        events.write_event(&ev).unwrap_or_else(|e| {
            eprintln!("Failed to write event: {e:?}");
            process::exit(1);
        });
    }

    if session.is_over() {
        let unlocked = finish_game(&mut store, &user, &session, &cfg.achievements, &meta)
            .unwrap_or_else(|e| {
                eprintln!("Failed to save game: {e}");
                process::exit(1);
            });
        let breakdown = score_breakdown(&session.grid, &session.factory);
        events
            .write_event(&ScoreEventV1::new(&game_id, breakdown, unlocked.clone()))
            .unwrap_or_else(|e| {
                eprintln!("Failed to write event: {e:?}");
                process::exit(1);
            });
        for id in &unlocked {
            println!("achievement unlocked: {id}");
        }
        println!("Game over. score={} game_id={game_id}", session.score);
    } else if save_partial {
        session.rescore();
        save_record(&mut store, &user, &session, &meta, false).unwrap_or_else(|e| {
            eprintln!("Failed to save game: {e}");
            process::exit(1);
        });
        println!(
            "Game saved in progress. score={} game_id={game_id}",
            session.score
        );
    } else {
        println!(
            "Game not finished (mode={}); nothing saved. score={}",
            session.mode.name(),
            session.score
        );
    }
    if rejected > 0 {
        println!("rejected actions: {rejected}");
    }

    events.flush().unwrap_or_else(|e| {
        eprintln!("Failed to flush event log: {e:?}");
        process::exit(1);
    });
    write_final(&out_dir, &session);
}

fn cmd_profile(args: &[String]) {
    let mut out: Option<String> = None;
    let mut user = "local".to_string();

    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                println!(
                    r#"tt profile

USAGE:
    tt profile --out DIR [--user ID]

OPTIONS:
    --out DIR    Directory holding games.ndjson and achievements.ndjson (required)
    --user ID    User to report (default: local)
"#
                );
                return;
            }
            "--out" => {
                out = Some(take_value(args, i, "--out"));
                i += 2;
            }
            "--user" => {
                user = take_value(args, i, "--user");
                i += 2;
            }
            other => {
                eprintln!("Unknown option for `tt profile`: {}", other);
                eprintln!("Run `tt profile --help` for usage.");
                process::exit(1);
            }
        }
    }

    let out = out.unwrap_or_else(|| {
        eprintln!("Missing --out");
        process::exit(1);
    });
    let user = UserId::new(user).unwrap_or_else(|e| {
        eprintln!("Invalid --user: {e}");
        process::exit(1);
    });
    let store = NdjsonStore::open(&out).unwrap_or_else(|e| {
        eprintln!("Failed to open store: {e}");
        process::exit(1);
    });
    let games = store.games_for(&user).unwrap_or_else(|e| {
        eprintln!("Failed to read games: {e}");
        process::exit(1);
    });
    let unlocked = store.unlocked_for(&user).unwrap_or_else(|e| {
        eprintln!("Failed to read achievements: {e}");
        process::exit(1);
    });

    println!("user={user}");
    println!("games: {}", games.len());
    for g in &games {
        let status = if g.is_final { "final" } else { "in_progress" };
        println!("  {} score={} {status}", g.game_id, g.score);
    }
    println!("achievements: {}", unlocked.len());
    for id in &unlocked {
        println!("  {id}");
    }
}

fn write_final(out_dir: &Path, session: &Session) {
    tt_logging::write_json_atomic(out_dir.join("final.json"), session).unwrap_or_else(|e| {
        eprintln!("Failed to write final.json: {e:?}");
        process::exit(1);
    });
}

fn print_help() {
    eprintln!(
        r#"tt - Tiny Towns engine CLI

USAGE:
    tt <COMMAND> [OPTIONS]

COMMANDS:
    catalog                 List buildings, scoring rules and base patterns
    orientations NAME       Print the 8 orientations of a building
    match                   Check a selection against a building
    score                   Score a board
    play                    Run an action script and record the game
    profile                 List a user's saved games and achievements

OPTIONS:
    -h, --help          Print this help message
    -V, --version       Print version

Run `tt <COMMAND> --help` for command options.
"#
    );
}

fn print_version() {
    println!("tt {}", env!("CARGO_PKG_VERSION"));
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_help();
        process::exit(0);
    }

    match args[1].as_str() {
        "-h" | "--help" | "help" => {
            print_help();
        }
        "-V" | "--version" => {
            print_version();
        }
        "catalog" => {
            cmd_catalog();
        }
        "orientations" => {
            cmd_orientations(&args[2..]);
        }
        "match" => {
            cmd_match(&args[2..]);
        }
        "score" => {
            cmd_score(&args[2..]);
        }
        "play" => {
            cmd_play(&args[2..]);
        }
        "profile" => {
            cmd_profile(&args[2..]);
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            eprintln!("Run `tt --help` for usage.");
            process::exit(1);
        }
    }
}
