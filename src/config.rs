/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to the built-in tuning if the file is missing or incomplete.
/// The defaults are the canonical game constants; a config file only
/// needs to mention what it changes.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub speed: SpeedConfig,
    pub physics: PhysicsConfig,
    pub gamepad: GamepadConfig,
    pub general: GeneralConfig,
}

#[derive(Clone, Debug)]
pub struct SpeedConfig {
    /// Simulation step interval (≈60 Hz by default).
    pub tick_rate_ms: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PhysicsConfig {
    pub gravity: f32,
    pub jump_force: f32,
    pub fly_speed: f32,
    pub max_fly_ms: u64,
    pub scroll_speed: f32,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub jump: Vec<String>,
    pub descend: Vec<String>,
    pub confirm: Vec<String>,
    pub quit: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct GeneralConfig {
    pub log_file: PathBuf,
    /// `env_logger` filter string, e.g. `"debug"` or `"spike_run=trace"`.
    /// No logger is installed when unset.
    pub log_level: Option<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    physics: TomlPhysics,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlPhysics {
    #[serde(default = "default_gravity")]
    gravity: f32,
    #[serde(default = "default_jump_force")]
    jump_force: f32,
    #[serde(default = "default_fly_speed")]
    fly_speed: f32,
    #[serde(default = "default_max_fly")]
    max_fly_ms: u64,
    #[serde(default = "default_scroll_speed")]
    scroll_speed: f32,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_pad_jump")]
    jump: Vec<String>,
    #[serde(default = "default_pad_descend")]
    descend: Vec<String>,
    #[serde(default = "default_pad_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_pad_quit")]
    quit: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_log_file")]
    log_file: String,
    #[serde(default)]
    log_level: Option<String>,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 16 }

fn default_gravity() -> f32 { 0.8 }
fn default_jump_force() -> f32 { -13.0 }
fn default_fly_speed() -> f32 { 7.0 }
fn default_max_fly() -> u64 { 60_000 }
fn default_scroll_speed() -> f32 { 5.0 }

fn default_pad_jump() -> Vec<String> { vec!["A".into(), "B".into()] }
fn default_pad_descend() -> Vec<String> { vec!["X".into()] }
fn default_pad_confirm() -> Vec<String> { vec!["Start".into(), "A".into()] }
fn default_pad_quit() -> Vec<String> { vec!["Select".into()] }

fn default_log_file() -> String { "spike-run.log".into() }

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed { tick_rate_ms: default_tick_rate() }
    }
}

impl Default for TomlPhysics {
    fn default() -> Self {
        TomlPhysics {
            gravity: default_gravity(),
            jump_force: default_jump_force(),
            fly_speed: default_fly_speed(),
            max_fly_ms: default_max_fly(),
            scroll_speed: default_scroll_speed(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            jump: default_pad_jump(),
            descend: default_pad_descend(),
            confirm: default_pad_confirm(),
            quit: default_pad_quit(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            log_file: default_log_file(),
            log_level: None,
        }
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        TomlPhysics::default().into()
    }
}

impl From<TomlPhysics> for PhysicsConfig {
    fn from(t: TomlPhysics) -> Self {
        PhysicsConfig {
            gravity: t.gravity,
            jump_force: t.jump_force,
            fly_speed: t.fly_speed,
            max_fly_ms: t.max_fly_ms,
            scroll_speed: t.scroll_speed,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default())
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        match read_config_text(&search_dirs) {
            Some(text) => GameConfig::parse(&text).unwrap_or_else(|e| {
                eprintln!("Warning: config.toml parse error: {e}");
                eprintln!("Using default settings.");
                GameConfig::default()
            }),
            None => GameConfig::default(),
        }
    }

    /// Parse a config document. Missing sections and keys take defaults.
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<TomlConfig>(text).map(GameConfig::from_toml)
    }

    fn from_toml(toml_cfg: TomlConfig) -> Self {
        GameConfig {
            speed: SpeedConfig {
                // A zero interval would spin the loop; clamp to 1 ms.
                tick_rate_ms: toml_cfg.speed.tick_rate_ms.max(1),
            },
            physics: toml_cfg.physics.into(),
            gamepad: GamepadConfig {
                jump: toml_cfg.gamepad.jump,
                descend: toml_cfg.gamepad.descend,
                confirm: toml_cfg.gamepad.confirm,
                quit: toml_cfg.gamepad.quit,
            },
            general: GeneralConfig {
                log_file: PathBuf::from(toml_cfg.general.log_file),
                log_level: toml_cfg.general.log_level.filter(|s| !s.trim().is_empty()),
            },
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Read the first config.toml found in the candidate directories.
///
/// Runs before the terminal is taken over and before logging exists,
/// so problems go straight to stderr.
fn read_config_text(search_dirs: &[PathBuf]) -> Option<String> {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => return Some(text),
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    None
}
