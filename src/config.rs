/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory, the CWD, or the
/// XDG/system data directories. Falls back to defaults if the file is
/// missing or incomplete; a malformed file is reported on stderr and
/// ignored. The `[damage]` section feeds the stat table.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::domain::ai::AiTuning;
use crate::domain::stats::StatTable;

const APP_DIR: &str = "labyrinth";

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub timing: TimingConfig,
    pub monster: MonsterConfig,
    pub quest: QuestConfig,
    pub stats: StatTable,
    pub gamepad: GamepadConfig,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TimingConfig {
    pub tick_rate_ms: u64,
    pub message_ticks: u32,
    pub gem_countdown_ticks: u32,
    pub attack_cooldown: u32,
    pub ascend_ticks: u32,
    pub cycle_interval: u32,
    pub dig_interval: u32,
    pub damage_interval: u32,
    pub flashlight_interval: u32,
    pub chest_interval: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MonsterConfig {
    pub move_rate: f64,
    pub max_range: f64,
    pub speed: i32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct QuestConfig {
    pub gem_quota: usize,
    pub gem_count: usize,
    /// Fixed RNG seed; `None` seeds from the OS.
    pub seed: Option<u64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GamepadConfig {
    pub use_item: Vec<String>,
    pub pick_up: Vec<String>,
    pub drop: Vec<String>,
    pub stow: Vec<String>,
    pub cycle: Vec<String>,
    pub toggle_chest: Vec<String>,
    pub toggle_light: Vec<String>,
    pub menu: Vec<String>,
    pub confirm: Vec<String>,
    pub quit: Vec<String>,
}

impl GameConfig {
    pub fn ai_tuning(&self) -> AiTuning {
        AiTuning {
            move_rate: self.monster.move_rate,
            max_range: self.monster.max_range,
            speed: self.monster.speed,
            attack_cooldown: self.timing.attack_cooldown,
            ..AiTuning::default()
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default())
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    monster: TomlMonster,
    #[serde(default)]
    quest: TomlQuest,
    /// item → monster → points
    #[serde(default)]
    damage: BTreeMap<String, BTreeMap<String, i32>>,
    #[serde(default)]
    gamepad: TomlGamepad,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_message_ticks")]
    message_ticks: u32,
    #[serde(default = "default_gem_countdown")]
    gem_countdown_ticks: u32,
    #[serde(default = "default_attack_cooldown")]
    attack_cooldown: u32,
    #[serde(default = "default_ascend_ticks")]
    ascend_ticks: u32,
    #[serde(default = "default_cycle_interval")]
    cycle_interval: u32,
    #[serde(default = "default_dig_interval")]
    dig_interval: u32,
    #[serde(default = "default_damage_interval")]
    damage_interval: u32,
    #[serde(default = "default_flashlight_interval")]
    flashlight_interval: u32,
    #[serde(default = "default_chest_interval")]
    chest_interval: u32,
}

#[derive(Deserialize, Debug)]
struct TomlMonster {
    #[serde(default = "default_move_rate")]
    move_rate: f64,
    #[serde(default = "default_max_range")]
    max_range: f64,
    #[serde(default = "default_monster_speed")]
    speed: i32,
}

#[derive(Deserialize, Debug)]
struct TomlQuest {
    #[serde(default = "default_gem_quota")]
    gem_quota: usize,
    #[serde(default = "default_gem_count")]
    gem_count: usize,
    #[serde(default)]
    seed: Option<u64>,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_pad_use")]
    use_item: Vec<String>,
    #[serde(default = "default_pad_pick_up")]
    pick_up: Vec<String>,
    #[serde(default = "default_pad_drop")]
    drop: Vec<String>,
    #[serde(default = "default_pad_stow")]
    stow: Vec<String>,
    #[serde(default = "default_pad_cycle")]
    cycle: Vec<String>,
    #[serde(default = "default_pad_chest")]
    toggle_chest: Vec<String>,
    #[serde(default = "default_pad_light")]
    toggle_light: Vec<String>,
    #[serde(default = "default_pad_menu")]
    menu: Vec<String>,
    #[serde(default = "default_pad_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_pad_quit")]
    quit: Vec<String>,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 8 }            // ~120 ticks per second
fn default_message_ticks() -> u32 { 240 }
fn default_gem_countdown() -> u32 { 8 * 7200 } // about 8 minutes
fn default_attack_cooldown() -> u32 { 50 }
fn default_ascend_ticks() -> u32 { 800 }
fn default_cycle_interval() -> u32 { 40 }
fn default_dig_interval() -> u32 { 40 }
fn default_damage_interval() -> u32 { 100 }
fn default_flashlight_interval() -> u32 { 80 }
fn default_chest_interval() -> u32 { 40 }

fn default_move_rate() -> f64 { 0.75 }
fn default_max_range() -> f64 { 8000.0 }
fn default_monster_speed() -> i32 { 5 }

fn default_gem_quota() -> usize { 5 }
fn default_gem_count() -> usize { 6 }

fn default_pad_use() -> Vec<String> { vec!["A".into()] }
fn default_pad_pick_up() -> Vec<String> { vec!["X".into()] }
fn default_pad_drop() -> Vec<String> { vec!["L2".into()] }
fn default_pad_stow() -> Vec<String> { vec!["R2".into()] }
fn default_pad_cycle() -> Vec<String> { vec!["R1".into()] }
fn default_pad_chest() -> Vec<String> { vec!["Y".into()] }
fn default_pad_light() -> Vec<String> { vec!["L1".into()] }
fn default_pad_menu() -> Vec<String> { vec!["Select".into()] }
fn default_pad_confirm() -> Vec<String> { vec!["Start".into()] }
fn default_pad_quit() -> Vec<String> { vec![] }

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            tick_rate_ms: default_tick_rate(),
            message_ticks: default_message_ticks(),
            gem_countdown_ticks: default_gem_countdown(),
            attack_cooldown: default_attack_cooldown(),
            ascend_ticks: default_ascend_ticks(),
            cycle_interval: default_cycle_interval(),
            dig_interval: default_dig_interval(),
            damage_interval: default_damage_interval(),
            flashlight_interval: default_flashlight_interval(),
            chest_interval: default_chest_interval(),
        }
    }
}

impl Default for TomlMonster {
    fn default() -> Self {
        TomlMonster {
            move_rate: default_move_rate(),
            max_range: default_max_range(),
            speed: default_monster_speed(),
        }
    }
}

impl Default for TomlQuest {
    fn default() -> Self {
        TomlQuest {
            gem_quota: default_gem_quota(),
            gem_count: default_gem_count(),
            seed: None,
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            use_item: default_pad_use(),
            pick_up: default_pad_pick_up(),
            drop: default_pad_drop(),
            stow: default_pad_stow(),
            cycle: default_pad_cycle(),
            toggle_chest: default_pad_chest(),
            toggle_light: default_pad_light(),
            menu: default_pad_menu(),
            confirm: default_pad_confirm(),
            quit: default_pad_quit(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: exe directory, CWD, `~/.local/share/labyrinth`,
    /// `/usr/share/labyrinth`. Missing file or keys fall back to defaults.
    pub fn load() -> Self {
        let toml_cfg = load_toml(&candidate_dirs());
        GameConfig::from_toml(toml_cfg)
    }

    /// Parse a config document. Malformed text yields `Err` with the parser's
    /// message; callers decide whether to fall back.
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<TomlConfig>(text).map(GameConfig::from_toml)
    }

    fn from_toml(cfg: TomlConfig) -> Self {
        let (stats, errors) = StatTable::with_overrides(&cfg.damage);
        for e in &errors {
            eprintln!("Warning: config.toml: {e}; entry ignored.");
        }

        // Gems are placed one per inner cell.
        let gem_count = cfg.quest.gem_count.clamp(1, 49);
        let quest = QuestConfig {
            // A quota above the gem count could never be met.
            gem_quota: cfg.quest.gem_quota.clamp(1, gem_count),
            gem_count,
            seed: cfg.quest.seed,
        };

        GameConfig {
            timing: TimingConfig {
                tick_rate_ms: cfg.timing.tick_rate_ms.max(1),
                message_ticks: cfg.timing.message_ticks,
                gem_countdown_ticks: cfg.timing.gem_countdown_ticks,
                attack_cooldown: cfg.timing.attack_cooldown.max(1),
                ascend_ticks: cfg.timing.ascend_ticks,
                cycle_interval: cfg.timing.cycle_interval,
                dig_interval: cfg.timing.dig_interval,
                damage_interval: cfg.timing.damage_interval,
                flashlight_interval: cfg.timing.flashlight_interval,
                chest_interval: cfg.timing.chest_interval,
            },
            monster: MonsterConfig {
                move_rate: cfg.monster.move_rate.clamp(0.0, 1.0),
                max_range: cfg.monster.max_range.max(1.0),
                speed: cfg.monster.speed.max(1),
            },
            quest,
            stats,
            gamepad: GamepadConfig {
                use_item: cfg.gamepad.use_item,
                pick_up: cfg.gamepad.pick_up,
                drop: cfg.gamepad.drop,
                stow: cfg.gamepad.stow,
                cycle: cfg.gamepad.cycle,
                toggle_chest: cfg.gamepad.toggle_chest,
                toggle_light: cfg.gamepad.toggle_light,
                menu: cfg.gamepad.menu,
                confirm: cfg.gamepad.confirm,
                quit: cfg.gamepad.quit,
            },
        }
    }
}

/// Candidate directories to search: exe dir + CWD + data paths (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        // Resolve symlinks so a linked binary still finds its data.
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

    // 3. XDG data home
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share").join(APP_DIR);
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    // 4. System data directory
    let sys = PathBuf::from("/usr/share").join(APP_DIR);
    if sys.is_dir() && !dirs.iter().any(|d| d == &sys) {
        dirs.push(sys);
    }

    // 5. Fallback
    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: config.toml parse error: {e}");
                        eprintln!("Using default settings.");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::MonsterKind;
    use crate::domain::item::{ItemKind, WeaponKind};

    #[test]
    fn empty_document_gives_defaults() {
        let cfg = GameConfig::parse("").expect("parse");
        assert_eq!(cfg.timing.message_ticks, 240);
        assert_eq!(cfg.timing.gem_countdown_ticks, 8 * 7200);
        assert_eq!(cfg.quest.gem_quota, 5);
        assert_eq!(cfg.quest.seed, None);
        assert_eq!(cfg.monster.move_rate, 0.75);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = GameConfig::parse(
            r#"
            [timing]
            attack_cooldown = 30

            [quest]
            seed = 99
            "#,
        )
        .expect("parse");
        assert_eq!(cfg.timing.attack_cooldown, 30);
        assert_eq!(cfg.timing.damage_interval, 100);
        assert_eq!(cfg.quest.seed, Some(99));
        assert_eq!(cfg.ai_tuning().attack_cooldown, 30);
    }

    #[test]
    fn damage_section_overrides_stats() {
        let cfg = GameConfig::parse(
            r#"
            [damage.sword]
            lion = 40
            minotaur = 3
            "#,
        )
        .expect("parse");
        let sword = ItemKind::Weapon(WeaponKind::Sword);
        assert_eq!(cfg.stats.damage(sword, MonsterKind::Lion), Some(40));
        assert_eq!(cfg.stats.damage(sword, MonsterKind::Hydra), Some(12));
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(GameConfig::parse("[timing\nfoo = ").is_err());
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let cfg = GameConfig::parse(
            r#"
            [monster]
            move_rate = 3.5
            speed = 0
            "#,
        )
        .expect("parse");
        assert_eq!(cfg.monster.move_rate, 1.0);
        assert_eq!(cfg.monster.speed, 1);
    }

    #[test]
    fn gem_quota_is_kept_within_gem_count() {
        let cfg = GameConfig::parse(
            r#"
            [quest]
            gem_quota = 0
            "#,
        )
        .expect("parse");
        assert_eq!(cfg.quest.gem_quota, 1);

        let cfg = GameConfig::parse(
            r#"
            [quest]
            gem_quota = 99
            gem_count = 8
            "#,
        )
        .expect("parse");
        assert_eq!(cfg.quest.gem_quota, 8);
        assert_eq!(cfg.quest.gem_count, 8);
    }
}
