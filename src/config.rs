//! Game tuning: arena and physics constants, score table, difficulty presets
//! and the scripted phase sequence.
//!
//! The phase list can be replaced by a TOML file; everything else is fixed.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::boss::BossKind;
use crate::entities::EnemyKind;
use crate::error::{ConfigError, Result};

// ── Timing ────────────────────────────────────────────────────────────────────

/// Simulation steps per second.
pub const TICKS_PER_SECOND: u32 = 60;

/// Length of every transition overlay (boss intro, phase complete, ...).
pub const TRANSITION_TICKS: u32 = 180;

// ── Arena & physics ───────────────────────────────────────────────────────────

pub const ARENA_WIDTH: f32 = 720.0;
pub const ARENA_HEIGHT: f32 = 480.0;
pub const BOUNDARY_MARGIN: f32 = 10.0;
pub const FRICTION: f32 = 0.8;

pub const PLAYER_WIDTH: f32 = 100.0;
pub const PLAYER_HEIGHT: f32 = 100.0;
pub const PLAYER_MAX_HP: i32 = 100;
pub const PLAYER_SPAWN_X: f32 = 200.0;
pub const PLAYER_SHOOT_DELAY: u32 = 10;
/// Invulnerability granted after taking a hit.
pub const HIT_INVULNERABILITY: u32 = 60;
/// Invulnerability granted after a respawn.
pub const RESPAWN_INVULNERABILITY: u32 = 120;

pub const ENEMY_WIDTH: f32 = 100.0;
pub const ENEMY_HEIGHT: f32 = 100.0;
pub const ENEMY_SPEED: f32 = 1.0;
pub const ENEMY_SHOOT_DELAY: u32 = 90;
/// Enemies only fire once they are this far inside the right edge.
pub const ENEMY_FIRE_INSET: f32 = 100.0;

pub const BULLET_WIDTH: f32 = 30.0;
pub const BULLET_HEIGHT: f32 = 10.0;
pub const BULLET_SPEED: f32 = 35.0;
pub const ENEMY_BULLET_SPEED: f32 = 30.0;
pub const BULLET_DAMAGE: i32 = 10;
pub const ENEMY_BULLET_DAMAGE: i32 = 10;

pub const ENEMY_CONTACT_DAMAGE: i32 = 30;
pub const BOSS_CONTACT_DAMAGE: i32 = 50;

pub const PICKUP_SIZE: f32 = 30.0;
pub const PICKUP_LIFETIME: u32 = 600;
pub const PICKUP_DRIFT: f32 = 0.5;

// ── Scores ────────────────────────────────────────────────────────────────────

pub const SCORE_TIE_FIGHTER: u32 = 100;
pub const SCORE_TIE_INTERCEPTOR: u32 = 150;
pub const SCORE_TIE_ADVANCED: u32 = 1000;
pub const SCORE_STAR_DESTROYER: u32 = 2500;
pub const SCORE_DEATH_STAR: u32 = 10000;
pub const NO_DAMAGE_BONUS: u32 = 500;
pub const PHASE_COMPLETE_BONUS: u32 = 1000;
pub const PICKUP_BONUS: u32 = 50;

// ── Difficulty ────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    Easy,
    Normal,
    Hard,
}

/// Multipliers and rates applied on top of the base tuning.
#[derive(Clone, Debug, PartialEq)]
pub struct Difficulty {
    pub level: DifficultyLevel,
    pub name: &'static str,
    pub player_lives: u32,
    pub player_speed: f32,
    pub enemy_speed_multiplier: f32,
    /// Scales enemy shoot delay; below 1.0 means faster fire.
    pub enemy_fire_rate_multiplier: f32,
    pub boss_hp_multiplier: f32,
    pub bullet_speed_multiplier: f32,
    pub power_up_drop_rate: f64,
}

impl DifficultyLevel {
    pub fn settings(self) -> Difficulty {
        match self {
            DifficultyLevel::Easy => Difficulty {
                level: self,
                name: "Rookie Pilot",
                player_lives: 5,
                player_speed: 7.0,
                enemy_speed_multiplier: 0.8,
                enemy_fire_rate_multiplier: 1.5,
                boss_hp_multiplier: 0.7,
                bullet_speed_multiplier: 0.8,
                power_up_drop_rate: 0.25,
            },
            DifficultyLevel::Normal => Difficulty {
                level: self,
                name: "Rebel Pilot",
                player_lives: 3,
                player_speed: 6.0,
                enemy_speed_multiplier: 1.0,
                enemy_fire_rate_multiplier: 1.0,
                boss_hp_multiplier: 1.0,
                bullet_speed_multiplier: 1.0,
                power_up_drop_rate: 0.15,
            },
            DifficultyLevel::Hard => Difficulty {
                level: self,
                name: "Alliance Ace",
                player_lives: 2,
                player_speed: 5.0,
                enemy_speed_multiplier: 1.3,
                enemy_fire_rate_multiplier: 0.7,
                boss_hp_multiplier: 1.5,
                bullet_speed_multiplier: 1.4,
                power_up_drop_rate: 0.10,
            },
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        DifficultyLevel::Normal.settings()
    }
}

// ── Phases ────────────────────────────────────────────────────────────────────

/// What a phase asks of the player. Enemy and boss types stay as names here
/// and are resolved when the phase loads.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PhaseKind {
    NormalCombat {
        enemy_count: u32,
        enemy_type: String,
        spawn_rate: u64,
    },
    BossFight {
        boss_type: String,
        boss_hp: i32,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhaseDescriptor {
    pub id: u32,
    pub name: String,
    pub objective: String,
    #[serde(flatten)]
    pub kind: PhaseKind,
}

impl PhaseDescriptor {
    pub fn is_boss_fight(&self) -> bool {
        matches!(self.kind, PhaseKind::BossFight { .. })
    }
}

fn combat(id: u32, name: &str, objective: &str, count: u32, enemy: &str, rate: u64) -> PhaseDescriptor {
    PhaseDescriptor {
        id,
        name: name.to_string(),
        objective: objective.to_string(),
        kind: PhaseKind::NormalCombat {
            enemy_count: count,
            enemy_type: enemy.to_string(),
            spawn_rate: rate,
        },
    }
}

fn boss_fight(id: u32, name: &str, objective: &str, boss: &str, hp: i32) -> PhaseDescriptor {
    PhaseDescriptor {
        id,
        name: name.to_string(),
        objective: objective.to_string(),
        kind: PhaseKind::BossFight {
            boss_type: boss.to_string(),
            boss_hp: hp,
        },
    }
}

/// The five scripted phases of a full run.
pub fn default_phases() -> Vec<PhaseDescriptor> {
    vec![
        combat(1, "TIE Fighter Squadron", "Destroy 30 TIE Fighters", 30, "TIE_FIGHTER", 60),
        boss_fight(2, "Darth Vader - TIE Advanced", "Defeat the TIE Advanced", "TIE_ADVANCED", 300),
        combat(3, "Interceptor Assault", "Survive the Interceptors", 40, "TIE_INTERCEPTOR", 45),
        boss_fight(4, "Imperial Star Destroyer", "Destroy the Star Destroyer", "STAR_DESTROYER", 500),
        boss_fight(5, "Death Star", "Hit the exhaust port", "DEATH_STAR", 1000),
    ]
}

// ── Top-level config ──────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub arena_width: f32,
    pub arena_height: f32,
    pub transition_ticks: u32,
    pub phases: Vec<PhaseDescriptor>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            arena_width: ARENA_WIDTH,
            arena_height: ARENA_HEIGHT,
            transition_ticks: TRANSITION_TICKS,
            phases: default_phases(),
        }
    }
}

impl GameConfig {
    /// Read and validate a TOML phase file. Missing keys keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: GameConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the arena can hold the player and every phase names a known
    /// enemy/boss with a usable spawn rate.
    pub fn validate(&self) -> Result<()> {
        let min_width = PLAYER_WIDTH + BOUNDARY_MARGIN * 2.0;
        let min_height = PLAYER_HEIGHT + BOUNDARY_MARGIN * 2.0;
        // NaN fails both comparisons.
        if !(self.arena_width.is_finite() && self.arena_width >= min_width)
            || !(self.arena_height.is_finite() && self.arena_height >= min_height)
        {
            return Err(ConfigError::InvalidArena {
                width: self.arena_width,
                height: self.arena_height,
            });
        }
        if self.phases.is_empty() {
            return Err(ConfigError::EmptyPhaseList);
        }
        for phase in &self.phases {
            match &phase.kind {
                PhaseKind::NormalCombat { enemy_type, spawn_rate, .. } => {
                    enemy_type.parse::<EnemyKind>()?;
                    if *spawn_rate == 0 {
                        return Err(ConfigError::InvalidSpawnRate { phase: phase.id });
                    }
                }
                PhaseKind::BossFight { boss_type, .. } => {
                    boss_type.parse::<BossKind>()?;
                }
            }
        }
        Ok(())
    }
}
