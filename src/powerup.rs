//! Power-up catalog, drop rolls and effect application.

use rand::Rng;

use crate::config::{PICKUP_BONUS, TICKS_PER_SECOND};
use crate::entities::{GameEvent, GameSession, ParticleKind, SoundId};

/// Heal amount of a repair kit.
pub const REPAIR_AMOUNT: i32 = 50;
/// Damage a smart bomb deals to every enemy on screen.
pub const SMART_BOMB_DAMAGE: i32 = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PowerUpKind {
    // Offensive
    DualShot,
    QuadShot,
    LaserBeam,
    HomingMissiles,
    ProtonTorpedoes,
    // Defensive
    EnergyShield,
    SpeedBoost,
    PhaseCloak,
    BarrelRoll,
    // Utility
    RepairKit,
    SmartBomb,
    SlowMotion,
    AutoAim,
    Overcharge,
    ForcePower,
}

/// What collecting a pickup does.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Attached to the player for this many ticks.
    Timed(u32),
    /// Resolved on the spot.
    Instant,
    /// Accepted and scored, nothing else.
    Placeholder,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CatalogEntry {
    pub kind: PowerUpKind,
    pub name: &'static str,
    /// Share of drops this kind receives.
    pub weight: f64,
    pub color: (u8, u8, u8),
    pub effect: Effect,
}

const fn ticks_from_ms(ms: u32) -> u32 {
    ms * TICKS_PER_SECOND / 1000
}

const fn entry(
    kind: PowerUpKind,
    name: &'static str,
    weight: f64,
    color: (u8, u8, u8),
    effect: Effect,
) -> CatalogEntry {
    CatalogEntry { kind, name, weight, color, effect }
}

/// Every power-up in drop order. Weights sum to 0.94; the remainder drops nothing.
pub const CATALOG: [CatalogEntry; 15] = [
    entry(PowerUpKind::DualShot, "Dual Shot", 0.15, (0xff, 0x66, 0x00), Effect::Timed(ticks_from_ms(10_000))),
    entry(PowerUpKind::QuadShot, "Quad Shot", 0.08, (0xff, 0x00, 0x66), Effect::Timed(ticks_from_ms(8_000))),
    entry(PowerUpKind::LaserBeam, "Laser Beam", 0.05, (0xff, 0x00, 0x00), Effect::Timed(ticks_from_ms(5_000))),
    entry(PowerUpKind::HomingMissiles, "Homing Missiles", 0.03, (0x99, 0x00, 0xff), Effect::Placeholder),
    entry(PowerUpKind::ProtonTorpedoes, "Proton Torpedoes", 0.02, (0x00, 0x99, 0xff), Effect::Placeholder),
    entry(PowerUpKind::EnergyShield, "Energy Shield", 0.12, (0x00, 0xcc, 0xff), Effect::Timed(ticks_from_ms(5_000))),
    entry(PowerUpKind::SpeedBoost, "Speed Boost", 0.10, (0xff, 0xff, 0x00), Effect::Timed(ticks_from_ms(8_000))),
    entry(PowerUpKind::PhaseCloak, "Phase Cloak", 0.04, (0xcc, 0x00, 0xff), Effect::Timed(ticks_from_ms(4_000))),
    entry(PowerUpKind::BarrelRoll, "Barrel Roll", 0.06, (0x00, 0xff, 0x99), Effect::Placeholder),
    entry(PowerUpKind::RepairKit, "Repair Kit", 0.08, (0x00, 0xff, 0x00), Effect::Instant),
    entry(PowerUpKind::SmartBomb, "Smart Bomb", 0.05, (0xff, 0x99, 0x00), Effect::Instant),
    entry(PowerUpKind::SlowMotion, "Slow Motion", 0.03, (0x66, 0x00, 0xff), Effect::Placeholder),
    entry(PowerUpKind::AutoAim, "Auto-Aim", 0.10, (0xff, 0x00, 0xff), Effect::Timed(ticks_from_ms(10_000))),
    entry(PowerUpKind::Overcharge, "Overcharge", 0.02, (0xff, 0xcc, 0x00), Effect::Placeholder),
    entry(PowerUpKind::ForcePower, "Force Power", 0.01, (0x00, 0x66, 0xff), Effect::Instant),
];

impl PowerUpKind {
    pub fn entry(self) -> &'static CatalogEntry {
        // Every kind appears exactly once in CATALOG.
        CATALOG
            .iter()
            .find(|e| e.kind == self)
            .unwrap_or(&CATALOG[0])
    }

    pub fn name(self) -> &'static str {
        self.entry().name
    }
}

// ── Drops ─────────────────────────────────────────────────────────────────────

/// Walk `catalog` accumulating weights; the first entry whose running total
/// reaches `roll` wins. A roll past the total selects nothing.
pub fn select_power_up(catalog: &[CatalogEntry], roll: f64) -> Option<PowerUpKind> {
    let mut cumulative = 0.0;
    for entry in catalog {
        cumulative += entry.weight;
        if roll <= cumulative {
            return Some(entry.kind);
        }
    }
    None
}

/// Two uniform draws: one against `drop_rate`, one for the type.
pub fn roll_drop(rng: &mut impl Rng, drop_rate: f64) -> Option<PowerUpKind> {
    let chance: f64 = rng.gen();
    if chance >= drop_rate {
        return None;
    }
    select_power_up(&CATALOG, rng.gen())
}

// ── Effects ───────────────────────────────────────────────────────────────────

/// Resolve a collected pickup against the session and award the flat bonus.
pub fn apply_power_up(session: &mut GameSession, kind: PowerUpKind) {
    let entry = kind.entry();
    tracing::debug!(power_up = entry.name, "power-up collected");

    match entry.effect {
        Effect::Timed(duration) => session.player.add_power_up(kind, duration),
        Effect::Instant => apply_instant(session, kind),
        Effect::Placeholder => {
            tracing::info!(power_up = entry.name, "power-up has no effect yet");
        }
    }

    session.add_score(PICKUP_BONUS);
    session.emit(GameEvent::Sound { id: SoundId::PowerUp, volume: 0.5 });
}

fn apply_instant(session: &mut GameSession, kind: PowerUpKind) {
    match kind {
        PowerUpKind::RepairKit => session.player.heal(REPAIR_AMOUNT),
        PowerUpKind::SmartBomb => {
            session.enemy_bullets.clear();
            let mut destroyed = Vec::new();
            for enemy in &mut session.enemies {
                if enemy.take_damage(SMART_BOMB_DAMAGE) {
                    destroyed.push((enemy.kind, enemy.x, enemy.y));
                }
            }
            session.enemies.retain(|e| e.active);
            for (enemy_kind, x, y) in destroyed {
                session.phase_manager.record_enemy_killed();
                session.add_score(enemy_kind.score_value());
                session.emit(GameEvent::Particles { kind: ParticleKind::Explosion, x, y });
            }
        }
        PowerUpKind::ForcePower => {
            for bullet in &mut session.enemy_bullets {
                bullet.vx = -bullet.vx;
                bullet.vy = -bullet.vy;
            }
        }
        other => tracing::warn!(power_up = ?other, "not an instant power-up"),
    }
}
