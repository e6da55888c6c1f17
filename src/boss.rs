//! Scripted bosses.
//!
//! A `Boss` is one struct for every boss type. What differs between types is
//! carried by a `BossBehavior` picked at construction: a movement pattern, an
//! attack pattern, a per-phase tuning table and optional abilities (dash,
//! escort spawning, superlaser, weak point). Phase escalation is driven only
//! by the hp ratio and never goes back.

use std::str::FromStr;

use crate::config::{SCORE_DEATH_STAR, SCORE_STAR_DESTROYER, SCORE_TIE_ADVANCED};
use crate::entities::{Entity, Projectile, Rect};
use crate::error::ConfigError;

/// hp ratio at or below which a boss enters phase 1.
pub const PHASE_1_THRESHOLD: f32 = 0.6;
/// hp ratio at or below which a boss enters phase 2.
pub const PHASE_2_THRESHOLD: f32 = 0.3;

/// Vertical band the bouncing patterns keep away from.
const EDGE_PADDING: f32 = 50.0;
const ZIGZAG_FLIP_TICKS: u64 = 60;
const WAVE_AMPLITUDE: f32 = 100.0;
const WAVE_FREQUENCY: f32 = 0.02;
const ORBIT_RADIUS: f32 = 80.0;

const DASH_DURATION: u32 = 30;
const DASH_SPEED: f32 = 15.0;
/// Extra hitbox margin while dashing.
const DASH_REACH: f32 = 20.0;

const SUPERLASER_CHARGE_TICKS: u32 = 120;
const SUPERLASER_FIRE_TICKS: u32 = 60;
const SUPERLASER_BAND_HEIGHT: f32 = 50.0;
pub const SUPERLASER_DAMAGE: i32 = 30;

// ── Kinds ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BossKind {
    TieAdvanced,
    StarDestroyer,
    DeathStar,
}

impl BossKind {
    pub fn name(self) -> &'static str {
        match self {
            BossKind::TieAdvanced => "TIE Advanced x1",
            BossKind::StarDestroyer => "Imperial Star Destroyer",
            BossKind::DeathStar => "Death Star",
        }
    }

    pub fn score_value(self) -> u32 {
        match self {
            BossKind::TieAdvanced => SCORE_TIE_ADVANCED,
            BossKind::StarDestroyer => SCORE_STAR_DESTROYER,
            BossKind::DeathStar => SCORE_DEATH_STAR,
        }
    }

    pub fn size(self) -> (f32, f32) {
        match self {
            BossKind::TieAdvanced => (150.0, 150.0),
            BossKind::StarDestroyer => (300.0, 200.0),
            BossKind::DeathStar => (400.0, 400.0),
        }
    }

    /// Entry position for a given arena.
    pub fn spawn_position(self, arena_width: f32, arena_height: f32) -> (f32, f32) {
        let x = arena_width - 100.0;
        let y = arena_height / 2.0;
        match self {
            BossKind::TieAdvanced => (x, y - 75.0),
            BossKind::StarDestroyer => (x - 150.0, y - 100.0),
            BossKind::DeathStar => (x - 200.0, y - 200.0),
        }
    }

    pub fn behavior(self) -> BossBehavior {
        match self {
            BossKind::TieAdvanced => BossBehavior {
                movement: Movement::Zigzag,
                speed: 3.0,
                attack: AttackPattern::Spread([
                    &[-15.0, 0.0, 15.0],
                    &[-30.0, -15.0, 0.0, 15.0, 30.0],
                    &[-45.0, -30.0, -15.0, 0.0, 15.0, 30.0, 45.0],
                ]),
                shoot_points: vec![(0.0, 75.0)],
                tuning: [
                    PhaseTuning { shoot_delay: 90, dash_delay: Some(300), ..PhaseTuning::default() },
                    PhaseTuning { shoot_delay: 90, dash_delay: Some(300), ..PhaseTuning::default() },
                    PhaseTuning { shoot_delay: 90, dash_delay: Some(180), ..PhaseTuning::default() },
                ],
                weak_point: None,
            },
            BossKind::StarDestroyer => BossBehavior {
                movement: Movement::Vertical,
                speed: 0.5,
                attack: AttackPattern::Turrets([&[0, 2, 4], &[0, 1, 2, 3, 4, 5], &[0, 1, 2, 3, 4, 5]]),
                shoot_points: vec![
                    (50.0, 40.0),
                    (50.0, 80.0),
                    (50.0, 120.0),
                    (50.0, 160.0),
                    (150.0, 60.0),
                    (150.0, 140.0),
                ],
                tuning: [
                    PhaseTuning { shoot_delay: 60, ..PhaseTuning::default() },
                    PhaseTuning { shoot_delay: 45, escort_delay: Some(180), ..PhaseTuning::default() },
                    PhaseTuning { shoot_delay: 30, escort_delay: Some(120), ..PhaseTuning::default() },
                ],
                weak_point: None,
            },
            BossKind::DeathStar => BossBehavior {
                movement: Movement::Static,
                speed: 0.0,
                attack: AttackPattern::Turrets([&[0, 1, 2, 3], &[0, 1, 2, 3, 4, 5], &[0, 1, 2, 3, 4, 5, 6, 7]]),
                shoot_points: (0..8)
                    .map(|i| {
                        let rad = (45.0 * i as f32).to_radians();
                        (200.0 + rad.cos() * 150.0, 200.0 + rad.sin() * 150.0)
                    })
                    .collect(),
                tuning: [
                    PhaseTuning { shoot_delay: 40, ..PhaseTuning::default() },
                    PhaseTuning { shoot_delay: 35, superlaser_delay: Some(900), ..PhaseTuning::default() },
                    PhaseTuning { shoot_delay: 25, superlaser_delay: Some(480), ..PhaseTuning::default() },
                ],
                weak_point: Some(WeakPoint {
                    offset_x: 80.0,
                    offset_y: 200.0,
                    width: 30.0,
                    height: 30.0,
                    damage_multiplier: 10,
                }),
            },
        }
    }
}

impl FromStr for BossKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TIE_ADVANCED" => Ok(BossKind::TieAdvanced),
            "STAR_DESTROYER" => Ok(BossKind::StarDestroyer),
            "DEATH_STAR" => Ok(BossKind::DeathStar),
            other => Err(ConfigError::UnknownBossType(other.to_string())),
        }
    }
}

// ── Behavior ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Movement {
    Static,
    /// Bounce between the top and bottom padding.
    Vertical,
    /// Sinusoidal oscillation around mid-screen.
    Sine,
    /// Flip direction every `ZIGZAG_FLIP_TICKS`, clamped to the arena.
    Zigzag,
    /// Orbit a fixed point near the right edge.
    Circular,
}

/// Which bolts a volley contains, indexed by boss phase.
#[derive(Clone, Debug, PartialEq)]
pub enum AttackPattern {
    /// Every shoot point fires one bolt per angle (degrees off straight left).
    Spread([&'static [f32]; 3]),
    /// Straight bolts from the listed shoot points only.
    Turrets([&'static [usize]; 3]),
}

/// Values applied when a boss enters a phase. `None` disables the ability.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PhaseTuning {
    pub shoot_delay: u32,
    pub dash_delay: Option<u32>,
    pub escort_delay: Option<u32>,
    pub superlaser_delay: Option<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeakPoint {
    pub offset_x: f32,
    pub offset_y: f32,
    pub width: f32,
    pub height: f32,
    pub damage_multiplier: i32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BossBehavior {
    pub movement: Movement,
    pub speed: f32,
    pub attack: AttackPattern,
    /// Muzzle offsets relative to the boss origin.
    pub shoot_points: Vec<(f32, f32)>,
    pub tuning: [PhaseTuning; 3],
    pub weak_point: Option<WeakPoint>,
}

// ── Abilities ─────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DashState {
    /// Winding up; `elapsed` counts toward the dash delay.
    Charging { elapsed: u32 },
    Dashing { remaining: u32 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DashAttack {
    pub state: DashState,
    pub delay: u32,
    /// Column the boss drifts back to between dashes.
    pub home_x: f32,
}

impl DashAttack {
    pub fn is_dashing(&self) -> bool {
        matches!(self.state, DashState::Dashing { .. })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EscortSpawner {
    pub timer: u32,
    pub delay: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SuperlaserState {
    Idle { elapsed: u32 },
    Charging { elapsed: u32 },
    Firing { remaining: u32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Superlaser {
    pub state: SuperlaserState,
    pub delay: u32,
}

// ── Events ────────────────────────────────────────────────────────────────────

/// Notifications for the presentation layer.
#[derive(Clone, Debug, PartialEq)]
pub enum BossEvent {
    PhaseChanged { kind: BossKind, phase: u8 },
    Damaged { kind: BossKind, hp: i32, max_hp: i32, weak_point: bool },
    Destroyed { kind: BossKind, x: f32, y: f32 },
    DashStarted { kind: BossKind },
    SuperlaserCharging { kind: BossKind },
    SuperlaserFired { kind: BossKind },
}

// ── Boss ──────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Boss {
    pub kind: BossKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub hp: i32,
    pub max_hp: i32,
    /// 0, 1 or 2; only ever increases.
    pub phase: u8,
    pub active: bool,
    pub shoot_timer: u32,
    pub shoot_delay: u32,
    pub move_timer: u64,
    direction: f32,
    wave_offset: f32,
    pub behavior: BossBehavior,
    pub dash: Option<DashAttack>,
    pub escort: Option<EscortSpawner>,
    pub superlaser: Option<Superlaser>,
    events: Vec<BossEvent>,
}

impl Boss {
    /// Build a boss of `kind` at its usual entry point with `hp` hit points.
    pub fn spawn(kind: BossKind, hp: i32, arena_width: f32, arena_height: f32) -> Self {
        let (x, y) = kind.spawn_position(arena_width, arena_height);
        Self::with_behavior(kind, kind.behavior(), x, y, hp)
    }

    pub fn with_behavior(kind: BossKind, behavior: BossBehavior, x: f32, y: f32, hp: i32) -> Self {
        let (width, height) = kind.size();
        let hp = hp.max(1);
        let mut boss = Self {
            kind,
            x,
            y,
            width,
            height,
            hp,
            max_hp: hp,
            phase: 0,
            active: true,
            shoot_timer: 0,
            shoot_delay: 0,
            move_timer: 0,
            direction: 1.0,
            wave_offset: 0.0,
            behavior,
            dash: None,
            escort: None,
            superlaser: None,
            events: Vec::new(),
        };
        boss.apply_tuning(0);
        boss
    }

    pub fn hp_ratio(&self) -> f32 {
        self.hp as f32 / self.max_hp as f32
    }

    /// One simulation step: move, run down cooldowns, escalate, run abilities.
    pub fn update(&mut self, arena_width: f32, arena_height: f32) {
        if !self.active {
            return;
        }
        self.apply_movement(arena_width, arena_height);
        self.shoot_timer = self.shoot_timer.saturating_sub(1);
        self.move_timer += 1;
        self.update_phase();
        self.update_dash();
        self.update_escort();
        self.update_superlaser();
    }

    fn apply_movement(&mut self, arena_width: f32, arena_height: f32) {
        let speed = self.behavior.speed;
        let floor = EDGE_PADDING;
        let ceiling = arena_height - self.height - EDGE_PADDING;
        match self.behavior.movement {
            Movement::Static => {}
            Movement::Vertical => {
                self.y += speed * self.direction;
                if self.y > ceiling || self.y < floor {
                    self.direction = -self.direction;
                }
            }
            Movement::Sine => {
                self.wave_offset += WAVE_FREQUENCY;
                self.y = arena_height / 2.0 + self.wave_offset.sin() * WAVE_AMPLITUDE;
            }
            Movement::Zigzag => {
                if self.move_timer % ZIGZAG_FLIP_TICKS == 0 {
                    self.direction = -self.direction;
                }
                self.y += speed * self.direction * 2.0;
                self.y = self.y.min(ceiling).max(floor);
            }
            Movement::Circular => {
                self.wave_offset += WAVE_FREQUENCY;
                let center_x = arena_width - 250.0;
                let center_y = arena_height / 2.0;
                self.x = center_x + self.wave_offset.cos() * ORBIT_RADIUS;
                self.y = center_y + self.wave_offset.sin() * ORBIT_RADIUS;
            }
        }
    }

    /// Re-derive the phase from the hp ratio. Monotonic: a higher ratio never
    /// lowers the phase.
    pub fn update_phase(&mut self) {
        let ratio = self.hp_ratio();
        let target = if ratio <= PHASE_2_THRESHOLD {
            2
        } else if ratio <= PHASE_1_THRESHOLD {
            1
        } else {
            0
        };
        if target > self.phase {
            self.phase = target;
            tracing::debug!(boss = self.kind.name(), phase = target, "boss phase changed");
            self.apply_tuning(target);
            self.events.push(BossEvent::PhaseChanged { kind: self.kind, phase: target });
        }
    }

    fn apply_tuning(&mut self, phase: u8) {
        let tuning = self.behavior.tuning[phase as usize];
        self.shoot_delay = tuning.shoot_delay;

        match (tuning.dash_delay, self.dash.as_mut()) {
            (Some(delay), Some(dash)) => dash.delay = delay,
            (Some(delay), None) => {
                self.dash = Some(DashAttack {
                    state: DashState::Charging { elapsed: 0 },
                    delay,
                    home_x: self.x,
                })
            }
            (None, _) => self.dash = None,
        }

        match (tuning.escort_delay, self.escort.as_mut()) {
            (Some(delay), Some(escort)) => escort.delay = delay,
            (Some(delay), None) => self.escort = Some(EscortSpawner { timer: 0, delay }),
            (None, _) => self.escort = None,
        }

        match (tuning.superlaser_delay, self.superlaser.as_mut()) {
            (Some(delay), Some(laser)) => laser.delay = delay,
            (Some(delay), None) => {
                self.superlaser = Some(Superlaser {
                    state: SuperlaserState::Idle { elapsed: 0 },
                    delay,
                })
            }
            (None, _) => self.superlaser = None,
        }
    }

    fn update_dash(&mut self) {
        let Some(dash) = self.dash.as_mut() else {
            return;
        };
        match dash.state {
            DashState::Dashing { remaining } => {
                self.x -= DASH_SPEED;
                dash.state = if remaining <= 1 {
                    DashState::Charging { elapsed: 0 }
                } else {
                    DashState::Dashing { remaining: remaining - 1 }
                };
            }
            DashState::Charging { elapsed } => {
                // Drift back to the home column after a dash.
                if self.x < dash.home_x {
                    self.x = (self.x + self.behavior.speed).min(dash.home_x);
                }
                let elapsed = elapsed + 1;
                if elapsed >= dash.delay {
                    dash.state = DashState::Dashing { remaining: DASH_DURATION };
                    tracing::debug!(boss = self.kind.name(), "dash attack");
                    self.events.push(BossEvent::DashStarted { kind: self.kind });
                } else {
                    dash.state = DashState::Charging { elapsed };
                }
            }
        }
    }

    fn update_escort(&mut self) {
        if let Some(escort) = self.escort.as_mut() {
            escort.timer += 1;
        }
    }

    /// True once per escort interval; resets the escort timer when it fires.
    pub fn take_escort_spawn(&mut self) -> bool {
        if !self.active {
            return false;
        }
        match self.escort.as_mut() {
            Some(escort) if escort.timer >= escort.delay => {
                escort.timer = 0;
                true
            }
            _ => false,
        }
    }

    fn update_superlaser(&mut self) {
        let Some(laser) = self.superlaser.as_mut() else {
            return;
        };
        laser.state = match laser.state {
            SuperlaserState::Idle { elapsed } => {
                let elapsed = elapsed + 1;
                if elapsed >= laser.delay {
                    tracing::debug!(boss = self.kind.name(), "superlaser charging");
                    self.events.push(BossEvent::SuperlaserCharging { kind: self.kind });
                    SuperlaserState::Charging { elapsed: 0 }
                } else {
                    SuperlaserState::Idle { elapsed }
                }
            }
            SuperlaserState::Charging { elapsed } => {
                let elapsed = elapsed + 1;
                if elapsed >= SUPERLASER_CHARGE_TICKS {
                    tracing::debug!(boss = self.kind.name(), "superlaser fired");
                    self.events.push(BossEvent::SuperlaserFired { kind: self.kind });
                    SuperlaserState::Firing { remaining: SUPERLASER_FIRE_TICKS }
                } else {
                    SuperlaserState::Charging { elapsed }
                }
            }
            SuperlaserState::Firing { remaining } => {
                if remaining <= 1 {
                    SuperlaserState::Idle { elapsed: 0 }
                } else {
                    SuperlaserState::Firing { remaining: remaining - 1 }
                }
            }
        };
    }

    pub fn is_superlaser_firing(&self) -> bool {
        self.active
            && matches!(
                self.superlaser.map(|l| l.state),
                Some(SuperlaserState::Firing { .. })
            )
    }

    /// Horizontal band swept by the superlaser, from the left edge to the boss.
    pub fn superlaser_band(&self) -> Option<Rect> {
        if !self.is_superlaser_firing() {
            return None;
        }
        Some(Rect::new(
            0.0,
            self.y + self.height / 2.0,
            self.x,
            SUPERLASER_BAND_HEIGHT,
        ))
    }

    /// Fire a volley if the cooldown has elapsed; empty otherwise.
    pub fn shoot(&mut self, bullet_speed: f32) -> Vec<Projectile> {
        if self.shoot_timer > 0 || !self.active {
            return Vec::new();
        }
        self.shoot_timer = self.shoot_delay;

        let phase = self.phase as usize;
        let mut bullets = Vec::new();
        match &self.behavior.attack {
            AttackPattern::Spread(angles) => {
                for &(ox, oy) in &self.behavior.shoot_points {
                    for &angle in angles[phase] {
                        bullets.push(Projectile::hostile_angled(
                            self.x + ox,
                            self.y + oy,
                            bullet_speed,
                            angle,
                        ));
                    }
                }
            }
            AttackPattern::Turrets(active) => {
                for &index in active[phase] {
                    if let Some(&(ox, oy)) = self.behavior.shoot_points.get(index) {
                        bullets.push(Projectile::hostile(self.x + ox, self.y + oy, bullet_speed));
                    }
                }
            }
        }
        bullets
    }

    /// Returns `true` only on the hit that destroys the boss.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        self.apply_damage(amount, false)
    }

    /// Damage through the weak point, scaled by its multiplier.
    pub fn take_weak_point_damage(&mut self, amount: i32) -> bool {
        let multiplier = self.behavior.weak_point.map_or(1, |w| w.damage_multiplier);
        self.apply_damage(amount * multiplier, true)
    }

    fn apply_damage(&mut self, amount: i32, weak_point: bool) -> bool {
        if !self.active {
            return false;
        }
        self.hp = (self.hp - amount).max(0);
        if self.hp == 0 {
            self.destroy();
            return true;
        }
        self.events.push(BossEvent::Damaged {
            kind: self.kind,
            hp: self.hp,
            max_hp: self.max_hp,
            weak_point,
        });
        self.update_phase();
        false
    }

    /// Mark the boss inactive. A second call is a no-op.
    pub fn destroy(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        self.events.push(BossEvent::Destroyed { kind: self.kind, x: self.x, y: self.y });
    }

    pub fn weak_point_rect(&self) -> Option<Rect> {
        self.behavior.weak_point.map(|w| {
            Rect::new(self.x + w.offset_x, self.y + w.offset_y, w.width, w.height)
        })
    }

    pub fn is_weak_point_hit(&self, other: &Rect) -> bool {
        self.active
            && self
                .weak_point_rect()
                .is_some_and(|weak| weak.intersects(other))
    }

    pub fn is_dashing(&self) -> bool {
        self.dash.is_some_and(|d| d.is_dashing())
    }

    pub fn drain_events(&mut self) -> Vec<BossEvent> {
        std::mem::take(&mut self.events)
    }
}

impl Entity for Boss {
    /// The hull, widened while a dash is in progress.
    fn bounds(&self) -> Rect {
        let hull = Rect::new(self.x, self.y, self.width, self.height);
        if self.is_dashing() {
            hull.inflate(DASH_REACH)
        } else {
            hull
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
