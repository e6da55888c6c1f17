//! Game entity types and the session that owns them.
//!
//! Entities carry their own small update rules (movement, timers, damage);
//! everything that spans more than one collection lives in `compute` and
//! `collision`.

use std::str::FromStr;

use crate::boss::{Boss, BossEvent};
use crate::config::{
    self, Difficulty, DifficultyLevel, GameConfig, BOUNDARY_MARGIN, BULLET_DAMAGE, BULLET_HEIGHT,
    BULLET_SPEED, BULLET_WIDTH, ENEMY_BULLET_DAMAGE, ENEMY_HEIGHT, ENEMY_SHOOT_DELAY, ENEMY_SPEED,
    ENEMY_WIDTH, FRICTION, HIT_INVULNERABILITY, PICKUP_DRIFT, PICKUP_LIFETIME, PICKUP_SIZE,
    PLAYER_HEIGHT, PLAYER_MAX_HP, PLAYER_SHOOT_DELAY, PLAYER_SPAWN_X, PLAYER_WIDTH,
    RESPAWN_INVULNERABILITY,
};
use crate::error::ConfigError;
use crate::phase::PhaseManager;
use crate::powerup::PowerUpKind;

/// How far past the arena edge a projectile may travel before it is dropped.
const OFFSCREEN_SLACK: f32 = 50.0;

// ── Geometry ──────────────────────────────────────────────────────────────────

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Strict overlap on both axes; touching edges do not count.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }

    /// Grow the box by `margin` on every side.
    pub fn inflate(&self, margin: f32) -> Rect {
        Rect {
            x: self.x - margin,
            y: self.y - margin,
            width: self.width + margin * 2.0,
            height: self.height + margin * 2.0,
        }
    }
}

/// Capability shared by everything that takes part in collision checks.
pub trait Entity {
    fn bounds(&self) -> Rect;
    fn is_active(&self) -> bool;
}

/// A bare box (a beam band, a probe) always takes part.
impl Entity for Rect {
    fn bounds(&self) -> Rect {
        *self
    }

    fn is_active(&self) -> bool {
        true
    }
}

// ── Top-level state ───────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameState {
    Menu,
    DifficultySelect,
    Playing,
    BossIntro,
    BossFight,
    PhaseComplete,
    Paused,
    GameOver,
    Victory,
}

// ── Input ─────────────────────────────────────────────────────────────────────

/// Keys currently held down.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeldKeys {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub shoot: bool,
}

/// Edge-triggered actions, delivered once per key press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputAction {
    Confirm,
    Pause,
    Restart,
    OpenDifficulty,
    ChooseDifficulty(DifficultyLevel),
    Back,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputSnapshot {
    pub held: HeldKeys,
    pub pressed: Vec<InputAction>,
}

impl InputSnapshot {
    pub fn holding(held: HeldKeys) -> Self {
        Self { held, pressed: Vec::new() }
    }

    pub fn press(action: InputAction) -> Self {
        Self { held: HeldKeys::default(), pressed: vec![action] }
    }
}

// ── Presentation events ───────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SoundId {
    Shoot,
    Explosion,
    PlayerHit,
    PowerUp,
    Death,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParticleKind {
    Explosion,
    Sparks,
    Pickup,
}

/// Fire-and-forget notifications for the presentation layer. The core never
/// reads them back.
#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    Sound { id: SoundId, volume: f32 },
    Particles { kind: ParticleKind, x: f32, y: f32 },
    Boss(BossEvent),
    StateChanged { from: GameState, to: GameState },
}

// ── Projectiles ───────────────────────────────────────────────────────────────

/// Which side fired a projectile; decides the collision checks it takes part in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Friend,
    Foe,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Projectile {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub vx: f32,
    pub vy: f32,
    pub damage: i32,
    pub side: Side,
    pub active: bool,
}

impl Projectile {
    /// A player bolt flying right.
    pub fn friendly(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            width: BULLET_WIDTH,
            height: BULLET_HEIGHT,
            vx: BULLET_SPEED,
            vy: 0.0,
            damage: BULLET_DAMAGE,
            side: Side::Friend,
            active: true,
        }
    }

    /// An enemy bolt flying left at `speed`.
    pub fn hostile(x: f32, y: f32, speed: f32) -> Self {
        Self {
            vx: -speed,
            damage: ENEMY_BULLET_DAMAGE,
            side: Side::Foe,
            ..Self::friendly(x, y)
        }
    }

    /// An enemy bolt deflected by `angle` degrees from straight left.
    pub fn hostile_angled(x: f32, y: f32, speed: f32, angle: f32) -> Self {
        let mut bullet = Self::hostile(x, y, speed);
        if angle != 0.0 {
            let rad = angle.to_radians() + std::f32::consts::PI;
            bullet.vx = rad.cos() * speed;
            bullet.vy = rad.sin() * speed;
        }
        bullet
    }

    pub fn update(&mut self) {
        self.x += self.vx;
        self.y += self.vy;
    }

    pub fn is_off_screen(&self, arena_width: f32, arena_height: f32) -> bool {
        self.x > arena_width + OFFSCREEN_SLACK
            || self.x < -OFFSCREEN_SLACK
            || self.y > arena_height + OFFSCREEN_SLACK
            || self.y < -OFFSCREEN_SLACK
    }

    pub fn destroy(&mut self) {
        self.active = false;
    }
}

impl Entity for Projectile {
    fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

// ── Enemies ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnemyKind {
    TieFighter,
    TieInterceptor,
}

impl EnemyKind {
    pub fn base_speed(self) -> f32 {
        match self {
            EnemyKind::TieFighter => ENEMY_SPEED,
            EnemyKind::TieInterceptor => ENEMY_SPEED * 1.5,
        }
    }

    pub fn base_hp(self) -> i32 {
        match self {
            EnemyKind::TieFighter => 10,
            EnemyKind::TieInterceptor => 15,
        }
    }

    /// Score awarded per enemy destroyed.
    pub fn score_value(self) -> u32 {
        match self {
            EnemyKind::TieFighter => config::SCORE_TIE_FIGHTER,
            EnemyKind::TieInterceptor => config::SCORE_TIE_INTERCEPTOR,
        }
    }
}

impl FromStr for EnemyKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TIE_FIGHTER" => Ok(EnemyKind::TieFighter),
            "TIE_INTERCEPTOR" => Ok(EnemyKind::TieInterceptor),
            other => Err(ConfigError::UnknownEnemyType(other.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub kind: EnemyKind,
    pub speed: f32,
    pub hp: i32,
    pub shoot_timer: u32,
    pub shoot_delay: u32,
    pub active: bool,
}

impl Enemy {
    pub fn new(kind: EnemyKind, x: f32, y: f32, difficulty: &Difficulty) -> Self {
        Self {
            x,
            y,
            width: ENEMY_WIDTH,
            height: ENEMY_HEIGHT,
            kind,
            speed: kind.base_speed() * difficulty.enemy_speed_multiplier,
            hp: kind.base_hp(),
            shoot_timer: 0,
            shoot_delay: (ENEMY_SHOOT_DELAY as f32 * difficulty.enemy_fire_rate_multiplier).round()
                as u32,
            active: true,
        }
    }

    /// Fly left and count down the shot cooldown.
    pub fn update(&mut self) {
        self.x -= self.speed;
        self.shoot_timer = self.shoot_timer.saturating_sub(1);
    }

    /// Past the left edge with room to spare.
    pub fn is_off_screen(&self) -> bool {
        self.x < -self.width - OFFSCREEN_SLACK
    }

    /// Cooldown elapsed and far enough inside the arena to open fire.
    pub fn ready_to_fire(&self, arena_width: f32) -> bool {
        self.active && self.shoot_timer == 0 && self.x < arena_width - config::ENEMY_FIRE_INSET
    }

    /// Three-bolt volley staggered ahead of the fighter.
    pub fn shoot(&mut self, bullet_speed: f32) -> Vec<Projectile> {
        if !self.active || self.shoot_timer > 0 {
            return Vec::new();
        }
        self.shoot_timer = self.shoot_delay;
        vec![
            Projectile::hostile(self.x - 100.0, self.y + 20.0, bullet_speed),
            Projectile::hostile(self.x - 200.0, self.y + 40.0, bullet_speed),
            Projectile::hostile(self.x, self.y + 60.0, bullet_speed),
        ]
    }

    /// Returns `true` only on the hit that destroys the enemy.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        if !self.active {
            return false;
        }
        self.hp = (self.hp - amount).max(0);
        if self.hp == 0 {
            self.destroy();
            return true;
        }
        false
    }

    pub fn destroy(&mut self) {
        self.active = false;
    }
}

impl Entity for Enemy {
    fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

// ── Power-up pickups ──────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct PowerUpPickup {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub kind: PowerUpKind,
    /// Ticks left before the pickup vanishes uncollected.
    pub lifetime: u32,
    pub active: bool,
}

impl PowerUpPickup {
    pub fn new(kind: PowerUpKind, x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            width: PICKUP_SIZE,
            height: PICKUP_SIZE,
            kind,
            lifetime: PICKUP_LIFETIME,
            active: true,
        }
    }

    pub fn update(&mut self, arena_height: f32) {
        self.y += PICKUP_DRIFT;
        self.lifetime = self.lifetime.saturating_sub(1);
        if self.lifetime == 0 || self.y > arena_height + OFFSCREEN_SLACK {
            self.active = false;
        }
    }

    /// Blink window before expiry, for the renderer.
    pub fn is_expiring(&self) -> bool {
        self.lifetime < 120
    }

    pub fn collect(&mut self) {
        self.active = false;
    }
}

impl Entity for PowerUpPickup {
    fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

// ── Player ────────────────────────────────────────────────────────────────────

/// A timed power-up attached to the player. At most one per kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActivePowerUp {
    pub kind: PowerUpKind,
    pub remaining: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub vel_x: f32,
    pub vel_y: f32,
    pub speed: f32,
    pub hp: i32,
    pub max_hp: i32,
    pub lives: u32,
    /// Ticks of post-hit (or post-respawn) invulnerability left.
    pub invulnerability: u32,
    pub is_dead: bool,
    pub shoot_cooldown: u32,
    pub active_power_ups: Vec<ActivePowerUp>,
}

impl Player {
    pub fn new(difficulty: &Difficulty, arena_height: f32) -> Self {
        Self {
            x: PLAYER_SPAWN_X,
            y: arena_height / 2.0 - PLAYER_HEIGHT / 2.0,
            width: PLAYER_WIDTH,
            height: PLAYER_HEIGHT,
            vel_x: 0.0,
            vel_y: 0.0,
            speed: difficulty.player_speed,
            hp: PLAYER_MAX_HP,
            max_hp: PLAYER_MAX_HP,
            lives: difficulty.player_lives,
            invulnerability: 0,
            is_dead: false,
            shoot_cooldown: 0,
            active_power_ups: Vec::new(),
        }
    }

    /// Top speed, raised while a speed boost is active.
    pub fn max_speed(&self) -> f32 {
        if self.has_power_up(PowerUpKind::SpeedBoost) {
            self.speed * 1.5
        } else {
            self.speed
        }
    }

    /// Accelerate toward held directions, damp with friction, clamp to the
    /// arena and run down every timer.
    pub fn update(&mut self, keys: &HeldKeys, arena_width: f32, arena_height: f32) {
        if self.is_dead {
            return;
        }

        let top = self.max_speed();
        if keys.right && self.vel_x < top {
            self.vel_x += 1.0;
        }
        if keys.left && self.vel_x > -top {
            self.vel_x -= 1.0;
        }
        if keys.down && self.vel_y < top {
            self.vel_y += 1.0;
        }
        if keys.up && self.vel_y > -top {
            self.vel_y -= 1.0;
        }

        self.vel_x *= FRICTION;
        self.vel_y *= FRICTION;
        self.x += self.vel_x;
        self.y += self.vel_y;
        self.apply_boundaries(arena_width, arena_height);

        self.shoot_cooldown = self.shoot_cooldown.saturating_sub(1);
        self.invulnerability = self.invulnerability.saturating_sub(1);
        self.tick_power_ups();
    }

    fn apply_boundaries(&mut self, arena_width: f32, arena_height: f32) {
        let max_x = arena_width - self.width - BOUNDARY_MARGIN;
        let max_y = arena_height - self.height - BOUNDARY_MARGIN;

        if self.x > max_x {
            self.x = max_x;
            self.vel_x = 0.0;
        } else if self.x < BOUNDARY_MARGIN {
            self.x = BOUNDARY_MARGIN;
            self.vel_x = 0.0;
        }

        if self.y > max_y {
            self.y = max_y;
            self.vel_y = 0.0;
        } else if self.y < BOUNDARY_MARGIN {
            self.y = BOUNDARY_MARGIN;
            self.vel_y = 0.0;
        }
    }

    /// Fire from the wing cannons. Empty while cooling down or dead.
    pub fn shoot(&mut self) -> Vec<Projectile> {
        if self.shoot_cooldown > 0 || self.is_dead {
            return Vec::new();
        }
        self.shoot_cooldown = PLAYER_SHOOT_DELAY;

        let nose = self.x + self.width;
        if self.has_power_up(PowerUpKind::QuadShot) {
            vec![
                Projectile::friendly(nose, self.y + 10.0),
                Projectile::friendly(nose, self.y + 30.0),
                Projectile::friendly(nose, self.y + self.height - 40.0),
                Projectile::friendly(nose, self.y + self.height - 20.0),
            ]
        } else {
            // Dual shot and the stock cannons share the same pair of bolts.
            vec![
                Projectile::friendly(nose, self.y + 20.0),
                Projectile::friendly(nose, self.y + self.height - 30.0),
            ]
        }
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerability > 0
            || self.has_power_up(PowerUpKind::EnergyShield)
            || self.has_power_up(PowerUpKind::PhaseCloak)
    }

    /// Apply damage and return how much actually landed. A hit that does not
    /// kill opens the invulnerability window; a killing hit costs a life.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        if self.is_invulnerable() || self.is_dead || amount <= 0 {
            return 0;
        }
        let applied = amount.min(self.hp);
        self.hp -= applied;
        if self.hp == 0 {
            self.die();
        } else {
            self.invulnerability = HIT_INVULNERABILITY;
        }
        applied
    }

    pub fn heal(&mut self, amount: i32) {
        self.hp = (self.hp + amount).min(self.max_hp);
    }

    fn die(&mut self) {
        self.is_dead = true;
        self.lives = self.lives.saturating_sub(1);
    }

    /// Bring the ship back if a life remains. Returns `false` when out of lives.
    pub fn respawn(&mut self, arena_height: f32) -> bool {
        if self.lives == 0 {
            return false;
        }
        self.hp = self.max_hp;
        self.is_dead = false;
        self.x = PLAYER_SPAWN_X;
        self.y = arena_height / 2.0 - self.height / 2.0;
        self.vel_x = 0.0;
        self.vel_y = 0.0;
        self.invulnerability = RESPAWN_INVULNERABILITY;
        true
    }

    /// Attach a timed power-up; collecting an active kind again refreshes it.
    pub fn add_power_up(&mut self, kind: PowerUpKind, duration: u32) {
        match self.active_power_ups.iter_mut().find(|p| p.kind == kind) {
            Some(existing) => existing.remaining = duration,
            None => self.active_power_ups.push(ActivePowerUp { kind, remaining: duration }),
        }
    }

    pub fn has_power_up(&self, kind: PowerUpKind) -> bool {
        self.active_power_ups.iter().any(|p| p.kind == kind)
    }

    fn tick_power_ups(&mut self) {
        for p in &mut self.active_power_ups {
            p.remaining = p.remaining.saturating_sub(1);
        }
        self.active_power_ups.retain(|p| {
            if p.remaining == 0 {
                tracing::debug!(kind = ?p.kind, "power-up expired");
            }
            p.remaining > 0
        });
    }

    pub fn hp_ratio(&self) -> f32 {
        self.hp as f32 / self.max_hp as f32
    }
}

impl Entity for Player {
    fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    fn is_active(&self) -> bool {
        !self.is_dead
    }
}

// ── Session ───────────────────────────────────────────────────────────────────

/// One game session: the single owner of every entity collection. Built by
/// `compute::init_session` and advanced by `compute::tick`.
#[derive(Clone, Debug)]
pub struct GameSession {
    pub config: GameConfig,
    pub difficulty: Difficulty,
    pub state: GameState,
    /// State to return to when leaving `Paused`.
    pub previous_state: Option<GameState>,
    pub frame: u64,
    pub score: u32,
    pub player: Player,
    pub player_bullets: Vec<Projectile>,
    pub enemy_bullets: Vec<Projectile>,
    pub enemies: Vec<Enemy>,
    pub power_ups: Vec<PowerUpPickup>,
    pub boss: Option<Boss>,
    pub phase_manager: PhaseManager,
    /// Presentation events produced since the front end last drained them.
    pub events: Vec<GameEvent>,
}

impl GameSession {
    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn add_score(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    pub fn arena(&self) -> (f32, f32) {
        (self.config.arena_width, self.config.arena_height)
    }
}
