//! Session construction and the per-tick simulation.
//!
//! `tick` is the only entry point the front end needs: it applies the
//! edge-triggered input actions, then advances the session by one fixed step
//! according to the top-level state. All randomness comes through the injected
//! `rng`, so a seeded RNG reproduces a whole run.

use rand::Rng;

use crate::boss::Boss;
use crate::collision;
use crate::config::{Difficulty, GameConfig, ENEMY_BULLET_SPEED};
use crate::entities::{
    Enemy, EnemyKind, GameEvent, GameSession, GameState, HeldKeys, InputAction, InputSnapshot,
    ParticleKind, Player, SoundId,
};
use crate::phase::{Objective, PhaseManager, PhaseSignal};

/// Spawned enemies keep this far from the top and bottom edges.
const SPAWN_TOP: f32 = 50.0;
const SPAWN_BOTTOM_GAP: f32 = 150.0;

// ── Constructors ─────────────────────────────────────────────────────────────

/// A fresh session parked on the main menu.
pub fn init_session(config: GameConfig, difficulty: Difficulty) -> GameSession {
    let player = Player::new(&difficulty, config.arena_height);
    let phase_manager = PhaseManager::new(&config);
    GameSession {
        config,
        difficulty,
        state: GameState::Menu,
        previous_state: None,
        frame: 0,
        score: 0,
        player,
        player_bullets: Vec::new(),
        enemy_bullets: Vec::new(),
        enemies: Vec::new(),
        power_ups: Vec::new(),
        boss: None,
        phase_manager,
        events: Vec::new(),
    }
}

/// Clear everything a run accumulates. Difficulty and config survive.
pub fn reset(session: &mut GameSession) {
    session.frame = 0;
    session.score = 0;
    session.player = Player::new(&session.difficulty, session.config.arena_height);
    session.player_bullets.clear();
    session.enemy_bullets.clear();
    session.enemies.clear();
    session.power_ups.clear();
    session.boss = None;
    session.phase_manager = PhaseManager::new(&session.config);
}

/// Reset and load the first phase.
pub fn start_game(session: &mut GameSession) {
    reset(session);
    tracing::info!(difficulty = session.difficulty.name, "starting game");
    let signal = session.phase_manager.start_first_phase(session.player.hp);
    apply_signal(session, signal);
}

// ── State machine ────────────────────────────────────────────────────────────

pub fn set_state(session: &mut GameSession, state: GameState) {
    let from = session.state;
    tracing::info!(?from, to = ?state, "state change");
    session.previous_state = Some(from);
    session.state = state;
    session.emit(GameEvent::StateChanged { from, to: state });
}

/// Apply one edge-triggered action. Actions that mean nothing in the current
/// state are ignored.
pub fn handle_input(session: &mut GameSession, action: InputAction) {
    match (session.state, action) {
        (GameState::Menu, InputAction::Confirm) => start_game(session),
        (GameState::Menu, InputAction::OpenDifficulty) => {
            set_state(session, GameState::DifficultySelect)
        }
        (GameState::DifficultySelect, InputAction::ChooseDifficulty(level)) => {
            session.difficulty = level.settings();
            tracing::info!(difficulty = session.difficulty.name, "difficulty selected");
            set_state(session, GameState::Menu);
        }
        (GameState::DifficultySelect, InputAction::Back | InputAction::Confirm) => {
            set_state(session, GameState::Menu)
        }
        (GameState::Playing | GameState::BossFight, InputAction::Pause) => {
            set_state(session, GameState::Paused)
        }
        (GameState::Paused, InputAction::Pause) => {
            let resume = session.previous_state.unwrap_or(GameState::Playing);
            set_state(session, resume);
        }
        (GameState::GameOver | GameState::Victory, InputAction::Restart) => {
            reset(session);
            set_state(session, GameState::Menu);
        }
        _ => {}
    }
}

/// Carry out what the phase manager asked for.
fn apply_signal(session: &mut GameSession, signal: PhaseSignal) {
    match signal {
        PhaseSignal::Enter(GameState::BossFight) => match session.phase_manager.objective() {
            Some(Objective::Boss { kind, hp }) => {
                let (width, height) = session.arena();
                let hp = (hp as f32 * session.difficulty.boss_hp_multiplier).round() as i32;
                let boss = Boss::spawn(kind, hp, width, height);
                tracing::info!(boss = kind.name(), hp = boss.hp, "boss spawned");
                session.boss = Some(boss);
                set_state(session, GameState::BossFight);
            }
            other => {
                tracing::error!(objective = ?other, "boss fight without a boss; skipping phase");
                let next = session.phase_manager.next_phase(session.player.hp);
                apply_signal(session, next);
            }
        },
        PhaseSignal::Enter(state) => set_state(session, state),
        // The overlay runs from a non-gameplay state so nothing moves under it.
        PhaseSignal::Overlay(kind) => {
            tracing::debug!(?kind, "overlay without state change");
            if !matches!(session.state, GameState::PhaseComplete | GameState::BossIntro) {
                set_state(session, GameState::PhaseComplete);
            }
        }
    }
}

// ── Per-tick update ──────────────────────────────────────────────────────────

/// Advance the session by one fixed step.
pub fn tick(session: &mut GameSession, input: &InputSnapshot, rng: &mut impl Rng) {
    for &action in &input.pressed {
        handle_input(session, action);
    }

    match session.state {
        GameState::Playing => {
            session.frame += 1;
            update_playing(session, &input.held, rng);
        }
        GameState::BossFight => {
            session.frame += 1;
            update_boss_fight(session, &input.held, rng);
        }
        GameState::BossIntro | GameState::PhaseComplete => {
            session.frame += 1;
            advance_transition(session);
        }
        GameState::Menu
        | GameState::DifficultySelect
        | GameState::Paused
        | GameState::GameOver
        | GameState::Victory => {}
    }
}

fn advance_transition(session: &mut GameSession) {
    if let Some(signal) = session.phase_manager.update_transition(session.player.hp) {
        apply_signal(session, signal);
    }
}

/// One gameplay step. The order matters: later steps see the results of
/// earlier ones within the same tick.
pub fn update_playing(session: &mut GameSession, held: &HeldKeys, rng: &mut impl Rng) {
    let (width, height) = session.arena();

    // ── 1. Overlay holds the frame ───────────────────────────────────────────
    if session.phase_manager.is_transitioning() {
        advance_transition(session);
        return;
    }

    // ── 2. Phase clock ───────────────────────────────────────────────────────
    session.phase_manager.update_stats();

    // ── 3. Player ────────────────────────────────────────────────────────────
    session.player.update(held, width, height);
    if held.shoot {
        let shots = session.player.shoot();
        if !shots.is_empty() {
            session.player_bullets.extend(shots);
            session.emit(GameEvent::Sound { id: SoundId::Shoot, volume: 0.3 });
        }
    }

    // ── 4. Player bullets ────────────────────────────────────────────────────
    for bullet in &mut session.player_bullets {
        bullet.update();
    }
    session
        .player_bullets
        .retain(|b| b.active && !b.is_off_screen(width, height));

    // ── 5. Wave spawns ───────────────────────────────────────────────────────
    if let Some(kind) = session.phase_manager.spawn_due(session.frame) {
        spawn_enemy(session, kind, rng);
        session.phase_manager.record_enemy_spawned();
    }

    // ── 6. Enemies ───────────────────────────────────────────────────────────
    let bullet_speed = ENEMY_BULLET_SPEED * session.difficulty.bullet_speed_multiplier;
    for enemy in &mut session.enemies {
        enemy.update();
        if enemy.ready_to_fire(width) {
            session.enemy_bullets.extend(enemy.shoot(bullet_speed));
        }
    }
    let escaped = session.enemies.iter().filter(|e| e.is_off_screen()).count();
    for _ in 0..escaped {
        session.phase_manager.record_enemy_escaped();
    }
    session.enemies.retain(|e| e.active && !e.is_off_screen());

    // ── 7. Enemy bullets ─────────────────────────────────────────────────────
    for bullet in &mut session.enemy_bullets {
        bullet.update();
    }
    session
        .enemy_bullets
        .retain(|b| b.active && !b.is_off_screen(width, height));

    // ── 8. Pickups ───────────────────────────────────────────────────────────
    for pickup in &mut session.power_ups {
        pickup.update(height);
    }
    session.power_ups.retain(|p| p.active);

    // ── 9. Collisions ────────────────────────────────────────────────────────
    collision::resolve_collisions(session, rng);

    // ── 10. Wave cleared ─────────────────────────────────────────────────────
    if session.phase_manager.is_phase_complete() {
        complete_current_phase(session);
    }

    // ── 11. Death ────────────────────────────────────────────────────────────
    if session.player.is_dead {
        handle_player_death(session);
    }
}

/// Boss step, then the regular gameplay step, then the boss hit checks and
/// any death they caused.
pub fn update_boss_fight(session: &mut GameSession, held: &HeldKeys, rng: &mut impl Rng) {
    let (width, height) = session.arena();

    if !session.phase_manager.is_transitioning() {
        let bullet_speed = ENEMY_BULLET_SPEED * session.difficulty.bullet_speed_multiplier;
        let mut escort_due = false;
        if let Some(boss) = session.boss.as_mut().filter(|b| b.active) {
            boss.update(width, height);
            session.enemy_bullets.extend(boss.shoot(bullet_speed));
            escort_due = boss.take_escort_spawn();
        }
        if escort_due {
            spawn_enemy(session, EnemyKind::TieFighter, rng);
        }
        collision::superlaser_sweep(session);
    }

    update_playing(session, held, rng);

    if session.state == GameState::BossFight && !session.phase_manager.is_transitioning() {
        if collision::resolve_boss_collisions(session) {
            forward_boss_events(session);
            on_boss_defeated(session);
        } else if session.player.is_dead {
            // Rammed after the gameplay step already checked for death.
            handle_player_death(session);
        }
    }
    forward_boss_events(session);
}

fn forward_boss_events(session: &mut GameSession) {
    let events = session
        .boss
        .as_mut()
        .map(Boss::drain_events)
        .unwrap_or_default();
    session.events.extend(events.into_iter().map(GameEvent::Boss));
}

/// Award the boss, sweep the arena and close the phase.
pub fn on_boss_defeated(session: &mut GameSession) {
    let Some(boss) = session.boss.take() else {
        return;
    };
    tracing::info!(boss = boss.kind.name(), "boss defeated");
    session.add_score(boss.kind.score_value());
    session.emit(GameEvent::Sound { id: SoundId::Explosion, volume: 1.0 });
    session.emit(GameEvent::Particles { kind: ParticleKind::Explosion, x: boss.x, y: boss.y });
    complete_current_phase(session);
}

/// Award the phase bonus, clear the field and start the phase-complete overlay.
fn complete_current_phase(session: &mut GameSession) {
    let bonus = session.phase_manager.complete_phase();
    session.add_score(bonus);
    session.enemies.clear();
    session.enemy_bullets.clear();
    session.player_bullets.clear();
    set_state(session, GameState::PhaseComplete);
}

/// Spend a life, or start the game-over overlay when none are left.
fn handle_player_death(session: &mut GameSession) {
    let (x, y) = (session.player.x, session.player.y);
    session.emit(GameEvent::Sound { id: SoundId::Death, volume: 0.8 });
    session.emit(GameEvent::Particles { kind: ParticleKind::Explosion, x, y });

    let height = session.config.arena_height;
    if session.player.respawn(height) {
        tracing::info!(lives = session.player.lives, "player respawned");
    } else {
        tracing::info!(score = session.score, "out of lives");
        session.phase_manager.begin_game_over();
    }
}

fn spawn_enemy(session: &mut GameSession, kind: EnemyKind, rng: &mut impl Rng) {
    let (width, height) = session.arena();
    let bottom = (height - SPAWN_BOTTOM_GAP).max(SPAWN_TOP + 1.0);
    let y = rng.gen_range(SPAWN_TOP..bottom);
    session
        .enemies
        .push(Enemy::new(kind, width, y, &session.difficulty));
}
