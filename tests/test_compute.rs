use rand::rngs::StdRng;
use rand::SeedableRng;

use star_assault::compute::*;
use star_assault::config::{Difficulty, DifficultyLevel, GameConfig, PhaseDescriptor, PhaseKind};
use star_assault::entities::*;

fn make_session() -> GameSession {
    init_session(GameConfig::default(), Difficulty::default())
}

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn idle(session: &mut GameSession, rng: &mut StdRng, ticks: u32) {
    let input = InputSnapshot::default();
    for _ in 0..ticks {
        tick(session, &input, rng);
    }
}

fn press(session: &mut GameSession, rng: &mut StdRng, action: InputAction) {
    tick(session, &InputSnapshot::press(action), rng);
}

/// A session with a single TIE Advanced phase, one tick into the fight.
fn boss_fight_session(rng: &mut StdRng) -> GameSession {
    let phases = vec![PhaseDescriptor {
        id: 1,
        name: "Vader".to_string(),
        objective: "Win".to_string(),
        kind: PhaseKind::BossFight { boss_type: "TIE_ADVANCED".to_string(), boss_hp: 300 },
    }];
    let config = GameConfig { phases, ..GameConfig::default() };
    let mut s = init_session(config, Difficulty::default());
    press(&mut s, rng, InputAction::Confirm);
    idle(&mut s, rng, 180);
    assert_eq!(s.state, GameState::BossFight);
    s
}

/// Put the player on their last sliver of hull with a bolt about to land.
fn doom_player(s: &mut GameSession) {
    s.player.lives = 1;
    s.player.hp = 10;
    let (px, py) = (s.player.x, s.player.y);
    s.enemy_bullets.push(Projectile::hostile(px + 60.0, py + 40.0, 30.0));
}

// ── init_session ──────────────────────────────────────────────────────────────

#[test]
fn session_starts_on_menu() {
    let s = make_session();
    assert_eq!(s.state, GameState::Menu);
    assert_eq!(s.score, 0);
    assert_eq!(s.frame, 0);
    assert!(s.enemies.is_empty());
    assert!(s.boss.is_none());
}

#[test]
fn menu_does_not_advance_frames() {
    let mut s = make_session();
    let mut rng = seeded_rng();
    idle(&mut s, &mut rng, 30);
    assert_eq!(s.frame, 0);
}

// ── Input-driven transitions ──────────────────────────────────────────────────

#[test]
fn confirm_starts_first_phase() {
    let mut s = make_session();
    let mut rng = seeded_rng();
    press(&mut s, &mut rng, InputAction::Confirm);

    assert_eq!(s.state, GameState::Playing);
    assert_eq!(s.phase_manager.current_phase().map(|p| p.id), Some(1));
    assert!(s.drain_events().contains(&GameEvent::StateChanged {
        from: GameState::Menu,
        to: GameState::Playing,
    }));
}

#[test]
fn difficulty_menu_round_trip() {
    let mut s = make_session();
    let mut rng = seeded_rng();
    press(&mut s, &mut rng, InputAction::OpenDifficulty);
    assert_eq!(s.state, GameState::DifficultySelect);

    press(&mut s, &mut rng, InputAction::ChooseDifficulty(DifficultyLevel::Hard));
    assert_eq!(s.state, GameState::Menu);
    assert_eq!(s.difficulty.level, DifficultyLevel::Hard);

    press(&mut s, &mut rng, InputAction::Confirm);
    assert_eq!(s.player.lives, 2);
}

#[test]
fn back_leaves_difficulty_select() {
    let mut s = make_session();
    let mut rng = seeded_rng();
    press(&mut s, &mut rng, InputAction::OpenDifficulty);
    press(&mut s, &mut rng, InputAction::Back);
    assert_eq!(s.state, GameState::Menu);
    assert_eq!(s.difficulty.level, DifficultyLevel::Normal);
}

#[test]
fn pause_freezes_and_resumes() {
    let mut s = make_session();
    let mut rng = seeded_rng();
    press(&mut s, &mut rng, InputAction::Confirm);
    idle(&mut s, &mut rng, 10);

    press(&mut s, &mut rng, InputAction::Pause);
    assert_eq!(s.state, GameState::Paused);
    let frame = s.frame;
    let elapsed = s.phase_manager.stats.time_elapsed;
    idle(&mut s, &mut rng, 100);
    assert_eq!(s.frame, frame);
    assert_eq!(s.phase_manager.stats.time_elapsed, elapsed);

    press(&mut s, &mut rng, InputAction::Pause);
    assert_eq!(s.state, GameState::Playing);
    assert_eq!(s.frame, frame + 1);
}

#[test]
fn irrelevant_actions_are_ignored() {
    let mut s = make_session();
    let mut rng = seeded_rng();
    press(&mut s, &mut rng, InputAction::Restart);
    press(&mut s, &mut rng, InputAction::Pause);
    assert_eq!(s.state, GameState::Menu);
}

// ── Playing ───────────────────────────────────────────────────────────────────

#[test]
fn enemies_spawn_on_frame_cadence() {
    let mut s = make_session();
    let mut rng = seeded_rng();
    press(&mut s, &mut rng, InputAction::Confirm);
    // Frame 1 was the confirming tick.
    idle(&mut s, &mut rng, 58);
    assert!(s.enemies.is_empty());

    idle(&mut s, &mut rng, 1);
    assert_eq!(s.frame, 60);
    assert_eq!(s.enemies.len(), 1);
    assert_eq!(s.phase_manager.stats.enemies_spawned, 1);
    let enemy = &s.enemies[0];
    assert!(enemy.y >= 50.0 && enemy.y < 330.0);
}

#[test]
fn holding_shoot_fires() {
    let mut s = make_session();
    let mut rng = seeded_rng();
    press(&mut s, &mut rng, InputAction::Confirm);
    let input = InputSnapshot::holding(HeldKeys { shoot: true, ..HeldKeys::default() });
    tick(&mut s, &input, &mut rng);
    assert_eq!(s.player_bullets.len(), 2);
    assert!(s
        .drain_events()
        .contains(&GameEvent::Sound { id: SoundId::Shoot, volume: 0.3 }));
}

#[test]
fn cleared_wave_awards_bonus_and_moves_on() {
    let mut s = make_session();
    let mut rng = seeded_rng();
    press(&mut s, &mut rng, InputAction::Confirm);
    s.phase_manager.stats.enemies_killed = 30;

    idle(&mut s, &mut rng, 1);
    assert_eq!(s.state, GameState::PhaseComplete);
    // 1000 base + 500 no damage + 500 time (two ticks elapsed).
    assert_eq!(s.score, 2000);

    idle(&mut s, &mut rng, 180);
    assert_eq!(s.state, GameState::BossIntro);
    assert!(s.boss.is_none());

    idle(&mut s, &mut rng, 180);
    assert_eq!(s.state, GameState::BossFight);
    assert_eq!(s.boss.as_ref().map(|b| b.hp), Some(300));
}

#[test]
fn boss_hp_scales_with_difficulty() {
    let phases = vec![PhaseDescriptor {
        id: 1,
        name: "Vader".to_string(),
        objective: "Win".to_string(),
        kind: PhaseKind::BossFight { boss_type: "TIE_ADVANCED".to_string(), boss_hp: 300 },
    }];
    let config = GameConfig { phases, ..GameConfig::default() };
    let mut s = init_session(config, DifficultyLevel::Hard.settings());
    let mut rng = seeded_rng();
    press(&mut s, &mut rng, InputAction::Confirm);
    assert_eq!(s.state, GameState::BossIntro);

    idle(&mut s, &mut rng, 180);
    assert_eq!(s.boss.as_ref().map(|b| b.max_hp), Some(450));
}

#[test]
fn defeating_boss_completes_phase() {
    let phases = vec![PhaseDescriptor {
        id: 1,
        name: "Vader".to_string(),
        objective: "Win".to_string(),
        kind: PhaseKind::BossFight { boss_type: "TIE_ADVANCED".to_string(), boss_hp: 300 },
    }];
    let config = GameConfig { phases, ..GameConfig::default() };
    let mut s = init_session(config, Difficulty::default());
    let mut rng = seeded_rng();
    press(&mut s, &mut rng, InputAction::Confirm);
    idle(&mut s, &mut rng, 180);
    assert_eq!(s.state, GameState::BossFight);

    if let Some(boss) = s.boss.as_mut() {
        boss.hp = 10;
    }
    s.player_bullets.push(Projectile::friendly(600.0, 230.0));
    idle(&mut s, &mut rng, 1);

    assert_eq!(s.state, GameState::PhaseComplete);
    assert!(s.boss.is_none());
    assert!(s.score >= 1000 + 1000);
    assert!(s.events.iter().any(|e| matches!(
        e,
        GameEvent::Boss(star_assault::boss::BossEvent::Destroyed { .. })
    )));

    // Only phase: the victory overlay follows.
    idle(&mut s, &mut rng, 360);
    assert_eq!(s.state, GameState::Victory);
}

#[test]
fn empty_wave_runs_through_to_victory() {
    let phases = vec![PhaseDescriptor {
        id: 1,
        name: "Warm-up".to_string(),
        objective: "Nothing to do".to_string(),
        kind: PhaseKind::NormalCombat {
            enemy_count: 0,
            enemy_type: "TIE_FIGHTER".to_string(),
            spawn_rate: 60,
        },
    }];
    let config = GameConfig { phases, ..GameConfig::default() };
    let mut s = init_session(config, Difficulty::default());
    let mut rng = seeded_rng();
    // Nothing to kill, so the first gameplay tick already clears the wave.
    press(&mut s, &mut rng, InputAction::Confirm);
    assert_eq!(s.state, GameState::PhaseComplete);

    idle(&mut s, &mut rng, 359);
    assert_eq!(s.state, GameState::PhaseComplete);
    idle(&mut s, &mut rng, 1);
    assert_eq!(s.state, GameState::Victory);
}

#[test]
fn last_life_lost_leads_to_game_over() {
    let mut s = make_session();
    let mut rng = seeded_rng();
    press(&mut s, &mut rng, InputAction::Confirm);
    s.player.lives = 1;
    s.player.hp = 10;
    let (px, py) = (s.player.x, s.player.y);
    s.enemy_bullets.push(Projectile::hostile(px + 60.0, py + 40.0, 30.0));

    idle(&mut s, &mut rng, 1);
    assert!(s.player.is_dead);
    assert_eq!(s.player.lives, 0);
    assert_eq!(s.state, GameState::Playing);
    assert!(s.phase_manager.is_transitioning());

    idle(&mut s, &mut rng, 180);
    assert_eq!(s.state, GameState::GameOver);

    press(&mut s, &mut rng, InputAction::Restart);
    assert_eq!(s.state, GameState::Menu);
    assert_eq!(s.score, 0);
    assert!(!s.player.is_dead);
}

#[test]
fn death_with_lives_left_respawns() {
    let mut s = make_session();
    let mut rng = seeded_rng();
    press(&mut s, &mut rng, InputAction::Confirm);
    s.player.hp = 10;
    let (px, py) = (s.player.x, s.player.y);
    s.enemy_bullets.push(Projectile::hostile(px + 60.0, py + 40.0, 30.0));

    idle(&mut s, &mut rng, 1);
    assert!(!s.player.is_dead);
    assert_eq!(s.player.lives, 2);
    assert_eq!(s.player.hp, 100);
    assert_eq!(s.player.invulnerability, 120);
    assert!(!s.phase_manager.is_transitioning());
}

#[test]
fn seeded_runs_are_identical() {
    let run = || {
        let mut s = make_session();
        let mut rng = seeded_rng();
        press(&mut s, &mut rng, InputAction::Confirm);
        let input = InputSnapshot::holding(HeldKeys { shoot: true, up: true, ..HeldKeys::default() });
        for _ in 0..900 {
            tick(&mut s, &input, &mut rng);
        }
        (s.score, s.enemies.len(), s.player.hp, s.state)
    };
    assert_eq!(run(), run());
}

// ── Overlays freeze gameplay ──────────────────────────────────────────────────

#[test]
fn game_over_overlay_freezes_the_wave() {
    let mut s = make_session();
    let mut rng = seeded_rng();
    press(&mut s, &mut rng, InputAction::Confirm);
    idle(&mut s, &mut rng, 59);
    assert_eq!(s.enemies.len(), 1);

    doom_player(&mut s);
    s.enemy_bullets.push(Projectile::hostile(500.0, 50.0, 30.0));
    idle(&mut s, &mut rng, 1);
    assert!(s.phase_manager.is_transitioning());

    let enemies = s.enemies.clone();
    let bullets = s.enemy_bullets.clone();
    let stats = s.phase_manager.stats.clone();
    let frame = s.frame;

    // Frames 120 and 180 would both be spawn frames.
    idle(&mut s, &mut rng, 120);
    assert_eq!(s.frame, frame + 120);
    assert_eq!(s.state, GameState::Playing);
    assert_eq!(s.enemies, enemies);
    assert_eq!(s.enemy_bullets, bullets);
    assert_eq!(s.phase_manager.stats, stats);
}

#[test]
fn game_over_overlay_freezes_the_boss() {
    let mut rng = seeded_rng();
    let mut s = boss_fight_session(&mut rng);
    doom_player(&mut s);
    idle(&mut s, &mut rng, 1);
    assert!(s.player.is_dead);
    assert!(s.phase_manager.is_transitioning());

    let boss = s.boss.clone();
    let bullets = s.enemy_bullets.clone();
    let spawned = s.phase_manager.stats.enemies_spawned;

    idle(&mut s, &mut rng, 120);
    assert_eq!(s.state, GameState::BossFight);
    assert_eq!(s.boss, boss);
    assert_eq!(s.enemy_bullets, bullets);
    assert!(s.enemies.is_empty());
    assert_eq!(s.phase_manager.stats.enemies_spawned, spawned);

    idle(&mut s, &mut rng, 60);
    assert_eq!(s.state, GameState::GameOver);
}

#[test]
fn boss_ramming_death_is_handled_same_tick() {
    let mut rng = seeded_rng();
    let mut s = boss_fight_session(&mut rng);
    s.enemy_bullets.clear();
    s.player.hp = 10;
    let (px, py) = (s.player.x, s.player.y);
    if let Some(boss) = s.boss.as_mut() {
        boss.x = px;
        boss.y = py;
        boss.shoot_timer = 1000;
    }
    s.drain_events();

    idle(&mut s, &mut rng, 1);
    assert!(!s.player.is_dead);
    assert_eq!(s.player.lives, 2);
    assert_eq!(s.player.hp, 100);
    assert_eq!(s.player.invulnerability, 120);
    assert!(s
        .drain_events()
        .contains(&GameEvent::Sound { id: SoundId::Death, volume: 0.8 }));
}
