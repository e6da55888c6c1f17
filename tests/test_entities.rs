use approx::assert_abs_diff_eq;

use star_assault::config::{Difficulty, DifficultyLevel, BOUNDARY_MARGIN};
use star_assault::entities::*;
use star_assault::error::ConfigError;
use star_assault::powerup::PowerUpKind;

fn make_player() -> Player {
    Player::new(&Difficulty::default(), 480.0)
}

fn idle(player: &mut Player, ticks: u32) {
    for _ in 0..ticks {
        player.update(&HeldKeys::default(), 720.0, 480.0);
    }
}

// ── Rect ──────────────────────────────────────────────────────────────────────

#[test]
fn rect_touching_edges_do_not_intersect() {
    let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    assert!(!a.intersects(&Rect::new(10.0, 0.0, 10.0, 10.0)));
    assert!(!a.intersects(&Rect::new(0.0, 10.0, 10.0, 10.0)));
    assert!(a.intersects(&Rect::new(9.0, 9.0, 10.0, 10.0)));
}

#[test]
fn rect_inflate_grows_every_side() {
    let r = Rect::new(100.0, 100.0, 50.0, 20.0).inflate(20.0);
    assert_eq!(r, Rect::new(80.0, 80.0, 90.0, 60.0));
}

// ── Player ────────────────────────────────────────────────────────────────────

#[test]
fn player_starts_from_difficulty() {
    let hard = DifficultyLevel::Hard.settings();
    let p = Player::new(&hard, 480.0);
    assert_eq!(p.hp, 100);
    assert_eq!(p.lives, 2);
    assert_eq!(p.x, 200.0);
    assert_eq!(p.y, 190.0);
}

#[test]
fn hit_opens_invulnerability_window() {
    let mut p = make_player();
    assert_eq!(p.take_damage(10), 10);
    assert_eq!(p.hp, 90);
    assert_eq!(p.invulnerability, 60);

    // Second hit on the next tick is ignored.
    idle(&mut p, 1);
    assert_eq!(p.take_damage(10), 0);
    assert_eq!(p.hp, 90);
}

#[test]
fn invulnerability_expires_after_sixty_ticks() {
    let mut p = make_player();
    p.take_damage(10);
    idle(&mut p, 59);
    assert!(p.is_invulnerable());
    idle(&mut p, 1);
    assert!(!p.is_invulnerable());
    assert_eq!(p.take_damage(10), 10);
    assert_eq!(p.hp, 80);
}

#[test]
fn lethal_hit_costs_a_life_and_respawn_restores() {
    let mut p = make_player();
    assert_eq!(p.take_damage(150), 100);
    assert_eq!(p.hp, 0);
    assert!(p.is_dead);
    assert_eq!(p.lives, 2);

    assert!(p.respawn(480.0));
    assert!(!p.is_dead);
    assert_eq!(p.hp, 100);
    assert_eq!(p.invulnerability, 120);
}

#[test]
fn respawn_fails_without_lives() {
    let mut p = make_player();
    p.lives = 1;
    p.take_damage(100);
    assert_eq!(p.lives, 0);
    assert!(!p.respawn(480.0));
    assert!(p.is_dead);
}

#[test]
fn dead_player_takes_no_damage() {
    let mut p = make_player();
    p.take_damage(100);
    assert_eq!(p.take_damage(10), 0);
    assert_eq!(p.hp, 0);
}

#[test]
fn heal_is_capped_at_max() {
    let mut p = make_player();
    p.hp = 90;
    p.heal(50);
    assert_eq!(p.hp, 100);
}

#[test]
fn player_is_kept_inside_margins() {
    let mut p = make_player();
    p.x = 0.0;
    p.y = 1000.0;
    idle(&mut p, 1);
    assert_eq!(p.x, BOUNDARY_MARGIN);
    assert_eq!(p.y, 480.0 - 100.0 - BOUNDARY_MARGIN);
}

#[test]
fn holding_right_accelerates_with_friction() {
    let mut p = make_player();
    let keys = HeldKeys { right: true, ..HeldKeys::default() };
    p.update(&keys, 720.0, 480.0);
    assert_abs_diff_eq!(p.vel_x, 0.8, epsilon = 1e-6);
    assert_abs_diff_eq!(p.x, 200.8, epsilon = 1e-4);
}

#[test]
fn shoot_respects_cooldown() {
    let mut p = make_player();
    assert_eq!(p.shoot().len(), 2);
    assert!(p.shoot().is_empty());
    idle(&mut p, 10);
    assert_eq!(p.shoot().len(), 2);
}

#[test]
fn quad_shot_fires_four_bolts() {
    let mut p = make_player();
    p.add_power_up(PowerUpKind::QuadShot, 480);
    let shots = p.shoot();
    assert_eq!(shots.len(), 4);
    assert!(shots.iter().all(|s| s.side == Side::Friend && s.vx > 0.0));
}

#[test]
fn power_up_refreshes_instead_of_stacking() {
    let mut p = make_player();
    p.add_power_up(PowerUpKind::DualShot, 600);
    idle(&mut p, 100);
    assert_eq!(p.active_power_ups[0].remaining, 500);

    p.add_power_up(PowerUpKind::DualShot, 600);
    assert_eq!(p.active_power_ups.len(), 1);
    assert_eq!(p.active_power_ups[0].remaining, 600);
}

#[test]
fn power_up_expires() {
    let mut p = make_player();
    p.add_power_up(PowerUpKind::SpeedBoost, 2);
    assert_eq!(p.max_speed(), 9.0);
    idle(&mut p, 2);
    assert!(!p.has_power_up(PowerUpKind::SpeedBoost));
    assert_eq!(p.max_speed(), 6.0);
}

#[test]
fn shield_blocks_damage() {
    let mut p = make_player();
    p.add_power_up(PowerUpKind::EnergyShield, 300);
    assert!(p.is_invulnerable());
    assert_eq!(p.take_damage(50), 0);
    assert_eq!(p.hp, 100);
}

// ── Projectiles ───────────────────────────────────────────────────────────────

#[test]
fn angled_shot_leans_off_straight_left() {
    let straight = Projectile::hostile_angled(0.0, 0.0, 30.0, 0.0);
    assert_eq!(straight.vx, -30.0);
    assert_eq!(straight.vy, 0.0);

    let angled = Projectile::hostile_angled(0.0, 0.0, 30.0, 15.0);
    assert_abs_diff_eq!(angled.vx, -28.977_774, epsilon = 1e-3);
    assert_abs_diff_eq!(angled.vy, -7.764_571, epsilon = 1e-3);
}

#[test]
fn projectile_off_screen_has_slack() {
    let mut b = Projectile::friendly(770.0, 100.0);
    assert!(!b.is_off_screen(720.0, 480.0));
    b.update();
    assert!(b.is_off_screen(720.0, 480.0));
}

// ── Enemies ───────────────────────────────────────────────────────────────────

#[test]
fn enemy_take_damage_reports_only_the_kill() {
    let mut e = Enemy::new(EnemyKind::TieFighter, 500.0, 100.0, &Difficulty::default());
    assert!(e.take_damage(10));
    assert!(!e.active);
    // Already destroyed: nothing further to count.
    assert!(!e.take_damage(10));
    e.destroy();
    assert!(!e.is_active());
}

#[test]
fn interceptor_survives_one_bolt() {
    let mut e = Enemy::new(EnemyKind::TieInterceptor, 500.0, 100.0, &Difficulty::default());
    assert!(!e.take_damage(10));
    assert_eq!(e.hp, 5);
    assert_eq!(e.speed, 1.5);
}

#[test]
fn enemy_fires_three_bolt_volley() {
    let mut e = Enemy::new(EnemyKind::TieFighter, 500.0, 100.0, &Difficulty::default());
    let volley = e.shoot(30.0);
    assert_eq!(volley.len(), 3);
    assert_eq!((volley[0].x, volley[0].y), (400.0, 120.0));
    assert!(volley.iter().all(|b| b.side == Side::Foe && b.vx == -30.0));
    assert!(e.shoot(30.0).is_empty());
    assert_eq!(e.shoot_timer, 90);
}

#[test]
fn enemy_waits_until_inside_arena() {
    let mut e = Enemy::new(EnemyKind::TieFighter, 720.0, 100.0, &Difficulty::default());
    assert!(!e.ready_to_fire(720.0));
    e.x = 600.0;
    assert!(e.ready_to_fire(720.0));
}

#[test]
fn difficulty_scales_enemies() {
    let hard = DifficultyLevel::Hard.settings();
    let e = Enemy::new(EnemyKind::TieFighter, 0.0, 0.0, &hard);
    assert_eq!(e.shoot_delay, 63);
    assert_abs_diff_eq!(e.speed, 1.3, epsilon = 1e-6);
}

#[test]
fn enemy_off_screen_past_left_edge() {
    let mut e = Enemy::new(EnemyKind::TieFighter, -150.0, 100.0, &Difficulty::default());
    assert!(!e.is_off_screen());
    e.update();
    assert!(e.is_off_screen());
}

#[test]
fn enemy_kind_parses_names() {
    assert_eq!("TIE_FIGHTER".parse::<EnemyKind>().ok(), Some(EnemyKind::TieFighter));
    assert!(matches!(
        "X_WING".parse::<EnemyKind>(),
        Err(ConfigError::UnknownEnemyType(name)) if name == "X_WING"
    ));
}

// ── Pickups ───────────────────────────────────────────────────────────────────

#[test]
fn pickup_drifts_and_expires() {
    let mut pickup = PowerUpPickup::new(PowerUpKind::RepairKit, 300.0, 100.0);
    for _ in 0..599 {
        pickup.update(480.0);
    }
    assert!(pickup.active);
    assert!(pickup.is_expiring());
    assert_abs_diff_eq!(pickup.y, 100.0 + 599.0 * 0.5, epsilon = 1e-2);
    pickup.update(480.0);
    assert!(!pickup.active);
}
