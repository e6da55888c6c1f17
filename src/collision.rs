//! Per-tick collision passes.
//!
//! Every pass walks its collection back to front and removes on hit, so the
//! first match in that order wins and a projectile never hits twice.

use rand::Rng;

use crate::boss::SUPERLASER_DAMAGE;
use crate::config::{BOSS_CONTACT_DAMAGE, ENEMY_CONTACT_DAMAGE};
use crate::entities::{
    Enemy, Entity, GameEvent, GameSession, ParticleKind, PowerUpPickup, SoundId,
};
use crate::powerup::{apply_power_up, roll_drop};

/// Strict AABB overlap between two active entities.
pub fn is_colliding(a: &impl Entity, b: &impl Entity) -> bool {
    a.is_active() && b.is_active() && a.bounds().intersects(&b.bounds())
}

/// The four regular pairings, in order.
pub fn resolve_collisions(session: &mut GameSession, rng: &mut impl Rng) {
    player_bullets_vs_enemies(session, rng);
    enemy_bullets_vs_player(session);
    power_ups_vs_player(session);
    enemies_vs_player(session);
}

// ── Regular pairings ──────────────────────────────────────────────────────────

/// Each bullet damages at most one enemy and is consumed whether or not it kills.
pub fn player_bullets_vs_enemies(session: &mut GameSession, rng: &mut impl Rng) {
    for i in (0..session.player_bullets.len()).rev() {
        let bullet = &session.player_bullets[i];
        let Some(j) = (0..session.enemies.len())
            .rev()
            .find(|&j| is_colliding(bullet, &session.enemies[j]))
        else {
            continue;
        };

        let damage = bullet.damage;
        if session.enemies[j].take_damage(damage) {
            let enemy = session.enemies.remove(j);
            on_enemy_shot_down(session, &enemy, rng);
        } else {
            let (x, y) = (session.enemies[j].x, session.enemies[j].y);
            session.emit(GameEvent::Particles { kind: ParticleKind::Sparks, x, y });
        }
        session.player_bullets.remove(i);
    }
}

/// Kill bookkeeping for an enemy destroyed by player fire: score, stats and a
/// chance of a pickup where it died.
fn on_enemy_shot_down(session: &mut GameSession, enemy: &Enemy, rng: &mut impl Rng) {
    session.phase_manager.record_enemy_killed();
    session.add_score(enemy.kind.score_value());
    session.emit(GameEvent::Sound { id: SoundId::Explosion, volume: 0.5 });
    session.emit(GameEvent::Particles { kind: ParticleKind::Explosion, x: enemy.x, y: enemy.y });

    if let Some(kind) = roll_drop(rng, session.difficulty.power_up_drop_rate) {
        tracing::debug!(?kind, "power-up dropped");
        session.power_ups.push(PowerUpPickup::new(kind, enemy.x, enemy.y));
    }
}

/// Bullets are consumed on contact even while the player is invulnerable.
pub fn enemy_bullets_vs_player(session: &mut GameSession) {
    for i in (0..session.enemy_bullets.len()).rev() {
        if !is_colliding(&session.enemy_bullets[i], &session.player) {
            continue;
        }
        let bullet = session.enemy_bullets.remove(i);
        damage_player(session, bullet.damage);
    }
}

pub fn power_ups_vs_player(session: &mut GameSession) {
    for i in (0..session.power_ups.len()).rev() {
        if !is_colliding(&session.power_ups[i], &session.player) {
            continue;
        }
        let mut pickup = session.power_ups.remove(i);
        pickup.collect();
        apply_power_up(session, pickup.kind);
        session.phase_manager.record_power_up_collected();
        session.emit(GameEvent::Particles { kind: ParticleKind::Pickup, x: pickup.x, y: pickup.y });
    }
}

/// Ramming costs the player a fixed amount and destroys the enemy outright.
/// It counts toward the wave but scores nothing.
pub fn enemies_vs_player(session: &mut GameSession) {
    for i in (0..session.enemies.len()).rev() {
        if !is_colliding(&session.enemies[i], &session.player) {
            continue;
        }
        let mut enemy = session.enemies.remove(i);
        enemy.destroy();
        damage_player(session, ENEMY_CONTACT_DAMAGE);
        session.phase_manager.record_enemy_killed();
        session.emit(GameEvent::Particles { kind: ParticleKind::Explosion, x: enemy.x, y: enemy.y });
    }
}

/// Hit the player and record what actually landed.
fn damage_player(session: &mut GameSession, amount: i32) {
    let applied = session.player.take_damage(amount);
    session.phase_manager.record_damage(applied);
    if applied > 0 {
        session.emit(GameEvent::Sound { id: SoundId::PlayerHit, volume: 0.5 });
    }
}

// ── Boss pairings ─────────────────────────────────────────────────────────────

/// Player bullets against the boss (weak point first), then ramming.
/// Returns `true` on the tick the boss goes down.
pub fn resolve_boss_collisions(session: &mut GameSession) -> bool {
    let Some(boss) = session.boss.as_mut() else {
        return false;
    };
    if !boss.active {
        return false;
    }

    let mut defeated = false;
    for i in (0..session.player_bullets.len()).rev() {
        let bullet = &session.player_bullets[i];
        let killed = if boss.is_weak_point_hit(&bullet.bounds()) {
            boss.take_weak_point_damage(bullet.damage)
        } else if is_colliding(bullet, &*boss) {
            boss.take_damage(bullet.damage)
        } else {
            continue;
        };
        session.player_bullets.remove(i);
        if killed {
            defeated = true;
            break;
        }
    }

    if !defeated && is_colliding(&*boss, &session.player) {
        damage_player(session, BOSS_CONTACT_DAMAGE);
    }
    defeated
}

/// While the superlaser fires, everything inside its band takes damage.
pub fn superlaser_sweep(session: &mut GameSession) {
    let Some(band) = session.boss.as_ref().and_then(|b| b.superlaser_band()) else {
        return;
    };

    if is_colliding(&band, &session.player) {
        damage_player(session, SUPERLASER_DAMAGE);
    }

    for i in (0..session.enemies.len()).rev() {
        if is_colliding(&band, &session.enemies[i]) && session.enemies[i].take_damage(SUPERLASER_DAMAGE) {
            let enemy = session.enemies.remove(i);
            session.phase_manager.record_enemy_killed();
            session.emit(GameEvent::Particles { kind: ParticleKind::Explosion, x: enemy.x, y: enemy.y });
        }
    }
}
