/// Rendering layer: all terminal I/O lives here.
///
/// Each function receives a mutable writer and an immutable view of the
/// session. No game logic is performed; the arena is scaled onto whatever
/// terminal size is available and translated into terminal commands.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use star_assault::boss::{Boss, BossKind, SuperlaserState};
use star_assault::config::DifficultyLevel;
use star_assault::entities::{
    Enemy, EnemyKind, GameSession, GameState, PowerUpPickup, Projectile, Side,
};
use star_assault::phase::TransitionKind;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_LIVES: Color = Color::Red;
const C_HUD_PHASE: Color = Color::Cyan;
const C_PLAYER: Color = Color::White;
const C_PLAYER_SHIELDED: Color = Color::Cyan;
const C_ENEMY_FIGHTER: Color = Color::Grey;
const C_ENEMY_INTERCEPTOR: Color = Color::DarkGrey;
const C_BOSS: Color = Color::Red;
const C_WEAK_POINT: Color = Color::Yellow;
const C_SUPERLASER: Color = Color::Green;
const C_BULLET_PLAYER: Color = Color::Red;
const C_BULLET_ENEMY: Color = Color::Green;
const C_HINT: Color = Color::DarkGrey;

// ── Arena → terminal mapping ──────────────────────────────────────────────────

/// Maps arena coordinates onto the terminal cells between the borders.
struct Viewport {
    width: u16,
    height: u16,
    scale_x: f32,
    scale_y: f32,
}

impl Viewport {
    fn new(session: &GameSession, width: u16, height: u16) -> Self {
        let (arena_w, arena_h) = session.arena();
        let cols = width.saturating_sub(2).max(1) as f32;
        let rows = height.saturating_sub(4).max(1) as f32;
        Self {
            width,
            height,
            scale_x: cols / arena_w,
            scale_y: rows / arena_h,
        }
    }

    /// Terminal cell of an arena point, or `None` when it falls outside the field.
    fn cell(&self, x: f32, y: f32) -> Option<(u16, u16)> {
        let col = 1.0 + x * self.scale_x;
        let row = 2.0 + y * self.scale_y;
        let max_col = self.width.saturating_sub(2) as f32;
        let max_row = self.height.saturating_sub(3) as f32;
        if col < 1.0 || row < 2.0 || col > max_col || row > max_row {
            return None;
        }
        Some((col as u16, row as u16))
    }

    fn cols(&self, w: f32) -> usize {
        ((w * self.scale_x).round() as usize).max(1)
    }

    fn rows(&self, h: f32) -> usize {
        ((h * self.scale_y).round() as usize).max(1)
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(
    out: &mut W,
    session: &GameSession,
    width: u16,
    height: u16,
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    match session.state {
        GameState::Menu => draw_menu(out, session, width, height)?,
        GameState::DifficultySelect => draw_difficulty_select(out, session, width, height)?,
        GameState::GameOver => draw_end_screen(out, session, width, height, "GAME  OVER", Color::Red)?,
        GameState::Victory => draw_end_screen(out, session, width, height, " VICTORY! ", Color::Green)?,
        GameState::Playing
        | GameState::BossIntro
        | GameState::BossFight
        | GameState::PhaseComplete
        | GameState::Paused => {
            let view = Viewport::new(session, width, height);
            draw_border(out, width, height)?;
            draw_hud(out, session, width)?;

            for pickup in &session.power_ups {
                draw_pickup(out, &view, pickup, session.frame)?;
            }
            for enemy in &session.enemies {
                draw_enemy(out, &view, enemy)?;
            }
            if let Some(boss) = &session.boss {
                draw_boss(out, &view, boss)?;
            }
            for bullet in session.player_bullets.iter().chain(&session.enemy_bullets) {
                draw_bullet(out, &view, bullet)?;
            }
            draw_player(out, &view, session)?;
            draw_controls_hint(out, height)?;

            if let Some(transition) = session.phase_manager.transition() {
                draw_transition(out, session, transition.kind, width, height)?;
            } else if session.state == GameState::Paused {
                centered(out, width, height / 2, "═══  PAUSED  ═══", Color::White)?;
                centered(out, width, height / 2 + 1, "P / ESC : Resume", C_HINT)?;
            }
        }
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, height.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

fn centered<W: Write>(out: &mut W, width: u16, row: u16, text: &str, color: Color) -> std::io::Result<()> {
    let col = (width / 2).saturating_sub(text.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(text))?;
    Ok(())
}

// ── Menus ─────────────────────────────────────────────────────────────────────

fn draw_menu<W: Write>(out: &mut W, session: &GameSession, width: u16, height: u16) -> std::io::Result<()> {
    let cy = height / 2;
    centered(out, width, cy.saturating_sub(6), "★  STAR  ASSAULT  ★", Color::Cyan)?;
    centered(out, width, cy.saturating_sub(4), "Strike the Death Star", Color::White)?;

    let difficulty = format!("Difficulty: {}", session.difficulty.name);
    centered(out, width, cy.saturating_sub(2), &difficulty, difficulty_color(session.difficulty.level))?;

    centered(out, width, cy, "ENTER : Start", Color::White)?;
    centered(out, width, cy + 1, "O : Difficulty", Color::White)?;
    centered(out, width, cy + 2, "Q : Quit", Color::White)?;

    centered(out, width, cy + 4, "WASD / ←↑↓→ : Move   SPACE / J : Shoot   P : Pause", C_HINT)?;
    Ok(())
}

fn difficulty_color(level: DifficultyLevel) -> Color {
    match level {
        DifficultyLevel::Easy => Color::Green,
        DifficultyLevel::Normal => Color::Yellow,
        DifficultyLevel::Hard => Color::Red,
    }
}

fn draw_difficulty_select<W: Write>(
    out: &mut W,
    session: &GameSession,
    width: u16,
    height: u16,
) -> std::io::Result<()> {
    let cy = height / 2;
    centered(out, width, cy.saturating_sub(4), "Select difficulty:", Color::White)?;

    let options = [
        ("1", DifficultyLevel::Easy),
        ("2", DifficultyLevel::Normal),
        ("3", DifficultyLevel::Hard),
    ];
    for (i, (key, level)) in options.iter().enumerate() {
        let settings = level.settings();
        let marker = if *level == session.difficulty.level { "▶" } else { " " };
        let line = format!(
            "{} [{}] {:<14} lives {}  boss hp ×{:.1}",
            marker, key, settings.name, settings.player_lives, settings.boss_hp_multiplier
        );
        centered(out, width, cy.saturating_sub(2) + i as u16, &line, difficulty_color(*level))?;
    }

    centered(out, width, cy + 2, "BACKSPACE : Back", C_HINT)?;
    Ok(())
}

fn draw_end_screen<W: Write>(
    out: &mut W,
    session: &GameSession,
    width: u16,
    height: u16,
    title: &str,
    color: Color,
) -> std::io::Result<()> {
    let start_row = (height / 2).saturating_sub(3);
    centered(out, width, start_row, "╔════════════════════╗", color)?;
    centered(out, width, start_row + 1, &format!("║     {}     ║", title), color)?;
    centered(out, width, start_row + 2, "╚════════════════════╝", color)?;

    let score_line = format!("Final Score: {:>6}", session.score);
    centered(out, width, start_row + 3, &score_line, Color::Yellow)?;
    centered(out, width, start_row + 4, "R - Back to Menu  Q - Quit", Color::White)?;
    Ok(())
}

// ── Border & HUD ──────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, width: u16, height: u16) -> std::io::Result<()> {
    let w = width as usize;

    out.queue(style::SetForegroundColor(C_BORDER))?;

    // Row 1: top bar
    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    // Row h-2: bottom bar
    out.queue(cursor::MoveTo(0, height.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    // Side walls
    for row in 2..height.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(width.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

fn draw_hud<W: Write>(out: &mut W, session: &GameSession, width: u16) -> std::io::Result<()> {
    let player = &session.player;

    // Score and hull, left
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(format!("Score:{:>7}  ", session.score)))?;
    out.queue(style::SetForegroundColor(hull_color(player.hp_ratio())))?;
    out.queue(Print(format!("Hull:{:>3}%", (player.hp_ratio() * 100.0).round() as i32)))?;

    // Phase, centre
    let manager = &session.phase_manager;
    let phase_str = match manager.current_phase() {
        Some(phase) if phase.is_boss_fight() => {
            let boss_hp = session.boss.as_ref().map_or(0.0, |b| b.hp_ratio());
            format!("[ {}/{} {} {:>3}% ]", phase.id, manager.phase_count(), phase.name, (boss_hp * 100.0) as i32)
        }
        Some(phase) => format!(
            "[ {}/{} {} {:>3}% ]",
            phase.id,
            manager.phase_count(),
            phase.name,
            (manager.phase_progress() * 100.0) as i32
        ),
        None => String::new(),
    };
    let lx = (width / 2).saturating_sub(phase_str.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(lx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_PHASE))?;
    out.queue(Print(&phase_str))?;

    // Active power-ups and lives, right side
    let power_tags: String = player
        .active_power_ups
        .iter()
        .map(|p| format!("[{} {}s] ", p.kind.name(), p.remaining / 60 + 1))
        .collect();
    let lives_str = format!("Lives:{}", "♥".repeat(player.lives as usize));
    let right_len = power_tags.chars().count() + lives_str.chars().count();
    out.queue(cursor::MoveTo(width.saturating_sub(right_len as u16 + 1), 0))?;
    if !power_tags.is_empty() {
        out.queue(style::SetForegroundColor(Color::Yellow))?;
        out.queue(Print(&power_tags))?;
    }
    out.queue(style::SetForegroundColor(C_HUD_LIVES))?;
    out.queue(Print(&lives_str))?;

    Ok(())
}

fn hull_color(ratio: f32) -> Color {
    if ratio > 0.6 {
        Color::Green
    } else if ratio > 0.3 {
        Color::Yellow
    } else {
        Color::Red
    }
}

// ── Entities ──────────────────────────────────────────────────────────────────

/// Fill the scaled footprint of a box with `glyph`, clipped to the field.
fn fill_box<W: Write>(
    out: &mut W,
    view: &Viewport,
    x: f32,
    y: f32,
    w: f32,
    h: f32,
    glyph: char,
) -> std::io::Result<()> {
    let cols = view.cols(w);
    let rows = view.rows(h);
    for r in 0..rows {
        let ry = y + r as f32 / view.scale_y;
        for c in 0..cols {
            let cx = x + c as f32 / view.scale_x;
            if let Some((col, row)) = view.cell(cx, ry) {
                out.queue(cursor::MoveTo(col, row))?;
                out.queue(Print(glyph))?;
            }
        }
    }
    Ok(())
}

fn draw_player<W: Write>(out: &mut W, view: &Viewport, session: &GameSession) -> std::io::Result<()> {
    let p = &session.player;
    if p.is_dead {
        return Ok(());
    }
    // Blink while the post-hit window runs.
    if p.invulnerability > 0 && (session.frame / 4) % 2 == 0 {
        return Ok(());
    }
    let color = if p.is_invulnerable() { C_PLAYER_SHIELDED } else { C_PLAYER };
    out.queue(style::SetForegroundColor(color))?;
    fill_box(out, view, p.x, p.y, p.width, p.height, '█')?;
    Ok(())
}

fn draw_enemy<W: Write>(out: &mut W, view: &Viewport, enemy: &Enemy) -> std::io::Result<()> {
    let (color, glyph) = match enemy.kind {
        EnemyKind::TieFighter => (C_ENEMY_FIGHTER, '▓'),
        EnemyKind::TieInterceptor => (C_ENEMY_INTERCEPTOR, '▒'),
    };
    out.queue(style::SetForegroundColor(color))?;
    fill_box(out, view, enemy.x, enemy.y, enemy.width, enemy.height, glyph)
}

fn draw_boss<W: Write>(out: &mut W, view: &Viewport, boss: &Boss) -> std::io::Result<()> {
    if !boss.active {
        return Ok(());
    }
    let glyph = match boss.kind {
        BossKind::TieAdvanced => '▓',
        BossKind::StarDestroyer => '▲',
        BossKind::DeathStar => '●',
    };
    out.queue(style::SetForegroundColor(C_BOSS))?;
    fill_box(out, view, boss.x, boss.y, boss.width, boss.height, glyph)?;

    if let Some(weak) = boss.weak_point_rect() {
        out.queue(style::SetForegroundColor(C_WEAK_POINT))?;
        fill_box(out, view, weak.x, weak.y, weak.width, weak.height, '◎')?;
    }

    match boss.superlaser.map(|l| l.state) {
        Some(SuperlaserState::Charging { .. }) => {
            out.queue(style::SetForegroundColor(C_SUPERLASER))?;
            fill_box(out, view, boss.x + 60.0, boss.y + boss.height / 2.0, 20.0, 20.0, '*')?;
        }
        Some(SuperlaserState::Firing { .. }) => {
            if let Some(band) = boss.superlaser_band() {
                out.queue(style::SetForegroundColor(C_SUPERLASER))?;
                fill_box(out, view, band.x, band.y, band.width, band.height, '═')?;
            }
        }
        _ => {}
    }
    Ok(())
}

fn draw_bullet<W: Write>(out: &mut W, view: &Viewport, bullet: &Projectile) -> std::io::Result<()> {
    let Some((col, row)) = view.cell(bullet.x, bullet.y) else {
        return Ok(());
    };
    let (color, glyph) = match bullet.side {
        Side::Friend => (C_BULLET_PLAYER, "─"),
        Side::Foe => (C_BULLET_ENEMY, "•"),
    };
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(glyph))?;
    Ok(())
}

/// Pickups show their catalog colour and blink shortly before they expire.
fn draw_pickup<W: Write>(out: &mut W, view: &Viewport, pickup: &PowerUpPickup, frame: u64) -> std::io::Result<()> {
    if pickup.is_expiring() && (frame / 6) % 2 == 0 {
        return Ok(());
    }
    let Some((col, row)) = view.cell(pickup.x, pickup.y) else {
        return Ok(());
    };
    let (r, g, b) = pickup.kind.entry().color;
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(Color::Rgb { r, g, b }))?;
    out.queue(Print("◆"))?;
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, height: u16) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, height.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("WASD : Move   SPACE : Shoot   P : Pause   Q : Quit"))?;
    Ok(())
}

// ── Transition overlays ───────────────────────────────────────────────────────

fn draw_transition<W: Write>(
    out: &mut W,
    session: &GameSession,
    kind: TransitionKind,
    width: u16,
    height: u16,
) -> std::io::Result<()> {
    let cy = height / 2;
    let phase = session.phase_manager.current_phase();
    match kind {
        TransitionKind::BossIntro => {
            if (session.frame / 10) % 2 == 0 {
                centered(out, width, cy.saturating_sub(3), "⚠  WARNING  ⚠", Color::Red)?;
            }
            if let Some(phase) = phase {
                centered(out, width, cy.saturating_sub(1), &phase.name.to_uppercase(), Color::Red)?;
                centered(out, width, cy + 1, &phase.objective, Color::White)?;
            }
            centered(out, width, cy + 3, "GET READY!", Color::Yellow)?;
        }
        TransitionKind::PhaseComplete => {
            let stats = &session.phase_manager.stats;
            centered(out, width, cy.saturating_sub(3), "PHASE COMPLETE!", Color::Green)?;
            centered(out, width, cy.saturating_sub(1), &format!("Enemies destroyed: {}", stats.enemies_killed), Color::White)?;
            centered(out, width, cy, &format!("Power-ups collected: {}", stats.power_ups_collected), Color::White)?;
            centered(out, width, cy + 1, &format!("Time: {}s", stats.time_elapsed / 60), Color::White)?;
            let bonus = session.phase_manager.calculate_phase_bonus();
            centered(out, width, cy + 3, &format!("Bonus: +{} pts", bonus), Color::Yellow)?;
        }
        TransitionKind::GameOver => {
            centered(out, width, cy, "Your ship is lost...", Color::Red)?;
        }
        TransitionKind::Victory => {
            centered(out, width, cy, "The Death Star is destroyed!", Color::Green)?;
        }
    }
    Ok(())
}
