/// Rendering layer — all terminal I/O lives here.
///
/// The simulation runs on a fixed logical surface (800×500 by default).  A
/// [`Viewport`] scales that surface onto whatever terminal grid is
/// available; each draw function receives a mutable writer and an immutable
/// view of the game state and only translates state into terminal commands.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use space_invaders::entities::{
    BulletOwner, Enemy, GameState, GameStatus, Level, Player, Projectile, Shield,
};
use space_invaders::geometry::{Hitbox, Rect};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_ENEMIES: Color = Color::Green;
const C_PLAYER: Color = Color::White;
const C_ENEMY: Color = Color::Green;
const C_SHIELD: Color = Color::White;
const C_BULLET_PLAYER: Color = Color::Cyan;
const C_BULLET_ENEMY: Color = Color::Magenta;
const C_HINT: Color = Color::DarkGrey;

/// Controls line; the mouse is only advertised when it steers the player.
pub fn controls_hint(pointer_steering: bool) -> &'static str {
    if pointer_steering {
        "← → / A D : Move   SPACE : Shoot   Mouse : Aim   Q : Quit"
    } else {
        "← → / A D : Move   SPACE : Shoot   Q : Quit"
    }
}

// ── Surface → terminal mapping ────────────────────────────────────────────────

/// Maps the logical surface onto the terminal cells inside the border.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    left: u16,
    top: u16,
    cols: u16,
    rows: u16,
    surface_w: f32,
    surface_h: f32,
}

impl Viewport {
    /// Row 0 is the HUD, row 1 and `height - 2` the border, the last row the
    /// controls hint.
    pub fn new(term_width: u16, term_height: u16, surface_w: f32, surface_h: f32) -> Self {
        Self {
            left: 1,
            top: 2,
            cols: term_width.saturating_sub(2).max(1),
            rows: term_height.saturating_sub(4).max(1),
            surface_w,
            surface_h,
        }
    }

    fn cell_w(&self) -> f32 {
        self.surface_w / self.cols as f32
    }

    fn cell_h(&self) -> f32 {
        self.surface_h / self.rows as f32
    }

    fn col_index(&self, x: f32) -> u16 {
        ((x / self.cell_w()).floor().max(0.0) as u16).min(self.cols - 1)
    }

    fn row_index(&self, y: f32) -> u16 {
        ((y / self.cell_h()).floor().max(0.0) as u16).min(self.rows - 1)
    }

    /// Terminal cell containing a surface point.
    pub fn cell(&self, x: f32, y: f32) -> (u16, u16) {
        (self.left + self.col_index(x), self.top + self.row_index(y))
    }

    /// Inclusive terminal cell range `(col0, col1, row0, row1)` covered by a
    /// rectangle.  Anything smaller than a cell still covers one.
    pub fn span(&self, rect: Rect) -> (u16, u16, u16, u16) {
        let col0 = self.col_index(rect.x);
        let row0 = self.row_index(rect.y);
        let col1 = ((rect.right() / self.cell_w()).ceil() as u16)
            .saturating_sub(1)
            .clamp(col0, self.cols - 1);
        let row1 = ((rect.bottom() / self.cell_h()).ceil() as u16)
            .saturating_sub(1)
            .clamp(row0, self.rows - 1);
        (
            self.left + col0,
            self.left + col1,
            self.top + row0,
            self.top + row1,
        )
    }

    /// Surface point at the centre of a terminal cell.  Cells outside the
    /// play area clamp to its edge.
    pub fn to_surface(&self, col: u16, row: u16) -> (f32, f32) {
        let c = col.saturating_sub(self.left).min(self.cols - 1);
        let r = row.saturating_sub(self.top).min(self.rows - 1);
        (
            (c as f32 + 0.5) * self.cell_w(),
            (r as f32 + 0.5) * self.cell_h(),
        )
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(out: &mut W, state: &GameState) -> std::io::Result<()> {
    let (width, height) = terminal::size()?;
    let view = Viewport::new(width, height, state.settings.width, state.settings.height);

    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, width, height)?;
    draw_hud(out, state, width)?;

    for shield in &state.shields {
        draw_shield(out, &view, shield)?;
    }
    for enemy in state.enemies() {
        draw_enemy(out, &view, enemy)?;
    }
    for projectile in &state.projectiles {
        draw_projectile(out, &view, projectile)?;
    }
    draw_player(out, &view, &state.player)?;
    draw_controls_hint(out, height, state.settings.pointer_steering)?;

    if state.status != GameStatus::Playing {
        draw_end_screen(out, state, width, height)?;
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, height.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, width: u16, height: u16) -> std::io::Result<()> {
    let w = width as usize;

    out.queue(style::SetForegroundColor(C_BORDER))?;

    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    out.queue(cursor::MoveTo(0, height.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    for row in 2..height.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(width.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, state: &GameState, width: u16) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(format!("Score: {:>6}", state.score)))?;

    let (level_str, level_color) = match state.level {
        Level::Easy => ("[ EASY ]", Color::Green),
        Level::Medium => ("[ MEDIUM ]", Color::Yellow),
        Level::Hard => ("[ HARD ]", Color::Red),
    };
    let lx = (width / 2).saturating_sub(level_str.len() as u16 / 2);
    out.queue(cursor::MoveTo(lx, 0))?;
    out.queue(style::SetForegroundColor(level_color))?;
    out.queue(Print(level_str))?;

    let enemies_text = format!("Invaders: {:>2}", state.enemy_count());
    let rx = width.saturating_sub(enemies_text.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_ENEMIES))?;
    out.queue(Print(&enemies_text))?;

    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn fill_rect<W: Write>(
    out: &mut W,
    view: &Viewport,
    rect: Rect,
    glyph: char,
) -> std::io::Result<()> {
    let (col0, col1, row0, row1) = view.span(rect);
    let line: String = std::iter::repeat(glyph)
        .take((col1 - col0 + 1) as usize)
        .collect();
    for row in row0..=row1 {
        out.queue(cursor::MoveTo(col0, row))?;
        out.queue(Print(&line))?;
    }
    Ok(())
}

fn draw_player<W: Write>(out: &mut W, view: &Viewport, player: &Player) -> std::io::Result<()> {
    if player.destroy {
        return Ok(());
    }
    out.queue(style::SetForegroundColor(C_PLAYER))?;
    fill_rect(out, view, player.hitbox(), '█')
}

fn draw_enemy<W: Write>(out: &mut W, view: &Viewport, enemy: &Enemy) -> std::io::Result<()> {
    out.queue(style::SetForegroundColor(C_ENEMY))?;
    fill_rect(out, view, enemy.hitbox(), '▓')
}

fn draw_shield<W: Write>(out: &mut W, view: &Viewport, shield: &Shield) -> std::io::Result<()> {
    out.queue(style::SetForegroundColor(C_SHIELD))?;
    for part in &shield.parts {
        fill_rect(out, view, part.hitbox(), '▒')?;
    }
    Ok(())
}

fn draw_projectile<W: Write>(
    out: &mut W,
    view: &Viewport,
    projectile: &Projectile,
) -> std::io::Result<()> {
    let (col, row) = view.cell(projectile.x, projectile.y);
    out.queue(cursor::MoveTo(col, row))?;
    match projectile.owner {
        BulletOwner::Player => {
            out.queue(style::SetForegroundColor(C_BULLET_PLAYER))?;
            out.queue(Print("●"))?;
        }
        BulletOwner::Enemy => {
            out.queue(style::SetForegroundColor(C_BULLET_ENEMY))?;
            out.queue(Print("↓"))?;
        }
    }
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(
    out: &mut W,
    height: u16,
    pointer_steering: bool,
) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, height.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(controls_hint(pointer_steering)))?;
    Ok(())
}

// ── End-of-game overlay ───────────────────────────────────────────────────────

fn draw_end_screen<W: Write>(
    out: &mut W,
    state: &GameState,
    width: u16,
    height: u16,
) -> std::io::Result<()> {
    let (banner, color) = match state.status {
        GameStatus::Won => ("║     YOU  WIN     ║", Color::Green),
        _ => ("║    GAME  OVER    ║", Color::Red),
    };
    let score_line = format!("Final Score: {}", state.score);
    let lines: &[(&str, Color)] = &[
        ("╔══════════════════╗", color),
        (banner, color),
        ("╚══════════════════╝", color),
        (&score_line, Color::Yellow),
        ("R - Play Again  M - Menu  Q - Quit", Color::White),
    ];

    let cx = width / 2;
    let start_row = (height / 2).saturating_sub(lines.len() as u16 / 2);

    for (i, (msg, color)) in lines.iter().enumerate() {
        let row = start_row + i as u16;
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*msg))?;
    }

    Ok(())
}

// ── Start menu ────────────────────────────────────────────────────────────────

pub fn draw_menu<W: Write>(out: &mut W, pointer_steering: bool) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let (width, height) = terminal::size()?;
    let cx = width / 2;
    let cy = height / 2;

    let title = "★  SPACE  INVADERS  ★";
    out.queue(cursor::MoveTo(
        cx.saturating_sub(title.chars().count() as u16 / 2),
        cy.saturating_sub(5),
    ))?;
    out.queue(style::SetForegroundColor(Color::Cyan))?;
    out.queue(Print(title))?;

    out.queue(cursor::MoveTo(cx.saturating_sub(10), cy.saturating_sub(3)))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print("Select difficulty:"))?;

    let options: &[(&str, &str, Color, &str)] = &[
        ("1", "Easy  ", Color::Green, "Slow march, rare fire"),
        ("2", "Medium", Color::Yellow, "Balanced challenge"),
        ("3", "Hard  ", Color::Red, "Fast and relentless!"),
    ];

    for (i, (key, label, color, desc)) in options.iter().enumerate() {
        let row = cy.saturating_sub(1) + i as u16;
        out.queue(cursor::MoveTo(cx.saturating_sub(10), row))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!("[{}] ", key)))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(format!("{:<8}", label)))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!(" — {}", desc)))?;
    }

    out.queue(cursor::MoveTo(cx.saturating_sub(10), cy + 4))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(controls_hint(pointer_steering)))?;

    out.queue(style::ResetColor)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // 82×29 terminal → 80×25 play area, 10×20 surface units per cell
    fn view() -> Viewport {
        Viewport::new(82, 29, 800.0, 500.0)
    }

    #[test]
    fn origin_maps_inside_border() {
        assert_eq!(view().cell(0.0, 0.0), (1, 2));
    }

    #[test]
    fn far_corner_clamps_to_last_cell() {
        assert_eq!(view().cell(800.0, 500.0), (80, 26));
    }

    #[test]
    fn span_covers_whole_cells() {
        // Player-sized rect at (380, 450)
        let (c0, c1, r0, r1) = view().span(Rect::new(380.0, 450.0, 40.0, 20.0));
        assert_eq!((c0, c1), (1 + 38, 1 + 41));
        assert_eq!((r0, r1), (2 + 22, 2 + 23));
    }

    #[test]
    fn tiny_rect_still_covers_one_cell() {
        let (c0, c1, r0, r1) = view().span(Rect::new(5.0, 5.0, 0.1, 0.1));
        assert_eq!(c0, c1);
        assert_eq!(r0, r1);
    }

    #[test]
    fn hint_mentions_mouse_only_when_it_steers() {
        assert!(controls_hint(true).contains("Mouse"));
        assert!(!controls_hint(false).contains("Mouse"));
    }

    #[test]
    fn to_surface_returns_cell_centre() {
        let v = view();
        assert_eq!(v.to_surface(1, 2), (5.0, 10.0));
        let (x, y) = v.to_surface(40, 10);
        assert_eq!(v.cell(x, y), (40, 10));
    }
}
