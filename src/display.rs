/// Rendering layer — all terminal output lives here.
///
/// The playfield is a continuous `width × height` area; `Viewport` squeezes it
/// into whatever the terminal offers.  No game logic happens here.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal, QueueableCommand,
};
use formation_shooter::engine::Notice;
use formation_shooter::entities::{Bounds, GameSession, SessionStats};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_WAVE: Color = Color::Yellow;
const C_HUD_AMMO: Color = Color::Cyan;
const C_PLAYER: Color = Color::White;
const C_ALIEN_ROWS: [Color; 3] = [Color::Magenta, Color::Green, Color::Red];
const C_BULLET: Color = Color::Cyan;
const C_HINT: Color = Color::DarkGrey;

// ── Field → terminal mapping ─────────────────────────────────────────────────

/// Maps field coordinates onto the cells inside the border.
///
/// Layout: row 0 HUD, row 1 top border, rows `2..rows-2` playfield, row
/// `rows-2` bottom border, row `rows-1` controls hint.
#[derive(Clone, Copy, Debug)]
pub struct Viewport {
    cols: u16,
    rows: u16,
    field_width: f32,
    field_height: f32,
}

impl Viewport {
    pub fn new(cols: u16, rows: u16, field_width: f32, field_height: f32) -> Self {
        Self {
            cols,
            rows,
            field_width,
            field_height,
        }
    }

    fn inner_width(&self) -> u16 {
        self.cols.saturating_sub(2).max(1)
    }

    fn inner_height(&self) -> u16 {
        self.rows.saturating_sub(4).max(1)
    }

    /// Cell for a field point, or `None` when the point lies off the field.
    pub fn to_cell(&self, x: f32, y: f32) -> Option<(u16, u16)> {
        if !(0.0..self.field_width).contains(&x) || !(0.0..self.field_height).contains(&y) {
            return None;
        }
        let inner_w = self.inner_width();
        let inner_h = self.inner_height();
        let col = ((x / self.field_width) * inner_w as f32) as u16;
        let row = ((y / self.field_height) * inner_h as f32) as u16;
        Some((1 + col.min(inner_w - 1), 2 + row.min(inner_h - 1)))
    }

    /// Number of cells a field width covers, at least one.
    pub fn span(&self, width: f32) -> u16 {
        let cells = (width / self.field_width * self.inner_width() as f32).round() as u16;
        cells.max(1)
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(
    out: &mut W,
    session: &GameSession,
    notice: Option<&Notice>,
    view: &Viewport,
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, view)?;
    draw_hud(out, session, view)?;

    let cols = session.formation.layout().cols.max(1);
    for (id, alien) in session.formation.active() {
        let row = id.0 / cols;
        let color = C_ALIEN_ROWS[row % C_ALIEN_ROWS.len()];
        draw_alien(out, &alien.bounds, color, view)?;
    }
    for (_, bullet) in session.bullets.active() {
        draw_bullet(out, &bullet.bounds, view)?;
    }

    draw_ship(out, &session.ship.bounds, view)?;
    draw_controls_hint(out, view)?;

    if let Some(notice) = notice {
        draw_notice(out, notice, session, view)?;
    }

    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, view.rows.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, view: &Viewport) -> std::io::Result<()> {
    let w = view.cols as usize;
    let h = view.rows;

    out.queue(style::SetForegroundColor(C_BORDER))?;

    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    out.queue(cursor::MoveTo(0, h.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    for row in 2..h.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(view.cols.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, session: &GameSession, view: &Viewport) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_WAVE))?;
    out.queue(Print(format!(
        "Wave: {:>3}   Destroyed: {:>5}",
        session.stats.wave, session.stats.aliens_destroyed
    )))?;

    let ammo = format!(
        "Ammo: {}{}",
        "|".repeat(session.bullets.free_count()),
        ".".repeat(session.bullets.active_count())
    );
    let rx = view.cols.saturating_sub(ammo.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_AMMO))?;
    out.queue(Print(&ammo))?;

    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_ship<W: Write>(out: &mut W, ship: &Bounds, view: &Viewport) -> std::io::Result<()> {
    let Some((col, row)) = view.to_cell(ship.x + ship.width / 2.0, ship.y) else {
        return Ok(());
    };
    out.queue(style::SetForegroundColor(C_PLAYER))?;
    out.queue(cursor::MoveTo(col.saturating_sub(1).max(1), row))?;
    out.queue(Print("/▲\\"))?;
    Ok(())
}

fn draw_alien<W: Write>(
    out: &mut W,
    alien: &Bounds,
    color: Color,
    view: &Viewport,
) -> std::io::Result<()> {
    let Some((col, row)) = view.to_cell(alien.x, alien.y) else {
        return Ok(());
    };
    let sprite = if view.span(alien.width) >= 3 { "<▼>" } else { "▼" };
    out.queue(style::SetForegroundColor(color))?;
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(Print(sprite))?;
    Ok(())
}

fn draw_bullet<W: Write>(out: &mut W, bullet: &Bounds, view: &Viewport) -> std::io::Result<()> {
    let Some((col, row)) = view.to_cell(bullet.x + bullet.width / 2.0, bullet.y) else {
        return Ok(());
    };
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(C_BULLET))?;
    out.queue(Print("║"))?;
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, view: &Viewport) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, view.rows.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("← → / A D : Move   SPACE : Shoot   Q : Quit"))?;
    Ok(())
}

/// `wave` is the wave in play, not a count of finished ones.
fn summary_line(stats: &SessionStats) -> String {
    format!("Wave: {}   Destroyed: {}", stats.wave, stats.aliens_destroyed)
}

// ── Notice overlay ────────────────────────────────────────────────────────────

fn draw_notice<W: Write>(
    out: &mut W,
    notice: &Notice,
    session: &GameSession,
    view: &Viewport,
) -> std::io::Result<()> {
    let (cx, cy) = view
        .to_cell(notice.x, notice.y)
        .unwrap_or((view.cols / 2, view.rows / 2));

    let inner = notice.text.chars().count() + 8;
    let top = format!("╔{}╗", "═".repeat(inner));
    let middle = format!("║{:^inner$}║", notice.text);
    let bottom = format!("╚{}╝", "═".repeat(inner));
    let summary = summary_line(&session.stats);
    let lines: [(&str, Color); 5] = [
        (&top, Color::Red),
        (&middle, Color::Red),
        (&bottom, Color::Red),
        (&summary, Color::Yellow),
        ("Q - Quit", Color::White),
    ];

    let start_row = cy.saturating_sub(lines.len() as u16 / 2);
    for (i, (msg, color)) in lines.iter().enumerate() {
        let row = start_row + i as u16;
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*msg))?;
    }

    Ok(())
}
