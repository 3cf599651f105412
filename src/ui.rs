//! Layout and drawing: title, board, sidebar, pause and loss overlays.

use crate::MIN_COLUMNS;
use crate::app::Screen;
use crate::entity::{Arena, BubbleColor};
use crate::session::Session;
use crate::surface::{FinalTally, PixelCanvas, Stats};
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Gauge, Paragraph, Widget};
use std::time::Instant;
use tachyonfx::{Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx};

pub const SIDEBAR_WIDTH: u16 = 24;
/// Board never shrinks below this many terminal rows.
const MIN_BOARD_ROWS: u16 = 8;
/// Duration of the board fade when the session is lost.
const LOSS_FADE_MS: u32 = 900;
/// Consecutive pops per multiplier step (for the combo gauge).
const COMBO_STEP: u32 = 5;

/// Board interior size in terminal cells. We use half-blocks (▀): one arena pixel
/// per column, two per row.
pub fn board_cells(arena: Arena) -> (u16, u16) {
    (arena.width.ceil() as u16, (arena.height / 2.0).ceil() as u16)
}

/// Bubble columns that fit beside the sidebar, at most `requested` and never
/// fewer than `MIN_COLUMNS`. A terminal too narrow for that clips the board.
pub fn columns_for_terminal(term_cols: u16, radius: f32, requested: usize) -> usize {
    let free = f32::from(term_cols.saturating_sub(2).saturating_sub(SIDEBAR_WIDTH));
    let fit = ((free - radius) / (2.0 * radius)).floor().max(0.0) as usize;
    requested.min(fit).max(MIN_COLUMNS)
}

/// Arena height in pixels for a terminal height (board border excluded).
pub fn arena_height_for_terminal(term_rows: u16) -> f32 {
    f32::from(term_rows.saturating_sub(2).max(MIN_BOARD_ROWS)) * 2.0
}

/// Board (with border) and sidebar, centred in `area`.
fn game_layout(area: Rect, arena: Arena) -> (Rect, Rect) {
    let (bw, bh) = board_cells(arena);
    let (pw, ph) = (bw + 2, bh + 2);
    let total_w = pw + SIDEBAR_WIDTH;

    let horiz_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(ph),
            Constraint::Fill(1),
        ])
        .split(horiz_chunks[1]);
    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(pw), Constraint::Length(SIDEBAR_WIDTH)])
        .split(vert_chunks[1]);
    (inner[0], inner[1])
}

/// Board interior rect (where arena pixels land) for an arena drawn in `area`.
pub fn board_rect(area: Rect, arena: Arena) -> Rect {
    let (board, _) = game_layout(area, arena);
    Block::default().borders(Borders::ALL).inner(board)
}

/// Terminal cell to arena pixel, relative to the board interior. Cells outside the
/// board map outside the arena, which is fine for aiming.
pub fn cell_to_arena(board: Rect, column: u16, row: u16) -> (f32, f32) {
    let x = f32::from(column) - f32::from(board.x) + 0.5;
    let y = (f32::from(row) - f32::from(board.y)) * 2.0 + 1.0;
    (x, y)
}

fn mmss(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn color_name(color: BubbleColor) -> &'static str {
    match color {
        BubbleColor::Slate => "slate",
        BubbleColor::Plum => "plum",
        BubbleColor::Coral => "coral",
        BubbleColor::Peach => "peach",
        BubbleColor::Wild => "wild",
    }
}

/// Centred popup of the given size, clipped to `area`.
fn popup_rect(area: Rect, width: u16, height: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Draw current screen. On the loss screen the board fades out with TachyonFX
/// and `loss_effect` / `loss_effect_process_time` are updated.
pub fn draw(
    frame: &mut Frame,
    screen: Screen,
    session: &Session,
    theme: &Theme,
    canvas: &mut PixelCanvas,
    loss_effect: &mut Option<Effect>,
    loss_effect_process_time: &mut Option<Instant>,
    now: Instant,
) {
    let area = frame.area();
    match screen {
        Screen::Title => draw_title(frame, theme, area),
        Screen::Playing => draw_game(frame, session, theme, canvas, area, false),
        Screen::Paused => {
            draw_game(frame, session, theme, canvas, area, false);
            draw_pause_overlay(frame, theme, area);
        }
        Screen::Lost => {
            let faded = loss_effect.as_ref().is_some_and(|e| e.done());
            draw_game(frame, session, theme, canvas, area, faded);
            if !faded {
                apply_loss_effect(
                    frame,
                    session,
                    theme,
                    area,
                    loss_effect,
                    loss_effect_process_time,
                    now,
                );
            }
            if let Some(tally) = session.outcome() {
                draw_loss(frame, theme, &tally, board_rect(area, session.arena()));
            }
        }
    }
}

/// Create or update the loss fade and process it (TachyonFX: board fades to bg).
fn apply_loss_effect(
    frame: &mut Frame,
    session: &Session,
    theme: &Theme,
    area: Rect,
    loss_effect: &mut Option<Effect>,
    loss_effect_process_time: &mut Option<Instant>,
    now: Instant,
) {
    let board = board_rect(area, session.arena());
    let delta = loss_effect_process_time
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
    let tfx_delta = TfxDuration::from_millis(delta_ms);
    *loss_effect_process_time = Some(now);

    if loss_effect.is_none() {
        let bg = theme.bg;
        let effect =
            fx::fade_to(bg, bg, (LOSS_FADE_MS, Interpolation::Linear)).with_area(board);
        *loss_effect = Some(effect);
    }

    if let Some(effect) = loss_effect {
        frame.render_effect(effect, board, tfx_delta);
    }
}

fn draw_title(frame: &mut Frame, theme: &Theme, area: Rect) {
    let popup = popup_rect(area, 46, 17);
    let key_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let hint = |keys: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(format!("{keys:>12}  "), key_style),
            Span::styled(what, fg_style),
        ])
    };
    let swatches: Vec<Span> = BubbleColor::PALETTE
        .iter()
        .chain(std::iter::once(&BubbleColor::Wild))
        .map(|c| {
            Span::styled(
                " ● ",
                Style::default().fg(theme.bubble_color(c.index())).bold(),
            )
        })
        .collect();
    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(" Bubble ", Style::default().fg(theme.bubble[2]).bold()),
            Span::styled(" tui ", Style::default().fg(theme.main_fg).bold()),
        ]),
        Line::from(swatches),
        Line::from(""),
        hint("A/D ←/→", "move"),
        hint("W/S ↑/↓", "aim"),
        hint("mouse", "aim, click to fire"),
        hint("Space/Enter", "fire"),
        hint("R", "reload (new colour)"),
        hint("F", "load a wildcard"),
        hint("P", "pause"),
        Line::from(""),
        Line::from(Span::styled(
            " Match 3 to pop. Don't let the grid reach you. ",
            Style::default().fg(theme.inactive_fg),
        )),
        Line::from(""),
        Line::from(Span::styled(" Enter — Start    Q — Quit ", fg_style)),
    ];
    Clear.render(popup, frame.buffer_mut());
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .style(Style::default().bg(theme.bg))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
        )
        .render(popup, frame.buffer_mut());
}

fn draw_pause_overlay(frame: &mut Frame, theme: &Theme, area: Rect) {
    let popup = popup_rect(area, 28, 5);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Paused ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " P — Resume    Q — Quit ",
            Style::default().fg(theme.main_fg),
        )),
    ];
    Clear.render(popup, frame.buffer_mut());
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .style(Style::default().bg(theme.bg))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
        )
        .render(popup, frame.buffer_mut());
}

fn draw_loss(frame: &mut Frame, theme: &Theme, tally: &FinalTally, board: Rect) {
    let popup = popup_rect(board, 30, 10);
    let fg_style = Style::default().fg(theme.main_fg);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Game Over ",
            Style::default().fg(Color::White).bg(Color::Red),
        )),
        Line::from(""),
        Line::from(Span::styled(format!(" Score: {:.1} ", tally.score), fg_style)),
        Line::from(Span::styled(format!(" Max combo: {} ", tally.max_combo), fg_style)),
        Line::from(Span::styled(format!(" Time: {} ", mmss(tally.elapsed_secs)), fg_style)),
        Line::from(""),
        Line::from(Span::styled(" R — Restart    Q — Quit ", fg_style)),
    ];
    Clear.render(popup, frame.buffer_mut());
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .style(Style::default().bg(theme.bg))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
                .title(Span::styled(" Bubbletui ", theme.title)),
        )
        .render(popup, frame.buffer_mut());
}

/// Draw game: board + sidebar, centred in the full area.
fn draw_game(
    frame: &mut Frame,
    session: &Session,
    theme: &Theme,
    canvas: &mut PixelCanvas,
    area: Rect,
    faded: bool,
) {
    let (board_area, sidebar_area) = game_layout(area, session.arena());
    let stats = session.stats();
    draw_board(frame, session, &stats, theme, canvas, board_area, faded);
    draw_sidebar(frame, &stats, theme, sidebar_area);
}

fn draw_board(
    frame: &mut Frame,
    session: &Session,
    stats: &Stats,
    theme: &Theme,
    canvas: &mut PixelCanvas,
    area: Rect,
    faded: bool,
) {
    let title = format!(
        " Bubbletui  {}  | Score: {:.1} ",
        mmss(stats.elapsed_secs),
        stats.score
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(title, theme.title));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());

    let (bw, bh) = board_cells(session.arena());
    let (w, h) = (bw.min(inner.width), bh.min(inner.height));
    let buf = frame.buffer_mut();
    if faded {
        for y in inner.y..inner.y + h {
            for x in inner.x..inner.x + w {
                buf[(x, y)].set_symbol(" ").set_style(Style::default().bg(theme.bg));
            }
        }
        return;
    }

    let (pw, ph) = (usize::from(bw), usize::from(bh) * 2);
    if canvas.width() != pw || canvas.height() != ph {
        *canvas = PixelCanvas::new(pw, ph, theme);
    }
    session.render(canvas);

    // Empty pixels on the defense line show the line
    let defense_row = session.defense_line().max(0.0) as usize;
    let pixel_color = |x: usize, y: usize| match canvas.pixel(x, y) {
        Some(p) if y == defense_row && p == canvas.background() => theme.div_line,
        Some((r, g, b)) => Color::Rgb(r, g, b),
        None => theme.bg,
    };

    // Iterate by terminal rows (y step 2)
    for ty in 0..h {
        for tx in 0..w {
            let (x, y) = (usize::from(tx), usize::from(ty) * 2);
            let top = pixel_color(x, y);
            let bottom = pixel_color(x, y + 1);
            buf[(inner.x + tx, inner.y + ty)]
                .set_symbol("▀")
                .set_style(Style::default().fg(top).bg(bottom));
        }
    }
}

fn draw_sidebar(frame: &mut Frame, stats: &Stats, theme: &Theme, area: Rect) {
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let border_style = Style::default().fg(theme.div_line).bg(theme.bg);

    // Free-floating sections with their own borders; vertical layout with small gaps
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Next (border + title + swatch)
            Constraint::Length(1), // gap
            Constraint::Length(6), // Stats (border + score, best combo, time, multiplier)
            Constraint::Length(1), // gap
            Constraint::Length(4), // Combo (border + label + progress bar)
            Constraint::Length(1), // gap
            Constraint::Length(3), // Wild ammo
            Constraint::Fill(1),
        ])
        .split(area);

    // --- Next ---
    let next_inner = section(frame, chunks[0], border_style);
    let next_color = theme.bubble_color(stats.next_color.index());
    let next_lines = vec![
        Line::from(Span::styled("Next", title_style)),
        Line::from(vec![
            Span::styled("██ ", Style::default().fg(next_color)),
            Span::styled(color_name(stats.next_color), fg_style),
        ]),
    ];
    Paragraph::new(Text::from(next_lines)).render(next_inner, frame.buffer_mut());

    // --- Stats ---
    let stats_inner = section(frame, chunks[2], border_style);
    let stats_lines = vec![
        Line::from(vec![
            Span::styled("Score: ", title_style),
            Span::styled(format!("{:.1}", stats.score), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Max combo: ", title_style),
            Span::styled(stats.max_combo.to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Time: ", title_style),
            Span::styled(mmss(stats.elapsed_secs), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Multiplier: ", title_style),
            Span::styled(format!("x{}", stats.multiplier), fg_style),
        ]),
    ];
    Paragraph::new(Text::from(stats_lines)).render(stats_inner, frame.buffer_mut());

    // --- Combo: current combo above, progress to the next multiplier below ---
    let combo_inner = section(frame, chunks[4], border_style);
    let combo_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(combo_inner);
    Paragraph::new(Line::from(Span::styled(
        format!("Combo {}", stats.combo),
        title_style,
    )))
    .render(combo_layout[0], frame.buffer_mut());
    let combo_ratio = combo_progress(stats);
    let bar_color = if combo_ratio > 0.6 {
        Color::Green
    } else if combo_ratio > 0.3 {
        Color::Yellow
    } else {
        Color::Red
    };
    Gauge::default()
        .ratio(combo_ratio)
        .gauge_style(Style::default().fg(bar_color))
        .render(combo_layout[1], frame.buffer_mut());

    // --- Wild ammo ---
    let wild_inner = section(frame, chunks[6], border_style);
    let wild_color = theme.bubble_color(BubbleColor::Wild.index());
    Paragraph::new(Line::from(vec![
        Span::styled("Wild: ", title_style),
        Span::styled(stats.wild_ammo.to_string(), fg_style),
        Span::styled("  ●", Style::default().fg(wild_color)),
    ]))
    .render(wild_inner, frame.buffer_mut());

    Paragraph::new(Text::from(vec![
        Line::from(" R reload  F wild"),
        Line::from(" P pause   Q quit"),
    ]))
    .style(Style::default().fg(theme.inactive_fg))
    .render(chunks[7], frame.buffer_mut());
}

/// Bordered sidebar section; returns its interior.
fn section(frame: &mut Frame, area: Rect, border_style: Style) -> Rect {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style);
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());
    inner
}

/// Progress toward the next multiplier step; full once the multiplier is capped.
fn combo_progress(stats: &Stats) -> f64 {
    if stats.multiplier >= 5 {
        1.0
    } else {
        f64::from(stats.combo % COMBO_STEP) / f64::from(COMBO_STEP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GameConfig;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_board_cells_use_half_blocks() {
        let arena = Arena {
            width: 63.0,
            height: 60.0,
        };
        assert_eq!(board_cells(arena), (63, 30));
    }

    #[test]
    fn test_columns_clamped_to_terminal() {
        // 80 cols: 80 - 2 - 24 = 54 free, (54 - 3) / 6 = 8
        assert_eq!(columns_for_terminal(80, 3.0, 10), 8);
        assert_eq!(columns_for_terminal(200, 3.0, 10), 10);
        assert_eq!(columns_for_terminal(20, 3.0, 10), MIN_COLUMNS);
        assert_eq!(columns_for_terminal(50, 3.0, 10), MIN_COLUMNS);
        assert_eq!(columns_for_terminal(56, 3.0, 10), 4);
        assert_eq!(columns_for_terminal(62, 3.0, 10), 5);
    }

    #[test]
    fn test_arena_height_for_terminal() {
        assert_eq!(arena_height_for_terminal(24), 44.0);
        assert_eq!(arena_height_for_terminal(3), f32::from(MIN_BOARD_ROWS) * 2.0);
    }

    #[test]
    fn test_cell_to_arena() {
        let board = Rect::new(10, 5, 30, 20);
        assert_eq!(cell_to_arena(board, 10, 5), (0.5, 1.0));
        assert_eq!(cell_to_arena(board, 13, 7), (3.5, 5.0));
    }

    #[test]
    fn test_combo_progress() {
        let mut stats = Stats {
            score: 0.0,
            max_combo: 0,
            combo: 3,
            elapsed_secs: 0,
            multiplier: 1,
            wild_ammo: 0,
            next_color: BubbleColor::Slate,
        };
        assert!((combo_progress(&stats) - 0.6).abs() < 1e-9);
        stats.combo = 40;
        stats.multiplier = 5;
        assert_eq!(combo_progress(&stats), 1.0);
    }

    #[test]
    fn test_draw_blits_board_and_overlays() {
        let config = GameConfig {
            columns: 6,
            seed: Some(5),
            ..GameConfig::default()
        };
        let session = Session::new(&config, arena_height_for_terminal(30));
        let theme = Theme::default();
        let mut canvas = PixelCanvas::new(1, 1, &theme);
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        let now = Instant::now();
        for screen in [Screen::Title, Screen::Playing, Screen::Paused] {
            terminal
                .draw(|f| {
                    draw(f, screen, &session, &theme, &mut canvas, &mut None, &mut None, now)
                })
                .unwrap();
        }
        let buffer = terminal.backend().buffer();
        assert!(buffer.content.iter().any(|c| c.symbol() == "▀"));
        assert_eq!(canvas.width(), board_cells(session.arena()).0 as usize);
    }
}
