//! App: terminal init, main loop, tick and input handling.

use crate::clock::{FrameGate, Metronome};
use crate::input::{Action, key_to_action, mouse_to_action};
use crate::session::{Direction, ReloadKind, Session};
use crate::surface::{AudioEvent, PixelCanvas, SoundLog, SoundSink};
use crate::theme::Theme;
use crate::{Args, GameConfig};
use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};
use tachyonfx::Effect;

/// Aim change per key press, in radians.
const AIM_STEP: f32 = 0.05;
/// Without release events a held move key ends this long after its last press or repeat.
const HOLD_TIMEOUT_MS: u64 = 180;
/// Redraw at least this often on screens without a running session.
const IDLE_FRAME_MS: u64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Title,
    Playing,
    Paused,
    Lost,
}

pub struct App {
    args: Args,
    config: GameConfig,
    theme: Theme,
    session: Session,
    screen: Screen,
    canvas: PixelCanvas,
    gate: FrameGate,
    seconds: Metronome,
    sound: SoundLog,
    music_started: bool,
    /// Whether the terminal reports key releases.
    release_events: bool,
    /// Held move and, without release events, when the hold lapses.
    held: Option<(Direction, Option<Instant>)>,
    /// TachyonFX fade over the board on the loss screen.
    loss_effect: Option<Effect>,
    /// Last time we processed the loss effect (for delta).
    loss_effect_process_time: Option<Instant>,
}

impl App {
    pub fn new(args: Args, config: GameConfig, theme: Theme) -> Result<Self> {
        let session = Session::new(&config, crate::ui::arena_height_for_terminal(24));
        let screen = if args.no_menu {
            Screen::Playing
        } else {
            Screen::Title
        };
        let now = Instant::now();
        let sound = SoundLog { bell: args.bell };
        let canvas = PixelCanvas::new(1, 1, &theme);
        Ok(Self {
            gate: FrameGate::new(config.tick_rate, now),
            seconds: Metronome::new(Duration::from_secs(1), now),
            args,
            config,
            theme,
            session,
            screen,
            canvas,
            sound,
            music_started: false,
            release_events: false,
            held: None,
            loss_effect: None,
            loss_effect_process_time: None,
        })
    }

    /// Fresh session for the current terminal size; everything else is kept.
    fn restart(&mut self, now: Instant) {
        let (cols, rows) = crossterm::terminal::size().unwrap_or((80, 24));
        self.fit_to_terminal(cols);
        self.session = Session::new(&self.config, crate::ui::arena_height_for_terminal(rows));
        self.screen = Screen::Playing;
        self.held = None;
        self.loss_effect = None;
        self.loss_effect_process_time = None;
        self.gate.reset(now);
        self.seconds = Metronome::new(Duration::from_secs(1), now);
        log::info!("restart");
    }

    /// Clamp columns so the board and sidebar fit the terminal.
    fn fit_to_terminal(&mut self, cols: u16) {
        let fit =
            crate::ui::columns_for_terminal(cols, self.config.radius, self.args.columns);
        if fit != self.config.columns {
            log::info!("{} columns fit the terminal (asked for {})", fit, self.args.columns);
            self.config.columns = fit;
        }
    }

    fn start_music(&mut self) {
        if !self.music_started {
            self.sound.play(AudioEvent::BackgroundMusic);
            self.music_started = true;
        }
    }

    fn pause(&mut self, now: Instant) {
        self.screen = Screen::Paused;
        self.seconds.pause(now);
        self.release_held();
        log::debug!("paused");
    }

    fn resume(&mut self, now: Instant) {
        self.screen = Screen::Playing;
        self.seconds.resume(now);
        self.gate.reset(now);
        log::debug!("resumed");
    }

    fn release_held(&mut self) {
        if let Some((direction, _)) = self.held.take() {
            self.session.handle_move(direction, false);
        }
    }

    fn hold(&mut self, direction: Direction, now: Instant) {
        if let Some((held, _)) = self.held {
            if held != direction {
                self.session.handle_move(held, false);
            }
        }
        self.session.handle_move(direction, true);
        let lapse = (!self.release_events).then(|| now + Duration::from_millis(HOLD_TIMEOUT_MS));
        self.held = Some((direction, lapse));
    }

    fn pointer_to_arena(&self, column: u16, row: u16) -> (f32, f32) {
        let (cols, rows) = crossterm::terminal::size().unwrap_or((80, 24));
        let area = ratatui::layout::Rect::new(0, 0, cols, rows);
        let board = crate::ui::board_rect(area, self.session.arena());
        crate::ui::cell_to_arena(board, column, row)
    }

    fn apply_action(&mut self, action: Action, now: Instant) {
        match action {
            Action::MoveLeft => self.hold(Direction::Left, now),
            Action::MoveRight => self.hold(Direction::Right, now),
            Action::AimLeft => self.session.handle_aim(self.session.aim_angle() - AIM_STEP),
            Action::AimRight => self.session.handle_aim(self.session.aim_angle() + AIM_STEP),
            Action::Fire => self.session.handle_fire(),
            Action::Reload => self.session.handle_reload(ReloadKind::Normal),
            Action::WildReload => self.session.handle_reload(ReloadKind::Wild),
            Action::Pointer { column, row } => {
                let (x, y) = self.pointer_to_arena(column, row);
                self.session.handle_pointer(x, y);
            }
            Action::FireAt { column, row } => {
                let (x, y) = self.pointer_to_arena(column, row);
                self.session.handle_pointer(x, y);
                self.session.handle_fire();
            }
            Action::Pause | Action::Restart | Action::Quit | Action::None => {}
        }
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            event::{
                DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags,
                PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
            },
            execute,
            terminal::{
                EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
                size, supports_keyboard_enhancement,
            },
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

        // Release events let a held move key stop exactly when it is let go.
        self.release_events = supports_keyboard_enhancement().unwrap_or(false)
            && execute!(
                stdout,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )
            .is_ok();
        log::debug!("key release events: {}", self.release_events);

        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        // Size the board to the terminal before the first session starts
        let (term_cols, term_rows) = size()?;
        self.fit_to_terminal(term_cols);
        self.session =
            Session::new(&self.config, crate::ui::arena_height_for_terminal(term_rows));
        if self.screen == Screen::Playing {
            self.start_music();
        }

        let result = self.run_loop(&mut terminal);

        // Restore
        if self.release_events {
            let _ = execute!(std::io::stdout(), PopKeyboardEnhancementFlags);
        }
        execute!(std::io::stdout(), DisableMouseCapture, LeaveAlternateScreen)?;
        disable_raw_mode()?;

        if let Some(tally) = self.session.outcome() {
            log::info!(
                "final score {:.0}, best combo {}, {}s",
                tally.score,
                tally.max_combo,
                tally.elapsed_secs
            );
        }
        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            let now = Instant::now();

            if self.screen == Screen::Playing {
                for _ in 0..self.seconds.beats(now) {
                    self.session.clock_second();
                }
                if let Some((_, Some(lapse))) = self.held {
                    if now >= lapse {
                        self.release_held();
                    }
                }
                if self.gate.ready(now) {
                    self.session.tick();
                }
                for cue in self.session.drain_audio() {
                    self.sound.play(cue);
                }
                if self.session.is_lost() {
                    self.screen = Screen::Lost;
                    self.held = None;
                    if let Some(tally) = self.session.outcome() {
                        log::info!("lost with score {:.0}", tally.score);
                    }
                }
            }

            terminal.draw(|f| {
                crate::ui::draw(
                    f,
                    self.screen,
                    &self.session,
                    &self.theme,
                    &mut self.canvas,
                    &mut self.loss_effect,
                    &mut self.loss_effect_process_time,
                    now,
                );
            })?;

            let timeout = match self.screen {
                Screen::Playing => self
                    .gate
                    .until_next(now)
                    .min(self.seconds.until_next(now)),
                Screen::Lost if !self.loss_effect.as_ref().is_some_and(Effect::done) => {
                    self.gate.interval()
                }
                _ => Duration::from_millis(IDLE_FRAME_MS),
            };

            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    let quit = match event::read()? {
                        Event::Key(key) => self.on_key(key, Instant::now()),
                        Event::Mouse(mouse) if self.screen == Screen::Playing => {
                            self.apply_action(mouse_to_action(mouse), Instant::now());
                            false
                        }
                        Event::Resize(_, rows) => {
                            self.session
                                .resize(crate::ui::arena_height_for_terminal(rows));
                            false
                        }
                        _ => false,
                    };
                    if quit {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Handle one key event. Returns true when the app should exit.
    fn on_key(&mut self, key: KeyEvent, now: Instant) -> bool {
        let action = key_to_action(key);

        if key.kind == KeyEventKind::Release {
            if let Some((direction, _)) = self.held {
                let released = matches!(
                    (direction, action),
                    (Direction::Left, Action::MoveLeft) | (Direction::Right, Action::MoveRight)
                );
                if released {
                    self.release_held();
                }
            }
            return false;
        }
        // Repeats only keep a held move alive.
        if key.kind == KeyEventKind::Repeat && !action.is_held() {
            return false;
        }

        match self.screen {
            Screen::Title => match action {
                Action::Quit => return true,
                Action::Fire | Action::Restart => {
                    self.restart(now);
                    self.start_music();
                }
                _ => {}
            },
            Screen::Playing => match action {
                Action::Quit => return true,
                Action::Pause => self.pause(now),
                Action::Restart => self.restart(now),
                other => self.apply_action(other, now),
            },
            Screen::Paused => match action {
                Action::Quit => return true,
                Action::Pause | Action::Fire => self.resume(now),
                Action::Restart => self.restart(now),
                _ => {}
            },
            Screen::Lost => match action {
                Action::Quit => return true,
                Action::Restart | Action::Reload => self.restart(now),
                _ => {}
            },
        }
        false
    }
}
