//! Bubbletui — bubble-shooter arcade game in the terminal.

mod app;
mod clock;
mod entity;
mod grid;
mod input;
mod lattice;
mod session;
mod snap;
mod surface;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, ValueEnum};
use std::path::Path;
use thiserror::Error;

pub const MIN_COLUMNS: usize = 4;
const MIN_RADIUS: f32 = 1.0;

/// Options derived from CLI that shape a session (grid size, pacing, ammo, randomness).
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub columns: usize,
    pub initial_rows: usize,
    /// Bubble radius in arena pixels.
    pub radius: f32,
    /// Simulation ticks per second.
    pub tick_rate: f64,
    /// Seconds between new rows.
    pub row_interval: u32,
    /// Seconds per regenerated wildcard.
    pub ammo_interval: u32,
    /// Wildcards at session start.
    pub wild_ammo: u32,
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            columns: 10,
            initial_rows: 5,
            radius: 3.0,
            tick_rate: 60.0,
            row_interval: default_row_interval(10),
            ammo_interval: 2,
            wild_ammo: 3,
            seed: None,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("--columns must be at least {MIN_COLUMNS} (got {0})")]
    TooFewColumns(usize),
    #[error("--initial-rows must be at least 1")]
    NoRows,
    #[error("--radius must be at least {MIN_RADIUS} (got {0})")]
    RadiusTooSmall(f32),
    #[error("--tick-rate must be a positive number (got {0})")]
    BadTickRate(f64),
    #[error("--{0} must be at least 1 second")]
    ZeroInterval(&'static str),
}

/// One new row every `columns / 3` seconds, at least every second.
fn default_row_interval(columns: usize) -> u32 {
    u32::try_from(columns / 3).unwrap_or(u32::MAX).max(1)
}

impl GameConfig {
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        if args.columns < MIN_COLUMNS {
            return Err(ConfigError::TooFewColumns(args.columns));
        }
        if args.initial_rows == 0 {
            return Err(ConfigError::NoRows);
        }
        if args.radius.is_nan() || args.radius < MIN_RADIUS {
            return Err(ConfigError::RadiusTooSmall(args.radius));
        }
        if !args.tick_rate.is_finite() || args.tick_rate <= 0.0 {
            return Err(ConfigError::BadTickRate(args.tick_rate));
        }
        let row_interval = args
            .row_interval
            .unwrap_or_else(|| default_row_interval(args.columns));
        if row_interval == 0 {
            return Err(ConfigError::ZeroInterval("row-interval"));
        }
        if args.ammo_interval == 0 {
            return Err(ConfigError::ZeroInterval("ammo-interval"));
        }
        Ok(Self {
            columns: args.columns,
            initial_rows: args.initial_rows,
            radius: args.radius,
            tick_rate: args.tick_rate,
            row_interval,
            ammo_interval: args.ammo_interval,
            wild_ammo: args.wild_ammo,
            seed: args.seed,
        })
    }
}

/// Log to `path` (the terminal belongs to the UI). Filter from RUST_LOG, default info.
fn init_logging(path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }
    let config = GameConfig::from_args(&args)?;
    let theme = match theme::Theme::load(args.theme.as_deref(), args.palette) {
        Ok(theme) => theme,
        Err(e) => {
            log::warn!("theme not loaded, using built-in colours: {e}");
            theme::Theme::default_for_palette(args.palette)
        }
    };
    log::info!("starting with {config:?}");
    let mut app = App::new(args, config, theme)?;
    app.run()?;
    Ok(())
}

/// Bubble-shooter arcade game in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "bubbletui",
    version,
    about = "Bubble-shooter arcade game in the terminal. Match three to pop; don't let the grid reach you.",
    long_about = "Bubbletui is a terminal bubble shooter.\n\n\
        A grid of coloured bubbles hangs from the ceiling and a new row is pushed in every few \
        seconds. Fire bubbles from the bottom: three or more of one colour pop, and anything left \
        hanging without a path to the ceiling falls for bonus points. Consecutive pops build a \
        combo that raises the score multiplier.\n\n\
        CONTROLS:\n  A/D, Left/Right   Move         W/S, Up/Down   Aim\n  Mouse             Aim          Click, Space   Fire\n  \
        R                 Reload       F              Load a wildcard\n  P                 Pause        Q / Esc        Quit\n  \
        Shift+R           Restart\n\n\
        Vim keys h/l move and k/j aim. Use --theme to load a btop-style theme (e.g. onedark.theme)."
)]
pub struct Args {
    /// Bubbles per row. Clamped so the board fits the terminal.
    #[arg(long, default_value = "10", value_name = "N")]
    pub columns: usize,

    /// Rows of bubbles at the start.
    #[arg(long, default_value = "5", value_name = "N")]
    pub initial_rows: usize,

    /// Bubble radius in board pixels (one terminal column, half a terminal row).
    #[arg(long, default_value = "3.0", value_name = "PX")]
    pub radius: f32,

    /// Simulation ticks per second.
    #[arg(long, default_value = "60.0", value_name = "RATE")]
    pub tick_rate: f64,

    /// Seconds between new rows. Defaults to columns / 3.
    #[arg(long, value_name = "SECS")]
    pub row_interval: Option<u32>,

    /// Seconds per regenerated wildcard.
    #[arg(long, default_value = "2", value_name = "SECS")]
    pub ammo_interval: u32,

    /// Wildcards at the start.
    #[arg(long, default_value = "3", value_name = "N")]
    pub wild_ammo: u32,

    /// Seed for bubble colours and particles (reproducible games).
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses the built-in dusk theme if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<std::path::PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Skip the title screen and start playing immediately.
    #[arg(long)]
    pub no_menu: bool,

    /// Ring the terminal bell when bubbles pop.
    #[arg(long)]
    pub bell: bool,

    /// Write a log to this file (RUST_LOG sets the level, default info).
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<std::path::PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Args {
        Args::parse_from(std::iter::once("bubbletui").chain(extra.iter().copied()))
    }

    #[test]
    fn test_defaults() {
        let config = GameConfig::from_args(&parse(&[])).unwrap();
        assert_eq!(config.columns, 10);
        assert_eq!(config.initial_rows, 5);
        assert_eq!(config.row_interval, 3);
        assert_eq!(config.ammo_interval, 2);
        assert_eq!(config.wild_ammo, 3);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_row_interval_follows_columns() {
        let config = GameConfig::from_args(&parse(&["--columns", "4"])).unwrap();
        assert_eq!(config.row_interval, 1);
        let config = GameConfig::from_args(&parse(&["--columns", "12", "--row-interval", "7"])).unwrap();
        assert_eq!(config.row_interval, 7);
    }

    #[test]
    fn test_validation() {
        assert_eq!(
            GameConfig::from_args(&parse(&["--columns", "3"])).unwrap_err(),
            ConfigError::TooFewColumns(3)
        );
        assert_eq!(
            GameConfig::from_args(&parse(&["--initial-rows", "0"])).unwrap_err(),
            ConfigError::NoRows
        );
        assert_eq!(
            GameConfig::from_args(&parse(&["--radius", "0.5"])).unwrap_err(),
            ConfigError::RadiusTooSmall(0.5)
        );
        assert_eq!(
            GameConfig::from_args(&parse(&["--tick-rate", "0"])).unwrap_err(),
            ConfigError::BadTickRate(0.0)
        );
        assert_eq!(
            GameConfig::from_args(&parse(&["--ammo-interval", "0"])).unwrap_err(),
            ConfigError::ZeroInterval("ammo-interval")
        );
    }

    #[test]
    fn test_palette_aliases() {
        assert_eq!(parse(&["--palette", "contrast"]).palette, Palette::HighContrast);
        assert_eq!(parse(&["--palette", "colourblind"]).palette, Palette::Colorblind);
    }
}
