//! Boundaries to the outside world: the drawing surface, sound, and the stat
//! snapshot the shell displays. Also `PixelCanvas`, the surface the terminal UI
//! renders into before blitting it with half-blocks.

use crate::entity::BubbleColor;
use crate::theme::{Theme, rgb_of};
use std::io::Write;

/// Axis-aligned rectangle in arena pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Something the session can draw on.
pub trait Surface {
    fn clear_region(&mut self, region: Region);
    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: BubbleColor, alpha: f32);
    fn stroke_line(&mut self, points: &[(f32, f32)], color: BubbleColor, width: f32);
}

/// One-shot sound cue. The session queues these; the shell plays them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioEvent {
    Shoot,
    WallBounce,
    Snap,
    Pop,
    Reload,
    BackgroundMusic,
}

impl AudioEvent {
    pub fn volume(self) -> f32 {
        match self {
            Self::Shoot | Self::Pop | Self::Reload => 0.6,
            Self::WallBounce => 1.0,
            Self::Snap => 0.2,
            Self::BackgroundMusic => 0.3,
        }
    }
}

/// Fire-and-forget sound player.
pub trait SoundSink {
    fn play(&mut self, event: AudioEvent);
}

/// Terminal "audio": logs every cue and optionally rings the bell on pops.
#[derive(Debug, Default)]
pub struct SoundLog {
    pub bell: bool,
}

impl SoundSink for SoundLog {
    fn play(&mut self, event: AudioEvent) {
        log::trace!("sound {:?} @ {:.1}", event, event.volume());
        if self.bell && event == AudioEvent::Pop {
            let mut out = std::io::stdout();
            let _ = out.write_all(b"\x07").and_then(|()| out.flush());
        }
    }
}

/// Values for the stat display, sampled once per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    pub score: f64,
    pub max_combo: u32,
    pub combo: u32,
    pub elapsed_secs: u32,
    pub multiplier: u32,
    pub wild_ammo: u32,
    pub next_color: BubbleColor,
}

/// Carried by the "session lost" signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinalTally {
    pub score: f64,
    pub max_combo: u32,
    pub elapsed_secs: u32,
}

pub type Rgb = (u8, u8, u8);

/// RGB pixel buffer implementing `Surface`. One pixel per arena pixel.
#[derive(Debug, Clone)]
pub struct PixelCanvas {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
    background: Rgb,
    /// Palette colours followed by the wildcard colour.
    bubbles: [Rgb; 5],
}

impl PixelCanvas {
    pub fn new(width: usize, height: usize, theme: &Theme) -> Self {
        let background = rgb_of(theme.bg);
        Self {
            width,
            height,
            pixels: vec![background; width * height],
            background,
            bubbles: std::array::from_fn(|i| rgb_of(theme.bubble[i])),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn background(&self) -> Rgb {
        self.background
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    fn blend(&mut self, x: i64, y: i64, color: Rgb, alpha: f32) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let alpha = alpha.clamp(0.0, 1.0);
        let dst = &mut self.pixels[y as usize * self.width + x as usize];
        let mix = |d: u8, s: u8| (f32::from(d) + (f32::from(s) - f32::from(d)) * alpha).round() as u8;
        *dst = (mix(dst.0, color.0), mix(dst.1, color.1), mix(dst.2, color.2));
    }

    fn color(&self, color: BubbleColor) -> Rgb {
        self.bubbles[usize::from(color.index()) % self.bubbles.len()]
    }
}

impl Surface for PixelCanvas {
    fn clear_region(&mut self, region: Region) {
        let x0 = region.x.max(0.0) as usize;
        let y0 = region.y.max(0.0) as usize;
        let x1 = ((region.x + region.width).max(0.0) as usize).min(self.width);
        let y1 = ((region.y + region.height).max(0.0) as usize).min(self.height);
        for y in y0..y1 {
            for x in x0..x1 {
                self.pixels[y * self.width + x] = self.background;
            }
        }
    }

    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: BubbleColor, alpha: f32) {
        if radius <= 0.0 || alpha <= 0.0 {
            return;
        }
        let rgb = self.color(color);
        let r2 = radius * radius;
        let mut painted = false;
        for py in (y - radius).floor() as i64..=(y + radius).ceil() as i64 {
            for px in (x - radius).floor() as i64..=(x + radius).ceil() as i64 {
                let dx = px as f32 + 0.5 - x;
                let dy = py as f32 + 0.5 - y;
                if dx * dx + dy * dy <= r2 {
                    self.blend(px, py, rgb, alpha);
                    painted = true;
                }
            }
        }
        // sub-pixel circles still show up as a dot
        if !painted {
            self.blend(x.floor() as i64, y.floor() as i64, rgb, alpha);
        }
    }

    fn stroke_line(&mut self, points: &[(f32, f32)], color: BubbleColor, width: f32) {
        let rgb = self.color(color);
        for pair in points.windows(2) {
            let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
            let len = ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt();
            let steps = (len * 2.0).ceil().max(1.0) as usize;
            for i in 0..=steps {
                let t = i as f32 / steps as f32;
                let (x, y) = (x0 + (x1 - x0) * t, y0 + (y1 - y0) * t);
                if width > 1.0 {
                    self.fill_circle(x, y, width / 2.0, color, 1.0);
                } else {
                    self.blend(x.floor() as i64, y.floor() as i64, rgb, 1.0);
                }
            }
        }
    }
}
