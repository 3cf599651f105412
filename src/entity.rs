//! Entities that move on their own: trajectory preview, falling bubbles, pop particles
//! and the player's projectiles. Each advances one tick at a time and says whether it
//! should keep living.

use crate::surface::Surface;
use rand::Rng;

/// Number of ordinary bubble colours.
pub const PALETTE_SIZE: u8 = 4;

/// Preview stops after this many waypoints (start, bounces, end).
pub const PREVIEW_MAX_WAYPOINTS: usize = 5;
/// Preview stops after this many simulated steps.
pub const PREVIEW_MAX_STEPS: usize = 100;

/// Opacity lost per tick by a particle.
const PARTICLE_FADE: f32 = 0.03;
/// Per-tick velocity damping of a particle.
const PARTICLE_DAMPING: f32 = 0.8;

/// Bubble colour. Four ordinary colours plus the wildcard, which matches anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BubbleColor {
    Slate,
    Plum,
    Coral,
    Peach,
    Wild,
}

impl BubbleColor {
    pub const PALETTE: [Self; PALETTE_SIZE as usize] =
        [Self::Slate, Self::Plum, Self::Coral, Self::Peach];

    /// Uniformly random ordinary colour (never `Wild`).
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::PALETTE[rng.random_range(0..Self::PALETTE.len())]
    }

    /// Index into the theme's bubble colours; `Wild` is one past the palette.
    #[inline]
    pub fn index(self) -> u8 {
        match self {
            Self::Slate => 0,
            Self::Plum => 1,
            Self::Coral => 2,
            Self::Peach => 3,
            Self::Wild => PALETTE_SIZE,
        }
    }

    #[inline]
    pub fn is_wild(self) -> bool {
        self == Self::Wild
    }
}

/// A bubble owned by a grid cell. Its pixel position is derived from the cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bubble {
    pub color: BubbleColor,
    /// Set only while a connectivity pass is running.
    pub(crate) visited: bool,
}

impl Bubble {
    pub fn new(color: BubbleColor) -> Self {
        Self {
            color,
            visited: false,
        }
    }

    #[cfg(test)]
    pub fn is_visited(&self) -> bool {
        self.visited
    }
}

/// Play area in pixels. The ceiling is y = 0, the floor is y = `height`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
}

/// Shared capability of free-moving entities.
pub trait Entity {
    /// Advance one tick. `false` means the entity is done (remove it, or for the
    /// projectile: it reached the ceiling).
    fn advance(&mut self, arena: &Arena) -> bool;

    fn render<S: Surface>(&self, surface: &mut S);
}

/// Reflect `x`/`dx` off the side walls. Returns true on contact.
fn bounce_off_walls(x: &mut f32, dx: &mut f32, radius: f32, arena: &Arena) -> bool {
    let mut hit = false;
    if *x + radius > arena.width {
        *x = arena.width - radius;
        *dx = -*dx;
        hit = true;
    }
    if *x - radius <= 0.0 {
        *x = radius;
        *dx = -*dx;
        hit = true;
    }
    hit
}

/// Simulated bubble used to draw the aim line. Not a gameplay entity.
#[derive(Debug, Clone)]
pub struct TrajectoryPreview {
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
    pub radius: f32,
    pub color: BubbleColor,
    pub waypoints: Vec<(f32, f32)>,
}

impl TrajectoryPreview {
    pub fn new(x: f32, y: f32, radius: f32, angle: f32, speed: f32, color: BubbleColor) -> Self {
        let mut preview = Self {
            x,
            y,
            dx: angle.cos() * speed,
            dy: angle.sin() * speed,
            radius,
            color,
            waypoints: Vec::with_capacity(PREVIEW_MAX_WAYPOINTS),
        };
        preview.note();
        preview
    }

    fn note(&mut self) {
        self.waypoints.push((self.x, self.y));
    }

    /// Run the simulation until the waypoint or step cap, the ceiling, or the first
    /// point where `hits(x, y)` reports a collision with the grid.
    pub fn simulate(&mut self, arena: &Arena, hits: impl Fn(f32, f32) -> bool) {
        for _ in 0..PREVIEW_MAX_STEPS {
            if self.waypoints.len() >= PREVIEW_MAX_WAYPOINTS || !self.advance(arena) {
                break;
            }
            if hits(self.x, self.y) {
                self.note();
                break;
            }
        }
    }
}

impl Entity for TrajectoryPreview {
    fn advance(&mut self, arena: &Arena) -> bool {
        self.x += self.dx;
        self.y += self.dy;
        if bounce_off_walls(&mut self.x, &mut self.dx, self.radius, arena) {
            self.note();
        }
        if self.y - self.radius <= 0.0 {
            self.note();
            return false;
        }
        true
    }

    fn render<S: Surface>(&self, surface: &mut S) {
        if self.waypoints.len() > 1 {
            surface.stroke_line(&self.waypoints, self.color, 1.0);
        }
    }
}

/// Bubble cut loose from the grid, accelerating toward the floor.
#[derive(Debug, Clone, PartialEq)]
pub struct FallingBubble {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub color: BubbleColor,
    pub speed: f32,
    pub gravity: f32,
}

impl FallingBubble {
    pub fn new(x: f32, y: f32, radius: f32, color: BubbleColor, gravity: f32) -> Self {
        Self {
            x,
            y,
            radius,
            color,
            speed: 0.0,
            gravity,
        }
    }
}

impl Entity for FallingBubble {
    fn advance(&mut self, arena: &Arena) -> bool {
        self.speed += self.gravity;
        self.y += self.speed;
        self.y + self.radius <= arena.height
    }

    fn render<S: Surface>(&self, surface: &mut S) {
        surface.fill_circle(self.x, self.y, self.radius, self.color, 1.0);
    }
}

/// Fading fragment of a popped bubble.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub dx: f32,
    pub dy: f32,
    pub color: BubbleColor,
    pub alpha: f32,
}

impl Particle {
    /// `count` particles scattered from `(x, y)`; sizes and speeds scale with the
    /// radius of the bubble that burst.
    pub fn burst<R: Rng + ?Sized>(
        rng: &mut R,
        x: f32,
        y: f32,
        color: BubbleColor,
        count: usize,
        bubble_radius: f32,
    ) -> Vec<Self> {
        let spread = bubble_radius * 0.6;
        (0..count)
            .map(|_| Self {
                x,
                y,
                radius: rng.random_range(0.1..0.35) * bubble_radius,
                dx: rng.random_range(-spread..=spread),
                dy: rng.random_range(-spread..=spread),
                color,
                alpha: 1.0,
            })
            .collect()
    }
}

impl Entity for Particle {
    fn advance(&mut self, _arena: &Arena) -> bool {
        self.alpha -= PARTICLE_FADE;
        self.x += self.dx;
        self.y += self.dy;
        self.dx *= PARTICLE_DAMPING;
        self.dy *= PARTICLE_DAMPING;
        self.alpha > 0.0
    }

    fn render<S: Surface>(&self, surface: &mut S) {
        surface.fill_circle(self.x, self.y, self.radius, self.color, self.alpha.max(0.0));
    }
}

/// What happened to a projectile during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProjectileStep {
    pub bounced: bool,
    pub reached_ceiling: bool,
}

/// Bubble in flight, fired by the player.
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub dx: f32,
    pub dy: f32,
    pub color: BubbleColor,
}

impl Projectile {
    pub fn launch(x: f32, y: f32, radius: f32, angle: f32, speed: f32, color: BubbleColor) -> Self {
        Self {
            x,
            y,
            radius,
            dx: angle.cos() * speed,
            dy: angle.sin() * speed,
            color,
        }
    }

    pub fn step(&mut self, arena: &Arena) -> ProjectileStep {
        self.x += self.dx;
        self.y += self.dy;
        ProjectileStep {
            bounced: bounce_off_walls(&mut self.x, &mut self.dx, self.radius, arena),
            reached_ceiling: self.y - self.radius <= 0.0,
        }
    }

    /// Fell out through the floor (fired downward).
    pub fn is_lost(&self, arena: &Arena) -> bool {
        self.y - self.radius > arena.height
    }

    /// Come to rest: velocity is dropped and the grid takes ownership.
    pub fn into_bubble(self) -> Bubble {
        Bubble::new(self.color)
    }
}

impl Entity for Projectile {
    fn advance(&mut self, arena: &Arena) -> bool {
        !self.step(arena).reached_ceiling
    }

    fn render<S: Surface>(&self, surface: &mut S) {
        surface.fill_circle(self.x, self.y, self.radius, self.color, 1.0);
    }
}
