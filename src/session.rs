//! One match: the grid, the player, everything in flight, and the counters shown
//! in the sidebar. The shell drives it with `tick`, the input handlers and
//! `clock_second`; it never touches the terminal itself.

use crate::GameConfig;
use crate::entity::{
    Arena, BubbleColor, Entity, FallingBubble, Particle, Projectile, TrajectoryPreview,
};
use crate::grid::Grid;
use crate::lattice::Lattice;
use crate::snap;
use crate::surface::{AudioEvent, FinalTally, Region, Stats, Surface};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::f32::consts::{FRAC_PI_2, PI};

const MAX_MULTIPLIER: u32 = 5;
/// Consecutive pops needed per multiplier step.
const COMBO_PER_STEP: u32 = 5;
/// Points per falling bubble reaching the floor, before the multiplier.
const FALL_BONUS: f64 = 0.2;

// Speeds in bubble radii per tick.
const SHOT_SPEED: f32 = 1.3;
const PREVIEW_SPEED: f32 = SHOT_SPEED * 1.5;
const PLAYER_SPEED: f32 = 0.45;
const GRAVITY: f32 = 0.08;

/// Keeps aim at least this far (radians) above the horizon.
const AIM_MARGIN: f32 = 0.087;
const AIM_MIN: f32 = -PI + AIM_MARGIN;
const AIM_MAX: f32 = -AIM_MARGIN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadKind {
    /// Re-roll the next projectile's colour.
    Normal,
    /// Spend one wildcard ammo on a wildcard projectile.
    Wild,
}

/// The cannon at the bottom of the arena.
#[derive(Debug, Clone)]
struct Player {
    x: f32,
    y: f32,
    radius: f32,
    angle: f32,
    /// Last pointer position; aim follows it while the player moves.
    pointer: Option<(f32, f32)>,
    left: bool,
    right: bool,
    next: BubbleColor,
}

impl Player {
    fn aim_at(&mut self, (px, py): (f32, f32)) {
        self.angle = clamp_aim((py - self.y).atan2(px - self.x));
    }
}

/// Fold an angle into the upper half-plane, keeping it off the horizon.
pub fn clamp_aim(angle: f32) -> f32 {
    let angle = if (-PI..=PI).contains(&angle) {
        angle
    } else {
        angle.sin().atan2(angle.cos())
    };
    let angle = if angle > 0.0 {
        if angle > FRAC_PI_2 { -PI } else { 0.0 }
    } else {
        angle
    };
    angle.clamp(AIM_MIN, AIM_MAX)
}

#[derive(Debug)]
pub struct Session {
    grid: Grid,
    lattice: Lattice,
    arena: Arena,
    player: Player,
    projectiles: Vec<Projectile>,
    falling: Vec<FallingBubble>,
    particles: Vec<Particle>,
    preview: Option<TrajectoryPreview>,
    score: f64,
    combo: u32,
    max_combo: u32,
    elapsed_secs: u32,
    wild_ammo: u32,
    row_interval: u32,
    ammo_interval: u32,
    /// Clock seconds reported since the last tick; applied when it starts.
    pending_seconds: u32,
    lost: bool,
    rng: StdRng,
    audio: Vec<AudioEvent>,
}

impl Session {
    /// Fresh session. `arena_height` is in pixels; the width follows from the
    /// column count and bubble radius.
    pub fn new(config: &GameConfig, arena_height: f32) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let lattice = Lattice::new(config.radius);
        let arena = Arena {
            width: lattice.arena_width(config.columns),
            height: arena_height,
        };
        let grid = Grid::filled(config.columns, config.initial_rows, &mut rng);
        let player = Player {
            x: arena.width / 2.0,
            y: arena.height - config.radius,
            radius: config.radius,
            angle: -FRAC_PI_2,
            pointer: None,
            left: false,
            right: false,
            next: BubbleColor::random(&mut rng),
        };
        log::info!(
            "session start: {} columns, {} rows, radius {}, arena {}x{}",
            config.columns,
            config.initial_rows,
            config.radius,
            arena.width,
            arena.height
        );
        Self {
            grid,
            lattice,
            arena,
            player,
            projectiles: Vec::new(),
            falling: Vec::new(),
            particles: Vec::new(),
            preview: None,
            score: 0.0,
            combo: 0,
            max_combo: 0,
            elapsed_secs: 0,
            wild_ammo: config.wild_ammo,
            row_interval: config.row_interval.max(1),
            ammo_interval: config.ammo_interval.max(1),
            pending_seconds: 0,
            lost: false,
            rng,
            audio: Vec::new(),
        }
    }

    pub fn arena(&self) -> Arena {
        self.arena
    }

    pub fn is_lost(&self) -> bool {
        self.lost
    }

    /// Centre of the player.
    pub fn player_position(&self) -> (f32, f32) {
        (self.player.x, self.player.y)
    }

    pub fn aim_angle(&self) -> f32 {
        self.player.angle
    }

    /// The grid loses once a bubble reaches this y (the top of the player).
    pub fn defense_line(&self) -> f32 {
        self.player.y - self.player.radius
    }

    /// Follow a new arena height; the player stays on the floor.
    pub fn resize(&mut self, arena_height: f32) {
        self.arena.height = arena_height;
        self.player.y = arena_height - self.player.radius;
    }

    pub fn multiplier(&self) -> u32 {
        (1 + self.combo / COMBO_PER_STEP).min(MAX_MULTIPLIER)
    }

    pub fn stats(&self) -> Stats {
        Stats {
            score: self.score,
            max_combo: self.max_combo,
            combo: self.combo,
            elapsed_secs: self.elapsed_secs,
            multiplier: self.multiplier(),
            wild_ammo: self.wild_ammo,
            next_color: self.player.next,
        }
    }

    /// Final tally once the session is lost.
    pub fn outcome(&self) -> Option<FinalTally> {
        self.lost.then(|| FinalTally {
            score: self.score,
            max_combo: self.max_combo,
            elapsed_secs: self.elapsed_secs,
        })
    }

    /// Sound cues queued since the last call.
    pub fn drain_audio(&mut self) -> Vec<AudioEvent> {
        std::mem::take(&mut self.audio)
    }

    /// One simulation step. Does nothing once the session is lost.
    pub fn tick(&mut self) {
        if self.lost {
            return;
        }
        self.apply_clock();
        if self.grid_reached_player() {
            self.lost = true;
            log::info!(
                "session lost: score {:.1}, max combo {}, {}s",
                self.score,
                self.max_combo,
                self.elapsed_secs
            );
            return;
        }
        self.move_player();
        self.advance_projectiles();
        self.advance_falling();
        let arena = self.arena;
        self.particles.retain_mut(|p| p.advance(&arena));
        self.update_preview();
    }

    /// One second of wall-clock time passed. Queued until the next tick so the
    /// grid never changes between connectivity passes.
    pub fn clock_second(&mut self) {
        if !self.lost {
            self.pending_seconds += 1;
        }
    }

    pub fn handle_aim(&mut self, angle: f32) {
        self.player.pointer = None;
        self.player.angle = clamp_aim(angle);
    }

    /// Aim at a point in arena pixels and keep tracking it while moving.
    pub fn handle_pointer(&mut self, x: f32, y: f32) {
        self.player.pointer = Some((x, y));
        self.player.aim_at((x, y));
    }

    pub fn handle_fire(&mut self) {
        if self.lost {
            return;
        }
        let radius = self.lattice.cell_width / 2.0;
        let color = self.player.next;
        let (x, y) = self.player_position();
        self.projectiles.push(Projectile::launch(
            x,
            y,
            radius,
            self.player.angle,
            SHOT_SPEED * radius,
            color,
        ));
        self.player.next = BubbleColor::random(&mut self.rng);
        self.audio.push(AudioEvent::Shoot);
    }

    pub fn handle_move(&mut self, direction: Direction, pressed: bool) {
        match direction {
            Direction::Left => self.player.left = pressed,
            Direction::Right => self.player.right = pressed,
        }
    }

    pub fn handle_reload(&mut self, kind: ReloadKind) {
        match kind {
            ReloadKind::Normal => self.player.next = BubbleColor::random(&mut self.rng),
            ReloadKind::Wild => {
                if self.wild_ammo == 0 {
                    return;
                }
                self.wild_ammo -= 1;
                self.player.next = BubbleColor::Wild;
            }
        }
        self.audio.push(AudioEvent::Reload);
    }

    pub fn render<S: Surface>(&self, surface: &mut S) {
        surface.clear_region(Region {
            x: 0.0,
            y: 0.0,
            width: self.arena.width,
            height: self.arena.height,
        });
        let radius = self.lattice.cell_width / 2.0;
        for ((x, y), bubble) in self.grid.occupied() {
            let (px, py) = self.lattice.cell_to_pixel(x, y, self.grid.row_offset());
            surface.fill_circle(px, py, radius, bubble.color, 1.0);
        }
        for particle in &self.particles {
            particle.render(surface);
        }
        for bubble in &self.falling {
            bubble.render(surface);
        }
        if let Some(preview) = &self.preview {
            preview.render(surface);
        }
        for projectile in &self.projectiles {
            projectile.render(surface);
        }
        surface.fill_circle(
            self.player.x,
            self.player.y,
            self.player.radius,
            self.player.next,
            1.0,
        );
    }

    fn apply_clock(&mut self) {
        for _ in 0..std::mem::take(&mut self.pending_seconds) {
            let second = self.elapsed_secs;
            self.elapsed_secs += 1;
            if second % self.row_interval == 0 {
                self.spawn_row();
            }
            if second % self.ammo_interval == 0 {
                self.wild_ammo += 1;
            }
        }
    }

    fn spawn_row(&mut self) {
        let row = Grid::random_row(self.grid.columns(), &mut self.rng);
        self.grid.push_row_top(row);
        log::debug!(
            "row spawned at {}s: {} rows, offset {}, {} bubbles",
            self.elapsed_secs,
            self.grid.row_count(),
            self.grid.row_offset(),
            self.grid.bubble_count()
        );
    }

    fn grid_reached_player(&self) -> bool {
        let Some(row) = self.grid.lowest_occupied_row() else {
            return false;
        };
        let (_, y) = self.lattice.cell_to_pixel(0, row, self.grid.row_offset());
        y + self.lattice.cell_height / 2.0 >= self.defense_line()
    }

    fn move_player(&mut self) {
        let player = &mut self.player;
        let step = PLAYER_SPEED * player.radius;
        let dx = match (player.left, player.right) {
            (true, false) => -step,
            (false, true) => step,
            _ => return,
        };
        player.x = (player.x + dx).clamp(player.radius, self.arena.width - player.radius);
        if let Some(pointer) = player.pointer {
            player.aim_at(pointer);
        }
    }

    fn advance_projectiles(&mut self) {
        let reach = self.lattice.cell_width;
        for mut projectile in std::mem::take(&mut self.projectiles) {
            let step = projectile.step(&self.arena);
            if step.bounced {
                self.audio.push(AudioEvent::WallBounce);
            }
            if projectile.is_lost(&self.arena) {
                continue;
            }
            let hit = step.reached_ceiling
                || self
                    .grid
                    .first_contact(&self.lattice, projectile.x, projectile.y, reach)
                    .is_some();
            if hit {
                self.snap(projectile);
            } else {
                self.projectiles.push(projectile);
            }
        }
    }

    /// Place a projectile and settle the score: pop, drop, combo.
    fn snap(&mut self, projectile: Projectile) {
        self.audio.push(AudioEvent::Snap);
        let multiplier = self.multiplier();
        let placement = snap::place_projectile(&mut self.grid, &self.lattice, projectile);
        if !placement.popped_any() {
            log::debug!("placed {:?} at {:?}", placement.color, placement.cell);
            self.combo = 0;
            return;
        }

        let points = placement.fill.size as f64 * f64::from(multiplier);
        self.score += points;
        let offset = self.grid.row_offset();
        let radius = self.lattice.cell_width / 2.0;
        for &((x, y), color) in &placement.popped {
            let (px, py) = self.lattice.cell_to_pixel(x, y, offset);
            self.burst(px, py, color);
            self.audio.push(AudioEvent::Pop);
        }
        for &((x, y), bubble) in &placement.dropped {
            let (px, py) = self.lattice.cell_to_pixel(x, y, offset);
            self.falling.push(FallingBubble::new(
                px,
                py,
                radius,
                bubble.color,
                GRAVITY * radius,
            ));
        }
        self.combo += 1;
        self.max_combo = self.max_combo.max(self.combo);
        log::debug!(
            "popped {} at {:?} (+{points}), {} dropped, combo {}",
            placement.fill.size,
            placement.cell,
            placement.dropped.len(),
            self.combo
        );
    }

    fn advance_falling(&mut self) {
        let arena = self.arena;
        let mut landed = Vec::new();
        self.falling.retain_mut(|bubble| {
            let falling = bubble.advance(&arena);
            if !falling {
                landed.push((bubble.x, bubble.y, bubble.color));
            }
            falling
        });
        for (x, y, color) in landed {
            self.burst(x, y, color);
            self.audio.push(AudioEvent::Pop);
            self.score += FALL_BONUS * f64::from(self.multiplier());
        }
    }

    fn burst(&mut self, x: f32, y: f32, color: BubbleColor) {
        let radius = self.lattice.cell_width / 2.0;
        let count = (radius * 2.0).round() as usize;
        let particles = Particle::burst(&mut self.rng, x, y, color, count, radius);
        self.particles.extend(particles);
    }

    fn update_preview(&mut self) {
        let radius = self.lattice.cell_width / 2.0;
        let mut preview = TrajectoryPreview::new(
            self.player.x,
            self.player.y,
            radius,
            self.player.angle,
            PREVIEW_SPEED * radius,
            self.player.next,
        );
        let (grid, lattice) = (&self.grid, &self.lattice);
        preview.simulate(&self.arena, |x, y| {
            grid.first_contact(lattice, x, y, lattice.cell_width).is_some()
        });
        self.preview = Some(preview);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn config() -> GameConfig {
        GameConfig {
            columns: 4,
            initial_rows: 1,
            radius: 3.0,
            row_interval: 3,
            ammo_interval: 2,
            wild_ammo: 0,
            seed: Some(11),
            ..GameConfig::default()
        }
    }

    fn session_with(picture: &str) -> Session {
        let mut session = Session::new(&config(), 120.0);
        session.grid = Grid::parse(picture);
        session
    }

    fn projectile_at(session: &Session, cell: (usize, usize), color: BubbleColor) -> Projectile {
        let (x, y) = session
            .lattice
            .cell_to_pixel(cell.0, cell.1, session.grid.row_offset());
        Projectile::launch(x, y, 3.0, -FRAC_PI_2, 0.0, color)
    }

    #[test]
    fn test_three_cluster_pops_and_scores() {
        let mut session = session_with("aa..\n....");
        let shot = projectile_at(&session, (2, 0), BubbleColor::Slate);
        session.snap(shot);
        assert_eq!(session.grid.bubble_count(), 0);
        assert_eq!(session.score, 3.0);
        assert_eq!(session.combo, 1);
        assert_eq!(session.max_combo, 1);
        assert_eq!(session.particles.len(), 3 * 6);
        let audio = session.drain_audio();
        assert_eq!(audio.iter().filter(|&&e| e == AudioEvent::Pop).count(), 3);
        assert!(audio.contains(&AudioEvent::Snap));
        assert!(session.drain_audio().is_empty());
    }

    #[test]
    fn test_pair_does_not_pop_and_resets_combo() {
        let mut session = session_with("a...\n....");
        session.combo = 4;
        session.max_combo = 4;
        let shot = projectile_at(&session, (1, 0), BubbleColor::Slate);
        session.snap(shot);
        assert_eq!(session.grid.bubble_count(), 2);
        assert_eq!(session.score, 0.0);
        assert_eq!(session.combo, 0);
        assert_eq!(session.max_combo, 4);
    }

    #[test]
    fn test_score_uses_multiplier_before_combo_increment() {
        let mut session = session_with("aa..\n....");
        session.combo = 5;
        assert_eq!(session.multiplier(), 2);
        let shot = projectile_at(&session, (2, 0), BubbleColor::Slate);
        session.snap(shot);
        assert_eq!(session.score, 6.0);
        assert_eq!(session.combo, 6);
    }

    #[test]
    fn test_multiplier_is_capped() {
        let mut session = session_with("....");
        for (combo, expected) in [(0, 1), (4, 1), (5, 2), (19, 4), (20, 5), (90, 5)] {
            session.combo = combo;
            assert_eq!(session.multiplier(), expected, "combo {combo}");
        }
    }

    #[test]
    fn test_detached_pair_becomes_two_falling_bubbles() {
        let mut session = session_with(
            ".bb.
             ..c.
             ..d.",
        );
        let shot = projectile_at(&session, (3, 0), BubbleColor::Plum);
        session.snap(shot);
        assert_eq!(session.falling.len(), 2);
        assert_eq!(session.grid.bubble_count(), 0);
        assert!(!session.grid.any_visited());
    }

    #[test]
    fn test_falling_bubble_scores_bonus_on_landing() {
        let mut session = session_with("....");
        let arena = session.arena();
        session
            .falling
            .push(FallingBubble::new(5.0, arena.height - 4.0, 3.0, BubbleColor::Coral, 0.5));
        session.tick();
        session.tick();
        assert!(session.falling.is_empty());
        assert!((session.score - 0.2).abs() < 1e-9);
        assert!(!session.particles.is_empty());
        assert!(session.drain_audio().contains(&AudioEvent::Pop));
    }

    #[test]
    fn test_fired_shot_travels_and_sticks() {
        let mut session = session_with("a...");
        session.player.next = BubbleColor::Plum;
        session.handle_aim(-FRAC_PI_2);
        session.handle_fire();
        assert_eq!(session.projectiles.len(), 1);
        assert!(session.drain_audio().contains(&AudioEvent::Shoot));
        for _ in 0..200 {
            session.tick();
            if session.projectiles.is_empty() {
                break;
            }
        }
        assert!(session.projectiles.is_empty());
        assert_eq!(session.grid.bubble_count(), 2);
        assert!(session.drain_audio().contains(&AudioEvent::Snap));
        assert_eq!(session.combo, 0);
    }

    #[test]
    fn test_projectile_fired_downward_is_discarded() {
        let mut session = session_with("a...");
        session.projectiles.push(Projectile::launch(
            10.0,
            110.0,
            3.0,
            FRAC_PI_2,
            4.0,
            BubbleColor::Slate,
        ));
        for _ in 0..10 {
            session.tick();
        }
        assert!(session.projectiles.is_empty());
        assert_eq!(session.grid.bubble_count(), 1);
    }

    #[test]
    fn test_loss_freezes_session() {
        let mut session = Session::new(&config(), 60.0);
        let mut rng = StdRng::seed_from_u64(2);
        session.grid = Grid::filled(4, 12, &mut rng);
        session.handle_fire();
        session.tick();
        assert!(session.is_lost());
        let tally = session.outcome().unwrap();
        assert_eq!(tally.score, 0.0);

        let before = session.projectiles.clone();
        session.clock_second();
        session.tick();
        session.handle_fire();
        assert_eq!(session.projectiles, before);
        assert_eq!(session.elapsed_secs, 0);
    }

    #[test]
    fn test_rows_from_the_clock_end_the_session() {
        let mut session = session_with("aaaa");
        let mut seconds = 0;
        while !session.is_lost() && seconds < 200 {
            session.clock_second();
            session.tick();
            seconds += 1;
        }
        assert!(session.is_lost());
        assert!(session.grid.row_count() > 1);
        let last = session.grid.lowest_occupied_row().unwrap();
        let (_, y) = session
            .lattice
            .cell_to_pixel(0, last, session.grid.row_offset());
        assert!(y + session.lattice.cell_height / 2.0 >= session.defense_line());

        let rows = session.grid.row_count();
        let elapsed = session.elapsed_secs;
        for _ in 0..6 {
            session.clock_second();
            session.tick();
        }
        assert_eq!(session.grid.row_count(), rows);
        assert_eq!(session.elapsed_secs, elapsed);
    }

    #[test]
    fn test_wall_bounce_is_heard() {
        let mut session = session_with("....");
        session.handle_aim(AIM_MIN);
        session.handle_fire();
        let mut cues = session.drain_audio();
        assert_eq!(cues, vec![AudioEvent::Shoot]);
        for _ in 0..40 {
            session.tick();
            cues.extend(session.drain_audio());
        }
        assert!(cues.contains(&AudioEvent::WallBounce));
    }

    #[test]
    fn test_short_grid_does_not_lose() {
        let mut session = session_with("aaaa\nbbbb");
        session.tick();
        assert!(!session.is_lost());
        assert!(session.outcome().is_none());
    }

    #[test]
    fn test_clock_spawns_rows_and_ammo_on_schedule() {
        let mut session = session_with("aaaa");
        for _ in 0..4 {
            session.clock_second();
        }
        // queued until the next tick
        assert_eq!(session.grid.row_count(), 1);
        session.tick();
        assert_eq!(session.elapsed_secs, 4);
        // seconds 0 and 3 spawn rows, seconds 0 and 2 give ammo
        assert_eq!(session.grid.row_count(), 3);
        assert_eq!(session.grid.row_offset(), 2);
        assert_eq!(session.wild_ammo, 2);
    }

    #[test]
    fn test_reloads() {
        let mut session = session_with("aaaa");
        session.handle_reload(ReloadKind::Wild);
        assert_ne!(session.player.next, BubbleColor::Wild);
        assert!(session.drain_audio().is_empty());

        session.wild_ammo = 1;
        session.handle_reload(ReloadKind::Wild);
        assert_eq!(session.player.next, BubbleColor::Wild);
        assert_eq!(session.wild_ammo, 0);
        assert_eq!(session.stats().next_color, BubbleColor::Wild);

        session.handle_reload(ReloadKind::Normal);
        assert!(!session.player.next.is_wild());
        assert_eq!(session.drain_audio(), vec![AudioEvent::Reload, AudioEvent::Reload]);
    }

    #[test]
    fn test_aim_stays_in_upper_half_plane() {
        let mut session = session_with("....");
        session.handle_aim(FRAC_PI_2 + 0.3);
        assert_eq!(session.aim_angle(), AIM_MIN);
        session.handle_aim(0.3);
        assert_eq!(session.aim_angle(), AIM_MAX);
        session.handle_aim(-1.0);
        assert_eq!(session.aim_angle(), -1.0);

        let (px, py) = session.player_position();
        session.handle_pointer(px, py - 10.0);
        assert!((session.aim_angle() + FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_player_moves_within_arena_and_keeps_tracking_pointer() {
        let mut session = session_with("....");
        let (x0, y0) = session.player_position();
        session.handle_pointer(x0, y0 - 20.0);
        session.handle_move(Direction::Left, true);
        session.tick();
        let (x1, _) = session.player_position();
        assert!(x1 < x0);
        assert!(session.aim_angle() > -FRAC_PI_2);

        for _ in 0..200 {
            session.tick();
        }
        assert_eq!(session.player_position().0, session.player.radius);
        session.handle_move(Direction::Left, false);
        session.handle_move(Direction::Right, true);
        for _ in 0..200 {
            session.tick();
        }
        let arena = session.arena();
        assert_eq!(session.player_position().0, arena.width - session.player.radius);
    }

    #[test]
    fn test_preview_follows_aim() {
        let mut session = session_with("aaaa");
        session.tick();
        let preview = session.preview.as_ref().unwrap();
        assert!(preview.waypoints.len() >= 2);
        assert_eq!(preview.waypoints[0], session.player_position());
    }

    #[test]
    fn test_score_never_decreases() {
        let mut session = Session::new(&config(), 200.0);
        let mut rng = StdRng::seed_from_u64(99);
        let mut last = 0.0;
        for t in 0..3000 {
            if t % 7 == 0 {
                session.handle_aim(rng.random_range(AIM_MIN..AIM_MAX));
                session.handle_fire();
            }
            if t % 60 == 0 {
                session.clock_second();
            }
            session.tick();
            assert!(session.score >= last);
            assert!(!session.grid.any_visited());
            last = session.score;
        }
    }

    #[test]
    fn test_render_draws_grid_and_player() {
        use crate::surface::PixelCanvas;
        use crate::theme::Theme;

        let session = session_with("b...");
        let arena = session.arena();
        let mut canvas = PixelCanvas::new(arena.width as usize, arena.height as usize, &Theme::default());
        session.render(&mut canvas);
        let (x, y) = session.lattice.cell_to_pixel(0, 0, 0);
        let plum = crate::theme::rgb_of(Theme::default().bubble[1]);
        assert_eq!(canvas.pixel(x as usize, y as usize), Some(plum));
        let (px, py) = session.player_position();
        assert_ne!(canvas.pixel(px as usize, py as usize), canvas.pixel(0, 40));
    }
}
