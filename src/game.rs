use crate::browser;
use crate::engine::input::KeyState;
use crate::engine::{Game, Point, Rect, Renderer, Size, Surface};
use crate::entity::{obstacle, Level, Obstacle, Player};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// TABLE
/// ┌───────────────────────── One Frame ─────────────────────────────┐
/// │                                                                 │
/// │  engine.rs GameLoop        game.rs ShapeDash      game.rs       │
/// │  ┌──────────────┐ update  ┌──────────────┐ tick  ┌──────────┐   │
/// │  │ rAF callback ├────────►│ input -> cmd ├──────►│ Session  │   │
/// │  │ fixed step   │  draw   │              │ draw  │          │   │
/// │  └──────┬───────┘────────►└──────────────┘──────►└──────────┘   │
/// │         │                                                       │
/// │         └─► is_finished() ? stop scheduling : next frame        │
/// │                                                                 │
/// ├──────────────────────── Session::tick ──────────────────────────┤
/// │  1. player falls / spins                                        │
/// │  2. every obstacle scrolls, then is checked against the player  │
/// │  3. top bar checked against the player                          │
/// │  4. obstacles past the left edge are dropped                    │
/// │  5. score + 1, any hit -> GameOver                              │
/// └─────────────────────────────────────────────────────────────────┘
pub enum ShapeDash {
    /// Waiting for the canvas to be measured
    Loading { canvas_id: String, seed: u64 },

    /// Session in progress, or finished and waiting to be dropped
    Loaded(Session),
}

// keyboard bindings, `KeyboardEvent.code`
mod keys {
    pub const JUMP: &str = "Space";
    pub const CHANGE_SHAPE: &str = "KeyC";
}

impl ShapeDash {
    pub fn new(canvas_id: &str, seed: u64) -> Self {
        ShapeDash::Loading {
            canvas_id: canvas_id.to_string(),
            seed,
        }
    }
}

#[async_trait(?Send)]
impl Game for ShapeDash {
    async fn initialize(&self) -> Result<Box<dyn Game>> {
        match self {
            ShapeDash::Loading { canvas_id, seed } => {
                let canvas = browser::canvas(canvas_id)?;
                let bounds = Size {
                    width: canvas.width() as f64,
                    height: canvas.height() as f64,
                };
                let session = Session::new(bounds, StdRng::seed_from_u64(*seed), browser::now()?);
                log!(
                    "Session started : seed {} on a {}x{} canvas",
                    seed,
                    bounds.width,
                    bounds.height
                );
                Ok(Box::new(ShapeDash::Loaded(session)))
            }
            ShapeDash::Loaded(_) => Err(anyhow!("Game is already initialized")),
        }
    }

    fn update(&mut self, keystate: &KeyState, now: f64) {
        if let ShapeDash::Loaded(session) = self {
            if keystate.was_pressed(keys::JUMP) {
                session.jump();
            }
            if keystate.was_pressed(keys::CHANGE_SHAPE) {
                session.change_shape();
            }

            let was_running = !session.is_over();
            session.tick(now);
            if was_running && session.is_over() {
                log!(
                    "Game over : score {} after {}s",
                    session.score(),
                    session.elapsed_seconds()
                );
            }
        }
    }

    fn draw(&self, renderer: &Renderer) {
        if let ShapeDash::Loaded(session) = self {
            session.draw(renderer);
        }
    }

    fn is_finished(&self) -> bool {
        matches!(self, ShapeDash::Loaded(session) if session.is_over())
    }
}

const PASTEL_COLORS: [&str; 7] = [
    "rgb(173, 216, 230)", // light blue
    "rgb(144, 238, 144)", // light green
    "rgb(255, 182, 193)", // light pink
    "rgb(255, 255, 224)", // light yellow
    "rgb(216, 191, 216)", // light purple
    "rgb(255, 218, 185)", // light orange
    "rgb(240, 255, 240)", // light mint
];
const TOP_BAR_COLOR: &str = "red";

// HUD layout
mod hud {
    pub const FONT: &str = "20px Arial";
    pub const COLOR: &str = "black";
    pub const LEFT: f64 = 10.0;
    pub const FIRST_LINE: f64 = 20.0;
    pub const SECOND_LINE: f64 = 50.0;
    // the timer is drawn this far from the right edge
    pub const TIMER_INSET: f64 = 100.0;
}

/// Three distinct palette colors, one per role
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ColorScheme {
    pub background: &'static str,
    pub obstacle: &'static str,
    pub player: &'static str,
}

impl ColorScheme {
    pub fn pick<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut palette = PASTEL_COLORS;
        palette.shuffle(rng);
        ColorScheme {
            background: palette[0],
            obstacle: palette[1],
            player: palette[2],
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameStatus {
    Running,
    /// terminal, a new session is needed to play again
    GameOver,
}

/// Everything one play-through owns.
/// Times are milliseconds on whatever clock the caller passes in.
pub struct Session {
    bounds: Size,
    level: Level,
    player: Player,
    obstacles: Vec<Obstacle>,
    top_bar: Rect,
    score: u32,
    status: GameStatus,
    colors: ColorScheme,
    rng: StdRng,
    started_at: f64,
    now: f64,
}

impl Session {
    pub fn new(bounds: Size, mut rng: StdRng, now: f64) -> Self {
        // levels never advance, every session plays the first one
        let level = Level::default();
        let colors = ColorScheme::pick(&mut rng);
        let player = Player::new(bounds, level, &mut rng);
        let obstacles = obstacle::generate(&level, bounds, &mut rng);

        Session {
            bounds,
            level,
            player,
            obstacles,
            top_bar: obstacle::top_bar(bounds),
            score: 0,
            status: GameStatus::Running,
            colors,
            rng,
            started_at: now,
            now,
        }
    }

    pub fn jump(&mut self) {
        if !self.is_over() {
            self.player.jump();
        }
    }

    pub fn change_shape(&mut self) {
        if !self.is_over() {
            self.player.change_shape(&mut self.rng);
        }
    }

    /// Advance the simulation one frame. No-op once the game is over.
    /// The frame that produces the hit still scores.
    pub fn tick(&mut self, now: f64) {
        if self.is_over() {
            return;
        }
        self.now = now;

        self.player.update();
        let player_box = self.player.bounding_box();

        let mut hit = player_box.intersects(&self.top_bar);
        for obstacle in self.obstacles.iter_mut() {
            obstacle.update();
            // no early exit : the rest of the batch still scrolls this frame
            hit |= player_box.intersects(obstacle.bounding_box());
        }

        self.obstacles.retain(|obstacle| !obstacle.is_off_screen());
        self.score += 1;

        if hit {
            self.status = GameStatus::GameOver;
        }
    }

    /// Paint order : background, player, top bar, obstacles, HUD
    pub fn draw(&self, surface: &impl Surface) {
        surface.fill_rect(
            &Rect::new(Point::default(), self.bounds),
            self.colors.background,
        );
        self.player.draw(surface, self.colors.player);
        surface.fill_rect(&self.top_bar, TOP_BAR_COLOR);
        for obstacle in &self.obstacles {
            obstacle.draw(surface, self.colors.obstacle);
        }
        self.draw_hud(surface);
    }

    fn draw_hud(&self, surface: &impl Surface) {
        surface.fill_text(
            &format!("Score: {}", self.score),
            Point {
                x: hud::LEFT,
                y: hud::FIRST_LINE,
            },
            hud::FONT,
            hud::COLOR,
        );
        surface.fill_text(
            &format!("Time: {}", self.elapsed_seconds()),
            Point {
                x: self.bounds.width - hud::TIMER_INSET,
                y: hud::FIRST_LINE,
            },
            hud::FONT,
            hud::COLOR,
        );
        surface.fill_text(
            &format!("Level: {}", self.level.number()),
            Point {
                x: hud::LEFT,
                y: hud::SECOND_LINE,
            },
            hud::FONT,
            hud::COLOR,
        );
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_over(&self) -> bool {
        self.status == GameStatus::GameOver
    }

    /// whole seconds between session start and the latest tick
    pub fn elapsed_seconds(&self) -> u64 {
        ((self.now - self.started_at) / 1000.0).floor().max(0.0) as u64
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn colors(&self) -> ColorScheme {
        self.colors
    }
}
