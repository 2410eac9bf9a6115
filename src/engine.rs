use crate::browser;
use anyhow::{anyhow, Result};
// wasm is single threaded, so Rc RefCell over Arc Mutex
use async_trait::async_trait;
use futures::channel::oneshot;
use std::cell::RefCell;
use std::rc::Rc;
use web_sys::CanvasRenderingContext2d;

use self::input::KeyState;

#[async_trait(?Send)]
pub trait Game {
    async fn initialize(&self) -> Result<Box<dyn Game>>;
    /// one simulation step, `now` is the frame timestamp in milliseconds
    fn update(&mut self, keystate: &KeyState, now: f64);
    fn draw(&self, renderer: &Renderer);
    /// once true the loop stops scheduling frames
    fn is_finished(&self) -> bool;
}

// length of a frame in milliseconds
const FRAME_SIZE: f32 = 1.0 / 60.0 * 1000.0;
// catch-up cap per callback, longer gaps (hidden tab) are dropped
const MAX_STEPS_PER_FRAME: u32 = 3;

pub struct GameLoop {
    last_frame: f64,
    accumulated_delta: f32,
}

type SharedLoopClosure = Rc<RefCell<Option<browser::LoopClosure>>>;

impl GameLoop {
    fn new(now: f64) -> Self {
        GameLoop {
            last_frame: now,
            accumulated_delta: 0.0,
        }
    }

    /// Simulation steps due at frame timestamp `perf`.
    /// At most `MAX_STEPS_PER_FRAME`, whatever time is left over after the
    /// cap is discarded so play resumes where it stopped.
    fn steps(&mut self, perf: f64) -> u32 {
        self.accumulated_delta += (perf - self.last_frame) as f32;
        self.last_frame = perf;

        let mut steps = 0;
        while self.accumulated_delta > FRAME_SIZE && steps < MAX_STEPS_PER_FRAME {
            self.accumulated_delta -= FRAME_SIZE;
            steps += 1;
        }
        if self.accumulated_delta > FRAME_SIZE {
            self.accumulated_delta = 0.0;
        }
        steps
    }

    /// Drive `game` from requestAnimationFrame until it reports finished.
    /// Resolves after the last frame has been drawn.
    pub async fn start(game: impl Game + 'static, canvas_id: &str) -> Result<()> {
        let mut game = game.initialize().await?;
        let mut game_loop = GameLoop::new(browser::now()?);
        let renderer = Renderer::new(browser::context(canvas_id)?);
        let (key_listener, mut keyevent_receiver) = input::prepare_input()?;
        let mut keystate = KeyState::new();
        let (finished_sender, finished_receiver) = oneshot::channel::<()>();
        let mut finished_sender = Some(finished_sender);

        let f: SharedLoopClosure = Rc::new(RefCell::new(None));
        // the closure only holds a weak handle to itself: once this future
        // completes the strong handle goes away and the closure is freed
        let g = Rc::downgrade(&f);
        *f.borrow_mut() = Some(browser::create_raf_closure(move |perf: f64| {
            // the keyboard listener is removed together with this closure
            let _listener = &key_listener;
            input::process_input(&mut keystate, &mut keyevent_receiver);

            for _ in 0..game_loop.steps(perf) {
                game.update(&keystate, perf);
                // a press is one command, not one per catch-up step
                keystate.clear();
            }
            game.draw(&renderer);

            if game.is_finished() {
                if let Some(sender) = finished_sender.take() {
                    let _ = sender.send(());
                }
                return;
            }

            if let Some(f) = g.upgrade() {
                if let Some(closure) = f.borrow().as_ref() {
                    if let Err(err) = browser::request_animation_frame(closure) {
                        error!("GameLoop: {:#}", err);
                    }
                }
            }
        }));

        browser::request_animation_frame(
            f.borrow()
                .as_ref()
                .ok_or_else(|| anyhow!("GameLoop: Loop is None"))?,
        )?;

        finished_receiver
            .await
            .map_err(|_| anyhow!("GameLoop: loop was dropped before the game finished"))
    }
}

// ==================== Geometry ====================
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Axis aligned box, top left origin
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub position: Point,
    pub size: Size,
}

impl Rect {
    pub fn new(position: Point, size: Size) -> Self {
        Rect { position, size }
    }

    pub fn new_from_x_y(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect::new(Point { x, y }, Size { width, height })
    }

    pub fn x(&self) -> f64 {
        self.position.x
    }

    pub fn y(&self) -> f64 {
        self.position.y
    }

    pub fn width(&self) -> f64 {
        self.size.width
    }

    pub fn height(&self) -> f64 {
        self.size.height
    }

    pub fn right(&self) -> f64 {
        self.x() + self.width()
    }

    pub fn bottom(&self) -> f64 {
        self.y() + self.height()
    }

    /// AABB overlap on both axes
    /// - strict comparisons : boxes that only share an edge do NOT intersect
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x() < other.right()
            && self.right() > other.x()
            && self.y() < other.bottom()
            && self.bottom() > other.y()
    }
}

// ==================== Drawing ====================
/// The 2d operations the game needs from a canvas.
/// `Renderer` is the browser implementation, tests record the calls instead.
pub trait Surface {
    fn fill_rect(&self, rect: &Rect, color: &str);
    fn fill_circle(&self, center: Point, radius: f64, color: &str);
    /// closed polygon through `points`
    fn fill_polygon(&self, points: &[Point], color: &str);
    fn fill_text(&self, text: &str, position: Point, font: &str, color: &str);
    fn save(&self);
    fn translate(&self, offset: Point);
    fn rotate(&self, radians: f64);
    fn restore(&self);
}

pub struct Renderer {
    context: CanvasRenderingContext2d,
}

impl Renderer {
    pub fn new(context: CanvasRenderingContext2d) -> Self {
        Renderer { context }
    }
}

impl Surface for Renderer {
    fn fill_rect(&self, rect: &Rect, color: &str) {
        self.context.set_fill_style_str(color);
        self.context
            .fill_rect(rect.x(), rect.y(), rect.width(), rect.height());
    }

    fn fill_circle(&self, center: Point, radius: f64, color: &str) {
        self.context.set_fill_style_str(color);
        self.context.begin_path();
        if let Err(err) = self
            .context
            .arc(center.x, center.y, radius, 0.0, std::f64::consts::TAU)
        {
            error!("Renderer: arc failed : {:#?}", err);
            return;
        }
        self.context.fill();
    }

    fn fill_polygon(&self, points: &[Point], color: &str) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        self.context.set_fill_style_str(color);
        self.context.begin_path();
        self.context.move_to(first.x, first.y);
        for point in rest {
            self.context.line_to(point.x, point.y);
        }
        self.context.close_path();
        self.context.fill();
    }

    fn fill_text(&self, text: &str, position: Point, font: &str, color: &str) {
        self.context.set_fill_style_str(color);
        self.context.set_font(font);
        if let Err(err) = self.context.fill_text(text, position.x, position.y) {
            error!("Renderer: could not draw '{}' : {:#?}", text, err);
        }
    }

    fn save(&self) {
        self.context.save();
    }

    fn translate(&self, offset: Point) {
        if let Err(err) = self.context.translate(offset.x, offset.y) {
            error!("Renderer: translate failed : {:#?}", err);
        }
    }

    fn rotate(&self, radians: f64) {
        if let Err(err) = self.context.rotate(radians) {
            error!("Renderer: rotate failed : {:#?}", err);
        }
    }

    fn restore(&self) {
        self.context.restore();
    }
}


// ==================== Input ====================
pub mod input {
    use crate::browser;
    use anyhow::{anyhow, Result};
    use futures::channel::mpsc::{unbounded, UnboundedReceiver};
    use std::collections::HashSet;
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::JsCast;
    use web_sys::KeyboardEvent;

    pub enum KeyPress {
        KeyDown(KeyboardEvent),
    }

    /// Keys pressed since the last simulation step.
    /// Keyed by `KeyboardEvent.code` ("Space", "KeyC", ...).
    #[derive(Debug, Default)]
    pub struct KeyState {
        pressed: HashSet<String>,
    }

    impl KeyState {
        pub fn new() -> Self {
            KeyState::default()
        }

        /// true when a keydown for `code` arrived since the last step,
        /// auto-repeat keydowns included
        pub fn was_pressed(&self, code: &str) -> bool {
            self.pressed.contains(code)
        }

        pub fn set_pressed(&mut self, code: &str) {
            self.pressed.insert(code.to_string());
        }

        pub fn clear(&mut self) {
            self.pressed.clear();
        }
    }

    /// Owns the window keydown listener, dropping it detaches the listener
    pub struct KeyListener {
        on_key_down: Closure<dyn FnMut(KeyboardEvent)>,
    }

    impl Drop for KeyListener {
        fn drop(&mut self) {
            if let Ok(window) = browser::window() {
                let _ = window.remove_event_listener_with_callback(
                    "keydown",
                    self.on_key_down.as_ref().unchecked_ref(),
                );
            }
        }
    }

    pub fn prepare_input() -> Result<(KeyListener, UnboundedReceiver<KeyPress>)> {
        let (keydown_sender, keyevent_receiver) = unbounded();

        let on_key_down = browser::closure_wrap(Box::new(move |event: KeyboardEvent| {
            let _ = keydown_sender.unbounded_send(KeyPress::KeyDown(event));
        }) as Box<dyn FnMut(KeyboardEvent)>);

        browser::window()?
            .add_event_listener_with_callback("keydown", on_key_down.as_ref().unchecked_ref())
            .map_err(|err| anyhow!("Could not listen for keydown : {:#?}", err))?;

        Ok((KeyListener { on_key_down }, keyevent_receiver))
    }

    /// Drain every pending keyboard event into `state`
    pub fn process_input(state: &mut KeyState, receiver: &mut UnboundedReceiver<KeyPress>) {
        // Err : nothing pending, Ok(None) : sender is gone
        while let Ok(Some(key_press)) = receiver.try_next() {
            match key_press {
                KeyPress::KeyDown(event) => state.set_pressed(&event.code()),
            }
        }
    }

}
