use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{ExecutableCommand, QueueableCommand};
use clap::Parser;
use labyrinth::config::{
    DEFAULT_AGGRESSIVENESS, DEFAULT_GRID_H, DEFAULT_GRID_W, DEFAULT_GROWL_CHANCE,
    DEFAULT_GROWL_MS, DEFAULT_PROXIMITY_STEPS, DEFAULT_PURSUIT_MS,
};
use labyrinth::{distance_map, format_elapsed, Dir, GameConfig, GameEvent, GameState, Pos, Status};
use log::{info, trace};
use std::io::{self, Stdout, Write};
use std::thread;
use std::time::{Duration, Instant};
use unicode_width::UnicodeWidthStr;

const CELL_W: usize = 2;
const DEFAULT_RENDER_FPS: u64 = 60;
const GROWL_SHOWN_MS: u64 = 1200;

/// Escape the labyrinth before the minotaur finds you.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Maze width in cells
    #[arg(long, env = "LABYRINTH_WIDTH", default_value_t = DEFAULT_GRID_W)]
    width: usize,

    /// Maze height in cells
    #[arg(long, env = "LABYRINTH_HEIGHT", default_value_t = DEFAULT_GRID_H)]
    height: usize,

    /// Chance (0..1) that the minotaur takes the shortest path on a move
    #[arg(long, env = "LABYRINTH_AGGRESSIVENESS", default_value_t = DEFAULT_AGGRESSIVENESS)]
    aggressiveness: f64,

    /// Milliseconds between minotaur moves
    #[arg(long, env = "LABYRINTH_PURSUIT_MS", default_value_t = DEFAULT_PURSUIT_MS)]
    pursuit_ms: u64,

    /// Remaining path length below which a chase step growls
    #[arg(long, env = "LABYRINTH_PROXIMITY", default_value_t = DEFAULT_PROXIMITY_STEPS)]
    proximity: usize,

    /// Minimum milliseconds between ambient growls
    #[arg(long, env = "LABYRINTH_GROWL_MS", default_value_t = DEFAULT_GROWL_MS)]
    growl_ms: u64,

    /// Chance per frame that a due ambient growl fires
    #[arg(long, env = "LABYRINTH_GROWL_CHANCE", default_value_t = DEFAULT_GROWL_CHANCE)]
    growl_chance: f64,

    /// Random seed; fresh each session when omitted
    #[arg(long, env = "LABYRINTH_SEED")]
    seed: Option<u64>,

    /// Render frames per second
    #[arg(long, env = "LABYRINTH_FPS", default_value_t = DEFAULT_RENDER_FPS)]
    fps: u64,
}

impl Args {
    fn config(&self) -> GameConfig {
        GameConfig {
            width: self.width,
            height: self.height,
            aggressiveness: self.aggressiveness,
            pursuit_interval: Duration::from_millis(self.pursuit_ms),
            proximity_threshold: self.proximity,
            growl_interval: Duration::from_millis(self.growl_ms),
            growl_chance: self.growl_chance,
            seed: self.seed,
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Glyph {
    Player,
    Minotaur,
    Exit,
    Wall,
    Floor,
}

#[derive(Clone, Copy, PartialEq)]
struct Cell {
    glyph: Glyph,
    color: Color,
}

enum Action {
    Move(Dir),
    Restart,
    Quit,
}

struct Renderer {
    last: Vec<Cell>,
    last_hud: String,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
    lattice_w: usize,
    lattice_h: usize,
    exit_dist: Vec<Vec<Option<u32>>>,
    growl_until: Option<Instant>,
}

impl Renderer {
    fn new(game: &GameState) -> Self {
        let lattice_w = game.grid().width() * 2 + 1;
        let lattice_h = game.grid().height() * 2 + 1;
        Self {
            last: vec![
                Cell {
                    glyph: Glyph::Floor,
                    color: Color::Reset,
                };
                lattice_w * lattice_h
            ],
            last_hud: String::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
            lattice_w,
            lattice_h,
            exit_dist: distance_map(game.grid(), game.exit()),
            growl_until: None,
        }
    }

    fn notice(&mut self, event: GameEvent) {
        match event {
            GameEvent::Growl => {
                self.growl_until = Some(Instant::now() + Duration::from_millis(GROWL_SHOWN_MS));
            }
            GameEvent::PlayerMoved(pos) => trace!("player moved to {:?}", pos),
            GameEvent::Escaped | GameEvent::Caught => {}
        }
    }

    fn growling(&self) -> bool {
        self.growl_until.is_some_and(|t| Instant::now() < t)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();
    let mut game = GameState::new(args.config())?;

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let result = run(&mut stdout, &mut game, args.fps);

    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

fn run(stdout: &mut Stdout, game: &mut GameState, fps: u64) -> anyhow::Result<()> {
    let mut renderer = Renderer::new(game);
    let frame_time = Duration::from_micros(1_000_000 / fps.max(1));
    let mut last_frame = Instant::now();

    loop {
        let frame_start = Instant::now();
        while event::poll(Duration::from_millis(0))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Release {
                    continue;
                }
                match action_for(key.code) {
                    Some(Action::Quit) => return Ok(()),
                    Some(Action::Restart) => {
                        game.restart();
                        renderer = Renderer::new(game);
                    }
                    Some(Action::Move(dir)) => {
                        game.apply_player_intent(dir);
                    }
                    None => {}
                }
            }
        }

        game.tick(frame_start.duration_since(last_frame));
        last_frame = frame_start;
        for event in game.drain_events() {
            renderer.notice(event);
        }
        render(stdout, game, &mut renderer)?;

        if game.is_over() {
            if !render_game_over(stdout, game, &renderer)? {
                return Ok(());
            }
            game.restart();
            renderer = Renderer::new(game);
            last_frame = Instant::now();
            continue;
        }

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

fn action_for(code: KeyCode) -> Option<Action> {
    let action = match code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') | KeyCode::Char('k') => {
            Action::Move(Dir::Up)
        }
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Char('j') => {
            Action::Move(Dir::Down)
        }
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Char('h') => {
            Action::Move(Dir::Left)
        }
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Char('l') => {
            Action::Move(Dir::Right)
        }
        KeyCode::Char('r') | KeyCode::Char('R') => Action::Restart,
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        _ => return None,
    };
    Some(action)
}

fn render(stdout: &mut Stdout, game: &GameState, renderer: &mut Renderer) -> io::Result<()> {
    let needed_h = (renderer.lattice_h + 2) as u16;
    let needed_w = (renderer.lattice_w * CELL_W) as u16;

    stdout.queue(MoveTo(0, 0))?;

    let (term_w, term_h) = terminal::size()?;
    if term_w < needed_w || term_h < needed_h {
        stdout.queue(Clear(ClearType::All))?;
        let msg = format!(
            "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
            needed_w, needed_h, term_w, term_h
        );
        stdout.queue(Print(msg))?;
        stdout.flush()?;
        renderer.needs_full = true;
        return Ok(());
    }

    let origin_x = (term_w - needed_w) / 2;
    let origin_y = (term_h - needed_h) / 2 + 1;
    if origin_x != renderer.origin_x || origin_y != renderer.origin_y {
        renderer.origin_x = origin_x;
        renderer.origin_y = origin_y;
        renderer.needs_full = true;
    }
    if renderer.needs_full {
        stdout.queue(Clear(ClearType::All))?;
    }

    let player = game.player();
    let steps = renderer.exit_dist[player.y][player.x]
        .map_or_else(|| "?".to_string(), |d| d.to_string());
    let mut hud = format!(
        "Time: {}  Exit: {} steps  (r restart, q quit)",
        format_elapsed(game.elapsed()),
        steps
    );
    if renderer.growling() {
        hud.push_str("  The minotaur growls...");
    }
    if renderer.needs_full || hud != renderer.last_hud {
        stdout.queue(MoveTo(renderer.origin_x, renderer.origin_y - 1))?;
        stdout.queue(SetForegroundColor(Color::White))?;
        stdout.queue(Clear(ClearType::CurrentLine))?;
        stdout.queue(Print(&hud))?;
        stdout.queue(ResetColor)?;
        renderer.last_hud = hud;
    }

    for ly in 0..renderer.lattice_h {
        for lx in 0..renderer.lattice_w {
            let cell = cell_for(game, lx, ly);
            let idx = ly * renderer.lattice_w + lx;
            if renderer.needs_full || cell != renderer.last[idx] {
                renderer.last[idx] = cell;
                draw_cell(stdout, renderer, lx, ly, cell)?;
            }
        }
    }
    renderer.needs_full = false;

    stdout.flush()?;
    Ok(())
}

/// Maps a lattice coordinate to what is drawn there. Odd/odd coordinates are
/// maze cells, odd/even and even/odd are the walls between them, even/even
/// are the pillars at wall corners.
fn cell_for(game: &GameState, lx: usize, ly: usize) -> Cell {
    let grid = game.grid();
    let wall = Cell {
        glyph: Glyph::Wall,
        color: Color::DarkRed,
    };
    let floor = Cell {
        glyph: Glyph::Floor,
        color: Color::Reset,
    };
    let open = match (lx % 2, ly % 2) {
        (1, 1) => {
            let pos = Pos::new(lx / 2, ly / 2);
            if pos == game.player() {
                return Cell {
                    glyph: Glyph::Player,
                    color: Color::White,
                };
            }
            if pos == game.pursuer() {
                return Cell {
                    glyph: Glyph::Minotaur,
                    color: Color::Red,
                };
            }
            if pos == game.exit() {
                return Cell {
                    glyph: Glyph::Exit,
                    color: Color::Green,
                };
            }
            true
        }
        (0, 1) => {
            let (x, y) = (lx / 2, ly / 2);
            if x == 0 {
                grid.is_open(Pos::new(0, y), Dir::Left)
            } else {
                grid.is_open(Pos::new(x - 1, y), Dir::Right)
            }
        }
        (1, 0) => {
            let (x, y) = (lx / 2, ly / 2);
            if y == 0 {
                grid.is_open(Pos::new(x, 0), Dir::Up)
            } else {
                grid.is_open(Pos::new(x, y - 1), Dir::Down)
            }
        }
        _ => false,
    };
    if open {
        floor
    } else {
        wall
    }
}

fn draw_cell(stdout: &mut Stdout, renderer: &Renderer, lx: usize, ly: usize, cell: Cell) -> io::Result<()> {
    let text = match cell.glyph {
        Glyph::Player => "🧍",
        Glyph::Minotaur => "🐂",
        Glyph::Exit => "🚪",
        Glyph::Wall => "██",
        Glyph::Floor => "  ",
    };
    let x_pos = renderer.origin_x + (lx * CELL_W) as u16;
    let y_pos = renderer.origin_y + ly as u16;
    stdout.queue(MoveTo(x_pos, y_pos))?;
    stdout.queue(SetForegroundColor(cell.color))?;
    stdout.queue(Print(text))?;
    let w = UnicodeWidthStr::width(text);
    if w < CELL_W {
        for _ in 0..(CELL_W - w) {
            stdout.queue(Print(' '))?;
        }
    }
    stdout.queue(ResetColor)?;
    Ok(())
}

/// Shows the result and blocks until the player restarts (`true`) or quits.
fn render_game_over(stdout: &mut Stdout, game: &GameState, renderer: &Renderer) -> io::Result<bool> {
    let (term_w, term_h) = terminal::size()?;
    let needed_h = (renderer.lattice_h + 2) as u16;
    let needed_w = (renderer.lattice_w * CELL_W) as u16;
    if term_w < needed_w || term_h < needed_h {
        stdout.queue(MoveTo(0, needed_h))?;
    } else {
        stdout.queue(MoveTo(renderer.origin_x, renderer.origin_y + renderer.lattice_h as u16))?;
    }
    let (headline, color) = match game.status() {
        Status::Escaped => ("ESCAPED! You found the way out", Color::Green),
        Status::Caught => ("CAUGHT! The minotaur got you", Color::Red),
        Status::Playing => ("", Color::Reset),
    };
    stdout.queue(SetForegroundColor(color))?;
    stdout.queue(Print(format!(
        "{} in {} (r to play again, q to quit)",
        headline,
        format_elapsed(game.elapsed())
    )))?;
    stdout.queue(ResetColor)?;
    stdout.flush()?;
    info!("session over: {:?} (seed {})", game.status(), game.seed());
    loop {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match action_for(key.code) {
                    Some(Action::Restart) => return Ok(true),
                    Some(Action::Quit) => return Ok(false),
                    _ => {}
                }
            }
        }
    }
}
