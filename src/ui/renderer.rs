/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// The 800×400 playfield is scaled to 80×20 cells: one column is 10 units
/// wide, one row 20 units tall (terminal cells are roughly 1:2).

use std::io::{self, BufWriter, Write};
use std::ops::Range;

use crossterm::{
    cursor::{self, MoveTo},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::{Obstacle, PortalKind, FIELD_HEIGHT, FIELD_WIDTH, FLOOR_Y};
use crate::sim::event::GameEvent;
use crate::sim::level::current_level;
use crate::sim::world::{Phase, WorldState};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: [u8; 4],
    ch_len: u8,
    fg: Color,
    bg: Color,
    wide: bool,    // true = this char occupies 2 terminal columns
    cont: bool,    // true = continuation of previous wide char (skip render)
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells, so the
    /// gap between rows matches the cells on VTE-based terminals.
    const BASE_BG: Color = Color::Rgb { r: 0, g: 0, b: 0 };

    const BLANK: Cell = Cell {
        ch: [b' ', 0, 0, 0],
        ch_len: 1,
        fg: Color::White,
        bg: Cell::BASE_BG,
        wide: false,
        cont: false,
    };

    const WIDE_CONT: Cell = Cell {
        ch: [0; 4],
        ch_len: 0,
        fg: Color::White,
        bg: Cell::BASE_BG,
        wide: false,
        cont: true,
    };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell {
        ch: [b'?', 0, 0, 0],
        ch_len: 1,
        fg: Color::Magenta,
        bg: Color::Magenta,
        wide: false,
        cont: false,
    };

    /// Normalize bg: Color::Reset → BASE_BG so that every cell gets an
    /// explicit background color (never terminal-default).
    #[inline]
    fn norm_bg(bg: Color) -> Color {
        match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        }
    }

    fn from_char(c: char, fg: Color, bg: Color) -> Self {
        let mut cell = Self::BLANK;
        let len = c.encode_utf8(&mut cell.ch).len() as u8;
        cell.ch_len = len;
        cell.fg = fg;
        cell.bg = Self::norm_bg(bg);
        cell
    }

    fn from_char_wide(c: char, fg: Color, bg: Color) -> Self {
        let mut cell = Self::from_char(c, fg, bg);
        cell.wide = true;
        cell
    }

    fn as_str(&self) -> &str {
        std::str::from_utf8(&self.ch[..self.ch_len as usize]).unwrap_or(" ")
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y) with given colors. Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        let mut cx = x;
        for ch in s.chars() {
            if cx >= self.width { break; }
            self.set(cx, y, Cell::from_char(ch, fg, bg));
            cx += 1;
        }
    }

    /// Place a double-width glyph (emoji) and its continuation cell.
    fn put_wide(&mut self, x: usize, y: usize, c: char, fg: Color, bg: Color) {
        if x + 1 < self.width {
            self.set(x, y, Cell::from_char_wide(c, fg, bg));
            self.set(x + 1, y, Cell::WIDE_CONT);
        }
    }
}

// ── Layout ──

const COL_UNITS: f32 = 10.0;
const ROW_UNITS: f32 = 20.0;
const FIELD_COLS: usize = (FIELD_WIDTH / COL_UNITS) as usize;
const FIELD_ROWS: usize = (FIELD_HEIGHT / ROW_UNITS) as usize;

/// Vertical offsets
const HUD_ROW: usize = 0;
const FIELD_ROW: usize = 1;
const HELP_ROW: usize = FIELD_ROW + FIELD_ROWS + 1;

/// Frames the speed-portal glow stays visible.
const GLOW_TICKS: u32 = 12;

// ── Palette ──

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const PLAYER_FG: Color = Color::Cyan;
const SPIKE_FG: Color = Color::Red;
const FLOOR_FG: Color = Color::Grey;
const FLY_FG: Color = Color::Rgb { r: 0, g: 255, b: 0 };
const SPEED_FG: Color = Color::Rgb { r: 255, g: 165, b: 0 };
const CRASH_FG: Color = Color::Yellow;

/// Cells covered by the half-open interval `[lo, hi)` at `unit` per cell.
fn span(lo: f32, hi: f32, unit: f32) -> Range<i32> {
    (lo / unit).floor() as i32..(hi / unit).ceil() as i32
}

/// Center of a field cell, in playfield units.
fn cell_center(col: i32, row: i32) -> (f32, f32) {
    (
        (col as f32 + 0.5) * COL_UNITS,
        (row as f32 + 0.5) * ROW_UNITS,
    )
}

/// Is the center of (col, row) inside the spike's visible triangle?
fn spike_covers(o: &Obstacle, col: i32, row: i32) -> bool {
    let (cx, cy) = cell_center(col, row);
    let (apex_x, apex_y) = o.apex();
    if cy < apex_y || cy > o.y {
        return false;
    }
    let half = (o.width / 2.0) * (cy - apex_y) / o.height;
    (cx - apex_x).abs() <= half
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
    keyboard_enhanced: bool,
    glow_ticks: u32,
    pub pad_connected: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
            keyboard_enhanced: false,
            glow_ticks: 0,
            pad_connected: false,
        }
    }

    /// Take over the terminal. Returns whether key Release events will be reported.
    pub fn init(&mut self) -> io::Result<bool> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        self.keyboard_enhanced = matches!(terminal::supports_keyboard_enhancement(), Ok(true));
        if self.keyboard_enhanced {
            execute!(
                self.writer,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);

        Ok(self.keyboard_enhanced)
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.keyboard_enhanced {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
        }
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Feed one simulation step's events (called once per step, even when empty).
    pub fn on_step(&mut self, events: &[GameEvent]) {
        self.glow_ticks = self.glow_ticks.saturating_sub(1);
        for event in events {
            match event {
                GameEvent::PortalEntered { kind: PortalKind::Speed } => self.glow_ticks = GLOW_TICKS,
                GameEvent::LevelStarted { .. } => self.glow_ticks = 0,
                _ => {}
            }
        }
    }

    pub fn render(&mut self, world: &WorldState, now_ms: u64) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            // Force full repaint after resize.
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Detect phase change → clear for clean transition
        if self.last_phase != Some(world.phase) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(world.phase);
        }

        self.compose(world, now_ms);

        // Diff and emit
        self.flush_diff()?;

        // Swap: current front becomes next back
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Set explicit base colors at start of frame (not ResetColor,
        // which would fall back to the terminal's own default).
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            let mut x = 0;
            while x < self.front.width {
                let cell = self.front.get(x, y);
                let prev = self.back.get(x, y);

                // Skip continuation cells (right half of wide emoji)
                if cell.cont {
                    if cell != prev { need_move = true; }
                    x += 1;
                    continue;
                }

                // For wide cells, also check if the continuation changed
                let cont_changed = cell.wide
                    && x + 1 < self.front.width
                    && self.front.get(x + 1, y) != self.back.get(x + 1, y);

                if cell == prev && !cont_changed {
                    need_move = true;
                    x += 1;
                    continue;
                }

                // Position cursor if needed
                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }

                // Set colors only if changed
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.as_str()))?;

                if cell.wide {
                    // Wide char printed: cursor advanced 2 columns
                    last_x = x + 1;
                    x += 2;
                } else {
                    last_x = x;
                    x += 1;
                }
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose(&mut self, world: &WorldState, now_ms: u64) {
        self.front.clear();
        match world.phase {
            Phase::Menu | Phase::Dead => self.compose_menu(world),
            Phase::Playing => self.compose_game(world, now_ms),
        }
    }

    /// Draw into the playfield grid; anything outside the field is clipped.
    fn set_field(&mut self, col: i32, row: i32, cell: Cell) {
        if col < 0 || row < 0 || col as usize >= FIELD_COLS || row as usize >= FIELD_ROWS {
            return;
        }
        self.front.set(col as usize, FIELD_ROW + row as usize, cell);
    }

    fn compose_game(&mut self, w: &WorldState, now_ms: u64) {
        let buf_w = self.front.width;

        // ── HUD row ──
        let mut hud = format!(" Score: {}", w.score);
        if let Some(left) = w.player.flight_remaining_ms(now_ms) {
            hud.push_str(&format!("   FLY {:>4.1}s", left as f32 / 1000.0));
        }
        hud.push_str(&format!("   Level: {}", current_level(w).name));
        if self.pad_connected {
            hud.push_str("   [pad]");
        }
        for x in 0..buf_w {
            self.front.set(x, HUD_ROW, Cell::from_char(' ', Color::White, HUD_BG));
        }
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);

        // ── Floor ──
        let floor_row = (FLOOR_Y / ROW_UNITS) as i32;
        for col in 0..FIELD_COLS as i32 {
            self.set_field(col, floor_row, Cell::from_char('▔', FLOOR_FG, Color::Reset));
        }

        // ── Player ──
        let p = &w.player;
        let cols = span(p.x, p.x + p.width, COL_UNITS);
        let rows = span(p.y, p.y + p.height, ROW_UNITS);
        for row in rows.clone() {
            for col in cols.clone() {
                self.set_field(col, row, Cell::from_char('█', PLAYER_FG, Color::Reset));
            }
        }
        if self.glow_ticks > 0 {
            self.compose_glow(cols, rows);
        }

        // ── Spikes ──
        for o in &w.obstacles {
            let b = o.bounds();
            for row in span(b.top, b.bottom, ROW_UNITS) {
                for col in span(b.left, b.right, COL_UNITS) {
                    if !spike_covers(o, col, row) { continue; }
                    let ch = if spike_covers(o, col, row - 1) { '█' } else { '▲' };
                    self.set_field(col, row, Cell::from_char(ch, SPIKE_FG, Color::Reset));
                }
            }
        }

        // ── Portals ──
        for portal in &w.portals {
            let fg = match portal.kind {
                PortalKind::Fly => FLY_FG,
                PortalKind::Speed => SPEED_FG,
            };
            let b = portal.bounds();
            for row in span(b.top, b.bottom, ROW_UNITS) {
                for col in span(b.left, b.right, COL_UNITS) {
                    self.set_field(col, row, Cell::from_char('▒', fg, Color::Reset));
                }
            }
        }

        // ── Help bar ──
        let help = " SPACE/W/↑ jump · S/↓ descend (flying) · ESC quit";
        self.front.put_str(0, HELP_ROW, help, Color::DarkGrey, Color::Reset);
    }

    /// Orange ring one cell outside the player box.
    fn compose_glow(&mut self, cols: Range<i32>, rows: Range<i32>) {
        let ring_cols = cols.start - 1..cols.end + 1;
        let ring_rows = rows.start - 1..rows.end + 1;
        for row in ring_rows.clone() {
            for col in ring_cols.clone() {
                let on_ring = row == ring_rows.start
                    || row == ring_rows.end - 1
                    || col == ring_cols.start
                    || col == ring_cols.end - 1;
                if on_ring {
                    self.set_field(col, row, Cell::from_char('░', SPEED_FG, Color::Reset));
                }
            }
        }
    }

    /// Menu and crash screen share one layout.
    fn compose_menu(&mut self, w: &WorldState) {
        let level = current_level(w);

        self.put_centered(4, "MINI GEOMETRY DASH", Color::White);

        // "Level: <name> <icon>", icon is double width.
        let label = format!("Level: {} ", level.name);
        let width = label.chars().count() + 2;
        let x = FIELD_COLS.saturating_sub(width) / 2;
        let row = FIELD_ROW + 7;
        self.front.put_str(x, row, &label, Color::White, Color::Reset);
        self.front.put_wide(x + label.chars().count(), row, level.icon, Color::White, Color::Reset);

        self.put_centered(9, "Use ◀ ▶ to select level", Color::White);
        self.put_centered(11, "Press W / UP / SPACE to play", Color::White);

        if w.phase == Phase::Dead {
            self.put_centered(13, "YOU CRASHED!", CRASH_FG);
            self.put_centered(15, &format!("Score: {}", w.score), Color::DarkGrey);
        }

        self.front.put_str(0, HELP_ROW, " ESC / Q quit", Color::DarkGrey, Color::Reset);
    }

    /// Center single-width text across the playfield, `row` counted from the field top.
    fn put_centered(&mut self, row: usize, text: &str, fg: Color) {
        let x = FIELD_COLS.saturating_sub(text.chars().count()) / 2;
        self.front.put_str(x, FIELD_ROW + row, text, fg, Color::Reset);
    }
}
