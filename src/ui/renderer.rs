/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// ## Scale
///
/// One terminal cell covers `COL_UNITS × ROW_UNITS` background units, so
/// the 7800 × 7800 maze is a 260 × 130 cell map seen through the camera.
/// Wall cells come from a coarse mask of the wall point set, rebuilt only
/// when a door changes state.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::PLANT_RIPE;
use crate::domain::geom::{Point, Rect};
use crate::domain::item::{ItemKind, ToolKind, WeaponKind};
use crate::domain::maze::EXTENT;
use crate::sim::event::GameEvent;
use crate::sim::world::{DrawKind, Drawable, Phase, Stage, WorldState};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: [u8; 4],
    ch_len: u8,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells, so the gap
    /// pixels between rows match the cell colour on VTE terminals.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: [b' ', 0, 0, 0], ch_len: 1, fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel cell used to invalidate the back buffer.
    const INVALID: Cell = Cell { ch: [b'?', 0, 0, 0], ch_len: 1, fg: Color::Magenta, bg: Color::Magenta };

    fn from_char(c: char, fg: Color, bg: Color) -> Self {
        let mut cell = Self::BLANK;
        cell.ch_len = c.encode_utf8(&mut cell.ch).len() as u8;
        cell.fg = fg;
        cell.bg = bg;
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
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
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
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width {
                break;
            }
            self.set(x + i, y, Cell::from_char(ch, fg, bg));
        }
    }

    fn put_centered(&mut self, y: usize, s: &str, fg: Color, bg: Color) {
        let len = s.chars().count();
        let x = self.width.saturating_sub(len) / 2;
        self.put_str(x, y, s, fg, bg);
    }
}

// ── Renderer ──

/// Background units per terminal column / row.
const COL_UNITS: i32 = 30;
const ROW_UNITS: i32 = 60;

const MASK_W: usize = (EXTENT.w / COL_UNITS) as usize;
const MASK_H: usize = (EXTENT.h / ROW_UNITS) as usize;

/// Vertical layout
const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

const WALL_FG: Color = Color::Rgb { r: 120, g: 118, b: 140 };
const FLOOR_BG: Color = Color::Rgb { r: 48, g: 44, b: 36 };
const DARK_BG: Color = Color::Rgb { r: 6, g: 6, b: 10 };
const HUD_FG: Color = Color::Rgb { r: 230, g: 220, b: 180 };

/// Frames the health readout stays red after a hit.
const HIT_FLASH_FRAMES: u16 = 40;

const HELP: &str = " Arrows move  Space use  D pick up  F drop  E stow  R cycle  W chest  Q flashlight  A menu  Esc quit";

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
    /// Coarse wall cells over the whole maze, plus the door states it was built for.
    wall_mask: Vec<bool>,
    mask_doors: Vec<bool>,
    hit_flash: u16,
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
            wall_mask: Vec::new(),
            mask_doors: Vec::new(),
            hit_flash: 0,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Feedback for this tick's events.
    pub fn absorb(&mut self, events: &[GameEvent]) {
        if events.iter().any(|e| matches!(e, GameEvent::PlayerHit { .. })) {
            self.hit_flash = HIT_FLASH_FRAMES;
        }
    }

    /// Terminal cell → background point, if it lies on the map.
    pub fn screen_to_world(&self, col: u16, row: u16, world: &WorldState) -> Option<Point> {
        let row = (row as usize).checked_sub(MAP_ROW)?;
        let p = Point::new(
            world.camera.x + col as i32 * COL_UNITS + COL_UNITS / 2,
            world.camera.y + row as i32 * ROW_UNITS + ROW_UNITS / 2,
        );
        world.camera.view_rect().contains(p).then_some(p)
    }

    pub fn render(&mut self, world: &mut WorldState) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Viewport = terminal minus HUD, message and help rows.
        let map_rows = self.term_h.saturating_sub(MAP_ROW + 2).max(1);
        let first_frame = world.camera.view_w == 0;
        world.camera.view_w = (self.term_w.min(MASK_W) as i32) * COL_UNITS;
        world.camera.view_h = (map_rows.min(MASK_H) as i32) * ROW_UNITS;
        let target = world.player.rect.center();
        let extent = world.extent();
        if first_frame {
            world.camera.center_on(target, &extent);
        } else {
            world.camera.follow(target, &extent);
        }
        // Align to whole cells so walls do not shimmer while scrolling.
        world.camera.x -= world.camera.x.rem_euclid(COL_UNITS);
        world.camera.y -= world.camera.y.rem_euclid(ROW_UNITS);

        let phase_changed = self.last_phase != Some(world.phase);
        if phase_changed {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(world.phase);
        }

        self.refresh_wall_mask(world);

        self.front.clear();
        match world.phase {
            Phase::Playing => self.compose_game(world),
            Phase::Menu => {
                self.compose_game(world);
                self.compose_menu(world);
            }
            Phase::Ascending => {
                self.compose_game(world);
                self.compose_banner("You drink the potion and rise toward Olympus...");
            }
            Phase::Won => self.compose_end(
                "VICTORY",
                "All six monsters slain. You ascend to Olympus as a god.",
                "Press Enter or Esc to quit",
                Color::Rgb { r: 250, g: 210, b: 90 },
            ),
            Phase::Lost => self.compose_end(
                "YOU HAVE FALLEN",
                "The labyrinth claims another hero.",
                "Press Enter to try again, Esc to quit",
                Color::Rgb { r: 220, g: 70, b: 60 },
            ),
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    fn refresh_wall_mask(&mut self, world: &WorldState) {
        let doors: Vec<bool> = world.maze.doors().iter().map(|d| d.open).collect();
        if !self.wall_mask.is_empty() && doors == self.mask_doors {
            return;
        }
        self.wall_mask = (0..MASK_H)
            .flat_map(|r| (0..MASK_W).map(move |c| (r, c)))
            .map(|(r, c)| {
                let cell = Rect::new(c as i32 * COL_UNITS, r as i32 * ROW_UNITS, COL_UNITS, ROW_UNITS);
                world.maze.any_wall_in(&cell)
            })
            .collect();
        self.mask_doors = doors;
    }

    fn is_wall_cell(&self, col: i32, row: i32) -> bool {
        if col < 0 || row < 0 || col as usize >= MASK_W || row as usize >= MASK_H {
            return false;
        }
        self.wall_mask[row as usize * MASK_W + col as usize]
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colours; ResetColor would fall back to the terminal default.
        queue!(self.writer, SetForegroundColor(Color::White), SetBackgroundColor(Cell::BASE_BG))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }
                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.as_str()))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_game(&mut self, w: &WorldState) {
        self.compose_hud(w);

        let cam_col = w.camera.x / COL_UNITS;
        let cam_row = w.camera.y / ROW_UNITS;
        let cols = (w.camera.view_w / COL_UNITS) as usize;
        let rows = (w.camera.view_h / ROW_UNITS) as usize;

        // ── Map (camera viewport) ──
        for sy in 0..rows {
            for sx in 0..cols {
                let (col, row) = (cam_col + sx as i32, cam_row + sy as i32);
                let center = Point::new(col * COL_UNITS + COL_UNITS / 2, row * ROW_UNITS + ROW_UNITS / 2);
                let lit = w.is_lit(center);
                let cell = match (self.is_wall_cell(col, row), lit) {
                    (true, true) => Cell::from_char('█', WALL_FG, FLOOR_BG),
                    (true, false) => Cell::from_char('▓', Color::Rgb { r: 30, g: 30, b: 40 }, DARK_BG),
                    (false, true) => Cell::from_char(' ', Color::White, FLOOR_BG),
                    (false, false) => Cell::from_char(' ', Color::White, DARK_BG),
                };
                self.front.set(sx, MAP_ROW + sy, cell);
            }
        }

        // ── Entities, back to front ──
        for d in w.drawables().iter().filter(|d| d.visible) {
            self.compose_drawable(w, d, cols, rows);
        }

        // ── Message + help ──
        let msg_row = self.term_h.saturating_sub(2);
        if !w.message.is_empty() {
            let msg = format!(" {} ", w.message);
            self.front.put_centered(msg_row, &msg, Color::Black, Color::Rgb { r: 230, g: 200, b: 120 });
        }
        let help_row = self.term_h.saturating_sub(1);
        self.front.put_str(0, help_row, HELP, Color::DarkGrey, Cell::BASE_BG);
    }

    fn compose_hud(&mut self, w: &WorldState) {
        let stage = w.progress.stage.label();
        let monster = match w.active_monster() {
            Some(n) => format!("{} ♥{}", w.monsters[n].kind.title(), w.monsters[n].health),
            None if w.progress.stage == Stage::Final => "Find the potion".to_string(),
            None => "No monster loose".to_string(),
        };
        let held = w.held_item().map_or("nothing", |it| it.kind.display_name());
        let gems = format!("Gems {}/{}", w.gems_collected(), w.quest.gem_quota);
        let clock = if w.progress.gems_expired {
            "Gems gone".to_string()
        } else {
            let ms = w.progress.countdown as u64 * w.timing.tick_rate_ms;
            format!("Gems vanish in {}:{:02}", ms / 60_000, (ms / 1000) % 60)
        };
        let health = format!(" ♥ {:<3} ", w.player.health);
        let health_fg = if self.hit_flash > 0 { Color::Red } else { HUD_FG };
        self.hit_flash = self.hit_flash.saturating_sub(1);
        self.front.put_str(0, HUD_ROW, &health, health_fg, Cell::BASE_BG);

        let hud = format!(" {stage}  │  {monster}  │  Holding: {held}  │  {gems}  │  {clock} ");
        self.front.put_str(health.chars().count(), HUD_ROW, &hud, HUD_FG, Cell::BASE_BG);
    }

    fn compose_drawable(&mut self, w: &WorldState, d: &Drawable, cols: usize, rows: usize) {
        let Some((fill, glyph, fg)) = style(d) else {
            return;
        };
        let cam_col = w.camera.x / COL_UNITS;
        let cam_row = w.camera.y / ROW_UNITS;
        let c0 = d.rect.x.div_euclid(COL_UNITS) - cam_col;
        let r0 = d.rect.y.div_euclid(ROW_UNITS) - cam_row;
        let c1 = (d.rect.right() - 1).div_euclid(COL_UNITS) - cam_col;
        let r1 = (d.rect.bottom() - 1).div_euclid(ROW_UNITS) - cam_row;
        let in_view = |c: i32, r: i32| c >= 0 && r >= 0 && (c as usize) < cols && (r as usize) < rows;

        if let Some(bg) = fill {
            for r in r0..=r1 {
                for c in c0..=c1 {
                    if in_view(c, r) {
                        self.front.set(c as usize, MAP_ROW + r as usize, Cell::from_char(' ', fg, bg));
                    }
                }
            }
        }
        let (gc, gr) = ((c0 + c1) / 2, (r0 + r1) / 2);
        if in_view(gc, gr) {
            let bg = fill.unwrap_or_else(|| self.front.get(gc as usize, MAP_ROW + gr as usize).bg);
            self.front.set(gc as usize, MAP_ROW + gr as usize, Cell::from_char(glyph, fg, bg));
        }
    }

    fn compose_menu(&mut self, w: &WorldState) {
        let mut lines = vec!["  BACKPACK  ".to_string(), String::new()];
        for (i, &id) in w.inventory.carried().iter().enumerate() {
            let held = if w.inventory.held() == Some(id) { "  (in hand)" } else { "" };
            lines.push(format!("  {}. {}{}  ", i + 1, w.items[id].kind.display_name(), held));
        }
        if w.inventory.carried().is_empty() {
            lines.push("  (empty)  ".to_string());
        }
        lines.push(String::new());
        lines.push("  1-5 equip   A close  ".to_string());

        let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) + 2;
        let top = (self.term_h.saturating_sub(lines.len())) / 2;
        let left = self.term_w.saturating_sub(width) / 2;
        let bg = Color::Rgb { r: 40, g: 40, b: 70 };
        for (i, line) in lines.iter().enumerate() {
            let padded = format!("{line:<width$}");
            self.front.put_str(left, top + i, &padded, Color::White, bg);
        }
    }

    fn compose_banner(&mut self, text: &str) {
        let row = MAP_ROW + 1;
        let msg = format!("  {text}  ");
        self.front.put_centered(row, &msg, Color::Black, Color::Rgb { r: 250, g: 230, b: 150 });
    }

    fn compose_end(&mut self, title: &str, line: &str, hint: &str, color: Color) {
        let mid = self.term_h / 2;
        self.front.put_centered(mid.saturating_sub(2), title, color, Cell::BASE_BG);
        self.front.put_centered(mid, line, Color::White, Cell::BASE_BG);
        self.front.put_centered(mid + 2, hint, Color::DarkGrey, Cell::BASE_BG);
    }
}

/// Fill colour (if the sprite paints its whole box), glyph and glyph colour.
fn style(d: &Drawable) -> Option<(Option<Color>, char, Color)> {
    let s = match d.kind {
        DrawKind::Player => (Some(Color::Rgb { r: 70, g: 110, b: 200 }), '@', Color::White),
        DrawKind::Monster(kind) => {
            // Frames 4..8 are the lunge pose.
            let bg = if d.frame >= 4 {
                Color::Rgb { r: 240, g: 90, b: 40 }
            } else {
                Color::Rgb { r: 160, g: 40, b: 40 }
            };
            let initial = kind.name().chars().next().unwrap_or('M').to_ascii_uppercase();
            (Some(bg), initial, Color::White)
        }
        DrawKind::Item(kind) => (None, item_glyph(kind, d.frame == 1), item_color(kind)),
        DrawKind::Chest => {
            let glyph = if d.frame == 1 { '□' } else { '▣' };
            (Some(Color::Rgb { r: 120, g: 80, b: 30 }), glyph, Color::Rgb { r: 240, g: 200, b: 90 })
        }
        DrawKind::Plant => {
            let glyph = match d.frame as u8 {
                0 => ',',
                s if s < PLANT_RIPE => '♣',
                _ => '✿',
            };
            (None, glyph, Color::Rgb { r: 90, g: 200, b: 90 })
        }
        DrawKind::Door(index) => {
            if d.frame == 1 {
                return None;
            }
            let digit = char::from_digit(index as u32, 10).unwrap_or('#');
            (Some(Color::Rgb { r: 140, g: 90, b: 40 }), digit, Color::White)
        }
        DrawKind::LightSwitch => {
            let fg = if d.frame == 1 { Color::Yellow } else { Color::DarkGrey };
            (None, '◉', fg)
        }
    };
    Some(s)
}

fn item_glyph(kind: ItemKind, on: bool) -> char {
    match kind {
        ItemKind::Weapon(WeaponKind::Sword) => '†',
        ItemKind::Weapon(WeaponKind::BoxingGlove) => '●',
        ItemKind::Weapon(WeaponKind::FlameThrower) => '♨',
        ItemKind::Weapon(WeaponKind::Trident) => 'Ψ',
        ItemKind::Tool(ToolKind::Shovel) => '♠',
        ItemKind::Tool(ToolKind::Flashlight) => if on { '☼' } else { '¡' },
        ItemKind::Key(k) => char::from_digit(k as u32, 10).unwrap_or('k'),
        ItemKind::Gem => '♦',
        ItemKind::Potion => 'Ω',
    }
}

fn item_color(kind: ItemKind) -> Color {
    match kind {
        ItemKind::Weapon(_) => Color::Rgb { r: 210, g: 210, b: 230 },
        ItemKind::Tool(_) => Color::Rgb { r: 200, g: 170, b: 120 },
        ItemKind::Key(_) => Color::Rgb { r: 250, g: 210, b: 60 },
        ItemKind::Gem => Color::Rgb { r: 90, g: 220, b: 240 },
        ItemKind::Potion => Color::Rgb { r: 230, g: 90, b: 220 },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_str_clips_at_width() {
        let mut fb = FrameBuffer::new(4, 1);
        fb.put_str(2, 0, "abc", Color::White, Cell::BASE_BG);
        assert_eq!(fb.get(2, 0).as_str(), "a");
        assert_eq!(fb.get(3, 0).as_str(), "b");
    }

    #[test]
    fn open_doors_are_not_drawn() {
        let open = Drawable { kind: DrawKind::Door(3), rect: Rect::new(0, 0, 10, 10), frame: 1, visible: true };
        assert!(style(&open).is_none());
        let shut = Drawable { frame: 0, ..open };
        assert_eq!(style(&shut).map(|s| s.1), Some('3'));
    }

    #[test]
    fn every_item_has_a_glyph() {
        assert_eq!(item_glyph(ItemKind::Key(7), false), '7');
        assert_ne!(item_glyph(ItemKind::FLASHLIGHT, true), item_glyph(ItemKind::FLASHLIGHT, false));
    }
}
