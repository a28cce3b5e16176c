/// WorldState: the complete snapshot of a running game.
///
/// ## Ownership
///
///   - `maze`      owns the wall point set and the eight doors
///   - `items`     is the item arena; `Item::location` plus `inventory`
///                 decide which single place each item is in
///   - `monsters`  all six, in hunt order; index == hunt level
///
/// ## Camera / Viewport
///
/// Background and screen coordinates are separate:
///   - `camera` is a viewport into the maze (top-left + size, background units)
///   - the renderer maps `screen = background − camera origin`
///   - the camera follows the player with a dead zone

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::{GameConfig, QuestConfig, TimingConfig};
use crate::domain::ai::AiTuning;
use crate::domain::entity::{Bounded, Chest, Monster, MonsterKind, Plant, Player, Trackable};
use crate::domain::geom::{Point, Rect};
use crate::domain::inventory::Inventory;
use crate::domain::item::{Item, ItemKind, Location, ToolKind};
use crate::domain::maze::{is_inner, Maze, EXTENT};
use crate::domain::repeat::RepeatOnHold;
use crate::domain::stats::StatTable;

/// Toggles the labyrinth lights when clicked or used.
pub const LIGHT_SWITCH: Rect = Rect::new(3830, 3870, 40, 40);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Playing,
    /// Backpack menu open; the world is frozen.
    Menu,
    /// Potion taken; short animation before the win screen.
    Ascending,
    Won,
    Lost,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Stage {
    /// Free roam before the first monster is released.
    Tutorial,
    /// Hunting monster `n` (0..=5).
    Hunt(usize),
    /// All monsters slain; key 7 and the gem quota lead to the potion.
    Final,
}

impl Stage {
    pub fn label(&self) -> String {
        match self {
            Stage::Tutorial => "Tutorial".into(),
            Stage::Hunt(n) => format!("Level {}", n + 1),
            Stage::Final => "Final room".into(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Progress {
    pub stage: Stage,
    /// Ticks left before uncollected gems vanish.
    pub countdown: u32,
    pub gems_expired: bool,
    /// Potion taken. Irreversible.
    pub complete: bool,
    pub lights_on: bool,
}

impl Progress {
    pub fn new(countdown: u32) -> Self {
        Progress { stage: Stage::Tutorial, countdown, gems_expired: false, complete: false, lights_on: false }
    }
}

/// Repeat-on-hold cadences for every continuous action.
#[derive(Clone, Debug)]
pub struct Cadences {
    pub cycle: RepeatOnHold,
    pub dig: RepeatOnHold,
    pub damage: RepeatOnHold,
    pub flashlight: RepeatOnHold,
    pub chest: RepeatOnHold,
    /// Key use and the light switch: fire once per press.
    pub press: RepeatOnHold,
}

impl Cadences {
    pub fn from_timing(t: &TimingConfig) -> Self {
        Cadences {
            cycle: RepeatOnHold::new(t.cycle_interval),
            dig: RepeatOnHold::new(t.dig_interval),
            damage: RepeatOnHold::new(t.damage_interval),
            flashlight: RepeatOnHold::new(t.flashlight_interval),
            chest: RepeatOnHold::new(t.chest_interval),
            press: RepeatOnHold::new(u32::MAX),
        }
    }
}

/// Camera: a viewport into the maze, in background units.
#[derive(Clone, Debug)]
pub struct Camera {
    pub x: i32,
    pub y: i32,
    pub view_w: i32,
    pub view_h: i32,
}

impl Camera {
    pub fn new() -> Self {
        Camera { x: 0, y: 0, view_w: 0, view_h: 0 }
    }

    /// Scroll only when the target leaves the inner 60% of the viewport.
    pub fn follow(&mut self, target: Point, extent: &Rect) {
        if self.view_w <= 0 || self.view_h <= 0 {
            return;
        }
        let margin_x = self.view_w / 5;
        if target.x < self.x + margin_x {
            self.x = target.x - margin_x;
        } else if target.x > self.x + self.view_w - margin_x {
            self.x = target.x - self.view_w + margin_x;
        }
        let margin_y = self.view_h / 5;
        if target.y < self.y + margin_y {
            self.y = target.y - margin_y;
        } else if target.y > self.y + self.view_h - margin_y {
            self.y = target.y - self.view_h + margin_y;
        }
        self.clamp(extent);
    }

    /// Snap directly onto `target` (no dead zone). Used on start and restart.
    pub fn center_on(&mut self, target: Point, extent: &Rect) {
        if self.view_w <= 0 || self.view_h <= 0 {
            return;
        }
        self.x = target.x - self.view_w / 2;
        self.y = target.y - self.view_h / 2;
        self.clamp(extent);
    }

    fn clamp(&mut self, extent: &Rect) {
        self.x = self.x.clamp(extent.x, (extent.right() - self.view_w).max(extent.x));
        self.y = self.y.clamp(extent.y, (extent.bottom() - self.view_h).max(extent.y));
    }

    /// Background point → viewport offset, or `None` if off screen.
    pub fn world_to_view(&self, p: Point) -> Option<(i32, i32)> {
        let (vx, vy) = (p.x - self.x, p.y - self.y);
        if vx >= 0 && vx < self.view_w && vy >= 0 && vy < self.view_h {
            Some((vx, vy))
        } else {
            None
        }
    }

    pub fn view_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.view_w, self.view_h)
    }
}

/// What the renderer draws for one entity.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DrawKind {
    Player,
    Monster(MonsterKind),
    Item(ItemKind),
    Chest,
    Plant,
    Door(u8),
    LightSwitch,
}

#[derive(Clone, Copy, Debug)]
pub struct Drawable {
    pub kind: DrawKind,
    pub rect: Rect,
    /// Facing/pose index for animated kinds, state index otherwise.
    pub frame: usize,
    pub visible: bool,
}

pub struct WorldState {
    // ── Geometry ──
    pub maze: Maze,

    // ── Entities ──
    pub player: Player,
    pub inventory: Inventory,
    pub items: Vec<Item>,
    pub monsters: Vec<Monster>,
    pub chests: Vec<Chest>,
    pub plants: Vec<Plant>,
    pub light_switch: Rect,

    // ── Game tracking ──
    pub progress: Progress,
    pub phase: Phase,
    pub tick: u64,
    pub ascend_timer: u32,
    /// "use" held this tick: held items sit in the extended pose.
    pub extended: bool,
    pub cadence: Cadences,

    // ── Tuning ──
    pub timing: TimingConfig,
    pub ai: AiTuning,
    pub quest: QuestConfig,
    pub stats: StatTable,
    pub rng: StdRng,

    // ── UI ──
    pub message: String,
    pub message_timer: u32,
    pub camera: Camera,
}

// ── Construction ──

impl WorldState {
    /// Bare world: maze built, player at spawn, no entities yet.
    /// `level::new_game` populates it.
    pub fn new(config: &GameConfig) -> Self {
        let rng = match config.quest.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };
        WorldState {
            maze: Maze::build(),
            player: Player::spawn(),
            inventory: Inventory::new(),
            items: vec![],
            monsters: vec![],
            chests: vec![],
            plants: vec![],
            light_switch: LIGHT_SWITCH,
            progress: Progress::new(config.timing.gem_countdown_ticks),
            phase: Phase::Playing,
            tick: 0,
            ascend_timer: 0,
            extended: false,
            cadence: Cadences::from_timing(&config.timing),
            timing: config.timing.clone(),
            ai: config.ai_tuning(),
            quest: config.quest.clone(),
            stats: config.stats.clone(),
            rng,
            message: String::new(),
            message_timer: 0,
            camera: Camera::new(),
        }
    }

    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }

    /// Show `msg` for the configured message duration.
    pub fn say(&mut self, msg: &str) {
        self.set_message(msg, self.timing.message_ticks);
    }

    pub fn tick_message(&mut self) {
        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 {
                self.message.clear();
            }
        }
    }
}

// ── Queries ──

impl WorldState {
    pub fn held_item(&self) -> Option<&Item> {
        self.inventory.held().and_then(|id| self.items.get(id))
    }

    /// The monster being hunted, if it is still alive.
    pub fn active_monster(&self) -> Option<usize> {
        match self.progress.stage {
            Stage::Hunt(n) if self.monsters.get(n).is_some_and(|m| m.health > 0) => Some(n),
            _ => None,
        }
    }

    /// Gems the player has picked up at least once.
    pub fn gems_collected(&self) -> usize {
        self.items.iter().filter(|it| it.is_gem() && it.pickups > 0).count()
    }

    pub fn flashlight_lit(&self) -> bool {
        self.held_item()
            .is_some_and(|it| it.kind == ItemKind::Tool(ToolKind::Flashlight) && it.on)
    }

    /// Everything the player and monsters cannot walk through, except
    /// monster `skip`: live monsters, chests, plants and closed doors.
    pub fn blockers(&self, skip: Option<usize>) -> Vec<Rect> {
        let mut out = Vec::with_capacity(self.monsters.len() + self.chests.len() + self.plants.len() + 8);
        out.extend(
            self.monsters
                .iter()
                .enumerate()
                .filter(|(i, m)| Some(*i) != skip && m.health > 0 && !m.walk_over())
                .map(|(_, m)| m.bounds()),
        );
        out.extend(self.chests.iter().filter(|c| !c.walk_over()).map(Bounded::bounds));
        out.extend(self.plants.iter().filter(|p| !p.walk_over()).map(Bounded::bounds));
        out.extend(self.maze.doors().iter().filter(|d| !d.open).map(|d| d.seal()));
        out
    }

    /// Is grid cell `(row, col)` visible right now?
    pub fn is_cell_lit(&self, row: usize, col: usize) -> bool {
        if !is_inner(row, col) || self.progress.lights_on {
            return true;
        }
        self.flashlight_lit() && self.maze.cell_of(self.player.center()) == Some((row, col))
    }

    /// Is the background point `p` visible? Outside the grid is always lit.
    pub fn is_lit(&self, p: Point) -> bool {
        match self.maze.cell_of(p) {
            Some((r, c)) => self.is_cell_lit(r, c),
            None => true,
        }
    }

    pub fn player_in_dark(&self) -> bool {
        !self.is_lit(self.player.center())
    }

    /// One entry per thing on stage, in paint order (back to front).
    pub fn drawables(&self) -> Vec<Drawable> {
        let mut out = Vec::with_capacity(48);

        for d in self.maze.doors() {
            out.push(Drawable { kind: DrawKind::Door(d.index), rect: d.rect, frame: d.frame(), visible: true });
        }
        out.push(Drawable { kind: DrawKind::LightSwitch, rect: self.light_switch, frame: self.progress.lights_on as usize, visible: true });
        for c in &self.chests {
            out.push(Drawable { kind: DrawKind::Chest, rect: c.rect, frame: c.frame(), visible: self.is_lit(c.rect.center()) });
        }
        for p in &self.plants {
            out.push(Drawable { kind: DrawKind::Plant, rect: p.rect, frame: p.stage as usize, visible: self.is_lit(p.rect.center()) });
        }
        for it in self.items.iter().filter(|it| it.location == Location::Ground) {
            out.push(Drawable { kind: DrawKind::Item(it.kind), rect: it.rect, frame: it.on as usize, visible: self.is_lit(it.rect.center()) });
        }
        for m in self.monsters.iter().filter(|m| m.health > 0) {
            out.push(Drawable { kind: DrawKind::Monster(m.kind), rect: m.rect, frame: m.frame(), visible: self.is_lit(m.rect.center()) });
        }
        out.push(Drawable { kind: DrawKind::Player, rect: self.player.rect, frame: facing_frame(&self.player), visible: true });
        if let Some(it) = self.held_item() {
            out.push(Drawable { kind: DrawKind::Item(it.kind), rect: it.rect, frame: it.on as usize, visible: true });
        }
        out
    }

    /// The maze extent, for camera clamping.
    pub fn extent(&self) -> Rect {
        EXTENT
    }
}

fn facing_frame(p: &Player) -> usize {
    use crate::domain::geom::Dir;
    match p.facing {
        Dir::Down => 0,
        Dir::Right => 1,
        Dir::Left => 2,
        Dir::Up => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::item::ItemKind;
    use crate::domain::maze::cell_rect;

    fn world() -> WorldState {
        let mut cfg = GameConfig::default();
        cfg.quest.seed = Some(1);
        WorldState::new(&cfg)
    }

    #[test]
    fn ring_is_lit_inner_is_dark_by_default() {
        let w = world();
        assert!(w.is_cell_lit(0, 0));
        assert!(w.is_cell_lit(8, 4));
        assert!(!w.is_cell_lit(4, 4));
        assert!(w.is_lit(Point::new(100, 100)));
    }

    #[test]
    fn lit_flashlight_lights_own_cell_only() {
        let mut w = world();
        let mut torch = Item::new(0, ItemKind::FLASHLIGHT, Point::new(0, 0), Location::Ground);
        torch.on = true;
        w.items.push(torch);
        w.inventory.give(&mut w.items, 0).expect("give");
        w.player.rect = Rect::centered_on(cell_rect(2, 3).center(), 70, 100);
        assert!(w.is_cell_lit(2, 3));
        assert!(!w.is_cell_lit(2, 4));
        assert!(!w.player_in_dark());

        w.items[0].on = false;
        assert!(w.player_in_dark());
    }

    #[test]
    fn lights_on_reveals_everything() {
        let mut w = world();
        w.progress.lights_on = true;
        assert!((1..8).all(|r| (1..8).all(|c| w.is_cell_lit(r, c))));
    }

    #[test]
    fn camera_clamps_to_extent() {
        let mut cam = Camera { x: 0, y: 0, view_w: 1000, view_h: 800 };
        cam.center_on(Point::new(100, 100), &EXTENT);
        assert_eq!((cam.x, cam.y), (0, 0));
        cam.center_on(Point::new(7700, 7700), &EXTENT);
        assert_eq!((cam.x, cam.y), (6800, 7000));
        assert_eq!(cam.world_to_view(Point::new(6810, 7010)), Some((10, 10)));
        assert_eq!(cam.world_to_view(Point::new(10, 10)), None);
    }

    #[test]
    fn camera_dead_zone_holds_still() {
        let mut cam = Camera { x: 1000, y: 1000, view_w: 1000, view_h: 1000 };
        cam.follow(Point::new(1500, 1500), &EXTENT);
        assert_eq!((cam.x, cam.y), (1000, 1000));
        cam.follow(Point::new(1900, 1500), &EXTENT);
        assert_eq!(cam.x, 1100);
    }

    #[test]
    fn message_expires() {
        let mut w = world();
        w.set_message("hello", 2);
        w.tick_message();
        assert_eq!(w.message, "hello");
        w.tick_message();
        assert!(w.message.is_empty());
    }

    #[test]
    fn closed_doors_are_blockers() {
        let w = world();
        let blockers = w.blockers(None);
        assert_eq!(blockers.len(), 8);
    }
}
