/// The maze: a 9×9 cell grid plus side rooms, compiled into a point set.
///
/// ## Layout (background units)
///
///   - Cell (row, col) interior: `x = 1245 + 600·col`, `y = 1050 + 600·row`,
///     540 × 540. Walls are 60 thick and sit on the 600-unit pitch.
///   - Six monster rooms (630 × 405) outside the west and east borders.
///   - The final room (405 × 630) below the grid, reached by a short corridor.
///
/// ## Collision
///
/// Every wall segment is rasterised into `WallPointSet`, a set of points on
/// a 5-unit lattice. Collision tests sample a handful of boundary points of
/// the moving box, snap them to the same lattice, and look them up. The
/// sampling density depends on who is moving:
///
/// ```text
///   player   8 points   bbox ± 5    corners + edge midpoints
///   item     8 points   bbox ± 10   corners + edge midpoints
///   monster 16 points   bbox        4 × 4 grid at thirds
/// ```
///
/// `Maze` is the only owner of the point set. Doors punch and seal holes in
/// it through `open_door` / `close_door`.

use std::collections::HashSet;

use super::door::{self, Door, QuotaOutcome};
use super::geom::{Point, Rect};
use super::item::Item;

/// Lattice step shared by wall construction and every probe.
pub const STEP: i32 = 5;
pub const GRID: usize = 9;
pub const CELL_PITCH: i32 = 600;
pub const WALL: i32 = 60;
pub const CORRIDOR: i32 = CELL_PITCH - WALL;
/// Interior origin of cell (0, 0).
pub const GRID_X: i32 = 1245;
pub const GRID_Y: i32 = 1050;
/// Full maze extent; nothing may leave it.
pub const EXTENT: Rect = Rect::new(0, 0, 7800, 7800);

const PLAYER_MARGIN: i32 = 5;
const ITEM_MARGIN: i32 = 10;

const ROOM_W: i32 = 630;
const ROOM_H: i32 = 405;
const SIDE_ROOM_XS: [i32; 2] = [550, 6600];
const FINAL_ROOM: Point = Point::new(3695, 6665);
const CORRIDOR_LEN: i32 = 265;

/// Wall sides per cell, top row first. Shared sides agree between neighbours
/// and the outer border is closed.
const WALL_TABLE: [[&str; GRID]; GRID] = [
    ["NW", "NS",  "NS", "NS",  "N",   "NS", "NS",  "NS", "NE"],
    ["WE", "NW",  "NS", "NES", "W",   "NE", "NWS", "NE", "WE"],
    ["WE", "WS",  "NE", "WN",  "E",   "W",  "NS",  "SE", "WE"],
    ["WE", "WN",  "S",  "SE",  "WE",  "WSE", "WN", "NE", "WE"],
    ["WE", "WE",  "WN", "NS",  "S",   "NS", "SE",  "WE", "WE"],
    ["WE", "WSE", "WE", "WN",  "NES", "WN", "NS",  "SE", "WE"],
    ["WE", "WN",  "SE", "WS",  "NS",  "E",  "WNS", "NE", "WE"],
    ["WE", "WS",  "NS", "NS",  "NE",  "WS", "NS",  "SE", "WE"],
    ["WS", "NS",  "NS", "NS",  "S",   "NS", "NS",  "NS", "SE"],
];

// ── Cell walls ──

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct CellWalls {
    pub n: bool,
    pub e: bool,
    pub s: bool,
    pub w: bool,
}

impl CellWalls {
    fn parse(sides: &str) -> Self {
        CellWalls {
            n: sides.contains('N'),
            e: sides.contains('E'),
            s: sides.contains('S'),
            w: sides.contains('W'),
        }
    }
}

pub fn cell_walls(row: usize, col: usize) -> CellWalls {
    WALL_TABLE
        .get(row)
        .and_then(|r| r.get(col))
        .map(|s| CellWalls::parse(s))
        .unwrap_or_default()
}

/// Interior rectangle of a grid cell.
pub fn cell_rect(row: usize, col: usize) -> Rect {
    Rect::new(
        GRID_X + CELL_PITCH * col as i32,
        GRID_Y + CELL_PITCH * row as i32,
        CORRIDOR,
        CORRIDOR,
    )
}

/// Cells with row and col in 1..=7 form the inner labyrinth; the outer ring
/// is a lit corridor.
pub fn is_inner(row: usize, col: usize) -> bool {
    (1..GRID - 1).contains(&row) && (1..GRID - 1).contains(&col)
}

// ── Wall point set ──

#[inline]
fn snap(v: i32) -> i32 {
    v - v.rem_euclid(STEP)
}

#[inline]
fn snap_up(v: i32) -> i32 {
    let s = snap(v);
    if s == v { s } else { s + STEP }
}

/// Discretised wall geometry.
#[derive(Clone, Debug, Default)]
pub struct WallPointSet {
    points: HashSet<Point>,
}

impl WallPointSet {
    /// Every lattice point in the inclusive box `(xl, yt) ..= (xr, yb)`.
    fn lattice(xl: i32, yt: i32, xr: i32, yb: i32) -> impl Iterator<Item = Point> {
        let (x0, y0) = (snap_up(xl), snap_up(yt));
        (x0..=xr)
            .step_by(STEP as usize)
            .flat_map(move |x| (y0..=yb).step_by(STEP as usize).map(move |y| Point::new(x, y)))
    }

    pub fn add_box(&mut self, xl: i32, yt: i32, xr: i32, yb: i32) {
        self.points.extend(Self::lattice(xl, yt, xr, yb));
    }

    pub fn remove_box(&mut self, xl: i32, yt: i32, xr: i32, yb: i32) {
        for p in Self::lattice(xl, yt, xr, yb) {
            self.points.remove(&p);
        }
    }

    /// Is the lattice point nearest below-left of `p` solid?
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        self.points.contains(&Point::new(snap(p.x), snap(p.y)))
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }
}

// ── Probes ──

/// Corners and edge midpoints of `r` grown by `margin`.
fn ring_probes(r: &Rect, margin: i32) -> [Point; 8] {
    let e = r.expanded(margin);
    let (l, m, rt) = (e.x, e.x + e.w / 2, e.right());
    let (t, c, b) = (e.y, e.y + e.h / 2, e.bottom());
    [
        Point::new(l, t), Point::new(m, t), Point::new(rt, t),
        Point::new(l, c),                   Point::new(rt, c),
        Point::new(l, b), Point::new(m, b), Point::new(rt, b),
    ]
}

/// 4 × 4 grid at thirds of the box.
fn grid_probes(r: &Rect) -> [Point; 16] {
    let xs = [r.x, r.x + r.w / 3, r.x + 2 * r.w / 3, r.right()];
    let ys = [r.y, r.y + r.h / 3, r.y + 2 * r.h / 3, r.bottom()];
    let mut out = [Point::default(); 16];
    for (i, &x) in xs.iter().enumerate() {
        for (j, &y) in ys.iter().enumerate() {
            out[i * 4 + j] = Point::new(x, y);
        }
    }
    out
}

// ── Maze ──

pub struct Maze {
    walls: WallPointSet,
    doors: Vec<Door>,
}

impl Maze {
    /// Rasterise the grid, the side rooms and the corridor, with every door
    /// closed.
    pub fn build() -> Self {
        let mut walls = WallPointSet::default();

        for row in 0..GRID {
            for col in 0..GRID {
                add_cell_walls(&mut walls, row, col, cell_walls(row, col));
            }
        }

        for &x in &SIDE_ROOM_XS {
            for num in 1..=3 {
                let y = 1745 * num - 5 * (num - 1);
                add_room(&mut walls, x, y, ROOM_W, ROOM_H);
            }
        }
        add_room(&mut walls, FINAL_ROOM.x, FINAL_ROOM.y, ROOM_H, ROOM_W);
        add_corridor(&mut walls, FINAL_ROOM, ROOM_H, ROOM_W);

        Maze { walls, doors: door::layout() }
    }

    // ── Collision queries ──

    pub fn collides_player(&self, body: &Rect) -> bool {
        ring_probes(body, PLAYER_MARGIN).iter().any(|p| self.walls.contains(*p))
    }

    pub fn collides_item(&self, item: &Rect) -> bool {
        ring_probes(item, ITEM_MARGIN).iter().any(|p| self.walls.contains(*p))
    }

    pub fn collides_monster(&self, body: &Rect) -> bool {
        grid_probes(body).iter().any(|p| self.walls.contains(*p))
    }

    pub fn is_wall(&self, p: Point) -> bool {
        self.walls.contains(p)
    }

    /// Any solid lattice point inside `r`? Used to paint walls at a coarse scale.
    pub fn any_wall_in(&self, r: &Rect) -> bool {
        let (x0, y0) = (snap(r.x), snap(r.y));
        (x0..r.right())
            .step_by(STEP as usize)
            .any(|x| (y0..r.bottom()).step_by(STEP as usize).any(|y| self.walls.contains(Point::new(x, y))))
    }

    pub fn in_bounds(&self, r: &Rect) -> bool {
        EXTENT.encloses(r)
    }

    /// Grid cell whose 600 × 600 pitch square holds `p`.
    pub fn cell_of(&self, p: Point) -> Option<(usize, usize)> {
        let dx = p.x - (GRID_X - WALL);
        let dy = p.y - (GRID_Y - WALL);
        let span = CELL_PITCH * GRID as i32;
        if dx < 0 || dy < 0 || dx >= span || dy >= span {
            return None;
        }
        Some(((dy / CELL_PITCH) as usize, (dx / CELL_PITCH) as usize))
    }

    pub fn point_count(&self) -> usize {
        self.walls.len()
    }

    // ── Doors ──

    pub fn doors(&self) -> &[Door] {
        &self.doors
    }

    pub fn door(&self, index: u8) -> Option<&Door> {
        self.doors.iter().find(|d| d.index == index)
    }

    pub fn is_door_open(&self, index: u8) -> bool {
        self.door(index).is_some_and(|d| d.open)
    }

    /// Open door `index`, clearing its padded footprint. Returns false for an
    /// unknown index.
    pub fn open_door(&mut self, index: u8) -> bool {
        let Some(d) = self.doors.iter_mut().find(|d| d.index == index) else {
            return false;
        };
        d.open = true;
        let r = d.clearance();
        self.walls.remove_box(r.x, r.y, r.right(), r.bottom());
        true
    }

    /// Close door `index`, re-adding its inset footprint.
    pub fn close_door(&mut self, index: u8) -> bool {
        let Some(d) = self.doors.iter_mut().find(|d| d.index == index) else {
            return false;
        };
        d.open = false;
        let r = d.seal();
        self.walls.add_box(r.x, r.y, r.right(), r.bottom());
        true
    }

    /// Open door `index` if at least `min_count` gems lie on the ground in
    /// its quota window. Callers pass only the gems that should count.
    pub fn try_open_with_items<'a, I>(&mut self, index: u8, items: I, min_count: usize) -> QuotaOutcome
    where
        I: IntoIterator<Item = &'a Item>,
    {
        let Some(d) = self.door(index) else {
            return QuotaOutcome::Short { missing: min_count };
        };
        let count = items
            .into_iter()
            .filter(|it| it.is_gem() && it.is_on_ground())
            .filter(|it| d.in_quota_window(it.rect.origin(), it.rect.w, it.rect.h))
            .count();

        if count >= min_count {
            self.open_door(index);
            QuotaOutcome::Opened
        } else {
            QuotaOutcome::Short { missing: min_count - count }
        }
    }
}

// ── Construction helpers ──

fn add_cell_walls(walls: &mut WallPointSet, row: usize, col: usize, sides: CellWalls) {
    let x0 = GRID_X + CELL_PITCH * col as i32;
    let y0 = GRID_Y + CELL_PITCH * row as i32;
    let (x1, y1) = (x0 + CELL_PITCH, y0 + CELL_PITCH);
    if sides.n {
        walls.add_box(x0 - WALL, y0 - WALL, x1, y0);
    }
    if sides.s {
        walls.add_box(x0 - WALL, y1 - WALL, x1, y1);
    }
    if sides.w {
        walls.add_box(x0 - WALL, y0 - WALL, x0, y1);
    }
    if sides.e {
        walls.add_box(x1 - WALL, y0 - WALL, x1, y1);
    }
}

/// Four walls around a `w × h` room whose outer top-left is `(x, y)`.
fn add_room(walls: &mut WallPointSet, x: i32, y: i32, w: i32, h: i32) {
    walls.add_box(x, y, x + w + WALL, y + WALL);
    walls.add_box(x, y, x + WALL, y + h + WALL);
    walls.add_box(x, y + h, x + w + WALL, y + h + WALL);
    walls.add_box(x + w, y, x + w + WALL, y + h + WALL);
}

/// The two corridor walls running from under the grid down into the final room.
fn add_corridor(walls: &mut WallPointSet, room: Point, w: i32, h: i32) {
    let top = room.y - CORRIDOR_LEN;
    walls.add_box(room.x, top, room.x + WALL, room.y + h + WALL);
    walls.add_box(room.x + w, top, room.x + w + WALL, room.y + h + WALL);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::door::{CORRIDOR_DOOR, FINAL_GATE};
    use crate::domain::item::{ItemKind, Location};

    fn gem_at(id: usize, x: i32, y: i32) -> Item {
        Item::new(id, ItemKind::Gem, Point::new(x, y), Location::Ground)
    }

    /// A player-sized box standing in the doorway of `door`.
    fn doorway_probe(m: &Maze, index: u8) -> Rect {
        let d = m.door(index).map(|d| d.rect).unwrap_or_default();
        Rect::centered_on(d.center(), 40, 40)
    }

    // ── Wall table ──

    #[test]
    fn wall_table_is_symmetric() {
        for r in 0..GRID {
            for c in 0..GRID {
                let here = cell_walls(r, c);
                if c + 1 < GRID {
                    assert_eq!(here.e, cell_walls(r, c + 1).w, "E/W mismatch at ({r},{c})");
                }
                if r + 1 < GRID {
                    assert_eq!(here.s, cell_walls(r + 1, c).n, "S/N mismatch at ({r},{c})");
                }
            }
        }
    }

    #[test]
    fn outer_border_is_closed() {
        for i in 0..GRID {
            assert!(cell_walls(0, i).n);
            assert!(cell_walls(GRID - 1, i).s);
            assert!(cell_walls(i, 0).w);
            assert!(cell_walls(i, GRID - 1).e);
        }
    }

    // ── Collision ──

    #[test]
    fn cell_interior_is_free() {
        let m = Maze::build();
        let body = Rect::centered_on(cell_rect(0, 0).center(), 70, 100);
        assert!(!m.collides_player(&body));
        assert!(!m.collides_monster(&body));
        assert!(!m.collides_item(&body));
    }

    #[test]
    fn player_against_north_border_collides() {
        let m = Maze::build();
        let cell = cell_rect(0, 2);
        // Body flush with the interior top edge: the ±5 margin reaches the wall.
        let body = Rect::new(cell.x + 100, cell.y, 70, 100);
        assert!(m.collides_player(&body));
        assert!(!m.collides_player(&body.translated(0, 10)));
    }

    #[test]
    fn item_margin_is_wider_than_player_margin() {
        let m = Maze::build();
        let cell = cell_rect(0, 2);
        let r = Rect::new(cell.x + 100, cell.y + 12, 40, 40);
        assert!(!m.collides_player(&r));
        assert!(m.collides_item(&r));
    }

    #[test]
    fn unaligned_probe_still_hits_wall() {
        let m = Maze::build();
        // West border of cell (3, 0) spans x 1185..=1245.
        assert!(m.is_wall(Point::new(1187, 2999)));
        assert!(m.is_wall(Point::new(1244, 3001)));
    }

    #[test]
    fn cell_of_maps_pitch_squares() {
        let m = Maze::build();
        assert_eq!(m.cell_of(cell_rect(0, 0).center()), Some((0, 0)));
        assert_eq!(m.cell_of(cell_rect(4, 7).center()), Some((4, 7)));
        assert_eq!(m.cell_of(Point::new(700, 2000)), None);
        assert!(is_inner(4, 4));
        assert!(!is_inner(0, 4));
    }

    #[test]
    fn bounds_reject_escape() {
        let m = Maze::build();
        assert!(m.in_bounds(&Rect::new(0, 0, 70, 100)));
        assert!(!m.in_bounds(&Rect::new(-5, 0, 70, 100)));
        assert!(!m.in_bounds(&Rect::new(7760, 0, 70, 100)));
    }

    // ── Doors ──

    #[test]
    fn closed_doors_block_open_doors_pass() {
        let mut m = Maze::build();
        for index in 1..=8u8 {
            assert!(m.collides_player(&doorway_probe(&m, index)), "door {index} should start closed");
            assert!(m.open_door(index));
            assert!(!m.collides_player(&doorway_probe(&m, index)), "door {index} should be passable");
        }
    }

    #[test]
    fn open_close_open_matches_single_open() {
        let mut once = Maze::build();
        once.open_door(3);

        let mut cycled = Maze::build();
        cycled.open_door(3);
        cycled.close_door(3);
        assert!(cycled.collides_player(&doorway_probe(&cycled, 3)));
        cycled.open_door(3);

        assert_eq!(once.point_count(), cycled.point_count());
        let r = once.door(3).map(|d| d.clearance()).unwrap_or_default();
        for x in (r.x - 30..r.right() + 30).step_by(5) {
            for y in (r.y - 30..r.bottom() + 30).step_by(5) {
                let p = Point::new(x, y);
                assert_eq!(once.is_wall(p), cycled.is_wall(p), "diverged at {p:?}");
            }
        }
    }

    #[test]
    fn opening_twice_is_harmless() {
        let mut m = Maze::build();
        m.open_door(5);
        let n = m.point_count();
        m.open_door(5);
        assert_eq!(m.point_count(), n);
        assert!(m.is_door_open(5));
    }

    #[test]
    fn unknown_door_index_is_rejected() {
        let mut m = Maze::build();
        let n = m.point_count();
        assert!(!m.open_door(0));
        assert!(!m.close_door(9));
        assert_eq!(m.point_count(), n);
    }

    // ── Quota gate ──

    fn in_zone_gem(m: &Maze, index: u8, id: usize) -> Item {
        let d = m.door(index).map(|d| d.rect).unwrap_or_default();
        gem_at(id, d.x + 50 * id as i32, d.y - 100)
    }

    #[test]
    fn quota_opens_at_exactly_min_count() {
        let mut m = Maze::build();
        let gems = [in_zone_gem(&m, 3, 1), in_zone_gem(&m, 3, 2)];
        assert_eq!(m.try_open_with_items(3, &gems, 2), QuotaOutcome::Opened);
        assert!(m.is_door_open(3));
    }

    #[test]
    fn quota_one_short_reports_deficit_one() {
        let mut m = Maze::build();
        let gems = [in_zone_gem(&m, 3, 1), in_zone_gem(&m, 3, 2)];
        let before = m.point_count();
        assert_eq!(m.try_open_with_items(3, &gems, 3), QuotaOutcome::Short { missing: 1 });
        assert!(!m.is_door_open(3));
        assert_eq!(m.point_count(), before);
    }

    #[test]
    fn quota_ignores_gems_out_of_zone_or_in_hand() {
        let mut m = Maze::build();
        let mut held = in_zone_gem(&m, FINAL_GATE, 1);
        held.location = Location::Hands;
        let far = gem_at(2, 100, 100);
        let good = in_zone_gem(&m, FINAL_GATE, 3);
        let gems = [held, far, good];
        assert_eq!(m.try_open_with_items(FINAL_GATE, &gems, 2), QuotaOutcome::Short { missing: 1 });
    }

    #[test]
    fn corridor_door_and_gate_are_distinct() {
        let mut m = Maze::build();
        m.open_door(CORRIDOR_DOOR);
        assert!(m.is_door_open(CORRIDOR_DOOR));
        assert!(!m.is_door_open(FINAL_GATE));
    }
}
