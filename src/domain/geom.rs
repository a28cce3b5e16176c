/// Geometry shared by the maze, entities and items.
///
/// Every position is a background coordinate: absolute units inside the
/// full maze, independent of the camera. Rectangles are stored as their
/// top-left corner plus size.
///
/// ## Contact
///
/// `touching(a, b, leeway)` answers two questions at once:
///   - do the boxes overlap once `a` is grown by `leeway` on every edge?
///   - if so, which edge of `a` is `b` pressed against?
///
/// A positive leeway adds slack (boxes a few units apart still touch);
/// a negative leeway demands that the boxes overlap by that much.

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Rect { x, y, w, h }
    }

    /// Rect of size `(w, h)` centred on `c`.
    pub fn centered_on(c: Point, w: i32, h: i32) -> Self {
        Rect { x: c.x - w / 2, y: c.y - h / 2, w, h }
    }

    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2, self.y + self.h / 2)
    }

    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        Rect { x: self.x + dx, y: self.y + dy, ..*self }
    }

    /// Grow (or shrink, for negative `m`) by `m` on every edge.
    pub fn expanded(&self, m: i32) -> Self {
        Rect { x: self.x - m, y: self.y - m, w: self.w + 2 * m, h: self.h + 2 * m }
    }

    /// Strict interior overlap. Boxes that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Half-open containment: left/top edges inclusive, right/bottom exclusive.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// Is `inner` entirely within `self` (edges inclusive)?
    pub fn encloses(&self, inner: &Rect) -> bool {
        inner.x >= self.x
            && inner.y >= self.y
            && inner.right() <= self.right()
            && inner.bottom() <= self.bottom()
    }
}

/// One of the four axis directions. Used for facing, monster heading and
/// contact sides alike, so they compare directly.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    pub const ALL: [Dir; 4] = [Dir::Left, Dir::Right, Dir::Up, Dir::Down];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Dir::Up => (0, -1),
            Dir::Down => (0, 1),
            Dir::Left => (-1, 0),
            Dir::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Dir {
        match self {
            Dir::Up => Dir::Down,
            Dir::Down => Dir::Up,
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Dir::Left | Dir::Right)
    }
}

/// Result of a contact query. `side` is the edge of the first box that the
/// second box is pressed against, or `None` for deep overlap.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Contact {
    pub touching: bool,
    pub side: Option<Dir>,
}

impl Contact {
    pub const NONE: Contact = Contact { touching: false, side: None };
}

/// Inclusive AABB overlap of `a` grown by `leeway` against `b`, plus the
/// contact side classified within a band of `|leeway|` units.
///
/// Side precedence is Left, Right, Up, Down.
pub fn touching(a: &Rect, b: &Rect, leeway: i32) -> Contact {
    let g = a.expanded(leeway);
    let overlap = g.x <= b.right() && b.x <= g.right() && g.y <= b.bottom() && b.y <= g.bottom();
    if !overlap {
        return Contact::NONE;
    }

    let band = leeway.abs();
    let side = if (a.x - b.right()).abs() <= band {
        Some(Dir::Left)
    } else if (a.right() - b.x).abs() <= band {
        Some(Dir::Right)
    } else if (a.y - b.bottom()).abs() <= band {
        Some(Dir::Up)
    } else if (a.bottom() - b.y).abs() <= band {
        Some(Dir::Down)
    } else {
        None
    };

    Contact { touching: true, side }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Rect ──

    #[test]
    fn edge_sharing_boxes_do_not_overlap() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(10, 0, 10, 10);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&b.translated(-1, 0)));
    }

    #[test]
    fn expanded_grows_every_edge() {
        let r = Rect::new(10, 20, 30, 40).expanded(5);
        assert_eq!(r, Rect::new(5, 15, 40, 50));
        let s = Rect::new(10, 20, 30, 40).expanded(-5);
        assert_eq!(s, Rect::new(15, 25, 20, 30));
    }

    #[test]
    fn centered_on_round_trips_center() {
        let r = Rect::centered_on(Point::new(100, 200), 40, 60);
        assert_eq!(r.center(), Point::new(100, 200));
    }

    #[test]
    fn contains_is_half_open() {
        let r = Rect::new(0, 0, 10, 10);
        assert!(r.contains(Point::new(0, 0)));
        assert!(!r.contains(Point::new(10, 5)));
    }

    // ── Dir ──

    #[test]
    fn opposite_is_involution() {
        for d in Dir::ALL {
            assert_eq!(d.opposite().opposite(), d);
            assert_ne!(d.opposite(), d);
        }
    }

    // ── touching ──

    #[test]
    fn zero_leeway_edge_contact_touches() {
        let m = Rect::new(0, 0, 100, 100);
        let p = Rect::new(100, 20, 50, 50);
        let c = touching(&m, &p, 0);
        assert!(c.touching);
        assert_eq!(c.side, Some(Dir::Right));
    }

    #[test]
    fn positive_leeway_bridges_a_gap() {
        let m = Rect::new(0, 0, 100, 100);
        let p = Rect::new(40, 112, 30, 30);
        assert!(!touching(&m, &p, 0).touching);
        let c = touching(&m, &p, 15);
        assert!(c.touching);
        assert_eq!(c.side, Some(Dir::Down));
    }

    #[test]
    fn negative_leeway_requires_deeper_overlap() {
        let a = Rect::new(0, 0, 100, 100);
        let b = Rect::new(95, 0, 50, 50);
        assert!(touching(&a, &b, 0).touching);
        assert!(!touching(&a, &b, -10).touching);
        assert!(touching(&a, &b.translated(-20, 0), -10).touching);
    }

    #[test]
    fn side_classification_each_edge() {
        let m = Rect::new(100, 100, 100, 100);
        let left = Rect::new(40, 120, 60, 40);
        let up = Rect::new(120, 40, 40, 60);
        let down = Rect::new(120, 205, 40, 40);
        assert_eq!(touching(&m, &left, 15).side, Some(Dir::Left));
        assert_eq!(touching(&m, &up, 15).side, Some(Dir::Up));
        assert_eq!(touching(&m, &down, 15).side, Some(Dir::Down));
    }

    #[test]
    fn deep_overlap_has_no_side() {
        let a = Rect::new(0, 0, 100, 100);
        let b = Rect::new(40, 40, 20, 20);
        let c = touching(&a, &b, 5);
        assert!(c.touching);
        assert_eq!(c.side, None);
    }
}
