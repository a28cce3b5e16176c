/// Doors: open/closed state, footprint, and the gem-quota window.
///
/// A door never touches the wall point set itself. `Maze::open_door` and
/// `Maze::close_door` read the footprints defined here and mutate the set:
///
///   - open  removes every lattice point in `clearance()` (footprint + 15)
///   - close re-adds every lattice point in `seal()`      (footprint − 15)
///
/// The larger remove region means repeated open/close cycles never leave
/// stray wall points behind inside the doorway.

use super::geom::{Point, Rect};

/// Padding applied around a door footprint on open, and inset on close.
pub const DOOR_PADDING: i32 = 15;

/// How far in front of a quota gate (upward, into the corridor) items count.
pub const QUOTA_REACH: i32 = 310;

const SIDE_DOOR_W: i32 = 170;
const SIDE_DOOR_H: i32 = 330;
const CORRIDOR_DOOR_W: i32 = 344;
const CORRIDOR_DOOR_H: i32 = 80;

/// Door 7 leads from the labyrinth into the final corridor.
pub const CORRIDOR_DOOR: u8 = 7;
/// Door 8 seals the final room and opens only on the gem quota.
pub const FINAL_GATE: u8 = 8;

#[derive(Clone, Debug)]
pub struct Door {
    /// 1..=8. Doors 1..=6 guard the monster rooms in monster order.
    pub index: u8,
    pub rect: Rect,
    pub open: bool,
}

/// Outcome of a quota-gate attempt.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum QuotaOutcome {
    Opened,
    /// Not enough qualifying items; the door is unchanged.
    Short { missing: usize },
}

impl Door {
    pub fn new(index: u8, rect: Rect) -> Self {
        Door { index, rect, open: false }
    }

    /// Visual frame: 0 closed, 1 open.
    pub fn frame(&self) -> usize {
        self.open as usize
    }

    pub fn clearance(&self) -> Rect {
        self.rect.expanded(DOOR_PADDING)
    }

    pub fn seal(&self) -> Rect {
        self.rect.expanded(-DOOR_PADDING)
    }

    /// Does an item whose top-left is `at` and size `(w, h)` sit inside the
    /// window in front of this door? Bounds are exclusive.
    pub fn in_quota_window(&self, at: Point, w: i32, h: i32) -> bool {
        at.x > self.rect.x - w
            && at.x < self.rect.right() + w
            && at.y > self.rect.y - QUOTA_REACH
            && at.y < self.rect.y + h
    }

    /// The full region in front of the door, for "are you standing here" checks.
    pub fn approach(&self) -> Rect {
        Rect::new(self.rect.x, self.rect.y - QUOTA_REACH, self.rect.w, QUOTA_REACH)
    }
}

/// The eight doors of the maze, all closed.
///
/// West rooms get doors 1..=3, east rooms 4..=6, then the corridor door and
/// the final gate.
pub fn layout() -> Vec<Door> {
    let mut doors = Vec::with_capacity(8);
    for (i, x) in [(0, 1093), (3, 6584)] {
        for k in 0..3 {
            let index = (i + k + 1) as u8;
            let rect = Rect::new(x, 1824 + 1740 * k, SIDE_DOOR_W, SIDE_DOOR_H);
            doors.push(Door::new(index, rect));
        }
    }
    doors.push(Door::new(
        CORRIDOR_DOOR,
        Rect::new(3756, 6392, CORRIDOR_DOOR_W, CORRIDOR_DOOR_H),
    ));
    doors.push(Door::new(
        FINAL_GATE,
        Rect::new(3756, 6664, CORRIDOR_DOOR_W, CORRIDOR_DOOR_H),
    ));
    doors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_has_eight_closed_doors_in_index_order() {
        let doors = layout();
        assert_eq!(doors.len(), 8);
        for (i, d) in doors.iter().enumerate() {
            assert_eq!(d.index as usize, i + 1);
            assert!(!d.open);
            assert_eq!(d.frame(), 0);
        }
    }

    #[test]
    fn seal_is_strictly_inside_clearance() {
        for d in layout() {
            assert!(d.clearance().encloses(&d.seal()));
            assert!(d.seal().w > 0 && d.seal().h > 0);
        }
    }

    #[test]
    fn quota_window_bounds_are_exclusive() {
        let d = Door::new(8, Rect::new(1000, 1000, 300, 80));
        assert!(d.in_quota_window(Point::new(1100, 900), 40, 40));
        assert!(!d.in_quota_window(Point::new(960, 900), 40, 40));
        assert!(d.in_quota_window(Point::new(965, 900), 40, 40));
        assert!(!d.in_quota_window(Point::new(1100, 690), 40, 40));
        assert!(!d.in_quota_window(Point::new(1100, 1040), 40, 40));
    }
}
