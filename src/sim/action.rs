/// Per-tick input snapshot in logical actions.
///
/// Keyboard, mouse and gamepad all write into the same snapshot; the
/// simulation never sees a key code. Held flags describe the state at the
/// tick; edge flags are true only for the tick after a fresh press.

use crate::domain::geom::{Dir, Point};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ActionSnapshot {
    // ── Held ──
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub use_item: bool,
    pub cycle: bool,
    pub toggle_chest: bool,
    pub toggle_light: bool,

    // ── Edges ──
    pub pick_up: bool,
    pub drop: bool,
    pub stow: bool,
    pub toggle_menu: bool,
    pub confirm: bool,
    pub quit: bool,
    /// Backpack slot chosen in the menu (0-based).
    pub select: Option<usize>,
    /// Pointer click, in background coordinates.
    pub click: Option<Point>,
}

impl ActionSnapshot {
    /// One direction per tick; vertical wins over horizontal.
    pub fn movement(&self) -> Option<Dir> {
        if self.up {
            Some(Dir::Up)
        } else if self.down {
            Some(Dir::Down)
        } else if self.left {
            Some(Dir::Left)
        } else if self.right {
            Some(Dir::Right)
        } else {
            None
        }
    }

    /// OR in another source's flags. Edges and clicks collected between
    /// ticks are kept until the next tick consumes them.
    pub fn merge(&mut self, other: &ActionSnapshot) {
        self.up |= other.up;
        self.down |= other.down;
        self.left |= other.left;
        self.right |= other.right;
        self.use_item |= other.use_item;
        self.cycle |= other.cycle;
        self.toggle_chest |= other.toggle_chest;
        self.toggle_light |= other.toggle_light;
        self.pick_up |= other.pick_up;
        self.drop |= other.drop;
        self.stow |= other.stow;
        self.toggle_menu |= other.toggle_menu;
        self.confirm |= other.confirm;
        self.quit |= other.quit;
        self.select = self.select.or(other.select);
        self.click = self.click.or(other.click);
    }

    /// Clear the edge flags after a tick has consumed them.
    pub fn clear_edges(&mut self) {
        *self = ActionSnapshot {
            up: self.up,
            down: self.down,
            left: self.left,
            right: self.right,
            use_item: self.use_item,
            cycle: self.cycle,
            toggle_chest: self.toggle_chest,
            toggle_light: self.toggle_light,
            ..ActionSnapshot::default()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertical_movement_has_priority() {
        let a = ActionSnapshot { up: true, left: true, ..Default::default() };
        assert_eq!(a.movement(), Some(Dir::Up));
        let b = ActionSnapshot { right: true, ..Default::default() };
        assert_eq!(b.movement(), Some(Dir::Right));
        assert_eq!(ActionSnapshot::default().movement(), None);
    }

    #[test]
    fn merge_keeps_first_selection_and_ors_edges() {
        let mut a = ActionSnapshot { select: Some(1), ..Default::default() };
        let b = ActionSnapshot { select: Some(3), drop: true, click: Some(Point::new(4, 5)), ..Default::default() };
        a.merge(&b);
        assert_eq!(a.select, Some(1));
        assert!(a.drop);
        assert_eq!(a.click, Some(Point::new(4, 5)));
    }

    #[test]
    fn clear_edges_keeps_held_flags() {
        let mut a = ActionSnapshot { use_item: true, pick_up: true, select: Some(0), ..Default::default() };
        a.clear_edges();
        assert!(a.use_item);
        assert!(!a.pick_up);
        assert_eq!(a.select, None);
    }
}
