/// Items: weapons, tools, keys, gems and the potion.
///
/// An item lives in exactly one place at a time (`Location`). The inventory
/// state machine is the only code that moves items between Ground, Hands,
/// Backpack and Chest; level progression only brings items on stage from
/// `Offstage` or sends expired gems back there.

use super::geom::{Dir, Point, Rect};

/// How far a held item is pushed along the facing while "use" is held.
pub const EXTEND: i32 = 10;

pub type ItemId = usize;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum WeaponKind {
    Sword,
    BoxingGlove,
    FlameThrower,
    Trident,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ToolKind {
    Shovel,
    Flashlight,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ItemKind {
    Weapon(WeaponKind),
    Tool(ToolKind),
    /// Opens the door with the same index.
    Key(u8),
    Gem,
    Potion,
}

impl ItemKind {
    pub const SHOVEL: ItemKind = ItemKind::Tool(ToolKind::Shovel);
    pub const FLASHLIGHT: ItemKind = ItemKind::Tool(ToolKind::Flashlight);

    /// Name used in messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            ItemKind::Weapon(WeaponKind::Sword) => "sword",
            ItemKind::Weapon(WeaponKind::BoxingGlove) => "boxing glove",
            ItemKind::Weapon(WeaponKind::FlameThrower) => "flame thrower",
            ItemKind::Weapon(WeaponKind::Trident) => "trident",
            ItemKind::Tool(ToolKind::Shovel) => "shovel",
            ItemKind::Tool(ToolKind::Flashlight) => "flashlight",
            ItemKind::Key(_) => "key",
            ItemKind::Gem => "gem",
            ItemKind::Potion => "potion",
        }
    }

    /// Name used as the row key of the damage table, or `None` for items
    /// that can never hurt a monster.
    pub fn stat_key(&self) -> Option<&'static str> {
        match self {
            ItemKind::Weapon(WeaponKind::Sword) => Some("sword"),
            ItemKind::Weapon(WeaponKind::BoxingGlove) => Some("boxing_glove"),
            ItemKind::Weapon(WeaponKind::FlameThrower) => Some("flame_thrower"),
            ItemKind::Weapon(WeaponKind::Trident) => Some("trident"),
            ItemKind::Tool(ToolKind::Shovel) => Some("shovel"),
            _ => None,
        }
    }

    pub fn size(&self) -> (i32, i32) {
        match self {
            ItemKind::Weapon(WeaponKind::Sword) => (60, 60),
            ItemKind::Weapon(WeaponKind::BoxingGlove) => (45, 45),
            ItemKind::Weapon(WeaponKind::FlameThrower) => (70, 50),
            ItemKind::Weapon(WeaponKind::Trident) => (60, 70),
            ItemKind::Tool(ToolKind::Shovel) => (50, 60),
            ItemKind::Tool(ToolKind::Flashlight) => (50, 40),
            ItemKind::Key(_) => (40, 30),
            ItemKind::Gem => (40, 40),
            ItemKind::Potion => (40, 50),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Location {
    /// Not in play: a reward not yet released, or an expired gem.
    Offstage,
    Ground,
    Hands,
    Backpack,
    /// Inside the chest with this index.
    Chest(usize),
}

#[derive(Clone, Debug)]
pub struct Item {
    pub id: ItemId,
    pub kind: ItemKind,
    pub rect: Rect,
    pub location: Location,
    /// How many times the player has picked this item up.
    pub pickups: u32,
    /// Flashlight switch; meaningless for other kinds.
    pub on: bool,
}

/// Behaviour of anything the player can carry in their hands.
pub trait Holdable {
    /// Snap to the wielder's hand for the given facing.
    fn hold_at(&mut self, wielder: &Rect, facing: Dir, extended: bool);
}

impl Item {
    pub fn new(id: ItemId, kind: ItemKind, at: Point, location: Location) -> Self {
        let (w, h) = kind.size();
        Item { id, kind, rect: Rect::new(at.x, at.y, w, h), location, pickups: 0, on: false }
    }

    pub fn is_on_ground(&self) -> bool {
        self.location == Location::Ground
    }

    pub fn is_gem(&self) -> bool {
        self.kind == ItemKind::Gem
    }

    /// Place on the ground centred on `p`.
    pub fn drop_at(&mut self, p: Point) {
        self.rect = Rect::centered_on(p, self.rect.w, self.rect.h);
        self.location = Location::Ground;
    }
}

impl Holdable for Item {
    fn hold_at(&mut self, wielder: &Rect, facing: Dir, extended: bool) {
        self.rect = held_rect(wielder, facing, self.rect.w, self.rect.h, extended);
    }
}

/// Offset of the hand from the wielder's top-left, one per facing.
pub fn hand_offset(facing: Dir) -> (i32, i32) {
    match facing {
        Dir::Down => (-5, 70),
        Dir::Right => (60, 25),
        Dir::Left => (-45, 25),
        Dir::Up => (-5, 0),
    }
}

/// Where an item of size `(w, h)` sits when held by `wielder`.
pub fn held_rect(wielder: &Rect, facing: Dir, w: i32, h: i32, extended: bool) -> Rect {
    let (ox, oy) = hand_offset(facing);
    let (ex, ey) = if extended {
        let (dx, dy) = facing.delta();
        (dx * EXTEND, dy * EXTEND)
    } else {
        (0, 0)
    };
    Rect::new(wielder.x + ox + ex, wielder.y + oy + ey, w, h)
}
