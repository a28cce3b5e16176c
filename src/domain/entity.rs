/// Entities: Player, Monster, Chest, Plant.
///
/// No inheritance chain. Each variant is a plain struct; shared behaviour is
/// expressed as small capability traits implemented per variant:
///
/// | Trait        | Player | Monster | Chest | Plant |
/// |--------------|--------|---------|-------|-------|
/// | `Bounded`    |   ✓    |    ✓    |   ✓   |   ✓   |
/// | `Trackable`  |   ✓    |    ✓    |       |       |
/// | `Damageable` |   ✓    |    ✓    |       |       |
/// | `Attacker`   |        |    ✓    |       |       |
///
/// Items implement `Holdable` (see `item.rs`).

use super::geom::{Dir, Point, Rect};

pub const MAX_HEALTH: i32 = 100;
pub const PLAYER_W: i32 = 70;
pub const PLAYER_H: i32 = 100;
/// Player body centre at the start of a session (top-left ring cell).
pub const PLAYER_SPAWN: Point = Point::new(1555, 1290);

// ── Capabilities ──

pub trait Bounded {
    fn bounds(&self) -> Rect;

    /// Can other entities move through this one?
    fn walk_over(&self) -> bool {
        false
    }
}

/// Something the AI can follow.
pub trait Trackable: Bounded {
    fn center(&self) -> Point {
        self.bounds().center()
    }
}

pub trait Damageable {
    fn health(&self) -> i32;
    fn set_health(&mut self, hp: i32);

    fn take_damage(&mut self, pts: i32) {
        let hp = (self.health() - pts).max(0);
        self.set_health(hp);
    }

    fn heal(&mut self, pts: i32) {
        let hp = (self.health() + pts).min(MAX_HEALTH);
        self.set_health(hp);
    }

    fn is_dead(&self) -> bool {
        self.health() <= 0
    }
}

pub trait Attacker {
    fn attack_points(&self) -> i32;
}

// ── Player ──

#[derive(Clone, Debug)]
pub struct Player {
    pub rect: Rect,
    pub facing: Dir,
    pub health: i32,
    /// Set by the potion. Irreversible; damage no longer applies.
    pub immortal: bool,
}

impl Player {
    pub fn new(center: Point) -> Self {
        Player {
            rect: Rect::centered_on(center, PLAYER_W, PLAYER_H),
            facing: Dir::Down,
            health: MAX_HEALTH,
            immortal: false,
        }
    }

    pub fn spawn() -> Self {
        Player::new(PLAYER_SPAWN)
    }
}

impl Bounded for Player {
    fn bounds(&self) -> Rect {
        self.rect
    }
}

impl Trackable for Player {}

impl Damageable for Player {
    fn health(&self) -> i32 {
        self.health
    }

    fn set_health(&mut self, hp: i32) {
        self.health = hp;
    }

    fn take_damage(&mut self, pts: i32) {
        if !self.immortal {
            self.health = (self.health - pts).max(0);
        }
    }
}

// ── Monster ──

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum MonsterKind {
    Lion,
    Cerberus,
    Hydra,
    Cattle,
    GoldenDeer,
    Boar,
}

impl MonsterKind {
    /// Hunt order. Monster `i` lives behind door `i + 1`.
    pub const ORDER: [MonsterKind; 6] = [
        MonsterKind::Lion,
        MonsterKind::Cerberus,
        MonsterKind::Hydra,
        MonsterKind::Cattle,
        MonsterKind::GoldenDeer,
        MonsterKind::Boar,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            MonsterKind::Lion => "lion",
            MonsterKind::Cerberus => "cerberus",
            MonsterKind::Hydra => "hydra",
            MonsterKind::Cattle => "cattle",
            MonsterKind::GoldenDeer => "golden_deer",
            MonsterKind::Boar => "boar",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            MonsterKind::Lion => "Nemean Lion",
            MonsterKind::Cerberus => "Cerberus",
            MonsterKind::Hydra => "Hydra",
            MonsterKind::Cattle => "Cattle of Geryon",
            MonsterKind::GoldenDeer => "Golden Deer",
            MonsterKind::Boar => "Erymanthian Boar",
        }
    }

    pub fn attack_points(&self) -> i32 {
        match self {
            MonsterKind::Lion => 5,
            MonsterKind::Cerberus => 6,
            MonsterKind::Hydra => 7,
            MonsterKind::Cattle => 9,
            MonsterKind::GoldenDeer => 8,
            MonsterKind::Boar => 10,
        }
    }

    pub fn size(&self) -> (i32, i32) {
        match self {
            MonsterKind::Lion => (150, 120),
            MonsterKind::Cerberus => (180, 150),
            MonsterKind::Hydra => (180, 180),
            MonsterKind::Cattle => (165, 150),
            MonsterKind::GoldenDeer => (150, 180),
            MonsterKind::Boar => (180, 120),
        }
    }

    /// Top-left inside its room. West rooms hold the first three.
    pub fn spawn(&self) -> Point {
        let i = Self::ORDER.iter().position(|k| k == self).unwrap_or(0) as i32;
        let x = if i < 3 { 900 } else { 6700 };
        let room_y = 1745 * (i % 3 + 1) - 5 * (i % 3);
        Point::new(x, room_y + 120)
    }

    pub fn door(&self) -> u8 {
        Self::ORDER.iter().position(|k| k == self).map_or(0, |i| i as u8 + 1)
    }
}

/// What the monster did on its last tick.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MonsterState {
    Idle,
    Moving,
    Attacking,
}

#[derive(Clone, Debug)]
pub struct Monster {
    pub kind: MonsterKind,
    pub rect: Rect,
    pub health: i32,
    /// Direction of the last attempted step.
    pub heading: Option<Dir>,
    /// Edge of the monster that last touched something.
    pub last_contact: Option<Dir>,
    /// Ticks spent pressed against the player since the last strike.
    pub cooldown: u32,
    pub lunging: bool,
    pub state: MonsterState,
    /// Has left its room; the room door has been shut behind it.
    pub loose: bool,
}

impl Monster {
    pub fn new(kind: MonsterKind) -> Self {
        let (w, h) = kind.size();
        let at = kind.spawn();
        Monster {
            kind,
            rect: Rect::new(at.x, at.y, w, h),
            health: MAX_HEALTH,
            heading: None,
            last_contact: None,
            cooldown: 0,
            lunging: false,
            state: MonsterState::Idle,
            loose: false,
        }
    }

    /// Sprite frame: facing index, plus 4 while lunging.
    pub fn frame(&self) -> usize {
        let base = match self.heading.unwrap_or(Dir::Down) {
            Dir::Down => 0,
            Dir::Right => 1,
            Dir::Left => 2,
            Dir::Up => 3,
        };
        if self.lunging { base + 4 } else { base }
    }
}

impl Bounded for Monster {
    fn bounds(&self) -> Rect {
        self.rect
    }
}

impl Trackable for Monster {}

impl Damageable for Monster {
    fn health(&self) -> i32 {
        self.health
    }

    fn set_health(&mut self, hp: i32) {
        self.health = hp;
    }
}

impl Attacker for Monster {
    fn attack_points(&self) -> i32 {
        self.kind.attack_points()
    }
}

// ── Chest ──

pub const CHEST_W: i32 = 100;
pub const CHEST_H: i32 = 80;
pub const CHEST_SPOTS: [Point; 6] = [
    Point::new(660, 1890),
    Point::new(660, 3600),
    Point::new(660, 5350),
    Point::new(6950, 1890),
    Point::new(6950, 3600),
    Point::new(6950, 5350),
];

#[derive(Clone, Debug)]
pub struct Chest {
    pub rect: Rect,
    pub open: bool,
    pub content: Option<usize>,
}

impl Chest {
    pub fn new(at: Point) -> Self {
        Chest { rect: Rect::new(at.x, at.y, CHEST_W, CHEST_H), open: false, content: None }
    }

    pub fn frame(&self) -> usize {
        self.open as usize
    }
}

impl Bounded for Chest {
    fn bounds(&self) -> Rect {
        self.rect
    }
}

// ── Plant ──

pub const PLANT_SIZE: i32 = 80;
pub const PLANT_HEAL: i32 = 20;
/// Stage at which digging eats the plant instead of growing it.
pub const PLANT_RIPE: u8 = 3;
pub const PLANT_SPOTS: [Point; 6] = [
    Point::new(1980, 1170),
    Point::new(2730, 2365),
    Point::new(4975, 3055),
    Point::new(5535, 5985),
    Point::new(2000, 4000),
    Point::new(3000, 1800),
];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DigResult {
    Grew(u8),
    Ripe,
}

#[derive(Clone, Debug)]
pub struct Plant {
    pub rect: Rect,
    pub stage: u8,
}

impl Plant {
    pub fn new(at: Point) -> Self {
        Plant { rect: Rect::new(at.x, at.y, PLANT_SIZE, PLANT_SIZE), stage: 0 }
    }

    /// One shovel stroke. A ripe plant is ready to eat; the caller removes it.
    pub fn dig(&mut self) -> DigResult {
        if self.stage >= PLANT_RIPE {
            DigResult::Ripe
        } else {
            self.stage += 1;
            DigResult::Grew(self.stage)
        }
    }
}

impl Bounded for Plant {
    fn bounds(&self) -> Rect {
        self.rect
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heal_is_capped() {
        let mut p = Player::spawn();
        p.take_damage(30);
        p.heal(50);
        assert_eq!(p.health, MAX_HEALTH);
    }

    #[test]
    fn damage_floors_at_zero() {
        let mut m = Monster::new(MonsterKind::Hydra);
        m.take_damage(250);
        assert_eq!(m.health, 0);
        assert!(m.is_dead());
    }

    #[test]
    fn immortal_player_ignores_damage() {
        let mut p = Player::spawn();
        p.immortal = true;
        p.take_damage(99);
        assert_eq!(p.health, MAX_HEALTH);
    }

    #[test]
    fn monsters_spawn_inside_their_rooms() {
        for (i, kind) in MonsterKind::ORDER.iter().enumerate() {
            let m = Monster::new(*kind);
            assert_eq!(kind.door() as usize, i + 1);
            let room_x = if i < 3 { 610 } else { 6660 };
            let room_y = 1745 * (i as i32 % 3 + 1) - 5 * (i as i32 % 3) + 60;
            let room = Rect::new(room_x, room_y, 570, 345);
            assert!(room.encloses(&m.rect), "{kind:?} spawns outside its room");
        }
    }

    #[test]
    fn monsters_do_not_overlap_chests() {
        for (kind, spot) in MonsterKind::ORDER.iter().zip(CHEST_SPOTS) {
            let m = Monster::new(*kind);
            assert!(!m.rect.overlaps(&Chest::new(spot).rect));
        }
    }

    #[test]
    fn plant_ripens_after_three_strokes() {
        let mut p = Plant::new(Point::new(0, 0));
        assert_eq!(p.dig(), DigResult::Grew(1));
        assert_eq!(p.dig(), DigResult::Grew(2));
        assert_eq!(p.dig(), DigResult::Grew(3));
        assert_eq!(p.dig(), DigResult::Ripe);
    }

    #[test]
    fn lunge_frame_is_offset() {
        let mut m = Monster::new(MonsterKind::Lion);
        m.heading = Some(Dir::Left);
        assert_eq!(m.frame(), 2);
        m.lunging = true;
        assert_eq!(m.frame(), 6);
    }
}
