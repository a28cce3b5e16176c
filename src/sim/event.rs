/// Events emitted during a simulation step.
/// The presentation layer consumes these for feedback (hit flashes, HUD).

use crate::domain::entity::MonsterKind;
use crate::domain::item::{ItemId, ItemKind};

#[derive(Clone, Debug, PartialEq)]
#[allow(dead_code)]
pub enum GameEvent {
    HuntStarted,
    ItemPickedUp { id: ItemId, kind: ItemKind },
    ItemDropped { id: ItemId },
    /// First pickup of this gem.
    GemCollected { id: ItemId, total: usize },
    GemsExpired { removed: usize },
    ChestToggled { chest: usize, open: bool },
    DoorOpened { index: u8 },
    DoorClosed { index: u8 },
    PlantGrew { stage: u8 },
    PlantEaten { healed: i32 },
    MonsterHit { kind: MonsterKind, damage: i32, health: i32 },
    MonsterSlain { kind: MonsterKind },
    KeyDropped { key: u8 },
    ChestStocked { chest: usize, item: ItemId },
    PlayerHit { by: MonsterKind, damage: i32, health: i32 },
    LightsToggled { on: bool },
    FlashlightToggled { on: bool },
    QuotaShort { missing: usize },
    Ascended,
    Won,
    PlayerDied,
}
