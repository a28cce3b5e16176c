/// Level setup and the level-progression state machine.
///
/// ```text
///   TUTORIAL ──confirm──▶ HUNT(0) ──kill──▶ HUNT(1) ──kill──▶ … HUNT(5) ──kill──▶ FINAL
///              door 1 opens        key 1 drops                       key 6 drops
///                                  chest 0 ← sword                   chest 5 ← key 7
///                                  door 2 opens
/// ```
///
/// FINAL has no monster. Key 7 opens the corridor door; the gate behind it
/// opens once enough collected gems lie in front of it. The potion waits in
/// the final room.
///
/// ## Item arena
///
/// Built once per session, in this order: the six rewards (shovel first),
/// keys 1..=7, the gems, the potion. Everything except the shovel, the
/// gems and the potion starts `Offstage` and is released by progression.

use rand::Rng;

use crate::config::GameConfig;
use crate::domain::door::{QuotaOutcome, FINAL_GATE};
use crate::domain::entity::{Chest, Monster, MonsterKind, Plant, Trackable, CHEST_SPOTS, PLANT_SPOTS};
use crate::domain::geom::{touching, Point, Rect};
use crate::domain::item::{Holdable, Item, ItemId, ItemKind, Location, WeaponKind};
use crate::domain::maze::{cell_rect, GRID};
use super::event::GameEvent;
use super::world::{Phase, Stage, WorldState};

/// Weapon reward per hunt level; reward `n + 1` goes into chest `n` when
/// monster `n` falls.
pub const REWARDS: [ItemKind; 6] = [
    ItemKind::SHOVEL,
    ItemKind::Weapon(WeaponKind::Sword),
    ItemKind::FLASHLIGHT,
    ItemKind::Weapon(WeaponKind::BoxingGlove),
    ItemKind::Weapon(WeaponKind::FlameThrower),
    ItemKind::Weapon(WeaponKind::Trident),
];

/// Opens the corridor door; stocked in the last chest.
pub const FINAL_KEY: u8 = 7;
pub const POTION_AT: Point = Point::new(3860, 7150);

// ══════════════════════════════════════════════════════════════
// Setup
// ══════════════════════════════════════════════════════════════

/// A fresh session, in the tutorial stage.
pub fn new_game(config: &GameConfig) -> WorldState {
    let mut world = WorldState::new(config);
    setup(&mut world);
    world
}

/// Place monsters, chests, plants and items; hand the player the shovel.
pub fn setup(world: &mut WorldState) {
    world.monsters = MonsterKind::ORDER.iter().map(|k| Monster::new(*k)).collect();
    world.chests = CHEST_SPOTS.iter().map(|p| Chest::new(*p)).collect();
    world.plants = PLANT_SPOTS.iter().map(|p| Plant::new(*p)).collect();

    let mut items: Vec<Item> = Vec::with_capacity(REWARDS.len() + FINAL_KEY as usize + world.quest.gem_count + 1);
    for kind in REWARDS {
        items.push(Item::new(items.len(), kind, Point::default(), Location::Offstage));
    }
    for k in 1..=FINAL_KEY {
        items.push(Item::new(items.len(), ItemKind::Key(k), Point::default(), Location::Offstage));
    }
    for (r, c) in pick_gem_cells(&mut world.rng, world.quest.gem_count) {
        let mut gem = Item::new(items.len(), ItemKind::Gem, Point::default(), Location::Offstage);
        gem.drop_at(cell_rect(r, c).center());
        items.push(gem);
    }
    items.push(Item::new(items.len(), ItemKind::Potion, POTION_AT, Location::Ground));
    world.items = items;

    if world.inventory.give(&mut world.items, 0).is_ok() {
        world.items[0].hold_at(&world.player.rect, world.player.facing, false);
    }

    world.camera.center_on(world.player.rect.center(), &world.extent());
    world.say("Explore freely. Press Enter to release the first monster.");
}

/// `n` distinct inner cells (row and col in 1..=7).
fn pick_gem_cells<R: Rng + ?Sized>(rng: &mut R, n: usize) -> Vec<(usize, usize)> {
    let n = n.min((GRID - 2) * (GRID - 2));
    let mut cells = Vec::with_capacity(n);
    while cells.len() < n {
        let cell = (rng.random_range(1..GRID - 1), rng.random_range(1..GRID - 1));
        if !cells.contains(&cell) {
            cells.push(cell);
        }
    }
    cells
}

pub fn item_id(world: &WorldState, kind: ItemKind) -> Option<ItemId> {
    world.items.iter().position(|it| it.kind == kind)
}

// ══════════════════════════════════════════════════════════════
// Transitions
// ══════════════════════════════════════════════════════════════

/// TUTORIAL → HUNT(0). No-op in any other stage.
pub fn begin_hunt(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if world.progress.stage != Stage::Tutorial {
        return;
    }
    world.progress.stage = Stage::Hunt(0);
    world.progress.countdown = world.timing.gem_countdown_ticks;
    if world.maze.open_door(1) {
        events.push(GameEvent::DoorOpened { index: 1 });
    }
    events.push(GameEvent::HuntStarted);
    world.say(&format!("The {} is loose. Slay it to earn the first key.", MonsterKind::Lion.title()));
}

/// Monster `level` has fallen: drop its key, stock the chest, release the next.
pub fn on_monster_slain(world: &mut WorldState, level: usize, events: &mut Vec<GameEvent>) {
    let Some(m) = world.monsters.get(level) else {
        return;
    };
    let (kind, center) = (m.kind, m.center());
    events.push(GameEvent::MonsterSlain { kind });

    let key = level as u8 + 1;
    if let Some(id) = item_id(world, ItemKind::Key(key)) {
        if world.items[id].location == Location::Offstage {
            world.items[id].drop_at(center);
            events.push(GameEvent::KeyDropped { key });
        }
    }

    match MonsterKind::ORDER.get(level + 1) {
        Some(next) => {
            stock_chest(world, level, REWARDS[level + 1], events);
            world.progress.stage = Stage::Hunt(level + 1);
            let door = level as u8 + 2;
            if world.maze.open_door(door) {
                events.push(GameEvent::DoorOpened { index: door });
            }
            world.say(&format!(
                "You slew the {}! Key {key} opens its room. The {} is loose.",
                kind.title(),
                next.title()
            ));
        }
        None => {
            stock_chest(world, level, ItemKind::Key(FINAL_KEY), events);
            world.progress.stage = Stage::Final;
            world.say("All six monsters are slain. The potion lies beyond door 7.");
        }
    }
}

/// Put an offstage item into an empty chest.
fn stock_chest(world: &mut WorldState, chest: usize, kind: ItemKind, events: &mut Vec<GameEvent>) {
    let Some(id) = item_id(world, kind) else {
        return;
    };
    let Some(c) = world.chests.get_mut(chest) else {
        return;
    };
    if c.content.is_some() || world.items[id].location != Location::Offstage {
        return;
    }
    c.content = Some(id);
    let item = &mut world.items[id];
    item.location = Location::Chest(chest);
    item.rect = Rect::centered_on(c.rect.center(), item.rect.w, item.rect.h);
    events.push(GameEvent::ChestStocked { chest, item: id });
}

/// Shut the active monster's door behind it once it and the player are
/// both out in the labyrinth and nobody stands in the doorway. Happens
/// once per monster.
pub fn lock_in(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let Some(n) = world.active_monster() else {
        return;
    };
    let m = &world.monsters[n];
    if m.loose || world.maze.cell_of(m.center()).is_none() || world.maze.cell_of(world.player.center()).is_none() {
        return;
    }
    let index = m.kind.door();
    let Some(door) = world.maze.door(index) else {
        return;
    };
    let r = door.rect;
    if touching(&m.rect, &r, 0).touching || touching(&world.player.rect, &r, 0).touching {
        return;
    }
    world.monsters[n].loose = true;
    if world.maze.close_door(index) {
        events.push(GameEvent::DoorClosed { index });
    }
}

/// Every tick in FINAL: try the gem quota on the final gate.
pub fn check_final_gate(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if world.progress.stage != Stage::Final || world.maze.is_door_open(FINAL_GATE) {
        return;
    }
    let counted = world.items.iter().filter(|it| it.is_gem() && it.pickups > 0);
    match world.maze.try_open_with_items(FINAL_GATE, counted, world.quest.gem_quota) {
        QuotaOutcome::Opened => {
            events.push(GameEvent::DoorOpened { index: FINAL_GATE });
            world.say("The gems glow and the gate swings open.");
        }
        QuotaOutcome::Short { missing } => {
            let waiting = world
                .maze
                .door(FINAL_GATE)
                .is_some_and(|d| d.approach().overlaps(&world.player.rect));
            if waiting {
                events.push(GameEvent::QuotaShort { missing });
                world.say(&format!("You need {missing} more gems to open the door"));
            }
        }
    }
}

/// Gem countdown. Runs from the start of the hunt until it expires.
pub fn tick_countdown(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if world.progress.gems_expired || world.progress.stage == Stage::Tutorial {
        return;
    }
    world.progress.countdown = world.progress.countdown.saturating_sub(1);
    if world.progress.countdown == 0 {
        expire_gems(world, events);
    }
}

/// Send every never-collected gem offstage for good.
pub fn expire_gems(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let mut removed = 0;
    for it in world.items.iter_mut().filter(|it| it.is_gem() && it.pickups == 0) {
        it.location = Location::Offstage;
        removed += 1;
    }
    world.progress.gems_expired = true;
    events.push(GameEvent::GemsExpired { removed });
    if removed > 0 {
        world.say("Time is up. The gems you never touched have vanished.");
    }
}

/// The potion was taken: immortality, then the ascent.
pub fn claim_potion(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if world.progress.complete {
        return;
    }
    world.progress.complete = true;
    world.player.immortal = true;
    world.phase = Phase::Ascending;
    world.ascend_timer = world.timing.ascend_ticks;
    events.push(GameEvent::Ascended);
    world.say("You drink the potion and rise toward Olympus!");
}

pub fn tick_ascend(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if world.phase != Phase::Ascending {
        return;
    }
    world.ascend_timer = world.ascend_timer.saturating_sub(1);
    if world.ascend_timer == 0 {
        world.phase = Phase::Won;
        events.push(GameEvent::Won);
    }
}

pub fn check_defeat(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if world.phase == Phase::Playing && world.player.health <= 0 {
        world.phase = Phase::Lost;
        events.push(GameEvent::PlayerDied);
        world.say("You have fallen. Press Enter to try again.");
    }
}
