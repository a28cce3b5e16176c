/// The step function: advances the world by one tick.
///
/// Processing order:
///   1. Phase gate (menu, ascent, tutorial confirm)
///   2. Inventory transitions (pick up, drop, stow, cycle)
///   3. Player movement (body + held-item probes against walls and blockers)
///   4. Item interactions (damage, dig, keys, light switch, flashlight, chests)
///   5. Monster AI + attack, door lock-in
///   6. Message timer and the darkness hint
///   7. Level progression (kill, final gate, gem countdown, defeat)
///
/// While the menu is open only menu input runs. Won and Lost are terminal;
/// the session loop decides what happens next.

use crate::domain::ai::{self, Surroundings};
use crate::domain::door::FINAL_GATE;
use crate::domain::entity::{Damageable, DigResult, PLANT_HEAL};
use crate::domain::error::ActionError;
use crate::domain::geom::touching;
use crate::domain::inventory::reachable_chest;
use crate::domain::item::{Holdable, ItemKind, EXTEND};
use crate::domain::rules;
use super::action::ActionSnapshot;
use super::event::GameEvent;
use super::level;
use super::world::{Phase, Stage, WorldState};

/// Leeway for reaching into an open chest.
const CHEST_REACH: i32 = 10;
/// Leeway for opening and closing a chest.
const CHEST_TOGGLE_REACH: i32 = 20;

pub const DARK_HINT: &str = "Find and turn on the flashlight to see in the labyrinth.";

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState, input: &ActionSnapshot) -> Vec<GameEvent> {
    let mut events: Vec<GameEvent> = Vec::new();

    match world.phase {
        Phase::Won | Phase::Lost => return events,
        Phase::Ascending => {
            world.tick += 1;
            world.tick_message();
            level::tick_ascend(world, &mut events);
            return events;
        }
        Phase::Menu => {
            resolve_menu(world, input);
            return events;
        }
        Phase::Playing => {}
    }

    world.tick += 1;

    if input.toggle_menu {
        world.phase = Phase::Menu;
        return events;
    }
    if input.confirm && world.progress.stage == Stage::Tutorial {
        level::begin_hunt(world, &mut events);
    }

    resolve_inventory(world, input, &mut events);
    if world.phase != Phase::Playing {
        return events; // potion taken
    }
    resolve_player_movement(world, input);
    let striking = resolve_item_use(world, input, &mut events);
    resolve_monster(world, striking, &mut events);
    resolve_messages(world);
    resolve_progression(world, &mut events);

    events
}

// ══════════════════════════════════════════════════════════════
// Menu
// ══════════════════════════════════════════════════════════════

fn resolve_menu(world: &mut WorldState, input: &ActionSnapshot) {
    if let Some(slot) = input.select {
        match world.inventory.equip(&mut world.items, slot) {
            Ok(_) => {
                rehold(world);
                world.phase = Phase::Playing;
            }
            Err(e) => world.say(&e.to_string()),
        }
        return;
    }
    if input.toggle_menu || input.quit {
        world.phase = Phase::Playing;
    }
}

// ══════════════════════════════════════════════════════════════
// Inventory
// ══════════════════════════════════════════════════════════════

fn resolve_inventory(world: &mut WorldState, input: &ActionSnapshot, events: &mut Vec<GameEvent>) {
    if input.pick_up {
        match pick_up(world) {
            Ok(id) => after_pickup(world, id, events),
            Err(e) => world.say(&e.to_string()),
        }
    }

    if input.drop {
        let at = world.player.rect.center();
        match world.inventory.drop(&mut world.items, at) {
            Ok(id) => events.push(GameEvent::ItemDropped { id }),
            Err(e) => world.say(&e.to_string()),
        }
    }

    if input.stow {
        if let Err(e) = world.inventory.stow(&mut world.items) {
            world.say(&e.to_string());
        }
    }

    if world.cadence.cycle.tick(input.cycle) {
        match world.inventory.cycle(&mut world.items) {
            Ok(_) => rehold(world),
            Err(e) => world.say(&e.to_string()),
        }
    }
}

/// An open, stocked chest within reach wins over the ground.
fn pick_up(world: &mut WorldState) -> Result<usize, ActionError> {
    let reach = world.player.rect;
    let chest = reachable_chest(&world.chests, &reach, CHEST_REACH)
        .filter(|&c| world.chests[c].content.is_some());
    match chest {
        Some(c) => world.inventory.take_from_chest(&mut world.items, &mut world.chests[c]),
        None => world.inventory.pick_up(&mut world.items, &reach),
    }
}

fn after_pickup(world: &mut WorldState, id: usize, events: &mut Vec<GameEvent>) {
    rehold(world);
    let (kind, pickups) = (world.items[id].kind, world.items[id].pickups);
    events.push(GameEvent::ItemPickedUp { id, kind });
    match kind {
        ItemKind::Gem if pickups == 1 => {
            let total = world.gems_collected();
            events.push(GameEvent::GemCollected { id, total });
            world.say(&format!("You found a gem! ({total} collected)"));
        }
        ItemKind::Potion => level::claim_potion(world, events),
        _ => {}
    }
}

/// Snap the held item to the hand for the current facing and pose.
fn rehold(world: &mut WorldState) {
    if let Some(id) = world.inventory.held() {
        world.items[id].hold_at(&world.player.rect, world.player.facing, world.extended);
    }
}

// ══════════════════════════════════════════════════════════════
// Player movement
// ══════════════════════════════════════════════════════════════

fn resolve_player_movement(world: &mut WorldState, input: &ActionSnapshot) {
    world.extended = input.use_item;
    if let Some(dir) = input.movement() {
        let blockers = world.blockers(None);
        let held_id = world.inventory.held();
        let held_size = held_id.map(|id| (world.items[id].rect.w, world.items[id].rect.h));
        let held = held_id.and_then(|id| world.items.get_mut(id));
        // A refused step only turns the player.
        let _ = rules::move_player(
            &world.maze,
            &mut world.player,
            held,
            held_size,
            &blockers,
            dir,
            world.extended,
        );
    }
    rehold(world);
}

// ══════════════════════════════════════════════════════════════
// Item interactions
// ══════════════════════════════════════════════════════════════

/// What "use" is pointed at this tick, in priority order.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Target {
    Monster(usize),
    Plant(usize),
    Door(u8),
    Switch,
}

fn use_target(world: &WorldState) -> Option<Target> {
    let Some(held) = world.held_item() else {
        return touching(&world.player.rect, &world.light_switch, 0)
            .touching
            .then_some(Target::Switch);
    };
    let reach = held.rect;

    if let Some(n) = world.active_monster() {
        if touching(&reach, &world.monsters[n].rect, 0).touching {
            return Some(Target::Monster(n));
        }
    }
    if let Some(i) = world.plants.iter().position(|p| touching(&reach, &p.rect, 0).touching) {
        return Some(Target::Plant(i));
    }
    if let Some(d) = world
        .maze
        .doors()
        .iter()
        .find(|d| !d.open && d.index != FINAL_GATE && touching(&reach, &d.rect, EXTEND).touching)
    {
        return Some(Target::Door(d.index));
    }
    let on_switch = touching(&reach, &world.light_switch, 0).touching
        || touching(&world.player.rect, &world.light_switch, 0).touching;
    on_switch.then_some(Target::Switch)
}

/// Returns true while the player is striking the active monster with a
/// damaging item.
fn resolve_item_use(world: &mut WorldState, input: &ActionSnapshot, events: &mut Vec<GameEvent>) -> bool {
    let target = if input.use_item { use_target(world) } else { None };
    let held_kind = world.held_item().map(|it| it.kind);

    let damage = match (target, held_kind) {
        (Some(Target::Monster(n)), Some(kind)) => world.stats.damage(kind, world.monsters[n].kind),
        _ => None,
    };
    let striking = damage.is_some();
    let digging = matches!(target, Some(Target::Plant(_))) && held_kind == Some(ItemKind::SHOVEL);
    let pressing = target.is_some() && !striking && !digging;

    let fire_damage = world.cadence.damage.tick(striking);
    let fire_dig = world.cadence.dig.tick(digging);
    // Once per press of use, not whenever a target comes into reach.
    let fire_press = world.cadence.press.tick(input.use_item) && pressing;

    match target {
        Some(Target::Monster(n)) => {
            if let Some(pts) = damage.filter(|_| fire_damage) {
                strike(world, n, pts, events);
            } else if fire_press {
                if let Some(kind) = held_kind {
                    world.say(&ActionError::CannotKillWith(kind.display_name()).to_string());
                }
            }
        }
        Some(Target::Plant(i)) => {
            if fire_dig {
                dig(world, i, events);
            } else if fire_press {
                world.say(&ActionError::NotAShovel.to_string());
            }
        }
        Some(Target::Door(index)) if fire_press => unlock(world, index, held_kind, events),
        Some(Target::Switch) if fire_press => toggle_lights(world, events),
        _ => {}
    }

    if let Some(p) = input.click {
        if world.light_switch.contains(p) {
            toggle_lights(world, events);
        }
    }

    if world.cadence.flashlight.tick(input.toggle_light) {
        toggle_flashlight(world, events);
    }

    if world.cadence.chest.tick(input.toggle_chest) {
        toggle_chest(world, events);
    }

    striking
}

fn strike(world: &mut WorldState, n: usize, pts: i32, events: &mut Vec<GameEvent>) {
    let m = &mut world.monsters[n];
    m.take_damage(pts);
    events.push(GameEvent::MonsterHit { kind: m.kind, damage: pts, health: m.health });
}

fn dig(world: &mut WorldState, i: usize, events: &mut Vec<GameEvent>) {
    match world.plants[i].dig() {
        DigResult::Grew(stage) => events.push(GameEvent::PlantGrew { stage }),
        DigResult::Ripe => {
            world.plants.remove(i);
            let before = world.player.health;
            world.player.heal(PLANT_HEAL);
            let healed = world.player.health - before;
            events.push(GameEvent::PlantEaten { healed });
            world.say(&format!("You eat the plant and recover {healed} health."));
        }
    }
}

fn unlock(world: &mut WorldState, index: u8, held: Option<ItemKind>, events: &mut Vec<GameEvent>) {
    match held {
        Some(ItemKind::Key(k)) if k == index => {
            if world.maze.open_door(index) {
                events.push(GameEvent::DoorOpened { index });
            }
        }
        Some(ItemKind::Key(_)) => world.say(&ActionError::WrongKey.to_string()),
        _ => world.say(&ActionError::NotAKey.to_string()),
    }
}

fn toggle_lights(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    world.progress.lights_on = !world.progress.lights_on;
    events.push(GameEvent::LightsToggled { on: world.progress.lights_on });
}

fn toggle_flashlight(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let Some(id) = world.inventory.held().filter(|&id| world.items[id].kind == ItemKind::FLASHLIGHT) else {
        world.say(&ActionError::NotAFlashlight.to_string());
        return;
    };
    let item = &mut world.items[id];
    item.on = !item.on;
    events.push(GameEvent::FlashlightToggled { on: item.on });
}

fn toggle_chest(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let reach = world.player.rect;
    let Some(c) = world.chests.iter().position(|c| touching(&reach, &c.rect, CHEST_TOGGLE_REACH).touching) else {
        return;
    };
    let chest = &mut world.chests[c];
    chest.open = !chest.open;
    events.push(GameEvent::ChestToggled { chest: c, open: chest.open });
}

// ══════════════════════════════════════════════════════════════
// Monster
// ══════════════════════════════════════════════════════════════

fn resolve_monster(world: &mut WorldState, striking: bool, events: &mut Vec<GameEvent>) {
    let Some(n) = world.active_monster() else {
        return;
    };
    let blockers = world.blockers(Some(n));
    let env = Surroundings { maze: &world.maze, player: &world.player.rect, blockers: &blockers };
    let hit = ai::think(&mut world.monsters[n], &env, &world.ai, striking, &mut world.rng);

    if let Some(pts) = hit {
        let by = world.monsters[n].kind;
        if !world.player.immortal {
            world.player.take_damage(pts);
        }
        events.push(GameEvent::PlayerHit { by, damage: pts, health: world.player.health });
    }

    level::lock_in(world, events);
}

// ══════════════════════════════════════════════════════════════
// Messages
// ══════════════════════════════════════════════════════════════

fn resolve_messages(world: &mut WorldState) {
    world.tick_message();
    // Re-armed every tick, so it disappears as soon as the player is lit.
    if world.message.is_empty() && world.player_in_dark() {
        world.set_message(DARK_HINT, 1);
    }
}

// ══════════════════════════════════════════════════════════════
// Progression
// ══════════════════════════════════════════════════════════════

fn resolve_progression(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if let Stage::Hunt(n) = world.progress.stage {
        if world.monsters.get(n).is_some_and(|m| m.is_dead()) {
            level::on_monster_slain(world, n, events);
        }
    }
    level::check_final_gate(world, events);
    level::tick_countdown(world, events);
    level::check_defeat(world, events);
}
