/// Inventory & equip state machine.
///
/// ```text
///            pick_up / take_from_chest
///   GROUND ───────────────────────────▶ HANDS ◀──── equip(i) / cycle
///     ▲               drop                │  ▲
///     └───────────────────────────────────┘  │
///                                  stow      ▼  │
///                                        BACKPACK
/// ```
///
/// Invariants (checked by `check`):
///   - at most one item is in HANDS
///   - the carried list (hands + backpack) never exceeds `CAPACITY`
///   - an item's `location` agrees with the lists that reference it
///
/// Every transition either fully succeeds or returns an `ActionError` and
/// leaves both the inventory and the items untouched.

use super::entity::Chest;
use super::error::ActionError;
use super::geom::{touching, Point, Rect};
use super::item::{Item, ItemId, Location};

pub const CAPACITY: usize = 5;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Inventory {
    held: Option<ItemId>,
    /// Everything carried, in backpack order. The held item is included.
    carried: Vec<ItemId>,
}

impl Inventory {
    pub fn new() -> Self {
        Inventory::default()
    }

    pub fn held(&self) -> Option<ItemId> {
        self.held
    }

    pub fn carried(&self) -> &[ItemId] {
        &self.carried
    }

    pub fn is_full(&self) -> bool {
        self.carried.len() >= CAPACITY
    }

    fn can_claim(&self) -> Result<(), ActionError> {
        if self.held.is_some() {
            return Err(ActionError::AlreadyHolding);
        }
        if self.is_full() {
            return Err(ActionError::BackpackFull);
        }
        Ok(())
    }

    fn claim(&mut self, items: &mut [Item], id: ItemId) {
        let item = &mut items[id];
        item.location = Location::Hands;
        item.pickups += 1;
        self.carried.push(id);
        self.held = Some(id);
    }

    /// Put an item straight into empty hands, wherever it is. Used for the
    /// starting equipment.
    pub fn give(&mut self, items: &mut [Item], id: ItemId) -> Result<(), ActionError> {
        self.can_claim()?;
        self.claim(items, id);
        Ok(())
    }

    /// GROUND → HANDS for the first ground item touching `reach`.
    pub fn pick_up(&mut self, items: &mut [Item], reach: &Rect) -> Result<ItemId, ActionError> {
        self.can_claim()?;
        let id = items
            .iter()
            .find(|it| it.is_on_ground() && touching(reach, &it.rect, 0).touching)
            .map(|it| it.id)
            .ok_or(ActionError::NothingToPickUp)?;
        self.claim(items, id);
        Ok(id)
    }

    /// CHEST → HANDS. The caller checks that the player is close enough.
    pub fn take_from_chest(&mut self, items: &mut [Item], chest: &mut Chest) -> Result<ItemId, ActionError> {
        self.can_claim()?;
        let id = match chest.content {
            Some(id) if chest.open => id,
            _ => return Err(ActionError::NothingToPickUp),
        };
        chest.content = None;
        self.claim(items, id);
        Ok(id)
    }

    /// HANDS → GROUND, centred on `at`.
    pub fn drop(&mut self, items: &mut [Item], at: Point) -> Result<ItemId, ActionError> {
        let id = self.held.take().ok_or(ActionError::NothingToDrop)?;
        self.carried.retain(|&c| c != id);
        items[id].drop_at(at);
        Ok(id)
    }

    /// HANDS → BACKPACK. The item keeps its slot in the carried list.
    pub fn stow(&mut self, items: &mut [Item]) -> Result<ItemId, ActionError> {
        let id = self.held.take().ok_or(ActionError::NothingToStow)?;
        items[id].location = Location::Backpack;
        Ok(id)
    }

    /// BACKPACK → HANDS for slot `index` (0-based). Anything already held is
    /// stowed first.
    pub fn equip(&mut self, items: &mut [Item], index: usize) -> Result<ItemId, ActionError> {
        if self.carried.is_empty() {
            return Err(ActionError::EmptyBackpack);
        }
        let id = *self.carried.get(index).ok_or(ActionError::NoSuchSlot(index + 1))?;
        if self.held == Some(id) {
            return Ok(id);
        }
        if let Some(prev) = self.held.take() {
            items[prev].location = Location::Backpack;
        }
        items[id].location = Location::Hands;
        self.held = Some(id);
        Ok(id)
    }

    /// Equip the slot after the held one, wrapping. With empty hands this
    /// starts at the first slot.
    pub fn cycle(&mut self, items: &mut [Item]) -> Result<ItemId, ActionError> {
        if self.carried.is_empty() {
            return Err(ActionError::EmptyBackpack);
        }
        let next = self
            .held
            .and_then(|h| self.carried.iter().position(|&c| c == h))
            .map_or(0, |i| (i + 1) % self.carried.len());
        self.equip(items, next)
    }

    /// Verify the ownership invariants against the item arena.
    pub fn check(&self, items: &[Item]) -> Result<(), String> {
        if self.carried.len() > CAPACITY {
            return Err(format!("carrying {} items", self.carried.len()));
        }
        let in_hands: Vec<ItemId> = items.iter().filter(|it| it.location == Location::Hands).map(|it| it.id).collect();
        if in_hands.len() > 1 {
            return Err(format!("{} items in hands: {in_hands:?}", in_hands.len()));
        }
        if in_hands.first().copied() != self.held {
            return Err(format!("held {:?} but hands hold {in_hands:?}", self.held));
        }
        for it in items {
            let listed = self.carried.contains(&it.id);
            let carried_loc = matches!(it.location, Location::Hands | Location::Backpack);
            if listed != carried_loc {
                return Err(format!("item {} at {:?} listed={listed}", it.id, it.location));
            }
        }
        Ok(())
    }
}

/// Chest a player standing at `reach` can take from, if any.
pub fn reachable_chest(chests: &[Chest], reach: &Rect, leeway: i32) -> Option<usize> {
    chests.iter().position(|c| c.open && touching(reach, &c.rect, leeway).touching)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::item::{ItemKind, WeaponKind};

    fn arena(n: usize) -> Vec<Item> {
        (0..n).map(|i| Item::new(i, ItemKind::Gem, Point::new(100 * i as i32, 0), Location::Ground)).collect()
    }

    fn reach_of(item: &Item) -> Rect {
        item.rect.expanded(5)
    }

    /// Pick up items `0..n` one by one and stow each.
    fn stocked(items: &mut [Item], n: usize) -> Inventory {
        let mut inv = Inventory::new();
        for i in 0..n {
            let reach = reach_of(&items[i]);
            inv.pick_up(items, &reach).expect("pickup");
            inv.stow(items).expect("stow");
        }
        inv
    }

    #[test]
    fn pick_up_takes_touching_ground_item() {
        let mut items = arena(3);
        let mut inv = Inventory::new();
        let reach = reach_of(&items[1]);
        assert_eq!(inv.pick_up(&mut items, &reach), Ok(1));
        assert_eq!(inv.held(), Some(1));
        assert_eq!(items[1].location, Location::Hands);
        assert_eq!(items[1].pickups, 1);
        assert!(inv.check(&items).is_ok());
    }

    #[test]
    fn pick_up_with_nothing_near_fails() {
        let mut items = arena(2);
        let mut inv = Inventory::new();
        let far = Rect::new(5000, 5000, 10, 10);
        assert_eq!(inv.pick_up(&mut items, &far), Err(ActionError::NothingToPickUp));
    }

    #[test]
    fn pick_up_while_holding_fails() {
        let mut items = arena(2);
        let mut inv = Inventory::new();
        let r0 = reach_of(&items[0]);
        let r1 = reach_of(&items[1]);
        inv.pick_up(&mut items, &r0).expect("first");
        assert_eq!(inv.pick_up(&mut items, &r1), Err(ActionError::AlreadyHolding));
        assert_eq!(items[1].location, Location::Ground);
    }

    #[test]
    fn sixth_pickup_reports_backpack_full_without_mutation() {
        let mut items = arena(6);
        let mut inv = stocked(&mut items, 5);
        let before_inv = inv.clone();
        let before_loc: Vec<Location> = items.iter().map(|it| it.location).collect();

        let reach = reach_of(&items[5]);
        assert_eq!(inv.pick_up(&mut items, &reach), Err(ActionError::BackpackFull));

        assert_eq!(inv, before_inv);
        assert_eq!(items.iter().map(|it| it.location).collect::<Vec<_>>(), before_loc);
        assert_eq!(items[5].pickups, 0);
    }

    #[test]
    fn drop_places_item_at_point_and_frees_slot() {
        let mut items = arena(1);
        let mut inv = Inventory::new();
        let reach = reach_of(&items[0]);
        inv.pick_up(&mut items, &reach).expect("pickup");
        assert_eq!(inv.drop(&mut items, Point::new(900, 900)), Ok(0));
        assert_eq!(items[0].rect.center(), Point::new(900, 900));
        assert!(inv.carried().is_empty());
        assert_eq!(inv.drop(&mut items, Point::new(0, 0)), Err(ActionError::NothingToDrop));
        assert!(inv.check(&items).is_ok());
    }

    #[test]
    fn stow_keeps_backpack_order() {
        let mut items = arena(3);
        let inv = stocked(&mut items, 3);
        assert_eq!(inv.carried(), &[0, 1, 2]);
        assert_eq!(inv.held(), None);
        assert!(items[..3].iter().all(|it| it.location == Location::Backpack));
    }

    #[test]
    fn stow_with_empty_hands_fails() {
        let mut items = arena(1);
        let mut inv = Inventory::new();
        assert_eq!(inv.stow(&mut items), Err(ActionError::NothingToStow));
    }

    #[test]
    fn equip_swaps_held_item_into_backpack() {
        let mut items = arena(3);
        let mut inv = stocked(&mut items, 3);
        inv.equip(&mut items, 0).expect("equip 0");
        inv.equip(&mut items, 2).expect("equip 2");
        assert_eq!(inv.held(), Some(2));
        assert_eq!(items[0].location, Location::Backpack);
        assert!(inv.check(&items).is_ok());
        assert_eq!(inv.equip(&mut items, 7), Err(ActionError::NoSuchSlot(8)));
    }

    #[test]
    fn cycle_wraps_around() {
        let mut items = arena(3);
        let mut inv = stocked(&mut items, 3);
        let seq: Vec<ItemId> = (0..4).map(|_| inv.cycle(&mut items).expect("cycle")).collect();
        assert_eq!(seq, vec![0, 1, 2, 0]);
        assert!(inv.check(&items).is_ok());
    }

    #[test]
    fn cycle_on_empty_backpack_fails() {
        let mut items = arena(1);
        let mut inv = Inventory::new();
        assert_eq!(inv.cycle(&mut items), Err(ActionError::EmptyBackpack));
    }

    #[test]
    fn take_from_open_chest() {
        let mut items = vec![Item::new(0, ItemKind::Weapon(WeaponKind::Sword), Point::new(0, 0), Location::Chest(0))];
        let mut chest = Chest::new(Point::new(0, 0));
        chest.content = Some(0);
        let mut inv = Inventory::new();

        assert_eq!(inv.take_from_chest(&mut items, &mut chest), Err(ActionError::NothingToPickUp));
        chest.open = true;
        assert_eq!(inv.take_from_chest(&mut items, &mut chest), Ok(0));
        assert_eq!(chest.content, None);
        assert_eq!(items[0].location, Location::Hands);
        assert!(inv.check(&items).is_ok());
    }

    #[test]
    fn invariant_holds_through_mixed_sequence() {
        let mut items = arena(6);
        let mut inv = Inventory::new();
        for i in 0..6 {
            let reach = reach_of(&items[i]);
            let _ = inv.pick_up(&mut items, &reach);
            let _ = inv.cycle(&mut items);
            let _ = inv.stow(&mut items);
            assert!(inv.check(&items).is_ok(), "broken after step {i}");
            assert!(inv.carried().len() <= CAPACITY);
        }
        let _ = inv.equip(&mut items, 1);
        let _ = inv.drop(&mut items, Point::new(10, 10));
        assert!(inv.check(&items).is_ok());
    }
}
