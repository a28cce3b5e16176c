/// Damage stat table: (item × monster) → damage points.
///
/// Loaded once at startup from the `[damage]` section of `config.toml`,
/// layered over built-in defaults, and read-only afterwards. Entries naming
/// an unknown item or monster are rejected individually; the rest of the
/// table still loads.

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

use super::entity::MonsterKind;
use super::item::ItemKind;

/// Item rows that may appear in the table.
pub const ITEM_KEYS: [&str; 5] = ["shovel", "sword", "boxing_glove", "flame_thrower", "trident"];

/// Default damage, one row per `ITEM_KEYS` entry, columns in hunt order.
const DEFAULTS: [[i32; 6]; 5] = [
    //  lion  cerb  hydra cattle deer  boar
    [10, 8, 6, 5, 5, 4],
    [15, 15, 12, 10, 10, 8],
    [12, 12, 15, 18, 14, 12],
    [20, 18, 25, 20, 22, 18],
    [18, 20, 20, 22, 20, 25],
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StatsError {
    #[error("unknown item '{0}' in [damage]")]
    UnknownItem(String),
    #[error("unknown monster '{monster}' under [damage.{item}]")]
    UnknownMonster { item: String, monster: String },
    #[error("negative damage {points} for {item} vs {monster}")]
    Negative { item: String, monster: String, points: i32 },
}

#[derive(Clone, Debug)]
pub struct StatTable {
    damage: HashMap<(&'static str, MonsterKind), i32>,
}

impl Default for StatTable {
    fn default() -> Self {
        let mut damage = HashMap::with_capacity(ITEM_KEYS.len() * MonsterKind::ORDER.len());
        for (row, item) in ITEM_KEYS.iter().enumerate() {
            for (col, monster) in MonsterKind::ORDER.iter().enumerate() {
                damage.insert((*item, *monster), DEFAULTS[row][col]);
            }
        }
        StatTable { damage }
    }
}

impl StatTable {
    /// Defaults overridden by `entries` (item → monster → points). Invalid
    /// entries are skipped and returned alongside the table.
    pub fn with_overrides(entries: &BTreeMap<String, BTreeMap<String, i32>>) -> (Self, Vec<StatsError>) {
        let mut table = StatTable::default();
        let mut errors = Vec::new();

        for (item, row) in entries {
            let Some(key) = ITEM_KEYS.iter().copied().find(|k| *k == item.as_str()) else {
                errors.push(StatsError::UnknownItem(item.clone()));
                continue;
            };
            for (monster, &points) in row {
                let Some(kind) = MonsterKind::ORDER.iter().copied().find(|m| m.name() == monster.as_str()) else {
                    errors.push(StatsError::UnknownMonster { item: item.clone(), monster: monster.clone() });
                    continue;
                };
                if points < 0 {
                    errors.push(StatsError::Negative { item: item.clone(), monster: monster.clone(), points });
                    continue;
                }
                table.damage.insert((key, kind), points);
            }
        }

        (table, errors)
    }

    /// Damage `item` deals to `monster`, or `None` if the item cannot hurt.
    pub fn damage(&self, item: ItemKind, monster: MonsterKind) -> Option<i32> {
        let key = item.stat_key()?;
        self.damage.get(&(key, monster)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::item::WeaponKind;

    fn entries(rows: &[(&str, &str, i32)]) -> BTreeMap<String, BTreeMap<String, i32>> {
        let mut out: BTreeMap<String, BTreeMap<String, i32>> = BTreeMap::new();
        for (item, monster, points) in rows {
            out.entry(item.to_string()).or_default().insert(monster.to_string(), *points);
        }
        out
    }

    #[test]
    fn defaults_cover_every_pair() {
        let t = StatTable::default();
        for item in [ItemKind::SHOVEL, ItemKind::Weapon(WeaponKind::Sword), ItemKind::Weapon(WeaponKind::Trident)] {
            for m in MonsterKind::ORDER {
                assert!(t.damage(item, m).is_some_and(|d| d > 0));
            }
        }
    }

    #[test]
    fn non_weapons_deal_nothing() {
        let t = StatTable::default();
        assert_eq!(t.damage(ItemKind::FLASHLIGHT, MonsterKind::Lion), None);
        assert_eq!(t.damage(ItemKind::Key(1), MonsterKind::Lion), None);
        assert_eq!(t.damage(ItemKind::Gem, MonsterKind::Boar), None);
    }

    #[test]
    fn overrides_replace_defaults() {
        let (t, errs) = StatTable::with_overrides(&entries(&[("sword", "lion", 99)]));
        assert!(errs.is_empty());
        assert_eq!(t.damage(ItemKind::Weapon(WeaponKind::Sword), MonsterKind::Lion), Some(99));
        assert_eq!(t.damage(ItemKind::Weapon(WeaponKind::Sword), MonsterKind::Boar), Some(8));
    }

    #[test]
    fn bad_entries_are_reported_and_skipped() {
        let (t, errs) = StatTable::with_overrides(&entries(&[
            ("banana", "lion", 5),
            ("sword", "minotaur", 5),
            ("sword", "hydra", -3),
        ]));
        assert_eq!(errs.len(), 3);
        assert!(errs.contains(&StatsError::UnknownItem("banana".into())));
        assert_eq!(t.damage(ItemKind::Weapon(WeaponKind::Sword), MonsterKind::Hydra), Some(12));
    }
}
