/// Rejected player actions.
///
/// None of these are faults. Each one leaves the world untouched and its
/// Display text goes straight to the on-screen message line.

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ActionError {
    // ── Inventory ──
    #[error("You can only hold one item at a time.")]
    AlreadyHolding,
    #[error("You can't carry more than 5 items.")]
    BackpackFull,
    #[error("There is nothing to pick up.")]
    NothingToPickUp,
    #[error("There is nothing to drop.")]
    NothingToDrop,
    #[error("There is nothing to place in your backpack.")]
    NothingToStow,
    #[error("There is nothing in your backpack.")]
    EmptyBackpack,
    #[error("There is nothing in slot {0}.")]
    NoSuchSlot(usize),

    // ── Item use ──
    #[error("Wrong key. Hint: door and key numbers should match.")]
    WrongKey,
    #[error("You can only open a door with a key.")]
    NotAKey,
    #[error("You can only dig with a shovel.")]
    NotAShovel,
    #[error("You can't kill with the {0}.")]
    CannotKillWith(&'static str),
    #[error("You can only turn a flashlight on/off.")]
    NotAFlashlight,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_player_facing() {
        assert_eq!(ActionError::BackpackFull.to_string(), "You can't carry more than 5 items.");
        assert_eq!(ActionError::CannotKillWith("key").to_string(), "You can't kill with the key.");
        assert_eq!(ActionError::NoSuchSlot(4).to_string(), "There is nothing in slot 4.");
    }
}
