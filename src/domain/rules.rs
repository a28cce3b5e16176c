/// Player movement rules.
///
/// Pure candidate-then-validate: the candidate box is computed, checked, and
/// only committed when every check passes. A rejected move leaves position
/// and held item exactly where they were; only the facing changes.
///
/// ## Movement Truth Table
///
/// ┌──────────────────────────────────────────┬────────┐
/// │ Condition (candidate after one step)      │ Allow? │
/// ├──────────────────────────────────────────┼────────┤
/// │ body leaves the maze extent               │ DENY   │
/// │ body ring probe hits a wall point (±5)    │ DENY   │
/// │ body overlaps a blocker                   │ DENY   │
/// │ held item ring probe hits a wall (±10)    │ DENY   │
/// │ held item overlaps a blocker              │ DENY   │
/// │ otherwise                                 │ ALLOW  │
/// └──────────────────────────────────────────┴────────┘
///
/// Blockers are every entity with `walk_over() == false` other than the
/// player: monsters, chests, plants and closed door panels.

use super::entity::Player;
use super::geom::{Dir, Rect};
use super::item::{held_rect, Holdable};
use super::maze::Maze;

pub const PLAYER_SPEED: i32 = 5;

/// Why a step was refused.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Refusal {
    OutOfBounds,
    Wall,
    Blocked,
    ItemInWall,
    ItemBlocked,
}

/// Validate a step of `speed` units. `held` is the held item's size.
pub fn check_step(
    maze: &Maze,
    body: &Rect,
    held: Option<(i32, i32)>,
    blockers: &[Rect],
    dir: Dir,
    speed: i32,
    extended: bool,
) -> Result<Rect, Refusal> {
    let (dx, dy) = dir.delta();
    let cand = body.translated(dx * speed, dy * speed);

    if !maze.in_bounds(&cand) {
        return Err(Refusal::OutOfBounds);
    }
    if maze.collides_player(&cand) {
        return Err(Refusal::Wall);
    }
    if blockers.iter().any(|b| b.overlaps(&cand)) {
        return Err(Refusal::Blocked);
    }
    if let Some((w, h)) = held {
        let item = held_rect(&cand, dir, w, h, extended);
        if maze.collides_item(&item) {
            return Err(Refusal::ItemInWall);
        }
        if blockers.iter().any(|b| b.overlaps(&item)) {
            return Err(Refusal::ItemBlocked);
        }
    }
    Ok(cand)
}

/// Face `dir` and step if allowed. The held item follows the hand on success.
pub fn move_player<H: Holdable>(
    maze: &Maze,
    player: &mut Player,
    held: Option<&mut H>,
    held_size: Option<(i32, i32)>,
    blockers: &[Rect],
    dir: Dir,
    extended: bool,
) -> Result<(), Refusal> {
    player.facing = dir;
    let next = check_step(maze, &player.rect, held_size, blockers, dir, PLAYER_SPEED, extended)?;
    player.rect = next;
    if let Some(item) = held {
        item.hold_at(&player.rect, dir, extended);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::PLAYER_H;
    use crate::domain::geom::Point;
    use crate::domain::item::{Item, ItemKind, Location, WeaponKind};
    use crate::domain::maze::cell_rect;

    /// Player centred in cell (0, 0).
    fn player_mid_cell() -> Player {
        Player::new(cell_rect(0, 0).center())
    }

    fn sword() -> Item {
        Item::new(0, ItemKind::Weapon(WeaponKind::Sword), Point::new(0, 0), Location::Hands)
    }

    #[test]
    fn open_floor_allows_step() {
        let maze = Maze::build();
        let mut p = player_mid_cell();
        let x = p.rect.x;
        assert_eq!(move_player::<Item>(&maze, &mut p, None, None, &[], Dir::Right, false), Ok(()));
        assert_eq!(p.rect.x, x + PLAYER_SPEED);
        assert_eq!(p.facing, Dir::Right);
    }

    #[test]
    fn rejected_move_leaves_position_identical() {
        let maze = Maze::build();
        let cell = cell_rect(0, 0);
        let mut p = player_mid_cell();
        // Flush against the north border wall.
        p.rect.y = cell.y + 5;
        let before = p.rect;
        assert_eq!(
            move_player::<Item>(&maze, &mut p, None, None, &[], Dir::Up, false),
            Err(Refusal::Wall)
        );
        assert_eq!(p.rect, before);
        assert_eq!(p.facing, Dir::Up);
    }

    #[test]
    fn held_item_in_wall_blocks_free_body() {
        let maze = Maze::build();
        let cell = cell_rect(0, 0);
        let mut p = player_mid_cell();
        // Body has room above, but the sword sticks out to the left and
        // scrapes the west border.
        p.rect.x = cell.x + 50;
        let mut s = sword();
        let size = (s.rect.w, s.rect.h);
        let before = p.rect;
        let r = move_player(&maze, &mut p, Some(&mut s), Some(size), &[], Dir::Left, false);
        assert_eq!(r, Err(Refusal::ItemInWall));
        assert_eq!(p.rect, before);
        assert!(!maze.collides_player(&before.translated(-PLAYER_SPEED, 0)));
    }

    #[test]
    fn held_item_follows_on_success() {
        let maze = Maze::build();
        let mut p = player_mid_cell();
        let mut s = sword();
        let size = (s.rect.w, s.rect.h);
        move_player(&maze, &mut p, Some(&mut s), Some(size), &[], Dir::Down, false).expect("step");
        assert_eq!(s.rect, held_rect(&p.rect, Dir::Down, 60, 60, false));
    }

    #[test]
    fn blocker_overlap_is_refused() {
        let maze = Maze::build();
        let mut p = player_mid_cell();
        let chest = Rect::new(p.rect.x, p.rect.bottom(), 100, 80);
        let before = p.rect;
        let r = move_player::<Item>(&maze, &mut p, None, None, &[chest], Dir::Down, false);
        assert_eq!(r, Err(Refusal::Blocked));
        assert_eq!(p.rect, before);
    }

    #[test]
    fn edge_contact_with_blocker_is_fine() {
        let maze = Maze::build();
        let mut p = player_mid_cell();
        let chest = Rect::new(p.rect.x, p.rect.bottom() + PLAYER_SPEED, 100, 80);
        assert!(move_player::<Item>(&maze, &mut p, None, None, &[chest], Dir::Down, false).is_ok());
        assert_eq!(p.rect.bottom(), chest.y);
        assert_eq!(p.rect.h, PLAYER_H);
    }

    #[test]
    fn maze_extent_is_a_hard_edge() {
        let maze = Maze::build();
        let body = Rect::new(0, 100, 70, 100);
        assert_eq!(check_step(&maze, &body, None, &[], Dir::Left, 5, false), Err(Refusal::OutOfBounds));
    }
}
