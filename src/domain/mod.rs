/// Pure game rules: geometry, the maze, entities, items and the state
/// machines that act on them. Nothing here touches the terminal.

pub mod ai;
pub mod door;
pub mod entity;
pub mod error;
pub mod geom;
pub mod inventory;
pub mod item;
pub mod maze;
pub mod repeat;
pub mod rules;
pub mod stats;
