/// World state and the per-tick simulation.

pub mod action;
pub mod event;
pub mod level;
pub mod step;
pub mod world;
