/// Terminal front end: input sources and the renderer.

pub mod gamepad;
pub mod input;
pub mod renderer;
