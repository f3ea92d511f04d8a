/// Space Invaders simulation.
///
/// The library is the game itself: entities, collision tests and the
/// per-frame update.  The binary wraps it in a terminal front-end.

pub mod compute;
pub mod config;
pub mod entities;
pub mod geometry;
pub mod input;
