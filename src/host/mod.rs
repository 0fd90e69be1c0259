//! Document-facing surface: the template registration command and the `card`
//! block renderer.

pub mod block;
pub mod commands;
