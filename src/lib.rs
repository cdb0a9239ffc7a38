//! dexgrid - terminal browser for a game-data encyclopedia API.

pub mod action;
pub mod api;
pub mod effect;
pub mod grid;
pub mod panel;
pub mod reducer;
pub mod route;
pub mod state;
pub mod ui;
