//! Core data models for season tracking.

mod game;
mod ids;
mod league_season;
mod reference;
mod schedule;
mod team_season;

pub use game::*;
pub use ids::*;
pub use league_season::*;
pub use reference::*;
pub use schedule::*;
pub use team_season::*;
