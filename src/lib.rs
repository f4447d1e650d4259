//! # Gridiron
//!
//! Tracks American-football game results by season and derives
//! schedule-adjusted power ratings.
//!
//! ## Architecture
//!
//! - **models**: Games, team and league season rows, schedule profiles
//! - **calculate**: Winning and Pythagorean percentages, safe division
//! - **aggregate**: Applies or reverses one game's effect on season rows
//! - **ranking**: Season-wide offensive/defensive factors and indices
//! - **storage**: Store contracts and the JSONL-backed repository
//! - **ledger**: Add/edit/delete/rebuild use cases over the engine
//! - **config**: Configuration loading and validation

pub mod aggregate;
pub mod calculate;
pub mod config;
pub mod ledger;
pub mod models;
pub mod ranking;
pub mod storage;

pub use models::*;
