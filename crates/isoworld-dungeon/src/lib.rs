//! Room-and-corridor dungeon layouts stamped into a [`isoworld_grid::Grid`].

mod config;
mod generator;
mod room;

pub use config::DungeonConfig;
pub use generator::{DungeonError, DungeonGenerator, DungeonLayout};
pub use room::{Room, RoomPalette};
