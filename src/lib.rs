pub mod cell;
pub mod config;
pub mod corridor;
pub mod deadend;
pub mod door;
pub mod dungeon;
pub mod error;
pub mod grid;
pub mod map;
pub mod mask;
pub mod render;
pub mod rng;
pub mod room;
pub mod stairs;

pub use config::{DungeonLayout, DungeonParams, LayoutTemplate, MapStyle, RoomLayout, RoomStrategy};
pub use dungeon::{Dungeon, generate_many};
pub use error::{DungeonError, Result};
pub use map::{CellInfo, DungeonMap};
pub use rng::DungeonRng;
