//! Loopvale — a top-down adventure trapped in a repeating day.
//!
//! The game is a set of domain plugins communicating through the shared
//! type contract in [`shared`]: the loop clock drives the day, the dialogue
//! engine runs conversations whose content shifts with the state of the
//! world, and everything is gated on [`shared::GameState`].

pub mod clock;
pub mod data;
pub mod dialogue;
pub mod input;
pub mod npcs;
pub mod player;
pub mod shared;
pub mod ui;
pub mod world;

pub use clock::ClockPlugin;
pub use data::DataPlugin;
pub use dialogue::DialoguePlugin;
pub use input::InputPlugin;
pub use npcs::NpcPlugin;
pub use player::PlayerPlugin;
pub use ui::UiPlugin;
pub use world::WorldPlugin;
