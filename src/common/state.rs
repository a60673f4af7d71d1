//! Global state machine.

use bevy::prelude::*;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, States, Default)]
pub enum GameState {
    #[default]
    InGame,
    /// Entered when the player dies. Everything scoped to `InGame` is despawned on exit.
    GameOver,
}
