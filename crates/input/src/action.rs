use serde::{Deserialize, Serialize};

/// A discrete request produced by a key press or a UI button.
///
/// These are the write-capable triggers the game exposes to its UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    ToggleFlashlight,
    /// Restore health, clear game over and return the player to spawn.
    ResetGame,
    /// Leave the start screen and begin playing.
    DismissStartScreen,
    /// Open the controls screen from the start screen.
    ShowControls,
    /// Leave the controls screen and begin playing.
    DismissControlsScreen,
    /// Return from the controls screen to the start screen.
    BackToStart,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_serialize_by_name() {
        let json = serde_json::to_string(&Action::ResetGame).unwrap();
        assert_eq!(json, "\"ResetGame\"");
        let back: Action = serde_json::from_str("\"ShowControls\"").unwrap();
        assert_eq!(back, Action::ShowControls);
        assert!(serde_json::from_str::<Action>("\"Jump\"").is_err());
    }

    #[test]
    fn action_debug_name() {
        let s = format!("{:?}", Action::ToggleFlashlight);
        assert_eq!(s, "ToggleFlashlight");
    }
}
