use serde::{Deserialize, Serialize};

/// Player-visible state of a single tile.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileState {
    Hidden,
    Safe,
    Cut,
}

impl TileState {
    pub const fn is_hidden(self) -> bool {
        matches!(self, Self::Hidden)
    }

    /// State a hidden tile takes once its board value is disclosed.
    pub const fn disclosed(is_cut: bool) -> Self {
        if is_cut { Self::Cut } else { Self::Safe }
    }
}

impl Default for TileState {
    fn default() -> Self {
        Self::Hidden
    }
}
