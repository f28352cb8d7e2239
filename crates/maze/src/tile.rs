/// Semantic class of a tile code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileKind {
    Empty,
    /// Plain wall, emitted as one cell-sized box with no merging.
    Wall,
    /// Decorative block; identical neighbours merge into runs.
    Decoration(u8),
    /// Locked door; identical neighbours merge into one door.
    Door(u8),
    /// Collectible key opening the doors bound to it.
    Key(u8),
    /// Start cell of the hostile entity. Emits no geometry.
    HostileSpawn,
    /// Code with no meaning; skipped by the compiler.
    Unknown(u8),
}

pub const WALL: u8 = 1;
pub const HOSTILE_SPAWN: u8 = 18;

impl TileKind {
    pub fn classify(code: u8) -> Self {
        match code {
            0 => Self::Empty,
            WALL => Self::Wall,
            2..=9 | 19 => Self::Decoration(code),
            10..=17 => Self::Door(code),
            HOSTILE_SPAWN => Self::HostileSpawn,
            20..=27 => Self::Key(code),
            other => Self::Unknown(other),
        }
    }

    /// Doors and decorations merge into runs of identical codes.
    pub fn merges(self) -> bool {
        matches!(self, Self::Door(_) | Self::Decoration(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_ranges() {
        assert_eq!(TileKind::classify(0), TileKind::Empty);
        assert_eq!(TileKind::classify(1), TileKind::Wall);
        assert_eq!(TileKind::classify(2), TileKind::Decoration(2));
        assert_eq!(TileKind::classify(9), TileKind::Decoration(9));
        assert_eq!(TileKind::classify(19), TileKind::Decoration(19));
        assert_eq!(TileKind::classify(10), TileKind::Door(10));
        assert_eq!(TileKind::classify(17), TileKind::Door(17));
        assert_eq!(TileKind::classify(18), TileKind::HostileSpawn);
        assert_eq!(TileKind::classify(20), TileKind::Key(20));
        assert_eq!(TileKind::classify(27), TileKind::Key(27));
        assert_eq!(TileKind::classify(28), TileKind::Unknown(28));
    }

    #[test]
    fn only_doors_and_decorations_merge() {
        assert!(TileKind::Door(10).merges());
        assert!(TileKind::Decoration(3).merges());
        assert!(!TileKind::Wall.merges());
        assert!(!TileKind::Key(20).merges());
    }
}
