use serde::{Deserialize, Serialize};

/// Static pairing of a key tile code with the door tile code it unlocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyDoorBinding {
    pub key_code: u8,
    pub door_code: u8,
}

impl KeyDoorBinding {
    pub const fn new(key_code: u8, door_code: u8) -> Self {
        Self {
            key_code,
            door_code,
        }
    }
}

/// Key 20 opens door 10, key 21 opens door 11, and so on up to 27/17.
pub const DEFAULT_BINDINGS: [KeyDoorBinding; 8] = [
    KeyDoorBinding::new(20, 10),
    KeyDoorBinding::new(21, 11),
    KeyDoorBinding::new(22, 12),
    KeyDoorBinding::new(23, 13),
    KeyDoorBinding::new(24, 14),
    KeyDoorBinding::new(25, 15),
    KeyDoorBinding::new(26, 16),
    KeyDoorBinding::new(27, 17),
];

/// First binding for `key_code`, if any.
pub fn door_code_for_key(bindings: &[KeyDoorBinding], key_code: u8) -> Option<u8> {
    bindings
        .iter()
        .find(|b| b.key_code == key_code)
        .map(|b| b.door_code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bindings_pair_by_offset() {
        for b in DEFAULT_BINDINGS {
            assert_eq!(b.key_code - b.door_code, 10);
        }
    }

    #[test]
    fn lookup_first_match() {
        let table = [
            KeyDoorBinding::new(20, 12),
            KeyDoorBinding::new(20, 13),
        ];
        assert_eq!(door_code_for_key(&table, 20), Some(12));
        assert_eq!(door_code_for_key(&table, 21), None);
    }
}
