//! Scancode to display-name mapping

use std::collections::HashMap;
use std::sync::LazyLock;

/// Name reserved for keys the keymap does not recognize. Never displayed.
pub const UNKNOWN_KEY: &str = "Unknown";

/// Represents a physical key code (Linux evdev scancode numbering)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCode(pub u16);

impl KeyCode {
    pub fn as_u16(&self) -> u16 {
        self.0
    }
}

impl From<u16> for KeyCode {
    fn from(code: u16) -> Self {
        Self(code)
    }
}

/// Display names for the scancodes a standard keyboard emits.
/// Left and right variants of a key share one name.
pub static KEYMAP: LazyLock<HashMap<KeyCode, &'static str>> = LazyLock::new(|| {
    let entries: &[(u16, &'static str)] = &[
        // Modifiers
        (42, "Shift"),
        (54, "Shift"),
        (29, "Ctrl"),
        (97, "Ctrl"),
        (56, "Alt"),
        (100, "Alt"),
        (125, "Meta"),
        (126, "Meta"),
        (58, "Caps Lock"),
        (464, "Fn"),
        // Navigation
        (103, "↑"),
        (108, "↓"),
        (105, "←"),
        (106, "→"),
        (102, "Home"),
        (107, "End"),
        (104, "Page Up"),
        (109, "Page Down"),
        (110, "Insert"),
        (111, "Delete"),
        // Editing / control
        (28, "Enter"),
        (96, "Num Enter"),
        (15, "Tab"),
        (14, "Backspace"),
        (1, "Esc"),
        (57, "Space"),
        (99, "Print Screen"),
        (70, "Scroll Lock"),
        (119, "Pause"),
        (69, "Num Lock"),
        // Function keys
        (59, "F1"),
        (60, "F2"),
        (61, "F3"),
        (62, "F4"),
        (63, "F5"),
        (64, "F6"),
        (65, "F7"),
        (66, "F8"),
        (67, "F9"),
        (68, "F10"),
        (87, "F11"),
        (88, "F12"),
        // Number row
        (2, "1"),
        (3, "2"),
        (4, "3"),
        (5, "4"),
        (6, "5"),
        (7, "6"),
        (8, "7"),
        (9, "8"),
        (10, "9"),
        (11, "0"),
        // Letters
        (30, "A"),
        (48, "B"),
        (46, "C"),
        (32, "D"),
        (18, "E"),
        (33, "F"),
        (34, "G"),
        (35, "H"),
        (23, "I"),
        (36, "J"),
        (37, "K"),
        (38, "L"),
        (50, "M"),
        (49, "N"),
        (24, "O"),
        (25, "P"),
        (16, "Q"),
        (19, "R"),
        (31, "S"),
        (20, "T"),
        (22, "U"),
        (47, "V"),
        (17, "W"),
        (45, "X"),
        (21, "Y"),
        (44, "Z"),
        // Punctuation
        (41, "`"),
        (12, "-"),
        (13, "="),
        (26, "["),
        (27, "]"),
        (43, "\\"),
        (86, "\\"),
        (39, ";"),
        (40, "'"),
        (51, ","),
        (52, "."),
        (53, "/"),
        // Numpad
        (82, "Num 0"),
        (79, "Num 1"),
        (80, "Num 2"),
        (81, "Num 3"),
        (75, "Num 4"),
        (76, "Num 5"),
        (77, "Num 6"),
        (71, "Num 7"),
        (72, "Num 8"),
        (73, "Num 9"),
        (78, "Num +"),
        (74, "Num -"),
        (55, "Num *"),
        (98, "Num /"),
        (83, "Num ."),
        (117, "Num ="),
        (121, "Num ,"),
        // Media
        (115, "Volume +"),
        (114, "Volume -"),
        (113, "Mute"),
        // System
        (127, "Menu"),
        (138, "Help"),
        (142, "Sleep"),
        (210, "Print"),
    ];

    entries
        .iter()
        .map(|&(code, name)| (KeyCode(code), name))
        .collect()
});

/// Display name for a scancode, or [`UNKNOWN_KEY`] if it is not mapped
pub fn key_name(code: KeyCode) -> &'static str {
    KEYMAP.get(&code).copied().unwrap_or(UNKNOWN_KEY)
}

/// Whether a display name denotes a modifier key
pub fn is_modifier(name: &str) -> bool {
    matches!(name, "Shift" | "Ctrl" | "Alt" | "Meta" | "Fn")
}
