//! Key state: the modifier bitset and the keystring type driving the input
//! pipeline (spec §3, §4.8).

/// A closed enumeration of modifier keys, each a bit in the 64-bit
/// modifier bitset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    LCtrl,
    RCtrl,
    LAlt,
    RAlt,
    LShift,
    RShift,
    LSuper,
    RSuper,
}

impl Modifier {
    const ALL: [Modifier; 8] = [
        Modifier::LCtrl,
        Modifier::RCtrl,
        Modifier::LAlt,
        Modifier::RAlt,
        Modifier::LShift,
        Modifier::RShift,
        Modifier::LSuper,
        Modifier::RSuper,
    ];

    fn bit(self) -> u64 {
        1 << match self {
            Modifier::LCtrl => 0,
            Modifier::RCtrl => 1,
            Modifier::LAlt => 2,
            Modifier::RAlt => 3,
            Modifier::LShift => 4,
            Modifier::RShift => 5,
            Modifier::LSuper => 6,
            Modifier::RSuper => 7,
        }
    }

    /// The well-known keymap key that resolves this modifier's layer
    /// (spec §4.8 step 1).
    pub fn layer_keystring(self) -> &'static str {
        match self {
            Modifier::LCtrl => "LEFT-CONTROL",
            Modifier::RCtrl => "RIGHT-CONTROL",
            Modifier::LAlt => "LEFT-ALT",
            Modifier::RAlt => "RIGHT-ALT",
            Modifier::LShift => "LEFT-SHIFT",
            Modifier::RShift => "RIGHT-SHIFT",
            Modifier::LSuper => "LEFT-SUPER",
            Modifier::RSuper => "RIGHT-SUPER",
        }
    }

    /// Shift bindings are optional (spec §4.8 step 1); every other
    /// modifier requires a binding or the keystroke is discarded.
    pub fn is_optional(self) -> bool {
        matches!(self, Modifier::LShift | Modifier::RShift)
    }
}

/// A 64-bit modifier bitset. Up/down handlers only flip bits here — they
/// must never traverse the keymap themselves (spec §4.8).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModifierState(u64);

impl ModifierState {
    pub fn new() -> Self {
        ModifierState(0)
    }

    pub fn down(&mut self, m: Modifier) {
        self.0 |= m.bit();
    }

    pub fn up(&mut self, m: Modifier) {
        self.0 &= !m.bit();
    }

    pub fn is_down(&self, m: Modifier) -> bool {
        self.0 & m.bit() != 0
    }

    /// Modifiers currently down, in a fixed, deterministic order (spec
    /// §4.8 resolves layers one modifier at a time).
    pub fn pressed(&self) -> impl Iterator<Item = Modifier> + '_ {
        Modifier::ALL.into_iter().filter(move |m| self.is_down(*m))
    }
}

/// Characters filtered out before keymap traversal (spec §4.8).
pub fn is_ignored_control_char(keystring: &str) -> bool {
    matches!(keystring.as_bytes(), [0x1b] | [0x0c] | [0x0b])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn down_then_up_clears_only_that_bit() {
        let mut m = ModifierState::new();
        m.down(Modifier::LCtrl);
        m.down(Modifier::LShift);
        assert!(m.is_down(Modifier::LCtrl));
        assert!(m.is_down(Modifier::LShift));
        m.up(Modifier::LCtrl);
        assert!(!m.is_down(Modifier::LCtrl));
        assert!(m.is_down(Modifier::LShift));
    }

    #[test]
    fn pressed_lists_every_down_modifier() {
        let mut m = ModifierState::new();
        m.down(Modifier::LAlt);
        m.down(Modifier::RSuper);
        let list: Vec<_> = m.pressed().collect();
        assert_eq!(list, vec![Modifier::LAlt, Modifier::RSuper]);
    }

    #[test]
    fn shift_is_optional_other_modifiers_are_not() {
        assert!(Modifier::LShift.is_optional());
        assert!(Modifier::RShift.is_optional());
        assert!(!Modifier::LCtrl.is_optional());
        assert!(!Modifier::LSuper.is_optional());
    }

    #[test]
    fn escape_form_feed_and_vertical_tab_are_ignored() {
        assert!(is_ignored_control_char("\u{1b}"));
        assert!(is_ignored_control_char("\u{0c}"));
        assert!(is_ignored_control_char("\u{0b}"));
        assert!(!is_ignored_control_char("a"));
    }
}
