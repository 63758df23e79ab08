// Copyright 2025 the Interkey Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for keyboard input: modifiers, keys, raw messages, and chords.

bitflags::bitflags! {
    /// Modifier keys held down when a key message was produced.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// Either Shift key.
        const SHIFT   = 0b0000_0001;
        /// Either Control key.
        const CONTROL = 0b0000_0010;
        /// Either Alt key.
        const ALT     = 0b0000_0100;
        /// The platform meta key (Windows / Command).
        const META    = 0b0000_1000;
    }
}

impl Modifiers {
    /// Returns true if any command modifier (Control, Alt, or Meta) is held.
    ///
    /// Shift alone does not turn a key into a command; Shift+Tab is still navigation.
    pub const fn is_command(self) -> bool {
        self.intersects(Self::CONTROL.union(Self::ALT).union(Self::META))
    }
}

/// A key, independent of any platform's virtual-key numbering.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// The Tab key.
    Tab,
    /// The Enter / Return key.
    Enter,
    /// The Escape key.
    Escape,
    /// A character key. Chords and messages store letters upper-case; see [`Key::normalized`].
    Char(char),
    /// A function key `F1`..`F24`.
    Function(u8),
    /// Any other key, by host-specific code.
    Other(u16),
}

impl Key {
    /// Build a character key, normalizing letters to upper case.
    ///
    /// Keys name physical keys, so `'a'` and `'A'` are the same key.
    pub const fn char(c: char) -> Self {
        Self::Char(c).normalized()
    }

    /// The same key with any letter payload in upper case.
    ///
    /// Chords and messages normalize on construction, so a key built directly
    /// as `Key::Char('a')` still names the A key.
    pub const fn normalized(self) -> Self {
        match self {
            Self::Char(c) => Self::Char(c.to_ascii_uppercase()),
            other => other,
        }
    }
}

/// The kind of raw keyboard message delivered by the host.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// A key went down.
    KeyDown,
    /// A key went up.
    KeyUp,
    /// A key went down while Alt (or F10) put the host in system-key mode.
    SysKeyDown,
    /// A key went up in system-key mode.
    SysKeyUp,
    /// A translated character.
    Char,
    /// A translated character in system-key mode (Alt+character).
    SysChar,
}

impl MessageKind {
    /// Returns true for key-down style messages (including system key-down).
    pub const fn is_down(self) -> bool {
        matches!(self, Self::KeyDown | Self::SysKeyDown)
    }
}

/// A raw keyboard event record as delivered by host glue.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyMessage {
    /// Message kind.
    pub kind: MessageKind,
    /// The key the message refers to.
    pub key: Key,
    /// Modifier state at the time the message was produced.
    pub modifiers: Modifiers,
}

impl KeyMessage {
    /// A key-down message.
    pub const fn key_down(key: Key, modifiers: Modifiers) -> Self {
        Self {
            kind: MessageKind::KeyDown,
            key: key.normalized(),
            modifiers,
        }
    }

    /// A key-up message.
    pub const fn key_up(key: Key, modifiers: Modifiers) -> Self {
        Self {
            kind: MessageKind::KeyUp,
            key: key.normalized(),
            modifiers,
        }
    }

    /// An Alt+character system message, as hosts deliver mnemonics.
    pub fn sys_char(c: char) -> Self {
        Self {
            kind: MessageKind::SysChar,
            key: Key::char(c),
            modifiers: Modifiers::ALT,
        }
    }

    /// A plain (or Shift) Tab key-down.
    pub const fn tab(shift: bool) -> Self {
        Self {
            kind: MessageKind::KeyDown,
            key: Key::Tab,
            modifiers: if shift {
                Modifiers::SHIFT
            } else {
                Modifiers::empty()
            },
        }
    }

    /// The chord this message would match.
    pub const fn chord(&self) -> Chord {
        Chord::new(self.modifiers, self.key)
    }
}

/// A modifier set plus key, the unit an accelerator is bound to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Chord {
    /// Modifiers that must be held, exactly.
    pub modifiers: Modifiers,
    /// The key.
    pub key: Key,
}

impl Chord {
    /// Create a chord. Letter keys are normalized to upper case.
    pub const fn new(modifiers: Modifiers, key: Key) -> Self {
        Self {
            modifiers,
            key: key.normalized(),
        }
    }

    /// The same chord with its key normalized, for chords built field by field.
    pub const fn normalized(self) -> Self {
        Self::new(self.modifiers, self.key)
    }

    /// Control + character, the common accelerator shape.
    pub const fn ctrl(c: char) -> Self {
        Self::new(Modifiers::CONTROL, Key::char(c))
    }
}

/// Identifier of a command fired by an accelerator.
///
/// The numeric value is opaque to routing; hosts choose their own codes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CommandId(pub u32);

/// Ordering between a Sink's own accelerator table and its focused descendant.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum PrecedenceMode {
    /// Delegate to the focused child first; use local bindings only if it declines.
    #[default]
    ChildFirst,
    /// Try local bindings first; delegate to the focused child only on a miss.
    ParentFirst,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_keys_are_case_insensitive() {
        assert_eq!(Key::char('a'), Key::char('A'));
        assert_eq!(Key::char('a'), Key::Char('A'));
        assert_eq!(Key::char('7'), Key::Char('7'));
        assert_eq!(Key::Function(5).normalized(), Key::Function(5));
    }

    #[test]
    fn hand_built_chords_normalize_their_key() {
        let chord = Chord::new(Modifiers::CONTROL, Key::Char('a'));
        assert_eq!(chord, Chord::ctrl('a'));
        let msg = KeyMessage::key_down(Key::Char('a'), Modifiers::CONTROL);
        assert_eq!(msg.chord(), chord);
        let raw = Chord {
            modifiers: Modifiers::CONTROL,
            key: Key::Char('q'),
        };
        assert_eq!(raw.normalized(), Chord::ctrl('Q'));
    }

    #[test]
    fn shift_alone_is_not_a_command() {
        assert!(!Modifiers::SHIFT.is_command());
        assert!(!Modifiers::empty().is_command());
        assert!(Modifiers::CONTROL.is_command());
        assert!((Modifiers::SHIFT | Modifiers::ALT).is_command());
    }

    #[test]
    fn message_chord_keeps_exact_modifiers() {
        let chord = Chord::ctrl('a');
        let exact = KeyMessage::key_down(Key::char('a'), Modifiers::CONTROL);
        let shifted = KeyMessage::key_down(Key::char('a'), Modifiers::CONTROL | Modifiers::SHIFT);
        assert_eq!(exact.chord(), chord);
        assert_ne!(shifted.chord(), chord);
        assert_ne!(KeyMessage::key_down(Key::char('b'), Modifiers::CONTROL).chord(), chord);
    }

    #[test]
    fn tab_message_carries_shift() {
        assert_eq!(KeyMessage::tab(true).modifiers, Modifiers::SHIFT);
        assert!(KeyMessage::tab(false).modifiers.is_empty());
        assert!(KeyMessage::tab(false).kind.is_down());
        assert!(!KeyMessage::key_up(Key::Tab, Modifiers::empty()).kind.is_down());
    }
}
