// Copyright 2025 the Interkey Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Accelerator tables: ordered, chord-unique bindings plus a precedence mode.

use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::error::BindingError;
use crate::types::{Chord, CommandId, PrecedenceMode};

/// A single chord → command binding.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Binding {
    /// The chord that fires the command.
    pub chord: Chord,
    /// The command fired.
    pub command: CommandId,
}

/// An ordered set of accelerator bindings, unique by chord.
///
/// Registration order is preserved for iteration; lookups are by chord. The
/// table also carries the [`PrecedenceMode`] its owner uses when deciding
/// whether to try these bindings before or after its focused descendant.
///
/// ```rust
/// use interkey_input::{AcceleratorTable, Chord, CommandId, Key, KeyMessage, Modifiers};
///
/// let mut table = AcceleratorTable::new();
/// table.bind(Chord::ctrl('o'), CommandId(0x42)).unwrap();
///
/// let msg = KeyMessage::key_down(Key::char('o'), Modifiers::CONTROL);
/// assert_eq!(table.lookup(&msg.chord()), Some(CommandId(0x42)));
/// // Chords are unique.
/// assert!(table.bind(Chord::ctrl('O'), CommandId(1)).is_err());
/// ```
#[derive(Clone, Debug, Default)]
pub struct AcceleratorTable {
    bindings: Vec<Binding>,
    by_chord: HashMap<Chord, usize>,
    precedence: PrecedenceMode,
}

impl AcceleratorTable {
    /// Create an empty table with [`PrecedenceMode::ChildFirst`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty table with an explicit precedence mode.
    pub fn with_precedence(precedence: PrecedenceMode) -> Self {
        Self {
            precedence,
            ..Self::default()
        }
    }

    /// Bind `chord` to `command`.
    ///
    /// # Errors
    ///
    /// Returns [`BindingError::DuplicateChord`] if the chord is already bound in this table.
    pub fn bind(&mut self, chord: Chord, command: CommandId) -> Result<(), BindingError> {
        let chord = chord.normalized();
        if let Some(&i) = self.by_chord.get(&chord) {
            return Err(BindingError::DuplicateChord {
                chord,
                existing: self.bindings[i].command,
            });
        }
        self.by_chord.insert(chord, self.bindings.len());
        self.bindings.push(Binding { chord, command });
        Ok(())
    }

    /// Look up the command bound to `chord`.
    pub fn lookup(&self, chord: &Chord) -> Option<CommandId> {
        self.by_chord
            .get(&chord.normalized())
            .map(|&i| self.bindings[i].command)
    }

    /// Return the binding for `chord`, if any.
    pub fn binding(&self, chord: &Chord) -> Option<Binding> {
        self.by_chord
            .get(&chord.normalized())
            .map(|&i| self.bindings[i])
    }

    /// Iterate bindings in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Binding> + '_ {
        self.bindings.iter()
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns true if the table has no bindings.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// The precedence mode of the table's owner.
    pub fn precedence(&self) -> PrecedenceMode {
        self.precedence
    }

    /// Change the precedence mode.
    pub fn set_precedence(&mut self, precedence: PrecedenceMode) {
        self.precedence = precedence;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Key, KeyMessage, Modifiers};
    use alloc::vec;

    #[test]
    fn iteration_keeps_registration_order() {
        let mut table = AcceleratorTable::new();
        table.bind(Chord::ctrl('w'), CommandId(0xFF)).unwrap();
        table.bind(Chord::ctrl('o'), CommandId(0x42)).unwrap();
        table.bind(Chord::ctrl('a'), CommandId(7)).unwrap();
        let order: Vec<u32> = table.iter().map(|b| b.command.0).collect();
        assert_eq!(order, vec![0xFF, 0x42, 7]);
    }

    #[test]
    fn duplicate_chord_reports_existing_command() {
        let mut table = AcceleratorTable::new();
        table.bind(Chord::ctrl('o'), CommandId(0x42)).unwrap();
        let err = table.bind(Chord::ctrl('o'), CommandId(1)).unwrap_err();
        assert_eq!(
            err,
            BindingError::DuplicateChord {
                chord: Chord::ctrl('o'),
                existing: CommandId(0x42),
            }
        );
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn lookup_requires_exact_modifiers() {
        let mut table = AcceleratorTable::new();
        table.bind(Chord::ctrl('s'), CommandId(9)).unwrap();
        let shifted = KeyMessage::key_down(Key::char('s'), Modifiers::CONTROL | Modifiers::SHIFT);
        assert_eq!(table.lookup(&shifted.chord()), None);
        let exact = KeyMessage::key_down(Key::char('s'), Modifiers::CONTROL);
        assert_eq!(table.lookup(&exact.chord()), Some(CommandId(9)));
    }

    #[test]
    fn field_built_chords_bind_and_look_up_normalized() {
        let mut table = AcceleratorTable::new();
        let raw = Chord {
            modifiers: Modifiers::CONTROL,
            key: Key::Char('a'),
        };
        table.bind(raw, CommandId(1)).unwrap();
        assert_eq!(table.lookup(&Chord::ctrl('a')), Some(CommandId(1)));
        assert_eq!(table.binding(&raw).map(|b| b.chord), Some(Chord::ctrl('A')));
        assert!(table.bind(Chord::ctrl('A'), CommandId(2)).is_err());
    }

    #[test]
    fn precedence_defaults_to_child_first() {
        let mut table = AcceleratorTable::new();
        assert_eq!(table.precedence(), PrecedenceMode::ChildFirst);
        table.set_precedence(PrecedenceMode::ParentFirst);
        assert_eq!(table.precedence(), PrecedenceMode::ParentFirst);
        assert_eq!(
            AcceleratorTable::with_precedence(PrecedenceMode::ParentFirst).precedence(),
            PrecedenceMode::ParentFirst
        );
    }
}
