// Copyright 2025 the Interkey Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mnemonic sets: the Alt+letter shortcuts a Sink answers to.

use smallvec::SmallVec;

use crate::error::BindingError;
use crate::types::Modifiers;

/// One registered mnemonic.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Mnemonic {
    /// The character, stored lower-case.
    pub letter: char,
    /// Modifiers that must be held exactly. Defaults to Alt.
    pub modifiers: Modifiers,
}

/// The mnemonics one Sink owns.
///
/// Matching is case-insensitive on the letter and exact on modifiers.
#[derive(Clone, Debug, Default)]
pub struct MnemonicSet {
    entries: SmallVec<[Mnemonic; 4]>,
}

impl MnemonicSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mnemonic. Hosts usually pass [`Modifiers::ALT`].
    ///
    /// # Errors
    ///
    /// Returns [`BindingError::NotAMnemonic`] for non-alphanumeric characters and
    /// [`BindingError::DuplicateMnemonic`] if the same letter and modifiers are
    /// already registered.
    pub fn add(&mut self, letter: char, modifiers: Modifiers) -> Result<(), BindingError> {
        if !letter.is_ascii_alphanumeric() {
            return Err(BindingError::NotAMnemonic(letter));
        }
        let m = Mnemonic {
            letter: letter.to_ascii_lowercase(),
            modifiers,
        };
        if self.entries.contains(&m) {
            return Err(BindingError::DuplicateMnemonic {
                letter: m.letter,
                modifiers,
            });
        }
        self.entries.push(m);
        Ok(())
    }

    /// Returns true if `letter` under exactly `modifiers` is registered.
    pub fn matches(&self, letter: char, modifiers: Modifiers) -> bool {
        let letter = letter.to_ascii_lowercase();
        self.entries
            .iter()
            .any(|m| m.letter == letter && m.modifiers == modifiers)
    }

    /// Iterate registered mnemonics in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Mnemonic> + '_ {
        self.entries.iter()
    }

    /// Number of registered mnemonics.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no mnemonics are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
