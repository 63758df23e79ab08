// Copyright 2025 the Interkey Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::types::{Chord, CommandId, Modifiers};

/// Errors raised while registering accelerators or mnemonics.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BindingError {
    /// The chord is already bound in the same table.
    #[error("chord {chord:?} is already bound to {existing:?}")]
    DuplicateChord {
        /// The chord being registered.
        chord: Chord,
        /// The command it is already bound to.
        existing: CommandId,
    },
    /// The mnemonic is already registered in the same set.
    #[error("mnemonic {letter:?} with {modifiers:?} is already registered")]
    DuplicateMnemonic {
        /// The (lower-cased) mnemonic character.
        letter: char,
        /// The modifiers it was registered with.
        modifiers: Modifiers,
    },
    /// Mnemonics must be alphanumeric characters.
    #[error("{0:?} cannot be used as a mnemonic")]
    NotAMnemonic(char),
}
