//! The typed error taxonomy surfaced by every fallible operation in the core.

use thiserror::Error;

/// The kind of code a [`Error::Domain`] error was given instead of a valid one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DomainKind {
    Register,
    RegisterPair,
    Flag,
    Condition,
}

impl std::fmt::Display for DomainKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            DomainKind::Register => "register",
            DomainKind::RegisterPair => "register pair",
            DomainKind::Flag => "flag",
            DomainKind::Condition => "condition code",
        })
    }
}

/// `IN` or `OUT`, for [`Error::IoPort`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IoDirection {
    In,
    Out,
}

impl std::fmt::Display for IoDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            IoDirection::In => "IN",
            IoDirection::Out => "OUT",
        })
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("address {address:#06x} is outside memory bounds [0, {size:#06x})")]
    Addressing { address: u16, size: usize },

    #[error("no decode rule matches opcode byte {opcode:#04x}")]
    Decode { opcode: u8 },

    #[error("cannot encode '{mnemonic}': {reason}")]
    Encode { mnemonic: String, reason: String },

    #[error("{direction} on port {port:#04x} has no host-installed handler")]
    IoPort { port: u8, direction: IoDirection },

    #[error("invalid {kind} code {code:#04x}")]
    Domain { kind: DomainKind, code: u8 },

    #[error("interrupt trap '{id}' is already registered")]
    DuplicateTrap { id: String },
}

pub type Result<T> = std::result::Result<T, Error>;
