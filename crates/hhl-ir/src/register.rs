//! Bit identifiers and named registers.
//!
//! Quantum and classical bits share one shape: a dense id plus, when the bit
//! was declared through a register, its `(register, index)` slot. Registers
//! are handles listing the ids they own, so a sub-circuit built on
//! [`Circuit::empty_like`](crate::Circuit::empty_like) addresses the same
//! wires as its parent.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Qubit id. Qubit `k` is bit `k` of a statevector basis index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QubitId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClbitId(pub u32);

/// Common behaviour of [`QubitId`] and [`ClbitId`].
pub trait BitId: Copy + Eq + fmt::Display {
    /// OpenQASM declaration keyword for a register of these bits.
    const DECL: &'static str;

    fn from_index(index: u32) -> Self;

    fn index(self) -> u32;
}

impl BitId for QubitId {
    const DECL: &'static str = "qreg";

    fn from_index(index: u32) -> Self {
        QubitId(index)
    }

    fn index(self) -> u32 {
        self.0
    }
}

impl BitId for ClbitId {
    const DECL: &'static str = "creg";

    fn from_index(index: u32) -> Self {
        ClbitId(index)
    }

    fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl fmt::Display for ClbitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// A bit of a circuit and its register slot, if any.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bit<I> {
    pub id: I,
    pub slot: Option<(String, u32)>,
}

pub type Qubit = Bit<QubitId>;
pub type Clbit = Bit<ClbitId>;

impl<I: BitId> Bit<I> {
    pub fn loose(id: I) -> Self {
        Self { id, slot: None }
    }

    pub fn in_register(id: I, register: impl Into<String>, index: u32) -> Self {
        Self {
            id,
            slot: Some((register.into(), index)),
        }
    }

    pub fn register(&self) -> Option<&str> {
        self.slot.as_ref().map(|(name, _)| name.as_str())
    }
}

impl<I: BitId> fmt::Display for Bit<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.slot {
            Some((name, index)) => write!(f, "{name}[{index}]"),
            None => self.id.fmt(f),
        }
    }
}

/// A named, ordered group of bits; index 0 is the least significant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Register<I> {
    name: String,
    bits: Vec<I>,
}

pub type QuantumRegister = Register<QubitId>;
pub type ClassicalRegister = Register<ClbitId>;

impl<I: BitId> Register<I> {
    pub(crate) fn new(name: impl Into<String>, bits: Vec<I>) -> Self {
        Self {
            name: name.into(),
            bits,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bits(&self) -> &[I] {
        &self.bits
    }

    pub fn get(&self, index: usize) -> Option<I> {
        self.bits.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }
}

impl QuantumRegister {
    pub fn qubits(&self) -> &[QubitId] {
        self.bits()
    }

    pub fn qubit(&self, index: usize) -> Option<QubitId> {
        self.get(index)
    }
}

impl ClassicalRegister {
    pub fn clbits(&self) -> &[ClbitId] {
        self.bits()
    }

    pub fn clbit(&self, index: usize) -> Option<ClbitId> {
        self.get(index)
    }
}

impl<I: BitId> fmt::Display for Register<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}[{}]", I::DECL, self.name, self.bits.len())
    }
}
