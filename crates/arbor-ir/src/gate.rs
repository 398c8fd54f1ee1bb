//! Gate table of the structured program representation.

use serde::{Deserialize, Serialize};

/// Gates understood by every execution resource.
///
/// Angles are bound and in radians. Controlled gates list their controls
/// before their targets, so `CX` on `[a, b]` flips `b` when `a` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    I,
    X,
    Y,
    Z,
    H,
    /// Phase of π/2.
    S,
    Sdg,
    /// Phase of π/4.
    T,
    Tdg,
    /// Square root of X.
    SX,
    SXdg,
    Rx(f64),
    Ry(f64),
    Rz(f64),
    /// Phase shift on |1⟩.
    P(f64),
    /// Generic single-qubit rotation U(θ, φ, λ).
    U(f64, f64, f64),
    CX,
    CY,
    CZ,
    CH,
    Swap,
    ISwap,
    CRz(f64),
    CP(f64),
    /// Toffoli.
    CCX,
    /// Fredkin.
    CSwap,
}

impl StandardGate {
    /// Lowercase name and operand count.
    fn signature(&self) -> (&'static str, u32) {
        use StandardGate::*;
        match self {
            I => ("id", 1),
            X => ("x", 1),
            Y => ("y", 1),
            Z => ("z", 1),
            H => ("h", 1),
            S => ("s", 1),
            Sdg => ("sdg", 1),
            T => ("t", 1),
            Tdg => ("tdg", 1),
            SX => ("sx", 1),
            SXdg => ("sxdg", 1),
            Rx(_) => ("rx", 1),
            Ry(_) => ("ry", 1),
            Rz(_) => ("rz", 1),
            P(_) => ("p", 1),
            U(..) => ("u", 1),
            CX => ("cx", 2),
            CY => ("cy", 2),
            CZ => ("cz", 2),
            CH => ("ch", 2),
            Swap => ("swap", 2),
            ISwap => ("iswap", 2),
            CRz(_) => ("crz", 2),
            CP(_) => ("cp", 2),
            CCX => ("ccx", 3),
            CSwap => ("cswap", 3),
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.signature().0
    }

    /// Number of qubit operands, controls included.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        self.signature().1
    }

    /// Bound angles, in declaration order.
    pub fn parameters(&self) -> Vec<f64> {
        use StandardGate::*;
        match *self {
            Rx(a) | Ry(a) | Rz(a) | P(a) | CRz(a) | CP(a) => vec![a],
            U(theta, phi, lambda) => vec![theta, phi, lambda],
            _ => vec![],
        }
    }
}

/// Fires a gate only when the named register, read as an unsigned integer
/// with clbit `offset + i` as bit `i`, equals `value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassicalCondition {
    pub register: String,
    pub value: u64,
}

impl ClassicalCondition {
    pub fn new(register: impl Into<String>, value: u64) -> Self {
        Self {
            register: register.into(),
            value,
        }
    }
}

/// A gate, optionally guarded by a [`ClassicalCondition`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    pub kind: StandardGate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<ClassicalCondition>,
}

impl Gate {
    /// Unconditional gate.
    pub fn standard(kind: StandardGate) -> Self {
        Self {
            kind,
            condition: None,
        }
    }

    #[must_use]
    pub fn with_condition(self, condition: ClassicalCondition) -> Self {
        Self {
            condition: Some(condition),
            ..self
        }
    }

    pub fn name(&self) -> &str {
        self.kind.name()
    }

    pub fn num_qubits(&self) -> u32 {
        self.kind.num_qubits()
    }
}

impl From<StandardGate> for Gate {
    fn from(kind: StandardGate) -> Self {
        Self::standard(kind)
    }
}
