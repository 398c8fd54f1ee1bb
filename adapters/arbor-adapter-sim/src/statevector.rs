//! Statevector simulation engine.
//!
//! Basis index `k` encodes qubit `j` in bit `j` of `k`.

use num_complex::Complex64;
use rand::Rng;
use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_4};

use arbor_ir::StandardGate;

type Matrix2 = [[Complex64; 2]; 2];

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);
const I: Complex64 = Complex64::new(0.0, 1.0);

fn diag(phase: Complex64) -> Matrix2 {
    [[ONE, ZERO], [ZERO, phase]]
}

fn real(m: [[f64; 2]; 2]) -> Matrix2 {
    m.map(|row| row.map(|v| Complex64::new(v, 0.0)))
}

fn rx(theta: f64) -> Matrix2 {
    let c = Complex64::new((theta / 2.0).cos(), 0.0);
    let s = Complex64::new(0.0, -(theta / 2.0).sin());
    [[c, s], [s, c]]
}

fn ry(theta: f64) -> Matrix2 {
    let (s, c) = (theta / 2.0).sin_cos();
    real([[c, -s], [s, c]])
}

fn rz(theta: f64) -> Matrix2 {
    [
        [Complex64::from_polar(1.0, -theta / 2.0), ZERO],
        [ZERO, Complex64::from_polar(1.0, theta / 2.0)],
    ]
}

fn u(theta: f64, phi: f64, lambda: f64) -> Matrix2 {
    let (s, c) = (theta / 2.0).sin_cos();
    [
        [Complex64::new(c, 0.0), -Complex64::from_polar(s, lambda)],
        [
            Complex64::from_polar(s, phi),
            Complex64::from_polar(c, phi + lambda),
        ],
    ]
}

fn sx(sign: f64) -> Matrix2 {
    let a = Complex64::new(0.5, 0.5 * sign);
    let b = Complex64::new(0.5, -0.5 * sign);
    [[a, b], [b, a]]
}

/// The 2x2 unitary of a single-qubit gate.
fn single_qubit_matrix(gate: &StandardGate) -> Option<Matrix2> {
    let m = match gate {
        StandardGate::I => diag(ONE),
        StandardGate::X => real([[0.0, 1.0], [1.0, 0.0]]),
        StandardGate::Y => [[ZERO, -I], [I, ZERO]],
        StandardGate::Z => diag(-ONE),
        StandardGate::H => real([[FRAC_1_SQRT_2, FRAC_1_SQRT_2], [FRAC_1_SQRT_2, -FRAC_1_SQRT_2]]),
        StandardGate::S => diag(I),
        StandardGate::Sdg => diag(-I),
        StandardGate::T => diag(Complex64::from_polar(1.0, FRAC_PI_4)),
        StandardGate::Tdg => diag(Complex64::from_polar(1.0, -FRAC_PI_4)),
        StandardGate::SX => sx(1.0),
        StandardGate::SXdg => sx(-1.0),
        StandardGate::Rx(t) => rx(*t),
        StandardGate::Ry(t) => ry(*t),
        StandardGate::Rz(t) => rz(*t),
        StandardGate::P(t) => diag(Complex64::from_polar(1.0, *t)),
        StandardGate::U(t, p, l) => u(*t, *p, *l),
        _ => return None,
    };
    Some(m)
}

/// A statevector representing a quantum state.
#[derive(Debug, Clone)]
pub struct Statevector {
    amplitudes: Vec<Complex64>,
    num_qubits: usize,
}

impl Statevector {
    /// Create a new statevector initialized to |0...0⟩.
    pub fn new(num_qubits: usize) -> Self {
        let mut amplitudes = vec![ZERO; 1 << num_qubits];
        amplitudes[0] = ONE;
        Self {
            amplitudes,
            num_qubits,
        }
    }

    /// Number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Amplitudes in basis order.
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Consume the state, returning its amplitudes.
    pub fn into_amplitudes(self) -> Vec<Complex64> {
        self.amplitudes
    }

    /// Apply a gate to `qubits` (controls first, as in the gate table).
    pub fn apply_gate(&mut self, gate: &StandardGate, qubits: &[usize]) {
        if let Some(m) = single_qubit_matrix(gate) {
            self.apply_controlled(0, qubits[0], &m);
            return;
        }
        match gate {
            StandardGate::CX => self.apply_controlled(1 << qubits[0], qubits[1], &single(&StandardGate::X)),
            StandardGate::CY => self.apply_controlled(1 << qubits[0], qubits[1], &single(&StandardGate::Y)),
            StandardGate::CZ => self.apply_controlled(1 << qubits[0], qubits[1], &diag(-ONE)),
            StandardGate::CH => self.apply_controlled(1 << qubits[0], qubits[1], &single(&StandardGate::H)),
            StandardGate::CRz(t) => self.apply_controlled(1 << qubits[0], qubits[1], &rz(*t)),
            StandardGate::CP(t) => {
                self.apply_controlled(1 << qubits[0], qubits[1], &diag(Complex64::from_polar(1.0, *t)));
            }
            StandardGate::Swap => self.apply_swap(0, qubits[0], qubits[1], ONE),
            StandardGate::ISwap => self.apply_swap(0, qubits[0], qubits[1], I),
            StandardGate::CCX => self.apply_controlled(
                (1 << qubits[0]) | (1 << qubits[1]),
                qubits[2],
                &single(&StandardGate::X),
            ),
            StandardGate::CSwap => self.apply_swap(1 << qubits[0], qubits[1], qubits[2], ONE),
            _ => {}
        }
    }

    /// Apply `m` to `target` on the subspace where every bit of
    /// `controls` is set.
    fn apply_controlled(&mut self, controls: usize, target: usize, m: &Matrix2) {
        let tgt_mask = 1 << target;
        for i in 0..self.amplitudes.len() {
            if i & tgt_mask == 0 && i & controls == controls {
                let j = i | tgt_mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = m[0][0] * a + m[0][1] * b;
                self.amplitudes[j] = m[1][0] * a + m[1][1] * b;
            }
        }
    }

    /// Exchange `|..1..0..⟩` and `|..0..1..⟩` on `q1`, `q2`, multiplying
    /// both by `phase`.
    fn apply_swap(&mut self, controls: usize, q1: usize, q2: usize, phase: Complex64) {
        let mask1 = 1 << q1;
        let mask2 = 1 << q2;
        for i in 0..self.amplitudes.len() {
            if i & controls == controls && i & mask1 != 0 && i & mask2 == 0 {
                let j = (i & !mask1) | mask2;
                let a = self.amplitudes[i];
                self.amplitudes[i] = phase * self.amplitudes[j];
                self.amplitudes[j] = phase * a;
            }
        }
    }

    /// Probability of reading `1` on `qubit`.
    pub fn probability_one(&self, qubit: usize) -> f64 {
        let mask = 1 << qubit;
        self.amplitudes
            .iter()
            .enumerate()
            .filter(|(i, _)| i & mask != 0)
            .map(|(_, a)| a.norm_sqr())
            .sum()
    }

    /// Project `qubit` onto `outcome` and renormalize.
    fn collapse(&mut self, qubit: usize, outcome: bool, probability: f64) {
        let mask = 1 << qubit;
        let scale = if probability > 0.0 {
            1.0 / probability.sqrt()
        } else {
            0.0
        };
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if (i & mask != 0) == outcome {
                *amp *= scale;
            } else {
                *amp = ZERO;
            }
        }
    }

    /// Measure `qubit`, collapsing the state. Returns the bit read.
    pub fn measure<R: Rng>(&mut self, qubit: usize, rng: &mut R) -> u8 {
        let p1 = self.probability_one(qubit);
        let outcome = rng.r#gen::<f64>() < p1;
        let probability = if outcome { p1 } else { 1.0 - p1 };
        self.collapse(qubit, outcome, probability);
        u8::from(outcome)
    }

    /// Reset `qubit` to |0⟩: measure, then flip on a `1`.
    pub fn reset<R: Rng>(&mut self, qubit: usize, rng: &mut R) {
        if self.measure(qubit, rng) == 1 {
            self.apply_controlled(0, qubit, &single(&StandardGate::X));
        }
    }

    /// Cumulative Born-rule distribution over basis states.
    pub fn cumulative_probabilities(&self) -> Vec<f64> {
        self.amplitudes
            .iter()
            .scan(0.0, |acc, a| {
                *acc += a.norm_sqr();
                Some(*acc)
            })
            .collect()
    }
}

/// Sample a basis index from a cumulative distribution.
pub fn sample_index<R: Rng>(cumulative: &[f64], rng: &mut R) -> usize {
    let total = cumulative.last().copied().unwrap_or(0.0);
    let r = rng.r#gen::<f64>() * total;
    cumulative
        .partition_point(|&c| c <= r)
        .min(cumulative.len().saturating_sub(1))
}

fn single(gate: &StandardGate) -> Matrix2 {
    single_qubit_matrix(gate).unwrap_or_else(|| diag(ONE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::f64::consts::PI;

    fn approx_eq(a: Complex64, b: Complex64) -> bool {
        (a - b).norm() < 1e-10
    }

    fn assert_state(sv: &Statevector, expected: &[Complex64]) {
        for (i, (a, e)) in sv.amplitudes().iter().zip(expected).enumerate() {
            assert!(approx_eq(*a, *e), "amplitude {i}: {a} != {e}");
        }
    }

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn test_initial_state() {
        let sv = Statevector::new(2);
        assert_state(&sv, &[c(1.0, 0.0), ZERO, ZERO, ZERO]);
    }

    #[test]
    fn test_hadamard() {
        let mut sv = Statevector::new(1);
        sv.apply_gate(&StandardGate::H, &[0]);
        assert_state(&sv, &[c(FRAC_1_SQRT_2, 0.0), c(FRAC_1_SQRT_2, 0.0)]);
    }

    #[test]
    fn test_bell_state() {
        let mut sv = Statevector::new(2);
        sv.apply_gate(&StandardGate::H, &[0]);
        sv.apply_gate(&StandardGate::CX, &[0, 1]);
        assert_state(
            &sv,
            &[c(FRAC_1_SQRT_2, 0.0), ZERO, ZERO, c(FRAC_1_SQRT_2, 0.0)],
        );
    }

    #[test]
    fn test_qubit_order() {
        let mut sv = Statevector::new(3);
        sv.apply_gate(&StandardGate::X, &[1]);
        assert!(approx_eq(sv.amplitudes()[0b010], ONE));
    }

    #[test]
    fn test_sx_squared_is_x() {
        let mut sv = Statevector::new(1);
        sv.apply_gate(&StandardGate::SX, &[0]);
        sv.apply_gate(&StandardGate::SX, &[0]);
        assert_state(&sv, &[ZERO, ONE]);
    }

    #[test]
    fn test_u_matches_rotations() {
        let mut a = Statevector::new(1);
        a.apply_gate(&StandardGate::U(PI / 3.0, 0.0, 0.0), &[0]);
        let mut b = Statevector::new(1);
        b.apply_gate(&StandardGate::Ry(PI / 3.0), &[0]);
        assert_state(&a, b.amplitudes());
    }

    #[test]
    fn test_toffoli_and_fredkin() {
        let mut sv = Statevector::new(3);
        sv.apply_gate(&StandardGate::X, &[0]);
        sv.apply_gate(&StandardGate::X, &[1]);
        sv.apply_gate(&StandardGate::CCX, &[0, 1, 2]);
        assert!(approx_eq(sv.amplitudes()[0b111], ONE));

        sv.apply_gate(&StandardGate::X, &[1]);
        sv.apply_gate(&StandardGate::CSwap, &[0, 2, 1]);
        assert!(approx_eq(sv.amplitudes()[0b011], ONE));
    }

    #[test]
    fn test_iswap_phase() {
        let mut sv = Statevector::new(2);
        sv.apply_gate(&StandardGate::X, &[0]);
        sv.apply_gate(&StandardGate::ISwap, &[0, 1]);
        assert!(approx_eq(sv.amplitudes()[0b10], I));
    }

    #[test]
    fn test_measure_collapses() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut sv = Statevector::new(2);
        sv.apply_gate(&StandardGate::H, &[0]);
        sv.apply_gate(&StandardGate::CX, &[0, 1]);

        let first = sv.measure(0, &mut rng);
        let second = sv.measure(1, &mut rng);
        assert_eq!(first, second);
        assert!((sv.cumulative_probabilities().last().unwrap() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_reset() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..20 {
            let mut sv = Statevector::new(1);
            sv.apply_gate(&StandardGate::H, &[0]);
            sv.reset(0, &mut rng);
            assert_state(&sv, &[ONE, ZERO]);
        }
    }

    #[test]
    fn test_sample_deterministic() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut sv = Statevector::new(2);
        sv.apply_gate(&StandardGate::X, &[1]);
        let cumulative = sv.cumulative_probabilities();
        for _ in 0..100 {
            assert_eq!(sample_index(&cumulative, &mut rng), 2);
        }
    }
}
