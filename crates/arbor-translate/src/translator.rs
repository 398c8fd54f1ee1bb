//! Gate-table translation of experiment descriptions.

use std::f64::consts::FRAC_PI_2;

use arbor_hal::{Experiment, ExperimentInstruction, HalResult, Translator};
use arbor_ir::{
    Circuit, ClassicalCondition, ClbitId, ExecutionTarget, Gate, Instruction, Program, QubitId,
    StandardGate,
};
use tracing::{debug, instrument};

use crate::error::{TranslateError, TranslateResult};

/// Translator for named-instruction experiments.
///
/// Recognized names (case-insensitive):
///
/// | Names | Gate | Params |
/// |-------|------|--------|
/// | `id`, `i` | identity | 0 |
/// | `x`, `y`, `z`, `h`, `s`, `sdg`, `t`, `tdg`, `sx`, `sxdg` | fixed | 0 |
/// | `rx`, `ry`, `rz` | rotation | 1 |
/// | `p`, `u1` | phase | 1 |
/// | `u2` | `U(π/2, φ, λ)` | 2 |
/// | `u3`, `u` | `U(θ, φ, λ)` | 3 |
/// | `cx`, `cy`, `cz`, `ch`, `swap`, `iswap` | fixed | 0 |
/// | `crz` | controlled rotation | 1 |
/// | `cp`, `cu1` | controlled phase | 1 |
/// | `ccx`, `cswap` | fixed | 0 |
/// | `measure`, `reset`, `barrier` | non-unitary | 0 |
#[derive(Debug, Clone, Copy, Default)]
pub struct QobjTranslator;

impl QobjTranslator {
    /// Create a new translator.
    pub fn new() -> Self {
        Self
    }

    /// Build the circuit for `experiment`.
    pub fn circuit(&self, experiment: &Experiment) -> TranslateResult<Circuit> {
        let mut circuit = Circuit::with_size(
            experiment.name(),
            experiment.num_qubits(),
            experiment.num_memory_slots(),
        );
        for (name, size) in &experiment.header.creg_sizes {
            circuit.add_creg(name.as_str(), *size);
        }

        for (index, inst) in experiment.instructions.iter().enumerate() {
            lower_instruction(&mut circuit, inst).map_err(|e| TranslateError::AtInstruction {
                index,
                name: inst.name.clone(),
                source: Box::new(e),
            })?;
        }
        Ok(circuit)
    }
}

impl Translator for QobjTranslator {
    #[instrument(skip_all, fields(experiment = %experiment.name(), instructions = experiment.instructions.len()))]
    fn translate(&self, experiment: &Experiment, target: &ExecutionTarget) -> HalResult<Program> {
        let circuit = self.circuit(experiment)?;
        debug!(
            "Translated into {} qubits, {} clbits, {} instructions",
            circuit.num_qubits(),
            circuit.num_clbits(),
            circuit.len()
        );
        Ok(Program::new(circuit, target.clone()))
    }
}

fn lower_instruction(circuit: &mut Circuit, inst: &ExperimentInstruction) -> TranslateResult<()> {
    let name = inst.name.to_lowercase();
    let qubits = || inst.qubits.iter().copied().map(QubitId);

    match name.as_str() {
        "measure" => {
            reject_condition(inst)?;
            if inst.qubits.is_empty() || inst.qubits.len() != inst.memory.len() {
                return Err(TranslateError::UnpairedMeasurement {
                    qubits: inst.qubits.len(),
                    memory: inst.memory.len(),
                });
            }
            for (&q, &m) in inst.qubits.iter().zip(&inst.memory) {
                circuit.measure(QubitId(q), ClbitId(m))?;
            }
        }
        "reset" => {
            reject_condition(inst)?;
            for q in qubits() {
                circuit.reset(q)?;
            }
        }
        "barrier" => {
            circuit.append(Instruction::barrier(qubits()))?;
        }
        _ => {
            let mut gate = Gate::standard(standard_gate(&name, &inst.params)?);
            if let Some(cond) = &inst.condition {
                gate = gate.with_condition(ClassicalCondition::new(
                    cond.register.as_str(),
                    cond.value,
                ));
            }
            circuit.append(Instruction::gate(gate, qubits()))?;
        }
    }
    Ok(())
}

fn reject_condition(inst: &ExperimentInstruction) -> TranslateResult<()> {
    match inst.condition {
        Some(_) => Err(TranslateError::UnconditionalOnly(inst.name.clone())),
        None => Ok(()),
    }
}

fn standard_gate(name: &str, params: &[f64]) -> TranslateResult<StandardGate> {
    let expect = |expected: usize| {
        if params.len() == expected {
            Ok(())
        } else {
            Err(TranslateError::WrongParameterCount {
                gate: name.to_string(),
                expected,
                got: params.len(),
            })
        }
    };

    let gate = match name {
        "id" | "i" => expect(0).map(|()| StandardGate::I),
        "x" => expect(0).map(|()| StandardGate::X),
        "y" => expect(0).map(|()| StandardGate::Y),
        "z" => expect(0).map(|()| StandardGate::Z),
        "h" => expect(0).map(|()| StandardGate::H),
        "s" => expect(0).map(|()| StandardGate::S),
        "sdg" => expect(0).map(|()| StandardGate::Sdg),
        "t" => expect(0).map(|()| StandardGate::T),
        "tdg" => expect(0).map(|()| StandardGate::Tdg),
        "sx" => expect(0).map(|()| StandardGate::SX),
        "sxdg" => expect(0).map(|()| StandardGate::SXdg),
        "rx" => expect(1).map(|()| StandardGate::Rx(params[0])),
        "ry" => expect(1).map(|()| StandardGate::Ry(params[0])),
        "rz" => expect(1).map(|()| StandardGate::Rz(params[0])),
        "p" | "u1" => expect(1).map(|()| StandardGate::P(params[0])),
        "u2" => expect(2).map(|()| StandardGate::U(FRAC_PI_2, params[0], params[1])),
        "u3" | "u" => expect(3).map(|()| StandardGate::U(params[0], params[1], params[2])),
        "cx" => expect(0).map(|()| StandardGate::CX),
        "cy" => expect(0).map(|()| StandardGate::CY),
        "cz" => expect(0).map(|()| StandardGate::CZ),
        "ch" => expect(0).map(|()| StandardGate::CH),
        "swap" => expect(0).map(|()| StandardGate::Swap),
        "iswap" => expect(0).map(|()| StandardGate::ISwap),
        "crz" => expect(1).map(|()| StandardGate::CRz(params[0])),
        "cp" | "cu1" => expect(1).map(|()| StandardGate::CP(params[0])),
        "ccx" => expect(0).map(|()| StandardGate::CCX),
        "cswap" => expect(0).map(|()| StandardGate::CSwap),
        other => Err(TranslateError::UnknownGate(other.to_string())),
    }?;
    Ok(gate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_hal::HalError;
    use arbor_ir::InstructionKind;
    use proptest::prelude::*;

    fn bell() -> Experiment {
        Experiment::new("Bell", 2, [("c", 2)])
            .push(ExperimentInstruction::gate("h", [0]))
            .push(ExperimentInstruction::gate("cx", [0, 1]))
            .push(ExperimentInstruction::measure(0, 0))
            .push(ExperimentInstruction::measure(1, 1))
    }

    fn translate_err(exp: &Experiment) -> String {
        match QobjTranslator::new().translate(exp, &ExecutionTarget::new(1)) {
            Err(HalError::Translation(msg)) => msg,
            other => panic!("expected translation error, got {other:?}"),
        }
    }

    #[test]
    fn test_translate_bell() {
        let target = ExecutionTarget::new(256).with_seed(Some(3));
        let program = QobjTranslator::new().translate(&bell(), &target).unwrap();

        assert_eq!(program.circuit.name(), "Bell");
        assert_eq!(program.num_qubits(), 2);
        assert_eq!(program.num_clbits(), 2);
        assert_eq!(program.circuit.len(), 4);
        assert_eq!(program.target, target);
        assert!(program.circuit.has_terminal_measurements());
    }

    #[test]
    fn test_gate_aliases() {
        let exp = Experiment::new("aliases", 2, [("c", 1)])
            .push(ExperimentInstruction::parameterized("u1", [0.5], [0]))
            .push(ExperimentInstruction::parameterized("u2", [0.1, 0.2], [0]))
            .push(ExperimentInstruction::parameterized("U", [0.1, 0.2, 0.3], [1]))
            .push(ExperimentInstruction::parameterized("cu1", [0.4], [0, 1]))
            .push(ExperimentInstruction::gate("I", [1]));
        let circuit = QobjTranslator::new().circuit(&exp).unwrap();
        let gates: Vec<_> = circuit
            .instructions()
            .iter()
            .filter_map(|i| i.as_gate().map(|g| g.kind.clone()))
            .collect();

        assert_eq!(
            gates,
            vec![
                StandardGate::P(0.5),
                StandardGate::U(FRAC_PI_2, 0.1, 0.2),
                StandardGate::U(0.1, 0.2, 0.3),
                StandardGate::CP(0.4),
                StandardGate::I,
            ]
        );
    }

    #[test]
    fn test_conditional_gate() {
        let exp = Experiment::new("cond", 1, [("c", 1)])
            .push(ExperimentInstruction::measure(0, 0))
            .push(ExperimentInstruction::gate("x", [0]).when("c", 1));
        let circuit = QobjTranslator::new().circuit(&exp).unwrap();
        let gate = circuit.instructions()[1].as_gate().unwrap();

        assert_eq!(gate.condition, Some(ClassicalCondition::new("c", 1)));
        assert!(!circuit.has_terminal_measurements());
    }

    #[test]
    fn test_multi_qubit_measure_and_barrier() {
        let exp = Experiment::new("m", 2, [("c", 2)])
            .push(ExperimentInstruction::gate("barrier", [0, 1]))
            .push(ExperimentInstruction {
                memory: vec![1, 0],
                ..ExperimentInstruction::gate("measure", [0, 1])
            });
        let circuit = QobjTranslator::new().circuit(&exp).unwrap();
        assert_eq!(circuit.len(), 3);
        assert!(matches!(circuit.instructions()[0].kind, InstructionKind::Barrier));
        assert_eq!(circuit.instructions()[2].clbits, vec![ClbitId(0)]);
    }

    #[test]
    fn test_unknown_gate() {
        let exp = bell().push(ExperimentInstruction::gate("frobnicate", [0]));
        let msg = translate_err(&exp);
        assert!(msg.contains("Unknown gate: frobnicate"));
        assert!(msg.contains("Instruction 4"));
    }

    #[test]
    fn test_wrong_parameter_count() {
        let exp = bell().push(ExperimentInstruction::gate("rx", [0]));
        assert!(translate_err(&exp).contains("expects 1 parameters, got 0"));
    }

    #[test]
    fn test_wrong_arity() {
        let exp = bell().push(ExperimentInstruction::gate("cx", [0]));
        assert!(translate_err(&exp).contains("cx"));
    }

    #[test]
    fn test_non_finite_parameter() {
        let exp = bell().push(ExperimentInstruction::parameterized("rz", [f64::NAN], [0]));
        assert!(translate_err(&exp).contains("rz"));
    }

    #[test]
    fn test_qubit_out_of_range() {
        let exp = bell().push(ExperimentInstruction::gate("x", [7]));
        assert!(translate_err(&exp).contains("q7"));
    }

    #[test]
    fn test_memory_out_of_range() {
        let exp = bell().push(ExperimentInstruction::measure(0, 9));
        assert!(translate_err(&exp).contains("c9"));
    }

    #[test]
    fn test_measure_without_memory() {
        let exp = bell().push(ExperimentInstruction::gate("measure", [0]));
        assert!(translate_err(&exp).contains("1 qubit(s) into 0 memory slot(s)"));
    }

    #[test]
    fn test_unknown_condition_register() {
        let exp = bell().push(ExperimentInstruction::gate("x", [0]).when("flags", 1));
        assert!(translate_err(&exp).contains("flags"));
    }

    #[test]
    fn test_conditioned_measure_rejected() {
        let exp = bell().push(ExperimentInstruction::measure(0, 0).when("c", 1));
        assert!(translate_err(&exp).contains("cannot be classically conditioned"));
    }

    #[test]
    fn test_translate_from_json() {
        let exp: Experiment = serde_json::from_str(
            r#"{
                "header": {"name": "json", "n_qubits": 1, "memory_slots": 1},
                "instructions": [
                    {"name": "ry", "qubits": [0], "params": [1.0]},
                    {"name": "measure", "qubits": [0], "memory": [0]}
                ]
            }"#,
        )
        .unwrap();
        let circuit = QobjTranslator::new().circuit(&exp).unwrap();
        assert_eq!(circuit.num_clbits(), 1);
        assert!(circuit.cregs().is_empty());
    }

    proptest! {
        #[test]
        fn single_qubit_sequences_translate(
            names in prop::collection::vec(
                prop::sample::select(vec!["x", "y", "z", "h", "s", "sdg", "t", "tdg", "sx", "sxdg"]),
                0..32,
            ),
            qubit in 0u32..4,
        ) {
            let mut exp = Experiment::new("seq", 4, [("c", 4)]);
            for name in &names {
                exp = exp.push(ExperimentInstruction::gate(*name, [qubit]));
            }
            let circuit = QobjTranslator::new().circuit(&exp).unwrap();
            prop_assert_eq!(circuit.len(), names.len());
        }
    }
}
