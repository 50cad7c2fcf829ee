use crate::{SequencerAction, SequencerState, MAX_STEPS};

/// Small linear congruential generator for pattern randomization.
///
/// Seeded explicitly by the caller so a randomized pattern can be reproduced.
#[derive(Debug, Clone)]
pub struct Lcg {
    state: u64,
}

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Uniform value in [0, 1].
    pub fn next_f32(&mut self) -> f32 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((self.state >> 32) as u32 as f32) / (u32::MAX as f32)
    }
}

pub(super) fn reduce(action: &SequencerAction, state: &mut SequencerState) -> bool {
    match action {
        SequencerAction::ToggleRun => {
            state.running = !state.running;
            true
        }
        SequencerAction::SetRunning(running) => {
            let changed = state.running != *running;
            state.running = *running;
            changed
        }
        SequencerAction::ToggleGate(step) => match state.gates.get_mut(*step) {
            Some(gate) => {
                *gate = !*gate;
                true
            }
            None => false,
        },
        SequencerAction::SetGate(step, on) => match state.gates.get_mut(*step) {
            Some(gate) => {
                let changed = *gate != *on;
                *gate = *on;
                changed
            }
            None => false,
        },
        SequencerAction::SetGateMode(mode) => {
            let changed = state.gate_mode != *mode;
            state.gate_mode = *mode;
            changed
        }
        SequencerAction::CycleGateMode => {
            state.gate_mode = state.gate_mode.next();
            true
        }
        SequencerAction::ClearGates => {
            let changed = state.gates.iter().any(|g| *g);
            state.gates = [false; MAX_STEPS];
            changed
        }
        SequencerAction::RandomizeGates { seed } => {
            let mut rng = Lcg::new(*seed);
            let before = state.gates;
            for gate in state.gates.iter_mut() {
                *gate = rng.next_f32() > 0.5;
            }
            before != state.gates
        }
        // Edit mode lives outside SequencerState; handled by reduce_action.
        SequencerAction::SetEditMode(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reduce::reduce_action;
    use crate::{EditMode, GateMode};

    fn apply(action: SequencerAction, state: &mut SequencerState) -> bool {
        let mut edit_mode = EditMode::default();
        reduce_action(&action, state, &mut edit_mode)
    }

    #[test]
    fn toggle_run_flips_each_press() {
        let mut state = SequencerState::new();
        apply(SequencerAction::ToggleRun, &mut state);
        assert!(state.running);
        apply(SequencerAction::ToggleRun, &mut state);
        assert!(!state.running);
    }

    #[test]
    fn set_running_reports_change() {
        let mut state = SequencerState::new();
        assert!(apply(SequencerAction::SetRunning(true), &mut state));
        assert!(!apply(SequencerAction::SetRunning(true), &mut state));
    }

    #[test]
    fn toggle_gate_ignores_out_of_range() {
        let mut state = SequencerState::new();
        assert!(apply(SequencerAction::ToggleGate(3), &mut state));
        assert!(state.gates[3]);
        assert!(!apply(SequencerAction::ToggleGate(MAX_STEPS), &mut state));
        assert!(!apply(SequencerAction::SetGate(99, true), &mut state));
        assert_eq!(state.active_gate_count(), 1);
    }

    #[test]
    fn clear_gates_disables_all() {
        let mut state = SequencerState::new();
        state.gates = [true; MAX_STEPS];
        assert!(apply(SequencerAction::ClearGates, &mut state));
        assert_eq!(state.active_gate_count(), 0);
        assert!(!apply(SequencerAction::ClearGates, &mut state));
    }

    #[test]
    fn gate_mode_actions() {
        let mut state = SequencerState::new();
        apply(SequencerAction::CycleGateMode, &mut state);
        assert_eq!(state.gate_mode, GateMode::Retrigger);
        apply(SequencerAction::SetGateMode(GateMode::Gate), &mut state);
        assert_eq!(state.gate_mode, GateMode::Gate);
    }

    #[test]
    fn randomize_is_reproducible_per_seed() {
        let mut a = SequencerState::new();
        let mut b = SequencerState::new();
        apply(SequencerAction::RandomizeGates { seed: 42 }, &mut a);
        apply(SequencerAction::RandomizeGates { seed: 42 }, &mut b);
        assert_eq!(a.gates, b.gates);
        assert!(a.active_gate_count() > 0);
        assert!(a.active_gate_count() < MAX_STEPS);
    }

    #[test]
    fn randomize_leaves_transport_flags_alone() {
        let mut state = SequencerState::new();
        state.running = true;
        state.gate_mode = GateMode::Gate;
        apply(SequencerAction::RandomizeGates { seed: 7 }, &mut state);
        assert!(state.running);
        assert_eq!(state.gate_mode, GateMode::Gate);
    }

    #[test]
    fn lcg_stays_in_unit_range() {
        let mut rng = Lcg::new(0);
        for _ in 0..1000 {
            let r = rng.next_f32();
            assert!((0.0..=1.0).contains(&r));
        }
    }

    #[test]
    fn edit_mode_is_reduced_separately() {
        let mut state = SequencerState::new();
        let mut edit_mode = EditMode::Pitch;
        assert!(reduce_action(
            &SequencerAction::SetEditMode(EditMode::Gate),
            &mut state,
            &mut edit_mode
        ));
        assert_eq!(edit_mode, EditMode::Gate);
        assert_eq!(state, SequencerState::new());
    }
}
