use crate::utils::logger::log_state_transition;
use std::fmt;

/// Coarse phase of the selection monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub enum MonitorPhase {
    #[default]
    Stopped,
    /// Hooks installed, nothing in flight
    Idle,
    /// Left button held, tracking a possible drag
    Pressing,
    /// Copy, clipboard check or popup display pending
    AwaitingCopy,
    PopupShown,
}

#[derive(Debug, Clone)]
pub struct StateTransitionError {
    from: MonitorPhase,
    to: MonitorPhase,
}

impl fmt::Display for StateTransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid monitor transition from {:?} to {:?}",
            self.from, self.to
        )
    }
}

impl std::error::Error for StateTransitionError {}

/// Validated phase tracking for the selection monitor
pub struct MonitorStateMachine {
    current_phase: MonitorPhase,
}

impl Default for MonitorStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl MonitorStateMachine {
    pub fn new() -> Self {
        Self {
            current_phase: MonitorPhase::Stopped,
        }
    }

    pub fn current(&self) -> MonitorPhase {
        self.current_phase
    }

    /// Validate and perform a phase transition
    pub fn transition_to(&mut self, new_phase: MonitorPhase) -> Result<(), StateTransitionError> {
        if new_phase == self.current_phase {
            return Ok(());
        }

        let valid = Self::is_valid_transition(self.current_phase, new_phase);
        log_state_transition(
            "selection",
            &format!("{:?}", self.current_phase),
            &format!("{:?}", new_phase),
            valid,
            None,
        );

        if valid {
            self.current_phase = new_phase;
            Ok(())
        } else {
            Err(StateTransitionError {
                from: self.current_phase,
                to: new_phase,
            })
        }
    }

    fn is_valid_transition(from: MonitorPhase, to: MonitorPhase) -> bool {
        use MonitorPhase::*;

        match (from, to) {
            (a, b) if a == b => true,

            // Stop is always allowed; start always lands in Idle
            (_, Stopped) => true,
            (Stopped, Idle) => true,
            (Stopped, _) => false,

            // The popup only appears when its display debounce fires, or is
            // already up underneath a press that landed on it
            (AwaitingCopy, PopupShown) => true,
            (Pressing, PopupShown) => true,
            (Idle, PopupShown) => false,

            // Presses, copy cycles and dismissals interleave freely
            (Idle | Pressing | AwaitingCopy | PopupShown, Idle | Pressing | AwaitingCopy) => true,

            _ => false,
        }
    }

    /// Force the phase without validation (use with caution)
    pub(crate) fn force_phase(&mut self, phase: MonitorPhase) {
        log::warn!(
            "[FLOW] FORCE setting monitor phase from {:?} to {:?}",
            self.current_phase,
            phase
        );
        self.current_phase = phase;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_cycle() {
        let mut sm = MonitorStateMachine::new();

        assert!(sm.transition_to(MonitorPhase::Idle).is_ok());
        assert!(sm.transition_to(MonitorPhase::Pressing).is_ok());
        assert!(sm.transition_to(MonitorPhase::AwaitingCopy).is_ok());
        assert!(sm.transition_to(MonitorPhase::PopupShown).is_ok());
        assert!(sm.transition_to(MonitorPhase::Pressing).is_ok());
        assert!(sm.transition_to(MonitorPhase::Idle).is_ok());
        assert_eq!(sm.current(), MonitorPhase::Idle);
    }

    #[test]
    fn test_stopped_only_leads_to_idle() {
        let mut sm = MonitorStateMachine::new();

        assert!(sm.transition_to(MonitorPhase::Pressing).is_err());
        assert!(sm.transition_to(MonitorPhase::PopupShown).is_err());
        assert!(sm.transition_to(MonitorPhase::AwaitingCopy).is_err());
        assert_eq!(sm.current(), MonitorPhase::Stopped);

        assert!(sm.transition_to(MonitorPhase::Idle).is_ok());
    }

    #[test]
    fn test_popup_never_appears_from_idle() {
        let mut sm = MonitorStateMachine::new();
        sm.transition_to(MonitorPhase::Idle).unwrap();

        let err = sm.transition_to(MonitorPhase::PopupShown).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid monitor transition from Idle to PopupShown"
        );
        assert_eq!(sm.current(), MonitorPhase::Idle);
    }

    #[test]
    fn test_any_phase_can_stop() {
        for phase in [
            MonitorPhase::Idle,
            MonitorPhase::Pressing,
            MonitorPhase::AwaitingCopy,
            MonitorPhase::PopupShown,
        ] {
            let mut sm = MonitorStateMachine::new();
            sm.force_phase(phase);
            assert!(sm.transition_to(MonitorPhase::Stopped).is_ok());
        }
    }
}
