//! Section submission phases
//!
//! ```text
//! Editing ──▶ Validating ──▶ Submitting ──▶ Succeeded
//!    ▲            │              │
//!    │            ▼              ▼
//!    └──────── Invalid        Failed
//!    └───────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

/// Where a section is in its submission lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionPhase {
    /// Accepting edits
    Editing,
    /// Full validation running
    Validating,
    /// Validation failed; messages revealed
    Invalid,
    /// Uploading and inserting
    Submitting,
    /// Store rejected or timed out; form untouched
    Failed,
    /// Rows written; terminal for this instance
    Succeeded,
}

impl SectionPhase {
    /// Whether no further transition exists
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        allowed_transitions(self).is_empty()
    }

    /// Whether the user may edit fields in this phase
    #[inline]
    #[must_use]
    pub fn accepts_edits(self) -> bool {
        matches!(self, Self::Editing | Self::Invalid | Self::Failed)
    }
}

/// Illegal phase change
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PhaseError {
    /// Transition not in the table
    #[error("illegal section transition {from:?} -> {to:?}")]
    IllegalTransition {
        /// Current phase
        from: SectionPhase,
        /// Requested phase
        to: SectionPhase,
    },
}

/// Check a phase change against the transition table
///
/// # Errors
/// - `PhaseError::IllegalTransition` if `to` is not reachable from `from`
pub fn validate_transition(from: SectionPhase, to: SectionPhase) -> Result<(), PhaseError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(PhaseError::IllegalTransition { from, to })
    }
}

/// Phases reachable in one step
#[must_use]
pub fn allowed_transitions(from: SectionPhase) -> &'static [SectionPhase] {
    match from {
        SectionPhase::Editing => &[SectionPhase::Validating],
        SectionPhase::Validating => &[SectionPhase::Invalid, SectionPhase::Submitting],
        SectionPhase::Invalid | SectionPhase::Failed => &[SectionPhase::Editing],
        SectionPhase::Submitting => &[SectionPhase::Failed, SectionPhase::Succeeded],
        SectionPhase::Succeeded => &[],
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::enum_glob_use)]

    use super::*;
    use super::SectionPhase::*;
    use proptest::prelude::*;

    fn phase_strategy() -> impl Strategy<Value = SectionPhase> {
        prop_oneof![
            Just(Editing),
            Just(Validating),
            Just(Invalid),
            Just(Submitting),
            Just(Failed),
            Just(Succeeded),
        ]
    }

    #[test]
    fn happy_path() {
        assert!(validate_transition(Editing, Validating).is_ok());
        assert!(validate_transition(Validating, Submitting).is_ok());
        assert!(validate_transition(Submitting, Succeeded).is_ok());
    }

    #[test]
    fn cannot_submit_without_validating() {
        assert_eq!(
            validate_transition(Editing, Submitting),
            Err(PhaseError::IllegalTransition {
                from: Editing,
                to: Submitting
            })
        );
    }

    #[test]
    fn only_succeeded_is_terminal() {
        for phase in [Editing, Validating, Invalid, Submitting, Failed] {
            assert!(!phase.is_terminal(), "{phase:?}");
        }
        assert!(Succeeded.is_terminal());
        assert!(Failed.accepts_edits());
        assert!(!Submitting.accepts_edits());
    }

    #[test]
    fn abandoned_submission_recovers_through_failed() {
        assert!(validate_transition(Submitting, Failed).is_ok());
        assert!(validate_transition(Failed, Editing).is_ok());
        assert!(validate_transition(Submitting, Validating).is_err());
    }

    proptest! {
        #[test]
        fn prop_transition_table_consistent(from in phase_strategy(), to in phase_strategy()) {
            let listed = allowed_transitions(from).contains(&to);
            prop_assert_eq!(validate_transition(from, to).is_ok(), listed);
        }

        #[test]
        fn prop_no_transition_out_of_succeeded(to in phase_strategy()) {
            prop_assert!(validate_transition(Succeeded, to).is_err());
        }

        #[test]
        fn prop_every_failure_returns_to_editing(from in prop_oneof![Just(Invalid), Just(Failed)]) {
            prop_assert!(validate_transition(from, Editing).is_ok());
        }
    }
}
