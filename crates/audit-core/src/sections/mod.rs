//! Report sections and the phase driver shared by them

pub mod building;
pub mod catalog;
pub mod opportunities;

pub use building::BuildingSection;
pub use opportunities::OpportunitiesSection;

use crate::bridge::SectionId;
use crate::coordinator::{Confirmation, SubmissionCoordinator};
use crate::error::SubmissionError;
use crate::phase::{validate_transition, PhaseError, SectionPhase};
use crate::snapshot::FormSnapshot;
use tracing::{info, warn};

/// Editable state of one report section
pub trait SectionModel: Send {
    /// Section identifier
    fn id(&self) -> SectionId;

    /// Freeze the current values for a submission attempt
    fn snapshot(&self) -> FormSnapshot;

    /// Show every inline message
    fn reveal_errors(&mut self);

    /// Back to defaults
    fn reset(&mut self);
}

/// Section plus its submission phase
///
/// A failed submission leaves the model untouched. A successful one resets
/// it and closes this instance; [`SectionForm::into_fresh`] starts over.
#[derive(Debug)]
pub struct SectionForm<M> {
    model: M,
    phase: SectionPhase,
}

impl<M: SectionModel> SectionForm<M> {
    /// Form in the `Editing` phase
    pub fn new(model: M) -> Self {
        Self {
            model,
            phase: SectionPhase::Editing,
        }
    }

    /// Current phase
    #[inline]
    #[must_use]
    pub fn phase(&self) -> SectionPhase {
        self.phase
    }

    /// Read access to the section
    #[inline]
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Write access to the section; leaves `Invalid`/`Failed` for `Editing`
    ///
    /// A submission whose future was dropped mid-flight counts as failed.
    ///
    /// # Errors
    /// - `SubmissionError::SectionClosed` after a successful submission
    pub fn model_mut(&mut self) -> Result<&mut M, SubmissionError> {
        self.resume_editing()?;
        Ok(&mut self.model)
    }

    /// Validate, then upload, insert and hand off
    ///
    /// # Errors
    /// - `SubmissionError::SectionClosed` after a successful submission
    /// - any error of [`SubmissionCoordinator::validate`] or
    ///   [`SubmissionCoordinator::persist`]
    pub async fn submit(
        &mut self,
        coordinator: &SubmissionCoordinator,
    ) -> Result<Confirmation, SubmissionError> {
        self.resume_editing()?;
        self.transition(SectionPhase::Validating)?;

        let snapshot = self.model.snapshot();
        if let Err(e) = coordinator.validate(&snapshot) {
            self.model.reveal_errors();
            self.transition(SectionPhase::Invalid)?;
            return Err(e);
        }

        self.transition(SectionPhase::Submitting)?;
        match coordinator.persist(snapshot).await {
            Ok(confirmation) => {
                self.transition(SectionPhase::Succeeded)?;
                self.model.reset();
                Ok(confirmation)
            }
            Err(e) => {
                self.transition(SectionPhase::Failed)?;
                Err(e)
            }
        }
    }

    /// Same section, reset, back in `Editing`
    #[must_use]
    pub fn into_fresh(mut self) -> Self {
        self.model.reset();
        Self::new(self.model)
    }

    // `submit` holds `&mut self` across its await, so `Submitting` seen here
    // means that future was dropped before persisting finished.
    fn resume_editing(&mut self) -> Result<(), SubmissionError> {
        match self.phase {
            SectionPhase::Succeeded => Err(SubmissionError::SectionClosed),
            SectionPhase::Submitting => {
                warn!(section = %self.model.id(), "submission abandoned before completion");
                self.transition(SectionPhase::Failed)?;
                self.transition(SectionPhase::Editing)?;
                Ok(())
            }
            SectionPhase::Invalid | SectionPhase::Failed => {
                self.transition(SectionPhase::Editing)?;
                Ok(())
            }
            SectionPhase::Editing | SectionPhase::Validating => Ok(()),
        }
    }

    fn transition(&mut self, to: SectionPhase) -> Result<(), PhaseError> {
        validate_transition(self.phase, to)?;
        info!(section = %self.model.id(), from = ?self.phase, ?to, "section phase");
        self.phase = to;
        Ok(())
    }
}
