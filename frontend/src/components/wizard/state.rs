//! State of the prospect application wizard.

use common::autosave::SaveSequencer;
use common::model::prospect::{Prospect, SubmitApplicationResponse};
use common::wizard::{StepErrors, Wizard};
use gloo_timers::callback::Timeout;

/// Where the wizard's steps and answers come from.
#[derive(Debug, Clone, PartialEq)]
pub enum WizardSource {
    /// A prospect's application, opened from `/apply/{token}`.
    Prospect(String),
    /// A bare PDF form, opened from `/pdf-forms/{id}`; saves and
    /// submissions go to the PDF form endpoints.
    PdfForm(i64),
}

pub enum Phase {
    Loading,
    /// The link could not be resolved to a prospect and template.
    Failed(String),
    Active,
    Submitting,
    Submitted(SubmitApplicationResponse),
}

pub struct WizardPage {
    pub phase: Phase,
    pub prospect: Option<Prospect>,
    pub wizard: Option<Wizard>,
    pub errors: StepErrors,
    pub saves: SaveSequencer,
    /// Pending debounced autosave; dropping it cancels the timer.
    pub autosave: Option<Timeout>,
    pub loaded: bool,
}

impl WizardPage {
    pub fn new() -> Self {
        Self {
            phase: Phase::Loading,
            prospect: None,
            wizard: None,
            errors: StepErrors::new(),
            saves: SaveSequencer::new(),
            autosave: None,
            loaded: false,
        }
    }

    pub fn prospect_id(&self) -> Option<i64> {
        self.prospect.as_ref().map(|p| p.id)
    }
}
