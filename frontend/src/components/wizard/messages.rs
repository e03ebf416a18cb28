use common::autosave::SaveToken;
use common::model::address::ValidatedAddress;
use common::model::owner::Owner;
use common::model::prospect::{Prospect, SubmitApplicationResponse};
use common::wizard::Wizard;
use serde_json::Value;

pub enum Msg {
    Load,
    Ready {
        prospect: Option<Prospect>,
        wizard: Wizard,
    },
    LoadFailed(String),

    Edit(String, Value),
    AddressValidated(String, ValidatedAddress),
    OwnersChanged(String, Vec<Owner>),

    Next,
    Back,
    GoTo(usize),

    /// Debounce timer fired.
    Autosave,
    SaveNow,
    SaveDone(SaveToken, Result<(), String>),

    Submit,
    Submitted(SubmitApplicationResponse),
    SubmitFailed(String),
}
