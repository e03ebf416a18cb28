//! Address entry as an explicit state machine.
//!
//! ```text
//!            input >= 4 chars            select
//!  Typing ─────────────────▶ Suggesting ───────▶ Validating
//!    ▲  ◀───────────────────     │                  │   │
//!    │     input < 4 chars       │                  │   │ validated
//!    └──────────────────────────────────────────────┘   ▼
//!               validation failed                     Locked
//!                                                       │ unlock
//!                      street input >= 4 chars          ▼
//!         Suggesting ◀───────────────────────────── Editing
//! ```
//!
//! Transitions return the side effect the caller must perform (fetch
//! suggestions, validate a selection, write the validated address into the
//! form). Responses carry the query or selection they answer, so late
//! responses for an abandoned query are dropped instead of clobbering state.

use serde_json::Value;

use crate::model::address::{AddressSuggestion, ValidatedAddress};
use crate::model::prospect::FormData;

/// Characters typed before suggestions are requested.
pub const MIN_QUERY_LEN: usize = 4;

/// Form keys an address field writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressKeys {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    /// Copy of the address as the validation endpoint returned it.
    pub validated: String,
}

impl AddressKeys {
    /// A field with id `address` uses `address`/`city`/`state`/`zipCode`;
    /// any other id prefixes the secondary keys, e.g. `mailingAddress`,
    /// `mailingAddressCity`, `mailingAddressState`, `mailingAddressZipCode`.
    pub fn for_field(field_id: &str) -> Self {
        if field_id == "address" || field_id.is_empty() {
            return Self {
                street: "address".to_string(),
                city: "city".to_string(),
                state: "state".to_string(),
                zip: "zipCode".to_string(),
                validated: "addressValidated".to_string(),
            };
        }
        Self {
            street: field_id.to_string(),
            city: format!("{field_id}City"),
            state: format!("{field_id}State"),
            zip: format!("{field_id}ZipCode"),
            validated: format!("{field_id}Validated"),
        }
    }

    pub fn all(&self) -> [&str; 4] {
        [
            self.street.as_str(),
            self.city.as_str(),
            self.state.as_str(),
            self.zip.as_str(),
        ]
    }
}

/// Writes a validated address into the form in a single step, overwriting
/// whatever the four keys held before, and records it under
/// `keys.validated`.
pub fn apply_validated_address(data: &mut FormData, keys: &AddressKeys, address: &ValidatedAddress) {
    data.insert(keys.street.clone(), Value::String(address.street_address.clone()));
    data.insert(keys.city.clone(), Value::String(address.city.clone()));
    data.insert(keys.state.clone(), Value::String(address.state.clone()));
    data.insert(keys.zip.clone(), Value::String(address.zip_code.clone()));
    data.insert(
        keys.validated.clone(),
        serde_json::to_value(address).unwrap_or(Value::Null),
    );
}

/// The recorded validation result, if one was stored for these keys.
pub fn validated_record(data: &FormData, keys: &AddressKeys) -> Option<ValidatedAddress> {
    data.get(&keys.validated)
        .cloned()
        .and_then(|v| serde_json::from_value(v).ok())
}

/// State for an address input mounted over saved values: locked only when
/// the street, city, state and zip still equal the recorded validation
/// result. Hand-typed or since-edited addresses resume as `Typing`.
pub fn resumed_state(values: &[String; 4], validated: Option<&ValidatedAddress>) -> AddressState {
    let [street, city, state, zip] = values;
    let matches = validated.filter(|v| {
        v.street_address.trim() == street.trim()
            && v.city.trim() == city.trim()
            && v.state.trim() == state.trim()
            && v.zip_code.trim() == zip.trim()
    });
    AddressState::resume(street, matches.cloned())
}

#[derive(Debug, Clone, PartialEq)]
pub enum AddressState {
    Typing {
        query: String,
        error: Option<String>,
    },
    Suggesting {
        query: String,
        suggestions: Vec<AddressSuggestion>,
        loading: bool,
    },
    Validating {
        selection: AddressSuggestion,
    },
    Locked {
        address: ValidatedAddress,
    },
    Editing {
        address: ValidatedAddress,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum AddressEvent {
    /// The street input changed.
    Input(String),
    SuggestionsLoaded {
        query: String,
        suggestions: Vec<AddressSuggestion>,
    },
    SuggestionsFailed {
        query: String,
    },
    Select(AddressSuggestion),
    Validated {
        selection: AddressSuggestion,
        address: ValidatedAddress,
    },
    ValidationFailed {
        selection: AddressSuggestion,
        message: String,
    },
    Unlock,
    /// Leaves the dropdown without picking anything.
    Dismiss,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AddressEffect {
    FetchSuggestions(String),
    Validate(AddressSuggestion),
    /// Write the address into the form (see `apply_validated_address`).
    Apply(ValidatedAddress),
    /// Store the raw street text the user typed.
    StoreStreet(String),
}

impl Default for AddressState {
    fn default() -> Self {
        AddressState::Typing {
            query: String::new(),
            error: None,
        }
    }
}

impl AddressState {
    /// Restores a machine for an address already present in the form: a
    /// previously validated address starts out locked.
    pub fn resume(street: &str, locked: Option<ValidatedAddress>) -> Self {
        match locked {
            Some(address) => AddressState::Locked { address },
            None => AddressState::Typing {
                query: street.to_string(),
                error: None,
            },
        }
    }

    pub fn is_locked(&self) -> bool {
        matches!(self, AddressState::Locked { .. })
    }

    pub fn suggestions(&self) -> &[AddressSuggestion] {
        match self {
            AddressState::Suggesting { suggestions, .. } => suggestions,
            _ => &[],
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            AddressState::Typing { error, .. } => error.as_deref(),
            _ => None,
        }
    }

    /// Text shown in the street input.
    pub fn street_text(&self) -> &str {
        match self {
            AddressState::Typing { query, .. } | AddressState::Suggesting { query, .. } => query,
            AddressState::Validating { selection } => &selection.description,
            AddressState::Locked { address } | AddressState::Editing { address } => {
                &address.street_address
            }
        }
    }

    /// Applies `event`, returning the new state and the effects to run.
    pub fn transition(self, event: AddressEvent) -> (AddressState, Vec<AddressEffect>) {
        use AddressEvent as E;
        use AddressState as S;

        match (self, event) {
            (S::Locked { address }, E::Input(_)) => (S::Locked { address }, Vec::new()),
            (S::Locked { address }, E::Unlock) => (S::Editing { address }, Vec::new()),

            (S::Validating { selection }, E::Validated { selection: answered, address })
                if answered == selection =>
            {
                (
                    S::Locked {
                        address: address.clone(),
                    },
                    vec![AddressEffect::Apply(address)],
                )
            }
            (S::Validating { selection }, E::ValidationFailed { selection: answered, message })
                if answered == selection =>
            {
                (
                    S::Typing {
                        query: selection.description,
                        error: Some(message),
                    },
                    Vec::new(),
                )
            }

            (S::Suggesting { query, .. }, E::SuggestionsLoaded { query: answered, suggestions })
                if answered == query =>
            {
                (
                    S::Suggesting {
                        query,
                        suggestions,
                        loading: false,
                    },
                    Vec::new(),
                )
            }
            (S::Suggesting { query, .. }, E::SuggestionsFailed { query: answered })
                if answered == query =>
            {
                (
                    S::Typing {
                        query,
                        error: Some("Address suggestions are unavailable".to_string()),
                    },
                    Vec::new(),
                )
            }
            (S::Suggesting { .. }, E::Select(selection)) => (
                S::Validating {
                    selection: selection.clone(),
                },
                vec![AddressEffect::Validate(selection)],
            ),
            (S::Suggesting { query, .. }, E::Dismiss) => {
                (S::Typing { query, error: None }, Vec::new())
            }

            (
                S::Typing { .. }
                | S::Suggesting { .. }
                | S::Editing { .. }
                | S::Validating { .. },
                E::Input(text),
            ) => Self::on_input(text),

            // Anything else is either stale or meaningless in this state.
            (state, _) => (state, Vec::new()),
        }
    }

    fn on_input(text: String) -> (AddressState, Vec<AddressEffect>) {
        let mut effects = vec![AddressEffect::StoreStreet(text.clone())];
        if text.trim().chars().count() >= MIN_QUERY_LEN {
            effects.push(AddressEffect::FetchSuggestions(text.clone()));
            (
                AddressState::Suggesting {
                    query: text,
                    suggestions: Vec::new(),
                    loading: true,
                },
                effects,
            )
        } else {
            (
                AddressState::Typing {
                    query: text,
                    error: None,
                },
                effects,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn suggestion(text: &str) -> AddressSuggestion {
        AddressSuggestion {
            description: text.to_string(),
            place_id: Some(format!("place-{}", text.len())),
        }
    }

    fn validated() -> ValidatedAddress {
        ValidatedAddress {
            street_address: "1 Market St".into(),
            city: "San Francisco".into(),
            state: "CA".into(),
            zip_code: "94105".into(),
        }
    }

    #[test]
    fn short_input_does_not_fetch() {
        let (state, effects) = AddressState::default().transition(AddressEvent::Input("1 M".into()));
        assert!(matches!(state, AddressState::Typing { .. }));
        assert_eq!(effects, vec![AddressEffect::StoreStreet("1 M".into())]);
    }

    #[test]
    fn full_flow_locks_and_applies() {
        let (state, effects) =
            AddressState::default().transition(AddressEvent::Input("1 Market".into()));
        assert!(effects.contains(&AddressEffect::FetchSuggestions("1 Market".into())));

        let pick = suggestion("1 Market St, San Francisco, CA");
        let (state, _) = state.transition(AddressEvent::SuggestionsLoaded {
            query: "1 Market".into(),
            suggestions: vec![pick.clone()],
        });
        assert_eq!(state.suggestions().len(), 1);

        let (state, effects) = state.transition(AddressEvent::Select(pick.clone()));
        assert_eq!(effects, vec![AddressEffect::Validate(pick.clone())]);

        let (state, effects) = state.transition(AddressEvent::Validated {
            selection: pick,
            address: validated(),
        });
        assert!(state.is_locked());
        assert_eq!(effects, vec![AddressEffect::Apply(validated())]);

        let (state, effects) = state.transition(AddressEvent::Input("typing over".into()));
        assert!(state.is_locked());
        assert!(effects.is_empty());

        let (state, _) = state.transition(AddressEvent::Unlock);
        assert!(matches!(state, AddressState::Editing { .. }));
        let (state, effects) = state.transition(AddressEvent::Input("2 Mission St".into()));
        assert!(matches!(state, AddressState::Suggesting { .. }));
        assert!(effects.contains(&AddressEffect::FetchSuggestions("2 Mission St".into())));
    }

    #[test]
    fn stale_suggestions_are_dropped() {
        let (state, _) = AddressState::default().transition(AddressEvent::Input("1 Market".into()));
        let (state, _) = state.transition(AddressEvent::Input("1 Market St".into()));
        let (state, _) = state.transition(AddressEvent::SuggestionsLoaded {
            query: "1 Market".into(),
            suggestions: vec![suggestion("stale")],
        });
        assert!(state.suggestions().is_empty());
    }

    #[test]
    fn validation_failure_returns_to_typing_with_error() {
        let pick = suggestion("Nowhere Rd");
        let state = AddressState::Validating {
            selection: pick.clone(),
        };
        let (state, _) = state.transition(AddressEvent::ValidationFailed {
            selection: pick,
            message: "Address could not be verified".into(),
        });
        assert_eq!(state.error(), Some("Address could not be verified"));
        assert_eq!(state.street_text(), "Nowhere Rd");
    }

    #[test]
    fn apply_overwrites_all_four_keys() {
        let mut data = json!({
            "address": "old street", "city": "Old", "state": "NY", "zipCode": "10001", "legalName": "Acme"
        })
        .as_object()
        .cloned()
        .unwrap();
        apply_validated_address(&mut data, &AddressKeys::for_field("address"), &validated());
        assert_eq!(data["address"], "1 Market St");
        assert_eq!(data["city"], "San Francisco");
        assert_eq!(data["state"], "CA");
        assert_eq!(data["zipCode"], "94105");
        assert_eq!(data["legalName"], "Acme");
        assert_eq!(data["addressValidated"]["zipCode"], "94105");
    }

    #[test]
    fn resumes_locked_only_over_a_validated_address() {
        let keys = AddressKeys::for_field("address");
        let mut data = FormData::new();
        apply_validated_address(&mut data, &keys, &validated());
        let record = validated_record(&data, &keys);
        assert_eq!(record, Some(validated()));

        let saved = ["1 Market St", "San Francisco", "CA", "94105"].map(String::from);
        assert!(resumed_state(&saved, record.as_ref()).is_locked());

        let edited = ["2 Market St", "San Francisco", "CA", "94105"].map(String::from);
        let state = resumed_state(&edited, record.as_ref());
        assert!(!state.is_locked());
        assert_eq!(state.street_text(), "2 Market St");
    }

    #[test]
    fn hand_typed_address_does_not_resume_locked() {
        let keys = AddressKeys::for_field("address");
        let data = json!({
            "address": "9 Elm St", "city": "Springfield", "state": "IL", "zipCode": "62701"
        })
        .as_object()
        .cloned()
        .unwrap();
        let record = validated_record(&data, &keys);
        assert_eq!(record, None);
        let values = keys.all().map(|k| data[k].as_str().unwrap_or_default().to_string());
        let state = resumed_state(&values, record.as_ref());
        assert!(!state.is_locked());
        assert_eq!(state.street_text(), "9 Elm St");
    }

    #[test]
    fn prefixed_keys_for_secondary_addresses() {
        let keys = AddressKeys::for_field("mailingAddress");
        assert_eq!(
            keys.all(),
            ["mailingAddress", "mailingAddressCity", "mailingAddressState", "mailingAddressZipCode"]
        );
        assert_eq!(keys.validated, "mailingAddressValidated");
    }
}
