//! Address input with autocomplete and server-side validation.
//!
//! The component owns an `AddressState` machine and performs the effects it
//! returns. Once a suggestion validates, the four address keys are written
//! through `on_validated` in one message and the inputs lock until the
//! prospect unlocks them for manual editing.

use common::address::{resumed_state, AddressEffect, AddressEvent, AddressKeys, AddressState};
use common::api;
use common::model::address::{
    AutocompleteRequest, AutocompleteResponse, AddressSuggestion, ValidateAddressRequest,
    ValidateAddressResponse, ValidatedAddress,
};
use serde_json::Value;
use yew::platform::spawn_local;
use yew::prelude::*;

use crate::api as http;
use crate::helpers::input_value;

#[derive(Properties, PartialEq)]
pub struct AddressInputProps {
    pub field_id: String,
    pub label: String,
    #[prop_or_default]
    pub required: bool,
    /// Current street, city, state and zip, in that order.
    pub values: [String; 4],
    /// The last validation result recorded for these values, if any.
    #[prop_or_default]
    pub validated: Option<ValidatedAddress>,
    #[prop_or_default]
    pub error: Option<String>,
    /// Raw edits of any of the four keys.
    pub on_change: Callback<(String, Value)>,
    pub on_validated: Callback<ValidatedAddress>,
}

pub enum AddressMsg {
    Machine(AddressEvent),
    Secondary(String, String),
}

pub struct AddressInput {
    state: AddressState,
    keys: AddressKeys,
}

impl Component for AddressInput {
    type Message = AddressMsg;
    type Properties = AddressInputProps;

    fn create(ctx: &Context<Self>) -> Self {
        let props = ctx.props();
        Self {
            state: resumed_state(&props.values, props.validated.as_ref()),
            keys: AddressKeys::for_field(&props.field_id),
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            AddressMsg::Machine(event) => {
                let (next, effects) = std::mem::take(&mut self.state).transition(event);
                self.state = next;
                for effect in effects {
                    self.run(ctx, effect);
                }
                true
            }
            AddressMsg::Secondary(key, value) => {
                ctx.props().on_change.emit((key, Value::String(value)));
                false
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let props = ctx.props();
        let link = ctx.link();
        let locked = self.state.is_locked();
        let street = match &self.state {
            AddressState::Locked { .. } | AddressState::Editing { .. } => props.values[0].clone(),
            other => other.street_text().to_string(),
        };
        let on_input = link.callback(|e: InputEvent| AddressMsg::Machine(AddressEvent::Input(input_value(&e))));
        let suggestions = self
            .state
            .suggestions()
            .iter()
            .map(|s| {
                let pick = s.clone();
                html! {
                    <li onmousedown={link.callback(move |_| AddressMsg::Machine(AddressEvent::Select(pick.clone())))}>
                        { &s.description }
                    </li>
                }
            })
            .collect::<Html>();
        let loading = matches!(self.state, AddressState::Suggesting { loading: true, .. });
        let validating = matches!(self.state, AddressState::Validating { .. });
        let message = self.state.error().map(str::to_string).or_else(|| props.error.clone());

        let secondary = |index: usize, key: &str, placeholder: &'static str| {
            let key = key.to_string();
            html! {
                <input
                    class="address-part"
                    placeholder={placeholder}
                    readonly={locked}
                    value={props.values[index].clone()}
                    oninput={link.callback(move |e: InputEvent| AddressMsg::Secondary(key.clone(), input_value(&e)))}
                />
            }
        };

        html! {
            <div class={classes!("address-input", locked.then_some("locked"))}>
                <label>
                    { &props.label }
                    if props.required { <span class="required">{" *"}</span> }
                </label>
                <div class="street-row">
                    <input
                        placeholder="Start typing an address"
                        readonly={locked}
                        value={street}
                        oninput={on_input}
                        onblur={link.callback(|_| AddressMsg::Machine(AddressEvent::Dismiss))}
                    />
                    if locked {
                        <button
                            title="Edit address"
                            onclick={link.callback(|_| AddressMsg::Machine(AddressEvent::Unlock))}
                        >
                            <i class="material-icons">{"lock_open"}</i>
                        </button>
                    }
                </div>
                if loading || validating {
                    <p class="muted">{ if validating { "Validating address..." } else { "Searching..." } }</p>
                }
                if !self.state.suggestions().is_empty() {
                    <ul class="suggestions">{ suggestions }</ul>
                }
                <div class="address-parts">
                    { secondary(1, &self.keys.city, "City") }
                    { secondary(2, &self.keys.state, "State") }
                    { secondary(3, &self.keys.zip, "ZIP code") }
                </div>
                if let Some(message) = message {
                    <p class="field-error">{ message }</p>
                }
            </div>
        }
    }
}

impl AddressInput {
    fn run(&self, ctx: &Context<Self>, effect: AddressEffect) {
        let props = ctx.props();
        match effect {
            AddressEffect::StoreStreet(text) => {
                props.on_change.emit((self.keys.street.clone(), Value::String(text)));
            }
            AddressEffect::Apply(address) => props.on_validated.emit(address),
            AddressEffect::FetchSuggestions(query) => {
                let link = ctx.link().clone();
                spawn_local(async move {
                    let body = AutocompleteRequest { input: query.clone() };
                    let event = match http::post::<_, AutocompleteResponse>(
                        api::ADDRESS_AUTOCOMPLETE,
                        &body,
                        "Address suggestions are unavailable",
                    )
                    .await
                    {
                        Ok(response) => AddressEvent::SuggestionsLoaded {
                            query,
                            suggestions: response.suggestions,
                        },
                        Err(_) => AddressEvent::SuggestionsFailed { query },
                    };
                    link.send_message(AddressMsg::Machine(event));
                });
            }
            AddressEffect::Validate(selection) => {
                let link = ctx.link().clone();
                spawn_local(async move {
                    let event = validate(selection).await;
                    link.send_message(AddressMsg::Machine(event));
                });
            }
        }
    }
}

async fn validate(selection: AddressSuggestion) -> AddressEvent {
    let body = ValidateAddressRequest {
        address: selection.description.clone(),
        place_id: selection.place_id.clone(),
    };
    let fallback = "Unable to validate this address";
    match http::post::<_, ValidateAddressResponse>(api::VALIDATE_ADDRESS, &body, fallback).await {
        Ok(ValidateAddressResponse {
            is_valid: true,
            validated_address: Some(address),
            ..
        }) => AddressEvent::Validated { selection, address },
        Ok(response) => AddressEvent::ValidationFailed {
            selection,
            message: response.message.unwrap_or_else(|| fallback.to_string()),
        },
        Err(err) => AddressEvent::ValidationFailed {
            selection,
            message: err.to_string(),
        },
    }
}
