//! Beneficial-owner list for ownership fields.
//!
//! The list lives in the wizard's form data; this component renders it,
//! emits the edited list through `on_change`, and talks to the signature
//! endpoints. Owners at or above the signature threshold either sign in
//! place (typed name or uploaded image) or are sent a signing link.

use common::api;
use common::model::owner::{Owner, SignatureType};
use common::model::signature::{SignatureRecord, SignatureRequest, SignatureRequestResponse};
use common::validation::owners::total_percentage;
use common::validation::{validate_owners, SignaturePolicy};
use yew::platform::spawn_local;
use yew::prelude::*;

use crate::api as http;
use crate::helpers::{format_percentage, input_value, read_as_data_url, selected_file, show_toast};

/// One edit to the owners list.
#[derive(Debug, Clone, PartialEq)]
pub enum OwnerEdit {
    Add,
    Remove(usize),
    Name(usize, String),
    Email(usize, String),
    Percentage(usize, String),
    TypedSignature(usize, String),
    Signature(usize, String, SignatureType),
    ClearSignature(usize),
    Requested(usize, SignatureRequestResponse),
}

/// Applies `edit` and reports whether the list changed.
pub fn apply_owner_edit(owners: &mut Vec<Owner>, edit: OwnerEdit) -> bool {
    if let OwnerEdit::Add = edit {
        owners.push(Owner::default());
        return true;
    }
    if let OwnerEdit::Remove(index) = edit {
        if index < owners.len() {
            owners.remove(index);
            return true;
        }
        return false;
    }
    let index = match &edit {
        OwnerEdit::Name(i, _)
        | OwnerEdit::Email(i, _)
        | OwnerEdit::Percentage(i, _)
        | OwnerEdit::TypedSignature(i, _)
        | OwnerEdit::Signature(i, _, _)
        | OwnerEdit::ClearSignature(i)
        | OwnerEdit::Requested(i, _) => *i,
        OwnerEdit::Add | OwnerEdit::Remove(_) => return false,
    };
    let Some(owner) = owners.get_mut(index) else {
        return false;
    };
    match edit {
        OwnerEdit::Name(_, name) => owner.name = name,
        OwnerEdit::Email(_, email) => owner.email = email.trim().to_string(),
        OwnerEdit::Percentage(_, text) => owner.percentage = text.trim().parse().ok(),
        OwnerEdit::TypedSignature(_, text) => {
            let blank = text.trim().is_empty();
            owner.signature = (!blank).then_some(text);
            owner.signature_type = (!blank).then_some(SignatureType::Typed);
        }
        OwnerEdit::Signature(_, data, kind) => {
            owner.signature = Some(data);
            owner.signature_type = Some(kind);
        }
        OwnerEdit::ClearSignature(_) => {
            owner.signature = None;
            owner.signature_type = None;
        }
        OwnerEdit::Requested(_, response) => {
            owner.signature_token = response.signature_token;
            owner.signature_requested_at = response.requested_at;
        }
        OwnerEdit::Add | OwnerEdit::Remove(_) => {}
    }
    true
}

/// Fills in a signature fetched from the signing endpoints. Returns false
/// when the owner has not signed yet.
pub fn apply_signature_record(owner: &mut Owner, record: SignatureRecord) -> bool {
    match record.signature.filter(|s| !s.trim().is_empty()) {
        Some(signature) => {
            owner.signature = Some(signature);
            owner.signature_type = record.signature_type.or(Some(SignatureType::Drawn));
            if record.token.is_some() {
                owner.signature_token = record.token;
            }
            true
        }
        None => false,
    }
}

#[derive(Properties, PartialEq)]
pub struct OwnersProps {
    pub label: String,
    pub owners: Vec<Owner>,
    #[prop_or_default]
    pub prospect_id: Option<i64>,
    #[prop_or_default]
    pub error: Option<String>,
    #[prop_or_default]
    pub policy: Option<SignaturePolicy>,
    pub on_change: Callback<Vec<Owner>>,
}

pub enum OwnersMsg {
    Edit(OwnerEdit),
    Upload(usize, Option<web_sys::File>),
    RequestSignature(usize),
    CheckSignature(usize),
    SignatureLoaded(usize, SignatureRecord),
}

pub struct OwnersInput;

impl OwnersInput {
    fn policy(ctx: &Context<Self>) -> SignaturePolicy {
        ctx.props().policy.unwrap_or_default()
    }

    fn emit(ctx: &Context<Self>, edit: OwnerEdit) {
        let mut owners = ctx.props().owners.clone();
        if apply_owner_edit(&mut owners, edit) {
            ctx.props().on_change.emit(owners);
        }
    }
}

impl Component for OwnersInput {
    type Message = OwnersMsg;
    type Properties = OwnersProps;

    fn create(_ctx: &Context<Self>) -> Self {
        Self
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            OwnersMsg::Edit(edit) => Self::emit(ctx, edit),
            OwnersMsg::Upload(index, Some(file)) => {
                let link = ctx.link().clone();
                spawn_local(async move {
                    match read_as_data_url(file).await {
                        Some(data) => link.send_message(OwnersMsg::Edit(OwnerEdit::Signature(
                            index,
                            data,
                            SignatureType::Uploaded,
                        ))),
                        None => show_toast("Could not read the signature image"),
                    }
                });
            }
            OwnersMsg::Upload(_, None) => {}
            OwnersMsg::RequestSignature(index) => {
                let props = ctx.props();
                let (Some(owner), Some(prospect_id)) = (props.owners.get(index), props.prospect_id) else {
                    return false;
                };
                if !common::validation::is_valid_email(&owner.email) {
                    show_toast("Enter a valid email before requesting a signature");
                    return false;
                }
                let body = SignatureRequest {
                    owner_name: owner.name.clone(),
                    owner_email: owner.email.clone(),
                    prospect_id,
                    ownership_percentage: owner.percentage.unwrap_or(0.0),
                };
                let link = ctx.link().clone();
                spawn_local(async move {
                    match http::post::<_, SignatureRequestResponse>(
                        api::SIGNATURE_REQUEST,
                        &body,
                        "Failed to send signature request",
                    )
                    .await
                    {
                        Ok(response) => {
                            show_toast(&format!("Signature request sent to {}", body.owner_email));
                            link.send_message(OwnersMsg::Edit(OwnerEdit::Requested(index, response)));
                        }
                        Err(err) => show_toast(&err.to_string()),
                    }
                });
            }
            OwnersMsg::CheckSignature(index) => {
                let Some(owner) = ctx.props().owners.get(index) else {
                    return false;
                };
                let path = match &owner.signature_token {
                    Some(token) => api::signature_by_token(&http::segment(token)),
                    None => api::signature_by_email(&http::segment(&owner.email)),
                };
                let link = ctx.link().clone();
                spawn_local(async move {
                    match http::get::<SignatureRecord>(&path, "Signature not found").await {
                        Ok(record) => link.send_message(OwnersMsg::SignatureLoaded(index, record)),
                        Err(err) => show_toast(&err.to_string()),
                    }
                });
            }
            OwnersMsg::SignatureLoaded(index, record) => {
                let mut owners = ctx.props().owners.clone();
                if let Some(owner) = owners.get_mut(index) {
                    if apply_signature_record(owner, record) {
                        show_toast("Signature received");
                        ctx.props().on_change.emit(owners);
                    } else {
                        show_toast("This owner has not signed yet");
                    }
                }
            }
        }
        false
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let props = ctx.props();
        let link = ctx.link();
        let policy = Self::policy(ctx);
        let total = total_percentage(&props.owners);
        let live_error = if props.owners.is_empty() {
            None
        } else {
            validate_owners(&props.owners, &policy).map(|e| e.to_string())
        };
        let error = props.error.clone().or(live_error);

        let rows = props
            .owners
            .iter()
            .enumerate()
            .map(|(index, owner)| owner_row(index, owner, &policy, props.prospect_id.is_some(), link))
            .collect::<Html>();

        html! {
            <div class="owners-input">
                <h4>{ &props.label }</h4>
                { rows }
                <div class="owners-footer">
                    <button onclick={link.callback(|_| OwnersMsg::Edit(OwnerEdit::Add))}>{"Add owner"}</button>
                    <span class={classes!("owners-total", ((total - 100.0).abs() > 0.01).then_some("off"))}>
                        { format!("Total: {}", format_percentage(total)) }
                    </span>
                </div>
                if let Some(error) = error {
                    <p class="field-error">{ error }</p>
                }
            </div>
        }
    }
}

fn owner_row(
    index: usize,
    owner: &Owner,
    policy: &SignaturePolicy,
    can_request: bool,
    link: &yew::html::Scope<OwnersInput>,
) -> Html {
    let edit = |f: fn(usize, String) -> OwnerEdit| {
        link.callback(move |e: InputEvent| OwnersMsg::Edit(f(index, input_value(&e))))
    };
    let needs_signature = owner
        .percentage
        .is_some_and(|p| policy.requires_signature(p));
    let typed = owner.signature_type == Some(SignatureType::Typed);
    let signature_preview = match (&owner.signature, owner.signature_type) {
        (Some(data), Some(SignatureType::Drawn | SignatureType::Uploaded)) => html! {
            <img class="signature-preview" src={data.clone()} alt="Signature" />
        },
        _ => html! {},
    };

    html! {
        <div class="owner-row" key={index.to_string()}>
            <input placeholder="Full name" value={owner.name.clone()} oninput={edit(OwnerEdit::Name)} />
            <input type="email" placeholder="Email" value={owner.email.clone()} oninput={edit(OwnerEdit::Email)} />
            <input
                type="number"
                min="0"
                max="100"
                step="0.01"
                placeholder="%"
                value={owner.percentage.map(|p| p.to_string()).unwrap_or_default()}
                oninput={edit(OwnerEdit::Percentage)}
            />
            <button title="Remove owner" onclick={link.callback(move |_| OwnersMsg::Edit(OwnerEdit::Remove(index)))}>
                <i class="material-icons">{"delete"}</i>
            </button>
            if needs_signature {
                <div class="signature">
                    <input
                        placeholder="Type full name to sign"
                        value={if typed { owner.signature.clone().unwrap_or_default() } else { String::new() }}
                        oninput={edit(OwnerEdit::TypedSignature)}
                    />
                    <label class="upload">
                        {"Upload signature "}
                        <input
                            type="file"
                            accept="image/*"
                            onchange={link.callback(move |e: Event| OwnersMsg::Upload(index, selected_file(&e)))}
                        />
                    </label>
                    { signature_preview }
                    if owner.has_signature() {
                        <button onclick={link.callback(move |_| OwnersMsg::Edit(OwnerEdit::ClearSignature(index)))}>
                            {"Clear"}
                        </button>
                    }
                    if can_request {
                        <button onclick={link.callback(move |_| OwnersMsg::RequestSignature(index))}>
                            {"Email signing link"}
                        </button>
                    }
                    if owner.signature_token.is_some() || !owner.email.is_empty() {
                        <button onclick={link.callback(move |_| OwnersMsg::CheckSignature(index))}>
                            {"Check for signature"}
                        </button>
                    }
                    if let Some(at) = &owner.signature_requested_at {
                        <span class="muted">{ format!("Requested {at}") }</span>
                    }
                </div>
            }
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edits_apply_to_the_right_owner() {
        let mut owners = Vec::new();
        assert!(apply_owner_edit(&mut owners, OwnerEdit::Add));
        assert!(apply_owner_edit(&mut owners, OwnerEdit::Add));
        apply_owner_edit(&mut owners, OwnerEdit::Name(1, "Ben".into()));
        apply_owner_edit(&mut owners, OwnerEdit::Email(1, " ben@acme.test ".into()));
        apply_owner_edit(&mut owners, OwnerEdit::Percentage(1, "40".into()));
        assert_eq!(owners[1].name, "Ben");
        assert_eq!(owners[1].email, "ben@acme.test");
        assert_eq!(owners[1].percentage, Some(40.0));
        assert_eq!(owners[0], Owner::default());

        assert!(!apply_owner_edit(&mut owners, OwnerEdit::Name(5, "x".into())));
        assert!(apply_owner_edit(&mut owners, OwnerEdit::Remove(0)));
        assert_eq!(owners.len(), 1);
    }

    #[test]
    fn typed_signature_clears_when_blank() {
        let mut owners = vec![Owner::default()];
        apply_owner_edit(&mut owners, OwnerEdit::TypedSignature(0, "Ana Ruiz".into()));
        assert!(owners[0].has_signature());
        assert_eq!(owners[0].signature_type, Some(SignatureType::Typed));
        apply_owner_edit(&mut owners, OwnerEdit::TypedSignature(0, "  ".into()));
        assert!(!owners[0].has_signature());
        assert_eq!(owners[0].signature_type, None);
    }

    #[test]
    fn unsigned_record_is_ignored() {
        let mut owner = Owner::default();
        let pending = SignatureRecord {
            token: Some("tok".into()),
            signature: None,
            signature_type: None,
            signed_at: None,
        };
        assert!(!apply_signature_record(&mut owner, pending));
        let signed = SignatureRecord {
            token: Some("tok".into()),
            signature: Some("data:image/png;base64,AAAA".into()),
            signature_type: None,
            signed_at: Some("2026-01-01T00:00:00Z".into()),
        };
        assert!(apply_signature_record(&mut owner, signed));
        assert_eq!(owner.signature_type, Some(SignatureType::Drawn));
        assert_eq!(owner.signature_token.as_deref(), Some("tok"));
    }
}
