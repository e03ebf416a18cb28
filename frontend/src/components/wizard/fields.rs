//! Renders one template field as a form control.

use common::address::{validated_record, AddressKeys};
use common::conditional::visible_options;
use common::model::address::ValidatedAddress;
use common::model::owner::Owner;
use common::model::template::{Field, FieldType};
use common::validation::FieldError;
use common::wizard::Wizard;
use serde_json::Value;
use yew::html::Scope;
use yew::prelude::*;

use super::messages::Msg;
use super::state::WizardPage;
use crate::components::address::AddressInput;
use crate::components::owners::OwnersInput;
use crate::helpers::{input_checked, input_value, markdown, select_value, textarea_value};

/// HTML input type for the plain-text family of field types.
fn input_type(field_type: FieldType) -> &'static str {
    match field_type {
        FieldType::Email => "email",
        FieldType::Tel | FieldType::Phone => "tel",
        FieldType::Url => "url",
        FieldType::Date => "date",
        FieldType::Number => "number",
        _ => "text",
    }
}

fn is_checked(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => matches!(s.to_lowercase().as_str(), "yes" | "true" | "on" | "1"),
        _ => false,
    }
}

pub fn render_field(
    field: &Field,
    wizard: &Wizard,
    error: Option<&FieldError>,
    prospect_id: Option<i64>,
    link: &Scope<WizardPage>,
) -> Html {
    let id = field.id.clone();
    let error_text = error.map(|e| e.to_string());

    let control = match field.field_type {
        FieldType::Address => {
            let keys = AddressKeys::for_field(&field.id);
            let values = keys.all().map(|k| wizard.text(k));
            let validated = validated_record(wizard.form_data(), &keys);
            let on_validated = {
                let id = id.clone();
                link.callback(move |address: ValidatedAddress| Msg::AddressValidated(id.clone(), address))
            };
            return html! {
                <div class="wizard-field" key={field.id.clone()}>
                    <AddressInput
                        field_id={field.id.clone()}
                        label={field.label.clone()}
                        required={field.required}
                        {values}
                        {validated}
                        error={error_text}
                        on_change={link.callback(|(key, value): (String, Value)| Msg::Edit(key, value))}
                        {on_validated}
                    />
                </div>
            };
        }
        FieldType::Ownership => {
            let on_change = link.callback(move |owners: Vec<Owner>| Msg::OwnersChanged(id.clone(), owners));
            return html! {
                <div class="wizard-field" key={field.id.clone()}>
                    <OwnersInput
                        label={field.label.clone()}
                        owners={wizard.owners(&field.id)}
                        {prospect_id}
                        error={error_text}
                        {on_change}
                    />
                </div>
            };
        }
        FieldType::Checkbox => {
            let onchange = link.callback(move |e: Event| Msg::Edit(id.clone(), Value::Bool(input_checked(&e))));
            html! {
                <label class="checkbox">
                    <input type="checkbox" checked={is_checked(wizard.value(&field.id))} {onchange} />
                    {" "}{ &field.label }
                </label>
            }
        }
        FieldType::Textarea => {
            let oninput = link.callback(move |e: InputEvent| Msg::Edit(id.clone(), Value::String(textarea_value(&e))));
            html! {
                <textarea
                    placeholder={field.placeholder.clone().unwrap_or_default()}
                    value={wizard.text(&field.id)}
                    {oninput}
                />
            }
        }
        FieldType::Select => {
            let current = wizard.text(&field.id);
            let onchange = link.callback(move |e: Event| Msg::Edit(id.clone(), Value::String(select_value(&e))));
            html! {
                <select {onchange}>
                    <option value="" selected={current.is_empty()}>
                        { field.placeholder.clone().unwrap_or_else(|| "Select...".to_string()) }
                    </option>
                    { for visible_options(field, wizard.form_data()).into_iter().map(|o| html! {
                        <option value={o.value().to_string()} selected={o.value() == current}>{ o.label() }</option>
                    }) }
                </select>
            }
        }
        FieldType::Radio => {
            let current = wizard.text(&field.id);
            html! {
                <div class="radio-group">
                    { for visible_options(field, wizard.form_data()).into_iter().map(|o| {
                        let value = o.value().to_string();
                        let key = id.clone();
                        let pick = value.clone();
                        html! {
                            <label>
                                <input
                                    type="radio"
                                    name={id.clone()}
                                    value={value.clone()}
                                    checked={value == current}
                                    onchange={link.callback(move |_| Msg::Edit(key.clone(), Value::String(pick.clone())))}
                                />
                                {" "}{ o.label() }
                            </label>
                        }
                    }) }
                </div>
            }
        }
        other => {
            let oninput = link.callback(move |e: InputEvent| Msg::Edit(id.clone(), Value::String(input_value(&e))));
            let inputmode = matches!(other, FieldType::Currency | FieldType::Zipcode | FieldType::Ein)
                .then_some("numeric");
            html! {
                <input
                    type={input_type(other)}
                    inputmode={inputmode}
                    placeholder={field.placeholder.clone().unwrap_or_default()}
                    value={wizard.text(&field.id)}
                    {oninput}
                />
            }
        }
    };

    html! {
        <div class={classes!("wizard-field", error.is_some().then_some("invalid"))} key={field.id.clone()}>
            if field.field_type != FieldType::Checkbox {
                <label>
                    { &field.label }
                    if field.required { <span class="required">{" *"}</span> }
                </label>
            }
            { control }
            if let Some(help) = &field.help_text {
                <div class="help-text">{ markdown(help) }</div>
            }
            if let Some(text) = error_text {
                <p class="field-error">{ text }</p>
            }
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn checkbox_accepts_string_truthy_values() {
        assert!(is_checked(Some(&json!(true))));
        assert!(is_checked(Some(&json!("Yes"))));
        assert!(!is_checked(Some(&json!("no"))));
        assert!(!is_checked(None));
    }

    #[test]
    fn input_types() {
        assert_eq!(input_type(FieldType::Phone), "tel");
        assert_eq!(input_type(FieldType::Currency), "text");
        assert_eq!(input_type(FieldType::Date), "date");
    }
}
