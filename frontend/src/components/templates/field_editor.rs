//! Property panel for the selected field.

use common::model::template::{
    ConditionOperator, ConditionalAction, Field, FieldOption, FieldType, Section,
};
use yew::html::Scope;
use yew::prelude::*;

use super::helpers::condition_targets;
use super::messages::{FieldChange, Msg};
use super::state::TemplatesPage;
use crate::helpers::{input_checked, input_value, select_value};

fn on_text(
    link: &Scope<TemplatesPage>,
    field_id: &str,
    change: fn(String) -> FieldChange,
) -> Callback<InputEvent> {
    let id = field_id.to_string();
    link.callback(move |e: InputEvent| Msg::UpdateField(id.clone(), change(input_value(&e))))
}

fn number_text(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

pub fn field_editor(field: &Field, sections: &[Section], link: &Scope<TemplatesPage>) -> Html {
    let id = field.id.clone();
    let on_type = {
        let id = id.clone();
        link.callback(move |e: Event| {
            Msg::UpdateField(id.clone(), FieldChange::Type(FieldType::parse(&select_value(&e))))
        })
    };
    let on_required = {
        let id = id.clone();
        link.callback(move |e: Event| Msg::UpdateField(id.clone(), FieldChange::Required(input_checked(&e))))
    };
    let bounds_label = match field.field_type {
        FieldType::Number | FieldType::Currency => "value",
        _ => "length",
    };

    html! {
        <div class="field-editor">
            <h3>{"Field properties"}</h3>
            <p class="muted">{ format!("id: {}", field.id) }</p>
            <label>{"Label"}
                <input value={field.label.clone()} oninput={on_text(link, &id, FieldChange::Label)} />
            </label>
            <label>{"Type"}
                <select onchange={on_type}>
                    { for FieldType::ALL.iter().map(|t| html! {
                        <option value={t.as_str()} selected={*t == field.field_type}>{ t.as_str() }</option>
                    }) }
                </select>
            </label>
            <label>
                <input type="checkbox" checked={field.required} onchange={on_required} />
                {" Required"}
            </label>
            <label>{"Placeholder"}
                <input
                    value={field.placeholder.clone().unwrap_or_default()}
                    oninput={on_text(link, &id, FieldChange::Placeholder)}
                />
            </label>
            <label>{"Help text"}
                <input
                    value={field.help_text.clone().unwrap_or_default()}
                    oninput={on_text(link, &id, FieldChange::HelpText)}
                />
            </label>
            <label>{"Pattern"}
                <input
                    placeholder="^[A-Z]{2}$"
                    value={field.pattern.clone().unwrap_or_default()}
                    oninput={on_text(link, &id, FieldChange::Pattern)}
                />
            </label>
            <div class="bounds">
                <label>{ format!("Min {bounds_label}") }
                    <input type="number" value={number_text(field.min)} oninput={on_text(link, &id, FieldChange::Min)} />
                </label>
                <label>{ format!("Max {bounds_label}") }
                    <input type="number" value={number_text(field.max)} oninput={on_text(link, &id, FieldChange::Max)} />
                </label>
            </div>
            <label>{"PDF field"}
                <input
                    value={field.pdf_field_id.clone().unwrap_or_default()}
                    oninput={on_text(link, &id, FieldChange::PdfFieldId)}
                />
            </label>
            if field.field_type.has_options() {
                { options_editor(field, link) }
            }
            { condition_editor(field, sections, link) }
        </div>
    }
}

fn options_editor(field: &Field, link: &Scope<TemplatesPage>) -> Html {
    let id = field.id.clone();
    let rows = field
        .options
        .iter()
        .flatten()
        .enumerate()
        .map(|(index, option)| {
            let pdf = match option {
                FieldOption::Structured(o) => o.pdf_field_id.clone().unwrap_or_default(),
                FieldOption::Plain(_) => String::new(),
            };
            let on_label = {
                let id = id.clone();
                link.callback(move |e: InputEvent| {
                    Msg::UpdateField(id.clone(), FieldChange::OptionLabel(index, input_value(&e)))
                })
            };
            let on_value = {
                let id = id.clone();
                link.callback(move |e: InputEvent| {
                    Msg::UpdateField(id.clone(), FieldChange::OptionValue(index, input_value(&e)))
                })
            };
            let on_pdf = {
                let id = id.clone();
                link.callback(move |e: InputEvent| {
                    Msg::UpdateField(id.clone(), FieldChange::OptionPdfFieldId(index, input_value(&e)))
                })
            };
            let on_remove = {
                let id = id.clone();
                link.callback(move |_| Msg::UpdateField(id.clone(), FieldChange::RemoveOption(index)))
            };
            html! {
                <li class="option-row">
                    <input placeholder="Label" value={option.label().to_string()} oninput={on_label} />
                    <input placeholder="Value" value={option.value().to_string()} oninput={on_value} />
                    <input placeholder="PDF field" value={pdf} oninput={on_pdf} />
                    <button onclick={on_remove} title="Remove option">
                        <i class="material-icons">{"close"}</i>
                    </button>
                </li>
            }
        })
        .collect::<Html>();

    html! {
        <fieldset class="options">
            <legend>{"Options"}</legend>
            <ul>{ rows }</ul>
            <button onclick={link.callback(move |_| Msg::UpdateField(id.clone(), FieldChange::AddOption))}>
                {"Add option"}
            </button>
        </fieldset>
    }
}

fn condition_editor(field: &Field, sections: &[Section], link: &Scope<TemplatesPage>) -> Html {
    let id = field.id.clone();
    let on_enabled = {
        let id = id.clone();
        link.callback(move |e: Event| {
            Msg::UpdateField(id.clone(), FieldChange::ConditionEnabled(input_checked(&e)))
        })
    };
    let Some(rule) = &field.conditional else {
        return html! {
            <fieldset class="conditional">
                <label>
                    <input type="checkbox" checked={false} onchange={on_enabled} />
                    {" Conditional visibility"}
                </label>
            </fieldset>
        };
    };

    let on_action = {
        let id = id.clone();
        link.callback(move |e: Event| {
            let action = if select_value(&e) == "hide" {
                ConditionalAction::Hide
            } else {
                ConditionalAction::Show
            };
            Msg::UpdateField(id.clone(), FieldChange::ConditionAction(action))
        })
    };
    let on_target = {
        let id = id.clone();
        link.callback(move |e: Event| Msg::UpdateField(id.clone(), FieldChange::ConditionField(select_value(&e))))
    };
    let on_operator = {
        let id = id.clone();
        link.batch_callback(move |e: Event| {
            ConditionOperator::parse(&select_value(&e))
                .map(|op| Msg::UpdateField(id.clone(), FieldChange::ConditionOperator(op)))
        })
    };
    let needs_value = !matches!(
        rule.when.operator,
        ConditionOperator::IsEmpty | ConditionOperator::IsNotEmpty
    );
    let value_text = match &rule.when.value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    };
    let show = rule.action == ConditionalAction::Show;

    html! {
        <fieldset class="conditional">
            <label>
                <input type="checkbox" checked={true} onchange={on_enabled} />
                {" Conditional visibility"}
            </label>
            <select onchange={on_action}>
                <option value="show" selected={show}>{"Show"}</option>
                <option value="hide" selected={!show}>{"Hide"}</option>
            </select>
            {" when "}
            <select onchange={on_target}>
                <option value="" selected={rule.when.field.is_empty()}>{"Select field"}</option>
                { for condition_targets(sections, &field.id).into_iter().map(|(target, label)| {
                    let selected = target == rule.when.field;
                    html! { <option value={target} {selected}>{ label }</option> }
                }) }
            </select>
            <select onchange={on_operator}>
                { for ConditionOperator::ALL.iter().map(|op| html! {
                    <option value={op.as_str()} selected={*op == rule.when.operator}>{ op.as_str() }</option>
                }) }
            </select>
            if needs_value {
                <input value={value_text} oninput={on_text(link, &id, FieldChange::ConditionValue)} />
            }
        </fieldset>
    }
}
