//! View rendering for the prospect wizard: step header, progress bar, the
//! visible fields of the current step and the navigation bar.

use common::autosave::SaveStatus;
use common::wizard::Wizard;
use yew::html::Scope;
use yew::prelude::*;

use super::fields::render_field;
use super::messages::Msg;
use super::state::{Phase, WizardPage};
use crate::helpers::markdown;

pub fn view(page: &WizardPage, ctx: &Context<WizardPage>) -> Html {
    let link = ctx.link();
    match (&page.phase, &page.wizard) {
        (Phase::Loading, _) => html! { <div class="wizard"><p class="muted">{"Loading your application..."}</p></div> },
        (Phase::Failed(message), _) => html! {
            <div class="wizard">
                <h2>{"We could not open this application"}</h2>
                <p class="field-error">{ message }</p>
            </div>
        },
        (Phase::Submitted(response), _) => html! {
            <div class="wizard submitted">
                <h2>{"Application submitted"}</h2>
                <p>{ response.message.clone().unwrap_or_else(|| "Thank you! We will be in touch shortly.".to_string()) }</p>
                if let Some(id) = response.application_id {
                    <p class="muted">{ format!("Reference #{id}") }</p>
                }
            </div>
        },
        (Phase::Active | Phase::Submitting, Some(wizard)) => build_wizard(page, wizard, link),
        (_, None) => html! {},
    }
}

fn build_wizard(page: &WizardPage, wizard: &Wizard, link: &Scope<WizardPage>) -> Html {
    let step = wizard.current_step();
    let submitting = matches!(page.phase, Phase::Submitting);
    let Some(section) = wizard.current_section() else {
        return html! { <div class="wizard"><p>{"This application form has no steps."}</p></div> };
    };
    let fields = wizard
        .visible_fields(step)
        .into_iter()
        .map(|field| render_field(field, wizard, page.errors.get(&field.id), page.prospect_id(), link))
        .collect::<Html>();
    let progress = wizard.progress();

    html! {
        <div class="wizard">
            { build_steps(wizard, link) }
            <div class="progress" style="height:6px;background:#eee;border-radius:3px;">
                <div style={format!("width:{progress}%;height:100%;background:#1976d2;border-radius:3px;")} />
            </div>
            <p class="muted">{ format!("Step {} of {}", step + 1, wizard.step_count()) }</p>
            <h2>{ &section.title }</h2>
            if let Some(description) = &section.description {
                <div class="section-description">{ markdown(description) }</div>
            }
            <div class="wizard-fields">{ fields }</div>
            if !page.errors.is_empty() {
                <p class="field-error">{ format!("{} field(s) need attention.", page.errors.len()) }</p>
            }
            <div class="wizard-nav">
                <button disabled={wizard.is_first() || submitting} onclick={link.callback(|_| Msg::Back)}>{"Back"}</button>
                { save_indicator(page) }
                if wizard.is_last() {
                    <button class="primary" disabled={submitting} onclick={link.callback(|_| Msg::Submit)}>
                        { if submitting { "Submitting..." } else { "Submit application" } }
                    </button>
                } else {
                    <button class="primary" onclick={link.callback(|_| Msg::Next)}>{"Next"}</button>
                }
            </div>
        </div>
    }
}

fn build_steps(wizard: &Wizard, link: &Scope<WizardPage>) -> Html {
    let current = wizard.current_step();
    html! {
        <ol class="wizard-steps">
            { for wizard.sections().iter().enumerate().map(|(index, section)| html! {
                <li
                    class={classes!((index == current).then_some("current"), (index < current).then_some("done"))}
                    onclick={link.callback(move |_| Msg::GoTo(index))}
                >
                    { &section.title }
                </li>
            }) }
        </ol>
    }
}

fn save_indicator(page: &WizardPage) -> Html {
    let text = match page.saves.status() {
        SaveStatus::Idle if page.autosave.is_some() => "Unsaved changes",
        SaveStatus::Idle => "",
        SaveStatus::Saving => "Saving...",
        SaveStatus::Saved if page.autosave.is_some() => "Unsaved changes",
        SaveStatus::Saved => "All changes saved",
        SaveStatus::Failed => page.saves.last_error().unwrap_or("Save failed"),
    };
    html! { <span class="save-status muted">{ text }</span> }
}
