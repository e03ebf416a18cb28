//! Update function for the prospect wizard.
//!
//! Saves go out after every step change and after `AUTOSAVE_DEBOUNCE_MS` of
//! quiet following an edit. Each save carries a `SaveToken`; responses
//! older than the newest acknowledged one are dropped.

use common::api::{self, ProspectAction};
use common::autosave::{SaveOutcome, AUTOSAVE_DEBOUNCE_MS};
use common::model::owner::{Owner, OwnersWithSignatures};
use common::model::prospect::{
    FormData, Prospect, ProspectSession, SaveFormDataRequest, SubmitApplicationRequest, SubmitApplicationResponse,
};
use common::model::pdf_form::PdfForm;
use common::model::template::ApplicationTemplate;
use common::wizard::Wizard;
use gloo_timers::callback::Timeout;
use serde_json::Value;
use yew::platform::spawn_local;
use yew::prelude::*;

use super::messages::Msg;
use super::state::{Phase, WizardPage, WizardSource};
use crate::api as http;
use crate::helpers::show_toast;

pub fn update(page: &mut WizardPage, ctx: &Context<WizardPage>, msg: Msg) -> bool {
    match msg {
        Msg::Load => {
            let source = ctx.props().source.clone();
            let link = ctx.link().clone();
            spawn_local(async move {
                let loaded = match source {
                    WizardSource::Prospect(token) => load_prospect(&token).await,
                    WizardSource::PdfForm(id) => load_pdf_form(id).await,
                };
                match loaded {
                    Ok((prospect, wizard)) => link.send_message(Msg::Ready { prospect, wizard }),
                    Err(message) => link.send_message(Msg::LoadFailed(message)),
                }
            });
            false
        }
        Msg::Ready { prospect, wizard } => {
            match &prospect {
                Some(p) if p.is_submitted() => {
                    page.phase = Phase::Submitted(SubmitApplicationResponse {
                        success: true,
                        message: Some("This application has already been submitted.".to_string()),
                        application_id: None,
                    });
                }
                Some(p) => {
                    page.wizard = Some(wizard);
                    page.phase = Phase::Active;
                    let start = api::prospect_action(p.id, ProspectAction::StartApplication);
                    spawn_local(async move {
                        if let Err(err) = http::post_empty::<Value>(&start, "Failed to start application").await {
                            gloo_console::warn!(err.to_string());
                        }
                    });
                }
                None => {
                    page.wizard = Some(wizard);
                    page.phase = Phase::Active;
                }
            }
            page.prospect = prospect;
            true
        }
        Msg::LoadFailed(message) => {
            page.phase = Phase::Failed(message);
            true
        }

        Msg::Edit(key, value) => {
            let Some(wizard) = page.wizard.as_mut() else {
                return false;
            };
            wizard.set_value(&key, value);
            page.errors.remove(&key);
            schedule_autosave(page, ctx);
            true
        }
        Msg::AddressValidated(field_id, address) => {
            let Some(wizard) = page.wizard.as_mut() else {
                return false;
            };
            wizard.apply_address(&field_id, &address);
            page.errors.remove(&field_id);
            schedule_autosave(page, ctx);
            true
        }
        Msg::OwnersChanged(field_id, owners) => {
            let Some(wizard) = page.wizard.as_mut() else {
                return false;
            };
            wizard.set_owners(&field_id, &owners);
            page.errors.remove(&field_id);
            schedule_autosave(page, ctx);
            true
        }

        Msg::Next => {
            let Some(wizard) = page.wizard.as_mut() else {
                return false;
            };
            match wizard.next() {
                Ok(_) => {
                    page.errors.clear();
                    save_now(page, ctx);
                    scroll_to_top();
                }
                Err(errors) => page.errors = errors,
            }
            true
        }
        Msg::Back => {
            let Some(wizard) = page.wizard.as_mut() else {
                return false;
            };
            wizard.back();
            page.errors.clear();
            save_now(page, ctx);
            scroll_to_top();
            true
        }
        Msg::GoTo(step) => {
            let moved = page.wizard.as_mut().is_some_and(|w| w.go_to(step));
            if moved {
                page.errors.clear();
                save_now(page, ctx);
            }
            moved
        }

        Msg::Autosave => {
            page.autosave = None;
            save_now(page, ctx);
            true
        }
        Msg::SaveNow => {
            save_now(page, ctx);
            true
        }
        Msg::SaveDone(token, result) => {
            let outcome = match result {
                Ok(()) => page.saves.succeed(token),
                Err(message) => {
                    let outcome = page.saves.fail(token, message.clone());
                    if outcome == SaveOutcome::Applied {
                        show_toast(&message);
                    }
                    outcome
                }
            };
            outcome == SaveOutcome::Applied || !page.saves.is_saving()
        }

        Msg::Submit => {
            let Some(target) = submit_target(page, ctx) else {
                return false;
            };
            let Some(wizard) = page.wizard.as_mut() else {
                return false;
            };
            if let Err(blocked) = wizard.validate_all() {
                page.errors = blocked.errors;
                show_toast("Please fix the highlighted fields before submitting");
                return true;
            }
            page.errors.clear();
            page.autosave = None;
            page.phase = Phase::Submitting;
            let owners = wizard.all_owners();
            let form_data = wizard.form_data().clone();
            let link = ctx.link().clone();
            spawn_local(async move {
                match submit(target, owners, form_data).await {
                    Ok(response) => link.send_message(Msg::Submitted(response)),
                    Err(message) => link.send_message(Msg::SubmitFailed(message)),
                }
            });
            true
        }
        Msg::Submitted(response) => {
            page.phase = Phase::Submitted(response);
            true
        }
        Msg::SubmitFailed(message) => {
            show_toast(&message);
            page.phase = Phase::Active;
            true
        }
    }
}

/// Restarts the debounce timer; the previous one is cancelled on drop.
fn schedule_autosave(page: &mut WizardPage, ctx: &Context<WizardPage>) {
    let link = ctx.link().clone();
    page.autosave = Some(Timeout::new(AUTOSAVE_DEBOUNCE_MS, move || {
        link.send_message(Msg::Autosave);
    }));
}

/// Where saves and the final submission go.
#[derive(Clone, Copy)]
enum SubmitTarget {
    Prospect(i64),
    PdfForm(i64),
}

fn submit_target(page: &WizardPage, ctx: &Context<WizardPage>) -> Option<SubmitTarget> {
    match ctx.props().source {
        WizardSource::Prospect(_) => page.prospect_id().map(SubmitTarget::Prospect),
        WizardSource::PdfForm(id) => Some(SubmitTarget::PdfForm(id)),
    }
}

fn save_now(page: &mut WizardPage, ctx: &Context<WizardPage>) {
    let Some(target) = submit_target(page, ctx) else {
        return;
    };
    let Some(wizard) = page.wizard.as_ref() else {
        return;
    };
    page.autosave = None;
    let body: SaveFormDataRequest = wizard.save_request();
    let token = page.saves.begin();
    let path = match target {
        SubmitTarget::Prospect(id) => api::prospect_action(id, ProspectAction::SaveFormData),
        SubmitTarget::PdfForm(id) => api::pdf_form_auto_save(id),
    };
    let link = ctx.link().clone();
    spawn_local(async move {
        let result = http::post::<_, Value>(&path, &body, "Failed to save your progress")
            .await
            .map(|_| ())
            .map_err(|e| e.to_string());
        link.send_message(Msg::SaveDone(token, result));
    });
}

async fn load_prospect(token: &str) -> Result<(Option<Prospect>, Wizard), String> {
    let session: ProspectSession = http::get(
        &api::prospect_by_token(&http::segment(token)),
        "This application link is invalid or has expired",
    )
    .await
    .map_err(|e| e.to_string())?;
    let template: ApplicationTemplate = match (session.template, session.prospect.template_id) {
        (Some(template), _) => template,
        (None, Some(id)) => http::get(&api::template(id), "Failed to load the application form")
            .await
            .map_err(|e| e.to_string())?,
        (None, None) => return Err("No application form is assigned to this link".to_string()),
    };
    let prospect = session.prospect;
    let wizard = Wizard::from_template(&template, prospect.form_data.clone(), prospect.current_step);
    Ok((Some(prospect), wizard))
}

async fn load_pdf_form(id: i64) -> Result<(Option<Prospect>, Wizard), String> {
    let form: PdfForm = http::get(&api::pdf_form_with_fields(id), "Failed to load the PDF form")
        .await
        .map_err(|e| e.to_string())?;
    let sections = form.wizard_sections();
    if sections.is_empty() {
        return Err(format!("\"{}\" has no fillable fields", form.name));
    }
    Ok((None, Wizard::new(sections, FormData::new(), 0)))
}

async fn submit(
    target: SubmitTarget,
    owners: Vec<Owner>,
    form_data: FormData,
) -> Result<SubmitApplicationResponse, String> {
    let path = match target {
        SubmitTarget::Prospect(prospect_id) => {
            if !owners.is_empty() {
                http::post::<_, Value>(
                    &api::prospect_action(prospect_id, ProspectAction::OwnersWithSignatures),
                    &OwnersWithSignatures { owners },
                    "Failed to save owner signatures",
                )
                .await
                .map_err(|e| e.to_string())?;
            }
            api::prospect_action(prospect_id, ProspectAction::SubmitApplication)
        }
        SubmitTarget::PdfForm(id) => api::pdf_form_submissions(id),
    };
    let response: Option<SubmitApplicationResponse> = http::post(
        &path,
        &SubmitApplicationRequest { form_data },
        "Failed to submit application",
    )
    .await
    .map_err(|e| e.to_string())?;
    Ok(response.unwrap_or(SubmitApplicationResponse {
        success: true,
        message: None,
        application_id: None,
    }))
}

fn scroll_to_top() {
    if let Some(window) = web_sys::window() {
        window.scroll_to_with_x_and_y(0.0, 0.0);
    }
}
