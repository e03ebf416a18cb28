//! Update function for the template administration page.
//!
//! Every server round-trip is spawned from here and reports back through a
//! message; the state itself is only touched synchronously.

use common::api;
use common::editor::{self, build_payload, check_deletable, validate_meta, TemplateMeta};
use common::error::ApiError;
use common::model::template::{Acquirer, ApplicationCounts, ApplicationTemplate, TemplatePayload};
use serde_json::Value;
use wasm_bindgen::JsValue;
use yew::platform::spawn_local;
use yew::prelude::*;

use super::helpers::{apply_change, apply_drop, apply_key_move};
use super::messages::Msg;
use super::state::{DeleteDialog, EditorState, TemplatesPage};
use crate::api as http;
use crate::helpers::show_toast;

pub fn update(page: &mut TemplatesPage, ctx: &Context<TemplatesPage>, msg: Msg) -> bool {
    match msg {
        Msg::Load => {
            page.loading = true;
            let link = ctx.link().clone();
            spawn_local(async move {
                let templates =
                    http::get::<Vec<ApplicationTemplate>>(api::TEMPLATES, "Failed to load templates").await;
                let acquirers =
                    http::get::<Vec<Acquirer>>(api::ACQUIRERS, "Failed to load acquirers").await;
                let counts = http::get::<ApplicationCounts>(
                    api::TEMPLATE_APPLICATION_COUNTS,
                    "Failed to load application counts",
                )
                .await;
                match (templates, acquirers) {
                    (Ok(templates), Ok(acquirers)) => link.send_message(Msg::Loaded {
                        templates,
                        acquirers,
                        counts: counts.unwrap_or_default(),
                    }),
                    (Err(err), _) | (_, Err(err)) => link.send_message(Msg::LoadFailed(err.to_string())),
                }
            });
            true
        }
        Msg::Loaded { templates, acquirers, counts } => {
            page.templates = templates;
            page.acquirers = acquirers;
            page.counts = counts;
            page.loading = false;
            page.load_error = None;
            true
        }
        Msg::LoadFailed(message) => {
            page.loading = false;
            show_toast(&message);
            page.load_error = Some(message);
            true
        }
        Msg::FilterAcquirer(filter) => {
            page.acquirer_filter = filter;
            true
        }

        Msg::NewTemplate => {
            let acquirer_id = page
                .acquirer_filter
                .or_else(|| page.acquirers.first().map(|a| a.id))
                .unwrap_or(0);
            page.editor = Some(EditorState::blank(acquirer_id));
            true
        }
        Msg::EditTemplate(id) => {
            if let Some(template) = page.templates.iter().find(|t| t.id == id) {
                let editor = EditorState::open(template);
                page.unsaved.set(editor.is_dirty());
                page.editor = Some(editor);
            }
            true
        }
        Msg::DuplicateTemplate(id) => {
            if let Some(template) = page.templates.iter().find(|t| t.id == id) {
                page.editor = Some(EditorState::duplicate(template));
                page.unsaved.set(true);
            }
            true
        }
        Msg::ToggleActive(id) => {
            let Some(template) = page.templates.iter().find(|t| t.id == id) else {
                return false;
            };
            let meta = TemplateMeta {
                acquirer_id: template.acquirer_id,
                template_name: template.template_name.clone(),
                version: template.version.clone(),
                is_active: !template.is_active,
            };
            let payload = build_payload(&meta, &template.field_configuration.sections);
            let link = ctx.link().clone();
            spawn_local(async move {
                match http::put::<_, Value>(&api::template(id), &payload, "Failed to update template").await {
                    Ok(_) => {
                        show_toast(if meta.is_active { "Template activated" } else { "Template deactivated" });
                        link.send_message(Msg::Load);
                    }
                    Err(err) => show_toast(&err.to_string()),
                }
            });
            false
        }
        Msg::RequestDelete(id) => {
            let link = ctx.link().clone();
            spawn_local(async move {
                match http::get::<ApplicationCounts>(
                    api::TEMPLATE_APPLICATION_COUNTS,
                    "Failed to check template usage",
                )
                .await
                {
                    Ok(counts) => link.send_message(Msg::DeleteChecked { template_id: id, counts }),
                    Err(err) => show_toast(&err.to_string()),
                }
            });
            false
        }
        Msg::DeleteChecked { template_id, counts } => {
            page.delete_dialog = Some(match check_deletable(template_id, &counts) {
                Ok(()) => DeleteDialog::Confirm {
                    template_id,
                    name: page
                        .templates
                        .iter()
                        .find(|t| t.id == template_id)
                        .map(|t| t.template_name.clone())
                        .unwrap_or_default(),
                },
                Err(blocked) => DeleteDialog::Blocked { message: blocked.to_string() },
            });
            page.counts = counts;
            true
        }
        Msg::ConfirmDelete => {
            let Some(DeleteDialog::Confirm { template_id, .. }) = page.delete_dialog.take() else {
                return true;
            };
            let link = ctx.link().clone();
            spawn_local(async move {
                match http::delete(&api::template(template_id), "Failed to delete template").await {
                    Ok(()) => {
                        show_toast("Template deleted");
                        link.send_message(Msg::Deleted(template_id));
                    }
                    Err(err) => show_toast(&err.to_string()),
                }
            });
            true
        }
        Msg::CloseDeleteDialog => {
            page.delete_dialog = None;
            true
        }
        Msg::Deleted(id) => {
            page.templates.retain(|t| t.id != id);
            page.counts.remove(&id.to_string());
            true
        }

        Msg::CloseEditor => {
            if let Some(editor) = &page.editor {
                if editor.is_dirty() && !confirm_discard() {
                    return false;
                }
            }
            page.editor = None;
            page.unsaved.set(false);
            true
        }
        Msg::Save => save(page, ctx),
        Msg::Saved(id) => {
            if let Some(editor) = page.editor.as_mut() {
                editor.saving = false;
                editor.pdf_file = None;
                if id.is_some() {
                    editor.template_id = id;
                }
                editor.mark_saved();
            }
            page.unsaved.set(false);
            ctx.link().send_message(Msg::Load);
            true
        }
        Msg::SaveFailed(message) => {
            if let Some(editor) = page.editor.as_mut() {
                editor.saving = false;
                editor.problems = vec![message.clone()];
            }
            show_toast(&message);
            true
        }

        edit => match page.editor.as_mut() {
            Some(editor) => {
                let changed = edit_editor(editor, edit);
                page.unsaved.set(editor.is_dirty());
                changed
            }
            None => false,
        },
    }
}

/// Messages that only touch the open editor.
fn edit_editor(editor: &mut EditorState, msg: Msg) -> bool {
    match msg {
        Msg::SetAcquirer(id) => editor.meta.acquirer_id = id,
        Msg::SetName(name) => editor.meta.template_name = name,
        Msg::SetVersion(version) => editor.meta.version = version,
        Msg::SetActive(active) => editor.meta.is_active = active,
        Msg::PdfSelected(file) => editor.pdf_file = file,

        Msg::AddSection => {
            let title = format!("Section {}", editor.sections.len() + 1);
            editor::add_section(&mut editor.sections, &title);
        }
        Msg::RemoveSection(section_id) => {
            if let Some(removed) = editor::remove_section(&mut editor.sections, &section_id) {
                if removed
                    .fields
                    .iter()
                    .any(|f| Some(&f.id) == editor.selected_field.as_ref())
                {
                    editor.selected_field = None;
                }
            }
        }
        Msg::SetSectionTitle(section_id, title) => {
            if let Some(section) = editor.sections.iter_mut().find(|s| s.id == section_id) {
                section.title = title;
            }
        }
        Msg::SetSectionDescription(section_id, description) => {
            if let Some(section) = editor.sections.iter_mut().find(|s| s.id == section_id) {
                section.description = (!description.trim().is_empty()).then_some(description);
            }
        }

        Msg::AddField(section_id) => {
            editor.selected_field = editor::add_field(&mut editor.sections, &section_id);
        }
        Msg::RemoveField(section_id, field_id) => {
            editor::remove_field(&mut editor.sections, &section_id, &field_id);
            if editor.selected_field.as_deref() == Some(field_id.as_str()) {
                editor.selected_field = None;
            }
        }
        Msg::DuplicateField(section_id, field_id) => {
            if let Some(copy) = editor::duplicate_field(&mut editor.sections, &section_id, &field_id) {
                editor.selected_field = Some(copy);
            }
        }
        Msg::SelectField(field_id) => editor.selected_field = field_id,
        Msg::UpdateField(field_id, change) => {
            match editor::find_field_mut(&mut editor.sections, &field_id) {
                Some(field) => apply_change(field, change),
                None => return false,
            }
        }

        Msg::DragStart(source) => {
            editor.dragging = Some(source);
            editor.drop_hint = None;
        }
        Msg::DragOver(target) => {
            if editor.drop_hint.as_ref() == Some(&target) {
                return false;
            }
            editor.drop_hint = Some(target);
        }
        Msg::Drop(target) => {
            if let Some(source) = editor.dragging.take() {
                apply_drop(&mut editor.sections, &source, &target);
            }
            editor.drop_hint = None;
        }
        Msg::DragEnd => {
            editor.dragging = None;
            editor.drop_hint = None;
        }
        Msg::KeyMove(source, direction) => {
            if !apply_key_move(&mut editor.sections, &source, direction) {
                return false;
            }
        }
        _ => return false,
    }
    true
}

fn save(page: &mut TemplatesPage, ctx: &Context<TemplatesPage>) -> bool {
    let Some(editor) = page.editor.as_mut() else {
        return false;
    };
    let mut problems = validate_meta(&editor.meta);
    if editor.sections.is_empty() {
        problems.push("Add at least one section".to_string());
    }
    if !problems.is_empty() {
        editor.problems = problems;
        return true;
    }
    editor.problems.clear();
    editor.saving = true;

    // The payload carries normalized ids; keep the editor in step with it.
    editor::normalize_field_ids(&mut editor.sections);
    let payload = build_payload(&editor.meta, &editor.sections);
    let template_id = editor.template_id;
    let pdf_file = editor.pdf_file.clone();
    let link = ctx.link().clone();

    spawn_local(async move {
        let result = match (pdf_file, template_id) {
            (Some(pdf), _) => upload_with_pdf(&payload, pdf).await,
            (None, Some(id)) => {
                http::put::<_, Value>(&api::template(id), &payload, "Failed to save template").await
            }
            (None, None) => {
                http::post::<_, Value>(api::TEMPLATES, &payload, "Failed to create template").await
            }
        };
        match result {
            Ok(saved) => {
                show_toast("Template saved");
                link.send_message(Msg::Saved(saved_id(&saved)));
            }
            Err(err) => link.send_message(Msg::SaveFailed(err.to_string())),
        }
    });
    true
}

async fn upload_with_pdf(payload: &TemplatePayload, pdf: web_sys::File) -> Result<Value, ApiError> {
    let body = serde_json::to_string(payload).map_err(|e| ApiError::Decode(e.to_string()))?;
    let form = web_sys::FormData::new().map_err(js_error)?;
    form.append_with_blob_and_filename(api::UPLOAD_PDF_PART, &pdf, &pdf.name())
        .map_err(js_error)?;
    form.append_with_str(api::UPLOAD_TEMPLATE_PART, &body)
        .map_err(js_error)?;
    http::post_form(api::TEMPLATE_UPLOAD, form, "Failed to upload template").await
}

/// The save endpoints answer with the template, sometimes wrapped in
/// `{ "template": ... }`.
fn saved_id(body: &Value) -> Option<i64> {
    body.get("id")
        .or_else(|| body.get("template").and_then(|t| t.get("id")))
        .and_then(Value::as_i64)
}

fn confirm_discard() -> bool {
    web_sys::window()
        .and_then(|w| {
            w.confirm_with_message("Discard unsaved changes to this template?")
                .ok()
        })
        .unwrap_or(true)
}

fn js_error(value: JsValue) -> ApiError {
    ApiError::Network(value.as_string().unwrap_or_else(|| format!("{value:?}")))
}
