//! View rendering for the template administration page.
//!
//! Two modes: the template table (with acquirer filter and per-row actions)
//! and, when a template is open, the section builder with the field
//! property panel on the right. Sections and fields are reorderable with
//! HTML5 drag and drop or with Alt+ArrowUp / Alt+ArrowDown on a focused row.

use common::editor::Direction;
use common::model::template::Section;
use yew::html::Scope;
use yew::prelude::*;

use super::field_editor::field_editor;
use super::messages::Msg;
use super::state::{DeleteDialog, DragSource, DropTarget, EditorState, TemplatesPage};
use crate::helpers::{input_checked, input_value, select_value, selected_file, textarea_value};
use crate::tops_sheet::yw_material_top_sheet::YwMaterialTopSheet;

pub fn view(page: &TemplatesPage, ctx: &Context<TemplatesPage>) -> Html {
    let link = ctx.link();
    html! {
        <div class="templates-page">
            {
                match &page.editor {
                    Some(editor) => build_editor(page, editor, link),
                    None => build_list(page, link),
                }
            }
            { build_delete_dialog(page, link) }
        </div>
    }
}

fn build_list(page: &TemplatesPage, link: &Scope<TemplatesPage>) -> Html {
    let on_filter = link.callback(|e: Event| Msg::FilterAcquirer(select_value(&e).parse().ok()));
    let rows = page
        .visible_templates()
        .into_iter()
        .map(|t| {
            let id = t.id;
            html! {
                <tr key={id.to_string()}>
                    <td>{ &t.template_name }</td>
                    <td>{ page.acquirer_name(t.acquirer_id) }</td>
                    <td>{ &t.version }</td>
                    <td>
                        <span class={classes!("badge", if t.is_active { "active" } else { "inactive" })}>
                            { if t.is_active { "Active" } else { "Inactive" } }
                        </span>
                    </td>
                    <td>{ page.application_count(id) }</td>
                    <td class="row-actions">
                        <button onclick={link.callback(move |_| Msg::EditTemplate(id))}>{"Edit"}</button>
                        <button onclick={link.callback(move |_| Msg::DuplicateTemplate(id))}>{"Duplicate"}</button>
                        <button onclick={link.callback(move |_| Msg::ToggleActive(id))}>
                            { if t.is_active { "Deactivate" } else { "Activate" } }
                        </button>
                        <button class="danger" onclick={link.callback(move |_| Msg::RequestDelete(id))}>{"Delete"}</button>
                    </td>
                </tr>
            }
        })
        .collect::<Html>();

    html! {
        <>
            <div class="toolbar">
                <h2>{"Application templates"}</h2>
                <select onchange={on_filter}>
                    <option value="" selected={page.acquirer_filter.is_none()}>{"All acquirers"}</option>
                    { for page.acquirers.iter().map(|a| html! {
                        <option value={a.id.to_string()} selected={page.acquirer_filter == Some(a.id)}>
                            { &a.name }
                        </option>
                    }) }
                </select>
                <button onclick={link.callback(|_| Msg::NewTemplate)}>{"New template"}</button>
                <button onclick={link.callback(|_| Msg::Load)} disabled={page.loading}>{"Refresh"}</button>
            </div>
            if let Some(error) = &page.load_error {
                <div class="error-banner">{ error }</div>
            }
            if page.loading {
                <p class="muted">{"Loading templates..."}</p>
            }
            <table class="templates-table">
                <thead>
                    <tr>
                        <th>{"Name"}</th>
                        <th>{"Acquirer"}</th>
                        <th>{"Version"}</th>
                        <th>{"Status"}</th>
                        <th>{"Applications"}</th>
                        <th></th>
                    </tr>
                </thead>
                <tbody>{ rows }</tbody>
            </table>
        </>
    }
}

fn build_editor(page: &TemplatesPage, editor: &EditorState, link: &Scope<TemplatesPage>) -> Html {
    let sections = editor
        .sections
        .iter()
        .enumerate()
        .map(|(index, section)| build_section(editor, index, section, link))
        .collect::<Html>();

    let selected = editor.selected_field.as_ref().and_then(|id| {
        editor
            .sections
            .iter()
            .flat_map(|s| s.fields.iter())
            .find(|f| &f.id == id)
    });

    html! {
        <div class="template-editor">
            { build_meta_bar(page, editor, link) }
            if !editor.problems.is_empty() {
                <ul class="error-banner">
                    { for editor.problems.iter().map(|p| html! { <li>{ p }</li> }) }
                </ul>
            }
            <div class="editor-body" style="display:flex;gap:16px;align-items:flex-start;">
                <div class="sections" style="flex:2;">
                    { sections }
                    <button onclick={link.callback(|_| Msg::AddSection)}>{"Add section"}</button>
                </div>
                <div class="field-panel" style="flex:1;">
                    {
                        match selected {
                            Some(field) => field_editor(field, &editor.sections, link),
                            None => html! { <p class="muted">{"Select a field to edit its properties."}</p> },
                        }
                    }
                </div>
            </div>
        </div>
    }
}

fn build_meta_bar(page: &TemplatesPage, editor: &EditorState, link: &Scope<TemplatesPage>) -> Html {
    let dirty = editor.is_dirty();
    html! {
        <div class="toolbar">
            <button onclick={link.callback(|_| Msg::CloseEditor)}>{"Back"}</button>
            <select onchange={link.callback(|e: Event| Msg::SetAcquirer(select_value(&e).parse().unwrap_or(0)))}>
                <option value="0" selected={editor.meta.acquirer_id == 0}>{"Select acquirer"}</option>
                { for page.acquirers.iter().map(|a| html! {
                    <option value={a.id.to_string()} selected={editor.meta.acquirer_id == a.id}>{ &a.name }</option>
                }) }
            </select>
            <input
                placeholder="Template name"
                value={editor.meta.template_name.clone()}
                oninput={link.callback(|e: InputEvent| Msg::SetName(input_value(&e)))}
            />
            <input
                class="version"
                placeholder="1.0.0"
                value={editor.meta.version.clone()}
                oninput={link.callback(|e: InputEvent| Msg::SetVersion(input_value(&e)))}
            />
            <label>
                <input
                    type="checkbox"
                    checked={editor.meta.is_active}
                    onchange={link.callback(|e: Event| Msg::SetActive(input_checked(&e)))}
                />
                {" Active"}
            </label>
            <label class="pdf-picker">
                {"PDF "}
                <input
                    type="file"
                    accept="application/pdf"
                    onchange={link.callback(|e: Event| Msg::PdfSelected(selected_file(&e)))}
                />
            </label>
            <button
                class="primary"
                disabled={editor.saving}
                onclick={link.callback(|_| Msg::Save)}
                style="position:relative;"
            >
                { if editor.saving { "Saving..." } else { "Save" } }
                if dirty {
                    <span
                        title="Unsaved changes"
                        style="position:absolute;top:4px;right:6px;width:8px;height:8px;background:#e53935;border-radius:50%;"
                    />
                }
            </button>
        </div>
    }
}

fn drag_handlers(
    link: &Scope<TemplatesPage>,
    source: DragSource,
    target: DropTarget,
) -> (Callback<DragEvent>, Callback<DragEvent>, Callback<DragEvent>, Callback<KeyboardEvent>) {
    let start_source = source.clone();
    let ondragstart = link.callback(move |e: DragEvent| {
        e.stop_propagation();
        if let Some(transfer) = e.data_transfer() {
            transfer.set_effect_allowed("move");
            transfer.set_data("text/plain", "").ok();
        }
        Msg::DragStart(start_source.clone())
    });
    let over_target = target.clone();
    let ondragover = link.callback(move |e: DragEvent| {
        e.prevent_default();
        e.stop_propagation();
        Msg::DragOver(over_target.clone())
    });
    let ondrop = link.callback(move |e: DragEvent| {
        e.prevent_default();
        e.stop_propagation();
        Msg::Drop(target.clone())
    });
    let onkeydown = link.batch_callback(move |e: KeyboardEvent| {
        if !e.alt_key() {
            return None;
        }
        let direction = match e.key().as_str() {
            "ArrowUp" => Direction::Up,
            "ArrowDown" => Direction::Down,
            _ => return None,
        };
        e.prevent_default();
        e.stop_propagation();
        Some(Msg::KeyMove(source.clone(), direction))
    });
    (ondragstart, ondragover, ondrop, onkeydown)
}

fn build_section(
    editor: &EditorState,
    index: usize,
    section: &Section,
    link: &Scope<TemplatesPage>,
) -> Html {
    let (ondragstart, ondragover, ondrop, onkeydown) = drag_handlers(
        link,
        DragSource::Section { index },
        DropTarget::Section { index },
    );
    let hinted = editor.drop_hint == Some(DropTarget::Section { index })
        && matches!(editor.dragging, Some(DragSource::Section { .. }));

    let section_id = section.id.clone();
    let on_title = {
        let id = section_id.clone();
        link.callback(move |e: InputEvent| Msg::SetSectionTitle(id.clone(), input_value(&e)))
    };
    let on_description = {
        let id = section_id.clone();
        link.callback(move |e: InputEvent| Msg::SetSectionDescription(id.clone(), textarea_value(&e)))
    };
    let on_remove = {
        let id = section_id.clone();
        link.callback(move |_| Msg::RemoveSection(id.clone()))
    };
    let on_add_field = {
        let id = section_id.clone();
        link.callback(move |_| Msg::AddField(id.clone()))
    };

    let fields = section
        .fields
        .iter()
        .enumerate()
        .map(|(field_index, field)| {
            let (ondragstart, ondragover, ondrop, onkeydown) = drag_handlers(
                link,
                DragSource::Field { section_id: section_id.clone(), index: field_index },
                DropTarget::Field { section_id: section_id.clone(), index: field_index },
            );
            let selected = editor.selected_field.as_deref() == Some(field.id.as_str());
            let hinted = editor.drop_hint
                == Some(DropTarget::Field { section_id: section_id.clone(), index: field_index });
            let field_id = field.id.clone();
            let on_select = {
                let id = field_id.clone();
                link.callback(move |_| Msg::SelectField(Some(id.clone())))
            };
            let on_duplicate = {
                let (sid, fid) = (section_id.clone(), field_id.clone());
                link.callback(move |e: MouseEvent| {
                    e.stop_propagation();
                    Msg::DuplicateField(sid.clone(), fid.clone())
                })
            };
            let on_remove = {
                let (sid, fid) = (section_id.clone(), field_id.clone());
                link.callback(move |e: MouseEvent| {
                    e.stop_propagation();
                    Msg::RemoveField(sid.clone(), fid.clone())
                })
            };
            html! {
                <li
                    key={field.id.clone()}
                    class={classes!("field-row", selected.then_some("selected"), hinted.then_some("drop-hint"))}
                    draggable="true"
                    tabindex="0"
                    {ondragstart}
                    {ondragover}
                    {ondrop}
                    ondragend={link.callback(|_: DragEvent| Msg::DragEnd)}
                    {onkeydown}
                    onclick={on_select}
                >
                    <i class="material-icons drag-handle">{"drag_indicator"}</i>
                    <span class="field-label">{ &field.label }</span>
                    <span class="field-type muted">{ field.field_type.as_str() }</span>
                    if field.required {
                        <span class="required">{"*"}</span>
                    }
                    if field.conditional.is_some() {
                        <i class="material-icons muted" title="Conditional">{"call_split"}</i>
                    }
                    <button onclick={on_duplicate} title="Duplicate">
                        <i class="material-icons">{"content_copy"}</i>
                    </button>
                    <button onclick={on_remove} title="Remove">
                        <i class="material-icons">{"delete"}</i>
                    </button>
                </li>
            }
        })
        .collect::<Html>();

    let end_target = DropTarget::SectionEnd { section_id: section_id.clone() };
    let end_hinted = editor.drop_hint.as_ref() == Some(&end_target);
    let on_end_over = {
        let target = end_target.clone();
        link.callback(move |e: DragEvent| {
            e.prevent_default();
            e.stop_propagation();
            Msg::DragOver(target.clone())
        })
    };
    let on_end_drop = link.callback(move |e: DragEvent| {
        e.prevent_default();
        e.stop_propagation();
        Msg::Drop(end_target.clone())
    });

    html! {
        <section
            key={section.id.clone()}
            class={classes!("section-card", hinted.then_some("drop-hint"))}
            {ondragover}
            {ondrop}
        >
            <header
                class="section-header"
                draggable="true"
                tabindex="0"
                {ondragstart}
                ondragend={link.callback(|_: DragEvent| Msg::DragEnd)}
                {onkeydown}
            >
                <i class="material-icons drag-handle">{"drag_indicator"}</i>
                <input class="section-title" value={section.title.clone()} oninput={on_title} />
                <button onclick={on_remove} title="Remove section">
                    <i class="material-icons">{"delete"}</i>
                </button>
            </header>
            <textarea
                class="section-description"
                placeholder="Description (markdown)"
                value={section.description.clone().unwrap_or_default()}
                oninput={on_description}
            />
            <ul class="field-list">{ fields }</ul>
            <div
                class={classes!("section-end", end_hinted.then_some("drop-hint"))}
                ondragover={on_end_over}
                ondrop={on_end_drop}
            >
                <button onclick={on_add_field}>{"Add field"}</button>
            </div>
        </section>
    }
}

fn build_delete_dialog(page: &TemplatesPage, link: &Scope<TemplatesPage>) -> Html {
    let on_close = link.callback(|_| Msg::CloseDeleteDialog);
    match &page.delete_dialog {
        Some(DeleteDialog::Confirm { name, .. }) => html! {
            <YwMaterialTopSheet open={true} title="Delete template" {on_close}>
                <p>{ format!("Delete \"{name}\"? This cannot be undone.") }</p>
                <button class="danger" onclick={link.callback(|_| Msg::ConfirmDelete)}>{"Delete"}</button>
                <button onclick={link.callback(|_| Msg::CloseDeleteDialog)}>{"Cancel"}</button>
            </YwMaterialTopSheet>
        },
        Some(DeleteDialog::Blocked { message }) => html! {
            <YwMaterialTopSheet open={true} title="Template in use" {on_close}>
                <p>{ message }</p>
                <button onclick={link.callback(|_| Msg::CloseDeleteDialog)}>{"OK"}</button>
            </YwMaterialTopSheet>
        },
        None => html! {},
    }
}
