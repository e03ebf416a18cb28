//! View rendering for the testing-utilities page. Cards for environment,
//! data reset, schema tools, lookup-data sync, alerts and the QA checklist.

use common::checklist::CheckStatus;
use common::model::testing::{ColumnDiffKind, RESETTABLE_TABLES};
use serde_json::Value;
use yew::html::Scope;
use yew::prelude::*;

use super::messages::Msg;
use super::state::{PendingAction, TestingPage};
use crate::helpers::{input_checked, input_value, select_value};
use crate::tops_sheet::yw_material_top_sheet::YwMaterialTopSheet;

pub fn view(page: &TestingPage, ctx: &Context<TestingPage>) -> Html {
    let link = ctx.link();
    html! {
        <div class="testing-page">
            <h2>{"Testing utilities"}</h2>
            if let Some(busy) = page.busy {
                <p class="busy">{ format!("{busy}...") }</p>
            }
            { build_environment(page) }
            { build_reset(page, link) }
            { build_schema(page, link) }
            { build_data_sync(page, link) }
            <section class="card">
                <h3>{"Alerts"}</h3>
                <button disabled={page.busy.is_some()} onclick={link.callback(|_| Msg::CreateTestAlert)}>
                    {"Create test alert"}
                </button>
            </section>
            { build_checklist(page, link) }
            { build_confirm(page, link) }
            <YwMaterialTopSheet
                open={page.sheet.is_some()}
                title={page.sheet.as_ref().map(|s| s.title.clone()).unwrap_or_default()}
                on_close={link.callback(|_| Msg::CloseSheet)}
            >
                <pre class="result-json">{ page.sheet.as_ref().map(|s| s.body.clone()).unwrap_or_default() }</pre>
            </YwMaterialTopSheet>
        </div>
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn build_environment(page: &TestingPage) -> Html {
    let Some(env) = &page.environment else {
        return html! { <section class="card"><p class="muted">{"Loading environment..."}</p></section> };
    };
    html! {
        <section class="card">
            <h3>{"Environment"}</h3>
            <p>
                <strong>{ &env.environment }</strong>
                if let Some(db) = &env.database {
                    { format!(" ({db})") }
                }
            </p>
            if let Some(diagnostics) = &page.diagnostics {
                <table class="kv">
                    { for diagnostics.iter().map(|(k, v)| html! {
                        <tr><th>{ k }</th><td>{ value_text(v) }</td></tr>
                    }) }
                </table>
            }
        </section>
    }
}

fn build_reset(page: &TestingPage, link: &Scope<TestingPage>) -> Html {
    html! {
        <section class="card">
            <h3>{"Reset data"}</h3>
            <div class="table-picks">
                { for RESETTABLE_TABLES.iter().map(|(table, label)| {
                    let name = table.to_string();
                    html! {
                        <label>
                            <input
                                type="checkbox"
                                checked={page.reset_tables.contains(*table)}
                                onchange={link.callback(move |e: Event| Msg::ToggleResetTable(name.clone(), input_checked(&e)))}
                            />
                            {" "}{ *label }
                        </label>
                    }
                }) }
            </div>
            <button class="danger" disabled={page.busy.is_some()} onclick={link.callback(|_| Msg::Ask(PendingAction::Reset))}>
                {"Reset selected tables"}
            </button>
            <button class="danger" disabled={page.busy.is_some()} onclick={link.callback(|_| Msg::Ask(PendingAction::ClearProspects))}>
                {"Clear prospects"}
            </button>
        </section>
    }
}

fn env_picker(page: &TestingPage, current: &str, on_change: Callback<Event>) -> Html {
    html! {
        <select onchange={on_change}>
            { for page.environments().into_iter().map(|env| {
                let selected = env == current;
                html! { <option value={env.clone()} {selected}>{ env }</option> }
            }) }
        </select>
    }
}

fn kind_label(kind: ColumnDiffKind) -> &'static str {
    match kind {
        ColumnDiffKind::MissingInTarget => "missing in target",
        ColumnDiffKind::MissingInSource => "missing in source",
        ColumnDiffKind::TypeMismatch => "type mismatch",
    }
}

fn build_schema(page: &TestingPage, link: &Scope<TestingPage>) -> Html {
    let drift = page.drift.as_ref().map(|drift| {
        if !drift.has_drift() {
            return html! { <p class="ok">{ format!("No drift between {} and {}.", drift.source, drift.target) }</p> };
        }
        html! {
            <>
                <p>{ format!("{} column difference(s) across {} table(s).", drift.column_difference_count(), drift.tables.len()) }</p>
                <table>
                    <tr><th>{"Table"}</th><th>{"Column"}</th><th>{"Difference"}</th><th>{"Source"}</th><th>{"Target"}</th></tr>
                    { for drift.tables.iter().flat_map(|t| t.columns.iter().map(move |c| html! {
                        <tr>
                            <td>{ &t.table }</td>
                            <td>{ &c.column }</td>
                            <td>{ kind_label(c.kind) }</td>
                            <td>{ c.source_type.clone().unwrap_or_default() }</td>
                            <td>{ c.target_type.clone().unwrap_or_default() }</td>
                        </tr>
                    })) }
                </table>
                <button class="danger" disabled={page.busy.is_some()} onclick={link.callback(|_| Msg::Ask(PendingAction::SchemaSync))}>
                    {"Sync schema"}
                </button>
            </>
        }
    });
    let comparison = page.comparison.as_ref().map(|cmp| html! {
        <div class="comparison">
            <p>{ format!("Environments: {}", cmp.environments.join(", ")) }</p>
            { for cmp.missing_tables.iter().filter(|(_, t)| !t.is_empty()).map(|(env, tables)| html! {
                <p>{ format!("Missing in {env}: {}", tables.join(", ")) }</p>
            }) }
            <p>{ format!("{} table(s) with column differences", cmp.differences.len()) }</p>
        </div>
    });

    html! {
        <section class="card">
            <h3>{"Schema"}</h3>
            <button disabled={page.busy.is_some()} onclick={link.callback(|_| Msg::CompareSchemas)}>{"Compare all environments"}</button>
            { comparison.unwrap_or_else(|| html! {}) }
            <div class="env-pair">
                { env_picker(page, &page.source_env, link.callback(|e: Event| Msg::SetSource(select_value(&e)))) }
                {" → "}
                { env_picker(page, &page.target_env, link.callback(|e: Event| Msg::SetTarget(select_value(&e)))) }
                <button disabled={page.busy.is_some()} onclick={link.callback(|_| Msg::CheckDrift)}>{"Check drift"}</button>
            </div>
            { drift.unwrap_or_else(|| html! {}) }
        </section>
    }
}

fn build_data_sync(page: &TestingPage, link: &Scope<TestingPage>) -> Html {
    let comparison = page.data_comparison.as_ref().map(|cmp| html! {
        <table>
            <tr><th>{"Table"}</th><th>{ &page.source_env }</th><th>{ &page.target_env }</th></tr>
            { for cmp.tables.iter().map(|t| html! {
                <tr class={classes!((!t.in_sync()).then_some("out-of-sync"))}>
                    <td>{ &t.table }</td>
                    <td>{ t.source_count }</td>
                    <td>{ t.target_count }</td>
                </tr>
            }) }
        </table>
    });
    let on_pick = link.callback(|e: Event| {
        let name = select_value(&e);
        Msg::SelectExport((!name.is_empty()).then_some(name))
    });

    html! {
        <section class="card">
            <h3>{"Lookup data sync"}</h3>
            <button disabled={page.busy.is_some()} onclick={link.callback(|_| Msg::Export)}>
                { format!("Export from {}", page.source_env) }
            </button>
            <select onchange={on_pick}>
                <option value="" selected={page.selected_export.is_none()}>{"Select export"}</option>
                { for page.exports.iter().map(|export| {
                    let selected = page.selected_export.as_deref() == Some(export.name.as_str());
                    let detail = match (&export.environment, export.record_count) {
                        (Some(env), Some(count)) => format!(" ({env}, {count} records)"),
                        (Some(env), None) => format!(" ({env})"),
                        (None, Some(count)) => format!(" ({count} records)"),
                        (None, None) => String::new(),
                    };
                    html! { <option value={export.name.clone()} {selected}>{ format!("{}{detail}", export.name) }</option> }
                }) }
            </select>
            <button class="danger" disabled={page.busy.is_some()} onclick={link.callback(|_| Msg::Ask(PendingAction::Import))}>
                { format!("Import into {}", page.target_env) }
            </button>
            <button disabled={page.busy.is_some()} onclick={link.callback(|_| Msg::CompareData)}>{"Compare counts"}</button>
            { comparison.unwrap_or_else(|| html! {}) }
        </section>
    }
}

fn build_checklist(page: &TestingPage, link: &Scope<TestingPage>) -> Html {
    let summary = page.checklist.summary();
    let groups = page
        .checklist
        .categories()
        .into_iter()
        .map(|category| html! {
            <div class="checklist-group">
                <h4>{ category }</h4>
                { for page.checklist.in_category(category).map(|item| {
                    let id = item.id.clone();
                    let on_status = {
                        let id = id.clone();
                        link.batch_callback(move |e: Event| {
                            let picked = select_value(&e);
                            CheckStatus::ALL
                                .into_iter()
                                .find(|s| s.label() == picked)
                                .map(|s| Msg::SetCheck(id.clone(), s))
                        })
                    };
                    let on_notes = link.callback(move |e: InputEvent| Msg::SetCheckNotes(id.clone(), input_value(&e)));
                    html! {
                        <div class={classes!("checklist-item", format!("status-{}", item.status.label().to_lowercase()))}>
                            <span class="description">{ &item.description }</span>
                            <select onchange={on_status}>
                                { for CheckStatus::ALL.iter().map(|s| html! {
                                    <option value={s.label()} selected={*s == item.status}>{ s.label() }</option>
                                }) }
                            </select>
                            <input placeholder="Notes" value={item.notes.clone()} oninput={on_notes} />
                        </div>
                    }
                }) }
            </div>
        })
        .collect::<Html>();

    html! {
        <section class="card">
            <h3>{"QA checklist"}</h3>
            <p>
                { format!(
                    "{}% complete: {} passed, {} failed, {} skipped, {} pending",
                    summary.completion(), summary.passed, summary.failed, summary.skipped, summary.pending
                ) }
            </p>
            { groups }
            <button onclick={link.callback(|_| Msg::ResetChecklist)}>{"Reset checklist"}</button>
        </section>
    }
}

fn build_confirm(page: &TestingPage, link: &Scope<TestingPage>) -> Html {
    let Some(action) = page.pending else {
        return html! {};
    };
    html! {
        <YwMaterialTopSheet open={true} title="Please confirm" on_close={link.callback(|_| Msg::Cancel)}>
            <p>{ action.prompt() }</p>
            <button class="danger" onclick={link.callback(|_| Msg::Confirm)}>{"Confirm"}</button>
            <button onclick={link.callback(|_| Msg::Cancel)}>{"Cancel"}</button>
        </YwMaterialTopSheet>
    }
}
