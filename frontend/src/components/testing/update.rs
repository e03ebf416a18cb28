//! Update function for the testing-utilities page.
//!
//! Each admin operation is fire-and-report: the request is spawned, the
//! page shows which operation is running, and the JSON answer is shown in
//! the result sheet. Destructive operations go through `Ask`/`Confirm`.

use common::api;
use common::model::testing::{
    DataSyncComparison, DataSyncExport, DbDiagnostics, DbEnvironment, OperationResult, ResetRequest,
    SchemaComparison, SchemaDrift, SchemaSyncRequest,
};
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use yew::html::Scope;
use yew::platform::spawn_local;
use yew::prelude::*;

use super::messages::Msg;
use super::state::{PendingAction, ResultSheet, TestingPage};
use super::storage::store_checklist;
use crate::api as http;
use crate::helpers::show_toast;

fn pretty(value: &impl Serialize) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

/// Runs `request` and reports its JSON body in the result sheet.
fn report<F>(link: &Scope<TestingPage>, title: &'static str, request: F)
where
    F: Future<Output = Result<Value, common::error::ApiError>> + 'static,
{
    let link = link.clone();
    spawn_local(async move {
        match request.await {
            Ok(body) => {
                let outcome = serde_json::from_value::<OperationResult>(body.clone()).ok();
                if outcome.as_ref().is_some_and(|o| !o.success && o.message.is_some()) {
                    let message = outcome.and_then(|o| o.message).unwrap_or_default();
                    link.send_message(Msg::Failed(format!("{title}: {message}")));
                    return;
                }
                let summary = outcome
                    .and_then(|o| o.message)
                    .unwrap_or_else(|| "done".to_string());
                show_toast(&format!("{title}: {summary}"));
                link.send_message(Msg::Done(ResultSheet {
                    title: title.to_string(),
                    body: pretty(&body),
                }));
            }
            Err(err) => link.send_message(Msg::Failed(format!("{title}: {err}"))),
        }
    });
}

pub fn update(page: &mut TestingPage, ctx: &Context<TestingPage>, msg: Msg) -> bool {
    let link = ctx.link();
    match msg {
        Msg::Load => {
            let l = link.clone();
            spawn_local(async move {
                match http::get::<DbEnvironment>(api::DB_ENVIRONMENT, "Failed to load environment").await {
                    Ok(env) => l.send_message(Msg::EnvironmentLoaded(env)),
                    Err(err) => show_toast(&err.to_string()),
                }
                match http::get::<DbDiagnostics>(api::DB_DIAGNOSTICS, "Failed to load diagnostics").await {
                    Ok(diag) => l.send_message(Msg::DiagnosticsLoaded(diag)),
                    Err(err) => gloo_console::warn!(err.to_string()),
                }
                match http::get::<Vec<DataSyncExport>>(api::DATA_SYNC_EXPORTS, "Failed to list exports").await {
                    Ok(exports) => l.send_message(Msg::ExportsLoaded(exports)),
                    Err(err) => gloo_console::warn!(err.to_string()),
                }
            });
            false
        }
        Msg::EnvironmentLoaded(env) => {
            page.environment = Some(env);
            true
        }
        Msg::DiagnosticsLoaded(diag) => {
            page.diagnostics = Some(diag);
            true
        }
        Msg::ExportsLoaded(exports) => {
            if page
                .selected_export
                .as_ref()
                .is_some_and(|name| !exports.iter().any(|e| &e.name == name))
            {
                page.selected_export = None;
            }
            page.exports = exports;
            true
        }

        Msg::ToggleResetTable(table, on) => {
            if on {
                page.reset_tables.insert(table);
            } else {
                page.reset_tables.remove(&table);
            }
            true
        }
        Msg::Ask(action) => {
            if let Some(reason) = page.refusal(action) {
                show_toast(reason);
                return false;
            }
            page.pending = Some(action);
            true
        }
        Msg::Cancel => {
            page.pending = None;
            true
        }
        Msg::Confirm => {
            let Some(action) = page.pending.take() else {
                return false;
            };
            run_confirmed(page, link, action);
            true
        }

        Msg::CompareSchemas => {
            page.busy = Some("Comparing schemas");
            let l = link.clone();
            spawn_local(async move {
                match http::get::<SchemaComparison>(api::SCHEMA_COMPARE, "Schema comparison failed").await {
                    Ok(cmp) => l.send_message(Msg::SchemasCompared(cmp)),
                    Err(err) => l.send_message(Msg::Failed(err.to_string())),
                }
            });
            true
        }
        Msg::SchemasCompared(cmp) => {
            page.busy = None;
            page.comparison = Some(cmp);
            true
        }
        Msg::SetSource(env) => {
            page.source_env = env;
            page.drift = None;
            page.data_comparison = None;
            true
        }
        Msg::SetTarget(env) => {
            page.target_env = env;
            page.drift = None;
            page.data_comparison = None;
            true
        }
        Msg::CheckDrift => {
            if page.same_environments() {
                show_toast("Pick two different environments");
                return false;
            }
            page.busy = Some("Checking schema drift");
            let path = api::schema_drift(&http::segment(&page.source_env), &http::segment(&page.target_env));
            let l = link.clone();
            spawn_local(async move {
                match http::get::<SchemaDrift>(&path, "Schema drift check failed").await {
                    Ok(drift) => l.send_message(Msg::DriftLoaded(drift)),
                    Err(err) => l.send_message(Msg::Failed(err.to_string())),
                }
            });
            true
        }
        Msg::DriftLoaded(drift) => {
            page.busy = None;
            page.drift = Some(drift);
            true
        }

        Msg::Export => {
            page.busy = Some("Exporting lookup data");
            let path = api::data_sync_export(&http::segment(&page.source_env));
            report(link, "Export", async move {
                http::post_empty::<Value>(&path, "Export failed").await
            });
            true
        }
        Msg::SelectExport(name) => {
            page.selected_export = name;
            true
        }
        Msg::CompareData => {
            page.busy = Some("Comparing lookup data");
            let path = api::data_sync_compare(&http::segment(&page.source_env), &http::segment(&page.target_env));
            let l = link.clone();
            spawn_local(async move {
                match http::get::<DataSyncComparison>(&path, "Data comparison failed").await {
                    Ok(cmp) => l.send_message(Msg::DataCompared(cmp)),
                    Err(err) => l.send_message(Msg::Failed(err.to_string())),
                }
            });
            true
        }
        Msg::DataCompared(cmp) => {
            page.busy = None;
            page.data_comparison = Some(cmp);
            true
        }

        Msg::CreateTestAlert => {
            page.busy = Some("Creating test alert");
            report(link, "Test alert", async move {
                http::post_empty::<Value>(api::CREATE_TEST_ALERT, "Failed to create test alert").await
            });
            true
        }

        Msg::SetCheck(id, status) => {
            let changed = page.checklist.set_status(&id, status);
            if changed {
                store_checklist(&page.checklist);
            }
            changed
        }
        Msg::SetCheckNotes(id, notes) => {
            let changed = page.checklist.set_notes(&id, &notes);
            if changed {
                store_checklist(&page.checklist);
            }
            changed
        }
        Msg::ResetChecklist => {
            page.checklist.reset();
            store_checklist(&page.checklist);
            true
        }

        Msg::Done(sheet) => {
            let refresh = matches!(sheet.title.as_str(), "Export" | "Import" | "Reset" | "Clear prospects");
            page.busy = None;
            page.sheet = Some(sheet);
            if refresh {
                link.send_message(Msg::Load);
            }
            true
        }
        Msg::Failed(message) => {
            page.busy = None;
            show_toast(&message);
            true
        }
        Msg::CloseSheet => {
            page.sheet = None;
            true
        }
    }
}

fn run_confirmed(page: &mut TestingPage, link: &Scope<TestingPage>, action: PendingAction) {
    match action {
        PendingAction::Reset => {
            page.busy = Some("Resetting tables");
            let body = ResetRequest {
                tables: page.reset_tables.iter().cloned().collect(),
            };
            report(link, "Reset", async move {
                http::post::<_, Value>(api::RESET_TESTING_DATA, &body, "Reset failed").await
            });
        }
        PendingAction::ClearProspects => {
            page.busy = Some("Clearing prospects");
            report(link, "Clear prospects", async move {
                http::post_empty::<Value>(api::CLEAR_PROSPECTS, "Failed to clear prospects").await
            });
        }
        PendingAction::SchemaSync => {
            page.busy = Some("Syncing schema");
            let body = SchemaSyncRequest {
                source: page.source_env.clone(),
                target: page.target_env.clone(),
                tables: page
                    .drift
                    .as_ref()
                    .map(|d| d.tables.iter().map(|t| t.table.clone()).collect())
                    .unwrap_or_default(),
            };
            report(link, "Schema sync", async move {
                http::post::<_, Value>(api::SCHEMA_SYNC, &body, "Schema sync failed").await
            });
        }
        PendingAction::Import => {
            let Some(name) = page.selected_export.clone() else {
                return;
            };
            page.busy = Some("Importing lookup data");
            let path = api::data_sync_import(&http::segment(&page.target_env), &http::segment(&name));
            report(link, "Import", async move {
                http::post_empty::<Value>(&path, "Import failed").await
            });
        }
    }
}
