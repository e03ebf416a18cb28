//! State of the testing-utilities page.

use common::checklist::Checklist;
use common::model::testing::{
    DataSyncComparison, DataSyncExport, DbDiagnostics, DbEnvironment, RESETTABLE_TABLES,
    SchemaComparison, SchemaDrift,
};
use std::collections::BTreeSet;

/// Result shown in the top sheet after an operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSheet {
    pub title: String,
    pub body: String,
}

/// A destructive operation awaiting confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    Reset,
    ClearProspects,
    SchemaSync,
    Import,
}

impl PendingAction {
    pub fn prompt(&self) -> &'static str {
        match self {
            PendingAction::Reset => "Delete all rows from the selected tables?",
            PendingAction::ClearProspects => "Delete every prospect and its saved application data?",
            PendingAction::SchemaSync => "Apply the source schema to the target environment?",
            PendingAction::Import => "Import the selected export into the target environment?",
        }
    }
}

pub struct TestingPage {
    pub environment: Option<DbEnvironment>,
    pub diagnostics: Option<DbDiagnostics>,
    pub reset_tables: BTreeSet<String>,
    pub comparison: Option<SchemaComparison>,
    pub drift: Option<SchemaDrift>,
    pub source_env: String,
    pub target_env: String,
    pub exports: Vec<DataSyncExport>,
    pub selected_export: Option<String>,
    pub data_comparison: Option<DataSyncComparison>,
    pub checklist: Checklist,
    pub busy: Option<&'static str>,
    pub pending: Option<PendingAction>,
    pub sheet: Option<ResultSheet>,
    pub loaded: bool,
}

impl TestingPage {
    pub fn new(checklist: Checklist) -> Self {
        Self {
            environment: None,
            diagnostics: None,
            reset_tables: RESETTABLE_TABLES.iter().map(|(t, _)| t.to_string()).collect(),
            comparison: None,
            drift: None,
            source_env: "development".to_string(),
            target_env: "production".to_string(),
            exports: Vec::new(),
            selected_export: None,
            data_comparison: None,
            checklist,
            busy: None,
            pending: None,
            sheet: None,
            loaded: false,
        }
    }

    pub fn same_environments(&self) -> bool {
        self.source_env == self.target_env
    }

    /// Why `action` cannot be asked for yet, if it cannot.
    pub fn refusal(&self, action: PendingAction) -> Option<&'static str> {
        match action {
            PendingAction::Reset if self.reset_tables.is_empty() => Some("Select at least one table to reset"),
            PendingAction::Import if self.selected_export.is_none() => Some("Select an export to import"),
            PendingAction::SchemaSync if self.same_environments() => Some("Pick two different environments"),
            _ => None,
        }
    }

    /// Environments to offer in the source/target pickers.
    pub fn environments(&self) -> Vec<String> {
        let mut envs = self
            .environment
            .as_ref()
            .map(|e| e.available_environments.clone())
            .unwrap_or_default();
        for env in [&self.source_env, &self.target_env] {
            if !envs.contains(env) {
                envs.push(env.clone());
            }
        }
        envs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_sync_needs_two_environments() {
        let mut page = TestingPage::new(Checklist::standard());
        assert_eq!(page.refusal(PendingAction::SchemaSync), None);
        page.target_env = page.source_env.clone();
        assert_eq!(
            page.refusal(PendingAction::SchemaSync),
            Some("Pick two different environments")
        );
        assert_eq!(page.refusal(PendingAction::ClearProspects), None);
    }

    #[test]
    fn reset_and_import_need_a_selection() {
        let mut page = TestingPage::new(Checklist::standard());
        assert_eq!(page.refusal(PendingAction::Import), Some("Select an export to import"));
        page.selected_export = Some("lookup-2026-10-01".into());
        assert_eq!(page.refusal(PendingAction::Import), None);

        assert_eq!(page.refusal(PendingAction::Reset), None);
        page.reset_tables.clear();
        assert_eq!(page.refusal(PendingAction::Reset), Some("Select at least one table to reset"));
    }
}
