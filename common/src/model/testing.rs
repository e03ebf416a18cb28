use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// `GET /api/admin/db-environment`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbEnvironment {
    #[serde(default)]
    pub environment: String,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub available_environments: Vec<String>,
}

/// `GET /api/admin/db-diagnostics`: the server decides the shape; the panel
/// renders it as a key/value table.
pub type DbDiagnostics = BTreeMap<String, Value>;

/// Body of `POST /api/admin/reset-testing-data`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResetRequest {
    pub tables: Vec<String>,
}

/// Tables the reset dialog offers, with a human label each.
pub const RESETTABLE_TABLES: [(&str, &str); 6] = [
    ("prospects", "Prospects"),
    ("prospect_owners", "Prospect owners"),
    ("prospect_signatures", "Signatures"),
    ("merchants", "Merchants"),
    ("transactions", "Transactions"),
    ("alerts", "Alerts"),
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Option<Value>,
}

/// `GET /api/admin/schema-compare`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaComparison {
    #[serde(default)]
    pub environments: Vec<String>,
    #[serde(default)]
    pub missing_tables: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub differences: Vec<TableDrift>,
}

/// `GET /api/admin/schema-drift/:a/:b`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDrift {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub tables: Vec<TableDrift>,
}

impl SchemaDrift {
    pub fn column_difference_count(&self) -> usize {
        self.tables.iter().map(|t| t.columns.len()).sum()
    }

    pub fn has_drift(&self) -> bool {
        self.column_difference_count() > 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDrift {
    pub table: String,
    #[serde(default)]
    pub columns: Vec<ColumnDiff>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDiff {
    pub column: String,
    pub kind: ColumnDiffKind,
    #[serde(default)]
    pub source_type: Option<String>,
    #[serde(default)]
    pub target_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnDiffKind {
    MissingInTarget,
    MissingInSource,
    TypeMismatch,
}

/// Body of `POST /api/admin/schema-sync`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaSyncRequest {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub tables: Vec<String>,
}

/// Entry of `GET /api/testing/data-sync/exports`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSyncExport {
    pub name: String,
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub record_count: Option<u64>,
}

/// `GET /api/testing/data-sync/compare/:a/:b`: per lookup table counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSyncComparison {
    #[serde(default)]
    pub tables: Vec<TableCountDiff>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCountDiff {
    pub table: String,
    #[serde(default)]
    pub source_count: u64,
    #[serde(default)]
    pub target_count: u64,
}

impl TableCountDiff {
    pub fn in_sync(&self) -> bool {
        self.source_count == self.target_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn drift_counts_columns_across_tables() {
        let drift: SchemaDrift = serde_json::from_value(json!({
            "source": "development",
            "target": "production",
            "tables": [
                {"table": "prospects", "columns": [
                    {"column": "risk_score", "kind": "missingInTarget", "sourceType": "integer"},
                    {"column": "status", "kind": "typeMismatch", "sourceType": "text", "targetType": "varchar(50)"}
                ]},
                {"table": "merchants", "columns": []}
            ]
        }))
        .unwrap();
        assert_eq!(drift.column_difference_count(), 2);
        assert!(drift.has_drift());
    }
}
