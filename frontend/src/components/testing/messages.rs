use common::checklist::CheckStatus;
use common::model::testing::{
    DataSyncComparison, DataSyncExport, DbDiagnostics, DbEnvironment, SchemaComparison,
    SchemaDrift,
};

use super::state::{PendingAction, ResultSheet};

pub enum Msg {
    Load,
    EnvironmentLoaded(DbEnvironment),
    DiagnosticsLoaded(DbDiagnostics),
    ExportsLoaded(Vec<DataSyncExport>),

    ToggleResetTable(String, bool),
    Ask(PendingAction),
    Confirm,
    Cancel,

    CompareSchemas,
    SchemasCompared(SchemaComparison),
    SetSource(String),
    SetTarget(String),
    CheckDrift,
    DriftLoaded(SchemaDrift),

    Export,
    SelectExport(Option<String>),
    CompareData,
    DataCompared(DataSyncComparison),

    CreateTestAlert,

    SetCheck(String, CheckStatus),
    SetCheckNotes(String, String),
    ResetChecklist,

    /// An operation finished; show its outcome and clear the busy flag.
    Done(ResultSheet),
    Failed(String),
    CloseSheet,
}
