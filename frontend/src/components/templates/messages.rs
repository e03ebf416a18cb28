use common::editor::Direction;
use common::model::template::{
    Acquirer, ApplicationCounts, ApplicationTemplate, ConditionOperator, ConditionalAction,
    FieldType,
};

use super::state::{DragSource, DropTarget};

/// One edit to a field's properties in the side panel.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldChange {
    Label(String),
    Type(FieldType),
    Required(bool),
    Placeholder(String),
    HelpText(String),
    Pattern(String),
    Min(String),
    Max(String),
    PdfFieldId(String),
    AddOption,
    RemoveOption(usize),
    OptionLabel(usize, String),
    OptionValue(usize, String),
    OptionPdfFieldId(usize, String),
    ConditionEnabled(bool),
    ConditionAction(ConditionalAction),
    ConditionField(String),
    ConditionOperator(ConditionOperator),
    ConditionValue(String),
}

#[derive(Clone)]
pub enum Msg {
    Load,
    Loaded {
        templates: Vec<ApplicationTemplate>,
        acquirers: Vec<Acquirer>,
        counts: ApplicationCounts,
    },
    LoadFailed(String),
    FilterAcquirer(Option<i64>),

    NewTemplate,
    EditTemplate(i64),
    DuplicateTemplate(i64),
    ToggleActive(i64),
    RequestDelete(i64),
    DeleteChecked { template_id: i64, counts: ApplicationCounts },
    ConfirmDelete,
    CloseDeleteDialog,
    Deleted(i64),

    SetAcquirer(i64),
    SetName(String),
    SetVersion(String),
    SetActive(bool),
    PdfSelected(Option<web_sys::File>),
    CloseEditor,

    AddSection,
    RemoveSection(String),
    SetSectionTitle(String, String),
    SetSectionDescription(String, String),

    AddField(String),
    RemoveField(String, String),
    DuplicateField(String, String),
    SelectField(Option<String>),
    UpdateField(String, FieldChange),

    DragStart(DragSource),
    DragOver(DropTarget),
    Drop(DropTarget),
    DragEnd,
    KeyMove(DragSource, Direction),

    Save,
    Saved(Option<i64>),
    SaveFailed(String),
}
