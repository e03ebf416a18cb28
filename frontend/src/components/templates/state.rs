//! State of the template administration page.
//!
//! The page is a list of templates (filterable by acquirer) plus, when a
//! template is opened, an editor holding an owned copy of its sections. The
//! editor never touches the list entry it was opened from; saving replaces
//! the list by reloading it.

use common::editor::{fingerprint, normalize_field_ids, TemplateMeta};
use common::model::template::{Acquirer, ApplicationCounts, ApplicationTemplate, Section};

use crate::helpers::{UnsavedFlag, UnsavedGuard};

/// What is being dragged in the section builder.
#[derive(Debug, Clone, PartialEq)]
pub enum DragSource {
    Section { index: usize },
    Field { section_id: String, index: usize },
}

/// Where it is dropped. `SectionEnd` is the empty area under a section's
/// last field, which also accepts drops into an empty section.
#[derive(Debug, Clone, PartialEq)]
pub enum DropTarget {
    Section { index: usize },
    Field { section_id: String, index: usize },
    SectionEnd { section_id: String },
}

pub struct EditorState {
    /// `None` until the template has been created on the server.
    pub template_id: Option<i64>,
    pub meta: TemplateMeta,
    pub sections: Vec<Section>,
    /// Fingerprint at last load or save; differs from the live one when dirty.
    pub saved_fingerprint: String,
    pub selected_field: Option<String>,
    pub dragging: Option<DragSource>,
    pub drop_hint: Option<DropTarget>,
    pub problems: Vec<String>,
    pub pdf_file: Option<web_sys::File>,
    pub saving: bool,
}

impl EditorState {
    pub fn blank(acquirer_id: i64) -> Self {
        let meta = TemplateMeta {
            acquirer_id,
            template_name: String::new(),
            version: "1.0.0".to_string(),
            is_active: true,
        };
        let sections = Vec::new();
        let saved_fingerprint = fingerprint(&meta, &sections);
        Self::with(None, meta, sections, saved_fingerprint)
    }

    /// Opens an existing template. Ids are normalized before the first render
    /// so drag keys stay stable; a template that needed fixing opens dirty.
    pub fn open(template: &ApplicationTemplate) -> Self {
        let meta = TemplateMeta {
            acquirer_id: template.acquirer_id,
            template_name: template.template_name.clone(),
            version: template.version.clone(),
            is_active: template.is_active,
        };
        let original = template.field_configuration.sections.clone();
        let saved_fingerprint = fingerprint(&meta, &original);
        let mut sections = original;
        normalize_field_ids(&mut sections);
        Self::with(Some(template.id), meta, sections, saved_fingerprint)
    }

    /// A copy of an existing template that saves as a new one.
    pub fn duplicate(template: &ApplicationTemplate) -> Self {
        let mut editor = Self::open(template);
        editor.template_id = None;
        editor.meta.template_name = format!("{} (copy)", template.template_name);
        editor.saved_fingerprint = String::new();
        editor
    }

    fn with(
        template_id: Option<i64>,
        meta: TemplateMeta,
        sections: Vec<Section>,
        saved_fingerprint: String,
    ) -> Self {
        Self {
            template_id,
            meta,
            sections,
            saved_fingerprint,
            selected_field: None,
            dragging: None,
            drop_hint: None,
            problems: Vec::new(),
            pdf_file: None,
            saving: false,
        }
    }

    pub fn is_dirty(&self) -> bool {
        fingerprint(&self.meta, &self.sections) != self.saved_fingerprint
    }

    pub fn mark_saved(&mut self) {
        self.saved_fingerprint = fingerprint(&self.meta, &self.sections);
    }
}

/// Pending confirmation or refusal shown in the top sheet.
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteDialog {
    Confirm { template_id: i64, name: String },
    Blocked { message: String },
}

pub struct TemplatesPage {
    pub templates: Vec<ApplicationTemplate>,
    pub acquirers: Vec<Acquirer>,
    pub counts: ApplicationCounts,
    pub acquirer_filter: Option<i64>,
    pub editor: Option<EditorState>,
    pub delete_dialog: Option<DeleteDialog>,
    pub loading: bool,
    pub load_error: Option<String>,
    pub loaded: bool,
    pub unsaved: UnsavedFlag,
    pub leave_guard: Option<UnsavedGuard>,
}

impl TemplatesPage {
    pub fn new() -> Self {
        Self {
            templates: Vec::new(),
            acquirers: Vec::new(),
            counts: ApplicationCounts::new(),
            acquirer_filter: None,
            editor: None,
            delete_dialog: None,
            loading: false,
            load_error: None,
            loaded: false,
            unsaved: UnsavedFlag::default(),
            leave_guard: None,
        }
    }

    pub fn visible_templates(&self) -> Vec<&ApplicationTemplate> {
        self.templates
            .iter()
            .filter(|t| self.acquirer_filter.is_none_or(|id| t.acquirer_id == id))
            .collect()
    }

    pub fn acquirer_name(&self, id: i64) -> String {
        self.acquirers
            .iter()
            .find(|a| a.id == id)
            .map(|a| a.name.clone())
            .unwrap_or_else(|| format!("Acquirer #{id}"))
    }

    pub fn application_count(&self, template_id: i64) -> u64 {
        self.counts
            .get(&template_id.to_string())
            .copied()
            .unwrap_or(0)
    }
}
