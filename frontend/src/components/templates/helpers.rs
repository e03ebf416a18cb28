//! Pure editing helpers behind the template editor's messages.

use common::editor::{self, step_index, structure_option, Direction};
use common::model::template::{
    Condition, ConditionOperator, ConditionalAction, ConditionalRule, Field, FieldOption, Section,
};

use super::messages::FieldChange;
use super::state::{DragSource, DropTarget};

fn optional(text: String) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn optional_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok()
}

fn default_rule() -> ConditionalRule {
    ConditionalRule {
        action: ConditionalAction::Show,
        when: Condition {
            field: String::new(),
            operator: ConditionOperator::Equals,
            value: serde_json::Value::String(String::new()),
        },
    }
}

/// Applies one side-panel edit to a field.
pub fn apply_change(field: &mut Field, change: FieldChange) {
    match change {
        FieldChange::Label(label) => field.label = label,
        FieldChange::Type(field_type) => editor::set_field_type(field, field_type),
        FieldChange::Required(required) => field.required = required,
        FieldChange::Placeholder(text) => field.placeholder = optional(text),
        FieldChange::HelpText(text) => field.help_text = optional(text),
        FieldChange::Pattern(text) => field.pattern = optional(text),
        FieldChange::Min(text) => field.min = optional_number(&text),
        FieldChange::Max(text) => field.max = optional_number(&text),
        FieldChange::PdfFieldId(text) => field.pdf_field_id = optional(text),
        FieldChange::AddOption => {
            let next = field.options.as_ref().map_or(0, Vec::len) + 1;
            editor::add_option(field, &format!("Option {next}"));
        }
        FieldChange::RemoveOption(index) => {
            if let Some(options) = field.options.as_mut() {
                if index < options.len() {
                    options.remove(index);
                }
            }
        }
        FieldChange::OptionLabel(index, label) => {
            if let Some(option) = field.options.as_mut().and_then(|o| o.get_mut(index)) {
                match option {
                    FieldOption::Plain(text) => *text = label,
                    FieldOption::Structured(structured) => structured.label = label,
                }
            }
        }
        FieldChange::OptionValue(index, value) => {
            if let Some(option) = field.options.as_mut().and_then(|o| o.get_mut(index)) {
                structure_option(option).value = value;
            }
        }
        FieldChange::OptionPdfFieldId(index, pdf_field_id) => {
            if let Some(option) = field.options.as_mut().and_then(|o| o.get_mut(index)) {
                structure_option(option).pdf_field_id = optional(pdf_field_id);
            }
        }
        FieldChange::ConditionEnabled(enabled) => {
            field.conditional = enabled.then(default_rule);
        }
        FieldChange::ConditionAction(action) => {
            field.conditional.get_or_insert_with(default_rule).action = action;
        }
        FieldChange::ConditionField(target) => {
            field.conditional.get_or_insert_with(default_rule).when.field = target;
        }
        FieldChange::ConditionOperator(operator) => {
            field.conditional.get_or_insert_with(default_rule).when.operator = operator;
        }
        FieldChange::ConditionValue(value) => {
            field.conditional.get_or_insert_with(default_rule).when.value =
                serde_json::Value::String(value);
        }
    }
}

fn field_id_at(sections: &[Section], section_id: &str, index: usize) -> Option<String> {
    sections
        .iter()
        .find(|s| s.id == section_id)
        .and_then(|s| s.fields.get(index))
        .map(|f| f.id.clone())
}

fn section_len(sections: &[Section], section_id: &str) -> usize {
    sections
        .iter()
        .find(|s| s.id == section_id)
        .map_or(0, |s| s.fields.len())
}

/// Resolves a drag-end into an array move. Sections only drop on sections
/// and fields only on fields or section ends. Returns whether anything moved.
pub fn apply_drop(sections: &mut Vec<Section>, source: &DragSource, target: &DropTarget) -> bool {
    match (source, target) {
        (DragSource::Section { index: from }, DropTarget::Section { index: to }) => {
            editor::move_section(sections, *from, *to)
        }
        (
            DragSource::Field { section_id: from_section, index: from },
            DropTarget::Field { section_id: to_section, index: to },
        ) if from_section == to_section => editor::move_field(sections, from_section, *from, *to),
        (
            DragSource::Field { section_id: from_section, index: from },
            DropTarget::SectionEnd { section_id: to_section },
        ) if from_section == to_section => {
            let last = section_len(sections, to_section).saturating_sub(1);
            editor::move_field(sections, from_section, *from, last)
        }
        (DragSource::Field { section_id, index }, DropTarget::Field { section_id: to_section, index: to }) => {
            match field_id_at(sections, section_id, *index) {
                Some(field_id) => editor::move_field_to_section(sections, &field_id, to_section, *to),
                None => false,
            }
        }
        (DragSource::Field { section_id, index }, DropTarget::SectionEnd { section_id: to_section }) => {
            match field_id_at(sections, section_id, *index) {
                Some(field_id) => {
                    let end = section_len(sections, to_section);
                    editor::move_field_to_section(sections, &field_id, to_section, end)
                }
                None => false,
            }
        }
        _ => false,
    }
}

/// Alt+Arrow reordering of a section or a field within its section.
pub fn apply_key_move(sections: &mut Vec<Section>, source: &DragSource, direction: Direction) -> bool {
    match source {
        DragSource::Section { index } => match step_index(*index, sections.len(), direction) {
            Some(to) => editor::move_section(sections, *index, to),
            None => false,
        },
        DragSource::Field { section_id, index } => {
            let len = section_len(sections, section_id);
            match step_index(*index, len, direction) {
                Some(to) => editor::move_field(sections, section_id, *index, to),
                None => false,
            }
        }
    }
}

/// Ids and labels of fields a conditional rule may depend on: every field
/// except the one being edited.
pub fn condition_targets(sections: &[Section], field_id: &str) -> Vec<(String, String)> {
    sections
        .iter()
        .flat_map(|s| s.fields.iter())
        .filter(|f| f.id != field_id)
        .map(|f| (f.id.clone(), f.label.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::model::template::FieldType;

    fn sections() -> Vec<Section> {
        let section = |id: &str, fields: &[&str]| Section {
            id: id.to_string(),
            title: id.to_string(),
            description: None,
            fields: fields
                .iter()
                .map(|f| Field::new(*f, FieldType::Text, *f))
                .collect(),
        };
        vec![section("s1", &["a", "b", "c"]), section("s2", &[])]
    }

    fn ids(sections: &[Section]) -> Vec<Vec<String>> {
        sections
            .iter()
            .map(|s| s.fields.iter().map(|f| f.id.clone()).collect())
            .collect()
    }

    #[test]
    fn drop_within_section_rotates() {
        let mut s = sections();
        let moved = apply_drop(
            &mut s,
            &DragSource::Field { section_id: "s1".into(), index: 0 },
            &DropTarget::Field { section_id: "s1".into(), index: 2 },
        );
        assert!(moved);
        assert_eq!(ids(&s)[0], vec!["b", "c", "a"]);
    }

    #[test]
    fn drop_into_empty_section() {
        let mut s = sections();
        assert!(apply_drop(
            &mut s,
            &DragSource::Field { section_id: "s1".into(), index: 1 },
            &DropTarget::SectionEnd { section_id: "s2".into() },
        ));
        assert_eq!(ids(&s), vec![vec!["a", "c"], vec!["b"]]);
    }

    #[test]
    fn sections_do_not_drop_on_fields() {
        let mut s = sections();
        assert!(!apply_drop(
            &mut s,
            &DragSource::Section { index: 0 },
            &DropTarget::Field { section_id: "s2".into(), index: 0 },
        ));
        assert!(apply_drop(&mut s, &DragSource::Section { index: 0 }, &DropTarget::Section { index: 1 }));
        assert_eq!(s[0].id, "s2");
    }

    #[test]
    fn keyboard_moves() {
        let mut s = sections();
        let source = DragSource::Field { section_id: "s1".into(), index: 0 };
        assert!(!apply_key_move(&mut s, &source, Direction::Up));
        assert!(apply_key_move(&mut s, &source, Direction::Down));
        assert_eq!(ids(&s)[0], vec!["b", "a", "c"]);
    }

    #[test]
    fn conditional_edits_create_and_clear_rule() {
        let mut field = Field::new("dba", FieldType::Text, "DBA");
        apply_change(&mut field, FieldChange::ConditionField("hasDba".into()));
        apply_change(&mut field, FieldChange::ConditionValue("yes".into()));
        let rule = field.conditional.clone().unwrap();
        assert_eq!(rule.when.field, "hasDba");
        assert_eq!(rule.action, ConditionalAction::Show);
        apply_change(&mut field, FieldChange::ConditionEnabled(false));
        assert!(field.conditional.is_none());
    }

    #[test]
    fn option_edits() {
        let mut field = Field::new("entity", FieldType::Text, "Entity");
        apply_change(&mut field, FieldChange::Type(FieldType::Radio));
        apply_change(&mut field, FieldChange::AddOption);
        apply_change(&mut field, FieldChange::OptionLabel(1, "LLC".into()));
        apply_change(&mut field, FieldChange::OptionPdfFieldId(1, "cb_llc".into()));
        let options = field.options.clone().unwrap();
        assert_eq!(options.len(), 2);
        assert_eq!(options[1].label(), "LLC");
        assert!(matches!(&options[1], FieldOption::Structured(o) if o.pdf_field_id.as_deref() == Some("cb_llc")));
        apply_change(&mut field, FieldChange::RemoveOption(0));
        assert_eq!(field.options.as_ref().unwrap().len(), 1);
        apply_change(&mut field, FieldChange::Min("abc".into()));
        assert_eq!(field.min, None);
    }
}
