//! Template editing operations behind the drag-and-drop section builder.
//!
//! The editor works on an owned `Vec<Section>`; each operation is a plain
//! mutation so the page can re-render from the result. Saving serializes the
//! whole document together with the derived `requiredFields` and
//! `conditionalFields` (last write wins at the API).

use std::collections::{BTreeMap, HashSet};

use uuid::Uuid;

use crate::model::template::{
    ConditionalRule, Field, FieldConfiguration, FieldOption, FieldType, Section, StructuredOption,
    TemplatePayload,
};

fn fresh_id(prefix: &str) -> String {
    format!("{prefix}_{}", &Uuid::new_v4().simple().to_string()[..12])
}

pub fn new_field_id() -> String {
    fresh_id("field")
}

pub fn new_section_id() -> String {
    fresh_id("section")
}

/// Makes every section id and every field id non-empty and unique across
/// the document. The first occurrence of an id keeps it; later duplicates
/// and blanks are regenerated. Order and all other content are untouched.
///
/// Returns the number of ids that were rewritten.
pub fn normalize_field_ids(sections: &mut [Section]) -> usize {
    let mut rewritten = 0;
    let mut section_ids = HashSet::new();
    let mut field_ids = HashSet::new();

    for section in sections.iter_mut() {
        if section.id.trim().is_empty() || !section_ids.insert(section.id.clone()) {
            section.id = unique(&mut section_ids, new_section_id);
            rewritten += 1;
        }
        for field in section.fields.iter_mut() {
            if field.id.trim().is_empty() || !field_ids.insert(field.id.clone()) {
                field.id = unique(&mut field_ids, new_field_id);
                rewritten += 1;
            }
        }
    }
    rewritten
}

/// Load-time counterpart of [`normalize_field_ids`] for filling a stored
/// template: the same input always yields the same ids, so answers saved
/// under a repaired id map back to the same field on the next load.
///
/// The first occurrence of an id keeps it. Later duplicates get `_2`, `_3`,
/// ... appended; a blank field id becomes `{section}_field_{n}` and a blank
/// section id `section_{n}` (1-based positions). Generated ids never take an
/// id that appears anywhere in the document.
pub fn repair_field_ids(sections: &mut [Section]) -> usize {
    let reserved: HashSet<String> = sections
        .iter()
        .flat_map(|s| std::iter::once(s.id.clone()).chain(s.fields.iter().map(|f| f.id.clone())))
        .filter(|id| !id.trim().is_empty())
        .collect();
    let mut rewritten = 0;
    let mut section_ids = HashSet::new();
    let mut field_ids = HashSet::new();

    for (s_idx, section) in sections.iter_mut().enumerate() {
        if section.id.trim().is_empty() {
            section.id = suffixed(&format!("section_{}", s_idx + 1), &reserved, &mut section_ids, true);
            rewritten += 1;
        } else if !section_ids.insert(section.id.clone()) {
            section.id = suffixed(&section.id, &reserved, &mut section_ids, false);
            rewritten += 1;
        }
        for (f_idx, field) in section.fields.iter_mut().enumerate() {
            if field.id.trim().is_empty() {
                let base = format!("{}_field_{}", section.id, f_idx + 1);
                field.id = suffixed(&base, &reserved, &mut field_ids, true);
                rewritten += 1;
            } else if !field_ids.insert(field.id.clone()) {
                field.id = suffixed(&field.id, &reserved, &mut field_ids, false);
                rewritten += 1;
            }
        }
    }
    rewritten
}

/// `base` itself when `try_base` and it is free, else the first free
/// `base_2`, `base_3`, ...
fn suffixed(base: &str, reserved: &HashSet<String>, taken: &mut HashSet<String>, try_base: bool) -> String {
    let free = |id: &str, taken: &HashSet<String>| !reserved.contains(id) && !taken.contains(id);
    if try_base && free(base, taken) {
        taken.insert(base.to_string());
        return base.to_string();
    }
    let mut n = 2;
    loop {
        let id = format!("{base}_{n}");
        if free(&id, taken) {
            taken.insert(id.clone());
            return id;
        }
        n += 1;
    }
}

fn unique(taken: &mut HashSet<String>, generate: fn() -> String) -> String {
    loop {
        let id = generate();
        if taken.insert(id.clone()) {
            return id;
        }
    }
}

/// Moves the element at `old_index` to `new_index` (remove, then insert).
/// Out-of-range indices leave the list unchanged. Returns whether it moved.
pub fn array_move<T>(items: &mut Vec<T>, old_index: usize, new_index: usize) -> bool {
    if old_index >= items.len() || new_index >= items.len() || old_index == new_index {
        return false;
    }
    let item = items.remove(old_index);
    items.insert(new_index, item);
    true
}

/// Keyboard reordering direction (Alt+ArrowUp / Alt+ArrowDown).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Target index for a one-step keyboard move, if there is room.
pub fn step_index(index: usize, len: usize, direction: Direction) -> Option<usize> {
    match direction {
        Direction::Up if index > 0 && index < len => Some(index - 1),
        Direction::Down if index + 1 < len => Some(index + 1),
        _ => None,
    }
}

pub fn add_section(sections: &mut Vec<Section>, title: &str) -> String {
    let id = unique_among(sections.iter().map(|s| s.id.as_str()), new_section_id);
    sections.push(Section {
        id: id.clone(),
        title: title.to_string(),
        description: None,
        fields: Vec::new(),
    });
    id
}

pub fn remove_section(sections: &mut Vec<Section>, section_id: &str) -> Option<Section> {
    let index = sections.iter().position(|s| s.id == section_id)?;
    Some(sections.remove(index))
}

pub fn move_section(sections: &mut Vec<Section>, old_index: usize, new_index: usize) -> bool {
    array_move(sections, old_index, new_index)
}

fn unique_among<'a>(existing: impl Iterator<Item = &'a str>, generate: fn() -> String) -> String {
    let mut taken: HashSet<String> = existing.map(str::to_string).collect();
    unique(&mut taken, generate)
}

fn all_field_ids(sections: &[Section]) -> impl Iterator<Item = &str> {
    sections
        .iter()
        .flat_map(|s| s.fields.iter().map(|f| f.id.as_str()))
}

/// Appends a blank text field to a section and returns its id.
pub fn add_field(sections: &mut [Section], section_id: &str) -> Option<String> {
    let id = unique_among(all_field_ids(sections), new_field_id);
    let section = sections.iter_mut().find(|s| s.id == section_id)?;
    section
        .fields
        .push(Field::new(id.clone(), FieldType::Text, "New field"));
    Some(id)
}

/// Inserts a copy of a field right after it, with a fresh id.
pub fn duplicate_field(sections: &mut [Section], section_id: &str, field_id: &str) -> Option<String> {
    let id = unique_among(all_field_ids(sections), new_field_id);
    let section = sections.iter_mut().find(|s| s.id == section_id)?;
    let index = section.fields.iter().position(|f| f.id == field_id)?;
    let mut copy = section.fields[index].clone();
    copy.id = id.clone();
    copy.label = format!("{} (copy)", copy.label);
    section.fields.insert(index + 1, copy);
    Some(id)
}

pub fn remove_field(sections: &mut [Section], section_id: &str, field_id: &str) -> Option<Field> {
    let section = sections.iter_mut().find(|s| s.id == section_id)?;
    let index = section.fields.iter().position(|f| f.id == field_id)?;
    Some(section.fields.remove(index))
}

pub fn move_field(sections: &mut [Section], section_id: &str, old_index: usize, new_index: usize) -> bool {
    sections
        .iter_mut()
        .find(|s| s.id == section_id)
        .is_some_and(|s| array_move(&mut s.fields, old_index, new_index))
}

/// Moves a field into another section at `index` (clamped to the end).
pub fn move_field_to_section(
    sections: &mut [Section],
    field_id: &str,
    target_section_id: &str,
    index: usize,
) -> bool {
    if !sections.iter().any(|s| s.id == target_section_id) {
        return false;
    }
    let Some(source) = sections
        .iter_mut()
        .find(|s| s.fields.iter().any(|f| f.id == field_id))
    else {
        return false;
    };
    let Some(position) = source.fields.iter().position(|f| f.id == field_id) else {
        return false;
    };
    let field = source.fields.remove(position);
    let Some(target) = sections.iter_mut().find(|s| s.id == target_section_id) else {
        return false;
    };
    let index = index.min(target.fields.len());
    target.fields.insert(index, field);
    true
}

pub fn find_field_mut<'a>(sections: &'a mut [Section], field_id: &str) -> Option<&'a mut Field> {
    sections
        .iter_mut()
        .flat_map(|s| s.fields.iter_mut())
        .find(|f| f.id == field_id)
}

/// Changes a field's type, seeding an option list when switching to a
/// choice type and dropping options when leaving one.
pub fn set_field_type(field: &mut Field, field_type: FieldType) {
    field.field_type = field_type;
    if field_type.has_options() {
        if field.options.as_ref().is_none_or(|o| o.is_empty()) {
            field.options = Some(vec![FieldOption::Plain("Option 1".to_string())]);
        }
    } else {
        field.options = None;
    }
}

/// Adds an option; plain-string lists stay plain until a mapping is needed.
pub fn add_option(field: &mut Field, label: &str) {
    let options = field.options.get_or_insert_with(Vec::new);
    let structured = options
        .iter()
        .any(|o| matches!(o, FieldOption::Structured(_)));
    if structured {
        options.push(FieldOption::Structured(StructuredOption {
            label: label.to_string(),
            value: option_value(label),
            pdf_field_id: None,
            conditional: None,
        }));
    } else {
        options.push(FieldOption::Plain(label.to_string()));
    }
}

/// Converts an option to the structured form so it can carry a PDF field
/// mapping or its own visibility rule.
pub fn structure_option(option: &mut FieldOption) -> &mut StructuredOption {
    if let FieldOption::Plain(text) = option {
        *option = FieldOption::Structured(StructuredOption {
            label: text.clone(),
            value: text.clone(),
            pdf_field_id: None,
            conditional: None,
        });
    }
    match option {
        FieldOption::Structured(structured) => structured,
        FieldOption::Plain(_) => unreachable!("option was just structured"),
    }
}

/// `"Sole Proprietor"` → `"sole_proprietor"`.
pub fn option_value(label: &str) -> String {
    let mut value = String::with_capacity(label.len());
    for ch in label.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            value.push(ch.to_ascii_lowercase());
        } else if !value.ends_with('_') && !value.is_empty() {
            value.push('_');
        }
    }
    value.trim_end_matches('_').to_string()
}

pub fn derive_required_fields(sections: &[Section]) -> Vec<String> {
    sections
        .iter()
        .flat_map(|s| s.fields.iter())
        .filter(|f| f.required)
        .map(|f| f.id.clone())
        .collect()
}

pub fn derive_conditional_fields(sections: &[Section]) -> Option<BTreeMap<String, ConditionalRule>> {
    let rules: BTreeMap<String, ConditionalRule> = sections
        .iter()
        .flat_map(|s| s.fields.iter())
        .filter_map(|f| f.conditional.clone().map(|rule| (f.id.clone(), rule)))
        .collect();
    (!rules.is_empty()).then_some(rules)
}

/// Editable template metadata next to the sections.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateMeta {
    pub acquirer_id: i64,
    pub template_name: String,
    pub version: String,
    pub is_active: bool,
}

/// Metadata problems that block a save.
pub fn validate_meta(meta: &TemplateMeta) -> Vec<String> {
    let mut problems = Vec::new();
    if meta.acquirer_id <= 0 {
        problems.push("Select an acquirer".to_string());
    }
    if meta.template_name.trim().is_empty() {
        problems.push("Template name is required".to_string());
    }
    if !is_semver(&meta.version) {
        problems.push("Version must look like 1.0.0".to_string());
    }
    problems
}

pub fn is_semver(version: &str) -> bool {
    let parts: Vec<&str> = version.trim().split('.').collect();
    parts.len() == 3
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
}

/// Normalizes ids and assembles the save body.
pub fn build_payload(meta: &TemplateMeta, sections: &[Section]) -> TemplatePayload {
    let mut sections = sections.to_vec();
    normalize_field_ids(&mut sections);
    TemplatePayload {
        acquirer_id: meta.acquirer_id,
        template_name: meta.template_name.trim().to_string(),
        version: meta.version.trim().to_string(),
        is_active: meta.is_active,
        required_fields: derive_required_fields(&sections),
        conditional_fields: derive_conditional_fields(&sections),
        field_configuration: FieldConfiguration { sections },
    }
}

/// MD5 of the serialized sections, used for the unsaved-changes marker.
pub fn fingerprint(meta: &TemplateMeta, sections: &[Section]) -> String {
    let body = serde_json::json!({
        "acquirerId": meta.acquirer_id,
        "templateName": meta.template_name,
        "version": meta.version,
        "isActive": meta.is_active,
        "sections": sections,
    });
    format!("{:x}", md5::compute(body.to_string()))
}

/// Why a template cannot be deleted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("This template is used by {count} submitted application(s) and cannot be deleted. Deactivate it instead.")]
pub struct DeletionBlocked {
    pub count: u64,
}

/// Deletion is refused while any submitted application references the template.
pub fn check_deletable(
    template_id: i64,
    counts: &crate::model::template::ApplicationCounts,
) -> Result<(), DeletionBlocked> {
    match counts.get(&template_id.to_string()).copied().unwrap_or(0) {
        0 => Ok(()),
        count => Err(DeletionBlocked { count }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::template::{Condition, ConditionOperator, ConditionalAction};

    fn section(id: &str, field_ids: &[&str]) -> Section {
        Section {
            id: id.to_string(),
            title: id.to_uppercase(),
            description: None,
            fields: field_ids
                .iter()
                .map(|fid| Field::new(*fid, FieldType::Text, format!("Label {fid}")))
                .collect(),
        }
    }

    #[test]
    fn normalization_fixes_blank_and_duplicate_ids_only() {
        let mut sections = vec![section("a", &["x", "", "y"]), section("a", &["x", "z"])];
        let before: Vec<String> = sections
            .iter()
            .flat_map(|s| s.fields.iter().map(|f| f.label.clone()))
            .collect();

        let rewritten = normalize_field_ids(&mut sections);
        assert_eq!(rewritten, 3);

        let ids: Vec<&str> = all_field_ids(&sections).collect();
        let unique: HashSet<&str> = ids.iter().copied().collect();
        assert_eq!(unique.len(), ids.len());
        assert!(ids.iter().all(|id| !id.is_empty()));
        assert_eq!(ids[0], "x");
        assert_eq!(ids[2], "y");
        assert_eq!(ids[4], "z");
        assert_ne!(sections[0].id, sections[1].id);

        let after: Vec<String> = sections
            .iter()
            .flat_map(|s| s.fields.iter().map(|f| f.label.clone()))
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn repair_is_deterministic_and_keeps_real_ids() {
        let build = || {
            vec![
                section("business", &["ein", "", "ein_2"]),
                section("business", &["ein", "volume"]),
                section("", &["volume"]),
            ]
        };
        let mut first = build();
        let mut second = build();
        assert_eq!(repair_field_ids(&mut first), 5);
        repair_field_ids(&mut second);
        assert_eq!(first, second);

        let ids = |sections: &[Section]| {
            sections
                .iter()
                .map(|s| (s.id.clone(), s.fields.iter().map(|f| f.id.clone()).collect::<Vec<_>>()))
                .collect::<Vec<_>>()
        };
        assert_eq!(
            ids(&first),
            vec![
                ("business".to_string(), vec!["ein".to_string(), "business_field_2".into(), "ein_2".into()]),
                ("business_2".to_string(), vec!["ein_3".to_string(), "volume".into()]),
                ("section_3".to_string(), vec!["volume_2".to_string()]),
            ]
        );
        assert_eq!(repair_field_ids(&mut first), 0);
    }

    #[test]
    fn drag_end_matches_manual_rotation() {
        let mut items = vec!["a", "b", "c"];
        assert!(array_move(&mut items, 0, 2));
        assert_eq!(items, vec!["b", "c", "a"]);

        assert!(!array_move(&mut items, 0, 3));
        assert_eq!(items, vec!["b", "c", "a"]);
    }

    #[test]
    fn keyboard_steps_stay_in_bounds() {
        assert_eq!(step_index(0, 3, Direction::Up), None);
        assert_eq!(step_index(2, 3, Direction::Down), None);
        assert_eq!(step_index(1, 3, Direction::Up), Some(0));
        assert_eq!(step_index(1, 3, Direction::Down), Some(2));
    }

    #[test]
    fn fields_move_between_sections() {
        let mut sections = vec![section("s1", &["a", "b"]), section("s2", &["c"])];
        assert!(move_field_to_section(&mut sections, "a", "s2", 0));
        assert_eq!(all_field_ids(&sections).collect::<Vec<_>>(), vec!["b", "a", "c"]);
        assert!(!move_field_to_section(&mut sections, "a", "missing", 0));
        assert!(move_field(&mut sections, "s2", 0, 1));
        assert_eq!(all_field_ids(&sections).collect::<Vec<_>>(), vec!["b", "c", "a"]);
    }

    #[test]
    fn add_duplicate_remove() {
        let mut sections = vec![section("s1", &["a"])];
        let new_id = add_field(&mut sections, "s1").unwrap();
        assert_ne!(new_id, "a");
        let copy = duplicate_field(&mut sections, "s1", "a").unwrap();
        assert_eq!(sections[0].fields[1].id, copy);
        assert_eq!(sections[0].fields[1].label, "Label a (copy)");
        assert!(remove_field(&mut sections, "s1", &copy).is_some());
        assert_eq!(sections[0].fields.len(), 2);
        assert!(add_field(&mut sections, "nope").is_none());
    }

    #[test]
    fn switching_types_manages_options() {
        let mut field = Field::new("f", FieldType::Text, "F");
        set_field_type(&mut field, FieldType::Select);
        assert_eq!(field.options.as_ref().map(Vec::len), Some(1));
        add_option(&mut field, "Sole Proprietor");
        assert_eq!(field.options.as_ref().unwrap()[1].value(), "Sole Proprietor");

        let option = &mut field.options.as_mut().unwrap()[1];
        structure_option(option).pdf_field_id = Some("cb_sole".into());
        add_option(&mut field, "Limited Liability Co.");
        assert_eq!(
            field.options.as_ref().unwrap()[2].value(),
            "limited_liability_co"
        );

        set_field_type(&mut field, FieldType::Email);
        assert!(field.options.is_none());
    }

    #[test]
    fn payload_derives_required_and_conditional() {
        let mut sections = vec![section("s1", &["hasDba", "dba", "email"])];
        sections[0].fields[2].required = true;
        sections[0].fields[1].conditional = Some(ConditionalRule {
            action: ConditionalAction::Show,
            when: Condition {
                field: "hasDba".into(),
                operator: ConditionOperator::Equals,
                value: serde_json::json!("yes"),
            },
        });
        let meta = TemplateMeta {
            acquirer_id: 3,
            template_name: " Standard ".into(),
            version: "1.0.0".into(),
            is_active: true,
        };
        let payload = build_payload(&meta, &sections);
        assert_eq!(payload.template_name, "Standard");
        assert_eq!(payload.required_fields, vec!["email"]);
        assert!(payload.conditional_fields.unwrap().contains_key("dba"));
        assert!(validate_meta(&meta).is_empty());
    }

    #[test]
    fn meta_validation_reports_each_problem() {
        let meta = TemplateMeta {
            acquirer_id: 0,
            template_name: "".into(),
            version: "1.0".into(),
            is_active: true,
        };
        assert_eq!(validate_meta(&meta).len(), 3);
        assert!(is_semver("10.2.33"));
        assert!(!is_semver("1.x.0"));
    }

    #[test]
    fn fingerprint_changes_with_content() {
        let meta = TemplateMeta {
            acquirer_id: 1,
            template_name: "T".into(),
            version: "1.0.0".into(),
            is_active: true,
        };
        let mut sections = vec![section("s1", &["a", "b"])];
        let before = fingerprint(&meta, &sections);
        assert_eq!(before, fingerprint(&meta, &sections));
        array_move(&mut sections[0].fields, 0, 1);
        assert_ne!(before, fingerprint(&meta, &sections));
    }

    #[test]
    fn deletion_blocked_while_applications_exist() {
        let mut counts = crate::model::template::ApplicationCounts::new();
        counts.insert("4".into(), 2);
        assert_eq!(check_deletable(4, &counts), Err(DeletionBlocked { count: 2 }));
        assert_eq!(check_deletable(5, &counts), Ok(()));
        counts.insert("5".into(), 0);
        assert_eq!(check_deletable(5, &counts), Ok(()));
    }
}
