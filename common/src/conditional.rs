//! Conditional visibility of fields and options.
//!
//! A rule is `{action, when: {field, operator, value}}`: with `show` the
//! target is visible only while the condition holds, with `hide` it is
//! visible only while the condition does not hold. Targets without a rule
//! are always visible.

use serde_json::Value;
use std::collections::BTreeMap;

use crate::model::prospect::FormData;
use crate::model::template::{
    Condition, ConditionOperator, ConditionalAction, ConditionalRule, Field, FieldOption, Section,
};
use crate::validation::fields::{is_blank, parse_amount};

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn texts_equal(actual: &Value, expected: &Value) -> bool {
    let expected = scalar_text(expected);
    match actual {
        Value::Array(items) => items.iter().any(|item| scalar_text(item) == expected),
        // Checkbox values are booleans while authored rules often say "yes".
        Value::Bool(b) => {
            let e = expected.to_ascii_lowercase();
            (*b && matches!(e.as_str(), "true" | "yes" | "on" | "1"))
                || (!*b && matches!(e.as_str(), "false" | "no" | "off" | "0" | ""))
        }
        other => scalar_text(other) == expected,
    }
}

fn matches_any(actual: &Value, expected: &Value) -> bool {
    match expected {
        Value::Array(candidates) => candidates.iter().any(|c| texts_equal(actual, c)),
        single => texts_equal(actual, single),
    }
}

fn contains(actual: &Value, expected: &Value) -> bool {
    let needle = scalar_text(expected).to_lowercase();
    match actual {
        Value::Array(items) => items
            .iter()
            .any(|item| scalar_text(item).to_lowercase() == needle),
        other => scalar_text(other).to_lowercase().contains(&needle),
    }
}

fn compare_numbers(actual: &Value, expected: &Value) -> Option<std::cmp::Ordering> {
    let a = parse_amount(&scalar_text(actual))?;
    let e = parse_amount(&scalar_text(expected))?;
    a.partial_cmp(&e)
}

/// Evaluates the condition part of a rule against the form data.
pub fn condition_holds(condition: &Condition, data: &FormData) -> bool {
    let actual = data.get(&condition.field);
    let null = Value::Null;
    let value = actual.unwrap_or(&null);

    match condition.operator {
        ConditionOperator::IsEmpty => is_blank(actual),
        ConditionOperator::IsNotEmpty => !is_blank(actual),
        ConditionOperator::Equals => matches_any(value, &condition.value),
        ConditionOperator::NotEquals => !matches_any(value, &condition.value),
        ConditionOperator::Contains => !is_blank(actual) && contains(value, &condition.value),
        ConditionOperator::NotContains => is_blank(actual) || !contains(value, &condition.value),
        ConditionOperator::GreaterThan => {
            compare_numbers(value, &condition.value) == Some(std::cmp::Ordering::Greater)
        }
        ConditionOperator::LessThan => {
            compare_numbers(value, &condition.value) == Some(std::cmp::Ordering::Less)
        }
        ConditionOperator::Unknown => false,
    }
}

pub fn is_visible(rule: Option<&ConditionalRule>, data: &FormData) -> bool {
    match rule {
        None => true,
        Some(rule) => {
            let holds = condition_holds(&rule.when, data);
            match rule.action {
                ConditionalAction::Show => holds,
                ConditionalAction::Hide => !holds,
                ConditionalAction::Unknown => true,
            }
        }
    }
}

/// The rule governing `field`: its own, or the template-level entry keyed
/// by its id for templates saved before rules moved onto fields.
pub fn rule_for<'a>(
    field: &'a Field,
    template_rules: Option<&'a BTreeMap<String, ConditionalRule>>,
) -> Option<&'a ConditionalRule> {
    field
        .conditional
        .as_ref()
        .or_else(|| template_rules.and_then(|rules| rules.get(&field.id)))
}

pub fn visible_fields<'a>(
    section: &'a Section,
    data: &FormData,
    template_rules: Option<&'a BTreeMap<String, ConditionalRule>>,
) -> Vec<&'a Field> {
    section
        .fields
        .iter()
        .filter(|field| is_visible(rule_for(field, template_rules), data))
        .collect()
}

pub fn visible_options<'a>(field: &'a Field, data: &FormData) -> Vec<&'a FieldOption> {
    field
        .options
        .iter()
        .flatten()
        .filter(|option| is_visible(option.conditional(), data))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::template::{FieldType, StructuredOption};
    use serde_json::json;

    fn rule(action: ConditionalAction, field: &str, operator: ConditionOperator, value: Value) -> ConditionalRule {
        ConditionalRule {
            action,
            when: Condition {
                field: field.to_string(),
                operator,
                value,
            },
        }
    }

    fn data(value: Value) -> FormData {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn show_and_hide_invert_each_other() {
        let show = rule(ConditionalAction::Show, "hasDba", ConditionOperator::Equals, json!("yes"));
        let hide = rule(ConditionalAction::Hide, "hasDba", ConditionOperator::Equals, json!("yes"));
        let yes = data(json!({"hasDba": "yes"}));
        let no = data(json!({"hasDba": "no"}));
        assert!(is_visible(Some(&show), &yes));
        assert!(!is_visible(Some(&show), &no));
        assert!(!is_visible(Some(&hide), &yes));
        assert!(is_visible(Some(&hide), &no));
        assert!(is_visible(None, &no));
    }

    #[test]
    fn checkbox_booleans_match_yes_no() {
        let show = rule(ConditionalAction::Show, "seasonal", ConditionOperator::Equals, json!("yes"));
        assert!(is_visible(Some(&show), &data(json!({"seasonal": true}))));
        assert!(!is_visible(Some(&show), &data(json!({"seasonal": false}))));
    }

    #[test]
    fn numeric_and_emptiness_operators() {
        let big = rule(ConditionalAction::Show, "volume", ConditionOperator::GreaterThan, json!(50000));
        assert!(is_visible(Some(&big), &data(json!({"volume": "$75,000"}))));
        assert!(!is_visible(Some(&big), &data(json!({"volume": "1000"}))));
        assert!(!is_visible(Some(&big), &data(json!({}))));

        let filled = rule(ConditionalAction::Show, "website", ConditionOperator::IsNotEmpty, Value::Null);
        assert!(is_visible(Some(&filled), &data(json!({"website": "shop.example.com"}))));
        assert!(!is_visible(Some(&filled), &data(json!({"website": ""}))));
    }

    #[test]
    fn equals_accepts_candidate_lists_and_contains_is_case_insensitive() {
        let entity = rule(
            ConditionalAction::Show,
            "entity",
            ConditionOperator::Equals,
            json!(["llc", "corp"]),
        );
        assert!(is_visible(Some(&entity), &data(json!({"entity": "corp"}))));
        assert!(!is_visible(Some(&entity), &data(json!({"entity": "sole"}))));

        let online = rule(ConditionalAction::Show, "channels", ConditionOperator::Contains, json!("online"));
        assert!(is_visible(Some(&online), &data(json!({"channels": ["retail", "online"]}))));
        assert!(is_visible(Some(&online), &data(json!({"channels": "Online and phone"}))));
    }

    #[test]
    fn unrecognised_operator_and_action_still_parse() {
        let field: Field = serde_json::from_value(json!({
            "id": "website",
            "type": "url",
            "label": "Website",
            "conditional": {"action": "show", "when": {"field": "sellsOnline", "operator": "startsWith", "value": "y"}}
        }))
        .unwrap();
        let rule = field.conditional.as_ref().unwrap();
        assert_eq!(rule.when.operator, ConditionOperator::Unknown);
        assert!(!condition_holds(&rule.when, &data(json!({"sellsOnline": "yes"}))));
        assert!(!is_visible(Some(rule), &data(json!({"sellsOnline": "yes"}))));

        let odd: ConditionalRule = serde_json::from_value(json!({
            "action": "highlight",
            "when": {"field": "sellsOnline", "operator": "equals", "value": "yes"}
        }))
        .unwrap();
        assert_eq!(odd.action, ConditionalAction::Unknown);
        assert!(is_visible(Some(&odd), &data(json!({}))));
        assert_eq!(ConditionOperator::parse("startsWith"), None);
        assert_eq!(ConditionOperator::parse("gt"), Some(ConditionOperator::GreaterThan));
    }

    #[test]
    fn visible_fields_falls_back_to_template_rules() {
        let section = Section {
            id: "business".into(),
            title: "Business".into(),
            description: None,
            fields: vec![
                Field::new("hasDba", FieldType::Radio, "Has DBA"),
                Field::new("dba", FieldType::Text, "DBA name"),
            ],
        };
        let mut rules = BTreeMap::new();
        rules.insert(
            "dba".to_string(),
            rule(ConditionalAction::Show, "hasDba", ConditionOperator::Equals, json!("yes")),
        );

        let ids = |d: &FormData| {
            visible_fields(&section, d, Some(&rules))
                .iter()
                .map(|f| f.id.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(ids(&data(json!({"hasDba": "no"}))), vec!["hasDba"]);
        assert_eq!(ids(&data(json!({"hasDba": "yes"}))), vec!["hasDba", "dba"]);
    }

    #[test]
    fn options_can_be_hidden() {
        let field = Field::new("processor", FieldType::Select, "Processor").with_options(vec![
            FieldOption::Plain("Standard".into()),
            FieldOption::Structured(StructuredOption {
                label: "High risk".into(),
                value: "high_risk".into(),
                pdf_field_id: None,
                conditional: Some(rule(
                    ConditionalAction::Hide,
                    "country",
                    ConditionOperator::NotEquals,
                    json!("US"),
                )),
            }),
        ]);
        assert_eq!(visible_options(&field, &data(json!({"country": "CA"}))).len(), 1);
        assert_eq!(visible_options(&field, &data(json!({"country": "US"}))).len(), 2);
    }
}
