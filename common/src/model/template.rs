use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An admin-authored application form schema.
///
/// Templates are owned by an acquirer and drive the prospect wizard: each
/// `Section` of `field_configuration` becomes one wizard step. The
/// `required_fields` and `conditional_fields` members are derived from the
/// sections on save (see `editor::build_payload`) and are kept for consumers
/// that read them without walking the sections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationTemplate {
    pub id: i64,
    pub acquirer_id: i64,
    pub template_name: String,
    pub version: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub field_configuration: FieldConfiguration,
    #[serde(default)]
    pub required_fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional_fields: Option<BTreeMap<String, ConditionalRule>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_form_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Body of `POST`/`PUT /api/acquirer-application-templates`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplatePayload {
    pub acquirer_id: i64,
    pub template_name: String,
    pub version: String,
    pub is_active: bool,
    pub field_configuration: FieldConfiguration,
    pub required_fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional_fields: Option<BTreeMap<String, ConditionalRule>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldConfiguration {
    #[serde(default)]
    pub sections: Vec<Section>,
}

/// One wizard step. Order in `FieldConfiguration::sections` is significant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    /// Regular expression the whole value must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Numeric lower bound, or minimum length for text-like fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Numeric upper bound, or maximum length for text-like fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<FieldOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional: Option<ConditionalRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_field_id: Option<String>,
}

impl Field {
    pub fn new(id: impl Into<String>, field_type: FieldType, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            field_type,
            label: label.into(),
            required: false,
            placeholder: None,
            help_text: None,
            pattern: None,
            min: None,
            max: None,
            options: None,
            conditional: None,
            pdf_field_id: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_conditional(mut self, rule: ConditionalRule) -> Self {
        self.conditional = Some(rule);
        self
    }

    pub fn with_options(mut self, options: Vec<FieldOption>) -> Self {
        self.options = Some(options);
        self
    }
}

/// Field input kinds. Legacy names written by older template editors are
/// accepted through aliases and normalized on the next save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[serde(alias = "string", alias = "input")]
    Text,
    Email,
    Tel,
    Url,
    Date,
    Number,
    #[serde(alias = "dropdown", alias = "mcc-select")]
    Select,
    #[serde(alias = "boolean")]
    Checkbox,
    Textarea,
    Radio,
    #[serde(alias = "money")]
    Currency,
    #[serde(alias = "zip", alias = "postal")]
    Zipcode,
    Phone,
    Ein,
    Address,
    #[serde(alias = "owners")]
    Ownership,
    #[serde(other)]
    Unknown,
}

impl FieldType {
    pub const ALL: [FieldType; 16] = [
        FieldType::Text,
        FieldType::Email,
        FieldType::Tel,
        FieldType::Url,
        FieldType::Date,
        FieldType::Number,
        FieldType::Select,
        FieldType::Checkbox,
        FieldType::Textarea,
        FieldType::Radio,
        FieldType::Currency,
        FieldType::Zipcode,
        FieldType::Phone,
        FieldType::Ein,
        FieldType::Address,
        FieldType::Ownership,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Email => "email",
            FieldType::Tel => "tel",
            FieldType::Url => "url",
            FieldType::Date => "date",
            FieldType::Number => "number",
            FieldType::Select => "select",
            FieldType::Checkbox => "checkbox",
            FieldType::Textarea => "textarea",
            FieldType::Radio => "radio",
            FieldType::Currency => "currency",
            FieldType::Zipcode => "zipcode",
            FieldType::Phone => "phone",
            FieldType::Ein => "ein",
            FieldType::Address => "address",
            FieldType::Ownership => "ownership",
            FieldType::Unknown => "unknown",
        }
    }

    /// Parses the editor's `<select>` value; unknown names map to `Unknown`.
    pub fn parse(value: &str) -> Self {
        serde_json::from_value(serde_json::Value::String(value.to_string()))
            .unwrap_or(FieldType::Unknown)
    }

    /// Whether the field carries a list of options the admin must author.
    pub fn has_options(&self) -> bool {
        matches!(self, FieldType::Select | FieldType::Radio)
    }
}

/// Option of a select/radio field. Older templates store bare strings;
/// newer ones carry a PDF mapping and optional visibility rule per option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldOption {
    Plain(String),
    Structured(StructuredOption),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredOption {
    pub label: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_field_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional: Option<ConditionalRule>,
}

impl FieldOption {
    pub fn label(&self) -> &str {
        match self {
            FieldOption::Plain(s) => s,
            FieldOption::Structured(o) => &o.label,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            FieldOption::Plain(s) => s,
            FieldOption::Structured(o) => &o.value,
        }
    }

    pub fn conditional(&self) -> Option<&ConditionalRule> {
        match self {
            FieldOption::Plain(_) => None,
            FieldOption::Structured(o) => o.conditional.as_ref(),
        }
    }
}

/// `{action: show|hide, when: {field, operator, value}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalRule {
    pub action: ConditionalAction,
    pub when: Condition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionalAction {
    Show,
    Hide,
    /// Any other action; the rule is ignored.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub operator: ConditionOperator,
    #[serde(default)]
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConditionOperator {
    #[serde(alias = "eq", alias = "equal")]
    Equals,
    #[serde(alias = "not_equals", alias = "neq")]
    NotEquals,
    Contains,
    #[serde(alias = "not_contains")]
    NotContains,
    #[serde(alias = "greater_than", alias = "gt")]
    GreaterThan,
    #[serde(alias = "less_than", alias = "lt")]
    LessThan,
    #[serde(alias = "is_empty")]
    IsEmpty,
    #[serde(alias = "is_not_empty")]
    IsNotEmpty,
    /// An operator this client does not know; it never holds.
    #[serde(other)]
    Unknown,
}

impl ConditionOperator {
    pub const ALL: [ConditionOperator; 8] = [
        ConditionOperator::Equals,
        ConditionOperator::NotEquals,
        ConditionOperator::Contains,
        ConditionOperator::NotContains,
        ConditionOperator::GreaterThan,
        ConditionOperator::LessThan,
        ConditionOperator::IsEmpty,
        ConditionOperator::IsNotEmpty,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionOperator::Equals => "equals",
            ConditionOperator::NotEquals => "notEquals",
            ConditionOperator::Contains => "contains",
            ConditionOperator::NotContains => "notContains",
            ConditionOperator::GreaterThan => "greaterThan",
            ConditionOperator::LessThan => "lessThan",
            ConditionOperator::IsEmpty => "isEmpty",
            ConditionOperator::IsNotEmpty => "isNotEmpty",
            ConditionOperator::Unknown => "unknown",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        serde_json::from_value(serde_json::Value::String(value.to_string()))
            .ok()
            .filter(|op| *op != ConditionOperator::Unknown)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Acquirer {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Response of `GET .../application-counts`: template id → submitted
/// application count. The API keys the JSON object by stringified id.
pub type ApplicationCounts = BTreeMap<String, u64>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn legacy_type_aliases_are_accepted() {
        let field: Field = serde_json::from_value(json!({
            "id": "mcc", "type": "dropdown", "label": "MCC"
        }))
        .unwrap();
        assert_eq!(field.field_type, FieldType::Select);
        assert_eq!(FieldType::parse("boolean"), FieldType::Checkbox);
        assert_eq!(FieldType::parse("owners"), FieldType::Ownership);
        assert_eq!(FieldType::parse("signature-pad"), FieldType::Unknown);
    }

    #[test]
    fn options_accept_plain_and_structured_forms() {
        let field: Field = serde_json::from_value(json!({
            "id": "entity", "type": "select", "label": "Entity type",
            "options": ["LLC", {"label": "Sole proprietor", "value": "sole", "pdfFieldId": "cb_sole"}]
        }))
        .unwrap();
        let options = field.options.unwrap();
        assert_eq!(options[0].value(), "LLC");
        assert_eq!(options[1].label(), "Sole proprietor");
        assert_eq!(options[1].value(), "sole");
    }

    #[test]
    fn template_reads_api_shape() {
        let template: ApplicationTemplate = serde_json::from_value(json!({
            "id": 7,
            "acquirerId": 2,
            "templateName": "Standard",
            "version": "1.2.0",
            "fieldConfiguration": {"sections": [{"id": "s1", "title": "Business", "fields": []}]},
            "requiredFields": [],
            "conditionalFields": {
                "dba": {"action": "show", "when": {"field": "hasDba", "operator": "equals", "value": "yes"}}
            }
        }))
        .unwrap();
        assert!(template.is_active);
        assert_eq!(template.field_configuration.sections[0].title, "Business");
        let rules = template.conditional_fields.unwrap();
        assert_eq!(rules["dba"].when.operator, ConditionOperator::Equals);
    }
}
