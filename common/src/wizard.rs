//! Linear step navigation for the prospect application wizard.
//!
//! Each template section is one step. Moving forward validates only the
//! fields of the current step that are visible under the conditional rules;
//! moving back never validates. Submitting re-validates every step.

use serde_json::Value;
use std::collections::BTreeMap;

use crate::address::{apply_validated_address, AddressKeys};
use crate::conditional;
use crate::editor;
use crate::model::address::ValidatedAddress;
use crate::model::owner::Owner;
use crate::model::prospect::{FormData, SaveFormDataRequest};
use crate::model::template::{ApplicationTemplate, ConditionalRule, Field, Section};
use crate::validation::{validate_field, FieldError, SignaturePolicy};

/// Field id → first problem with that field.
pub type StepErrors = BTreeMap<String, FieldError>;

/// The first step that failed whole-form validation.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitBlocked {
    pub step: usize,
    pub errors: StepErrors,
}

#[derive(Debug, Clone)]
pub struct Wizard {
    sections: Vec<Section>,
    template_rules: Option<BTreeMap<String, ConditionalRule>>,
    form_data: FormData,
    current_step: usize,
    furthest_step: usize,
    policy: SignaturePolicy,
}

impl Wizard {
    /// Blank or repeated field ids are repaired deterministically first, so
    /// every field owns its own `formData` key.
    pub fn new(mut sections: Vec<Section>, form_data: FormData, current_step: usize) -> Self {
        editor::repair_field_ids(&mut sections);
        let last = sections.len().saturating_sub(1);
        let current_step = current_step.min(last);
        Self {
            sections,
            template_rules: None,
            form_data,
            current_step,
            furthest_step: current_step,
            policy: SignaturePolicy::default(),
        }
    }

    pub fn from_template(template: &ApplicationTemplate, form_data: FormData, current_step: usize) -> Self {
        let mut wizard = Self::new(
            template.field_configuration.sections.clone(),
            form_data,
            current_step,
        );
        wizard.template_rules = template.conditional_fields.clone();
        wizard
    }

    pub fn with_policy(mut self, policy: SignaturePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn step_count(&self) -> usize {
        self.sections.len()
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn current_section(&self) -> Option<&Section> {
        self.sections.get(self.current_step)
    }

    pub fn is_first(&self) -> bool {
        self.current_step == 0
    }

    pub fn is_last(&self) -> bool {
        self.current_step + 1 >= self.sections.len()
    }

    pub fn form_data(&self) -> &FormData {
        &self.form_data
    }

    /// Percentage of steps completed, for the progress bar.
    pub fn progress(&self) -> u8 {
        if self.sections.is_empty() {
            return 0;
        }
        ((self.current_step + 1) * 100 / self.sections.len()) as u8
    }

    pub fn visible_fields(&self, step: usize) -> Vec<&Field> {
        match self.sections.get(step) {
            Some(section) => {
                conditional::visible_fields(section, &self.form_data, self.template_rules.as_ref())
            }
            None => Vec::new(),
        }
    }

    pub fn validate_step(&self, step: usize) -> StepErrors {
        self.visible_fields(step)
            .into_iter()
            .filter_map(|field| {
                validate_field(field, &self.form_data, &self.policy)
                    .err()
                    .map(|err| (field.id.clone(), err))
            })
            .collect()
    }

    /// Advances one step if the current step is valid.
    pub fn next(&mut self) -> Result<usize, StepErrors> {
        let errors = self.validate_step(self.current_step);
        if !errors.is_empty() {
            return Err(errors);
        }
        if !self.is_last() {
            self.current_step += 1;
            self.furthest_step = self.furthest_step.max(self.current_step);
        }
        Ok(self.current_step)
    }

    pub fn back(&mut self) -> usize {
        self.current_step = self.current_step.saturating_sub(1);
        self.current_step
    }

    /// Jumps to a step already reached; forward jumps past it are refused.
    pub fn go_to(&mut self, step: usize) -> bool {
        if step < self.sections.len() && step <= self.furthest_step {
            self.current_step = step;
            true
        } else {
            false
        }
    }

    /// Validates every step; on failure the wizard moves to the first
    /// failing step so the prospect lands on the problem.
    pub fn validate_all(&mut self) -> Result<(), SubmitBlocked> {
        for step in 0..self.sections.len() {
            let errors = self.validate_step(step);
            if !errors.is_empty() {
                self.current_step = step;
                return Err(SubmitBlocked { step, errors });
            }
        }
        Ok(())
    }

    pub fn set_value(&mut self, key: &str, value: Value) {
        self.form_data.insert(key.to_string(), value);
    }

    pub fn value(&self, key: &str) -> Option<&Value> {
        self.form_data.get(key)
    }

    pub fn text(&self, key: &str) -> String {
        match self.form_data.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        }
    }

    pub fn apply_address(&mut self, field_id: &str, address: &ValidatedAddress) {
        apply_validated_address(&mut self.form_data, &AddressKeys::for_field(field_id), address);
    }

    pub fn owners(&self, field_id: &str) -> Vec<Owner> {
        self.form_data
            .get(field_id)
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default()
    }

    pub fn set_owners(&mut self, field_id: &str, owners: &[Owner]) {
        let value = serde_json::to_value(owners).unwrap_or(Value::Array(Vec::new()));
        self.form_data.insert(field_id.to_string(), value);
    }

    /// Owners of every visible ownership field, for `owners-with-signatures`.
    pub fn all_owners(&self) -> Vec<Owner> {
        (0..self.sections.len())
            .flat_map(|step| self.visible_fields(step))
            .filter(|f| f.field_type == crate::model::template::FieldType::Ownership)
            .flat_map(|f| self.owners(&f.id))
            .collect()
    }

    pub fn save_request(&self) -> SaveFormDataRequest {
        SaveFormDataRequest {
            form_data: self.form_data.clone(),
            current_step: self.current_step,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::template::{
        Condition, ConditionOperator, ConditionalAction, FieldType,
    };
    use serde_json::json;

    fn sections() -> Vec<Section> {
        vec![
            Section {
                id: "business".into(),
                title: "Business".into(),
                description: None,
                fields: vec![
                    Field::new("legalName", FieldType::Text, "Legal name").required(),
                    Field::new("hasDba", FieldType::Radio, "Has DBA"),
                    Field::new("dba", FieldType::Text, "DBA name")
                        .required()
                        .with_conditional(ConditionalRule {
                            action: ConditionalAction::Show,
                            when: Condition {
                                field: "hasDba".into(),
                                operator: ConditionOperator::Equals,
                                value: json!("yes"),
                            },
                        }),
                ],
            },
            Section {
                id: "ownership".into(),
                title: "Ownership".into(),
                description: None,
                fields: vec![Field::new("owners", FieldType::Ownership, "Owners").required()],
            },
            Section {
                id: "review".into(),
                title: "Review".into(),
                description: None,
                fields: vec![Field::new("agree", FieldType::Checkbox, "I agree").required()],
            },
        ]
    }

    #[test]
    fn next_is_blocked_by_visible_required_field_only() {
        let mut wizard = Wizard::new(sections(), FormData::new(), 0);
        let errors = wizard.next().unwrap_err();
        assert_eq!(errors.keys().collect::<Vec<_>>(), vec!["legalName"]);

        wizard.set_value("legalName", json!("Acme LLC"));
        assert_eq!(wizard.next(), Ok(1));
    }

    #[test]
    fn revealed_field_becomes_required() {
        let mut wizard = Wizard::new(sections(), FormData::new(), 0);
        wizard.set_value("legalName", json!("Acme LLC"));
        wizard.set_value("hasDba", json!("yes"));
        let errors = wizard.next().unwrap_err();
        assert!(errors.contains_key("dba"));
    }

    #[test]
    fn back_never_validates_and_go_to_respects_progress() {
        let mut wizard = Wizard::new(sections(), FormData::new(), 0);
        assert!(!wizard.go_to(2));
        wizard.set_value("legalName", json!("Acme"));
        wizard.next().unwrap();
        assert_eq!(wizard.back(), 0);
        assert_eq!(wizard.back(), 0);
        assert!(wizard.go_to(1));
        assert!(!wizard.go_to(2));
    }

    #[test]
    fn ownership_step_requires_valid_owners() {
        let mut wizard = Wizard::new(sections(), FormData::new(), 1);
        wizard.set_owners(
            "owners",
            &[Owner {
                name: "Ana".into(),
                email: "ana@example.com".into(),
                percentage: Some(100.0),
                signature: None,
                ..Owner::default()
            }],
        );
        let errors = wizard.next().unwrap_err();
        assert!(errors["owners"].to_string().contains("Signature required"));

        let mut owners = wizard.owners("owners");
        owners[0].signature = Some("Ana Smith".into());
        wizard.set_owners("owners", &owners);
        assert_eq!(wizard.next(), Ok(2));
        assert_eq!(wizard.all_owners().len(), 1);
    }

    #[test]
    fn validate_all_lands_on_first_failing_step() {
        let mut data = FormData::new();
        data.insert("legalName".into(), json!("Acme"));
        let mut wizard = Wizard::new(sections(), data, 2);
        let blocked = wizard.validate_all().unwrap_err();
        assert_eq!(blocked.step, 1);
        assert_eq!(wizard.current_step(), 1);
    }

    #[test]
    fn resumes_at_clamped_step_and_reports_progress() {
        let wizard = Wizard::new(sections(), FormData::new(), 9);
        assert_eq!(wizard.current_step(), 2);
        assert!(wizard.is_last());
        assert_eq!(wizard.progress(), 100);
        assert_eq!(wizard.save_request().current_step, 2);
    }

    #[test]
    fn repeated_ids_in_a_stored_template_get_their_own_keys() {
        let template: ApplicationTemplate = serde_json::from_value(json!({
            "id": 3,
            "acquirerId": 1,
            "templateName": "Legacy",
            "version": "1.0.0",
            "isActive": true,
            "fieldConfiguration": {"sections": [
                {"id": "business", "title": "Business", "fields": [
                    {"id": "ein", "type": "ein", "label": "EIN", "required": true}
                ]},
                {"id": "processing", "title": "Processing", "fields": [
                    {"id": "ein", "type": "currency", "label": "Monthly volume", "required": true}
                ]}
            ]},
            "requiredFields": []
        }))
        .unwrap();
        let mut wizard = Wizard::from_template(&template, FormData::new(), 0);
        assert_eq!(wizard.sections()[1].fields[0].id, "ein_2");

        wizard.set_value("ein", json!("12-3456789"));
        wizard.set_value("ein_2", json!("$40,000"));
        assert_eq!(wizard.validate_all(), Ok(()));

        let reloaded = Wizard::from_template(&template, wizard.form_data().clone(), 1);
        assert_eq!(reloaded.text("ein_2"), "$40,000");
    }

    #[test]
    fn address_is_written_atomically() {
        let mut wizard = Wizard::new(sections(), FormData::new(), 0);
        wizard.set_value("city", json!("Stale City"));
        wizard.apply_address(
            "address",
            &ValidatedAddress {
                street_address: "1 Market St".into(),
                city: "San Francisco".into(),
                state: "CA".into(),
                zip_code: "94105".into(),
            },
        );
        assert_eq!(wizard.text("city"), "San Francisco");
        assert_eq!(wizard.text("zipCode"), "94105");
    }
}
