use serde::{Deserialize, Serialize};

use super::template::{Field, FieldType, Section};

/// `GET /api/pdf-forms/:id/with-fields`: an uploaded PDF with the fillable
/// fields extracted from it and, once mapped, the sections built on top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfForm {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub fields: Vec<PdfFormField>,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfFormField {
    pub field_name: String,
    #[serde(default)]
    pub field_type: String,
    #[serde(default)]
    pub field_label: Option<String>,
    #[serde(default)]
    pub is_required: bool,
}

impl PdfFormField {
    /// Wizard field that fills this PDF field directly.
    pub fn to_field(&self) -> Field {
        let field_type = match self.field_type.to_lowercase().as_str() {
            "checkbox" | "check" => FieldType::Checkbox,
            "date" => FieldType::Date,
            "number" | "numeric" => FieldType::Number,
            "multiline" | "textarea" => FieldType::Textarea,
            _ => FieldType::Text,
        };
        let label = self
            .field_label
            .clone()
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| self.field_name.clone());
        let mut field = Field::new(self.field_name.clone(), field_type, label);
        field.required = self.is_required;
        field.pdf_field_id = Some(self.field_name.clone());
        field
    }
}

impl PdfForm {
    /// Steps for filling the form: the mapped sections when there are any,
    /// otherwise one step holding every extracted PDF field.
    pub fn wizard_sections(&self) -> Vec<Section> {
        if !self.sections.is_empty() {
            return self.sections.clone();
        }
        if self.fields.is_empty() {
            return Vec::new();
        }
        vec![Section {
            id: format!("pdf-form-{}", self.id),
            title: self.name.clone(),
            description: None,
            fields: self.fields.iter().map(PdfFormField::to_field).collect(),
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unmapped_form_becomes_one_step() {
        let form: PdfForm = serde_json::from_value(json!({
            "id": 4,
            "name": "Merchant agreement",
            "fields": [
                {"fieldName": "dba_name", "fieldType": "text", "fieldLabel": "DBA name", "isRequired": true},
                {"fieldName": "agree_terms", "fieldType": "CheckBox"},
                {"fieldName": "signed_on", "fieldType": "date", "fieldLabel": " "}
            ]
        }))
        .unwrap();
        let sections = form.wizard_sections();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "Merchant agreement");
        let fields = &sections[0].fields;
        assert_eq!(fields[0].label, "DBA name");
        assert!(fields[0].required);
        assert_eq!(fields[0].pdf_field_id.as_deref(), Some("dba_name"));
        assert_eq!(fields[1].field_type, FieldType::Checkbox);
        assert_eq!(fields[2].label, "signed_on");
    }

    #[test]
    fn mapped_sections_win() {
        let form = PdfForm {
            id: 1,
            name: "Form".into(),
            fields: vec![],
            sections: vec![Section {
                id: "s".into(),
                title: "Mapped".into(),
                description: None,
                fields: vec![],
            }],
            template_id: Some(3),
        };
        assert_eq!(form.wizard_sections()[0].title, "Mapped");
        let empty = PdfForm { sections: vec![], ..form };
        assert!(empty.wizard_sections().is_empty());
    }
}
