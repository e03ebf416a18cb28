//! End-to-end walk through a template as the admin saves it and the prospect
//! completes it, using only the shared rules.

use common::address::{AddressEffect, AddressEvent, AddressState};
use common::autosave::{SaveOutcome, SaveSequencer};
use common::editor::{self, TemplateMeta};
use common::model::address::{AddressSuggestion, ValidatedAddress};
use common::model::owner::{Owner, SignatureType};
use common::model::prospect::FormData;
use common::model::template::{ApplicationTemplate, FieldType};
use common::wizard::Wizard;
use serde_json::json;

fn stored_template() -> ApplicationTemplate {
    serde_json::from_value(json!({
        "id": 11,
        "acquirerId": 2,
        "templateName": "Retail",
        "version": "2.0.0",
        "isActive": true,
        "fieldConfiguration": {"sections": [
            {"id": "business", "title": "Business", "fields": [
                {"id": "legalName", "type": "text", "label": "Legal name", "required": true},
                {"id": "", "type": "string", "label": "Phone", "required": false},
                {"id": "ein", "type": "ein", "label": "EIN", "required": true},
                {"id": "address", "type": "address", "label": "Business address", "required": true}
            ]},
            {"id": "ownership", "title": "Ownership", "fields": [
                {"id": "owners", "type": "owners", "label": "Owners", "required": true}
            ]},
            {"id": "processing", "title": "Processing", "fields": [
                {"id": "sellsOnline", "type": "boolean", "label": "Sells online"},
                {"id": "website", "type": "url", "label": "Website", "required": true,
                 "conditional": {"action": "show", "when": {"field": "sellsOnline", "operator": "equals", "value": "yes"}}},
                {"id": "ein", "type": "currency", "label": "Monthly volume", "required": true}
            ]}
        ]},
        "requiredFields": ["legalName"]
    }))
    .unwrap()
}

#[test]
fn admin_save_normalizes_and_derives() {
    let template = stored_template();
    let meta = TemplateMeta {
        acquirer_id: template.acquirer_id,
        template_name: template.template_name.clone(),
        version: template.version.clone(),
        is_active: template.is_active,
    };
    let payload = editor::build_payload(&meta, &template.field_configuration.sections);

    let ids: Vec<&str> = payload
        .field_configuration
        .sections
        .iter()
        .flat_map(|s| s.fields.iter().map(|f| f.id.as_str()))
        .collect();
    let mut deduped = ids.clone();
    deduped.sort_unstable();
    deduped.dedup();
    assert_eq!(deduped.len(), ids.len());
    assert!(ids.iter().all(|id| !id.is_empty()));

    assert_eq!(payload.required_fields.len(), 6);
    assert!(payload.conditional_fields.unwrap().contains_key("website"));
    assert_eq!(
        payload.field_configuration.sections[0].fields[1].field_type,
        FieldType::Text
    );
}

#[test]
fn prospect_completes_the_wizard() {
    let template = stored_template();
    let mut wizard = Wizard::from_template(&template, FormData::new(), 0);
    let mut saves = SaveSequencer::new();

    wizard.set_value("legalName", json!("Acme Outfitters LLC"));
    wizard.set_value("ein", json!("12-3456789"));
    assert!(wizard.next().unwrap_err().contains_key("address"));

    let (address, effects) = AddressState::default().transition(AddressEvent::Input("1 Mark".into()));
    assert!(effects.contains(&AddressEffect::FetchSuggestions("1 Mark".into())));
    let pick = AddressSuggestion {
        description: "1 Market St, San Francisco, CA".into(),
        place_id: Some("abc".into()),
    };
    let (address, _) = address.transition(AddressEvent::SuggestionsLoaded {
        query: "1 Mark".into(),
        suggestions: vec![pick.clone()],
    });
    let (address, _) = address.transition(AddressEvent::Select(pick.clone()));
    let validated = ValidatedAddress {
        street_address: "1 Market St".into(),
        city: "San Francisco".into(),
        state: "CA".into(),
        zip_code: "94105".into(),
    };
    let (address, effects) = address.transition(AddressEvent::Validated {
        selection: pick,
        address: validated.clone(),
    });
    assert!(address.is_locked());
    for effect in effects {
        if let AddressEffect::Apply(addr) = effect {
            wizard.apply_address("address", &addr);
        }
    }

    let debounced = saves.begin();
    assert_eq!(wizard.next(), Ok(1));
    let step_save = saves.begin();
    assert_eq!(saves.succeed(step_save), SaveOutcome::Applied);
    assert_eq!(saves.succeed(debounced), SaveOutcome::Stale);

    wizard.set_owners(
        "owners",
        &[
            Owner {
                name: "Ana Ruiz".into(),
                email: "ana@acme.test".into(),
                percentage: Some(70.0),
                signature: Some("Ana Ruiz".into()),
                signature_type: Some(SignatureType::Typed),
                ..Owner::default()
            },
            Owner {
                name: "Ben Ode".into(),
                email: "ben@acme.test".into(),
                percentage: Some(30.0),
                signature: None,
                ..Owner::default()
            },
        ],
    );
    let errors = wizard.next().unwrap_err();
    assert!(errors["owners"].to_string().contains("Signature required for Ben Ode"));

    let mut owners = wizard.owners("owners");
    owners[1].signature = Some("data:image/png;base64,AAAA".into());
    owners[1].signature_type = Some(SignatureType::Drawn);
    wizard.set_owners("owners", &owners);
    assert_eq!(wizard.next(), Ok(2));

    wizard.set_value("sellsOnline", json!(true));
    assert!(wizard.validate_step(2).contains_key("website"));
    wizard.set_value("sellsOnline", json!(false));
    assert!(!wizard.validate_step(2).contains_key("website"));

    assert_eq!(wizard.sections()[0].fields[1].id, "business_field_2");
    assert_eq!(wizard.sections()[2].fields[2].id, "ein_2");
    wizard.set_value("ein_2", json!("$40,000"));
    assert!(wizard.validate_all().is_ok());
    assert_eq!(wizard.form_data()["city"], "San Francisco");
    assert_eq!(wizard.all_owners().len(), 2);
}
