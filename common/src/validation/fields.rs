use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::LazyLock;

use crate::address::AddressKeys;
use crate::conditional;
use crate::model::owner::Owner;
use crate::model::prospect::FormData;
use crate::model::template::{Field, FieldType};

use super::owners::{validate_owners, OwnershipError, SignaturePolicy};
use super::is_valid_email;

static ZIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{5}(-\d{4})?$").expect("zip regex"));
static EIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}-?\d{7}$").expect("ein regex"));
static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(https?://)?[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)+(:\d+)?(/\S*)?$").expect("url regex")
});
static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").expect("date regex"));

#[derive(Debug, Clone, PartialEq)]
pub enum FieldError {
    Required { label: String },
    InvalidFormat { label: String, expected: &'static str },
    PatternMismatch { label: String },
    BelowMin { label: String, min: f64, length: bool },
    AboveMax { label: String, max: f64, length: bool },
    NotAnOption { label: String },
    Ownership(OwnershipError),
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::Required { label } => write!(f, "{label} is required"),
            FieldError::InvalidFormat { label, expected } => {
                write!(f, "{label} must be {expected}")
            }
            FieldError::PatternMismatch { label } => write!(f, "{label} has an invalid format"),
            FieldError::BelowMin { label, min, length: true } => {
                write!(f, "{label} must be at least {min} characters")
            }
            FieldError::BelowMin { label, min, length: false } => {
                write!(f, "{label} must be at least {min}")
            }
            FieldError::AboveMax { label, max, length: true } => {
                write!(f, "{label} must be at most {max} characters")
            }
            FieldError::AboveMax { label, max, length: false } => {
                write!(f, "{label} must be at most {max}")
            }
            FieldError::NotAnOption { label } => write!(f, "{label} has an unknown selection"),
            FieldError::Ownership(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for FieldError {}

/// Whether a form value counts as "not answered".
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Bool(b)) => !b,
        Some(Value::Array(a)) => a.is_empty(),
        Some(Value::Object(o)) => o.is_empty(),
        Some(Value::Number(_)) => false,
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Parses numbers the way prospects type them: `$1,250.00`, ` 42 `.
pub fn parse_amount(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' '))
        .collect();
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn digit_count(text: &str) -> usize {
    text.chars().filter(char::is_ascii_digit).count()
}

fn is_valid_phone(text: &str) -> bool {
    let allowed = text
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')' | '.' | '+'));
    let digits = digit_count(text);
    allowed && (digits == 10 || (digits == 11 && text.trim_start_matches('+').starts_with('1')))
}

fn is_valid_date(text: &str) -> bool {
    let Some(caps) = DATE_RE.captures(text) else {
        return false;
    };
    let month: u32 = caps[2].parse().unwrap_or(0);
    let day: u32 = caps[3].parse().unwrap_or(0);
    (1..=12).contains(&month) && (1..=31).contains(&day)
}

fn check_bounds(field: &Field, amount: f64, length: bool) -> Result<(), FieldError> {
    if let Some(min) = field.min {
        if amount < min {
            return Err(FieldError::BelowMin {
                label: field.label.clone(),
                min,
                length,
            });
        }
    }
    if let Some(max) = field.max {
        if amount > max {
            return Err(FieldError::AboveMax {
                label: field.label.clone(),
                max,
                length,
            });
        }
    }
    Ok(())
}

fn check_pattern(field: &Field, text: &str) -> Result<(), FieldError> {
    let Some(pattern) = field.pattern.as_deref().filter(|p| !p.is_empty()) else {
        return Ok(());
    };
    // An admin-authored pattern that does not compile imposes no constraint.
    match Regex::new(&format!("^(?:{pattern})$")) {
        Ok(re) if !re.is_match(text) => Err(FieldError::PatternMismatch {
            label: field.label.clone(),
        }),
        _ => Ok(()),
    }
}

/// Validates one visible field against the current form data.
///
/// Most fields read the value stored under their id; `address` fields read
/// the four keys of `AddressKeys::for_field`, and `ownership` fields read an
/// owners array.
pub fn validate_field(
    field: &Field,
    data: &FormData,
    policy: &SignaturePolicy,
) -> Result<(), FieldError> {
    match field.field_type {
        FieldType::Address => return validate_address(field, data),
        FieldType::Ownership => return validate_ownership(field, data, policy),
        _ => {}
    }

    let value = data.get(&field.id);
    if is_blank(value) {
        return if field.required {
            Err(FieldError::Required {
                label: field.label.clone(),
            })
        } else {
            Ok(())
        };
    }
    let Some(value) = value else {
        return Ok(());
    };
    let text = as_text(value);
    let invalid = |expected: &'static str| FieldError::InvalidFormat {
        label: field.label.clone(),
        expected,
    };

    match field.field_type {
        FieldType::Email if !is_valid_email(&text) => return Err(invalid("a valid email address")),
        FieldType::Tel | FieldType::Phone if !is_valid_phone(&text) => {
            return Err(invalid("a valid 10-digit phone number"));
        }
        FieldType::Zipcode if !ZIP_RE.is_match(&text) => {
            return Err(invalid("a 5-digit ZIP code"));
        }
        FieldType::Ein if !EIN_RE.is_match(&text) => {
            return Err(invalid("a 9-digit EIN (XX-XXXXXXX)"));
        }
        FieldType::Url if !URL_RE.is_match(&text) => return Err(invalid("a valid website URL")),
        FieldType::Date if !is_valid_date(&text) => return Err(invalid("a date (YYYY-MM-DD)")),
        FieldType::Number | FieldType::Currency => {
            let Some(amount) = parse_amount(&text) else {
                return Err(invalid("a number"));
            };
            check_bounds(field, amount, false)?;
        }
        FieldType::Text | FieldType::Textarea | FieldType::Unknown => {
            check_bounds(field, text.chars().count() as f64, true)?;
        }
        FieldType::Select | FieldType::Radio => {
            if field.options.as_ref().is_some_and(|o| !o.is_empty()) {
                let offered = conditional::visible_options(field, data);
                if !offered.iter().any(|o| o.value() == text) {
                    return Err(FieldError::NotAnOption {
                        label: field.label.clone(),
                    });
                }
            }
        }
        _ => {}
    }

    check_pattern(field, &text)
}

fn validate_address(field: &Field, data: &FormData) -> Result<(), FieldError> {
    let keys = AddressKeys::for_field(&field.id);
    let parts = [
        (&keys.street, "Street address"),
        (&keys.city, "City"),
        (&keys.state, "State"),
        (&keys.zip, "ZIP code"),
    ];
    let all_blank = parts.iter().all(|(key, _)| is_blank(data.get(*key)));
    if all_blank && !field.required {
        return Ok(());
    }
    for (key, label) in parts {
        if is_blank(data.get(key)) {
            return Err(FieldError::Required {
                label: label.to_string(),
            });
        }
    }
    let zip = data.get(&keys.zip).map(as_text).unwrap_or_default();
    if !ZIP_RE.is_match(&zip) {
        return Err(FieldError::InvalidFormat {
            label: "ZIP code".to_string(),
            expected: "a 5-digit ZIP code",
        });
    }
    Ok(())
}

fn validate_ownership(
    field: &Field,
    data: &FormData,
    policy: &SignaturePolicy,
) -> Result<(), FieldError> {
    let value = data.get(&field.id);
    if is_blank(value) && !field.required {
        return Ok(());
    }
    let owners: Vec<Owner> = value
        .cloned()
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default();
    match validate_owners(&owners, policy) {
        Some(err) => Err(FieldError::Ownership(err)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(value: Value) -> FormData {
        value.as_object().cloned().unwrap()
    }

    fn check(field: &Field, value: Value) -> Result<(), FieldError> {
        validate_field(field, &data(value), &SignaturePolicy::default())
    }

    #[test]
    fn hidden_option_is_no_longer_a_valid_choice() {
        use crate::model::template::{
            Condition, ConditionOperator, ConditionalAction, ConditionalRule, FieldOption, StructuredOption,
        };
        let field = Field::new("processor", FieldType::Select, "Processor").with_options(vec![
            FieldOption::Plain("standard".into()),
            FieldOption::Structured(StructuredOption {
                label: "High risk".into(),
                value: "high_risk".into(),
                pdf_field_id: None,
                conditional: Some(ConditionalRule {
                    action: ConditionalAction::Show,
                    when: Condition {
                        field: "country".into(),
                        operator: ConditionOperator::Equals,
                        value: json!("US"),
                    },
                }),
            }),
        ]);
        assert_eq!(check(&field, json!({"processor": "high_risk", "country": "US"})), Ok(()));
        assert_eq!(
            check(&field, json!({"processor": "high_risk", "country": "CA"})),
            Err(FieldError::NotAnOption { label: "Processor".into() })
        );
        assert_eq!(check(&field, json!({"processor": "standard", "country": "CA"})), Ok(()));
    }

    #[test]
    fn required_and_optional_blanks() {
        let required = Field::new("legalName", FieldType::Text, "Legal name").required();
        assert_eq!(
            check(&required, json!({"legalName": "  "})),
            Err(FieldError::Required { label: "Legal name".into() })
        );
        let optional = Field::new("dba", FieldType::Text, "DBA");
        assert_eq!(check(&optional, json!({})), Ok(()));

        let terms = Field::new("terms", FieldType::Checkbox, "Terms").required();
        assert!(check(&terms, json!({"terms": false})).is_err());
        assert!(check(&terms, json!({"terms": true})).is_ok());
    }

    #[test]
    fn format_checks_by_type() {
        let ein = Field::new("ein", FieldType::Ein, "EIN");
        assert!(check(&ein, json!({"ein": "12-3456789"})).is_ok());
        assert!(check(&ein, json!({"ein": "123456789"})).is_ok());
        assert!(check(&ein, json!({"ein": "12-345"})).is_err());

        let zip = Field::new("zip", FieldType::Zipcode, "ZIP");
        assert!(check(&zip, json!({"zip": "94105-1234"})).is_ok());
        assert!(check(&zip, json!({"zip": "9410"})).is_err());

        let phone = Field::new("phone", FieldType::Phone, "Phone");
        assert!(check(&phone, json!({"phone": "(415) 555-0100"})).is_ok());
        assert!(check(&phone, json!({"phone": "+1 415 555 0100"})).is_ok());
        assert!(check(&phone, json!({"phone": "555-0100"})).is_err());

        let url = Field::new("site", FieldType::Url, "Website");
        assert!(check(&url, json!({"site": "https://shop.example.com/about"})).is_ok());
        assert!(check(&url, json!({"site": "not a url"})).is_err());

        let date = Field::new("opened", FieldType::Date, "Opened");
        assert!(check(&date, json!({"opened": "2019-04-30"})).is_ok());
        assert!(check(&date, json!({"opened": "2019-13-01"})).is_err());
    }

    #[test]
    fn numeric_bounds_and_text_length() {
        let mut volume = Field::new("volume", FieldType::Currency, "Monthly volume");
        volume.min = Some(100.0);
        volume.max = Some(1_000_000.0);
        assert!(check(&volume, json!({"volume": "$25,000.00"})).is_ok());
        assert!(matches!(
            check(&volume, json!({"volume": "50"})),
            Err(FieldError::BelowMin { length: false, .. })
        ));
        assert!(check(&volume, json!({"volume": "lots"})).is_err());

        let mut name = Field::new("name", FieldType::Text, "Name");
        name.max = Some(5.0);
        assert!(matches!(
            check(&name, json!({"name": "Bartholomew"})),
            Err(FieldError::AboveMax { length: true, .. })
        ));
    }

    #[test]
    fn pattern_must_match_whole_value() {
        let mut mcc = Field::new("mcc", FieldType::Text, "MCC");
        mcc.pattern = Some(r"\d{4}".into());
        assert!(check(&mcc, json!({"mcc": "5812"})).is_ok());
        assert!(check(&mcc, json!({"mcc": "58123"})).is_err());

        mcc.pattern = Some("([".into());
        assert!(check(&mcc, json!({"mcc": "anything"})).is_ok());
    }

    #[test]
    fn address_requires_all_parts() {
        let address = Field::new("address", FieldType::Address, "Business address").required();
        let complete = json!({
            "address": "1 Market St", "city": "San Francisco", "state": "CA", "zipCode": "94105"
        });
        assert!(check(&address, complete).is_ok());
        assert_eq!(
            check(&address, json!({"address": "1 Market St", "city": "SF", "state": "CA"})),
            Err(FieldError::Required { label: "ZIP code".into() })
        );
    }

    #[test]
    fn ownership_field_runs_owner_validator() {
        let owners = Field::new("owners", FieldType::Ownership, "Owners").required();
        let err = check(
            &owners,
            json!({"owners": [{"name": "Ana", "email": "ana@x.io", "percentage": 60, "signature": null}]}),
        )
        .unwrap_err();
        assert!(err.to_string().contains("Signature required"));
    }
}
