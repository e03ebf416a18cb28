use serde::{Deserialize, Serialize};

/// A beneficial owner entered on the ownership step of the wizard.
///
/// Owners live inside the prospect's `formData` under the key of the
/// ownership field; they are not a separate backend entity until
/// `owners-with-signatures` is posted at submit time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    /// Kept as a string while typing; `None` or unparsable counts as missing.
    #[serde(default, deserialize_with = "percentage::deserialize")]
    pub percentage: Option<f64>,
    /// Data URL of a drawn/uploaded signature, or the typed name.
    #[serde(default)]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_type: Option<SignatureType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_requested_at: Option<String>,
}

impl Owner {
    pub fn has_signature(&self) -> bool {
        self.signature
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureType {
    Drawn,
    Typed,
    Uploaded,
}

/// Body of `POST /api/prospects/:id/owners-with-signatures`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnersWithSignatures {
    pub owners: Vec<Owner>,
}

/// The form stores percentages as whatever the input produced: a number, a
/// numeric string, an empty string or null.
mod percentage {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn percentage_accepts_numbers_and_strings() {
        let owners: Vec<Owner> = serde_json::from_value(json!([
            {"name": "A", "email": "a@x.io", "percentage": 60},
            {"name": "B", "email": "b@x.io", "percentage": "40.5"},
            {"name": "C", "email": "c@x.io", "percentage": ""},
            {"name": "D", "email": "d@x.io"}
        ]))
        .unwrap();
        assert_eq!(owners[0].percentage, Some(60.0));
        assert_eq!(owners[1].percentage, Some(40.5));
        assert_eq!(owners[2].percentage, None);
        assert_eq!(owners[3].percentage, None);
    }

    #[test]
    fn blank_signature_is_not_a_signature() {
        let owner = Owner {
            signature: Some("   ".into()),
            ..Owner::default()
        };
        assert!(!owner.has_signature());
    }
}
