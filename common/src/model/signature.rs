use serde::{Deserialize, Serialize};

use super::owner::SignatureType;

/// Body of `POST /api/signature-request`: emails an owner a link to sign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureRequest {
    pub owner_name: String,
    pub owner_email: String,
    pub prospect_id: i64,
    pub ownership_percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureRequestResponse {
    #[serde(default)]
    pub signature_token: Option<String>,
    #[serde(default)]
    pub requested_at: Option<String>,
}

/// `GET /api/signature/:token` and `GET /api/signature/by-email/:email`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureRecord {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub signature: Option<String>,
    #[serde(default)]
    pub signature_type: Option<SignatureType>,
    #[serde(default)]
    pub signed_at: Option<String>,
}
