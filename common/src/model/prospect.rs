use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opaque wizard state. Keys are field ids; values are whatever the field
/// produced (strings, booleans, owner arrays).
pub type FormData = Map<String, Value>;

/// The external user completing the wizard through a tokenized link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prospect {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<i64>,
    #[serde(default)]
    pub form_data: FormData,
    #[serde(default)]
    pub current_step: usize,
}

impl Prospect {
    pub fn is_submitted(&self) -> bool {
        matches!(self.status.as_str(), "submitted" | "applied" | "approved")
    }
}

/// `GET /api/prospects/token/:token` returns the prospect and the template
/// its wizard should render.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProspectSession {
    pub prospect: Prospect,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<super::template::ApplicationTemplate>,
}

/// Body of `save-form-data` and of the pdf-form `auto-save` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveFormDataRequest {
    pub form_data: FormData,
    pub current_step: usize,
}

/// Body of `submit-application` and of pdf-form `submissions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitApplicationRequest {
    pub form_data: FormData,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitApplicationResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub application_id: Option<i64>,
}
