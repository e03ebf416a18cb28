//! REST endpoint paths used by the frontend.
//!
//! Path segments that may contain reserved characters (tokens, e-mails,
//! export names) must be URI-encoded by the caller before being passed in.

pub const TEMPLATES: &str = "/api/acquirer-application-templates";
pub const TEMPLATE_UPLOAD: &str = "/api/acquirer-application-templates/upload";
pub const TEMPLATE_APPLICATION_COUNTS: &str =
    "/api/acquirer-application-templates/application-counts";
pub const ACQUIRERS: &str = "/api/acquirers";
pub const SIGNATURE_REQUEST: &str = "/api/signature-request";
pub const ADDRESS_AUTOCOMPLETE: &str = "/api/address-autocomplete";
pub const VALIDATE_ADDRESS: &str = "/api/validate-address";

pub const DB_ENVIRONMENT: &str = "/api/admin/db-environment";
pub const DB_DIAGNOSTICS: &str = "/api/admin/db-diagnostics";
pub const SCHEMA_COMPARE: &str = "/api/admin/schema-compare";
pub const RESET_TESTING_DATA: &str = "/api/admin/reset-testing-data";
pub const CLEAR_PROSPECTS: &str = "/api/admin/clear-prospects";
pub const SCHEMA_SYNC: &str = "/api/admin/schema-sync";
pub const DATA_SYNC_EXPORTS: &str = "/api/testing/data-sync/exports";
pub const CREATE_TEST_ALERT: &str = "/api/testing/create-test-alert";

/// Multipart field names of `TEMPLATE_UPLOAD`.
pub const UPLOAD_PDF_PART: &str = "pdf";
pub const UPLOAD_TEMPLATE_PART: &str = "templateData";

pub fn template(id: i64) -> String {
    format!("{TEMPLATES}/{id}")
}

pub fn pdf_form_with_fields(id: i64) -> String {
    format!("/api/pdf-forms/{id}/with-fields")
}

pub fn pdf_form_auto_save(id: i64) -> String {
    format!("/api/pdf-forms/{id}/auto-save")
}

pub fn pdf_form_submissions(id: i64) -> String {
    format!("/api/pdf-forms/{id}/submissions")
}

pub fn prospect_by_token(token: &str) -> String {
    format!("/api/prospects/token/{token}")
}

/// Per-prospect wizard actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProspectAction {
    StartApplication,
    SaveFormData,
    SubmitApplication,
    OwnersWithSignatures,
}

impl ProspectAction {
    fn segment(&self) -> &'static str {
        match self {
            ProspectAction::StartApplication => "start-application",
            ProspectAction::SaveFormData => "save-form-data",
            ProspectAction::SubmitApplication => "submit-application",
            ProspectAction::OwnersWithSignatures => "owners-with-signatures",
        }
    }
}

pub fn prospect_action(prospect_id: i64, action: ProspectAction) -> String {
    format!("/api/prospects/{prospect_id}/{}", action.segment())
}

pub fn signature_by_token(token: &str) -> String {
    format!("/api/signature/{token}")
}

pub fn signature_by_email(email: &str) -> String {
    format!("/api/signature/by-email/{email}")
}

pub fn schema_drift(source: &str, target: &str) -> String {
    format!("/api/admin/schema-drift/{source}/{target}")
}

pub fn data_sync_export(environment: &str) -> String {
    format!("/api/testing/data-sync/export/{environment}")
}

pub fn data_sync_import(environment: &str, export_name: &str) -> String {
    format!("/api/testing/data-sync/import/{environment}/{export_name}")
}

pub fn data_sync_compare(source: &str, target: &str) -> String {
    format!("/api/testing/data-sync/compare/{source}/{target}")
}
