//! OpenAPI specification for InfraPulse server.

use utoipa::OpenApi;

use infrapulse_core::{
    Client, DeviceCategory, DeviceForm, InfraReport, ReportRow, SanityLevel,
};

use crate::routes::{
    ClientListResponse, ClientSummary, CreateClientRequest, CreateClientResponse, DeviceResponse,
    ErrorResponse, ScoreResponse,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::list_clients,
        crate::routes::create_client,
        crate::routes::get_client,
        crate::routes::client_score,
        crate::routes::device_form,
        crate::routes::save_device,
        crate::routes::client_report,
        crate::routes::client_report_html,
        crate::routes::openapi_json
    ),
    components(
        schemas(
            Client,
            ClientSummary,
            ClientListResponse,
            CreateClientRequest,
            CreateClientResponse,
            ScoreResponse,
            DeviceCategory,
            DeviceForm,
            DeviceResponse,
            SanityLevel,
            InfraReport,
            ReportRow,
            ErrorResponse
        )
    ),
    tags(
        (name = "clients", description = "Client management and scores"),
        (name = "infrastructure", description = "Device category forms"),
        (name = "reports", description = "Infrastructure reports"),
        (name = "system", description = "System endpoints")
    )
)]
/// OpenAPI specification for the InfraPulse server.
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::ApiDoc;
    use utoipa::OpenApi;

    #[test]
    fn openapi_includes_expected_paths() {
        let doc = ApiDoc::openapi();
        let paths = doc.paths.paths;

        assert!(paths.contains_key("/clients"));
        assert!(paths.contains_key("/clients/{slug}"));
        assert!(paths.contains_key("/clients/{slug}/score"));
        assert!(paths.contains_key("/clients/{slug}/infrastructure/{category}"));
        assert!(paths.contains_key("/clients/{slug}/report"));
        assert!(paths.contains_key("/clients/{slug}/report.html"));
        assert!(paths.contains_key("/openapi.json"));
    }
}
