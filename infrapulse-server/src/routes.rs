//! HTTP handlers for InfraPulse server.

use std::str::FromStr;
use std::sync::Arc;

use actix_web::error::{InternalError, JsonPayloadError, PathError};
use actix_web::{HttpRequest, HttpResponse, Responder, ResponseError, get, post, put, web};
use chrono::Utc;
use infrapulse_core::{
    Client, DeviceCategory, DeviceForm, InfraPulseError, InfraReport, InventoryInspector,
    InventoryStore, format_percent, render_report_html,
};
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

use crate::openapi::ApiDoc;

/// Store handle shared across workers.
pub type SharedStore = Arc<dyn InventoryStore + Send + Sync>;

type Inspector = InventoryInspector<SharedStore>;

#[derive(Clone)]
/// Shared application state for handlers.
pub struct AppState {
    /// Inventory backend.
    pub store: SharedStore,
}

impl AppState {
    /// Wrap an inventory store.
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    fn inspector(&self) -> Inspector {
        InventoryInspector::new(Arc::clone(&self.store))
    }
}

/// Error response payload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub message: String,
}

/// Client with its current infrastructure score.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientSummary {
    /// Client identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// URL slug.
    pub slug: String,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
    /// Weighted infrastructure percentage, absent when nothing is recorded.
    pub infra_percent: Option<u8>,
}

/// Response payload for the client listing.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClientListResponse {
    /// Clients, newest first.
    pub clients: Vec<ClientSummary>,
}

/// Request payload for creating a client.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateClientRequest {
    /// Client display name.
    #[serde(default)]
    pub name: Option<String>,
}

/// Response payload for a created client.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateClientResponse {
    /// Always true on success.
    pub ok: bool,
    /// The stored client.
    pub client: Client,
}

/// Response payload for a client score.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ScoreResponse {
    /// Weighted infrastructure percentage, absent when nothing is recorded.
    pub percent: Option<u8>,
    /// Display text, e.g. `83%` or an em dash.
    pub display: String,
}

/// Device category form together with the owning client and score.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeviceResponse {
    /// Owning client.
    pub client: Client,
    /// Device category.
    pub category: DeviceCategory,
    /// Current form values.
    pub form: DeviceForm,
    /// Client score after this read or write.
    pub infra_percent: Option<u8>,
}

/// Map a core error onto an HTTP response.
pub fn error_response(err: &InfraPulseError) -> HttpResponse {
    let message = err.to_string();
    match err {
        InfraPulseError::NotFound(_) => HttpResponse::NotFound().json(ErrorResponse { message }),
        InfraPulseError::InvalidInput(_) => {
            HttpResponse::BadRequest().json(ErrorResponse { message })
        }
        InfraPulseError::Conflict(_) => HttpResponse::Conflict().json(ErrorResponse { message }),
        _ => {
            log::error!("request failed: {message}");
            HttpResponse::InternalServerError().json(ErrorResponse { message })
        }
    }
}

/// Render extractor failures (bad JSON bodies, undecodable paths) as `ErrorResponse` JSON.
fn reject_extraction<E: ResponseError + 'static>(err: E, _req: &HttpRequest) -> actix_web::Error {
    let response = HttpResponse::build(err.status_code()).json(ErrorResponse {
        message: err.to_string(),
    });
    InternalError::from_response(err, response).into()
}

async fn run_blocking<T, F>(state: &AppState, job: F) -> Result<T, HttpResponse>
where
    T: Send + 'static,
    F: FnOnce(Inspector) -> infrapulse_core::Result<T> + Send + 'static,
{
    let inspector = state.inspector();
    match web::block(move || job(inspector)).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(error_response(&err)),
        Err(err) => {
            log::error!("blocking task failed: {err}");
            Err(HttpResponse::InternalServerError().json(ErrorResponse {
                message: format!("blocking task failed: {err}"),
            }))
        }
    }
}

fn parse_category(raw: &str) -> Result<DeviceCategory, HttpResponse> {
    DeviceCategory::from_str(raw).map_err(|err| error_response(&err))
}

fn report_timestamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M UTC").to_string()
}

fn load_report(inspector: &Inspector, slug: &str) -> infrapulse_core::Result<InfraReport> {
    let client = inspector.resolve_client(slug)?;
    inspector.build_report(&client, report_timestamp())
}

/// Register every API handler.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(reject_extraction::<JsonPayloadError>))
        .app_data(web::PathConfig::default().error_handler(reject_extraction::<PathError>))
        .service(list_clients)
        .service(create_client)
        .service(get_client)
        .service(client_score)
        .service(device_form)
        .service(save_device)
        .service(client_report)
        .service(client_report_html)
        .service(openapi_json);
}

#[utoipa::path(
    get,
    path = "/clients",
    responses(
        (status = 200, description = "Clients with scores", body = ClientListResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    tag = "clients"
)]
#[get("/api/clients")]
/// List clients, newest first, with their infrastructure percentage.
pub async fn list_clients(state: web::Data<AppState>) -> impl Responder {
    let result = run_blocking(&state, |inspector| {
        let mut clients = Vec::new();
        for client in inspector.list_clients()? {
            let infra_percent = inspector.client_percent(&client.id)?;
            clients.push(ClientSummary {
                id: client.id,
                name: client.name,
                slug: client.slug,
                created_at: client.created_at,
                infra_percent,
            });
        }
        Ok(ClientListResponse { clients })
    })
    .await;

    match result {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(response) => response,
    }
}

#[utoipa::path(
    post,
    path = "/clients",
    request_body = CreateClientRequest,
    responses(
        (status = 201, description = "Client created", body = CreateClientResponse),
        (status = 400, description = "Name missing", body = ErrorResponse),
        (status = 409, description = "Slug collision", body = ErrorResponse)
    ),
    tag = "clients"
)]
#[post("/api/clients")]
/// Create a client from a display name.
pub async fn create_client(
    state: web::Data<AppState>,
    payload: web::Json<CreateClientRequest>,
) -> impl Responder {
    let name = payload.into_inner().name.unwrap_or_default();
    let millis = u128::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
    let result = run_blocking(&state, move |inspector| {
        inspector.create_client(&name, millis)
    })
    .await;

    match result {
        Ok(client) => {
            log::info!("client {} created via api", client.slug);
            HttpResponse::Created().json(CreateClientResponse { ok: true, client })
        }
        Err(response) => response,
    }
}

#[utoipa::path(
    get,
    path = "/clients/{slug}",
    params(("slug" = String, Path, description = "Client slug")),
    responses(
        (status = 200, description = "Client", body = Client),
        (status = 404, description = "Unknown client", body = ErrorResponse)
    ),
    tag = "clients"
)]
#[get("/api/clients/{slug}")]
/// Fetch a client by slug.
pub async fn get_client(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let slug = path.into_inner();
    let result = run_blocking(&state, move |inspector| inspector.resolve_client(&slug)).await;

    match result {
        Ok(client) => HttpResponse::Ok().json(client),
        Err(response) => response,
    }
}

#[utoipa::path(
    get,
    path = "/clients/{slug}/score",
    params(("slug" = String, Path, description = "Client slug")),
    responses(
        (status = 200, description = "Infrastructure score", body = ScoreResponse),
        (status = 404, description = "Unknown client", body = ErrorResponse)
    ),
    tag = "clients"
)]
#[get("/api/clients/{slug}/score")]
/// Compute the weighted infrastructure percentage for a client.
pub async fn client_score(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let slug = path.into_inner();
    let result = run_blocking(&state, move |inspector| {
        let client = inspector.resolve_client(&slug)?;
        inspector.client_percent(&client.id)
    })
    .await;

    match result {
        Ok(percent) => HttpResponse::Ok().json(ScoreResponse {
            percent,
            display: format_percent(percent),
        }),
        Err(response) => response,
    }
}

#[utoipa::path(
    get,
    path = "/clients/{slug}/infrastructure/{category}",
    params(
        ("slug" = String, Path, description = "Client slug"),
        ("category" = String, Path, description = "Device category: firewall or switches")
    ),
    responses(
        (status = 200, description = "Device form", body = DeviceResponse),
        (status = 404, description = "Unknown client or category", body = ErrorResponse)
    ),
    tag = "infrastructure"
)]
#[get("/api/clients/{slug}/infrastructure/{category}")]
/// Load the device form for a category, with defaults when nothing is stored.
pub async fn device_form(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> impl Responder {
    let (slug, category) = path.into_inner();
    let category = match parse_category(&category) {
        Ok(category) => category,
        Err(response) => return response,
    };
    let result = run_blocking(&state, move |inspector| {
        let client = inspector.resolve_client(&slug)?;
        let form = inspector.device_form(&client.id, category)?;
        let infra_percent = inspector.client_percent(&client.id)?;
        Ok(DeviceResponse {
            client,
            category,
            form,
            infra_percent,
        })
    })
    .await;

    match result {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(response) => response,
    }
}

#[utoipa::path(
    put,
    path = "/clients/{slug}/infrastructure/{category}",
    params(
        ("slug" = String, Path, description = "Client slug"),
        ("category" = String, Path, description = "Device category: firewall or switches")
    ),
    request_body = DeviceForm,
    responses(
        (status = 200, description = "Saved device form", body = DeviceResponse),
        (status = 404, description = "Unknown client or category", body = ErrorResponse)
    ),
    tag = "infrastructure"
)]
#[put("/api/clients/{slug}/infrastructure/{category}")]
/// Save the device form for a category, replacing any existing values.
pub async fn save_device(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    payload: web::Json<DeviceForm>,
) -> impl Responder {
    let (slug, category) = path.into_inner();
    let category = match parse_category(&category) {
        Ok(category) => category,
        Err(response) => return response,
    };
    let form = payload.into_inner();
    let result = run_blocking(&state, move |inspector| {
        let client = inspector.resolve_client(&slug)?;
        let record = inspector.save_device(&client.id, category, &form)?;
        let infra_percent = inspector.client_percent(&client.id)?;
        Ok(DeviceResponse {
            client,
            category,
            form: DeviceForm::from_record(&record),
            infra_percent,
        })
    })
    .await;

    match result {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(response) => response,
    }
}

#[utoipa::path(
    get,
    path = "/clients/{slug}/report",
    params(("slug" = String, Path, description = "Client slug")),
    responses(
        (status = 200, description = "Infrastructure report", body = InfraReport),
        (status = 404, description = "Unknown client", body = ErrorResponse)
    ),
    tag = "reports"
)]
#[get("/api/clients/{slug}/report")]
/// Build the infrastructure report for a client.
pub async fn client_report(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let slug = path.into_inner();
    let result = run_blocking(&state, move |inspector| load_report(&inspector, &slug)).await;

    match result {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(response) => response,
    }
}

#[utoipa::path(
    get,
    path = "/clients/{slug}/report.html",
    params(("slug" = String, Path, description = "Client slug")),
    responses(
        (status = 200, description = "Printable HTML report", body = String, content_type = "text/html"),
        (status = 404, description = "Unknown client", body = ErrorResponse)
    ),
    tag = "reports"
)]
#[get("/api/clients/{slug}/report.html")]
/// Render the printable HTML report for a client.
pub async fn client_report_html(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let slug = path.into_inner();
    let result = run_blocking(&state, move |inspector| load_report(&inspector, &slug)).await;

    match result {
        Ok(report) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(render_report_html(&report)),
        Err(response) => response,
    }
}

#[utoipa::path(
    get,
    path = "/openapi.json",
    responses(
        (status = 200, description = "OpenAPI document")
    ),
    tag = "system"
)]
#[get("/api/openapi.json")]
/// Serve the OpenAPI document.
pub async fn openapi_json() -> impl Responder {
    HttpResponse::Ok().json(ApiDoc::openapi())
}
