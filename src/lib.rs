pub mod auth;
pub mod blob;
pub mod config;
pub mod db;
pub mod employees;
pub mod error;
pub mod extract;
pub mod validation;

use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use auth::{
    login_handler, register_handler, require_auth, reset_password_handler, AccountRepository,
    AuthError, AuthGate, AuthService, PasswordService, TokenService,
};
use blob::{BlobStore, LocalBlobStore, MAX_IMAGE_BYTES};
use config::Config;
use employees::{
    add_employee_handler, delete_employee_handler, get_all_employees_handler,
    update_employee_handler, EmployeeRepository, EmployeeService,
};

/// Request body ceiling for the API routes: one image plus the text fields
const MAX_BODY_BYTES: usize = MAX_IMAGE_BYTES + 1024 * 1024;

/// Registers the bearer and cookie session schemes
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        components.add_security_scheme(
            "cookie_auth",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "token",
                "Session cookie set by POST /api/user/login when cookie transport is enabled.",
            ))),
        );
    }
}

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    paths(
        auth::handlers::register_handler,
        auth::handlers::login_handler,
        auth::handlers::reset_password_handler,
        employees::handlers::add_employee_handler,
        employees::handlers::get_all_employees_handler,
        employees::handlers::update_employee_handler,
        employees::handlers::delete_employee_handler,
    ),
    components(
        schemas(
            auth::RegisterRequest,
            auth::LoginRequest,
            auth::ResetPasswordRequest,
            auth::RegisterResponse,
            auth::LoginResponse,
            auth::MessageResponse,
            auth::AccountResponse,
            employees::Employee,
            employees::NumberedEmployee,
            employees::EmployeeResponse,
            employees::EmployeeListResponse,
            employees::EmployeeUpload,
            employees::Designation,
            employees::Gender,
            employees::Course,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "auth", description = "Account registration, login and password reset"),
        (name = "employees", description = "Employee records owned by the caller")
    ),
    info(
        title = "Employee Directory API",
        version = "1.0.0",
        description = "Account-scoped CRUD API for employee records"
    )
)]
pub struct ApiDoc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub employee_service: Arc<EmployeeService>,
    pub gate: Arc<AuthGate>,
    /// Add `Secure` to the session cookie
    pub cookie_secure: bool,
}

impl AppState {
    /// Wire services over the given stores. The signing key is loaded once here.
    pub fn build(
        config: &Config,
        accounts: Arc<dyn AccountRepository>,
        employees: Arc<dyn EmployeeRepository>,
    ) -> Result<Self, AuthError> {
        let token_service = Arc::new(TokenService::new(&config.jwt_secret));
        let password_service = PasswordService::new(config.hash_cost, config.hash_memory_kib)?;
        let blobs: Arc<dyn BlobStore> = Arc::new(LocalBlobStore::new(&config.upload_dir));

        Ok(Self {
            auth_service: Arc::new(AuthService::new(
                accounts,
                password_service,
                token_service.clone(),
            )),
            employee_service: Arc::new(EmployeeService::new(employees, blobs)),
            gate: Arc::new(AuthGate::new(token_service, config.token_transport)),
            cookie_secure: config.cookie_secure,
        })
    }
}

async fn welcome() -> &'static str {
    "Welcome to the homepage!"
}

async fn page_not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Page not found")
}

/// Creates and configures the application router
///
/// Account routes are public; employee routes sit behind the auth gate.
/// Both are mounted under `api_prefix`. Stored images are served from
/// `/uploads`.
pub fn create_router(state: AppState, api_prefix: &str, upload_dir: &Path) -> Router {
    // Configure CORS to allow all origins, methods, and headers
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let public = Router::new()
        .route("/signup", post(register_handler))
        .route("/login", post(login_handler))
        .route("/forgotpassword", post(reset_password_handler));

    let protected = Router::new()
        .route("/addEmployee", post(add_employee_handler))
        .route("/getAllEmployees", get(get_all_employees_handler))
        .route("/updateEmployee/:id", put(update_employee_handler))
        .route("/deleteEmployee/:id", delete(delete_employee_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let api = public
        .merge(protected)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES));

    Router::new()
        .route("/", get(welcome))
        .nest(api_prefix, api)
        .nest_service("/uploads", ServeDir::new(upload_dir))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback(page_not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests;
