// HTTP handlers for employee endpoints

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::blob::{BlobError, ImageUpload};
use crate::employees::{
    error::EmployeeError,
    models::{Employee, EmployeeForm, EmployeeListResponse, EmployeeResponse},
};
use crate::error::ApiError;
use crate::extract::FormBody;
use crate::AppState;

/// Form field carrying the profile image
const IMAGE_FIELD: &str = "image";

fn multipart_error(err: MultipartError) -> EmployeeError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        EmployeeError::Blob(BlobError::TooLarge)
    } else {
        EmployeeError::ValidationError(format!("Invalid form data: {}", err.body_text()))
    }
}

/// Read a multipart body into the text fields and the optional image
async fn read_employee_form(
    mut multipart: Multipart,
) -> Result<(EmployeeForm, Option<ImageUpload>), EmployeeError> {
    let mut form = EmployeeForm::default();
    let mut image = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        if name == IMAGE_FIELD {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await.map_err(multipart_error)?;

            // an empty file input
            if file_name.is_empty() && bytes.is_empty() {
                continue;
            }
            image = Some(ImageUpload::new(&file_name, content_type.as_deref(), bytes)?);
        } else {
            let value = field.text().await.map_err(multipart_error)?;
            form.set(&name, value);
        }
    }

    Ok((form, image))
}

/// Ids that do not parse cannot name an existing employee
fn parse_employee_id(id: &str) -> Result<Uuid, EmployeeError> {
    Uuid::parse_str(id).map_err(|_| EmployeeError::NotFound)
}

/// Add an employee owned by the caller
/// POST /addEmployee
#[utoipa::path(
    post,
    path = "/api/user/addEmployee",
    request_body(content = crate::employees::models::EmployeeUpload, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Employee added", body = EmployeeResponse),
        (status = 400, description = "Missing or invalid fields, or unacceptable image", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authorized", body = crate::error::ErrorResponse),
        (status = 409, description = "Email or mobile already in use", body = crate::error::ErrorResponse)
    ),
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    tag = "employees"
)]
pub async fn add_employee_handler(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    FormBody(multipart): FormBody,
) -> Result<(StatusCode, Json<EmployeeResponse>), ApiError> {
    let (form, image) = read_employee_form(multipart).await?;
    let employee = state
        .employee_service
        .create_employee(identity.account_id, form, image)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(EmployeeResponse {
            message: "Employee added successfully".to_string(),
            employee,
        }),
    ))
}

/// List the caller's employees
/// GET /getAllEmployees
#[utoipa::path(
    get,
    path = "/api/user/getAllEmployees",
    responses(
        (status = 200, description = "Employees of the caller, oldest first", body = EmployeeListResponse),
        (status = 401, description = "Not authorized", body = crate::error::ErrorResponse)
    ),
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    tag = "employees"
)]
pub async fn get_all_employees_handler(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> Result<Json<EmployeeListResponse>, ApiError> {
    let employees = state
        .employee_service
        .list_employees(identity.account_id)
        .await?;

    Ok(Json(EmployeeListResponse {
        message: "Employees retrieved successfully".to_string(),
        employees,
    }))
}

/// Partially update one of the caller's employees
/// PUT /updateEmployee/:id
#[utoipa::path(
    put,
    path = "/api/user/updateEmployee/{id}",
    params(("id" = String, Path, description = "Employee id")),
    request_body(content = crate::employees::models::EmployeeUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Employee updated", body = EmployeeResponse),
        (status = 400, description = "No fields given, or invalid fields", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authorized", body = crate::error::ErrorResponse),
        (status = 404, description = "Employee not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Email or mobile already in use", body = crate::error::ErrorResponse)
    ),
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    tag = "employees"
)]
pub async fn update_employee_handler(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(id): Path<String>,
    FormBody(multipart): FormBody,
) -> Result<Json<EmployeeResponse>, ApiError> {
    let id = parse_employee_id(&id)?;
    let (form, image) = read_employee_form(multipart).await?;
    let employee = state
        .employee_service
        .update_employee(id, identity.account_id, form, image)
        .await?;

    Ok(Json(EmployeeResponse {
        message: "Employee updated successfully".to_string(),
        employee,
    }))
}

/// Delete one of the caller's employees
/// DELETE /deleteEmployee/:id
#[utoipa::path(
    delete,
    path = "/api/user/deleteEmployee/{id}",
    params(("id" = String, Path, description = "Employee id")),
    responses(
        (status = 200, description = "Employee deleted", body = EmployeeResponse),
        (status = 401, description = "Not authorized", body = crate::error::ErrorResponse),
        (status = 404, description = "Employee not found", body = crate::error::ErrorResponse)
    ),
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    tag = "employees"
)]
pub async fn delete_employee_handler(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<EmployeeResponse>, ApiError> {
    let id = parse_employee_id(&id)?;
    let employee: Employee = state
        .employee_service
        .delete_employee(id, identity.account_id)
        .await?;

    Ok(Json(EmployeeResponse {
        message: "Employee deleted successfully".to_string(),
        employee,
    }))
}
