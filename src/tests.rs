// HTTP tests for the Employee Directory API
// The full router is exercised over in-memory stores and a temporary upload directory

use super::*;
use axum::http::{header, HeaderValue, StatusCode};
use axum_test::multipart::{MultipartForm, Part};
use axum_test::{TestResponse, TestServer};
use serde_json::{json, Value};
use tempfile::TempDir;
use uuid::Uuid;

use crate::auth::{
    Identity, InMemoryAccountRepository, LoginResponse, RegisterResponse, TokenService,
};
use crate::employees::{EmployeeListResponse, EmployeeResponse, InMemoryEmployeeRepository};
use crate::error::ErrorResponse;

const SECRET: &str = "http-test-secret";

// ============================================================================
// Test Helpers
// ============================================================================

struct TestApp {
    server: TestServer,
    _uploads: TempDir,
}

fn test_app_with(transport: &str) -> TestApp {
    let uploads = tempfile::tempdir().unwrap();
    let upload_dir = uploads.path().to_string_lossy().to_string();
    let vars = [
        ("JWT_SECRET", SECRET),
        ("STORE_BACKEND", "memory"),
        ("TOKEN_TRANSPORT", transport),
        ("COOKIE_SECURE", "false"),
        ("HASH_COST", "1"),
        ("HASH_MEMORY_KIB", "1024"),
        ("UPLOAD_DIR", upload_dir.as_str()),
    ];
    let config = Config::from_lookup(|name| {
        vars.iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.to_string())
    })
    .unwrap();

    let state = AppState::build(
        &config,
        Arc::new(InMemoryAccountRepository::new()),
        Arc::new(InMemoryEmployeeRepository::new()),
    )
    .unwrap();
    let app = create_router(state, &config.api_prefix, &config.upload_dir);

    TestApp {
        server: TestServer::new(app).unwrap(),
        _uploads: uploads,
    }
}

fn test_app() -> TestApp {
    test_app_with("bearer")
}

fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
}

fn image(file_name: &str, mime_type: &str, data: &[u8]) -> Part {
    Part::bytes(data.to_vec())
        .file_name(file_name)
        .mime_type(mime_type)
}

fn employee_form(email: &str, mobile: &str) -> MultipartForm {
    MultipartForm::new()
        .add_text("name", "Ravi Kumar")
        .add_text("email", email)
        .add_text("mobile", mobile)
        .add_text("designation", "HR")
        .add_text("gender", "Male")
        .add_text("course", "MCA")
        .add_text("course", "BSC")
        .add_text("date", "2024-05-01")
}

impl TestApp {
    async fn signup(&self, name: &str, email: &str, password: &str) -> TestResponse {
        self.server
            .post("/api/user/signup")
            .json(&json!({ "name": name, "email": email, "password": password }))
            .await
    }

    async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.server
            .post("/api/user/login")
            .json(&json!({ "email": email, "password": password }))
            .await
    }

    /// Register and log in, returning the session token and account id
    async fn session(&self, name: &str, email: &str) -> (String, Uuid) {
        let registered = self.signup(name, email, "secret1").await;
        assert_eq!(registered.status_code(), StatusCode::CREATED);
        let id = registered.json::<RegisterResponse>().user.id;

        let login = self.login(email, "secret1").await;
        assert_eq!(login.status_code(), StatusCode::OK);
        (login.json::<LoginResponse>().token, id)
    }

    async fn add_employee(&self, token: &str, form: MultipartForm) -> TestResponse {
        self.server
            .post("/api/user/addEmployee")
            .add_header(header::AUTHORIZATION, bearer(token))
            .multipart(form)
            .await
    }

    async fn update_employee(&self, token: &str, id: &str, form: MultipartForm) -> TestResponse {
        self.server
            .put(&format!("/api/user/updateEmployee/{}", id))
            .add_header(header::AUTHORIZATION, bearer(token))
            .multipart(form)
            .await
    }

    async fn list(&self, token: &str) -> TestResponse {
        self.server
            .get("/api/user/getAllEmployees")
            .add_header(header::AUTHORIZATION, bearer(token))
            .await
    }

    async fn delete_employee(&self, token: &str, id: &str) -> TestResponse {
        self.server
            .delete(&format!("/api/user/deleteEmployee/{}", id))
            .add_header(header::AUTHORIZATION, bearer(token))
            .await
    }
}

fn assert_error(response: &TestResponse, status: StatusCode, message: &str) {
    assert_eq!(response.status_code(), status);
    assert_eq!(response.json::<ErrorResponse>().message, message);
}

// ============================================================================
// Accounts
// ============================================================================

#[tokio::test]
async fn test_signup_hides_password_hash() {
    let app = test_app();

    let response = app.signup("Ann", "ann@x.com", "secret1").await;
    assert_eq!(response.status_code(), StatusCode::CREATED);

    let body = response.json::<Value>();
    assert_eq!(body["message"], "User created successfully");
    assert_eq!(body["user"]["email"], "ann@x.com");
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_signup_validation_and_conflict() {
    let app = test_app();

    let missing = app.signup("", "ann@x.com", "secret1").await;
    assert_error(&missing, StatusCode::BAD_REQUEST, "All fields are required");

    let short = app.signup("Ann", "ann@x.com", "12345").await;
    assert_eq!(short.status_code(), StatusCode::BAD_REQUEST);

    app.signup("Ann", "ann@x.com", "secret1").await;
    let again = app.signup("Ann Again", "ann@x.com", "secret2").await;
    assert_error(&again, StatusCode::CONFLICT, "User already exists");
}

#[tokio::test]
async fn test_malformed_json_bodies_are_validation_errors() {
    let app = test_app();

    let wrong_type = app
        .server
        .post("/api/user/signup")
        .json(&json!({ "name": "Ann", "email": "ann@x.com", "password": 123456 }))
        .await;
    assert_eq!(wrong_type.status_code(), StatusCode::BAD_REQUEST);
    let body = wrong_type.json::<ErrorResponse>();
    assert_eq!(body.error_code, "VALIDATION_ERROR");
    assert!(body.message.starts_with("Invalid request body"));

    let not_json = app
        .server
        .post("/api/user/login")
        .text("email=ann@x.com&password=secret1")
        .await;
    assert_eq!(not_json.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(not_json.json::<ErrorResponse>().error_code, "VALIDATION_ERROR");

    let truncated = app
        .server
        .post("/api/user/forgotpassword")
        .bytes(r#"{"email":"ann@x.com","#.into())
        .content_type("application/json")
        .await;
    assert_eq!(truncated.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(truncated.json::<ErrorResponse>().error_code, "VALIDATION_ERROR");

    // nothing was registered by the rejected signup
    let login = app.login("ann@x.com", "123456").await;
    assert_eq!(login.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = test_app();
    app.signup("Ann", "ann@x.com", "secret1").await;

    let wrong_password = app.login("ann@x.com", "wrong-password").await;
    assert_error(&wrong_password, StatusCode::UNAUTHORIZED, "Invalid email or password");

    let unknown = app.login("nobody@x.com", "secret1").await;
    assert_error(&unknown, StatusCode::UNAUTHORIZED, "Invalid email or password");
}

#[tokio::test]
async fn test_password_reset_then_login() {
    let app = test_app();
    app.signup("Ann", "ann@x.com", "secret1").await;

    let mismatch = app
        .server
        .post("/api/user/forgotpassword")
        .json(&json!({ "email": "ann@x.com", "password": "newpass1", "confirmpassword": "newpass2" }))
        .await;
    assert_eq!(mismatch.status_code(), StatusCode::BAD_REQUEST);

    let unknown = app
        .server
        .post("/api/user/forgotpassword")
        .json(&json!({ "email": "bob@x.com", "password": "newpass1", "confirmpassword": "newpass1" }))
        .await;
    assert_eq!(unknown.status_code(), StatusCode::NOT_FOUND);

    let reset = app
        .server
        .post("/api/user/forgotpassword")
        .json(&json!({ "email": "ann@x.com", "password": "newpass1", "confirmpassword": "newpass1" }))
        .await;
    assert_eq!(reset.status_code(), StatusCode::OK);
    assert_eq!(reset.json::<Value>()["message"], "Password updated successfully");

    assert_eq!(app.login("ann@x.com", "secret1").await.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(app.login("ann@x.com", "newpass1").await.status_code(), StatusCode::OK);
}

// ============================================================================
// Auth gate
// ============================================================================

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = test_app();

    let missing = app.server.get("/api/user/getAllEmployees").await;
    assert_error(&missing, StatusCode::UNAUTHORIZED, "Not authorized");

    let garbage = app.list("not-a-token").await;
    assert_error(&garbage, StatusCode::UNAUTHORIZED, "Not authorized");

    let no_scheme = app
        .server
        .get("/api/user/getAllEmployees")
        .add_header(header::AUTHORIZATION, HeaderValue::from_static("Token abc"))
        .await;
    assert_error(&no_scheme, StatusCode::UNAUTHORIZED, "Not authorized");

    let add = app
        .add_employee("not-a-token", employee_form("ravi@x.com", "9876543210"))
        .await;
    assert_error(&add, StatusCode::UNAUTHORIZED, "Not authorized");
}

#[tokio::test]
async fn test_token_from_another_secret_is_rejected() {
    let app = test_app();
    let (_, account_id) = app.session("Ann", "ann@x.com").await;

    let forged = TokenService::new("some-other-secret")
        .generate_token(&Identity {
            account_id,
            name: "Ann".to_string(),
            email: "ann@x.com".to_string(),
        })
        .unwrap();

    let response = app.list(&forged.token).await;
    assert_error(&response, StatusCode::UNAUTHORIZED, "Not authorized");
}

#[tokio::test]
async fn test_cookie_transport() {
    let app = test_app_with("cookie");
    app.signup("Ann", "ann@x.com", "secret1").await;

    let login = app.login("ann@x.com", "secret1").await;
    assert_eq!(login.status_code(), StatusCode::OK);
    let token = login.json::<LoginResponse>().token;

    let cookie = login.header(header::SET_COOKIE);
    let cookie = cookie.to_str().unwrap();
    assert!(cookie.starts_with(&format!("token={};", token)));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Strict"));

    let with_cookie = app
        .server
        .get("/api/user/getAllEmployees")
        .add_header(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; token={}", token)).unwrap(),
        )
        .await;
    assert_eq!(with_cookie.status_code(), StatusCode::OK);

    // only the configured transport is consulted
    let with_bearer = app.list(&token).await;
    assert_error(&with_bearer, StatusCode::UNAUTHORIZED, "Not authorized");
}

// ============================================================================
// Employees
// ============================================================================

#[tokio::test]
async fn test_ann_adds_and_lists_an_employee() {
    let app = test_app();
    let (token, ann_id) = app.session("Ann", "ann@x.com").await;

    let empty = app.list(&token).await;
    assert_eq!(empty.status_code(), StatusCode::OK);
    assert!(empty.json::<EmployeeListResponse>().employees.is_empty());

    let added = app
        .add_employee(&token, employee_form("ravi@x.com", "9876543210"))
        .await;
    assert_eq!(added.status_code(), StatusCode::CREATED);
    let added = added.json::<EmployeeResponse>();
    assert_eq!(added.message, "Employee added successfully");
    assert_eq!(added.employee.owner_id, ann_id);

    let listed = app.list(&token).await.json::<EmployeeListResponse>();
    assert_eq!(listed.message, "Employees retrieved successfully");
    assert_eq!(listed.employees.len(), 1);
    assert_eq!(listed.employees[0].no, 1);
    assert_eq!(listed.employees[0].employee.owner_id, ann_id);
    assert_eq!(listed.employees[0].employee.email, "ravi@x.com");
}

#[tokio::test]
async fn test_client_supplied_owner_is_ignored() {
    let app = test_app();
    let (token, ann_id) = app.session("Ann", "ann@x.com").await;
    let (_, bob_id) = app.session("Bob", "bob@x.com").await;

    let form = employee_form("ravi@x.com", "9876543210")
        .add_text("owner_id", bob_id.to_string())
        .add_text("userid", bob_id.to_string());
    let added = app.add_employee(&token, form).await;

    assert_eq!(added.status_code(), StatusCode::CREATED);
    assert_eq!(added.json::<EmployeeResponse>().employee.owner_id, ann_id);
}

#[tokio::test]
async fn test_add_employee_validation() {
    let app = test_app();
    let (token, _) = app.session("Ann", "ann@x.com").await;

    let incomplete = MultipartForm::new()
        .add_text("name", "Ravi")
        .add_text("email", "ravi@x.com");
    let response = app.add_employee(&token, incomplete).await;
    assert_error(&response, StatusCode::BAD_REQUEST, "All fields are required");

    let response = app
        .add_employee(&token, employee_form("ravi@x", "9876543210"))
        .await;
    assert_error(&response, StatusCode::BAD_REQUEST, "Invalid email");

    let response = app
        .add_employee(&token, employee_form("ravi@x.com", "98765"))
        .await;
    assert_error(&response, StatusCode::BAD_REQUEST, "Invalid mobile number");
}

#[tokio::test]
async fn test_non_ascii_contact_details_are_rejected() {
    let app = test_app();
    let (token, _) = app.session("Ann", "ann@x.com").await;

    let response = app
        .add_employee(&token, employee_form("ravi@x.com", "١٢٣٤٥٦٧٨٩٠"))
        .await;
    assert_error(&response, StatusCode::BAD_REQUEST, "Invalid mobile number");

    let response = app
        .add_employee(&token, employee_form("jürgen@straße.de", "9876543210"))
        .await;
    assert_error(&response, StatusCode::BAD_REQUEST, "Invalid email");

    let created = app
        .add_employee(&token, employee_form("ravi@x.com", "9876543210"))
        .await
        .json::<EmployeeResponse>()
        .employee;
    let response = app
        .update_employee(
            &token,
            &created.id.to_string(),
            MultipartForm::new().add_text("mobile", "１２３４５６７８９０"),
        )
        .await;
    assert_error(&response, StatusCode::BAD_REQUEST, "Invalid mobile number");

    let listed = app.list(&token).await.json::<EmployeeListResponse>();
    assert_eq!(listed.employees.len(), 1);
    assert_eq!(listed.employees[0].employee.mobile, "9876543210");
}

#[tokio::test]
async fn test_employee_routes_reject_non_form_bodies() {
    let app = test_app();
    let (token, _) = app.session("Ann", "ann@x.com").await;

    let response = app
        .server
        .post("/api/user/addEmployee")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .json(&json!({ "name": "Ravi", "email": "ravi@x.com", "mobile": "9876543210" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body = response.json::<ErrorResponse>();
    assert_eq!(body.error_code, "VALIDATION_ERROR");
    assert!(body.message.starts_with("Invalid form data"));
    assert!(app.list(&token).await.json::<EmployeeListResponse>().employees.is_empty());
}

#[tokio::test]
async fn test_duplicate_mobile_is_conflict_across_owners() {
    let app = test_app();
    let (ann, _) = app.session("Ann", "ann@x.com").await;
    let (bob, _) = app.session("Bob", "bob@x.com").await;

    app.add_employee(&ann, employee_form("ravi@x.com", "9876543210"))
        .await;
    let response = app
        .add_employee(&bob, employee_form("other@x.com", "9876543210"))
        .await;
    assert_error(
        &response,
        StatusCode::CONFLICT,
        "Employee with this mobile already exists",
    );
}

#[tokio::test]
async fn test_image_upload_rules() {
    let app = test_app();
    let (token, _) = app.session("Ann", "ann@x.com").await;

    let gif = employee_form("a@x.com", "1000000001").add_part("image", image("me.gif", "image/gif", b"GIF89a"));
    let response = app.add_employee(&token, gif).await;
    assert_error(
        &response,
        StatusCode::BAD_REQUEST,
        "Only .jpg, .jpeg and .png images are allowed",
    );

    let disguised = employee_form("a@x.com", "1000000001")
        .add_part("image", image("me.png", "text/html", b"<html>"));
    let response = app.add_employee(&token, disguised).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let big = vec![0u8; blob::MAX_IMAGE_BYTES + 1];
    let too_large = employee_form("a@x.com", "1000000001")
        .add_part("image", image("me.png", "image/png", &big));
    let response = app.add_employee(&token, too_large).await;
    assert_error(&response, StatusCode::BAD_REQUEST, "Image must be 5 MB or smaller");

    let png = employee_form("a@x.com", "1000000001")
        .add_part("image", image("me.png", "image/png", b"fake png bytes"));
    let response = app.add_employee(&token, png).await;
    assert_eq!(response.status_code(), StatusCode::CREATED);

    let reference = response.json::<EmployeeResponse>().employee.image.unwrap();
    let served = app.server.get(&format!("/{}", reference)).await;
    assert_eq!(served.status_code(), StatusCode::OK);
    assert_eq!(served.text(), "fake png bytes");
}

#[tokio::test]
async fn test_partial_update_is_idempotent() {
    let app = test_app();
    let (token, _) = app.session("Ann", "ann@x.com").await;
    let created = app
        .add_employee(&token, employee_form("ravi@x.com", "9876543210"))
        .await
        .json::<EmployeeResponse>()
        .employee;
    let id = created.id.to_string();

    let first = app
        .update_employee(&token, &id, MultipartForm::new().add_text("designation", "Sales"))
        .await;
    assert_eq!(first.status_code(), StatusCode::OK);
    let first = first.json::<EmployeeResponse>();
    assert_eq!(first.message, "Employee updated successfully");

    let second = app
        .update_employee(&token, &id, MultipartForm::new().add_text("designation", "Sales"))
        .await
        .json::<EmployeeResponse>();

    assert_eq!(first.employee, second.employee);
    assert_eq!(second.employee.name, created.name);
    assert_eq!(second.employee.mobile, created.mobile);
    assert_eq!(second.employee.course, created.course);
    assert_eq!(second.employee.designation.as_str(), "Sales");
}

#[tokio::test]
async fn test_update_requires_a_field() {
    let app = test_app();
    let (token, _) = app.session("Ann", "ann@x.com").await;
    let created = app
        .add_employee(&token, employee_form("ravi@x.com", "9876543210"))
        .await
        .json::<EmployeeResponse>()
        .employee;

    let response = app
        .update_employee(&token, &created.id.to_string(), MultipartForm::new())
        .await;
    assert_error(
        &response,
        StatusCode::BAD_REQUEST,
        "At least one field is required for update",
    );
}

#[tokio::test]
async fn test_delete_then_not_found() {
    let app = test_app();
    let (token, _) = app.session("Ann", "ann@x.com").await;
    let created = app
        .add_employee(&token, employee_form("ravi@x.com", "9876543210"))
        .await
        .json::<EmployeeResponse>()
        .employee;
    let id = created.id.to_string();

    let deleted = app.delete_employee(&token, &id).await;
    assert_eq!(deleted.status_code(), StatusCode::OK);
    assert_eq!(
        deleted.json::<EmployeeResponse>().message,
        "Employee deleted successfully"
    );

    let again = app.delete_employee(&token, &id).await;
    assert_error(&again, StatusCode::NOT_FOUND, "Employee not found");

    let update = app
        .update_employee(&token, &id, MultipartForm::new().add_text("name", "Ghost"))
        .await;
    assert_eq!(update.status_code(), StatusCode::NOT_FOUND);

    assert!(app.list(&token).await.json::<EmployeeListResponse>().employees.is_empty());
}

#[tokio::test]
async fn test_unparsable_id_is_not_found() {
    let app = test_app();
    let (token, _) = app.session("Ann", "ann@x.com").await;

    let response = app.delete_employee(&token, "12345").await;
    assert_error(&response, StatusCode::NOT_FOUND, "Employee not found");
}

#[tokio::test]
async fn test_owners_are_isolated() {
    let app = test_app();
    let (ann, _) = app.session("Ann", "ann@x.com").await;
    let (bob, _) = app.session("Bob", "bob@x.com").await;

    let anns = app
        .add_employee(&ann, employee_form("ravi@x.com", "9876543210"))
        .await
        .json::<EmployeeResponse>()
        .employee;
    let id = anns.id.to_string();

    assert!(app.list(&bob).await.json::<EmployeeListResponse>().employees.is_empty());

    let update = app
        .update_employee(&bob, &id, MultipartForm::new().add_text("name", "Mallory"))
        .await;
    assert_error(&update, StatusCode::NOT_FOUND, "Employee not found");

    let delete = app.delete_employee(&bob, &id).await;
    assert_error(&delete, StatusCode::NOT_FOUND, "Employee not found");

    let listed = app.list(&ann).await.json::<EmployeeListResponse>();
    assert_eq!(listed.employees.len(), 1);
    assert_eq!(listed.employees[0].employee.name, "Ravi Kumar");
}

// ============================================================================
// Ancillary routes
// ============================================================================

#[tokio::test]
async fn test_home_and_unknown_routes() {
    let app = test_app();

    let home = app.server.get("/").await;
    assert_eq!(home.status_code(), StatusCode::OK);
    assert_eq!(home.text(), "Welcome to the homepage!");

    let missing = app.server.get("/does/not/exist").await;
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(missing.text(), "Page not found");
}

#[tokio::test]
async fn test_openapi_document_lists_routes() {
    let app = test_app();

    let doc = app.server.get("/api-docs/openapi.json").await;
    assert_eq!(doc.status_code(), StatusCode::OK);

    let doc = doc.json::<Value>();
    assert!(doc["paths"]["/api/user/signup"].is_object());
    assert!(doc["paths"]["/api/user/updateEmployee/{id}"].is_object());
    assert!(doc["components"]["securitySchemes"]["bearer_auth"].is_object());
}
