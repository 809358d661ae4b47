// Authentication module
// Account registration, login and password reset; signed session tokens and
// the gate that guards protected routes

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod repository;
pub mod service;
pub mod token;

// Re-export commonly used types
pub use error::AuthError;
pub use handlers::{login_handler, register_handler, reset_password_handler};
pub use middleware::{require_auth, AuthGate, AuthenticatedUser, TokenTransport};
pub use models::{
    Account, AccountResponse, Identity, LoginRequest, LoginResponse, MessageResponse,
    RegisterRequest, RegisterResponse, ResetPasswordRequest,
};
pub use password::PasswordService;
pub use repository::{AccountRepository, InMemoryAccountRepository, PgAccountRepository};
pub use service::AuthService;
pub use token::{Claims, TokenError, TokenService};
