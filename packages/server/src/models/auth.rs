use serde::{Deserialize, Serialize};

use crate::entity::user::{self, Role, SubscriptionFeatures};
use crate::error::AppError;

/// Request body for user registration.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    /// Unique username (1-32 chars, alphanumeric and underscores).
    #[schema(example = "alice_wonder")]
    pub username: String,
    /// Unique email address.
    #[schema(example = "alice@example.com")]
    pub email: String,
    /// Password (8-128 characters).
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
    /// Display name.
    #[schema(example = "Alice Wonder")]
    pub full_name: String,
    pub phone: Option<String>,
    pub institution: Option<String>,
}

pub fn validate_register_request(payload: &RegisterRequest) -> Result<(), AppError> {
    let username = payload.username.trim();
    if username.is_empty() || username.chars().count() > 32 {
        return Err(AppError::Validation(
            "Username must be 1-32 characters".into(),
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(AppError::Validation(
            "Username must contain only letters, digits, and underscores".into(),
        ));
    }
    let email = payload.email.trim();
    if email.is_empty() || !email.contains('@') || email.chars().count() > 256 {
        return Err(AppError::Validation("Invalid email address".into()));
    }
    if payload.password.len() < 8 || payload.password.len() > 128 {
        return Err(AppError::Validation(
            "Password must be 8-128 characters".into(),
        ));
    }
    if payload.full_name.trim().is_empty() || payload.full_name.chars().count() > 128 {
        return Err(AppError::Validation(
            "Full name must be 1-128 characters".into(),
        ));
    }
    Ok(())
}

/// Request body for user login. Either username or email identifies the
/// account.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    /// Username or email of the account to log into.
    #[schema(example = "alice_wonder")]
    pub identifier: String,
    /// Account password.
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

pub fn validate_login_request(payload: &LoginRequest) -> Result<(), AppError> {
    if payload.identifier.trim().is_empty() {
        return Err(AppError::Validation("Identifier must not be empty".into()));
    }
    if payload.password.is_empty() {
        return Err(AppError::Validation("Password must not be empty".into()));
    }
    Ok(())
}

/// Successful registration response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct RegisterResponse {
    /// ID of the newly created user.
    #[schema(example = 42)]
    pub id: i32,
    /// Username of the newly created user.
    #[schema(example = "alice_wonder")]
    pub username: String,
}

impl From<user::Model> for RegisterResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}

/// Successful login response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    /// JWT bearer token valid for 7 days.
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
    pub user: MeResponse,
}

/// Current authenticated user's profile.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MeResponse {
    /// User ID.
    #[schema(example = 42)]
    pub id: i32,
    /// Username.
    #[schema(example = "alice_wonder")]
    pub username: String,
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = "Alice Wonder")]
    pub full_name: String,
    pub institution: Option<String>,
    /// Global roles held by the user.
    #[schema(example = json!(["student"]))]
    pub roles: Vec<Role>,
    /// Current subscription plan name.
    #[schema(example = "free")]
    pub subscription_plan: String,
    #[schema(example = "inactive")]
    pub subscription_status: String,
    pub subscription_features: SubscriptionFeatures,
}

impl From<user::Model> for MeResponse {
    fn from(user: user::Model) -> Self {
        let roles = user.roles();
        let features = user.features();
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            institution: user.institution,
            roles,
            subscription_plan: user.subscription_plan,
            subscription_status: user.subscription_status,
            subscription_features: features,
        }
    }
}
