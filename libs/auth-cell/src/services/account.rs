use std::sync::LazyLock;

use regex::Regex;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use shared_config::AppConfig;
use shared_database::supabase::{is_conflict, SupabaseClient, USER_COLUMNS, USER_SUMMARY_COLUMNS};
use shared_models::auth::{Role, User, UserSummary};
use shared_utils::jwt::issue_token;

use crate::models::{AuthError, AuthResponse, LoginRequest, RegisterRequest, UserRecord};
use crate::services::password::PasswordService;

// Literal pattern; `test_email_pattern_compiles` forces it.
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$")
        .expect("email pattern is a valid regex")
});

/// Hash checked against when the email is unknown, so a miss costs the same
/// argon2 work as a wrong password.
static DUMMY_HASH: LazyLock<Option<String>> = LazyLock::new(|| {
    PasswordService::hash_password("dummy-password-for-unknown-accounts").ok()
});

pub struct AccountService {
    supabase: SupabaseClient,
    jwt_secret: String,
    jwt_expiry_hours: i64,
}

impl AccountService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            jwt_secret: config.jwt_secret.clone(),
            jwt_expiry_hours: config.jwt_expiry_hours,
        }
    }

    fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }

    fn validate_registration(request: &RegisterRequest) -> Result<(), AuthError> {
        if request.name.trim().is_empty() {
            return Err(AuthError::Validation("Name is required".to_string()));
        }
        if !EMAIL_PATTERN.is_match(request.email.trim()) {
            return Err(AuthError::Validation("A valid email address is required".to_string()));
        }
        PasswordService::check_length(&request.password).map_err(AuthError::Validation)?;
        if request.role == Role::Admin {
            return Err(AuthError::Validation("Role must be patient or doctor".to_string()));
        }
        Ok(())
    }

    fn session_for(&self, user: User) -> Result<AuthResponse, AuthError> {
        let token = issue_token(&user, &self.jwt_secret, self.jwt_expiry_hours)
            .map_err(AuthError::Token)?;
        Ok(AuthResponse { user, token })
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, AuthError> {
        Self::validate_registration(&request)?;

        let email = Self::normalize_email(&request.email);
        debug!("Registering new {} account for {}", request.role, email);

        let existing_path = format!(
            "/rest/v1/users?email=eq.{}&select=id",
            urlencoding::encode(&email)
        );
        let existing: Vec<Value> = self.supabase.request(Method::GET, &existing_path, None)
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?;

        if !existing.is_empty() {
            warn!("Registration attempted with existing email {}", email);
            return Err(AuthError::EmailTaken(email));
        }

        let password_hash = PasswordService::hash_password(&request.password)
            .map_err(|e| AuthError::Database(format!("Failed to hash password: {}", e)))?;

        let specialization = match request.role {
            Role::Doctor => request.specialization.filter(|s| !s.trim().is_empty()),
            _ => None,
        };

        let user_data = json!({
            "name": request.name.trim(),
            "email": email,
            "role": request.role,
            "specialization": specialization,
            "phone": request.phone,
            "password_hash": password_hash,
        });

        let path = format!("/rest/v1/users?select={}", USER_COLUMNS);
        let mut created: Vec<User> = self.supabase.request_with_headers(
            Method::POST,
            &path,
            Some(user_data),
            Some(SupabaseClient::representation_headers()),
        )
        .await
        .map_err(|e| {
            if is_conflict(&e) {
                warn!("Registration lost a race on email {}", email);
                AuthError::EmailTaken(email.clone())
            } else {
                AuthError::Database(e.to_string())
            }
        })?;

        if created.is_empty() {
            return Err(AuthError::Database("Failed to create user".to_string()));
        }

        let user = created.swap_remove(0);
        info!("Registered user {} as {}", user.id, user.role);

        self.session_for(user)
    }

    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AuthError> {
        let email = Self::normalize_email(&request.email);
        debug!("Login attempt for {}", email);

        let path = format!(
            "/rest/v1/users?email=eq.{}&select={},password_hash",
            urlencoding::encode(&email),
            USER_COLUMNS
        );
        let mut records: Vec<UserRecord> = self.supabase.request(Method::GET, &path, None)
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?;

        if records.is_empty() {
            if let Some(hash) = DUMMY_HASH.as_deref() {
                let _ = PasswordService::verify_password(&request.password, hash);
            }
            warn!("Login failed: no account for {}", email);
            return Err(AuthError::InvalidCredentials);
        }

        let record = records.swap_remove(0);
        let matches = PasswordService::verify_password(&request.password, &record.password_hash)
            .map_err(|e| {
                warn!("Stored hash for {} is unreadable: {}", record.id, e);
                AuthError::InvalidCredentials
            })?;

        if !matches {
            warn!("Login failed: wrong password for {}", record.id);
            return Err(AuthError::InvalidCredentials);
        }

        info!("User {} logged in", record.id);
        self.session_for(record.into_user())
    }

    pub async fn list_doctors(&self) -> Result<Vec<UserSummary>, AuthError> {
        let path = format!(
            "/rest/v1/users?role=eq.doctor&select={}&order=name.asc",
            USER_SUMMARY_COLUMNS
        );

        self.supabase.request(Method::GET, &path, None)
            .await
            .map_err(|e| AuthError::Database(e.to_string()))
    }
}
