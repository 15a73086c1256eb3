use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, SignupRequest},
        jwt::JwtKeys,
        password::{hash_password, meets_policy, verify_password},
        repo::Users,
        repo_types::{NewUser, User},
    },
    error::{AppError, Result},
};

pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Signup fields that passed presence, email and password checks. The
/// password is still plaintext here.
#[derive(Debug)]
pub struct ValidSignup {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub date_of_birth: String,
    pub password: String,
}

fn present(field: Option<String>) -> Option<String> {
    field.filter(|v| !v.trim().is_empty())
}

impl SignupRequest {
    pub fn validate(self) -> Result<ValidSignup> {
        let (Some(first_name), Some(last_name), Some(email), Some(date_of_birth), Some(password)) = (
            present(self.first_name),
            present(self.last_name),
            present(self.email),
            present(self.date_of_birth),
            present(self.password),
        ) else {
            return Err(AppError::Validation("All fields are required".into()));
        };

        let email = email.trim().to_lowercase();
        if !is_valid_email(&email) {
            return Err(AppError::Validation("Invalid email format".into()));
        }

        if !meets_policy(&password) {
            return Err(AppError::Validation(
                "Password must be at least 6 characters and include uppercase, lowercase, \
                 number and special character"
                    .into(),
            ));
        }

        Ok(ValidSignup {
            first_name: first_name.trim().to_string(),
            last_name: last_name.trim().to_string(),
            email,
            date_of_birth: date_of_birth.trim().to_string(),
            password,
        })
    }
}

pub async fn signup(users: &Users, keys: &JwtKeys, payload: SignupRequest) -> Result<AuthResponse> {
    let valid = payload.validate().map_err(|e| {
        warn!(error = %e, "signup rejected");
        e
    })?;

    let password_hash =
        hash_password(&valid.password).map_err(|e| AppError::Internal(e.to_string()))?;
    let user = User::create(
        users,
        NewUser {
            first_name: valid.first_name,
            last_name: valid.last_name,
            email: valid.email,
            date_of_birth: valid.date_of_birth,
            password_hash,
        },
    )
    .await?;

    let token = keys
        .sign(&user)
        .map_err(|e| AppError::Internal(format!("jwt sign failed: {e}")))?;
    info!(user_id = user.id, email = %user.email, "user registered");
    Ok(AuthResponse {
        message: "User created successfully",
        user: PublicUser::from(&user),
        token,
    })
}

pub async fn login(users: &Users, keys: &JwtKeys, payload: LoginRequest) -> Result<AuthResponse> {
    let (Some(email), Some(password)) = (present(payload.email), present(payload.password)) else {
        return Err(AppError::Validation("Email and password are required".into()));
    };
    let email = email.trim().to_lowercase();

    let Some(user) = User::find_by_email(users, &email).await else {
        warn!(%email, "login unknown email");
        return Err(AppError::Auth(INVALID_CREDENTIALS.into()));
    };

    // A stored hash that cannot be parsed counts as a mismatch.
    let ok = verify_password(&password, &user.password_hash).unwrap_or(false);
    if !ok {
        warn!(%email, user_id = user.id, "login invalid password");
        return Err(AppError::Auth(INVALID_CREDENTIALS.into()));
    }

    let token = keys
        .sign(&user)
        .map_err(|e| AppError::Internal(format!("jwt sign failed: {e}")))?;
    info!(user_id = user.id, "user logged in");
    Ok(AuthResponse {
        message: "Login successful",
        user: PublicUser::from(&user),
        token,
    })
}
