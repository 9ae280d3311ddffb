use crate::{
    auth::{verify_password, AuthenticatedUser, LoginRequest, LoginResponse, TokenKeys, UserResponse},
    error::AppError,
    models::User,
};
use actix_web::{get, post, web, HttpResponse, Responder};
use sqlx::PgPool;
use validator::Validate;

/// Login
///
/// Authenticates by username or email plus password and returns a bearer token.
///
/// Unknown identifier and wrong password produce byte-identical 401 responses
/// so the endpoint cannot be used to enumerate accounts.
#[post("/login")]
pub async fn login(
    pool: web::Data<PgPool>,
    keys: web::Data<TokenKeys>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let user = User::find_by_username_or_email(&pool, &login_data.username).await?;

    let user = match user {
        Some(user) => user,
        None => return Err(AppError::Unauthorized("Invalid credentials".into())),
    };

    if !verify_password(&login_data.password, &user.password_hash) {
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    let token = keys.issue(user.id, &user.username)?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        message: "Login successful".to_string(),
        token,
        user: UserResponse {
            id: user.id,
            username: user.username,
            email: user.email,
            name: user.name,
        },
    }))
}

/// Get current user
///
/// Resolves the identity asserted by the bearer token against the user store.
/// A token can outlive its account; in that case the gate still authenticates
/// it but the lookup here finds nothing and the response is 404.
#[get("/me")]
pub async fn me(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let user = User::find_by_id(&pool, auth.user_id).await?;

    match user {
        // `User` skips password_hash on serialization.
        Some(user) => Ok(HttpResponse::Ok().json(serde_json::json!({ "user": user }))),
        None => Err(AppError::NotFound("User not found".into())),
    }
}
