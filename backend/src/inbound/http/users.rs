//! Account HTTP handlers.
//!
//! ```text
//! POST /api/v1/users {"username":"alice","email":"alice@example.com","password":"..."}
//! POST /api/v1/login {"username":"alice","password":"..."}
//! DELETE /api/v1/users/alice
//! ```

use actix_web::{HttpResponse, delete, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::LoginSession;
use crate::domain::{LoginCredentials, PublicAccount, SignupDetails};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    map_login_validation_error, map_signup_validation_error, parse_username,
};

/// Sign-up request body for `POST /api/v1/users`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Login request body for `POST /api/v1/login`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Public account details. Never includes the password hash.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub username: String,
    pub email: String,
    pub created_at: String,
}

impl From<PublicAccount> for AccountResponse {
    fn from(value: PublicAccount) -> Self {
        Self {
            username: value.username.to_string(),
            email: value.email.as_ref().to_owned(),
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

/// Successful login payload carrying the bearer token.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: String,
    pub username: String,
}

impl From<LoginSession> for LoginResponse {
    fn from(value: LoginSession) -> Self {
        Self {
            token: value.token.token,
            expires_at: value.token.expires_at.to_rfc3339(),
            username: value.username.to_string(),
        }
    }
}

/// Register an account and its profile.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = AccountResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Username taken", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "signUp",
    security([])
)]
#[post("/users")]
pub async fn sign_up(
    state: web::Data<HttpState>,
    payload: web::Json<SignupRequest>,
) -> ApiResult<HttpResponse> {
    let SignupRequest {
        username,
        email,
        password,
    } = payload.into_inner();
    let details = SignupDetails::try_from_parts(&username, &email, &password)
        .map_err(map_signup_validation_error)?;
    let account = state.accounts.sign_up(details).await?;
    Ok(HttpResponse::Created().json(AccountResponse::from(account)))
}

/// Exchange credentials for a bearer token.
///
/// Unknown usernames and wrong passwords produce the same response.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = LoginResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<LoginResponse>> {
    let LoginRequest { username, password } = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(&username, &password)
        .map_err(map_login_validation_error)?;
    let session = state.accounts.log_in(credentials).await?;
    Ok(web::Json(LoginResponse::from(session)))
}

/// Delete an account and its profile. Only the account owner may do so.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{username}",
    params(("username" = String, Path, description = "Account handle")),
    responses(
        (status = 204, description = "Account deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the account owner", body = ErrorSchema),
        (status = 404, description = "No such account", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "deleteAccount"
)]
#[delete("/users/{username}")]
pub async fn delete_account(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let username = parse_username(path.into_inner())?;
    state
        .accounts
        .delete_account(&username, user.username())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
