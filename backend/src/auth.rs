use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
    Json,
};
use bcrypt::{hash, verify, DEFAULT_COST};
use sqlx::SqlitePool;
use tower_sessions::Session;
use validator::Validate;

use common::{utils::normalize_email, Credentials, RegisterPayload, Role, UserDto};

use crate::error::AppError;
use crate::extractors::CurrentUser;
use crate::session::SessionUserId;
use crate::web_server::AppState;

#[derive(sqlx::FromRow, Debug)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub display_name: String,
    pub role: String,
    pub store_id: Option<i64>,
}

impl User {
    fn role(&self) -> Result<Role, AppError> {
        self.role
            .parse()
            .map_err(|e: String| AppError::Internal(format!("corrupt role column: {e}")))
    }

    fn into_dto(self) -> Result<UserDto, AppError> {
        let role = self.role()?;
        Ok(UserDto {
            id: self.id,
            email: self.email,
            display_name: self.display_name,
            role,
            store_id: self.store_id,
        })
    }
}

async fn find_by_email(db_pool: &SqlitePool, email: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, email, password_hash, display_name, role, store_id \
         FROM users WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(db_pool)
    .await?;

    Ok(user)
}

/// Shared login path for both portals. The role check keeps customer
/// accounts out of the manager dashboard and vice versa, and collapses
/// into the same 401 as a bad password so the response never reveals
/// which check failed.
async fn portal_login(
    state: &AppState,
    session: &Session,
    payload: Credentials,
    portal_role: Role,
) -> Result<UserDto, AppError> {
    payload.validate()?;

    let email = normalize_email(&payload.email);
    tracing::info!(portal = %portal_role, "login attempt for {}", email);

    let user = find_by_email(&state.db_pool, &email)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !verify(&payload.password, &user.password_hash)? {
        return Err(AppError::Unauthorized);
    }

    if user.role()? != portal_role {
        return Err(AppError::Unauthorized);
    }

    SessionUserId::insert(session, user.id).await?;

    user.into_dto()
}

// --- API Handlers ---

/// ## Register a new customer account
/// Takes email, password, and display name; hashes the password and stores
/// the account. Managers are provisioned out of band, not through this route.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterPayload,
    responses(
        (status = 201, description = "Account created"),
        (status = 400, description = "Invalid data provided"),
        (status = 409, description = "An account with this email already exists"),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<StatusCode, AppError> {
    payload.validate()?;

    let email = normalize_email(&payload.email);
    tracing::info!("registering customer with email: {}", email);

    if find_by_email(&state.db_pool, &email).await?.is_some() {
        return Err(AppError::Conflict(
            "An account with this email already exists".to_string(),
        ));
    }

    let password_hash = hash(&payload.password, DEFAULT_COST)?;

    // The lookup above is advisory only; a concurrent registration can
    // still reach the UNIQUE constraint, which is the same conflict.
    sqlx::query(
        "INSERT INTO users (email, password_hash, display_name, role) VALUES (?, ?, ?, ?)",
    )
    .bind(&email)
    .bind(&password_hash)
    .bind(&payload.display_name)
    .bind(Role::Customer.as_str())
    .execute(&state.db_pool)
    .await
    .map_err(|e| {
        if e.as_database_error()
            .is_some_and(|d| d.is_unique_violation())
        {
            AppError::Conflict("An account with this email already exists".to_string())
        } else {
            AppError::Database(e)
        }
    })?;

    Ok(StatusCode::CREATED)
}

/// ## Customer sign-in
/// Verifies credentials against a customer account and starts a session.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = Credentials,
    responses(
        (status = 200, description = "Signed in", body = UserDto),
        (status = 401, description = "Invalid credentials"),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<Credentials>,
) -> Result<Json<UserDto>, AppError> {
    let user = portal_login(&state, &session, payload, Role::Customer).await?;
    Ok(Json(user))
}

/// ## Store-manager sign-in
/// Same as customer sign-in, restricted to manager accounts.
#[utoipa::path(
    post,
    path = "/api/manage/auth/login",
    request_body = Credentials,
    responses(
        (status = 200, description = "Signed in", body = UserDto),
        (status = 401, description = "Invalid credentials"),
    )
)]
pub async fn manager_login(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<Credentials>,
) -> Result<Json<UserDto>, AppError> {
    let user = portal_login(&state, &session, payload, Role::Manager).await?;
    Ok(Json(user))
}

/// ## Sign out
/// Removes the session from the store and clears the cookie.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 204, description = "Signed out"),
    )
)]
pub async fn logout(session: Session) -> Result<StatusCode, AppError> {
    // Only flush when someone is actually signed in; flushing a session
    // that was never persisted errors out in the store.
    if SessionUserId::get(&session).await?.is_some() {
        session.flush().await?;
    }
    Ok(StatusCode::NO_CONTENT)
}

/// ## Current user
/// Returns the account attached to the session.
#[utoipa::path(
    get,
    path = "/api/auth/user",
    responses(
        (status = 200, description = "Current user", body = UserDto),
        (status = 401, description = "No active session"),
    )
)]
pub async fn current_user(user: CurrentUser) -> Json<UserDto> {
    Json(UserDto {
        id: user.id,
        email: user.email,
        display_name: user.display_name,
        role: user.role,
        store_id: user.store_id,
    })
}

// --- Middleware for session authentication ---

/// Resolves the session to a user row once per request and hands it to
/// handlers through request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user_id = SessionUserId::get(&session)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let user = sqlx::query_as::<_, User>(
        "SELECT id, email, password_hash, display_name, role, store_id \
         FROM users WHERE id = ?",
    )
    .bind(user_id)
    .fetch_optional(&state.db_pool)
    .await?
    // Session outliving the account means the account was deleted.
    .ok_or(AppError::Unauthorized)?;

    let role = user.role()?;
    request.extensions_mut().insert(CurrentUser {
        id: user.id,
        email: user.email,
        display_name: user.display_name,
        role,
        store_id: user.store_id,
    });

    Ok(next.run(request).await)
}
