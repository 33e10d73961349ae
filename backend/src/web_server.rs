use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::SqlitePool;
use time::Duration;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tower_sessions::{
    cookie::{Key, SameSite},
    service::SignedCookie,
    Expiry, MemoryStore, SessionManagerLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::{
    AppointmentDto, Credentials, NewAppointment, RegisterPayload, Role, StoreDto, UserDto,
};

use crate::config::AppConfig;
use crate::{appointments, auth, pages, stores};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub config: AppConfig,
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "QB House",
        description = "Salon platform API: customer storefront and store manager dashboard"
    ),
    paths(
        auth::register,
        auth::login,
        auth::manager_login,
        auth::logout,
        auth::current_user,
        stores::list_stores,
        stores::get_store,
        appointments::create_appointment,
        appointments::list_my_appointments,
        appointments::list_store_appointments
    ),
    components(schemas(
        Credentials,
        RegisterPayload,
        UserDto,
        Role,
        StoreDto,
        AppointmentDto,
        NewAppointment
    ))
)]
struct ApiDoc;

pub async fn run_server(app_state: AppState) -> anyhow::Result<()> {
    let addr = format!("{}:{}", app_state.config.web.addr, app_state.config.web.port);
    let app = create_router(app_state);

    tracing::info!("Serving pages and API at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

/// Both portals are browser apps on other origins talking to this API with
/// cookies, so any origin is allowed; with credentials enabled the origin
/// must be mirrored back rather than wildcarded.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

fn session_layer(config: &AppConfig) -> SessionManagerLayer<MemoryStore, SignedCookie> {
    let store = MemoryStore::default();
    // Config validation guarantees the secret is long enough to derive from.
    let key = Key::derive_from(config.session.secret.as_bytes());

    SessionManagerLayer::new(store)
        .with_name(config.session.cookie_name.clone())
        .with_secure(false)
        .with_http_only(true)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(Duration::days(
            config.session.expiry_days,
        )))
        .with_signed(key)
}

pub fn create_router(app_state: AppState) -> Router {
    let sessions = session_layer(&app_state.config);

    // Routes reachable without a session.
    let public_api = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/manage/auth/login", post(auth::manager_login))
        .route("/stores", get(stores::list_stores))
        .route("/stores/{id}", get(stores::get_store));

    // Routes that require a signed-in user.
    let protected_api = Router::new()
        .route("/auth/user", get(auth::current_user))
        .route(
            "/appointments",
            get(appointments::list_my_appointments).post(appointments::create_appointment),
        )
        .route(
            "/manage/appointments",
            get(appointments::list_store_appointments),
        )
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            auth::require_auth,
        ));

    Router::new()
        .nest("/api", public_api.merge(protected_api))
        .merge(SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", ApiDoc::openapi()))
        .route("/signin", get(pages::customer_sign_in))
        .route("/manage/signin", get(pages::manager_sign_in))
        // The fallback goes in before the layers so static files pass
        // through the same middleware as everything else.
        .fallback_service(ServeDir::new("public"))
        // Layer order is outermost-last: tracing wraps CORS wraps sessions,
        // so preflights are answered before the session store is touched.
        .layer(sessions)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
