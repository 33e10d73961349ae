// backend/tests/helpers.rs
use backend::config::{AppConfig, DatabaseConfig, SessionConfig, WebConfig};
use backend::web_server::{create_router, AppState};
use bcrypt::{hash, DEFAULT_COST};
use common::{Credentials, RegisterPayload, Role, UserDto};
use reqwest::StatusCode;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::net::{Ipv4Addr, SocketAddr};
use std::str::FromStr;
use tokio::net::TcpListener;

pub const TEST_SESSION_SECRET: &str = "integration-test-session-secret-0123456789";

pub fn test_config(port: u16) -> AppConfig {
    AppConfig {
        web: WebConfig {
            addr: "127.0.0.1".to_string(),
            port,
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
        },
        session: SessionConfig {
            secret: TEST_SESSION_SECRET.to_string(),
            cookie_name: "qb.sid".to_string(),
            expiry_days: 7,
        },
    }
}

/// In-memory database with migrations applied. A single connection keeps
/// every query on the same in-memory instance.
pub async fn test_db() -> SqlitePool {
    let connect_options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);

    let db_pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(connect_options)
        .await
        .expect("Failed to create in-memory database pool.");

    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run migrations on test database.");

    db_pool
}

/// AppState for in-process router tests (`tower::ServiceExt::oneshot`).
pub async fn test_state() -> AppState {
    AppState {
        db_pool: test_db().await,
        config: test_config(0),
    }
}

/// Spawn a test server and return its address, a cookie-keeping client,
/// and the database pool for seeding.
pub async fn spawn_app() -> (SocketAddr, reqwest::Client, SqlitePool) {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let db_pool = test_db().await;

    let app_state = AppState {
        db_pool: db_pool.clone(),
        config: test_config(addr.port()),
    };

    let app = create_router(app_state);

    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service()).await.unwrap();
    });

    // Sessions ride on cookies, so the test client has to keep them.
    let client = reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    (addr, client, db_pool)
}

pub async fn seed_store(db_pool: &SqlitePool, name: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO stores (name, address, phone) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(name)
    .bind("1-2-3 Ginza, Tokyo")
    .bind("03-0000-0000")
    .fetch_one(db_pool)
    .await
    .expect("Failed to seed store")
}

/// Managers are provisioned out of band in production, so tests insert
/// them directly.
pub async fn seed_manager(db_pool: &SqlitePool, email: &str, password: &str, store_id: i64) {
    let password_hash = hash(password, DEFAULT_COST).unwrap();
    sqlx::query(
        "INSERT INTO users (email, password_hash, display_name, role, store_id) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(email)
    .bind(&password_hash)
    .bind("Test Manager")
    .bind(Role::Manager.as_str())
    .bind(store_id)
    .execute(db_pool)
    .await
    .expect("Failed to seed manager");
}

/// Register and sign in a customer, leaving the session cookie in the
/// client's jar. Returns the signed-in user.
pub async fn sign_in_customer(
    addr: &SocketAddr,
    client: &reqwest::Client,
    email: &str,
    password: &str,
) -> UserDto {
    let register_url = format!("http://{addr}/api/auth/register");
    let login_url = format!("http://{addr}/api/auth/login");

    let res = client
        .post(&register_url)
        .json(&RegisterPayload {
            email: email.to_string(),
            password: password.to_string(),
            display_name: "Test Customer".to_string(),
        })
        .send()
        .await
        .expect("Failed to register customer");
    assert_eq!(res.status(), StatusCode::CREATED, "Registration failed");

    let res = client
        .post(&login_url)
        .json(&Credentials {
            email: email.to_string(),
            password: password.to_string(),
        })
        .send()
        .await
        .expect("Failed to login customer");
    assert_eq!(res.status(), StatusCode::OK, "Login failed");

    res.json().await.expect("Failed to parse login response")
}
