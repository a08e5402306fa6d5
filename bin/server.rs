// Deposito - REST API Server
// Exposes the customer / deposito-type / account CRUD plus the two guarded
// ledger operations (deposit, withdraw) over HTTP.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;

use deposito::entities::{account, customer, deposito_type};
use deposito::{
    database_path, engine, setup_database, AccountUpdate, DepositoError, DepositoTypeUpdate,
};

/// Shared application state
///
/// One connection behind a mutex: every request serializes through it, which
/// together with the engine's IMMEDIATE transactions keeps each account's
/// read-compute-write sequence linearizable.
#[derive(Clone)]
struct AppState {
    db: Arc<Mutex<Connection>>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

fn error_response(err: DepositoError) -> Response {
    let status = match &err {
        DepositoError::NotFound { .. } => StatusCode::NOT_FOUND,
        DepositoError::Validation(_) => StatusCode::BAD_REQUEST,
        DepositoError::NoDepositDate | DepositoError::InsufficientBalance { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        DepositoError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status == StatusCode::INTERNAL_SERVER_ERROR {
        eprintln!("Storage error: {}", err);
    }

    let body = serde_json::json!({
        "success": false,
        "error": err.to_string(),
    });
    (status, Json(body)).into_response()
}

fn respond<T: Serialize>(status: StatusCode, result: deposito::Result<T>) -> Response {
    match result {
        Ok(data) => (status, Json(ApiResponse::ok(data))).into_response(),
        Err(err) => error_response(err),
    }
}

/// Lift an Option into the NotFound arm of the taxonomy.
fn found<T>(entity: &'static str, id: i64, value: Option<T>) -> deposito::Result<T> {
    value.ok_or_else(|| DepositoError::not_found(entity, id))
}

// ============================================================================
// Request payloads
// ============================================================================

#[derive(Deserialize)]
struct CustomerPayload {
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DepositoTypePayload {
    name: String,
    yearly_return: Decimal,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateAccountPayload {
    customer_id: i64,
    deposito_type_id: i64,
    balance: Option<Decimal>,
}

#[derive(Deserialize)]
struct LedgerPayload {
    amount: Decimal,
    date: NaiveDate,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/customers
async fn list_customers(State(state): State<AppState>) -> Response {
    let conn = state.db.lock().unwrap();
    respond(StatusCode::OK, customer::list_customers(&conn))
}

/// POST /api/customers
async fn create_customer(
    State(state): State<AppState>,
    Json(payload): Json<CustomerPayload>,
) -> Response {
    let conn = state.db.lock().unwrap();
    respond(StatusCode::CREATED, customer::insert_customer(&conn, &payload.name))
}

/// GET /api/customers/:id - Customer with their accounts
async fn get_customer(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    let conn = state.db.lock().unwrap();
    let result = customer::get_customer_detail(&conn, id).and_then(|c| found("customer", id, c));
    respond(StatusCode::OK, result)
}

/// PUT /api/customers/:id
async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<CustomerPayload>,
) -> Response {
    let conn = state.db.lock().unwrap();
    respond(StatusCode::OK, customer::update_customer(&conn, id, &payload.name))
}

/// DELETE /api/customers/:id
async fn delete_customer(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    let conn = state.db.lock().unwrap();
    respond(StatusCode::OK, customer::delete_customer(&conn, id).map(|_| "deleted"))
}

/// GET /api/deposito-types
async fn list_deposito_types(State(state): State<AppState>) -> Response {
    let conn = state.db.lock().unwrap();
    respond(StatusCode::OK, deposito_type::list_deposito_types(&conn))
}

/// POST /api/deposito-types
async fn create_deposito_type(
    State(state): State<AppState>,
    Json(payload): Json<DepositoTypePayload>,
) -> Response {
    let conn = state.db.lock().unwrap();
    respond(
        StatusCode::CREATED,
        deposito_type::insert_deposito_type(&conn, &payload.name, payload.yearly_return),
    )
}

/// GET /api/deposito-types/:id
async fn get_deposito_type(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    let conn = state.db.lock().unwrap();
    let result =
        deposito_type::get_deposito_type(&conn, id).and_then(|t| found("deposito type", id, t));
    respond(StatusCode::OK, result)
}

/// PUT /api/deposito-types/:id
async fn update_deposito_type(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(update): Json<DepositoTypeUpdate>,
) -> Response {
    let conn = state.db.lock().unwrap();
    respond(StatusCode::OK, deposito_type::update_deposito_type(&conn, id, &update))
}

/// DELETE /api/deposito-types/:id
async fn delete_deposito_type(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    let conn = state.db.lock().unwrap();
    respond(
        StatusCode::OK,
        deposito_type::delete_deposito_type(&conn, id).map(|_| "deleted"),
    )
}

/// GET /api/accounts - All accounts with customer, type, and ledger joined
async fn list_accounts(State(state): State<AppState>) -> Response {
    let conn = state.db.lock().unwrap();
    respond(StatusCode::OK, account::list_account_details(&conn))
}

/// POST /api/accounts
async fn create_account(
    State(state): State<AppState>,
    Json(payload): Json<CreateAccountPayload>,
) -> Response {
    let conn = state.db.lock().unwrap();
    respond(
        StatusCode::CREATED,
        account::create_account(
            &conn,
            payload.customer_id,
            payload.deposito_type_id,
            payload.balance,
        ),
    )
}

/// GET /api/accounts/:id
async fn get_account(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    let conn = state.db.lock().unwrap();
    let result = account::get_account_detail(&conn, id).and_then(|a| found("account", id, a));
    respond(StatusCode::OK, result)
}

/// PUT /api/accounts/:id
async fn update_account(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(update): Json<AccountUpdate>,
) -> Response {
    let conn = state.db.lock().unwrap();
    respond(StatusCode::OK, account::update_account(&conn, id, &update))
}

/// DELETE /api/accounts/:id
async fn delete_account(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    let conn = state.db.lock().unwrap();
    respond(StatusCode::OK, account::delete_account(&conn, id).map(|_| "deleted"))
}

/// POST /api/accounts/:id/deposit
async fn deposit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<LedgerPayload>,
) -> Response {
    let mut conn = state.db.lock().unwrap();
    respond(
        StatusCode::OK,
        engine::deposit(&mut conn, id, payload.amount, payload.date),
    )
}

/// POST /api/accounts/:id/withdraw
async fn withdraw(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<LedgerPayload>,
) -> Response {
    let mut conn = state.db.lock().unwrap();
    respond(
        StatusCode::OK,
        engine::withdraw(&mut conn, id, payload.amount, payload.date),
    )
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() {
    println!("🏦 Deposito - API Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━");

    let db_path = database_path();
    let conn = Connection::open(&db_path).expect("Failed to open database");
    setup_database(&conn).expect("Failed to set up database schema");
    println!("✓ Database opened: {:?}", db_path);

    // Create shared state
    let state = AppState {
        db: Arc::new(Mutex::new(conn)),
    };

    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/customers", get(list_customers).post(create_customer))
        .route(
            "/customers/:id",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
        .route(
            "/deposito-types",
            get(list_deposito_types).post(create_deposito_type),
        )
        .route(
            "/deposito-types/:id",
            get(get_deposito_type)
                .put(update_deposito_type)
                .delete(delete_deposito_type),
        )
        .route("/accounts", get(list_accounts).post(create_account))
        .route(
            "/accounts/:id",
            get(get_account).put(update_account).delete(delete_account),
        )
        .route("/accounts/:id/deposit", post(deposit))
        .route("/accounts/:id/withdraw", post(withdraw))
        .with_state(state);

    // Build main router
    let app = Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive());

    // Start server
    let addr = "0.0.0.0:3000";
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    println!("\n🚀 Server running on http://localhost:3000");
    println!("   API: http://localhost:3000/api/accounts");
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
