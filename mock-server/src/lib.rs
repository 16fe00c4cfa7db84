use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
    time::Duration,
};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// What `/echo` saw of the incoming request. Repeated headers are joined
/// with `, `.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub path: String,
    pub query: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Value>,
}

pub type Db = Arc<RwLock<HashMap<Uuid, User>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/echo", any(echo))
        .route("/echo/{*rest}", any(echo))
        .route("/status/{code}", any(status))
        .route("/delay/{ms}", get(delay))
        .route("/api/users", get(list_users).post(create_user))
        .route(
            "/api/users/{id}",
            get(get_user)
                .put(replace_user)
                .patch(update_user)
                .delete(delete_user),
        )
        .fallback(not_found)
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo(
    method: Method,
    uri: axum::http::Uri,
    Query(query): Query<BTreeMap<String, String>>,
    headers: HeaderMap,
    body: String,
) -> Json<Echo> {
    let mut folded = BTreeMap::<String, String>::new();
    for (name, value) in &headers {
        let value = String::from_utf8_lossy(value.as_bytes());
        folded
            .entry(name.as_str().to_string())
            .and_modify(|joined| {
                joined.push_str(", ");
                joined.push_str(&value);
            })
            .or_insert_with(|| value.to_string());
    }
    let body = if body.is_empty() {
        None
    } else {
        Some(serde_json::from_str(&body).unwrap_or(Value::String(body)))
    };
    Json(Echo {
        method: method.to_string(),
        path: uri.path().to_string(),
        query,
        headers: folded,
        body,
    })
}

async fn status(Path(code): Path<u16>) -> (StatusCode, Json<Value>) {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST);
    let message = status.canonical_reason().unwrap_or("unknown");
    (status, Json(json!({ "status": status.as_u16(), "message": message })))
}

async fn delay(Path(ms): Path<u64>) -> Json<Value> {
    tokio::time::sleep(Duration::from_millis(ms)).await;
    Json(json!({ "delayed_ms": ms }))
}

async fn not_found() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" })))
}

/// Handler failures, rendered as a JSON body.
#[derive(Debug)]
pub enum ApiError {
    UserNotFound(Uuid),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::UserNotFound(id) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "user not found", "id": id })),
            )
                .into_response(),
        }
    }
}

/// Users sorted by name so listings are stable.
async fn list_users(State(db): State<Db>) -> Json<Vec<User>> {
    let mut users: Vec<User> = db.read().await.values().cloned().collect();
    users.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
    Json(users)
}

async fn create_user(
    State(db): State<Db>,
    Json(input): Json<CreateUser>,
) -> (StatusCode, Json<User>) {
    let user = User {
        id: Uuid::new_v4(),
        name: input.name,
        email: input.email,
    };
    tracing::info!(id = %user.id, "user created");
    db.write().await.insert(user.id, user.clone());
    (StatusCode::CREATED, Json(user))
}

async fn get_user(State(db): State<Db>, Path(id): Path<Uuid>) -> Result<Json<User>, ApiError> {
    let users = db.read().await;
    let user = users.get(&id).ok_or(ApiError::UserNotFound(id))?;
    Ok(Json(user.clone()))
}

/// PUT stores the full record under `id`: 201 when it is new, 200 when it
/// replaced an existing one. Fields missing from the payload are cleared.
async fn replace_user(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(input): Json<CreateUser>,
) -> (StatusCode, Json<User>) {
    let user = User {
        id,
        name: input.name,
        email: input.email,
    };
    match db.write().await.insert(id, user.clone()) {
        Some(_) => (StatusCode::OK, Json(user)),
        None => {
            tracing::info!(%id, "user created by put");
            (StatusCode::CREATED, Json(user))
        }
    }
}

/// PATCH applies only the fields present in the payload.
async fn update_user(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateUser>,
) -> Result<Json<User>, ApiError> {
    let mut users = db.write().await;
    let user = users.get_mut(&id).ok_or(ApiError::UserNotFound(id))?;
    user.name = input.name.unwrap_or_else(|| user.name.clone());
    user.email = input.email.or_else(|| user.email.take());
    Ok(Json(user.clone()))
}

async fn delete_user(State(db): State<Db>, Path(id): Path<Uuid>) -> Result<StatusCode, ApiError> {
    match db.write().await.remove(&id) {
        Some(_) => {
            tracing::info!(%id, "user deleted");
            Ok(StatusCode::NO_CONTENT)
        }
        None => Err(ApiError::UserNotFound(id)),
    }
}
