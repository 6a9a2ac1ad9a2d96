//! In-process mock of the support-desk HTTP API.
//!
//! Seeded with three users (`alice` requester, `bob` agent, `root` admin;
//! password `pw` for all), two tickets and one knowledge-base article. Any route can be forced to fail
//! with [`MockServer::fail`], and every request is logged.

#![allow(dead_code)]

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, post};
use axum::{Form, Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

pub const PASSWORD: &str = "pw";

type Reply = (StatusCode, Json<Value>);

#[derive(Default)]
struct Inner {
    users: Vec<(String, Value)>,
    tickets: Vec<Value>,
    failures: HashMap<String, (u16, Value)>,
    ai_response: Value,
    generate_delay: HashMap<i64, Duration>,
    requests: Vec<String>,
    created: Vec<Value>,
    list_queries: Vec<HashMap<String, String>>,
    knowledge: Vec<Value>,
    knowledge_queries: Vec<Vec<(String, String)>>,
    next_id: i64,
    next_kb_id: i64,
}

#[derive(Clone)]
pub struct MockServer {
    inner: Arc<Mutex<Inner>>,
    pub base_url: String,
}

impl MockServer {
    pub async fn start() -> Self {
        let inner = Arc::new(Mutex::new(seed()));
        let app = router(inner.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            inner,
            base_url: format!("http://{}", addr),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    /// Make `route` (e.g. `"GET /api/v1/tickets/"`) answer `status` with `body`.
    pub fn fail(&self, route: &str, status: u16, body: Value) {
        self.lock()
            .failures
            .insert(route.to_string(), (status, body));
    }

    pub fn set_tickets(&self, tickets: Vec<Value>) {
        self.lock().tickets = tickets;
    }

    pub fn set_ai_response(&self, body: Value) {
        self.lock().ai_response = body;
    }

    pub fn delay_generation(&self, ticket_id: i64, delay: Duration) {
        self.lock().generate_delay.insert(ticket_id, delay);
    }

    /// `"METHOD path"` of every request received, in order.
    pub fn requests(&self) -> Vec<String> {
        self.lock().requests.clone()
    }

    pub fn count(&self, route: &str) -> usize {
        self.lock().requests.iter().filter(|r| *r == route).count()
    }

    /// JSON bodies received by `POST /tickets/`.
    pub fn created(&self) -> Vec<Value> {
        self.lock().created.clone()
    }

    pub fn list_queries(&self) -> Vec<HashMap<String, String>> {
        self.lock().list_queries.clone()
    }

    /// Raw query pairs received by `POST /admin/knowledge-base`.
    pub fn knowledge_queries(&self) -> Vec<Vec<(String, String)>> {
        self.lock().knowledge_queries.clone()
    }

    pub fn knowledge(&self) -> Vec<Value> {
        self.lock().knowledge.clone()
    }

    pub fn ticket(&self, id: i64) -> Option<Value> {
        find_ticket(&self.lock(), id)
    }
}

pub fn ticket_json(id: i64, title: &str, auto: Option<f64>) -> Value {
    let (category, predicted) = match auto {
        Some(_) => (json!("billing"), json!("billing")),
        None => (json!("technical"), Value::Null),
    };
    json!({
        "id": id,
        "title": title,
        "description": format!("Description of {}", title),
        "status": "open",
        "priority": "medium",
        "category": category,
        "predicted_category": predicted,
        "category_confidence": auto,
        "auto_categorized": auto.is_some(),
        "user_id": 1,
        "assigned_agent_id": null,
        "tags": [],
        "created_at": "2024-03-01T09:30:00",
        "updated_at": null,
        "resolved_at": null
    })
}

fn user_json(id: i64, username: &str, role: &str) -> Value {
    json!({
        "id": id,
        "username": username,
        "email": format!("{}@example.com", username),
        "full_name": username,
        "role": role,
        "is_active": true
    })
}

fn seed() -> Inner {
    Inner {
        users: vec![
            ("alice".into(), user_json(1, "alice", "customer")),
            ("bob".into(), user_json(2, "bob", "agent")),
            ("root".into(), user_json(3, "root", "admin")),
        ],
        tickets: vec![
            ticket_json(1, "Cannot log in", None),
            ticket_json(2, "Charged twice", Some(0.87)),
        ],
        ai_response: json!({
            "response": "Please reset your password from the login page.",
            "confidence": 0.91,
            "should_escalate": false,
            "sources": [
                {"type": "knowledge", "id": 4, "title": "Password resets", "similarity": 0.83}
            ],
            "response_id": 77
        }),
        knowledge: vec![json!({
            "id": 4,
            "title": "Password resets",
            "content": "Use the reset link on the login page.",
            "category": "account",
            "tags": ["password"]
        })],
        next_id: 3,
        next_kb_id: 5,
        ..Inner::default()
    }
}

fn router(state: Arc<Mutex<Inner>>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/register", post(register))
        .route("/api/v1/auth/me", get(me))
        .route("/api/v1/tickets/", get(list_tickets).post(create_ticket))
        .route("/api/v1/tickets/{id}", get(get_ticket))
        .route("/api/v1/tickets/{id}/generate-response", post(generate))
        .route("/api/v1/tickets/{id}/similar", get(similar))
        .route("/api/v1/tickets/{id}/responses", post(add_response))
        .route("/api/v1/admin/stats", get(stats))
        .route("/api/v1/admin/users", get(admin_users))
        .route("/api/v1/admin/knowledge-base", post(add_knowledge))
        .route("/api/v1/admin/knowledge-base/{kb_id}", delete(delete_knowledge))
        .route("/api/v1/admin/assign-ticket", post(assign_ticket))
        .with_state(state)
}

fn reply(status: u16, body: Value) -> Reply {
    (StatusCode::from_u16(status).unwrap(), Json(body))
}

/// Log the request and return a forced failure for it, if any.
fn enter(inner: &mut Inner, route: String) -> Option<Reply> {
    inner.requests.push(route.clone());
    inner
        .failures
        .get(&route)
        .map(|(status, body)| reply(*status, body.clone()))
}

/// Resolve the bearer token (`token-<username>`) to a user.
fn caller(inner: &Inner, headers: &HeaderMap) -> Option<Value> {
    let token = headers
        .get("authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")?;
    let username = token.strip_prefix("token-")?;
    inner
        .users
        .iter()
        .find(|(name, _)| name == username)
        .map(|(_, user)| user.clone())
}

fn unauthorized() -> Reply {
    reply(401, json!({"detail": "Could not validate credentials"}))
}

async fn health(State(state): State<Arc<Mutex<Inner>>>) -> Reply {
    let mut inner = state.lock().unwrap();
    if let Some(forced) = enter(&mut inner, "GET /health".into()) {
        return forced;
    }
    reply(200, json!({"status": "healthy"}))
}

async fn login(
    State(state): State<Arc<Mutex<Inner>>>,
    Form(form): Form<HashMap<String, String>>,
) -> Reply {
    let mut inner = state.lock().unwrap();
    if let Some(forced) = enter(&mut inner, "POST /api/v1/auth/login".into()) {
        return forced;
    }
    let username = form.get("username").cloned().unwrap_or_default();
    let known = inner.users.iter().any(|(name, _)| *name == username);
    if !known || form.get("password").map(String::as_str) != Some(PASSWORD) {
        return reply(401, json!({"detail": "Incorrect username or password"}));
    }
    reply(
        200,
        json!({"access_token": format!("token-{}", username), "token_type": "bearer"}),
    )
}

async fn register(State(state): State<Arc<Mutex<Inner>>>, Json(body): Json<Value>) -> Reply {
    let mut inner = state.lock().unwrap();
    if let Some(forced) = enter(&mut inner, "POST /api/v1/auth/register".into()) {
        return forced;
    }
    let username = body["username"].as_str().unwrap_or_default().to_string();
    if inner.users.iter().any(|(name, _)| *name == username) {
        return reply(400, json!({"detail": "Username already registered"}));
    }
    let user = user_json(inner.users.len() as i64 + 1, &username, "requester");
    inner.users.push((username, user.clone()));
    reply(200, user)
}

async fn me(State(state): State<Arc<Mutex<Inner>>>, headers: HeaderMap) -> Reply {
    let mut inner = state.lock().unwrap();
    if let Some(forced) = enter(&mut inner, "GET /api/v1/auth/me".into()) {
        return forced;
    }
    match caller(&inner, &headers) {
        Some(user) => reply(200, user),
        None => unauthorized(),
    }
}

async fn list_tickets(
    State(state): State<Arc<Mutex<Inner>>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Reply {
    let mut inner = state.lock().unwrap();
    if let Some(forced) = enter(&mut inner, "GET /api/v1/tickets/".into()) {
        return forced;
    }
    if caller(&inner, &headers).is_none() {
        return unauthorized();
    }
    inner.list_queries.push(query);
    reply(200, Value::Array(inner.tickets.clone()))
}

async fn create_ticket(
    State(state): State<Arc<Mutex<Inner>>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let mut inner = state.lock().unwrap();
    if let Some(forced) = enter(&mut inner, "POST /api/v1/tickets/".into()) {
        return forced;
    }
    if caller(&inner, &headers).is_none() {
        return unauthorized();
    }
    inner.created.push(body.clone());

    let id = inner.next_id;
    inner.next_id += 1;
    let title = body["title"].as_str().unwrap_or_default();
    let mut ticket = if body["auto_categorize"] == json!(true) {
        ticket_json(id, title, Some(0.87))
    } else {
        let mut t = ticket_json(id, title, None);
        t["category"] = body["category"].clone();
        t
    };
    ticket["description"] = body["description"].clone();
    ticket["priority"] = body["priority"].clone();
    inner.tickets.insert(0, ticket.clone());
    reply(200, ticket)
}

fn find_ticket(inner: &Inner, id: i64) -> Option<Value> {
    inner.tickets.iter().find(|t| t["id"] == json!(id)).cloned()
}

fn not_found() -> Reply {
    reply(404, json!({"detail": "Ticket not found"}))
}

async fn get_ticket(
    State(state): State<Arc<Mutex<Inner>>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Reply {
    let mut inner = state.lock().unwrap();
    if let Some(forced) = enter(&mut inner, format!("GET /api/v1/tickets/{}", id)) {
        return forced;
    }
    if caller(&inner, &headers).is_none() {
        return unauthorized();
    }
    match find_ticket(&inner, id) {
        Some(ticket) => reply(200, ticket),
        None => not_found(),
    }
}

async fn generate(
    State(state): State<Arc<Mutex<Inner>>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Reply {
    let delay = {
        let mut inner = state.lock().unwrap();
        if let Some(forced) = enter(
            &mut inner,
            format!("POST /api/v1/tickets/{}/generate-response", id),
        ) {
            return forced;
        }
        let Some(user) = caller(&inner, &headers) else {
            return unauthorized();
        };
        if user["role"] != json!("agent") && user["role"] != json!("admin") {
            return reply(403, json!({"detail": "Not enough permissions"}));
        }
        if find_ticket(&inner, id).is_none() {
            return not_found();
        }
        inner.generate_delay.get(&id).copied()
    };

    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    let body = state.lock().unwrap().ai_response.clone();
    reply(200, body)
}

async fn similar(
    State(state): State<Arc<Mutex<Inner>>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Query(query): Query<HashMap<String, String>>,
) -> Reply {
    let mut inner = state.lock().unwrap();
    if let Some(forced) = enter(&mut inner, format!("GET /api/v1/tickets/{}/similar", id)) {
        return forced;
    }
    if caller(&inner, &headers).is_none() {
        return unauthorized();
    }
    let limit: usize = query
        .get("limit")
        .and_then(|l| l.parse().ok())
        .unwrap_or(5);
    let similar: Vec<Value> = inner
        .tickets
        .iter()
        .filter(|t| t["id"] != json!(id))
        .take(limit)
        .map(|t| {
            json!({
                "ticket_id": t["id"],
                "title": t["title"],
                "description": t["description"],
                "status": t["status"],
                "similarity": 0.72
            })
        })
        .collect();
    reply(200, json!({"ticket_id": id, "similar_tickets": similar}))
}

async fn add_response(
    State(state): State<Arc<Mutex<Inner>>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Query(query): Query<HashMap<String, String>>,
) -> Reply {
    let mut inner = state.lock().unwrap();
    if let Some(forced) = enter(&mut inner, format!("POST /api/v1/tickets/{}/responses", id)) {
        return forced;
    }
    if caller(&inner, &headers).is_none() {
        return unauthorized();
    }
    if !query.contains_key("response_content") {
        return reply(
            422,
            json!({"detail": [{"loc": ["query", "response_content"], "msg": "field required"}]}),
        );
    }
    reply(
        200,
        json!({"message": "Response added successfully", "response_id": 501}),
    )
}

async fn stats(State(state): State<Arc<Mutex<Inner>>>, headers: HeaderMap) -> Reply {
    let mut inner = state.lock().unwrap();
    if let Some(forced) = enter(&mut inner, "GET /api/v1/admin/stats".into()) {
        return forced;
    }
    match caller(&inner, &headers) {
        Some(user) if user["role"] == json!("admin") => reply(
            200,
            json!({
                "total_tickets": inner.tickets.len(),
                "open_tickets": inner.tickets.len(),
                "resolved_tickets": 0,
                "total_users": inner.users.len(),
                "total_knowledge_items": inner.knowledge.len()
            }),
        ),
        Some(_) => reply(403, json!({"detail": "Not enough permissions"})),
        None => unauthorized(),
    }
}

/// 401 without a valid token, 403 for anyone but an admin.
fn require_admin(inner: &Inner, headers: &HeaderMap) -> Result<Value, Reply> {
    match caller(inner, headers) {
        Some(user) if user["role"] == json!("admin") => Ok(user),
        Some(_) => Err(reply(403, json!({"detail": "Admin access required"}))),
        None => Err(unauthorized()),
    }
}

async fn admin_users(
    State(state): State<Arc<Mutex<Inner>>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Reply {
    let mut inner = state.lock().unwrap();
    if let Some(forced) = enter(&mut inner, "GET /api/v1/admin/users".into()) {
        return forced;
    }
    if let Err(denied) = require_admin(&inner, &headers) {
        return denied;
    }
    let number = |key: &str, default: usize| {
        query
            .get(key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    };
    let users: Vec<Value> = inner
        .users
        .iter()
        .skip(number("skip", 0))
        .take(number("limit", 100))
        .map(|(_, user)| user.clone())
        .collect();
    reply(200, Value::Array(users))
}

async fn add_knowledge(
    State(state): State<Arc<Mutex<Inner>>>,
    headers: HeaderMap,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Reply {
    let mut inner = state.lock().unwrap();
    if let Some(forced) = enter(&mut inner, "POST /api/v1/admin/knowledge-base".into()) {
        return forced;
    }
    if let Err(denied) = require_admin(&inner, &headers) {
        return denied;
    }
    inner.knowledge_queries.push(pairs.clone());

    let field = |key: &str| {
        pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    };
    let (Some(title), Some(content)) = (field("title"), field("content")) else {
        return reply(
            422,
            json!({"detail": [{"loc": ["query", "title"], "msg": "field required"}]}),
        );
    };
    let tags: Vec<String> = pairs
        .iter()
        .filter(|(k, _)| k == "tags")
        .map(|(_, v)| v.clone())
        .collect();

    let id = inner.next_kb_id;
    inner.next_kb_id += 1;
    inner.knowledge.push(json!({
        "id": id,
        "title": title,
        "content": content,
        "category": field("category"),
        "tags": tags
    }));
    reply(
        200,
        json!({"message": "Knowledge base item added successfully", "id": id}),
    )
}

async fn delete_knowledge(
    State(state): State<Arc<Mutex<Inner>>>,
    headers: HeaderMap,
    Path(kb_id): Path<i64>,
) -> Reply {
    let mut inner = state.lock().unwrap();
    if let Some(forced) = enter(
        &mut inner,
        format!("DELETE /api/v1/admin/knowledge-base/{}", kb_id),
    ) {
        return forced;
    }
    if let Err(denied) = require_admin(&inner, &headers) {
        return denied;
    }
    let before = inner.knowledge.len();
    inner.knowledge.retain(|item| item["id"] != json!(kb_id));
    if inner.knowledge.len() == before {
        return reply(404, json!({"detail": "Knowledge base item not found"}));
    }
    reply(200, json!({"message": "Knowledge base item deleted successfully"}))
}

async fn assign_ticket(
    State(state): State<Arc<Mutex<Inner>>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Reply {
    let mut inner = state.lock().unwrap();
    if let Some(forced) = enter(&mut inner, "POST /api/v1/admin/assign-ticket".into()) {
        return forced;
    }
    if let Err(denied) = require_admin(&inner, &headers) {
        return denied;
    }
    let id = |key: &str| query.get(key).and_then(|v| v.parse::<i64>().ok());
    let (Some(ticket_id), Some(agent_id)) = (id("ticket_id"), id("agent_id")) else {
        return reply(
            422,
            json!({"detail": [{"loc": ["query", "ticket_id"], "msg": "field required"}]}),
        );
    };
    if find_ticket(&inner, ticket_id).is_none() {
        return not_found();
    }
    let is_agent = inner
        .users
        .iter()
        .any(|(_, user)| user["id"] == json!(agent_id) && user["role"] == json!("agent"));
    if !is_agent {
        return reply(400, json!({"detail": "Invalid agent"}));
    }
    if let Some(ticket) = inner.tickets.iter_mut().find(|t| t["id"] == json!(ticket_id)) {
        ticket["assigned_agent_id"] = json!(agent_id);
    }
    reply(200, json!({"message": "Ticket assigned successfully"}))
}
