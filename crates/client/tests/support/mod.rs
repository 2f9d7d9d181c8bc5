//! In-process fake of the inventory backend.
//!
//! Routes are canned responses keyed by method and path. Every request is
//! recorded so tests can assert what was (or was not) sent.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::Response;
use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header};
use parking_lot::Mutex;
use serde_json::{Value, json};

use inventario_client::{MemoryTokenStore, SessionManager};

#[derive(Clone)]
struct Canned {
    status: StatusCode,
    body: Vec<u8>,
    content_type: &'static str,
    headers: Vec<(&'static str, String)>,
    delay: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

impl Recorded {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("request body is not JSON")
    }
}

#[derive(Default)]
struct Backend {
    routes: Mutex<HashMap<(Method, String), Canned>>,
    log: Mutex<Vec<Recorded>>,
}

pub struct TestBackend {
    pub base_url: String,
    backend: Arc<Backend>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestBackend {
    pub async fn spawn() -> Self {
        let backend = Arc::new(Backend::default());
        let app = Router::new().fallback(handle).with_state(backend.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            backend,
            handle,
        }
    }

    fn put(&self, method: Method, path: &str, canned: Canned) {
        self.backend.routes.lock().insert((method, path.to_string()), canned);
    }

    /// Answer `method path` with a JSON body.
    pub fn json(&self, method: Method, path: &str, status: u16, body: Value) {
        self.put(
            method,
            path,
            Canned {
                status: StatusCode::from_u16(status).unwrap(),
                body: serde_json::to_vec(&body).unwrap(),
                content_type: "application/json",
                headers: Vec::new(),
                delay: None,
            },
        );
    }

    pub fn get(&self, path: &str, body: Value) {
        self.json(Method::GET, path, 200, body);
    }

    /// Answer with raw bytes and extra headers.
    pub fn bytes(&self, path: &str, content_type: &'static str, body: &[u8], headers: Vec<(&'static str, String)>) {
        self.put(
            Method::GET,
            path,
            Canned {
                status: StatusCode::OK,
                body: body.to_vec(),
                content_type,
                headers,
                delay: None,
            },
        );
    }

    /// Answer `GET path` only after `delay`.
    pub fn slow_get(&self, path: &str, delay: Duration, body: Value) {
        self.put(
            Method::GET,
            path,
            Canned {
                status: StatusCode::OK,
                body: serde_json::to_vec(&body).unwrap(),
                content_type: "application/json",
                headers: Vec::new(),
                delay: Some(delay),
            },
        );
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.backend.log.lock().clone()
    }

    pub fn hits(&self, method: Method, path: &str) -> usize {
        self.backend
            .log
            .lock()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    pub fn last(&self, method: Method, path: &str) -> Option<Recorded> {
        self.backend
            .log
            .lock()
            .iter()
            .rev()
            .find(|r| r.method == method && r.path == path)
            .cloned()
    }

    /// A session against this backend with the given persisted token.
    pub fn session(&self, persisted: Option<&str>) -> (Arc<SessionManager>, Arc<MemoryTokenStore>) {
        let store = Arc::new(match persisted {
            Some(token) => MemoryTokenStore::with_token(token),
            None => MemoryTokenStore::new(),
        });
        let session = SessionManager::with_client(self.base_url.clone(), reqwest::Client::new(), store.clone());
        (Arc::new(session), store)
    }

    /// A resolved session for `user` (a `/auth/me` body).
    pub async fn signed_in(&self, user: Value) -> (Arc<SessionManager>, Arc<MemoryTokenStore>) {
        self.get("/auth/me", user);
        let (session, store) = self.session(Some("opaque-test-token"));
        session.init().await;
        assert!(session.is_authenticated(), "fake /auth/me did not sign the session in");
        (session, store)
    }
}

impl Drop for TestBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn handle(
    State(backend): State<Arc<Backend>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header_str = |name: header::HeaderName| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string);

    backend.log.lock().push(Recorded {
        method: method.clone(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        authorization: header_str(header::AUTHORIZATION),
        content_type: header_str(header::CONTENT_TYPE),
        body: String::from_utf8_lossy(&body).into_owned(),
    });

    let canned = backend.routes.lock().get(&(method, uri.path().to_string())).cloned();
    let Some(canned) = canned else {
        return Response::builder()
            .status(StatusCode::NOT_FOUND)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"detail":"Not Found"}"#))
            .unwrap();
    };

    if let Some(delay) = canned.delay {
        tokio::time::sleep(delay).await;
    }

    let mut builder = Response::builder()
        .status(canned.status)
        .header(header::CONTENT_TYPE, canned.content_type);
    for (name, value) in &canned.headers {
        builder = builder.header(*name, value.as_str());
    }
    builder.body(Body::from(canned.body)).unwrap()
}

pub fn admin(id: i64) -> Value {
    json!({ "id": id, "nombre": "Admin", "email": "admin@example.com", "rol": "admin", "activo": true })
}

pub fn employee(id: i64) -> Value {
    json!({ "id": id, "nombre": "Empleado", "email": "emp@example.com", "rol": "empleado", "activo": true })
}

pub fn product(id: i64, activo: bool, fecha: Option<&str>) -> Value {
    json!({
        "id": id,
        "codigo": format!("P-{id:03}"),
        "nombre": format!("Producto {id}"),
        "descripcion": null,
        "precio_compra": 10.0,
        "precio_venta": 15.0,
        "fk_categoria": 1,
        "fk_proveedor": 1,
        "stock_minimo": 5,
        "activo": activo,
        "fecha_creacion": fecha,
    })
}

pub fn warehouse(id: i64) -> Value {
    json!({ "id": id, "nombre": format!("Almacén {id}"), "ubicacion": "Centro", "activo": true })
}

pub fn supplier(id: i64) -> Value {
    json!({ "id": id, "nombre": format!("Proveedor {id}"), "telefono": "555", "email": "p@example.com", "activo": true })
}

pub fn stock_entry(id: i64, producto: i64, almacen: i64) -> Value {
    json!({
        "id": id,
        "fk_producto": producto,
        "fk_almacen": almacen,
        "cantidad_disponible": 10,
        "cantidad_reservada": 0,
        "fecha_ultima_actualizacion": "01/02/2024 10:00:00",
    })
}

pub fn movement(id: i64, tipo: &str, usuario: i64, anterior: i64, nueva: i64, cantidad: i64) -> Value {
    json!({
        "id": id,
        "fk_producto": 1,
        "fk_almacen": 1,
        "tipo_movimiento": tipo,
        "cantidad": cantidad,
        "cantidad_anterior": anterior,
        "cantidad_nueva": nueva,
        "motivo": null,
        "fk_usuario": usuario,
        "fk_proveedor": null,
        "fecha_movimiento": "05/03/2024 09:30:00",
    })
}

/// HS256 token whose `exp` is `offset_secs` from now.
pub fn mint_jwt(sub: &str, offset_secs: i64) -> String {
    let claims = json!({ "sub": sub, "exp": Utc::now().timestamp() + offset_secs });
    jsonwebtoken::encode(&Header::default(), &claims, &EncodingKey::from_secret(b"test-secret"))
        .expect("failed to encode jwt")
}
