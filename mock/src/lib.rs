//! Canned MCP endpoint.
//!
//! Answers `POST /mcp` with fixed order/customer/product payloads so clients
//! can be exercised without a live backend. Unknown methods are echoed.

use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Map, Value};

pub const DEFAULT_ADDR: &str = "127.0.0.1:8069";
const DEFAULT_LIMIT: u64 = 20;
const DEFAULT_OFFSET: u64 = 0;

#[derive(Debug, Clone, Deserialize)]
pub struct McpRequest {
    #[serde(default)]
    pub method: Value,
    #[serde(default)]
    pub params: Value,
}

pub fn build_router() -> Router {
    Router::new().route("/mcp", post(mcp_handler))
}

async fn mcp_handler(Json(request): Json<McpRequest>) -> Json<Value> {
    tracing::debug!(method = %method_label(&request.method), "mcp request");
    let empty = Map::new();
    let params = request.params.as_object().unwrap_or(&empty);
    Json(respond(&request.method, params))
}

/// Canned response for an MCP method.
///
/// `method` is taken as sent; anything that is not a known name is echoed.
pub fn respond(method: &Value, params: &Map<String, Value>) -> Value {
    match method.as_str() {
        Some("orders.get") => {
            let mut response = json!({
                "orderId": param_or(params, "orderId", json!("SO001")),
                "status": "confirmed",
                "customerName": "Juan Perez",
                "totalAmount": 123.45,
                "createdAt": "2025-11-29T10:00:00Z",
            });
            if params.get("includeLines").is_some_and(is_truthy) {
                response["lines"] = json!([{
                    "productId": "P001",
                    "productName": "Producto 1",
                    "quantity": 2,
                    "price": 50.0,
                }]);
            }
            response
        }
        Some("customers.search") => json!({
            "customers": [{ "customerId": "C001", "customerName": "Juan Perez" }],
            "totalCount": 1,
            "limit": param_or(params, "limit", json!(DEFAULT_LIMIT)),
            "offset": param_or(params, "offset", json!(DEFAULT_OFFSET)),
        }),
        Some("products.search") => json!({
            "products": [{ "productId": "P001", "productName": "Producto 1", "price": 100.0 }],
            "totalCount": 1,
        }),
        Some("orders.list") => json!({
            "orders": [{ "orderId": "SO001", "status": "confirmed" }],
            "totalCount": 1,
            "limit": param_or(params, "limit", json!(DEFAULT_LIMIT)),
            "offset": param_or(params, "offset", json!(DEFAULT_OFFSET)),
        }),
        Some("customers.get") => json!({
            "customerId": "C001",
            "customerName": "Juan Perez",
            "email": "juan@example.com",
            "phone": "+54912345678",
        }),
        _ => json!({
            "ok": true,
            "message": format!("Método {} simulado", method_label(method)),
        }),
    }
}

/// Renders a method the way the echo message shows it: strings bare,
/// absent or null as `None`, anything else as JSON text.
fn method_label(method: &Value) -> String {
    match method {
        Value::Null => "None".to_string(),
        Value::String(name) => name.clone(),
        other => other.to_string(),
    }
}

fn param_or(params: &Map<String, Value>, key: &str, default: Value) -> Value {
    params.get(key).cloned().unwrap_or(default)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}
