//! In-process GraphQL backend serving the fixture catalog.
//!
//! Answers the storefront's queries by operation name, records every request
//! it receives and can be told to fail the way a real backend does.

use std::sync::{Arc, Mutex, PoisonError};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use cornershop_core::{Price, Product, ProductId};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use url::Url;

use crate::fixtures;

/// One request as the backend saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub operation_name: String,
    pub variables: Value,
    pub admin_secret: Option<String>,
}

/// Ways the backend can be made to fail.
#[derive(Debug, Clone)]
pub enum Failure {
    /// 200 with a GraphQL `errors` array.
    GraphQL(String),
    /// 429 with a `Retry-After` header.
    RateLimited(u64),
    /// Any other HTTP status.
    Status(u16),
    /// 200 with a body that is not JSON.
    Garbage,
}

#[derive(Default)]
struct FakeState {
    requests: Vec<RecordedRequest>,
    failure: Option<Failure>,
}

/// Handle on a running fake backend.
#[derive(Clone, Default)]
pub struct FakeCatalog {
    state: Arc<Mutex<FakeState>>,
}

impl FakeCatalog {
    /// Serve the fixture catalog on a random local port.
    ///
    /// Returns the handle and the GraphQL endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns an error if no local port can be bound.
    pub async fn spawn() -> std::io::Result<(Self, Url)> {
        let fake = Self::default();
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let app = Router::new()
            .route("/v1/graphql", post(graphql))
            .with_state(fake.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let url = Url::parse(&format!("http://{addr}/v1/graphql")).map_err(std::io::Error::other)?;
        Ok((fake, url))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fail every following request until [`recover`](Self::recover).
    pub fn fail_with(&self, failure: Failure) {
        self.lock().failure = Some(failure);
    }

    /// Answer normally again.
    pub fn recover(&self) {
        self.lock().failure = None;
    }

    /// Every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    /// Operation names of every request received so far.
    #[must_use]
    pub fn operations(&self) -> Vec<String> {
        self.lock()
            .requests
            .iter()
            .map(|r| r.operation_name.clone())
            .collect()
    }

    /// Number of requests received so far.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }
}

async fn graphql(
    State(fake): State<FakeCatalog>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let operation_name = body
        .get("operationName")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let variables = body.get("variables").cloned().unwrap_or(Value::Null);
    let admin_secret = headers
        .get("x-hasura-admin-secret")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let failure = {
        let mut state = fake.lock();
        state.requests.push(RecordedRequest {
            operation_name: operation_name.clone(),
            variables: variables.clone(),
            admin_secret,
        });
        state.failure.clone()
    };

    if let Some(failure) = failure {
        return match failure {
            Failure::GraphQL(message) => {
                Json(json!({ "data": null, "errors": [{ "message": message }] })).into_response()
            }
            Failure::RateLimited(seconds) => (
                StatusCode::TOO_MANY_REQUESTS,
                [("retry-after", seconds.to_string())],
                "rate limited",
            )
                .into_response(),
            Failure::Status(code) => (
                StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                "backend unavailable",
            )
                .into_response(),
            Failure::Garbage => (StatusCode::OK, "<html>not json</html>").into_response(),
        };
    }

    match resolve(&operation_name, &variables) {
        Some(data) => Json(json!({ "data": data })).into_response(),
        None => Json(json!({
            "errors": [{ "message": format!("cannot answer operation `{operation_name}`") }]
        }))
        .into_response(),
    }
}

fn string_var<'a>(variables: &'a Value, name: &str) -> Option<&'a str> {
    variables.get(name).and_then(Value::as_str)
}

fn price_var(variables: &Value, name: &str) -> Option<Price> {
    serde_json::from_value(variables.get(name)?.clone()).ok()
}

fn in_category(products: Vec<Product>, variables: &Value) -> Option<Vec<Product>> {
    let category = string_var(variables, "category")?;
    Some(
        products
            .into_iter()
            .filter(|p| p.category.name == category)
            .collect(),
    )
}

fn sorted(mut products: Vec<Product>, variables: &Value) -> Option<Vec<Product>> {
    match string_var(variables, "sortBy")? {
        "asc" => products.sort_by_key(|p| p.price),
        "desc" => products.sort_by_key(|p| std::cmp::Reverse(p.price)),
        _ => return None,
    }
    Some(products)
}

fn resolve(operation: &str, variables: &Value) -> Option<Value> {
    let products = fixtures::products();
    let selected = match operation {
        "GetProductCategories" => return Some(json!({ "category": fixtures::categories() })),
        "GetProductsDefault" => products,
        "GetProductsSorted" => sorted(products, variables)?,
        "GetProductsByCategory" => in_category(products, variables)?,
        "GetProducts" => sorted(in_category(products, variables)?, variables)?,
        "GetSuggestedProducts" => {
            let limit = variables.get("limit").and_then(Value::as_u64)?;
            products
                .into_iter()
                .take(usize::try_from(limit).unwrap_or(usize::MAX))
                .collect()
        }
        "GetProductsByPrice" => {
            let from = price_var(variables, "priceFrom")?;
            let to = price_var(variables, "priceTo")?;
            products
                .into_iter()
                .filter(|p| p.price >= from && p.price <= to)
                .collect()
        }
        "SearchProducts" => {
            let needle = string_var(variables, "searchInput")?
                .trim_matches('%')
                .to_lowercase();
            products
                .into_iter()
                .filter(|p| p.name.to_lowercase().contains(&needle))
                .collect()
        }
        "GetProductById" => {
            let id = ProductId::new(variables.get("id").and_then(Value::as_i64)?);
            products.into_iter().filter(|p| p.id == id).collect()
        }
        "GetFilteredProducts" => {
            let names: Vec<String> = serde_json::from_value(variables.get("filter")?.clone()).ok()?;
            products
                .into_iter()
                .filter(|p| names.contains(&p.subcategory.name))
                .collect()
        }
        _ => return None,
    };
    Some(json!({ "product": selected }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_unknown_operation() {
        assert!(resolve("DeleteEverything", &Value::Null).is_none());
    }

    #[test]
    fn test_resolve_search_strips_wildcards() {
        let data = resolve("SearchProducts", &json!({ "searchInput": "%JEANS%" })).unwrap();
        let names: Vec<&str> = data["product"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|p| p["name"].as_str())
            .collect();
        assert_eq!(names, vec!["Designer Jeans"]);
    }
}
