// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use madang_app::forms::validate_sale_price;
use madang_app::{
    Book, BookFormInput, BookId, BookStats, Customer, CustomerFormInput, CustomerId, ListPayload,
    ListQuery, ListSource, OrderFormInput, OrderId, OrderStats, OverviewStats,
};
use reqwest::blocking::Client as HttpClient;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;
use url::Url;

/// Why a request did not produce data. Reaches callers as the root cause
/// of an `anyhow::Error`; use `downcast_ref` to branch on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    Transport { base_url: String, message: String },
    Status { status: u16, message: String },
    /// The server answered with `success: false`.
    Application(String),
    Decode(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport { base_url, message } => write!(
                f,
                "cannot reach {base_url} -- start the madang server or fix [api] base_url ({message})"
            ),
            Self::Status { status, message } if message.is_empty() => {
                write!(f, "server returned {status}")
            }
            Self::Status { status, message } => write!(f, "server error ({status}): {message}"),
            Self::Application(message) => write!(f, "request rejected: {message}"),
            Self::Decode(message) => write!(f, "unexpected response: {message}"),
        }
    }
}

impl std::error::Error for ApiError {}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub customer: Customer,
    #[serde(default)]
    pub session_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub version: String,
}

impl HealthStatus {
    pub fn is_up(&self) -> bool {
        self.status.eq_ignore_ascii_case("up")
    }
}

#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            bail!("api.base_url must not be empty");
        }
        Url::parse(&base_url)
            .with_context(|| format!("api.base_url {base_url:?} is not a valid URL"))?;

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Sends one request and unwraps the `{ success, data, error }`
    /// envelope. Returns the `data` member, `None` when it is absent or null.
    pub fn fetch<K, V>(
        &self,
        method: Method,
        path: &str,
        params: &[(K, V)],
        body: Option<&Value>,
    ) -> Result<Option<Value>>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let url = self.url(path, params)?;
        tracing::debug!(%method, %url, "api request");

        let mut request = self.http.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;

        let status = response.status();
        let text = response
            .text()
            .map_err(|error| connection_error(&self.base_url, error))?;
        if !status.is_success() {
            return Err(clean_error_response(status, &text).into());
        }

        let envelope: Envelope = serde_json::from_str(&text)
            .map_err(|error| ApiError::Decode(format!("decode response envelope: {error}")))?;
        if !envelope.success {
            let message = envelope
                .error
                .filter(|message| !message.trim().is_empty())
                .unwrap_or_else(|| "the server could not process the request".to_owned());
            return Err(ApiError::Application(message).into());
        }
        Ok(envelope.data.filter(|data| !data.is_null()))
    }

    /// One page of a list endpoint. Missing data is an empty legacy list.
    pub fn list<R: DeserializeOwned>(&self, query: &ListQuery) -> Result<ListPayload<R>> {
        let data = self.fetch(
            Method::GET,
            query.kind.endpoint(),
            query.params(),
            None,
        )?;
        let payload = ListPayload::from_value(data.unwrap_or(Value::Null))
            .map_err(|error| ApiError::Decode(format!("{error:#}")))?;
        Ok(payload)
    }

    pub fn publishers(&self) -> Result<Vec<String>> {
        let data = self.get("/api/books", &[("action", "publishers")])?;
        decode(data, "publisher list")
    }

    pub fn book_detail(&self, id: BookId) -> Result<Book> {
        let id = id.to_string();
        let data = self.get("/api/books", &[("action", "detail"), ("id", id.as_str())])?;
        decode(data, "book detail")
    }

    pub fn book_stats(&self, id: BookId) -> Result<BookStats> {
        let id = id.to_string();
        let data = self.get("/api/books", &[("action", "stats"), ("id", id.as_str())])?;
        decode(data, "book stats")
    }

    pub fn create_book(&self, input: &BookFormInput) -> Result<Book> {
        input.validate()?;
        let body = to_body(input)?;
        let data = self.fetch(Method::POST, "/api/books", &[("action", "create")], Some(&body))?;
        decode(data, "created book")
    }

    pub fn update_book(&self, id: BookId, input: &BookFormInput) -> Result<Book> {
        input.validate()?;
        let body = with_id(to_body(input)?, "bookid", id.get());
        let data = self.fetch(Method::PUT, "/api/books", &[("action", "update")], Some(&body))?;
        decode(data, "updated book")
    }

    pub fn delete_book(&self, id: BookId) -> Result<()> {
        let id = id.to_string();
        self.fetch(
            Method::DELETE,
            "/api/books",
            &[("action", "delete"), ("id", id.as_str())],
            None,
        )?;
        Ok(())
    }

    pub fn customer_detail(&self, id: CustomerId) -> Result<Customer> {
        let id = id.to_string();
        let data = self.get("/api/customers", &[("action", "detail"), ("id", id.as_str())])?;
        decode(data, "customer detail")
    }

    pub fn login(&self, id: CustomerId) -> Result<LoginResponse> {
        let body = json!({ "custid": id.get() });
        let data = self.fetch(
            Method::POST,
            "/api/customers",
            &[("action", "login")],
            Some(&body),
        )?;
        decode(data, "login")
    }

    pub fn create_customer(&self, input: &CustomerFormInput) -> Result<Customer> {
        input.validate()?;
        let body = to_body(input)?;
        let data = self.fetch(
            Method::POST,
            "/api/customers",
            &[("action", "create")],
            Some(&body),
        )?;
        decode(data, "created customer")
    }

    pub fn update_customer(&self, id: CustomerId, input: &CustomerFormInput) -> Result<Customer> {
        input.validate()?;
        let body = with_id(to_body(input)?, "custid", id.get());
        let data = self.fetch(
            Method::PUT,
            "/api/customers",
            &[("action", "update")],
            Some(&body),
        )?;
        decode(data, "updated customer")
    }

    pub fn delete_customer(&self, id: CustomerId) -> Result<()> {
        let id = id.to_string();
        self.fetch(
            Method::DELETE,
            "/api/customers",
            &[("action", "delete"), ("id", id.as_str())],
            None,
        )?;
        Ok(())
    }

    pub fn create_order(&self, input: &OrderFormInput) -> Result<OrderId> {
        input.validate()?;
        let body = to_body(input)?;
        let data = self.fetch(Method::POST, "/api/orders", &[("action", "create")], Some(&body))?;
        let created: CreatedOrder = decode(data, "created order")?;
        Ok(created.orderid)
    }

    /// Changes what the customer paid. `list_price` caps the new price when
    /// known.
    pub fn update_order_price(
        &self,
        order: OrderId,
        customer: CustomerId,
        saleprice: i64,
        list_price: Option<i64>,
    ) -> Result<()> {
        validate_sale_price(saleprice, list_price)?;
        let body = json!({
            "orderid": order.get(),
            "custid": customer.get(),
            "saleprice": saleprice,
        });
        self.fetch(Method::PUT, "/api/orders", &[("action", "update")], Some(&body))?;
        Ok(())
    }

    pub fn delete_order(&self, order: OrderId, customer: CustomerId) -> Result<()> {
        let order = order.to_string();
        let customer = customer.to_string();
        self.fetch(
            Method::DELETE,
            "/api/orders",
            &[
                ("action", "delete"),
                ("id", order.as_str()),
                ("custid", customer.as_str()),
            ],
            None,
        )?;
        Ok(())
    }

    pub fn order_stats(&self, customer: CustomerId) -> Result<OrderStats> {
        let customer = customer.to_string();
        let data = self.get(
            "/api/orders",
            &[("action", "stats"), ("custid", customer.as_str())],
        )?;
        decode(data, "order stats")
    }

    pub fn overview(&self) -> Result<OverviewStats> {
        let data = self.get("/api/stats", &[("action", "overview")])?;
        decode(data, "overview stats")
    }

    pub fn health(&self) -> Result<HealthStatus> {
        let data = self.get("/api/health", &[] as &[(&str, &str)])?;
        decode(data, "health status")
    }

    fn get<K, V>(&self, path: &str, params: &[(K, V)]) -> Result<Option<Value>>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.fetch(Method::GET, path, params, None)
    }

    fn url<K, V>(&self, path: &str, params: &[(K, V)]) -> Result<Url>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut url = Url::parse(&format!("{}{path}", self.base_url))
            .with_context(|| format!("build URL for {path}"))?;
        if !params.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(params.iter().map(|(key, value)| -> (&str, &str) {
                    (key.as_ref(), value.as_ref())
                }));
        }
        Ok(url)
    }
}

impl<R: DeserializeOwned> ListSource<R> for Client {
    fn fetch_list(&mut self, query: &ListQuery) -> Result<ListPayload<R>> {
        self.list(query)
    }
}

fn decode<T: DeserializeOwned>(data: Option<Value>, what: &str) -> Result<T> {
    let Some(data) = data else {
        return Err(ApiError::Decode(format!("{what} response has no data")).into());
    };
    serde_json::from_value(data)
        .map_err(|error| ApiError::Decode(format!("decode {what}: {error}")).into())
}

fn to_body<T: Serialize>(input: &T) -> Result<Value> {
    serde_json::to_value(input).context("encode request body")
}

fn with_id(mut body: Value, key: &str, id: i64) -> Value {
    if let Value::Object(fields) = &mut body {
        fields.insert(key.to_owned(), json!(id));
    }
    body
}

fn connection_error(base_url: &str, error: reqwest::Error) -> anyhow::Error {
    ApiError::Transport {
        base_url: base_url.to_owned(),
        message: error.to_string(),
    }
    .into()
}

fn clean_error_response(status: StatusCode, body: &str) -> ApiError {
    if let Ok(parsed) = serde_json::from_str::<Envelope>(body)
        && let Some(message) = parsed.error
        && !message.is_empty()
    {
        return ApiError::Status {
            status: status.as_u16(),
            message,
        };
    }

    let trimmed = body.trim();
    let message = if trimmed.len() < 100 && !trimmed.contains('{') && !trimmed.contains('<') {
        trimmed.to_owned()
    } else {
        String::new()
    };
    ApiError::Status {
        status: status.as_u16(),
        message,
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreatedOrder {
    orderid: OrderId,
}
