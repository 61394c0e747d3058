//! HTTP client for the school backend.
//!
//! All endpoints live under one bearer-authenticated base URL. A 401 from
//! any of them drops the stored tokens and profile, signing the session
//! out, before the error reaches the caller. List endpoints with server-side
//! pagination (`/classes`, `/teachers`) are walked to completion through
//! [`collect_paged`]; the smaller catalogs are single requests.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use crate::api::pagination::{collect_paged, ListResponse, PageFetch, PageQuery};
use crate::config::UstazConfig;
use crate::error::{ApiError, ApiResult};
use crate::session::Session;

/// Token response of the login, register, and refresh endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Registration form. `role` falls back to `teacher` on the wire.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

pub struct ApiClient {
    base_url: String,
    http: Client,
    session: Session,
}

impl ApiClient {
    pub fn new(config: &UstazConfig, session: Session) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            base_url: config.api_base_url.clone(),
            http,
            session,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    // ---- auth ----

    pub async fn login(&self, email: &str, password: &str) -> ApiResult<TokenPair> {
        let body = json!({ "email": email, "password": password });
        let value = self.post_json("/auth/login", &body).await?;
        let tokens = decode_tokens(value)?;
        self.remember(&tokens)?;
        Ok(tokens)
    }

    pub async fn register(&self, form: &RegisterRequest) -> ApiResult<TokenPair> {
        let payload = register_payload(form)?;
        let value = self.post_json("/auth/register", &payload).await?;
        let tokens = decode_tokens(value)?;
        self.remember(&tokens)?;
        Ok(tokens)
    }

    /// Trades the stored refresh token for a fresh pair.
    pub async fn refresh_token(&self) -> ApiResult<TokenPair> {
        let refresh = self
            .session
            .refresh_token()
            .ok_or(ApiError::MissingRefreshToken)?;
        let body = json!({ "refresh_token": refresh });
        let value = self.post_json("/auth/refresh-token", &body).await?;
        let tokens = decode_tokens(value)?;
        self.remember(&tokens)?;
        Ok(tokens)
    }

    /// Best-effort server logout. Local tokens are dropped either way.
    pub async fn logout(&self) -> ApiResult<()> {
        if let Err(err) = self.post_empty("/auth/logout").await {
            warn!(target: "ustaz::api", "logout request failed: {err}");
        }
        self.session.clear_tokens()?;
        Ok(())
    }

    fn remember(&self, tokens: &TokenPair) -> ApiResult<()> {
        self.session.set_access_token(&tokens.access_token)?;
        if let Some(refresh) = &tokens.refresh_token {
            self.session.set_refresh_token(refresh)?;
        }
        Ok(())
    }

    // ---- catalogs ----

    /// Every class, following server pagination to the declared total.
    pub async fn classes(&self, school_id: Option<&str>) -> ApiResult<Vec<Value>> {
        let pages = ResourcePages {
            client: self,
            path: "/classes",
            scope: school_id.map(|id| ("school_id", id)),
        };
        collect_paged(&pages, "classes").await
    }

    /// Every teacher, following server pagination to the declared total.
    pub async fn teachers(&self, school_id: Option<&str>) -> ApiResult<Vec<Value>> {
        let pages = ResourcePages {
            client: self,
            path: "/teachers",
            scope: school_id.map(|id| ("school_id", id)),
        };
        collect_paged(&pages, "teachers").await
    }

    pub async fn schools(&self) -> ApiResult<Vec<Value>> {
        self.list("/schools", &[]).await
    }

    pub async fn subjects(&self) -> ApiResult<Vec<Value>> {
        self.list("/subjects", &[]).await
    }

    pub async fn students(&self, class_id: Option<&str>) -> ApiResult<Vec<Value>> {
        let query = scope_query("class_id", class_id);
        self.list("/students", &query).await
    }

    pub async fn school(&self, id: &str) -> ApiResult<Value> {
        self.get_json(&format!("/schools/{id}"), &[]).await
    }

    pub async fn class_by_id(&self, id: &str) -> ApiResult<Value> {
        self.get_json(&format!("/classes/{id}"), &[]).await
    }

    pub async fn teacher(&self, id: &str) -> ApiResult<Value> {
        self.get_json(&format!("/teachers/{id}"), &[]).await
    }

    pub async fn student(&self, id: &str) -> ApiResult<Value> {
        self.get_json(&format!("/students/{id}"), &[]).await
    }

    // ---- teacher records ----

    pub async fn documents(&self) -> ApiResult<Value> {
        self.get_json("/documents", &[]).await
    }

    pub async fn document(&self, id: &str) -> ApiResult<Value> {
        self.get_json(&format!("/documents/{id}"), &[]).await
    }

    pub async fn create_document(&self, document: &Value) -> ApiResult<Value> {
        self.post_json("/documents", document).await
    }

    pub async fn grades(&self, student_id: Option<&str>) -> ApiResult<Value> {
        let query = scope_query("student_id", student_id);
        self.get_json("/grades", &query).await
    }

    pub async fn create_grade(&self, grade: &Value) -> ApiResult<Value> {
        self.post_json("/grades", grade).await
    }

    pub async fn homework(&self, class_id: Option<&str>) -> ApiResult<Value> {
        let query = scope_query("class_id", class_id);
        self.get_json("/homework", &query).await
    }

    pub async fn create_homework(&self, homework: &Value) -> ApiResult<Value> {
        self.post_json("/homework", homework).await
    }

    pub async fn attendance(&self, class_id: Option<&str>) -> ApiResult<Value> {
        let query = scope_query("class_id", class_id);
        self.get_json("/attendance", &query).await
    }

    pub async fn create_attendance(&self, attendance: &Value) -> ApiResult<Value> {
        self.post_json("/attendance", attendance).await
    }

    // ---- service ----

    /// Liveness probe on the host, outside the API prefix. Never fails;
    /// transport trouble reads as `{"status": "error"}`.
    pub async fn health_check(&self) -> Value {
        let url = health_url(&self.base_url);
        match self.http.get(&url).send().await {
            Ok(response) => response
                .json()
                .await
                .unwrap_or_else(|_| json!({ "status": "error" })),
            Err(err) => {
                warn!(target: "ustaz::api", "health check failed: {err}");
                json!({ "status": "error" })
            }
        }
    }

    // ---- plumbing ----

    async fn list(&self, path: &str, query: &[(&str, String)]) -> ApiResult<Vec<Value>> {
        let value = self.get_json(path, query).await?;
        Ok(ListResponse::from_value(value)?.into_page().items)
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> ApiResult<Value> {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.http.get(&url);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        self.send(builder).await
    }

    async fn post_json(&self, path: &str, body: &Value) -> ApiResult<Value> {
        let url = format!("{}{}", self.base_url, path);
        self.send(self.http.post(&url).json(body)).await
    }

    async fn post_empty(&self, path: &str) -> ApiResult<Value> {
        let url = format!("{}{}", self.base_url, path);
        self.send(self.http.post(&url)).await
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> ApiResult<Value> {
        let builder = match self.session.access_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        };
        let response = builder.send().await.map_err(ApiError::Connectivity)?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            warn!(target: "ustaz::api", "401 from the backend, dropping the session");
            self.session.clear()?;
            return Err(ApiError::Unauthorized);
        }

        let body = response.text().await.map_err(ApiError::Connectivity)?;
        if !status.is_success() {
            return Err(ApiError::from_response(status.as_u16(), &body));
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// One paged resource bound to its scope parameter.
struct ResourcePages<'a> {
    client: &'a ApiClient,
    path: &'a str,
    scope: Option<(&'static str, &'a str)>,
}

#[async_trait]
impl PageFetch for ResourcePages<'_> {
    async fn fetch(&self, page: Option<PageQuery>) -> ApiResult<ListResponse> {
        let query = page_params(self.scope, page);
        let value = self.client.get_json(self.path, &query).await?;
        ListResponse::from_value(value)
    }
}

/// Scope plus paging parameters. The scope is repeated on every page
/// request of an aggregation.
fn page_params<'a>(
    scope: Option<(&'static str, &'a str)>,
    page: Option<PageQuery>,
) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if let Some((key, id)) = scope {
        query.push((key, id.to_string()));
    }
    if let Some(PageQuery { page, limit }) = page {
        query.push(("page", page.to_string()));
        query.push(("limit", limit.to_string()));
    }
    query
}

fn scope_query(key: &'static str, id: Option<&str>) -> Vec<(&'static str, String)> {
    match id {
        Some(id) => vec![(key, id.to_string())],
        None => Vec::new(),
    }
}

fn decode_tokens(value: Value) -> ApiResult<TokenPair> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

fn register_payload(form: &RegisterRequest) -> ApiResult<Value> {
    let mut payload = serde_json::to_value(form).map_err(|e| ApiError::Decode(e.to_string()))?;
    if payload.get("role").is_none() {
        payload["role"] = Value::String("teacher".to_string());
    }
    Ok(payload)
}

fn health_url(base_url: &str) -> String {
    format!("{}/health", base_url.replacen("/api/v1", "", 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_probe_sits_outside_the_api_prefix() {
        assert_eq!(
            health_url("https://backof.onrender.com/api/v1"),
            "https://backof.onrender.com/health"
        );
        assert_eq!(health_url("http://localhost:8000"), "http://localhost:8000/health");
    }

    #[test]
    fn registration_defaults_the_role() {
        let form = RegisterRequest {
            email: "aruzhan@mektep.kz".to_string(),
            password: "secret".to_string(),
            full_name: "Аружан С.".to_string(),
            phone: None,
            school_id: Some("15".to_string()),
            class_id: None,
            role: None,
        };
        let payload = register_payload(&form).unwrap();
        assert_eq!(payload["role"], "teacher");
        assert_eq!(payload["school_id"], "15");
        assert!(payload.get("phone").is_none(), "absent fields stay off the wire");

        let form = RegisterRequest {
            role: Some("admin".to_string()),
            ..form
        };
        let payload = register_payload(&form).unwrap();
        assert_eq!(payload["role"], "admin", "an explicit role is kept");
    }

    #[test]
    fn scope_is_repeated_on_page_requests() {
        let first = page_params(Some(("school_id", "15")), None);
        assert_eq!(first, vec![("school_id", "15".to_string())]);

        let later = page_params(
            Some(("school_id", "15")),
            Some(PageQuery { page: 3, limit: 100 }),
        );
        assert_eq!(
            later,
            vec![
                ("school_id", "15".to_string()),
                ("page", "3".to_string()),
                ("limit", "100".to_string()),
            ]
        );

        let unscoped = page_params(None, Some(PageQuery { page: 2, limit: 100 }));
        assert_eq!(
            unscoped,
            vec![("page", "2".to_string()), ("limit", "100".to_string())]
        );
    }
}
