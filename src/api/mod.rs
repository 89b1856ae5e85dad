//! HTTP client for the rental API gateway.
//!
//! ARCHITECTURE
//! ============
//! Every request is built through `ApiClient::request`, which attaches
//! `Authorization: Bearer <token>` when the shared store holds a session and
//! nothing otherwise. Responses pass through `ApiClient::execute`, the single
//! place gateway rejections become `ClientError`s.
//!
//! ERROR HANDLING
//! ==============
//! A 401 on a request that carried a token means the gateway no longer
//! accepts the session: the store is cleared before the error is returned,
//! unless a newer session has replaced the one the request carried.
//! Credential exchanges (`/auth/login`, `/auth/register`) report the 401
//! without touching the store. Nothing is retried.

pub mod types;

use std::sync::Arc;

use reqwest::header::AUTHORIZATION;
use reqwest::multipart::Form;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::Config;
use crate::error::ClientError;
use crate::session::SessionStore;
use types::{BookingRequest, Car, CarInput, ErrorBody, LoginRequest, LoginResponse, RegisterRequest};

/// What a 401 means for the request that received it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OnUnauthorized {
    /// Token rejected: implicit logout.
    Logout,
    /// Credentials rejected: report only.
    Report,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    store: Arc<SessionStore>,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns [`ClientError::HttpClientBuild`] if the HTTP client cannot be
    /// constructed.
    pub fn new(config: &Config, store: Arc<SessionStore>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeouts.request())
            .connect_timeout(config.timeouts.connect())
            .build()
            .map_err(|error| ClientError::HttpClientBuild(error.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            store,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =========================================================================
    // AUTH
    // =========================================================================

    /// `POST /auth/login`
    ///
    /// # Errors
    ///
    /// [`ClientError::Authentication`] on rejected credentials,
    /// [`ClientError::Network`] if the gateway is unreachable.
    pub async fn login(&self, body: &LoginRequest) -> Result<LoginResponse, ClientError> {
        let request = self.request(Method::POST, "/auth/login").json(body);
        let response = self.execute(request, OnUnauthorized::Report).await?;
        read_json(response).await
    }

    /// `POST /auth/register`
    ///
    /// # Errors
    ///
    /// [`ClientError::Api`] with the gateway's message on rejection.
    pub async fn register(&self, body: &RegisterRequest) -> Result<(), ClientError> {
        let request = self.request(Method::POST, "/auth/register").json(body);
        self.execute(request, OnUnauthorized::Report).await?;
        Ok(())
    }

    // =========================================================================
    // CARS
    // =========================================================================

    /// `GET /cars`
    ///
    /// # Errors
    ///
    /// Any gateway or transport failure.
    pub async fn list_cars(&self) -> Result<Vec<Car>, ClientError> {
        let request = self.request(Method::GET, "/cars");
        let response = self.execute(request, OnUnauthorized::Logout).await?;
        read_json(response).await
    }

    /// `POST /cars` (admin)
    ///
    /// # Errors
    ///
    /// Any gateway or transport failure.
    pub async fn create_car(&self, input: &CarInput) -> Result<Car, ClientError> {
        let request = self.request(Method::POST, "/cars").multipart(car_form(input));
        let response = self.execute(request, OnUnauthorized::Logout).await?;
        read_json(response).await
    }

    /// `PUT /cars/:id` (admin)
    ///
    /// # Errors
    ///
    /// Any gateway or transport failure.
    pub async fn update_car(&self, id: &str, input: &CarInput) -> Result<Value, ClientError> {
        let path = format!("/cars/{id}");
        let request = self.request(Method::PUT, &path).multipart(car_form(input));
        let response = self.execute(request, OnUnauthorized::Logout).await?;
        read_json_or_null(response).await
    }

    /// `DELETE /cars/:id` (admin)
    ///
    /// # Errors
    ///
    /// Any gateway or transport failure.
    pub async fn delete_car(&self, id: &str) -> Result<Value, ClientError> {
        let path = format!("/cars/{id}");
        let request = self.request(Method::DELETE, &path);
        let response = self.execute(request, OnUnauthorized::Logout).await?;
        read_json_or_null(response).await
    }

    /// `POST /cars/book`
    ///
    /// # Errors
    ///
    /// Any gateway or transport failure.
    pub async fn book(&self, body: &BookingRequest) -> Result<Value, ClientError> {
        let request = self.request(Method::POST, "/cars/book").json(body);
        let response = self.execute(request, OnUnauthorized::Logout).await?;
        read_json_or_null(response).await
    }

    // =========================================================================
    // PLUMBING
    // =========================================================================

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Start a request, attaching the bearer token iff a session exists.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request = self.http.request(method, self.url(path));
        match self.store.token() {
            Some(token) => request.header(AUTHORIZATION, format!("Bearer {token}")),
            None => request,
        }
    }

    async fn execute(
        &self,
        request: RequestBuilder,
        on_unauthorized: OnUnauthorized,
    ) -> Result<Response, ClientError> {
        let (client, request) = request.build_split();
        let request = request?;
        let sent_token = request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(ToOwned::to_owned);
        let method = request.method().clone();
        let url = request.url().clone();

        let response = client.execute(request).await.map_err(|error| {
            tracing::warn!(%method, %url, %error, "gateway unreachable");
            ClientError::Network(error)
        })?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(%method, %url, status = status.as_u16(), "gateway ok");
            return Ok(response);
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(ErrorBody::into_message)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_owned());

        if status == StatusCode::UNAUTHORIZED {
            if let (Some(token), OnUnauthorized::Logout) = (&sent_token, on_unauthorized) {
                match self.store.clear_if_token(token) {
                    Ok(true) => tracing::info!(%method, %url, "session token rejected; logging out"),
                    Ok(false) => tracing::debug!(%method, %url, "stale token rejected; session already replaced"),
                    Err(error) => {
                        tracing::warn!(%method, %url, %error, "token rejected; persisted session not removed");
                    }
                }
            }
            return Err(ClientError::Authentication(message));
        }

        tracing::debug!(%method, %url, status = status.as_u16(), %message, "gateway rejected request");
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

fn car_form(input: &CarInput) -> Form {
    Form::new()
        .text("name", input.name.clone())
        .text("type", input.car_type.clone())
        .text("price", input.price.to_string())
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|error| ClientError::InvalidResponse(error.to_string()))
}

async fn read_json_or_null(response: Response) -> Result<Value, ClientError> {
    let bytes = response.bytes().await?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(&bytes).map_err(|error| ClientError::InvalidResponse(error.to_string()))
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
