//! Application controller tying session, router and gateway together.
//!
//! SYSTEM CONTEXT
//! ==============
//! Each view action first navigates to the view that owns it. If the router
//! lands somewhere else the action is abandoned and the caller gets
//! `ClientError::Redirected` naming the landing view; no request is sent.
//! Login and logout are the only operations that change the session, apart
//! from the gateway rejecting a token (handled in `api`).

use std::sync::Arc;

use serde_json::Value;

use crate::api::ApiClient;
use crate::api::types::Car;
use crate::config::Config;
use crate::error::ClientError;
use crate::forms::{BookingForm, CarForm, LoginForm, RegisterForm};
use crate::router::{AuthState, Navigation, Route, Router};
use crate::session::{FileBackend, Session, SessionStore};

#[derive(Debug, Clone)]
pub struct App {
    store: Arc<SessionStore>,
    api: ApiClient,
    router: Router,
}

impl App {
    /// Build an app over an existing store.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::HttpClientBuild`] if the HTTP client cannot be
    /// constructed.
    pub fn new(config: &Config, store: Arc<SessionStore>) -> Result<Self, ClientError> {
        let api = ApiClient::new(config, Arc::clone(&store))?;
        let router = Router::new(Arc::clone(&store));
        Ok(Self { store, api, router })
    }

    /// Build an app whose session persists at `config.session_file`.
    ///
    /// # Errors
    ///
    /// See [`App::new`].
    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        let store = SessionStore::open(FileBackend::new(&config.session_file));
        Self::new(config, Arc::new(store))
    }

    #[must_use]
    pub fn session(&self) -> Option<Session> {
        self.store.current()
    }

    #[must_use]
    pub fn state(&self) -> AuthState {
        self.router.state()
    }

    #[must_use]
    pub fn navigate(&self, path: &str) -> Navigation {
        self.router.navigate(path)
    }

    // =========================================================================
    // SESSION TRANSITIONS
    // =========================================================================

    /// Exchange credentials for a session and land on the role's home view.
    ///
    /// # Errors
    ///
    /// Validation, authentication and network failures leave the session
    /// untouched.
    pub async fn login(&self, email: &str, password: &str) -> Result<Navigation, ClientError> {
        let request = LoginForm {
            email: email.to_owned(),
            password: password.to_owned(),
        }
        .into_request()?;

        let response = self.api.login(&request).await.inspect_err(|error| {
            tracing::warn!(%error, "login failed");
        })?;

        let session = Session::new(response.token, response.role)
            .map_err(|_| ClientError::InvalidResponse("login response carried an empty token".into()))?;
        let role = session.role();
        self.store.save(session)?;
        tracing::info!(%role, "login succeeded");

        Ok(self.router.navigate_to(self.state().home()))
    }

    /// Drop the session and land on the login view.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Storage`] if the persisted copy cannot be removed.
    pub fn logout(&self) -> Result<Navigation, ClientError> {
        self.store.clear()?;
        tracing::info!("logged out");
        Ok(self.router.navigate_to(Route::Login))
    }

    /// Create an account. Does not log in.
    ///
    /// # Errors
    ///
    /// Validation failures or the gateway's rejection.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: &str,
    ) -> Result<(), ClientError> {
        self.enter(Route::Register)?;
        let request = RegisterForm {
            name: name.to_owned(),
            email: email.to_owned(),
            password: password.to_owned(),
            role: role.to_owned(),
        }
        .into_request()?;
        self.api.register(&request).await?;
        tracing::info!(role = %request.role, "registered");
        Ok(())
    }

    // =========================================================================
    // VIEW ACTIONS
    // =========================================================================

    /// Catalog view.
    ///
    /// # Errors
    ///
    /// Gateway or transport failures.
    pub async fn list_cars(&self) -> Result<Vec<Car>, ClientError> {
        self.enter(Route::Cars)?;
        self.api.list_cars().await
    }

    /// Submit the booking form.
    ///
    /// # Errors
    ///
    /// [`ClientError::Redirected`] when anonymous,
    /// [`ClientError::ActionUnavailable`] for admins, otherwise validation or
    /// gateway failures.
    pub async fn book(
        &self,
        car_id: &str,
        start_date: &str,
        end_date: &str,
    ) -> Result<Value, ClientError> {
        self.enter(Route::Book)?;
        if self.state() == AuthState::AuthenticatedAdmin {
            return Err(ClientError::ActionUnavailable(
                "booking is not available to admin accounts",
            ));
        }
        let request = BookingForm {
            car_id: car_id.to_owned(),
            start_date: start_date.to_owned(),
            end_date: end_date.to_owned(),
        }
        .into_request()?;
        let confirmation = self.api.book(&request).await?;
        tracing::info!(car_id = %request.car_id, "booking confirmed");
        Ok(confirmation)
    }

    /// Dashboard: add a listing.
    ///
    /// # Errors
    ///
    /// [`ClientError::Redirected`] unless admin, otherwise validation or
    /// gateway failures.
    pub async fn add_car(&self, name: &str, car_type: &str, price: &str) -> Result<Car, ClientError> {
        self.enter(Route::Dashboard)?;
        let input = car_form(name, car_type, price).into_input()?;
        let car = self.api.create_car(&input).await?;
        tracing::info!(car_id = %car.id, "car added");
        Ok(car)
    }

    /// Dashboard: replace a listing.
    ///
    /// # Errors
    ///
    /// See [`App::add_car`].
    pub async fn update_car(
        &self,
        id: &str,
        name: &str,
        car_type: &str,
        price: &str,
    ) -> Result<Value, ClientError> {
        self.enter(Route::Dashboard)?;
        let input = car_form(name, car_type, price).into_input()?;
        let body = self.api.update_car(id, &input).await?;
        tracing::info!(car_id = id, "car updated");
        Ok(body)
    }

    /// Dashboard: remove a listing.
    ///
    /// # Errors
    ///
    /// [`ClientError::Redirected`] unless admin, otherwise gateway failures.
    pub async fn delete_car(&self, id: &str) -> Result<Value, ClientError> {
        self.enter(Route::Dashboard)?;
        let body = self.api.delete_car(id).await?;
        tracing::info!(car_id = id, "car deleted");
        Ok(body)
    }

    fn enter(&self, route: Route) -> Result<(), ClientError> {
        let navigation = self.router.navigate_to(route);
        if navigation.landed == route {
            return Ok(());
        }
        Err(ClientError::Redirected {
            from: navigation.requested,
            to: navigation.landed,
        })
    }
}

fn car_form(name: &str, car_type: &str, price: &str) -> CarForm {
    CarForm {
        name: name.to_owned(),
        car_type: car_type.to_owned(),
        price: price.to_owned(),
    }
}

#[cfg(test)]
#[path = "app_test.rs"]
mod tests;
