//! In-process stub gateway for client tests.

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::http::HeaderMap;

use crate::config::Config;
use crate::session::{MemoryBackend, SessionBackend};

/// Serve `router` on an ephemeral local port and return its base URL.
pub(crate) async fn spawn_gateway(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/api")
}

/// Base URL nothing listens on.
pub(crate) async fn dead_gateway() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/api")
}

pub(crate) fn config_for(base_url: &str) -> Config {
    Config::default()
        .with_base_url(base_url)
        .with_session_file("unused-session.json")
}

/// `Authorization` header values seen by the stub, in arrival order.
#[derive(Debug, Clone, Default)]
pub(crate) struct SeenAuth(Arc<Mutex<Vec<Option<String>>>>);

impl SeenAuth {
    pub(crate) fn record(&self, headers: &HeaderMap) {
        let value = headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .map(ToOwned::to_owned);
        self.0.lock().unwrap().push(value);
    }

    pub(crate) fn all(&self) -> Vec<Option<String>> {
        self.0.lock().unwrap().clone()
    }
}

/// Session backend that stores normally but can never remove.
#[derive(Debug, Clone, Default)]
pub(crate) struct RemoveFails(MemoryBackend);

impl SessionBackend for RemoveFails {
    fn read(&self) -> std::io::Result<Option<String>> {
        self.0.read()
    }

    fn write(&self, contents: &str) -> std::io::Result<()> {
        self.0.write(contents)
    }

    fn remove(&self) -> std::io::Result<()> {
        Err(std::io::Error::other("disk gone"))
    }
}
