// src/web.rs
//! Liveness endpoint for process supervisors

use anyhow::Result;
use rocket::serde::{json::Json, Serialize};
use rocket::{catch, catchers, get, routes, Build, Rocket, State};
use std::sync::Arc;
use tokio::sync::watch;

use crate::app_log;
use crate::store::UserStore;

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct HealthResponse {
    pub status: &'static str,
    pub users: usize,
}

#[get("/health")]
pub async fn health(store: &State<Arc<UserStore>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        users: store.len().await,
    })
}

#[catch(404)]
fn not_found() -> &'static str {
    "Not found"
}

pub fn build_rocket(store: Arc<UserStore>, port: u16) -> Rocket<Build> {
    let figment = rocket::Config::figment()
        .merge(("port", port))
        .merge(("address", "0.0.0.0"))
        .merge(("cli_colors", false));

    rocket::custom(figment)
        .manage(store)
        .register("/", catchers![not_found])
        .mount("/", routes![health])
}

/// Serve `/health` until `shutdown` flips to true.
pub async fn start_health_server(
    store: Arc<UserStore>,
    port: u16,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let rocket = build_rocket(store, port).ignite().await?;
    let handle = rocket.shutdown();

    tokio::spawn(async move {
        while shutdown.changed().await.is_ok() {
            if *shutdown.borrow() {
                break;
            }
        }
        handle.notify();
    });

    app_log!(info, "Health server: http://0.0.0.0:{}/health", port);
    rocket.launch().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChatId, ProfileDefaults};
    use rocket::http::Status;
    use rocket::local::asynchronous::Client;

    #[rocket::async_test]
    async fn test_health_reports_user_count() {
        let store = Arc::new(UserStore::in_memory(ProfileDefaults::default()));
        store.register(ChatId(1)).await;
        store.register(ChatId(2)).await;

        let client = Client::tracked(build_rocket(store, 0)).await.unwrap();
        let response = client.get("/health").dispatch().await;

        assert_eq!(response.status(), Status::Ok);
        let body: serde_json::Value = response.into_json().await.unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["users"], 2);
    }

    #[rocket::async_test]
    async fn test_unknown_route_is_404() {
        let store = Arc::new(UserStore::in_memory(ProfileDefaults::default()));
        let client = Client::tracked(build_rocket(store, 0)).await.unwrap();
        let response = client.get("/jobs").dispatch().await;
        assert_eq!(response.status(), Status::NotFound);
    }
}
