#[macro_use]
extern crate rocket;

mod api;
mod db;
mod env;
mod error;
mod models;
mod normalize;
mod telemetry;
#[cfg(test)]
mod test;
mod validation;

use api::{
    api_get_competition, api_list_competitions, api_register_participant, api_seed_competitions,
    api_submit_project, health,
};
use db::seed_competitions;
use env::load_environment;
use error::AppError;
use rocket::fairing::AdHoc;
use rocket::{Build, Rocket};
use std::sync::Mutex;
use telemetry::{OtelGuard, TelemetryFairing, init_tracing, shutdown_telemetry};
use thiserror::Error;

use sqlx::SqlitePool;
use tracing::{error, info};

pub static TELEMETRY_GUARD: Mutex<Option<OtelGuard>> = Mutex::new(None);

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Anyhow(anyhow::Error),
    #[error("{0}")]
    Figment(rocket::figment::Error),
    #[error("{0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Application error: {0}")]
    App(#[from] AppError),
}

impl From<anyhow::Error> for Error {
    fn from(value: anyhow::Error) -> Self {
        Error::Anyhow(value)
    }
}

impl From<rocket::figment::Error> for Error {
    fn from(value: rocket::figment::Error) -> Self {
        Error::Figment(value)
    }
}

#[launch]
async fn rocket() -> _ {
    init_tracing();

    if let Err(e) = load_environment() {
        error!("Failed to load environment files: {}", e);
    }

    let database_url = std::env::var("DATABASE_URL").unwrap_or_default();

    let pool = SqlitePool::connect(&database_url)
        .await
        .expect("Failed to connect to SQLite database");

    info!("Running database migrations...");
    match sqlx::migrate!("./migrations").run(&pool).await {
        Ok(_) => info!("Migrations completed successfully"),
        Err(e) => {
            error!("Failed to run migrations: {}", e);
            panic!("Database migration failed: {}", e);
        }
    }

    match seed_competitions(&pool).await {
        Ok(created) => {
            if created > 0 {
                info!("Seeded {} competitions", created);
            }
        }
        Err(e) => {
            error!("Failed to seed competitions: {}", e);
        }
    }

    init_rocket(pool).await
}

pub async fn init_rocket(pool: SqlitePool) -> Rocket<Build> {
    info!("Starting Aspect'25 portal");

    rocket::build()
        .manage(pool)
        .mount(
            "/api",
            routes![
                api_register_participant,
                api_submit_project,
                api_get_competition,
                api_list_competitions,
                api_seed_competitions,
                health,
            ],
        )
        .attach(TelemetryFairing)
        .attach(AdHoc::on_shutdown("Telemetry shutdown", |_| {
            Box::pin(async {
                shutdown_telemetry();
            })
        }))
}
