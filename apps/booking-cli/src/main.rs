use std::process::ExitCode;
use std::sync::Arc;

use dotenv::dotenv;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

mod commands;

use commands::Command;
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::Centre;
use vaccination_cell::memory::{InMemoryAppointmentStore, InMemoryCentreDirectory};
use vaccination_cell::supabase_store::{SupabaseAppointmentStore, SupabaseCentreDirectory};
use vaccination_cell::{AppointmentStore, BookingEngine, CentreDirectory, StoredUserContext};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match Command::parse(&args) {
        Ok(command) => command,
        Err(message) => {
            eprintln!("{}\n\n{}", message, commands::USAGE);
            return Ok(ExitCode::from(64));
        }
    };

    let config = AppConfig::from_env();
    let engine = build_engine(&config);

    match commands::run(&engine, command).await {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) if e.is_user_correctable() => {
            eprintln!("{}", e);
            Ok(ExitCode::from(2))
        }
        Err(e) => {
            error!("Booking failed: {}", e);
            Err(e.into())
        }
    }
}

fn build_engine(config: &AppConfig) -> BookingEngine {
    let (centres, appointments): (Arc<dyn CentreDirectory>, Arc<dyn AppointmentStore>) =
        if config.is_configured() {
            info!("Using Supabase stores at {}", config.supabase_url);
            let supabase = Arc::new(SupabaseClient::new(config));
            (
                Arc::new(SupabaseCentreDirectory::new(Arc::clone(&supabase))),
                Arc::new(SupabaseAppointmentStore::new(supabase)),
            )
        } else {
            info!("Using in-memory stores with demo centres");
            (
                Arc::new(InMemoryCentreDirectory::new(demo_centres())),
                Arc::new(InMemoryAppointmentStore::new()),
            )
        };

    let users = Arc::new(StoredUserContext::new(
        configured_user_id(config),
        config.booking_user_doses,
        Arc::clone(&appointments),
    ));
    BookingEngine::new(centres, appointments, users)
}

fn configured_user_id(config: &AppConfig) -> Uuid {
    Uuid::parse_str(&config.booking_user_id).unwrap_or_else(|_| {
        let id = Uuid::new_v4();
        warn!("BOOKING_USER_ID is not a UUID, using {} for this run", id);
        id
    })
}

fn demo_centres() -> Vec<Centre> {
    vec![
        Centre::new(1, "Helix Vaccination Centre", "DCU, Dublin 9"),
        Centre::new(2, "Citywest Convention Centre", "Dublin 24"),
        Centre::new(3, "Cork City Hall", "Cork"),
    ]
}
