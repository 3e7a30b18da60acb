use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub booking_user_id: String,
    pub booking_user_doses: u8,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            booking_user_id: env::var("BOOKING_USER_ID")
                .unwrap_or_else(|_| {
                    warn!("BOOKING_USER_ID not set, a random user id will be used");
                    String::new()
                }),
            booking_user_doses: match env::var("BOOKING_USER_DOSES") {
                Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
                    warn!("BOOKING_USER_DOSES={} is not a dose count, using 0", raw);
                    0
                }),
                Err(_) => 0,
            },
        };

        if !config.is_configured() {
            warn!("Supabase not configured - falling back to in-memory stores");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_anon_key.is_empty()
    }
}
