use serde_json::{json, Value};

use shared_models::CentreId;
use vaccination_cell::{BookingEngine, BookingError};

pub const USAGE: &str = "\
usage: booking-cli <command>

commands:
  centres                          list vaccination centres
  status                           booking status of the configured user
  slots <centre-id> <YYYY-MM-DD>   validate a date and list open slots
  book <centre-id> <YYYY-MM-DD> <HH:MM>
                                   book a slot for the configured user

Without SUPABASE_URL and SUPABASE_ANON_PUBLIC_KEY the stores are in-memory
and nothing outlives the process.";

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Centres,
    Status,
    Slots { centre_id: CentreId, date: String },
    Book { centre_id: CentreId, date: String, time: String },
}

impl Command {
    pub fn parse(args: &[String]) -> Result<Self, String> {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();

        match args.as_slice() {
            ["centres"] => Ok(Command::Centres),
            ["status"] => Ok(Command::Status),
            ["slots", centre, date] => Ok(Command::Slots {
                centre_id: parse_centre_id(centre)?,
                date: date.to_string(),
            }),
            ["book", centre, date, time] => Ok(Command::Book {
                centre_id: parse_centre_id(centre)?,
                date: date.to_string(),
                time: time.to_string(),
            }),
            [] => Err("missing command".to_string()),
            [other, ..] => Err(format!("unknown command or wrong arguments: {}", other)),
        }
    }
}

fn parse_centre_id(raw: &str) -> Result<CentreId, String> {
    raw.parse()
        .map_err(|_| format!("centre id must be a number, got '{}'", raw))
}

pub async fn run(engine: &BookingEngine, command: Command) -> Result<Value, BookingError> {
    match command {
        Command::Centres => {
            let status = engine.current_status().await?;
            let centres = engine.find_all_centres().await?;
            Ok(json!({
                "booking_status": status,
                "centres": centres,
            }))
        }
        Command::Status => {
            let status = engine.current_status().await?;
            Ok(json!({
                "booking_status": status,
                "can_book": status.can_book(),
                "min_date": engine.earliest_bookable_date(),
            }))
        }
        Command::Slots { centre_id, date } => {
            let selection = engine.select_date(centre_id, &date).await?;
            Ok(json!(selection))
        }
        Command::Book { centre_id, date, time } => {
            let appointment = engine.book_for_current_user(centre_id, &date, &time).await?;
            Ok(json!({
                "success": true,
                "appointment": appointment,
            }))
        }
    }
}
