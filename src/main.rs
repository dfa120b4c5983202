use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use boxoffice::dispatch::{DEFAULT_DELAY, Dispatcher};
use boxoffice::input::StdinSource;
use boxoffice::model::PoolEvent;
use boxoffice::notify::EventHub;
use boxoffice::pool::TicketPool;
use boxoffice::session::Session;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let metrics_port: Option<u16> = std::env::var("BOXOFFICE_METRICS_PORT")
        .ok()
        .and_then(|s| s.parse().ok());
    boxoffice::observability::init(metrics_port);

    let event_name = std::env::var("BOXOFFICE_EVENT").unwrap_or_else(|_| "Rust Conference".into());
    let capacity: u32 = std::env::var("BOXOFFICE_CAPACITY")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(50);
    let dispatch_delay_ms: u64 = std::env::var("BOXOFFICE_DISPATCH_DELAY_MS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_DELAY.as_millis() as u64);
    let run_until_sold_out = std::env::var("BOXOFFICE_RUN_UNTIL_SOLD_OUT")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    info!("boxoffice starting");
    info!("  event: {event_name}");
    info!("  capacity: {capacity}");
    info!("  dispatch_delay_ms: {dispatch_delay_ms}");
    info!(
        "  metrics: {}",
        metrics_port.map_or("disabled".to_string(), |p| format!(
            "http://0.0.0.0:{p}/metrics"
        ))
    );

    let pool = Arc::new(TicketPool::new(capacity));
    let events = Arc::new(EventHub::new());
    let dispatcher = Dispatcher::new(Duration::from_millis(dispatch_delay_ms), events.clone());

    println!("Welcome to the {event_name} booking application!");
    println!(
        "We have a total of {capacity} tickets and {} are available.",
        pool.remaining().await
    );
    println!("Get your tickets here to attend.");

    // Presentation is driven off the event hub so status lines appear as
    // things happen, not after the run completes.
    let mut rx = events.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(event) = rx.recv().await {
            match event {
                PoolEvent::Booked { booking, remaining } => {
                    println!(
                        "Thank you {} for booking {} tickets. \
                         You will receive a confirmation email at {}.",
                        booking.full_name(),
                        booking.ticket_count,
                        booking.email
                    );
                    println!("{remaining} tickets remaining for {event_name}.");
                }
                PoolEvent::Rejected {
                    name_valid,
                    email_valid,
                    quantity_valid,
                    requested,
                    remaining,
                } => {
                    if !name_valid {
                        println!(
                            "Your first name or last name is too short. \
                             Each must be at least 2 characters long."
                        );
                    }
                    if !email_valid {
                        println!("Your email address must contain an '@' and a '.'.");
                    }
                    if !quantity_valid {
                        println!(
                            "You can book a maximum of {remaining} tickets. \
                             You tried to book {requested} tickets."
                        );
                    }
                }
                PoolEvent::Confirmed { confirmation } => {
                    println!("########################");
                    println!(
                        "Sending ticket:\n {} \nto email address {}",
                        confirmation, confirmation.email
                    );
                    println!("########################");
                }
                PoolEvent::SoldOut => {
                    println!("Our {event_name} is booked out. Come back next year!");
                }
            }
        }
    });

    let session =
        Session::new(pool.clone(), dispatcher, events.clone()).run_until_sold_out(run_until_sold_out);
    let mut source = StdinSource::new();
    let summary = session.run(&mut source).await;

    println!(
        "The first names of bookings are: {:?}",
        pool.first_names().await
    );
    info!(
        "session finished: {} bookings, {} rejections, {} confirmations sent",
        summary.bookings.len(),
        summary.rejections.len(),
        summary.confirmations.len()
    );

    // All senders are gone once the hub is dropped; the printer drains what
    // is buffered and exits.
    drop(events);
    printer.await?;

    Ok(())
}
