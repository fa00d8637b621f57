use chrono::Utc;
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use laundry_admin::dashboard::{self, StatusFilter, Tab};
use laundry_admin::export;
use laundry_admin::login::check_credentials;
use laundry_admin::models::BookingStatus;
use laundry_admin::{DashboardClient, RealtimeSync, Result};

#[derive(Parser, Debug)]
#[clap(name = "laundry-admin", version)]
#[clap(about = "Admin dashboard for the cleaning and laundry service", long_about = None)]
struct Cli {
    /// Admin email
    #[clap(long)]
    email: String,

    /// Admin password
    #[clap(long)]
    password: String,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print one dashboard tab
    Show {
        /// overview, bookings, users, contacts, payments, subscriptions,
        /// laundry, delivery, notifications, reviews, complaints or settings
        #[clap(default_value = "overview")]
        tab: String,
    },
    /// List bookings, optionally filtered
    Bookings {
        /// Match service name, phone or address
        #[clap(long, default_value = "")]
        search: String,
        /// "all" or a booking status
        #[clap(long, default_value = "all")]
        status: String,
    },
    /// Write all bookings to a CSV file
    ExportBookings {
        /// Output file, bookings-YYYY-MM-DD.csv by default
        #[clap(long)]
        out: Option<PathBuf>,
    },
    /// Change a booking's status
    SetBookingStatus { id: String, status: String },
    /// Delete a booking
    DeleteBooking { id: String },
    /// Mark an admin notification as read
    MarkRead { id: String },
    /// Archive an admin notification
    ArchiveNotification { id: String },
    /// Approve a review
    ApproveReview {
        id: String,
        /// Public reply shown with the review
        #[clap(long)]
        response: Option<String>,
    },
    /// Reject a review
    RejectReview {
        id: String,
        #[clap(long)]
        response: Option<String>,
    },
    /// Follow live changes and reprint a tab as they arrive
    Watch {
        #[clap(default_value = "overview")]
        tab: String,
    },
}

async fn run(cli: Cli) -> Result<()> {
    check_credentials(&cli.email, &cli.password)?;

    let client = DashboardClient::from_env()?;
    client.fetch_admin_data().await?;
    let today = Utc::now().date_naive();

    match cli.command {
        Commands::Show { tab } => {
            let tab: Tab = tab.parse()?;
            println!("{}", client.store().with_state(|s| dashboard::render(tab, s, today)));
        }
        Commands::Bookings { search, status } => {
            let status: StatusFilter = status.parse()?;
            let listing = client.store().with_state(|s| {
                dashboard::render_bookings(&dashboard::filter_bookings(&s.bookings, &search, status))
            });
            println!("{}", listing);
        }
        Commands::ExportBookings { out } => {
            let path = out.unwrap_or_else(|| PathBuf::from(export::default_file_name(today)));
            let bookings = client.store().with_state(|s| s.bookings.clone());
            export::write_bookings_csv(&path, &bookings)?;
            println!("Wrote {} bookings to {}", bookings.len(), path.display());
        }
        Commands::SetBookingStatus { id, status } => {
            let status: BookingStatus = status.parse()?;
            let booking = client
                .update_booking(&id, &json!({ "status": status }))
                .await?;
            println!("Booking {} is now {}", booking.id, booking.status);
        }
        Commands::DeleteBooking { id } => {
            client.delete_booking(&id).await?;
            println!("Deleted booking {}", id);
        }
        Commands::MarkRead { id } => {
            let notification = client.mark_notification_as_read(&id).await?;
            println!("Notification {} marked {}", notification.id, notification.status);
        }
        Commands::ArchiveNotification { id } => {
            let notification = client.archive_notification(&id).await?;
            println!("Notification {} {}", notification.id, notification.status);
        }
        Commands::ApproveReview { id, response } => {
            let review = client.approve_review(&id, response.as_deref()).await?;
            println!("Review {} {}", review.id, review.status);
        }
        Commands::RejectReview { id, response } => {
            let review = client.reject_review(&id, response.as_deref()).await?;
            println!("Review {} {}", review.id, review.status);
        }
        Commands::Watch { tab } => {
            let tab: Tab = tab.parse()?;
            watch(&client, tab).await?;
        }
    }

    Ok(())
}

async fn watch(client: &DashboardClient, tab: Tab) -> Result<()> {
    let sync = RealtimeSync::start(client).await?;
    let mut changes = client.store().subscribe();
    let print = || {
        let today = Utc::now().date_naive();
        println!("{}\n", client.store().with_state(|s| dashboard::render(tab, s, today)));
    };
    print();

    loop {
        let changed = tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = changes.recv() => changed,
        };
        if let Err(e) = changed {
            warn!(error = %e, "Missed store updates");
        }

        // Let a burst of changes settle before reprinting
        tokio::time::sleep(Duration::from_millis(250)).await;
        changes = changes.resubscribe();
        print();
    }

    info!("Stopping");
    sync.stop().await
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}
