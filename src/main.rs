use chrono::Local;
use taskboard::projector::{UNASSIGNED, daily_buckets, dashboard_counts, status_columns};
use taskboard::{Board, ClientConfig, StoreClient};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = ClientConfig::from_env();
    info!("using store at {}", config.base_url);
    let client = StoreClient::new(config)?;

    let mut board = Board::new();
    board.refresh(&client).await?;
    board.load_members(&client).await?;

    let counts = dashboard_counts(board.entries());
    println!(
        "{} tasks: {} in progress, {} completed, {} in review",
        counts.total, counts.in_progress, counts.completed, counts.review
    );

    for column in status_columns(board.entries()) {
        if column.entries.is_empty() {
            continue;
        }
        println!("\n{} ({})", column.status, column.entries.len());
        for entry in column.entries {
            let assignee = match entry.item.assignee().trim() {
                "" => UNASSIGNED,
                name => name,
            };
            println!(
                "  {} [{}] {} -> {}",
                entry.item.name(),
                assignee,
                entry.item.start_date(),
                entry.item.end_date()
            );
        }
    }

    let today = Local::now().date_naive();
    let buckets = daily_buckets(today, board.entries());
    println!(
        "\ndaily check-in: {} today, {} tomorrow, {} upcoming",
        buckets.today.len(),
        buckets.tomorrow.len(),
        buckets.upcoming.len()
    );

    Ok(())
}
