use oasth_client::feed::SnapshotClient;
use oasth_client::transport::TransportConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let dump_json = std::env::args().any(|arg| arg == "--json");

    let client =
        SnapshotClient::new(TransportConfig::new()).expect("Failed to create snapshot client");

    eprintln!("Fetching network snapshot...");
    let snapshot = match client.snapshot(true).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            eprintln!("Snapshot assembly failed: {e}");
            std::process::exit(1);
        }
    };

    if dump_json {
        let json =
            serde_json::to_string_pretty(&*snapshot).expect("Snapshot serializes to JSON");
        println!("{json}");
        return;
    }

    println!("Master lines: {}", snapshot.master_lines.len());
    println!("Lines:        {}", snapshot.lines.len());
    println!("Routes:       {}", snapshot.routes.len());
    println!("Stops:        {}", snapshot.stops.len());
    println!("Calendars:    {}", snapshot.calendars.len());
}
