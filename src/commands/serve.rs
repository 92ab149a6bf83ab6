use crate::constants::sim;
use crate::models::FetchConfig;
use crate::server::{self, AppState};
use crate::services::SimulatedSource;

/// Run the HTTP server backed by the simulated dataset
pub async fn run(port: u16) {
    println!("🚀 Starting coinperf server on port {}", port);

    let fetch_config = FetchConfig::from_env();
    if let Err(e) = fetch_config.validate() {
        eprintln!("❌ Invalid fetch configuration: {}", e);
        std::process::exit(1);
    }

    let source = SimulatedSource::new(sim::TOTAL_RECORDS);
    println!("📊 Simulated dataset: {} records", source.len());
    println!(
        "⚙️  Fetch: page_size={} concurrency={} max_retries={} base_delay={}ms keep_order={}",
        fetch_config.page_size,
        fetch_config.concurrency,
        fetch_config.max_retries,
        fetch_config.base_delay.as_millis(),
        fetch_config.keep_order
    );

    let state = AppState::new(source, fetch_config);

    println!("✅ Server ready");
    println!("   🔗 http://localhost:{}/summary", port);

    if let Err(e) = server::serve(state, port).await {
        eprintln!("❌ Server error: {}", e);
        std::process::exit(1);
    }
}
