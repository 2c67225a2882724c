use clap::Parser;
use flight_deals::utils::error::ErrorSeverity;
use flight_deals::utils::{logger, validation::Validate};
use flight_deals::{
    AmadeusClient, CliArgs, FlightTracker, NotificationManager, SheetyClient, TrackerConfig,
    TrackerError, TrackerOptions,
};

fn exit_with(e: &TrackerError) -> ! {
    tracing::error!(
        "❌ Flight deal check failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low | ErrorSeverity::High => 1,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting flight-deals");

    // 載入配置：有指定檔案用 TOML，否則讀環境變數
    let mut config = match &args.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            match TrackerConfig::from_file(path) {
                Ok(config) => config,
                Err(e) => exit_with(&e),
            }
        }
        None => {
            tracing::info!("📁 Loading configuration from environment variables");
            TrackerConfig::from_env()
        }
    };

    if let Some(origin) = &args.origin {
        config.search.origin = origin.clone();
        tracing::info!("🔧 Origin overridden to: {}", origin);
    }

    if let Err(e) = config.validate() {
        exit_with(&e);
    }
    tracing::debug!("Search settings: {:?}", config.search);

    tracing::info!("Setting up services...");
    let store = SheetyClient::new(&config.sheety);
    let flights = match AmadeusClient::connect(&config.amadeus).await {
        Ok(client) => client,
        Err(e) => exit_with(&e),
    };
    let notifier = NotificationManager::from_config(&config.notify);

    let mut options = TrackerOptions::from_config(&config);
    options.dry_run = args.dry_run;
    if options.dry_run {
        tracing::info!("🔍 DRY RUN MODE - no notifications will be sent");
    }

    let tracker = FlightTracker::new(store, flights, notifier, options);
    match tracker.run().await {
        Ok(summary) => {
            tracing::info!(
                "✅ Checked {} destinations, {} deals, {} messages and {} emails sent",
                summary.destinations_searched,
                summary.deals,
                summary.messages_sent,
                summary.emails_sent
            );
            println!("✅ Flight deal check completed: {} deal(s) found", summary.deals);
        }
        Err(e) => exit_with(&e),
    }

    Ok(())
}
