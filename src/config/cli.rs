use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "flight-deals")]
#[command(about = "Looks for cheap flights to the destinations in your sheet and sends alerts")]
pub struct CliArgs {
    /// Path to TOML configuration file (defaults to environment variables)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Override the origin city IATA code
    #[arg(long)]
    pub origin: Option<String>,

    /// Detect deals without sending any notification
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args() {
        let args = CliArgs::parse_from([
            "flight-deals",
            "--config",
            "deals.toml",
            "--origin",
            "MAN",
            "--dry-run",
        ]);

        assert_eq!(args.config.as_deref(), Some("deals.toml"));
        assert_eq!(args.origin.as_deref(), Some("MAN"));
        assert!(args.dry_run);
        assert!(!args.verbose);
    }

    #[test]
    fn test_defaults() {
        let args = CliArgs::parse_from(["flight-deals"]);
        assert!(args.config.is_none());
        assert!(!args.json_logs);
    }
}
