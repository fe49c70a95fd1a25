use anyhow::Context;
use clap::Parser;
use course_recs::domain::ports::ConfigProvider;
use course_recs::utils::error::ErrorSeverity;
use course_recs::utils::export::export_recommendations;
use course_recs::utils::{logger, validation::Validate};
use course_recs::{Approach, HttpRecommendationClient, ProfileConfig, RecommendationSession};

#[derive(Parser)]
#[command(name = "profile-recs")]
#[command(about = "Request course recommendations for a saved TOML profile")]
struct Args {
    /// Path to TOML profile file
    #[arg(short, long, default_value = "profile.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override the approach from the profile
    #[arg(long)]
    approach: Option<Approach>,

    /// Override the number of results from the profile
    #[arg(long)]
    k: Option<usize>,

    /// Show the request that would be sent without calling the service
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logger::init_cli_logger(args.verbose);

    tracing::info!("Loading profile from: {}", args.config);

    let config = ProfileConfig::from_file(&args.config)
        .with_context(|| format!("Failed to load profile '{}'", args.config))?;

    if let Err(e) = config.validate() {
        tracing::error!("Profile validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    let mut session = config.build_session()?;
    if let Some(approach) = args.approach {
        tracing::info!("Approach overridden to: {}", approach);
        session.set_approach(approach);
    }
    if let Some(k) = args.k {
        session.set_k(k)?;
    }

    display_profile_summary(&config, &session, args.dry_run);

    if args.dry_run {
        let request = session.build_request()?;
        println!("Request body:");
        println!("{}", serde_json::to_string_pretty(&request.profile)?);
        println!("Query: k={}&approach={}", request.k, request.approach);
        return Ok(());
    }

    let client = HttpRecommendationClient::from_config(&config)?;

    match session.submit(&client).await {
        Ok(response) => {
            println!("Approach: {}", response.approach);
            for (idx, item) in response.recommendations.iter().enumerate() {
                println!(
                    "{}. {} ({:.3}) - {}",
                    idx + 1,
                    item.program_name,
                    item.score,
                    item.explanation
                );
            }

            if let Some(path) = config.csv_output() {
                export_recommendations(path, &response.recommendations)
                    .with_context(|| format!("Failed to export to '{}'", path))?;
                println!("📁 Output saved to: {}", path);
            }
        }
        Err(e) => {
            tracing::error!(
                "Recommendation request failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_profile_summary(config: &ProfileConfig, session: &RecommendationSession, dry_run: bool) {
    println!("📋 Profile Summary:");
    println!("  Service: {}", config.api_endpoint());
    println!("  Timeout: {}s", config.timeout_seconds());
    println!("  Approach: {}", session.approach());
    println!("  Results: {}", session.k());

    println!("  Skills:");
    for entry in session.preferences().entries() {
        println!("    {} (level {})", entry.name, entry.level);
    }

    let grades = config.grades();
    for (label, value) in [
        ("Math", grades.math),
        ("Science", grades.science),
        ("Language", grades.language),
    ] {
        if let Some(value) = value {
            println!("  {} grade: {}", label, value);
        }
    }

    if dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }
    println!();
}
