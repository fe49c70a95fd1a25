use clap::Parser;
use course_recs::config::parse_feedback_arg;
use course_recs::domain::ports::RecommendationService;
use course_recs::utils::error::{ErrorSeverity, RecsError};
use course_recs::utils::export::export_recommendations;
use course_recs::utils::{logger, validation::Validate};
use course_recs::{CliConfig, HttpRecommendationClient, RecommendationItem, RecommendationSession};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    if config.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting course-recs CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        fail(&e);
    }

    let client = match HttpRecommendationClient::from_config(&config) {
        Ok(client) => client,
        Err(e) => fail(&e),
    };

    let result = if config.health {
        check_health(&client).await
    } else if config.programs {
        list_programs(&client).await
    } else {
        recommend(&config, &client).await
    };

    if let Err(e) = result {
        fail(&e);
    }

    Ok(())
}

async fn check_health(client: &HttpRecommendationClient) -> course_recs::Result<()> {
    let health = client.health().await?;
    println!("status: {}", health.status);
    println!("models loaded: {}", health.models_loaded);
    println!("tf-idf available: {}", health.tfidf_available);
    println!("cf model available: {}", health.cf_model_available);
    println!("programs loaded: {}", health.programs_loaded);
    Ok(())
}

async fn list_programs(client: &HttpRecommendationClient) -> course_recs::Result<()> {
    let catalog = client.programs().await?;
    println!("{} programs", catalog.count);
    for program in &catalog.programs {
        println!("  {}  {}", program.program_id, program.name);
    }
    Ok(())
}

async fn recommend(config: &CliConfig, client: &HttpRecommendationClient) -> course_recs::Result<()> {
    let mut session = RecommendationSession::from_config(config);
    if let Some(user_id) = &config.user_id {
        session = session.with_user_id(user_id.clone());
    }
    session.preferences_mut().extend(&config.skills);

    tracing::info!(
        "Requesting {} {} recommendations for: {}",
        session.k(),
        session.approach(),
        session.preferences().skill_names().collect::<Vec<_>>().join(", ")
    );

    let response = session.submit(client).await?;
    print_recommendations(&response.recommendations);

    if let Some(path) = &config.export {
        export_recommendations(path, &response.recommendations)?;
        println!("Saved to: {}", path);
    }

    for raw in &config.feedback {
        let (program_id, kind) = parse_feedback_arg(raw)?;
        let feedback = session.feedback(&program_id, kind)?;
        let ack = client.submit_feedback(&feedback).await?;
        tracing::info!("Feedback for {}: {}", program_id, ack.message);
    }

    Ok(())
}

fn print_recommendations(items: &[RecommendationItem]) {
    if items.is_empty() {
        println!("No recommendations returned.");
        return;
    }

    for (idx, item) in items.iter().enumerate() {
        println!(
            "{}. {} [{}]  score {:.0}%",
            idx + 1,
            item.program_name,
            item.program_id,
            item.score * 100.0
        );
        if !item.explanation.is_empty() {
            println!("   {}", item.explanation);
        }
        if let Some(rating) = item.course_rating {
            println!("   rating: {:.1}", rating);
        }
        if let Some(url) = &item.course_url {
            println!("   {}", url);
        }
    }
}

fn fail(e: &RecsError) -> ! {
    tracing::error!(
        "{} (Category: {:?}, Severity: {:?})",
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
    std::process::exit(exit_code)
}
