//! Sentiment demo: classify a fixed list of strings and print the results.

use grievance_assist::config::AppConfig;
use grievance_assist::llm::create_provider;
use grievance_assist::logging;
use grievance_assist::sentiment::{SAMPLE_TEXTS, analyze, render};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    let _log_guard = logging::init(config.log_dir.as_deref());

    let llm = create_provider(&config.llm)?;

    for text in SAMPLE_TEXTS {
        match analyze(llm.as_ref(), text).await {
            Ok(sentiment) => println!("{}", render(text, &sentiment)),
            Err(e) => {
                tracing::warn!(error = %e, "Sentiment call failed");
                println!("\nText: {text}\nSentiment: unavailable ({e})");
            }
        }
    }

    Ok(())
}
