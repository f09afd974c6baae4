//! Analyze command implementation.

use crate::cli::AnalyzeArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use chatdigest_analyzer::GroupAnalyzer;
use chatdigest_fetcher::OneBotSource;
use chatdigest_llm::{OpenAiProvider, RetryingProvider};
use std::fs;
use std::time::Duration;
use tracing::info;

/// Execute the analyze command.
pub async fn execute_analyze(args: AnalyzeArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let analyzer = build_analyzer(config, args.api_key.as_deref())?;

    let result = analyzer.analyze_group(&args.group, args.days).await?;
    let json = formatter.format_result(&result, args.compact)?;

    match &args.output {
        Some(path) => {
            fs::write(path, json)?;
            eprintln!("{}", formatter.info(&format!("Wrote {}", path.display())));
        }
        None => println!("{}", json),
    }
    eprintln!("{}", formatter.summary(&result));
    if result.topics.is_empty() && result.user_titles.is_empty() && result.statistics.golden_quotes.is_empty() {
        eprintln!(
            "{}",
            formatter.warning("The LLM produced no records; check the [llm] settings and the log")
        );
    }

    Ok(())
}

/// Wire the OneBot source and the retrying LLM provider into an analyzer.
fn build_analyzer(
    config: &Config,
    api_key: Option<&str>,
) -> Result<GroupAnalyzer<OneBotSource, RetryingProvider<OpenAiProvider>>> {
    let mut source = OneBotSource::with_timeout(
        config.onebot.base_url.as_str(),
        Duration::from_secs(config.onebot.timeout_secs),
    )?;
    if let Some(token) = &config.onebot.access_token {
        source = source.with_access_token(token.as_str());
    }

    let mut provider = OpenAiProvider::with_timeout(
        config.llm.endpoint.as_str(),
        config.llm.model.as_str(),
        config.llm.retry.timeout(),
    )?;
    if let Some(key) = api_key.or(config.llm.api_key.as_deref()) {
        provider = provider.with_api_key(key);
    }
    let provider = RetryingProvider::new(provider, config.llm.retry.clone());

    info!(
        "Using OneBot at {} and model {} at {}",
        config.onebot.base_url, config.llm.model, config.llm.endpoint
    );

    Ok(GroupAnalyzer::new(source, provider, config.analysis.clone())?)
}
