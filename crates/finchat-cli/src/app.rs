//! Start-up wiring
//!
//! Everything is built once from [`AppConfig`] and shared through `Arc`s.

use anyhow::Context;
use finchat_llm::providers::{OpenAIConfig, OpenAIProvider};
use finchat_market::{AlphaVantageClient, MarketConfig, WebSearchClient, register_market_tools};
use finchat_runtime::{ChatSession, CompletionOrchestrator, OrchestratorConfig};
use finchat_tools::ToolRegistry;
use finchat_utils::{AppConfig, ConfigError};
use std::sync::Arc;
use tracing::{info, warn};

/// Build the provider, clients, registry and orchestrator
pub fn build_orchestrator(config: &AppConfig) -> anyhow::Result<Arc<CompletionOrchestrator>> {
    let provider_config = OpenAIConfig::groq(config.llm.api_key.clone())
        .with_api_base(config.llm.api_base.clone())
        .with_timeout(config.llm.timeout.as_secs());
    let provider =
        OpenAIProvider::with_config(provider_config).context("Failed to create LLM provider")?;

    let market_config = MarketConfig::from(&config.market);
    let market = AlphaVantageClient::new(market_config.clone())
        .context("Failed to create Alpha Vantage client")?;
    let search =
        WebSearchClient::new(&market_config).context("Failed to create web-search client")?;

    let registry = ToolRegistry::with_max_result_chars(config.market.max_chars);
    register_market_tools(&registry, Arc::new(market), Arc::new(search));

    info!(
        provider = %config.llm.api_base,
        model = %config.llm.model,
        tools = registry.len(),
        "Assistant ready"
    );

    let orchestrator_config = OrchestratorConfig {
        model: config.llm.model.clone(),
        max_tokens: config.llm.max_tokens,
        temperature: config.llm.temperature,
        ..OrchestratorConfig::default()
    };

    Ok(Arc::new(CompletionOrchestrator::new(
        Arc::new(provider),
        Arc::new(registry),
        orchestrator_config,
    )))
}

/// A chat session, blocked when the configuration is unusable
pub fn session_from(config: Result<AppConfig, ConfigError>, diagnostics: bool) -> ChatSession {
    let orchestrator = config
        .map_err(anyhow::Error::from)
        .and_then(|config| build_orchestrator(&config));

    match orchestrator {
        Ok(orchestrator) => ChatSession::new(orchestrator).with_diagnostics(diagnostics),
        Err(e) => {
            warn!(error = %e, "Configuration problem, chat is disabled");
            ChatSession::blocked(format!("{e:#}"))
        }
    }
}
