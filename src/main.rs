use std::error::Error;
use std::sync::Arc;

use ai_llm_service::config::default_config::{config_chat, config_embedding};
use ai_llm_service::service_profiles::LlmServiceProfiles;
use ai_llm_service::telemetry;
use api::{AppState, ServerConfig};
use code_retriever::{ChatOrchestrator, Retriever, RetrieverConfig};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // A missing .env is fine; the process environment may be enough.
    let dotenv = dotenvy::dotenv();

    telemetry::init(telemetry::DEFAULT_FILTER)?;
    if let Err(e) = dotenv {
        if !e.not_found() {
            warn!(error = %e, ".env could not be loaded");
        }
    }

    let chat_cfg = config_chat()?;
    let embedding_cfg = config_embedding()?;
    let rcfg = RetrieverConfig::from_env();

    let corpus = Arc::new(rcfg.load_corpus()?);
    let booster = rcfg.booster()?;
    info!(
        provider = ?chat_cfg.provider,
        chat_model = %chat_cfg.model,
        embedding_model = %embedding_cfg.model,
        chunks = corpus.len(),
        boost_rules = booster.rules().len(),
        top_k = rcfg.top_k,
        "starting backend"
    );

    let defaults = rcfg.chat_defaults(&chat_cfg);
    let llm = Arc::new(LlmServiceProfiles::new(chat_cfg, embedding_cfg)?);

    let retriever = Retriever::new(corpus, llm.clone(), booster, rcfg.retriever_options());
    let orchestrator = ChatOrchestrator::new(Arc::new(retriever), rcfg.assembler(), llm, defaults);

    api::start(AppState::new(Arc::new(orchestrator)), ServerConfig::from_env()).await?;

    Ok(())
}
