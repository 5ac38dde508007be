use crate::offline;
use anyhow::{Context, Result};
use duet_agent::{CoordinatorConfig, TurnCoordinator, responder_agent, retriever_agent};
use duet_core::Llm;
use duet_model::{AzureAIClient, AzureAIConfig};
use duet_rag::{KeywordRetriever, TipStore, render_tips};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where the two roles get their model from.
#[derive(Debug, Clone)]
pub enum ModelSource {
    Azure(AzureAIConfig),
    /// Scripted models; no network access.
    Offline,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub model: ModelSource,
    /// TOML tip file; the built-in tips when `None`.
    pub tips_path: Option<PathBuf>,
    pub coordinator: CoordinatorConfig,
    /// Request streamed model responses.
    pub stream: bool,
}

impl Config {
    /// Azure settings come from the environment after loading `.env`, unless
    /// `offline` is set.
    pub fn from_env(
        offline: bool,
        tips_path: Option<PathBuf>,
        max_turns: Option<u32>,
    ) -> Result<Self> {
        let model = if offline {
            ModelSource::Offline
        } else {
            dotenvy::dotenv().ok();
            ModelSource::Azure(
                AzureAIConfig::from_env().context("set the Azure AI variables or pass --offline")?,
            )
        };

        Ok(Self { model, tips_path, coordinator: CoordinatorConfig { max_turns }, stream: false })
    }

    pub fn offline() -> Self {
        Self {
            model: ModelSource::Offline,
            tips_path: None,
            coordinator: CoordinatorConfig::default(),
            stream: false,
        }
    }

    #[must_use]
    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn build_coordinator(&self) -> Result<TurnCoordinator> {
        let store = Arc::new(load_store(self.tips_path.as_deref())?);
        let retriever = Arc::new(KeywordRetriever::new(store));

        let (retriever_model, responder_model): (Arc<dyn Llm>, Arc<dyn Llm>) = match &self.model {
            ModelSource::Azure(config) => {
                let client: Arc<dyn Llm> = Arc::new(AzureAIClient::new(config.clone())?);
                (client.clone(), client)
            }
            ModelSource::Offline => {
                let retriever_model: Arc<dyn Llm> = Arc::new(offline::retriever_model());
                let responder_model: Arc<dyn Llm> = Arc::new(offline::responder_model());
                (retriever_model, responder_model)
            }
        };

        let retriever = retriever_agent(retriever_model, retriever)?.with_streaming(self.stream);
        let responder = responder_agent(responder_model)?.with_streaming(self.stream);
        let coordinator = TurnCoordinator::new(Arc::new(retriever), Arc::new(responder))?
            .with_config(self.coordinator);

        Ok(coordinator)
    }
}

/// The whole store, or the tips retrieved for `query`, one per line.
pub fn tip_listing(path: Option<&Path>, query: Option<&str>) -> Result<String> {
    let store = load_store(path)?;
    Ok(match query {
        Some(query) => KeywordRetriever::new(Arc::new(store)).render(query),
        None => render_tips(store.tips()),
    })
}

/// The tip file at `path`, or the built-in tips.
pub fn load_store(path: Option<&Path>) -> Result<TipStore> {
    match path {
        Some(path) => TipStore::load(path)
            .with_context(|| format!("failed to load tips from {}", path.display())),
        None => Ok(TipStore::default()),
    }
}
