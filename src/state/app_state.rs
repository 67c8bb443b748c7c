use crate::state::AppSettings;
use aztlan_api::client::{FirstConfig, FtcApi, ToaConfig};
use aztlan_api::fallback::FallbackStore;
use aztlan_api::llm::LlmClient;
use aztlan_api::nasa::NasaApi;
use aztlan_api::scrape::EventScraper;
use log::{info, warn};
use std::path::Path;
use std::sync::Arc;

/// Shared, read-only request state built once at startup.
#[derive(Debug)]
pub struct AppState {
    pub settings: AppSettings,
    pub ftc: FtcApi,
    pub scraper: EventScraper,
    pub nasa: NasaApi,
    /// `None` when no LLM key is configured.
    pub llm: Option<LlmClient>,
    /// Reference document embedded into LLM system prompts.
    pub knowledge_base: Option<String>,
    pub fallback: &'static FallbackStore,
}

impl AppState {
    pub fn new(settings: AppSettings) -> Arc<Self> {
        let timeout = settings.upstream_timeout;

        let mut ftc = FtcApi::new(timeout);
        if let Some(api_key) = &settings.toa_api_key {
            ftc = ftc.with_toa(ToaConfig {
                base_url: settings.toa_base_url.clone(),
                api_key: api_key.clone(),
                region: settings.toa_region.clone(),
                season: settings.toa_season.clone(),
            });
        }
        if let (Some(username), Some(token)) = (&settings.first_username, &settings.first_token) {
            ftc = ftc.with_first(FirstConfig {
                base_url: settings.first_base_url.clone(),
                username: username.clone(),
                token: token.clone(),
                season: settings.first_season.clone(),
                country: settings.first_country.clone(),
            });
        }

        let llm = settings.llm_api_key.as_deref().map(|key| {
            LlmClient::new(&settings.llm_api_url, key, &settings.llm_model).with_timeout(timeout)
        });

        let knowledge_base = settings.knowledge_base.as_deref().and_then(load_knowledge_base);

        Arc::new(Self {
            scraper: EventScraper::new(timeout),
            nasa: NasaApi::new(&settings.nasa_base_url, timeout),
            ftc,
            llm,
            knowledge_base,
            fallback: FallbackStore::get(),
            settings,
        })
    }
}

fn load_knowledge_base(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(text) if !text.trim().is_empty() => {
            info!("Loaded knowledge base from {} ({} bytes)", path.display(), text.len());
            Some(text)
        }
        Ok(_) => {
            warn!("Knowledge base {} is empty, ignoring", path.display());
            None
        }
        Err(e) => {
            warn!("Failed to read knowledge base {}: {e}", path.display());
            None
        }
    }
}
