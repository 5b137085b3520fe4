use std::path::Path;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use astroai_application::{
    ForecastCache, HistoryService, ModelChoice, NavigationController, ProfileService,
    ReadingService, ScreenFlows, Services, SettingsService,
};
use astroai_core::AstroError;
use astroai_core::clock::{Clock, SystemClock};
use astroai_core::config::{AppConfig, Feature};
use astroai_core::forecast::{FallbackMessages, ForecastSign};
use astroai_core::gateway::{AiGateway, ForecastFetcher, GatewayRequest};
use astroai_core::language::Language;
use astroai_core::navigation::{InMemoryHistory, Navigator, RootExitGuard};
use astroai_core::notification::{LogNotifier, Notifier};
use astroai_core::storage::{KeyValueStore, MemoryStore, StorageKey};
use astroai_infrastructure::{ApiKeys, AstroPaths, ConfigService, JsonFileStore, SecretService, ServiceType};
use astroai_interaction::{OpenRouterGateway, SerpApiFetcher};
use async_trait::async_trait;

use crate::app::AppState;

pub struct AppBootstrap {
    pub app_state: AppState,
}

/// Gateway used when no OpenRouter key is configured. Every request fails,
/// so reading flows show their error toast.
#[derive(Debug)]
struct UnconfiguredGateway;

#[async_trait]
impl AiGateway for UnconfiguredGateway {
    async fn complete(&self, _request: GatewayRequest) -> astroai_core::Result<String> {
        Err(AstroError::config("OpenRouter API key is not configured"))
    }
}

/// Forecast source used when no SerpAPI key is configured. Always empty,
/// so the daily forecast falls back to the offline messages.
#[derive(Debug)]
struct NoForecastSource;

#[async_trait]
impl ForecastFetcher for NoForecastSource {
    async fn fetch(&self, _sign: ForecastSign, _language: Language) -> astroai_core::Result<Option<String>> {
        Ok(None)
    }
}

/// Opens `store.json`, or an in-memory store when it cannot be read.
async fn open_store(path: &Path) -> Arc<dyn KeyValueStore> {
    let store = JsonFileStore::new(path.to_path_buf());
    match store.get(StorageKey::Profile).await {
        Ok(_) => {
            tracing::info!("[Bootstrap] Using store at {:?}", path);
            Arc::new(store)
        }
        Err(e) => {
            tracing::warn!(
                "[Bootstrap] Store at {:?} is unreadable ({}), data will not persist this session",
                path,
                e
            );
            Arc::new(MemoryStore::new())
        }
    }
}

fn build_gateway(keys: &ApiKeys, config: &AppConfig) -> Result<Arc<dyn AiGateway>> {
    match &keys.openrouter {
        Some(key) => {
            let gateway = OpenRouterGateway::new(key.as_str(), &config.openrouter, config.app.name.as_str())
                .map_err(|e| anyhow!("Failed to create OpenRouter gateway: {}", e))?;
            Ok(Arc::new(gateway))
        }
        None => {
            tracing::warn!("[Bootstrap] No OpenRouter API key, AI readings are unavailable");
            Ok(Arc::new(UnconfiguredGateway))
        }
    }
}

fn build_fetcher(keys: &ApiKeys, config: &AppConfig) -> Result<Arc<dyn ForecastFetcher>> {
    match &keys.serpapi {
        Some(key) => {
            let fetcher = SerpApiFetcher::new(key.as_str(), &config.serpapi)
                .map_err(|e| anyhow!("Failed to create SerpAPI fetcher: {}", e))?;
            Ok(Arc::new(fetcher))
        }
        None => {
            tracing::warn!("[Bootstrap] No SerpAPI key, daily forecasts use offline messages");
            Ok(Arc::new(NoForecastSource))
        }
    }
}

/// Composition root. `base` overrides the platform config directory.
pub async fn bootstrap(base: Option<&Path>) -> Result<AppBootstrap> {
    let paths = AstroPaths::new(base).map_err(|e| anyhow!("Failed to resolve paths: {}", e))?;

    let config = ConfigService::new(&paths)
        .load_or_create()
        .map_err(|e| anyhow!("Failed to load config: {}", e))?;
    tracing::info!("[Bootstrap] {} {}", config.app.name, config.app.version);

    let secret_path = paths
        .ensure_secret_file()
        .map_err(|e| anyhow!("Failed to prepare secret file: {}", e))?;
    let keys = SecretService::new(secret_path)
        .api_keys()
        .map_err(|e| anyhow!("Failed to read API keys: {}", e))?;

    let store = open_store(&paths.get_path(ServiceType::Store)).await;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);

    let readings = ReadingService::new(
        build_gateway(&keys, &config)?,
        ModelChoice::from(&config.openrouter),
        clock.clone(),
        &config.limits,
    )
    .map_err(|e| anyhow!("Failed to prepare prompts: {}", e))?;

    let services = Services {
        profiles: Arc::new(ProfileService::new(store.clone(), clock.clone())),
        history: Arc::new(HistoryService::new(
            store.clone(),
            &config.limits,
            config.features.is_enabled(Feature::SaveHistoryLocally),
        )),
        settings: Arc::new(SettingsService::new(store.clone())),
        forecasts: Arc::new(ForecastCache::new(
            store.clone(),
            build_fetcher(&keys, &config)?,
            clock.clone(),
            FallbackMessages::default(),
        )),
        readings: Arc::new(readings),
    };

    let navigator = Navigator::new(
        Box::new(InMemoryHistory::new()),
        RootExitGuard::new(config.limits.exit_window_ms),
    );
    let controller = Arc::new(NavigationController::new(navigator, notifier, clock));
    let flows = Arc::new(ScreenFlows::new(
        controller,
        services,
        config.features.clone(),
        config.limits.clone(),
    ));

    Ok(AppBootstrap {
        app_state: AppState {
            paths,
            config,
            flows,
        },
    })
}
