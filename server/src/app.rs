use std::sync::Arc;

use session_store::SessionStore;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::AppConfig;
use crate::services::assets::{self, TemplateLibrary};
use crate::services::render::RenderService;
use crate::services::upload::CloudinaryClient;

/// Application shared state accessible from axum handlers.
#[derive(Clone)]
pub struct SharedState {
    inner: Arc<SharedStateInner>,
}

struct SharedStateInner {
    /// Application configuration, fixed at startup
    config: AppConfig,
    /// Session persistence
    store: SessionStore,
    /// Composer plus template lookup
    renderer: RenderService,
    /// Present only when upload credentials are configured
    uploader: Option<CloudinaryClient>,
    shutdown: CancellationToken,
}

impl SharedState {
    /// Create shared state from an opened store and loaded config.
    pub fn new(store: SessionStore, config: AppConfig) -> Self {
        let renderer = RenderService::new(
            assets::build_composer(&config),
            TemplateLibrary::new(config.template_dir.clone()),
        );
        let uploader = match CloudinaryClient::from_config(&config.cloudinary) {
            Ok(client) => Some(client),
            Err(e) => {
                info!("Uploads disabled: {e}");
                None
            }
        };

        Self {
            inner: Arc::new(SharedStateInner {
                config,
                store,
                renderer,
                uploader,
                shutdown: CancellationToken::new(),
            }),
        }
    }

    pub fn server_port(&self) -> u16 {
        self.inner.config.server_port
    }

    pub fn store(&self) -> &SessionStore {
        &self.inner.store
    }

    pub fn renderer(&self) -> &RenderService {
        &self.inner.renderer
    }

    pub fn uploader(&self) -> Option<&CloudinaryClient> {
        self.inner.uploader.as_ref()
    }

    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.inner.shutdown
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }
}
