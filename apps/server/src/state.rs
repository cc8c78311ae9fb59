//! Wiring of the long-lived services shared by all workers.

use std::sync::Arc;

use actix_web::web;

use crate::auth::SignatureGate;
use crate::clock::Clock;
use crate::config::Config;
use crate::error::AppResult;
use crate::routes;
use crate::services::{
    ChatClient, DistributionService, FileTesterGroupStore, Notifier, PlaceholderReleaseApi,
    RateLimiter, ReleaseApi, SlackClient, WebhookHandler,
};

/// Shared application services, cloned into every worker
#[derive(Clone)]
pub struct AppState {
    pub handler: web::Data<WebhookHandler>,
    pub gate: web::Data<SignatureGate>,
    pub limiter: web::Data<RateLimiter>,
}

impl AppState {
    pub fn new(handler: WebhookHandler, gate: SignatureGate, limiter: RateLimiter) -> Self {
        Self {
            handler: web::Data::new(handler),
            gate: web::Data::new(gate),
            limiter: web::Data::new(limiter),
        }
    }

    /// Builds the production services from configuration
    pub fn from_config(config: &Config, clock: Arc<dyn Clock>) -> AppResult<Self> {
        let chat: Arc<dyn ChatClient> = Arc::new(SlackClient::new(&config.slack)?);
        let api: Arc<dyn ReleaseApi> =
            Arc::new(PlaceholderReleaseApi::new(&config.distribution.download_host));
        Ok(Self::with_collaborators(config, chat, api, clock))
    }

    /// Builds the services around the given external collaborators
    pub fn with_collaborators(
        config: &Config,
        chat: Arc<dyn ChatClient>,
        api: Arc<dyn ReleaseApi>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let mut distribution = DistributionService::new(api);
        if let Some(path) = &config.distribution.tester_groups_path {
            distribution = distribution.with_tester_groups(Arc::new(FileTesterGroupStore::new(path)));
        }

        let notifier = Notifier::new(chat, config.slack.channel.clone(), clock.clone());
        let handler = WebhookHandler::new(distribution, notifier, clock.clone());
        let gate = SignatureGate::new(
            config.security.enable_signature_validation,
            &config.security.webhook_secret,
            clock.clone(),
        );
        let limiter = RateLimiter::per_minute(config.security.rate_limit_per_minute, clock);

        Self::new(handler, gate, limiter)
    }

    /// Registers shared data and every route
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.handler.clone())
            .app_data(self.gate.clone())
            .app_data(self.limiter.clone())
            .configure(routes::health::configure)
            .configure(routes::webhook::configure)
            .configure(routes::notifications::configure);
    }
}
