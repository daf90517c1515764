use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;
use order_engine::{
    events::EventProducers,
    InMemoryOrderStore,
    MirrorStats,
    NoMirror,
    OrderApi,
    OrderMirror,
};
use profile_store::ProfileStoreApi;

use crate::{
    auth::TokenVerifier,
    config::ServerConfig,
    errors::ServerError,
    integrations::profile_store::{create_profile_store_event_handlers, ProfileStoreMirror},
    routes::{auth_config, external, health, CreateOrderRoute, MyOrdersRoute},
};

/// Starts the server and runs it until it is shut down.
///
/// If Management API credentials are configured, new orders are mirrored to user profiles by a background handler.
/// Otherwise, orders are kept in memory only.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let verifier = web::Data::new(TokenVerifier::new(config.auth.clone())?);
    let store = InMemoryOrderStore::new();
    let stats = MirrorStats::default();
    let srv = match config.profile_store.clone() {
        Some(profile_config) => {
            info!("🪞️ Mirroring orders to user profiles on {}", profile_config.base_url());
            let api = ProfileStoreApi::new(profile_config).map_err(|e| ServerError::InitializeError(e.to_string()))?;
            let mirror = ProfileStoreMirror::new(api);
            let handlers = create_profile_store_event_handlers(mirror.clone(), stats.clone(), config.mirror_buffer_size);
            let producers = handlers.producers();
            handlers.start_handlers().await;
            create_server_instance(config, store, mirror, producers, stats.clone(), verifier)?
        },
        None => {
            warn!("🪞️ No profile store is configured. Order histories will not survive a restart.");
            create_server_instance(config, store, NoMirror, EventProducers::default(), stats.clone(), verifier)?
        },
    };
    let result = srv.await.map_err(|e| ServerError::Unspecified(e.to_string()));
    info!("🪞️ Mirroring summary: {:?}", stats.snapshot());
    result
}

pub fn create_server_instance<M>(
    config: ServerConfig,
    store: InMemoryOrderStore,
    mirror: M,
    producers: EventProducers,
    stats: MirrorStats,
    verifier: web::Data<TokenVerifier>,
) -> Result<Server, ServerError>
where
    M: OrderMirror + Clone + Send + 'static,
{
    let spa_settings = web::Data::new(config.auth.clone());
    let srv = HttpServer::new(move || {
        let orders_api = OrderApi::new(store.clone(), mirror.clone(), producers.clone()).with_stats(stats.clone());
        let api_scope = web::scope("/api")
            .service(CreateOrderRoute::<InMemoryOrderStore, M>::new())
            .service(MyOrdersRoute::<InMemoryOrderStore, M>::new())
            .service(external);
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("orders::access_log"))
            .app_data(web::Data::new(orders_api))
            .app_data(verifier.clone())
            .app_data(spa_settings.clone())
            .service(health)
            .service(auth_config)
            .service(api_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
