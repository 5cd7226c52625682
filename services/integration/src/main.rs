mod consumers;
mod relay;
mod salesforce;
mod sync;
#[cfg(test)]
mod testutil;

use std::sync::Arc;

use crate::consumers::{
    BuildingCreatedHandler, BuildingUpdatedHandler, CitizenAlertHandler, RiskAlertHandler,
};
use crate::relay::{CaseStatusRelay, KafkaRelayBus};
use crate::salesforce::{SalesforceClient, TokenCache};
use crate::sync::{BuildingSynchronizer, CaseOrchestrator};
use turath_config::{init_tracing, IntegrationConfig};
use turath_db::identity_map::PgIdentityMapRepository;
use turath_events::{Event, EventConsumer, EventHandler, EventProducer};

const SERVICE_NAME: &str = "turath-integration";
const CONSUMER_GROUP: &str = "turath-integration";

#[tokio::main]
async fn main() {
    let config = IntegrationConfig::from_env().expect("configuration must be valid");
    init_tracing(&config.log_level);

    tracing::info!(service = SERVICE_NAME, "starting");

    let pool = turath_db::create_pool(&config.database_url)
        .await
        .expect("failed to connect to database");
    let mappings = PgIdentityMapRepository::new(pool.clone());

    let tokens =
        Arc::new(TokenCache::new(config.salesforce.clone()).expect("failed to build token cache"));
    let client =
        SalesforceClient::new(&config.salesforce, tokens).expect("failed to build CRM client");

    let buildings = Arc::new(BuildingSynchronizer::new(client.clone(), mappings.clone()));
    let cases = Arc::new(CaseOrchestrator::new(client, mappings.clone()));

    let internal = EventProducer::new(&config.kafka_bootstrap_servers, SERVICE_NAME)
        .expect("failed to create internal-bus producer");
    let external = EventProducer::new(&config.external_kafka_bootstrap_servers, SERVICE_NAME)
        .expect("failed to create external-bus producer");
    let relay = Arc::new(CaseStatusRelay::new(
        mappings.clone(),
        KafkaRelayBus::new(internal, external, config.external_claim_topic.clone()),
    ));

    spawn_consumer(
        &config.kafka_bootstrap_servers,
        BuildingCreatedHandler::new(buildings.clone()),
    );
    spawn_consumer(
        &config.kafka_bootstrap_servers,
        BuildingUpdatedHandler::new(buildings),
    );
    spawn_consumer(
        &config.kafka_bootstrap_servers,
        CitizenAlertHandler::new(cases.clone()),
    );
    spawn_consumer(
        &config.kafka_bootstrap_servers,
        RiskAlertHandler::new(cases),
    );

    let app = relay::router(relay);
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind webhook listener");

    tracing::info!(addr = %addr, "webhook endpoint listening");
    axum::serve(listener, app).await.expect("server error");
}

fn spawn_consumer<E, H>(bootstrap_servers: &str, handler: H)
where
    E: Event,
    H: EventHandler<E>,
{
    let consumer = EventConsumer::new(bootstrap_servers, SERVICE_NAME, CONSUMER_GROUP)
        .expect("failed to create consumer")
        .subscribe::<E, H>(handler)
        .expect("failed to subscribe");

    tokio::spawn(async move {
        if let Err(e) = consumer.run().await {
            tracing::error!(error = %e, "consumer loop terminated");
        }
    });
}
