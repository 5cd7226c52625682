//! Event handlers bridging the internal bus to the synchronizers.
//!
//! Each handler returns its error to the consumer, which leaves the
//! offset uncommitted so the broker redelivers; retry policy stays out
//! of the business logic.

use std::sync::Arc;

use async_trait::async_trait;

use crate::sync::{BuildingSynchronizer, CaseOrchestrator};
use turath_db::identity_map::IdentityMapRepository;
use turath_events::events::{BuildingCreated, BuildingUpdated, CitizenAlertIdentified, RiskAlert};
use turath_events::{EventEnvelope, EventHandler};

type HandlerError = Box<dyn std::error::Error + Send + Sync>;

pub struct BuildingCreatedHandler<M> {
    sync: Arc<BuildingSynchronizer<M>>,
}

impl<M> BuildingCreatedHandler<M> {
    pub fn new(sync: Arc<BuildingSynchronizer<M>>) -> Self {
        Self { sync }
    }
}

#[async_trait]
impl<M: IdentityMapRepository + 'static> EventHandler<BuildingCreated>
    for BuildingCreatedHandler<M>
{
    async fn handle(&self, envelope: EventEnvelope<BuildingCreated>) -> Result<(), HandlerError> {
        self.sync.on_created(&envelope.payload).await?;
        Ok(())
    }
}

pub struct BuildingUpdatedHandler<M> {
    sync: Arc<BuildingSynchronizer<M>>,
}

impl<M> BuildingUpdatedHandler<M> {
    pub fn new(sync: Arc<BuildingSynchronizer<M>>) -> Self {
        Self { sync }
    }
}

#[async_trait]
impl<M: IdentityMapRepository + 'static> EventHandler<BuildingUpdated>
    for BuildingUpdatedHandler<M>
{
    async fn handle(&self, envelope: EventEnvelope<BuildingUpdated>) -> Result<(), HandlerError> {
        self.sync.on_updated(&envelope.payload).await?;
        Ok(())
    }
}

pub struct CitizenAlertHandler<M> {
    cases: Arc<CaseOrchestrator<M>>,
}

impl<M> CitizenAlertHandler<M> {
    pub fn new(cases: Arc<CaseOrchestrator<M>>) -> Self {
        Self { cases }
    }
}

#[async_trait]
impl<M: IdentityMapRepository + 'static> EventHandler<CitizenAlertIdentified>
    for CitizenAlertHandler<M>
{
    async fn handle(
        &self,
        envelope: EventEnvelope<CitizenAlertIdentified>,
    ) -> Result<(), HandlerError> {
        self.cases.create_citizen_case(&envelope.payload).await?;
        Ok(())
    }
}

pub struct RiskAlertHandler<M> {
    cases: Arc<CaseOrchestrator<M>>,
}

impl<M> RiskAlertHandler<M> {
    pub fn new(cases: Arc<CaseOrchestrator<M>>) -> Self {
        Self { cases }
    }
}

#[async_trait]
impl<M: IdentityMapRepository + 'static> EventHandler<RiskAlert> for RiskAlertHandler<M> {
    async fn handle(&self, envelope: EventEnvelope<RiskAlert>) -> Result<(), HandlerError> {
        self.cases.create_risk_case(&envelope.payload).await?;
        Ok(())
    }
}
