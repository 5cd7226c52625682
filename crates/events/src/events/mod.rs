pub mod alerts;
pub mod buildings;
pub mod cases;

pub use alerts::{CitizenAlertIdentified, RiskAlert};
pub use buildings::{BuildingCreated, BuildingUpdated};
pub use cases::{AssignedOperator, CaseResolution, CaseStatusChanged, CaseStatusInfo};
