//! Shared application state for the REST handlers (spec §4.9 "Job
//! Dispatcher").

use std::sync::Arc;

use labelforge_db::PgGateway;
use labelforge_orchestrator::Orchestrator;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<PgGateway>,
    pub orchestrator: Arc<Orchestrator>,
}
