use std::sync::Arc;

use crate::config::Config;
use crate::observability::Metrics;
use crate::queue::RequestQueue;
use crate::store::TaskStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub queue: Arc<dyn RequestQueue>,
    pub store: TaskStore,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(
        config: Config,
        queue: Arc<dyn RequestQueue>,
        store: TaskStore,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            queue,
            store,
            metrics,
        }
    }
}
