use axum::extract::FromRef;

use crate::pipeline::OutfitPipeline;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedPipeline = Arc<OutfitPipeline>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub pipeline: GuardedPipeline,
}

impl ServerState {
    pub fn new(config: ServerConfig, pipeline: GuardedPipeline) -> Self {
        Self {
            config,
            start_time: Instant::now(),
            pipeline,
        }
    }
}

impl FromRef<ServerState> for GuardedPipeline {
    fn from_ref(input: &ServerState) -> Self {
        input.pipeline.clone()
    }
}
