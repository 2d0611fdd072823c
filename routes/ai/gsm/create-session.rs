//! `/ai/gsm/create-session`: start a new mystery.
//!
//! POST runs the game state manager on the submitted [`GameSessionConfig`]
//! and hands its summary to the narrator; the response is the opening turn.

use serde_json::json;
use std::sync::Arc;

use crate::context::AppContext;
use crate::http::{RouteRequest, RouteResponse};
use crate::routing::{handler, BodySchema, Handler, ModuleError, RouteModule, RouteOptions};
use crate::services::ai::{
    create_game_session, start_narration, GameSessionConfig, GenerationClient, GenerationSettings,
};

struct CreateSession {
    generation: Arc<dyn GenerationClient>,
    settings: GenerationSettings,
}

impl RouteModule for CreateSession {
    fn get(&self) -> Option<Handler> {
        Some(handler(|_| async { Ok(RouteResponse::from(json!({}))) }))
    }

    fn post(&self) -> Option<Handler> {
        let generation = self.generation.clone();
        let settings = self.settings.clone();
        Some(handler(move |request: RouteRequest| {
            let generation = generation.clone();
            let settings = settings.clone();
            async move {
                let config: GameSessionConfig = request.json()?;
                let summary = create_game_session(generation.as_ref(), &settings, &config).await?;
                let turn = start_narration(generation.as_ref(), &settings, &summary).await?;
                RouteResponse::json(&turn)
            }
        }))
    }

    fn route_options(&self) -> Option<RouteOptions> {
        Some(RouteOptions::default().with_body_schema(BodySchema::of::<GameSessionConfig>()))
    }
}

pub fn load(ctx: &AppContext) -> Result<Arc<dyn RouteModule>, ModuleError> {
    Ok(Arc::new(CreateSession {
        generation: ctx.generation.clone(),
        settings: ctx.settings.clone(),
    }))
}
