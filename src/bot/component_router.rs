use std::sync::Arc;

use crate::bot::Handler;
use crate::bot::platform::SerenityInteraction;
use crate::widgets::ComponentId;
use anyhow::Result;
use serenity::all::{ComponentInteraction, Context, CreateInteractionResponse};

/// Route component interactions (button clicks) to the widget that owns them
pub async fn route_component_interaction(
    handler: &Handler,
    context: &Context,
    component: &ComponentInteraction,
) -> Result<()> {
    let custom_id = component.data.custom_id.as_str();

    // Anything that isn't a widget id predates this process or isn't ours
    if ComponentId::parse(custom_id).is_none() {
        tracing::debug!("Unhandled component interaction: {}", custom_id);
        return Ok(());
    }

    let interaction = Arc::new(SerenityInteraction::new(
        Arc::clone(&context.http),
        component.clone(),
    ));

    if handler.registry.dispatch(custom_id, interaction).await {
        return Ok(());
    }

    // Stale click on an expired widget: acknowledge it so the client doesn't
    // show a failure, but say nothing.
    component
        .create_response(&context.http, CreateInteractionResponse::Acknowledge)
        .await?;

    Ok(())
}
