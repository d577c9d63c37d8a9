use crate::bot::{Handler, command_registry, component_router, helpers::command_handler};
use crate::commands;
use serenity::all::{
    Command, CreateInteractionResponse, CreateInteractionResponseMessage, Interaction, Ready,
};
use serenity::prelude::*;

#[serenity::async_trait]
impl EventHandler for Handler {
    async fn interaction_create(&self, context: Context, interaction: Interaction) {
        let result = match interaction {
            Interaction::Command(ref command) => {
                command_handler::handle_slash_command(self, &context, command).await
            }

            Interaction::Component(ref component) => {
                component_router::route_component_interaction(self, &context, component).await
            }

            _ => Ok(()),
        };

        // Handle errors
        if let Err(e) = result {
            tracing::error!("[ERROR] There was an error processing your interaction: {e:#}");

            match &interaction {
                Interaction::Command(command) => {
                    if let Err(send_err) = commands::error::run(
                        &context,
                        command,
                        "An unexpected error occurred. Please try again later.",
                    )
                    .await
                    {
                        tracing::error!("[ERROR] Failed to send error response to user: {send_err}");
                    }
                }
                Interaction::Component(component) => {
                    let error_response = CreateInteractionResponseMessage::new()
                        .content("[ERROR] An unexpected error occurred. Please try again later.")
                        .ephemeral(true);

                    if let Err(send_err) = component
                        .create_response(
                            &context.http,
                            CreateInteractionResponse::Message(error_response),
                        )
                        .await
                    {
                        tracing::error!(
                            "[ERROR] Failed to send component error response to user: {send_err}"
                        );
                    }
                }
                _ => {
                    tracing::warn!("[ERROR] Unhandled interaction type in error handler");
                }
            }
        }
    }

    async fn ready(&self, context: Context, ready: Ready) {
        tracing::info!("[BOT] {} is ready and connected!", ready.user.name);

        let commands_vec = command_registry::get_all_commands();
        let command_count = commands_vec.len();

        match Command::set_global_commands(&context, commands_vec).await {
            Ok(_) => tracing::info!(
                "[CMD] Successfully registered {} global commands",
                command_count
            ),
            Err(e) => tracing::error!("[CMD] Failed to register global commands: {e}"),
        }
    }
}
