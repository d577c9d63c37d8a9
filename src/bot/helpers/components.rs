use serenity::all::{
    CommandInteraction, Context, CreateActionRow, CreateButton, CreateInteractionResponse,
    CreateInteractionResponseMessage, CreateMessage, EditMessage, ReactionType,
};

use crate::widgets::MessageHandle;
use crate::widgets::view::{RenderedControl, RenderProps};

const BUTTONS_PER_ROW: usize = 5;

/// Turn a widget control into a serenity button
pub fn create_button(rendered: &RenderedControl) -> CreateButton {
    let control = &rendered.control;

    let mut button = match (&control.url, &rendered.custom_id) {
        (Some(url), _) => CreateButton::new_link(url),
        (None, Some(custom_id)) => CreateButton::new(custom_id).style(control.style),
        (None, None) => CreateButton::new("inert").style(control.style),
    };

    if let Some(label) = &control.label {
        button = button.label(label);
    }

    if let Some(emoji) = &control.emoji {
        button = button.emoji(ReactionType::Unicode(emoji.clone()));
    }

    button.disabled(control.disabled)
}

/// Lay controls out in rows of five
pub fn action_rows(controls: &[RenderedControl]) -> Vec<CreateActionRow> {
    controls
        .chunks(BUTTONS_PER_ROW)
        .map(|row| CreateActionRow::Buttons(row.iter().map(create_button).collect()))
        .collect()
}

/// Build a new message from render props
pub fn create_message(props: &RenderProps) -> CreateMessage {
    let mut message = CreateMessage::new()
        .embeds(props.page.embeds.clone())
        .components(action_rows(&props.controls));

    if let Some(content) = &props.page.content {
        message = message.content(content);
    }

    message
}

/// Build an edit that replaces the whole message with the render props
pub fn edit_message(props: &RenderProps) -> EditMessage {
    EditMessage::new()
        .content(props.page.content.clone().unwrap_or_default())
        .embeds(props.page.embeds.clone())
        .components(action_rows(&props.controls))
}

/// Build an interaction response (initial reply or message update) from render props
pub fn response_message(props: &RenderProps) -> CreateInteractionResponseMessage {
    CreateInteractionResponseMessage::new()
        .content(props.page.content.clone().unwrap_or_default())
        .embeds(props.page.embeds.clone())
        .components(action_rows(&props.controls))
}

/// Answer a slash command with a widget and return the message it landed on,
/// so the widget can be attached to it
pub async fn respond_with_widget(
    context: &Context,
    interaction: &CommandInteraction,
    props: &RenderProps,
) -> anyhow::Result<MessageHandle> {
    interaction
        .create_response(
            &context.http,
            CreateInteractionResponse::Message(response_message(props)),
        )
        .await?;

    let message = interaction.get_response(&context.http).await?;

    Ok(MessageHandle::new(message.channel_id.get(), message.id.get()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::view::{Control, Page};

    fn rendered(count: usize) -> Vec<RenderedControl> {
        (0..count)
            .map(|slot| RenderedControl {
                custom_id: Some(format!("wgt:0000000000000001:{slot}")),
                control: Control::button(slot.to_string()),
            })
            .collect()
    }

    #[test]
    fn test_action_rows_chunk_by_five() {
        assert_eq!(action_rows(&rendered(0)).len(), 0);
        assert_eq!(action_rows(&rendered(5)).len(), 1);
        assert_eq!(action_rows(&rendered(6)).len(), 2);
        assert_eq!(action_rows(&rendered(25)).len(), 5);
    }

    #[test]
    fn test_bare_props_render_without_rows() {
        let props = RenderProps::bare(Page::text("hello"));
        assert!(action_rows(&props.controls).is_empty());
    }
}
