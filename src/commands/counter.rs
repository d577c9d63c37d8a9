use crate::bot::Handler;
use crate::bot::helpers::components;
use crate::widgets::{ButtonMessage, Control, Page, Press, WidgetEvent};
use serenity::all::{
    ButtonStyle, Colour, CommandInteraction, Context, CreateEmbed, InteractionContext,
};
use serenity::builder::CreateCommand;

const DECREMENT: usize = 0;
const INCREMENT: usize = 1;
const DONE: usize = 2;

pub async fn run(
    handler: &Handler,
    context: &Context,
    interaction: &CommandInteraction,
) -> anyhow::Result<()> {
    let controls = vec![
        Control::button("-1").style(ButtonStyle::Danger),
        Control::button("+1").style(ButtonStyle::Success),
        Control::button("Done").style(ButtonStyle::Secondary),
    ];

    let counter = ButtonMessage::new(
        &handler.widgets(context),
        counter_page(0, false),
        controls,
        interaction.user.id.get(),
        handler.config.button_message_options(),
    )?;

    let mut events = counter.subscribe();

    let message = match components::respond_with_widget(context, interaction, &counter.render_props()).await {
        Ok(message) => message,
        Err(e) => {
            counter.destroy();
            return Err(e);
        }
    };
    counter.attach_to(message);

    tokio::spawn(async move {
        let mut count: i64 = 0;

        while let Some(event) = events.recv().await {
            match event {
                WidgetEvent::Press(press) => {
                    handle_press(&counter, &mut count, press).await;
                }
                WidgetEvent::Timeout => {
                    tracing::debug!("[CMD] counter {} timed out at {}", counter.id(), count);
                }
                WidgetEvent::Destroy => break,
            }
        }
    });

    Ok(())
}

async fn handle_press(counter: &ButtonMessage, count: &mut i64, press: Press) {
    match press.slot {
        DECREMENT => *count -= 1,
        INCREMENT => *count += 1,
        DONE => {
            // Destroying strips the buttons and leaves the final count.
            counter.set_payload(counter_page(*count, true));
            counter.destroy();
        }
        _ => {}
    }

    counter.reset_timeout();
    counter.set_payload(counter_page(*count, false));

    if let Err(e) = counter.respond(press.interaction.as_ref()).await {
        tracing::warn!("[CMD] failed to update counter: {}", e);
    }
}

fn counter_page(count: i64, finished: bool) -> Page {
    let (title, colour) = if finished {
        ("Final count", Colour::DARK_GREEN)
    } else {
        ("Counter", Colour::BLURPLE)
    };

    Page::embed(
        CreateEmbed::new()
            .title(title)
            .description(format!("**{}**", count))
            .color(colour),
    )
}

pub fn register() -> CreateCommand {
    CreateCommand::new("counter")
        .description("Start a counter you control with buttons")
        .contexts(vec![
            InteractionContext::Guild,
            InteractionContext::PrivateChannel,
        ])
}
