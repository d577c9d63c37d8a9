use crate::bot::Handler;
use crate::bot::helpers::components;
use crate::widgets::{Page, Paginator};
use serenity::all::{
    Colour, CommandInteraction, CommandOptionType, Context, CreateEmbed, CreateEmbedFooter,
    InteractionContext, ResolvedOption, ResolvedValue,
};
use serenity::builder::{CreateCommand, CreateCommandOption};

pub async fn run(
    handler: &Handler,
    context: &Context,
    interaction: &CommandInteraction,
) -> anyhow::Result<()> {
    let mut page = 1;

    for option in &interaction.data.options() {
        if let ResolvedOption {
            name: "page",
            value: ResolvedValue::Integer(p),
            ..
        } = option
        {
            page = *p;
        }
    }

    let pager = Paginator::new(
        &handler.widgets(context),
        help_pages(),
        interaction.user.id.get(),
        handler.config.paginator_options(),
    );
    pager
        .set_page_index(usize::try_from(page - 1).unwrap_or(0))
        .await;

    let props = pager.render_props()?;
    let message = match components::respond_with_widget(context, interaction, &props).await {
        Ok(message) => message,
        Err(e) => {
            pager.destroy();
            return Err(e);
        }
    };
    pager.attach_to(message);

    tokio::spawn(async move {
        pager.closed().await;
        tracing::debug!("[CMD] help pager {} closed", pager.id());
    });

    Ok(())
}

fn help_pages() -> Vec<Page> {
    let pages = [
        CreateEmbed::new()
            .description("Here are the commands:")
            .field(
                "/help [page]",
                "Show this help message. Use the buttons below or the page option to navigate.",
                false,
            )
            .field(
                "/counter",
                "Start a counter you can bump up and down with buttons. Press **Done** to keep the result.",
                false,
            ),
        CreateEmbed::new()
            .description("How the buttons work:")
            .field(
                "⏮ ◀ ▶ ⏭",
                "Jump to the first page, step back, step forward or jump to the last page. Stepping past either end wraps around.",
                false,
            )
            .field(
                "Page counter",
                "Press the page counter in the middle, then type a page number in this channel to jump straight to it.",
                false,
            ),
        CreateEmbed::new()
            .description("Good to know:")
            .field(
                "Who can press",
                "Only the person who ran the command can use its buttons, unless the bot is configured to open them up after a while.",
                false,
            )
            .field(
                "Expiry",
                "Buttons stop working after a few minutes without use and are removed from the message.",
                false,
            ),
    ];

    let total = pages.len();

    pages
        .into_iter()
        .enumerate()
        .map(|(i, embed)| {
            Page::embed(
                embed
                    .title(format!("buttonboard Commands (Page {}/{})", i + 1, total))
                    .color(Colour::from_rgb(34, 197, 94))
                    .footer(CreateEmbedFooter::new(
                        "Buttons expire after a period of inactivity",
                    )),
            )
        })
        .collect()
}

pub fn register() -> CreateCommand {
    CreateCommand::new("help")
        .description("Show all available commands and their usage")
        .add_option(
            CreateCommandOption::new(CommandOptionType::Integer, "page", "Page number to open")
                .min_int_value(1)
                .required(false),
        )
        .contexts(vec![
            InteractionContext::Guild,
            InteractionContext::PrivateChannel,
        ])
}
