use serenity::all::{ButtonStyle, CreateEmbed};

/// Discord allows five rows of five buttons.
pub const MAX_CONTROLS: usize = 25;

/// Whatever a widget shows above its buttons. Widgets never look inside.
#[derive(Clone, Debug, Default)]
pub struct Page {
    pub content: Option<String>,
    pub embeds: Vec<CreateEmbed>,
}

impl Page {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            embeds: Vec::new(),
        }
    }

    pub fn embed(embed: CreateEmbed) -> Self {
        Self {
            content: None,
            embeds: vec![embed],
        }
    }
}

/// A single button.
#[derive(Clone, Debug, PartialEq)]
pub struct Control {
    pub label: Option<String>,
    pub emoji: Option<String>,
    pub style: ButtonStyle,
    pub disabled: bool,
    /// Link buttons are opened by the client and never reach the bot.
    pub url: Option<String>,
}

impl Control {
    pub fn button(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            emoji: None,
            style: ButtonStyle::Secondary,
            disabled: false,
            url: None,
        }
    }

    pub fn link(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            emoji: None,
            style: ButtonStyle::Secondary,
            disabled: false,
            url: Some(url.into()),
        }
    }

    pub fn emoji_only(emoji: impl Into<String>) -> Self {
        Self {
            label: None,
            emoji: Some(emoji.into()),
            style: ButtonStyle::Secondary,
            disabled: false,
            url: None,
        }
    }

    pub fn style(mut self, style: ButtonStyle) -> Self {
        self.style = style;
        self
    }

    pub fn emoji(mut self, emoji: impl Into<String>) -> Self {
        self.emoji = Some(emoji.into());
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn is_link(&self) -> bool {
        self.url.is_some()
    }
}

/// A control as it goes out to the platform. `custom_id` is `None` for links.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedControl {
    pub custom_id: Option<String>,
    pub control: Control,
}

/// What a widget wants the message to look like right now.
#[derive(Clone, Debug, Default)]
pub struct RenderProps {
    pub page: Page,
    pub controls: Vec<RenderedControl>,
}

impl RenderProps {
    /// The page with every control stripped off.
    pub fn bare(page: Page) -> Self {
        Self {
            page,
            controls: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn custom_ids(&self) -> impl Iterator<Item = &str> {
        self.controls.iter().filter_map(|c| c.custom_id.as_deref())
    }
}
