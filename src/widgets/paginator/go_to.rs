use std::sync::{Arc, LazyLock};

use regex::Regex;
use tokio::time::Instant;

use super::{GoToDialog, Inner, nav};
use crate::widgets::lock;
use crate::widgets::ports::{CollectedText, InteractionHandle, TextFilter};

static PAGE_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:page\s*|p\.?\s*|#)?(\d{1,9})\s*$").expect("page number pattern is valid")
});

/// Read a typed page number: `7`, `#7`, `p7`, `page 7`.
pub fn parse_page_number(input: &str) -> Option<usize> {
    PAGE_NUMBER
        .captures(input)?
        .get(1)?
        .as_str()
        .parse()
        .ok()
}

impl Inner {
    /// Open the prompt unless one is already waiting.
    pub(super) async fn open_go_to(self: Arc<Self>, interaction: Arc<dyn InteractionHandle>) {
        let (already_open, page_count) = {
            let state = lock(&self.state);
            if state.closed {
                return;
            }
            (state.go_to.is_some(), state.pages.len())
        };

        if page_count == 0 {
            if let Err(e) = interaction
                .reply("There are no pages to go to.".to_string(), true)
                .await
            {
                tracing::warn!("[PAGER] failed to send go-to notice: {}", e);
            }
            return;
        }

        if already_open {
            if let Err(e) = interaction
                .reply("I'm already waiting for a page number.".to_string(), true)
                .await
            {
                tracing::warn!("[PAGER] failed to send go-to notice: {}", e);
            }
            return;
        }

        let prompt = format!("Which page? Send a number between 1 and {page_count}.");
        if let Err(e) = interaction.reply(prompt, true).await {
            tracing::warn!("[PAGER] failed to send go-to prompt: {}", e);
        }

        let mut state = lock(&self.state);
        if state.closed || state.go_to.is_some() {
            return;
        }

        state.dialogs_opened += 1;
        let token = state.dialogs_opened;
        let task = tokio::spawn(Arc::clone(&self).run_go_to(token, interaction));
        state.go_to = Some(GoToDialog { token, task });

        tracing::debug!("[PAGER] {} opened go-to prompt #{}", self.base.id(), token);
    }

    /// Close the prompt `token` if it is still the open one. Exactly one of
    /// success, timeout and destroy gets `true`.
    fn close_go_to(&self, token: u64) -> bool {
        let mut state = lock(&self.state);

        match &state.go_to {
            Some(dialog) if dialog.token == token => {
                state.go_to = None;
                true
            }
            _ => false,
        }
    }

    async fn run_go_to(self: Arc<Self>, token: u64, interaction: Arc<dyn InteractionHandle>) {
        let deadline = Instant::now() + self.options.go_to_timeout;
        let channel_id = interaction.channel_id();
        let window = self.window;
        let filter: TextFilter = Arc::new(move |text: &CollectedText| {
            window.allowed(text.author_id, text.created_at)
                && parse_page_number(&text.content).is_some()
        });

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }

            let Some(text) = self
                .collector
                .next_text(channel_id, Arc::clone(&filter), remaining)
                .await
            else {
                break;
            };

            let Some(number) = parse_page_number(&text.content) else {
                continue;
            };

            let page_count = self.page_count();
            if number == 0 || number > page_count {
                let message = format!(
                    "There is no page {number}. Pick a number between 1 and {page_count}."
                );
                if let Err(e) = interaction.reply(message, true).await {
                    tracing::warn!("[PAGER] failed to send go-to error: {}", e);
                }
                continue;
            }

            if !self.close_go_to(token) {
                return;
            }

            if self.options.reset_on_navigate {
                self.base.reset_timeout();
            }
            self.update_and_render(|_, len| nav::clamp(number - 1, len))
                .await;

            if let Some(message) = text.message
                && let Err(e) = self.base.transport().delete(message).await
            {
                tracing::debug!("[PAGER] could not delete go-to answer: {}", e);
            }

            return;
        }

        if self.close_go_to(token)
            && let Err(e) = interaction
                .reply("No page number received, the prompt has closed.".to_string(), true)
                .await
        {
            tracing::debug!("[PAGER] failed to send go-to timeout notice: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page_number() {
        assert_eq!(parse_page_number("3"), Some(3));
        assert_eq!(parse_page_number("  12 "), Some(12));
        assert_eq!(parse_page_number("#4"), Some(4));
        assert_eq!(parse_page_number("Page 5"), Some(5));
        assert_eq!(parse_page_number("p.6"), Some(6));
        assert_eq!(parse_page_number("0"), Some(0));
    }

    #[test]
    fn test_parse_page_number_rejects_chatter() {
        assert_eq!(parse_page_number("hello"), None);
        assert_eq!(parse_page_number("3 please"), None);
        assert_eq!(parse_page_number("-2"), None);
        assert_eq!(parse_page_number(""), None);
        assert_eq!(parse_page_number("12345678901"), None);
    }
}
