//! System clipboard for handing a token to the next program.

use std::io::IsTerminal;

pub trait Clipboard {
    fn set_text(&self, text: &str) -> anyhow::Result<()>;
}

/// The desktop clipboard via `arboard`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClipboard;

impl SystemClipboard {
    /// The clipboard when a person is watching stdout; `None` when it is piped.
    #[must_use]
    pub fn for_terminal() -> Option<Self> {
        std::io::stdout().is_terminal().then_some(Self)
    }
}

impl Clipboard for SystemClipboard {
    fn set_text(&self, text: &str) -> anyhow::Result<()> {
        arboard::Clipboard::new()?.set_text(text)?;
        Ok(())
    }
}
