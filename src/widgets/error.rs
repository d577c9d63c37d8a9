use thiserror::Error;

#[derive(Debug, Error)]
pub enum WidgetError {
    /// A widget was built with no controls or more than the platform can show.
    #[error("a widget needs between 1 and 25 controls, got {0}")]
    InvalidControlCount(usize),
    /// The page index escaped its clamping rules. Always a bug in the engine.
    /// `-1` stands for "no page selected".
    #[error("page index {index} is out of range for {len} pages")]
    IndexOutOfRange { index: i64, len: usize },
    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransportError {
    /// The message was deleted before we could touch it.
    #[error("message no longer exists")]
    MessageGone,
    #[error("platform request failed: {0}")]
    Request(String),
}
