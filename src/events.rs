use serde::Serialize;

/// External requests for the rotator task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridCommand {
    /// Drop the current session, refetch the images and start over.
    Reload,
}

/// What the presentation layer needs to draw the grid.
///
/// `window` may be shorter than `slots`; the missing tiles render as placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct GridSnapshot {
    pub slots: usize,
    pub window: Vec<String>,
    /// Bumped every time a new session is initialized.
    pub session: u64,
    /// Bumped on every visible change within a session.
    pub revision: u64,
    /// Slot changed by the most recent tick, if any.
    pub last_replaced: Option<usize>,
}

impl GridSnapshot {
    pub fn empty(slots: usize) -> Self {
        Self {
            slots,
            window: Vec::new(),
            session: 0,
            revision: 0,
            last_replaced: None,
        }
    }
}
