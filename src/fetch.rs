use std::fmt;

/// Where a view is in its fetch cycle.
///
/// A view moves to `Loading` when its parameters change, then to `Loaded` or
/// `Failed` when the response is in. Data from the last successful load is
/// kept across a failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

impl LoadState {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadState::Loaded)
    }
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadState::Idle => f.write_str("idle"),
            LoadState::Loading => f.write_str("loading"),
            LoadState::Loaded => f.write_str("loaded"),
            LoadState::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}
