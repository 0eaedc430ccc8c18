use crate::{ChannelState, ProcessingStatus, ResultRecord};

/// Snapshot handed to the display layer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultView {
    /// Records on the current page only.
    pub records: Vec<ResultRecord>,
    pub page: usize,
    pub total_pages: usize,
    pub total_records: usize,
    /// 1-based index of the first record shown; 0 when nothing is shown.
    pub first_index: usize,
    pub last_index: usize,
    pub channel: ChannelState,
    pub retrying: bool,
    pub progress: Option<ProgressView>,
}

impl ResultView {
    pub fn phase(&self) -> &'static str {
        self.channel.label()
    }

    pub fn error(&self) -> Option<String> {
        match &self.channel {
            ChannelState::Failed { error } => Some(error.to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressView {
    pub status: ProcessingStatus,
    pub processed_count: u64,
    pub completed_campaigns: usize,
    pub total_campaigns: usize,
}
