use crate::view_model::{ProgressView, ResultView};
use crate::{PaginationCursor, ProcessingStatus, ResultRecord, StreamError};

/// Identifies one controller run; engine events carry it back.
pub type Generation = u64;

/// Channel errors tolerated before the live channel is abandoned.
pub const CHANNEL_ERROR_THRESHOLD: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ChannelState {
    #[default]
    Idle,
    Streaming {
        consecutive_errors: u32,
    },
    Polling,
    Completed,
    Failed {
        error: StreamError,
    },
}

impl ChannelState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChannelState::Completed | ChannelState::Failed { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChannelState::Idle => "Idle",
            ChannelState::Streaming { .. } => "Streaming",
            ChannelState::Polling => "Polling",
            ChannelState::Completed => "Completed",
            ChannelState::Failed { .. } => "Failed",
        }
    }
}

/// Latest progress reported by the live channel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Progress {
    pub status: ProcessingStatus,
    pub processed_count: u64,
    pub completed_campaigns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ControllerState {
    generation: Generation,
    channel: ChannelState,
    campaign_ids: Vec<String>,
    records: Vec<ResultRecord>,
    cursor: PaginationCursor,
    progress: Option<Progress>,
    dirty: bool,
}

impl ControllerState {
    pub fn new(generation: Generation, page_size: usize) -> Self {
        Self {
            generation,
            cursor: PaginationCursor::new(page_size),
            ..Self::default()
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn channel(&self) -> &ChannelState {
        &self.channel
    }

    pub fn campaign_ids(&self) -> &[String] {
        &self.campaign_ids
    }

    pub fn records(&self) -> &[ResultRecord] {
        &self.records
    }

    pub fn cursor(&self) -> PaginationCursor {
        self.cursor
    }

    pub fn view(&self) -> ResultView {
        let len = self.records.len();
        let range = self.cursor.page_range(len);
        let retrying = matches!(
            self.channel,
            ChannelState::Streaming { consecutive_errors } if consecutive_errors > 0
        );
        ResultView {
            records: self.records[range.clone()].to_vec(),
            page: self.cursor.current_page(),
            total_pages: self.cursor.total_pages(len),
            total_records: len,
            first_index: if range.is_empty() { 0 } else { range.start + 1 },
            last_index: range.end,
            channel: self.channel.clone(),
            retrying,
            progress: self.progress.as_ref().map(|progress| ProgressView {
                status: progress.status,
                processed_count: progress.processed_count,
                completed_campaigns: progress.completed_campaigns.len(),
                total_campaigns: self.campaign_ids.len(),
            }),
        }
    }

    /// Returns whether anything visible changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn begin(&mut self, campaign_ids: Vec<String>, channel: ChannelState) {
        self.campaign_ids = campaign_ids;
        self.set_channel(channel);
    }

    pub(crate) fn set_channel(&mut self, channel: ChannelState) {
        if self.channel != channel {
            self.channel = channel;
            self.dirty = true;
        }
    }

    /// Replace the result set wholesale, re-clamping the cursor when the size changed.
    pub(crate) fn replace_records(&mut self, records: Vec<ResultRecord>) {
        let previous_len = self.records.len();
        if self.records != records {
            self.dirty = true;
        }
        self.records = records;
        if self.records.len() != previous_len {
            self.cursor.clamp(self.records.len());
        }
    }

    pub(crate) fn set_progress(&mut self, progress: Progress) {
        if self.progress.as_ref() != Some(&progress) {
            self.progress = Some(progress);
            self.dirty = true;
        }
    }

    pub(crate) fn cursor_mut(&mut self) -> &mut PaginationCursor {
        &mut self.cursor
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}
