//! Lead viewer core: pure result-stream state machine and view-model helpers.
mod controller;
mod effect;
mod error;
mod event;
mod msg;
mod pagination;
mod record;
mod state;
mod update;
mod view_model;

pub use controller::{ResultStreamController, ViewObserver};
pub use effect::Effect;
pub use error::{StartError, StreamError};
pub use event::{parse_status_event, ProcessingStatus, StatusEvent};
pub use msg::Msg;
pub use pagination::{PageDelta, PaginationCursor, DEFAULT_PAGE_SIZE};
pub use record::{
    normalize_record, normalize_records, parse_fetch_body, strip_paired_quotes, ResultRecord,
};
pub use state::{ChannelState, ControllerState, Generation, Progress, CHANNEL_ERROR_THRESHOLD};
pub use update::update;
pub use view_model::{ProgressView, ResultView};
