//! Lead viewer engine: HTTP fetch, live status channel and export IO.
mod engine;
mod fetch;
mod persist;
mod stream;
mod types;

pub use engine::{ChannelEventSink, EngineHandle, EventSink};
pub use fetch::{ApiSettings, LeadFetcher, ReqwestLeadFetcher};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use stream::{open_status_stream, StatusStreamer};
pub use types::{EngineEvent, FailureKind, FetchError, Generation};
