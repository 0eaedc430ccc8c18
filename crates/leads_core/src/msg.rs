use serde_json::Value;

use crate::{Generation, PageDelta};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Begin a run. Without a request id the live channel is skipped.
    Start {
        campaign_ids: Vec<String>,
        request_id: Option<String>,
    },
    /// Raw `data` payload of one live-channel event.
    StreamMessage { generation: Generation, data: String },
    /// The live channel failed; the engine reconnects unless told to close.
    StreamError {
        generation: Generation,
        message: String,
    },
    /// One-shot fetch finished. `Ok` carries the decoded JSON body.
    FetchCompleted {
        generation: Generation,
        result: Result<Value, String>,
    },
    /// User asked for the previous or next page.
    PageRequested(PageDelta),
}
