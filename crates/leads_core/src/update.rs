use engine_logging::{engine_debug, engine_info, engine_warn};
use serde_json::Value;

use crate::state::{Progress, CHANNEL_ERROR_THRESHOLD};
use crate::{
    normalize_records, parse_fetch_body, parse_status_event, ChannelState, ControllerState, Effect,
    Generation, Msg, ProcessingStatus, StatusEvent, StreamError,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: ControllerState, msg: Msg) -> (ControllerState, Vec<Effect>) {
    let effects = match msg {
        Msg::Start {
            campaign_ids,
            request_id,
        } => start(&mut state, campaign_ids, request_id),
        Msg::StreamMessage { generation, data } => {
            if !accepts(&state, generation) || !is_streaming(&state) {
                return (state, Vec::new());
            }
            match parse_status_event(&data) {
                Ok(event) => apply_status_event(&mut state, event),
                Err(err) => {
                    // Whole-message parse failures are skipped; the channel stays open.
                    engine_debug!("Skipping live message: {}", err);
                    Vec::new()
                }
            }
        }
        Msg::StreamError {
            generation,
            message,
        } => {
            if !accepts(&state, generation) {
                return (state, Vec::new());
            }
            let consecutive_errors = match state.channel() {
                ChannelState::Streaming { consecutive_errors } => *consecutive_errors,
                _ => return (state, Vec::new()),
            };
            channel_error(&mut state, consecutive_errors + 1, message)
        }
        Msg::FetchCompleted { generation, result } => {
            if !accepts(&state, generation) || *state.channel() != ChannelState::Polling {
                return (state, Vec::new());
            }
            fetch_completed(&mut state, result);
            Vec::new()
        }
        Msg::PageRequested(delta) => {
            let len = state.records().len();
            if state.cursor_mut().step(delta, len) {
                state.mark_dirty();
            }
            Vec::new()
        }
    };

    (state, effects)
}

fn start(
    state: &mut ControllerState,
    campaign_ids: Vec<String>,
    request_id: Option<String>,
) -> Vec<Effect> {
    if *state.channel() != ChannelState::Idle {
        engine_warn!(
            "Ignoring start for run {} in state {}",
            state.generation(),
            state.channel().label()
        );
        return Vec::new();
    }
    if campaign_ids.is_empty() {
        engine_warn!("Ignoring start without campaign identifiers");
        return Vec::new();
    }

    let generation = state.generation();
    match request_id {
        Some(request_id) => {
            engine_info!(
                "Run {} streaming {} campaign(s) as request {}",
                generation,
                campaign_ids.len(),
                request_id
            );
            state.begin(
                campaign_ids,
                ChannelState::Streaming {
                    consecutive_errors: 0,
                },
            );
            vec![Effect::OpenStream {
                generation,
                request_id,
            }]
        }
        None => {
            engine_info!(
                "Run {} fetching {} campaign(s) without a live channel",
                generation,
                campaign_ids.len()
            );
            state.begin(campaign_ids.clone(), ChannelState::Polling);
            vec![Effect::FetchLeads {
                generation,
                campaign_ids,
            }]
        }
    }
}

fn accepts(state: &ControllerState, generation: Generation) -> bool {
    if state.generation() == generation {
        return true;
    }
    engine_debug!(
        "Discarding event from run {} (current run {})",
        generation,
        state.generation()
    );
    false
}

fn is_streaming(state: &ControllerState) -> bool {
    matches!(state.channel(), ChannelState::Streaming { .. })
}

fn apply_status_event(state: &mut ControllerState, event: StatusEvent) -> Vec<Effect> {
    state.set_channel(ChannelState::Streaming {
        consecutive_errors: 0,
    });
    state.set_progress(Progress {
        status: event.status,
        processed_count: event.processed_count,
        completed_campaigns: event.completed_campaigns.clone(),
    });

    if let Some(items) = event.result_items().filter(|items| !items.is_empty()) {
        state.replace_records(normalize_records(items));
    }

    if !event.is_end_of_stream() {
        return Vec::new();
    }

    let generation = state.generation();
    if event.status == ProcessingStatus::Error {
        let reason = event
            .message
            .unwrap_or_else(|| "the service reported an error".to_string());
        engine_warn!("Run {} ended with a processing error: {}", generation, reason);
        state.set_channel(ChannelState::Failed {
            error: StreamError::Remote(reason),
        });
    } else {
        engine_info!(
            "Run {} completed with {} result(s)",
            generation,
            state.records().len()
        );
        state.set_channel(ChannelState::Completed);
    }
    vec![Effect::CloseStream { generation }]
}

fn channel_error(state: &mut ControllerState, consecutive_errors: u32, message: String) -> Vec<Effect> {
    let generation = state.generation();
    engine_warn!(
        "Run {} {}",
        generation,
        channel_error_note(consecutive_errors, &message)
    );

    if consecutive_errors <= CHANNEL_ERROR_THRESHOLD {
        state.set_channel(ChannelState::Streaming { consecutive_errors });
        return Vec::new();
    }

    if !state.records().is_empty() {
        engine_info!(
            "Run {} giving up on the live channel; keeping {} partial result(s)",
            generation,
            state.records().len()
        );
        state.set_channel(ChannelState::Completed);
        return vec![Effect::CloseStream { generation }];
    }

    engine_info!("Run {} falling back to a one-shot fetch", generation);
    state.set_channel(ChannelState::Polling);
    vec![
        Effect::CloseStream { generation },
        Effect::FetchLeads {
            generation,
            campaign_ids: state.campaign_ids().to_vec(),
        },
    ]
}

fn fetch_completed(state: &mut ControllerState, result: Result<Value, String>) {
    let generation = state.generation();
    let outcome = result
        .map_err(StreamError::Fetch)
        .and_then(|body| parse_fetch_body(&body));
    match outcome {
        Ok(records) => {
            engine_info!("Run {} fetched {} result(s)", generation, records.len());
            state.replace_records(records);
            state.set_channel(ChannelState::Completed);
        }
        Err(error) => {
            engine_warn!("Run {} failed: {}", generation, error);
            state.set_channel(ChannelState::Failed { error });
        }
    }
}

fn channel_error_note(consecutive_errors: u32, message: &str) -> String {
    if consecutive_errors <= CHANNEL_ERROR_THRESHOLD {
        format!("live channel error {consecutive_errors}/{CHANNEL_ERROR_THRESHOLD}: {message}")
    } else {
        format!("live channel error {consecutive_errors} in a row: {message}")
    }
}
