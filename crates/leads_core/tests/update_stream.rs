use std::sync::Once;

use leads_core::{
    update, ChannelState, ControllerState, Effect, Msg, PageDelta, ProcessingStatus,
    ResultRecord, StreamError,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

const RUN: u64 = 7;

fn streaming_state() -> ControllerState {
    let (state, effects) = update(
        ControllerState::new(RUN, 5),
        Msg::Start {
            campaign_ids: vec!["c1".to_string(), "c2".to_string()],
            request_id: Some("req-1".to_string()),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::OpenStream {
            generation: RUN,
            request_id: "req-1".to_string(),
        }]
    );
    state
}

fn message(state: ControllerState, payload: serde_json::Value) -> (ControllerState, Vec<Effect>) {
    update(
        state,
        Msg::StreamMessage {
            generation: RUN,
            data: payload.to_string(),
        },
    )
}

fn raw_records(count: usize) -> serde_json::Value {
    let items: Vec<_> = (0..count)
        .map(|i| json!({"Name": format!("Lead {i}"), "LinkedIn": format!("https://l/{i}"), "InputField": format!("\"msg {i}\"")}))
        .collect();
    json!(items)
}

#[test]
fn start_opens_stream() {
    init_logging();
    let mut state = streaming_state();
    assert_eq!(
        *state.channel(),
        ChannelState::Streaming {
            consecutive_errors: 0
        }
    );
    assert!(state.consume_dirty());
}

#[test]
fn results_replace_record_set_and_normalize() {
    init_logging();
    let state = streaming_state();
    let (mut state, effects) = message(
        state,
        json!({"status": "processing", "processed_count": 3, "results": raw_records(3)}),
    );
    assert!(effects.is_empty());
    assert!(state.consume_dirty());
    assert_eq!(state.records().len(), 3);
    assert_eq!(
        state.records()[0],
        ResultRecord::new("Lead 0", "https://l/0", "msg 0")
    );

    // Wholesale replacement, not a merge.
    let (state, _) = message(
        state,
        json!({"status": "processing", "results": [{"Name": "Only"}]}),
    );
    assert_eq!(state.records(), &[ResultRecord::new("Only", "", "")]);

    let progress = state.view().progress.unwrap();
    assert_eq!(progress.status, ProcessingStatus::Processing);
    assert_eq!(progress.total_campaigns, 2);
}

#[test]
fn empty_results_do_not_clear_existing_records() {
    init_logging();
    let state = streaming_state();
    let (state, _) = message(state, json!({"results": raw_records(2)}));
    let (state, _) = message(state, json!({"status": "processing", "results": []}));
    assert_eq!(state.records().len(), 2);
}

#[test]
fn malformed_message_is_skipped() {
    init_logging();
    let state = streaming_state();
    let (state, _) = message(state, json!({"results": raw_records(1)}));
    let before = state.clone();

    let (state, effects) = update(
        state,
        Msg::StreamMessage {
            generation: RUN,
            data: "{not json".to_string(),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state, before);
}

#[test]
fn final_flag_completes_and_closes() {
    init_logging();
    let state = streaming_state();
    let (state, effects) = message(
        state,
        json!({"status": "processing", "is_final": true, "results": raw_records(4)}),
    );
    assert_eq!(*state.channel(), ChannelState::Completed);
    assert_eq!(effects, vec![Effect::CloseStream { generation: RUN }]);
    assert_eq!(state.records().len(), 4);

    // Terminal: later messages are ignored.
    let (state, effects) = message(state, json!({"results": raw_records(9)}));
    assert!(effects.is_empty());
    assert_eq!(state.records().len(), 4);
}

#[test]
fn final_message_with_mistyped_fields_still_completes() {
    init_logging();
    let state = streaming_state();
    let (state, effects) = message(
        state,
        json!({"is_final": true, "message": 42, "results": [{"Name": "A"}], "status": "completed"}),
    );
    assert_eq!(*state.channel(), ChannelState::Completed);
    assert_eq!(effects, vec![Effect::CloseStream { generation: RUN }]);
    assert_eq!(state.records(), &[ResultRecord::new("A", "", "")]);

    let state = streaming_state();
    let (state, effects) = message(state, json!({"status": null, "is_final": true}));
    assert_eq!(*state.channel(), ChannelState::Completed);
    assert_eq!(effects, vec![Effect::CloseStream { generation: RUN }]);
}

#[test]
fn error_status_fails_the_run() {
    init_logging();
    let state = streaming_state();
    let (state, effects) = message(state, json!({"status": "error", "message": "quota"}));
    assert_eq!(
        *state.channel(),
        ChannelState::Failed {
            error: StreamError::Remote("quota".to_string())
        }
    );
    assert_eq!(effects, vec![Effect::CloseStream { generation: RUN }]);
    assert_eq!(
        state.view().error().as_deref(),
        Some("processing failed: quota")
    );
}

#[test]
fn stale_generation_is_discarded() {
    init_logging();
    let state = streaming_state();
    let before = state.clone();
    let (state, effects) = update(
        state,
        Msg::StreamMessage {
            generation: RUN - 1,
            data: json!({"results": raw_records(2), "is_final": true}).to_string(),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state, before);

    let (state, effects) = update(
        state,
        Msg::FetchCompleted {
            generation: RUN + 1,
            result: Ok(raw_records(2)),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state, before);
}

#[test]
fn shrinking_results_reclamp_page() {
    init_logging();
    let state = streaming_state();
    let (state, _) = message(state, json!({"results": raw_records(12)}));
    let (state, _) = update(state, Msg::PageRequested(PageDelta::Next));
    let (state, _) = update(state, Msg::PageRequested(PageDelta::Next));
    assert_eq!(state.view().page, 3);
    assert_eq!(state.view().total_pages, 3);

    let (state, _) = message(state, json!({"results": raw_records(6)}));
    let view = state.view();
    assert_eq!(view.page, 2);
    assert_eq!(view.total_pages, 2);
    assert_eq!(view.first_index, 6);
    assert_eq!(view.last_index, 6);
    assert_eq!(view.records.len(), 1);
}

#[test]
fn second_start_is_ignored() {
    init_logging();
    let state = streaming_state();
    let before = state.clone();
    let (state, effects) = update(
        state,
        Msg::Start {
            campaign_ids: vec!["c3".to_string()],
            request_id: Some("req-2".to_string()),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state, before);
}
