use std::cell::RefCell;
use std::rc::Rc;

use leads_core::{
    ChannelState, Effect, Msg, PageDelta, ResultStreamController, ResultView, StartError,
};
use serde_json::json;

fn recording_controller() -> (
    ResultStreamController<impl FnMut(&ResultView)>,
    Rc<RefCell<Vec<ResultView>>>,
) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let controller = ResultStreamController::new(1, 5, move |view: &ResultView| {
        sink.borrow_mut().push(view.clone());
    });
    (controller, seen)
}

fn records(count: usize) -> serde_json::Value {
    json!((0..count).map(|i| json!({"Name": format!("n{i}")})).collect::<Vec<_>>())
}

#[test]
fn start_twice_is_rejected() {
    let (mut controller, _) = recording_controller();
    let effects = controller
        .start(vec!["c".to_string()], Some("r".to_string()))
        .unwrap();
    assert_eq!(effects.len(), 1);
    assert_eq!(
        controller.start(vec!["c".to_string()], None),
        Err(StartError::AlreadyStarted)
    );
}

#[test]
fn start_without_campaigns_is_rejected() {
    let (mut controller, seen) = recording_controller();
    assert_eq!(controller.start(Vec::new(), None), Err(StartError::NoCampaigns));
    assert_eq!(*controller.channel(), ChannelState::Idle);
    assert!(seen.borrow().is_empty());
}

#[test]
fn observer_sees_state_and_result_changes() {
    let (mut controller, seen) = recording_controller();
    controller
        .start(vec!["c".to_string()], Some("r".to_string()))
        .unwrap();
    assert_eq!(seen.borrow().len(), 1);
    assert_eq!(seen.borrow()[0].phase(), "Streaming");

    controller.handle(Msg::StreamMessage {
        generation: 1,
        data: json!({"results": records(7)}).to_string(),
    });
    assert_eq!(seen.borrow().len(), 2);
    assert_eq!(seen.borrow()[1].total_records, 7);

    // Undecodable messages change nothing and notify nobody.
    controller.handle(Msg::StreamMessage {
        generation: 1,
        data: "oops".to_string(),
    });
    assert_eq!(seen.borrow().len(), 2);
}

#[test]
fn request_page_moves_within_bounds() {
    let (mut controller, seen) = recording_controller();
    controller.start(vec!["c".to_string()], None).unwrap();
    let effects = controller.handle(Msg::FetchCompleted {
        generation: 1,
        result: Ok(records(12)),
    });
    assert!(effects.is_empty());

    assert_eq!(controller.request_page(PageDelta::Previous), 1);
    assert_eq!(controller.request_page(PageDelta::Next), 2);
    assert_eq!(controller.request_page(PageDelta::Next), 3);
    let notified = seen.borrow().len();
    assert_eq!(controller.request_page(PageDelta::Next), 3);
    assert_eq!(seen.borrow().len(), notified);

    let view = controller.current_view();
    assert_eq!(view.page, 3);
    assert_eq!(view.total_pages, 3);
    assert_eq!(view.records.len(), 2);
    assert_eq!(view.records[0].name, "n10");
}

#[test]
fn fallback_effects_flow_through_controller() {
    let (mut controller, _) = recording_controller();
    controller
        .start(vec!["c".to_string()], Some("r".to_string()))
        .unwrap();
    let mut effects = Vec::new();
    for _ in 0..4 {
        effects.extend(controller.handle(Msg::StreamError {
            generation: 1,
            message: "down".to_string(),
        }));
    }
    let fetches = effects
        .iter()
        .filter(|effect| matches!(effect, Effect::FetchLeads { .. }))
        .count();
    assert_eq!(fetches, 1);
    assert_eq!(*controller.channel(), ChannelState::Polling);
}
