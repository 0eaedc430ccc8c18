use std::sync::{mpsc, Arc};

use engine_logging::{engine_info, engine_warn};
use leads_core::{Effect, Generation, Msg};
use leads_engine::{ApiSettings, EngineEvent, EngineHandle, EventSink};

use super::app::AppInput;

/// Where the main loop sends the effects its controller produces.
pub trait EffectDispatch {
    fn run(&self, effects: Vec<Effect>);

    /// Close a run's live channel without going through its controller.
    fn abandon(&self, generation: Generation);
}

/// Executes core effects on the engine and feeds engine events back as messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(settings: ApiSettings, input_tx: mpsc::Sender<AppInput>) -> Self {
        let sink = Arc::new(InputSink { input_tx });
        Self {
            engine: EngineHandle::new(settings, sink),
        }
    }
}

impl EffectDispatch for EffectRunner {
    fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::OpenStream {
                    generation,
                    request_id,
                } => {
                    engine_info!("OpenStream run={} request_id={}", generation, request_id);
                    self.engine.open_stream(generation, request_id);
                }
                Effect::CloseStream { generation } => {
                    engine_info!("CloseStream run={}", generation);
                    self.engine.close_stream(generation);
                }
                Effect::FetchLeads {
                    generation,
                    campaign_ids,
                } => {
                    engine_info!(
                        "FetchLeads run={} campaigns={}",
                        generation,
                        campaign_ids.len()
                    );
                    self.engine.fetch_leads(generation, campaign_ids);
                }
            }
        }
    }

    fn abandon(&self, generation: Generation) {
        self.engine.close_stream(generation);
    }
}

struct InputSink {
    input_tx: mpsc::Sender<AppInput>,
}

impl EventSink for InputSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.input_tx.send(AppInput::Engine(map_event(event)));
    }
}

pub(crate) fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::StreamMessage { generation, data } => Msg::StreamMessage { generation, data },
        EngineEvent::StreamError { generation, error } => Msg::StreamError {
            generation,
            message: format!("{} ({})", error, error.kind),
        },
        EngineEvent::FetchCompleted { generation, result } => Msg::FetchCompleted {
            generation,
            result: result.map_err(|err| {
                engine_warn!("Fetch for run {} failed: {} ({})", generation, err, err.kind);
                err.message
            }),
        },
    }
}
