use std::collections::HashMap;
use std::sync::{mpsc, Arc};
use std::thread;

use engine_logging::{engine_debug, engine_error};
use tokio_util::sync::CancellationToken;

use crate::fetch::{ApiSettings, LeadFetcher, ReqwestLeadFetcher};
use crate::stream::StatusStreamer;
use crate::{EngineEvent, Generation};

/// Receives engine events from the background runtime.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

enum EngineCommand {
    OpenStream {
        generation: Generation,
        request_id: String,
    },
    CloseStream {
        generation: Generation,
    },
    FetchLeads {
        generation: Generation,
        campaign_ids: Vec<String>,
    },
}

/// Runs network IO on a background tokio runtime and reports through an [`EventSink`].
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    pub fn new(settings: ApiSettings, sink: Arc<dyn EventSink>) -> Self {
        let fetcher: Arc<dyn LeadFetcher> = Arc::new(ReqwestLeadFetcher::new(settings.clone()));
        Self::with_fetcher(settings, fetcher, sink)
    }

    pub fn with_fetcher(
        settings: ApiSettings,
        fetcher: Arc<dyn LeadFetcher>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let streamer = Arc::new(StatusStreamer::new(settings));

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    engine_error!("Could not start the engine runtime: {}", err);
                    return;
                }
            };
            let mut streams: HashMap<Generation, CancellationToken> = HashMap::new();
            while let Ok(command) = cmd_rx.recv() {
                handle_command(&runtime, &mut streams, &streamer, &fetcher, &sink, command);
            }
            for token in streams.values() {
                token.cancel();
            }
        });

        Self { cmd_tx }
    }

    pub fn open_stream(&self, generation: Generation, request_id: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::OpenStream {
            generation,
            request_id: request_id.into(),
        });
    }

    pub fn close_stream(&self, generation: Generation) {
        let _ = self.cmd_tx.send(EngineCommand::CloseStream { generation });
    }

    pub fn fetch_leads(&self, generation: Generation, campaign_ids: Vec<String>) {
        let _ = self.cmd_tx.send(EngineCommand::FetchLeads {
            generation,
            campaign_ids,
        });
    }
}

fn handle_command(
    runtime: &tokio::runtime::Runtime,
    streams: &mut HashMap<Generation, CancellationToken>,
    streamer: &Arc<StatusStreamer>,
    fetcher: &Arc<dyn LeadFetcher>,
    sink: &Arc<dyn EventSink>,
    command: EngineCommand,
) {
    match command {
        EngineCommand::OpenStream {
            generation,
            request_id,
        } => {
            let token = CancellationToken::new();
            // One live channel per run.
            if let Some(previous) = streams.insert(generation, token.clone()) {
                previous.cancel();
            }
            let streamer = streamer.clone();
            let sink = sink.clone();
            runtime.spawn(async move {
                streamer
                    .run(generation, &request_id, sink.as_ref(), token)
                    .await;
            });
        }
        EngineCommand::CloseStream { generation } => {
            if let Some(token) = streams.remove(&generation) {
                token.cancel();
            } else {
                engine_debug!("No live channel open for run {}", generation);
            }
        }
        EngineCommand::FetchLeads {
            generation,
            campaign_ids,
        } => {
            let fetcher = fetcher.clone();
            let sink = sink.clone();
            runtime.spawn(async move {
                let result = fetcher.fetch_leads(&campaign_ids).await;
                sink.emit(EngineEvent::FetchCompleted { generation, result });
            });
        }
    }
}
