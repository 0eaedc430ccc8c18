use eventsource_stream::Eventsource;
use futures_util::{Stream, StreamExt};
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use tokio_util::sync::CancellationToken;
use url::Url;

use engine_logging::{engine_debug, engine_info};

use crate::types::map_reqwest_error;
use crate::{ApiSettings, EngineEvent, EventSink, FailureKind, FetchError, Generation};

const STATUS_PATH: &str = "processing-status";

/// Open the live status channel and yield the `data` payload of each event.
///
/// Events without data (keep-alives) are dropped.
pub async fn open_status_stream(
    client: &reqwest::Client,
    url: Url,
) -> Result<impl Stream<Item = Result<String, FetchError>>, FetchError> {
    let response = client
        .get(url)
        .header(ACCEPT, "text/event-stream")
        .header(CACHE_CONTROL, "no-cache")
        .send()
        .await
        .map_err(map_reqwest_error)?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::new(
            FailureKind::HttpStatus(status.as_u16()),
            format!("HTTP {}", status.as_u16()),
        ));
    }

    let events = response
        .bytes_stream()
        .eventsource()
        .filter_map(|event| async move {
            match event {
                Ok(event) if event.data.is_empty() => None,
                Ok(event) => Some(Ok(event.data)),
                Err(err) => Some(Err(FetchError::new(FailureKind::Network, err.to_string()))),
            }
        });
    Ok(events)
}

/// Keeps one live status channel open, reconnecting after failures, until cancelled.
#[derive(Debug, Clone)]
pub struct StatusStreamer {
    settings: ApiSettings,
}

impl StatusStreamer {
    pub fn new(settings: ApiSettings) -> Self {
        Self { settings }
    }

    pub fn status_url(&self, request_id: &str) -> Result<Url, FetchError> {
        self.settings
            .endpoint(&format!("{STATUS_PATH}/{request_id}"))
    }

    pub async fn run(
        &self,
        generation: Generation,
        request_id: &str,
        sink: &dyn EventSink,
        cancel: CancellationToken,
    ) {
        loop {
            let error = tokio::select! {
                _ = cancel.cancelled() => break,
                error = self.consume(generation, request_id, sink) => error,
            };
            sink.emit(EngineEvent::StreamError { generation, error });

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.settings.retry_delay) => {}
            }
        }
        engine_info!("Live channel for run {} closed", generation);
    }

    /// Forward events until the channel breaks; the returned error says why.
    async fn consume(
        &self,
        generation: Generation,
        request_id: &str,
        sink: &dyn EventSink,
    ) -> FetchError {
        let url = match self.status_url(request_id) {
            Ok(url) => url,
            Err(err) => return err,
        };
        let client = match self.settings.build_client() {
            Ok(client) => client,
            Err(err) => return err,
        };

        engine_debug!("Opening live channel {}", url);
        let events = match open_status_stream(&client, url).await {
            Ok(events) => events,
            Err(err) => return err,
        };
        let mut events = std::pin::pin!(events);
        while let Some(event) = events.next().await {
            match event {
                Ok(data) => sink.emit(EngineEvent::StreamMessage { generation, data }),
                Err(err) => return err,
            }
        }
        FetchError::new(FailureKind::StreamClosed, "server closed the live channel")
    }
}
