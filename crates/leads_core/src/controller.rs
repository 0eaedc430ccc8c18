use crate::{
    update, ChannelState, ControllerState, Effect, Generation, Msg, PageDelta, ResultView,
    StartError,
};

/// Receives a fresh view whenever the result set, channel state or page changes.
pub trait ViewObserver {
    fn on_change(&mut self, view: &ResultView);
}

impl<F> ViewObserver for F
where
    F: FnMut(&ResultView),
{
    fn on_change(&mut self, view: &ResultView) {
        self(view)
    }
}

/// Owns one run's state and notifies an observer as it changes.
///
/// A controller runs once: build a new one, with a new generation, to start over.
pub struct ResultStreamController<O> {
    state: ControllerState,
    observer: O,
}

impl<O: ViewObserver> ResultStreamController<O> {
    pub fn new(generation: Generation, page_size: usize, observer: O) -> Self {
        Self {
            state: ControllerState::new(generation, page_size),
            observer,
        }
    }

    pub fn generation(&self) -> Generation {
        self.state.generation()
    }

    pub fn channel(&self) -> &ChannelState {
        self.state.channel()
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// Begin the run. Without a `request_id` the live channel is skipped and
    /// results are fetched in one request.
    pub fn start(
        &mut self,
        campaign_ids: Vec<String>,
        request_id: Option<String>,
    ) -> Result<Vec<Effect>, StartError> {
        if *self.state.channel() != ChannelState::Idle {
            return Err(StartError::AlreadyStarted);
        }
        if campaign_ids.is_empty() {
            return Err(StartError::NoCampaigns);
        }
        Ok(self.handle(Msg::Start {
            campaign_ids,
            request_id,
        }))
    }

    pub fn request_page(&mut self, delta: PageDelta) -> usize {
        self.handle(Msg::PageRequested(delta));
        self.state.cursor().current_page()
    }

    pub fn current_view(&self) -> ResultView {
        self.state.view()
    }

    /// Apply one message, notifying the observer if anything visible changed.
    pub fn handle(&mut self, msg: Msg) -> Vec<Effect> {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let was_dirty = state.consume_dirty();
        self.state = state;
        if was_dirty {
            let view = self.state.view();
            self.observer.on_change(&view);
        }
        effects
    }
}
