//! The search flow as the user drives it: one current result or one error,
//! the history log, and a playback handle that is stopped before anything
//! replaces what is being read.

use nb_core::{AppData, Error, HistoryItem};
use nb_inference::SummaryAggregator;
use nb_speech::{PlaybackCommand, PlaybackHandle};
use nb_storage::HistoryStore;
use tracing::{error, info};

#[derive(Debug)]
pub enum SearchOutcome {
    /// Blank query, nothing was sent.
    Skipped,
    Loaded,
    /// The user-facing message is kept in [`SearchSession::error`].
    Failed(Error),
}

pub struct SearchSession {
    /// `None` for replay-only sessions that never reach a relay.
    aggregator: Option<SummaryAggregator>,
    history: HistoryStore,
    playback: Option<PlaybackHandle>,
    autoplay: bool,
    current: Option<AppData>,
    error: Option<String>,
}

impl SearchSession {
    pub fn new(aggregator: SummaryAggregator, history: HistoryStore) -> Self {
        Self::with_aggregator(Some(aggregator), history)
    }

    /// A session over stored history only; searching fails with a config error.
    pub fn replay(history: HistoryStore) -> Self {
        Self::with_aggregator(None, history)
    }

    fn with_aggregator(aggregator: Option<SummaryAggregator>, history: HistoryStore) -> Self {
        Self {
            aggregator,
            history,
            playback: None,
            autoplay: false,
            current: None,
            error: None,
        }
    }

    /// Attaches playback; with `autoplay`, fresh results are read out at once.
    pub fn with_playback(mut self, handle: PlaybackHandle, autoplay: bool) -> Self {
        self.playback = Some(handle);
        self.autoplay = autoplay;
        self
    }

    pub fn current(&self) -> Option<&AppData> {
        self.current.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    fn stop_playback(&self) {
        if let Some(handle) = &self.playback {
            handle.stop();
        }
    }

    fn autoplay_current(&self) {
        if let (true, Some(handle), Some(data)) = (self.autoplay, &self.playback, &self.current) {
            if !data.is_empty() {
                handle.send(PlaybackCommand::StartAutoPlay(data.summaries.clone()));
            }
        }
    }

    pub async fn search(&mut self, query: &str) -> SearchOutcome {
        if query.trim().is_empty() {
            return SearchOutcome::Skipped;
        }

        self.stop_playback();
        self.current = None;
        self.error = None;

        let result = match &self.aggregator {
            Some(aggregator) => aggregator.fetch_news_summary(query).await,
            None => Err(Error::Config("no relay configured for searching".to_string())),
        };

        match result {
            Ok(data) => {
                if let Err(e) = self.history.append(HistoryItem::new(query, data.clone())).await {
                    error!("Failed to save search history: {}", e);
                }
                self.current = Some(data);
                self.autoplay_current();
                SearchOutcome::Loaded
            }
            Err(e) => {
                error!("Search for {:?} failed: {}", query, e);
                self.error = Some(e.user_message().to_string());
                SearchOutcome::Failed(e)
            }
        }
    }

    /// Shows a stored result again without contacting the relay.
    pub fn select_history(&mut self, id: &str) -> Option<&AppData> {
        let data = self.history.get(id)?.data.clone();
        self.stop_playback();
        info!("📚 Restoring history item {}", id);
        self.current = Some(data);
        self.error = None;
        self.autoplay_current();
        self.current.as_ref()
    }
}
