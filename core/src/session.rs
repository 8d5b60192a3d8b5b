//! Watch session: setup, event consumption and shutdown.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::config::WatchConfig;
use crate::debounce::{Debouncer, Reporter};
use crate::enumerate::{Subscriber, enumerate};
use crate::error::{Result, WatcherError};
use crate::event::{ChangeEvent, ChangeKind};
use crate::filter::PatternFilter;

/// The two streams produced by a notification primitive.
pub struct RawStreams {
    /// Change events, in delivery order.
    pub events: mpsc::UnboundedReceiver<ChangeEvent>,

    /// Fatal errors raised asynchronously by the primitive.
    pub errors: mpsc::UnboundedReceiver<WatcherError>,
}

/// Notification primitive backed by the platform's recommended watcher.
pub struct NotifySubscriber {
    watcher: RecommendedWatcher,
}

impl NotifySubscriber {
    /// Create the watcher and the streams it feeds.
    pub fn new() -> Result<(Self, RawStreams)> {
        let (event_tx, events) = mpsc::unbounded_channel();
        let (error_tx, errors) = mpsc::unbounded_channel();

        let watcher = notify::recommended_watcher(
            move |res: std::result::Result<notify::Event, notify::Error>| match res {
                Ok(event) => {
                    let Some(kind) = ChangeKind::from_notify(event.kind) else {
                        return;
                    };
                    for path in event.paths {
                        // The session is gone once the receiver is dropped.
                        let _ = event_tx.send(ChangeEvent::new(kind, path));
                    }
                }
                Err(e) => {
                    let _ = error_tx.send(WatcherError::Notify(e));
                }
            },
        )?;

        Ok((Self { watcher }, RawStreams { events, errors }))
    }
}

impl Subscriber for NotifySubscriber {
    fn subscribe(&mut self, dir: &Path) -> Result<()> {
        self.watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(|source| WatcherError::Subscribe {
                path: dir.to_path_buf(),
                source,
            })
    }
}

/// A running watch session.
///
/// Dropping the session without [`WatchSession::close`] stops delivery of
/// new events but leaves an already armed report to fire.
pub struct WatchSession {
    subscriber: Option<Box<dyn Subscriber + Send>>,
    subscriptions: Vec<PathBuf>,
    debouncer: Arc<Debouncer>,
    shutdown: CancellationToken,
    consumer: Option<JoinHandle<()>>,
    errors: mpsc::UnboundedReceiver<WatcherError>,
}

impl WatchSession {
    /// Start watching with the platform's notification primitive.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(config: &WatchConfig, reporter: Reporter) -> Result<Self> {
        let (subscriber, streams) = NotifySubscriber::new()?;
        Self::start_with(config, subscriber, streams, reporter)
    }

    /// Start watching with a caller supplied notification primitive.
    ///
    /// Every watch root is enumerated and registered before the consumption
    /// loop starts; any failure aborts setup and nothing keeps running.
    pub fn start_with<S>(
        config: &WatchConfig,
        mut subscriber: S,
        streams: RawStreams,
        reporter: Reporter,
    ) -> Result<Self>
    where
        S: Subscriber + Send + 'static,
    {
        let filter = Arc::new(PatternFilter::from_config(config));

        let mut subscriptions = Vec::new();
        for root in config.resolved_watch_dirs() {
            let registered = enumerate(
                &root,
                config.recursive,
                config.limit,
                &filter,
                &mut subscriber,
            )?;
            subscriptions.extend(registered);
        }

        let debouncer = Arc::new(Debouncer::new(config.delay, reporter));
        let shutdown = CancellationToken::new();
        let (fatal_tx, errors) = mpsc::unbounded_channel();

        let consumer = tokio::spawn(consume(
            streams,
            filter,
            debouncer.clone(),
            fatal_tx,
            shutdown.clone(),
        ));

        info!(
            "Watching {} dirs (delay {:?})",
            subscriptions.len(),
            config.delay
        );

        Ok(Self {
            subscriber: Some(Box::new(subscriber)),
            subscriptions,
            debouncer,
            shutdown,
            consumer: Some(consumer),
            errors,
        })
    }

    /// Dirs registered during setup, in registration order.
    pub fn subscriptions(&self) -> &[PathBuf] {
        &self.subscriptions
    }

    /// Wait for the next fatal error.
    ///
    /// Returns `None` once the consumption loop has stopped without one.
    pub async fn next_error(&mut self) -> Option<WatcherError> {
        self.errors.recv().await
    }

    /// Stop the session.
    ///
    /// Unregisters every dir, stops the consumption loop and cancels a
    /// pending report without invoking it.
    pub async fn close(mut self) {
        self.subscriber.take();
        self.shutdown.cancel();
        if let Some(consumer) = self.consumer.take() {
            if let Err(e) = consumer.await {
                error!("Consumer task failed: {e}");
            }
        }
        self.debouncer.cancel().await;
        info!("Watch session closed");
    }
}

impl Drop for WatchSession {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Consumption loop: filter each change and hand qualifying ones to the
/// debouncer.
///
/// Ends when the event stream closes, on shutdown, or after forwarding the
/// first fatal error.
async fn consume(
    mut streams: RawStreams,
    filter: Arc<PatternFilter>,
    debouncer: Arc<Debouncer>,
    fatal: mpsc::UnboundedSender<WatcherError>,
    shutdown: CancellationToken,
) {
    let mut errors_open = true;

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            event = streams.events.recv() => {
                let Some(event) = event else {
                    debug!("Event stream closed");
                    break;
                };
                match filter.file_included(&event.path) {
                    Ok(true) => {
                        debug!("Change ({:?}): {}", event.kind, event.path.display());
                        debouncer.notify(event.path).await;
                    }
                    Ok(false) => {}
                    Err(e) => {
                        error!("Filter failed for {}: {e}", event.path.display());
                        let _ = fatal.send(e);
                        break;
                    }
                }
            }
            err = streams.errors.recv(), if errors_open => match err {
                Some(e) => {
                    error!("Watcher failed: {e}");
                    let _ = fatal.send(e);
                    break;
                }
                None => errors_open = false,
            },
        }
    }
}
