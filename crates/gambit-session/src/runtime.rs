//! Async driver around [`Session`]: owns the clock task and the deferred
//! computer reply, and publishes every change.

use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use futures::stream::BoxStream;
use gambit_feed::SessionFeed;
use gambit_ops::EventJournal;
use gambit_types::{
    board::PieceColor,
    config::SessionConfig,
    events::SessionEvent,
    game::GameSnapshot,
    geometry::Point3,
    time_control::SkillLevel,
    Result,
};
use tokio::{
    sync::Mutex,
    task::JoinHandle,
    time::{interval_at, sleep, Duration, Instant},
};
use tracing::{debug, warn};

use crate::session::{Directive, Session};

#[derive(Debug, Clone, Copy)]
pub struct RuntimeTiming {
    pub reply_delay: Duration,
    pub tick_interval: Duration,
}

impl From<&SessionConfig> for RuntimeTiming {
    fn from(config: &SessionConfig) -> Self {
        Self {
            reply_delay: Duration::from_millis(config.reply_delay_ms),
            tick_interval: Duration::from_millis(config.tick_interval_ms),
        }
    }
}

struct Inner<F> {
    session: Mutex<Session>,
    feed: F,
    journal: EventJournal,
    timing: RuntimeTiming,
    clock: StdMutex<Option<JoinHandle<()>>>,
    reply: StdMutex<Option<JoinHandle<()>>>,
}

/// Cloneable handle; all clones drive the same session.
pub struct SessionRuntime<F> {
    inner: Arc<Inner<F>>,
}

impl<F> Clone for SessionRuntime<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F> SessionRuntime<F>
where
    F: SessionFeed + 'static,
{
    pub fn new(session: Session, feed: F, journal: EventJournal, timing: RuntimeTiming) -> Self {
        Self {
            inner: Arc::new(Inner {
                session: Mutex::new(session),
                feed,
                journal,
                timing,
                clock: StdMutex::new(None),
                reply: StdMutex::new(None),
            }),
        }
    }

    pub fn subscribe(&self) -> BoxStream<'static, SessionEvent> {
        self.inner.feed.subscribe()
    }

    pub fn journal(&self) -> &EventJournal {
        &self.inner.journal
    }

    pub async fn snapshot(&self) -> GameSnapshot {
        self.inner.session.lock().await.snapshot()
    }

    pub async fn tip(&self) -> &'static str {
        self.inner.session.lock().await.tip()
    }

    /// Publishes the current board without changing anything.
    pub async fn refresh(&self) -> Result<()> {
        self.dispatch(|_| Vec::new()).await
    }

    pub async fn start(&self) -> Result<()> {
        self.dispatch(Session::start).await
    }

    pub async fn toggle_pause(&self) -> Result<()> {
        self.dispatch(Session::toggle_pause).await
    }

    pub async fn click(&self, x: f32, z: f32) -> Result<()> {
        self.dispatch(|session| session.click(x, z)).await
    }

    pub async fn undo(&self) -> Result<()> {
        self.dispatch(Session::undo).await
    }

    pub async fn reset(&self) -> Result<()> {
        self.dispatch(Session::reset).await
    }

    pub async fn set_user_color(&self, color: PieceColor) -> Result<()> {
        self.dispatch(|session| session.set_user_color(color)).await
    }

    pub async fn set_skill_level(&self, level: SkillLevel) -> Result<()> {
        self.dispatch(|session| session.set_skill_level(level)).await
    }

    pub async fn set_highlight(&self, point: Option<Point3>) -> Result<()> {
        self.dispatch(|session| {
            session.set_highlight(point);
            Vec::new()
        })
        .await
    }

    /// Stops both background tasks.
    pub fn shutdown(&self) {
        abort_slot(&self.inner.clock);
        abort_slot(&self.inner.reply);
    }

    async fn dispatch(&self, op: impl FnOnce(&mut Session) -> Vec<Directive>) -> Result<()> {
        let events = self.inner.transition(op).await;
        self.inner.publish(events).await
    }
}

impl<F> Inner<F>
where
    F: SessionFeed + 'static,
{
    /// Runs `op` and carries out its directives before the session lock is
    /// released, so a later transition always acts on the task slots last.
    async fn transition(
        self: &Arc<Self>,
        op: impl FnOnce(&mut Session) -> Vec<Directive>,
    ) -> Vec<SessionEvent> {
        let mut session = self.session.lock().await;
        let directives = op(&mut session);
        self.apply(directives);
        collect_events(&mut session)
    }

    async fn publish(&self, events: Vec<SessionEvent>) -> Result<()> {
        for event in events {
            self.journal.record_event(event.clone()).await?;
            self.feed.publish(event).await?;
        }
        Ok(())
    }

    fn apply(self: &Arc<Self>, directives: Vec<Directive>) {
        for directive in directives {
            debug!(?directive, "applying directive");
            match directive {
                Directive::StartClock => self.start_clock(),
                Directive::StopClock => abort_slot(&self.clock),
                Directive::ScheduleReply { epoch } => self.schedule_reply(epoch),
            }
        }
    }

    fn start_clock(self: &Arc<Self>) {
        let inner = Arc::clone(self);
        let period = self.timing.tick_interval;
        let handle = tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + period, period);
            loop {
                ticks.tick().await;
                // The tick's own StopClock would abort this task before it
                // publishes, so the loop exits by itself instead.
                let (finished, events) = {
                    let mut session = inner.session.lock().await;
                    let finished = session.tick().contains(&Directive::StopClock);
                    (finished, collect_events(&mut session))
                };
                if let Err(err) = inner.publish(events).await {
                    warn!(%err, "failed to publish clock tick");
                }
                if finished {
                    debug!("clock task finished");
                    break;
                }
            }
        });
        replace_slot(&self.clock, handle);
    }

    /// Earlier pending replies are left to run; the session discards them.
    fn schedule_reply(self: &Arc<Self>, epoch: u64) {
        let inner = Arc::clone(self);
        let delay = self.timing.reply_delay;
        let handle = tokio::spawn(async move {
            sleep(delay).await;
            let events = inner
                .transition(|session| session.play_computer_reply(epoch))
                .await;
            if let Err(err) = inner.publish(events).await {
                warn!(%err, "failed to publish computer reply");
            }
        });
        let mut slot = self.reply.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(handle);
    }
}

fn collect_events(session: &mut Session) -> Vec<SessionEvent> {
    let mut events = session.drain_events();
    events.push(SessionEvent::board(session.snapshot()));
    events
}

fn replace_slot(slot: &StdMutex<Option<JoinHandle<()>>>, handle: JoinHandle<()>) {
    let mut slot = slot.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(previous) = slot.replace(handle) {
        previous.abort();
    }
}

fn abort_slot(slot: &StdMutex<Option<JoinHandle<()>>>) {
    let mut slot = slot.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(handle) = slot.take() {
        handle.abort();
    }
}
