//! Background owner of the study timer.
//!
//! One thread owns the `StudyTimer`. It applies commands sent through
//! `TimerHandle` and ticks once per `tick` interval while started. Readers
//! only see published `TimerSnapshot`s.

use super::{StudyTimer, TimerSnapshot, TimerState};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// One elapsed second per tick.
pub const DEFAULT_TICK: Duration = Duration::from_secs(1);

const THREAD_NAME: &str = "smartstudy-timer";

#[derive(Debug)]
pub enum TimerError {
    /// The timer thread could not be started.
    Spawn(std::io::Error),
    /// The timer thread has exited; no command can be applied.
    Stopped,
}

impl Display for TimerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Spawn(err) => write!(f, "failed to spawn timer thread: {err}"),
            Self::Stopped => write!(f, "timer service is not running"),
        }
    }
}

impl Error for TimerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Spawn(err) => Some(err),
            Self::Stopped => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommandKind {
    Start,
    Pause,
    Toggle,
    Cancel,
    Finish,
    Shutdown,
}

impl CommandKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Pause => "pause",
            Self::Toggle => "toggle",
            Self::Cancel => "cancel",
            Self::Finish => "finish",
            Self::Shutdown => "shutdown",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Reply {
    snapshot: TimerSnapshot,
    finished_secs: u64,
}

struct Command {
    kind: CommandKind,
    reply: Option<Sender<Reply>>,
}

/// Owns the timer thread. Dropping it (or calling `shutdown`) stops the
/// thread; handles that outlive it get `TimerError::Stopped`.
pub struct TimerService {
    handle: TimerHandle,
    worker: Option<JoinHandle<()>>,
}

impl TimerService {
    pub fn spawn() -> Result<Self, TimerError> {
        Self::spawn_with_tick(DEFAULT_TICK)
    }

    /// Spawns with a custom tick interval. Each tick still counts as one
    /// elapsed second.
    pub fn spawn_with_tick(tick: Duration) -> Result<Self, TimerError> {
        let (commands, inbox) = mpsc::channel();
        let published = Arc::new(Mutex::new(StudyTimer::new().snapshot()));
        let worker_published = Arc::clone(&published);

        let worker = thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || run_timer_loop(inbox, worker_published, tick))
            .map_err(TimerError::Spawn)?;

        info!(
            "event=timer_spawn module=timer status=ok tick_ms={}",
            tick.as_millis()
        );
        Ok(Self {
            handle: TimerHandle {
                commands,
                published,
            },
            worker: Some(worker),
        })
    }

    pub fn handle(&self) -> TimerHandle {
        self.handle.clone()
    }

    pub fn shutdown(mut self) {
        self.stop_worker();
    }

    fn stop_worker(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        let _ = self.handle.commands.send(Command {
            kind: CommandKind::Shutdown,
            reply: None,
        });
        if worker.join().is_err() {
            warn!("event=timer_shutdown module=timer status=error error=worker_panicked");
        }
    }
}

impl Drop for TimerService {
    fn drop(&mut self) {
        self.stop_worker();
    }
}

/// Cloneable command/read handle for the timer thread.
#[derive(Clone)]
pub struct TimerHandle {
    commands: Sender<Command>,
    published: Arc<Mutex<TimerSnapshot>>,
}

impl TimerHandle {
    /// Starts, or resumes after a pause.
    pub fn start(&self) -> Result<TimerSnapshot, TimerError> {
        self.send(CommandKind::Start).map(|reply| reply.snapshot)
    }

    pub fn pause(&self) -> Result<TimerSnapshot, TimerError> {
        self.send(CommandKind::Pause).map(|reply| reply.snapshot)
    }

    /// Pauses a running timer, otherwise starts or resumes it. The choice
    /// is made on the timer thread against its current state.
    pub fn toggle(&self) -> Result<TimerSnapshot, TimerError> {
        self.send(CommandKind::Toggle).map(|reply| reply.snapshot)
    }

    pub fn cancel(&self) -> Result<TimerSnapshot, TimerError> {
        self.send(CommandKind::Cancel).map(|reply| reply.snapshot)
    }

    /// Stops the run, resets to zero and returns the elapsed seconds.
    pub fn finish(&self) -> Result<u64, TimerError> {
        self.send(CommandKind::Finish).map(|reply| reply.finished_secs)
    }

    /// Latest snapshot published by the timer thread.
    pub fn snapshot(&self) -> TimerSnapshot {
        *self
            .published
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn send(&self, kind: CommandKind) -> Result<Reply, TimerError> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.commands
            .send(Command {
                kind,
                reply: Some(reply_tx),
            })
            .map_err(|_| TimerError::Stopped)?;
        reply_rx.recv().map_err(|_| TimerError::Stopped)
    }
}

fn run_timer_loop(inbox: Receiver<Command>, published: Arc<Mutex<TimerSnapshot>>, tick: Duration) {
    let mut timer = StudyTimer::new();
    let mut next_tick: Option<Instant> = None;

    loop {
        let received = match next_tick {
            Some(deadline) => {
                match inbox.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
                    Ok(command) => Some(command),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            None => match inbox.recv() {
                Ok(command) => Some(command),
                Err(_) => break,
            },
        };

        let Some(command) = received else {
            timer.tick();
            next_tick = next_tick.map(|deadline| deadline + tick);
            publish(&published, timer.snapshot());
            continue;
        };

        if command.kind == CommandKind::Shutdown {
            break;
        }

        let before = timer.state();
        let finished_secs = apply(&mut timer, command.kind);
        next_tick = match timer.state() {
            TimerState::Started => next_tick.or_else(|| Some(Instant::now() + tick)),
            TimerState::Idle | TimerState::Stopped => None,
        };

        let snapshot = timer.snapshot();
        publish(&published, snapshot);
        debug!(
            "event=timer_command module=timer status=ok command={} from={} to={} elapsed_secs={}",
            command.kind.as_str(),
            before.as_str(),
            snapshot.state.as_str(),
            finished_secs.max(snapshot.elapsed_secs)
        );

        if let Some(reply) = command.reply {
            let _ = reply.send(Reply {
                snapshot,
                finished_secs,
            });
        }
    }

    debug!("event=timer_shutdown module=timer status=ok");
}

fn apply(timer: &mut StudyTimer, kind: CommandKind) -> u64 {
    match kind {
        CommandKind::Start => {
            timer.start();
            0
        }
        CommandKind::Pause => {
            timer.pause();
            0
        }
        CommandKind::Toggle => {
            timer.toggle();
            0
        }
        CommandKind::Cancel => {
            timer.cancel();
            0
        }
        CommandKind::Finish => timer.finish(),
        CommandKind::Shutdown => 0,
    }
}

fn publish(published: &Mutex<TimerSnapshot>, snapshot: TimerSnapshot) {
    *published.lock().unwrap_or_else(PoisonError::into_inner) = snapshot;
}
