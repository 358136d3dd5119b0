//! One chat session: two queues, four threads, one shutdown signal.
//!
//! [`Session::start`] builds the outbound and inbound queues from a shared
//! node pool, spawns one named thread per [`Role`], and returns a handle.
//! [`Session::wait`] joins the roles and collects a [`SessionReport`].
//!
//! If any role fails, the session requests shutdown and closes both queues,
//! so the remaining roles wind down on their own instead of the process
//! being torn down around them.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use cursor_list::{Pool, SyncQueue};

use crate::config::Config;
use crate::error::TalkError;
use crate::roles::{run_printer, run_reader, run_receiver, run_sender, MessageQueue};
use crate::socket::Transport;
use crate::state::{Role, RoleExit, RoleState, RoleStates, Shutdown};
use crate::terminal::{ChunkReader, ChunkWriter};

/// How a role ended, as seen by [`Session::wait`].
#[derive(Debug)]
pub enum RoleOutcome {
    Exited(RoleExit),
    Failed(TalkError),
    /// Still blocked on terminal input when the session ended; the thread
    /// is left behind and reclaimed at process exit.
    Detached,
}

#[derive(Debug, Default)]
pub struct SessionReport {
    pub outcomes: Vec<(Role, RoleOutcome)>,
}

impl SessionReport {
    pub fn outcome(&self, role: Role) -> Option<&RoleOutcome> {
        self.outcomes
            .iter()
            .find(|(r, _)| *r == role)
            .map(|(_, outcome)| outcome)
    }

    pub fn errors(&self) -> impl Iterator<Item = (Role, &TalkError)> {
        self.outcomes.iter().filter_map(|(role, outcome)| match outcome {
            RoleOutcome::Failed(e) => Some((*role, e)),
            _ => None,
        })
    }

    /// `true` when no role failed.
    pub fn is_clean(&self) -> bool {
        self.errors().next().is_none()
    }
}

/// Handle to the running roles of one session.
pub struct Session {
    reader: JoinHandle<Result<RoleExit, TalkError>>,
    sender: JoinHandle<Result<RoleExit, TalkError>>,
    receiver: JoinHandle<Result<RoleExit, TalkError>>,
    printer: JoinHandle<Result<RoleExit, TalkError>>,
    outbound: Arc<MessageQueue>,
    shutdown: Shutdown,
    states: RoleStates,
    /// How long `wait` gives the Reader to notice the shutdown.
    reader_grace: Duration,
}

impl Session {
    /// Build the queues and spawn the four roles.
    pub fn start<T, R, W>(
        config: &Config,
        transport: T,
        input: R,
        output: W,
    ) -> Result<Self, TalkError>
    where
        T: Transport,
        R: ChunkReader,
        W: ChunkWriter,
    {
        let pool = Pool::new(config.pool_config());
        let outbound = Arc::new(SyncQueue::with_capacity(&pool, config.queue_capacity)?);
        let inbound = Arc::new(SyncQueue::with_capacity(&pool, config.queue_capacity)?);
        let transport = Arc::new(transport);
        let shutdown = Shutdown::new();
        let states = RoleStates::new();

        let ctx = SpawnContext {
            outbound: Arc::clone(&outbound),
            inbound: Arc::clone(&inbound),
            shutdown: shutdown.clone(),
            states: states.clone(),
        };

        let sender = ctx.spawn(Role::Sender, {
            let (transport, outbound, shutdown) =
                (Arc::clone(&transport), Arc::clone(&outbound), shutdown.clone());
            move || run_sender(transport.as_ref(), &outbound, &shutdown)
        })?;
        let receiver = ctx.spawn(Role::Receiver, {
            let (inbound, outbound, shutdown) =
                (Arc::clone(&inbound), Arc::clone(&outbound), shutdown.clone());
            move || run_receiver(transport.as_ref(), &inbound, &outbound, &shutdown)
        })?;
        let printer = ctx.spawn(Role::Printer, {
            let inbound = Arc::clone(&inbound);
            move || run_printer(output, &inbound)
        })?;
        let reader = ctx.spawn(Role::Reader, {
            let (outbound, shutdown) = (Arc::clone(&outbound), shutdown.clone());
            move || run_reader(input, &outbound, &shutdown)
        })?;

        log::debug!("session started");
        Ok(Self {
            reader,
            sender,
            receiver,
            printer,
            outbound,
            shutdown,
            states,
            reader_grace: config.poll_interval,
        })
    }

    /// Current lifecycle state of `role`.
    pub fn state(&self, role: Role) -> RoleState {
        self.states.get(role)
    }

    /// `true` once every role has left its loop.
    pub fn all_stopped(&self) -> bool {
        self.states.all_stopped()
    }

    /// Ask every role to stop, as if the peer had ended the session.
    pub fn stop(&self) {
        self.shutdown.trigger();
        self.outbound.close();
    }

    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Join the roles and report how each one ended.
    pub fn wait(self) -> SessionReport {
        let mut report = SessionReport::default();
        for (role, handle) in [
            (Role::Sender, self.sender),
            (Role::Receiver, self.receiver),
            (Role::Printer, self.printer),
        ] {
            report.outcomes.push((role, join(role, handle)));
        }

        // A Reader blocked in a terminal read cannot be woken; give it one
        // poll interval to notice the shutdown, then leave it behind.
        let deadline = Instant::now() + self.reader_grace;
        while !self.reader.is_finished() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        let reader = if self.reader.is_finished() {
            join(Role::Reader, self.reader)
        } else {
            log::debug!("reader still blocked on input; detaching");
            RoleOutcome::Detached
        };
        report.outcomes.push((Role::Reader, reader));

        for (role, e) in report.errors() {
            log::error!("{role} stopped with error: {e}");
        }
        log::debug!("session finished");
        report
    }
}

#[derive(Clone)]
struct SpawnContext {
    outbound: Arc<MessageQueue>,
    inbound: Arc<MessageQueue>,
    shutdown: Shutdown,
    states: RoleStates,
}

impl SpawnContext {
    /// Run `body` on a named thread.  On the way out the role is marked
    /// stopped; if it failed or panicked the whole session winds down.
    fn spawn<F>(
        &self,
        role: Role,
        body: F,
    ) -> Result<JoinHandle<Result<RoleExit, TalkError>>, TalkError>
    where
        F: FnOnce() -> Result<RoleExit, TalkError> + Send + 'static,
    {
        let guard = RoleGuard {
            role,
            ctx: self.clone(),
        };
        thread::Builder::new()
            .name(role.thread_name().to_string())
            .spawn(move || {
                let result = body();
                match &result {
                    Ok(exit) => log::debug!("{role} stopped: {exit:?}"),
                    Err(e) => {
                        log::warn!("{role} failed: {e}; shutting session down");
                        guard.ctx.wind_down();
                    }
                }
                drop(guard);
                result
            })
            .map_err(|e| {
                self.wind_down();
                TalkError::Spawn(role, e)
            })
    }

    fn wind_down(&self) {
        self.shutdown.trigger();
        self.outbound.close();
        self.inbound.close();
    }
}

/// Marks its role stopped when the role's thread is done, even by panic.
struct RoleGuard {
    role: Role,
    ctx: SpawnContext,
}

impl Drop for RoleGuard {
    fn drop(&mut self) {
        if thread::panicking() {
            log::error!("{} panicked; shutting session down", self.role);
            self.ctx.wind_down();
        }
        self.ctx.states.mark_stopped(self.role);
    }
}

fn join(role: Role, handle: JoinHandle<Result<RoleExit, TalkError>>) -> RoleOutcome {
    match handle.join() {
        Ok(Ok(exit)) => RoleOutcome::Exited(exit),
        Ok(Err(e)) => RoleOutcome::Failed(e),
        Err(_) => RoleOutcome::Failed(TalkError::Panicked(role)),
    }
}
