//! Tracking service owner thread
//!
//! Commands and provider deliveries share one channel into a dedicated
//! thread that owns the [`TrackingController`]. Transitions and fix handling
//! are thereby serialized in arrival order without locking controller state.

use crate::api::context::TrackingContext;
use crate::api::sink::EventSink;
use crate::api::types::{Command, CommandOutcome, CommandResponse};
use crate::hardware::{FixDelivery, FixRoute, ForegroundHost, LocationProvider, WakeResource};
use crate::policy::SettingsUpdate;
use crate::session::{SessionStatus, TrackingController, TrackingError, TrackingResult};
use crate::utils::ServiceConfig;
use std::io;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

enum Message {
    Command {
        command: Command,
        reply: mpsc::Sender<CommandResponse>,
    },
    Fix(FixDelivery),
    Shutdown,
}

/// Spawns the session owner thread
pub struct TrackingService;

impl TrackingService {
    /// Start the owner thread with an idle controller built from `config`
    pub fn spawn(
        provider: impl LocationProvider + 'static,
        wake: impl WakeResource + 'static,
        foreground: impl ForegroundHost + 'static,
        config: &ServiceConfig,
        context: Arc<TrackingContext>,
    ) -> io::Result<ServiceHandle> {
        let (tx, rx) = mpsc::channel();

        let fix_tx = tx.clone();
        let route: FixRoute = Arc::new(move |delivery| {
            // owner gone means the session is over; nothing to deliver to
            let _ = fix_tx.send(Message::Fix(delivery));
        });

        let controller =
            TrackingController::new(provider, wake, foreground, Arc::clone(&context), route)
                .with_service_config(config);

        let worker = thread::Builder::new()
            .name("tracking-session".to_string())
            .spawn(move || run(controller, rx))?;

        info!("tracking service started");
        Ok(ServiceHandle {
            tx,
            context,
            worker: Some(worker),
        })
    }
}

fn run(mut controller: TrackingController, rx: mpsc::Receiver<Message>) {
    while let Ok(message) = rx.recv() {
        match message {
            Message::Command { command, reply } => {
                debug!(command = command.name(), "handling command");
                let response = execute(&mut controller, command);
                if reply.send(response).is_err() {
                    debug!("command caller went away before the reply");
                }
            }
            Message::Fix(delivery) => controller.on_delivery(delivery),
            Message::Shutdown => break,
        }
    }
    controller.shutdown();
    info!("tracking service stopped");
}

fn execute(controller: &mut TrackingController, command: Command) -> CommandResponse {
    match command {
        Command::StartTracking => controller.start().map(|_| CommandOutcome::Done),
        Command::StopTracking => {
            controller.stop();
            Ok(CommandOutcome::Done)
        }
        Command::UpdateSettings(update) => controller
            .apply_settings(&update)
            .map(|_| CommandOutcome::Done),
        Command::QueryRunning => Ok(CommandOutcome::Running(controller.is_running())),
        Command::QueryStatus => Ok(CommandOutcome::Status(controller.status())),
    }
}

/// Caller-side handle to a running tracking service
pub struct ServiceHandle {
    tx: mpsc::Sender<Message>,
    context: Arc<TrackingContext>,
    worker: Option<JoinHandle<()>>,
}

impl ServiceHandle {
    /// Send a command and wait for the owner thread's reply.
    ///
    /// `QueryRunning` is answered from the published running flag and never
    /// waits on the owner thread.
    pub fn execute(&self, command: Command) -> CommandResponse {
        if command == Command::QueryRunning {
            return Ok(CommandOutcome::Running(self.is_running()));
        }
        let (reply, response) = mpsc::channel();
        self.tx
            .send(Message::Command { command, reply })
            .map_err(|_| TrackingError::ServiceUnavailable)?;
        response.recv().map_err(|_| TrackingError::ServiceUnavailable)?
    }

    pub fn start_tracking(&self) -> TrackingResult<()> {
        self.execute(Command::StartTracking).map(|_| ())
    }

    pub fn stop_tracking(&self) -> TrackingResult<()> {
        self.execute(Command::StopTracking).map(|_| ())
    }

    pub fn update_settings(&self, update: SettingsUpdate) -> TrackingResult<()> {
        self.execute(Command::UpdateSettings(update)).map(|_| ())
    }

    /// Reads the published running flag without a round trip to the owner
    pub fn is_running(&self) -> bool {
        self.context.is_running()
    }

    pub fn status(&self) -> TrackingResult<SessionStatus> {
        match self.execute(Command::QueryStatus)? {
            CommandOutcome::Status(status) => Ok(status),
            other => {
                warn!(?other, "unexpected reply to status query");
                Err(TrackingError::ServiceUnavailable)
            }
        }
    }

    pub fn context(&self) -> &Arc<TrackingContext> {
        &self.context
    }

    pub fn attach_sink(&self, sink: Box<dyn EventSink>) {
        self.context.attach_sink(sink);
    }

    pub fn detach_sink(&self) {
        self.context.detach_sink();
    }

    /// Stop any active session and join the owner thread
    pub fn shutdown(mut self) {
        self.stop_worker();
    }

    fn stop_worker(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = self.tx.send(Message::Shutdown);
            if worker.join().is_err() {
                warn!("tracking service thread panicked");
            }
        }
    }
}

impl Drop for ServiceHandle {
    fn drop(&mut self) {
        self.stop_worker();
    }
}
