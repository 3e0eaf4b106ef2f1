use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use tracker_logging::tracker_error;

use crate::offline::{OfflineWorker, Served};
use crate::AssetRequest;

pub type RequestId = u64;

enum WorkerCommand {
    Install,
    Activate,
    Fetch {
        request_id: RequestId,
        request: AssetRequest,
    },
}

/// Outcome of one command sent to a [`WorkerHandle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerEvent {
    Installed { cached: usize },
    InstallFailed { reason: String },
    Activated { deleted: Vec<String> },
    ActivateFailed { reason: String },
    Fetched {
        request_id: RequestId,
        result: Result<Served, String>,
    },
}

/// Runs an [`OfflineWorker`] on its own thread and async runtime.
///
/// Commands run one at a time in the order sent; each command's IO finishes
/// before the next starts.
pub struct WorkerHandle {
    cmd_tx: mpsc::Sender<WorkerCommand>,
    event_rx: mpsc::Receiver<WorkerEvent>,
}

impl WorkerHandle {
    pub fn spawn(mut worker: OfflineWorker) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    tracker_error!("Failed to start worker runtime: {}", err);
                    return;
                }
            };
            while let Ok(command) = cmd_rx.recv() {
                let event = runtime.block_on(handle_command(&mut worker, command));
                if event_tx.send(event).is_err() {
                    break;
                }
            }
        });

        Self { cmd_tx, event_rx }
    }

    pub fn install(&self) {
        let _ = self.cmd_tx.send(WorkerCommand::Install);
    }

    pub fn activate(&self) {
        let _ = self.cmd_tx.send(WorkerCommand::Activate);
    }

    pub fn fetch(&self, request_id: RequestId, request: AssetRequest) {
        let _ = self.cmd_tx.send(WorkerCommand::Fetch {
            request_id,
            request,
        });
    }

    pub fn try_recv(&self) -> Option<WorkerEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Waits for the next event. `None` if the worker thread is gone or the wait timed out.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<WorkerEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

async fn handle_command(worker: &mut OfflineWorker, command: WorkerCommand) -> WorkerEvent {
    match command {
        WorkerCommand::Install => match worker.install().await {
            Ok(cached) => WorkerEvent::Installed { cached },
            Err(err) => WorkerEvent::InstallFailed {
                reason: err.to_string(),
            },
        },
        WorkerCommand::Activate => match worker.activate() {
            Ok(deleted) => WorkerEvent::Activated { deleted },
            Err(err) => WorkerEvent::ActivateFailed {
                reason: err.to_string(),
            },
        },
        WorkerCommand::Fetch {
            request_id,
            request,
        } => WorkerEvent::Fetched {
            request_id,
            result: worker
                .handle_fetch(&request)
                .await
                .map_err(|err| err.to_string()),
        },
    }
}
