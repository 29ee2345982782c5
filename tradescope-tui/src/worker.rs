//! Background worker thread: every catalogue call runs here.
//!
//! Communication with the TUI main thread is via `mpsc` channels. The worker
//! owns the catalogue service; the main thread never blocks on the network.
//! Requests are executed in arrival order and each one produces exactly one
//! response, carrying the ticket it was issued with.

use std::io;
use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use tracing::{debug, info};

use tradescope_core::catalogue::{CatalogueRequest, CatalogueResponse, CatalogueService};

/// Commands sent from the TUI to the worker.
#[derive(Debug)]
pub enum WorkerCommand {
    Execute(CatalogueRequest),
    Shutdown,
}

/// Responses sent from the worker back to the TUI.
#[derive(Debug)]
pub enum WorkerResponse {
    Completed(CatalogueResponse),
}

/// Spawn the background worker thread.
pub fn spawn_worker(
    service: Box<dyn CatalogueService>,
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("tradescope-worker".into())
        .spawn(move || worker_loop(service, rx, tx))
}

fn worker_loop(
    service: Box<dyn CatalogueService>,
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
) {
    info!(service = service.name(), "worker started");
    loop {
        match rx.recv() {
            Ok(WorkerCommand::Shutdown) | Err(_) => break,
            Ok(WorkerCommand::Execute(request)) => {
                let ticket = request.ticket;
                debug!(%ticket, call = %request.call.describe(), "executing");
                let response = request.execute(service.as_ref());
                if tx.send(WorkerResponse::Completed(response)).is_err() {
                    // UI is gone.
                    break;
                }
            }
        }
    }
    info!("worker stopped");
}
