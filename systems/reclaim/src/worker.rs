//! Background execution of reclaim passes off the event-loop thread.

use std::{
    sync::mpsc::{self, Receiver, Sender, TryRecvError},
    thread::{self, JoinHandle},
};

use neuropulse_core::{Command, Event, ReclaimResult};
use tracing::{debug, warn};

use crate::{MemoryPlatform, ReclaimController, ReclaimError};

const THREAD_NAME: &str = "neuropulse-reclaim";

/// Runs a [`ReclaimController`] on a dedicated thread.
///
/// At most one pass is in flight; requests arriving while a pass runs are
/// dropped. Finished passes are collected with [`ReclaimWorker::handle`] on
/// the next frame.
#[derive(Debug)]
pub struct ReclaimWorker {
    requests: Option<Sender<()>>,
    results: Receiver<ReclaimResult>,
    thread: Option<JoinHandle<()>>,
    in_flight: bool,
}

impl ReclaimWorker {
    /// Moves `controller` onto a new worker thread.
    pub fn spawn<P>(controller: ReclaimController<P>) -> Result<Self, ReclaimError>
    where
        P: MemoryPlatform + Send + 'static,
    {
        let (request_sender, request_receiver) = mpsc::channel::<()>();
        let (result_sender, result_receiver) = mpsc::channel();

        let thread = thread::Builder::new()
            .name(THREAD_NAME.to_owned())
            .spawn(move || {
                let mut controller = controller;
                for () in request_receiver {
                    if result_sender.send(controller.optimize()).is_err() {
                        break;
                    }
                }
            })
            .map_err(ReclaimError::WorkerSpawn)?;

        Ok(Self {
            requests: Some(request_sender),
            results: result_receiver,
            thread: Some(thread),
            in_flight: false,
        })
    }

    /// Whether a submitted pass has not reported back yet.
    #[must_use]
    pub const fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Submits a pass for every `Event::OptimizeRequested` and publishes finished ones.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            if matches!(event, Event::OptimizeRequested) {
                self.submit();
            }
        }
        self.collect(out);
    }

    fn submit(&mut self) {
        if self.in_flight {
            debug!("reclaim already in flight; request dropped");
            return;
        }
        // A stopped worker has dropped its result sender, so `collect` answers
        // the request with a failure.
        self.in_flight = true;
        let sent = self
            .requests
            .as_ref()
            .is_some_and(|requests| requests.send(()).is_ok());
        if !sent && self.requests.take().is_some() {
            warn!("reclaim worker stopped; reporting failures from now on");
        }
    }

    fn collect(&mut self, out: &mut Vec<Command>) {
        loop {
            match self.results.try_recv() {
                Ok(result) => {
                    self.in_flight = false;
                    out.push(Command::PublishReclaim { result });
                }
                Err(TryRecvError::Empty) => return,
                Err(TryRecvError::Disconnected) => {
                    if self.in_flight {
                        self.in_flight = false;
                        out.push(Command::PublishReclaim {
                            result: ReclaimResult::failed(0.0),
                        });
                    }
                    return;
                }
            }
        }
    }
}

impl Drop for ReclaimWorker {
    fn drop(&mut self) {
        drop(self.requests.take());
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("reclaim worker panicked");
            }
        }
    }
}
