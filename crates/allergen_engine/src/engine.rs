use std::sync::{mpsc, Arc};
use std::thread;

use scan_logging::{scan_error, scan_info};

use crate::locate::CartPage;
use crate::pipeline::{ProgressSink, ScanPipeline};
use crate::protocol::ScanRequest;
use crate::{RequestId, ScanEvent};

enum ScanCommand {
    Scan {
        request_id: RequestId,
        cart: CartPage,
        request: ScanRequest,
    },
}

/// Runs scans on a background runtime and reports back over a channel.
///
/// Submitting again before an earlier scan finishes starts an independent
/// scan; the two only share the read-only pipeline.
pub struct ScanHandle {
    cmd_tx: mpsc::Sender<ScanCommand>,
    event_rx: mpsc::Receiver<ScanEvent>,
}

impl ScanHandle {
    pub fn new(pipeline: ScanPipeline) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let pipeline = Arc::new(pipeline);

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    scan_error!("Could not start scan runtime: {}", err);
                    return;
                }
            };
            while let Ok(command) = cmd_rx.recv() {
                let pipeline = pipeline.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(pipeline.as_ref(), command, event_tx).await;
                });
            }
        });

        Self { cmd_tx, event_rx }
    }

    pub fn submit(&self, request_id: RequestId, cart: CartPage, request: ScanRequest) {
        let _ = self.cmd_tx.send(ScanCommand::Scan {
            request_id,
            cart,
            request,
        });
    }

    /// Blocks until the next event. `None` once the background thread is gone.
    pub fn recv(&self) -> Option<ScanEvent> {
        self.event_rx.recv().ok()
    }
}

pub struct ChannelProgressSink {
    tx: mpsc::Sender<ScanEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: mpsc::Sender<ScanEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: ScanEvent) {
        let _ = self.tx.send(event);
    }
}

async fn handle_command(
    pipeline: &ScanPipeline,
    command: ScanCommand,
    event_tx: mpsc::Sender<ScanEvent>,
) {
    match command {
        ScanCommand::Scan {
            request_id,
            cart,
            request,
        } => {
            scan_info!("Starting cart scan {}", request_id);
            let sink = ChannelProgressSink::new(event_tx.clone());
            let response = pipeline.handle(request_id, &cart, &request, &sink).await;
            let _ = event_tx.send(ScanEvent::Completed {
                request_id,
                response,
            });
        }
    }
}
