//! Built-in host routines.

use std::path::Path;

use iceboot_channel::Receiver;
use iceboot_ice40::{ButtonForwarder, FileRequestServer, LogicDevice};
use tracing::{debug, warn};

use crate::descriptor::{ImageRunner, SessionEnd};
use crate::storage::FsRequestFiles;

/// Request polls made by a request-server image unless configured otherwise.
pub const DEFAULT_REQUESTS: u32 = 1643;

/// Interrupt wait between polls when nothing else is pending.
pub const REQUEST_WAIT_MS: u32 = 50;

/// Host routine attached to an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerKind {
    /// Forward buttons and serve file reads until the session breaks.
    EventLoop,
    /// Serve a fixed number of file-request polls, then return.
    RequestServer { requests: u32 },
}

impl RunnerKind {
    fn event_loop(
        buttons: &mut Receiver,
        device: &mut dyn LogicDevice,
        server: &mut FileRequestServer<FsRequestFiles>,
    ) -> SessionEnd {
        let mut forwarder = ButtonForwarder::new();
        loop {
            let work_done = match forwarder.forward(buttons, device) {
                Ok(work_done) => work_done,
                Err(err) => {
                    warn!(%err, "button forwarding failed");
                    return SessionEnd::ButtonFault(err);
                }
            };

            let wait = if work_done { 0 } else { REQUEST_WAIT_MS };
            if let Err(err) = server.process(device, wait) {
                warn!(%err, "file request failed");
                return SessionEnd::RequestFault(err);
            }

            if buttons.is_disconnected() {
                return SessionEnd::ChannelClosed;
            }
        }
    }

    fn request_server(
        requests: u32,
        device: &mut dyn LogicDevice,
        server: &mut FileRequestServer<FsRequestFiles>,
    ) -> SessionEnd {
        for _ in 0..requests {
            if let Err(err) = server.process(device, REQUEST_WAIT_MS) {
                warn!(%err, "file request failed");
                return SessionEnd::RequestFault(err);
            }
        }
        SessionEnd::Completed
    }
}

impl ImageRunner for RunnerKind {
    fn run(
        &mut self,
        buttons: &mut Receiver,
        device: &mut dyn LogicDevice,
        uart_enabled: bool,
        path: &Path,
    ) -> SessionEnd {
        debug!(runner = ?self, uart_enabled, path = %path.display(), "host routine start");
        let prefix = path.to_string_lossy();
        let mut server = FileRequestServer::new(FsRequestFiles, &prefix);

        match *self {
            RunnerKind::EventLoop => Self::event_loop(buttons, device, &mut server),
            RunnerKind::RequestServer { requests } => {
                Self::request_server(requests, device, &mut server)
            }
        }
    }
}
