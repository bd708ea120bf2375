//! Size signalling to an embedding host page.

use std::io::Write;
use std::sync::Mutex;

use serde::Serialize;
use tracing::{debug, warn};

/// Message posted to the host frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostMessage {
    /// The rendered content is now `height` pixels tall.
    Resize { height: u32 },
}

impl HostMessage {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// The embedding host, when there is one.
pub trait HostFrame: Send + Sync {
    fn post_message(
        &self,
        message: &HostMessage,
    );
}

/// Posts a resize message each time the content height changes.
pub struct ResizeNotifier {
    host: Option<Box<dyn HostFrame>>,
    last_height: Option<u32>,
}

impl ResizeNotifier {
    /// A notifier with no host. Every call is a no-op.
    pub fn detached() -> Self {
        Self {
            host: None,
            last_height: None,
        }
    }

    pub fn attached(host: Box<dyn HostFrame>) -> Self {
        Self {
            host: Some(host),
            last_height: None,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.host.is_some()
    }

    /// Reports the current content height. Returns whether a message was
    /// posted.
    pub fn content_resized(
        &mut self,
        height: u32,
    ) -> bool {
        let Some(host) = &self.host else {
            return false;
        };
        if self.last_height == Some(height) {
            return false;
        }

        debug!(height, "posting resize to host");
        host.post_message(&HostMessage::Resize { height });
        self.last_height = Some(height);
        true
    }
}

impl Default for ResizeNotifier {
    fn default() -> Self {
        Self::detached()
    }
}

/// Writes each message as one JSON line to `writer`.
pub struct JsonLineHost<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLineHost<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }
}

impl<W: Write + Send> HostFrame for JsonLineHost<W> {
    fn post_message(
        &self,
        message: &HostMessage,
    ) {
        let line = match message.to_json() {
            Ok(line) => line,
            Err(error) => {
                warn!(%error, "could not encode host message");
                return;
            }
        };
        match self.writer.lock() {
            Ok(mut writer) => {
                if let Err(error) = writeln!(writer, "{line}") {
                    warn!(%error, "could not post host message");
                }
            }
            Err(_) => warn!("host writer lock poisoned"),
        }
    }
}
