//! Outbound side of a connection's transport.

use std::{sync::Arc, time::Duration};

use tokio::sync::mpsc::{self, error::SendTimeoutError};

use super::error::DeliveryError;

/// A serialized server→client frame. Serialized once per message and shared by
/// every recipient.
pub type Frame = Arc<str>;

/// Handle used to write frames to one connection.
///
/// Frames go through a bounded channel to the connection's writer task, which
/// owns the socket.
#[derive(Debug, Clone)]
pub struct ClientSender {
    inner: mpsc::Sender<Frame>,
}

impl ClientSender {
    /// Create a sender and the receiver the writer task drains.
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<Frame>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (Self { inner: tx }, rx)
    }

    /// Write one frame, waiting at most `deadline` for buffer space.
    ///
    /// # Errors
    ///
    /// * `DeliveryError::Timeout` - the peer's buffer stayed full past the deadline
    /// * `DeliveryError::Closed` - the writer task has exited
    pub async fn deliver(&self, frame: Frame, deadline: Duration) -> Result<(), DeliveryError> {
        self.inner
            .send_timeout(frame, deadline)
            .await
            .map_err(|e| match e {
                SendTimeoutError::Timeout(_) => DeliveryError::Timeout,
                SendTimeoutError::Closed(_) => DeliveryError::Closed,
            })
    }
}
