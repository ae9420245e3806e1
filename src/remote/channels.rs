//! Inbound command queue.
//!
//! Bridges a transport I/O thread with the synchronous control loop.
//! The I/O side pushes raw messages; the control loop drains them once
//! per tick, so every settings mutation stays on the control-loop
//! thread.
//!
//! ```text
//! ┌──────────────┐  InboundMessage  ┌──────────────┐
//! │  I/O thread  │─────────────────▶│ Control Loop │
//! └──────────────┘                  └──────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::warn;

use crate::app::ports::InboundMessage;

/// Default queue depth.
pub const INBOUND_DEPTH: usize = 8;

/// Bounded multi-producer, single-consumer message queue.
pub struct InboundQueue<const N: usize = INBOUND_DEPTH> {
    channel: Channel<CriticalSectionRawMutex, InboundMessage, N>,
}

impl<const N: usize> InboundQueue<N> {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    /// Enqueue without blocking.  Returns `false` and drops the message
    /// when the queue is full.
    pub fn push(&self, msg: InboundMessage) -> bool {
        match self.channel.try_send(msg) {
            Ok(()) => true,
            Err(_) => {
                warn!("InboundQueue: full, dropping message");
                false
            }
        }
    }

    /// Take everything currently queued, oldest first.
    pub fn drain(&self) -> Vec<InboundMessage> {
        let mut out = Vec::new();
        while let Ok(msg) = self.channel.try_receive() {
            out.push(msg);
        }
        out
    }

    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }
}

impl<const N: usize> Default for InboundQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}
