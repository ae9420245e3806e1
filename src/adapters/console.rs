//! Serial console command channel.
//!
//! Implements [`RemoteChannel`] over the UART console: a reader thread
//! turns each input line into an [`InboundMessage`] on the shared
//! [`InboundQueue`], and the control loop drains it through
//! [`RemoteChannel::receive`].  Replies and broadcasts are written to
//! stdout, which ESP-IDF routes to the same UART.

use std::io::{BufRead, Write};
use std::sync::Arc;

use log::{info, warn};

use crate::app::ports::{InboundMessage, RemoteChannel};
use crate::remote::channels::InboundQueue;

/// Sender id attached to every console line.
pub const CONSOLE_SENDER: &str = "console";

pub struct ConsoleChannel {
    queue: Arc<InboundQueue>,
}

impl ConsoleChannel {
    pub fn new(queue: Arc<InboundQueue>) -> Self {
        Self { queue }
    }

    fn write_line(prefix: &str, text: &str) -> bool {
        let mut out = std::io::stdout().lock();
        let ok = text
            .lines()
            .try_for_each(|line| writeln!(out, "{prefix}{line}"))
            .and_then(|()| out.flush())
            .is_ok();
        if !ok {
            warn!("ConsoleChannel: stdout write failed");
        }
        ok
    }
}

impl RemoteChannel for ConsoleChannel {
    fn receive(&mut self) -> Vec<InboundMessage> {
        self.queue.drain()
    }

    fn reply(&mut self, sender: &str, text: &str) -> bool {
        Self::write_line(&format!("[{sender}] "), text)
    }

    fn broadcast(&mut self, text: &str) -> bool {
        Self::write_line("[*] ", text)
    }
}

/// Spawn the blocking stdin reader.  Lines that do not fit an
/// [`InboundMessage`] are dropped with a warning.
pub fn spawn_reader(queue: Arc<InboundQueue>) -> std::io::Result<std::thread::JoinHandle<()>> {
    std::thread::Builder::new()
        .name("console-rx".into())
        .stack_size(8192)
        .spawn(move || {
            info!("ConsoleChannel: reader started");
            let stdin = std::io::stdin();
            let mut line = String::new();
            loop {
                line.clear();
                match stdin.lock().read_line(&mut line) {
                    // The UART reports EOF or an error while no data is pending.
                    Ok(0) | Err(_) => {
                        std::thread::sleep(std::time::Duration::from_millis(100));
                        continue;
                    }
                    Ok(_) => {}
                }
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                match InboundMessage::new(CONSOLE_SENDER, trimmed) {
                    Some(msg) => {
                        queue.push(msg);
                    }
                    None => warn!("ConsoleChannel: line too long, dropped"),
                }
            }
        })
}
