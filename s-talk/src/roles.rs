//! The four worker loops and the termination protocol.
//!
//! ```text
//!  terminal ─▶ Reader ─▶ [outbound] ─▶ Sender ─▶ network
//!  network ─▶ Receiver ─▶ [inbound] ─▶ Printer ─▶ terminal
//! ```
//!
//! # Termination protocol
//!
//! - **Local `!\n`** (or end of input): the Reader enqueues the token and
//!   stops; the Sender transmits it, requests shutdown and stops; the
//!   Receiver sees the request at its next poll, closes the inbound queue
//!   and stops; the Printer wakes on the closed queue and stops.
//! - **Peer's `!\n`**: the Receiver enqueues it for the Printer, closes the
//!   outbound queue (the Sender stops), requests shutdown (the Reader stops
//!   at its next chunk boundary) and stops; the Printer writes the token and
//!   stops.
//!
//! Each loop returns how it ended; errors are handed back to the session
//! rather than ending the process.

use cursor_list::{QueueError, SyncQueue};

use crate::error::TalkError;
use crate::message::{Message, MAX_DATAGRAM};
use crate::socket::Transport;
use crate::state::{RoleExit, Shutdown};
use crate::terminal::{ChunkReader, ChunkWriter};

pub type MessageQueue = SyncQueue<Message>;

/// Terminal → outbound queue.
pub fn run_reader<R: ChunkReader>(
    mut input: R,
    outbound: &MessageQueue,
    shutdown: &Shutdown,
) -> Result<RoleExit, TalkError> {
    loop {
        if shutdown.is_triggered() {
            return Ok(RoleExit::Cancelled);
        }
        let chunk = input.read_chunk().map_err(TalkError::Terminal)?;
        if shutdown.is_triggered() {
            return Ok(RoleExit::Cancelled);
        }

        let msg = match chunk {
            Some(bytes) => Message::from(bytes),
            None => {
                log::info!("End of input, shutting down");
                Message::termination()
            }
        };
        let last = msg.is_termination();
        if last {
            log::info!("Exit key inputted, shutting down");
        }
        if !forward(outbound, msg)? {
            return Ok(RoleExit::Cancelled);
        }
        if last {
            return Ok(RoleExit::TokenProcessed);
        }
    }
}

/// Outbound queue → network.
pub fn run_sender<T: Transport + ?Sized>(
    transport: &T,
    outbound: &MessageQueue,
    shutdown: &Shutdown,
) -> Result<RoleExit, TalkError> {
    loop {
        let Ok(msg) = outbound.dequeue() else {
            return Ok(RoleExit::Cancelled);
        };
        transport
            .send(msg.as_bytes())
            .map_err(TalkError::Network)?;
        log::debug!("→ {} byte(s)", msg.len());

        if msg.is_termination() {
            shutdown.trigger();
            return Ok(RoleExit::TokenProcessed);
        }
    }
}

/// Network → inbound queue.
pub fn run_receiver<T: Transport + ?Sized>(
    transport: &T,
    inbound: &MessageQueue,
    outbound: &MessageQueue,
    shutdown: &Shutdown,
) -> Result<RoleExit, TalkError> {
    let mut buf = [0u8; MAX_DATAGRAM];
    loop {
        if shutdown.is_triggered() {
            inbound.close();
            return Ok(RoleExit::Cancelled);
        }
        let Some(n) = transport.recv(&mut buf).map_err(TalkError::Network)? else {
            continue;
        };
        log::debug!("← {n} byte(s)");

        let msg = Message::from(&buf[..n]);
        let last = msg.is_termination();
        if !forward(inbound, msg)? {
            return Ok(RoleExit::Cancelled);
        }
        if last {
            log::info!("Connection terminated by other user");
            outbound.close();
            shutdown.trigger();
            return Ok(RoleExit::TokenProcessed);
        }
    }
}

/// Inbound queue → terminal.
pub fn run_printer<W: ChunkWriter>(
    mut output: W,
    inbound: &MessageQueue,
) -> Result<RoleExit, TalkError> {
    loop {
        let Ok(msg) = inbound.dequeue() else {
            return Ok(RoleExit::Cancelled);
        };
        output
            .write_chunk(msg.as_bytes())
            .map_err(TalkError::Terminal)?;

        if msg.is_termination() {
            return Ok(RoleExit::TokenProcessed);
        }
    }
}

/// Enqueue `msg`; `Ok(false)` when the queue was closed under us.
fn forward(queue: &MessageQueue, msg: Message) -> Result<bool, TalkError> {
    match queue.enqueue(msg) {
        Ok(()) => Ok(true),
        Err(QueueError::Exhausted(e)) => Err(TalkError::Storage(e)),
        Err(QueueError::Closed(_) | QueueError::Full(_)) => Ok(false),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
