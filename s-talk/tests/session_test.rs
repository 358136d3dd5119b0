//! End-to-end tests: two sessions talking to each other.
//!
//! Most tests connect the sessions with an in-memory datagram link so they
//! are independent of the host network; one runs over real UDP on loopback.
//! Terminal input is fed through a channel so the test decides when the
//! Reader sees its next chunk or end of input.

use std::io;
use std::net::UdpSocket;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use s_talk::terminal::{ChunkReader, ChunkWriter};
use s_talk::{
    Config, Role, RoleExit, RoleOutcome, RoleState, Session, TalkError, Transport, UdpTransport,
};

const POLL: Duration = Duration::from_millis(20);

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn config() -> Config {
    let mut config = Config::new(4000, "peer", 4001);
    config.poll_interval = POLL;
    config
}

/// One end of an in-memory datagram link.
struct MemLink {
    tx: Mutex<Sender<Vec<u8>>>,
    rx: Mutex<Receiver<Vec<u8>>>,
}

impl MemLink {
    fn pair() -> (Self, Self) {
        let (a_tx, b_rx) = mpsc::channel();
        let (b_tx, a_rx) = mpsc::channel();
        (
            Self {
                tx: Mutex::new(a_tx),
                rx: Mutex::new(a_rx),
            },
            Self {
                tx: Mutex::new(b_tx),
                rx: Mutex::new(b_rx),
            },
        )
    }
}

impl Transport for MemLink {
    fn send(&self, payload: &[u8]) -> io::Result<()> {
        // A vanished peer is a lost datagram, not an error.
        let _ = self.tx.lock().unwrap().send(payload.to_vec());
        Ok(())
    }

    fn recv(&self, buf: &mut [u8]) -> io::Result<Option<usize>> {
        match self.rx.lock().unwrap().recv_timeout(POLL) {
            Ok(d) => {
                let n = d.len().min(buf.len());
                buf[..n].copy_from_slice(&d[..n]);
                Ok(Some(n))
            }
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => {
                thread::sleep(POLL);
                Ok(None)
            }
        }
    }
}

/// Terminal input driven by the test; dropping the sender is end of input.
struct TypedInput {
    keys: Receiver<Vec<u8>>,
    /// Number of `read_chunk` calls so far, finished or not.
    reads: Arc<AtomicUsize>,
}

impl ChunkReader for TypedInput {
    fn read_chunk(&mut self) -> io::Result<Option<Vec<u8>>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.keys.recv().ok())
    }
}

fn keyboard() -> (Sender<Vec<u8>>, TypedInput) {
    let (tx, keys) = mpsc::channel();
    let input = TypedInput {
        keys,
        reads: Arc::default(),
    };
    (tx, input)
}

#[derive(Clone, Default)]
struct Screen(Arc<Mutex<Vec<u8>>>);

impl Screen {
    fn contents(&self) -> Vec<u8> {
        self.0.lock().unwrap().clone()
    }
}

impl ChunkWriter for Screen {
    fn write_chunk(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.0.lock().unwrap().extend_from_slice(bytes);
        Ok(())
    }
}

/// Blocks every write until the gate's sender sends or is dropped.
struct GatedScreen {
    gate: Receiver<()>,
    screen: Screen,
}

impl ChunkWriter for GatedScreen {
    fn write_chunk(&mut self, bytes: &[u8]) -> io::Result<()> {
        let _ = self.gate.recv();
        self.screen.write_chunk(bytes)
    }
}

fn wait_until(what: &str, mut cond: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !cond() {
        assert!(Instant::now() < deadline, "timed out waiting for {what}");
        thread::sleep(Duration::from_millis(5));
    }
}

fn exited(report: &s_talk::SessionReport, role: Role) -> RoleExit {
    match report.outcome(role) {
        Some(RoleOutcome::Exited(exit)) => *exit,
        other => panic!("{role}: unexpected outcome {other:?}"),
    }
}

/// Chat "hello", then end the session from side A; returns B's screen.
fn chat_and_quit<T: Transport>(link_a: T, link_b: T) -> Vec<u8> {
    let (key_a, input_a) = keyboard();
    let (key_b, input_b) = keyboard();
    let (screen_a, screen_b) = (Screen::default(), Screen::default());

    let a = Session::start(&config(), link_a, input_a, screen_a.clone()).unwrap();
    let b = Session::start(&config(), link_b, input_b, screen_b.clone()).unwrap();

    key_a.send(b"hello\n".to_vec()).unwrap();
    wait_until("hello at B", || screen_b.contents() == b"hello\n");

    key_a.send(b"!\n".to_vec()).unwrap();
    let b_shutdown = b.shutdown_handle();
    wait_until("B to see the token", || b_shutdown.is_triggered());
    // B's Reader is parked on the keyboard; end of input wakes it.
    drop(key_b);

    wait_until("A to stop", || a.all_stopped());
    wait_until("B to stop", || b.all_stopped());

    let (report_a, report_b) = (a.wait(), b.wait());
    assert!(report_a.is_clean() && report_b.is_clean());

    assert_eq!(exited(&report_a, Role::Reader), RoleExit::TokenProcessed);
    assert_eq!(exited(&report_a, Role::Sender), RoleExit::TokenProcessed);
    assert_eq!(exited(&report_a, Role::Receiver), RoleExit::Cancelled);
    assert_eq!(exited(&report_a, Role::Printer), RoleExit::Cancelled);

    assert_eq!(exited(&report_b, Role::Receiver), RoleExit::TokenProcessed);
    assert_eq!(exited(&report_b, Role::Printer), RoleExit::TokenProcessed);
    assert_eq!(exited(&report_b, Role::Sender), RoleExit::Cancelled);
    assert_eq!(exited(&report_b, Role::Reader), RoleExit::Cancelled);

    assert!(screen_a.contents().is_empty());
    drop(key_a);
    screen_b.contents()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn local_token_ends_both_sessions() {
    let (link_a, link_b) = MemLink::pair();
    assert_eq!(chat_and_quit(link_a, link_b), b"hello\n!\n");
}

#[test]
fn chat_over_udp_loopback() {
    let sock_a = UdpSocket::bind("127.0.0.1:0").unwrap();
    let sock_b = UdpSocket::bind("127.0.0.1:0").unwrap();
    let (addr_a, addr_b) = (sock_a.local_addr().unwrap(), sock_b.local_addr().unwrap());

    let link_a = UdpTransport::new(sock_a, addr_b, POLL).unwrap();
    let link_b = UdpTransport::new(sock_b, addr_a, POLL).unwrap();
    assert_eq!(chat_and_quit(link_a, link_b), b"hello\n!\n");
}

#[test]
fn messages_keep_their_order() {
    let (link_a, link_b) = MemLink::pair();
    let (key_a, input_a) = keyboard();
    let (_key_b, input_b) = keyboard();
    let screen_b = Screen::default();

    let a = Session::start(&config(), link_a, input_a, Screen::default()).unwrap();
    let b = Session::start(&config(), link_b, input_b, screen_b.clone()).unwrap();

    let lines: Vec<String> = (0..50).map(|i| format!("line {i}\n")).collect();
    for line in &lines {
        key_a.send(line.clone().into_bytes()).unwrap();
    }
    let expected = lines.concat().into_bytes();
    wait_until("all lines at B", || screen_b.contents().len() == expected.len());
    assert_eq!(screen_b.contents(), expected);

    a.stop();
    b.stop();
    assert!(a.wait().is_clean());
    assert!(b.wait().is_clean());
}

#[test]
fn stop_cancels_every_role() {
    let (link, peer) = MemLink::pair();
    let (key, input) = keyboard();
    let reads = Arc::clone(&input.reads);
    let session = Session::start(&config(), link, input, Screen::default()).unwrap();

    // Park the Reader inside its second read so it cannot see the stop.
    key.send(b"ping\n".to_vec()).unwrap();
    let mut buf = [0u8; 16];
    wait_until("ping at the peer", || matches!(peer.recv(&mut buf), Ok(Some(5))));
    wait_until("the Reader to block again", || reads.load(Ordering::SeqCst) == 2);

    session.stop();
    wait_until("network roles to stop", || {
        [Role::Sender, Role::Receiver, Role::Printer]
            .iter()
            .all(|&role| session.state(role) == RoleState::Stopped)
    });

    let report = session.wait();
    assert!(report.is_clean());
    for role in [Role::Sender, Role::Receiver, Role::Printer] {
        assert_eq!(exited(&report, role), RoleExit::Cancelled);
    }
    // Still waiting on a keypress that never comes.
    assert!(matches!(
        report.outcome(Role::Reader),
        Some(RoleOutcome::Detached)
    ));
}

#[test]
fn storage_exhaustion_ends_the_session_with_an_error() {
    let (link, peer) = MemLink::pair();
    let (key, input) = keyboard();
    let (gate, gate_rx) = mpsc::channel::<()>();
    let output = GatedScreen {
        gate: gate_rx,
        screen: Screen::default(),
    };

    let mut config = config();
    config.node_capacity = 1;
    let session = Session::start(&config, link, input, output).unwrap();
    let shutdown = session.shutdown_handle();

    // The Printer holds at most one message and the queue one more.
    for msg in ["1\n", "2\n", "3\n"] {
        peer.send(msg.as_bytes()).unwrap();
    }
    wait_until("the session to wind down", || shutdown.is_triggered());
    drop(gate);
    drop(key);
    wait_until("all roles to stop", || session.all_stopped());

    let report = session.wait();
    let errors: Vec<_> = report.errors().collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].0, Role::Receiver);
    assert!(matches!(errors[0].1, TalkError::Storage(_)));
    assert_eq!(exited(&report, Role::Sender), RoleExit::Cancelled);
}
