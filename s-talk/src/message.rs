//! Chat messages and the reserved termination token.
//!
//! A [`Message`] is an opaque run of bytes: one chunk read from the
//! terminal, or one datagram from the peer.  No framing is added on the
//! wire; a datagram carries exactly the bytes of one message.

use std::fmt;

/// Largest chunk read from the terminal in one go.
pub const MAX_CHUNK: usize = 256;

/// Largest payload accepted from the network; longer datagrams are cut.
pub const MAX_DATAGRAM: usize = MAX_CHUNK - 1;

/// Out-of-band end-of-session signal: `!` followed by a newline.
pub const TERMINATION_TOKEN: &[u8] = b"!\n";

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Message(Vec<u8>);

impl Message {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// The termination token as a message.
    pub fn termination() -> Self {
        Self(TERMINATION_TOKEN.to_vec())
    }

    /// `true` only for the exact two-byte token; `"!\n"` inside a longer
    /// message is ordinary chat text.
    pub fn is_termination(&self) -> bool {
        self.0 == TERMINATION_TOKEN
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for Message {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Message {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Self(text.as_bytes().to_vec())
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Message({:?})", String::from_utf8_lossy(&self.0))
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_exactly_bang_newline() {
        assert!(Message::from("!\n").is_termination());
        assert!(Message::termination().is_termination());
        assert!(!Message::from("!").is_termination());
        assert!(!Message::from("!\n\n").is_termination());
        assert!(!Message::from("hi!\n").is_termination());
        assert!(!Message::from("!\r\n").is_termination());
    }

    #[test]
    fn bytes_are_kept_verbatim() {
        let raw = vec![0u8, 159, 146, 150, b'\n'];
        let msg = Message::new(raw.clone());
        assert_eq!(msg.as_bytes(), raw.as_slice());
        assert_eq!(msg.len(), 5);
        assert_eq!(msg.into_bytes(), raw);
    }

    #[test]
    fn datagram_limit_leaves_room_below_chunk_size() {
        assert_eq!(MAX_CHUNK, 256);
        assert_eq!(MAX_DATAGRAM, 255);
    }

    #[test]
    fn display_is_lossy_text() {
        assert_eq!(Message::from("hello\n").to_string(), "hello\n");
        assert_eq!(format!("{:?}", Message::from("hi")), "Message(\"hi\")");
    }
}
