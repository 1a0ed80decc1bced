//! Per-session connection state.
//!
//! Tracks the identity of one client/server session, shadows the server's
//! implicit request numbering, remembers each request's major opcode for
//! reply dispatch, and carries the session's interned-atom knowledge.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use crate::protocol::{atoms, ByteOrder};
use crate::proxy::extensions::Extensions;
use crate::{Error, Result};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

pub struct Connection {
    /// Process-unique session id
    pub id: u64,
    /// Creation time, milliseconds since the Unix epoch
    pub start_time_ms: i64,
    /// Printable client endpoint, used in trace prefixes and diagnostics
    pub client_desc: String,
    /// Printable server endpoint
    pub server_desc: String,
    /// Byte order latched from the initiation byte; requests before the
    /// latch cannot occur (initiation is always first)
    pub byte_order: ByteOrder,
    /// Shadow of the server's implicit request counter; requests are
    /// 1-indexed, so this equals the number of requests registered
    pub sequence: u64,
    /// Major opcode of request k at index k-1
    request_log: Vec<u8>,
    /// Extension activation flags
    pub extensions: Extensions,
    /// Major opcode the server assigned to BIG-REQUESTS, once learned
    pub big_requests_opcode: Option<u8>,
    /// Atom id -> name, learned from InternAtom exchanges
    interned_atoms: HashMap<u32, String>,
    /// InternAtom names in flight, keyed by full sequence number
    pending_intern_atoms: HashMap<u64, String>,
    /// QueryExtension names in flight, keyed by full sequence number
    pending_query_extensions: HashMap<u64, String>,
    client_closed: bool,
    server_closed: bool,
}

impl Connection {
    pub fn new(client_desc: String, server_desc: String) -> Self {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        debug!(
            "connection {}: {} <-> {} established",
            id, client_desc, server_desc
        );
        Self {
            id,
            start_time_ms: chrono::Utc::now().timestamp_millis(),
            client_desc,
            server_desc,
            byte_order: ByteOrder::LittleEndian,
            sequence: 0,
            request_log: Vec::new(),
            extensions: Extensions::default(),
            big_requests_opcode: None,
            interned_atoms: HashMap::new(),
            pending_intern_atoms: HashMap::new(),
            pending_query_extensions: HashMap::new(),
            client_closed: false,
            server_closed: false,
        }
    }

    /// Shadow one client request: append its opcode and advance the
    /// sequence counter the way the server will.
    pub fn register_request(&mut self, opcode: u8) -> Result<()> {
        if self.request_log.len() as u64 != self.sequence {
            return Err(Error::Invariant(format!(
                "request log holds {} entries at sequence {}",
                self.request_log.len(),
                self.sequence
            )));
        }
        self.request_log.push(opcode);
        self.sequence += 1;
        Ok(())
    }

    /// Resolve a 16-bit wire sequence to the most recent matching full
    /// sequence number.
    pub fn resolve_sequence(&self, wire_seq: u16) -> Option<u64> {
        if self.sequence == 0 {
            return None;
        }
        let mut candidate = (self.sequence & !0xFFFF) | wire_seq as u64;
        if candidate > self.sequence {
            candidate = candidate.checked_sub(0x1_0000)?;
        }
        if candidate == 0 || candidate > self.sequence {
            return None;
        }
        Some(candidate)
    }

    /// Major opcode of the request a reply/error with this wire sequence
    /// answers.
    pub fn lookup_request(&self, wire_seq: u16) -> Option<u8> {
        let seq = self.resolve_sequence(wire_seq)?;
        self.request_log.get(seq as usize - 1).copied()
    }

    /// Stash the name carried by an InternAtom request until its reply
    /// arrives with the atom id.
    pub fn stash_intern_atom(&mut self, sequence: u64, name: String) {
        self.pending_intern_atoms.insert(sequence, name);
    }

    /// Claim the stashed InternAtom name for this sequence. A miss for a
    /// sequence known to carry InternAtom is a parser bug.
    pub fn take_intern_atom(&mut self, sequence: u64) -> Result<String> {
        self.pending_intern_atoms.remove(&sequence).ok_or_else(|| {
            Error::Invariant(format!(
                "no stashed InternAtom name for sequence {}",
                sequence
            ))
        })
    }

    /// Record a learned atom. Predefined atoms already have names; only
    /// server-allocated ids enter the table.
    pub fn record_interned_atom(&mut self, id: u32, name: String) {
        if id > atoms::PREDEFINED_MAX {
            debug!("connection {}: interned atom {:#010x} = {:?}", self.id, id, name);
            self.interned_atoms.insert(id, name);
        }
    }

    pub fn interned_atoms(&self) -> &HashMap<u32, String> {
        &self.interned_atoms
    }

    pub fn stash_query_extension(&mut self, sequence: u64, name: String) {
        self.pending_query_extensions.insert(sequence, name);
    }

    pub fn take_query_extension(&mut self, sequence: u64) -> Option<String> {
        self.pending_query_extensions.remove(&sequence)
    }

    /// Idempotent close of the client side.
    pub fn close_client_socket(&mut self) {
        if !self.client_closed {
            self.client_closed = true;
            debug!("connection {}: client socket closed", self.id);
        }
    }

    /// Idempotent close of the server side.
    pub fn close_server_socket(&mut self) {
        if !self.server_closed {
            self.server_closed = true;
            debug!("connection {}: server socket closed", self.id);
        }
    }

    pub fn client_socket_closed(&self) -> bool {
        self.client_closed
    }

    pub fn server_socket_closed(&self) -> bool {
        self.server_closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connection() -> Connection {
        Connection::new("client".into(), "server".into())
    }

    #[test]
    fn test_register_and_lookup() {
        let mut conn = connection();
        conn.register_request(14).unwrap(); // GetGeometry, sequence 1
        conn.register_request(16).unwrap(); // InternAtom, sequence 2
        conn.register_request(4).unwrap(); // DestroyWindow, sequence 3

        assert_eq!(conn.sequence, 3);
        assert_eq!(conn.lookup_request(1), Some(14));
        assert_eq!(conn.lookup_request(2), Some(16));
        assert_eq!(conn.lookup_request(3), Some(4));
        assert_eq!(conn.lookup_request(4), None);
        assert_eq!(conn.lookup_request(0), None);
    }

    #[test]
    fn test_sequence_resolution_after_wrap() {
        let mut conn = connection();
        for _ in 0..0x1_0005u64 {
            conn.register_request(127).unwrap();
        }
        // wire sequence 3 now refers to the second time around
        assert_eq!(conn.resolve_sequence(3), Some(0x1_0003));
        // wire sequence just above the counter refers to the previous lap
        assert_eq!(conn.resolve_sequence(0x0006), Some(0x0006));
    }

    #[test]
    fn test_atom_stash_roundtrip() {
        let mut conn = connection();
        conn.register_request(16).unwrap();
        conn.stash_intern_atom(conn.sequence, "_MY_APP".into());

        let name = conn.take_intern_atom(1).unwrap();
        assert_eq!(name, "_MY_APP");
        conn.record_interned_atom(377, name);
        assert_eq!(conn.interned_atoms().get(&377).map(String::as_str), Some("_MY_APP"));

        // a second take for the same sequence is a bug
        assert!(conn.take_intern_atom(1).is_err());
    }

    #[test]
    fn test_predefined_atoms_not_interned() {
        let mut conn = connection();
        conn.record_interned_atom(39, "WM_NAME".into());
        assert!(conn.interned_atoms().is_empty());
    }

    #[test]
    fn test_close_idempotence() {
        let mut conn = connection();
        conn.close_client_socket();
        conn.close_client_socket();
        conn.close_server_socket();
        conn.close_server_socket();
        assert!(conn.client_socket_closed());
        assert!(conn.server_socket_closed());
    }

    #[test]
    fn test_connection_ids_unique() {
        let a = connection();
        let b = connection();
        assert_ne!(a.id, b.id);
    }
}
