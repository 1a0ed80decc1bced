//! End-to-end trace scenarios driven through in-process buffers.
//!
//! Each test loads raw wire bytes into a session's buffers, runs the stream
//! parsers the way the pump does, and checks both the emitted trace and the
//! bytes that would be relayed.

use rxtrace::core::config::Settings;
use rxtrace::protocol::ByteOrder;
use rxtrace::proxy::connection::Connection;
use rxtrace::proxy::socket_buffer::SocketBuffer;
use rxtrace::proxy::session::{parse_client_stream, parse_server_stream};
use rxtrace::trace::TraceSink;

struct Harness {
    settings: Settings,
    sink: TraceSink,
    conn: Connection,
    client_buf: SocketBuffer,
    server_buf: SocketBuffer,
    client_setup_done: bool,
    server_setup_done: bool,
}

impl Harness {
    fn new(settings: Settings) -> Self {
        let mut conn = Connection::new("client".into(), "server".into());
        conn.byte_order = ByteOrder::LittleEndian;
        Self {
            settings,
            sink: TraceSink::memory(),
            conn,
            client_buf: SocketBuffer::new(),
            server_buf: SocketBuffer::new(),
            // setup already exchanged; tests drive the message-stream phase
            client_setup_done: true,
            server_setup_done: true,
        }
    }

    fn client_sends(&mut self, bytes: &[u8]) {
        self.client_buf.load(bytes);
        parse_client_stream(
            &self.settings,
            &self.sink,
            &mut self.conn,
            &mut self.client_buf,
            &mut self.client_setup_done,
        )
        .expect("client stream parse failed");
    }

    fn server_sends(&mut self, bytes: &[u8]) {
        self.server_buf.load(bytes);
        parse_server_stream(
            &self.settings,
            &self.sink,
            &mut self.conn,
            &mut self.server_buf,
            &mut self.server_setup_done,
        )
        .expect("server stream parse failed");
    }

    fn relayed_to_server(&mut self, count: usize) -> Vec<u8> {
        self.client_buf.unload(count).expect("client relay bytes")
    }

    fn relayed_to_client(&mut self, count: usize) -> Vec<u8> {
        self.server_buf.unload(count).expect("server relay bytes")
    }

    fn trace(&self) -> String {
        self.sink.contents()
    }
}

fn intern_atom_request(name: &str) -> Vec<u8> {
    let mut req = vec![16u8, 0, 0, 0];
    req.extend_from_slice(&(name.len() as u16).to_le_bytes());
    req.extend_from_slice(&[0, 0]);
    req.extend_from_slice(name.as_bytes());
    while req.len() % 4 != 0 {
        req.push(0);
    }
    let units = (req.len() / 4) as u16;
    req[2..4].copy_from_slice(&units.to_le_bytes());
    req
}

fn intern_atom_reply(seq: u16, atom: u32) -> Vec<u8> {
    let mut reply = vec![1u8, 0];
    reply.extend_from_slice(&seq.to_le_bytes());
    reply.extend_from_slice(&0u32.to_le_bytes());
    reply.extend_from_slice(&atom.to_le_bytes());
    reply.resize(32, 0);
    reply
}

#[test]
fn get_geometry_happy_path() {
    let mut h = Harness::new(Settings::default());

    // client: GetGeometry(drawable=0x12345678), 8 bytes
    let mut req = vec![14u8, 0, 2, 0];
    req.extend_from_slice(&0x1234_5678u32.to_le_bytes());
    h.client_sends(&req);
    assert_eq!(h.relayed_to_server(8), req);

    // server: 32-byte reply, depth 24, root 0x250, 640x480
    let mut reply = vec![1u8, 24];
    reply.extend_from_slice(&1u16.to_le_bytes());
    reply.extend_from_slice(&0u32.to_le_bytes());
    reply.extend_from_slice(&0x0000_0250u32.to_le_bytes());
    reply.extend_from_slice(&0i16.to_le_bytes());
    reply.extend_from_slice(&0i16.to_le_bytes());
    reply.extend_from_slice(&640u16.to_le_bytes());
    reply.extend_from_slice(&480u16.to_le_bytes());
    reply.extend_from_slice(&0u16.to_le_bytes());
    reply.resize(32, 0);
    h.server_sends(&reply);
    assert_eq!(h.relayed_to_client(32), reply);

    let trace = h.trace();
    let lines: Vec<&str> = trace.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("GetGeometry seq=1"));
    assert!(lines[1].contains("GetGeometry reply seq=1"));
    assert!(lines[1].contains("depth=24"));
    assert!(lines[1].contains("root=0x00000250"));
    assert!(lines[1].contains("width=640"));
    assert!(lines[1].contains("height=480"));
}

#[test]
fn intern_atom_predefined_not_interned() {
    let mut h = Harness::new(Settings::default());

    h.client_sends(&intern_atom_request("WM_NAME"));
    h.server_sends(&intern_atom_reply(1, 39));

    // 39 is predefined; the session table stays empty but the name renders
    assert!(h.conn.interned_atoms().is_empty());
    assert!(h.trace().contains("atom=\"WM_NAME\""));
}

#[test]
fn intern_atom_custom_interned() {
    let mut h = Harness::new(Settings::default());

    h.client_sends(&intern_atom_request("_MY_APP"));

    // before the reply arrives the atom is unknown
    assert!(h.trace().contains("name=\"_MY_APP\""));
    assert!(h.conn.interned_atoms().get(&377).is_none());

    h.server_sends(&intern_atom_reply(1, 377));
    assert_eq!(
        h.conn.interned_atoms().get(&377).map(String::as_str),
        Some("_MY_APP")
    );
    assert!(h.trace().contains("atom=\"_MY_APP\""));
}

#[test]
fn intern_atom_verbose_rendering() {
    let settings = Settings {
        verbose: true,
        ..Settings::default()
    };
    let mut h = Harness::new(settings);

    h.client_sends(&intern_atom_request("_MY_APP"));
    h.server_sends(&intern_atom_reply(1, 377));

    assert!(h.trace().contains("0x00000179(\"_MY_APP\")"));
}

#[test]
fn change_property_consumes_padded_tail() {
    let mut h = Harness::new(Settings::default());

    let mut req = vec![18u8, 0, 8, 0]; // mode Replace, 32 bytes total
    req.extend_from_slice(&0x0060_0005u32.to_le_bytes()); // window
    req.extend_from_slice(&39u32.to_le_bytes()); // property WM_NAME
    req.extend_from_slice(&31u32.to_le_bytes()); // type STRING
    req.push(8);
    req.extend_from_slice(&[0, 0, 0]);
    req.extend_from_slice(&5u32.to_le_bytes());
    req.extend_from_slice(b"hello\0\0\0");
    assert_eq!(req.len(), 32);

    h.client_sends(&req);
    // exactly 32 bytes consumed and relay-ready
    assert_eq!(h.relayed_to_server(32), req);
    assert!(h.trace().contains("data=\"hello\""));
}

#[test]
fn query_extension_deny_rewrites_forwarded_present() {
    let settings = Settings {
        deny_all_extensions: true,
        ..Settings::default()
    };
    let mut h = Harness::new(settings);

    let mut req = vec![98u8, 0, 0, 0];
    req.extend_from_slice(&7u16.to_le_bytes());
    req.extend_from_slice(&[0, 0]);
    req.extend_from_slice(b"MIT-SHM\0");
    let units = (req.len() / 4) as u16;
    req[2..4].copy_from_slice(&units.to_le_bytes());
    h.client_sends(&req);
    h.relayed_to_server(req.len());

    let mut reply = vec![1u8, 0];
    reply.extend_from_slice(&1u16.to_le_bytes());
    reply.extend_from_slice(&0u32.to_le_bytes());
    reply.extend_from_slice(&[1, 130, 64, 128]);
    reply.resize(32, 0);
    h.server_sends(&reply);

    let relayed = h.relayed_to_client(32);
    assert_eq!(relayed[8], 0, "present must be rewritten to 0");
    assert_eq!(&relayed[9..12], &[130, 64, 128], "other fields intact");
    assert_eq!(&relayed[..8], &reply[..8]);

    let trace = h.trace();
    assert!(trace.contains("present=False"));
    assert!(trace.contains("major-opcode=130"));
}

#[test]
fn destroy_window_error_names_major_opcode() {
    let mut h = Harness::new(Settings::default());

    let mut req = vec![4u8, 0, 2, 0];
    req.extend_from_slice(&0u32.to_le_bytes());
    h.client_sends(&req);

    let mut error = vec![0u8, 3]; // Window error
    error.extend_from_slice(&1u16.to_le_bytes());
    error.extend_from_slice(&0u32.to_le_bytes()); // bad resource id
    error.extend_from_slice(&0u16.to_le_bytes()); // minor opcode
    error.push(4); // major opcode DestroyWindow
    error.resize(32, 0);
    h.server_sends(&error);
    assert_eq!(h.relayed_to_client(32), error);

    let trace = h.trace();
    assert!(trace.contains("Window error seq=1"));
    assert!(trace.contains("bad-resource-id=0x00000000"));
    assert!(trace.contains("major-opcode=DestroyWindow(4)"));
}

#[test]
fn big_requests_framing_after_enable() {
    let mut h = Harness::new(Settings::default());

    // QueryExtension("BIG-REQUESTS")
    let mut req = vec![98u8, 0, 0, 0];
    req.extend_from_slice(&12u16.to_le_bytes());
    req.extend_from_slice(&[0, 0]);
    req.extend_from_slice(b"BIG-REQUESTS");
    let units = (req.len() / 4) as u16;
    req[2..4].copy_from_slice(&units.to_le_bytes());
    h.client_sends(&req);

    // reply: present, major opcode 133
    let mut reply = vec![1u8, 0];
    reply.extend_from_slice(&1u16.to_le_bytes());
    reply.extend_from_slice(&0u32.to_le_bytes());
    reply.extend_from_slice(&[1, 133, 0, 0]);
    reply.resize(32, 0);
    h.server_sends(&reply);
    assert_eq!(h.conn.big_requests_opcode, Some(133));

    // BigReqEnable on opcode 133 flips the framing flag
    h.client_sends(&[133u8, 0, 1, 0]);
    assert!(h.conn.extensions.big_requests);
    assert!(h.trace().contains("BigReqEnable seq=2"));

    // a zero 16-bit length now defers to the 32-bit field: 3 units = 12 bytes
    let mut big = vec![127u8, 0, 0, 0];
    big.extend_from_slice(&3u32.to_le_bytes());
    big.extend_from_slice(&[0; 4]);
    h.client_sends(&big);
    assert!(h.trace().contains("NoOperation seq=3"));

    // everything relayed byte-identical
    let total = req.len() + 4 + 12;
    let relayed = h.relayed_to_server(total);
    assert_eq!(&relayed[..req.len()], &req[..]);
    assert_eq!(&relayed[req.len()..req.len() + 4], &[133, 0, 1, 0]);
    assert_eq!(&relayed[req.len() + 4..], &big[..]);
}

#[test]
fn round_trip_byte_identity_over_mixed_stream() {
    let mut h = Harness::new(Settings::default());

    // a batch of requests in one read
    let mut batch = Vec::new();
    let mut req = vec![14u8, 0, 2, 0];
    req.extend_from_slice(&0x1234_5678u32.to_le_bytes());
    batch.extend_from_slice(&req);
    batch.extend_from_slice(&[43u8, 0, 1, 0]); // GetInputFocus
    batch.extend_from_slice(&[36u8, 0, 1, 0]); // GrabServer
    h.client_sends(&batch);
    assert_eq!(h.relayed_to_server(batch.len()), batch);

    // server: an event then an error in one read
    let mut server_batch = Vec::new();
    let mut expose = vec![12u8, 0];
    expose.extend_from_slice(&1u16.to_le_bytes());
    expose.extend_from_slice(&0x0060_0005u32.to_le_bytes());
    expose.resize(32, 0);
    server_batch.extend_from_slice(&expose);
    let mut error = vec![0u8, 8]; // Match error
    error.extend_from_slice(&3u16.to_le_bytes());
    error.extend_from_slice(&0u32.to_le_bytes());
    error.extend_from_slice(&0u16.to_le_bytes());
    error.push(36);
    error.resize(32, 0);
    server_batch.extend_from_slice(&error);
    h.server_sends(&server_batch);
    assert_eq!(h.relayed_to_client(64), server_batch);

    let trace = h.trace();
    assert!(trace.contains("Expose event seq=1"));
    assert!(trace.contains("Match error seq=3"));
    assert!(trace.contains("major-opcode=GrabServer(36)"));
}

#[test]
fn reply_split_across_reads_emits_once() {
    let mut h = Harness::new(Settings::default());
    h.client_sends(&{
        let mut req = vec![14u8, 0, 2, 0];
        req.extend_from_slice(&1u32.to_le_bytes());
        req
    });

    let mut reply = vec![1u8, 24];
    reply.extend_from_slice(&1u16.to_le_bytes());
    reply.extend_from_slice(&0u32.to_le_bytes());
    reply.resize(32, 0);

    h.server_sends(&reply[..10]);
    assert!(!h.trace().contains("reply"));

    h.server_sends(&reply[10..]);
    assert!(h.trace().contains("GetGeometry reply seq=1"));
    assert_eq!(h.relayed_to_client(32), reply);
}

#[test]
fn multiline_trace_renders_member_per_line() {
    let settings = Settings {
        multiline: true,
        ..Settings::default()
    };
    let mut h = Harness::new(settings);

    let mut req = vec![14u8, 0, 2, 0];
    req.extend_from_slice(&0x1234_5678u32.to_le_bytes());
    h.client_sends(&req);

    let trace = h.trace();
    assert!(trace.contains("{\n"));
    assert!(trace.contains("\n  drawable=0x12345678\n"));
}

#[test]
fn timestamps_render_current_time_and_relative() {
    use rxtrace::core::config::TimestampAnchor;
    let settings = Settings {
        relative_timestamps: true,
        anchor: TimestampAnchor {
            ref_timestamp: 0,
            ref_unix_time: 1_700_000_000,
        },
        ..Settings::default()
    };
    let mut h = Harness::new(settings);

    // UngrabPointer(time=CurrentTime)
    let mut req = vec![27u8, 0, 2, 0];
    req.extend_from_slice(&0u32.to_le_bytes());
    h.client_sends(&req);
    assert!(h.trace().contains("time=CurrentTime"));

    // UngrabKeyboard(time=5000) -> five seconds past the anchor
    let mut req = vec![32u8, 0, 2, 0];
    req.extend_from_slice(&5000u32.to_le_bytes());
    h.client_sends(&req);
    assert!(h.trace().contains("2023-11-14T22:13:25"));
}

#[test]
fn trace_lines_carry_connection_prefix() {
    let mut h = Harness::new(Settings::default());
    let id = h.conn.id;

    let mut req = vec![14u8, 0, 2, 0];
    req.extend_from_slice(&1u32.to_le_bytes());
    h.client_sends(&req);

    let trace = h.trace();
    assert!(trace.contains(&format!("C{:03}:0008B:>:", id)));
}
