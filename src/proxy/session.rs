//! Per-session pump.
//!
//! Each session owns a client/server socket pair, one buffer per direction,
//! and the connection record. A step reads whichever side is ready, lets
//! the parser drain every complete message (emitting one trace record per
//! message and patching forwarded bytes where configured), then relays the
//! parsed prefix to the opposite socket. EOF or an I/O error on either side
//! ends the whole session; a partial trailing message is never forwarded.

use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, warn};

use crate::core::config::Settings;
use crate::protocol::{replies, requests, setup};
use crate::proxy::connection::Connection;
use crate::proxy::socket_buffer::SocketBuffer;
use crate::trace::{hexdump, message_prefix, Direction, TraceSink};
use crate::{Error, Result};

pub struct Session {
    settings: Arc<Settings>,
    sink: Arc<TraceSink>,
    conn: Connection,
    client_buf: SocketBuffer,
    server_buf: SocketBuffer,
    client_setup_done: bool,
    server_setup_done: bool,
}

impl Session {
    pub fn new(settings: Arc<Settings>, sink: Arc<TraceSink>, conn: Connection) -> Self {
        Self {
            settings,
            sink,
            conn,
            client_buf: SocketBuffer::new(),
            server_buf: SocketBuffer::new(),
            client_setup_done: false,
            server_setup_done: false,
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Drive the session until either side closes or fails.
    pub async fn run<C, S>(mut self, client: C, server: S) -> Result<()>
    where
        C: AsyncRead + AsyncWrite + Unpin,
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let (mut client_read, mut client_write) = tokio::io::split(client);
        let (mut server_read, mut server_write) = tokio::io::split(server);

        enum Side {
            Client,
            Server,
        }

        let result = loop {
            let side = tokio::select! {
                filled = self.client_buf.fill_from(&mut client_read, "client read") => {
                    match filled {
                        Ok(_) => Side::Client,
                        Err(e) => break Err(e),
                    }
                }
                filled = self.server_buf.fill_from(&mut server_read, "server read") => {
                    match filled {
                        Ok(_) => Side::Server,
                        Err(e) => break Err(e),
                    }
                }
            };

            let step = match side {
                Side::Client => {
                    match parse_client_stream(
                        &self.settings,
                        &self.sink,
                        &mut self.conn,
                        &mut self.client_buf,
                        &mut self.client_setup_done,
                    ) {
                        Ok(()) => {
                            self.client_buf
                                .drain_to(&mut server_write, "server write")
                                .await
                        }
                        Err(e) => Err(e),
                    }
                }
                Side::Server => {
                    match parse_server_stream(
                        &self.settings,
                        &self.sink,
                        &mut self.conn,
                        &mut self.server_buf,
                        &mut self.server_setup_done,
                    ) {
                        Ok(()) => {
                            self.server_buf
                                .drain_to(&mut client_write, "client write")
                                .await
                        }
                        Err(e) => Err(e),
                    }
                }
            };
            if let Err(e) = step {
                break Err(e);
            }
        };

        self.conn.close_client_socket();
        self.conn.close_server_socket();

        match result {
            Err(Error::PeerClosed(side)) => {
                info!("connection {}: {} closed, session over", self.conn.id, side);
                Ok(())
            }
            Err(e) => {
                warn!("connection {}: session failed: {}", self.conn.id, e);
                Err(e)
            }
            Ok(()) => Ok(()),
        }
    }
}

/// Drain every complete client-to-server message currently buffered.
/// Each iteration frames and consumes exactly one message; a short message
/// leaves the buffer untouched for the next read.
pub fn parse_client_stream(
    settings: &Settings,
    sink: &TraceSink,
    conn: &mut Connection,
    buf: &mut SocketBuffer,
    setup_done: &mut bool,
) -> Result<()> {
    loop {
        if buf.message_size().is_none() {
            let measured = if *setup_done {
                requests::measure_request(
                    buf.unparsed_data(),
                    conn.byte_order,
                    conn.extensions.big_requests,
                )
            } else {
                setup::measure_initiation(buf.unparsed_data())
            };
            match measured.map_err(|e| dump_malformed(settings, buf, e))? {
                Some(sz) => buf.set_message_size(sz)?,
                None => return Ok(()),
            }
        }
        if buf.incomplete_message() {
            return Ok(());
        }
        let message_sz = buf.message_size().expect("framed message has a size");
        let data = &buf.unparsed_data()[..message_sz];
        let text = if *setup_done {
            requests::decode_request(settings, conn, data)
        } else {
            setup::decode_initiation(settings, conn, data)
        }
        .map_err(|e| dump_malformed(settings, buf, e))?;

        sink.emit(&format!(
            "{} {}",
            message_prefix(conn.id, message_sz, Direction::ClientToServer),
            text
        ));
        if !*setup_done {
            debug!("connection {}: client initiation parsed", conn.id);
            *setup_done = true;
        }
        buf.mark_message_parsed()?;
    }
}

/// Drain every complete server-to-client message currently buffered.
pub fn parse_server_stream(
    settings: &Settings,
    sink: &TraceSink,
    conn: &mut Connection,
    buf: &mut SocketBuffer,
    setup_done: &mut bool,
) -> Result<()> {
    loop {
        if buf.message_size().is_none() {
            let measured = if *setup_done {
                replies::measure_server_message(buf.unparsed_data(), conn.byte_order)
            } else {
                setup::measure_setup_response(buf.unparsed_data(), conn.byte_order)
            };
            match measured.map_err(|e| dump_malformed(settings, buf, e))? {
                Some(sz) => buf.set_message_size(sz)?,
                None => return Ok(()),
            }
        }
        if buf.incomplete_message() {
            return Ok(());
        }
        let message_sz = buf.message_size().expect("framed message has a size");
        let data = &buf.unparsed_data()[..message_sz];
        let mut setup_complete = false;
        let (text, patches) = if *setup_done {
            let decoded = replies::decode_server_message(settings, conn, data)
                .map_err(|e| dump_malformed(settings, buf, e))?;
            (decoded.text, decoded.patches)
        } else {
            // an Authenticate response keeps the handshake open
            setup_complete = data[0] != setup::status::AUTHENTICATE;
            let text = setup::decode_setup_response(settings, conn, data)
                .map_err(|e| dump_malformed(settings, buf, e))?;
            (text, Vec::new())
        };

        // patch the forwarded bytes before they are marked relay-ready
        for (offset, value) in patches {
            buf.patch_unparsed(offset, value)?;
        }

        sink.emit(&format!(
            "{} {}",
            message_prefix(conn.id, message_sz, Direction::ServerToClient),
            text
        ));
        if !*setup_done && setup_complete {
            debug!("connection {}: server setup response parsed", conn.id);
            *setup_done = true;
        }
        buf.mark_message_parsed()?;
    }
}

fn dump_malformed(settings: &Settings, buf: &SocketBuffer, e: Error) -> Error {
    if settings.dump_malformed && matches!(e, Error::Protocol(_)) {
        let unparsed = buf.unparsed_data();
        let shown = &unparsed[..unparsed.len().min(64)];
        debug!("offending bytes:\n{}", hexdump::hex_dump(shown));
    }
    e
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::opcodes;

    fn harness() -> (Settings, TraceSink, Connection) {
        let settings = Settings::default();
        let sink = TraceSink::memory();
        let mut conn = Connection::new("client".into(), "server".into());
        conn.byte_order = crate::protocol::ByteOrder::LittleEndian;
        (settings, sink, conn)
    }

    fn get_geometry_request() -> Vec<u8> {
        let mut req = vec![14u8, 0, 2, 0];
        req.extend_from_slice(&0x1234_5678u32.to_le_bytes());
        req
    }

    #[test]
    fn test_request_split_across_reads() {
        let (settings, sink, mut conn) = harness();
        let mut buf = SocketBuffer::new();
        let mut setup_done = true;
        let req = get_geometry_request();

        // first half: no output, nothing consumed
        buf.load(&req[..3]);
        parse_client_stream(&settings, &sink, &mut conn, &mut buf, &mut setup_done).unwrap();
        assert_eq!(sink.contents(), "");
        assert_eq!(buf.parsed(), 0);

        // second half completes the message
        buf.load(&req[3..]);
        parse_client_stream(&settings, &sink, &mut conn, &mut buf, &mut setup_done).unwrap();
        let out = sink.contents();
        assert!(out.contains("GetGeometry seq=1"));
        assert!(out.contains("drawable=0x12345678"));
        assert_eq!(buf.parsed(), 8);
    }

    #[test]
    fn test_two_requests_in_one_read() {
        let (settings, sink, mut conn) = harness();
        let mut buf = SocketBuffer::new();
        let mut setup_done = true;

        let mut bytes = get_geometry_request();
        bytes.extend_from_slice(&[43u8, 0, 1, 0]); // GetInputFocus
        buf.load(&bytes);
        parse_client_stream(&settings, &sink, &mut conn, &mut buf, &mut setup_done).unwrap();

        let out = sink.contents();
        assert!(out.contains("GetGeometry seq=1"));
        assert!(out.contains("GetInputFocus seq=2"));
        assert_eq!(buf.parsed(), 12);
        assert_eq!(conn.sequence, 2);
    }

    #[test]
    fn test_server_stream_patch_applied_before_relay() {
        let settings = Settings {
            deny_all_extensions: true,
            ..Settings::default()
        };
        let sink = TraceSink::memory();
        let mut conn = Connection::new("client".into(), "server".into());
        conn.register_request(opcodes::server::QUERY_EXTENSION).unwrap();
        conn.stash_query_extension(1, "MIT-SHM".into());

        let mut reply = vec![1u8, 0];
        reply.extend_from_slice(&1u16.to_le_bytes()); // sequence
        reply.extend_from_slice(&0u32.to_le_bytes()); // extra length
        reply.extend_from_slice(&[1, 130, 64, 128]); // present=1 ...
        reply.resize(32, 0);

        let mut buf = SocketBuffer::new();
        let mut setup_done = true;
        buf.load(&reply);
        parse_server_stream(&settings, &sink, &mut conn, &mut buf, &mut setup_done).unwrap();

        // forwarded bytes carry present=0; the rest of the reply is intact
        let relayed = buf.unload(32).unwrap();
        assert_eq!(relayed[8], 0);
        assert_eq!(relayed[9], 130);
        assert_eq!(relayed[10], 64);
        assert_eq!(relayed[11], 128);
        assert!(sink.contents().contains("present=False"));
    }

    #[test]
    fn test_byte_identity_without_deny() {
        let (settings, sink, mut conn) = harness();
        conn.register_request(opcodes::window::GET_GEOMETRY).unwrap();

        let mut reply = vec![1u8, 24];
        reply.extend_from_slice(&1u16.to_le_bytes());
        reply.extend_from_slice(&0u32.to_le_bytes());
        reply.extend_from_slice(&0x250u32.to_le_bytes());
        reply.resize(32, 0);

        let mut buf = SocketBuffer::new();
        let mut setup_done = true;
        buf.load(&reply);
        parse_server_stream(&settings, &sink, &mut conn, &mut buf, &mut setup_done).unwrap();
        let relayed = buf.unload(32).unwrap();
        assert_eq!(relayed, reply);
    }

    #[test]
    fn test_setup_exchange_then_stream() {
        let (settings, sink, mut conn) = harness();
        let mut client_buf = SocketBuffer::new();
        let mut client_setup_done = false;

        // 12-byte initiation with no auth
        let initiation = [b'l', 0, 11, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        client_buf.load(&initiation);
        parse_client_stream(
            &settings,
            &sink,
            &mut conn,
            &mut client_buf,
            &mut client_setup_done,
        )
        .unwrap();
        assert!(client_setup_done);
        assert!(sink.contents().contains("attempting connection"));

        // requests now frame through the generic header
        client_buf.load(&get_geometry_request());
        parse_client_stream(
            &settings,
            &sink,
            &mut conn,
            &mut client_buf,
            &mut client_setup_done,
        )
        .unwrap();
        assert!(sink.contents().contains("GetGeometry seq=1"));
    }

    #[tokio::test]
    async fn test_full_session_over_duplex_pipes() {
        let settings = Arc::new(Settings::default());
        let sink = Arc::new(TraceSink::memory());
        let conn = Connection::new("client".into(), "server".into());

        let (client_near, client_far) = tokio::io::duplex(1024);
        let (server_near, server_far) = tokio::io::duplex(1024);

        let session = Session::new(settings, Arc::clone(&sink), conn);
        let task = tokio::spawn(session.run(client_far, server_near));

        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        let (mut client_in, mut client_out) = tokio::io::split(client_near);
        let (mut server_in, mut server_out) = tokio::io::split(server_far);

        // client sends its initiation; the proxy relays it to the server
        let initiation = [b'l', 0, 11, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        client_out.write_all(&initiation).await.unwrap();
        let mut relayed = [0u8; 12];
        server_in.read_exact(&mut relayed).await.unwrap();
        assert_eq!(relayed, initiation);

        // server refuses; the refusal reaches the client byte-identical
        let mut refusal = vec![0u8, 6, 11, 0, 0, 0, 2, 0];
        refusal.extend_from_slice(b"denied\0\0");
        server_out.write_all(&refusal).await.unwrap();
        let mut relayed = vec![0u8; refusal.len()];
        client_in.read_exact(&mut relayed).await.unwrap();
        assert_eq!(relayed, refusal);

        // closing the client ends the session cleanly
        drop(client_out);
        drop(client_in);
        let result = task.await.unwrap();
        assert!(result.is_ok());

        let out = sink.contents();
        assert!(out.contains("attempting connection"));
        assert!(out.contains("refused"));
    }
}
