//! Server-to-client error decoding.
//!
//! Every error is exactly 32 bytes: a zero prefix, the error code, the wire
//! sequence of the offending request, a value slot (the bad resource id or
//! bad value where the code defines one), and the minor/major opcodes of
//! the request that failed.

use crate::core::config::Settings;
use crate::protocol::{opcodes, WireReader, DEFAULT_MESSAGE_SZ};
use crate::proxy::connection::Connection;
use crate::trace::format::{self, Record, Whitespace};
use crate::{Error, Result};

/// Errors whose value slot holds the offending resource id.
fn carries_resource_id(code: u8) -> bool {
    use opcodes::error;
    matches!(
        code,
        error::WINDOW
            | error::PIXMAP
            | error::ATOM
            | error::CURSOR
            | error::FONT
            | error::DRAWABLE
            | error::COLORMAP
            | error::GCONTEXT
            | error::IDCHOICE
    )
}

/// Decode one 32-byte error into its trace text.
pub fn decode_error(settings: &Settings, conn: &Connection, data: &[u8]) -> Result<String> {
    if data.len() != DEFAULT_MESSAGE_SZ {
        return Err(Error::Protocol(format!(
            "error framed as {} bytes instead of {}",
            data.len(),
            DEFAULT_MESSAGE_SZ
        )));
    }
    let mut r = WireReader::new(data, conn.byte_order);
    r.skip(1)?; // 0x00 prefix
    let code = r.card8()?;
    let sequence = r.card16()?;
    let value = r.card32()?;
    let minor_opcode = r.card16()?;
    let major_opcode = r.card8()?;

    let name = opcodes::error_name(code);
    let ws = Whitespace::root(settings.multiline);
    let mut rec = Record::new(settings, ws);
    if carries_resource_id(code) {
        rec.field("bad-resource-id", format::format_hex(value, 4));
    } else if code == opcodes::error::VALUE {
        rec.field("bad-value", format::format_hex(value, 4));
    } else {
        rec.verbose_field("value", format::format_hex(value, 4));
    }
    rec.field("minor-opcode", format::format_card(minor_opcode));
    rec.field(
        "major-opcode",
        format!(
            "{}({})",
            opcodes::request_name(major_opcode),
            major_opcode
        ),
    );

    if settings.verbose {
        Ok(format!(
            "{}({}) error seq={}: {}",
            name,
            code,
            sequence,
            rec.finish()
        ))
    } else {
        Ok(format!("{} error seq={}: {}", name, sequence, rec.finish()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings::default()
    }

    fn connection() -> Connection {
        Connection::new("client".into(), "server".into())
    }

    fn error_frame(code: u8, seq: u16, value: u32, minor: u16, major: u8) -> [u8; 32] {
        let mut data = [0u8; 32];
        data[1] = code;
        data[2..4].copy_from_slice(&seq.to_le_bytes());
        data[4..8].copy_from_slice(&value.to_le_bytes());
        data[8..10].copy_from_slice(&minor.to_le_bytes());
        data[10] = major;
        data
    }

    #[test]
    fn test_window_error() {
        // DestroyWindow(window=0) draws a Window error
        let data = error_frame(opcodes::error::WINDOW, 1, 0, 0, 4);
        let text = decode_error(&settings(), &connection(), &data).unwrap();
        assert!(text.starts_with("Window error seq=1:"));
        assert!(text.contains("bad-resource-id=0x00000000"));
        assert!(text.contains("major-opcode=DestroyWindow(4)"));
    }

    #[test]
    fn test_value_error() {
        let data = error_frame(opcodes::error::VALUE, 2, 8, 0, 35);
        let text = decode_error(&settings(), &connection(), &data).unwrap();
        assert!(text.starts_with("Value error seq=2:"));
        assert!(text.contains("bad-value=0x00000008"));
        assert!(text.contains("major-opcode=AllowEvents(35)"));
    }

    #[test]
    fn test_request_error_hides_value() {
        let data = error_frame(opcodes::error::REQUEST, 3, 0xDEAD, 0, 0);
        let text = decode_error(&settings(), &connection(), &data).unwrap();
        assert!(text.starts_with("Request error seq=3:"));
        assert!(!text.contains("0xdead"));
    }

    #[test]
    fn test_all_core_codes_named() {
        for code in opcodes::error::MIN..=opcodes::error::MAX {
            let data = error_frame(code, 1, 0, 0, 1);
            let text = decode_error(&settings(), &connection(), &data).unwrap();
            assert!(!text.contains("(unused error code)"), "code {}", code);
        }
    }

    #[test]
    fn test_wrong_size_rejected() {
        let data = [0u8; 31];
        assert!(decode_error(&settings(), &connection(), &data).is_err());
    }
}
