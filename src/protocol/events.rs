//! Server-to-client event decoding.
//!
//! Every event is exactly 32 bytes. The low seven bits of the first byte
//! select the event; the high bit marks an event synthesized via SendEvent.
//! KeymapNotify is the one event without a sequence-number slot.

use crate::core::config::Settings;
use crate::protocol::{enum_names, opcodes, types, WireReader, DEFAULT_MESSAGE_SZ};
use crate::proxy::connection::Connection;
use crate::trace::format::{self, Record, Whitespace};
use crate::{Error, Result};

/// Decode one 32-byte event into its trace text.
pub fn decode_event(settings: &Settings, conn: &Connection, data: &[u8]) -> Result<String> {
    if data.len() != DEFAULT_MESSAGE_SZ {
        return Err(Error::Protocol(format!(
            "event framed as {} bytes instead of {}",
            data.len(),
            DEFAULT_MESSAGE_SZ
        )));
    }
    let synthetic = data[0] & opcodes::event::SEND_EVENT_FLAG != 0;
    let code = data[0] & !opcodes::event::SEND_EVENT_FLAG;
    let ws = Whitespace::root(settings.multiline);
    let (name, sequence, body) = build_event(settings, conn, code, data, ws)?;

    let marker = if synthetic { "(synthetic)" } else { "" };
    match sequence {
        Some(seq) if settings.verbose => Ok(format!(
            "{}({}) event{} seq={}: {}",
            name, code, marker, seq, body
        )),
        Some(seq) => Ok(format!("{} event{} seq={}: {}", name, marker, seq, body)),
        None if settings.verbose => Ok(format!("{}({}) event{}: {}", name, code, marker, body)),
        None => Ok(format!("{} event{}: {}", name, marker, body)),
    }
}

/// Render the 32-byte event embedded in a SendEvent request as a nested
/// record.
pub fn render_embedded(
    settings: &Settings,
    conn: &Connection,
    data: &[u8],
    ws: Whitespace,
) -> Result<String> {
    let synthetic = data[0] & opcodes::event::SEND_EVENT_FLAG != 0;
    let code = data[0] & !opcodes::event::SEND_EVENT_FLAG;
    let (name, _, body) = build_event(settings, conn, code, data, ws)?;
    if synthetic {
        Ok(format!("{}(synthetic) {}", name, body))
    } else {
        Ok(format!("{} {}", name, body))
    }
}

/// Parse the event body; returns the name, the wire sequence (absent for
/// KeymapNotify), and the rendered record.
fn build_event(
    settings: &Settings,
    conn: &Connection,
    code: u8,
    data: &[u8],
    ws: Whitespace,
) -> Result<(&'static str, Option<u16>, String)> {
    use opcodes::event;

    let mut r = WireReader::new(data, conn.byte_order);
    r.skip(1)?; // code byte

    // KeymapNotify: 31 key bytes immediately after the code, no sequence
    if code == event::KEYMAP_NOTIFY {
        let mut rec = Record::new(settings, ws);
        rec.field(
            "keys",
            super::lists::card8_list(&mut r, 31, ws)?,
        );
        return Ok(("KeymapNotify", None, rec.finish()));
    }

    let detail_byte = r.card8()?;
    let sequence = r.card16()?;
    let mut rec = Record::new(settings, ws);

    let name: &'static str = match code {
        event::KEY_PRESS
        | event::KEY_RELEASE
        | event::BUTTON_PRESS
        | event::BUTTON_RELEASE
        | event::MOTION_NOTIFY => {
            match code {
                event::MOTION_NOTIFY => rec.field(
                    "detail",
                    format::format_enum(settings, detail_byte, 1, enum_names::MOTION_HINT),
                ),
                event::BUTTON_PRESS | event::BUTTON_RELEASE => {
                    rec.field("detail", format::format_card(detail_byte))
                }
                _ => rec.field("detail", format::format_card(detail_byte)),
            };
            rec.field("time", format::format_timestamp(settings, r.card32()?));
            rec.field("root", format::format_resource(settings, r.card32()?, &[]));
            rec.field("event", format::format_resource(settings, r.card32()?, &[]));
            rec.field(
                "child",
                format::format_resource(settings, r.card32()?, enum_names::ZERO_NONE),
            );
            rec.field("root-x", format::format_int(r.int16()?));
            rec.field("root-y", format::format_int(r.int16()?));
            rec.field("event-x", format::format_int(r.int16()?));
            rec.field("event-y", format::format_int(r.int16()?));
            let state = r.card16()?;
            types::SetOfKeyButMask::from_bits(state).ok_or_else(|| {
                Error::Protocol(format!("SETofKEYBUTMASK {:#06x} sets reserved bits", state))
            })?;
            rec.field(
                "state",
                format::format_bitmask(settings, state, 2, enum_names::SET_OF_KEYBUTMASK),
            );
            rec.field("same-screen", format::format_bool(settings, r.card8()?));
            match code {
                event::KEY_PRESS => "KeyPress",
                event::KEY_RELEASE => "KeyRelease",
                event::BUTTON_PRESS => "ButtonPress",
                event::BUTTON_RELEASE => "ButtonRelease",
                _ => "MotionNotify",
            }
        }
        event::ENTER_NOTIFY | event::LEAVE_NOTIFY => {
            rec.field(
                "detail",
                format::format_enum(settings, detail_byte, 1, enum_names::FOCUS_DETAIL),
            );
            rec.field("time", format::format_timestamp(settings, r.card32()?));
            rec.field("root", format::format_resource(settings, r.card32()?, &[]));
            rec.field("event", format::format_resource(settings, r.card32()?, &[]));
            rec.field(
                "child",
                format::format_resource(settings, r.card32()?, enum_names::ZERO_NONE),
            );
            rec.field("root-x", format::format_int(r.int16()?));
            rec.field("root-y", format::format_int(r.int16()?));
            rec.field("event-x", format::format_int(r.int16()?));
            rec.field("event-y", format::format_int(r.int16()?));
            let state = r.card16()?;
            rec.field(
                "state",
                format::format_bitmask(settings, state, 2, enum_names::SET_OF_KEYBUTMASK),
            );
            rec.field(
                "mode",
                format::format_enum(settings, r.card8()?, 1, enum_names::FOCUS_MODE),
            );
            rec.field(
                "same-screen/focus",
                format::format_bitmask(settings, r.card8()?, 1, enum_names::FOCUS_SAME_SCREEN_MASK),
            );
            if code == event::ENTER_NOTIFY {
                "EnterNotify"
            } else {
                "LeaveNotify"
            }
        }
        event::FOCUS_IN | event::FOCUS_OUT => {
            rec.field(
                "detail",
                format::format_enum(settings, detail_byte, 1, enum_names::FOCUS_DETAIL),
            );
            rec.field("event", format::format_resource(settings, r.card32()?, &[]));
            rec.field(
                "mode",
                format::format_enum(settings, r.card8()?, 1, enum_names::FOCUS_MODE),
            );
            if code == event::FOCUS_IN {
                "FocusIn"
            } else {
                "FocusOut"
            }
        }
        event::EXPOSE => {
            rec.field("window", format::format_resource(settings, r.card32()?, &[]));
            rec.field("x", format::format_card(r.card16()?));
            rec.field("y", format::format_card(r.card16()?));
            rec.field("width", format::format_card(r.card16()?));
            rec.field("height", format::format_card(r.card16()?));
            rec.field("count", format::format_card(r.card16()?));
            "Expose"
        }
        event::GRAPHICS_EXPOSURE => {
            rec.field("drawable", format::format_resource(settings, r.card32()?, &[]));
            rec.field("x", format::format_card(r.card16()?));
            rec.field("y", format::format_card(r.card16()?));
            rec.field("width", format::format_card(r.card16()?));
            rec.field("height", format::format_card(r.card16()?));
            rec.field("minor-opcode", format::format_card(r.card16()?));
            rec.field("count", format::format_card(r.card16()?));
            let major = r.card8()?;
            rec.field(
                "major-opcode",
                format!("{}({})", opcodes::request_name(major), major),
            );
            "GraphicsExposure"
        }
        event::NO_EXPOSURE => {
            rec.field("drawable", format::format_resource(settings, r.card32()?, &[]));
            rec.field("minor-opcode", format::format_card(r.card16()?));
            let major = r.card8()?;
            rec.field(
                "major-opcode",
                format!("{}({})", opcodes::request_name(major), major),
            );
            "NoExposure"
        }
        event::VISIBILITY_NOTIFY => {
            rec.field("window", format::format_resource(settings, r.card32()?, &[]));
            rec.field(
                "state",
                format::format_enum(settings, r.card8()?, 1, enum_names::VISIBILITY_STATE),
            );
            "VisibilityNotify"
        }
        event::CREATE_NOTIFY => {
            rec.field("parent", format::format_resource(settings, r.card32()?, &[]));
            rec.field("window", format::format_resource(settings, r.card32()?, &[]));
            rec.field("x", format::format_int(r.int16()?));
            rec.field("y", format::format_int(r.int16()?));
            rec.field("width", format::format_card(r.card16()?));
            rec.field("height", format::format_card(r.card16()?));
            rec.field("border-width", format::format_card(r.card16()?));
            rec.field("override-redirect", format::format_bool(settings, r.card8()?));
            "CreateNotify"
        }
        event::DESTROY_NOTIFY => {
            rec.field("event", format::format_resource(settings, r.card32()?, &[]));
            rec.field("window", format::format_resource(settings, r.card32()?, &[]));
            "DestroyNotify"
        }
        event::UNMAP_NOTIFY => {
            rec.field("event", format::format_resource(settings, r.card32()?, &[]));
            rec.field("window", format::format_resource(settings, r.card32()?, &[]));
            rec.field("from-configure", format::format_bool(settings, r.card8()?));
            "UnmapNotify"
        }
        event::MAP_NOTIFY => {
            rec.field("event", format::format_resource(settings, r.card32()?, &[]));
            rec.field("window", format::format_resource(settings, r.card32()?, &[]));
            rec.field("override-redirect", format::format_bool(settings, r.card8()?));
            "MapNotify"
        }
        event::MAP_REQUEST => {
            rec.field("parent", format::format_resource(settings, r.card32()?, &[]));
            rec.field("window", format::format_resource(settings, r.card32()?, &[]));
            "MapRequest"
        }
        event::REPARENT_NOTIFY => {
            rec.field("event", format::format_resource(settings, r.card32()?, &[]));
            rec.field("window", format::format_resource(settings, r.card32()?, &[]));
            rec.field("parent", format::format_resource(settings, r.card32()?, &[]));
            rec.field("x", format::format_int(r.int16()?));
            rec.field("y", format::format_int(r.int16()?));
            rec.field("override-redirect", format::format_bool(settings, r.card8()?));
            "ReparentNotify"
        }
        event::CONFIGURE_NOTIFY => {
            rec.field("event", format::format_resource(settings, r.card32()?, &[]));
            rec.field("window", format::format_resource(settings, r.card32()?, &[]));
            rec.field(
                "above-sibling",
                format::format_resource(settings, r.card32()?, enum_names::ZERO_NONE),
            );
            rec.field("x", format::format_int(r.int16()?));
            rec.field("y", format::format_int(r.int16()?));
            rec.field("width", format::format_card(r.card16()?));
            rec.field("height", format::format_card(r.card16()?));
            rec.field("border-width", format::format_card(r.card16()?));
            rec.field("override-redirect", format::format_bool(settings, r.card8()?));
            "ConfigureNotify"
        }
        event::CONFIGURE_REQUEST => {
            rec.field(
                "stack-mode",
                format::format_enum(settings, detail_byte, 1, enum_names::WINDOW_VALUE_STACK_MODE),
            );
            rec.field("parent", format::format_resource(settings, r.card32()?, &[]));
            rec.field("window", format::format_resource(settings, r.card32()?, &[]));
            rec.field(
                "sibling",
                format::format_resource(settings, r.card32()?, enum_names::ZERO_NONE),
            );
            rec.field("x", format::format_int(r.int16()?));
            rec.field("y", format::format_int(r.int16()?));
            rec.field("width", format::format_card(r.card16()?));
            rec.field("height", format::format_card(r.card16()?));
            rec.field("border-width", format::format_card(r.card16()?));
            // all 32 bytes are present; the mask says which carry meaning
            rec.field(
                "value-mask",
                format::format_bitmask(settings, r.card16()?, 2, enum_names::WINDOW_VALUE_MASK),
            );
            "ConfigureRequest"
        }
        event::GRAVITY_NOTIFY => {
            rec.field("event", format::format_resource(settings, r.card32()?, &[]));
            rec.field("window", format::format_resource(settings, r.card32()?, &[]));
            rec.field("x", format::format_int(r.int16()?));
            rec.field("y", format::format_int(r.int16()?));
            "GravityNotify"
        }
        event::RESIZE_REQUEST => {
            rec.field("window", format::format_resource(settings, r.card32()?, &[]));
            rec.field("width", format::format_card(r.card16()?));
            rec.field("height", format::format_card(r.card16()?));
            "ResizeRequest"
        }
        event::CIRCULATE_NOTIFY | event::CIRCULATE_REQUEST => {
            let outer = if code == event::CIRCULATE_NOTIFY {
                "event"
            } else {
                "parent"
            };
            rec.field(outer, format::format_resource(settings, r.card32()?, &[]));
            rec.field("window", format::format_resource(settings, r.card32()?, &[]));
            r.skip(4)?;
            rec.field(
                "place",
                format::format_enum(settings, r.card8()?, 1, enum_names::CIRCULATE_PLACE),
            );
            if code == event::CIRCULATE_NOTIFY {
                "CirculateNotify"
            } else {
                "CirculateRequest"
            }
        }
        event::PROPERTY_NOTIFY => {
            rec.field("window", format::format_resource(settings, r.card32()?, &[]));
            rec.field(
                "atom",
                format::format_atom(settings, conn.interned_atoms(), r.card32()?, &[]),
            );
            rec.field("time", format::format_timestamp(settings, r.card32()?));
            rec.field(
                "state",
                format::format_enum(settings, r.card8()?, 1, enum_names::PROPERTY_STATE),
            );
            "PropertyNotify"
        }
        event::SELECTION_CLEAR => {
            rec.field("time", format::format_timestamp(settings, r.card32()?));
            rec.field("owner", format::format_resource(settings, r.card32()?, &[]));
            rec.field(
                "selection",
                format::format_atom(settings, conn.interned_atoms(), r.card32()?, &[]),
            );
            "SelectionClear"
        }
        event::SELECTION_REQUEST | event::SELECTION_NOTIFY => {
            rec.field("time", format::format_timestamp(settings, r.card32()?));
            if code == event::SELECTION_REQUEST {
                rec.field("owner", format::format_resource(settings, r.card32()?, &[]));
            }
            rec.field("requestor", format::format_resource(settings, r.card32()?, &[]));
            rec.field(
                "selection",
                format::format_atom(settings, conn.interned_atoms(), r.card32()?, &[]),
            );
            rec.field(
                "target",
                format::format_atom(settings, conn.interned_atoms(), r.card32()?, &[]),
            );
            rec.field(
                "property",
                format::format_atom(
                    settings,
                    conn.interned_atoms(),
                    r.card32()?,
                    enum_names::ZERO_NONE,
                ),
            );
            if code == event::SELECTION_REQUEST {
                "SelectionRequest"
            } else {
                "SelectionNotify"
            }
        }
        event::COLORMAP_NOTIFY => {
            rec.field("window", format::format_resource(settings, r.card32()?, &[]));
            rec.field(
                "colormap",
                format::format_resource(settings, r.card32()?, enum_names::ZERO_NONE),
            );
            rec.field("new", format::format_bool(settings, r.card8()?));
            rec.field(
                "state",
                format::format_enum(settings, r.card8()?, 1, enum_names::COLORMAP_STATE),
            );
            "ColormapNotify"
        }
        event::CLIENT_MESSAGE => {
            rec.field("format", format::format_card(detail_byte));
            rec.field("window", format::format_resource(settings, r.card32()?, &[]));
            rec.field(
                "type",
                format::format_atom(settings, conn.interned_atoms(), r.card32()?, &[]),
            );
            let rendered = match detail_byte {
                8 => super::lists::card8_list(&mut r, 20, ws)?,
                16 => {
                    let mut items = Vec::with_capacity(10);
                    for _ in 0..10 {
                        items.push(r.card16()?.to_string());
                    }
                    format::format_list(&items, ws.single_line())
                }
                32 => super::lists::card32_list(&mut r, 5, ws)?,
                other => {
                    return Err(Error::Protocol(format!(
                        "ClientMessage format {} is not 8/16/32",
                        other
                    )))
                }
            };
            rec.field("data", rendered);
            "ClientMessage"
        }
        event::MAPPING_NOTIFY => {
            rec.field(
                "request",
                format::format_enum(settings, r.card8()?, 1, enum_names::MAPPING_STATE),
            );
            rec.field("first-keycode", format::format_card(r.card8()?));
            rec.field("count", format::format_card(r.card8()?));
            "MappingNotify"
        }
        other if other > event::MAX => {
            // extension events are framed and forwarded, bodies opaque
            rec.field("code", format::format_card(other));
            let body_len = r.remaining();
            r.skip(body_len)?;
            "(extension event)"
        }
        other => {
            return Err(Error::Protocol(format!(
                "unknown core event code {}",
                other
            )))
        }
    };

    Ok((name, Some(sequence), rec.finish()))
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

    fn expose_event(seq: u16) -> [u8; 32] {
        let mut data = [0u8; 32];
        data[0] = opcodes::event::EXPOSE;
        data[2..4].copy_from_slice(&seq.to_le_bytes());
        data[4..8].copy_from_slice(&0x0060_0005u32.to_le_bytes()); // window
        data[8..10].copy_from_slice(&1u16.to_le_bytes()); // x
        data[10..12].copy_from_slice(&2u16.to_le_bytes()); // y
        data[12..14].copy_from_slice(&640u16.to_le_bytes());
        data[14..16].copy_from_slice(&480u16.to_le_bytes());
        data
    }

    #[test]
    fn test_expose_event() {
        let text = decode_event(&settings(), &connection(), &expose_event(5)).unwrap();
        assert!(text.starts_with("Expose event seq=5:"));
        assert!(text.contains("window=0x00600005"));
        assert!(text.contains("width=640"));
        assert!(text.contains("height=480"));
    }

    #[test]
    fn test_send_event_flag() {
        let mut data = expose_event(5);
        data[0] |= opcodes::event::SEND_EVENT_FLAG;
        let text = decode_event(&settings(), &connection(), &data).unwrap();
        assert!(text.starts_with("Expose event(synthetic) seq=5:"));
    }

    #[test]
    fn test_keymap_notify_has_no_sequence() {
        let mut data = [0u8; 32];
        data[0] = opcodes::event::KEYMAP_NOTIFY;
        data[1] = 0xFF;
        let text = decode_event(&settings(), &connection(), &data).unwrap();
        assert!(text.starts_with("KeymapNotify event:"));
        assert!(!text.contains("seq="));
        assert!(text.contains("255"));
    }

    #[test]
    fn test_key_press_event() {
        let mut data = [0u8; 32];
        data[0] = opcodes::event::KEY_PRESS;
        data[1] = 38; // keycode
        data[2..4].copy_from_slice(&9u16.to_le_bytes());
        data[4..8].copy_from_slice(&0x00AB_CDEFu32.to_le_bytes()); // time
        data[8..12].copy_from_slice(&0x0000_0250u32.to_le_bytes()); // root
        data[12..16].copy_from_slice(&0x0060_0005u32.to_le_bytes()); // event
        data[16..20].copy_from_slice(&0u32.to_le_bytes()); // child None
        data[28..30].copy_from_slice(&0x0001u16.to_le_bytes()); // Shift
        data[30] = 1; // same-screen
        let text = decode_event(&settings(), &connection(), &data).unwrap();
        assert!(text.starts_with("KeyPress event seq=9:"));
        assert!(text.contains("detail=38"));
        assert!(text.contains("child=None"));
        assert!(text.contains("state=Shift"));
        assert!(text.contains("same-screen=True"));
    }

    #[test]
    fn test_configure_request_value_mask() {
        let mut data = [0u8; 32];
        data[0] = opcodes::event::CONFIGURE_REQUEST;
        data[1] = 0; // stack-mode Above
        data[2..4].copy_from_slice(&3u16.to_le_bytes());
        data[4..8].copy_from_slice(&0x0000_0250u32.to_le_bytes()); // parent
        data[8..12].copy_from_slice(&0x0060_0005u32.to_le_bytes()); // window
        data[26..28].copy_from_slice(&0x000Cu16.to_le_bytes()); // width|height
        let text = decode_event(&settings(), &connection(), &data).unwrap();
        assert!(text.contains("stack-mode=Above"));
        assert!(text.contains("value-mask=width|height"));
    }

    #[test]
    fn test_reserved_keybutmask_bits_rejected() {
        let mut data = [0u8; 32];
        data[0] = opcodes::event::KEY_PRESS;
        data[28..30].copy_from_slice(&0xE000u16.to_le_bytes());
        assert!(decode_event(&settings(), &connection(), &data).is_err());
    }

    #[test]
    fn test_embedded_rendering() {
        let text =
            render_embedded(&settings(), &connection(), &expose_event(0), Whitespace::root(false))
                .unwrap();
        assert!(text.starts_with("Expose {"));
    }

    #[test]
    fn test_wrong_size_rejected() {
        let data = [opcodes::event::EXPOSE; 16];
        assert!(decode_event(&settings(), &connection(), &data).is_err());
    }
}
