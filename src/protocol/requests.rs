//! Client-to-server request decoding.
//!
//! Every request starts with the 4-byte generic header `{opcode, data byte,
//! length}` where the length counts 4-byte units including the header. When
//! BIG-REQUESTS is active a zero length defers to a following 32-bit length
//! field. The decoder registers each request against the connection's shadow
//! sequence counter before reading the body, so replies and errors can be
//! demultiplexed later.

use crate::core::config::Settings;
use crate::protocol::{enum_names, lists, opcodes, types, WireReader, ALIGN};
use crate::proxy::connection::Connection;
use crate::proxy::extensions::ExtensionId;
use crate::trace::format::{self, Record, Whitespace};
use crate::{Error, Result};

/// Size of the generic request header.
pub const GENERIC_HEADER_SZ: usize = 4;
/// Header size once the BIG-REQUESTS 32-bit length is present.
pub const BIG_HEADER_SZ: usize = 8;

/// Total size of the next request once enough header bytes are visible;
/// `None` until the (possibly extended) header has arrived.
pub fn measure_request(
    data: &[u8],
    byte_order: types::ByteOrder,
    big_requests_active: bool,
) -> Result<Option<usize>> {
    if data.len() < GENERIC_HEADER_SZ {
        return Ok(None);
    }
    let mut r = WireReader::new(data, byte_order);
    r.skip(2)?;
    let length = r.card16()? as usize;
    if length != 0 {
        return Ok(Some(length * ALIGN));
    }
    if !big_requests_active {
        return Err(Error::Protocol(
            "request length 0 without BIG-REQUESTS active".into(),
        ));
    }
    if data.len() < BIG_HEADER_SZ {
        return Ok(None);
    }
    let big_length = r.card32()? as usize;
    if big_length * ALIGN < BIG_HEADER_SZ {
        return Err(Error::Protocol(format!(
            "BIG-REQUESTS length {} shorter than its own header",
            big_length
        )));
    }
    Ok(Some(big_length * ALIGN))
}

struct RequestHeader {
    opcode: u8,
    data_byte: u8,
    /// Length in 4-byte units as carried on the wire (16- or 32-bit field)
    wire_length: u64,
    header_sz: usize,
    total_sz: usize,
}

fn parse_header(
    data: &[u8],
    byte_order: types::ByteOrder,
    big_requests_active: bool,
) -> Result<RequestHeader> {
    let mut r = WireReader::new(data, byte_order);
    let opcode = r.card8()?;
    let data_byte = r.card8()?;
    let length = r.card16()? as usize;
    if length != 0 {
        return Ok(RequestHeader {
            opcode,
            data_byte,
            wire_length: length as u64,
            header_sz: GENERIC_HEADER_SZ,
            total_sz: length * ALIGN,
        });
    }
    if !big_requests_active {
        return Err(Error::Protocol(
            "request length 0 without BIG-REQUESTS active".into(),
        ));
    }
    let big_length = r.card32()? as usize;
    Ok(RequestHeader {
        opcode,
        data_byte,
        wire_length: big_length as u64,
        header_sz: BIG_HEADER_SZ,
        total_sz: big_length * ALIGN,
    })
}

/// Decode one complete request, registering it against the connection.
/// Returns the rendered trace text (everything after the line prefix).
pub fn decode_request(settings: &Settings, conn: &mut Connection, data: &[u8]) -> Result<String> {
    let header = parse_header(data, conn.byte_order, conn.extensions.big_requests)?;
    if data.len() != header.total_sz {
        return Err(Error::Protocol(format!(
            "request framed as {} bytes but {} supplied",
            header.total_sz,
            data.len()
        )));
    }

    conn.register_request(header.opcode)?;
    let sequence = conn.sequence;

    // the BIG-REQUESTS enable request flips framing for everything after it
    if conn.big_requests_opcode == Some(header.opcode) {
        conn.extensions.activate(ExtensionId::BigRequests);
    }

    let mut r = WireReader::new(data, conn.byte_order);
    r.skip(header.header_sz)?;

    let ws = Whitespace::root(settings.multiline);
    let mut rec = Record::new(settings, ws);
    rec.verbose_field("request length", format::format_card(header.wire_length));

    let name = decode_body(settings, conn, &header, &mut r, &mut rec)?;

    // anything beyond alignment slop is a length-field mismatch
    if r.remaining() >= ALIGN {
        return Err(Error::Protocol(format!(
            "{} left {} bytes undecoded",
            name,
            r.remaining()
        )));
    }

    let body = rec.finish();
    if settings.verbose {
        Ok(format!(
            "{}({}) seq={}: {}",
            name, header.opcode, sequence, body
        ))
    } else {
        Ok(format!("{} seq={}: {}", name, sequence, body))
    }
}

/// One VALUE slot's semantic type in a BITMASK/VALUE-LIST pair.
enum ValueKind {
    Card,
    Int,
    Hex,
    Bool,
    Enum(&'static [&'static str]),
    Resource(&'static [&'static str]),
    EventMask,
    DeviceEventMask,
}

type ValueTable = &'static [(&'static str, ValueKind)];

static WINDOW_ATTRIBUTE_VALUES: ValueTable = &[
    ("background-pixmap", ValueKind::Resource(enum_names::WINDOW_ATTRIBUTE_BACKGROUND_PIXMAP)),
    ("background-pixel", ValueKind::Hex),
    ("border-pixmap", ValueKind::Resource(enum_names::ZERO_COPY_FROM_PARENT)),
    ("border-pixel", ValueKind::Hex),
    ("bit-gravity", ValueKind::Enum(enum_names::BITGRAVITY)),
    ("win-gravity", ValueKind::Enum(enum_names::WINGRAVITY)),
    ("backing-store", ValueKind::Enum(enum_names::WINDOW_ATTRIBUTE_BACKING_STORE)),
    ("backing-planes", ValueKind::Hex),
    ("backing-pixel", ValueKind::Hex),
    ("override-redirect", ValueKind::Bool),
    ("save-under", ValueKind::Bool),
    ("event-mask", ValueKind::EventMask),
    ("do-not-propagate-mask", ValueKind::DeviceEventMask),
    ("colormap", ValueKind::Resource(enum_names::ZERO_COPY_FROM_PARENT)),
    ("cursor", ValueKind::Resource(enum_names::ZERO_NONE)),
];

static CONFIGURE_WINDOW_VALUES: ValueTable = &[
    ("x", ValueKind::Int),
    ("y", ValueKind::Int),
    ("width", ValueKind::Card),
    ("height", ValueKind::Card),
    ("border-width", ValueKind::Card),
    ("sibling", ValueKind::Resource(&[])),
    ("stack-mode", ValueKind::Enum(enum_names::WINDOW_VALUE_STACK_MODE)),
];

static GC_VALUES: ValueTable = &[
    ("function", ValueKind::Enum(enum_names::GC_VALUE_FUNCTION)),
    ("plane-mask", ValueKind::Hex),
    ("foreground", ValueKind::Hex),
    ("background", ValueKind::Hex),
    ("line-width", ValueKind::Card),
    ("line-style", ValueKind::Enum(enum_names::GC_VALUE_LINE_STYLE)),
    ("cap-style", ValueKind::Enum(enum_names::GC_VALUE_CAP_STYLE)),
    ("join-style", ValueKind::Enum(enum_names::GC_VALUE_JOIN_STYLE)),
    ("fill-style", ValueKind::Enum(enum_names::GC_VALUE_FILL_STYLE)),
    ("fill-rule", ValueKind::Enum(enum_names::GC_VALUE_FILL_RULE)),
    ("tile", ValueKind::Resource(&[])),
    ("stipple", ValueKind::Resource(&[])),
    ("tile-stipple-x-origin", ValueKind::Int),
    ("tile-stipple-y-origin", ValueKind::Int),
    ("font", ValueKind::Resource(&[])),
    ("subwindow-mode", ValueKind::Enum(enum_names::GC_VALUE_SUBWINDOW_MODE)),
    ("graphics-exposures", ValueKind::Bool),
    ("clip-x-origin", ValueKind::Int),
    ("clip-y-origin", ValueKind::Int),
    ("clip-mask", ValueKind::Resource(enum_names::ZERO_NONE)),
    ("dash-offset", ValueKind::Card),
    ("dashes", ValueKind::Card),
    ("arc-mode", ValueKind::Enum(enum_names::GC_VALUE_ARC_MODE)),
];

static KEYBOARD_CONTROL_VALUES: ValueTable = &[
    ("key-click-percent", ValueKind::Int),
    ("bell-percent", ValueKind::Int),
    ("bell-pitch", ValueKind::Int),
    ("bell-duration", ValueKind::Int),
    ("led", ValueKind::Card),
    ("led-mode", ValueKind::Enum(enum_names::OFF_ON)),
    ("key", ValueKind::Card),
    ("auto-repeat-mode", ValueKind::Enum(enum_names::OFF_ON)),
];

/// Walk the enabled bits of `mask` LSB-first, consuming one 4-byte slot per
/// set bit and rendering it with the per-bit binding.
fn parse_value_list(
    settings: &Settings,
    r: &mut WireReader<'_>,
    mask: u32,
    table: ValueTable,
    rec: &mut Record<'_>,
) -> Result<()> {
    if (mask as u64) >> table.len() != 0 {
        return Err(Error::Protocol(format!(
            "value-mask {:#010x} sets bits past the defined range",
            mask
        )));
    }
    for (i, (name, kind)) in table.iter().enumerate() {
        if mask & (1 << i) == 0 {
            continue;
        }
        let slot = r.card32()?;
        let rendered = match kind {
            ValueKind::Card => format::format_card(slot),
            ValueKind::Int => format::format_int(slot as i32),
            ValueKind::Hex => format::format_hex(slot, 4),
            ValueKind::Bool => format::format_bool(settings, slot as u8),
            ValueKind::Enum(names) => format::format_enum(settings, slot, 1, names),
            ValueKind::Resource(names) => format::format_resource(settings, slot, names),
            ValueKind::EventMask => {
                types::SetOfEvent::from_bits(slot).ok_or_else(|| {
                    Error::Protocol(format!("SETofEVENT {:#010x} sets reserved bits", slot))
                })?;
                format::format_bitmask(settings, slot, 4, enum_names::SET_OF_EVENT)
            }
            ValueKind::DeviceEventMask => {
                types::SetOfDeviceEvent::from_bits(slot).ok_or_else(|| {
                    Error::Protocol(format!("SETofDEVICEEVENT {:#010x} sets reserved bits", slot))
                })?;
                format::format_bitmask(settings, slot, 4, enum_names::SET_OF_EVENT)
            }
        };
        rec.field(name, rendered);
    }
    Ok(())
}

fn check_atom(value: u32) -> Result<u32> {
    if value & types::ID_ZERO_BITS != 0 {
        return Err(Error::Protocol(format!(
            "ATOM {:#010x} sets its top three bits",
            value
        )));
    }
    Ok(value)
}

fn read_pointer_event_mask(settings: &Settings, r: &mut WireReader<'_>) -> Result<String> {
    let mask = r.card16()?;
    types::SetOfPointerEvent::from_bits(mask as u32).ok_or_else(|| {
        Error::Protocol(format!("SETofPOINTEREVENT {:#06x} sets reserved bits", mask))
    })?;
    Ok(format::format_bitmask(settings, mask, 2, enum_names::SET_OF_EVENT))
}

fn read_event_mask(settings: &Settings, r: &mut WireReader<'_>) -> Result<String> {
    let mask = r.card32()?;
    types::SetOfEvent::from_bits(mask)
        .ok_or_else(|| Error::Protocol(format!("SETofEVENT {:#010x} sets reserved bits", mask)))?;
    Ok(format::format_bitmask(settings, mask, 4, enum_names::SET_OF_EVENT))
}

fn read_keymask(settings: &Settings, r: &mut WireReader<'_>) -> Result<String> {
    let mask = r.card16()?;
    if mask != types::ANY_MODIFIER && types::SetOfKeyMask::from_bits(mask).is_none() {
        return Err(Error::Protocol(format!(
            "SETofKEYMASK {:#06x} sets reserved bits",
            mask
        )));
    }
    Ok(format::format_keymask(settings, mask))
}

/// Dispatch on the major opcode; returns the request name for the trace
/// line. Arms follow the protocol's field order exactly.
fn decode_body(
    settings: &Settings,
    conn: &mut Connection,
    header: &RequestHeader,
    r: &mut WireReader<'_>,
    rec: &mut Record<'_>,
) -> Result<&'static str> {
    use opcodes::{atom, colormap, cursor, graphics, input, pixmap, server, text, window};

    let opcode = header.opcode;
    let data_byte = header.data_byte;
    let ws = rec.ws();

    // extension requests are framed and forwarded but their bodies stay
    // opaque; the BIG-REQUESTS enable request is the one we know by name
    if opcode >= opcodes::EXTENSION_MIN {
        let body_len = r.remaining();
        r.skip(body_len)?;
        rec.field("major-opcode", format::format_card(opcode));
        rec.field("minor-opcode", format::format_card(data_byte));
        rec.field("body", format!("({} bytes)", body_len));
        if conn.big_requests_opcode == Some(opcode) {
            return Ok("BigReqEnable");
        }
        return Ok("(extension request)");
    }

    let name = match opcode {
        window::CREATE_WINDOW => {
            rec.field("depth", format::format_card(data_byte));
            rec.field("wid", format::format_resource(settings, r.card32()?, &[]));
            rec.field("parent", format::format_resource(settings, r.card32()?, &[]));
            rec.field("x", format::format_int(r.int16()?));
            rec.field("y", format::format_int(r.int16()?));
            rec.field("width", format::format_card(r.card16()?));
            rec.field("height", format::format_card(r.card16()?));
            rec.field("border-width", format::format_card(r.card16()?));
            rec.field(
                "class",
                format::format_enum(settings, r.card16()?, 2, enum_names::WINDOW_CLASS),
            );
            rec.field(
                "visual",
                format::format_resource(settings, r.card32()?, enum_names::ZERO_COPY_FROM_PARENT),
            );
            let mask = r.card32()?;
            rec.verbose_field(
                "value-mask",
                format::format_bitmask(settings, mask, 4, enum_names::WINDOW_ATTRIBUTE_VALUE_MASK),
            );
            parse_value_list(settings, r, mask, WINDOW_ATTRIBUTE_VALUES, rec)?;
            "CreateWindow"
        }
        window::CHANGE_WINDOW_ATTRIBUTES => {
            rec.field("window", format::format_resource(settings, r.card32()?, &[]));
            let mask = r.card32()?;
            rec.verbose_field(
                "value-mask",
                format::format_bitmask(settings, mask, 4, enum_names::WINDOW_ATTRIBUTE_VALUE_MASK),
            );
            parse_value_list(settings, r, mask, WINDOW_ATTRIBUTE_VALUES, rec)?;
            "ChangeWindowAttributes"
        }
        window::GET_WINDOW_ATTRIBUTES => {
            rec.field("window", format::format_resource(settings, r.card32()?, &[]));
            "GetWindowAttributes"
        }
        window::DESTROY_WINDOW => {
            rec.field("window", format::format_resource(settings, r.card32()?, &[]));
            "DestroyWindow"
        }
        window::DESTROY_SUBWINDOWS => {
            rec.field("window", format::format_resource(settings, r.card32()?, &[]));
            "DestroySubwindows"
        }
        window::CHANGE_SAVE_SET => {
            rec.field(
                "mode",
                format::format_enum(settings, data_byte, 1, enum_names::INSERT_DELETE_MODE),
            );
            rec.field("window", format::format_resource(settings, r.card32()?, &[]));
            "ChangeSaveSet"
        }
        window::REPARENT_WINDOW => {
            rec.field("window", format::format_resource(settings, r.card32()?, &[]));
            rec.field("parent", format::format_resource(settings, r.card32()?, &[]));
            rec.field("x", format::format_int(r.int16()?));
            rec.field("y", format::format_int(r.int16()?));
            "ReparentWindow"
        }
        window::MAP_WINDOW => {
            rec.field("window", format::format_resource(settings, r.card32()?, &[]));
            "MapWindow"
        }
        window::MAP_SUBWINDOWS => {
            rec.field("window", format::format_resource(settings, r.card32()?, &[]));
            "MapSubwindows"
        }
        window::UNMAP_WINDOW => {
            rec.field("window", format::format_resource(settings, r.card32()?, &[]));
            "UnmapWindow"
        }
        window::UNMAP_SUBWINDOWS => {
            rec.field("window", format::format_resource(settings, r.card32()?, &[]));
            "UnmapSubwindows"
        }
        window::CONFIGURE_WINDOW => {
            rec.field("window", format::format_resource(settings, r.card32()?, &[]));
            let mask = r.card16()? as u32;
            r.skip(2)?;
            rec.verbose_field(
                "value-mask",
                format::format_bitmask(settings, mask, 2, enum_names::WINDOW_VALUE_MASK),
            );
            parse_value_list(settings, r, mask, CONFIGURE_WINDOW_VALUES, rec)?;
            "ConfigureWindow"
        }
        window::CIRCULATE_WINDOW => {
            rec.field(
                "direction",
                format::format_enum(settings, data_byte, 1, enum_names::CIRCULATE_DIRECTION),
            );
            rec.field("window", format::format_resource(settings, r.card32()?, &[]));
            "CirculateWindow"
        }
        window::GET_GEOMETRY => {
            rec.field("drawable", format::format_resource(settings, r.card32()?, &[]));
            "GetGeometry"
        }
        window::QUERY_TREE => {
            rec.field("window", format::format_resource(settings, r.card32()?, &[]));
            "QueryTree"
        }

        atom::INTERN_ATOM => {
            rec.field("only-if-exists", format::format_bool(settings, data_byte));
            let name_len = r.card16()? as usize;
            r.skip(2)?;
            let name = r.string8(name_len)?;
            r.skip_pad(name_len)?;
            rec.verbose_field("n", format::format_card(name_len as u64));
            rec.field("name", format!("{:?}", name));
            conn.stash_intern_atom(conn.sequence, name);
            "InternAtom"
        }
        atom::GET_ATOM_NAME => {
            let id = check_atom(r.card32()?)?;
            rec.field(
                "atom",
                format::format_atom(settings, conn.interned_atoms(), id, &[]),
            );
            "GetAtomName"
        }
        atom::CHANGE_PROPERTY => {
            rec.field(
                "mode",
                format::format_enum(settings, data_byte, 1, enum_names::CHANGE_PROPERTY_MODE),
            );
            rec.field("window", format::format_resource(settings, r.card32()?, &[]));
            let property = check_atom(r.card32()?)?;
            rec.field(
                "property",
                format::format_atom(settings, conn.interned_atoms(), property, &[]),
            );
            let type_ = check_atom(r.card32()?)?;
            rec.field(
                "type",
                format::format_atom(settings, conn.interned_atoms(), type_, &[]),
            );
            let fmt = r.card8()?;
            rec.field("format", format::format_card(fmt));
            r.skip(3)?;
            let unit_ct = r.card32()? as usize;
            rec.verbose_field("length of data in format units", format::format_card(unit_ct as u64));
            let byte_len = match fmt {
                0 => 0,
                8 => unit_ct,
                16 => unit_ct * 2,
                32 => unit_ct * 4,
                other => {
                    return Err(Error::Protocol(format!(
                        "ChangeProperty format {} is not 8/16/32",
                        other
                    )))
                }
            };
            rec.field("data", render_property_data(settings, r, fmt, byte_len, ws)?);
            r.skip_pad(byte_len)?;
            "ChangeProperty"
        }
        atom::DELETE_PROPERTY => {
            rec.field("window", format::format_resource(settings, r.card32()?, &[]));
            let property = check_atom(r.card32()?)?;
            rec.field(
                "property",
                format::format_atom(settings, conn.interned_atoms(), property, &[]),
            );
            "DeleteProperty"
        }
        atom::GET_PROPERTY => {
            rec.field("delete", format::format_bool(settings, data_byte));
            rec.field("window", format::format_resource(settings, r.card32()?, &[]));
            let property = check_atom(r.card32()?)?;
            rec.field(
                "property",
                format::format_atom(settings, conn.interned_atoms(), property, &[]),
            );
            let type_ = check_atom(r.card32()?)?;
            rec.field(
                "type",
                format::format_atom(
                    settings,
                    conn.interned_atoms(),
                    type_,
                    enum_names::PROPERTY_ATOM,
                ),
            );
            rec.field("long-offset", format::format_card(r.card32()?));
            rec.field("long-length", format::format_card(r.card32()?));
            "GetProperty"
        }
        atom::LIST_PROPERTIES => {
            rec.field("window", format::format_resource(settings, r.card32()?, &[]));
            "ListProperties"
        }
        atom::SET_SELECTION_OWNER => {
            rec.field(
                "owner",
                format::format_resource(settings, r.card32()?, enum_names::ZERO_NONE),
            );
            let selection = check_atom(r.card32()?)?;
            rec.field(
                "selection",
                format::format_atom(settings, conn.interned_atoms(), selection, &[]),
            );
            rec.field("time", format::format_timestamp(settings, r.card32()?));
            "SetSelectionOwner"
        }
        atom::GET_SELECTION_OWNER => {
            let selection = check_atom(r.card32()?)?;
            rec.field(
                "selection",
                format::format_atom(settings, conn.interned_atoms(), selection, &[]),
            );
            "GetSelectionOwner"
        }
        atom::CONVERT_SELECTION => {
            rec.field("requestor", format::format_resource(settings, r.card32()?, &[]));
            for field in ["selection", "target"] {
                let value = check_atom(r.card32()?)?;
                rec.field(
                    field,
                    format::format_atom(settings, conn.interned_atoms(), value, &[]),
                );
            }
            let property = check_atom(r.card32()?)?;
            rec.field(
                "property",
                format::format_atom(
                    settings,
                    conn.interned_atoms(),
                    property,
                    enum_names::ZERO_NONE,
                ),
            );
            rec.field("time", format::format_timestamp(settings, r.card32()?));
            "ConvertSelection"
        }

        input::SEND_EVENT => {
            rec.field("propagate", format::format_bool(settings, data_byte));
            rec.field(
                "destination",
                format::format_resource(settings, r.card32()?, enum_names::EVENT_DESTINATION),
            );
            rec.field("event-mask", read_event_mask(settings, r)?);
            let event_bytes = r.bytes(32)?;
            rec.field(
                "event",
                super::events::render_embedded(settings, conn, event_bytes, ws.nested())?,
            );
            "SendEvent"
        }
        input::GRAB_POINTER => {
            rec.field("owner-events", format::format_bool(settings, data_byte));
            rec.field("grab-window", format::format_resource(settings, r.card32()?, &[]));
            rec.field("event-mask", read_pointer_event_mask(settings, r)?);
            rec.field(
                "pointer-mode",
                format::format_enum(settings, r.card8()?, 1, enum_names::INPUT_MODE),
            );
            rec.field(
                "keyboard-mode",
                format::format_enum(settings, r.card8()?, 1, enum_names::INPUT_MODE),
            );
            rec.field(
                "confine-to",
                format::format_resource(settings, r.card32()?, enum_names::ZERO_NONE),
            );
            rec.field(
                "cursor",
                format::format_resource(settings, r.card32()?, enum_names::ZERO_NONE),
            );
            rec.field("time", format::format_timestamp(settings, r.card32()?));
            "GrabPointer"
        }
        input::UNGRAB_POINTER => {
            rec.field("time", format::format_timestamp(settings, r.card32()?));
            "UngrabPointer"
        }
        input::GRAB_BUTTON => {
            rec.field("owner-events", format::format_bool(settings, data_byte));
            rec.field("grab-window", format::format_resource(settings, r.card32()?, &[]));
            rec.field("event-mask", read_pointer_event_mask(settings, r)?);
            rec.field(
                "pointer-mode",
                format::format_enum(settings, r.card8()?, 1, enum_names::INPUT_MODE),
            );
            rec.field(
                "keyboard-mode",
                format::format_enum(settings, r.card8()?, 1, enum_names::INPUT_MODE),
            );
            rec.field(
                "confine-to",
                format::format_resource(settings, r.card32()?, enum_names::ZERO_NONE),
            );
            rec.field(
                "cursor",
                format::format_resource(settings, r.card32()?, enum_names::ZERO_NONE),
            );
            rec.field(
                "button",
                format::format_enum(settings, r.card8()?, 1, enum_names::BUTTON),
            );
            r.skip(1)?;
            rec.field("modifiers", read_keymask(settings, r)?);
            "GrabButton"
        }
        input::UNGRAB_BUTTON => {
            rec.field(
                "button",
                format::format_enum(settings, data_byte, 1, enum_names::BUTTON),
            );
            rec.field("grab-window", format::format_resource(settings, r.card32()?, &[]));
            rec.field("modifiers", read_keymask(settings, r)?);
            r.skip(2)?;
            "UngrabButton"
        }
        input::CHANGE_ACTIVE_POINTER_GRAB => {
            rec.field(
                "cursor",
                format::format_resource(settings, r.card32()?, enum_names::ZERO_NONE),
            );
            rec.field("time", format::format_timestamp(settings, r.card32()?));
            rec.field("event-mask", read_pointer_event_mask(settings, r)?);
            r.skip(2)?;
            "ChangeActivePointerGrab"
        }
        input::GRAB_KEYBOARD => {
            rec.field("owner-events", format::format_bool(settings, data_byte));
            rec.field("grab-window", format::format_resource(settings, r.card32()?, &[]));
            rec.field("time", format::format_timestamp(settings, r.card32()?));
            rec.field(
                "pointer-mode",
                format::format_enum(settings, r.card8()?, 1, enum_names::INPUT_MODE),
            );
            rec.field(
                "keyboard-mode",
                format::format_enum(settings, r.card8()?, 1, enum_names::INPUT_MODE),
            );
            r.skip(2)?;
            "GrabKeyboard"
        }
        input::UNGRAB_KEYBOARD => {
            rec.field("time", format::format_timestamp(settings, r.card32()?));
            "UngrabKeyboard"
        }
        input::GRAB_KEY => {
            rec.field("owner-events", format::format_bool(settings, data_byte));
            rec.field("grab-window", format::format_resource(settings, r.card32()?, &[]));
            rec.field("modifiers", read_keymask(settings, r)?);
            rec.field(
                "key",
                format::format_enum(settings, r.card8()?, 1, enum_names::KEY),
            );
            rec.field(
                "pointer-mode",
                format::format_enum(settings, r.card8()?, 1, enum_names::INPUT_MODE),
            );
            rec.field(
                "keyboard-mode",
                format::format_enum(settings, r.card8()?, 1, enum_names::INPUT_MODE),
            );
            r.skip(3)?;
            "GrabKey"
        }
        input::UNGRAB_KEY => {
            rec.field(
                "key",
                format::format_enum(settings, data_byte, 1, enum_names::KEY),
            );
            rec.field("grab-window", format::format_resource(settings, r.card32()?, &[]));
            rec.field("modifiers", read_keymask(settings, r)?);
            r.skip(2)?;
            "UngrabKey"
        }
        input::ALLOW_EVENTS => {
            rec.field(
                "mode",
                format::format_enum(settings, data_byte, 1, enum_names::EVENTS_MODE),
            );
            rec.field("time", format::format_timestamp(settings, r.card32()?));
            "AllowEvents"
        }
        input::GRAB_SERVER => "GrabServer",
        input::UNGRAB_SERVER => "UngrabServer",
        input::QUERY_POINTER => {
            rec.field("window", format::format_resource(settings, r.card32()?, &[]));
            "QueryPointer"
        }
        input::GET_MOTION_EVENTS => {
            rec.field("window", format::format_resource(settings, r.card32()?, &[]));
            rec.field("start", format::format_timestamp(settings, r.card32()?));
            rec.field("stop", format::format_timestamp(settings, r.card32()?));
            "GetMotionEvents"
        }
        input::TRANSLATE_COORDINATES => {
            rec.field("src-window", format::format_resource(settings, r.card32()?, &[]));
            rec.field("dst-window", format::format_resource(settings, r.card32()?, &[]));
            rec.field("src-x", format::format_int(r.int16()?));
            rec.field("src-y", format::format_int(r.int16()?));
            "TranslateCoordinates"
        }
        input::WARP_POINTER => {
            rec.field(
                "src-window",
                format::format_resource(settings, r.card32()?, enum_names::ZERO_NONE),
            );
            rec.field(
                "dst-window",
                format::format_resource(settings, r.card32()?, enum_names::ZERO_NONE),
            );
            rec.field("src-x", format::format_int(r.int16()?));
            rec.field("src-y", format::format_int(r.int16()?));
            rec.field("src-width", format::format_card(r.card16()?));
            rec.field("src-height", format::format_card(r.card16()?));
            rec.field("dst-x", format::format_int(r.int16()?));
            rec.field("dst-y", format::format_int(r.int16()?));
            "WarpPointer"
        }
        input::SET_INPUT_FOCUS => {
            rec.field(
                "revert-to",
                format::format_enum(settings, data_byte, 1, enum_names::INPUT_FOCUS),
            );
            rec.field(
                "focus",
                format::format_resource(settings, r.card32()?, enum_names::INPUT_FOCUS),
            );
            rec.field("time", format::format_timestamp(settings, r.card32()?));
            "SetInputFocus"
        }
        input::GET_INPUT_FOCUS => "GetInputFocus",
        input::QUERY_KEYMAP => "QueryKeymap",

        text::OPEN_FONT => {
            rec.field("fid", format::format_resource(settings, r.card32()?, &[]));
            let name_len = r.card16()? as usize;
            r.skip(2)?;
            rec.verbose_field("n", format::format_card(name_len as u64));
            let name = r.string8(name_len)?;
            r.skip_pad(name_len)?;
            rec.field("name", format!("{:?}", name));
            "OpenFont"
        }
        text::CLOSE_FONT => {
            rec.field("font", format::format_resource(settings, r.card32()?, &[]));
            "CloseFont"
        }
        text::QUERY_FONT => {
            rec.field("font", format::format_resource(settings, r.card32()?, &[]));
            "QueryFont"
        }
        text::QUERY_TEXT_EXTENTS => {
            let odd_length = data_byte != 0;
            rec.field("odd-length", format::format_bool(settings, data_byte));
            rec.field("font", format::format_resource(settings, r.card32()?, &[]));
            let mut char_ct = (header.total_sz - 8) / 2;
            if odd_length {
                if char_ct == 0 {
                    return Err(Error::Protocol(
                        "QueryTextExtents odd-length set on empty string".into(),
                    ));
                }
                char_ct -= 1;
            }
            rec.field("string", lists::string16(r, char_ct)?);
            if odd_length {
                r.skip(2)?;
            }
            "QueryTextExtents"
        }
        text::LIST_FONTS | text::LIST_FONTS_WITH_INFO => {
            rec.field("max-names", format::format_card(r.card16()?));
            let pattern_len = r.card16()? as usize;
            rec.verbose_field("n", format::format_card(pattern_len as u64));
            let pattern = r.string8(pattern_len)?;
            r.skip_pad(pattern_len)?;
            rec.field("pattern", format!("{:?}", pattern));
            if opcode == text::LIST_FONTS {
                "ListFonts"
            } else {
                "ListFontsWithInfo"
            }
        }
        text::SET_FONT_PATH => {
            let path_ct = r.card16()? as usize;
            r.skip(2)?;
            rec.verbose_field("number of STRs in path", format::format_card(path_ct as u64));
            rec.field("path", lists::str_list(settings, r, path_ct, ws.nested())?);
            "SetFontPath"
        }
        text::GET_FONT_PATH => "GetFontPath",

        pixmap::CREATE_PIXMAP => {
            rec.field("depth", format::format_card(data_byte));
            rec.field("pid", format::format_resource(settings, r.card32()?, &[]));
            rec.field("drawable", format::format_resource(settings, r.card32()?, &[]));
            rec.field("width", format::format_card(r.card16()?));
            rec.field("height", format::format_card(r.card16()?));
            "CreatePixmap"
        }
        pixmap::FREE_PIXMAP => {
            rec.field("pixmap", format::format_resource(settings, r.card32()?, &[]));
            "FreePixmap"
        }

        graphics::CREATE_GC => {
            rec.field("cid", format::format_resource(settings, r.card32()?, &[]));
            rec.field("drawable", format::format_resource(settings, r.card32()?, &[]));
            let mask = r.card32()?;
            rec.verbose_field(
                "value-mask",
                format::format_bitmask(settings, mask, 4, enum_names::GC_VALUE_MASK),
            );
            parse_value_list(settings, r, mask, GC_VALUES, rec)?;
            "CreateGC"
        }
        graphics::CHANGE_GC => {
            rec.field("gc", format::format_resource(settings, r.card32()?, &[]));
            let mask = r.card32()?;
            rec.verbose_field(
                "value-mask",
                format::format_bitmask(settings, mask, 4, enum_names::GC_VALUE_MASK),
            );
            parse_value_list(settings, r, mask, GC_VALUES, rec)?;
            "ChangeGC"
        }
        graphics::COPY_GC => {
            rec.field("src-gc", format::format_resource(settings, r.card32()?, &[]));
            rec.field("dst-gc", format::format_resource(settings, r.card32()?, &[]));
            rec.field(
                "value-mask",
                format::format_bitmask(settings, r.card32()?, 4, enum_names::GC_VALUE_MASK),
            );
            "CopyGC"
        }
        graphics::SET_DASHES => {
            rec.field("gc", format::format_resource(settings, r.card32()?, &[]));
            rec.field("dash-offset", format::format_card(r.card16()?));
            let dash_ct = r.card16()? as usize;
            rec.verbose_field("n", format::format_card(dash_ct as u64));
            rec.field("dashes", lists::card8_list(r, dash_ct, ws)?);
            r.skip_pad(dash_ct)?;
            "SetDashes"
        }
        graphics::SET_CLIP_RECTANGLES => {
            rec.field(
                "ordering",
                format::format_enum(settings, data_byte, 1, enum_names::CLIP_RECT_ORDERING),
            );
            rec.field("gc", format::format_resource(settings, r.card32()?, &[]));
            rec.field("clip-x-origin", format::format_int(r.int16()?));
            rec.field("clip-y-origin", format::format_int(r.int16()?));
            let rect_ct = r.remaining() / 8;
            rec.field("rectangles", lists::rectangles(settings, r, rect_ct, ws.nested())?);
            "SetClipRectangles"
        }
        graphics::FREE_GC => {
            rec.field("gc", format::format_resource(settings, r.card32()?, &[]));
            "FreeGC"
        }
        graphics::CLEAR_AREA => {
            rec.field("exposures", format::format_bool(settings, data_byte));
            rec.field("window", format::format_resource(settings, r.card32()?, &[]));
            rec.field("x", format::format_int(r.int16()?));
            rec.field("y", format::format_int(r.int16()?));
            rec.field("width", format::format_card(r.card16()?));
            rec.field("height", format::format_card(r.card16()?));
            "ClearArea"
        }
        graphics::COPY_AREA | graphics::COPY_PLANE => {
            rec.field("src-drawable", format::format_resource(settings, r.card32()?, &[]));
            rec.field("dst-drawable", format::format_resource(settings, r.card32()?, &[]));
            rec.field("gc", format::format_resource(settings, r.card32()?, &[]));
            rec.field("src-x", format::format_int(r.int16()?));
            rec.field("src-y", format::format_int(r.int16()?));
            rec.field("dst-x", format::format_int(r.int16()?));
            rec.field("dst-y", format::format_int(r.int16()?));
            rec.field("width", format::format_card(r.card16()?));
            rec.field("height", format::format_card(r.card16()?));
            if opcode == graphics::COPY_PLANE {
                rec.field("bit-plane", format::format_hex(r.card32()?, 4));
                "CopyPlane"
            } else {
                "CopyArea"
            }
        }
        graphics::POLY_POINT | graphics::POLY_LINE => {
            rec.field(
                "coordinate-mode",
                format::format_enum(settings, data_byte, 1, enum_names::POLY_COORDINATE_MODE),
            );
            rec.field("drawable", format::format_resource(settings, r.card32()?, &[]));
            rec.field("gc", format::format_resource(settings, r.card32()?, &[]));
            let point_ct = r.remaining() / 4;
            rec.field("points", lists::points(settings, r, point_ct, ws.nested())?);
            if opcode == graphics::POLY_POINT {
                "PolyPoint"
            } else {
                "PolyLine"
            }
        }
        graphics::POLY_SEGMENT => {
            rec.field("drawable", format::format_resource(settings, r.card32()?, &[]));
            rec.field("gc", format::format_resource(settings, r.card32()?, &[]));
            let segment_ct = r.remaining() / 8;
            rec.field("segments", lists::segments(settings, r, segment_ct, ws.nested())?);
            "PolySegment"
        }
        graphics::POLY_RECTANGLE | graphics::POLY_FILL_RECTANGLE => {
            rec.field("drawable", format::format_resource(settings, r.card32()?, &[]));
            rec.field("gc", format::format_resource(settings, r.card32()?, &[]));
            let rect_ct = r.remaining() / 8;
            rec.field("rectangles", lists::rectangles(settings, r, rect_ct, ws.nested())?);
            if opcode == graphics::POLY_RECTANGLE {
                "PolyRectangle"
            } else {
                "PolyFillRectangle"
            }
        }
        graphics::POLY_ARC | graphics::POLY_FILL_ARC => {
            rec.field("drawable", format::format_resource(settings, r.card32()?, &[]));
            rec.field("gc", format::format_resource(settings, r.card32()?, &[]));
            let arc_ct = r.remaining() / 12;
            rec.field("arcs", lists::arcs(settings, r, arc_ct, ws.nested())?);
            if opcode == graphics::POLY_ARC {
                "PolyArc"
            } else {
                "PolyFillArc"
            }
        }
        graphics::FILL_POLY => {
            rec.field("drawable", format::format_resource(settings, r.card32()?, &[]));
            rec.field("gc", format::format_resource(settings, r.card32()?, &[]));
            rec.field(
                "shape",
                format::format_enum(settings, r.card8()?, 1, enum_names::POLY_SHAPE),
            );
            rec.field(
                "coordinate-mode",
                format::format_enum(settings, r.card8()?, 1, enum_names::POLY_COORDINATE_MODE),
            );
            r.skip(2)?;
            let point_ct = r.remaining() / 4;
            rec.field("points", lists::points(settings, r, point_ct, ws.nested())?);
            "FillPoly"
        }
        graphics::PUT_IMAGE => {
            rec.field(
                "format",
                format::format_enum(settings, data_byte, 1, enum_names::IMAGE_FORMAT),
            );
            rec.field("drawable", format::format_resource(settings, r.card32()?, &[]));
            rec.field("gc", format::format_resource(settings, r.card32()?, &[]));
            rec.field("width", format::format_card(r.card16()?));
            rec.field("height", format::format_card(r.card16()?));
            rec.field("dst-x", format::format_int(r.int16()?));
            rec.field("dst-y", format::format_int(r.int16()?));
            rec.field("left-pad", format::format_card(r.card8()?));
            rec.field("depth", format::format_card(r.card8()?));
            r.skip(2)?;
            let data_len = r.remaining();
            r.skip(data_len)?;
            rec.field("data", format!("({} bytes)", data_len));
            "PutImage"
        }
        graphics::GET_IMAGE => {
            rec.field(
                "format",
                format::format_enum(settings, data_byte, 1, enum_names::IMAGE_FORMAT),
            );
            rec.field("drawable", format::format_resource(settings, r.card32()?, &[]));
            rec.field("x", format::format_int(r.int16()?));
            rec.field("y", format::format_int(r.int16()?));
            rec.field("width", format::format_card(r.card16()?));
            rec.field("height", format::format_card(r.card16()?));
            rec.field("plane-mask", format::format_hex(r.card32()?, 4));
            "GetImage"
        }

        text::POLY_TEXT8 | text::POLY_TEXT16 => {
            rec.field("drawable", format::format_resource(settings, r.card32()?, &[]));
            rec.field("gc", format::format_resource(settings, r.card32()?, &[]));
            rec.field("x", format::format_int(r.int16()?));
            rec.field("y", format::format_int(r.int16()?));
            let wide = opcode == text::POLY_TEXT16;
            rec.field("items", parse_text_items(settings, r, wide, ws.nested())?);
            if wide {
                "PolyText16"
            } else {
                "PolyText8"
            }
        }
        text::IMAGE_TEXT8 => {
            let len = data_byte as usize;
            rec.verbose_field("n", format::format_card(len as u64));
            rec.field("drawable", format::format_resource(settings, r.card32()?, &[]));
            rec.field("gc", format::format_resource(settings, r.card32()?, &[]));
            rec.field("x", format::format_int(r.int16()?));
            rec.field("y", format::format_int(r.int16()?));
            let string = r.string8(len)?;
            r.skip_pad(len)?;
            rec.field("string", format!("{:?}", string));
            "ImageText8"
        }
        text::IMAGE_TEXT16 => {
            let char_ct = data_byte as usize;
            rec.verbose_field("n", format::format_card(char_ct as u64));
            rec.field("drawable", format::format_resource(settings, r.card32()?, &[]));
            rec.field("gc", format::format_resource(settings, r.card32()?, &[]));
            rec.field("x", format::format_int(r.int16()?));
            rec.field("y", format::format_int(r.int16()?));
            rec.field("string", lists::string16(r, char_ct)?);
            r.skip_pad(char_ct * 2)?;
            "ImageText16"
        }

        colormap::CREATE_COLORMAP => {
            rec.field(
                "alloc",
                format::format_enum(settings, data_byte, 1, enum_names::COLORMAP_ALLOC),
            );
            rec.field("mid", format::format_resource(settings, r.card32()?, &[]));
            rec.field("window", format::format_resource(settings, r.card32()?, &[]));
            rec.field("visual", format::format_resource(settings, r.card32()?, &[]));
            "CreateColormap"
        }
        colormap::FREE_COLORMAP => {
            rec.field("cmap", format::format_resource(settings, r.card32()?, &[]));
            "FreeColormap"
        }
        colormap::COPY_COLORMAP_AND_FREE => {
            rec.field("mid", format::format_resource(settings, r.card32()?, &[]));
            rec.field("src-cmap", format::format_resource(settings, r.card32()?, &[]));
            "CopyColormapAndFree"
        }
        colormap::INSTALL_COLORMAP => {
            rec.field("cmap", format::format_resource(settings, r.card32()?, &[]));
            "InstallColormap"
        }
        colormap::UNINSTALL_COLORMAP => {
            rec.field("cmap", format::format_resource(settings, r.card32()?, &[]));
            "UninstallColormap"
        }
        colormap::LIST_INSTALLED_COLORMAPS => {
            rec.field("window", format::format_resource(settings, r.card32()?, &[]));
            "ListInstalledColormaps"
        }
        colormap::ALLOC_COLOR => {
            rec.field("cmap", format::format_resource(settings, r.card32()?, &[]));
            rec.field("red", format::format_card(r.card16()?));
            rec.field("green", format::format_card(r.card16()?));
            rec.field("blue", format::format_card(r.card16()?));
            r.skip(2)?;
            "AllocColor"
        }
        colormap::ALLOC_NAMED_COLOR | colormap::LOOKUP_COLOR => {
            rec.field("cmap", format::format_resource(settings, r.card32()?, &[]));
            let name_len = r.card16()? as usize;
            r.skip(2)?;
            rec.verbose_field("n", format::format_card(name_len as u64));
            let name = r.string8(name_len)?;
            r.skip_pad(name_len)?;
            rec.field("name", format!("{:?}", name));
            if opcode == colormap::ALLOC_NAMED_COLOR {
                "AllocNamedColor"
            } else {
                "LookupColor"
            }
        }
        colormap::ALLOC_COLOR_CELLS => {
            rec.field("contiguous", format::format_bool(settings, data_byte));
            rec.field("cmap", format::format_resource(settings, r.card32()?, &[]));
            rec.field("colors", format::format_card(r.card16()?));
            rec.field("planes", format::format_card(r.card16()?));
            "AllocColorCells"
        }
        colormap::ALLOC_COLOR_PLANES => {
            rec.field("contiguous", format::format_bool(settings, data_byte));
            rec.field("cmap", format::format_resource(settings, r.card32()?, &[]));
            rec.field("colors", format::format_card(r.card16()?));
            rec.field("reds", format::format_card(r.card16()?));
            rec.field("greens", format::format_card(r.card16()?));
            rec.field("blues", format::format_card(r.card16()?));
            "AllocColorPlanes"
        }
        colormap::FREE_COLORS => {
            rec.field("cmap", format::format_resource(settings, r.card32()?, &[]));
            rec.field("plane-mask", format::format_hex(r.card32()?, 4));
            let pixel_ct = r.remaining() / 4;
            rec.field("pixels", lists::card32_hex_list(r, pixel_ct, ws)?);
            "FreeColors"
        }
        colormap::STORE_COLORS => {
            rec.field("cmap", format::format_resource(settings, r.card32()?, &[]));
            let item_ct = r.remaining() / 12;
            rec.field("items", parse_coloritems(settings, r, item_ct, ws.nested())?);
            "StoreColors"
        }
        colormap::STORE_NAMED_COLOR => {
            rec.field(
                "do-rgb",
                format::format_bitmask(settings, data_byte, 1, enum_names::DO_RGB_MASK),
            );
            rec.field("cmap", format::format_resource(settings, r.card32()?, &[]));
            rec.field("pixel", format::format_hex(r.card32()?, 4));
            let name_len = r.card16()? as usize;
            r.skip(2)?;
            rec.verbose_field("n", format::format_card(name_len as u64));
            let name = r.string8(name_len)?;
            r.skip_pad(name_len)?;
            rec.field("name", format!("{:?}", name));
            "StoreNamedColor"
        }
        colormap::QUERY_COLORS => {
            rec.field("cmap", format::format_resource(settings, r.card32()?, &[]));
            let pixel_ct = r.remaining() / 4;
            rec.field("pixels", lists::card32_hex_list(r, pixel_ct, ws)?);
            "QueryColors"
        }

        cursor::CREATE_CURSOR => {
            rec.field("cid", format::format_resource(settings, r.card32()?, &[]));
            rec.field("source", format::format_resource(settings, r.card32()?, &[]));
            rec.field(
                "mask",
                format::format_resource(settings, r.card32()?, enum_names::ZERO_NONE),
            );
            for field in ["fore-red", "fore-green", "fore-blue", "back-red", "back-green", "back-blue"] {
                rec.field(field, format::format_card(r.card16()?));
            }
            rec.field("x", format::format_card(r.card16()?));
            rec.field("y", format::format_card(r.card16()?));
            "CreateCursor"
        }
        cursor::CREATE_GLYPH_CURSOR => {
            rec.field("cid", format::format_resource(settings, r.card32()?, &[]));
            rec.field("source-font", format::format_resource(settings, r.card32()?, &[]));
            rec.field(
                "mask-font",
                format::format_resource(settings, r.card32()?, enum_names::ZERO_NONE),
            );
            rec.field("source-char", format::format_card(r.card16()?));
            rec.field("mask-char", format::format_card(r.card16()?));
            for field in ["fore-red", "fore-green", "fore-blue", "back-red", "back-green", "back-blue"] {
                rec.field(field, format::format_card(r.card16()?));
            }
            "CreateGlyphCursor"
        }
        cursor::FREE_CURSOR => {
            rec.field("cursor", format::format_resource(settings, r.card32()?, &[]));
            "FreeCursor"
        }
        cursor::RECOLOR_CURSOR => {
            rec.field("cursor", format::format_resource(settings, r.card32()?, &[]));
            for field in ["fore-red", "fore-green", "fore-blue", "back-red", "back-green", "back-blue"] {
                rec.field(field, format::format_card(r.card16()?));
            }
            "RecolorCursor"
        }

        server::QUERY_BEST_SIZE => {
            rec.field(
                "class",
                format::format_enum(settings, data_byte, 1, enum_names::SIZE_CLASS),
            );
            rec.field("drawable", format::format_resource(settings, r.card32()?, &[]));
            rec.field("width", format::format_card(r.card16()?));
            rec.field("height", format::format_card(r.card16()?));
            "QueryBestSize"
        }
        server::QUERY_EXTENSION => {
            let name_len = r.card16()? as usize;
            r.skip(2)?;
            rec.verbose_field("n", format::format_card(name_len as u64));
            let name = r.string8(name_len)?;
            r.skip_pad(name_len)?;
            rec.field("name", format!("{:?}", name));
            conn.stash_query_extension(conn.sequence, name);
            "QueryExtension"
        }
        server::LIST_EXTENSIONS => "ListExtensions",
        server::CHANGE_KEYBOARD_MAPPING => {
            let keycode_ct = data_byte as usize;
            rec.verbose_field("keycode-count", format::format_card(keycode_ct as u64));
            rec.field("first-keycode", format::format_card(r.card8()?));
            let per_keycode = r.card8()? as usize;
            rec.field("keysyms-per-keycode", format::format_card(per_keycode as u64));
            r.skip(2)?;
            rec.field(
                "keysyms",
                lists::keysym_list(r, keycode_ct * per_keycode, ws)?,
            );
            "ChangeKeyboardMapping"
        }
        server::GET_KEYBOARD_MAPPING => {
            rec.field("first-keycode", format::format_card(r.card8()?));
            rec.field("count", format::format_card(r.card8()?));
            r.skip(2)?;
            "GetKeyboardMapping"
        }
        server::CHANGE_KEYBOARD_CONTROL => {
            let mask = r.card32()?;
            rec.verbose_field(
                "value-mask",
                format::format_bitmask(settings, mask, 4, enum_names::KEYCTL_VALUE_MASK),
            );
            parse_value_list(settings, r, mask, KEYBOARD_CONTROL_VALUES, rec)?;
            "ChangeKeyboardControl"
        }
        server::GET_KEYBOARD_CONTROL => "GetKeyboardControl",
        server::BELL => {
            rec.field("percent", format::format_int(data_byte as i8));
            "Bell"
        }
        server::CHANGE_POINTER_CONTROL => {
            rec.field("acceleration-numerator", format::format_int(r.int16()?));
            rec.field("acceleration-denominator", format::format_int(r.int16()?));
            rec.field("threshold", format::format_int(r.int16()?));
            rec.field("do-acceleration", format::format_bool(settings, r.card8()?));
            rec.field("do-threshold", format::format_bool(settings, r.card8()?));
            "ChangePointerControl"
        }
        server::GET_POINTER_CONTROL => "GetPointerControl",
        server::SET_SCREEN_SAVER => {
            rec.field("timeout", format::format_int(r.int16()?));
            rec.field("interval", format::format_int(r.int16()?));
            rec.field(
                "prefer-blanking",
                format::format_enum(settings, r.card8()?, 1, enum_names::SCREEN_SAVER),
            );
            rec.field(
                "allow-exposures",
                format::format_enum(settings, r.card8()?, 1, enum_names::SCREEN_SAVER),
            );
            r.skip(2)?;
            "SetScreenSaver"
        }
        server::GET_SCREEN_SAVER => "GetScreenSaver",
        server::CHANGE_HOSTS => {
            rec.field(
                "mode",
                format::format_enum(settings, data_byte, 1, enum_names::INSERT_DELETE_MODE),
            );
            rec.field(
                "family",
                format::format_enum(settings, r.card8()?, 1, enum_names::HOST_FAMILY),
            );
            r.skip(1)?;
            let address_len = r.card16()? as usize;
            rec.verbose_field("n", format::format_card(address_len as u64));
            rec.field("address", lists::card8_list(r, address_len, ws)?);
            r.skip_pad(address_len)?;
            "ChangeHosts"
        }
        server::LIST_HOSTS => "ListHosts",
        server::SET_ACCESS_CONTROL => {
            rec.field(
                "mode",
                format::format_enum(settings, data_byte, 1, enum_names::ACCESS_MODE),
            );
            "SetAccessControl"
        }
        server::SET_CLOSE_DOWN_MODE => {
            rec.field(
                "mode",
                format::format_enum(settings, data_byte, 1, enum_names::CLOSE_DOWN_MODE),
            );
            "SetCloseDownMode"
        }
        server::KILL_CLIENT => {
            rec.field(
                "resource",
                format::format_resource(settings, r.card32()?, enum_names::CLIENT_RESOURCE),
            );
            "KillClient"
        }
        server::ROTATE_PROPERTIES => {
            rec.field("window", format::format_resource(settings, r.card32()?, &[]));
            let property_ct = r.card16()? as usize;
            rec.verbose_field("number of properties", format::format_card(property_ct as u64));
            rec.field("delta", format::format_int(r.int16()?));
            rec.field(
                "properties",
                lists::atom_list(settings, conn.interned_atoms(), r, property_ct, ws)?,
            );
            "RotateProperties"
        }
        server::FORCE_SCREEN_SAVER => {
            rec.field(
                "mode",
                format::format_enum(settings, data_byte, 1, enum_names::SCREEN_SAVER_SET_MODE),
            );
            "ForceScreenSaver"
        }
        server::SET_POINTER_MAPPING => {
            let map_len = data_byte as usize;
            rec.verbose_field("n", format::format_card(map_len as u64));
            rec.field("map", lists::card8_list(r, map_len, ws)?);
            r.skip_pad(map_len)?;
            "SetPointerMapping"
        }
        server::GET_POINTER_MAPPING => "GetPointerMapping",
        server::SET_MODIFIER_MAPPING => {
            let per_modifier = data_byte as usize;
            rec.field(
                "keycodes-per-modifier",
                format::format_card(per_modifier as u64),
            );
            rec.field("keycodes", lists::keycode_list(r, per_modifier * 8, ws)?);
            "SetModifierMapping"
        }
        server::GET_MODIFIER_MAPPING => "GetModifierMapping",
        server::NO_OPERATION => {
            // NoOperation tolerates any length; the body is ignored
            let slop = r.remaining();
            r.skip(slop)?;
            "NoOperation"
        }

        other => {
            return Err(Error::Protocol(format!(
                "unused core opcode {} in request stream",
                other
            )))
        }
    };
    Ok(name)
}

fn render_property_data(
    settings: &Settings,
    r: &mut WireReader<'_>,
    fmt: u8,
    byte_len: usize,
    ws: Whitespace,
) -> Result<String> {
    match fmt {
        8 => Ok(format!("{:?}", r.string8(byte_len)?)),
        16 => {
            let mut items = Vec::with_capacity(byte_len / 2);
            for _ in 0..byte_len / 2 {
                items.push(r.card16()?.to_string());
            }
            Ok(format::format_list(&items, ws.single_line()))
        }
        32 => lists::card32_list(r, byte_len / 4, ws),
        _ => {
            let _ = settings;
            r.skip(byte_len)?;
            Ok(format!("({} bytes)", byte_len))
        }
    }
}

/// LISTofTEXTITEM: a leading byte of 255 switches fonts (4 font bytes,
/// most significant first, unswapped); any other value prefixes an embedded
/// string element. The list runs until only alignment padding remains.
fn parse_text_items(
    settings: &Settings,
    r: &mut WireReader<'_>,
    wide: bool,
    ws: Whitespace,
) -> Result<String> {
    const FONT_SHIFT: u8 = 255;
    let mut items = Vec::new();
    loop {
        if r.remaining() < 2 {
            let slop = r.remaining();
            r.skip(slop)?;
            break;
        }
        let lead = r.peek_card8()?;
        // at most three zero bytes of alignment padding close the list
        if lead == 0 && r.remaining() <= 3 {
            let slop = r.remaining();
            r.skip(slop)?;
            break;
        }
        if lead == FONT_SHIFT {
            r.skip(1)?;
            let font_bytes = r.bytes(4)?;
            let font = u32::from_be_bytes([
                font_bytes[0],
                font_bytes[1],
                font_bytes[2],
                font_bytes[3],
            ]);
            let mut rec = Record::new(settings, ws.nested().single_line());
            rec.field("font", format::format_resource(settings, font, &[]));
            items.push(rec.finish());
            continue;
        }
        let char_ct = lead as usize;
        let element_sz = 2 + if wide { char_ct * 2 } else { char_ct };
        if element_sz > r.remaining() {
            // trailing padding cannot form an element
            let slop = r.remaining();
            r.skip(slop)?;
            break;
        }
        r.skip(1)?;
        let delta = r.int8()?;
        let string = if wide {
            lists::string16(r, char_ct)?
        } else {
            format!("{:?}", r.string8(char_ct)?)
        };
        let mut rec = Record::new(settings, ws.nested().single_line());
        rec.field("delta", format::format_int(delta));
        rec.field("string", string);
        items.push(rec.finish());
    }
    Ok(format::format_list(&items, ws))
}

fn parse_coloritems(
    settings: &Settings,
    r: &mut WireReader<'_>,
    count: usize,
    ws: Whitespace,
) -> Result<String> {
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        let pixel = r.card32()?;
        let red = r.card16()?;
        let green = r.card16()?;
        let blue = r.card16()?;
        let do_mask = r.card8()?;
        r.skip(1)?;
        let mut rec = Record::new(settings, ws.nested().single_line());
        rec.field("pixel", format::format_hex(pixel, 4));
        rec.field("red", format::format_card(red));
        rec.field("green", format::format_card(green));
        rec.field("blue", format::format_card(blue));
        rec.field(
            "do-rgb",
            format::format_bitmask(settings, do_mask, 1, enum_names::DO_RGB_MASK),
        );
        items.push(rec.finish());
    }
    Ok(format::format_list(&items, ws))
}
