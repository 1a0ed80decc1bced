//! Server-to-client message decoding: replies, dispatched by the sequence
//! number shadowed at request time, plus the shared framing entry point for
//! the whole server stream.
//!
//! All replies are at least 32 bytes; the 4-byte extra-length field extends
//! them in 4-byte units. The reply layout is keyed by the *request's* major
//! opcode, never by the reply bytes themselves.

use crate::core::config::Settings;
use crate::protocol::{
    enum_names, errors, events, lists, opcodes, ByteOrder, WireReader, ALIGN, DEFAULT_MESSAGE_SZ,
    ERROR_PREFIX, REPLY_PREFIX,
};
use crate::proxy::connection::Connection;
use crate::trace::format::{self, Record, Whitespace};
use crate::{Error, Result};

/// Byte offset of the QueryExtension reply's `present` flag, the one field
/// the proxy may rewrite.
pub const QUERY_EXTENSION_PRESENT_OFFSET: usize = 8;

/// A decoded server message plus any byte patches to apply to the
/// forwarded buffer before relay.
pub struct DecodedServerMessage {
    pub text: String,
    pub patches: Vec<(usize, u8)>,
}

/// Total size of the next server message once 8 bytes are visible. Errors
/// and events are always 32 bytes; replies read their extra length.
pub fn measure_server_message(data: &[u8], byte_order: ByteOrder) -> Result<Option<usize>> {
    if data.is_empty() {
        return Ok(None);
    }
    if data[0] != REPLY_PREFIX {
        // error or event
        return Ok(Some(DEFAULT_MESSAGE_SZ));
    }
    if data.len() < 8 {
        return Ok(None);
    }
    let mut r = WireReader::new(data, byte_order);
    r.skip(4)?;
    let extra_len = r.card32()? as usize;
    Ok(Some(DEFAULT_MESSAGE_SZ + extra_len * ALIGN))
}

/// Decode one complete server-to-client message (error, reply, or event).
pub fn decode_server_message(
    settings: &Settings,
    conn: &mut Connection,
    data: &[u8],
) -> Result<DecodedServerMessage> {
    match data[0] {
        ERROR_PREFIX => Ok(DecodedServerMessage {
            text: errors::decode_error(settings, conn, data)?,
            patches: Vec::new(),
        }),
        REPLY_PREFIX => decode_reply(settings, conn, data),
        _ => Ok(DecodedServerMessage {
            text: events::decode_event(settings, conn, data)?,
            patches: Vec::new(),
        }),
    }
}

fn decode_reply(
    settings: &Settings,
    conn: &mut Connection,
    data: &[u8],
) -> Result<DecodedServerMessage> {
    let mut r = WireReader::new(data, conn.byte_order);
    r.skip(1)?;
    let data_byte = r.card8()?;
    let sequence = r.card16()?;
    let extra_len = r.card32()? as u64;

    let opcode = conn.lookup_request(sequence).ok_or_else(|| {
        Error::Invariant(format!(
            "reply references sequence {} with no shadowed request",
            sequence
        ))
    })?;

    let ws = Whitespace::root(settings.multiline);
    let mut rec = Record::new(settings, ws);
    rec.verbose_field("reply length", format::format_card(extra_len));

    let mut patches = Vec::new();
    let name = decode_reply_body(
        settings, conn, opcode, data_byte, sequence, &mut r, &mut rec, &mut patches,
    )?;

    let body = rec.finish();
    let text = if settings.verbose {
        format!("{}({}) reply seq={}: {}", name, opcode, sequence, body)
    } else {
        format!("{} reply seq={}: {}", name, sequence, body)
    };
    Ok(DecodedServerMessage { text, patches })
}

fn charinfo(settings: &Settings, r: &mut WireReader<'_>, ws: Whitespace) -> Result<String> {
    let left_side_bearing = r.int16()?;
    let right_side_bearing = r.int16()?;
    let character_width = r.int16()?;
    let ascent = r.int16()?;
    let descent = r.int16()?;
    let attributes = r.card16()?;
    let mut rec = Record::new(settings, ws.single_line());
    rec.field("left-side-bearing", format::format_int(left_side_bearing));
    rec.field("right-side-bearing", format::format_int(right_side_bearing));
    rec.field("character-width", format::format_int(character_width));
    rec.field("ascent", format::format_int(ascent));
    rec.field("descent", format::format_int(descent));
    rec.field("attributes", format::format_hex(attributes, 2));
    Ok(rec.finish())
}

fn fontprop_list(
    settings: &Settings,
    conn: &Connection,
    r: &mut WireReader<'_>,
    count: usize,
    ws: Whitespace,
) -> Result<String> {
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        let name = r.card32()?;
        let value = r.card32()?;
        let mut rec = Record::new(settings, ws.nested().single_line());
        rec.field(
            "name",
            format::format_atom(settings, conn.interned_atoms(), name, &[]),
        );
        rec.field("value", format::format_hex(value, 4));
        items.push(rec.finish());
    }
    Ok(format::format_list(&items, ws))
}

/// Shared prefix of QueryFont and ListFontsWithInfo replies, from
/// min-bounds through font-descent.
fn font_metrics(
    settings: &Settings,
    r: &mut WireReader<'_>,
    rec: &mut Record<'_>,
    ws: Whitespace,
) -> Result<u16> {
    rec.field("min-bounds", charinfo(settings, r, ws.nested())?);
    r.skip(4)?;
    rec.field("max-bounds", charinfo(settings, r, ws.nested())?);
    r.skip(4)?;
    rec.field("min-char-or-byte2", format::format_card(r.card16()?));
    rec.field("max-char-or-byte2", format::format_card(r.card16()?));
    rec.field("default-char", format::format_card(r.card16()?));
    let prop_ct = r.card16()?;
    rec.verbose_field("number of FONTPROPs", format::format_card(prop_ct));
    rec.field(
        "draw-direction",
        format::format_enum(settings, r.card8()?, 1, enum_names::DRAW_DIRECTION),
    );
    rec.field("min-byte1", format::format_card(r.card8()?));
    rec.field("max-byte1", format::format_card(r.card8()?));
    rec.field("all-chars-exist", format::format_bool(settings, r.card8()?));
    rec.field("font-ascent", format::format_int(r.int16()?));
    rec.field("font-descent", format::format_int(r.int16()?));
    Ok(prop_ct)
}

#[allow(clippy::too_many_arguments)]
fn decode_reply_body(
    settings: &Settings,
    conn: &mut Connection,
    opcode: u8,
    data_byte: u8,
    sequence: u16,
    r: &mut WireReader<'_>,
    rec: &mut Record<'_>,
    patches: &mut Vec<(usize, u8)>,
) -> Result<&'static str> {
    use opcodes::{atom, colormap, graphics, input, server, text, window};

    let ws = rec.ws();

    // extension replies stay opaque unless this is the BIG-REQUESTS enable
    if opcode >= opcodes::EXTENSION_MIN {
        if conn.big_requests_opcode == Some(opcode) {
            rec.field("maximum-request-length", format::format_card(r.card32()?));
            return Ok("BigReqEnable");
        }
        let body_len = r.remaining();
        r.skip(body_len)?;
        rec.field("body", format!("({} bytes)", body_len));
        return Ok("(extension request)");
    }

    let name = match opcode {
        window::GET_WINDOW_ATTRIBUTES => {
            rec.field(
                "backing-store",
                format::format_enum(settings, data_byte, 1, enum_names::WINDOW_ATTRIBUTE_BACKING_STORE),
            );
            rec.field("visual", format::format_resource(settings, r.card32()?, &[]));
            rec.field(
                "class",
                format::format_enum(settings, r.card16()?, 2, enum_names::WINDOW_CLASS),
            );
            rec.field(
                "bit-gravity",
                format::format_enum(settings, r.card8()?, 1, enum_names::BITGRAVITY),
            );
            rec.field(
                "win-gravity",
                format::format_enum(settings, r.card8()?, 1, enum_names::WINGRAVITY),
            );
            rec.field("backing-planes", format::format_hex(r.card32()?, 4));
            rec.field("backing-pixel", format::format_hex(r.card32()?, 4));
            rec.field("save-under", format::format_bool(settings, r.card8()?));
            rec.field("map-is-installed", format::format_bool(settings, r.card8()?));
            rec.field(
                "map-state",
                format::format_enum(settings, r.card8()?, 1, enum_names::WINDOW_ATTRIBUTE_MAP_STATE),
            );
            rec.field("override-redirect", format::format_bool(settings, r.card8()?));
            rec.field(
                "colormap",
                format::format_resource(settings, r.card32()?, enum_names::ZERO_NONE),
            );
            rec.field(
                "all-event-masks",
                format::format_bitmask(settings, r.card32()?, 4, enum_names::SET_OF_EVENT),
            );
            rec.field(
                "your-event-mask",
                format::format_bitmask(settings, r.card32()?, 4, enum_names::SET_OF_EVENT),
            );
            rec.field(
                "do-not-propagate-mask",
                format::format_bitmask(settings, r.card16()?, 2, enum_names::SET_OF_EVENT),
            );
            "GetWindowAttributes"
        }
        window::GET_GEOMETRY => {
            rec.field("depth", format::format_card(data_byte));
            rec.field("root", format::format_resource(settings, r.card32()?, &[]));
            rec.field("x", format::format_int(r.int16()?));
            rec.field("y", format::format_int(r.int16()?));
            rec.field("width", format::format_card(r.card16()?));
            rec.field("height", format::format_card(r.card16()?));
            rec.field("border-width", format::format_card(r.card16()?));
            "GetGeometry"
        }
        window::QUERY_TREE => {
            rec.field("root", format::format_resource(settings, r.card32()?, &[]));
            rec.field(
                "parent",
                format::format_resource(settings, r.card32()?, enum_names::ZERO_NONE),
            );
            let child_ct = r.card16()? as usize;
            rec.verbose_field("number of children", format::format_card(child_ct as u64));
            r.skip(14)?;
            rec.field("children", lists::resource_list(settings, r, child_ct, ws)?);
            "QueryTree"
        }
        atom::INTERN_ATOM => {
            let id = r.card32()?;
            let full_seq = conn.resolve_sequence(sequence).ok_or_else(|| {
                Error::Invariant(format!("InternAtom reply for unknown sequence {}", sequence))
            })?;
            let stashed = conn.take_intern_atom(full_seq)?;
            if id != 0 {
                conn.record_interned_atom(id, stashed);
            }
            rec.field(
                "atom",
                format::format_atom(settings, conn.interned_atoms(), id, enum_names::ZERO_NONE),
            );
            "InternAtom"
        }
        atom::GET_ATOM_NAME => {
            let name_len = r.card16()? as usize;
            rec.verbose_field("n", format::format_card(name_len as u64));
            r.skip(22)?;
            let name = r.string8(name_len)?;
            r.skip_pad(name_len)?;
            rec.field("name", format!("{:?}", name));
            "GetAtomName"
        }
        atom::GET_PROPERTY => {
            let fmt = data_byte;
            rec.field("format", format::format_card(fmt));
            let type_ = r.card32()?;
            rec.field(
                "type",
                format::format_atom(settings, conn.interned_atoms(), type_, enum_names::ZERO_NONE),
            );
            rec.field("bytes-after", format::format_card(r.card32()?));
            let unit_ct = r.card32()? as usize;
            rec.verbose_field(
                "length of value in format units",
                format::format_card(unit_ct as u64),
            );
            r.skip(12)?;
            let byte_len = match fmt {
                0 => 0,
                8 => unit_ct,
                16 => unit_ct * 2,
                32 => unit_ct * 4,
                other => {
                    return Err(Error::Protocol(format!(
                        "GetProperty format {} is not 0/8/16/32",
                        other
                    )))
                }
            };
            let rendered = match fmt {
                8 => format!("{:?}", r.string8(byte_len)?),
                16 => {
                    let mut items = Vec::with_capacity(byte_len / 2);
                    for _ in 0..byte_len / 2 {
                        items.push(r.card16()?.to_string());
                    }
                    format::format_list(&items, ws.single_line())
                }
                32 => lists::card32_list(r, byte_len / 4, ws)?,
                _ => "\"\"".to_string(),
            };
            r.skip_pad(byte_len)?;
            rec.field("value", rendered);
            "GetProperty"
        }
        atom::LIST_PROPERTIES => {
            let atom_ct = r.card16()? as usize;
            rec.verbose_field("number of atoms", format::format_card(atom_ct as u64));
            r.skip(22)?;
            rec.field(
                "atoms",
                lists::atom_list(settings, conn.interned_atoms(), r, atom_ct, ws)?,
            );
            "ListProperties"
        }
        atom::GET_SELECTION_OWNER => {
            rec.field(
                "owner",
                format::format_resource(settings, r.card32()?, enum_names::ZERO_NONE),
            );
            "GetSelectionOwner"
        }
        input::GRAB_POINTER | input::GRAB_KEYBOARD => {
            rec.field(
                "status",
                format::format_enum(settings, data_byte, 1, enum_names::GRAB_STATUS),
            );
            if opcode == input::GRAB_POINTER {
                "GrabPointer"
            } else {
                "GrabKeyboard"
            }
        }
        input::QUERY_POINTER => {
            rec.field("same-screen", format::format_bool(settings, data_byte));
            rec.field("root", format::format_resource(settings, r.card32()?, &[]));
            rec.field(
                "child",
                format::format_resource(settings, r.card32()?, enum_names::ZERO_NONE),
            );
            rec.field("root-x", format::format_int(r.int16()?));
            rec.field("root-y", format::format_int(r.int16()?));
            rec.field("win-x", format::format_int(r.int16()?));
            rec.field("win-y", format::format_int(r.int16()?));
            rec.field(
                "mask",
                format::format_bitmask(settings, r.card16()?, 2, enum_names::SET_OF_KEYBUTMASK),
            );
            "QueryPointer"
        }
        input::GET_MOTION_EVENTS => {
            let event_ct = r.card32()? as usize;
            rec.verbose_field("number of events", format::format_card(event_ct as u64));
            r.skip(20)?;
            rec.field("events", lists::timecoord_list(settings, r, event_ct, ws.nested())?);
            "GetMotionEvents"
        }
        input::TRANSLATE_COORDINATES => {
            rec.field("same-screen", format::format_bool(settings, data_byte));
            rec.field(
                "child",
                format::format_resource(settings, r.card32()?, enum_names::ZERO_NONE),
            );
            rec.field("dst-x", format::format_int(r.int16()?));
            rec.field("dst-y", format::format_int(r.int16()?));
            "TranslateCoordinates"
        }
        input::GET_INPUT_FOCUS => {
            rec.field(
                "revert-to",
                format::format_enum(settings, data_byte, 1, enum_names::INPUT_FOCUS),
            );
            rec.field(
                "focus",
                format::format_resource(settings, r.card32()?, enum_names::INPUT_FOCUS),
            );
            "GetInputFocus"
        }
        input::QUERY_KEYMAP => {
            rec.field("keys", lists::card8_list(r, 32, ws)?);
            "QueryKeymap"
        }
        text::QUERY_FONT => {
            let prop_ct = font_metrics(settings, r, rec, ws)?;
            let char_ct = r.card32()? as usize;
            rec.verbose_field("number of CHARINFOs", format::format_card(char_ct as u64));
            rec.field(
                "properties",
                fontprop_list(settings, conn, r, prop_ct as usize, ws.nested())?,
            );
            let mut infos = Vec::with_capacity(char_ct);
            for _ in 0..char_ct {
                infos.push(charinfo(settings, r, ws.nested())?);
            }
            rec.field("char-infos", format::format_list(&infos, ws.nested()));
            "QueryFont"
        }
        text::QUERY_TEXT_EXTENTS => {
            rec.field(
                "draw-direction",
                format::format_enum(settings, data_byte, 1, enum_names::DRAW_DIRECTION),
            );
            rec.field("font-ascent", format::format_int(r.int16()?));
            rec.field("font-descent", format::format_int(r.int16()?));
            rec.field("overall-ascent", format::format_int(r.int16()?));
            rec.field("overall-descent", format::format_int(r.int16()?));
            rec.field("overall-width", format::format_int(r.int32()?));
            rec.field("overall-left", format::format_int(r.int32()?));
            rec.field("overall-right", format::format_int(r.int32()?));
            "QueryTextExtents"
        }
        text::LIST_FONTS => {
            let name_ct = r.card16()? as usize;
            rec.verbose_field("number of names", format::format_card(name_ct as u64));
            r.skip(22)?;
            rec.field("names", lists::str_list(settings, r, name_ct, ws.nested())?);
            "ListFonts"
        }
        text::LIST_FONTS_WITH_INFO => {
            // one reply per font; a zero name length marks the last
            let name_len = data_byte as usize;
            if name_len == 0 {
                rec.field("last-reply", "True".to_string());
                return Ok("ListFontsWithInfo");
            }
            rec.verbose_field("n", format::format_card(name_len as u64));
            let prop_ct = font_metrics(settings, r, rec, ws)?;
            rec.field("replies-hint", format::format_card(r.card32()?));
            rec.field(
                "properties",
                fontprop_list(settings, conn, r, prop_ct as usize, ws.nested())?,
            );
            let name = r.string8(name_len)?;
            r.skip_pad(name_len)?;
            rec.field("name", format!("{:?}", name));
            "ListFontsWithInfo"
        }
        text::GET_FONT_PATH => {
            let path_ct = r.card16()? as usize;
            rec.verbose_field("number of STRs in path", format::format_card(path_ct as u64));
            r.skip(22)?;
            rec.field("path", lists::str_list(settings, r, path_ct, ws.nested())?);
            "GetFontPath"
        }
        graphics::GET_IMAGE => {
            rec.field("depth", format::format_card(data_byte));
            rec.field(
                "visual",
                format::format_resource(settings, r.card32()?, enum_names::ZERO_NONE),
            );
            r.skip(20)?;
            let data_len = r.remaining();
            r.skip(data_len)?;
            rec.field("data", format!("({} bytes)", data_len));
            "GetImage"
        }
        colormap::LIST_INSTALLED_COLORMAPS => {
            let cmap_ct = r.card16()? as usize;
            rec.verbose_field("number of cmaps", format::format_card(cmap_ct as u64));
            r.skip(22)?;
            rec.field("cmaps", lists::resource_list(settings, r, cmap_ct, ws)?);
            "ListInstalledColormaps"
        }
        colormap::ALLOC_COLOR => {
            rec.field("red", format::format_card(r.card16()?));
            rec.field("green", format::format_card(r.card16()?));
            rec.field("blue", format::format_card(r.card16()?));
            r.skip(2)?;
            rec.field("pixel", format::format_hex(r.card32()?, 4));
            "AllocColor"
        }
        colormap::ALLOC_NAMED_COLOR => {
            rec.field("pixel", format::format_hex(r.card32()?, 4));
            for field in [
                "exact-red",
                "exact-green",
                "exact-blue",
                "visual-red",
                "visual-green",
                "visual-blue",
            ] {
                rec.field(field, format::format_card(r.card16()?));
            }
            "AllocNamedColor"
        }
        colormap::ALLOC_COLOR_CELLS => {
            let pixel_ct = r.card16()? as usize;
            let mask_ct = r.card16()? as usize;
            rec.verbose_field("number of pixels", format::format_card(pixel_ct as u64));
            rec.verbose_field("number of masks", format::format_card(mask_ct as u64));
            r.skip(20)?;
            rec.field("pixels", lists::card32_hex_list(r, pixel_ct, ws)?);
            rec.field("masks", lists::card32_hex_list(r, mask_ct, ws)?);
            "AllocColorCells"
        }
        colormap::ALLOC_COLOR_PLANES => {
            let pixel_ct = r.card16()? as usize;
            rec.verbose_field("number of pixels", format::format_card(pixel_ct as u64));
            r.skip(2)?;
            rec.field("red-mask", format::format_hex(r.card32()?, 4));
            rec.field("green-mask", format::format_hex(r.card32()?, 4));
            rec.field("blue-mask", format::format_hex(r.card32()?, 4));
            r.skip(8)?;
            rec.field("pixels", lists::card32_hex_list(r, pixel_ct, ws)?);
            "AllocColorPlanes"
        }
        colormap::QUERY_COLORS => {
            let rgb_ct = r.card16()? as usize;
            rec.verbose_field("number of RGBs", format::format_card(rgb_ct as u64));
            r.skip(22)?;
            let mut items = Vec::with_capacity(rgb_ct);
            for _ in 0..rgb_ct {
                let red = r.card16()?;
                let green = r.card16()?;
                let blue = r.card16()?;
                r.skip(2)?;
                let mut rgb = Record::new(settings, ws.nested().single_line());
                rgb.field("red", format::format_card(red));
                rgb.field("green", format::format_card(green));
                rgb.field("blue", format::format_card(blue));
                items.push(rgb.finish());
            }
            rec.field("colors", format::format_list(&items, ws.nested()));
            "QueryColors"
        }
        colormap::LOOKUP_COLOR => {
            for field in [
                "exact-red",
                "exact-green",
                "exact-blue",
                "visual-red",
                "visual-green",
                "visual-blue",
            ] {
                rec.field(field, format::format_card(r.card16()?));
            }
            "LookupColor"
        }
        server::QUERY_BEST_SIZE => {
            rec.field("width", format::format_card(r.card16()?));
            rec.field("height", format::format_card(r.card16()?));
            "QueryBestSize"
        }
        server::QUERY_EXTENSION => {
            let full_seq = conn.resolve_sequence(sequence).ok_or_else(|| {
                Error::Invariant(format!(
                    "QueryExtension reply for unknown sequence {}",
                    sequence
                ))
            })?;
            let ext_name = conn.take_query_extension(full_seq);

            let mut present = r.card8()?;
            let major_opcode = r.card8()?;
            let first_event = r.card8()?;
            let first_error = r.card8()?;

            if settings.deny_all_extensions && present != 0 {
                // the one field the proxy rewrites in the forwarded bytes
                patches.push((QUERY_EXTENSION_PRESENT_OFFSET, 0));
                present = 0;
            } else if present != 0 {
                if let Some(name) = ext_name.as_deref() {
                    if crate::proxy::extensions::ExtensionId::from_wire_name(name).is_some() {
                        conn.big_requests_opcode = Some(major_opcode);
                    }
                }
            }

            rec.field("present", format::format_bool(settings, present));
            rec.field("major-opcode", format::format_card(major_opcode));
            rec.field("first-event", format::format_card(first_event));
            rec.field("first-error", format::format_card(first_error));
            "QueryExtension"
        }
        server::LIST_EXTENSIONS => {
            let str_ct = data_byte as usize;
            rec.verbose_field("number of STRs in names", format::format_card(str_ct as u64));
            r.skip(24)?;
            rec.field("names", lists::str_list(settings, r, str_ct, ws.nested())?);
            "ListExtensions"
        }
        server::GET_KEYBOARD_MAPPING => {
            let per_keycode = data_byte as usize;
            rec.field(
                "keysyms-per-keycode",
                format::format_card(per_keycode as u64),
            );
            r.skip(24)?;
            let keysym_ct = r.remaining() / 4;
            rec.field("keysyms", lists::keysym_list(r, keysym_ct, ws)?);
            "GetKeyboardMapping"
        }
        server::GET_KEYBOARD_CONTROL => {
            rec.field(
                "global-auto-repeat",
                format::format_enum(settings, data_byte, 1, enum_names::OFF_ON),
            );
            rec.field("led-mask", format::format_hex(r.card32()?, 4));
            rec.field("key-click-percent", format::format_card(r.card8()?));
            rec.field("bell-percent", format::format_card(r.card8()?));
            rec.field("bell-pitch", format::format_card(r.card16()?));
            rec.field("bell-duration", format::format_card(r.card16()?));
            r.skip(2)?;
            rec.field("auto-repeats", lists::card8_list(r, 32, ws)?);
            "GetKeyboardControl"
        }
        server::GET_POINTER_CONTROL => {
            rec.field("acceleration-numerator", format::format_card(r.card16()?));
            rec.field("acceleration-denominator", format::format_card(r.card16()?));
            rec.field("threshold", format::format_card(r.card16()?));
            "GetPointerControl"
        }
        server::GET_SCREEN_SAVER => {
            rec.field("timeout", format::format_card(r.card16()?));
            rec.field("interval", format::format_card(r.card16()?));
            rec.field(
                "prefer-blanking",
                format::format_enum(settings, r.card8()?, 1, enum_names::SCREEN_SAVER),
            );
            rec.field(
                "allow-exposures",
                format::format_enum(settings, r.card8()?, 1, enum_names::SCREEN_SAVER),
            );
            "GetScreenSaver"
        }
        server::LIST_HOSTS => {
            rec.field(
                "mode",
                format::format_enum(settings, data_byte, 1, enum_names::HOST_STATUS_MODE),
            );
            let host_ct = r.card16()? as usize;
            rec.verbose_field("number of HOSTs", format::format_card(host_ct as u64));
            r.skip(22)?;
            rec.field("hosts", lists::host_list(settings, r, host_ct, ws.nested())?);
            "ListHosts"
        }
        server::SET_POINTER_MAPPING => {
            rec.field(
                "status",
                format::format_enum(settings, data_byte, 1, enum_names::MAPPING_STATUS),
            );
            "SetPointerMapping"
        }
        server::GET_POINTER_MAPPING => {
            let map_len = data_byte as usize;
            rec.verbose_field("n", format::format_card(map_len as u64));
            r.skip(24)?;
            rec.field("map", lists::card8_list(r, map_len, ws)?);
            r.skip_pad(map_len)?;
            "GetPointerMapping"
        }
        server::SET_MODIFIER_MAPPING => {
            rec.field(
                "status",
                format::format_enum(settings, data_byte, 1, enum_names::MAPPING_STATUS),
            );
            "SetModifierMapping"
        }
        server::GET_MODIFIER_MAPPING => {
            let per_modifier = data_byte as usize;
            rec.field(
                "keycodes-per-modifier",
                format::format_card(per_modifier as u64),
            );
            r.skip(24)?;
            rec.field("keycodes", lists::keycode_list(r, per_modifier * 8, ws)?);
            "GetModifierMapping"
        }
        other => {
            return Err(Error::Protocol(format!(
                "reply answers request {} ({}) which bears no reply",
                opcodes::request_name(other),
                other
            )))
        }
    };
    Ok(name)
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

    fn reply_header(data_byte: u8, seq: u16, extra_len: u32) -> Vec<u8> {
        let mut data = vec![REPLY_PREFIX, data_byte];
        data.extend_from_slice(&seq.to_le_bytes());
        data.extend_from_slice(&extra_len.to_le_bytes());
        data
    }

    #[test]
    fn test_measure_server_messages() {
        // errors and events are always 32 bytes
        assert_eq!(
            measure_server_message(&[0u8], ByteOrder::LittleEndian).unwrap(),
            Some(32)
        );
        assert_eq!(
            measure_server_message(&[12u8], ByteOrder::LittleEndian).unwrap(),
            Some(32)
        );
        // replies read the extra-length field
        let mut data = reply_header(0, 1, 2);
        data.resize(40, 0);
        assert_eq!(
            measure_server_message(&data, ByteOrder::LittleEndian).unwrap(),
            Some(40)
        );
        assert_eq!(
            measure_server_message(&data[..6], ByteOrder::LittleEndian).unwrap(),
            None
        );
    }

    #[test]
    fn test_get_geometry_reply() {
        let s = settings();
        let mut conn = connection();
        conn.register_request(opcodes::window::GET_GEOMETRY).unwrap();

        let mut data = reply_header(24, 1, 0);
        data.extend_from_slice(&0x0000_0250u32.to_le_bytes()); // root
        data.extend_from_slice(&0i16.to_le_bytes()); // x
        data.extend_from_slice(&0i16.to_le_bytes()); // y
        data.extend_from_slice(&640u16.to_le_bytes());
        data.extend_from_slice(&480u16.to_le_bytes());
        data.extend_from_slice(&0u16.to_le_bytes()); // border-width
        data.resize(32, 0);

        let decoded = decode_server_message(&s, &mut conn, &data).unwrap();
        assert!(decoded.text.starts_with("GetGeometry reply seq=1:"));
        assert!(decoded.text.contains("depth=24"));
        assert!(decoded.text.contains("root=0x00000250"));
        assert!(decoded.text.contains("width=640"));
        assert!(decoded.text.contains("height=480"));
        assert!(decoded.patches.is_empty());
    }

    #[test]
    fn test_reply_without_request_is_invariant_violation() {
        let s = settings();
        let mut conn = connection();
        let mut data = reply_header(0, 7, 0);
        data.resize(32, 0);
        assert!(matches!(
            decode_server_message(&s, &mut conn, &data),
            Err(Error::Invariant(_))
        ));
    }

    #[test]
    fn test_intern_atom_reply_predefined_not_interned() {
        let s = settings();
        let mut conn = connection();
        conn.register_request(opcodes::atom::INTERN_ATOM).unwrap();
        conn.stash_intern_atom(1, "WM_NAME".into());

        let mut data = reply_header(0, 1, 0);
        data.extend_from_slice(&39u32.to_le_bytes());
        data.resize(32, 0);

        let decoded = decode_server_message(&s, &mut conn, &data).unwrap();
        assert!(decoded.text.contains("atom=\"WM_NAME\""));
        assert!(conn.interned_atoms().is_empty());
    }

    #[test]
    fn test_intern_atom_reply_custom_interned() {
        let s = settings();
        let mut conn = connection();
        conn.register_request(opcodes::atom::INTERN_ATOM).unwrap();
        conn.stash_intern_atom(1, "_MY_APP".into());

        let mut data = reply_header(0, 1, 0);
        data.extend_from_slice(&377u32.to_le_bytes());
        data.resize(32, 0);

        let decoded = decode_server_message(&s, &mut conn, &data).unwrap();
        assert!(decoded.text.contains("atom=\"_MY_APP\""));
        assert_eq!(
            conn.interned_atoms().get(&377).map(String::as_str),
            Some("_MY_APP")
        );
    }

    #[test]
    fn test_intern_atom_reply_zero_keeps_stash_out() {
        let s = settings();
        let mut conn = connection();
        conn.register_request(opcodes::atom::INTERN_ATOM).unwrap();
        conn.stash_intern_atom(1, "_MAYBE".into());

        let mut data = reply_header(0, 1, 0);
        data.extend_from_slice(&0u32.to_le_bytes());
        data.resize(32, 0);

        let decoded = decode_server_message(&s, &mut conn, &data).unwrap();
        assert!(decoded.text.contains("atom=None"));
        assert!(conn.interned_atoms().is_empty());
    }

    #[test]
    fn test_query_extension_deny_rewrites_present() {
        let s = Settings {
            deny_all_extensions: true,
            ..Settings::default()
        };
        let mut conn = connection();
        conn.register_request(opcodes::server::QUERY_EXTENSION).unwrap();
        conn.stash_query_extension(1, "MIT-SHM".into());

        let mut data = reply_header(0, 1, 0);
        data.push(1); // present
        data.push(130); // major-opcode
        data.push(64); // first-event
        data.push(128); // first-error
        data.resize(32, 0);

        let decoded = decode_server_message(&s, &mut conn, &data).unwrap();
        assert_eq!(decoded.patches, vec![(QUERY_EXTENSION_PRESENT_OFFSET, 0)]);
        assert!(decoded.text.contains("present=False"));
        // the other three fields are left intact
        assert!(decoded.text.contains("major-opcode=130"));
        assert!(decoded.text.contains("first-event=64"));
        assert!(decoded.text.contains("first-error=128"));
    }

    #[test]
    fn test_query_extension_records_big_requests_opcode() {
        let s = settings();
        let mut conn = connection();
        conn.register_request(opcodes::server::QUERY_EXTENSION).unwrap();
        conn.stash_query_extension(1, "BIG-REQUESTS".into());

        let mut data = reply_header(0, 1, 0);
        data.push(1);
        data.push(133);
        data.push(0);
        data.push(0);
        data.resize(32, 0);

        let decoded = decode_server_message(&s, &mut conn, &data).unwrap();
        assert!(decoded.patches.is_empty());
        assert_eq!(conn.big_requests_opcode, Some(133));
    }

    #[test]
    fn test_get_property_value_length() {
        let s = settings();
        let mut conn = connection();
        conn.register_request(opcodes::atom::GET_PROPERTY).unwrap();

        let mut data = reply_header(8, 1, 2); // format 8, 8 extra bytes
        data.extend_from_slice(&31u32.to_le_bytes()); // type STRING
        data.extend_from_slice(&0u32.to_le_bytes()); // bytes-after
        data.extend_from_slice(&5u32.to_le_bytes()); // five format units
        data.extend_from_slice(&[0; 12]);
        data.extend_from_slice(b"hello\0\0\0");
        assert_eq!(data.len(), 40);

        let decoded = decode_server_message(&s, &mut conn, &data).unwrap();
        assert!(decoded.text.contains("type=\"STRING\""));
        assert!(decoded.text.contains("value=\"hello\""));
    }

    #[test]
    fn test_list_fonts_with_info_terminal_reply() {
        let s = settings();
        let mut conn = connection();
        conn.register_request(opcodes::text::LIST_FONTS_WITH_INFO)
            .unwrap();

        let mut data = reply_header(0, 1, 7);
        data.resize(60, 0);
        let decoded = decode_server_message(&s, &mut conn, &data).unwrap();
        assert!(decoded.text.contains("last-reply=True"));
    }

    #[test]
    fn test_query_keymap_reply() {
        let s = settings();
        let mut conn = connection();
        conn.register_request(opcodes::input::QUERY_KEYMAP).unwrap();

        let mut data = reply_header(0, 1, 2);
        data.extend_from_slice(&[7u8; 32]);
        let decoded = decode_server_message(&s, &mut conn, &data).unwrap();
        assert!(decoded.text.starts_with("QueryKeymap reply seq=1:"));
        assert!(decoded.text.contains("keys="));
    }

    #[test]
    fn test_event_dispatches_through_server_entry() {
        let s = settings();
        let mut conn = connection();
        let mut data = [0u8; 32];
        data[0] = opcodes::event::MAPPING_NOTIFY;
        data[2..4].copy_from_slice(&4u16.to_le_bytes());
        data[4] = 1; // Keyboard
        let decoded = decode_server_message(&s, &mut conn, &data).unwrap();
        assert!(decoded.text.starts_with("MappingNotify event seq=4:"));
        assert!(decoded.text.contains("request=Keyboard"));
    }

    #[test]
    fn test_error_dispatches_through_server_entry() {
        let s = settings();
        let mut conn = connection();
        let mut data = [0u8; 32];
        data[1] = opcodes::error::WINDOW;
        data[2..4].copy_from_slice(&1u16.to_le_bytes());
        data[10] = opcodes::window::DESTROY_WINDOW;
        let decoded = decode_server_message(&s, &mut conn, &data).unwrap();
        assert!(decoded.text.contains("Window error"));
    }
}
