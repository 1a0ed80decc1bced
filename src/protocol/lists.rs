//! LIST parsing shared by the request, reply, and event decoders.
//!
//! Homogeneous lists read a fixed element count from their enclosing
//! message; heterogeneous lists (STR, HOST) carry per-member headers.
//! Dense numeric runs force single-line rendering regardless of the
//! configured style.

use std::collections::HashMap;

use crate::core::config::Settings;
use crate::protocol::{enum_names, pad, WireReader};
use crate::trace::format::{self, Record, Whitespace};
use crate::Result;

/// LISTofPOINT: `{ x=.. y=.. }` per member.
pub fn points(
    settings: &Settings,
    r: &mut WireReader<'_>,
    count: usize,
    ws: Whitespace,
) -> Result<String> {
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        let x = r.int16()?;
        let y = r.int16()?;
        let mut rec = Record::new(settings, ws.nested().single_line());
        rec.field("x", format::format_int(x));
        rec.field("y", format::format_int(y));
        items.push(rec.finish());
    }
    Ok(format::format_list(&items, ws))
}

/// LISTofSEGMENT.
pub fn segments(
    settings: &Settings,
    r: &mut WireReader<'_>,
    count: usize,
    ws: Whitespace,
) -> Result<String> {
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        let x1 = r.int16()?;
        let y1 = r.int16()?;
        let x2 = r.int16()?;
        let y2 = r.int16()?;
        let mut rec = Record::new(settings, ws.nested().single_line());
        rec.field("x1", format::format_int(x1));
        rec.field("y1", format::format_int(y1));
        rec.field("x2", format::format_int(x2));
        rec.field("y2", format::format_int(y2));
        items.push(rec.finish());
    }
    Ok(format::format_list(&items, ws))
}

/// LISTofRECTANGLE.
pub fn rectangles(
    settings: &Settings,
    r: &mut WireReader<'_>,
    count: usize,
    ws: Whitespace,
) -> Result<String> {
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        items.push(rectangle(settings, r, ws.nested())?);
    }
    Ok(format::format_list(&items, ws))
}

/// One RECTANGLE record.
pub fn rectangle(settings: &Settings, r: &mut WireReader<'_>, ws: Whitespace) -> Result<String> {
    let x = r.int16()?;
    let y = r.int16()?;
    let width = r.card16()?;
    let height = r.card16()?;
    let mut rec = Record::new(settings, ws.single_line());
    rec.field("x", format::format_int(x));
    rec.field("y", format::format_int(y));
    rec.field("width", format::format_card(width));
    rec.field("height", format::format_card(height));
    Ok(rec.finish())
}

/// LISTofARC.
pub fn arcs(
    settings: &Settings,
    r: &mut WireReader<'_>,
    count: usize,
    ws: Whitespace,
) -> Result<String> {
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        let x = r.int16()?;
        let y = r.int16()?;
        let width = r.card16()?;
        let height = r.card16()?;
        let angle1 = r.int16()?;
        let angle2 = r.int16()?;
        let mut rec = Record::new(settings, ws.nested().single_line());
        rec.field("x", format::format_int(x));
        rec.field("y", format::format_int(y));
        rec.field("width", format::format_card(width));
        rec.field("height", format::format_card(height));
        rec.field("angle1", format::format_int(angle1));
        rec.field("angle2", format::format_int(angle2));
        items.push(rec.finish());
    }
    Ok(format::format_list(&items, ws))
}

/// LISTofCARD8, forced single line.
pub fn card8_list(r: &mut WireReader<'_>, count: usize, ws: Whitespace) -> Result<String> {
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        items.push(r.card8()?.to_string());
    }
    Ok(format::format_list(&items, ws.single_line()))
}

/// LISTofCARD32 rendered in decimal.
pub fn card32_list(r: &mut WireReader<'_>, count: usize, ws: Whitespace) -> Result<String> {
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        items.push(r.card32()?.to_string());
    }
    Ok(format::format_list(&items, ws.single_line()))
}

/// LISTofCARD32 rendered as padded hex (pixels, plane masks).
pub fn card32_hex_list(r: &mut WireReader<'_>, count: usize, ws: Whitespace) -> Result<String> {
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        items.push(format::format_hex(r.card32()?, 4));
    }
    Ok(format::format_list(&items, ws.single_line()))
}

/// LISTofKEYSYM, hex per the keysym encoding appendix.
pub fn keysym_list(r: &mut WireReader<'_>, count: usize, ws: Whitespace) -> Result<String> {
    card32_hex_list(r, count, ws)
}

/// LISTofKEYCODE.
pub fn keycode_list(r: &mut WireReader<'_>, count: usize, ws: Whitespace) -> Result<String> {
    card8_list(r, count, ws)
}

/// List of resource ids (WINDOW, COLORMAP, ...).
pub fn resource_list(
    settings: &Settings,
    r: &mut WireReader<'_>,
    count: usize,
    ws: Whitespace,
) -> Result<String> {
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        items.push(format::format_resource(settings, r.card32()?, &[]));
    }
    Ok(format::format_list(&items, ws.single_line()))
}

/// LISTofATOM with per-session interned lookup.
pub fn atom_list(
    settings: &Settings,
    interned: &HashMap<u32, String>,
    r: &mut WireReader<'_>,
    count: usize,
    ws: Whitespace,
) -> Result<String> {
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        items.push(format::format_atom(settings, interned, r.card32()?, &[]));
    }
    Ok(format::format_list(&items, ws.single_line()))
}

/// LISTofSTR: each member is a length byte followed by that many
/// characters. The enclosing list is padded as a whole; members are not.
pub fn str_list(
    settings: &Settings,
    r: &mut WireReader<'_>,
    count: usize,
    ws: Whitespace,
) -> Result<String> {
    let mut items = Vec::with_capacity(count);
    let start = r.offset();
    for _ in 0..count {
        let len = r.card8()? as usize;
        let name = r.string8(len)?;
        let mut rec = Record::new(settings, ws.nested().single_line());
        rec.verbose_field("n", format::format_card(len as u64));
        rec.field("name", format!("{:?}", name));
        items.push(rec.finish());
    }
    r.skip_pad(r.offset() - start)?;
    Ok(format::format_list(&items, ws))
}

/// LISTofHOST: family byte, address length, padded address bytes.
pub fn host_list(
    settings: &Settings,
    r: &mut WireReader<'_>,
    count: usize,
    ws: Whitespace,
) -> Result<String> {
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        let family = r.card8()?;
        r.skip(1)?;
        let address_len = r.card16()? as usize;
        let address = card8_list(r, address_len, ws.nested())?;
        r.skip_pad(address_len)?;
        let mut rec = Record::new(settings, ws.nested());
        rec.field(
            "family",
            format::format_enum(settings, family, 1, enum_names::HOST_FAMILY),
        );
        rec.verbose_field("n", format::format_card(address_len as u64));
        rec.field("address", address);
        items.push(rec.finish());
    }
    Ok(format::format_list(&items, ws))
}

/// LISTofTIMECOORD from GetMotionEvents replies.
pub fn timecoord_list(
    settings: &Settings,
    r: &mut WireReader<'_>,
    count: usize,
    ws: Whitespace,
) -> Result<String> {
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        let time = r.card32()?;
        let x = r.int16()?;
        let y = r.int16()?;
        let mut rec = Record::new(settings, ws.nested().single_line());
        rec.field("time", format::format_timestamp(settings, time));
        rec.field("x", format::format_int(x));
        rec.field("y", format::format_int(y));
        items.push(rec.finish());
    }
    Ok(format::format_list(&items, ws))
}

/// STRING16: CHAR2B pairs, byte1 most significant. Text that fits in one
/// byte per character renders as a string; anything else as code points.
pub fn string16(r: &mut WireReader<'_>, count: usize) -> Result<String> {
    let bytes = r.bytes(count * 2)?;
    let codes: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| ((pair[0] as u16) << 8) | pair[1] as u16)
        .collect();
    if codes.iter().all(|&c| c < 0x100) {
        let narrow: Vec<u8> = codes.iter().map(|&c| c as u8).collect();
        Ok(format!("{:?}", String::from_utf8_lossy(&narrow)))
    } else {
        let rendered: Vec<String> = codes.iter().map(|c| format!("{:#06x}", c)).collect();
        Ok(format!("[ {} ]", rendered.join(", ")))
    }
}

/// Total padded size of a list of `count` elements of `element_sz` bytes.
pub fn padded_size(count: usize, element_sz: usize) -> usize {
    pad(count * element_sz)
}
