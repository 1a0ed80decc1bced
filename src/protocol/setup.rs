//! Connection-setup handshake decoding.
//!
//! The first client message is the initiation record; the first server
//! message is Failed, Success, or Authenticate. The initiation's byte-order
//! byte latches integer interpretation for the rest of the connection.
//! After this exchange both directions enter the message-stream phase.

use crate::core::config::Settings;
use crate::protocol::{enum_names, pad, ByteOrder, WireReader};
use crate::proxy::connection::Connection;
use crate::trace::format::{self, Record, Whitespace};
use crate::{Error, Result};

/// Fixed prefix of the client initiation record.
pub const INITIATION_HEADER_SZ: usize = 12;
/// Fixed prefix of every server setup response.
pub const SETUP_RESPONSE_HEADER_SZ: usize = 8;

/// Server setup response status byte.
pub mod status {
    pub const FAILED: u8 = 0;
    pub const SUCCESS: u8 = 1;
    pub const AUTHENTICATE: u8 = 2;
}

/// Total size of the client initiation once its header is visible;
/// `None` until 12 bytes have arrived.
pub fn measure_initiation(data: &[u8]) -> Result<Option<usize>> {
    if data.len() < INITIATION_HEADER_SZ {
        return Ok(None);
    }
    let byte_order = ByteOrder::from_initiation_byte(data[0]).ok_or_else(|| {
        Error::Protocol(format!("bad byte-order byte {:#04x} in initiation", data[0]))
    })?;
    let mut r = WireReader::new(data, byte_order);
    r.skip(6)?; // byte-order byte, unused, protocol versions
    let name_len = r.card16()? as usize;
    let data_len = r.card16()? as usize;
    Ok(Some(INITIATION_HEADER_SZ + pad(name_len) + pad(data_len)))
}

/// Decode the client initiation, latching the connection byte order.
pub fn decode_initiation(
    settings: &Settings,
    conn: &mut Connection,
    data: &[u8],
) -> Result<String> {
    let byte_order = ByteOrder::from_initiation_byte(data[0]).ok_or_else(|| {
        Error::Protocol(format!("bad byte-order byte {:#04x} in initiation", data[0]))
    })?;
    conn.byte_order = byte_order;

    let mut r = WireReader::new(data, byte_order);
    r.skip(2)?; // byte-order byte, unused
    let major = r.card16()?;
    let minor = r.card16()?;
    let name_len = r.card16()? as usize;
    let data_len = r.card16()? as usize;
    r.skip(2)?; // unused
    let auth_name = r.string8(name_len)?;
    r.skip_pad(name_len)?;
    // authorization data may not be printable; only its size is traced
    r.skip(data_len)?;
    r.skip_pad(data_len)?;

    let ws = Whitespace::root(settings.multiline);
    let mut rec = Record::new(settings, ws);
    rec.field(
        "byte-order",
        format_enum_byte_order(settings, byte_order),
    );
    if settings.verbose {
        rec.field("protocol-major-version", format::format_card(major));
        rec.field("protocol-minor-version", format::format_card(minor));
        rec.field("n", format::format_card(name_len as u64));
    } else {
        rec.field("protocol version", format!("{}.{}", major, minor));
    }
    rec.field("authorization-protocol-name", format!("{:?}", auth_name));
    rec.verbose_field("d", format::format_card(data_len as u64));
    rec.field(
        "authorization-protocol-data",
        format!("({} bytes)", data_len),
    );
    Ok(format!(
        "client {:?} attempting connection: {}",
        conn.client_desc,
        rec.finish()
    ))
}

fn format_enum_byte_order(settings: &Settings, byte_order: ByteOrder) -> String {
    let index = match byte_order {
        ByteOrder::LittleEndian => 0u8,
        ByteOrder::BigEndian => 1,
    };
    format::format_enum(settings, index, 1, enum_names::IMAGE_BYTE_ORDER)
}

/// Total size of the server setup response once its 8-byte prefix is
/// visible.
pub fn measure_setup_response(data: &[u8], byte_order: ByteOrder) -> Result<Option<usize>> {
    if data.len() < SETUP_RESPONSE_HEADER_SZ {
        return Ok(None);
    }
    match data[0] {
        status::FAILED | status::SUCCESS | status::AUTHENTICATE => {}
        other => {
            return Err(Error::Protocol(format!(
                "bad setup response status {:#04x}",
                other
            )))
        }
    }
    let mut r = WireReader::new(data, byte_order);
    r.skip(6)?;
    let extra_len = r.card16()? as usize;
    Ok(Some(SETUP_RESPONSE_HEADER_SZ + extra_len * 4))
}

/// Decode the server's Failed/Success/Authenticate response.
pub fn decode_setup_response(
    settings: &Settings,
    conn: &Connection,
    data: &[u8],
) -> Result<String> {
    match data[0] {
        status::FAILED => decode_refusal(settings, conn, data),
        status::SUCCESS => decode_acceptance(settings, conn, data),
        status::AUTHENTICATE => decode_authenticate(settings, conn, data),
        other => Err(Error::Protocol(format!(
            "bad setup response status {:#04x}",
            other
        ))),
    }
}

fn decode_refusal(settings: &Settings, conn: &Connection, data: &[u8]) -> Result<String> {
    let mut r = WireReader::new(data, conn.byte_order);
    r.skip(1)?;
    let reason_len = r.card8()? as usize;
    let major = r.card16()?;
    let minor = r.card16()?;
    let extra_len = r.card16()?;
    let reason = r.string8(reason_len)?;

    let ws = Whitespace::root(settings.multiline);
    let mut rec = Record::new(settings, ws);
    rec.verbose_field("n", format::format_card(reason_len as u64));
    rec.field("protocol-major-version", format::format_card(major));
    rec.field("protocol-minor-version", format::format_card(minor));
    rec.verbose_field("length", format::format_card(extra_len));
    rec.field("reason", format!("{:?}", reason));
    Ok(format!(
        "server {:?} refused connection: {}",
        conn.server_desc,
        rec.finish()
    ))
}

fn decode_authenticate(settings: &Settings, conn: &Connection, data: &[u8]) -> Result<String> {
    let mut r = WireReader::new(data, conn.byte_order);
    r.skip(6)?;
    let extra_len = r.card16()? as usize;
    let reason = r.string8(extra_len * 4)?;
    let reason = reason.trim_end_matches('\0').to_string();

    let ws = Whitespace::root(settings.multiline);
    let mut rec = Record::new(settings, ws);
    rec.verbose_field("length", format::format_card(extra_len as u64));
    rec.field("reason", format!("{:?}", reason));
    Ok(format!(
        "server requests further authentication: {}",
        rec.finish()
    ))
}

fn decode_acceptance(settings: &Settings, conn: &Connection, data: &[u8]) -> Result<String> {
    let mut r = WireReader::new(data, conn.byte_order);
    r.skip(2)?;
    let major = r.card16()?;
    let minor = r.card16()?;
    let extra_len = r.card16()?;
    let release_number = r.card32()?;
    let resource_id_base = r.card32()?;
    let resource_id_mask = r.card32()?;
    let motion_buffer_size = r.card32()?;
    let vendor_len = r.card16()? as usize;
    let maximum_request_length = r.card16()?;
    let screen_ct = r.card8()? as usize;
    let format_ct = r.card8()? as usize;
    let image_byte_order = r.card8()?;
    let bitmap_format_bit_order = r.card8()?;
    let bitmap_format_scanline_unit = r.card8()?;
    let bitmap_format_scanline_pad = r.card8()?;
    let min_keycode = r.card8()?;
    let max_keycode = r.card8()?;
    r.skip(4)?;
    let vendor = r.string8(vendor_len)?;
    r.skip_pad(vendor_len)?;

    let ws = Whitespace::root(settings.multiline);
    let formats = parse_format_list(settings, &mut r, format_ct, ws.nested())?;
    let screens = parse_screen_list(settings, &mut r, screen_ct, ws.nested())?;

    let mut rec = Record::new(settings, ws);
    rec.field("protocol-major-version", format::format_card(major));
    rec.field("protocol-minor-version", format::format_card(minor));
    rec.verbose_field("length", format::format_card(extra_len));
    rec.field("release-number", format::format_card(release_number));
    rec.field("resource-id-base", format::format_hex(resource_id_base, 4));
    rec.field("resource-id-mask", format::format_hex(resource_id_mask, 4));
    rec.field("motion-buffer-size", format::format_card(motion_buffer_size));
    rec.verbose_field("v", format::format_card(vendor_len as u64));
    rec.field(
        "maximum-request-length",
        format::format_card(maximum_request_length),
    );
    rec.verbose_field("number of SCREENs in roots", format::format_card(screen_ct as u64));
    rec.verbose_field(
        "number of FORMATs in pixmap-formats",
        format::format_card(format_ct as u64),
    );
    rec.field(
        "image-byte-order",
        format::format_enum(settings, image_byte_order, 1, enum_names::IMAGE_BYTE_ORDER),
    );
    rec.field(
        "bitmap-format-bit-order",
        format::format_enum(
            settings,
            bitmap_format_bit_order,
            1,
            enum_names::BITMAP_FORMAT_BIT_ORDER,
        ),
    );
    rec.field(
        "bitmap-format-scanline-unit",
        format::format_card(bitmap_format_scanline_unit),
    );
    rec.field(
        "bitmap-format-scanline-pad",
        format::format_card(bitmap_format_scanline_pad),
    );
    rec.field("min-keycode", format::format_card(min_keycode));
    rec.field("max-keycode", format::format_card(max_keycode));
    rec.field("vendor", format!("{:?}", vendor));
    rec.field("pixmap-formats", formats);
    rec.field("roots", screens);
    Ok(format!(
        "server {:?} accepted connection: {}",
        conn.server_desc,
        rec.finish()
    ))
}

fn parse_format_list(
    settings: &Settings,
    r: &mut WireReader<'_>,
    count: usize,
    ws: Whitespace,
) -> Result<String> {
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        let depth = r.card8()?;
        let bits_per_pixel = r.card8()?;
        let scanline_pad = r.card8()?;
        r.skip(5)?;
        let mut rec = Record::new(settings, ws.nested().single_line());
        rec.field("depth", format::format_card(depth));
        rec.field("bits-per-pixel", format::format_card(bits_per_pixel));
        rec.field("scanline-pad", format::format_card(scanline_pad));
        items.push(rec.finish());
    }
    Ok(format::format_list(&items, ws))
}

fn parse_screen_list(
    settings: &Settings,
    r: &mut WireReader<'_>,
    count: usize,
    ws: Whitespace,
) -> Result<String> {
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        items.push(parse_screen(settings, r, ws.nested())?);
    }
    Ok(format::format_list(&items, ws))
}

fn parse_screen(settings: &Settings, r: &mut WireReader<'_>, ws: Whitespace) -> Result<String> {
    let root = r.card32()?;
    let default_colormap = r.card32()?;
    let white_pixel = r.card32()?;
    let black_pixel = r.card32()?;
    let current_input_masks = r.card32()?;
    let width_px = r.card16()?;
    let height_px = r.card16()?;
    let width_mm = r.card16()?;
    let height_mm = r.card16()?;
    let min_installed_maps = r.card16()?;
    let max_installed_maps = r.card16()?;
    let root_visual = r.card32()?;
    let backing_stores = r.card8()?;
    let save_unders = r.card8()?;
    let root_depth = r.card8()?;
    let depth_ct = r.card8()? as usize;

    let allowed_depths = parse_depth_list(settings, r, depth_ct, ws.nested())?;

    let mut rec = Record::new(settings, ws);
    rec.field("root", format::format_resource(settings, root, &[]));
    rec.field(
        "default-colormap",
        format::format_resource(settings, default_colormap, &[]),
    );
    rec.field("white-pixel", format::format_hex(white_pixel, 4));
    rec.field("black-pixel", format::format_hex(black_pixel, 4));
    rec.field(
        "current-input-masks",
        format::format_bitmask(settings, current_input_masks, 4, enum_names::SET_OF_EVENT),
    );
    rec.field("width-in-pixels", format::format_card(width_px));
    rec.field("height-in-pixels", format::format_card(height_px));
    rec.field("width-in-millimeters", format::format_card(width_mm));
    rec.field("height-in-millimeters", format::format_card(height_mm));
    rec.field("min-installed-maps", format::format_card(min_installed_maps));
    rec.field("max-installed-maps", format::format_card(max_installed_maps));
    rec.field(
        "root-visual",
        format::format_resource(settings, root_visual, &[]),
    );
    rec.field(
        "backing-stores",
        format::format_enum(settings, backing_stores, 1, enum_names::SCREEN_BACKING_STORES),
    );
    rec.field("save-unders", format::format_bool(settings, save_unders));
    rec.field("root-depth", format::format_card(root_depth));
    rec.verbose_field(
        "number of DEPTHs in allowed-depths",
        format::format_card(depth_ct as u64),
    );
    rec.field("allowed-depths", allowed_depths);
    Ok(rec.finish())
}

fn parse_depth_list(
    settings: &Settings,
    r: &mut WireReader<'_>,
    count: usize,
    ws: Whitespace,
) -> Result<String> {
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        let depth = r.card8()?;
        r.skip(1)?;
        let visual_ct = r.card16()? as usize;
        r.skip(4)?;
        let visuals = parse_visual_list(settings, r, visual_ct, ws.nested().nested())?;

        let mut rec = Record::new(settings, ws.nested());
        rec.field("depth", format::format_card(depth));
        rec.verbose_field(
            "number of VISUALTYPEs in visuals",
            format::format_card(visual_ct as u64),
        );
        rec.field("visuals", visuals);
        items.push(rec.finish());
    }
    Ok(format::format_list(&items, ws))
}

fn parse_visual_list(
    settings: &Settings,
    r: &mut WireReader<'_>,
    count: usize,
    ws: Whitespace,
) -> Result<String> {
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        let visual_id = r.card32()?;
        let class = r.card8()?;
        let bits_per_rgb_value = r.card8()?;
        let colormap_entries = r.card16()?;
        let red_mask = r.card32()?;
        let green_mask = r.card32()?;
        let blue_mask = r.card32()?;
        r.skip(4)?;

        let mut rec = Record::new(settings, ws.nested().single_line());
        rec.field("visual-id", format::format_resource(settings, visual_id, &[]));
        rec.field(
            "class",
            format::format_enum(settings, class, 1, enum_names::VISUALTYPE_CLASS),
        );
        rec.field("bits-per-rgb-value", format::format_card(bits_per_rgb_value));
        rec.field("colormap-entries", format::format_card(colormap_entries));
        rec.field("red-mask", format::format_hex(red_mask, 4));
        rec.field("green-mask", format::format_hex(green_mask, 4));
        rec.field("blue-mask", format::format_hex(blue_mask, 4));
        items.push(rec.finish());
    }
    Ok(format::format_list(&items, ws))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn initiation_bytes(name: &str, auth: &[u8]) -> Vec<u8> {
        let mut data = vec![b'l', 0, 11, 0, 0, 0];
        data.extend_from_slice(&(name.len() as u16).to_le_bytes());
        data.extend_from_slice(&(auth.len() as u16).to_le_bytes());
        data.extend_from_slice(&[0, 0]);
        data.extend_from_slice(name.as_bytes());
        data.resize(data.len() + (pad(name.len()) - name.len()), 0);
        data.extend_from_slice(auth);
        data.resize(data.len() + (pad(auth.len()) - auth.len()), 0);
        data
    }

    #[test]
    fn test_measure_initiation() {
        let data = initiation_bytes("MIT-MAGIC-COOKIE-1", &[0xAB; 16]);
        assert_eq!(measure_initiation(&data).unwrap(), Some(12 + 20 + 16));
        assert_eq!(measure_initiation(&data[..8]).unwrap(), None);
        assert!(measure_initiation(&[b'x'; 12]).is_err());
    }

    #[test]
    fn test_decode_initiation_latches_byte_order() {
        let settings = Settings::default();
        let mut conn = Connection::new("client".into(), "server".into());
        let data = initiation_bytes("MIT-MAGIC-COOKIE-1", &[0xAB; 16]);
        let text = decode_initiation(&settings, &mut conn, &data).unwrap();
        assert_eq!(conn.byte_order, ByteOrder::LittleEndian);
        assert!(text.contains("MIT-MAGIC-COOKIE-1"));
        assert!(text.contains("11.0"));
        assert!(text.contains("(16 bytes)"));
    }

    #[test]
    fn test_measure_setup_response() {
        // Failed response with a 4-byte reason: extra length 1
        let data = [0u8, 4, 11, 0, 0, 0, 1, 0];
        assert_eq!(
            measure_setup_response(&data, ByteOrder::LittleEndian).unwrap(),
            Some(12)
        );
        assert_eq!(
            measure_setup_response(&data[..4], ByteOrder::LittleEndian).unwrap(),
            None
        );
        let bad = [9u8, 0, 0, 0, 0, 0, 0, 0];
        assert!(measure_setup_response(&bad, ByteOrder::LittleEndian).is_err());
    }

    #[test]
    fn test_decode_refusal() {
        let settings = Settings::default();
        let conn = Connection::new("client".into(), "server".into());
        let mut data = vec![0u8, 6, 11, 0, 0, 0, 2, 0];
        data.extend_from_slice(b"denied\0\0");
        let text = decode_setup_response(&settings, &conn, &data).unwrap();
        assert!(text.contains("refused"));
        assert!(text.contains("denied"));
    }

    #[test]
    fn test_decode_acceptance_with_screen_tree() {
        let settings = Settings::default();
        let mut conn = Connection::new("client".into(), "server".into());
        conn.byte_order = ByteOrder::LittleEndian;

        let mut body: Vec<u8> = Vec::new();
        body.extend_from_slice(&11u16.to_le_bytes()); // protocol-major
        body.extend_from_slice(&0u16.to_le_bytes()); // protocol-minor
        let extra_len_slot = body.len();
        body.extend_from_slice(&0u16.to_le_bytes()); // patched below
        body.extend_from_slice(&12000000u32.to_le_bytes()); // release
        body.extend_from_slice(&0x00400000u32.to_le_bytes()); // id base
        body.extend_from_slice(&0x001FFFFFu32.to_le_bytes()); // id mask
        body.extend_from_slice(&256u32.to_le_bytes()); // motion buffer
        body.extend_from_slice(&4u16.to_le_bytes()); // vendor length
        body.extend_from_slice(&65535u16.to_le_bytes()); // max request length
        body.push(1); // screens
        body.push(1); // formats
        body.push(0); // image-byte-order LSBFirst
        body.push(0); // bit order
        body.push(32); // scanline unit
        body.push(32); // scanline pad
        body.push(8); // min keycode
        body.push(255); // max keycode
        body.extend_from_slice(&[0; 4]);
        body.extend_from_slice(b"ACME"); // vendor, already 4-aligned
        body.extend_from_slice(&[24, 32, 32, 0, 0, 0, 0, 0]); // one FORMAT
        // one SCREEN with one DEPTH holding one VISUALTYPE
        body.extend_from_slice(&0x250u32.to_le_bytes()); // root
        body.extend_from_slice(&0x22u32.to_le_bytes()); // default colormap
        body.extend_from_slice(&0xFFFFFFu32.to_le_bytes()); // white
        body.extend_from_slice(&0u32.to_le_bytes()); // black
        body.extend_from_slice(&0u32.to_le_bytes()); // input masks
        body.extend_from_slice(&1920u16.to_le_bytes());
        body.extend_from_slice(&1080u16.to_le_bytes());
        body.extend_from_slice(&508u16.to_le_bytes());
        body.extend_from_slice(&286u16.to_le_bytes());
        body.extend_from_slice(&1u16.to_le_bytes()); // min maps
        body.extend_from_slice(&1u16.to_le_bytes()); // max maps
        body.extend_from_slice(&0x21u32.to_le_bytes()); // root visual
        body.push(2); // backing-stores Always
        body.push(0); // save-unders False
        body.push(24); // root depth
        body.push(1); // depth count
        body.push(24); // DEPTH.depth
        body.push(0);
        body.extend_from_slice(&1u16.to_le_bytes()); // visual count
        body.extend_from_slice(&[0; 4]);
        body.extend_from_slice(&0x21u32.to_le_bytes()); // visual id
        body.push(4); // TrueColor
        body.push(8); // bits per rgb
        body.extend_from_slice(&256u16.to_le_bytes());
        body.extend_from_slice(&0xFF0000u32.to_le_bytes());
        body.extend_from_slice(&0x00FF00u32.to_le_bytes());
        body.extend_from_slice(&0x0000FFu32.to_le_bytes());
        body.extend_from_slice(&[0; 4]);

        assert_eq!(body.len() % 4, 0);
        let extra_len = (body.len() / 4) as u16;
        body[extra_len_slot..extra_len_slot + 2].copy_from_slice(&extra_len.to_le_bytes());

        let mut data = vec![1u8, 0];
        data.extend_from_slice(&body);
        // measure sees the full frame
        assert_eq!(
            measure_setup_response(&data, ByteOrder::LittleEndian).unwrap(),
            Some(data.len())
        );

        let text = decode_setup_response(&settings, &conn, &data).unwrap();
        assert!(text.contains("accepted"));
        assert!(text.contains("\"ACME\""));
        assert!(text.contains("TrueColor"));
        assert!(text.contains("root=0x00000250"));
        assert!(text.contains("width-in-pixels=1920"));
    }
}
