//! Shared rendering utilities for decoded protocol values.
//!
//! One formatter serves every decoder: integers carry an optional enum-name
//! table, bitmasks a flag-name table, and nested records a [`Whitespace`]
//! context that keeps recursive rendering consistent across structures.

use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat};

use crate::core::config::Settings;
use crate::protocol::{atoms, enum_names, types};

/// Indentation and separator discipline threaded through nested records.
///
/// A single-line context renders `{ a=1 b=2 }`; a multiline context puts one
/// member per line, indenting members one level past the enclosure. Dense
/// arrays (key bit-vectors, raw byte runs) force single-line rendering no
/// matter the configured style.
#[derive(Debug, Clone, Copy)]
pub struct Whitespace {
    multiline: bool,
    depth: usize,
}

const INDENT_UNIT: &str = "  ";

impl Whitespace {
    pub fn root(multiline: bool) -> Self {
        Self {
            multiline,
            depth: 0,
        }
    }

    /// Context for a record nested one level deeper.
    pub fn nested(&self) -> Self {
        Self {
            multiline: self.multiline,
            depth: self.depth + 1,
        }
    }

    /// Same depth, forced onto one line.
    pub fn single_line(&self) -> Self {
        Self {
            multiline: false,
            depth: self.depth,
        }
    }

    pub fn is_multiline(&self) -> bool {
        self.multiline
    }

    fn separator(&self) -> &'static str {
        if self.multiline {
            "\n"
        } else {
            " "
        }
    }

    fn member_indent(&self) -> String {
        if self.multiline {
            INDENT_UNIT.repeat(self.depth + 1)
        } else {
            String::new()
        }
    }

    fn enclosure_indent(&self) -> String {
        if self.multiline {
            INDENT_UNIT.repeat(self.depth)
        } else {
            String::new()
        }
    }
}

/// Accumulates `name=value` members and renders a brace-enclosed record.
pub struct Record<'s> {
    settings: &'s Settings,
    ws: Whitespace,
    members: Vec<(String, String)>,
}

impl<'s> Record<'s> {
    pub fn new(settings: &'s Settings, ws: Whitespace) -> Self {
        Self {
            settings,
            ws,
            members: Vec::new(),
        }
    }

    pub fn field(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        self.members.push((name.to_string(), value.into()));
        self
    }

    /// Hidden protocol counters (length fields, unused slots) render only
    /// under verbose.
    pub fn verbose_field(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        if self.settings.verbose {
            self.field(name, value);
        }
        self
    }

    pub fn ws(&self) -> Whitespace {
        self.ws
    }

    pub fn finish(self) -> String {
        if self.members.is_empty() {
            return "{ }".to_string();
        }
        let sep = self.ws.separator();
        let memb = self.ws.member_indent();
        let mut out = String::from("{");
        for (name, value) in &self.members {
            out.push_str(sep);
            out.push_str(&memb);
            out.push_str(name);
            out.push('=');
            out.push_str(value);
        }
        out.push_str(sep);
        out.push_str(&self.ws.enclosure_indent());
        out.push('}');
        out
    }
}

/// Render a homogeneous list with the given context: `[ a, b ]` on one line
/// or one member per line when multiline.
pub fn format_list(items: &[String], ws: Whitespace) -> String {
    if items.is_empty() {
        return "[ ]".to_string();
    }
    if !ws.is_multiline() {
        return format!("[ {} ]", items.join(", "));
    }
    let memb = ws.member_indent();
    let mut out = String::from("[");
    for item in items {
        out.push('\n');
        out.push_str(&memb);
        out.push_str(item);
    }
    out.push('\n');
    out.push_str(&ws.enclosure_indent());
    out.push(']');
    out
}

fn hex(value: u64, width_bytes: usize) -> String {
    format!("{:#0width$x}", value, width = width_bytes * 2 + 2)
}

/// Decimal rendering of an unsigned field.
pub fn format_card(value: impl Into<u64>) -> String {
    value.into().to_string()
}

/// Decimal rendering of a signed field.
pub fn format_int(value: impl Into<i64>) -> String {
    value.into().to_string()
}

/// Padded hex rendering, for resource ids, plane masks, and keysyms.
pub fn format_hex(value: impl Into<u64>, width_bytes: usize) -> String {
    hex(value.into(), width_bytes)
}

/// Integer carrying an enum-name table. Values covered by the table render
/// as the name (hex-annotated under verbose); uncovered values render as
/// plain decimal.
pub fn format_enum(
    settings: &Settings,
    value: impl Into<u64>,
    width_bytes: usize,
    names: &[&str],
) -> String {
    let value = value.into();
    match names.get(value as usize) {
        Some(name) if !name.is_empty() => {
            if settings.verbose {
                format!("{}({})", hex(value, width_bytes), name)
            } else {
                (*name).to_string()
            }
        }
        _ => value.to_string(),
    }
}

/// Resource id (WINDOW, PIXMAP, CURSOR, ...). Small sentinel values covered
/// by `zero_names` render by name; everything else is padded hex.
pub fn format_resource(settings: &Settings, value: u32, zero_names: &[&str]) -> String {
    if (value as usize) < zero_names.len() {
        return format_enum(settings, value, 4, zero_names);
    }
    hex(value as u64, 4)
}

/// Pipe-separated enabled flag names; verbose also prints the hex literal.
pub fn format_bitmask(
    settings: &Settings,
    value: impl Into<u64>,
    width_bytes: usize,
    flag_names: &[&str],
) -> String {
    let value = value.into();
    let mut names = Vec::new();
    for (i, name) in flag_names.iter().enumerate() {
        if value & (1 << i) != 0 {
            names.push(*name);
        }
    }
    let joined = names.join("|");
    if settings.verbose {
        if joined.is_empty() {
            hex(value, width_bytes)
        } else {
            format!("{}({})", hex(value, width_bytes), joined)
        }
    } else if joined.is_empty() {
        "0".to_string()
    } else {
        joined
    }
}

/// SETofKEYMASK with the AnyModifier sentinel honored before flag expansion.
pub fn format_keymask(settings: &Settings, value: u16) -> String {
    if value == types::ANY_MODIFIER {
        if settings.verbose {
            return format!("{}({})", hex(value as u64, 2), enum_names::ANY_MODIFIER);
        }
        return enum_names::ANY_MODIFIER.to_string();
    }
    format_bitmask(settings, value, 2, enum_names::SET_OF_KEYBUTMASK)
}

/// TIMESTAMP: hex literal; 0 renders `CurrentTime`; with a relative anchor
/// configured, an RFC 3339 UTC annotation derived from
/// `(t - ref_tick) / 1000 + ref_unix_time`.
pub fn format_timestamp(settings: &Settings, tick: u32) -> String {
    let hex_str = hex(tick as u64, 4);
    if tick == 0 {
        if settings.verbose {
            return format!("{}(CurrentTime)", hex_str);
        }
        return "CurrentTime".to_string();
    }
    if settings.relative_timestamps {
        const TICKS_PER_SEC: u32 = 1000;
        let unix = (tick.wrapping_sub(settings.anchor.ref_timestamp) / TICKS_PER_SEC) as i64
            + settings.anchor.ref_unix_time;
        if let Some(when) = DateTime::from_timestamp(unix, 0) {
            return format!(
                "{}({})",
                hex_str,
                when.to_rfc3339_opts(SecondsFormat::Secs, true)
            );
        }
    }
    hex_str
}

/// ATOM: interned lookup first, then the predefined range, then
/// "unrecognized atom". Sentinel values covered by `zero_names`
/// (`None`, `AnyPropertyType`) render by name.
pub fn format_atom(
    settings: &Settings,
    interned: &HashMap<u32, String>,
    id: u32,
    zero_names: &[&str],
) -> String {
    if (id as usize) < zero_names.len() {
        return format_enum(settings, id, 4, zero_names);
    }
    let name = interned
        .get(&id)
        .map(|name| format!("{:?}", name))
        .or_else(|| atoms::predefined_name(id).map(|name| format!("{:?}", name)));
    match name {
        Some(name) if settings.verbose => format!("{}({})", hex(id as u64, 4), name),
        Some(name) => name,
        None if settings.verbose => format!("{}(unrecognized atom)", hex(id as u64, 4)),
        None => "unrecognized atom".to_string(),
    }
}

/// BOOL with the protocol's False/True names.
pub fn format_bool(settings: &Settings, value: u8) -> String {
    format_enum(settings, value, 1, enum_names::BOOL)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings::default()
    }

    fn verbose_settings() -> Settings {
        Settings {
            verbose: true,
            ..Settings::default()
        }
    }

    #[test]
    fn test_record_single_line() {
        let s = settings();
        let mut rec = Record::new(&s, Whitespace::root(false));
        rec.field("x", "1").field("y", "2");
        assert_eq!(rec.finish(), "{ x=1 y=2 }");
    }

    #[test]
    fn test_record_multiline() {
        let s = settings();
        let mut rec = Record::new(&s, Whitespace::root(true));
        rec.field("x", "1").field("y", "2");
        assert_eq!(rec.finish(), "{\n  x=1\n  y=2\n}");
    }

    #[test]
    fn test_record_verbose_fields_hidden() {
        let s = settings();
        let mut rec = Record::new(&s, Whitespace::root(false));
        rec.verbose_field("sequence number", "7").field("depth", "24");
        assert_eq!(rec.finish(), "{ depth=24 }");

        let v = verbose_settings();
        let mut rec = Record::new(&v, Whitespace::root(false));
        rec.verbose_field("sequence number", "7").field("depth", "24");
        assert_eq!(rec.finish(), "{ sequence number=7 depth=24 }");
    }

    #[test]
    fn test_enum_rendering() {
        let s = settings();
        assert_eq!(format_enum(&s, 1u8, 1, enum_names::BOOL), "True");
        assert_eq!(format_enum(&s, 5u8, 1, enum_names::BOOL), "5");

        let v = verbose_settings();
        assert_eq!(format_enum(&v, 1u8, 1, enum_names::BOOL), "0x01(True)");
    }

    #[test]
    fn test_resource_rendering() {
        let s = settings();
        assert_eq!(format_resource(&s, 0x12345678, &[]), "0x12345678");
        assert_eq!(format_resource(&s, 0, enum_names::ZERO_NONE), "None");
        assert_eq!(
            format_resource(&s, 0x250, enum_names::ZERO_NONE),
            "0x00000250"
        );
    }

    #[test]
    fn test_bitmask_rendering() {
        let s = settings();
        assert_eq!(
            format_bitmask(&s, 0b101u32, 2, enum_names::SET_OF_KEYBUTMASK),
            "Shift|Control"
        );
        assert_eq!(format_bitmask(&s, 0u32, 2, enum_names::SET_OF_KEYBUTMASK), "0");

        let v = verbose_settings();
        assert_eq!(
            format_bitmask(&v, 0b101u32, 2, enum_names::SET_OF_KEYBUTMASK),
            "0x0005(Shift|Control)"
        );
    }

    #[test]
    fn test_keymask_any_modifier() {
        let s = settings();
        assert_eq!(format_keymask(&s, 0x8000), "AnyModifier");
        assert_eq!(format_keymask(&s, 0x0001), "Shift");

        let v = verbose_settings();
        assert_eq!(format_keymask(&v, 0x8000), "0x8000(AnyModifier)");
    }

    #[test]
    fn test_timestamp_current_time() {
        let s = settings();
        assert_eq!(format_timestamp(&s, 0), "CurrentTime");
        assert_eq!(format_timestamp(&s, 0x1234), "0x00001234");
    }

    #[test]
    fn test_timestamp_relative() {
        let mut s = settings();
        s.relative_timestamps = true;
        s.anchor.ref_timestamp = 0;
        s.anchor.ref_unix_time = 1_700_000_000;
        // 2000 ticks = 2 seconds past the anchor
        let rendered = format_timestamp(&s, 2000);
        assert!(rendered.starts_with("0x000007d0("));
        assert!(rendered.contains("2023-11-14T22:13:22"));
    }

    #[test]
    fn test_atom_lookup_order() {
        let s = settings();
        let mut interned = HashMap::new();
        assert_eq!(format_atom(&s, &interned, 39, &[]), "\"WM_NAME\"");
        assert_eq!(format_atom(&s, &interned, 377, &[]), "unrecognized atom");

        interned.insert(377, "_MY_APP".to_string());
        assert_eq!(format_atom(&s, &interned, 377, &[]), "\"_MY_APP\"");

        let v = verbose_settings();
        assert_eq!(
            format_atom(&v, &interned, 377, &[]),
            "0x00000179(\"_MY_APP\")"
        );
    }

    #[test]
    fn test_list_rendering() {
        let items = vec!["1".to_string(), "2".to_string()];
        assert_eq!(format_list(&items, Whitespace::root(false)), "[ 1, 2 ]");
        assert_eq!(format_list(&items, Whitespace::root(true)), "[\n  1\n  2\n]");
        assert_eq!(format_list(&[], Whitespace::root(true)), "[ ]");
    }
}
