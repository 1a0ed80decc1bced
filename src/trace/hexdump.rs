//! Diagnostic hex dump of raw message bytes, printed when a message fails
//! to decode and `dump_malformed` is set.

const BYTES_PER_ROW: usize = 16;
const BYTES_PER_GROUP: usize = 8;

/// 16 bytes per row in two 8-byte groups with a printable-ASCII gutter.
pub fn hex_dump(data: &[u8]) -> String {
    let mut out = String::new();
    for (row, chunk) in data.chunks(BYTES_PER_ROW).enumerate() {
        let (group1, group2) = chunk.split_at(chunk.len().min(BYTES_PER_GROUP));
        let fmt_group = |bytes: &[u8]| {
            bytes
                .iter()
                .map(|b| format!("{:02x}", b))
                .collect::<Vec<_>>()
                .join(" ")
        };
        let ascii: String = chunk
            .iter()
            .map(|&b| {
                if b.is_ascii_graphic() || b == b' ' {
                    b as char
                } else {
                    '.'
                }
            })
            .collect();
        out.push_str(&format!(
            "{:08x}  {: <23}  {: <23}  {}\n",
            row * BYTES_PER_ROW,
            fmt_group(group1),
            fmt_group(group2),
            ascii
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_dump_layout() {
        let data: Vec<u8> = (0..20).collect();
        let dump = hex_dump(&data);
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("00000000  00 01 02 03 04 05 06 07"));
        assert!(lines[1].starts_with("00000010  10 11 12 13"));
    }

    #[test]
    fn test_hex_dump_ascii_gutter() {
        let dump = hex_dump(b"hello\x01world");
        assert!(dump.contains("hello.world"));
    }
}
