// Mon Oct 19 2026 - Alex

use std::fmt::Write;

pub fn format_bytes(data: &[u8]) -> String {
    let mut result = String::with_capacity(data.len() * 3);
    for (i, byte) in data.iter().enumerate() {
        if i > 0 {
            result.push(' ');
        }
        let _ = write!(result, "{:02x}", byte);
    }
    result
}

/// Classic 16-byte rows with an ASCII gutter. `base` is the offset printed
/// for the first byte.
pub fn hex_dump(data: &[u8], base: usize) -> String {
    let mut result = String::new();

    for (i, chunk) in data.chunks(16).enumerate() {
        let _ = write!(result, "{:08x}  ", base + i * 16);

        for (j, &byte) in chunk.iter().enumerate() {
            if j == 8 {
                result.push(' ');
            }
            let _ = write!(result, "{:02x} ", byte);
        }

        for _ in chunk.len()..16 {
            result.push_str("   ");
        }
        if chunk.len() <= 8 {
            result.push(' ');
        }

        result.push_str(" |");
        for &byte in chunk {
            result.push(if (0x20..0x7f).contains(&byte) { byte as char } else { '.' });
        }
        result.push_str("|\n");
    }

    result
}

pub fn read_u32_le(data: &[u8], offset: usize) -> Option<u32> {
    let bytes = data.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(&[0x55, 0x48, 0x89, 0xe5]), "55 48 89 e5");
        assert_eq!(format_bytes(&[]), "");
    }

    #[test]
    fn test_hex_dump_rows() {
        let data: Vec<u8> = (0x40..0x52).collect();
        let dump = hex_dump(&data, 0x1000);
        let lines: Vec<&str> = dump.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "00001000  40 41 42 43 44 45 46 47  48 49 4a 4b 4c 4d 4e 4f  |@ABCDEFGHIJKLMNO|"
        );
        assert!(lines[1].starts_with("00001010  50 51 "));
        assert!(lines[1].ends_with("|PQ|"));
        assert_eq!(lines[0].find('|'), lines[1].find('|'));
    }

    #[test]
    fn test_read_u32_le() {
        assert_eq!(read_u32_le(&[0, 0x08, 0, 0, 0], 1), Some(8));
        assert_eq!(read_u32_le(&[1, 2, 3], 0), None);
        assert_eq!(read_u32_le(&[1, 2, 3, 4], usize::MAX), None);
    }
}
