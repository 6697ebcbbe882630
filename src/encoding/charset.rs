const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Byte used for characters ISO-8859-15 has no slot for ('?').
const REPLACEMENT: u8 = b'?';

/// ISO-8859-15 byte for `c`, if the character set carries it.
pub(crate) fn latin9_byte(c: char) -> Option<u8> {
    match c {
        '\u{20AC}' => Some(0xA4),
        '\u{160}' => Some(0xA6),
        '\u{161}' => Some(0xA8),
        '\u{17D}' => Some(0xB4),
        '\u{17E}' => Some(0xB8),
        '\u{152}' => Some(0xBC),
        '\u{153}' => Some(0xBD),
        '\u{178}' => Some(0xBE),
        // Latin-1 characters displaced by the eight above.
        '\u{A4}' | '\u{A6}' | '\u{A8}' | '\u{B4}' | '\u{B8}' | '\u{BC}' | '\u{BD}' | '\u{BE}' => {
            None
        }
        c => u8::try_from(u32::from(c)).ok(),
    }
}

/// Appends the `=XX` escape of `c`.
pub(crate) fn push_escaped(out: &mut String, c: char) {
    push_hex(out, latin9_byte(c).unwrap_or(REPLACEMENT));
}

pub(crate) fn push_hex(out: &mut String, byte: u8) {
    out.push('=');
    out.push(char::from(HEX_DIGITS[usize::from(byte >> 4)]));
    out.push(char::from(HEX_DIGITS[usize::from(byte & 0x0F)]));
}
