use proptest::prelude::*;

use super::charset::latin9_byte;
use super::{dot_stuff, encode_body, encode_header_value};

const WORD_PREFIX: &str = "=?ISO-8859-15?Q?";
const WORD_SUFFIX: &str = "?=";

/// Strips the encoded-word framing and joins the words back together.
fn unwrap_words(encoded: &str) -> String {
    encoded
        .split("\r\n ")
        .map(|word| {
            word.strip_prefix(WORD_PREFIX)
                .and_then(|w| w.strip_suffix(WORD_SUFFIX))
                .expect("framed word")
        })
        .collect()
}

/// Minimal quoted-printable decoder: drops soft breaks, resolves `=XX`.
fn decode_qp(encoded: &str) -> Vec<u8> {
    let joined = encoded.replace("=\r\n", "");
    let bytes = joined.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'=' {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).expect("ascii escape");
            out.push(u8::from_str_radix(hex, 16).expect("hex escape"));
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    out
}

/// What a receiver should see once the body is decoded.
fn expected_body_bytes(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' if chars.peek() == Some(&'\n') => {
                chars.next();
                out.extend_from_slice(b"\r\n");
            }
            '\n' => out.extend_from_slice(b"\r\n"),
            c => out.push(latin9_byte(c).unwrap_or(b'?')),
        }
    }
    out
}

fn escaped_char() -> impl Strategy<Value = char> {
    prop_oneof![
        prop::char::range('\u{0}', '\u{8}'),
        prop::char::range('\u{B}', '\u{C}'),
        prop::char::range('\u{E}', '\u{1F}'),
        prop::char::range('\u{7F}', '\u{A3}'),
        Just(' '),
        Just('\t'),
    ]
}

proptest! {
    #[test]
    fn reserved_free_header_text_unwraps_to_itself(text in r"[!-<>@-^`-~]{0,200}") {
        let encoded = encode_header_value(&text);
        prop_assert_eq!(unwrap_words(&encoded), text);
    }

    #[test]
    fn header_escapes_non_printable(c in escaped_char()) {
        let encoded = encode_header_value(&c.to_string());
        prop_assert_eq!(encoded, format!("{WORD_PREFIX}={:02X}{WORD_SUFFIX}", u32::from(c)));
    }

    #[test]
    fn body_escapes_non_printable(c in escaped_char().prop_filter("kept inside a line", |c| *c != ' ' && *c != '\t')) {
        let encoded = encode_body(&format!("a{c}b"));
        prop_assert_eq!(encoded, format!("a={:02X}b", u32::from(c)));
    }

    #[test]
    fn header_words_stay_within_rfc2047_limit(text in r"[^\r\n]{0,300}") {
        let encoded = encode_header_value(&text);
        for word in encoded.split("\r\n ") {
            prop_assert!(word.len() <= 75, "word too long ({}): {word}", word.len());
        }
    }

    #[test]
    fn body_lines_stay_within_limit(text in r"(?s).{0,500}") {
        let encoded = encode_body(&text);
        for line in encoded.split("\r\n") {
            if line.ends_with('=') {
                // at most 70 plus one escape, then the soft break marker
                prop_assert!(line.len() <= 74, "line too long ({}): {line}", line.len());
            } else {
                prop_assert!(line.len() <= 70, "long line without soft break: {line}");
            }
        }
    }

    #[test]
    fn body_decodes_back(text in r"(?s)[\x00-\x7F\u{E0}-\u{FF}\u{20AC}\u{4E2D}]{0,300}") {
        let encoded = encode_body(&text);
        prop_assert_eq!(decode_qp(&encoded), expected_body_bytes(&text));
    }

    #[test]
    fn stuffed_body_never_ends_data_early(text in r"(?s)[a. \r\n]{0,400}") {
        let encoded = encode_body(&dot_stuff(&text));
        for line in encoded.split("\r\n") {
            prop_assert_ne!(line, ".");
            if line.starts_with('.') {
                prop_assert!(line.starts_with(".."), "unstuffed line: {line:?}");
            }
        }
    }
}
