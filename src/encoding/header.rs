use super::charset::{push_escaped, push_hex};

const WORD_PREFIX: &str = "=?ISO-8859-15?Q?";
const WORD_SUFFIX: &str = "?=";
/// Folding between two encoded words of the same header.
const WORD_SEPARATOR: &str = "\r\n ";

/// Running length right after [`WORD_PREFIX`].
const PREFIX_LENGTH: usize = 16;
/// An encoded word is closed once its running length goes past this
/// (RFC 2047 caps a word at 75 characters).
const WORD_LIMIT: usize = 69;

/// Encodes a header value as one or more RFC 2047 `Q` encoded words.
///
/// Space and tab are always escaped, as are `?`, `=` and `_`. CRLF is kept
/// and restarts the length count; a bare LF is written as CRLF but keeps
/// counting. A `.` right after a line break is written `=2E`. Once a word
/// runs past 69 characters it is closed and the next character starts a
/// new word on a folded line, so there is no empty word at the end.
pub fn encode_header_value(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + WORD_PREFIX.len() + WORD_SUFFIX.len());
    out.push_str(WORD_PREFIX);
    let mut length = PREFIX_LENGTH;
    let mut line_start = false;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if length > WORD_LIMIT {
            out.push_str(WORD_SUFFIX);
            out.push_str(WORD_SEPARATOR);
            out.push_str(WORD_PREFIX);
            length = PREFIX_LENGTH;
        }

        let after_break = std::mem::take(&mut line_start);
        match c {
            '\r' if chars.peek() == Some(&'\n') => {
                chars.next();
                out.push_str("\r\n");
                length = 0;
                line_start = true;
            }
            '\n' => {
                out.push_str("\r\n");
                line_start = true;
            }
            '.' if after_break => {
                push_hex(&mut out, b'.');
                length += 3;
            }
            ' ' | '\t' => {
                push_escaped(&mut out, c);
                length += 3;
            }
            c if is_word_safe(c) => {
                out.push(c);
                length += 1;
            }
            c => {
                push_escaped(&mut out, c);
                length += 3;
            }
        }
    }

    out.push_str(WORD_SUFFIX);
    out
}

fn is_word_safe(c: char) -> bool {
    matches!(c, '!'..='<' | '>'..='~') && !matches!(c, '?' | '=' | '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_subject_is_framed() {
        assert_eq!(encode_header_value("Hello"), "=?ISO-8859-15?Q?Hello?=");
    }

    #[test]
    fn spaces_and_reserved_are_escaped() {
        assert_eq!(
            encode_header_value("a b\t?=_"),
            "=?ISO-8859-15?Q?a=20b=09=3F=3D=5F?="
        );
    }

    #[test]
    fn non_ascii_uses_latin9_bytes() {
        assert_eq!(
            encode_header_value("Caf\u{E9} 5\u{20AC}"),
            "=?ISO-8859-15?Q?Caf=E9=205=A4?="
        );
    }

    #[test]
    fn line_breaks_are_normalised() {
        assert_eq!(
            encode_header_value("a\nb\r\nc\rd"),
            "=?ISO-8859-15?Q?a\r\nb\r\nc=0Dd?="
        );
    }

    #[test]
    fn long_values_are_split_into_words() {
        let encoded = encode_header_value(&"x".repeat(60));
        let words: Vec<&str> = encoded.split(WORD_SEPARATOR).collect();
        assert_eq!(words.len(), 2);
        // 16 (prefix) + 54 characters pushes the count to 70
        assert_eq!(words[0], format!("{WORD_PREFIX}{}{WORD_SUFFIX}", "x".repeat(54)));
        assert_eq!(words[1], format!("{WORD_PREFIX}{}{WORD_SUFFIX}", "x".repeat(6)));
    }

    #[test]
    fn bare_line_feed_keeps_counting() {
        let encoded = encode_header_value(&format!("a\n{}", "x".repeat(60)));
        let words: Vec<&str> = encoded.split(WORD_SEPARATOR).collect();
        assert_eq!(words.len(), 2);
        // 16 + "a" + 53 characters after the LF
        assert_eq!(
            words[0],
            format!("{WORD_PREFIX}a\r\n{}{WORD_SUFFIX}", "x".repeat(53))
        );
        assert_eq!(words[1], format!("{WORD_PREFIX}{}{WORD_SUFFIX}", "x".repeat(7)));
    }

    #[test]
    fn crlf_restarts_the_count() {
        let encoded = encode_header_value(&format!("a\r\n{}", "x".repeat(60)));
        assert!(!encoded.contains(WORD_SEPARATOR));
    }

    #[test]
    fn dot_after_line_break_is_escaped() {
        assert_eq!(
            encode_header_value("hi\n.\r\n.x.\n"),
            "=?ISO-8859-15?Q?hi\r\n=2E\r\n=2Ex.\r\n?="
        );
    }

    #[test]
    fn no_empty_trailing_word() {
        let encoded = encode_header_value(&"x".repeat(54));
        assert!(!encoded.contains(WORD_SEPARATOR));
    }

    #[test]
    fn empty_value_is_an_empty_word() {
        assert_eq!(encode_header_value(""), "=?ISO-8859-15?Q??=");
    }
}
