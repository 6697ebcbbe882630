use super::charset::{push_escaped, push_hex};

/// A soft line break is inserted once a line runs past this many characters
/// (RFC 2045 caps quoted-printable lines at 76).
const SOFT_BREAK_AFTER: usize = 70;
const SOFT_BREAK: &str = "=\r\n";

/// Quoted-printable encoding of a message body.
///
/// Printable ASCII other than `=` passes through. Space and tab pass through
/// unless they end a line, where receivers would strip them, so they are
/// escaped. CRLF is kept and restarts the length count, a bare LF becomes
/// CRLF but keeps counting, anything else is escaped as `=XX`. A soft break
/// follows the character that takes a line past 70, and a `.` that would
/// start the next line is escaped so the soft break can never forge a lone
/// `.` line.
pub fn encode_body(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    let mut length = 0usize;
    let mut soft_broken = false;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        let next = chars.peek().copied();
        let after_soft_break = std::mem::take(&mut soft_broken);

        match c {
            '\r' if next == Some('\n') => {
                chars.next();
                out.push_str("\r\n");
                length = 0;
            }
            '\n' => out.push_str("\r\n"),
            ' ' | '\t' => {
                if matches!(next, None | Some('\r') | Some('\n')) {
                    push_escaped(&mut out, c);
                    length += 3;
                } else {
                    out.push(c);
                    length += 1;
                }
            }
            '.' if after_soft_break => {
                push_hex(&mut out, b'.');
                length += 3;
            }
            c if is_body_safe(c) => {
                out.push(c);
                length += 1;
            }
            c => {
                push_escaped(&mut out, c);
                length += 3;
            }
        }

        if length > SOFT_BREAK_AFTER {
            out.push_str(SOFT_BREAK);
            length = 0;
            soft_broken = true;
        }
    }

    out
}

fn is_body_safe(c: char) -> bool {
    matches!(c, '!'..='<' | '>'..='~')
}
