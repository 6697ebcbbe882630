use std::borrow::Cow;

/// Doubles every `.` that starts a line so user content cannot end the
/// `DATA` section early (RFC 5321 §4.5.2).
pub fn dot_stuff(body: &str) -> Cow<'_, str> {
    let leading = body.starts_with('.');
    if !leading && !body.contains("\n.") {
        return Cow::Borrowed(body);
    }

    let mut out = String::with_capacity(body.len() + 8);
    if leading {
        out.push('.');
    }
    out.push_str(&body.replace("\n.", "\n.."));
    Cow::Owned(out)
}
