//! Email redaction over serialized output.

use once_cell::sync::Lazy;
use regex::Regex;

/// Replacement for every email-shaped substring.
pub const EMAIL_REDACTION: &str = "[EMAIL REDACTED]";

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("email pattern is valid")
});

static MAILTO_LINK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<a[^>]*href=["']mailto:[^"']*["'][^>]*>.*?</a>"#)
        .expect("mailto pattern is valid")
});

/// Replace email addresses with [`EMAIL_REDACTION`], then drop every anchor
/// pointing at a `mailto:` target, label included.
pub fn redact_emails(html: &str) -> String {
    let redacted = EMAIL_REGEX.replace_all(html, EMAIL_REDACTION);
    MAILTO_LINK_REGEX.replace_all(&redacted, "").into_owned()
}
