//! Notification template engine.
//!
//! Subjects and bodies are plain strings holding `@@token` markers that are
//! replaced by exact substring substitution. There are no conditionals or
//! loops, and unrecognized tokens pass through verbatim.
//!
//! Substitution happens in two stages: item-level tokens are rendered once
//! per broadcast, recipient-level tokens once per recipient against the
//! pre-rendered item-level body. The split keeps the per-recipient work to
//! three replacements.

/// Site/blog display name (item-level).
pub const TOKEN_SITE_NAME: &str = "@@blogname";
/// Title of the published item (item-level).
pub const TOKEN_ITEM_TITLE: &str = "@@posttitle";
/// Permalink of the published item (item-level, rendered as an anchor).
pub const TOKEN_PERMALINK: &str = "@@permalink";
/// Sender signature from the broadcast settings (item-level).
pub const TOKEN_SIGNATURE: &str = "@@signature";
/// Subscriber first name (recipient-level).
pub const TOKEN_FIRST_NAME: &str = "@@firstname";
/// Link to the subscriber's preference management page (recipient-level).
pub const TOKEN_PREFS_URL: &str = "@@prefsurl";
/// Link to the subscriber's unsubscribe page (recipient-level).
pub const TOKEN_UNSUBSCRIBE_URL: &str = "@@unsubscribeurl";

/// Stored first-name value meaning "the subscriber never gave a name".
pub const UNKNOWN_NAME_PLACEHOLDER: &str = "[Unknown]";

/// Salutation substituted for [`TOKEN_FIRST_NAME`] when the stored name is
/// the unknown placeholder ("Hi there," rather than "Hi [Unknown],").
pub const GENERIC_SALUTATION: &str = "there";

/// Replace each `(token, value)` pair in `template` by substring substitution.
///
/// Tokens not present in the template are no-ops; markers in the template
/// with no matching pair are left verbatim.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (token, value) in vars {
        out = out.replace(token, value);
    }
    out
}

/// Decode HTML-entity-encoded quote characters to their literal forms.
///
/// Settings saved through an HTML form arrive with quotes encoded; the
/// outgoing subject line is plain text, so `&quot;` et al. must become real
/// quote characters. Applied to both subject and body after item-level
/// substitution. Only quote entities are decoded.
pub fn decode_quote_entities(text: &str) -> String {
    text.replace("&quot;", "\"")
        .replace("&#034;", "\"")
        .replace("&#039;", "'")
        .replace("&#39;", "'")
}

/// The name to substitute for [`TOKEN_FIRST_NAME`].
///
/// Subscribers who signed up without a name are stored with the
/// [`UNKNOWN_NAME_PLACEHOLDER`] sentinel; those get [`GENERIC_SALUTATION`]
/// instead of the literal placeholder.
pub fn salutation_name(first_name: &str) -> &str {
    if first_name == UNKNOWN_NAME_PLACEHOLDER {
        GENERIC_SALUTATION
    } else {
        first_name
    }
}
