//! Per-subscriber self-service link construction.
//!
//! Preference-management and unsubscribe links are a fixed site-relative
//! path with the subscriber's email address and auth token appended as query
//! parameters. The values are concatenated without additional escaping, so
//! addresses or tokens containing reserved URL characters produce broken
//! links. Full URLs (rather than bare paths) are embedded so email clients
//! that strip relative links still render something clickable.

/// Site-relative path of the preference management page.
pub const MANAGE_PREFS_PATH: &str = "/subscriptions/prefs/";

/// Site-relative path of the unsubscribe page.
pub const UNSUBSCRIBE_PATH: &str = "/subscriptions/unsubscribe/";

/// Build the preference-management URL for one subscriber.
pub fn manage_prefs_url(site_url: &str, email_addr: &str, authcode: &str) -> String {
    format!("{site_url}{MANAGE_PREFS_PATH}?email_addr={email_addr}&authcode={authcode}")
}

/// Build the unsubscribe URL for one subscriber.
pub fn unsubscribe_url(site_url: &str, email_addr: &str, authcode: &str) -> String {
    format!("{site_url}{UNSUBSCRIBE_PATH}?email_addr={email_addr}&authcode={authcode}")
}

/// Wrap a URL in an HTML anchor whose text is the URL itself.
///
/// Bodies are sent as HTML; showing the raw URL as the link text keeps the
/// destination visible in clients that flag or rewrite anchors.
pub fn html_link(url: &str) -> String {
    format!("<a href=\"{url}\">{url}</a>")
}
