//! Template composition for one broadcast.
//!
//! Rendering is split in two stages so the per-recipient cost stays small:
//! [`render_item`] substitutes the item-level tokens once per broadcast,
//! [`personalize`] substitutes the recipient-level tokens once per recipient
//! against the pre-rendered body.

use herald_core::links::{html_link, manage_prefs_url, unsubscribe_url};
use herald_core::template::{
    decode_quote_entities, render, salutation_name, TOKEN_FIRST_NAME, TOKEN_ITEM_TITLE,
    TOKEN_PERMALINK, TOKEN_PREFS_URL, TOKEN_SIGNATURE, TOKEN_SITE_NAME, TOKEN_UNSUBSCRIBE_URL,
};
use herald_db::models::item::Item;
use herald_db::models::settings::BroadcastSettings;
use herald_db::models::subscriber::Recipient;

/// Subject and body with all item-level tokens substituted.
#[derive(Debug, Clone)]
pub struct RenderedItem {
    /// Plain-text subject line, quote entities decoded.
    pub subject: String,
    /// HTML body still holding the recipient-level tokens.
    pub body: String,
}

/// Substitute the item-level tokens into the subject and body templates.
///
/// The permalink is embedded as an HTML anchor so it stays clickable in
/// clients that do not auto-link bare URLs. Quote entities typed into the
/// settings templates are decoded after substitution.
pub fn render_item(settings: &BroadcastSettings, site_name: &str, item: &Item) -> RenderedItem {
    let subject = render(
        &settings.subject_template,
        &[(TOKEN_SITE_NAME, site_name), (TOKEN_ITEM_TITLE, &item.title)],
    );

    let permalink_anchor = html_link(&item.permalink);
    let body = render(
        &settings.body_template,
        &[
            (TOKEN_SITE_NAME, site_name),
            (TOKEN_ITEM_TITLE, &item.title),
            (TOKEN_PERMALINK, &permalink_anchor),
            (TOKEN_SIGNATURE, &settings.signature),
        ],
    );

    RenderedItem {
        subject: decode_quote_entities(&subject),
        body: decode_quote_entities(&body),
    }
}

/// Substitute the recipient-level tokens into a pre-rendered body.
///
/// Tailors the salutation and the self-service links (preference management,
/// unsubscribe) to one subscriber.
pub fn personalize(body: &str, site_url: &str, recipient: &Recipient) -> String {
    let prefs_anchor = html_link(&manage_prefs_url(
        site_url,
        &recipient.email_addr,
        &recipient.authcode,
    ));
    let unsubscribe_anchor = html_link(&unsubscribe_url(
        site_url,
        &recipient.email_addr,
        &recipient.authcode,
    ));

    render(
        body,
        &[
            (TOKEN_FIRST_NAME, salutation_name(&recipient.first_name)),
            (TOKEN_PREFS_URL, &prefs_anchor),
            (TOKEN_UNSUBSCRIBE_URL, &unsubscribe_anchor),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_settings() -> BroadcastSettings {
        BroadcastSettings {
            subject_template: "@@blogname: @@posttitle".into(),
            body_template: "Hi @@firstname, read @@posttitle at @@permalink. @@signature \
                            Prefs: @@prefsurl Unsubscribe: @@unsubscribeurl"
                .into(),
            signature: "The team".into(),
            sender_name: "Herald".into(),
            sender_addr: "noreply@herald.local".into(),
            updated_at: Utc::now(),
        }
    }

    fn test_item() -> Item {
        Item {
            id: 42,
            title: "Launch".into(),
            permalink: "https://example.org/launch".into(),
            author: "ann".into(),
            status: "published".into(),
        }
    }

    fn test_recipient(first_name: &str) -> Recipient {
        Recipient {
            id: 7,
            email_addr: "bob@example.com".into(),
            first_name: first_name.into(),
            authcode: "c0ffee".into(),
        }
    }

    #[test]
    fn item_render_substitutes_site_title_permalink_and_signature() {
        let rendered = render_item(&test_settings(), "My Blog", &test_item());

        assert_eq!(rendered.subject, "My Blog: Launch");
        assert!(rendered.body.contains("read Launch at"));
        assert!(rendered
            .body
            .contains("<a href=\"https://example.org/launch\">https://example.org/launch</a>"));
        assert!(rendered.body.contains("The team"));
        // Recipient-level tokens survive item-level rendering untouched.
        assert!(rendered.body.contains("@@firstname"));
        assert!(rendered.body.contains("@@prefsurl"));
        assert!(rendered.body.contains("@@unsubscribeurl"));
    }

    #[test]
    fn subject_quote_entities_are_decoded() {
        let mut settings = test_settings();
        settings.subject_template = "&quot;@@posttitle&quot; is live".into();
        let rendered = render_item(&settings, "My Blog", &test_item());
        assert_eq!(rendered.subject, "\"Launch\" is live");
    }

    #[test]
    fn personalize_fills_name_and_links() {
        let rendered = render_item(&test_settings(), "My Blog", &test_item());
        let body = personalize(&rendered.body, "https://example.org", &test_recipient("Bob"));

        assert!(body.contains("Hi Bob,"));
        assert!(body.contains(
            "https://example.org/subscriptions/prefs/?email_addr=bob@example.com&authcode=c0ffee"
        ));
        assert!(body.contains(
            "https://example.org/subscriptions/unsubscribe/?email_addr=bob@example.com&authcode=c0ffee"
        ));
        assert!(!body.contains("@@"));
    }

    #[test]
    fn unknown_name_gets_generic_salutation() {
        let rendered = render_item(&test_settings(), "My Blog", &test_item());
        let body = personalize(
            &rendered.body,
            "https://example.org",
            &test_recipient("[Unknown]"),
        );
        assert!(body.contains("Hi there,"));
        assert!(!body.contains("[Unknown]"));
    }
}
