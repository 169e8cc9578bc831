//! Share-link derivation
//!
//! A complete record is shared as `<base>/<id>`. The share intent embeds
//! that link and the quoted text.

use url::form_urlencoded;

/// Default deployment serving the share pages
pub const DEFAULT_SHARE_BASE_URL: &str = "https://zennq.folks-chat.com";

const SHARE_INTENT_BASE: &str = "https://twitter.com/intent/tweet";

/// `<base>/<id>`, tolerating a trailing slash on `base`
pub fn share_link(base_url: &str, id: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), id)
}

/// Outbound share-intent URL for a link and its quote
pub fn share_intent_url(link: &str, quote: &str) -> String {
    let text = format!("\"{}\"", quote);
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("url", link)
        .append_pair("text", &text)
        .finish();
    format!("{}?{}", SHARE_INTENT_BASE, query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_link_trims_trailing_slash() {
        assert_eq!(share_link("https://q.example/", "abc"), "https://q.example/abc");
        assert_eq!(share_link("https://q.example", "abc"), "https://q.example/abc");
    }

    #[test]
    fn test_share_intent_encodes_values() {
        let url = share_intent_url("https://q.example/abc", "a & b");

        assert!(
            url.starts_with("https://twitter.com/intent/tweet?url=https%3A%2F%2Fq.example%2Fabc")
        );
        assert!(url.contains("&text=%22a+%26+b%22"));
    }
}
