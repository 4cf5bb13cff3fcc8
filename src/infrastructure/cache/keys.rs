//! Cache key layout.
//!
//! | Key | Value | Expiry |
//! |-----|-------|--------|
//! | `alias:<alias>` | original URL | none |
//! | `url:<url>` | alias | none |
//! | `analytics:<alias>` | snapshot JSON | analytics TTL |
//! | `analytics:topic:<topic>` | topic JSON | analytics TTL |
//! | `analytics:overall:<owner>` | owner JSON | analytics TTL |

pub fn alias(alias: &str) -> String {
    format!("alias:{alias}")
}

pub fn url(url: &str) -> String {
    format!("url:{url}")
}

pub fn alias_analytics(alias: &str) -> String {
    format!("analytics:{alias}")
}

pub fn topic_analytics(topic: &str) -> String {
    format!("analytics:topic:{topic}")
}

pub fn owner_analytics(owner: &str) -> String {
    format!("analytics:overall:{owner}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_formats() {
        assert_eq!(alias("abc"), "alias:abc");
        assert_eq!(url("https://x.test/a"), "url:https://x.test/a");
        assert_eq!(alias_analytics("abc"), "analytics:abc");
        assert_eq!(topic_analytics("news"), "analytics:topic:news");
        assert_eq!(owner_analytics("me@x.test"), "analytics:overall:me@x.test");
    }
}
