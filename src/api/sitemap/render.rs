// sitemaps.org XML rendering

use chrono::{DateTime, Utc};

use crate::utils::utils::xml_escape;

pub const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    /// Path relative to the site root, starting with '/'
    pub location: String,
    pub lastmod: Option<DateTime<Utc>>,
    pub changefreq: &'static str,
    pub priority: f32,
}

impl SitemapEntry {
    pub fn weekly(location: impl Into<String>, priority: f32, lastmod: Option<DateTime<Utc>>) -> Self {
        Self {
            location: location.into(),
            lastmod,
            changefreq: "weekly",
            priority,
        }
    }
}

/// `<urlset>` document with absolute `https://<domain>` locations
pub fn render_sitemap(domain: &str, entries: &[SitemapEntry]) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str(&format!("<urlset xmlns=\"{SITEMAP_NAMESPACE}\">\n"));

    for entry in entries {
        xml.push_str("  <url>\n");
        xml.push_str(&format!(
            "    <loc>{}</loc>\n",
            xml_escape(&format!("https://{}{}", domain, entry.location))
        ));
        if let Some(lastmod) = entry.lastmod {
            xml.push_str(&format!("    <lastmod>{}</lastmod>\n", lastmod.format("%Y-%m-%d")));
        }
        xml.push_str(&format!("    <changefreq>{}</changefreq>\n", entry.changefreq));
        xml.push_str(&format!("    <priority>{:.1}</priority>\n", entry.priority));
        xml.push_str("  </url>\n");
    }

    xml.push_str("</urlset>\n");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn renders_absolute_locations() {
        let lastmod = Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap();
        let xml = render_sitemap(
            "learnflow.africa",
            &[
                SitemapEntry::weekly("/", 1.0, None),
                SitemapEntry::weekly("/book/7", 0.9, Some(lastmod)),
            ],
        );

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<loc>https://learnflow.africa/</loc>"));
        assert!(xml.contains("<loc>https://learnflow.africa/book/7</loc>\n    <lastmod>2025-03-14</lastmod>"));
        assert!(xml.contains("<priority>1.0</priority>"));
        assert!(xml.contains("<priority>0.9</priority>"));
        assert_eq!(xml.matches("<changefreq>weekly</changefreq>").count(), 2);
        assert!(xml.trim_end().ends_with("</urlset>"));
    }

    #[test]
    fn static_entries_have_no_lastmod() {
        let xml = render_sitemap("example.org", &[SitemapEntry::weekly("/quizzes", 1.0, None)]);
        assert!(!xml.contains("<lastmod>"));
    }

    #[test]
    fn escapes_locations() {
        let xml = render_sitemap("example.org", &[SitemapEntry::weekly("/a?b=1&c=2", 0.8, None)]);
        assert!(xml.contains("https://example.org/a?b=1&amp;c=2"));
    }
}
