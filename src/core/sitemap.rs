use crate::domain::model::StoreStamp;
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeFrequency {
    Daily,
    Weekly,
}

impl ChangeFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeFrequency::Daily => "daily",
            ChangeFrequency::Weekly => "weekly",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    pub url: String,
    pub last_modified: DateTime<Utc>,
    pub change_frequency: ChangeFrequency,
    pub priority: f32,
}

/// 首頁、地圖，以及每間商店的詳細頁
pub fn entries(base_url: &str, stores: &[StoreStamp], now: DateTime<Utc>) -> Vec<SitemapEntry> {
    let base = base_url.trim_end_matches('/');

    let mut entries = vec![
        SitemapEntry {
            url: base.to_string(),
            last_modified: now,
            change_frequency: ChangeFrequency::Daily,
            priority: 1.0,
        },
        SitemapEntry {
            url: format!("{}/mapa", base),
            last_modified: now,
            change_frequency: ChangeFrequency::Daily,
            priority: 0.8,
        },
    ];

    entries.extend(stores.iter().map(|store| SitemapEntry {
        url: format!("{}/local/{}", base, store.id),
        last_modified: store.updated_at.unwrap_or(now),
        change_frequency: ChangeFrequency::Weekly,
        priority: 0.7,
    }));

    entries
}

fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

pub fn render_xml(entries: &[SitemapEntry]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );

    for entry in entries {
        // 寫入 String 不會失敗
        let _ = write!(
            xml,
            "  <url>\n    <loc>{}</loc>\n    <lastmod>{}</lastmod>\n    <changefreq>{}</changefreq>\n    <priority>{:.1}</priority>\n  </url>\n",
            escape_xml(&entry.url),
            entry.last_modified.to_rfc3339_opts(SecondsFormat::Secs, true),
            entry.change_frequency.as_str(),
            entry.priority
        );
    }

    xml.push_str("</urlset>\n");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_entries_for_static_pages_and_stores() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let updated = Utc.with_ymd_and_hms(2024, 3, 10, 8, 30, 0).unwrap();
        let stores = vec![
            StoreStamp {
                id: "s1".to_string(),
                updated_at: Some(updated),
            },
            StoreStamp {
                id: "s2".to_string(),
                updated_at: None,
            },
        ];

        let entries = entries("https://descuentosuy.vercel.app/", &stores, now);
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0].url, "https://descuentosuy.vercel.app");
        assert_eq!(entries[0].priority, 1.0);
        assert_eq!(entries[1].url, "https://descuentosuy.vercel.app/mapa");
        assert_eq!(entries[1].change_frequency, ChangeFrequency::Daily);
        assert_eq!(entries[2].url, "https://descuentosuy.vercel.app/local/s1");
        assert_eq!(entries[2].last_modified, updated);
        assert_eq!(entries[2].change_frequency, ChangeFrequency::Weekly);
        assert_eq!(entries[3].last_modified, now);
    }

    #[test]
    fn test_render_xml() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let xml = render_xml(&entries("https://d.uy", &[], now));

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<loc>https://d.uy/mapa</loc>"));
        assert!(xml.contains("<lastmod>2024-05-01T12:00:00Z</lastmod>"));
        assert!(xml.contains("<priority>0.8</priority>"));
        assert!(xml.trim_end().ends_with("</urlset>"));
    }
}
