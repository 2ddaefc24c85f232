//! Page front matter / 页面前置元数据
//!
//! Supported forms / 支持格式：
//! - TOML between `+++` lines (parsed with `toml`)
//! - YAML between `---` lines, top-level `key: value` scalars and `|` / `>` block scalars
//!
//! Keys are matched case-insensitively, as the site generator does.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Page metadata relevant to indexing / 与索引相关的页面元数据
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub draft: bool,
    pub date: Option<DateTime<Utc>>,
    pub publish_date: Option<DateTime<Utc>>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub slug: Option<String>,
    pub url: Option<String>,
    pub summary: Option<String>,
}

impl FrontMatter {
    /// Not a draft, not scheduled in the future, not expired / 是否已发布
    pub fn is_published(&self, now: DateTime<Utc>) -> bool {
        if self.draft {
            return false;
        }
        if self.publish_date.or(self.date).is_some_and(|d| d > now) {
            return false;
        }
        !self.expiry_date.is_some_and(|d| d < now)
    }

    fn apply(&mut self, key: &str, value: String) {
        match key.to_lowercase().as_str() {
            "title" => self.title = Some(value),
            "draft" => self.draft = matches!(value.to_lowercase().as_str(), "true" | "yes"),
            "date" => self.date = parse_date(&value),
            "publishdate" | "pubdate" | "published" => self.publish_date = parse_date(&value),
            "expirydate" | "unpublishdate" => self.expiry_date = parse_date(&value),
            "slug" => self.slug = Some(value),
            "url" => self.url = Some(value),
            "summary" | "description" if self.summary.is_none() || key.eq_ignore_ascii_case("summary") => {
                self.summary = Some(value)
            }
            _ => {}
        }
    }
}

/// Split a page into front matter and body / 拆分前置元数据与正文
///
/// A page without a leading delimiter has empty front matter.
pub fn split(source: &str) -> Result<(FrontMatter, &str), String> {
    let source = source.trim_start_matches('\u{feff}');

    let first_line = source.lines().next().unwrap_or("").trim_end();
    let delimiter = match first_line {
        "+++" | "---" => first_line,
        _ => return Ok((FrontMatter::default(), source)),
    };

    let after_open = match source.find('\n') {
        Some(i) => &source[i + 1..],
        None => return Err("unterminated front matter".to_string()),
    };

    let mut offset = 0;
    for line in after_open.split_inclusive('\n') {
        if line.trim_end() == delimiter {
            let raw = &after_open[..offset];
            let body = &after_open[offset + line.len()..];
            let front = if delimiter == "+++" {
                parse_toml(raw)?
            } else {
                parse_yaml(raw)
            };
            return Ok((front, body));
        }
        offset += line.len();
    }

    Err("unterminated front matter".to_string())
}

fn parse_toml(raw: &str) -> Result<FrontMatter, String> {
    let table: toml::Table = raw.parse().map_err(|e: toml::de::Error| e.message().to_string())?;

    let mut front = FrontMatter::default();
    for (key, value) in table {
        let value = match value {
            toml::Value::String(s) => s,
            toml::Value::Boolean(b) => b.to_string(),
            toml::Value::Datetime(dt) => dt.to_string(),
            toml::Value::Integer(i) => i.to_string(),
            _ => continue,
        };
        front.apply(&key, value);
    }
    Ok(front)
}

fn parse_yaml(raw: &str) -> FrontMatter {
    let mut front = FrontMatter::default();
    let mut lines = raw.lines().peekable();
    while let Some(line) = lines.next() {
        // nested mappings and list items are not needed for indexing
        if line.starts_with(char::is_whitespace) || line.starts_with('#') || line.starts_with('-') {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();

        // `|` keeps line breaks, `>` folds them into spaces / 块标量
        if let Some(indicator) = value.chars().next().filter(|c| *c == '|' || *c == '>') {
            if !matches!(&value[1..], "" | "-" | "+") {
                continue;
            }
            let mut block = Vec::new();
            while let Some(next) = lines.next_if(|l| l.trim().is_empty() || l.starts_with(char::is_whitespace)) {
                block.push(next.trim());
            }
            let joined = if indicator == '|' { block.join("\n") } else { fold(&block) };
            let joined = joined.trim();
            if !joined.is_empty() {
                front.apply(key.trim(), joined.to_string());
            }
            continue;
        }

        let value = unquote(value);
        if value.is_empty() {
            continue;
        }
        front.apply(key.trim(), value.to_string());
    }
    front
}

/// Folded scalar: lines join with a space, blank lines become line breaks
fn fold(block: &[&str]) -> String {
    let mut out = String::new();
    for line in block {
        if line.is_empty() {
            out.push('\n');
        } else {
            if !out.is_empty() && !out.ends_with('\n') {
                out.push(' ');
            }
            out.push_str(line);
        }
    }
    out
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Parse the date forms found in front matter / 解析日期
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_front_matter() {
        let page = "+++\ntitle = \"Hello\"\ndraft = false\ndate = 2023-05-01T10:00:00Z\nSlug = \"hi\"\n+++\nBody text\n";
        let (front, body) = split(page).unwrap();
        assert_eq!(front.title.as_deref(), Some("Hello"));
        assert!(!front.draft);
        assert_eq!(front.date, parse_date("2023-05-01T10:00:00Z"));
        assert_eq!(front.slug.as_deref(), Some("hi"));
        assert_eq!(body, "Body text\n");
    }

    #[test]
    fn test_yaml_front_matter() {
        let page = "---\ntitle: \"It's: here\"\ndraft: true\ntags:\n  - a\nexpiryDate: 2020-01-01\n---\n# Heading\n";
        let (front, body) = split(page).unwrap();
        assert_eq!(front.title.as_deref(), Some("It's: here"));
        assert!(front.draft);
        assert_eq!(front.expiry_date, parse_date("2020-01-01"));
        assert_eq!(body, "# Heading\n");
    }

    #[test]
    fn test_yaml_block_scalars() {
        let page = "---\ntitle: >-\n  A long\n  folded title\nsummary: |\n  First line\n  second line\n\ndraft: false\nslug: >\n---\nBody\n";
        let (front, body) = split(page).unwrap();
        assert_eq!(front.title.as_deref(), Some("A long folded title"));
        assert_eq!(front.summary.as_deref(), Some("First line\nsecond line"));
        assert!(!front.draft);
        assert_eq!(front.slug, None);
        assert_eq!(body, "Body\n");

        let (front, _) = split("---\ntitle: >\n  one\n\n  two\n---\n").unwrap();
        assert_eq!(front.title.as_deref(), Some("one\ntwo"));
    }

    #[test]
    fn test_no_front_matter() {
        let (front, body) = split("just text").unwrap();
        assert_eq!(front, FrontMatter::default());
        assert_eq!(body, "just text");
    }

    #[test]
    fn test_unterminated_and_invalid() {
        assert!(split("+++\ntitle = \"x\"\n").is_err());
        assert!(split("+++\ntitle = \n+++\n").is_err());
    }

    #[test]
    fn test_summary_prefers_summary_key() {
        let (front, _) = split("---\nsummary: short\ndescription: long\n---\n").unwrap();
        assert_eq!(front.summary.as_deref(), Some("short"));
        let (front, _) = split("---\ndescription: long\n---\n").unwrap();
        assert_eq!(front.summary.as_deref(), Some("long"));
    }

    #[test]
    fn test_parse_date_forms() {
        let expected = Utc.with_ymd_and_hms(2023, 5, 1, 10, 0, 0).unwrap();
        assert_eq!(parse_date("2023-05-01T10:00:00Z"), Some(expected));
        assert_eq!(parse_date("2023-05-01T12:00:00+02:00"), Some(expected));
        assert_eq!(parse_date("2023-05-01T10:00:00"), Some(expected));
        assert_eq!(parse_date("2023-05-01 10:00:00"), Some(expected));
        assert_eq!(
            parse_date("2023-05-01"),
            Some(Utc.with_ymd_and_hms(2023, 5, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn test_is_published() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let past = parse_date("2023-01-01");
        let future = parse_date("2025-01-01");

        assert!(FrontMatter::default().is_published(now));
        assert!(!FrontMatter { draft: true, ..Default::default() }.is_published(now));
        assert!(!FrontMatter { date: future, ..Default::default() }.is_published(now));
        assert!(FrontMatter { date: future, publish_date: past, ..Default::default() }.is_published(now));
        assert!(!FrontMatter { expiry_date: past, ..Default::default() }.is_published(now));
        assert!(FrontMatter { expiry_date: future, ..Default::default() }.is_published(now));
    }
}
