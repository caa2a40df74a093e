//! Citation helpers for research reports.
//!
//! The report is markdown with `[n]` citations and a trailing Sources
//! section; these helpers keep that section present and machine-readable.

use crate::types::Source;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>()\[\]"'`]+"#).expect("valid url regex"));

static SOURCES_HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^\s*(?:#{1,6}\s*|\*\*)sources\b").expect("valid heading regex")
});

static SOURCE_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:[-*]\s*)?\[(\d+)\]\s*(.*)$").expect("valid source line regex")
});

/// Every distinct URL in `text`, in first-seen order.
pub fn extract_urls(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    URL_RE
        .find_iter(text)
        .map(|m| m.as_str().trim_end_matches(['.', ',', ';', ':', '!', '?']).to_string())
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

pub fn has_sources_section(report: &str) -> bool {
    SOURCES_HEADING_RE.is_match(report)
}

/// Append a numbered Sources section when the report has none.
///
/// URLs cited in the report come first, then URLs from the findings.
pub fn ensure_sources_section(report: &str, findings: &[String]) -> String {
    if has_sources_section(report) {
        return report.to_string();
    }

    let mut urls = extract_urls(report);
    for finding in findings {
        for url in extract_urls(finding) {
            if !urls.contains(&url) {
                urls.push(url);
            }
        }
    }

    let mut out = report.trim_end().to_string();
    out.push_str("\n\n### Sources\n");
    if urls.is_empty() {
        out.push_str("No sources were gathered during research.\n");
    } else {
        for (i, url) in urls.iter().enumerate() {
            out.push_str(&format!("[{}] {}\n", i + 1, url));
        }
    }
    out
}

/// Append any URL from `raw` that `output` dropped.
pub fn append_missing_urls(output: &str, raw: &str) -> String {
    let missing: Vec<String> = extract_urls(raw)
        .into_iter()
        .filter(|url| !output.contains(url.as_str()))
        .collect();
    if missing.is_empty() {
        return output.to_string();
    }

    let mut out = output.trim_end().to_string();
    out.push_str("\n\n### Additional Sources From Raw Results\n");
    for url in missing {
        out.push_str(&format!("- {}\n", url));
    }
    out
}

/// Parse the Sources section of a report into citations.
pub fn parse_sources(report: &str) -> Vec<Source> {
    let Some(heading) = SOURCES_HEADING_RE.find(report) else {
        return Vec::new();
    };

    report[heading.end()..]
        .lines()
        .filter_map(|line| {
            let caps = SOURCE_LINE_RE.captures(line)?;
            let number = caps[1].parse().ok()?;
            let rest = caps[2].trim();
            let url = URL_RE
                .find(rest)
                .map(|m| m.as_str().trim_end_matches(['.', ',', ';']).to_string());
            let title = match &url {
                Some(url) => rest.replace(url.as_str(), ""),
                None => rest.to_string(),
            };
            let title = title
                .trim()
                .trim_matches(|c: char| matches!(c, ':' | '-' | '(' | ')' | '[' | ']') || c.is_whitespace())
                .to_string();
            let title = if title.is_empty() {
                url.clone().unwrap_or_default()
            } else {
                title
            };
            Some(Source { number, title, url })
        })
        .collect()
}
