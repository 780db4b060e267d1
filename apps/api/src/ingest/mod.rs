//! Resume ingestion — PDF text extraction and section splitting.
//!
//! Extraction is best-effort: a malformed, encrypted or image-only PDF
//! degrades to an empty string rather than an error. Aggregation of
//! empty uploads happens one level up, in the question bank builder.

use tracing::warn;

/// Canonical section names with the header phrases that introduce them.
const HEADERS: &[(&str, &[&str])] = &[
    ("summary", &["summary", "professional summary", "profile"]),
    ("education", &["education", "academics", "academic background"]),
    (
        "experience",
        &[
            "experience",
            "work experience",
            "professional experience",
            "employment",
        ],
    ),
    ("projects", &["projects", "selected projects", "research"]),
    ("skills", &["skills", "technical skills", "core skills"]),
    ("certifications", &["certifications", "licenses"]),
];

/// A contiguous slice of resume text under one recognized header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeSection {
    pub name: String,
    pub body: String,
}

/// Extracts plain text from raw PDF bytes.
/// Never fails: unreadable input yields an empty string and a warning.
pub fn extract_pdf_text(pdf_bytes: &[u8]) -> String {
    match pdf_extract::extract_text_from_mem(pdf_bytes) {
        Ok(text) => text.trim().to_string(),
        Err(e) => {
            warn!("PDF text extraction failed, treating upload as empty: {e}");
            String::new()
        }
    }
}

/// Normalizes whitespace: CR to LF, runs of spaces/tabs to one space,
/// three-plus blank lines to one.
pub fn clean_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0usize;
    for raw_line in text.replace('\r', "\n").lines() {
        let line = raw_line.split_whitespace().collect::<Vec<_>>().join(" ");
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(&line);
        out.push('\n');
    }
    out.trim().to_string()
}

/// Splits resume text into named sections by scanning for header lines.
///
/// Sections appear in the order their headers occur in the text. When no
/// header is recognized the whole text becomes a single "summary" section.
/// When no experience header is found in a long resume, the opening text is
/// used as a stand-in experience section so it still yields questions.
pub fn split_sections(text: &str) -> Vec<ResumeSection> {
    let cleaned = clean_text(text);

    let mut found: Vec<(usize, &str)> = Vec::new();
    let mut offset = 0usize;
    for line in cleaned.lines() {
        if let Some(name) = header_name(line) {
            found.push((offset, name));
        }
        offset += line.len() + 1;
    }

    if found.is_empty() {
        return vec![ResumeSection {
            name: "summary".to_string(),
            body: cleaned,
        }];
    }

    found.sort_by_key(|(start, _)| *start);

    let mut sections = Vec::with_capacity(found.len());
    for (i, (start, name)) in found.iter().enumerate() {
        let end = found
            .get(i + 1)
            .map(|(next_start, _)| *next_start)
            .unwrap_or(cleaned.len());
        let body = cleaned[*start..end].trim().to_string();
        sections.push(ResumeSection {
            name: (*name).to_string(),
            body,
        });
    }

    // Long resumes without an explicit experience header still carry
    // experience content up front; question it anyway.
    if !sections.iter().any(|s| s.name == "experience") && cleaned.len() > 800 {
        sections.push(ResumeSection {
            name: "experience".to_string(),
            body: truncate_chars(&cleaned, 1500).to_string(),
        });
    }

    sections
}

/// Recognizes a line that is exactly a section header, with or without a
/// trailing colon.
fn header_name(line: &str) -> Option<&'static str> {
    let candidate = line.trim().trim_end_matches(':').trim().to_lowercase();
    if candidate.is_empty() {
        return None;
    }
    for (name, aliases) in HEADERS {
        if aliases.iter().any(|a| *a == candidate) {
            return Some(name);
        }
    }
    None
}

/// Truncates to at most `max` bytes, backing off to a char boundary.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut idx = max;
    while !s.is_char_boundary(idx) {
        idx -= 1;
    }
    &s[..idx]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_collapses_whitespace() {
        let input = "Built\t\tthe  thing\r\n\r\n\r\n\r\nShipped it";
        assert_eq!(clean_text(input), "Built the thing\n\nShipped it");
    }

    #[test]
    fn test_split_sections_recognizes_headers() {
        let text = "Jane Doe\n\nExperience:\nLed the platform team.\n\nSkills\nRust, SQL\n";
        let sections = split_sections(text);
        let names: Vec<&str> = sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["experience", "skills"]);
        assert!(sections[0].body.contains("Led the platform team."));
        assert!(sections[1].body.contains("Rust, SQL"));
    }

    #[test]
    fn test_split_sections_no_headers_falls_back_to_summary() {
        let text = "Just a paragraph about a career.";
        let sections = split_sections(text);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].name, "summary");
        assert_eq!(sections[0].body, "Just a paragraph about a career.");
    }

    #[test]
    fn test_split_sections_synthesizes_experience_for_long_text() {
        let mut text = String::from("Skills\n");
        for _ in 0..120 {
            text.push_str("Rust systems programming and distributed design\n");
        }
        let sections = split_sections(&text);
        assert!(sections.iter().any(|s| s.name == "skills"));
        let exp = sections.iter().find(|s| s.name == "experience").unwrap();
        assert!(exp.body.len() <= 1500);
    }

    #[test]
    fn test_header_name_ignores_inline_mentions() {
        // "experience" buried in a sentence is not a header
        assert_eq!(header_name("I have experience with Rust"), None);
        assert_eq!(header_name("  Work Experience:  "), Some("experience"));
    }

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        let s = "ééééé"; // 2 bytes per char
        assert_eq!(truncate_chars(s, 10), s);
        assert_eq!(truncate_chars(s, 5), "éé");
        assert_eq!(truncate_chars(s, 4), "éé");
    }

    #[test]
    fn test_extract_pdf_text_garbage_bytes_degrade_to_empty() {
        let garbage = b"definitely not a pdf";
        assert_eq!(extract_pdf_text(garbage), "");
    }
}
