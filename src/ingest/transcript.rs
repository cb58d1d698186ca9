//! WebVTT subtitle cleanup.
//!
//! Turns a downloaded `.vtt` subtitle file into a single plain-text script:
//! timestamps, cue numbering, blank lines, and the duplicate lines caused by
//! overlapping captions are dropped, then the remainder is joined and
//! de-noised.

use std::fs;
use std::path::Path;

use regex::Regex;

use crate::error::Result;

/// Read a VTT file and return the cleaned script text.
pub fn clean_vtt_to_script(path: impl AsRef<Path>) -> Result<String> {
    let contents = fs::read_to_string(path)?;
    Ok(clean_vtt_text(&contents))
}

/// Clean raw VTT content into a single script string.
pub fn clean_vtt_text(text: &str) -> String {
    let numbering = Regex::new(r"^\d+$").expect("valid pattern");

    let mut cleaned_lines: Vec<&str> = Vec::new();
    let mut previous_line = "";

    for line in text.lines() {
        let line = line.trim();

        // Skip empty lines, timestamps, and cue numbering
        if line.is_empty() || line.contains("-->") || numbering.is_match(line) {
            continue;
        }

        // Overlapping captions repeat the previous line verbatim
        if line == previous_line {
            continue;
        }

        cleaned_lines.push(line);
        previous_line = line;
    }

    let joined = cleaned_lines.join(" ");

    let punct = Regex::new(r"\s+([.,?!])").expect("valid pattern");
    let tags = Regex::new(r"<[^>]+>").expect("valid pattern");

    let no_punct_gaps = punct.replace_all(&joined, "$1");
    tags.replace_all(&no_punct_gaps, "").into_owned()
}
