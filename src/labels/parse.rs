use serde::Serialize;

use super::tables::{CONDITION_NAMES, PLANT_NAMES, UNKNOWN_PLANT};

const SEPARATOR: &str = "___";

/// Display names derived from a raw `<plant>___<condition>` classifier label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedLabel {
    pub plant: String,
    pub condition: String,
}

impl ParsedLabel {
    /// `"<plant> - <condition>"`, used for alternative classes.
    pub fn display_name(&self) -> String {
        format!("{} - {}", self.plant, self.condition)
    }
}

pub fn parse_label(label: &str) -> ParsedLabel {
    let parts: Vec<&str> = label.split(SEPARATOR).collect();
    let [plant_code, condition_code] = parts.as_slice() else {
        return ParsedLabel {
            plant: UNKNOWN_PLANT.to_string(),
            condition: label.to_string(),
        };
    };

    let plant_display = humanize(plant_code);
    let plant = lookup(PLANT_NAMES, &plant_display)
        .map(str::to_string)
        .unwrap_or(plant_display);

    let condition = lookup(CONDITION_NAMES, condition_code)
        .map(str::to_string)
        .unwrap_or_else(|| humanize(condition_code));

    ParsedLabel { plant, condition }
}

/// Exact (case-insensitive) key first, then the first key that contains the
/// segment or is contained in it.
fn lookup(table: &'static [(&'static str, &'static str)], segment: &str) -> Option<&'static str> {
    let needle = segment.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    if let Some((_, value)) = table.iter().find(|(key, _)| key.to_lowercase() == needle) {
        return Some(value);
    }

    table
        .iter()
        .find(|(key, _)| {
            let key = key.to_lowercase();
            needle.contains(&key) || key.contains(&needle)
        })
        .map(|(_, value)| *value)
}

/// Underscores to spaces, collapsed whitespace, and an upper-case letter at
/// the start of every word (`corn_(maize)` becomes `Corn (Maize)`).
pub fn humanize(code: &str) -> String {
    let spaced = code.replace('_', " ");
    let collapsed = spaced.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut out = String::with_capacity(collapsed.len());
    let mut prev_is_word = false;
    for ch in collapsed.chars() {
        let is_word = ch.is_alphanumeric();
        if is_word && !prev_is_word {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        prev_is_word = is_word;
    }
    out
}
