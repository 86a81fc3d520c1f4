//! Line-oriented classifier for free-text listing descriptions.
//!
//! Source descriptions are unstructured German marketing text with wildly
//! inconsistent formatting, not a machine-readable schema. This parser is a
//! known-lossy, best-effort classifier tuned for recall: it strips the
//! HTML-ish markup, walks the text line by line with a current-section
//! marker, and sorts lines into features, packages, and paint/upholstery
//! attributes using keyword rules. The keyword lists live in
//! [`EquipmentKeywords`] as data, so new site phrasing can be accommodated
//! without touching the control flow.

use crate::models::ParsedEquipment;

/// Keyword rules driving the classifier.
#[derive(Debug, Clone)]
pub struct EquipmentKeywords {
    /// Section headers that switch the walker into equipment mode.
    pub equipment_sections: Vec<String>,
    /// Substrings marking a line as a package name.
    pub packages: Vec<String>,
    /// Substrings marking a line as the exterior paint description.
    pub paint: Vec<String>,
    /// Substrings marking a line as upholstery/interior description.
    pub upholstery: Vec<String>,
    /// Substrings marking internal dealer bookkeeping lines to drop.
    pub vehicle_number: Vec<String>,
    /// Lines shorter than this are discarded as noise.
    pub min_line_len: usize,
    /// Feature length window, in characters. Excludes both short noise
    /// fragments and paragraph-length prose.
    pub feature_len: (usize, usize),
    /// Package lines longer than this are prose, not package names.
    pub max_package_len: usize,
}

impl EquipmentKeywords {
    /// Rule set for German-language listings. All keywords lowercase;
    /// matching is case-insensitive substring.
    pub fn german() -> Self {
        Self {
            equipment_sections: vec![
                "sonderausstattung".into(),
                "serienausstattung".into(),
                "ausstattung".into(),
            ],
            packages: vec!["paket".into(), "package".into()],
            paint: vec![
                "lackierung".into(),
                "metallic".into(),
                "außenfarbe".into(),
                "aussenfarbe".into(),
            ],
            upholstery: vec![
                "polster".into(),
                "leder".into(),
                "alcantara".into(),
                "stoffsitze".into(),
                "innenausstattung".into(),
            ],
            vehicle_number: vec!["fahrzeugnummer".into(), "fahrzeug-nr".into(), "fzg-nr".into()],
            min_line_len: 3,
            feature_len: (4, 100),
            max_package_len: 50,
        }
    }
}

impl Default for EquipmentKeywords {
    fn default() -> Self {
        Self::german()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Section {
    None,
    Equipment,
    Packages,
}

/// Parses a description with the default German rule set.
pub fn parse_equipment(description: &str) -> ParsedEquipment {
    parse_equipment_with(description, &EquipmentKeywords::german())
}

/// Parses a description with an explicit rule set. Never fails: empty input
/// yields empty lists and no colors.
pub fn parse_equipment_with(description: &str, rules: &EquipmentKeywords) -> ParsedEquipment {
    let mut parsed = ParsedEquipment::default();
    if description.trim().is_empty() {
        return parsed;
    }

    let text = strip_html(description);
    let mut section = Section::None;

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        let lower = line.to_lowercase();

        // Section headers switch the walker's mode; the header line itself
        // is not a feature.
        if line.chars().count() < 60
            && rules.equipment_sections.iter().any(|k| lower.contains(k.as_str()))
            && !is_bulleted(line)
        {
            section = Section::Equipment;
            continue;
        }

        if line.chars().count() < rules.min_line_len
            || rules.vehicle_number.iter().any(|k| lower.contains(k.as_str()))
        {
            continue;
        }

        if rules.paint.iter().any(|k| lower.contains(k.as_str())) {
            if parsed.exterior_color.is_none() {
                parsed.exterior_color = Some(clean_line(line));
            }
            continue;
        }

        if rules.upholstery.iter().any(|k| lower.contains(k.as_str())) {
            if parsed.interior_color.is_none() {
                let value = clean_line(line);
                parsed.interior_color = Some(value.clone());
                parsed.upholstery = Some(value);
            }
            continue;
        }

        if rules.packages.iter().any(|k| lower.contains(k.as_str()))
            && line.chars().count() < rules.max_package_len
        {
            section = Section::Packages;
            let name = clean_line(line);
            if !parsed.packages.contains(&name) {
                parsed.packages.push(name);
            }
            continue;
        }

        if is_bulleted(line) || section == Section::Equipment {
            let feature = clean_line(line);
            let len = feature.chars().count();
            let (min, max) = rules.feature_len;
            if len >= min && len <= max && !parsed.features.contains(&feature) {
                parsed.features.push(feature);
            }
        }
    }

    parsed
}

fn is_bulleted(line: &str) -> bool {
    line.starts_with("- ")
        || line.starts_with('•')
        || line.starts_with('·')
        || line.starts_with("* ")
}

/// Strips bullet markers and trailing colons from a classified line.
fn clean_line(line: &str) -> String {
    line.trim_start_matches(['-', '•', '·', '*', ' '])
        .trim_end_matches(':')
        .trim()
        .to_string()
}

/// Converts HTML-ish markup to plain lines: block-level tags become line
/// breaks, list items become bulleted lines, everything else is dropped.
fn strip_html(input: &str) -> String {
    let mut text = input.to_string();
    for tag in ["<br>", "<br/>", "<br />", "<BR>", "<hr>", "<hr/>", "<hr />"] {
        text = text.replace(tag, "\n");
    }
    text = text.replace("<li>", "\n- ").replace("<LI>", "\n- ");
    for tag in ["</li>", "<ul>", "</ul>", "<strong>", "</strong>"] {
        text = text.replace(tag, "\n");
    }

    // Drop any remaining tags.
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }

    out.replace("&amp;", "&").replace("&nbsp;", " ")
}
