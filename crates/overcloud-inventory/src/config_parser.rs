//! INI-style configuration file parser.
//!
//! Parsing is lenient: lines that fit no rule are dropped rather than
//! failing the file, since collected files are frequently hand-edited.

/// One `key = value` entry of a configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEntry {
    pub section: Option<String>,
    pub name: String,
    pub value: String,
    pub description: Option<String>,
}

/// Parse configuration text into entries, in file order.
///
/// - `[section]` switches the current section
/// - `key = value` and `key: value` produce an entry; the separator that
///   comes first wins
/// - `#` and `;` comment lines accumulate into the description of the next
///   entry; a blank line or section header discards them
/// - an indented line directly after an entry continues its value
#[must_use]
pub fn parse_config(contents: &str) -> Vec<ConfigEntry> {
    let mut entries: Vec<ConfigEntry> = Vec::new();
    let mut section: Option<String> = None;
    let mut comments: Vec<String> = Vec::new();
    let mut continuing = false;

    for raw in contents.lines() {
        let line = raw.trim();

        if line.is_empty() {
            comments.clear();
            continuing = false;
            continue;
        }

        if continuing && raw.starts_with(char::is_whitespace) && !is_comment(line) {
            if let Some(last) = entries.last_mut() {
                if !last.value.is_empty() {
                    last.value.push(' ');
                }
                last.value.push_str(line);
            }
            continue;
        }
        continuing = false;

        if is_comment(line) {
            comments.push(line[1..].trim().to_owned());
            continue;
        }

        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            section = Some(name.trim().to_owned());
            comments.clear();
            continue;
        }

        let Some((name, value)) = split_key_value(line) else {
            comments.clear();
            continue;
        };

        let description = (!comments.is_empty()).then(|| comments.join("\n"));
        comments.clear();
        entries.push(ConfigEntry {
            section: section.clone(),
            name: name.to_owned(),
            value: value.to_owned(),
            description,
        });
        continuing = true;
    }

    entries
}

fn is_comment(line: &str) -> bool {
    line.starts_with('#') || line.starts_with(';')
}

fn split_key_value(line: &str) -> Option<(&str, &str)> {
    let at = line.find(['=', ':'])?;
    let name = line[..at].trim();
    if name.is_empty() {
        return None;
    }
    Some((name, line[at + 1..].trim()))
}
