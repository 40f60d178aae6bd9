//! Reader for the small text alias format that groups several sequence
//! database volumes under one title. Historical alias files look like:
//!
//! ```text
//! TITLE Reference proteins
//! DBLIST vol1 vol2 vol3
//! ```
//!
//! This is a best-effort reader, not a validator: unrecognised lines are
//! ignored rather than rejected.

/// The parsed contents of one alias file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasFile {
    pub title: Option<String>,
    pub volumes: Vec<String>,
}

/// Parse an alias file's text. `TITLE` sets the title (the last one wins if
/// there is more than one); each `DBLIST` line contributes its
/// whitespace-separated volume names, in order, across however many such
/// lines appear.
pub fn parse_alias_file(text: &str) -> AliasFile {
    let mut alias = AliasFile::default();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((keyword, rest)) = line.split_once(char::is_whitespace) else {
            continue;
        };
        let rest = rest.trim();

        match keyword {
            "TITLE" => alias.title = Some(rest.to_string()),
            "DBLIST" => alias.volumes.extend(rest.split_whitespace().map(str::to_string)),
            _ => {}
        }
    }

    alias
}
