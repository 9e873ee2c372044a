//! Decoders for `git config --list` style output and `.gitmodules` files.
//!
//! # Examples
//!
//! ```
//! use git_scribe::config::parse_submodules;
//!
//! let text = "[submodule \"lib\"]\n\tpath = vendor/./lib\n\turl = git@github.com:org/repo.git\n";
//! let modules = parse_submodules(text).unwrap();
//! assert_eq!(modules[0].name, "lib");
//! assert_eq!(modules[0].path.as_deref(), Some("vendor/lib"));
//! assert_eq!(modules[0].url.as_deref(), Some("http://github.com/org/repo.git"));
//! assert_eq!(modules[0].raw_url.as_deref(), Some("git@github.com:org/repo.git"));
//! ```

use error_set::error_set;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

error_set! {
    /// Errors from decoding submodule configuration
    ConfigError := {
        /// A key/value line appears before any `[submodule "..."]` header
        #[display("Entry '{line}' appears outside a submodule section")]
        EntryOutsideSection { line: String },
        /// A submodule header lacks its quoted name
        #[display("Submodule header '{line}' has no quoted name")]
        UnnamedSection { line: String },
    }
}

/// Decode `key=value` lines. Values may themselves contain `=`; lines
/// without one are skipped.
#[must_use]
pub fn parse_config(text: &str) -> BTreeMap<String, String> {
    text.split('\n')
        .filter_map(|line| match line.split_once('=') {
            Some((key, value)) => Some((key.to_string(), value.to_string())),
            None => {
                if !line.is_empty() {
                    log::trace!("skipping config line without '=': {line:?}");
                }
                None
            }
        })
        .collect()
}

/// One `[submodule "name"]` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmoduleEntry {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Browsable `http(s)` form of the remote
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// The url exactly as configured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_url: Option<String>,
    /// Every other key in the block
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl SubmoduleEntry {
    fn set(&mut self, key: &str, value: &str) {
        match key {
            "path" => self.path = Some(normalize_path(value)),
            "url" => {
                self.raw_url = Some(value.to_string());
                self.url = Some(http_url(value));
            }
            _ => {
                self.extra.insert(key.to_string(), value.to_string());
            }
        }
    }
}

/// Decode a `.gitmodules` file into records sorted by name. Empty input
/// yields no records.
///
/// # Errors
///
/// Returns [`ConfigError`] when a key appears before any submodule header or
/// a submodule header has no quoted name.
pub fn parse_submodules(text: &str) -> Result<Vec<SubmoduleEntry>, ConfigError> {
    let mut modules: Vec<SubmoduleEntry> = Vec::new();
    let mut section = Section::None;

    for line in text.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if line.starts_with("[submodule") {
            let name = quoted_name(line).ok_or_else(|| ConfigError::UnnamedSection {
                line: line.to_string(),
            })?;
            modules.push(SubmoduleEntry {
                name: name.to_string(),
                ..SubmoduleEntry::default()
            });
            section = Section::Submodule;
            continue;
        }

        if line.starts_with('[') {
            log::trace!("ignoring non-submodule section {line:?}");
            section = Section::Other;
            continue;
        }

        let (key, value) = line.split_once('=').unwrap_or((line, ""));
        match (section, modules.last_mut()) {
            (Section::Submodule, Some(module)) => module.set(key.trim(), value.trim()),
            (Section::Other, _) => log::trace!("ignoring entry outside submodule section: {line:?}"),
            _ => {
                return Err(ConfigError::EntryOutsideSection {
                    line: line.to_string(),
                });
            }
        }
    }

    modules.sort_by(|a, b| locale_cmp(&a.name, &b.name));
    Ok(modules)
}

#[derive(Clone, Copy)]
enum Section {
    None,
    Submodule,
    Other,
}

fn quoted_name(line: &str) -> Option<&str> {
    let (_, rest) = line.split_once('"')?;
    let (name, _) = rest.split_once('"')?;
    Some(name)
}

/// Rewrite a submodule url into something a browser can open.
///
/// `git://host/path` becomes `http://host/path` and scp-style
/// `user@host:path` becomes `http://host/path`. Urls already starting with
/// `http` are untouched.
#[must_use]
pub fn http_url(raw: &str) -> String {
    if raw.starts_with("http") {
        return raw.to_string();
    }
    if let Some(rest) = raw.strip_prefix("git:") {
        return format!("http:{rest}");
    }
    let host_and_path = raw.split_once('@').map_or(raw, |(_, rest)| rest);
    format!("http://{}", host_and_path.replacen(':', "/", 1))
}

/// Lexically normalise a relative or absolute `/`-separated path.
///
/// Collapses `.` segments, resolves `..` against preceding segments and
/// squeezes repeated separators. A trailing separator is kept.
#[must_use]
pub fn normalize_path(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let absolute = path.starts_with('/');
    let trailing = path.len() > 1 && path.ends_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if absolute => {}
                _ => parts.push(".."),
            },
            _ => parts.push(segment),
        }
    }

    let mut normalized = parts.join("/");
    if absolute {
        normalized.insert(0, '/');
    }
    if normalized.is_empty() {
        normalized.push('.');
    }
    if trailing && !normalized.ends_with('/') {
        normalized.push('/');
    }
    normalized
}

/// Order names the way a locale-aware collation does for plain ASCII:
/// case-insensitive first, lowercase before uppercase on ties.
fn locale_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    #[test]
    fn config_splits_at_first_equals() {
        let conf = parse_config("user.name=Jane\nalias.lg=log --format=%h\nbroken\n\n");
        assert_eq!(conf.len(), 2);
        assert_eq!(conf["user.name"], "Jane");
        assert_eq!(conf["alias.lg"], "log --format=%h");
    }

    #[test]
    fn config_of_nothing() {
        assert!(parse_config("").is_empty());
    }

    #[test]
    fn submodules_empty_input() {
        assert!(parse_submodules("").unwrap().is_empty());
        assert!(parse_submodules("\n\n").unwrap().is_empty());
    }

    #[test]
    fn submodule_ssh_url_is_rewritten() {
        let text = "[submodule \"repo\"]\n\tpath = repo\n\turl = git@github.com:org/repo.git\n";
        let modules = parse_submodules(text).unwrap();
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].url.as_deref(), Some("http://github.com/org/repo.git"));
        assert_eq!(modules[0].raw_url.as_deref(), Some("git@github.com:org/repo.git"));
    }

    #[test]
    fn submodule_git_scheme_becomes_http() {
        assert_eq!(http_url("git://example.com/a.git"), "http://example.com/a.git");
        assert_eq!(http_url("https://example.com/a.git"), "https://example.com/a.git");
        assert_eq!(http_url("example.com:a.git"), "http://example.com/a.git");
    }

    #[test]
    fn submodules_keep_other_keys_and_sort() {
        let text = r#"[submodule "zeta"]
	path = libs/zeta
	url = https://example.com/zeta.git
	branch = stable
[submodule "Alpha"]
	path = ./libs//alpha/
	url = https://example.com/alpha.git
"#;
        let modules = parse_submodules(text).unwrap();
        assert_eq!(modules[0].name, "Alpha");
        assert_eq!(modules[0].path.as_deref(), Some("libs/alpha/"));
        assert_eq!(modules[1].name, "zeta");
        assert_eq!(modules[1].extra["branch"], "stable");

        let json = serde_json::to_value(&modules[1]).unwrap();
        assert_eq!(json["rawUrl"], "https://example.com/zeta.git");
        assert_eq!(json["branch"], "stable");
    }

    #[test]
    fn locale_order_puts_lowercase_first_on_ties() {
        let text = "[submodule \"B\"]\n[submodule \"b\"]\n[submodule \"a\"]\n";
        let names: Vec<String> = parse_submodules(text)
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, vec!["a", "b", "B"]);
    }

    #[test]
    fn entry_before_header_is_rejected() {
        assert!(matches!(
            parse_submodules("path = x\n"),
            Err(ConfigError::EntryOutsideSection { .. })
        ));
    }

    #[test]
    fn header_without_name_is_rejected() {
        assert!(matches!(
            parse_submodules("[submodule]\n"),
            Err(ConfigError::UnnamedSection { .. })
        ));
    }

    #[test]
    fn other_sections_are_ignored() {
        let text = "[submodule \"a\"]\n\tpath = a\n[core]\n\tbare = false\n";
        let modules = parse_submodules(text).unwrap();
        assert_eq!(modules.len(), 1);
        assert!(modules[0].extra.is_empty());
    }

    #[test]
    fn normalize_paths() {
        assert_eq!(normalize_path("a/./b"), "a/b");
        assert_eq!(normalize_path("a/../b"), "b");
        assert_eq!(normalize_path("../x"), "../x");
        assert_eq!(normalize_path("/../x"), "/x");
        assert_eq!(normalize_path("a//b/"), "a/b/");
        assert_eq!(normalize_path("./"), "./");
        assert_eq!(normalize_path("a/.."), ".");
    }
}
