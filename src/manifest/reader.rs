//! Manifest XML parsing
//!
//! Reads exactly the element set the writer produces. Elements may span
//! lines; unknown elements are rejected.

use super::{Manifest, ManifestRecord};
use crate::error::ManifestError;
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Compiled element and attribute patterns, built once per process
struct ManifestGrammar {
    tag: Regex,
    attr: Regex,
}

impl ManifestGrammar {
    fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            tag: Regex::new(r"<(/?)([A-Za-z_?][A-Za-z0-9_]*)([^>]*)>")?,
            attr: Regex::new(r#"([A-Za-z_][A-Za-z0-9_]*)\s*=\s*"([^"]*)""#)?,
        })
    }
}

fn grammar() -> Result<&'static ManifestGrammar, ManifestError> {
    static GRAMMAR: OnceLock<Result<ManifestGrammar, regex::Error>> = OnceLock::new();
    GRAMMAR
        .get_or_init(ManifestGrammar::compile)
        .as_ref()
        .map_err(|e| ManifestError::Grammar(e.clone()))
}

impl Manifest {
    /// Parse manifest XML
    pub fn parse(xml: &str) -> Result<Manifest, ManifestError> {
        let grammar = grammar()?;
        let mut manifest = Manifest::default();
        let mut opened = false;
        let mut closed = false;

        for caps in grammar.tag.captures_iter(xml) {
            let whole = caps.get(0).map(|m| m.start()).unwrap_or(0);
            let line = xml[..whole].matches('\n').count() + 1;
            let closing = &caps[1] == "/";
            let tag = &caps[2];
            let attrs = attributes(&grammar.attr, &caps[3]);
            let malformed = |reason: String| ManifestError::Malformed { line, reason };

            if closed {
                return Err(malformed(format!("<{}> after </patch_data>", tag)));
            }

            match (closing, tag) {
                (false, "?xml") => {}
                (false, "patch_data") => {
                    if opened {
                        return Err(malformed("nested <patch_data>".to_string()));
                    }
                    opened = true;
                    manifest.revision = optional(&attrs, "revision");
                    manifest.url = optional(&attrs, "url");
                }
                (true, "patch_data") => {
                    if !opened {
                        return Err(malformed("</patch_data> without opening tag".to_string()));
                    }
                    closed = true;
                }
                (false, "exclude") | (false, "ignore") | (false, "entry") if !opened => {
                    return Err(malformed(format!("<{}> outside <patch_data>", tag)));
                }
                (false, "exclude") => manifest
                    .excludes
                    .push(required(&attrs, "pattern").map_err(malformed)?),
                (false, "ignore") => manifest
                    .ignores
                    .push(required(&attrs, "pattern").map_err(malformed)?),
                (false, "entry") => manifest
                    .entries
                    .push(record(&attrs).map_err(malformed)?),
                (_, other) => {
                    return Err(malformed(format!("unexpected element <{}>", other)));
                }
            }
        }

        if !closed {
            return Err(ManifestError::Malformed {
                line: xml.lines().count(),
                reason: "missing </patch_data>".to_string(),
            });
        }
        Ok(manifest)
    }

    /// Read and parse a manifest file
    pub fn load(path: &Path) -> Result<Manifest, ManifestError> {
        let xml = fs::read_to_string(path)?;
        Manifest::parse(&xml)
    }
}

fn record(attrs: &HashMap<String, String>) -> Result<ManifestRecord, String> {
    let name = required(attrs, "name")?;
    match required(attrs, "kind")?.as_str() {
        "dir" => Ok(ManifestRecord::Directory { name }),
        "file" => {
            let sha1_digest = required(attrs, "sha1_digest")?;
            if sha1_digest.len() != 40 || !sha1_digest.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(format!("invalid sha1_digest '{}' for '{}'", sha1_digest, name));
            }
            let size_text = required(attrs, "size")?;
            let size = size_text
                .parse::<u64>()
                .map_err(|_| format!("invalid size '{}' for '{}'", size_text, name))?;
            Ok(ManifestRecord::File {
                name,
                sha1_digest,
                size,
            })
        }
        other => Err(format!("unknown entry kind '{}'", other)),
    }
}

fn attributes(attr: &Regex, raw: &str) -> HashMap<String, String> {
    attr.captures_iter(raw)
        .map(|c| (c[1].to_string(), unescape(&c[2])))
        .collect()
}

fn required(attrs: &HashMap<String, String>, key: &str) -> Result<String, String> {
    attrs
        .get(key)
        .cloned()
        .ok_or_else(|| format!("missing attribute '{}'", key))
}

fn optional(attrs: &HashMap<String, String>, key: &str) -> String {
    attrs.get(key).cloned().unwrap_or_default()
}

fn unescape(s: &str) -> String {
    s.replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
