//! Source Normalizer
//!
//! Explorer `SourceCode` payloads come in several shapes:
//! 1. Plain single-file Solidity text
//! 2. Standard JSON Input (`{"language": ..., "sources": {path: {content}}}`)
//! 3. Standard JSON wrapped in an extra brace pair (`{{ ... }}`), which is
//!    how Etherscan returns multi-file verifications
//! 4. Standard JSON encoded a second time as a JSON string
//!
//! Everything is reduced to an ordered list of files. Anything that does not
//! parse into the multi-file shape is passed through as opaque text: a
//! malformed payload is still analyzable source, so it never fails a request.
//!
//! Pure functions, no I/O. Object key order follows the payload (serde_json
//! `preserve_order`), so output is deterministic for a given input.

use serde_json::Value;

use crate::models::types::{NormalizedSource, SourceFile};

/// How many times a JSON string may be unwrapped before giving up
const MAX_STRING_DECODE_DEPTH: usize = 2;

/// Outcome of inspecting a raw source payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceShape {
    /// Does not look like JSON; already a flat source file
    Flat,
    /// Parsed as Standard JSON Input; files in `sources` order
    StandardJson(NormalizedSource),
    /// Valid JSON but not the multi-file shape (no `sources` object)
    OtherJson,
    /// Looked like JSON but failed to parse
    Malformed,
}

impl SourceShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceShape::Flat => "flat",
            SourceShape::StandardJson(_) => "standard_json",
            SourceShape::OtherJson => "other_json",
            SourceShape::Malformed => "malformed",
        }
    }
}

/// Classify a raw payload and extract its files when it is Standard JSON
pub fn parse_source(raw: &str) -> SourceShape {
    let trimmed = raw.trim();
    if !looks_like_json_document(trimmed) {
        return SourceShape::Flat;
    }

    let Some(value) = decode_document(trimmed) else {
        return SourceShape::Malformed;
    };

    match value.get("sources").and_then(Value::as_object) {
        Some(sources) => {
            let files = sources
                .iter()
                .filter_map(|(path, entry)| {
                    entry
                        .get("content")
                        .and_then(Value::as_str)
                        .map(|content| SourceFile {
                            path: Some(path.clone()),
                            content: content.to_string(),
                        })
                })
                .collect();
            SourceShape::StandardJson(NormalizedSource { files })
        }
        None => SourceShape::OtherJson,
    }
}

/// Normalize into an ordered file list. Non-multi-file payloads become one unnamed file.
pub fn normalize_source(raw: &str) -> NormalizedSource {
    match parse_source(raw) {
        SourceShape::StandardJson(source) => source,
        SourceShape::Flat | SourceShape::OtherJson | SourceShape::Malformed => {
            NormalizedSource::flat(raw)
        }
    }
}

/// Flattened, file-annotated source string. Non-multi-file payloads are returned unchanged.
pub fn normalize(raw: &str) -> String {
    match parse_source(raw) {
        SourceShape::StandardJson(source) => source.flatten(),
        _ => raw.to_string(),
    }
}

/// An object, or a JSON string that holds one
fn looks_like_json_document(trimmed: &str) -> bool {
    trimmed.starts_with('{') || trimmed.starts_with("\"{")
}

/// Parse once; unwrap JSON strings by parsing their contents again.
/// The `{{ ... }}` wrapper is not valid JSON on its own and gets one brace pair
/// stripped, at the top level and inside each unwrapped string.
fn decode_document(text: &str) -> Option<Value> {
    let mut value = parse_lenient(text)?;

    for _ in 0..MAX_STRING_DECODE_DEPTH {
        let Value::String(inner) = &value else {
            break;
        };
        value = parse_lenient(inner.trim())?;
    }

    value.is_object().then_some(value)
}

fn parse_lenient(text: &str) -> Option<Value> {
    serde_json::from_str::<Value>(text)
        .ok()
        .or_else(|| strip_outer_braces(text).and_then(|inner| serde_json::from_str(inner).ok()))
}

fn strip_outer_braces(text: &str) -> Option<&str> {
    text.strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
        .filter(|inner| inner.trim_start().starts_with('{') && inner.trim_end().ends_with('}'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn standard_json(files: &[(&str, &str)]) -> String {
        let mut sources = serde_json::Map::new();
        for (path, content) in files {
            sources.insert(path.to_string(), json!({ "content": content }));
        }
        json!({
            "language": "Solidity",
            "sources": sources,
            "settings": { "optimizer": { "enabled": true, "runs": 200 } }
        })
        .to_string()
    }

    #[test]
    fn test_plain_solidity_unchanged() {
        let src = "// SPDX-License-Identifier: MIT\npragma solidity ^0.8.0;\ncontract A { }";
        assert_eq!(parse_source(src), SourceShape::Flat);
        assert_eq!(normalize(src), src);
    }

    #[test]
    fn test_standard_json_flattened_in_order() {
        let raw = standard_json(&[
            ("contracts/Token.sol", "contract Token {}"),
            ("@openzeppelin/contracts/access/Ownable.sol", "contract Ownable {}"),
            ("contracts/Alpha.sol", "contract Alpha {}"),
        ]);

        let out = normalize(&raw);
        assert_eq!(
            out,
            "// File: contracts/Token.sol\ncontract Token {}\n\n\
             // File: @openzeppelin/contracts/access/Ownable.sol\ncontract Ownable {}\n\n\
             // File: contracts/Alpha.sol\ncontract Alpha {}"
        );
        assert_eq!(out.matches("// File:").count(), 3);
    }

    #[test]
    fn test_marker_count_matches_file_count() {
        for n in 0..6 {
            let files: Vec<(String, String)> = (0..n)
                .map(|i| (format!("src/F{}.sol", i), format!("contract F{} {{}}", i)))
                .collect();
            let refs: Vec<(&str, &str)> = files
                .iter()
                .map(|(p, c)| (p.as_str(), c.as_str()))
                .collect();
            let out = normalize(&standard_json(&refs));
            assert_eq!(out.matches("// File: ").count(), n);
            let positions: Vec<usize> = (0..n)
                .map(|i| out.find(&format!("// File: src/F{}.sol", i)).unwrap())
                .collect();
            assert!(positions.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_deterministic() {
        let raw = standard_json(&[("b.sol", "B"), ("a.sol", "A")]);
        assert_eq!(normalize(&raw), normalize(&raw));
        assert_eq!(normalize_source(&raw), normalize_source(&raw));
    }

    #[test]
    fn test_double_brace_wrapper_matches_single_encoding() {
        let single = standard_json(&[("A.sol", "contract A {}"), ("B.sol", "contract B {}")]);
        let wrapped = format!("{{{}}}", single);
        assert!(wrapped.starts_with("{{"));
        assert_eq!(normalize(&wrapped), normalize(&single));
    }

    #[test]
    fn test_json_string_encoding_matches_single_encoding() {
        let single = standard_json(&[("A.sol", "contract A {}")]);
        let quoted = serde_json::to_string(&single).unwrap();
        assert!(quoted.starts_with("\"{"));
        assert_eq!(normalize(&quoted), normalize(&single));
    }

    #[test]
    fn test_quoted_brace_wrapper_matches_single_encoding() {
        let single = standard_json(&[("A.sol", "contract A {}"), ("B.sol", "contract B {}")]);
        let quoted = serde_json::to_string(&format!("{{{}}}", single)).unwrap();
        assert!(quoted.starts_with("\"{{"));
        assert!(matches!(parse_source(&quoted), SourceShape::StandardJson(_)));
        assert_eq!(normalize(&quoted), normalize(&single));
        assert_eq!(normalize(&quoted), "// File: A.sol\ncontract A {}\n\n// File: B.sol\ncontract B {}");
    }

    #[test]
    fn test_empty_sources_is_empty_string() {
        let raw = json!({ "language": "Solidity", "sources": {} }).to_string();
        assert_eq!(normalize(&raw), "");
        assert!(normalize_source(&raw).is_blank());
    }

    #[test]
    fn test_entries_without_content_skipped() {
        let raw = json!({
            "sources": {
                "A.sol": { "content": "contract A {}" },
                "B.sol": { "urls": ["ipfs://x"] },
                "C.sol": { "content": 42 },
                "D.sol": { "content": "contract D {}" }
            }
        })
        .to_string();

        let normalized = normalize_source(&raw);
        assert_eq!(normalized.file_count(), 2);
        assert_eq!(
            normalize(&raw),
            "// File: A.sol\ncontract A {}\n\n// File: D.sol\ncontract D {}"
        );
    }

    #[test]
    fn test_malformed_json_falls_back_to_raw() {
        let raw = "{ this is not json at all";
        assert_eq!(parse_source(raw), SourceShape::Malformed);
        assert_eq!(normalize(raw), raw);
        assert_eq!(normalize_source(raw), NormalizedSource::flat(raw));
    }

    #[test]
    fn test_json_without_sources_falls_back_to_raw() {
        let raw = r#"{"language": "Solidity", "settings": {}}"#;
        assert_eq!(parse_source(raw), SourceShape::OtherJson);
        assert_eq!(normalize(raw), raw);
    }

    #[test]
    fn test_non_object_sources_falls_back_to_raw() {
        let raw = r#"{"sources": ["A.sol"]}"#;
        assert_eq!(parse_source(raw), SourceShape::OtherJson);
        assert_eq!(normalize(raw), raw);
    }

    #[test]
    fn test_non_object_top_level_is_flat() {
        assert_eq!(parse_source("[1, 2, 3]"), SourceShape::Flat);
        assert_eq!(normalize("[1, 2, 3]"), "[1, 2, 3]");
    }

    #[test]
    fn test_quoted_non_object_is_malformed() {
        let raw = serde_json::to_string("{ not json").unwrap();
        assert_eq!(parse_source(&raw), SourceShape::Malformed);
        assert_eq!(normalize(&raw), raw);
    }

    #[test]
    fn test_source_starting_with_brace_comment_is_not_misread() {
        // Braces at the start of a flat file must not trigger multi-file handling
        let raw = "{{ template }}\ncontract A {}";
        assert_eq!(parse_source(raw), SourceShape::Malformed);
        assert_eq!(normalize(raw), raw);
    }
}
