//! Minimal text edits on tolerant JSON documents.
//!
//! Both operations touch only the bytes of the member being set or removed.
//! Comments, key order, and whitespace elsewhere in the document survive
//! unchanged.

use super::parser::{self, Member, Node};
use crate::error::{InstallerError, Result};
use serde_json::{Map, Value};

const INDENT: &str = "  ";

/// Set `path` to `value`, creating missing intermediate objects.
///
/// An intermediate that exists but is not an object is replaced.
pub fn upsert(text: &str, path: &[&str], value: &Value) -> Result<String> {
    let Some((key, parents)) = path.split_last() else {
        return Err(InstallerError::ConfigParse("empty key path".to_string()));
    };
    let newline = detect_newline(text);

    if parser::is_blank(text) {
        let document = nest(path, value);
        let rendered = render(&document, "", newline)?;
        return Ok(format!("{}{}", rendered, newline));
    }

    let root = parser::parse(text)?;
    if !root.is_object() {
        return Err(InstallerError::ConfigParse(
            "top-level value is not an object".to_string(),
        ));
    }

    let mut object = &root;
    for (index, segment) in parents.iter().enumerate() {
        let remaining = &path[index + 1..];
        match object.member(segment) {
            Some(member) if member.value.is_object() => object = &member.value,
            Some(member) => {
                return replace_value(text, member, &nest(remaining, value), newline);
            }
            None => {
                return insert_member(text, object, segment, &nest(remaining, value), newline);
            }
        }
    }

    match object.member(key) {
        Some(member) => replace_value(text, member, value, newline),
        None => insert_member(text, object, key, value, newline),
    }
}

/// Delete the member at `path`, including any duplicates of its key.
/// Missing parents or keys leave the text as is.
pub fn remove(text: &str, path: &[&str]) -> Result<String> {
    let mut current = text.to_string();
    while let Some(next) = remove_last(&current, path)? {
        current = next;
    }
    Ok(current)
}

/// Delete the last member at `path`, or `None` when there is nothing to delete.
fn remove_last(text: &str, path: &[&str]) -> Result<Option<String>> {
    let Some((key, parents)) = path.split_last() else {
        return Ok(None);
    };
    if parser::is_blank(text) {
        return Ok(None);
    }

    let root = parser::parse(text)?;
    let mut object = &root;
    for segment in parents {
        match object.member(segment) {
            Some(member) if member.value.is_object() => object = &member.value,
            _ => return Ok(None),
        }
    }
    if !object.is_object() {
        return Ok(None);
    }

    let members = object.members();
    let Some(index) = members.iter().rposition(|m| m.key == *key) else {
        return Ok(None);
    };
    let member = &members[index];
    let member_end = member.comma.map_or(member.value.end, |c| c + 1);

    // Sole member: collapse to `{}` unless comments live inside.
    if members.len() == 1
        && text[object.start + 1..member.key_start].trim().is_empty()
        && text[member_end..object.end - 1].trim().is_empty()
    {
        return Ok(Some(splice(text, object.start + 1, object.end - 1, "")));
    }

    if let Some(comma) = member.comma {
        let start = own_line_start(text, member.key_start).unwrap_or(member.key_start);
        let end = if start < member.key_start {
            end_of_trailing_line(text, comma + 1)
        } else {
            skip_spaces(text, comma + 1)
        };
        return Ok(Some(splice(text, start, end, "")));
    }

    // Last member without a trailing comma: the previous member's comma goes too.
    let Some(comma) = index.checked_sub(1).and_then(|i| members[i].comma) else {
        return Ok(Some(splice(text, member.key_start, member.value.end, "")));
    };
    if text[comma + 1..member.key_start].trim().is_empty() {
        return Ok(Some(splice(text, comma, member.value.end, "")));
    }

    // Comments between the two members stay where they are
    let start = match own_line_start(text, member.key_start) {
        Some(line) if line > 0 => line_break_before(text, line),
        _ => member.key_start,
    };
    let without_member = splice(text, start, member.value.end, "");
    Ok(Some(splice(&without_member, comma, comma + 1, "")))
}

/// Replace the value of an existing member, keeping the key and everything
/// around it.
fn replace_value(text: &str, member: &Member, value: &Value, newline: &str) -> Result<String> {
    let indent = line_indent(text, member.key_start);
    let rendered = render(value, indent, newline)?;
    Ok(splice(text, member.value.start, member.value.end, &rendered))
}

fn insert_member(
    text: &str,
    object: &Node,
    key: &str,
    value: &Value,
    newline: &str,
) -> Result<String> {
    let object_indent = line_indent(text, object.start);

    let Some(last) = object.members().last() else {
        let indent = format!("{}{}", object_indent, INDENT);
        let member = render_member(key, value, &indent, newline)?;
        let inner = &text[object.start + 1..object.end - 1];
        return Ok(if inner.trim().is_empty() {
            splice(
                text,
                object.start + 1,
                object.end - 1,
                &format!("{}{}{}{}{}", newline, indent, member, newline, object_indent),
            )
        } else {
            splice(
                text,
                object.start + 1,
                object.start + 1,
                &format!("{}{}{}", newline, indent, member),
            )
        });
    };

    if !text[object.start..object.end].contains('\n') {
        let member = format!(
            "{}: {}",
            serde_json::to_string(key)?,
            serde_json::to_string(value)?
        );
        return Ok(match last.comma {
            Some(comma) => splice(text, comma + 1, comma + 1, &format!(" {}", member)),
            None => splice(text, last.value.end, last.value.end, &format!(", {}", member)),
        });
    }

    let indent = if own_line_start(text, last.key_start).is_some() {
        line_indent(text, last.key_start).to_string()
    } else {
        format!("{}{}", object_indent, INDENT)
    };
    let member = render_member(key, value, &indent, newline)?;
    let addition = format!("{}{}{}", newline, indent, member);

    Ok(match last.comma {
        Some(comma) => {
            let at = end_of_comment_line(text, comma + 1);
            splice(text, at, at, &addition)
        }
        None => {
            let at = end_of_comment_line(text, last.value.end);
            let mut result = String::with_capacity(text.len() + addition.len() + 1);
            result.push_str(&text[..last.value.end]);
            result.push(',');
            result.push_str(&text[last.value.end..at]);
            result.push_str(&addition);
            result.push_str(&text[at..]);
            result
        }
    })
}

/// Wrap `value` in one object per path segment.
fn nest(path: &[&str], value: &Value) -> Value {
    path.iter().rev().fold(value.clone(), |inner, key| {
        let mut map = Map::new();
        map.insert(key.to_string(), inner);
        Value::Object(map)
    })
}

fn render_member(key: &str, value: &Value, indent: &str, newline: &str) -> Result<String> {
    let key = serde_json::to_string(key)?;
    Ok(format!("{}: {}", key, render(value, indent, newline)?))
}

/// Pretty-print with two-space indentation, shifting continuation lines to
/// sit under `indent`.
fn render(value: &Value, indent: &str, newline: &str) -> Result<String> {
    let pretty = serde_json::to_string_pretty(value)?;
    let separator = format!("{}{}", newline, indent);
    Ok(pretty.lines().collect::<Vec<_>>().join(&separator))
}

fn splice(text: &str, start: usize, end: usize, replacement: &str) -> String {
    let mut result = String::with_capacity(text.len() + replacement.len());
    result.push_str(&text[..start]);
    result.push_str(replacement);
    result.push_str(&text[end..]);
    result
}

fn detect_newline(text: &str) -> &'static str {
    if text.contains("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}

fn line_start(text: &str, pos: usize) -> usize {
    text[..pos].rfind('\n').map_or(0, |nl| nl + 1)
}

/// Offset of the newline (`\n` or `\r\n`) ending the line before `line`.
fn line_break_before(text: &str, line: usize) -> usize {
    if line >= 2 && text.as_bytes()[line - 2] == b'\r' {
        line - 2
    } else {
        line - 1
    }
}

/// Start of the line containing `pos`, if only indentation precedes `pos`.
fn own_line_start(text: &str, pos: usize) -> Option<usize> {
    let start = line_start(text, pos);
    text[start..pos]
        .chars()
        .all(|c| c == ' ' || c == '\t')
        .then_some(start)
}

/// Leading spaces and tabs of the line containing `pos`.
fn line_indent(text: &str, pos: usize) -> &str {
    let start = line_start(text, pos);
    let rest = &text[start..];
    let width = rest.len() - rest.trim_start_matches([' ', '\t']).len();
    &rest[..width]
}

fn skip_spaces(text: &str, pos: usize) -> usize {
    let rest = &text[pos..];
    pos + (rest.len() - rest.trim_start_matches([' ', '\t']).len())
}

/// Position just before the newline ending the current line, when the rest of
/// the line is blank or a `//` comment. Otherwise `pos` itself.
fn end_of_comment_line(text: &str, pos: usize) -> usize {
    let after_spaces = skip_spaces(text, pos);
    let rest = &text[after_spaces..];
    if rest.starts_with("//") {
        let eol = rest.find('\n').map_or(text.len(), |i| after_spaces + i);
        if text[..eol].ends_with('\r') {
            eol - 1
        } else {
            eol
        }
    } else {
        pos
    }
}

/// Position just after the newline ending the current line, when the rest of
/// the line is blank or a `//` comment. Otherwise the first non-space position.
fn end_of_trailing_line(text: &str, pos: usize) -> usize {
    let after_spaces = skip_spaces(text, pos);
    let rest = &text[after_spaces..];
    let line_remainder = rest.find('\n').map_or(rest, |i| &rest[..i]);
    let line_remainder = line_remainder.trim_end_matches('\r');
    if line_remainder.is_empty() || line_remainder.starts_with("//") {
        rest.find('\n').map_or(text.len(), |i| after_spaces + i + 1)
    } else {
        after_spaces
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry() -> Value {
        json!({"command": "uvx", "args": ["codealive-mcp"]})
    }

    #[test]
    fn test_upsert_into_blank_document() {
        let result = upsert("", &["mcpServers", "codealive"], &entry()).unwrap();
        assert_eq!(
            result,
            r#"{
  "mcpServers": {
    "codealive": {
      "command": "uvx",
      "args": [
        "codealive-mcp"
      ]
    }
  }
}
"#
        );
    }

    #[test]
    fn test_upsert_creates_missing_property() {
        let text = "{\n  \"theme\": \"dark\"\n}\n";
        let result = upsert(text, &["mcpServers", "codealive"], &json!({"a": 1})).unwrap();
        assert_eq!(
            result,
            "{\n  \"theme\": \"dark\",\n  \"mcpServers\": {\n    \"codealive\": {\n      \"a\": 1\n    }\n  }\n}\n"
        );
    }

    #[test]
    fn test_upsert_appends_to_existing_property() {
        let text = r#"{
  "mcpServers": {
    "other": {
      "command": "node"
    }
  }
}"#;
        let result = upsert(text, &["mcpServers", "codealive"], &json!({"a": 1})).unwrap();
        assert_eq!(
            result,
            r#"{
  "mcpServers": {
    "other": {
      "command": "node"
    },
    "codealive": {
      "a": 1
    }
  }
}"#
        );
    }

    #[test]
    fn test_upsert_replaces_existing_entry() {
        let text = r#"{
  "mcpServers": {
    "codealive": {"old": true},
    "other": {}
  }
}"#;
        let result = upsert(text, &["mcpServers", "codealive"], &json!({"a": 1})).unwrap();
        assert_eq!(
            result,
            r#"{
  "mcpServers": {
    "codealive": {
      "a": 1
    },
    "other": {}
  }
}"#
        );
    }

    #[test]
    fn test_upsert_preserves_comments_and_trailing_commas() {
        let text = r#"// Zed settings
{
  /* appearance */
  "theme": "One Dark", // keep me
  "context_servers": {
    "other": {"command": "x"}, // other server
  },
}
"#;
        let result = upsert(text, &["context_servers", "codealive"], &json!(1)).unwrap();
        assert_eq!(
            result,
            r#"// Zed settings
{
  /* appearance */
  "theme": "One Dark", // keep me
  "context_servers": {
    "other": {"command": "x"}, // other server
    "codealive": 1
  },
}
"#
        );
        let parsed = parser::parse(&result).unwrap().to_value(&result).unwrap();
        assert_eq!(parsed["context_servers"]["codealive"], json!(1));
        assert_eq!(parsed["theme"], json!("One Dark"));
    }

    #[test]
    fn test_upsert_after_trailing_line_comment() {
        let text = "{\n  \"a\": 1 // note\n}";
        let result = upsert(text, &["b"], &json!(2)).unwrap();
        assert_eq!(result, "{\n  \"a\": 1, // note\n  \"b\": 2\n}");
    }

    #[test]
    fn test_upsert_into_empty_objects() {
        let result = upsert("{}", &["servers", "codealive"], &json!(1)).unwrap();
        assert_eq!(result, "{\n  \"servers\": {\n    \"codealive\": 1\n  }\n}");

        let text = "{\n  \"servers\": {}\n}";
        let result = upsert(text, &["servers", "codealive"], &json!(1)).unwrap();
        assert_eq!(result, "{\n  \"servers\": {\n    \"codealive\": 1\n  }\n}");
    }

    #[test]
    fn test_upsert_into_object_with_only_comments() {
        let text = "{\n  // nothing yet\n}";
        let result = upsert(text, &["mcp"], &json!(true)).unwrap();
        assert_eq!(result, "{\n  \"mcp\": true\n  // nothing yet\n}");
    }

    #[test]
    fn test_upsert_replaces_non_object_property() {
        let text = r#"{"mcp": null}"#;
        let result = upsert(text, &["mcp", "codealive"], &json!(1)).unwrap();
        let parsed: Value = serde_json::from_str(&result).unwrap();
        assert_eq!(parsed, json!({"mcp": {"codealive": 1}}));
    }

    #[test]
    fn test_upsert_keeps_crlf_newlines() {
        let text = "{\r\n  \"a\": 1\r\n}\r\n";
        let result = upsert(text, &["b", "c"], &json!(2)).unwrap();
        assert_eq!(
            result,
            "{\r\n  \"a\": 1,\r\n  \"b\": {\r\n    \"c\": 2\r\n  }\r\n}\r\n"
        );
    }

    #[test]
    fn test_upsert_rejects_invalid_documents() {
        assert!(upsert("[1, 2]", &["a"], &json!(1)).is_err());
        assert!(upsert("{ broken", &["a"], &json!(1)).is_err());
    }

    #[test]
    fn test_remove_middle_member() {
        let text = r#"{
  "mcpServers": {
    "codealive": {
      "command": "uvx"
    },
    "other": {}
  }
}"#;
        let result = remove(text, &["mcpServers", "codealive"]).unwrap();
        assert_eq!(result, "{\n  \"mcpServers\": {\n    \"other\": {}\n  }\n}");
    }

    #[test]
    fn test_remove_last_member() {
        let text = "{\n  \"mcpServers\": {\n    \"other\": {},\n    \"codealive\": {}\n  }\n}";
        let result = remove(text, &["mcpServers", "codealive"]).unwrap();
        assert_eq!(result, "{\n  \"mcpServers\": {\n    \"other\": {}\n  }\n}");
    }

    #[test]
    fn test_remove_sole_member() {
        let text = "{\n  \"mcpServers\": {\n    \"codealive\": {}\n  },\n  \"x\": 1\n}";
        let result = remove(text, &["mcpServers", "codealive"]).unwrap();
        assert_eq!(result, "{\n  \"mcpServers\": {},\n  \"x\": 1\n}");
    }

    #[test]
    fn test_remove_keeps_unrelated_comments() {
        let text = "{\n  // servers\n  \"s\": {\n    \"codealive\": 1, // ours\n    \"b\": 2 // theirs\n  }\n}";
        let result = remove(text, &["s", "codealive"]).unwrap();
        assert_eq!(
            result,
            "{\n  // servers\n  \"s\": {\n    \"b\": 2 // theirs\n  }\n}"
        );
    }

    #[test]
    fn test_add_then_remove_keeps_sibling_comment() {
        let text = "{\n  \"mcpServers\": {\n    \"other\": {\"command\": \"node\"} // keep this note\n  }\n}\n";
        let added = upsert(text, &["mcpServers", "codealive"], &json!({"a": 1})).unwrap();
        assert!(added.contains("\"other\": {\"command\": \"node\"}, // keep this note"));

        let removed = remove(&added, &["mcpServers", "codealive"]).unwrap();
        assert_eq!(removed, text);
    }

    #[test]
    fn test_remove_last_member_after_comment_line_crlf() {
        let text = "{\r\n  \"a\": 1,\r\n  // divider\r\n  \"b\": 2\r\n}";
        let result = remove(text, &["b"]).unwrap();
        assert_eq!(result, "{\r\n  \"a\": 1\r\n  // divider\r\n}");
    }

    #[test]
    fn test_remove_drops_duplicate_keys() {
        let text = r#"{"mcpServers": {"codealive": 1, "other": 2, "codealive": 3}}"#;
        let result = remove(text, &["mcpServers", "codealive"]).unwrap();
        assert_eq!(result, r#"{"mcpServers": {"other": 2}}"#);
        let parsed = parser::parse(&result).unwrap().to_value(&result).unwrap();
        assert!(parsed["mcpServers"].get("codealive").is_none());
    }

    #[test]
    fn test_upsert_keeps_single_line_objects_inline() {
        let text = r#"{"mcpServers": {"other": 1}}"#;
        let result = upsert(text, &["mcpServers", "codealive"], &json!({"a": 1})).unwrap();
        assert_eq!(result, r#"{"mcpServers": {"other": 1, "codealive": {"a":1}}}"#);

        let text = r#"{"mcpServers": {"other": 1,}}"#;
        let result = upsert(text, &["mcpServers", "codealive"], &json!(2)).unwrap();
        assert_eq!(result, r#"{"mcpServers": {"other": 1, "codealive": 2}}"#);

        assert_eq!(
            remove(&result, &["mcpServers", "codealive"]).unwrap(),
            r#"{"mcpServers": {"other": 1}}"#
        );
    }

    #[test]
    fn test_remove_missing_is_identity() {
        let text = "{\n  // keep\n  \"a\": 1,\n}";
        assert_eq!(remove(text, &["mcpServers", "codealive"]).unwrap(), text);
        assert_eq!(remove(text, &["a", "codealive"]).unwrap(), text);
        assert_eq!(remove("", &["a", "b"]).unwrap(), "");
    }
}
