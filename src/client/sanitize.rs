//! Pre-parse cleanup for the registration-token listing.
//!
//! The management API has been observed to emit malformed JSON from
//! `/v3/clusterregistrationtoken`: unquoted `null` placeholders where a
//! token has not been issued yet, inconsistent spacing around the key/value
//! delimiter, and embedded platform-specific join snippets whose values
//! contain unescaped quotes. The listing is pretty-printed one member per
//! line, so all repairs here are line-wise.

/// Members whose values embed raw join commands with unescaped characters.
/// They are never consumed by the provisioner, so they are stripped whole.
const STRIPPED_MEMBERS: &[&str] =
    &["\"insecureWindowsNodeCommand\"", "\"windowsNodeCommand\"", "\"insecureNodeCommand\""];

/// Clean a raw registration-token response body so it parses as JSON.
///
/// Transformation rules, applied per line:
/// 1. members named in [`STRIPPED_MEMBERS`] are removed entirely;
/// 2. delimiter spacing is normalized: any run of spaces before the
///    key/value colon is dropped (`"key"  :` to `"key":`) and runs of
///    spaces after a comma collapse to one (`,  "` to `, "`);
/// 3. unquoted `null` literal values are quoted (`: null` to `: "null"`),
///    so a placeholder token survives parsing and is filtered out later.
///
/// A trailing comma left dangling by rule 1 (when the stripped member was
/// the last one in its object) is dropped afterwards.
pub fn sanitize(raw: &str) -> String {
    let mut lines: Vec<String> = Vec::new();

    for line in raw.lines() {
        if STRIPPED_MEMBERS.iter().any(|key| line.contains(key)) {
            continue;
        }
        let line = normalize_delimiters(line);
        let line = line.replace(":null", ": null");
        let line = line.replace(": null", ": \"null\"");
        lines.push(line);
    }

    for i in 0..lines.len() {
        let next_closes = lines
            .get(i + 1)
            .and_then(|l| l.trim_start().chars().next())
            .is_some_and(|c| c == '}' || c == ']');
        if next_closes {
            let trimmed = lines[i].trim_end();
            if let Some(stripped) = trimmed.strip_suffix(',') {
                lines[i] = stripped.to_string();
            }
        }
    }

    lines.join("\n")
}

/// Normalize spacing around the `:` and `,` delimiters on one line.
fn normalize_delimiters(line: &str) -> String {
    let mut line = line.to_string();
    while line.contains("  :") {
        line = line.replace("  :", " :");
    }
    line = line.replace("\" :", "\":");
    while line.contains(",  ") {
        line = line.replace(",  ", ", ");
    }
    line
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // Tests can use unwrap for cleaner assertions

    use super::*;
    use crate::client::RegistrationTokenList;

    /// Captured shape of a malformed listing: an unquoted `null` token, a
    /// spaced delimiter, and embedded join snippets with unescaped quotes.
    const MALFORMED_LISTING: &str = r#"{
  "type": "collection",
  "data": [
    {
      "clusterId": "c-abc12",
      "token": null,
      "insecureWindowsNodeCommand": "PowerShell -NoLogo -Command "& {docker run --rancher}"",
      "state": "active"
    },
    {
      "clusterId": "c-xyz99",
      "token" : "kn5xw8zwbqt9lhl299sl47znrpqxtgqw",
      "nodeCommand": "sudo docker run rancher/rancher-agent",
      "insecureNodeCommand": "curl --insecure -sfL https://host | sudo sh -s -- "quoted""
    }
  ]
}"#;

    #[test]
    fn test_sanitized_listing_parses() {
        let cleaned = sanitize(MALFORMED_LISTING);
        let parsed: RegistrationTokenList = serde_json::from_str(&cleaned).unwrap();
        assert_eq!(parsed.data.len(), 2);
    }

    #[test]
    fn test_extracts_token_for_matching_cluster() {
        let cleaned = sanitize(MALFORMED_LISTING);
        let parsed: RegistrationTokenList = serde_json::from_str(&cleaned).unwrap();

        let matching: Vec<_> =
            parsed.data.iter().filter(|t| t.cluster_id == "c-xyz99").collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].token.as_deref(), Some("kn5xw8zwbqt9lhl299sl47znrpqxtgqw"));
    }

    #[test]
    fn test_placeholder_null_token_is_quoted() {
        let cleaned = sanitize(MALFORMED_LISTING);
        let parsed: RegistrationTokenList = serde_json::from_str(&cleaned).unwrap();

        let placeholder = parsed.data.iter().find(|t| t.cluster_id == "c-abc12").unwrap();
        assert_eq!(placeholder.token.as_deref(), Some("null"));
    }

    #[test]
    fn test_join_snippets_are_stripped() {
        let cleaned = sanitize(MALFORMED_LISTING);
        assert!(!cleaned.contains("PowerShell"));
        assert!(!cleaned.contains("insecureNodeCommand"));
        assert!(cleaned.contains("nodeCommand"));
    }

    #[test]
    fn test_delimiter_spacing_is_normalized() {
        let sloppy = r#"{
  "data": [
    {
      "clusterId": "c-pad",
      "token"  :  "abc",  "state": "active"
    }
  ]
}"#;
        let cleaned = sanitize(sloppy);
        assert!(cleaned.contains("\"token\": "));
        assert!(cleaned.contains(", \"state\""));

        let parsed: RegistrationTokenList = serde_json::from_str(&cleaned).unwrap();
        assert_eq!(parsed.data[0].token.as_deref(), Some("abc"));
    }

    #[test]
    fn test_well_formed_input_is_preserved() {
        let well_formed = r#"{
  "data": [
    {
      "clusterId": "c-ok",
      "token": "abc"
    }
  ]
}"#;
        let cleaned = sanitize(well_formed);
        let parsed: RegistrationTokenList = serde_json::from_str(&cleaned).unwrap();
        assert_eq!(parsed.data[0].token.as_deref(), Some("abc"));
    }
}
