//! Minimal extraction of leaf elements from `login_sid.lua` responses
//!
//! The login endpoint answers with a small flat `SessionInfo` document. Only
//! leaf text elements are ever read, so no full XML parser is involved.

/// Return the text of the first `<tag>...</tag>` element.
///
/// `None` if the element is missing, empty, or not a leaf.
pub(crate) fn leaf_text<'a>(xml: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{}>", tag);
    let close = format!("</{}>", tag);

    let start = xml.find(&open)? + open.len();
    let len = xml[start..].find(&close)?;
    let text = xml[start..start + len].trim();

    if text.is_empty() || text.contains('<') {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SESSION_INFO: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\
        <SessionInfo><SID>0000000000000000</SID>\
        <Challenge>2$60000$a1b2$6000$c3d4</Challenge>\
        <BlockTime>0</BlockTime><Rights></Rights>\
        <Users><User last=\"1\">smarthome</User></Users></SessionInfo>";

    #[test]
    fn test_reads_leaf_elements() {
        assert_eq!(leaf_text(SESSION_INFO, "SID"), Some("0000000000000000"));
        assert_eq!(
            leaf_text(SESSION_INFO, "Challenge"),
            Some("2$60000$a1b2$6000$c3d4")
        );
        assert_eq!(leaf_text(SESSION_INFO, "BlockTime"), Some("0"));
    }

    #[test]
    fn test_missing_or_empty_elements() {
        assert_eq!(leaf_text(SESSION_INFO, "Rights"), None);
        assert_eq!(leaf_text(SESSION_INFO, "Users"), None);
        assert_eq!(leaf_text(SESSION_INFO, "Nope"), None);
        assert_eq!(leaf_text("<SID>abc", "SID"), None);
    }
}
