//! Path joining, `{id}` template resolution, and raw-query extraction.
//!
//! These are pure functions with no I/O so they are exhaustively unit
//! tested here; the handlers in `routes::proxy` / `routes::aggregate` just
//! call through to them.

/// Joins two path fragments into a single slash-normalized path.
///
/// An empty `left` produces a leading slash prepended to `right` (if
/// needed); an empty `right` produces `left` normalized to a leading slash;
/// otherwise a trailing slash is stripped from `left`, a leading slash from
/// `right`, and the two are joined with exactly one slash. Two empty inputs
/// yield `/`.
pub fn path_join(left: &str, right: &str) -> String {
    if left.is_empty() && right.is_empty() {
        return "/".to_string();
    }
    if left.is_empty() {
        return if right.starts_with('/') {
            right.to_string()
        } else {
            format!("/{right}")
        };
    }
    if right.is_empty() {
        return if left.starts_with('/') {
            left.to_string()
        } else {
            format!("/{left}")
        };
    }

    let trimmed_left = left.trim_end_matches('/');
    let trimmed_right = right.trim_start_matches('/');
    format!("{trimmed_left}/{trimmed_right}")
}

const PLACEHOLDER: &str = "{id}";

/// Resolves `{id}` placeholders in `call_pattern` using values taken
/// positionally from `actual_path` at the segment indices where
/// `endpoint_pattern` has an `{id}` placeholder.
///
/// Only the literal token `{id}` is recognized; any other named placeholder
/// (`{userId}`) is left untouched and reaches the upstream as-is. See
/// `DESIGN.md` for why this is not generalized to arbitrary names.
pub fn resolve_path_template(endpoint_pattern: &str, call_pattern: &str, actual_path: &str) -> String {
    if !call_pattern.contains('{') {
        return call_pattern.to_string();
    }
    if !endpoint_pattern.contains(PLACEHOLDER) {
        return call_pattern.to_string();
    }

    let endpoint_segments: Vec<&str> = endpoint_pattern.split('/').collect();
    let actual_segments: Vec<&str> = actual_path.split('/').collect();
    let mut call_segments: Vec<String> = call_pattern.split('/').map(str::to_string).collect();

    let mut endpoint_values: Vec<&str> = Vec::new();
    for (i, seg) in endpoint_segments.iter().enumerate() {
        if seg.contains(PLACEHOLDER) {
            endpoint_values.push(actual_segments.get(i).copied().unwrap_or(""));
        }
    }

    if endpoint_values.is_empty() {
        return call_pattern.to_string();
    }

    let call_placeholder_count = call_segments
        .iter()
        .filter(|seg| seg.contains(PLACEHOLDER))
        .count();

    let replacements: Vec<&str> = if call_placeholder_count <= endpoint_values.len() {
        endpoint_values[endpoint_values.len() - call_placeholder_count..].to_vec()
    } else {
        let mut reps = Vec::with_capacity(call_placeholder_count);
        for i in 0..call_placeholder_count {
            reps.push(*endpoint_values.get(i).unwrap_or_else(|| endpoint_values.last().unwrap()));
        }
        reps
    };

    let mut rep_idx = 0;
    for seg in call_segments.iter_mut() {
        if seg.contains(PLACEHOLDER) {
            *seg = seg.replace(PLACEHOLDER, replacements[rep_idx]);
            rep_idx += 1;
        }
    }

    let result = call_segments.join("/");
    if result.is_empty() {
        "/".to_string()
    } else {
        result
    }
}

/// Extracts the raw query portion of an inbound request's original target
/// (path + query in wire form). Returns an empty string if it does not
/// parse as a request URI.
pub fn raw_query_from_original(original: &str) -> String {
    match original.split_once('?') {
        Some((_, query)) => query.to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_join_both_empty() {
        assert_eq!(path_join("", ""), "/");
    }

    #[test]
    fn path_join_empty_left() {
        assert_eq!(path_join("", "foo"), "/foo");
        assert_eq!(path_join("", "/foo"), "/foo");
    }

    #[test]
    fn path_join_empty_right() {
        assert_eq!(path_join("foo", ""), "/foo");
        assert_eq!(path_join("/foo", ""), "/foo");
    }

    #[test]
    fn path_join_trims_exactly_one_slash() {
        assert_eq!(path_join("/foo/", "/bar"), "/foo/bar");
        assert_eq!(path_join("/foo", "bar"), "/foo/bar");
        assert_eq!(path_join("/foo/", "/bar/baz"), "/foo/bar/baz");
    }

    #[test]
    fn template_returns_call_pattern_unchanged_without_braces() {
        assert_eq!(resolve_path_template("/posts/{id}", "/static", "/posts/42"), "/static");
    }

    #[test]
    fn template_non_id_placeholder_passes_through_literally() {
        assert_eq!(
            resolve_path_template("/users/{userId}", "/v1/{userId}", "/users/7"),
            "/v1/{userId}"
        );
    }

    #[test]
    fn template_single_id_substitution() {
        assert_eq!(resolve_path_template("/posts/{id}", "/posts/{id}", "/posts/42"), "/posts/42");
    }

    #[test]
    fn template_edge_repeats_single_value_for_multiple_placeholders() {
        assert_eq!(resolve_path_template("/a/{id}", "/c/{id}/d/{id}", "/a/7"), "/c/7/d/7");
    }

    #[test]
    fn template_uses_last_k_values_when_fewer_placeholders_than_endpoint_values() {
        assert_eq!(
            resolve_path_template("/a/{id}/b/{id}/c/{id}", "/only/{id}", "/a/1/b/2/c/3"),
            "/only/3"
        );
    }

    #[test]
    fn template_empty_endpoint_values_returns_unchanged() {
        assert_eq!(resolve_path_template("/static", "/x/{id}", "/static"), "/x/{id}");
    }

    #[test]
    fn raw_query_extraction() {
        assert_eq!(raw_query_from_original("/posts/42?foo=bar"), "foo=bar");
        assert_eq!(raw_query_from_original("/posts/42"), "");
    }
}
