//! Path canonicalization.

/// Returns the canonical form of a request path.
///
/// Repeated slashes and `.` segments are dropped, `..` removes the segment
/// before it, and a trailing slash is kept. An empty path becomes `/`.
///
/// # Example
///
/// ```
/// use oxide_mux::clean_path;
///
/// assert_eq!(clean_path("/a//b/./c/../d/"), "/a/b/d/");
/// assert_eq!(clean_path("/../a"), "/a");
/// ```
pub fn clean_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            segment => segments.push(segment),
        }
    }

    let mut clean = String::with_capacity(path.len() + 1);
    for segment in &segments {
        clean.push('/');
        clean.push_str(segment);
    }
    if clean.is_empty() || path.ends_with('/') {
        clean.push('/');
    }
    clean
}
