use url::Url;

const SIZE_SUFFIXES: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Renders a byte count as a human readable size with two decimals, e.g. `1.50MB`.
pub fn format_size(byte_count: u64) -> String {
    let mut value = byte_count as f64;
    let mut suffix_index = 0;
    while value >= 1024.0 && suffix_index < SIZE_SUFFIXES.len() - 1 {
        value /= 1024.0;
        suffix_index += 1;
    }
    format!("{:.2}{}", value, SIZE_SUFFIXES[suffix_index])
}

/// Appends `/`-separated relative path segments to a base URL.
///
/// Segments are appended one by one, so the result never depends on the
/// host's path separator and empty segments (`a//b`, trailing `/`) are dropped.
pub fn join_url_segments(base: &Url, relative_path: &str) -> Option<Url> {
    let mut url = base.clone();
    {
        let mut segments = url.path_segments_mut().ok()?;
        segments.pop_if_empty();
        segments.extend(relative_path.split('/').filter(|s| !s.is_empty()));
    }
    Some(url)
}
