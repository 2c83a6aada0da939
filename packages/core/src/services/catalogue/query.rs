//! Query-string helpers for the catalogue's bracket-style conventions.
//!
//! Everything here works on raw strings: parameters are never decoded or
//! re-encoded, so a filter that is already in the URL reaches the backend
//! byte-for-byte.

/// Query key the backend reads the page number from.
pub const PAGE_PARAM: &str = "pagination[page]";

const ENCODED_PAGE_PARAM: &str = "pagination%5Bpage%5D";

fn is_page_key(key: &str) -> bool {
    key == PAGE_PARAM || key.eq_ignore_ascii_case(ENCODED_PAGE_PARAM)
}

/// Return `url` with `pagination[page]` set to `page`.
///
/// An existing page parameter is overwritten where it stands (duplicates are
/// dropped); otherwise the parameter is appended. All other parameters keep
/// their text and relative order.
pub fn set_page(url: &str, page: u32) -> String {
    let (without_fragment, fragment) = match url.split_once('#') {
        Some((head, fragment)) => (head, Some(fragment)),
        None => (url, None),
    };
    let (path, query) = without_fragment
        .split_once('?')
        .unwrap_or((without_fragment, ""));

    let page_pair = format!("{}={}", PAGE_PARAM, page);
    let mut replaced = false;
    let mut params: Vec<&str> = Vec::new();

    for pair in query.split('&').filter(|pair| !pair.is_empty()) {
        let key = pair.split_once('=').map_or(pair, |(key, _)| key);
        if is_page_key(key) {
            if !replaced {
                params.push(&page_pair);
                replaced = true;
            }
            continue;
        }
        params.push(pair);
    }
    if !replaced {
        params.push(&page_pair);
    }

    let mut out = format!("{}?{}", path, params.join("&"));
    if let Some(fragment) = fragment {
        out.push('#');
        out.push_str(fragment);
    }
    out
}

/// Return `url` without its query string, for compact logging.
pub fn basename(url: &str) -> &str {
    url.split_once('?').map_or(url, |(head, _)| head)
}

/// Escape `&` so user data cannot be read as a parameter separator by the
/// backend's filter parser.
pub fn escape_filter_value(value: &str) -> String {
    value.replace('&', "&amp;")
}

/// Append a query fragment to `target`, using `&` when it already carries a
/// query string and `?` otherwise.
pub fn join_query(target: &str, fragment: &str) -> String {
    let fragment = fragment.trim_start_matches(&['?', '&'][..]);
    if fragment.is_empty() {
        return target.to_string();
    }
    let separator = if target.contains('?') { '&' } else { '?' };
    format!("{}{}{}", target, separator, fragment)
}

/// `filters[label][$eq]=value` clause, without separator.
pub fn eq_clause(label: &str, value: &str) -> String {
    format!("filters[{}][$eq]={}", label, escape_filter_value(value))
}

/// `target` narrowed to records whose `label` equals `value`.
pub fn eq_filter(target: &str, label: &str, value: &str) -> String {
    join_query(target, &eq_clause(label, value))
}
