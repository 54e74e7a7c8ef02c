/// Minimal query-string editing for request URLs.
///
/// The backend's parameters are plain numerics and comma-joined lists, so no
/// percent-decoding is attempted; pairs pass through byte-for-byte and keep
/// their original order.

/// Split a query string (without the leading `?`) into key/value pairs.
pub fn parse_query(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|part| !part.is_empty())
        .map(|part| match part.split_once('=') {
            Some((k, v)) => (k.to_string(), v.to_string()),
            None => (part.to_string(), String::new()),
        })
        .collect()
}

/// Set one key, replacing an existing pair in place or appending at the end.
pub fn set_param(pairs: &mut Vec<(String, String)>, key: &str, value: &str) {
    for pair in pairs.iter_mut() {
        if pair.0 == key {
            pair.1 = value.to_string();
            return;
        }
    }
    pairs.push((key.to_string(), value.to_string()));
}

pub fn build_query(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| {
            if v.is_empty() {
                k.clone()
            } else {
                format!("{}={}", k, v)
            }
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Rewrite one query parameter of a full URL, leaving every other parameter
/// untouched and in place.
pub fn set_url_param(url: &str, key: &str, value: &str) -> String {
    match url.split_once('?') {
        Some((base, query)) => {
            let mut pairs = parse_query(query);
            set_param(&mut pairs, key, value);
            format!("{}?{}", base, build_query(&pairs))
        }
        None => format!("{}?{}={}", url, key, value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_rebuild_is_identity() {
        let query = "resource=12&z={z}&x={x}&y={y}&nd=17";
        assert_eq!(build_query(&parse_query(query)), query);
    }

    #[test]
    fn set_param_replaces_in_place() {
        let mut pairs = parse_query("a=1&b=2&c=3");
        set_param(&mut pairs, "b", "9");
        assert_eq!(build_query(&pairs), "a=1&b=9&c=3");
    }

    #[test]
    fn set_param_appends_missing_key() {
        let mut pairs = parse_query("a=1");
        set_param(&mut pairs, "symbols", "r,s");
        assert_eq!(build_query(&pairs), "a=1&symbols=r,s");
    }

    #[test]
    fn set_url_param_keeps_unrelated_parameters() {
        let url = "https://gis/api/tile?resource=5&z={z}&x={x}&y={y}";
        let rewritten = set_url_param(url, "symbols", "1,2");
        assert_eq!(
            rewritten,
            "https://gis/api/tile?resource=5&z={z}&x={x}&y={y}&symbols=1,2"
        );
        // and replacing an existing key does not reorder
        let again = set_url_param(&rewritten, "resource", "6");
        assert_eq!(
            again,
            "https://gis/api/tile?resource=6&z={z}&x={x}&y={y}&symbols=1,2"
        );
    }

    #[test]
    fn set_url_param_without_query_adds_one() {
        assert_eq!(set_url_param("https://gis/img", "nd", "4"), "https://gis/img?nd=4");
    }
}
