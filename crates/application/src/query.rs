//! Query-string editing on absolute URLs
//!
//! URLs handed out by the remote API are kept byte-for-byte except for the
//! one parameter being edited, so these helpers split the query by hand
//! instead of round-tripping through a URL parser.

use url::form_urlencoded;

fn split_url(url: &str) -> (&str, Option<&str>, Option<&str>) {
    let (rest, fragment) = match url.split_once('#') {
        Some((rest, fragment)) => (rest, Some(fragment)),
        None => (url, None),
    };
    match rest.split_once('?') {
        Some((base, query)) => (base, Some(query), fragment),
        None => (rest, None, fragment),
    }
}

fn pair_key(pair: &str) -> &str {
    pair.split_once('=').map_or(pair, |(key, _)| key)
}

fn join_url(base: &str, pairs: &[String], fragment: Option<&str>) -> String {
    let mut out = base.to_string();
    if !pairs.is_empty() {
        out.push('?');
        out.push_str(&pairs.join("&"));
    }
    if let Some(fragment) = fragment {
        out.push('#');
        out.push_str(fragment);
    }
    out
}

/// Percent-encodes one query component.
#[must_use]
pub fn encode_component(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Sets `name` to `value` in the query of `url`.
///
/// An existing parameter is replaced in place and further occurrences are
/// dropped; otherwise the parameter is appended. All other parameters are
/// left untouched.
#[must_use]
pub fn set_query_param(url: &str, name: &str, value: &str) -> String {
    let (base, query, fragment) = split_url(url);
    let encoded = format!("{}={}", encode_component(name), encode_component(value));

    let mut pairs = Vec::new();
    let mut replaced = false;
    for pair in query.unwrap_or_default().split('&').filter(|p| !p.is_empty()) {
        if pair_key(pair) == name {
            if !replaced {
                pairs.push(encoded.clone());
                replaced = true;
            }
        } else {
            pairs.push(pair.to_string());
        }
    }
    if !replaced {
        pairs.push(encoded);
    }

    join_url(base, &pairs, fragment)
}

/// Returns the decoded value of the first `name` parameter in `url`.
#[must_use]
pub fn query_param(url: &str, name: &str) -> Option<String> {
    let (_, query, _) = split_url(url);
    form_urlencoded::parse(query?.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// Removes every parameter named in `names`, e.g. before logging a URL.
#[must_use]
pub fn strip_query_params(url: &str, names: &[&str]) -> String {
    let (base, query, fragment) = split_url(url);
    let pairs = query
        .unwrap_or_default()
        .split('&')
        .filter(|p| !p.is_empty() && !names.contains(&pair_key(p)))
        .map(ToString::to_string)
        .collect::<Vec<_>>();
    join_url(base, &pairs, fragment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_set_adds_missing_param() {
        assert_eq!(
            set_query_param("https://h/v1/me/feed", "after", "abc"),
            "https://h/v1/me/feed?after=abc"
        );
        assert_eq!(
            set_query_param("https://h/me?limit=2", "after", "a=b"),
            "https://h/me?limit=2&after=a%3Db"
        );
    }

    #[test]
    fn test_set_replaces_in_place() {
        assert_eq!(
            set_query_param("https://h/me?after=old&limit=2&after=older", "after", "new"),
            "https://h/me?after=new&limit=2"
        );
    }

    #[test]
    fn test_set_is_idempotent() {
        let once = set_query_param("https://h/me?limit=2", "after", "c");
        let twice = set_query_param(&once, "after", "c");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_set_keeps_fragment() {
        assert_eq!(
            set_query_param("https://h/me?x=1#top", "y", "2"),
            "https://h/me?x=1&y=2#top"
        );
    }

    #[test]
    fn test_query_param_decodes() {
        assert_eq!(
            query_param("https://h/me?q=a+b&after=x%3D", "after").as_deref(),
            Some("x=")
        );
        assert_eq!(query_param("https://h/me", "after"), None);
    }

    #[test]
    fn test_strip_params() {
        assert_eq!(
            strip_query_params(
                "https://h/me?access_token=t&fields=id&appsecret_proof=p",
                &["access_token", "appsecret_proof"]
            ),
            "https://h/me?fields=id"
        );
        assert_eq!(
            strip_query_params("https://h/me?access_token=t", &["access_token"]),
            "https://h/me"
        );
    }
}
