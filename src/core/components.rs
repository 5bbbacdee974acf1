use std::borrow::Cow;
use std::collections::HashMap;

use serde::Serialize;
use url::Url;

/// Query parameters in first-seen key order.
///
/// A key that repeats (`a=1&a=2`) keeps a single entry whose values are
/// listed in the order they appeared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryParams {
    entries: Vec<(String, Vec<String>)>,
    #[serde(skip)]
    positions: HashMap<String, usize>,
}

impl QueryParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value for `key`, creating the entry on first sight
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.positions.get(&key) {
            Some(&position) => self.entries[position].1.push(value),
            None => {
                self.positions.insert(key.clone(), self.entries.len());
                self.entries.push((key, vec![value]));
            }
        }
    }

    /// All values recorded for `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.positions
            .get(key)
            .map(|&position| self.entries[position].1.as_slice())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(k, values)| (k.as_str(), values.as_slice()))
    }

    /// Number of distinct keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A URL split into the parts the scorer compares
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UrlComponents {
    pub scheme: String,

    /// Host, with the port appended when one is present
    pub host: String,

    pub path: String,

    /// Query string exactly as captured, without the leading `?`
    pub query_raw: String,

    pub query_params: QueryParams,

    /// Everything before the first `?`, fragment removed
    pub base_url: String,
}

impl UrlComponents {
    /// True when the URL carried no query text at all
    #[must_use]
    pub fn has_empty_query(&self) -> bool {
        self.query_raw.is_empty()
    }
}

/// Decompose a URL into scheme, host, path and query parts.
///
/// Never fails: an empty URL, or one that does not parse as an absolute URL,
/// yields [`UrlComponents::default`] with every field empty.
///
/// # Examples
///
/// ```
/// use endpoint_resolver::core::components::decompose;
///
/// let parts = decompose("https://bank.example/api/balance?acct=CON&tag=a&tag=b");
/// assert_eq!(parts.base_url, "https://bank.example/api/balance");
/// assert_eq!(parts.host, "bank.example");
/// assert_eq!(parts.query_params.get("tag").unwrap(), ["a", "b"]);
///
/// assert!(decompose("not a url").base_url.is_empty());
/// ```
#[must_use]
pub fn decompose(raw: &str) -> UrlComponents {
    let raw = raw.trim();
    if raw.is_empty() {
        return UrlComponents::default();
    }

    let Ok(parsed) = Url::parse(raw) else {
        return UrlComponents::default();
    };

    let without_fragment = raw.split_once('#').map_or(raw, |(before, _)| before);
    let (base_url, query_raw) = match without_fragment.split_once('?') {
        Some((base, query)) => (base, query),
        None => (without_fragment, ""),
    };

    let host = match (parsed.host_str(), parsed.port()) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => host.to_string(),
        (None, _) => String::new(),
    };

    UrlComponents {
        scheme: parsed.scheme().to_string(),
        host,
        path: parsed.path().to_string(),
        query_raw: query_raw.to_string(),
        query_params: parse_query(query_raw),
        base_url: base_url.to_string(),
    }
}

/// Parse a raw query string into ordered parameters.
///
/// Pairs are split on `&` and then on the first `=`. Pairs without `=`, and
/// pairs with an empty key, are dropped. Keys and values are form-decoded
/// (`+` is a space, `%XX` is a byte).
#[must_use]
pub fn parse_query(query: &str) -> QueryParams {
    let mut params = QueryParams::new();
    for pair in query.split('&') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        let key = form_decode(key);
        if key.is_empty() {
            continue;
        }
        params.push(key, form_decode(value));
    }
    params
}

fn form_decode(text: &str) -> String {
    let spaced: Cow<'_, str> = if text.contains('+') {
        Cow::Owned(text.replace('+', " "))
    } else {
        Cow::Borrowed(text)
    };

    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => {
            let bytes = urlencoding::decode_binary(spaced.as_bytes());
            String::from_utf8_lossy(&bytes).into_owned()
        }
    }
}
