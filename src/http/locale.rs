//! Per-request language selection.
//!
//! Order: `?lang=` query, then the `lang` cookie, then the first five
//! characters of `Accept-Language`, then [`DEFAULT_LANG`]. A candidate only
//! counts if the live snapshot lists it, so a reload that drops a language
//! immediately stops it from being served.

use axum::http::{header, HeaderMap, HeaderValue};

pub const DEFAULT_LANG: &str = "en-US";
pub const LANG_COOKIE: &str = "lang";
/// One year, in seconds.
pub const LANG_COOKIE_MAX_AGE: u64 = 60 * 60 * 24 * 365;

/// Outcome of [`resolve_lang`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LangChoice {
    pub lang: String,
    /// Persist `lang` in the cookie; false when a valid cookie already holds it.
    pub set_cookie: bool,
    /// The choice came from the query string; send the client to the bare URL.
    pub redirect: bool,
}

/// Pick the language for one request against the configured `langs`.
pub fn resolve_lang(
    query: Option<&str>,
    cookie: Option<&str>,
    accept_language: Option<&str>,
    langs: &[String],
) -> LangChoice {
    let supported = |l: &str| langs.iter().any(|s| s == l);

    let from_query = query.filter(|q| !q.is_empty());
    let candidate = from_query.or(cookie).filter(|l| supported(l));

    if let Some(lang) = candidate {
        let from_cookie = from_query.is_none();
        return LangChoice {
            lang: lang.to_string(),
            set_cookie: !from_cookie,
            redirect: !from_cookie,
        };
    }

    let lang = accept_language
        .and_then(|al| al.get(..5))
        .filter(|l| supported(l))
        .unwrap_or(DEFAULT_LANG);

    LangChoice {
        lang: lang.to_string(),
        set_cookie: true,
        redirect: false,
    }
}

/// Value of the cookie `name` across all `Cookie` headers.
pub fn cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.trim_matches('"'))
}

/// `Set-Cookie` value persisting `lang` for a year.
pub fn lang_cookie(lang: &str) -> Option<HeaderValue> {
    let value = format!("{LANG_COOKIE}={lang}; Max-Age={LANG_COOKIE_MAX_AGE}; Path=/");
    match HeaderValue::from_str(&value) {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!(lang = %lang, error = %e, "Language not usable as a cookie value");
            None
        }
    }
}
