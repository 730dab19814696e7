//! Session cookie helpers.

use axum::http::{HeaderMap, HeaderValue, header};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    #[default]
    Strict,
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

/// Attributes of the cookie carrying the session token.
#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub name: String,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
    pub path: String,
    pub max_age_secs: Option<i64>,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: "session".to_string(),
            secure: true,
            http_only: true,
            same_site: SameSite::Strict,
            path: "/".to_string(),
            max_age_secs: Some(7 * 24 * 60 * 60),
        }
    }
}

impl CookieConfig {
    pub fn build_set_cookie(&self, value: &str) -> String {
        let mut cookie = format!("{}={}", self.name, value);

        if self.http_only {
            cookie.push_str("; HttpOnly");
        }
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie.push_str("; SameSite=");
        cookie.push_str(self.same_site.as_str());
        cookie.push_str("; Path=");
        cookie.push_str(&self.path);

        if let Some(max_age) = self.max_age_secs {
            cookie.push_str(&format!("; Max-Age={max_age}"));
        }

        cookie
    }

    /// Expired cookie with matching attributes, so browsers drop it.
    pub fn build_delete_cookie(&self) -> String {
        let mut cookie = format!("{}=; HttpOnly", self.name);
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie.push_str(&format!(
            "; SameSite={}; Path={}; Max-Age=0",
            self.same_site.as_str(),
            self.path
        ));
        cookie
    }

    pub fn set_cookie_header(&self, value: &str) -> Option<HeaderValue> {
        HeaderValue::from_str(&self.build_set_cookie(value)).ok()
    }

    pub fn delete_cookie_header(&self) -> Option<HeaderValue> {
        HeaderValue::from_str(&self.build_delete_cookie()).ok()
    }
}

/// Extract a cookie value from request headers
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|cookie| {
            let (key, value) = cookie.trim().split_once('=')?;
            (key == name && !value.is_empty()).then(|| value.to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_strict_week_long() {
        let cookie = CookieConfig::default().build_set_cookie("tok");
        assert_eq!(
            cookie,
            "session=tok; HttpOnly; Secure; SameSite=Strict; Path=/; Max-Age=604800"
        );
    }

    #[test]
    fn test_delete_cookie_matches_attributes() {
        let config = CookieConfig {
            secure: false,
            ..CookieConfig::default()
        };
        assert_eq!(
            config.build_delete_cookie(),
            "session=; HttpOnly; SameSite=Strict; Path=/; Max-Age=0"
        );
    }

    #[test]
    fn test_extract_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("foo=bar; session=abc.123; empty="),
        );

        assert_eq!(extract_cookie(&headers, "session"), Some("abc.123".into()));
        assert_eq!(extract_cookie(&headers, "foo"), Some("bar".into()));
        assert_eq!(extract_cookie(&headers, "empty"), None);
        assert_eq!(extract_cookie(&headers, "missing"), None);
    }
}
