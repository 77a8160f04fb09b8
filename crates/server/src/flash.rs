//! One-time status messages carried across the post-mutation redirect.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};

pub const FLASH_COOKIE: &str = "flash_status";

/// Queue `status` for the next rendered page.
pub fn put(jar: CookieJar, status: &str) -> CookieJar {
    let mut cookie = Cookie::new(FLASH_COOKIE, URL_SAFE_NO_PAD.encode(status.as_bytes()));
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    jar.add(cookie)
}

/// Read the pending status, if any, and expire it.
pub fn take(jar: CookieJar) -> (CookieJar, Option<String>) {
    let Some(raw) = jar.get(FLASH_COOKIE).map(|c| c.value().to_string()) else {
        return (jar, None);
    };
    let mut gone = Cookie::from(FLASH_COOKIE);
    gone.set_path("/");
    let status = URL_SAFE_NO_PAD
        .decode(raw.as_bytes())
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .filter(|s| !s.is_empty());
    (jar.remove(gone), status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_survives_cookie_encoding() {
        let jar = put(CookieJar::new(), "Product \"Widget; Pro\" updated successfully.");
        let raw = jar.get(FLASH_COOKIE).unwrap().value().to_string();
        assert!(!raw.contains(' ') && !raw.contains(';') && !raw.contains('"'));
        let (jar, status) = take(jar);
        assert_eq!(status.as_deref(), Some("Product \"Widget; Pro\" updated successfully."));
        assert!(jar.get(FLASH_COOKIE).is_none());
    }

    #[test]
    fn nothing_pending() {
        let (_, status) = take(CookieJar::new());
        assert_eq!(status, None);
    }

    #[test]
    fn garbage_is_ignored() {
        let jar = CookieJar::new().add(Cookie::new(FLASH_COOKIE, "%%%"));
        let (_, status) = take(jar);
        assert_eq!(status, None);
    }
}
