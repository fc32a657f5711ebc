use std::time::Duration;

use reqwest::header::HeaderMap;

const REMAINING_HEADER: &str = "x-ratelimit-remaining";
const RESET_HEADER: &str = "x-ratelimit-reset";

/// Request quota advertised on every OAuth API response.
///
/// `remaining` is sent as a float (`"598.0"`), `reset` as whole seconds until
/// the window rolls over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimit {
    pub remaining: f64,
    pub reset: Duration,
}

impl RateLimit {
    /// Read the quota headers. `None` when either is missing or unparseable.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let remaining = header_f64(headers, REMAINING_HEADER)?;
        let reset = Duration::try_from_secs_f64(header_f64(headers, RESET_HEADER)?).ok()?;
        Some(Self { remaining, reset })
    }

    /// How long the next request has to wait. Only a spent quota pauses.
    pub fn pause(&self) -> Option<Duration> {
        (self.remaining < 1.0).then_some(self.reset)
    }
}

fn header_f64(headers: &HeaderMap, name: &str) -> Option<f64> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for &(name, value) in pairs {
            map.insert(name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn parses_float_remaining_and_reset_seconds() {
        let limit = RateLimit::from_headers(&headers(&[
            ("x-ratelimit-remaining", "598.0"),
            ("x-ratelimit-reset", "540"),
        ]))
        .unwrap();

        assert_eq!(limit.remaining, 598.0);
        assert_eq!(limit.reset, Duration::from_secs(540));
        assert_eq!(limit.pause(), None);
    }

    #[test]
    fn spent_quota_pauses_until_reset() {
        let limit = RateLimit::from_headers(&headers(&[
            ("x-ratelimit-remaining", "0.0"),
            ("x-ratelimit-reset", "12"),
        ]))
        .unwrap();

        assert_eq!(limit.pause(), Some(Duration::from_secs(12)));
    }

    #[test]
    fn missing_or_garbage_headers_are_ignored() {
        assert_eq!(RateLimit::from_headers(&HeaderMap::new()), None);
        assert_eq!(
            RateLimit::from_headers(&headers(&[("x-ratelimit-remaining", "0")])),
            None
        );
        assert_eq!(
            RateLimit::from_headers(&headers(&[
                ("x-ratelimit-remaining", "lots"),
                ("x-ratelimit-reset", "10"),
            ])),
            None
        );
        assert_eq!(
            RateLimit::from_headers(&headers(&[
                ("x-ratelimit-remaining", "0"),
                ("x-ratelimit-reset", "-5"),
            ])),
            None
        );
    }
}
