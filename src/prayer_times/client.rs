use std::time::Duration;

use log::{debug, info, warn};
use ureq::Agent;

use crate::config::{ApiConfig, ApiStyle};
use crate::models::{build_schedule, PrayerSchedule, RawResponse, ScheduleError};

/// Something that can answer "what are today's times for this place".
pub trait ScheduleProvider: Send + Sync {
    fn fetch_raw(&self, location: &str) -> Result<RawResponse, ScheduleError>;

    fn fetch_schedule(&self, location: &str) -> Result<PrayerSchedule, ScheduleError> {
        let schedule = self.fetch_raw(location).and_then(build_schedule);
        match &schedule {
            Ok(s) => info!(
                "Schedule for {:?}: offset {}h, title {:?}",
                location,
                s.utc_offset_hours(),
                s.title()
            ),
            Err(e) => warn!("No schedule for {:?}: {}", location, e.detail()),
        }
        schedule
    }
}

pub struct HttpProvider {
    agent: Agent,
    api: ApiConfig,
}

impl HttpProvider {
    pub fn new(api: ApiConfig) -> Self {
        let config = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(api.timeout_secs.max(1))))
            .build();
        Self {
            agent: Agent::new_with_config(config),
            api,
        }
    }
}

impl ScheduleProvider for HttpProvider {
    fn fetch_raw(&self, location: &str) -> Result<RawResponse, ScheduleError> {
        let url = endpoint(&self.api, location);
        let query = query_pairs(&self.api, location);
        debug!("GET {}?{}", url, loggable_query(&query));

        let mut request = self.agent.get(&url);
        for (name, value) in &query {
            request = request.query(*name, value);
        }
        let mut response = request.call().map_err(ScheduleError::transport)?;
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(ScheduleError::transport)?;

        serde_json::from_str(&body)
            .map_err(|e| ScheduleError::transport(format!("response is not valid JSON: {}", e)))
    }
}

/// Request URL without its query string. muslimsalat takes the location as
/// a path segment, so only that style escapes it here.
fn endpoint(api: &ApiConfig, location: &str) -> String {
    let base = api.base_url.trim_end_matches('/');
    match api.style {
        ApiStyle::MuslimSalat => format!("{}/{}.json", base, percent_encode(location)),
        ApiStyle::Proxy => format!("{}/api/prayer-times", base),
    }
}

/// Query parameters, unescaped; the HTTP client encodes them.
fn query_pairs(api: &ApiConfig, location: &str) -> Vec<(&'static str, String)> {
    let mut pairs = Vec::new();
    if api.style == ApiStyle::Proxy {
        pairs.push(("location", location.to_string()));
    }
    if let Some(key) = api.key.as_deref().filter(|k| !k.is_empty()) {
        pairs.push(("key", key.to_string()));
    }
    pairs
}

/// RFC 3986 unreserved characters pass through, everything else is escaped.
fn percent_encode(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for b in segment.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => out.push(b as char),
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

fn loggable_query(pairs: &[(&'static str, String)]) -> String {
    pairs
        .iter()
        .map(|(name, value)| match *name {
            "key" => "key=***".to_string(),
            _ => format!("{}={}", name, value),
        })
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PrayerEntry, PrayerName};

    fn api(style: ApiStyle, key: Option<&str>) -> ApiConfig {
        ApiConfig {
            base_url: "https://example.test/".to_string(),
            key: key.map(str::to_string),
            style,
            timeout_secs: 5,
        }
    }

    #[test]
    fn muslimsalat_puts_location_in_path() {
        let keyed = api(ApiStyle::MuslimSalat, Some("abc"));
        assert_eq!(endpoint(&keyed, "New York"), "https://example.test/New%20York.json");
        assert_eq!(endpoint(&keyed, "a/b?c"), "https://example.test/a%2Fb%3Fc.json");
        assert_eq!(query_pairs(&keyed, "New York"), [("key", "abc".to_string())]);
        assert!(query_pairs(&api(ApiStyle::MuslimSalat, None), "mumbai").is_empty());
    }

    #[test]
    fn proxy_passes_location_as_query() {
        let proxy = api(ApiStyle::Proxy, Some("k&v"));
        assert_eq!(endpoint(&proxy, "São Paulo"), "https://example.test/api/prayer-times");
        assert_eq!(
            query_pairs(&proxy, "São Paulo"),
            [("location", "São Paulo".to_string()), ("key", "k&v".to_string())]
        );
    }

    #[test]
    fn blank_key_is_not_sent() {
        assert_eq!(
            query_pairs(&api(ApiStyle::Proxy, Some("")), "x"),
            [("location", "x".to_string())]
        );
    }

    #[test]
    fn key_is_redacted_in_logs() {
        let pairs = query_pairs(&api(ApiStyle::Proxy, Some("secret")), "Oslo");
        assert_eq!(loggable_query(&pairs), "location=Oslo&key=***");
    }

    struct Canned(Result<&'static str, ScheduleError>);

    impl ScheduleProvider for Canned {
        fn fetch_raw(&self, _location: &str) -> Result<RawResponse, ScheduleError> {
            let body = self.0.clone()?;
            serde_json::from_str(body).map_err(ScheduleError::transport)
        }
    }

    #[test]
    fn provider_builds_schedule() {
        let provider = Canned(Ok(r#"{"status_valid":1,"timezone":"3","items":[{
            "fajr":"4:50 am","shurooq":"6:10 am","dhuhr":"11:58 am",
            "asr":"3:12 pm","maghrib":"5:45 pm","isha":"7:05 pm"}]}"#));
        let schedule = provider.fetch_schedule("Riyadh").unwrap();
        assert_eq!(schedule.entries()[1], PrayerEntry::new(PrayerName::Dhuhr, "11:58 am"));
        assert_eq!(schedule.utc_offset_hours(), 3.0);
    }

    #[test]
    fn provider_surfaces_invalid_location() {
        let provider = Canned(Ok(r#"{"status_valid":0,"items":[]}"#));
        assert_eq!(provider.fetch_schedule("nowhere"), Err(ScheduleError::InvalidLocation));
    }

    #[test]
    fn provider_surfaces_transport_failure() {
        let provider = Canned(Ok("<html>502</html>"));
        assert!(matches!(
            provider.fetch_schedule("x"),
            Err(ScheduleError::TransportFailure(_))
        ));
        let provider = Canned(Err(ScheduleError::transport("connection refused")));
        assert!(matches!(
            provider.fetch_schedule("x"),
            Err(ScheduleError::TransportFailure(_))
        ));
    }
}
