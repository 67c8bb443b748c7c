use crate::client::ApiResult;
use crate::{Event, Team, TeamDetail};
use std::fmt;

/// Result of merging one upstream attempt with its fallback records.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Live(T),
    Backup(T, BackupReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupReason {
    /// No credentials configured for the upstream.
    Offline,
    /// Upstream answered but had nothing to show.
    Empty,
    /// Transport, status or parse failure.
    Upstream(String),
}

impl fmt::Display for BackupReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackupReason::Offline => write!(f, "upstream offline (no credentials)"),
            BackupReason::Empty => write!(f, "upstream returned no data"),
            BackupReason::Upstream(msg) => write!(f, "{msg}"),
        }
    }
}

/// Payloads that can come back from an upstream "successfully" yet empty.
pub trait Payload {
    fn is_empty_payload(&self) -> bool;
}

impl Payload for Vec<Event> {
    fn is_empty_payload(&self) -> bool {
        self.is_empty()
    }
}

impl Payload for Vec<Team> {
    fn is_empty_payload(&self) -> bool {
        self.is_empty()
    }
}

impl Payload for TeamDetail {
    fn is_empty_payload(&self) -> bool {
        self.is_empty()
    }
}

/// Merge an upstream attempt with its fallback.
///
/// `None` means the attempt was never made because credentials are missing.
/// The fallback is only built when it is actually needed.
pub fn aggregate<T, F>(attempt: Option<ApiResult<T>>, fallback: F) -> Outcome<T>
where
    T: Payload,
    F: FnOnce() -> T,
{
    match attempt {
        None => Outcome::Backup(fallback(), BackupReason::Offline),
        Some(Err(e)) => Outcome::Backup(fallback(), BackupReason::Upstream(e.to_string())),
        Some(Ok(value)) if value.is_empty_payload() => Outcome::Backup(fallback(), BackupReason::Empty),
        Some(Ok(value)) => Outcome::Live(value),
    }
}

impl<T> Outcome<T> {
    pub fn is_live(&self) -> bool {
        matches!(self, Outcome::Live(_))
    }

    pub fn value(&self) -> &T {
        match self {
            Outcome::Live(v) | Outcome::Backup(v, _) => v,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Outcome::Live(v) | Outcome::Backup(v, _) => v,
        }
    }

    pub fn reason(&self) -> Option<&BackupReason> {
        match self {
            Outcome::Live(_) => None,
            Outcome::Backup(_, reason) => Some(reason),
        }
    }

    /// Error text worth surfacing to the caller; offline and empty are not errors.
    pub fn upstream_error(&self) -> Option<&str> {
        match self.reason() {
            Some(BackupReason::Upstream(msg)) => Some(msg.as_str()),
            _ => None,
        }
    }

    /// Provenance tag for this outcome alone.
    pub fn source(&self, live_tag: &'static str) -> &'static str {
        if self.is_live() { live_tag } else { "mock" }
    }
}

/// Provenance tag for a response built from several outcomes.
pub fn combined_source(live: &[bool], live_tag: &'static str) -> &'static str {
    if live.iter().all(|l| *l) {
        live_tag
    } else if live.iter().any(|l| *l) {
        "mixed"
    } else {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ApiError;

    fn sample() -> Vec<Event> {
        vec![Event { event_key: "k".into(), event_name: "Fallback".into(), ..Default::default() }]
    }

    #[test]
    fn missing_credentials_use_fallback() {
        let out = aggregate::<Vec<Event>, _>(None, sample);
        assert_eq!(out, Outcome::Backup(sample(), BackupReason::Offline));
        assert_eq!(out.source("live"), "mock");
        assert_eq!(out.upstream_error(), None);
    }

    #[test]
    fn upstream_error_uses_fallback_and_keeps_message() {
        let out = aggregate(Some(Err(ApiError::Other("boom".into()))), sample);
        assert_eq!(out.value(), &sample());
        assert_eq!(out.upstream_error(), Some("Error: boom"));
    }

    #[test]
    fn empty_upstream_uses_fallback() {
        let out = aggregate(Some(Ok(Vec::<Event>::new())), sample);
        assert_eq!(out.reason(), Some(&BackupReason::Empty));
        assert!(!out.value().is_empty());
    }

    #[test]
    fn live_data_is_passed_through_without_building_fallback() {
        let live = vec![Event { event_name: "Live".into(), ..Default::default() }];
        let out = aggregate(Some(Ok(live.clone())), || -> Vec<Event> {
            panic!("fallback must not be built")
        });
        assert_eq!(out, Outcome::Live(live));
        assert_eq!(out.source("live-scrape"), "live-scrape");
    }

    #[test]
    fn combined_source_tags() {
        assert_eq!(combined_source(&[true, true], "live"), "live");
        assert_eq!(combined_source(&[true, false], "live"), "mixed");
        assert_eq!(combined_source(&[false, false], "live"), "mock");
    }
}
