use std::{fmt, str::FromStr, time::Duration};

use serde::Deserialize;
use thiserror::Error;

use crate::models::location::Coordinates;

/// What to do when the browser refuses or fails to report a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnDenied {
    #[default]
    UseDefaultLocation,
    AlertUser,
}

impl FromStr for OnDenied {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" | "use_default_location" => Ok(OnDenied::UseDefaultLocation),
            "alert" | "alert_user" => Ok(OnDenied::AlertUser),
            other => Err(format!("unknown geolocation fallback `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPolicy {
    pub on_denied: OnDenied,
    pub default_location: Coordinates,
    /// Upper bound the browser waits for a position.
    pub timeout: Duration,
}

/// Outcome of `navigator.geolocation.getCurrentPosition` as posted by the page.
#[derive(Debug, Clone, PartialEq)]
pub enum GeoReport {
    Position(Coordinates),
    Denied(String),
    Timeout,
    Unsupported,
}

/// Hidden fields filled in by `static/geo.js`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeoForm {
    #[serde(default)]
    pub geo_status: Option<String>,
    #[serde(default)]
    pub geo_latitude: Option<String>,
    #[serde(default)]
    pub geo_longitude: Option<String>,
    #[serde(default)]
    pub geo_message: Option<String>,
}

impl GeoReport {
    pub fn from_form(form: &GeoForm) -> Self {
        let reason = || {
            form.geo_message
                .clone()
                .filter(|message| !message.trim().is_empty())
                .unwrap_or_else(|| "位置情報の取得が拒否されました".into())
        };
        match form.geo_status.as_deref().map(str::trim) {
            Some("ok") => {
                let latitude = parse(form.geo_latitude.as_deref());
                let longitude = parse(form.geo_longitude.as_deref());
                match (latitude, longitude) {
                    (Some(latitude), Some(longitude))
                        if Coordinates::new(latitude, longitude).is_valid() =>
                    {
                        GeoReport::Position(Coordinates::new(latitude, longitude))
                    }
                    _ => GeoReport::Denied("端末から不正な位置情報が送られました".into()),
                }
            }
            Some("denied") | Some("error") => GeoReport::Denied(reason()),
            Some("timeout") => GeoReport::Timeout,
            _ => GeoReport::Unsupported,
        }
    }
}

fn parse(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|value| value.trim().parse::<f64>().ok())
}

/// A usable position and where it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeoFix {
    Device(Coordinates),
    Fallback(Coordinates),
}

impl GeoFix {
    pub fn coordinates(&self) -> Coordinates {
        match self {
            GeoFix::Device(coordinates) | GeoFix::Fallback(coordinates) => *coordinates,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, GeoFix::Fallback(_))
    }
}

impl fmt::Display for GeoFix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.coordinates().fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeoError {
    #[error("お使いのブラウザはGPSをサポートしていません。")]
    Unsupported,
    #[error("現在地を取得できませんでした: {0}")]
    Denied(String),
}

pub fn resolve(report: GeoReport, policy: &GeoPolicy) -> Result<GeoFix, GeoError> {
    let reason = match report {
        GeoReport::Position(coordinates) => return Ok(GeoFix::Device(coordinates)),
        GeoReport::Unsupported => return Err(GeoError::Unsupported),
        GeoReport::Denied(reason) => reason,
        GeoReport::Timeout => format!(
            "{}秒以内に応答がありませんでした",
            policy.timeout.as_secs()
        ),
    };

    match policy.on_denied {
        OnDenied::UseDefaultLocation => Ok(GeoFix::Fallback(policy.default_location)),
        OnDenied::AlertUser => Err(GeoError::Denied(reason)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::location::OSAKA_UMEDA;

    fn policy(on_denied: OnDenied) -> GeoPolicy {
        GeoPolicy {
            on_denied,
            default_location: OSAKA_UMEDA,
            timeout: Duration::from_secs(10),
        }
    }

    fn posted(status: &str, lat: &str, lng: &str) -> GeoForm {
        GeoForm {
            geo_status: Some(status.into()),
            geo_latitude: Some(lat.into()),
            geo_longitude: Some(lng.into()),
            geo_message: None,
        }
    }

    #[test]
    fn device_position_wins() {
        let report = GeoReport::from_form(&posted("ok", "35.0", "135.0"));
        let fix = resolve(report, &policy(OnDenied::AlertUser)).unwrap();
        assert_eq!(fix, GeoFix::Device(Coordinates::new(35.0, 135.0)));
        assert_eq!(fix.to_string(), "lat:35, lng:135");
    }

    #[test]
    fn denial_follows_policy() {
        let fix = resolve(
            GeoReport::Denied("nope".into()),
            &policy(OnDenied::UseDefaultLocation),
        )
        .unwrap();
        assert!(fix.is_fallback());
        assert_eq!(fix.coordinates(), OSAKA_UMEDA);

        let err = resolve(GeoReport::Timeout, &policy(OnDenied::AlertUser)).unwrap_err();
        assert!(matches!(err, GeoError::Denied(_)));
    }

    #[test]
    fn missing_capability_always_alerts() {
        for on_denied in [OnDenied::UseDefaultLocation, OnDenied::AlertUser] {
            let report = GeoReport::from_form(&GeoForm::default());
            assert_eq!(report, GeoReport::Unsupported);
            assert_eq!(resolve(report, &policy(on_denied)), Err(GeoError::Unsupported));
        }
    }

    #[test]
    fn garbage_position_counts_as_denial() {
        let report = GeoReport::from_form(&posted("ok", "north", "135.0"));
        assert!(matches!(report, GeoReport::Denied(_)));
    }

    #[test]
    fn parses_fallback_switch() {
        assert_eq!("default".parse::<OnDenied>(), Ok(OnDenied::UseDefaultLocation));
        assert_eq!("ALERT".parse::<OnDenied>(), Ok(OnDenied::AlertUser));
        assert!("retry".parse::<OnDenied>().is_err());
    }
}
