//! TLS certificate models

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Certificates are renewed this many days before they expire
pub const RENEWAL_WINDOW_DAYS: i64 = 30;

/// Display classification by remaining validity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CertificateColor {
    Green,
    Yellow,
    Orange,
    Red,
}

impl CertificateColor {
    pub fn for_days(days_until_expiry: i64) -> Self {
        if days_until_expiry > 60 {
            CertificateColor::Green
        } else if days_until_expiry > 30 {
            CertificateColor::Yellow
        } else if days_until_expiry > 7 {
            CertificateColor::Orange
        } else {
            CertificateColor::Red
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CertificateColor::Green => "green",
            CertificateColor::Yellow => "yellow",
            CertificateColor::Orange => "orange",
            CertificateColor::Red => "red",
        }
    }
}

/// A Let's Encrypt certificate as listed by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SslCertificate {
    pub app_name: String,
    /// Expiry as reported by the host
    pub expiry_date: String,
    /// Parsed expiry; `None` when the host text did not parse
    pub expires_at: Option<NaiveDateTime>,
    /// 0 when the remaining time could not be parsed
    pub days_until_expiry: i64,
    pub days_until_renewal: i64,
    pub auto_renew: bool,
}

impl SslCertificate {
    pub fn new(
        app_name: impl Into<String>,
        expiry_date: impl Into<String>,
        expires_at: Option<NaiveDateTime>,
        days_until_expiry: i64,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            expiry_date: expiry_date.into(),
            expires_at,
            days_until_expiry,
            days_until_renewal: (days_until_expiry - RENEWAL_WINDOW_DAYS).max(0),
            auto_renew: true,
        }
    }

    /// Recomputed on every call, never stored
    pub fn status_color(&self) -> CertificateColor {
        CertificateColor::for_days(self.days_until_expiry)
    }
}

/// Per-application TLS state from the certs report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SslStatus {
    pub enabled: bool,
    pub hostnames: Vec<String>,
    /// Expiry as reported by the host, empty when absent
    pub expires_at_raw: String,
    pub expires_at: Option<NaiveDateTime>,
    pub issuer: String,
    pub verified: String,
}

impl SslStatus {
    /// Whole days from `now` until expiry, 0 when unknown
    pub fn days_until_expiry_at(&self, now: NaiveDateTime) -> i64 {
        self.expires_at
            .map(|expiry| (expiry - now).num_days())
            .unwrap_or(0)
    }

    pub fn days_until_expiry(&self) -> i64 {
        self.days_until_expiry_at(Utc::now().naive_utc())
    }

    pub fn status_color(&self) -> CertificateColor {
        CertificateColor::for_days(self.days_until_expiry())
    }
}
