//! User-Agent classification into coarse OS and device categories.
//!
//! Rules are ordered substring checks and the first match wins. The function is
//! total: absent or unrecognised input falls back to `Unknown` / `Desktop`.

use std::fmt;

/// Operating system family derived from a User-Agent string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OsCategory {
    Windows,
    Ios,
    Android,
    ChromeOs,
    MacOs,
    Linux,
    Unknown,
}

impl OsCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Windows => "Windows",
            Self::Ios => "iOS",
            Self::Android => "Android",
            Self::ChromeOs => "Chrome OS",
            Self::MacOs => "macOS",
            Self::Linux => "Linux",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for OsCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Device form factor derived from a User-Agent string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceCategory {
    Tablet,
    Mobile,
    Desktop,
}

impl DeviceCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tablet => "Tablet",
            Self::Mobile => "Mobile",
            Self::Desktop => "Desktop",
        }
    }
}

impl fmt::Display for DeviceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const OS_RULES: &[(&[&str], OsCategory)] = &[
    (&["Windows"], OsCategory::Windows),
    (&["iPhone", "iPad", "iPod"], OsCategory::Ios),
    (&["Android"], OsCategory::Android),
    (&["CrOS"], OsCategory::ChromeOs),
    (&["Macintosh", "Mac OS X"], OsCategory::MacOs),
    (&["Linux"], OsCategory::Linux),
];

const DEVICE_RULES: &[(&[&str], DeviceCategory)] = &[
    (&["iPad", "Tablet"], DeviceCategory::Tablet),
    (&["Mobile", "iPhone", "Android"], DeviceCategory::Mobile),
];

fn first_match<T: Copy>(ua: &str, rules: &[(&[&str], T)]) -> Option<T> {
    rules
        .iter()
        .find(|(needles, _)| needles.iter().any(|needle| ua.contains(needle)))
        .map(|(_, category)| *category)
}

/// Classifies a raw User-Agent header value.
pub fn classify(user_agent: Option<&str>) -> (OsCategory, DeviceCategory) {
    let ua = user_agent.unwrap_or_default();

    let os = first_match(ua, OS_RULES).unwrap_or(OsCategory::Unknown);
    let device = first_match(ua, DEVICE_RULES).unwrap_or(DeviceCategory::Desktop);

    (os, device)
}
