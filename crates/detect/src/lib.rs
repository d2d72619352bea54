//! Device and browser classification from the user-agent string.
//!
//! [`DeviceProfile::detect`] is a pure function of its inputs. Callers
//! compute the profile once at startup and pass it to whoever needs it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// User-agent fragments that mark a handheld device.
pub const MOBILE_MARKERS: &[&str] = &[
    "mobile",
    "phone",
    "android",
    "iphone",
    "ipod",
    "blackberry",
    "windows phone",
];

/// Fragments identifying an iOS device.
pub const IOS_MARKERS: &[&str] = &["ipad", "iphone", "ipod"];

/// Fragments that rule out Safari on iOS (other engines embed "safari").
pub const NON_SAFARI_MARKERS: &[&str] = &["chrome", "crios", "fxios"];

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Android,
    IOS,
    Desktop,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Platform::Android => "Android",
            Platform::IOS => "iOS",
            Platform::Desktop => "Desktop",
        })
    }
}

/// Mobile browsers with known userscript support.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserFlags {
    pub kiwi: bool,
    pub edge_mobile: bool,
    pub firefox_mobile: bool,
    pub safari_mobile: bool,
    pub yandex: bool,
}

impl BrowserFlags {
    pub fn any(&self) -> bool {
        self.kiwi || self.edge_mobile || self.firefox_mobile || self.safari_mobile || self.yandex
    }
}

/// Classification of the browsing device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceProfile {
    pub is_mobile: bool,
    pub is_android: bool,
    pub is_ios: bool,
    pub is_tablet: bool,
    pub has_touch: bool,
    pub user_agent: String,
    pub browser: BrowserFlags,
}

impl DeviceProfile {
    /// Classify a device from its user-agent and whether it reports touch
    /// support. Matching is case-insensitive.
    pub fn detect(user_agent: &str, has_touch: bool) -> Self {
        let ua = user_agent.to_lowercase();

        let is_android = ua.contains("android");
        let is_ios = contains_any(&ua, IOS_MARKERS);
        let is_tablet = ua.contains("ipad") || (is_android && !ua.contains("mobile"));
        let on_handheld_os = is_android || is_ios;

        let browser = BrowserFlags {
            kiwi: ua.contains("kiwi") || (ua.contains("chrome") && is_android),
            edge_mobile: ua.contains("edg/") && on_handheld_os,
            firefox_mobile: ua.contains("firefox") && on_handheld_os,
            safari_mobile: ua.contains("safari") && is_ios && !contains_any(&ua, NON_SAFARI_MARKERS),
            yandex: ua.contains("yabrowser"),
        };

        let is_mobile = on_handheld_os || has_touch || contains_any(&ua, MOBILE_MARKERS);

        let profile = Self {
            is_mobile,
            is_android,
            is_ios,
            is_tablet,
            has_touch,
            user_agent: user_agent.to_string(),
            browser,
        };
        tracing::debug!(
            mobile = profile.is_mobile,
            platform = %profile.platform(),
            touch = has_touch,
            "device detected"
        );
        profile
    }

    pub fn platform(&self) -> Platform {
        if self.is_android {
            Platform::Android
        } else if self.is_ios {
            Platform::IOS
        } else {
            Platform::Desktop
        }
    }

    /// Desktop browsers always qualify; mobile ones only when known.
    pub fn supports_userscripts(&self) -> bool {
        !self.is_mobile || self.browser.any()
    }

    pub fn recommended_manager(&self) -> &'static str {
        if !self.is_mobile {
            return "Tampermonkey (Desktop)";
        }
        let browser = &self.browser;
        if browser.kiwi {
            "Built-in Chrome Extension support"
        } else if browser.edge_mobile {
            "Tampermonkey for Edge Mobile"
        } else if browser.firefox_mobile {
            "Greasemonkey or Tampermonkey"
        } else if browser.safari_mobile {
            "Tampermonkey or Userscripts App"
        } else if browser.yandex {
            "Built-in extension support"
        } else {
            "Not supported"
        }
    }

    /// Human-readable multi-line summary.
    pub fn summary(&self) -> String {
        format!(
            "Mobile: {}\nPlatform: {}\nTouch: {}\nUserscript support: {}\nRecommended manager: {}",
            self.is_mobile,
            self.platform(),
            self.has_touch,
            self.supports_userscripts(),
            self.recommended_manager(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESKTOP_CHROME: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";
    const ANDROID_CHROME: &str = "Mozilla/5.0 (Linux; Android 13; Pixel 7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Mobile Safari/537.36";
    const ANDROID_TABLET: &str = "Mozilla/5.0 (Linux; Android 13; SM-X700) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";
    const IPHONE_SAFARI: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
    const IPHONE_CHROME: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) CriOS/120.0 Mobile/15E148 Safari/604.1";
    const IPAD_SAFARI: &str = "Mozilla/5.0 (iPad; CPU OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
    const ANDROID_FIREFOX: &str = "Mozilla/5.0 (Android 13; Mobile; rv:120.0) Gecko/120.0 Firefox/120.0";
    const IPHONE_EDGE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 EdgiOS/120.0 Mobile/15E148 Safari/605.1.15 Edg/120.0";
    const DESKTOP_YANDEX: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 YaBrowser/24.1 Safari/537.36";
    const BLACKBERRY: &str = "Mozilla/5.0 (BlackBerry; U; BlackBerry 9900; en) AppleWebKit/534.11+ (KHTML, like Gecko) Version/7.1.0.346 Mobile Safari/534.11+";

    #[test]
    fn test_desktop() {
        let profile = DeviceProfile::detect(DESKTOP_CHROME, false);
        assert!(!profile.is_mobile);
        assert_eq!(profile.platform(), Platform::Desktop);
        assert!(profile.supports_userscripts());
        assert_eq!(profile.recommended_manager(), "Tampermonkey (Desktop)");
    }

    #[test]
    fn test_desktop_with_touch_counts_as_mobile() {
        let profile = DeviceProfile::detect(DESKTOP_CHROME, true);
        assert!(profile.is_mobile);
        assert!(!profile.supports_userscripts());
        assert_eq!(profile.recommended_manager(), "Not supported");
    }

    #[test]
    fn test_classification_table() {
        let cases: &[(&str, Platform, bool, &str)] = &[
            (ANDROID_CHROME, Platform::Android, false, "Built-in Chrome Extension support"),
            (ANDROID_TABLET, Platform::Android, true, "Built-in Chrome Extension support"),
            (IPHONE_SAFARI, Platform::IOS, false, "Tampermonkey or Userscripts App"),
            (IPAD_SAFARI, Platform::IOS, true, "Tampermonkey or Userscripts App"),
            (ANDROID_FIREFOX, Platform::Android, false, "Greasemonkey or Tampermonkey"),
            (IPHONE_EDGE, Platform::IOS, false, "Tampermonkey for Edge Mobile"),
        ];

        for &(ua, platform, tablet, manager) in cases {
            let profile = DeviceProfile::detect(ua, true);
            assert!(profile.is_mobile, "{ua}");
            assert_eq!(profile.platform(), platform, "{ua}");
            assert_eq!(profile.is_tablet, tablet, "{ua}");
            assert_eq!(profile.recommended_manager(), manager, "{ua}");
            assert!(profile.supports_userscripts(), "{ua}");
        }
    }

    #[test]
    fn test_chrome_on_ios_is_not_safari() {
        let profile = DeviceProfile::detect(IPHONE_CHROME, true);
        assert!(!profile.browser.safari_mobile);
        assert!(!profile.supports_userscripts());
    }

    #[test]
    fn test_yandex_flag_is_platform_independent() {
        let profile = DeviceProfile::detect(DESKTOP_YANDEX, false);
        assert!(profile.browser.yandex);
        assert!(!profile.is_mobile);
    }

    #[test]
    fn test_mobile_marker_without_handheld_os() {
        let profile = DeviceProfile::detect(BLACKBERRY, false);
        assert!(profile.is_mobile);
        assert_eq!(profile.platform(), Platform::Desktop);
        assert_eq!(profile.recommended_manager(), "Not supported");
    }

    #[test]
    fn test_profile_serializes() {
        let profile = DeviceProfile::detect(IPHONE_SAFARI, true);
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["browser"]["safari_mobile"], true);
        assert_eq!(serde_json::to_value(Platform::IOS).unwrap(), "ios");
        assert!(profile.summary().contains("Platform: iOS"));
    }
}
