//! Typed settings derived from the raw configuration.
//!
//! [`AppSettings`] is the hot-reloaded snapshot read by request handlers.
//! [`StartupSettings`] is computed once and handed to the subsystems that are
//! not reloaded (HTTP listener, sessions, XSRF, ORM).

use serde::Serialize;
use crate::config::loader::{get, get_bool, get_list, get_str};
use crate::config::raw::RawConfig;

pub const APP_VER: &str = env!("CARGO_PKG_VERSION");

/// Server run mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    #[default]
    Dev,
    Pro,
}

impl RunMode {
    /// Only the exact value `pro` selects production mode.
    pub fn from_value(value: &str) -> Self {
        if value == "pro" {
            RunMode::Pro
        } else {
            RunMode::Dev
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::Dev => "dev",
            RunMode::Pro => "pro",
        }
    }
}

/// Hot-reloaded settings snapshot.
///
/// Never mutated after construction; a reload builds a new value and swaps it
/// in through [`SettingsPublisher`](crate::config::SettingsPublisher).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppSettings {
    /// Application name shown in pages.
    pub app_name: String,

    /// Logo URL.
    pub app_logo: String,

    /// Public base URL.
    pub app_url: String,

    pub run_mode: RunMode,

    /// `run_mode == pro`.
    pub is_pro_mode: bool,

    /// Supported locales, in configured order.
    pub langs: Vec<String>,

    /// Failed logins allowed before lockout.
    pub login_max_retries: u32,

    /// Lifetime of the "remember me" cookie in days.
    pub login_remember_days: u32,

    pub cookie_remember_name: String,
    pub cookie_user_name: String,

    /// Session parameters as currently configured.
    pub session: SessionSettings,

    /// XSRF parameters as currently configured.
    pub xsrf: XsrfSettings,
}

impl AppSettings {
    /// Derive a snapshot from parsed configuration, applying defaults.
    pub fn from_raw(raw: &RawConfig) -> Self {
        let run_mode = RunMode::from_value(&get_str(raw, "app", "run_mode", "dev"));
        Self {
            app_name: get_str(raw, "app", "app_name", "Lotus"),
            app_logo: get_str(raw, "app", "app_logo", ""),
            app_url: get_str(raw, "app", "app_url", ""),
            run_mode,
            is_pro_mode: run_mode == RunMode::Pro,
            langs: get_list(raw, "i18n", "langs", "en-US|zh-CN"),
            login_max_retries: get(raw, "app", "login_max_retries", 3),
            login_remember_days: get(raw, "app", "login_remember_days", 7),
            cookie_remember_name: get_str(raw, "app", "cookie_remember_name", "lotus_magic"),
            cookie_user_name: get_str(raw, "app", "cookie_user_name", "lotus_power"),
            session: SessionSettings::from_raw(raw),
            xsrf: XsrfSettings::from_raw(raw),
        }
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self::from_raw(&RawConfig::default())
    }
}

/// Session storage parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSettings {
    /// One of `memory`, `file`, `mysql`, `redis`.
    pub provider: String,

    /// Save path; only meaningful for persistent providers.
    pub save_path: Option<String>,

    /// Cookie name.
    pub name: String,

    /// Cookie lifetime in seconds (0 = browser session).
    pub cookie_life_time: i64,

    /// GC max lifetime in seconds.
    pub gc_max_lifetime: i64,
}

impl SessionSettings {
    pub fn from_raw(raw: &RawConfig) -> Self {
        let provider = get_str(raw, "session", "session_provider", "memory");
        let save_path = match provider.as_str() {
            "file" | "mysql" | "redis" => Some(get_str(raw, "session", "session_path", "sessions")),
            _ => None,
        };
        Self {
            provider,
            save_path,
            name: get_str(raw, "session", "session_name", "lotus_sess"),
            cookie_life_time: get(raw, "session", "session_life_time", 0),
            gc_max_lifetime: get(raw, "session", "session_gc_time", 86400),
        }
    }
}

/// Cross-site request forgery protection parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct XsrfSettings {
    pub enabled: bool,

    /// Signing key, present only when enabled.
    #[serde(skip_serializing)]
    pub key: Option<String>,

    /// Token lifetime in seconds, present only when enabled.
    pub expire: Option<i64>,
}

impl XsrfSettings {
    pub fn from_raw(raw: &RawConfig) -> Self {
        let enabled = get_bool(raw, "xsrf", "xsrf_on", true);
        if !enabled {
            return Self {
                enabled,
                key: None,
                expire: None,
            };
        }
        Self {
            enabled,
            key: Some(get_str(raw, "xsrf", "xsrf_key", "lotus_wulove")),
            expire: Some(get(raw, "xsrf", "xsrf_expire", 86400 * 30)),
        }
    }
}

/// Database connection parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrmSettings {
    pub driver_name: String,
    pub data_source: String,
    pub max_idle_conn: u32,
    pub max_open_conn: u32,
}

impl OrmSettings {
    pub fn from_raw(raw: &RawConfig) -> Self {
        Self {
            driver_name: get_str(raw, "orm", "driver_name", "mysql"),
            data_source: get_str(raw, "orm", "data_source", "root:root@/lotus?charset=utf8&loc=UTC"),
            max_idle_conn: get(raw, "orm", "max_idle_conn", 30),
            max_open_conn: get(raw, "orm", "max_open_conn", 50),
        }
    }
}

/// Settings read once at startup and never hot-reloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupSettings {
    pub run_mode: RunMode,

    /// HTTP listener port.
    pub http_port: u16,

    /// Value of the `Server` response header.
    pub server_name: String,

    /// Prometheus exporter address; exporter disabled when absent.
    pub metrics_address: Option<String>,

    pub session: SessionSettings,
    pub xsrf: XsrfSettings,
    pub orm: OrmSettings,
}

impl StartupSettings {
    pub fn from_raw(raw: &RawConfig) -> Self {
        Self {
            run_mode: RunMode::from_value(&get_str(raw, "app", "run_mode", "dev")),
            http_port: get(raw, "app", "http_port", 8080),
            server_name: format!("lotus:{}", APP_VER),
            metrics_address: raw
                .value("app", "metrics_address")
                .filter(|v| !v.is_empty())
                .map(String::from),
            session: SessionSettings::from_raw(raw),
            xsrf: XsrfSettings::from_raw(raw),
            orm: OrmSettings::from_raw(raw),
        }
    }
}
