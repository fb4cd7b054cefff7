//! Command grammar for `/aka`.
//!
//! Matchers are tried in order and the first match wins:
//!
//! | text                         | command   |
//! |------------------------------|-----------|
//! | `apps`, `all apps`, `list`   | list apps |
//! | `[apps\|apps:info] app-space`| app info  |
//! | `logs ...`                   | logs      |

use std::sync::LazyLock;

use regex::Regex;

static LIST_APPS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(apps|all apps|list)$").expect("Invalid list-apps regex"));

static APP_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^((apps)|(apps:info))?\s?((\w+)-((\w+-?)+))$").expect("Invalid app-name regex")
});

static LOGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^logs(.*)$").expect("Invalid logs regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    ListApps,
    AppInfo { app_name: String },
    Logs { options: String },
    Unrecognized { text: String },
}

type Matcher = fn(&str) -> Option<Command>;

const MATCHERS: [Matcher; 3] = [match_list_apps, match_app_name, match_logs];

pub fn match_list_apps(text: &str) -> Option<Command> {
    LIST_APPS.is_match(text).then_some(Command::ListApps)
}

pub fn match_app_name(text: &str) -> Option<Command> {
    APP_NAME.captures(text).and_then(|caps| {
        caps.get(4).map(|m| Command::AppInfo {
            app_name: m.as_str().to_string(),
        })
    })
}

pub fn match_logs(text: &str) -> Option<Command> {
    LOGS.captures(text).map(|caps| Command::Logs {
        options: caps
            .get(1)
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default(),
    })
}

/// Resolve raw command text. Whitespace around the text is ignored.
pub fn parse(raw: &str) -> Command {
    let text = raw.trim();
    MATCHERS
        .iter()
        .find_map(|matcher| matcher(text))
        .unwrap_or_else(|| Command::Unrecognized {
            text: raw.to_string(),
        })
}
