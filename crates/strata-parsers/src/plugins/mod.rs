//! Built-in format plugins

mod bash_history;
mod firefox_downloads;
mod firefox_history;
mod zsh_history;

pub use bash_history::BashHistoryPlugin;
pub use firefox_downloads::FirefoxDownloadsPlugin;
pub use firefox_history::FirefoxHistoryPlugin;
pub use zsh_history::ZshHistoryPlugin;

/// Restore a hostname stored with its characters reversed
///
/// Firefox stores hosts as e.g. `moc.elgoog.www.`; the trailing dot of the
/// stored form is dropped. Empty input yields an empty string.
pub fn reverse_hostname(hostname: Option<&str>) -> String {
    let Some(hostname) = hostname.filter(|h| !h.is_empty()) else {
        return String::new();
    };
    if hostname.chars().count() == 1 {
        return hostname.to_string();
    }

    let reversed: String = hostname.chars().rev().collect();
    match reversed.strip_prefix('.') {
        Some(stripped) => stripped.to_string(),
        None => reversed,
    }
}
