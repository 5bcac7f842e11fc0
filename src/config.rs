use std::num::NonZeroU8;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::palette::DEFAULT_BUCKET_SIZE;

/// Page-level settings.
///
/// Defaults match the bundled `index.html`; any of them can be overridden
/// through `data-*` attributes on the canvas element.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub canvas_id: String,
    pub bucket_size: NonZeroU8,
    pub antialias: bool,
    pub initial_shader: usize,
    /// Endpoint returning `{name, url, image}`; `None` disables album art.
    pub now_playing_url: Option<String>,
    pub prev_button_id: String,
    pub next_button_id: String,
    pub favicon_id: String,
    pub log_level: log::Level,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            canvas_id: "canvas".into(),
            bucket_size: DEFAULT_BUCKET_SIZE,
            antialias: true,
            initial_shader: 0,
            now_playing_url: Some("/currently-playing".into()),
            prev_button_id: "prev-button".into(),
            next_button_id: "next-button".into(),
            favicon_id: "favicon".into(),
            log_level: log::Level::Info,
        }
    }
}

fn parse<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|err: T::Err| ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: err.to_string(),
    })
}

impl Config {
    /// Applies overrides from `lookup`, which maps an attribute name without
    /// the `data-` prefix (e.g. `bucket-size`) to its value.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("bucket-size") {
            self.bucket_size = parse("bucket-size", &value)?;
        }
        if let Some(value) = lookup("shader") {
            self.initial_shader = parse("shader", &value)?;
        }
        if let Some(value) = lookup("antialias") {
            self.antialias = parse("antialias", &value)?;
        }
        if let Some(value) = lookup("now-playing") {
            let value = value.trim();
            self.now_playing_url = (!value.is_empty()).then(|| value.to_string());
        }
        if let Some(value) = lookup("log-level") {
            self.log_level = parse("log-level", &value)?;
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn no_overrides_keeps_defaults() {
        let config = Config::default().with_overrides(|_| None).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.bucket_size.get(), 24);
    }

    #[test]
    fn applies_every_override() {
        let config = Config::default()
            .with_overrides(lookup(&[
                ("bucket-size", "32"),
                ("shader", "2"),
                ("antialias", "false"),
                ("now-playing", "/api/now"),
                ("log-level", "debug"),
            ]))
            .unwrap();
        assert_eq!(config.bucket_size.get(), 32);
        assert_eq!(config.initial_shader, 2);
        assert!(!config.antialias);
        assert_eq!(config.now_playing_url.as_deref(), Some("/api/now"));
        assert_eq!(config.log_level, log::Level::Debug);
    }

    #[test]
    fn empty_endpoint_disables_album_art() {
        let config = Config::default()
            .with_overrides(lookup(&[("now-playing", " ")]))
            .unwrap();
        assert_eq!(config.now_playing_url, None);
    }

    #[test]
    fn rejects_zero_bucket_and_junk() {
        for (key, value) in [("bucket-size", "0"), ("bucket-size", "300"), ("shader", "-1")] {
            let err = Config::default()
                .with_overrides(lookup(&[(key, value)]))
                .unwrap_err();
            let ConfigError::Invalid { key: got, value: raw, .. } = err;
            assert_eq!(got, key);
            assert_eq!(raw, value);
        }
    }
}
