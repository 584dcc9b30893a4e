//! Runtime configuration.
//!
//! Defaults ship inside the binary (`assets/config/default.toml`). A user
//! file is merged over them key by key, so it only needs the values it
//! changes.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rust_embed::RustEmbed;
use serde::Deserialize;
use thiserror::Error;

use crate::effects::MotionLevel;
use crate::form::FieldKind;
use crate::messages::MessageCatalog;

const DEFAULT_CONFIG_FILE: &str = "default.toml";

#[derive(RustEmbed)]
#[folder = "assets/config"]
struct EmbeddedConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("embedded config `{0}` is missing")]
    MissingDefaults(&'static str),

    #[error("config `{origin}` is not valid UTF-8")]
    InvalidUtf8 { origin: String },

    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config `{origin}`: {source}")]
    Parse {
        origin: String,
        #[source]
        source: toml::de::Error,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct FolioConfig {
    pub form: FormConfig,
    pub messages: MessageCatalog,
    pub effects: EffectsConfig,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct FormConfig {
    pub submit_latency_ms: u64,
    pub success_display_ms: u64,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

impl FormConfig {
    pub fn submit_latency(&self) -> Duration {
        Duration::from_millis(self.submit_latency_ms)
    }

    pub fn success_display(&self) -> Duration {
        Duration::from_millis(self.success_display_ms)
    }
}

/// Declares one input of a runtime-defined form.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub label: String,
    #[serde(default)]
    pub kind: FieldKind,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct EffectsConfig {
    pub motion: MotionLevel,
    pub navbar_scroll_threshold: f32,
    pub parallax_speed: f32,
    pub orb_speed_step: f32,
    pub orb_spread_px: f32,
    pub tilt_divisor: f32,
    pub tilt_perspective_px: f32,
    pub typing_start_delay_ms: u64,
    pub typing_char_interval_ms: u64,
    pub skill_stagger_ms: u64,
    pub reveal_threshold: f32,
    pub reveal_bottom_margin_px: f32,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            motion: MotionLevel::Full,
            navbar_scroll_threshold: 50.0,
            parallax_speed: 0.5,
            orb_speed_step: 0.5,
            orb_spread_px: 100.0,
            tilt_divisor: 10.0,
            tilt_perspective_px: 1000.0,
            typing_start_delay_ms: 500,
            typing_char_interval_ms: 100,
            skill_stagger_ms: 200,
            reveal_threshold: 0.1,
            reveal_bottom_margin_px: 50.0,
        }
    }
}

impl EffectsConfig {
    pub fn typing_start_delay(&self) -> Duration {
        Duration::from_millis(self.typing_start_delay_ms)
    }

    pub fn typing_char_interval(&self) -> Duration {
        Duration::from_millis(self.typing_char_interval_ms)
    }

    pub fn skill_stagger(&self) -> Duration {
        Duration::from_millis(self.skill_stagger_ms)
    }
}

impl FolioConfig {
    pub fn embedded() -> ConfigResult<Self> {
        let table = embedded_table()?;
        from_table(table, DEFAULT_CONFIG_FILE)
    }

    /// Merges `overlay` over the embedded defaults.
    pub fn from_toml_str(overlay: &str) -> ConfigResult<Self> {
        Self::merge_overlay(overlay, "<inline>")
    }

    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loading config overlay");
        Self::merge_overlay(&contents, &path.display().to_string())
    }

    fn merge_overlay(overlay: &str, origin: &str) -> ConfigResult<Self> {
        let mut base = embedded_table()?;
        let overlay = parse_table(overlay, origin)?;
        merge_tables(&mut base, overlay);
        from_table(base, origin)
    }
}

fn embedded_table() -> ConfigResult<toml::Table> {
    let file = EmbeddedConfig::get(DEFAULT_CONFIG_FILE)
        .ok_or(ConfigError::MissingDefaults(DEFAULT_CONFIG_FILE))?;
    let text = std::str::from_utf8(file.data.as_ref()).map_err(|_| ConfigError::InvalidUtf8 {
        origin: DEFAULT_CONFIG_FILE.to_string(),
    })?;
    parse_table(text, DEFAULT_CONFIG_FILE)
}

fn parse_table(text: &str, origin: &str) -> ConfigResult<toml::Table> {
    toml::from_str(text).map_err(|source| ConfigError::Parse {
        origin: origin.to_string(),
        source,
    })
}

fn from_table(table: toml::Table, origin: &str) -> ConfigResult<FolioConfig> {
    toml::Value::Table(table)
        .try_into()
        .map_err(|source| ConfigError::Parse {
            origin: origin.to_string(),
            source,
        })
}

// Arrays are replaced wholesale; only tables merge.
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_defaults_match_builtin_values() {
        let config = FolioConfig::embedded().expect("embedded config parses");
        assert_eq!(config.messages, MessageCatalog::default());
        assert_eq!(config.effects, EffectsConfig::default());
        assert_eq!(config.form.submit_latency(), Duration::from_millis(2000));
        assert_eq!(config.form.success_display(), Duration::from_millis(5000));
    }

    #[test]
    fn embedded_defaults_describe_contact_form() {
        let config = FolioConfig::embedded().expect("embedded config parses");
        let kinds = config
            .form
            .fields
            .iter()
            .map(|field| (field.name.as_str(), field.kind))
            .collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![
                ("name", FieldKind::RequiredText),
                ("email", FieldKind::Email),
                ("subject", FieldKind::RequiredText),
                ("message", FieldKind::LongText),
            ]
        );
    }

    #[test]
    fn overlay_only_replaces_given_keys() {
        let config = FolioConfig::from_toml_str(
            r#"
            [form]
            success_display_ms = 1500

            [messages]
            min_message_chars = 20
            "#,
        )
        .expect("overlay parses");
        assert_eq!(config.form.success_display_ms, 1500);
        assert_eq!(config.form.submit_latency_ms, 2000);
        assert_eq!(config.form.fields.len(), 4);
        assert_eq!(config.messages.min_message_chars, 20);
        assert_eq!(config.messages.email_required, "Email is required");
    }

    #[test]
    fn overlay_arrays_replace_defaults() {
        let config = FolioConfig::from_toml_str(
            r#"
            [[form.fields]]
            name = "company"
            label = "Company"
            "#,
        )
        .expect("overlay parses");
        assert_eq!(config.form.fields.len(), 1);
        assert_eq!(config.form.fields[0].kind, FieldKind::Unclassified);
    }

    #[test]
    fn malformed_overlay_reports_origin() {
        let error = FolioConfig::from_toml_str("[form\nsubmit_latency_ms = ")
            .expect_err("broken toml must fail");
        assert!(matches!(error, ConfigError::Parse { ref origin, .. } if origin == "<inline>"));
    }

    #[test]
    fn wrong_value_type_is_a_parse_error() {
        let error = FolioConfig::from_toml_str("[effects]\nmotion = \"sideways\"")
            .expect_err("unknown motion level must fail");
        assert!(matches!(error, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let error = FolioConfig::load("/definitely/not/here/folio.toml")
            .expect_err("missing file must fail");
        assert!(matches!(error, ConfigError::Io { .. }));
    }
}
