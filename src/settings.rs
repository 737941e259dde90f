use log::{info, warn};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShadowSettings {
    #[serde(default)]
    pub precision: ShaderPrecision,
    #[serde(default = "ShadowSettings::default_log_compile_errors")]
    pub log_compile_errors: bool,
    #[serde(default)]
    pub strict_release: bool,
    #[serde(default = "ShadowSettings::default_max_clip_planes")]
    pub max_clip_planes: usize,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            precision: ShaderPrecision::default(),
            log_compile_errors: Self::default_log_compile_errors(),
            strict_release: false,
            max_clip_planes: Self::default_max_clip_planes(),
        }
    }
}

impl ShadowSettings {
    pub fn load() -> Self {
        Self::load_from_path("shadow_settings.json")
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Self {
        use std::fs;

        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(settings) => {
                    info!("Loaded shadow settings from {:?}", path);
                    settings
                }
                Err(err) => {
                    warn!(
                        "Failed to parse {:?} ({}). Falling back to default shadow settings.",
                        path, err
                    );
                    ShadowSettings::default()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(
                    "Shadow settings file {:?} not found. Using default settings.",
                    path
                );
                ShadowSettings::default()
            }
            Err(err) => {
                warn!(
                    "Failed to read {:?} ({}). Falling back to default shadow settings.",
                    path, err
                );
                ShadowSettings::default()
            }
        }
    }

    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<ShadowSettings>(contents).map(Self::validate)
    }

    fn validate(mut self) -> Self {
        if self.max_clip_planes == 0 {
            warn!("max_clip_planes must be greater than zero. Using default value.");
            self.max_clip_planes = Self::default_max_clip_planes();
        }

        self
    }

    const fn default_log_compile_errors() -> bool {
        true
    }

    const fn default_max_clip_planes() -> usize {
        6
    }
}

/// Float/int precision qualifier written into generated shaders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShaderPrecision {
    Lowp,
    Mediump,
    #[default]
    Highp,
}

impl ShaderPrecision {
    pub fn keyword(self) -> &'static str {
        match self {
            ShaderPrecision::Lowp => "lowp",
            ShaderPrecision::Mediump => "mediump",
            ShaderPrecision::Highp => "highp",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_replaces_invalid_values_with_defaults() {
        let validated = ShadowSettings {
            max_clip_planes: 0,
            ..ShadowSettings::default()
        }
        .validate();

        assert_eq!(
            validated.max_clip_planes,
            ShadowSettings::default().max_clip_planes
        );
    }

    #[test]
    fn missing_fields_use_defaults() {
        let settings = ShadowSettings::from_json(r#"{ "precision": "mediump" }"#).unwrap();

        assert_eq!(settings.precision, ShaderPrecision::Mediump);
        assert!(settings.log_compile_errors);
        assert!(!settings.strict_release);
        assert_eq!(settings.max_clip_planes, 6);
    }

    #[test]
    fn parsed_settings_are_validated() {
        let settings =
            ShadowSettings::from_json(r#"{ "max_clip_planes": 0, "strict_release": true }"#)
                .unwrap();

        assert_eq!(settings.max_clip_planes, 6);
        assert!(settings.strict_release);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let settings = ShadowSettings::load_from_path("does/not/exist/shadow_settings.json");
        assert_eq!(settings.precision, ShaderPrecision::Highp);
    }

    #[test]
    fn invalid_precision_is_rejected() {
        assert!(ShadowSettings::from_json(r#"{ "precision": "ultra" }"#).is_err());
    }
}
