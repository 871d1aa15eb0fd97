// ============================================================================
// SHADOW SETTINGS — persisted key=value configuration
// ============================================================================

use std::path::{Path, PathBuf};

use crate::error::ShadowError;
use crate::ops::elevation;
use crate::ops::shadow::ShadowTint;
use crate::log_warn;

const SETTINGS_FILE: &str = "shadow_settings.cfg";
const APP_DIR: &str = "elevation-shadow";

/// Which per-pixel kernel tints the shadow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FilterKind {
    /// Translucent shadow filter, driven by `is_translucent`.
    #[default]
    Translucent,
    /// Shadow-alpha filter: always a black silhouette.
    ShadowAlpha,
}

impl FilterKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "translucent" | "clear" => Some(FilterKind::Translucent),
            "shadow-alpha" | "shadow_alpha" | "alpha" => Some(FilterKind::ShadowAlpha),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FilterKind::Translucent => "translucent",
            FilterKind::ShadowAlpha => "shadow-alpha",
        }
    }
}

/// Everything that shapes a generated shadow.  Any change means the shadow
/// must be regenerated; nothing here is read mid-dispatch.
#[derive(Clone, Debug, PartialEq)]
pub struct ShadowSettings {
    /// Elevation in density-independent pixels.
    pub elevation_dp: f32,
    /// Physical pixels per dp.
    pub density: f32,
    pub filter: FilterKind,
    /// Dimmed colour shadow instead of a black one.
    pub is_translucent: bool,
    /// Suppress the shadow entirely.
    pub clip_shadow: bool,
    /// Clip the shadow to the output bounds.
    pub force_clip: bool,
    /// Run the tint on the GPU when an adapter is available.
    pub gpu_acceleration: bool,
    /// Power preference: "Auto", "high performance", "low power".
    pub preferred_gpu: String,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            elevation_dp: 0.0,
            density: 1.0,
            filter: FilterKind::Translucent,
            is_translucent: false,
            clip_shadow: false,
            force_clip: false,
            gpu_acceleration: false,
            preferred_gpu: "Auto".to_string(),
        }
    }
}

impl ShadowSettings {
    /// The kernel for this configuration, fixed for the whole batch.
    pub fn tint(&self) -> ShadowTint {
        match self.filter {
            FilterKind::Translucent => ShadowTint::from_translucent(self.is_translucent),
            FilterKind::ShadowAlpha => ShadowTint::ShadowAlpha,
        }
    }

    pub fn elevation_px(&self) -> f32 {
        elevation::dp_to_px(self.elevation_dp, self.density)
    }

    pub fn blur_radius(&self) -> f32 {
        elevation::blur_radius(self.elevation_px(), self.density)
    }

    /// Default settings file location.
    /// On Linux:   ~/.config/elevation-shadow/shadow_settings.cfg (XDG_CONFIG_HOME respected)
    /// On Windows: %APPDATA%\elevation-shadow\shadow_settings.cfg
    /// On macOS:   ~/Library/Application Support/elevation-shadow/shadow_settings.cfg
    pub fn settings_path() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            let appdata = std::env::var("APPDATA").ok()?;
            return Some(PathBuf::from(appdata).join(APP_DIR).join(SETTINGS_FILE));
        }
        #[cfg(target_os = "macos")]
        {
            let home = std::env::var("HOME").ok()?;
            return Some(
                PathBuf::from(home)
                    .join("Library")
                    .join("Application Support")
                    .join(APP_DIR)
                    .join(SETTINGS_FILE),
            );
        }
        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        {
            let config_dir = std::env::var("XDG_CONFIG_HOME")
                .map(PathBuf::from)
                .or_else(|_| std::env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
                .ok()?;
            Some(config_dir.join(APP_DIR).join(SETTINGS_FILE))
        }
    }

    /// Load from `path` when given; defaults if absent, missing or unreadable.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        path.and_then(|p| Self::load_from(p).ok()).unwrap_or_default()
    }

    /// Load from `path`.  Unknown keys and unparsable values are ignored and
    /// leave the default in place.
    pub fn load_from(path: &Path) -> Result<Self, ShadowError> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    pub fn parse(content: &str) -> Self {
        let mut s = Self::default();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, val)) = line.split_once('=') else { continue };
            let (key, val) = (key.trim(), val.trim());
            match key {
                "elevation_dp" => {
                    if let Ok(v) = val.parse::<f32>()
                        && v.is_finite()
                    {
                        s.elevation_dp = v;
                    }
                }
                "density" => {
                    if let Ok(v) = val.parse::<f32>()
                        && v.is_finite()
                        && v > 0.0
                    {
                        s.density = v;
                    }
                }
                "filter" => match FilterKind::parse(val) {
                    Some(f) => s.filter = f,
                    None => log_warn!("settings: unknown filter {:?}", val),
                },
                "is_translucent" | "clip_shadow" | "force_clip" | "gpu_acceleration" => {
                    let Some(flag) = parse_flag(val) else {
                        log_warn!("settings: ignoring {}={:?}, not a boolean", key, val);
                        continue;
                    };
                    match key {
                        "is_translucent" => s.is_translucent = flag,
                        "clip_shadow" => s.clip_shadow = flag,
                        "force_clip" => s.force_clip = flag,
                        _ => s.gpu_acceleration = flag,
                    }
                }
                "preferred_gpu" => s.preferred_gpu = val.to_string(),
                other => log_warn!("settings: unknown key {:?}", other),
            }
        }
        s
    }

    pub fn to_config_string(&self) -> String {
        format!(
            "elevation_dp={}\n\
             density={}\n\
             filter={}\n\
             is_translucent={}\n\
             clip_shadow={}\n\
             force_clip={}\n\
             gpu_acceleration={}\n\
             preferred_gpu={}\n",
            self.elevation_dp,
            self.density,
            self.filter.as_str(),
            self.is_translucent,
            self.clip_shadow,
            self.force_clip,
            self.gpu_acceleration,
            self.preferred_gpu,
        )
    }

    /// Write to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ShadowError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_config_string())?;
        Ok(())
    }
}

/// Accepts true/false, 1/0, yes/no and on/off in any case.
fn parse_flag(val: &str) -> Option<bool> {
    match val.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
