use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub frontend: FrontendSettings,
    #[serde(default)]
    pub focus: FocusSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FrontendSettings {
    /// Path to the frontend executable, absolute or relative to the launcher.
    #[serde(default = "default_frontend_path")]
    pub path: PathBuf,
    /// Working directory for the frontend; defaults to the executable's directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,
    #[serde(default = "default_true")]
    pub fullscreen: bool,
    #[serde(default = "default_true")]
    pub borderless: bool,
    /// Force the fullscreen resolution to window_width x window_height.
    #[serde(default)]
    pub force_fullscreen_res: bool,
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    #[serde(default = "default_window_height")]
    pub window_height: u32,
    /// Only read gamelist.xml files instead of scanning rom directories.
    #[serde(default)]
    pub gamelist_only: bool,
    /// 0 = normal, 1 = kiosk mode, 2 = kid mode.
    #[serde(default)]
    pub interface_mode: u8,
    #[serde(default)]
    pub monitor_index: u32,
    #[serde(default)]
    pub no_exit_menu: bool,
    #[serde(default = "default_true")]
    pub vsync: bool,
    #[serde(default)]
    pub draw_framerate: bool,
    /// Extra arguments appended to the command line, shell-style quoting.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub extra_args: String,
}

impl FrontendSettings {
    /// Directory the frontend runs in and treats as its home.
    pub fn run_dir(&self) -> Option<PathBuf> {
        self.working_dir
            .clone()
            .or_else(|| self.path.parent().map(Path::to_path_buf))
    }
}

impl Default for FrontendSettings {
    fn default() -> Self {
        Self {
            path: default_frontend_path(),
            working_dir: None,
            fullscreen: true,
            borderless: true,
            force_fullscreen_res: false,
            window_width: default_window_width(),
            window_height: default_window_height(),
            gamelist_only: false,
            interface_mode: 0,
            monitor_index: 0,
            no_exit_menu: false,
            vsync: true,
            draw_framerate: false,
            extra_args: String::new(),
        }
    }
}

/// Tuning for the foreground-forcing retry loop.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FocusSettings {
    #[serde(default = "default_attempts")]
    pub attempts: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_window_wait_ms")]
    pub window_wait_ms: u64,
    #[serde(default = "default_poll_ms")]
    pub poll_ms: u64,
}

impl FocusSettings {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn window_wait(&self) -> Duration {
        Duration::from_millis(self.window_wait_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_ms)
    }
}

impl Default for FocusSettings {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            window_wait_ms: default_window_wait_ms(),
            poll_ms: default_poll_ms(),
        }
    }
}

fn default_frontend_path() -> PathBuf {
    PathBuf::from("emulationstation").join("emulationstation.exe")
}
fn default_true() -> bool {
    true
}
fn default_window_width() -> u32 {
    1280
}
fn default_window_height() -> u32 {
    720
}
fn default_attempts() -> u32 {
    5
}
fn default_retry_delay_ms() -> u64 {
    300
}
fn default_window_wait_ms() -> u64 {
    10_000
}
fn default_poll_ms() -> u64 {
    250
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config =
            toml::from_str(&content).with_context(|| "Failed to parse config file")?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).with_context(|| "Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Load the config, writing a default file first if none exists yet.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            let config = Self::default();
            config.save(path)?;
            Ok(config)
        }
    }

    pub fn default_path() -> PathBuf {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."));
        exe_dir.join("eslauncher.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.frontend.fullscreen);
        assert!(config.frontend.borderless);
        assert_eq!(config.frontend.window_width, 1280);
        assert_eq!(config.focus.attempts, 5);
        assert_eq!(config.focus.retry_delay(), Duration::from_millis(300));
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config: Config = toml::from_str(
            r#"
            [frontend]
            fullscreen = false
            borderless = false
            window_width = 1920

            [focus]
            attempts = 2
            "#,
        )
        .unwrap();
        assert!(!config.frontend.fullscreen);
        assert_eq!(config.frontend.window_width, 1920);
        // Untouched keys stay at their defaults.
        assert_eq!(config.frontend.window_height, 720);
        assert_eq!(config.focus.attempts, 2);
        assert_eq!(config.focus.poll_ms, 250);
    }

    #[test]
    fn run_dir_falls_back_to_exe_parent() {
        let mut frontend = FrontendSettings::default();
        frontend.path = PathBuf::from("frontend").join("es.exe");
        assert_eq!(frontend.run_dir(), Some(PathBuf::from("frontend")));

        frontend.working_dir = Some(PathBuf::from("elsewhere"));
        assert_eq!(frontend.run_dir(), Some(PathBuf::from("elsewhere")));
    }

    #[test]
    fn first_run_writes_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eslauncher.toml");

        let created = Config::load_or_create(&path).unwrap();
        assert!(path.exists());
        assert_eq!(created.focus.attempts, 5);

        // A second load round-trips the written defaults.
        let reloaded = Config::load(&path).unwrap();
        assert_eq!(reloaded.frontend.window_width, created.frontend.window_width);
        assert_eq!(reloaded.focus.retry_delay_ms, created.focus.retry_delay_ms);
    }
}
