//! Frontend process launching and command-line assembly.

use std::process::{Child, Command};

use anyhow::{Context, Result};
use log::info;

use crate::config::Config;

/// Build the frontend's argument list from the configuration.
pub fn frontend_args(config: &Config) -> Result<Vec<String>> {
    let frontend = &config.frontend;
    let mut args: Vec<String> = Vec::new();

    if frontend.fullscreen && frontend.force_fullscreen_res {
        args.push("--resolution".into());
        args.push(frontend.window_width.to_string());
        args.push(frontend.window_height.to_string());
    } else if !frontend.fullscreen && !frontend.borderless {
        args.push("--windowed".into());
        args.push("--resolution".into());
        args.push(frontend.window_width.to_string());
        args.push(frontend.window_height.to_string());
    } else if frontend.borderless {
        args.push("--fullscreen-borderless".into());
    } else {
        args.push("--fullscreen".into());
    }

    if frontend.gamelist_only {
        args.push("--gamelist-only".into());
    }

    match frontend.interface_mode {
        2 => args.push("--force-kid".into()),
        1 => args.push("--force-kiosk".into()),
        _ => {}
    }

    if frontend.monitor_index > 0 {
        args.push("--monitor".into());
        args.push(frontend.monitor_index.to_string());
    }

    if frontend.no_exit_menu {
        args.push("--no-exit".into());
    }

    args.push("--vsync".into());
    args.push(if frontend.vsync { "1" } else { "0" }.into());

    if frontend.draw_framerate {
        args.push("--draw-framerate".into());
    }

    if let Some(home) = frontend.run_dir() {
        args.push("--home".into());
        args.push(home.display().to_string());
    }

    if !frontend.extra_args.is_empty() {
        let extra = shell_words::split(&frontend.extra_args)
            .context("Failed to parse frontend.extra_args")?;
        args.extend(extra);
    }

    Ok(args)
}

/// Spawn the frontend process with the configured arguments.
pub fn spawn_frontend(config: &Config) -> Result<Child> {
    let exe = &config.frontend.path;
    if !exe.is_file() {
        anyhow::bail!("Frontend executable not found at {}", exe.display());
    }

    let args = frontend_args(config)?;
    info!("Launching {} {}", exe.display(), shell_words::join(&args));

    let mut cmd = Command::new(exe);
    cmd.args(&args);
    if let Some(dir) = config.frontend.run_dir() {
        cmd.current_dir(dir);
    }

    cmd.spawn()
        .with_context(|| format!("Failed to start frontend {}", exe.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn config_from(toml: &str) -> Config {
        toml::from_str(toml).unwrap()
    }

    #[test]
    fn default_config_runs_borderless_fullscreen() {
        let config = Config::default();
        let args = frontend_args(&config).unwrap();
        assert_eq!(args[0], "--fullscreen-borderless");
        assert!(args.contains(&"--vsync".to_string()));
        assert!(args.contains(&"1".to_string()));
        assert!(args.contains(&"--home".to_string()));
    }

    #[test]
    fn windowed_mode_includes_resolution() {
        let config = config_from(
            r#"
            [frontend]
            fullscreen = false
            borderless = false
            window_width = 1600
            window_height = 900
            "#,
        );
        let args = frontend_args(&config).unwrap();
        assert_eq!(args[..4], ["--windowed", "--resolution", "1600", "900"]);
    }

    #[test]
    fn forced_fullscreen_resolution_wins_over_borderless() {
        let config = config_from(
            r#"
            [frontend]
            fullscreen = true
            force_fullscreen_res = true
            "#,
        );
        let args = frontend_args(&config).unwrap();
        assert_eq!(args[..3], ["--resolution", "1280", "720"]);
    }

    #[test]
    fn interface_modes_map_to_kiosk_and_kid() {
        let kiosk = config_from("[frontend]\ninterface_mode = 1\n");
        assert!(frontend_args(&kiosk).unwrap().contains(&"--force-kiosk".to_string()));

        let kid = config_from("[frontend]\ninterface_mode = 2\n");
        assert!(frontend_args(&kid).unwrap().contains(&"--force-kid".to_string()));
    }

    #[test]
    fn extra_args_are_split_shell_style() {
        let config = config_from(
            r#"
            [frontend]
            extra_args = "--max-vram 256 --splash-image 'my image.png'"
            "#,
        );
        let args = frontend_args(&config).unwrap();
        let tail = &args[args.len() - 4..];
        assert_eq!(tail, ["--max-vram", "256", "--splash-image", "my image.png"]);
    }

    #[test]
    fn malformed_extra_args_are_rejected() {
        let config = config_from(
            r#"
            [frontend]
            extra_args = "--video 'unterminated"
            "#,
        );
        assert!(frontend_args(&config).is_err());
    }
}
