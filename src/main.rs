#![cfg_attr(windows, windows_subsystem = "windows")]

mod config;
mod focus;
mod launcher;
#[cfg(windows)]
mod win32;

use anyhow::Result;
use config::Config;
use log::info;

fn main() -> Result<()> {
    env_logger::init();

    let config_path = Config::default_path();
    info!("Loading config from {}", config_path.display());
    let config = Config::load_or_create(&config_path)?;

    run(&config)
}

#[cfg(windows)]
fn run(config: &Config) -> Result<()> {
    use focus::WaitOutcome;
    use log::warn;

    let child = launcher::spawn_frontend(config)?;
    let process = win32::SpawnedProcess::new(child);
    let ops = win32::Win32WindowControl;

    let focus_cfg = &config.focus;
    match focus::wait_for_main_window(&process, focus_cfg.window_wait(), focus_cfg.poll_interval())
    {
        WaitOutcome::Window(_) => {
            let focused = focus::bring_to_front_with_retry(
                &ops,
                &process,
                focus_cfg.attempts,
                focus_cfg.retry_delay(),
            );
            if !focused {
                // Not fatal: the frontend is running, just not focused.
                warn!("Could not bring the frontend window to the foreground");
            }
        }
        WaitOutcome::Timeout => {
            warn!(
                "Frontend created no window within {:?}; leaving it to come up on its own",
                focus_cfg.window_wait()
            );
        }
        WaitOutcome::ProcessExited => {
            anyhow::bail!("Frontend exited before creating a window");
        }
    }

    info!("Frontend is up, quitting launcher");
    Ok(())
}

#[cfg(not(windows))]
fn run(_config: &Config) -> Result<()> {
    anyhow::bail!("eslauncher only runs on Windows");
}
