use log::LevelFilter;
use stitch_console::console::RESULT_WINDOW;
use stitch_console::core_modules::border::BORDER_WINDOW;
use stitch_console::core_modules::feature_inspector::MATCHES_WINDOW;
use stitch_console::core_modules::viewer::{DisplaySurface, HeadlessSurface, HighGuiSurface};
use stitch_console::{Console, ConsoleConfig};
use std::io;

/// Whether highgui has somewhere to draw. Only X11/Wayland sessions are detected;
/// other platforms always have a window system.
fn display_available() -> bool {
    if cfg!(target_os = "linux") {
        std::env::var_os("DISPLAY").is_some() || std::env::var_os("WAYLAND_DISPLAY").is_some()
    } else {
        true
    }
}

fn headless_notice() -> String {
    format!(
        "no display found; the '{}', '{}' and '{}' windows will be skipped",
        MATCHES_WINDOW, RESULT_WINDOW, BORDER_WINDOW
    )
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Warn)
        .parse_default_env()
        .init();

    let config = ConsoleConfig::from_current_dir()?;
    log::info!("base directory: {}", config.base_dir.display());

    let surface: Box<dyn DisplaySurface> = if display_available() {
        Box::new(HighGuiSurface::new(config.viewer.refresh_delay_ms))
    } else {
        log::warn!("{}", headless_notice());
        Box::new(HeadlessSurface::default())
    };

    let stdin = io::stdin();
    let mut console = Console::new(config, surface, io::stdout());
    console.run(stdin.lock())?;
    Ok(())
}
