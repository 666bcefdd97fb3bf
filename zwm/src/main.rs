mod atoms;
mod background;
mod bar;
mod color;
mod command;
mod config;
mod errors;
mod keyboard;
mod keysyms;
mod layouts;
mod mod_mask;
mod rect;
mod rules;
mod size_hints;
mod spawn;
mod states;
mod tags;
mod utils;
mod watchers;

#[cfg(test)]
mod tests;

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{bail, Context};
use flexi_logger::{Duplicate, FileSpec, Logger, LoggerHandle, WriteMode};
use structopt::StructOpt;
use time::UtcOffset;
use x11rb::{
    connection::Connection,
    errors::{ReplyError, ReplyOrIdError},
    protocol::{xproto::*, ErrorKind, Event},
    rust_connection::RustConnection,
};

use common::WM_NAME;
use config::Config;
use errors::{ignore_benign, is_ignorable, x11_error};
use states::WMState;
use watchers::{InputMethodSource, VolumeSource, Watcher};

/// How often the bar is redrawn, for the clock
const REFRESH_PERIOD: Duration = Duration::from_secs(1);
/// How often the volume and the input method are polled
const WATCH_PERIOD: Duration = Duration::from_secs(1);

#[derive(StructOpt, Debug)]
struct Opt {
    /// Optional path to a config file
    config: Option<PathBuf>,
    /// Prints the default configuration in stdout and exits
    #[structopt(short, long)]
    print: bool,
}

fn try_become_wm(conn: &RustConnection, screen: &Screen) -> Result<(), ReplyError> {
    let change = ChangeWindowAttributesAux::default().event_mask(EventMask::SUBSTRUCTURE_REDIRECT);
    conn.change_window_attributes(screen.root, &change)?.check()
}

fn start_logger(config: &Config) -> anyhow::Result<LoggerHandle> {
    let logger = Logger::try_with_env_or_str("info")?;
    let logger = match &config.log_dir {
        Some(dir) => logger
            .log_to_file(FileSpec::default().directory(dir).basename(WM_NAME))
            .write_mode(WriteMode::Async)
            .format_for_files(flexi_logger::detailed_format)
            .duplicate_to_stderr(Duplicate::Warn)
            .format_for_stderr(flexi_logger::colored_detailed_format),
        None => logger
            .log_to_stderr()
            .format(flexi_logger::colored_detailed_format),
    };
    Ok(logger.start()?)
}

fn main() -> anyhow::Result<()> {
    let options: Opt = Opt::from_args();
    if options.print {
        println!("{}", Config::default().to_ron()?);
        return Ok(());
    }
    let config = Config::load(options.config.clone())
        .with_context(|| format!("Failed to load configuration file {:?}", options.config))?;
    let _logger = start_logger(&config).context("Failed to start the logger")?;

    // has to happen while we are the only thread
    let utc_offset = UtcOffset::current_local_offset().unwrap_or_else(|_| {
        log::warn!("Local time offset unknown, the clock shows UTC");
        UtcOffset::UTC
    });

    let (conn, screen_num) =
        RustConnection::connect(None).context("Failed to connect to the X server")?;
    let screen = &conn.setup().roots[screen_num];
    if let Err(err) = try_become_wm(&conn, screen) {
        match x11_error(&err) {
            Some(error) if error.error_kind == ErrorKind::Access => {
                bail!("Another WM in already running.")
            }
            _ => bail!("Failed to select SubstructureRedirect on the root window: {:?}", err),
        }
    }
    log::info!("Starting {} on screen {}", WM_NAME, screen_num);

    spawn::ignore_children().context("Failed to ignore SIGCHLD")?;

    let mut wm_state = WMState::new(&conn, screen_num, config, utc_offset)
        .context("Failed to set up the window manager")?;
    wm_state
        .scan_windows()
        .context("Error while looking for pre-existing windows")?;

    let poller = Arc::new(polling::Poller::new().context("Failed to create the poller")?);
    poller
        .add(conn.stream(), polling::Event::readable(1))
        .context("Failed to watch the X connection")?;

    let volume = if wm_state.config.volume_panel {
        Some(Watcher::spawn(VolumeSource, WATCH_PERIOD, poller.clone())?)
    } else {
        None
    };
    let input_method = if wm_state.config.input_method_panel {
        Some(Watcher::spawn(InputMethodSource, WATCH_PERIOD, poller.clone())?)
    } else {
        None
    };
    wm_state.volume = volume.as_ref().map(|w| w.latest.clone());
    wm_state.input_method = input_method.as_ref().map(|w| w.latest.clone());

    let result = run(&mut wm_state, &poller);

    if let Err(e) = wm_state.teardown() {
        log::error!("Failed to clean up: {:?}", e);
    }
    if let Some(watcher) = volume {
        watcher.stop();
    }
    if let Some(watcher) = input_method {
        watcher.stop();
    }
    result
}

fn run(wm_state: &mut WMState, poller: &polling::Poller) -> anyhow::Result<()> {
    // events from poller go here
    let mut events = Vec::new();

    while wm_state.running {
        wm_state.conn.flush()?;
        events.clear();
        poller
            .wait(&mut events, Some(REFRESH_PERIOD))
            .context("Failed to wait for events")?;
        // By default once it gets the first event from a source it doesn't wait for another one again
        if events.iter().any(|ev| ev.key == 1) {
            poller.modify(wm_state.conn.stream(), polling::Event::readable(1))?;
        }

        while let Some(event) = wm_state.next_event()? {
            if let Event::Error(error) = &event {
                if is_ignorable(error) {
                    log::debug!("Ignoring {:?} from {:?}", error.error_kind, error.request_name);
                    continue;
                }
                log::error!("Unexpected X error: {:?}", error);
                bail!("Unexpected {:?} from {:?}", error.error_kind, error.request_name);
            }
            if let Err(e) = ignore_benign(wm_state.handle_event(event)) {
                if let ReplyOrIdError::X11Error(error) = &e {
                    log::error!("Unexpected X error: {:?}", error);
                }
                return Err(e).context("Failed to handle an event");
            }
            if !wm_state.running {
                break;
            }
        }

        // the clock, and whatever the watchers changed
        wm_state.draw_bars()?;
    }
    Ok(())
}
