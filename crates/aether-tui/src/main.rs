//! Aether TUI - terminal front end for the Aether launcher.
//!
//! Connects to the query backend over WebSocket and runs the interactive
//! launcher until the user closes it or a launch completes.

use std::io;
use std::time::{Duration, Instant};

use aether_rpc::{LaunchClient, QueryChannel, QueryOutcome};
use aether_tui::app::{App, KeyAction};
use aether_tui::close::{CloseBridge, close_for_sentinel, handle_close_request};
use aether_tui::colors::{Colors, Palette};
use aether_tui::config::Config;
use aether_tui::launch::{CloseSentinel, LaunchDispatcher, LaunchOutcome};
use aether_tui::render::render_launcher;
use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures_util::{StreamExt, future::OptionFuture};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod cli;

use cli::{Cli, Commands};

/// Redraw interval while the highlight is sliding
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

fn setup_logging(debug_flag: bool) {
    let level = if debug_flag {
        "debug"
    } else {
        "aether_tui=info,aether_rpc=info"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let log_dir = std::env::temp_dir();
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let log_filename = format!("aether-tui-{timestamp}.log");

    #[cfg(unix)]
    {
        let symlink_path = log_dir.join("aether-tui.log");
        let _ = std::fs::remove_file(&symlink_path);
        let _ = std::os::unix::fs::symlink(log_dir.join(&log_filename), &symlink_path);
    }

    let file_appender = tracing_appender::rolling::never(&log_dir, &log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    std::mem::forget(guard);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.debug);

    let config_path = cli.config.clone().or_else(Config::default_path);
    let (mut config, palette) = match &config_path {
        Some(path) => (
            Config::load_from(path),
            Colors::load_from(&Config::colors_path(path)).palette(),
        ),
        None => {
            warn!("No config directory, using defaults");
            (Config::default(), Palette::default())
        }
    };
    if let Some(url) = cli.query_url {
        config.query_url = url;
    }
    if let Some(url) = cli.launch_url {
        config.launch_url = url;
    }

    let channel = match QueryChannel::connect_to(&config.query_url).await {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to connect to {}: {e}", config.query_url);
            eprintln!();
            eprintln!("Make sure the Aether backend is running, or pass --query-url.");
            return Ok(());
        }
    };

    match cli.command {
        Some(Commands::Query { query }) => run_query(channel, &query).await?,
        Some(Commands::Tui) | None => run_tui(channel, &config, palette).await?,
    }

    Ok(())
}

async fn run_tui(channel: QueryChannel, config: &Config, palette: Palette) -> Result<()> {
    let sentinel = CloseSentinel::new();
    let dispatcher = LaunchDispatcher::new(
        LaunchClient::new(config.launch_url.clone())?,
        config.launch_settle(),
        sentinel,
    );
    let bridge = CloseBridge::new();
    bridge.listen_for_signals();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let app = App::new(config, palette);
    let result = event_loop(&mut terminal, app, channel, &dispatcher, bridge).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
    mut channel: QueryChannel,
    dispatcher: &LaunchDispatcher,
    mut bridge: CloseBridge,
) -> Result<()> {
    let mut events = EventStream::new();
    let mut closed = dispatcher.sentinel().subscribe();
    let mut launch: Option<JoinHandle<LaunchOutcome>> = None;
    let mut channel_open = true;
    let mut needs_render = true;

    loop {
        // A rebuilt list is measured only after the frame that laid it out.
        while needs_render {
            terminal.draw(|f| render_launcher(f, &mut app, Instant::now()))?;
            needs_render = false;
            if !app.highlight.is_settled() {
                app.settle();
                needs_render = true;
            }
        }

        if app.should_quit {
            break;
        }

        let animating = app.highlight.is_animating(Instant::now());

        tokio::select! {
            reply = channel.recv(), if channel_open => {
                if let Some(reply) = reply {
                    if app.handle_reply(reply, Instant::now()) {
                        needs_render = true;
                    }
                } else {
                    warn!("Query channel closed, no further results");
                    channel_open = false;
                }
            }

            maybe_event = events.next() => {
                let Some(event_result) = maybe_event else {
                    app.input_closed();
                    continue;
                };
                let event = match event_result {
                    Ok(e) => e,
                    Err(e) => {
                        error!("Event stream error: {}", e);
                        continue;
                    }
                };

                match event {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        debug!("KEY EVENT: code={:?}, modifiers={:?}", key.code, key.modifiers);
                        match app.handle_key(key, Instant::now()) {
                            KeyAction::None => {}
                            KeyAction::Query(text) => match channel.submit(&text) {
                                Ok(seq) => app.query_sent(seq),
                                Err(e) => error!("Failed to send query {text:?}: {e}"),
                            },
                            KeyAction::Launch(request) => {
                                launch = Some(dispatcher.spawn(request));
                            }
                        }
                        needs_render = true;
                    }
                    Event::Resize(..) => needs_render = true,
                    _ => {}
                }
            }

            Some(joined) = OptionFuture::from(launch.as_mut()), if launch.is_some() => {
                launch = None;
                let outcome = joined.unwrap_or_else(|e| {
                    error!("Launch task failed: {e}");
                    LaunchOutcome::Failed
                });
                app.launch_finished(outcome);
                needs_render = true;
            }

            Ok(()) = closed.changed() => {
                if *closed.borrow_and_update() {
                    close_for_sentinel(terminal.backend_mut(), &mut app)?;
                }
            }

            Some(request) = bridge.next() => {
                handle_close_request(&mut app, request);
            }

            () = tokio::time::sleep(FRAME_INTERVAL), if animating => {
                needs_render = true;
            }
        }
    }

    Ok(())
}

async fn run_query(mut channel: QueryChannel, query: &str) -> Result<()> {
    println!("Query: {query}");

    let seq = channel.submit(query)?;

    let reply = tokio::time::timeout(Duration::from_secs(2), async {
        while let Some(reply) = channel.recv().await {
            if reply.seq.is_none_or(|s| s == seq) {
                return Some(reply);
            }
        }
        None
    })
    .await;

    match reply {
        Ok(Some(reply)) => match reply.outcome {
            QueryOutcome::Literal(value) => println!("= {value}"),
            QueryOutcome::Candidates(items) => {
                println!();
                println!("Results: {} items", items.len());
                for (i, name) in items.iter().enumerate() {
                    println!("  {}. {name}", i + 1);
                }
            }
        },
        Ok(None) => println!("Connection closed before a reply arrived"),
        Err(_) => println!("No reply received within timeout"),
    }

    Ok(())
}
