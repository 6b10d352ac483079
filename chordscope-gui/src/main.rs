//! # ChordScope - Live Chord Visualization GUI
//!
//! This module contains the main GUI application for ChordScope. It shows
//! what the analysis engine hears in real time: the current chord and scale,
//! held notes, chroma weights, the Q spectrum and a scrolling chord timeline.
//!
//! ## Architecture
//! - **Main Thread**: Iced GUI application with dark theme
//! - **Connection Thread**: Websocket worker owned by `ConnectionHandle`
//! - **Communication**: Crossbeam channels drained on every tick
//! - **Updates**: Fixed-interval redraws via the subscription system

mod ui;

use std::path::PathBuf;
use std::time::Instant;

use chordscope_core::{
    ClientConfig, ConnectionEvent, ConnectionHandle, ConnectionState, Session, SoloMode,
};
use clap::Parser;
use env_logger::Env;
use iced::{Element, Subscription, Task, Theme};
use ui::main_display::create_main_view;

/// Default multiplier applied to Q magnitudes before coloring.
const DEFAULT_BOOST: f32 = 5.0;
/// Default fraction of the fft shown.
const DEFAULT_ZOOM: f32 = 1.0;

#[derive(Parser, Debug)]
#[command(author, version, about = "Live chord visualization for the analysis engine", long_about = None)]
struct Args {
    /// Websocket endpoint of the engine; overrides the config file
    #[arg(short, long)]
    endpoint: Option<String>,
    /// JSON client configuration
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// Main entry point for the ChordScope application.
///
/// Reads the command line and configuration, then runs the Iced GUI with a
/// dark theme and a fixed redraw tick.
pub fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ClientConfig::load(path)?,
        None => ClientConfig::default(),
    };
    if let Some(endpoint) = args.endpoint {
        config.endpoint = endpoint;
    }

    log::info!("starting ChordScope against {}", config.endpoint);
    iced::application("ChordScope", ChordScope::update, ChordScope::view)
        .subscription(ChordScope::subscription)
        .theme(ChordScope::theme)
        .run_with(move || (ChordScope::new(config), Task::none()))?;
    log::info!("ChordScope finished");
    Ok(())
}

/// Application message types for the Iced GUI framework.
#[derive(Debug, Clone)]
pub enum Message {
    /// The user picked a solo mode for the engine
    SoloModeSelected(SoloMode),
    /// Q magnitude booster slider moved
    BoostChanged(f32),
    /// Spectrum zoom slider moved
    ZoomChanged(f32),
    /// Timer tick: drain connection events and redraw
    Tick,
}

/// Everything the view layer needs for one frame.
pub struct AppDisplayData<'a> {
    pub session: &'a Session,
    pub boost: f32,
    pub zoom: f32,
    pub timeline_px_per_ms: f32,
    pub now: Instant,
}

/// Main application state.
#[derive(Debug)]
struct ChordScope {
    config: ClientConfig,
    session: Session,
    connection: Option<ConnectionHandle>,
    boost: f32,
    zoom: f32,
}

impl ChordScope {
    /// Creates the application and starts the connection worker.
    ///
    /// An endpoint the worker cannot even parse leaves the app running with a
    /// closed connection so the last-known panels still render.
    fn new(config: ClientConfig) -> Self {
        let mut session = Session::new(&config);
        let connection = match ConnectionHandle::spawn(&config.endpoint, config.reconnect.clone()) {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::error!("{}", e);
                session.connection_changed(ConnectionState::Closed);
                None
            }
        };

        Self {
            config,
            session,
            connection,
            boost: DEFAULT_BOOST,
            zoom: DEFAULT_ZOOM,
        }
    }

    /// Handles application state updates based on incoming messages.
    fn update(&mut self, message: Message) {
        match message {
            Message::SoloModeSelected(mode) => {
                log::info!("solo mode -> {}", mode);
                let command = self.session.request_solo_mode(mode);
                match &self.connection {
                    Some(connection) => {
                        if let Err(e) = connection.send(&command) {
                            log::warn!("solo mode not sent: {}", e);
                        }
                    }
                    None => log::warn!("solo mode not sent: no connection"),
                }
            }
            Message::BoostChanged(boost) => self.boost = boost,
            Message::ZoomChanged(zoom) => self.zoom = zoom,
            Message::Tick => {
                // Collect first; the session is mutated while handling them.
                let events: Vec<ConnectionEvent> = match &self.connection {
                    Some(connection) => connection.drain().collect(),
                    None => Vec::new(),
                };
                for event in events {
                    self.process_connection_event(event);
                }
            }
        }
    }

    /// Feeds one event from the connection worker into the session.
    ///
    /// Frames are applied at the time the reader received them, not at the
    /// tick that drained them. Frames that fail to decode are logged and
    /// dropped; the stream goes on.
    fn process_connection_event(&mut self, event: ConnectionEvent) {
        match event {
            ConnectionEvent::Frame(frame, received_at) => {
                if let Err(e) = self.session.handle_frame(&frame, received_at) {
                    log::warn!("dropping frame: {}", e);
                }
            }
            ConnectionEvent::State(state) => {
                log::info!("connection {}", state.label());
                self.session.connection_changed(state);
            }
        }
    }

    fn view(&self) -> Element<'_, Message> {
        create_main_view(&AppDisplayData {
            session: &self.session,
            boost: self.boost,
            zoom: self.zoom,
            timeline_px_per_ms: self.config.timeline_px_per_ms,
            now: Instant::now(),
        })
    }

    /// Redraw timer at the configured interval (10 ms by default) so the
    /// timeline scrolls and the beat indicator times out smoothly.
    fn subscription(&self) -> Subscription<Message> {
        iced::time::every(self.config.redraw_interval()).map(|_| Message::Tick)
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }
}
