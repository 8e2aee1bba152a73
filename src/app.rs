// SPDX: CC0-1.0

//! Input screen / viewer screen state machine.

use crate::{
    eval::{EvalErr, Function, Idents},
    parse::{self, ParseErr},
    sample::{self, PlotSeries, Sampling, DEFAULT_RETRIES},
    stdlib,
    viewport::{Viewport, ViewportErr},
    Number,
};
use core::{
    fmt,
    num::{NonZeroU16, NonZeroU32},
    ops::Range,
};
use log::{debug, info};
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Bounds a new viewer starts with, also used to validate input.
    pub x: Range<Number>,
    pub y: Range<Number>,
    pub resolution: NonZeroU16,
    pub pixel_size: NonZeroU32,
    /// Pixels moved per arrow key.
    pub pan_step: Number,
    /// Graph units between grid lines.
    pub grid_gap: Number,
    pub retries: u16,
    /// Size of the render surface, which need not be square.
    pub canvas: [u32; 2],
}

impl Default for Config {
    fn default() -> Self {
        Self {
            x: -10.0..10.0,
            y: -10.0..10.0,
            resolution: NonZeroU16::MIN.saturating_add(99),
            pixel_size: NonZeroU32::MIN.saturating_add(599),
            pan_step: 50.0,
            grid_gap: 2.0,
            retries: DEFAULT_RETRIES,
            canvas: [800, 600],
        }
    }
}

impl Config {
    pub fn viewport(&self) -> Result<Viewport, ViewportErr> {
        Viewport::new(self.x.clone(), self.y.clone(), self.pixel_size)
    }

    pub fn sampling(&self, x: Range<Number>) -> Sampling {
        Sampling {
            x,
            resolution: self.resolution,
            retries: self.retries,
        }
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("x range", &self.x)
            .field("y range", &self.y)
            .field("resolution", &self.resolution)
            .field("pixel size", &self.pixel_size)
            .field("pan step", &self.pan_step)
            .field("grid gap", &self.grid_gap)
            .field("retries", &self.retries)
            .field("canvas", &self.canvas)
            .finish()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Enter,
    Up,
    Down,
    Left,
    Right,
    Escape,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Replaces the contents of the input field.
    Text(String),
    Key(Key),
}

#[derive(Debug)]
pub enum SubmitErr {
    Empty,
    Parse(ParseErr),
    /// Carries the failure at the left bound, if evaluation failed there.
    NoValidSamples(Option<EvalErr>),
    Viewport(ViewportErr),
}

impl fmt::Display for SubmitErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "no function was entered"),
            Self::Parse(err) => write!(f, "parse error: {err}"),
            Self::NoValidSamples(_) => {
                write!(f, "function is not defined anywhere in the default window")
            }
            Self::Viewport(err) => write!(f, "invalid window: {err}"),
        }
    }
}

#[derive(Debug, Default)]
pub struct InputScreen {
    text: String,
    error: Option<SubmitErr>,
}

impl InputScreen {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn error(&self) -> Option<&SubmitErr> {
        self.error.as_ref()
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug)]
pub struct ViewerScreen {
    function: Function,
    viewport: Viewport,
    series: PlotSeries,
    /// Settings as of entry.
    config: Config,
}

impl ViewerScreen {
    pub fn function(&self) -> &Function {
        &self.function
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn series(&self) -> &PlotSeries {
        &self.series
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn resample(&mut self) {
        let sampling = self.config.sampling(self.viewport.x().clone());
        let function = &mut self.function;
        self.series = sample::sample(|x| function.eval(x), &sampling);
    }
}

#[derive(Debug)]
pub enum Screen {
    Input(InputScreen),
    Viewer(ViewerScreen),
}

/// What handling an event did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Ignored,
    Edited,
    Rejected,
    EnteredViewer,
    Panned,
    LeftViewer,
}

#[derive(Debug)]
pub struct Session {
    config: Config,
    idents: Idents,
    screen: Screen,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self::with_idents(config, stdlib::standard_idents())
    }

    pub fn with_idents(config: Config, idents: Idents) -> Self {
        Self {
            config,
            idents,
            screen: Screen::Input(InputScreen::default()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Takes effect the next time the viewer opens. An open viewer keeps
    /// the settings it was entered with.
    pub fn set_config(&mut self, config: Config) {
        self.config = config;
    }

    pub fn idents(&self) -> &Idents {
        &self.idents
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn handle(&mut self, event: Event) -> Outcome {
        match event {
            Event::Text(text) => match &mut self.screen {
                Screen::Input(input) => {
                    input.text = text;
                    Outcome::Edited
                }
                Screen::Viewer(_) => Outcome::Ignored,
            },
            Event::Key(key) => self.handle_key(key),
        }
    }

    fn handle_key(&mut self, key: Key) -> Outcome {
        if let Screen::Input(_) = self.screen {
            return match key {
                Key::Enter => self.submit(),
                _ => Outcome::Ignored,
            };
        }
        let Screen::Viewer(viewer) = &mut self.screen else {
            return Outcome::Ignored;
        };

        let step = viewer.config.pan_step;
        let (dx, dy) = match key {
            Key::Right => (step, 0.0),
            Key::Left => (-step, 0.0),
            Key::Up => (0.0, -step),
            Key::Down => (0.0, step),
            Key::Escape => {
                let text = viewer.function.src().to_string();
                self.screen = Screen::Input(InputScreen { text, error: None });
                info!("returned to input screen");
                return Outcome::LeftViewer;
            }
            Key::Enter => return Outcome::Ignored,
        };
        viewer.viewport.translate(dx, dy);
        viewer.resample();
        debug!("panned by ({dx}, {dy}) to {}", viewer.viewport);
        Outcome::Panned
    }

    fn submit(&mut self) -> Outcome {
        let Screen::Input(input) = &mut self.screen else {
            return Outcome::Ignored;
        };

        match Self::open_viewer(&self.config, &self.idents, &input.text) {
            Ok(viewer) => {
                info!(
                    "plotting f(x) = {} ({} points)",
                    viewer.function.src(),
                    viewer.series.len()
                );
                self.screen = Screen::Viewer(viewer);
                Outcome::EnteredViewer
            }
            Err(err) => {
                info!("rejected {:?}: {err}", input.text);
                input.error = Some(err);
                Outcome::Rejected
            }
        }
    }

    fn open_viewer(
        config: &Config,
        idents: &Idents,
        text: &str,
    ) -> Result<ViewerScreen, SubmitErr> {
        if text.trim().is_empty() {
            return Err(SubmitErr::Empty);
        }
        let src = Arc::new(text.to_string());
        let mut function = parse::compile(&src, idents.clone()).map_err(SubmitErr::Parse)?;

        let viewport = config.viewport().map_err(SubmitErr::Viewport)?;
        let x = viewport.x().clone();
        if !sample::is_valid(|x| function.eval(x), &config.sampling(x.clone())) {
            let cause = function.eval(x.start).err();
            return Err(SubmitErr::NoValidSamples(cause));
        }

        let mut viewer = ViewerScreen {
            function,
            viewport,
            series: PlotSeries::new(),
            config: config.clone(),
        };
        viewer.resample();
        Ok(viewer)
    }
}
