//! Styles for the form and records panes, picked once per process.

use std::{env, str::FromStr, sync::OnceLock, time::Duration};

use ratatui::style::{Color, Modifier, Style};

const THEME_ENV: &str = "DYNAFORM_THEME";
/// Terminal backgrounds brighter than this get the light variant.
const LIGHT_BACKGROUND_LUMA: f32 = 0.6;
// A single luma read can be off right after startup.
const LUMA_READS: usize = 5;
const LUMA_READ_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Dark,
    Light,
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(Variant::Dark),
            "light" => Ok(Variant::Light),
            other => Err(format!("unknown theme {other:?}, expected light or dark")),
        }
    }
}

impl Variant {
    fn detect() -> Self {
        if let Ok(raw) = env::var(THEME_ENV) {
            match raw.parse() {
                Ok(variant) => return variant,
                Err(err) => tracing::warn!("Ignoring {THEME_ENV}: {err}"),
            }
        }
        match sampled_luma() {
            Some(luma) if luma > LIGHT_BACKGROUND_LUMA => Variant::Light,
            _ => Variant::Dark,
        }
    }
}

/// How a form button is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    Disabled,
    Idle,
    Focused,
}

/// Colors by the role they play on screen.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    surface: Color,
    field: Color,
    ink: Color,
    faint: Color,
    focus: Color,
    heading: Color,
    frame: Color,
    picked_bg: Color,
    picked_fg: Color,
    invalid: Color,
}

impl Theme {
    /// `DYNAFORM_THEME` if set, otherwise whatever suits the terminal background.
    pub fn detect() -> Self {
        static THEME: OnceLock<Theme> = OnceLock::new();
        *THEME.get_or_init(|| Theme::new(Variant::detect()))
    }

    pub fn new(variant: Variant) -> Self {
        match variant {
            Variant::Dark => Theme {
                surface: Color::Rgb(20, 24, 31),
                field: Color::Rgb(28, 33, 42),
                ink: Color::Rgb(221, 226, 232),
                faint: Color::Rgb(120, 130, 145),
                focus: Color::Rgb(110, 190, 240),
                heading: Color::Rgb(230, 190, 120),
                frame: Color::Rgb(70, 80, 96),
                picked_bg: Color::Rgb(40, 56, 80),
                picked_fg: Color::Rgb(240, 244, 248),
                invalid: Color::Rgb(240, 110, 110),
            },
            Variant::Light => Theme {
                surface: Color::Rgb(252, 252, 250),
                field: Color::Rgb(236, 238, 241),
                ink: Color::Rgb(36, 40, 48),
                faint: Color::Rgb(110, 116, 128),
                focus: Color::Rgb(25, 105, 170),
                heading: Color::Rgb(160, 80, 20),
                frame: Color::Rgb(170, 176, 186),
                picked_bg: Color::Rgb(210, 228, 250),
                picked_fg: Color::Rgb(20, 28, 44),
                invalid: Color::Rgb(200, 50, 30),
            },
        }
    }

    pub fn surface(&self) -> Color {
        self.surface
    }

    /// Pane body: background and default text.
    pub fn pane(&self) -> Style {
        Style::default().bg(self.surface).fg(self.ink)
    }

    pub fn pane_title(&self) -> Style {
        Style::default().fg(self.focus).add_modifier(Modifier::BOLD)
    }

    pub fn border(&self, focused: bool) -> Style {
        Style::default().fg(if focused { self.focus } else { self.frame })
    }

    pub fn input(&self) -> Style {
        Style::default().bg(self.field).fg(self.ink)
    }

    pub fn text(&self) -> Style {
        Style::default().fg(self.ink)
    }

    pub fn faint(&self) -> Style {
        Style::default().fg(self.faint)
    }

    pub fn invalid(&self) -> Style {
        Style::default().fg(self.invalid)
    }

    /// Table header and key hints.
    pub fn heading(&self) -> Style {
        Style::default()
            .fg(self.heading)
            .add_modifier(Modifier::BOLD)
    }

    pub fn selected_row(&self) -> Style {
        Style::default().bg(self.picked_bg).fg(self.picked_fg)
    }

    pub fn button(&self, state: ButtonState) -> Style {
        match state {
            ButtonState::Disabled => self.faint(),
            ButtonState::Idle => Style::default().fg(self.focus).add_modifier(Modifier::BOLD),
            ButtonState::Focused => Style::default()
                .fg(self.surface)
                .bg(self.focus)
                .add_modifier(Modifier::BOLD),
        }
    }
}

fn sampled_luma() -> Option<f32> {
    let mut reads: Vec<f32> = (0..LUMA_READS)
        .filter_map(|read| {
            if read > 0 {
                std::thread::sleep(LUMA_READ_INTERVAL);
            }
            terminal_light::luma().ok().filter(|luma| luma.is_finite())
        })
        .collect();
    (!reads.is_empty()).then(|| median(&mut reads))
}

fn median(reads: &mut [f32]) -> f32 {
    reads.sort_by(f32::total_cmp);
    let len = reads.len();
    (reads[(len - 1) / 2] + reads[len / 2]) / 2.0
}
