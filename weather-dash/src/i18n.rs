//! Display preferences: language and theme
//!
//! Held by [`crate::state::AppState`] and passed explicitly to the API layer
//! (language) and the components (theme).

use ratatui::style::Color;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Hi,
    Bn,
    Te,
    Mr,
    Ta,
    Ur,
    Gu,
    Kn,
    Ml,
    Pa,
}

impl Language {
    pub const ALL: [Language; 11] = [
        Language::En,
        Language::Hi,
        Language::Bn,
        Language::Te,
        Language::Mr,
        Language::Ta,
        Language::Ur,
        Language::Gu,
        Language::Kn,
        Language::Ml,
        Language::Pa,
    ];

    /// ISO 639-1 code sent to providers
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
            Language::Bn => "bn",
            Language::Te => "te",
            Language::Mr => "mr",
            Language::Ta => "ta",
            Language::Ur => "ur",
            Language::Gu => "gu",
            Language::Kn => "kn",
            Language::Ml => "ml",
            Language::Pa => "pa",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Hi => "Hindi",
            Language::Bn => "Bengali",
            Language::Te => "Telugu",
            Language::Mr => "Marathi",
            Language::Ta => "Tamil",
            Language::Ur => "Urdu",
            Language::Gu => "Gujarati",
            Language::Kn => "Kannada",
            Language::Ml => "Malayalam",
            Language::Pa => "Punjabi",
        }
    }

    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|l| l == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

/// Scoped language/theme settings owned by the dashboard
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DisplayPrefs {
    pub language: Language,
    pub dark_mode: bool,
}

impl DisplayPrefs {
    pub fn theme(&self) -> Theme {
        if self.dark_mode {
            Theme::DARK
        } else {
            Theme::LIGHT
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Theme {
    pub bg: Color,
    pub fg: Color,
    pub muted: Color,
    pub accent: Color,
    pub border: Color,
}

impl Theme {
    pub const LIGHT: Theme = Theme {
        bg: Color::Reset,
        fg: Color::Reset,
        muted: Color::DarkGray,
        accent: Color::Cyan,
        border: Color::Gray,
    };

    pub const DARK: Theme = Theme {
        bg: Color::Rgb(24, 24, 32),
        fg: Color::Rgb(220, 220, 230),
        muted: Color::Rgb(120, 120, 140),
        accent: Color::Rgb(130, 170, 255),
        border: Color::Rgb(60, 60, 80),
    };
}
