//! Tunable constants and theme colours.
//!
//! Every field has a default, so a host can load a partial JSON document
//! and only override what it cares about.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::primitives::Color;

/// Configuration for a UI context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Slots in the event ring buffer. One slot always stays free.
    pub event_queue_capacity: usize,

    /// List scrolling behaviour.
    pub scroll: ScrollConfig,

    /// Appended when ellipsizing text that overflows its box.
    pub ellipsis: String,

    /// Width of the text-input caret.
    pub cursor_width: f32,

    /// Line width of the frame drawn around the focused item.
    pub focus_indicator_width: f32,

    pub theme: Theme,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            event_queue_capacity: 32,
            scroll: ScrollConfig::default(),
            ellipsis: String::from("…"),
            cursor_width: 1.7,
            focus_indicator_width: 2.0,
            theme: Theme::default(),
        }
    }
}

impl UiConfig {
    /// Parse a configuration from JSON. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config = serde_json::from_str(json)?;
        Ok(config)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Pixels scrolled per wheel unit before sensitivity is applied.
    pub wheel_speed: f32,
    pub wheel_sensitivity: f32,
    /// Rows of margin kept between the selected row and the window edge.
    pub guard_rows: f32,
    /// Fraction of the overshoot scrolled per frame when following the selection.
    pub follow_factor: f32,
    /// Minimum follow speed in pixels per frame.
    pub follow_min_speed: f32,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            wheel_speed: 120.0,
            wheel_sensitivity: 0.17,
            guard_rows: 3.0,
            follow_factor: 0.2,
            follow_min_speed: 4.0,
        }
    }
}

/// Colours used when producing draw commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub text: Color,
    pub button_cap_enabled: Color,
    pub button_cap_disabled: Color,
    pub button_cap_hovered_enabled: Color,
    pub button_cap_hovered_disabled: Color,
    pub button_label_enabled: Color,
    pub button_label_disabled: Color,
    pub focus_indicator: Color,
    pub list_item_background_hovered: Color,
    pub list_item_background_selected: Color,
    pub text_input_cursor: Color,
    pub text_input_selection: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            text: Color::WHITE,
            button_cap_enabled: Color::rgb(0.267, 0.278, 0.302),
            button_cap_disabled: Color::rgb(0.157, 0.161, 0.169),
            button_cap_hovered_enabled: Color::rgb(0.345, 0.361, 0.392),
            button_cap_hovered_disabled: Color::rgb(0.184, 0.188, 0.2),
            button_label_enabled: Color::WHITE,
            button_label_disabled: Color::rgb(0.5, 0.5, 0.5),
            focus_indicator: Color::rgb(0.0, 0.5, 0.784),
            list_item_background_hovered: Color::rgba(1.0, 1.0, 1.0, 0.1),
            list_item_background_selected: Color::rgba(0.3, 0.5, 0.8, 0.4),
            text_input_cursor: Color::WHITE,
            text_input_selection: Color::rgba(0.3, 0.5, 0.8, 0.4),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_constants() {
        let config = UiConfig::default();
        assert_eq!(config.event_queue_capacity, 32);
        assert_eq!(config.scroll.guard_rows, 3.0);
        assert_eq!(config.ellipsis, "…");
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = UiConfig::from_json_str(
            r#"{ "event_queue_capacity": 64, "scroll": { "wheel_speed": 60.0 } }"#,
        )
        .unwrap();
        assert_eq!(config.event_queue_capacity, 64);
        assert_eq!(config.scroll.wheel_speed, 60.0);
        assert_eq!(config.scroll.wheel_sensitivity, 0.17);
        assert_eq!(config.theme, Theme::default());
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = UiConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, crate::error::UiError::Config(_)));
    }

    #[test]
    fn json_round_trip() {
        let mut config = UiConfig::default();
        config.ellipsis = String::from("...");
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(UiConfig::from_json_str(&json).unwrap(), config);
    }
}
