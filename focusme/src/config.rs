use anyhow::{Context, Result};
use directories::ProjectDirs;
use focusme_core::timer::{valid_minutes, DEFAULT_BREAK_MINUTES, DEFAULT_FOCUS_MINUTES};
use focusme_core::Durations;
use ratatui::style::Color;
use serde::Deserialize;
use std::fs;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub timer: TimerConfig,
    pub theme: Theme,
    pub icons: Icons,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TimerConfig {
    pub focus_minutes: i64,
    pub break_minutes: i64,
    pub notifications: bool,
    pub sound: bool,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            focus_minutes: DEFAULT_FOCUS_MINUTES as i64,
            break_minutes: DEFAULT_BREAK_MINUTES as i64,
            notifications: true,
            sound: true,
        }
    }
}

impl TimerConfig {
    /// Out-of-range values fall back to the defaults, like typed input does.
    pub fn durations(&self) -> Durations {
        Durations {
            focus_minutes: minutes_or(self.focus_minutes, DEFAULT_FOCUS_MINUTES),
            break_minutes: minutes_or(self.break_minutes, DEFAULT_BREAK_MINUTES),
        }
    }
}

fn minutes_or(value: i64, default: u32) -> u32 {
    u32::try_from(value)
        .ok()
        .and_then(valid_minutes)
        .unwrap_or(default)
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Theme {
    #[serde(deserialize_with = "hex_to_color")]
    pub background: Color,
    #[serde(deserialize_with = "hex_to_color")]
    pub foreground: Color,
    #[serde(deserialize_with = "hex_to_color")]
    pub selection: Color,
    #[serde(deserialize_with = "hex_to_color")]
    pub black: Color,
    #[serde(deserialize_with = "hex_to_color")]
    pub red: Color,
    #[serde(deserialize_with = "hex_to_color")]
    pub green: Color,
    #[serde(deserialize_with = "hex_to_color")]
    pub yellow: Color,
    #[serde(deserialize_with = "hex_to_color")]
    pub blue: Color,
    #[serde(deserialize_with = "hex_to_color")]
    pub magenta: Color,
    #[serde(deserialize_with = "hex_to_color")]
    pub cyan: Color,
    #[serde(deserialize_with = "hex_to_color")]
    pub gray: Color,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Icons {
    pub timer: String,
    pub todo_list: String,
    pub today: String,
    pub history: String,
    pub focus: String,
    pub rest: String,
    pub pause: String,
    pub idle: String,
    pub pending: String,
    pub done: String,
    pub select: String,
    pub input_cursor: String,
    pub separator: String,
    pub header_left: String,
    pub header_right: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color::Rgb(9, 14, 19),
            foreground: Color::Rgb(197, 201, 199),
            selection: Color::Rgb(230, 195, 132),
            black: Color::Rgb(13, 12, 12),
            red: Color::Rgb(228, 104, 118),
            green: Color::Rgb(138, 154, 123),
            yellow: Color::Rgb(196, 178, 138),
            blue: Color::Rgb(127, 180, 202),
            magenta: Color::Rgb(162, 146, 163),
            cyan: Color::Rgb(122, 168, 159),
            gray: Color::Rgb(164, 167, 164),
        }
    }
}

impl Default for Icons {
    fn default() -> Self {
        Self {
            timer: "◷".to_string(),
            todo_list: "⬢".to_string(),
            today: "☀".to_string(),
            history: "▤".to_string(),
            focus: "▶".to_string(),
            rest: "☕".to_string(),
            pause: "⏸".to_string(),
            idle: "■".to_string(),
            pending: "☐".to_string(),
            done: "☑".to_string(),
            select: "▸".to_string(),
            input_cursor: "▊".to_string(),
            separator: "│".to_string(),
            header_left: "⟪ ".to_string(),
            header_right: " ⟫".to_string(),
        }
    }
}

fn hex_to_color<'de, D>(deserializer: D) -> Result<Color, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = serde::Deserialize::deserialize(deserializer)?;
    parse_hex(&s).map_err(serde::de::Error::custom)
}

fn parse_hex(s: &str) -> Result<Color, String> {
    if !s.is_ascii() || !s.starts_with('#') || s.len() != 7 {
        return Err(format!("invalid hex color '{}', expected #rrggbb", s));
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&s[range], 16).map_err(|e| format!("invalid hex color '{}': {}", s, e))
    };
    Ok(Color::Rgb(channel(1..3)?, channel(3..5)?, channel(5..7)?))
}

pub fn load_config() -> Result<Config> {
    match ProjectDirs::from("com", "focusme", "FocusMe") {
        Some(proj_dirs) => {
            let path = proj_dirs.config_dir().join("focusme.toml");
            if path.exists() {
                let config_str = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config file at {:?}", path))?;
                parse_config(&config_str)
                    .with_context(|| format!("Failed to parse config file at {:?}", path))
            } else {
                Ok(Config::default())
            }
        }
        None => Ok(Config::default()),
    }
}

fn parse_config(config_str: &str) -> Result<Config> {
    Ok(toml::from_str(config_str)?)
}
