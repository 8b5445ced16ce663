//! Runtime configuration, loaded from an optional TOML file and then
//! overridden by command line flags. Every field has a default, so a partial
//! (or absent) file is fine.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::Error;

/// the speed selector shown on the intro scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum Mode {
    Slow,
    #[default]
    Normal,
    Fast,
}

impl Mode {
    /// map a selector value; anything unrecognised means normal speed
    pub fn from_selector(value: &str) -> Mode {
        match value {
            "slow" => Mode::Slow,
            "fast" => Mode::Fast,
            _ => Mode::Normal,
        }
    }

    /// slow -> normal -> fast -> slow
    pub fn next(self) -> Mode {
        match self {
            Mode::Slow => Mode::Normal,
            Mode::Normal => Mode::Fast,
            Mode::Fast => Mode::Slow,
        }
    }

    pub fn prev(self) -> Mode {
        self.next().next()
    }

    pub fn label(self) -> &'static str {
        match self {
            Mode::Slow => "slow",
            Mode::Normal => "normal",
            Mode::Fast => "fast",
        }
    }
}

impl From<String> for Mode {
    fn from(value: String) -> Self {
        Mode::from_selector(&value)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// what to do with code points that don't fit in one byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BinaryWidth {
    /// pad to 8 digits, keep every digit of wider values
    #[default]
    Widen,
    /// show the low byte only
    Truncate,
    /// refuse to start a journey for characters above U+00FF
    Reject,
}

/// milliseconds of step pause for each mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Speeds {
    pub slow: u64,
    pub normal: u64,
    pub fast: u64,
}

impl Default for Speeds {
    fn default() -> Self {
        Speeds {
            slow: 5500,
            normal: 4000,
            fast: 1200,
        }
    }
}

impl Speeds {
    pub fn for_mode(&self, mode: Mode) -> u64 {
        match mode {
            Mode::Slow => self.slow,
            Mode::Normal => self.normal,
            Mode::Fast => self.fast,
        }
    }
}

/// base delays for everything that isn't a step pause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Pacing {
    /// per-character base delay for step headings
    pub heading_ms: u64,
    /// per-character base delay for step explanations
    pub explanation_ms: u64,
    /// how long each FETCH/DECODE/EXECUTE/WRITE label stays up
    pub cpu_phase_ms: u64,
    pub boot_line_ms: u64,
    /// extra pause after the last boot line
    pub boot_settle_ms: u64,
    /// delay before the intro title starts typing
    pub title_delay_ms: u64,
    pub title_ms: u64,
    /// redraw interval of the terminal display
    pub frame_ms: u64,
}

impl Default for Pacing {
    fn default() -> Self {
        Pacing {
            heading_ms: 32,
            explanation_ms: 20,
            cpu_phase_ms: 650,
            boot_line_ms: 600,
            boot_settle_ms: 700,
            title_delay_ms: 60,
            title_ms: 45,
            frame_ms: 33,
        }
    }
}

pub const DEFAULT_BOOT_LINES: [&str; 7] = [
    "Initializing Hardware...",
    "Checking Memory... OK",
    "Detecting Keyboard Controller... OK",
    "Loading Input Handler...",
    "Starting CPU Services...",
    "Launching Visualization Engine...",
    "Welcome User",
];

fn default_boot_lines() -> Vec<String> {
    DEFAULT_BOOT_LINES.iter().map(|l| l.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mode: Mode,
    pub binary_width: BinaryWidth,
    pub speeds: Speeds,
    pub pacing: Pacing,
    pub boot_lines: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            mode: Mode::default(),
            binary_width: BinaryWidth::default(),
            speeds: Speeds::default(),
            pacing: Pacing::default(),
            boot_lines: default_boot_lines(),
        }
    }
}

impl Config {
    /// load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Config, Error> {
        let contents = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Config::parse(&contents).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(contents: &str) -> Result<Config, toml::de::Error> {
        toml::from_str(contents)
    }

    /// step pause for the given mode
    pub fn speed_ms(&self, mode: Mode) -> u64 {
        self.speeds.for_mode(mode)
    }
}
