/*
 *  config.rs
 *
 *  unicornhatmini - two chips, one picture
 *  (c) 2020-26 unicornhatmini contributors
 *
 *  Layered configuration: defaults, YAML file, command line
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}};
use thiserror::Error;

use crate::demo::Pattern;
use crate::display::command::SPI_MAX_SPEED_HZ;

pub const DEFAULT_LEFT_BUS: &str = "/dev/spidev0.0";
pub const DEFAULT_RIGHT_BUS: &str = "/dev/spidev0.1";
pub const DEFAULT_LEFT_CS_PIN: u64 = 8; // BCM8, header pin 24
pub const DEFAULT_RIGHT_CS_PIN: u64 = 7; // BCM7, header pin 26
pub const DEFAULT_BRIGHTNESS: f32 = 0.1;
pub const DEFAULT_FPS: u32 = 60;

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level app configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    pub log_level: Option<String>,     // e.g., "info" | "debug"
    pub display: Option<DisplayConfig>,
    pub demo: Option<DemoConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DisplayConfig {
    pub left: Option<PanelConfig>,
    pub right: Option<PanelConfig>,
    pub speed_hz: Option<u32>,
    pub rotate_deg: Option<u16>,
    pub brightness: Option<f32>,    // 0.0-1.0
}

/// SPI device and chip-select line for one panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelConfig {
    pub bus: String,    // e.g. "/dev/spidev0.0"
    pub cs_pin: u64,    // BCM numbering, sysfs GPIO
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DemoConfig {
    pub pattern: Option<Pattern>,
    pub fps: Option<u32>,
}

impl DisplayConfig {
    pub fn left_or_default(&self) -> PanelConfig {
        self.left.clone().unwrap_or_else(|| PanelConfig {
            bus: DEFAULT_LEFT_BUS.to_string(),
            cs_pin: DEFAULT_LEFT_CS_PIN,
        })
    }

    pub fn right_or_default(&self) -> PanelConfig {
        self.right.clone().unwrap_or_else(|| PanelConfig {
            bus: DEFAULT_RIGHT_BUS.to_string(),
            cs_pin: DEFAULT_RIGHT_CS_PIN,
        })
    }

    /// Configured clock, never above what the controller accepts
    pub fn speed_hz_or_default(&self) -> u32 {
        self.speed_hz.unwrap_or(SPI_MAX_SPEED_HZ).min(SPI_MAX_SPEED_HZ)
    }
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone, Default)]
#[command(name = "unicornhatmini", version, about = "Unicorn HAT Mini demo driver")]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, short = 'c', value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    /// Enable debug log level
    #[arg(long, short = 'v', alias = "verbose", action = ArgAction::SetTrue)]
    pub debug: bool,
    #[arg(long)]
    pub log_level: Option<String>,
    /// Demo pattern to run
    #[arg(long, short = 'p', value_enum)]
    pub pattern: Option<Pattern>,
    /// Frames per second for the demo loop
    #[arg(long)]
    pub fps: Option<u32>,
    /// Global brightness, 0.0 to 1.0
    #[arg(long, short = 'b')]
    pub brightness: Option<f32>,
    /// Rotation in degrees: 0, 90, 180 or 270
    #[arg(long, short = 'r')]
    pub rotate_deg: Option<u16>,
    #[arg(long)]
    pub speed_hz: Option<u32>,
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub left_bus: Option<String>,
    #[arg(long)]
    pub left_cs_pin: Option<u64>,
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub right_bus: Option<String>,
    #[arg(long)]
    pub right_cs_pin: Option<u64>,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

/// Public entry point: read YAML, merge CLI over it, validate.
pub fn load(cli: &Cli) -> Result<Config, ConfigError> {
    // 1) defaults (from `Default` impl)
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            let y = read_yaml(p)?;
            merge(&mut cfg, y);
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, cli);

    // 4) Validate
    validate(&cfg)?;

    Ok(cfg)
}

/// Pretty YAML of effective config (nice for debugging)
pub fn dump(cfg: &Config) -> Result<String, ConfigError> {
    Ok(serde_yaml::to_string(cfg)?)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/unicornhatmini/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/unicornhatmini/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/unicornhatmini.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["unicornhatmini.yaml", "config.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    parse_yaml(&s)
}

pub fn parse_yaml(s: &str) -> Result<Config, ConfigError> {
    let cfg: Config = serde_yaml::from_str(s)?;
    Ok(cfg)
}

/// Shallow merge `src` into `dst`, Option-by-Option.
fn merge(dst: &mut Config, src: Config) {
    if src.log_level.is_some()      { dst.log_level = src.log_level; }
    match (&mut dst.display, src.display) {
        (None, Some(c)) => dst.display = Some(c),
        (Some(d), Some(s)) => merge_display(d, s),
        _ => {}
    }
    match (&mut dst.demo, src.demo) {
        (None, Some(c)) => dst.demo = Some(c),
        (Some(d), Some(s)) => {
            if s.pattern.is_some()  { d.pattern = s.pattern; }
            if s.fps.is_some()      { d.fps = s.fps; }
        }
        _ => {}
    }
}

fn merge_display(dst: &mut DisplayConfig, src: DisplayConfig) {
    if src.left.is_some()        { dst.left = src.left; }
    if src.right.is_some()       { dst.right = src.right; }
    if src.speed_hz.is_some()    { dst.speed_hz = src.speed_hz; }
    if src.rotate_deg.is_some()  { dst.rotate_deg = src.rotate_deg; }
    if src.brightness.is_some()  { dst.brightness = src.brightness; }
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.debug {
        cfg.log_level = Some("debug".to_string());
    } else if cli.log_level.is_some() {
        cfg.log_level = cli.log_level.clone();
    }

    let display = cfg.display.get_or_insert_with(DisplayConfig::default);
    if cli.speed_hz.is_some()    { display.speed_hz = cli.speed_hz; }
    if cli.rotate_deg.is_some()  { display.rotate_deg = cli.rotate_deg; }
    if cli.brightness.is_some()  { display.brightness = cli.brightness; }
    if cli.left_bus.is_some() || cli.left_cs_pin.is_some() {
        let mut left = display.left_or_default();
        if let Some(bus) = cli.left_bus.as_ref()   { left.bus = bus.clone(); }
        if let Some(pin) = cli.left_cs_pin         { left.cs_pin = pin; }
        display.left = Some(left);
    }
    if cli.right_bus.is_some() || cli.right_cs_pin.is_some() {
        let mut right = display.right_or_default();
        if let Some(bus) = cli.right_bus.as_ref()  { right.bus = bus.clone(); }
        if let Some(pin) = cli.right_cs_pin        { right.cs_pin = pin; }
        display.right = Some(right);
    }

    let demo = cfg.demo.get_or_insert_with(DemoConfig::default);
    if cli.pattern.is_some()     { demo.pattern = cli.pattern; }
    if cli.fps.is_some()         { demo.fps = cli.fps; }
}

/// Put any invariants here (required fields, ranges, etc.)
pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if let Some(display) = cfg.display.as_ref() {
        if let Some(rot) = display.rotate_deg {
            match rot {
                0 | 90 | 180 | 270 => {},
                _ => return Err(ConfigError::Validation("display rotate_deg must be 0|90|180|270".into()))
            }
        }
        if let Some(b) = display.brightness {
            if !(0.0..=1.0).contains(&b) {
                return Err(ConfigError::Validation("display brightness must be 0.0..=1.0".into()));
            }
        }
        if let Some(hz) = display.speed_hz {
            if hz == 0 || hz > SPI_MAX_SPEED_HZ {
                return Err(ConfigError::Validation(format!(
                    "display speed_hz must be 1..={SPI_MAX_SPEED_HZ}"
                )));
            }
        }
        for panel in [display.left.as_ref(), display.right.as_ref()].into_iter().flatten() {
            if panel.bus.trim().is_empty() {
                return Err(ConfigError::Validation("panel bus path must not be empty".into()));
            }
        }
        if let (Some(l), Some(r)) = (display.left.as_ref(), display.right.as_ref()) {
            if l.cs_pin == r.cs_pin {
                return Err(ConfigError::Validation("left and right panels need distinct cs_pin".into()));
            }
        }
    }
    if let Some(demo) = cfg.demo.as_ref() {
        if demo.fps == Some(0) {
            return Err(ConfigError::Validation("demo fps must be > 0".into()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
log_level: warn
display:
  left:
    bus: /dev/spidev1.0
    cs_pin: 17
  rotate_deg: 180
  brightness: 0.4
demo:
  pattern: concentric
  fps: 30
"#;

    #[test]
    fn test_parse_yaml() {
        let cfg = parse_yaml(SAMPLE).unwrap();
        assert_eq!(cfg.log_level.as_deref(), Some("warn"));
        let display = cfg.display.unwrap();
        assert_eq!(display.left, Some(PanelConfig { bus: "/dev/spidev1.0".into(), cs_pin: 17 }));
        assert_eq!(display.right, None);
        assert_eq!(display.rotate_deg, Some(180));
        assert_eq!(cfg.demo.unwrap().pattern, Some(Pattern::Concentric));
    }

    #[test]
    fn test_defaults_fill_missing_panels() {
        let display = DisplayConfig::default();
        assert_eq!(display.left_or_default().bus, "/dev/spidev0.0");
        assert_eq!(display.left_or_default().cs_pin, 8);
        assert_eq!(display.right_or_default().bus, "/dev/spidev0.1");
        assert_eq!(display.right_or_default().cs_pin, 7);
        assert_eq!(display.speed_hz_or_default(), 600_000);
    }

    #[test]
    fn test_speed_is_capped() {
        let display = DisplayConfig { speed_hz: Some(8_000_000), ..Default::default() };
        assert_eq!(display.speed_hz_or_default(), 600_000);
    }

    #[test]
    fn test_cli_overrides_yaml() {
        let mut cfg = parse_yaml(SAMPLE).unwrap();
        let cli = Cli {
            debug: true,
            rotate_deg: Some(90),
            left_cs_pin: Some(22),
            fps: Some(15),
            ..Default::default()
        };
        apply_cli_overrides(&mut cfg, &cli);

        assert_eq!(cfg.log_level.as_deref(), Some("debug"));
        let display = cfg.display.as_ref().unwrap();
        assert_eq!(display.rotate_deg, Some(90));
        assert_eq!(display.brightness, Some(0.4));
        assert_eq!(display.left, Some(PanelConfig { bus: "/dev/spidev1.0".into(), cs_pin: 22 }));
        let demo = cfg.demo.as_ref().unwrap();
        assert_eq!(demo.fps, Some(15));
        assert_eq!(demo.pattern, Some(Pattern::Concentric));
    }

    #[test]
    fn test_merge_keeps_unset_fields() {
        let mut cfg = parse_yaml(SAMPLE).unwrap();
        let overlay = parse_yaml("display:\n  brightness: 0.9\n").unwrap();
        merge(&mut cfg, overlay);

        let display = cfg.display.unwrap();
        assert_eq!(display.brightness, Some(0.9));
        assert_eq!(display.rotate_deg, Some(180));
        assert_eq!(cfg.log_level.as_deref(), Some("warn"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        for yaml in [
            "display:\n  rotate_deg: 45\n",
            "display:\n  brightness: 1.5\n",
            "display:\n  speed_hz: 0\n",
            "display:\n  speed_hz: 1000000\n",
            "display:\n  left: { bus: '', cs_pin: 8 }\n",
            "display:\n  left: { bus: a, cs_pin: 8 }\n  right: { bus: b, cs_pin: 8 }\n",
            "demo:\n  fps: 0\n",
        ] {
            let cfg = parse_yaml(yaml).unwrap();
            assert!(matches!(validate(&cfg), Err(ConfigError::Validation(_))), "{yaml}");
        }
    }

    #[test]
    fn test_validate_accepts_sample() {
        assert!(validate(&parse_yaml(SAMPLE).unwrap()).is_ok());
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let cli = Cli {
            config: Some(PathBuf::from("/nonexistent/unicornhatmini.yaml")),
            ..Default::default()
        };
        assert!(matches!(load(&cli), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_dump_round_trips() {
        let cfg = parse_yaml(SAMPLE).unwrap();
        let text = dump(&cfg).unwrap();
        assert_eq!(parse_yaml(&text).unwrap(), cfg);
    }

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::try_parse_from([
            "unicornhatmini", "-v", "--pattern", "rainbow", "-b", "0.3", "-r", "270",
        ])
        .unwrap();
        assert!(cli.debug);
        assert_eq!(cli.pattern, Some(Pattern::Rainbow));
        assert_eq!(cli.brightness, Some(0.3));
        assert_eq!(cli.rotate_deg, Some(270));
    }
}
