//! TOML layout files describing blocks, platforms and shatter timing.

use std::time::Duration;

use passblock_core::{Command, GroupingKey, Rect, ShatterConfig};
use serde::Deserialize;
use thiserror::Error;

/// Parsed layout file.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct LayoutFile {
    /// Whether groups absorb adjacent platforms.
    #[serde(default)]
    pub(crate) absorb_platforms: bool,
    /// Optional shatter timing overrides.
    #[serde(default)]
    pub(crate) shatter: Option<ShatterSection>,
    #[serde(default)]
    pub(crate) blocks: Vec<BlockEntry>,
    #[serde(default)]
    pub(crate) platforms: Vec<PlatformEntry>,
}

/// Footprint of a block plus its grouping key.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct BlockEntry {
    pub(crate) x: i32,
    pub(crate) y: i32,
    pub(crate) width: i32,
    pub(crate) height: i32,
    #[serde(default)]
    pub(crate) key: u32,
}

impl BlockEntry {
    fn region(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// Footprint of an auxiliary platform.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct PlatformEntry {
    pub(crate) x: i32,
    pub(crate) y: i32,
    pub(crate) width: i32,
    pub(crate) height: i32,
}

impl PlatformEntry {
    fn region(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// Shatter timing with durations in milliseconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ShatterSection {
    pub(crate) pre_delay_ms: Option<u64>,
    pub(crate) ramp_ms: Option<u64>,
    pub(crate) max_intensity: Option<f32>,
    pub(crate) quick_destroy: Option<bool>,
    pub(crate) shake_amplitude: Option<f32>,
    pub(crate) distortion_start: Option<f32>,
    pub(crate) distortion_decay_per_second: Option<f32>,
}

impl ShatterSection {
    /// Applies the overrides on top of the default timing.
    fn to_config(self) -> Result<ShatterConfig, LayoutError> {
        let defaults = ShatterConfig::default();
        let config = ShatterConfig {
            pre_delay: self
                .pre_delay_ms
                .map_or(defaults.pre_delay, Duration::from_millis),
            ramp_duration: self
                .ramp_ms
                .map_or(defaults.ramp_duration, Duration::from_millis),
            max_intensity: self.max_intensity.unwrap_or(defaults.max_intensity),
            quick_destroy: self.quick_destroy.unwrap_or(defaults.quick_destroy),
            shake_amplitude: self.shake_amplitude.unwrap_or(defaults.shake_amplitude),
            distortion_start: self.distortion_start.unwrap_or(defaults.distortion_start),
            distortion_decay_per_second: self
                .distortion_decay_per_second
                .unwrap_or(defaults.distortion_decay_per_second),
        };

        for (field, value) in [
            ("max_intensity", config.max_intensity),
            ("shake_amplitude", config.shake_amplitude),
            ("distortion_start", config.distortion_start),
            ("distortion_decay_per_second", config.distortion_decay_per_second),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(LayoutError::InvalidValue { field, value });
            }
        }
        Ok(config)
    }
}

/// Errors raised while interpreting a layout file.
#[derive(Debug, Error)]
pub(crate) enum LayoutError {
    /// The file is not valid TOML or does not match the layout schema.
    #[error("malformed layout: {0}")]
    Parse(#[from] toml::de::Error),
    /// The layout declares no blocks at all.
    #[error("layout declares no blocks")]
    NoBlocks,
    /// A shatter parameter is negative or not a number.
    #[error("shatter.{field} must be a non-negative number (found {value})")]
    InvalidValue {
        /// Name of the offending field.
        field: &'static str,
        /// Value found in the file.
        value: f32,
    },
}

impl LayoutFile {
    /// Parses a layout from TOML source.
    pub(crate) fn parse(source: &str) -> Result<Self, LayoutError> {
        let layout: Self = toml::from_str(source)?;
        if layout.blocks.is_empty() {
            return Err(LayoutError::NoBlocks);
        }
        Ok(layout)
    }

    /// Commands that configure the world and spawn every body, in file order.
    pub(crate) fn commands(&self) -> Result<Vec<Command>, LayoutError> {
        let mut commands = vec![Command::ConfigureGrouping {
            absorb_platforms: self.absorb_platforms,
        }];
        if let Some(section) = self.shatter {
            commands.push(Command::ConfigureShatter {
                config: section.to_config()?,
            });
        }
        for platform in &self.platforms {
            commands.push(Command::SpawnPlatform {
                region: platform.region(),
            });
        }
        for block in &self.blocks {
            commands.push(Command::SpawnBlock {
                region: block.region(),
                key: GroupingKey::new(block.key),
            });
        }
        Ok(commands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SINGLE_BLOCK: &str = "[[blocks]]\nx = 0\ny = 0\nwidth = 8\nheight = 8\n";

    const SAMPLE: &str = r#"
absorb_platforms = true

[shatter]
pre_delay_ms = 250
quick_destroy = true

[[blocks]]
x = 0
y = 0
width = 16
height = 8

[[blocks]]
x = 16
y = 0
width = 8
height = 8
key = 2

[[platforms]]
x = 0
y = 8
width = 24
height = 8
"#;

    #[test]
    fn sample_layout_produces_configuration_then_spawns() {
        let layout = LayoutFile::parse(SAMPLE).expect("valid layout");
        let commands = layout.commands().expect("valid values");

        assert_eq!(commands.len(), 5);
        assert_eq!(
            commands[0],
            Command::ConfigureGrouping {
                absorb_platforms: true
            }
        );
        let Command::ConfigureShatter { config } = &commands[1] else {
            panic!("expected shatter configuration, got {:?}", commands[1]);
        };
        assert_eq!(config.pre_delay, Duration::from_millis(250));
        assert_eq!(config.ramp_duration, Duration::from_millis(500));
        assert!(config.quick_destroy);
        assert_eq!(
            commands[2],
            Command::SpawnPlatform {
                region: Rect::new(0, 8, 24, 8)
            }
        );
        assert_eq!(
            commands[4],
            Command::SpawnBlock {
                region: Rect::new(16, 0, 8, 8),
                key: GroupingKey::new(2),
            }
        );
    }

    #[test]
    fn missing_shatter_section_keeps_world_defaults() {
        let layout = LayoutFile::parse(SINGLE_BLOCK).expect("valid layout");
        let commands = layout.commands().expect("valid values");

        assert_eq!(
            commands,
            vec![
                Command::ConfigureGrouping {
                    absorb_platforms: false,
                },
                Command::SpawnBlock {
                    region: Rect::new(0, 0, 8, 8),
                    key: GroupingKey::default(),
                },
            ]
        );
    }

    #[test]
    fn layouts_without_blocks_are_rejected() {
        assert!(matches!(
            LayoutFile::parse("absorb_platforms = false\n"),
            Err(LayoutError::NoBlocks)
        ));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let source = format!("{SINGLE_BLOCK}colour = 1\n");
        let result = LayoutFile::parse(&source);
        assert!(matches!(result, Err(LayoutError::Parse(_))));
    }

    #[test]
    fn negative_shatter_values_are_rejected() {
        let source = format!("[shatter]\nshake_amplitude = -1.0\n\n{SINGLE_BLOCK}");
        let layout = LayoutFile::parse(&source).expect("valid syntax");

        match layout.commands() {
            Err(LayoutError::InvalidValue { field, value }) => {
                assert_eq!(field, "shake_amplitude");
                assert_eq!(value, -1.0);
            }
            other => panic!("unexpected result {other:?}"),
        }
    }
}
