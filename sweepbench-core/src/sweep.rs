//! Sweep Presets
//!
//! Each preset is a pure function from [`SweepOptions`] to an ordered list of
//! [`Configuration`]s. The order is the row order of tables and the point
//! order of graphs, so identical options always render identically.

use serde::{Deserialize, Serialize};

/// One point in the swept parameter space.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Configuration {
    /// Number of independent paths in one call
    pub batch_size: usize,
    /// Number of points per path
    pub stream_length: usize,
    /// Dimension of each point
    pub channels: usize,
    /// Truncation depth
    pub depth: usize,
    /// Display label (first table column)
    pub label: String,
}

impl Configuration {
    fn new(
        batch_size: usize,
        stream_length: usize,
        channels: usize,
        depth: usize,
        axis: SweepAxis,
    ) -> Self {
        let label = match axis {
            SweepAxis::Depth => format!("depth {}", depth),
            SweepAxis::Channels => format!("channels {}", channels),
            SweepAxis::Fixed => format!(
                "{}x{}x{} depth {}",
                batch_size, stream_length, channels, depth
            ),
        };
        Self {
            batch_size,
            stream_length,
            channels,
            depth,
            label,
        }
    }

    /// `(batch, length, channels)` shape of the input
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.batch_size, self.stream_length, self.channels)
    }

    /// Value of the swept parameter, `None` for fixed sweeps
    pub fn axis_value(&self, axis: SweepAxis) -> Option<usize> {
        match axis {
            SweepAxis::Depth => Some(self.depth),
            SweepAxis::Channels => Some(self.channels),
            SweepAxis::Fixed => None,
        }
    }
}

/// The parameter a preset varies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SweepAxis {
    /// Truncation depth varies
    Depth,
    /// Channel count varies
    Channels,
    /// Hand-picked points with no single swept parameter
    Fixed,
}

impl SweepAxis {
    /// Axis title used by renderers
    pub fn title(self) -> &'static str {
        match self {
            SweepAxis::Depth => "depth",
            SweepAxis::Channels => "channels",
            SweepAxis::Fixed => "configuration",
        }
    }
}

/// Named sweep presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Two representative size/depth pairs
    Typical,
    /// Fixed size and channels, depth varied
    Depths,
    /// Fixed size and depth, channels varied
    Channels,
    /// Tiny sizes for smoke runs
    Small,
}

impl Preset {
    /// All presets, in CLI order
    pub const ALL: [Preset; 4] = [Preset::Typical, Preset::Depths, Preset::Channels, Preset::Small];

    /// Lowercase preset name
    pub fn name(self) -> &'static str {
        match self {
            Preset::Typical => "typical",
            Preset::Depths => "depths",
            Preset::Channels => "channels",
            Preset::Small => "small",
        }
    }

    /// The parameter this preset varies
    pub fn axis(self) -> SweepAxis {
        match self {
            Preset::Typical => SweepAxis::Fixed,
            Preset::Depths | Preset::Small => SweepAxis::Depth,
            Preset::Channels => SweepAxis::Channels,
        }
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "typical" => Ok(Preset::Typical),
            "depths" | "depth" => Ok(Preset::Depths),
            "channels" => Ok(Preset::Channels),
            "small" => Ok(Preset::Small),
            other => Err(format!("Unknown sweep type: {}", other)),
        }
    }
}

/// Overrides applied on top of a preset's defaults.
///
/// `typical` ignores the depth and channel lists; its points are fixed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepOptions {
    /// Batch size override
    #[serde(default)]
    pub batch_size: Option<usize>,
    /// Stream length override
    #[serde(default)]
    pub stream_length: Option<usize>,
    /// Depths for the `depths` and `small` presets
    #[serde(default)]
    pub depths: Option<Vec<usize>>,
    /// Channel counts for the `channels` preset
    #[serde(default)]
    pub channels: Option<Vec<usize>>,
}

/// Ordered configurations produced by one preset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sweep {
    /// Preset that produced the sweep
    pub preset: Preset,
    /// Parameter varied across the sweep
    pub axis: SweepAxis,
    /// Configurations in render order
    pub configurations: Vec<Configuration>,
}

impl Sweep {
    /// Number of configurations
    pub fn len(&self) -> usize {
        self.configurations.len()
    }

    /// Whether the sweep is empty
    pub fn is_empty(&self) -> bool {
        self.configurations.is_empty()
    }

    /// Distinct values of the swept parameter, in first-seen order
    pub fn distinct_axis_values(&self) -> Vec<usize> {
        let mut seen = Vec::new();
        for value in self.configurations.iter().filter_map(|c| c.axis_value(self.axis)) {
            if !seen.contains(&value) {
                seen.push(value);
            }
        }
        seen
    }
}

/// Generate the configurations for `preset`.
pub fn generate(preset: Preset, options: &SweepOptions) -> Sweep {
    let configurations = match preset {
        Preset::Typical => typical(options),
        Preset::Depths => depths(options),
        Preset::Channels => channels(options),
        Preset::Small => small(options),
    };
    Sweep {
        preset,
        axis: preset.axis(),
        configurations,
    }
}

fn typical(options: &SweepOptions) -> Vec<Configuration> {
    let batch = options.batch_size.unwrap_or(32);
    let length = options.stream_length.unwrap_or(128);
    vec![
        Configuration::new(batch, length, 4, 6, SweepAxis::Fixed),
        Configuration::new(batch, length, 20, 3, SweepAxis::Fixed),
    ]
}

fn depths(options: &SweepOptions) -> Vec<Configuration> {
    let batch = options.batch_size.unwrap_or(32);
    let length = options.stream_length.unwrap_or(128);
    let depths = options.depths.clone().unwrap_or_else(|| (2..=9).collect());
    depths
        .into_iter()
        .map(|depth| Configuration::new(batch, length, 4, depth, SweepAxis::Depth))
        .collect()
}

fn channels(options: &SweepOptions) -> Vec<Configuration> {
    let batch = options.batch_size.unwrap_or(32);
    let length = options.stream_length.unwrap_or(128);
    let channels = options.channels.clone().unwrap_or_else(|| (2..=9).collect());
    channels
        .into_iter()
        .map(|c| Configuration::new(batch, length, c, 4, SweepAxis::Channels))
        .collect()
}

fn small(options: &SweepOptions) -> Vec<Configuration> {
    let batch = options.batch_size.unwrap_or(1);
    let length = options.stream_length.unwrap_or(16);
    let depths = options.depths.clone().unwrap_or_else(|| vec![2, 3, 4]);
    depths
        .into_iter()
        .map(|depth| Configuration::new(batch, length, 2, depth, SweepAxis::Depth))
        .collect()
}
