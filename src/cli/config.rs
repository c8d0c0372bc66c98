//! Configuration conversion utilities for CLI arguments

use crate::cli::main_impl::{BlurArgs, CommonArgs, StrokeArgs};
use crate::{
    config::{EffectConfig, EffectConfigBuilder, ExecutionProvider, ScaleAlgorithm},
    utils::ColorParser,
};
use anyhow::{Context, Result};
use std::str::FromStr;

/// Convert CLI arguments to an [`EffectConfig`]
///
/// Values from `--config` are the starting point; flags given on the
/// command line override them.
pub(crate) struct CliConfigBuilder;

impl CliConfigBuilder {
    /// Build the configuration for the `stroke` subcommand
    pub(crate) fn from_stroke_args(args: &StrokeArgs) -> Result<EffectConfig> {
        let mut builder = Self::base_builder(&args.common)?;

        if let Some(color) = &args.color {
            let color = ColorParser::parse(color)
                .with_context(|| format!("Invalid stroke color '{color}'"))?;
            builder = builder.stroke_color(color);
        }
        if let Some(factor) = args.zoom_factor {
            builder = builder.zoom_factor(factor);
        }
        if let Some(angle) = args.angle {
            builder = builder.angle(angle);
        }
        if let Some(algorithm) = &args.algorithm {
            let algorithm = ScaleAlgorithm::from_str(algorithm).context("Invalid --algorithm")?;
            builder = builder.scale_algorithm(algorithm);
        }

        builder.build().context("Invalid stroke configuration")
    }

    /// Build the configuration for the `blur` subcommand
    pub(crate) fn from_blur_args(args: &BlurArgs) -> Result<EffectConfig> {
        let mut builder = Self::base_builder(&args.common)?;

        if let Some(kernel) = args.blur_factor {
            builder = builder.blur_kernel(kernel);
        }
        if let Some(size) = args.parse_size {
            builder = builder.parse_size(size);
        }

        builder.build().context("Invalid blur configuration")
    }

    fn base_builder(common: &CommonArgs) -> Result<EffectConfigBuilder> {
        let base = match &common.config {
            Some(path) => EffectConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config file {}", path.display()))?,
            None => EffectConfig::default(),
        };
        let mut builder = EffectConfigBuilder::from_config(base);

        if let Some(provider) = &common.execution_provider {
            let provider =
                ExecutionProvider::from_str(provider).context("Invalid --execution-provider")?;
            builder = builder.execution_provider(provider);
        }
        if let Some(quality) = common.jpeg_quality {
            builder = builder.jpeg_quality(quality);
        }
        if common.debug {
            builder = builder.debug(true);
        }
        if let Some(dir) = &common.debug_dir {
            builder = builder.debug_dir(dir);
        }
        Ok(builder)
    }
}
