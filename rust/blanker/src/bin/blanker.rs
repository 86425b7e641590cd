// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI tool: turn a mask image into a binary STL pen blank or mold
//!
//! Usage:
//!   blanker --image mask.png [options]

use anyhow::Result;
use blanker::{
    load_mask, BlankConfiguration, BlankGenerator, Error, StlHeader, Units, APPLICATION,
};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

/// Generate a lathe blank (or a mold for one) from a mask image
///
/// Each image column is one longitudinal step down the blank and each row
/// one angular step around it. Opaque black pixels are raised to the outer
/// diameter; everything else stays at the tube diameter.
#[derive(Parser, Debug)]
#[command(name = "blanker")]
#[command(version, long_about = None)]
struct Cli {
    /// Mask image (PNG or JPEG)
    #[arg(short, long)]
    image: Option<PathBuf>,

    /// Output STL file
    #[arg(short, long, default_value = "blank.stl")]
    output: PathBuf,

    /// JSON configuration file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Unit system of all dimensions: inch or mm
    #[arg(long)]
    units: Option<String>,

    /// Blank length
    #[arg(long)]
    length: Option<f64>,

    /// Tube (bore) diameter
    #[arg(long)]
    tube: Option<f64>,

    /// Outer diameter reached by the image
    #[arg(long)]
    diameter: Option<f64>,

    /// Where the image starts along the blank
    #[arg(long)]
    image_zero: Option<f64>,

    /// Centre the image on the blank instead of using --image-zero
    #[arg(long)]
    center_image: bool,

    /// Recess the top centre to seat a tube end
    #[arg(long)]
    centered: bool,

    /// Pour funnel diameter
    #[arg(long)]
    funnel: Option<f64>,

    /// Round mold diameter
    #[arg(long)]
    round_mold: Option<f64>,

    /// Square mold half-width
    #[arg(long)]
    square_mold: Option<f64>,

    /// Minimum mold wall around the relief
    #[arg(long)]
    wall_thickness: Option<f64>,

    /// Generate the negative (cavity) instead of the blank
    #[arg(long)]
    negative: bool,

    /// Longitudinal step per image column, in millimetres
    #[arg(long)]
    step_size: Option<f32>,
}

impl Cli {
    /// Defaults, then the configuration file, then flags
    fn configuration(&self) -> blanker::Result<BlankConfiguration> {
        let mut config = match &self.config {
            Some(path) => BlankConfiguration::from_json_file(path)?,
            None => BlankConfiguration::default(),
        };

        if let Some(units) = &self.units {
            config.units = units.parse::<Units>()?;
        }
        let overrides = [
            (&mut config.length, self.length),
            (&mut config.tube, self.tube),
            (&mut config.diameter, self.diameter),
            (&mut config.image_zero, self.image_zero),
            (&mut config.funnel, self.funnel),
            (&mut config.round_mold, self.round_mold),
            (&mut config.square_mold, self.square_mold),
            (&mut config.wall_thickness, self.wall_thickness),
        ];
        for (field, value) in overrides {
            if let Some(value) = value {
                *field = value;
            }
        }

        config.center_image |= self.center_image;
        config.centered |= self.centered;
        if self.negative {
            config.positive = false;
        }
        if let Some(step_size) = self.step_size {
            config.tunables.step_size = step_size;
        }
        if self.image.is_some() {
            config.image = self.image.clone();
        }

        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let config = cli.configuration()?;
    let dims = config.validate()?;

    let image = config.image.clone().ok_or_else(|| Error::Configuration {
        parameter: "image",
        reason: "no mask image given (use --image or set \"image\" in the configuration file)".into(),
    })?;

    info!(
        image = %image.display(),
        units = %config.units,
        length_mm = dims.length,
        bore_mm = dims.bore_radius * 2.0,
        outer_mm = dims.outer_radius * 2.0,
        "loading mask"
    );
    let mask = load_mask(&image)?;

    let generator = BlankGenerator::new(&dims, &mask)?;
    let name = cli
        .output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let blank = generator.generate(StlHeader::for_application(APPLICATION, &name));

    blank.mesh.save_stl(&cli.output).map_err(Error::from)?;
    info!(
        path = %cli.output.display(),
        facets = blank.mesh.len(),
        bytes = blanker_geometry::binary_len(blank.mesh.len()),
        "wrote STL"
    );

    Ok(())
}
