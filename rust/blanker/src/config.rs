// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Blank configuration, unit normalization and validation
//!
//! [`BlankConfiguration`] is what a user writes: diameters in the chosen
//! unit system, zero meaning "absent". [`BlankConfiguration::validate`]
//! turns it into [`Dimensions`]: millimetres, radii and explicit options.

use crate::error::{Error, Result};
use blanker_geometry::Polarity;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Millimetres per inch
pub const MM_PER_INCH: f64 = 25.4;

/// Most longitudinal slices a blank may be cut into
pub const MAX_SLICES: f32 = 1_000_000.0;

/// Unit system of the user-facing dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    #[serde(alias = "inches", alias = "in")]
    Inch,
    #[serde(alias = "millimeter", alias = "millimeters")]
    Mm,
}

impl Units {
    /// Convert a length in these units to millimetres
    #[inline]
    pub fn to_mm(self, value: f64) -> f64 {
        match self {
            Units::Inch => value * MM_PER_INCH,
            Units::Mm => value,
        }
    }
}

impl FromStr for Units {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inch" | "inches" | "in" => Ok(Units::Inch),
            "mm" | "millimeter" | "millimeters" => Ok(Units::Mm),
            other => Err(Error::config(
                "units",
                format!("unrecognized unit '{}' (expected 'inch' or 'mm')", other),
            )),
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Units::Inch => write!(f, "inch"),
            Units::Mm => write!(f, "mm"),
        }
    }
}

/// Calibration constants of the generators, always in millimetres
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tunables {
    /// Longitudinal length of one image column
    pub step_size: f32,
    /// Depth of the centre point of a centered top cap
    pub center_depth: f32,
    /// Axial length of the funnel frustum
    pub funnel_depth: f32,
    /// Height of the funnel's straight wall
    pub funnel_height: f32,
    /// Material above the cavity in a mold
    pub mold_padding: f32,
    /// Height of the square mold's registration lip
    pub lip_height: f32,
    /// Inset of the registration lip from the back face
    pub lip_depth: f32,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            step_size: 0.04,
            center_depth: 2.0,
            funnel_depth: 5.0,
            funnel_height: 5.0,
            mold_padding: 5.0,
            lip_height: 2.0,
            lip_depth: 3.0,
        }
    }
}

impl Tunables {
    fn validate(&self) -> Result<()> {
        let values = [
            ("step_size", self.step_size),
            ("center_depth", self.center_depth),
            ("funnel_depth", self.funnel_depth),
            ("funnel_height", self.funnel_height),
            ("mold_padding", self.mold_padding),
            ("lip_height", self.lip_height),
            ("lip_depth", self.lip_depth),
        ];
        for (parameter, value) in values {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::config(
                    parameter,
                    format!("must be a positive number of millimetres, got {}", value),
                ));
            }
        }
        Ok(())
    }
}

/// User-facing blank description.
///
/// Diameters and lengths are in `units`; a zero funnel or mold size means
/// the feature is absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlankConfiguration {
    pub units: Units,
    /// Overall blank length
    pub length: f64,
    /// Bore (tube) diameter
    pub tube: f64,
    /// Outer diameter reached by the image relief
    pub diameter: f64,
    /// Recess the top cap centre to seat a tube end
    pub centered: bool,
    /// Pour funnel diameter
    pub funnel: f64,
    /// Round mold diameter
    pub round_mold: f64,
    /// Square mold half-width
    pub square_mold: f64,
    /// Generate the object itself rather than its negative
    pub positive: bool,
    /// Minimum mold wall around the relief
    pub wall_thickness: f64,
    /// Longitudinal offset where the image starts
    pub image_zero: f64,
    /// Place the image in the middle of the blank, ignoring `image_zero`
    pub center_image: bool,
    /// Mask image
    pub image: Option<PathBuf>,
    pub tunables: Tunables,
}

impl Default for BlankConfiguration {
    fn default() -> Self {
        Self {
            units: Units::Inch,
            length: 2.0,
            tube: 0.25,
            diameter: 0.75,
            centered: false,
            funnel: 0.0,
            round_mold: 0.0,
            square_mold: 0.0,
            positive: true,
            wall_thickness: 0.0,
            image_zero: 0.5,
            center_image: false,
            image: None,
            tunables: Tunables::default(),
        }
    }
}

/// Mold shell surrounding the cavity
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Mold {
    #[default]
    None,
    Round { radius: f32 },
    Square { half_width: f32 },
}

/// Validated blank dimensions in millimetres
#[derive(Debug, Clone, PartialEq)]
pub struct Dimensions {
    pub length: f32,
    pub bore_radius: f32,
    pub outer_radius: f32,
    pub funnel_radius: Option<f32>,
    pub mold: Mold,
    pub centered: bool,
    /// Effective polarity; any mold forces [`Polarity::Negative`]
    pub polarity: Polarity,
    pub wall_thickness: f32,
    pub image_zero: f32,
    pub center_image: bool,
    pub tunables: Tunables,
}

impl Dimensions {
    /// Image zero that centres an image of `columns` columns on the blank
    pub fn centered_image_zero(&self, columns: usize) -> f32 {
        let image_length = columns as f32 * self.tunables.step_size;
        ((self.length - image_length) / 2.0).clamp(0.0, self.length)
    }

    /// Image zero actually used for an image of `columns` columns
    pub fn effective_image_zero(&self, columns: usize) -> f32 {
        if self.center_image {
            self.centered_image_zero(columns)
        } else {
            self.image_zero
        }
    }

    /// Largest radius the cavity reaches
    pub fn cavity_radius(&self) -> f32 {
        self.funnel_radius.map_or(self.outer_radius, |f| f.max(self.outer_radius))
    }
}

fn positive(parameter: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(Error::config(parameter, format!("must be positive, got {}", value)))
    }
}

fn optional(parameter: &'static str, value: f64) -> Result<Option<f64>> {
    if value == 0.0 {
        Ok(None)
    } else {
        positive(parameter, value).map(Some)
    }
}

impl BlankConfiguration {
    /// Load a configuration from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::ConfigFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|e| Error::ConfigFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Normalize to millimetres and check every dimension
    pub fn validate(&self) -> Result<Dimensions> {
        let mm = |v: f64| self.units.to_mm(v) as f32;
        let tunables = self.tunables;
        tunables.validate()?;

        let length = mm(positive("length", self.length)?);
        if length <= 2.0 * tunables.step_size {
            return Err(Error::config(
                "length",
                format!(
                    "{} mm is too short for a step size of {} mm",
                    length, tunables.step_size
                ),
            ));
        }
        if length - tunables.step_size == length || length / tunables.step_size > MAX_SLICES {
            return Err(Error::config(
                "step_size",
                format!(
                    "{} mm cuts a {} mm blank into more than {} slices",
                    tunables.step_size, length, MAX_SLICES
                ),
            ));
        }

        let bore_radius = mm(positive("tube", self.tube)?) / 2.0;
        let outer_radius = mm(positive("diameter", self.diameter)?) / 2.0;
        if outer_radius <= bore_radius {
            return Err(Error::config(
                "diameter",
                format!(
                    "outer diameter {} must exceed tube diameter {}",
                    self.diameter, self.tube
                ),
            ));
        }

        let funnel_radius = optional("funnel", self.funnel)?.map(|d| mm(d) / 2.0);
        if let Some(radius) = funnel_radius {
            if radius <= bore_radius {
                return Err(Error::config(
                    "funnel",
                    format!(
                        "funnel diameter {} must exceed tube diameter {}",
                        self.funnel, self.tube
                    ),
                ));
            }
        }

        if !(self.wall_thickness.is_finite() && self.wall_thickness >= 0.0) {
            return Err(Error::config(
                "wall_thickness",
                format!("must be zero or positive, got {}", self.wall_thickness),
            ));
        }
        let wall_thickness = mm(self.wall_thickness);

        if !(self.image_zero.is_finite() && self.image_zero >= 0.0) {
            return Err(Error::config(
                "image_zero",
                format!("must be zero or positive, got {}", self.image_zero),
            ));
        }

        if self.centered && tunables.center_depth >= length {
            return Err(Error::config(
                "center_depth",
                format!("{} mm does not fit in a {} mm blank", tunables.center_depth, length),
            ));
        }

        let dimensions = Dimensions {
            length,
            bore_radius,
            outer_radius,
            funnel_radius,
            mold: Mold::None,
            centered: self.centered,
            polarity: if self.positive {
                Polarity::Positive
            } else {
                Polarity::Negative
            },
            wall_thickness,
            image_zero: mm(self.image_zero),
            center_image: self.center_image,
            tunables,
        };

        let round = optional("round_mold", self.round_mold)?.map(|d| mm(d) / 2.0);
        let square = optional("square_mold", self.square_mold)?.map(mm);

        let mold = match (round, square) {
            (Some(_), Some(_)) => {
                return Err(Error::config(
                    "mold",
                    "round_mold and square_mold cannot both be set",
                ))
            }
            (Some(radius), None) => {
                if radius <= dimensions.cavity_radius() {
                    return Err(Error::config(
                        "round_mold",
                        format!(
                            "mold diameter {} must exceed the cavity diameter {} mm",
                            self.round_mold,
                            dimensions.cavity_radius() * 2.0
                        ),
                    ));
                }
                Mold::Round { radius }
            }
            (None, Some(half_width)) => {
                let needed = dimensions.cavity_radius() + tunables.lip_depth;
                if half_width <= needed {
                    return Err(Error::config(
                        "square_mold",
                        format!(
                            "half-width {} must leave room for the cavity and lip ({} mm)",
                            self.square_mold, needed
                        ),
                    ));
                }
                Mold::Square { half_width }
            }
            (None, None) => Mold::None,
        };

        let polarity = match mold {
            Mold::None => dimensions.polarity,
            _ => Polarity::Negative,
        };

        Ok(Dimensions {
            mold,
            polarity,
            ..dimensions
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn mm_config() -> BlankConfiguration {
        BlankConfiguration {
            units: Units::Mm,
            length: 50.0,
            tube: 6.0,
            diameter: 19.0,
            image_zero: 12.5,
            ..Default::default()
        }
    }

    fn parameter_of(result: Result<Dimensions>) -> &'static str {
        match result {
            Err(Error::Configuration { parameter, .. }) => parameter,
            other => panic!("expected configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_units_parse() {
        assert_eq!("inch".parse::<Units>().unwrap(), Units::Inch);
        assert_eq!("MM".parse::<Units>().unwrap(), Units::Mm);
        assert!(matches!(
            "furlong".parse::<Units>(),
            Err(Error::Configuration { parameter: "units", .. })
        ));
    }

    #[test]
    fn test_inch_defaults_convert_to_mm() {
        let dims = BlankConfiguration::default().validate().unwrap();
        assert_relative_eq!(dims.length, 50.8, epsilon = 1e-4);
        assert_relative_eq!(dims.bore_radius, 3.175, epsilon = 1e-4);
        assert_relative_eq!(dims.outer_radius, 9.525, epsilon = 1e-4);
        assert_relative_eq!(dims.image_zero, 12.7, epsilon = 1e-4);
        assert_eq!(dims.polarity, Polarity::Positive);
        assert_eq!(dims.mold, Mold::None);
        assert_eq!(dims.funnel_radius, None);
    }

    #[test]
    fn test_mm_passthrough() {
        let dims = mm_config().validate().unwrap();
        assert_eq!(dims.length, 50.0);
        assert_eq!(dims.bore_radius, 3.0);
        assert_eq!(dims.outer_radius, 9.5);
    }

    #[test]
    fn test_rejects_non_positive_dimensions() {
        let config = BlankConfiguration {
            length: 0.0,
            ..mm_config()
        };
        assert_eq!(parameter_of(config.validate()), "length");

        let config = BlankConfiguration {
            tube: -1.0,
            ..mm_config()
        };
        assert_eq!(parameter_of(config.validate()), "tube");

        let config = BlankConfiguration {
            diameter: 5.0,
            ..mm_config()
        };
        assert_eq!(parameter_of(config.validate()), "diameter");
    }

    #[test]
    fn test_both_molds_rejected() {
        let config = BlankConfiguration {
            round_mold: 40.0,
            square_mold: 20.0,
            ..mm_config()
        };
        assert_eq!(parameter_of(config.validate()), "mold");
    }

    #[test]
    fn test_mold_forces_negative_polarity() {
        let config = BlankConfiguration {
            round_mold: 40.0,
            positive: true,
            ..mm_config()
        };
        let dims = config.validate().unwrap();
        assert_eq!(dims.mold, Mold::Round { radius: 20.0 });
        assert_eq!(dims.polarity, Polarity::Negative);

        let config = BlankConfiguration {
            square_mold: 20.0,
            ..mm_config()
        };
        let dims = config.validate().unwrap();
        assert_eq!(dims.mold, Mold::Square { half_width: 20.0 });
        assert_eq!(dims.polarity, Polarity::Negative);
    }

    #[test]
    fn test_mold_must_clear_cavity() {
        let config = BlankConfiguration {
            round_mold: 18.0,
            ..mm_config()
        };
        assert_eq!(parameter_of(config.validate()), "round_mold");

        let config = BlankConfiguration {
            square_mold: 11.0,
            ..mm_config()
        };
        assert_eq!(parameter_of(config.validate()), "square_mold");
    }

    #[test]
    fn test_funnel_must_exceed_bore() {
        let config = BlankConfiguration {
            funnel: 4.0,
            ..mm_config()
        };
        assert_eq!(parameter_of(config.validate()), "funnel");
    }

    #[test]
    fn test_centered_image_zero() {
        let dims = BlankConfiguration {
            center_image: true,
            ..mm_config()
        }
        .validate()
        .unwrap();

        // 250 columns of 0.04 mm = 10 mm in a 50 mm blank
        assert_relative_eq!(dims.effective_image_zero(250), 20.0, epsilon = 1e-4);
        // An image longer than the blank starts at the top
        assert_eq!(dims.effective_image_zero(5000), 0.0);
        assert_relative_eq!(mm_config().validate().unwrap().effective_image_zero(250), 12.5);
    }

    #[test]
    fn test_json_uses_defaults_for_missing_fields() {
        let config: BlankConfiguration =
            serde_json::from_str(r#"{ "units": "mm", "length": 60, "tunables": { "step_size": 0.05 } }"#)
                .unwrap();
        assert_eq!(config.units, Units::Mm);
        assert_eq!(config.length, 60.0);
        assert_eq!(config.tube, 0.25);
        assert_eq!(config.tunables.step_size, 0.05);
        assert_eq!(config.tunables.mold_padding, 5.0);
    }

    #[test]
    fn test_tiny_step_rejected() {
        let mut config = mm_config();
        config.tunables.step_size = 1e-7;
        assert_eq!(parameter_of(config.validate()), "step_size");

        config.tunables.step_size = 1e-4;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_json_unit_aliases() {
        let config: BlankConfiguration = serde_json::from_str(r#"{ "units": "inches" }"#).unwrap();
        assert_eq!(config.units, Units::Inch);
        let config: BlankConfiguration = serde_json::from_str(r#"{ "units": "in" }"#).unwrap();
        assert_eq!(config.units, Units::Inch);
        assert_eq!("inches".parse::<Units>().unwrap(), config.units);
    }

    #[test]
    fn test_bad_tunable_named() {
        let mut config = mm_config();
        config.tunables.step_size = 0.0;
        assert_eq!(parameter_of(config.validate()), "step_size");
    }
}
