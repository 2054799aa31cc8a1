use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Solvent {
    Ethanol,
    Water,
    Hexane,
}

impl Solvent {
    pub const ALL: [Solvent; 3] = [Solvent::Ethanol, Solvent::Water, Solvent::Hexane];

    /// Relative static permittivity at room temperature.
    pub fn dielectric_constant(self) -> f64 {
        match self {
            Self::Ethanol => 24.3,
            Self::Water => 80.1,
            Self::Hexane => 1.9,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Ethanol => "Ethanol",
            Self::Water => "Water",
            Self::Hexane => "Hexane",
        }
    }
}

impl fmt::Display for Solvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum SolventError {
    #[error("Unknown solvent: '{0}' (expected Ethanol, Water or Hexane)")]
    UnknownSolvent(String),
    #[error("Malformed mixture label '{0}': expected e.g. 'Ethanol:Water 70:30' or 'Hexane 100'")]
    MalformedLabel(String),
    #[error("Mixture label '{label}' names {solvents} solvent(s) but gives {shares} share(s)")]
    ShareCountMismatch {
        label: String,
        solvents: usize,
        shares: usize,
    },
    #[error("Solvent {0} appears more than once in the mixture")]
    DuplicateSolvent(Solvent),
}

impl FromStr for Solvent {
    type Err = SolventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|solvent| solvent.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SolventError::UnknownSolvent(s.trim().to_string()))
    }
}

/// Volume fractions of each known solvent.
///
/// Fractions are stored as given. They are neither required to sum to one nor
/// to be non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolventMixture {
    pub ethanol: f64,
    pub water: f64,
    pub hexane: f64,
}

impl SolventMixture {
    pub fn new(ethanol: f64, water: f64, hexane: f64) -> Self {
        Self {
            ethanol,
            water,
            hexane,
        }
    }

    /// Binary ethanol/water blend with water making up the remainder; no hexane.
    pub fn ethanol_water(ethanol: f64) -> Self {
        Self::new(ethanol, 1.0 - ethanol, 0.0)
    }

    pub fn pure(solvent: Solvent) -> Self {
        let mut mixture = Self::default();
        mixture.set_fraction(solvent, 1.0);
        mixture
    }

    pub fn fraction(&self, solvent: Solvent) -> f64 {
        match solvent {
            Solvent::Ethanol => self.ethanol,
            Solvent::Water => self.water,
            Solvent::Hexane => self.hexane,
        }
    }

    pub fn set_fraction(&mut self, solvent: Solvent, fraction: f64) {
        match solvent {
            Solvent::Ethanol => self.ethanol = fraction,
            Solvent::Water => self.water = fraction,
            Solvent::Hexane => self.hexane = fraction,
        }
    }

    pub fn total_fraction(&self) -> f64 {
        Solvent::ALL.iter().map(|&s| self.fraction(s)).sum()
    }

    /// Parses labels of the form `"Ethanol:Water 70:30"` or `"Hexane 100"`.
    ///
    /// Shares are percentages; they are converted to fractions by dividing by 100
    /// without any normalization.
    pub fn from_label(label: &str) -> Result<Self, SolventError> {
        let malformed = || SolventError::MalformedLabel(label.to_string());
        let (names, shares) = label.trim().rsplit_once(char::is_whitespace).ok_or_else(malformed)?;

        let solvents = names
            .split(':')
            .map(str::parse::<Solvent>)
            .collect::<Result<Vec<_>, _>>()?;
        let shares = shares
            .split(':')
            .map(|s| s.trim().parse::<f64>().map_err(|_| malformed()))
            .collect::<Result<Vec<_>, _>>()?;

        if solvents.len() != shares.len() {
            return Err(SolventError::ShareCountMismatch {
                label: label.to_string(),
                solvents: solvents.len(),
                shares: shares.len(),
            });
        }

        let mut mixture = Self::default();
        let mut seen = Vec::with_capacity(solvents.len());
        for (solvent, share) in solvents.into_iter().zip(shares) {
            if seen.contains(&solvent) {
                return Err(SolventError::DuplicateSolvent(solvent));
            }
            seen.push(solvent);
            mixture.set_fraction(solvent, share / 100.0);
        }
        Ok(mixture)
    }

    /// Compact label listing the non-zero components, e.g. `"Ethanol:Water 70:30"`.
    pub fn label(&self) -> String {
        let parts: Vec<(Solvent, f64)> = Solvent::ALL
            .into_iter()
            .map(|s| (s, self.fraction(s)))
            .filter(|&(_, f)| f != 0.0)
            .collect();
        if parts.is_empty() {
            return "None 0".to_string();
        }
        let names: Vec<&str> = parts.iter().map(|(s, _)| s.name()).collect();
        let shares: Vec<String> = parts
            .iter()
            .map(|(_, f)| format!("{}", (f * 1000.0).round() / 10.0))
            .collect();
        format!("{} {}", names.join(":"), shares.join(":"))
    }
}

/// Fraction-weighted dielectric constant of a mixture.
///
/// This is a plain weighted sum over the known solvents: a mixture whose fractions
/// sum to 0.5 yields half the polarity, and negative fractions subtract.
pub fn estimate_polarity(mixture: &SolventMixture) -> f64 {
    Solvent::ALL
        .iter()
        .map(|&s| mixture.fraction(s) * s.dielectric_constant())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn ethanol_water_blend_is_weighted_sum() {
        let polarity = estimate_polarity(&SolventMixture::new(0.7, 0.3, 0.0));
        assert!((polarity - (0.7 * 24.3 + 0.3 * 80.1)).abs() < 0.01);
        assert!((polarity - 41.04).abs() < 0.01);
    }

    #[test]
    fn pure_solvents_return_their_constants() {
        for solvent in Solvent::ALL {
            assert!(approx(
                estimate_polarity(&SolventMixture::pure(solvent)),
                solvent.dielectric_constant()
            ));
        }
    }

    #[test]
    fn fractions_are_not_normalized() {
        let half = SolventMixture::new(0.25, 0.25, 0.0);
        assert!(approx(estimate_polarity(&half), 0.25 * 24.3 + 0.25 * 80.1));

        let over = SolventMixture::new(1.0, 1.0, 1.0);
        assert!(approx(estimate_polarity(&over), 24.3 + 80.1 + 1.9));
        assert!(approx(over.total_fraction(), 3.0));
    }

    #[test]
    fn negative_fractions_subtract() {
        let mixture = SolventMixture::new(-1.0, 0.0, 0.0);
        assert!(approx(estimate_polarity(&mixture), -24.3));
    }

    #[test]
    fn empty_mixture_has_zero_polarity() {
        assert_eq!(estimate_polarity(&SolventMixture::default()), 0.0);
    }

    #[test]
    fn ethanol_water_fills_remainder_with_water() {
        let mixture = SolventMixture::ethanol_water(0.25);
        assert_eq!(mixture.water, 0.75);
        assert_eq!(mixture.hexane, 0.0);
    }

    #[test]
    fn from_label_parses_binary_and_pure_mixtures() {
        let blend = SolventMixture::from_label("Ethanol:Water 70:30").unwrap();
        assert!(approx(blend.ethanol, 0.7));
        assert!(approx(blend.water, 0.3));
        assert_eq!(blend.hexane, 0.0);

        assert_eq!(
            SolventMixture::from_label("Hexane 100").unwrap(),
            SolventMixture::pure(Solvent::Hexane)
        );
        assert_eq!(
            SolventMixture::from_label("  ethanol 100 ").unwrap(),
            SolventMixture::pure(Solvent::Ethanol)
        );
    }

    #[test]
    fn from_label_rejects_bad_input() {
        assert_eq!(
            SolventMixture::from_label("Acetone 100"),
            Err(SolventError::UnknownSolvent("Acetone".to_string()))
        );
        assert!(matches!(
            SolventMixture::from_label("Ethanol"),
            Err(SolventError::MalformedLabel(_))
        ));
        assert!(matches!(
            SolventMixture::from_label("Ethanol:Water 70"),
            Err(SolventError::ShareCountMismatch {
                solvents: 2,
                shares: 1,
                ..
            })
        ));
        assert!(matches!(
            SolventMixture::from_label("Ethanol:Water seventy:30"),
            Err(SolventError::MalformedLabel(_))
        ));
        assert_eq!(
            SolventMixture::from_label("Water:Water 50:50"),
            Err(SolventError::DuplicateSolvent(Solvent::Water))
        );
    }

    #[test]
    fn label_lists_non_zero_components() {
        assert_eq!(SolventMixture::new(0.7, 0.3, 0.0).label(), "Ethanol:Water 70:30");
        assert_eq!(SolventMixture::pure(Solvent::Hexane).label(), "Hexane 100");
    }

    #[test]
    fn solvent_names_parse_case_insensitively() {
        assert_eq!("WATER".parse::<Solvent>(), Ok(Solvent::Water));
        assert_eq!(Solvent::Hexane.to_string(), "Hexane");
    }
}
