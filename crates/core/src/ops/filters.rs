use crate::ops::error::OpsError;
use crate::ops::geometry::{area, eccentricity, solidity};
use crate::ops::shapes::Contour;

/// Inclusive bounds; at least one side is set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Limits {
    min: Option<f64>,
    max: Option<f64>,
}

impl Limits {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Result<Self, OpsError> {
        if min.is_none() && max.is_none() {
            return Err(OpsError::NoLimits);
        }
        Ok(Self { min, max })
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }
}

/// A reusable contour predicate.
pub trait ContourFilter {
    /// Whether `contour` passes. Contours the measurement is undefined for
    /// never pass.
    fn keep(&self, contour: &Contour) -> bool;

    fn apply(&self, contours: &[Contour]) -> Vec<Contour> {
        contours.iter().filter(|c| self.keep(c)).cloned().collect()
    }
}

macro_rules! limit_filter {
    ($(#[$doc:meta])* $name:ident, $measure:expr) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, PartialEq)]
        pub struct $name {
            limits: Limits,
        }

        impl $name {
            pub fn new(min: Option<f64>, max: Option<f64>) -> Result<Self, OpsError> {
                Ok(Self {
                    limits: Limits::new(min, max)?,
                })
            }

            pub fn between(min: f64, max: f64) -> Self {
                Self {
                    limits: Limits {
                        min: Some(min),
                        max: Some(max),
                    },
                }
            }

            pub fn at_least(min: f64) -> Self {
                Self {
                    limits: Limits {
                        min: Some(min),
                        max: None,
                    },
                }
            }

            pub fn at_most(max: f64) -> Self {
                Self {
                    limits: Limits {
                        min: None,
                        max: Some(max),
                    },
                }
            }
        }

        impl ContourFilter for $name {
            fn keep(&self, contour: &Contour) -> bool {
                let measure: fn(&Contour) -> Option<f64> = $measure;
                measure(contour).is_some_and(|value| self.limits.contains(value))
            }
        }
    };
}

limit_filter!(
    /// Keeps contours whose enclosed area is within the limits.
    Area,
    |c| Some(area(c))
);

limit_filter!(
    /// Keeps contours whose fitted ellipse eccentricity is within the limits.
    /// Contours with fewer than five points are dropped.
    Eccentricity,
    eccentricity
);

limit_filter!(
    /// Keeps contours whose area over convex hull area is within the limits.
    Solidity,
    solidity
);

/// Runs each filter over the survivors of the previous one.
pub fn apply_filters(contours: &[Contour], filters: &[&dyn ContourFilter]) -> Vec<Contour> {
    let mut kept = contours.to_vec();
    for filter in filters {
        kept = filter.apply(&kept);
    }
    kept
}
