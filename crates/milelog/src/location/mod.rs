//! Location lookup for journey start and end points.
//!
//! A lookup is two sequential suspension points: a [`PositionSource`]
//! acquires device coordinates, then a [`LabelResolver`] turns them into a
//! human-readable label. Only the first can fail the lookup; a failed or
//! empty label lookup degrades to [`fallback_label`].

mod position;
mod postcodes;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

pub use position::{FixedPosition, UnavailablePosition};
pub use postcodes::{CoordinateLabels, PostcodesIoResolver};

/// Errors that can occur during a location lookup.
#[derive(Debug, Error)]
pub enum LocationError {
    /// The user or platform refused access to the position.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// This platform cannot report a position.
    #[error("geolocation not supported")]
    Unsupported,

    /// Coordinates outside the valid range.
    #[error("invalid coordinates: {latitude}, {longitude}")]
    InvalidCoordinates {
        /// Latitude in degrees.
        latitude: f64,
        /// Longitude in degrees.
        longitude: f64,
    },

    /// The label service could not be reached or answered badly.
    #[error("label lookup failed: {0}")]
    Lookup(String),

    /// The label service had nothing near these coordinates.
    #[error("no label found near {0}")]
    NoResult(Coordinates),
}

impl From<LocationError> for crate::Error {
    fn from(err: LocationError) -> Self {
        Self::location_unavailable(err.to_string())
    }
}

/// Result type for location operations.
pub type Result<T> = std::result::Result<T, LocationError>;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    /// Create coordinates, rejecting values outside the globe.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError::InvalidCoordinates`] when a value is not
    /// finite or out of range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        if valid {
            Ok(Self {
                latitude,
                longitude,
            })
        } else {
            Err(LocationError::InvalidCoordinates {
                latitude,
                longitude,
            })
        }
    }

    /// Latitude in degrees.
    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// The label used when no better one can be resolved.
#[must_use]
pub fn fallback_label(coords: Coordinates) -> String {
    format!("Location: {coords}")
}

/// Acquires the device's current position.
#[async_trait]
pub trait PositionSource: Send + Sync {
    /// The name of this source (for logging/debugging).
    fn name(&self) -> &'static str;

    /// Get the current position.
    ///
    /// # Errors
    ///
    /// Returns an error if no position can be acquired.
    async fn current_position(&self) -> Result<Coordinates>;
}

/// Turns coordinates into a location label.
#[async_trait]
pub trait LabelResolver: Send + Sync {
    /// The name of this resolver (for logging/debugging).
    fn name(&self) -> &'static str;

    /// Resolve a label for `coords`.
    ///
    /// # Errors
    ///
    /// Returns an error when the service fails or has no result; the
    /// [`Locator`] substitutes [`fallback_label`].
    async fn resolve(&self, coords: Coordinates) -> Result<String>;
}

/// A position source paired with a label resolver.
pub struct Locator {
    position: Box<dyn PositionSource>,
    labels: Box<dyn LabelResolver>,
}

impl std::fmt::Debug for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Locator")
            .field("position", &self.position.name())
            .field("labels", &self.labels.name())
            .finish()
    }
}

impl Locator {
    /// Combine a position source and a label resolver.
    #[must_use]
    pub fn new(position: Box<dyn PositionSource>, labels: Box<dyn LabelResolver>) -> Self {
        Self { position, labels }
    }

    /// Look up the label for the current position.
    ///
    /// # Errors
    ///
    /// Returns an error only when the position itself is unavailable.
    pub async fn locate(&self) -> Result<String> {
        let coords = self.position.current_position().await?;
        debug!(source = self.position.name(), %coords, "Acquired position");

        match self.labels.resolve(coords).await {
            Ok(label) => Ok(label),
            Err(e) => {
                warn!(
                    resolver = self.labels.name(),
                    error = %e,
                    "Label lookup failed, falling back to coordinates"
                );
                Ok(fallback_label(coords))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct FailingLabels;

    #[async_trait]
    impl LabelResolver for FailingLabels {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn resolve(&self, _coords: Coordinates) -> Result<String> {
            Err(LocationError::Lookup("connection refused".to_string()))
        }
    }

    #[derive(Debug)]
    struct FixedLabel(&'static str);

    #[async_trait]
    impl LabelResolver for FixedLabel {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn resolve(&self, _coords: Coordinates) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    fn westminster() -> Coordinates {
        Coordinates::new(51.501_009, -0.141_588).unwrap()
    }

    #[test]
    fn test_coordinates_range() {
        assert!(Coordinates::new(0.0, 0.0).is_ok());
        assert!(Coordinates::new(-90.0, 180.0).is_ok());
        assert!(Coordinates::new(90.1, 0.0).is_err());
        assert!(Coordinates::new(0.0, -180.5).is_err());
        assert!(Coordinates::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_fallback_label_four_decimals() {
        assert_eq!(fallback_label(westminster()), "Location: 51.5010, -0.1416");
    }

    #[tokio::test]
    async fn test_locate_uses_resolved_label() {
        let locator = Locator::new(
            Box::new(FixedPosition::new(westminster())),
            Box::new(FixedLabel("SW1A 1AA")),
        );
        assert_eq!(locator.locate().await.unwrap(), "SW1A 1AA");
    }

    #[tokio::test]
    async fn test_locate_falls_back_when_lookup_fails() {
        let locator = Locator::new(
            Box::new(FixedPosition::new(westminster())),
            Box::new(FailingLabels),
        );
        assert_eq!(locator.locate().await.unwrap(), "Location: 51.5010, -0.1416");
    }

    #[tokio::test]
    async fn test_locate_fails_without_position() {
        let locator = Locator::new(Box::new(UnavailablePosition), Box::new(FixedLabel("x")));
        let err = locator.locate().await.unwrap_err();
        assert!(matches!(err, LocationError::Unsupported));
    }

    #[test]
    fn test_location_error_into_crate_error() {
        let err: crate::Error = LocationError::PermissionDenied("user declined".to_string()).into();
        assert!(err.is_location_unavailable());
        assert!(err.to_string().contains("user declined"));
    }

    #[test]
    fn test_locator_debug_names_parts() {
        let locator = Locator::new(Box::new(UnavailablePosition), Box::new(CoordinateLabels));
        let debug_str = format!("{locator:?}");
        assert!(debug_str.contains("unavailable"));
        assert!(debug_str.contains("coordinates"));
    }
}
