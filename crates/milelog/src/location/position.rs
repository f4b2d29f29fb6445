//! Position sources available from a terminal.

use async_trait::async_trait;

use super::{Coordinates, LocationError, PositionSource, Result};

/// Reports the same position on every call.
///
/// Used when coordinates come from configuration or the command line.
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition {
    coords: Coordinates,
}

impl FixedPosition {
    /// Report `coords` as the device position.
    #[must_use]
    pub fn new(coords: Coordinates) -> Self {
        Self { coords }
    }
}

#[async_trait]
impl PositionSource for FixedPosition {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn current_position(&self) -> Result<Coordinates> {
        Ok(self.coords)
    }
}

/// A platform with no way to report its position.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailablePosition;

#[async_trait]
impl PositionSource for UnavailablePosition {
    fn name(&self) -> &'static str {
        "unavailable"
    }

    async fn current_position(&self) -> Result<Coordinates> {
        Err(LocationError::Unsupported)
    }
}
