/// Convenience result type used across the crate.
pub type HudResult<T> = Result<T, HudError>;

/// Top-level error taxonomy used by track loading, interpolation and HUD rendering.
#[derive(thiserror::Error, Debug)]
pub enum HudError {
    /// The parsed track contained no waypoints.
    #[error("empty track: no waypoints after load")]
    EmptyTrack,

    /// The track source could not be read or is corrupt.
    #[error("malformed source: {0}")]
    MalformedSource(String),

    /// No bracketing waypoint pair with positive duration exists for a query time.
    #[error("degenerate segment: no positive-duration waypoint pair brackets t={target_s}s")]
    DegenerateSegment {
        /// Absolute track time (seconds) that could not be bracketed.
        target_s: f64,
    },

    /// Invalid user-provided configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Failure inside the cosmetic spatial warp. Always recovered by the compositor.
    #[error("warp error: {0}")]
    Warp(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HudError {
    /// Build a [`HudError::MalformedSource`] value.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedSource(msg.into())
    }

    /// Build a [`HudError::InvalidConfiguration`] value.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Build a [`HudError::Warp`] value.
    pub fn warp(msg: impl Into<String>) -> Self {
        Self::Warp(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
