use sdb_gate::GateError;

/// Errors raised while matching a barcode name.
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    /// An unprefixed barcode name did not fit any known layout.
    #[error("no pattern matches barcode name {barcode}; implement new case")]
    PatternExtraction { barcode: String },

    /// Asking for a confirmation failed.
    #[error(transparent)]
    Gate(#[from] GateError),
}
