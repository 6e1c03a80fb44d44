use std::fmt::{Display, Error, Formatter};

// Error
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum SymbolError {
    // Configuration
    InvalidEccSymbols,
    InvalidChunkSize,
    InvalidFieldExponent,
    PrimitivePolyNotFound,
    SymbolOutOfField,
    MessageTooLong,
    InvalidSize,
    InvalidFinderLevel,
    InvalidModuleSize,
    LayoutMismatch,

    // Capacity
    CapacityExceeded,

    // Correction
    DivisionByZero,
    TooManyErasures,
    TooManyErrors,
    LocatorMismatch,
    ZeroErrorLocatorDerivative,
    UncorrectableMessage,

    // Geometry
    OrientationNotFound,
    InsufficientWidth,
}

/// Coarse failure classes. Callers branch on the kind rather than on the exact variant.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum ErrorKind {
    /// Invalid codec, field or geometry parameters. Fatal, never retried.
    Configuration,
    /// The payload cannot fit even after truncation.
    Capacity,
    /// Reed-Solomon correction failed for this decode call.
    Correction,
    /// The raster could not be located or normalized.
    Geometry,
}

impl SymbolError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidEccSymbols
            | Self::InvalidChunkSize
            | Self::InvalidFieldExponent
            | Self::PrimitivePolyNotFound
            | Self::SymbolOutOfField
            | Self::MessageTooLong
            | Self::InvalidSize
            | Self::InvalidFinderLevel
            | Self::InvalidModuleSize
            | Self::LayoutMismatch => ErrorKind::Configuration,

            Self::CapacityExceeded => ErrorKind::Capacity,

            Self::DivisionByZero
            | Self::TooManyErasures
            | Self::TooManyErrors
            | Self::LocatorMismatch
            | Self::ZeroErrorLocatorDerivative
            | Self::UncorrectableMessage => ErrorKind::Correction,

            Self::OrientationNotFound | Self::InsufficientWidth => ErrorKind::Geometry,
        }
    }
}

impl Display for SymbolError {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        let msg = match *self {
            // Configuration
            Self::InvalidEccSymbols => "ECC symbol count must satisfy 0 < nsym < chunk size",
            Self::InvalidChunkSize => "Chunk size exceeds the field size",
            Self::InvalidFieldExponent => "Unsupported field exponent",
            Self::PrimitivePolyNotFound => "No primitive polynomial found for the field",
            Self::SymbolOutOfField => "Symbol value does not fit in the field",
            Self::MessageTooLong => "Message chunk is longer than the field allows",
            Self::InvalidSize => "Invalid symbol size",
            Self::InvalidFinderLevel => "Invalid finder level",
            Self::InvalidModuleSize => "Module pixel size must be positive",
            Self::LayoutMismatch => "Canvas does not belong to this layout",

            // Capacity
            Self::CapacityExceeded => "No room left for payload data",

            // Correction
            Self::DivisionByZero => "Division by zero in the Galois field",
            Self::TooManyErasures => "Too many erasures to correct",
            Self::TooManyErrors => "Too many errors to correct",
            Self::LocatorMismatch => "Error locator roots don't match its degree",
            Self::ZeroErrorLocatorDerivative => "Error locator derivative is zero",
            Self::UncorrectableMessage => "Message could not be corrected",

            // Geometry
            Self::OrientationNotFound => "Could not detect orientation from finder pattern",
            Self::InsufficientWidth => "Raster too narrow to hold the finder pattern",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for SymbolError {}

pub type SymbolResult<T> = Result<T, SymbolError>;

#[cfg(test)]
mod error_tests {
    use super::{ErrorKind, SymbolError};

    #[test]
    fn test_kind() {
        assert_eq!(SymbolError::InvalidEccSymbols.kind(), ErrorKind::Configuration);
        assert_eq!(SymbolError::CapacityExceeded.kind(), ErrorKind::Capacity);
        assert_eq!(SymbolError::LocatorMismatch.kind(), ErrorKind::Correction);
        assert_eq!(SymbolError::InsufficientWidth.kind(), ErrorKind::Geometry);
    }

    #[test]
    fn test_display() {
        assert_eq!(SymbolError::TooManyErrors.to_string(), "Too many errors to correct");
    }
}
