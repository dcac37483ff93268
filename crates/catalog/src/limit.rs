//! Admission size limits.

use derive_more::Display;

/// One mebibyte. Size limits are binary megabytes, matching how the
/// admission messages report sizes.
pub const MIB: u64 = 1_048_576;

/// Selectable size limit for admission and catalog filtering.
///
/// The limit is inclusive: a document of exactly `bytes()` is admitted.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum SizeLimit {
    #[display("3MB")]
    Mb3,
    #[display("5MB")]
    Mb5,
}

impl SizeLimit {
    /// The limit in whole megabytes.
    pub const fn megabytes(self) -> u64 {
        match self {
            Self::Mb3 => 3,
            Self::Mb5 => 5,
        }
    }

    /// The limit in bytes.
    pub const fn bytes(self) -> u64 {
        self.megabytes() * MIB
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(SizeLimit::Mb3, 3, 3_145_728)]
    #[case(SizeLimit::Mb5, 5, 5_242_880)]
    fn test_limit_conversions(#[case] limit: SizeLimit, #[case] mb: u64, #[case] bytes: u64) {
        assert_eq!(limit.megabytes(), mb);
        assert_eq!(limit.bytes(), bytes);
    }

    #[rstest]
    #[case(SizeLimit::Mb3, "3MB")]
    #[case(SizeLimit::Mb5, "5MB")]
    fn test_limit_display(#[case] limit: SizeLimit, #[case] expected: &str) {
        assert_eq!(limit.to_string(), expected);
    }
}
