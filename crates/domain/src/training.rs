use derive_more::{Display, Into};

#[derive(Debug, Default, Display, Clone, Copy, Into, PartialEq, Eq, PartialOrd, Ord)]
pub struct Reps(u32);

impl Reps {
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }
}

impl TryFrom<&str> for Reps {
    type Error = RepsError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().parse::<u32>() {
            Ok(parsed_value) => Ok(Reps::new(parsed_value)),
            Err(_) => Err(RepsError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RepsError {
    #[error("Reps must be a non-negative integer")]
    ParseError,
}

#[derive(Debug, Default, Display, Clone, Copy, Into, PartialEq, PartialOrd)]
pub struct Weight(f32);

impl Weight {
    pub fn new(value: f32) -> Result<Self, WeightError> {
        if !value.is_finite() || value < 0.0 {
            return Err(WeightError::OutOfRange);
        }

        Ok(Self(value))
    }

    /// Parse user input where a blank field means "no weight".
    pub fn parse_optional(value: &str) -> Result<Option<Self>, WeightError> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(None);
        }
        Weight::try_from(value).map(Some)
    }
}

impl TryFrom<&str> for Weight {
    type Error = WeightError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().parse::<f32>() {
            Ok(parsed_value) => Weight::new(parsed_value),
            Err(_) => Err(WeightError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum WeightError {
    #[error("Weight must not be negative")]
    OutOfRange,
    #[error("Weight must be a decimal")]
    ParseError,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("0", Ok(Reps(0)))]
    #[case(" 8 ", Ok(Reps(8)))]
    #[case("999", Ok(Reps(999)))]
    #[case("1000", Ok(Reps(1000)))]
    #[case("-1", Err(RepsError::ParseError))]
    #[case("8.5", Err(RepsError::ParseError))]
    fn test_reps_try_from_str(#[case] value: &str, #[case] expected: Result<Reps, RepsError>) {
        assert_eq!(Reps::try_from(value), expected);
    }

    #[rstest]
    #[case("100", Ok(Weight(100.0)))]
    #[case("102.5", Ok(Weight(102.5)))]
    #[case("0.1", Ok(Weight(0.1)))]
    #[case("999.9", Ok(Weight(999.9)))]
    #[case("21.25", Ok(Weight(21.25)))]
    #[case("1000", Ok(Weight(1000.0)))]
    #[case("1000.0", Ok(Weight(1000.0)))]
    #[case("-2.5", Err(WeightError::OutOfRange))]
    #[case("inf", Err(WeightError::OutOfRange))]
    #[case("NaN", Err(WeightError::OutOfRange))]
    #[case("heavy", Err(WeightError::ParseError))]
    fn test_weight_try_from_str(
        #[case] value: &str,
        #[case] expected: Result<Weight, WeightError>,
    ) {
        assert_eq!(Weight::try_from(value), expected);
    }

    #[rstest]
    #[case("", Ok(None))]
    #[case("   ", Ok(None))]
    #[case("0", Ok(Some(Weight(0.0))))]
    #[case("60", Ok(Some(Weight(60.0))))]
    #[case("x", Err(WeightError::ParseError))]
    fn test_weight_parse_optional(
        #[case] value: &str,
        #[case] expected: Result<Option<Weight>, WeightError>,
    ) {
        assert_eq!(Weight::parse_optional(value), expected);
    }

    #[test]
    fn test_weight_display() {
        assert_eq!(Weight(100.0).to_string(), "100");
        assert_eq!(Weight(102.5).to_string(), "102.5");
        assert_eq!(Weight(21.25).to_string(), "21.25");
    }

    #[rstest]
    #[case(0, Reps(0))]
    #[case(1000, Reps(1000))]
    #[case(u32::MAX, Reps(u32::MAX))]
    fn test_reps_new(#[case] value: u32, #[case] expected: Reps) {
        assert_eq!(Reps::new(value), expected);
    }
}
