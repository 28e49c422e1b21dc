use derive_more::{AsRef, Display};

#[derive(AsRef, Debug, Display, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Name(String);

impl Name {
    pub fn new(name: &str) -> Result<Self, NameError> {
        let trimmed_name = name.trim();

        if trimmed_name.is_empty() {
            return Err(NameError::Empty);
        }

        Ok(Name(trimmed_name.to_string()))
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum NameError {
    #[error("Name must not be empty")]
    Empty,
}

/// Free text that is stored as null when blank.
#[derive(AsRef, Debug, Display, Clone, PartialEq, Eq)]
pub struct Description(String);

impl Description {
    #[must_use]
    pub fn new(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Description(trimmed.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("Push Day", Ok(Name("Push Day".to_string())))]
    #[case("  Legs  ", Ok(Name("Legs".to_string())))]
    #[case("", Err(NameError::Empty))]
    #[case(" \t ", Err(NameError::Empty))]
    #[case(
        " Single-Arm Dumbbell Row on Incline Bench with Neutral Grip Pause Hold ",
        Ok(Name(
            "Single-Arm Dumbbell Row on Incline Bench with Neutral Grip Pause Hold".to_string()
        ))
    )]
    fn test_name_new(#[case] name: &str, #[case] expected: Result<Name, NameError>) {
        assert_eq!(Name::new(name), expected);
    }

    #[rstest]
    #[case("", None)]
    #[case("   ", None)]
    #[case(" heavy week ", Some(Description("heavy week".to_string())))]
    fn test_description_new(#[case] text: &str, #[case] expected: Option<Description>) {
        assert_eq!(Description::new(text), expected);
    }
}
