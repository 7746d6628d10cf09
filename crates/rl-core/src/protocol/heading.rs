use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Compass facing of the robot or of an obstacle's marked side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Heading {
    #[serde(rename = "N")]
    North,
    #[serde(rename = "E")]
    East,
    #[serde(rename = "S")]
    South,
    #[serde(rename = "W")]
    West,
}

impl Heading {
    pub fn as_letter(self) -> &'static str {
        match self {
            Heading::North => "N",
            Heading::East => "E",
            Heading::South => "S",
            Heading::West => "W",
        }
    }
}

impl fmt::Display for Heading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_letter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid heading `{0}` (expected one of N, E, S, W)")]
pub struct InvalidHeading(pub String);

impl FromStr for Heading {
    type Err = InvalidHeading;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "N" => Ok(Heading::North),
            "E" => Ok(Heading::East),
            "S" => Ok(Heading::South),
            "W" => Ok(Heading::West),
            _ => Err(InvalidHeading(s.trim().to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_letters_case_insensitively() {
        assert_eq!("n".parse::<Heading>().unwrap(), Heading::North);
        assert_eq!(" W ".parse::<Heading>().unwrap(), Heading::West);
        assert!("Q".parse::<Heading>().is_err());
        assert!("NE".parse::<Heading>().is_err());
    }
}
