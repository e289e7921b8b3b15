//! Resource kinds and the fixed Resource ↔ color bijection used by patterns.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::building::ParseNameError;

pub const NUM_RESOURCES: usize = 5;

/// A resource token placed on an empty cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Resource {
    Wheat,
    Brick,
    Glass,
    Wood,
    Stone,
}

/// Color tag used by building patterns. Exactly one per resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Yellow,
    Red,
    Blue,
    Brown,
    Gray,
}

impl Resource {
    /// All resources in deck order.
    pub const ALL: [Resource; NUM_RESOURCES] = [
        Resource::Wheat,
        Resource::Brick,
        Resource::Glass,
        Resource::Wood,
        Resource::Stone,
    ];

    pub fn color(self) -> Color {
        match self {
            Resource::Wheat => Color::Yellow,
            Resource::Brick => Color::Red,
            Resource::Glass => Color::Blue,
            Resource::Wood => Color::Brown,
            Resource::Stone => Color::Gray,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Resource::Wheat => "Wheat",
            Resource::Brick => "Brick",
            Resource::Glass => "Glass",
            Resource::Wood => "Wood",
            Resource::Stone => "Stone",
        }
    }
}

impl Color {
    pub fn resource(self) -> Resource {
        match self {
            Color::Yellow => Resource::Wheat,
            Color::Red => Resource::Brick,
            Color::Blue => Resource::Glass,
            Color::Brown => Resource::Wood,
            Color::Gray => Resource::Stone,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Color::Yellow => "yellow",
            Color::Red => "red",
            Color::Blue => "blue",
            Color::Brown => "brown",
            Color::Gray => "gray",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for Resource {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Resource::ALL
            .iter()
            .copied()
            .find(|r| r.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseNameError::Resource(trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_mapping_is_a_bijection() {
        for r in Resource::ALL {
            assert_eq!(r.color().resource(), r);
        }
        let mut colors: Vec<Color> = Resource::ALL.iter().map(|r| r.color()).collect();
        colors.sort();
        colors.dedup();
        assert_eq!(colors.len(), NUM_RESOURCES);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("wheat".parse::<Resource>().unwrap(), Resource::Wheat);
        assert_eq!(" Stone ".parse::<Resource>().unwrap(), Resource::Stone);
        assert!("Gold".parse::<Resource>().is_err());
    }
}
