use serde::{Deserialize, Serialize};
use std::fmt;

/// Question categories of the geometry benchmark.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Category {
    #[serde(rename = "Position")]
    Position,
    #[serde(rename = "Geometry Shape")]
    GeometryShape,
    #[serde(rename = "Geometric Relationship")]
    GeometricRelationship,
}

impl Category {
    pub fn all() -> Vec<Category> {
        vec![
            Category::Position,
            Category::GeometryShape,
            Category::GeometricRelationship,
        ]
    }

    /// Label used in datasets, log directories and summaries.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Position => "Position",
            Category::GeometryShape => "Geometry Shape",
            Category::GeometricRelationship => "Geometric Relationship",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::all()
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown question category: {}", s))
    }
}
