use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCondition {
    Good,
    Fair,
    Poor,
    VeryPoor,
}

impl ItemCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemCondition::Good => "good",
            ItemCondition::Fair => "fair",
            ItemCondition::Poor => "poor",
            ItemCondition::VeryPoor => "very_poor",
        }
    }
}

impl fmt::Display for ItemCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ItemCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "good" => Ok(ItemCondition::Good),
            "fair" => Ok(ItemCondition::Fair),
            "poor" => Ok(ItemCondition::Poor),
            "very_poor" => Ok(ItemCondition::VeryPoor),
            other => Err(format!("Unknown item condition: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_its_own_representation() {
        for condition in [
            ItemCondition::Good,
            ItemCondition::Fair,
            ItemCondition::Poor,
            ItemCondition::VeryPoor,
        ] {
            assert_eq!(condition.as_str().parse::<ItemCondition>(), Ok(condition));
        }
        assert!("broken".parse::<ItemCondition>().is_err());
    }
}
