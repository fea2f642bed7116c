use serde::{Deserialize, Serialize};

use crate::constants::{TIER2_LEVEL, TIER3_LEVEL, XP_PER_QUESTION_BASE};

/// Quiz difficulty tier. Serialized as its numeric value (1..=3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Tier {
    Basic,
    Intermediate,
    Advanced,
}

impl Tier {
    /// Tier a player of `level` is served: tier 2 from level 3, tier 3 from
    /// level 6.
    pub fn for_level(level: u32) -> Tier {
        if level >= TIER3_LEVEL {
            Tier::Advanced
        } else if level >= TIER2_LEVEL {
            Tier::Intermediate
        } else {
            Tier::Basic
        }
    }

    /// XP granted per correctly answerable question at this tier.
    pub fn xp_per_question(self) -> i64 {
        XP_PER_QUESTION_BASE * u8::from(self) as i64
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::Basic => "Easy",
            Tier::Intermediate => "Medium",
            Tier::Advanced => "Hard",
        }
    }
}

impl From<Tier> for u8 {
    fn from(tier: Tier) -> u8 {
        match tier {
            Tier::Basic => 1,
            Tier::Intermediate => 2,
            Tier::Advanced => 3,
        }
    }
}

impl TryFrom<u8> for Tier {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Tier::Basic),
            2 => Ok(Tier::Intermediate),
            3 => Ok(Tier::Advanced),
            other => Err(format!("invalid quiz tier {other}")),
        }
    }
}

/// One multiple-choice question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "q")]
    pub prompt: String,
    pub options: Vec<String>,
    pub correct: usize,
    pub tier: Tier,
}

impl Question {
    /// Generated content can be malformed; reject anything without exactly
    /// four options or with an out-of-range answer index.
    pub fn is_well_formed(&self) -> bool {
        !self.prompt.is_empty() && self.options.len() == 4 && self.correct < self.options.len()
    }
}

/// An assembled quiz ready to run.
#[derive(Debug, Clone, PartialEq)]
pub struct Quiz {
    pub topic: String,
    pub questions: Vec<Question>,
    pub xp_reward: i64,
    pub tier: Tier,
}

impl Quiz {
    pub fn difficulty(&self) -> &'static str {
        self.tier.label()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_thresholds() {
        assert_eq!(Tier::for_level(1), Tier::Basic);
        assert_eq!(Tier::for_level(2), Tier::Basic);
        assert_eq!(Tier::for_level(3), Tier::Intermediate);
        assert_eq!(Tier::for_level(5), Tier::Intermediate);
        assert_eq!(Tier::for_level(6), Tier::Advanced);
        assert_eq!(Tier::for_level(10), Tier::Advanced);
    }

    #[test]
    fn xp_per_question_scales_with_tier() {
        assert_eq!(Tier::Basic.xp_per_question(), 10);
        assert_eq!(Tier::Intermediate.xp_per_question(), 20);
        assert_eq!(Tier::Advanced.xp_per_question(), 30);
    }

    #[test]
    fn malformed_questions_rejected() {
        let q = Question {
            prompt: "What is 2 + 2?".into(),
            options: vec!["3".into(), "4".into(), "5".into(), "6".into()],
            correct: 1,
            tier: Tier::Basic,
        };
        assert!(q.is_well_formed());

        let mut missing_option = q.clone();
        missing_option.options.pop();
        assert!(!missing_option.is_well_formed());

        let mut bad_index = q;
        bad_index.correct = 4;
        assert!(!bad_index.is_well_formed());
    }
}
