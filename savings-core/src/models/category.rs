use std::fmt;

use serde::{Deserialize, Serialize};

/// One billable service line. The set is closed: every portfolio holds
/// exactly one record per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKey {
    Internet,
    Voice,
    Video,
    AccessControl,
    Wifi,
}

impl CategoryKey {
    pub const COUNT: usize = 5;

    /// Every key, in display order.
    pub const ALL: [CategoryKey; Self::COUNT] = [
        Self::Internet,
        Self::Voice,
        Self::Video,
        Self::AccessControl,
        Self::Wifi,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Internet => "internet",
            Self::Voice => "voice",
            Self::Video => "video",
            Self::AccessControl => "access_control",
            Self::Wifi => "wifi",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "internet" => Some(Self::Internet),
            "voice" => Some(Self::Voice),
            "video" => Some(Self::Video),
            "access_control" => Some(Self::AccessControl),
            "wifi" => Some(Self::Wifi),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Internet => "Bulk Internet",
            Self::Voice => "Voice Lines",
            Self::Video => "Video",
            Self::AccessControl => "Access Control",
            Self::Wifi => "Managed Wi-Fi",
        }
    }

    /// Label of the one-time-style benefit this category folds into its
    /// annual savings, if it has one.
    pub fn named_benefit_label(&self) -> Option<&'static str> {
        match self {
            Self::AccessControl => Some("Activation credit"),
            _ => None,
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for CategoryKey {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How `current_monthly` / `proposed_monthly` are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PricingMode {
    /// Absolute monthly totals.
    Flat,
    /// Per-unit rates, multiplied by `units`.
    #[default]
    PerUnit,
}

impl PricingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flat => "flat",
            Self::PerUnit => "perUnit",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "flat" => Some(Self::Flat),
            "perUnit" | "per_unit" => Some(Self::PerUnit),
            _ => None,
        }
    }
}

/// Agreement selector used by the internet category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgreementType {
    #[default]
    Standard,
    /// The current rate is the retail price residents pay today.
    Resale,
}

impl AgreementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Resale => "resale",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "standard" => Some(Self::Standard),
            "resale" => Some(Self::Resale),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn category_key_round_trips_through_str() {
        for key in CategoryKey::ALL {
            assert_eq!(CategoryKey::parse(key.as_str()), Some(key));
        }
    }

    #[test]
    fn category_key_rejects_unknown() {
        assert_eq!(CategoryKey::parse("fax"), None);
        assert_eq!(CategoryKey::parse("Internet"), None);
    }

    #[test]
    fn category_key_index_matches_display_order() {
        for (idx, key) in CategoryKey::ALL.iter().enumerate() {
            assert_eq!(key.index(), idx);
        }
    }

    #[test]
    fn only_access_control_has_named_benefit() {
        let with_benefit: Vec<_> = CategoryKey::ALL
            .iter()
            .filter(|k| k.named_benefit_label().is_some())
            .collect();

        assert_eq!(with_benefit, vec![&CategoryKey::AccessControl]);
    }

    #[test]
    fn pricing_mode_accepts_both_spellings_of_per_unit() {
        assert_eq!(PricingMode::parse("perUnit"), Some(PricingMode::PerUnit));
        assert_eq!(PricingMode::parse("per_unit"), Some(PricingMode::PerUnit));
        assert_eq!(PricingMode::parse("flat"), Some(PricingMode::Flat));
        assert_eq!(PricingMode::parse("monthly"), None);
    }
}
