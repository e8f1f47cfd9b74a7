//! Status and classification enums for catalog entities.
//!
//! Statuses are stored as text columns; each enum carries `Display` and
//! `FromStr` impls for the database round-trip.

use serde::{Deserialize, Serialize};

/// Order lifecycle status.
///
/// Orders are created in `Processing` by the checkout orchestrator once a
/// checkout session completes. `Processing` is terminal-success for this
/// system's scope; `Cancelled` is terminal-failure (payment failed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Processing,
    Cancelled,
}

/// Proposal lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProposalStatus {
    #[default]
    Draft,
    Sent,
    Accepted,
    Rejected,
}

/// Skill level a curated kit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
}

/// Smart-home voice/control platform a kit is bundled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Ecosystem {
    Google,
    Alexa,
}

/// Editorial content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentType {
    Guide,
    Blog,
    Faq,
}

/// Kind of AI-generated draft content.
///
/// Wire values are lowercase (`guide`, `product_review`, ...), matching the
/// generation request body rather than a database column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratedContentKind {
    Guide,
    ProductReview,
    Troubleshooting,
    Comparison,
}

/// User role with different permission levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// Regular shopper.
    #[default]
    Customer,
    /// Access to catalog maintenance endpoints.
    Admin,
}

macro_rules! text_enum {
    ($ty:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($text)),+
                }
            }
        }

        impl std::str::FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(format!(concat!("invalid ", stringify!($ty), ": {}"), s)),
                }
            }
        }
    };
}

text_enum!(OrderStatus {
    Processing => "PROCESSING",
    Cancelled => "CANCELLED",
});

text_enum!(ProposalStatus {
    Draft => "DRAFT",
    Sent => "SENT",
    Accepted => "ACCEPTED",
    Rejected => "REJECTED",
});

text_enum!(SkillLevel {
    Beginner => "BEGINNER",
    Intermediate => "INTERMEDIATE",
    Advanced => "ADVANCED",
});

text_enum!(Ecosystem {
    Google => "GOOGLE",
    Alexa => "ALEXA",
});

text_enum!(ContentType {
    Guide => "GUIDE",
    Blog => "BLOG",
    Faq => "FAQ",
});

text_enum!(GeneratedContentKind {
    Guide => "guide",
    ProductReview => "product_review",
    Troubleshooting => "troubleshooting",
    Comparison => "comparison",
});

text_enum!(UserRole {
    Customer => "CUSTOMER",
    Admin => "ADMIN",
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_text_roundtrip() {
        assert_eq!(OrderStatus::Processing.to_string(), "PROCESSING");
        assert_eq!("CANCELLED".parse::<OrderStatus>(), Ok(OrderStatus::Cancelled));
        assert_eq!("DRAFT".parse::<ProposalStatus>(), Ok(ProposalStatus::Draft));
        assert_eq!(UserRole::Admin.to_string(), "ADMIN");
        assert!("SHIPPED".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_status_serde_screaming_snake() {
        let json = serde_json::to_string(&ProposalStatus::Accepted).expect("serialize");
        assert_eq!(json, "\"ACCEPTED\"");
        let eco: Ecosystem = serde_json::from_str("\"GOOGLE\"").expect("deserialize");
        assert_eq!(eco, Ecosystem::Google);
    }
}
