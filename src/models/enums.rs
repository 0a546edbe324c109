use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(VisitType {
    Inpatient => "IP",
    Outpatient => "OP",
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn visit_type_round_trip() {
        for (variant, s) in [(VisitType::Inpatient, "IP"), (VisitType::Outpatient, "OP")] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(VisitType::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn visit_type_serializes_as_code() {
        let json = serde_json::to_string(&VisitType::Inpatient).unwrap();
        assert_eq!(json, "\"IP\"");
        let parsed: VisitType = serde_json::from_str("\"OP\"").unwrap();
        assert_eq!(parsed, VisitType::Outpatient);
    }

    #[test]
    fn invalid_enum_returns_error() {
        assert!(VisitType::from_str("XX").is_err());
        assert!(VisitType::from_str("ip").is_err());
        assert!(VisitType::from_str("").is_err());
    }
}
