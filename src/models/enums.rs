use crate::db::DatabaseError;

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// Extra literals after `|` are accepted when parsing but never written.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal $(| $alias:literal)*),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
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
                    $($s $(| $alias)* => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = <String as serde::Deserialize>::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

// Descriptive only: slot generation ignores it.
str_enum!(Frequency {
    Daily => "Daily",
    AsNeeded => "As-Needed" | "As Needed",
});

impl Default for Frequency {
    fn default() -> Self {
        Self::Daily
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn frequency_round_trip() {
        for (variant, s) in [
            (Frequency::Daily, "Daily"),
            (Frequency::AsNeeded, "As-Needed"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(Frequency::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn frequency_accepts_spaced_label() {
        assert_eq!(Frequency::from_str("As Needed").unwrap(), Frequency::AsNeeded);
    }

    #[test]
    fn invalid_frequency_returns_error() {
        let result = Frequency::from_str("weekly");
        assert!(matches!(result, Err(DatabaseError::InvalidEnum { .. })));
    }

    #[test]
    fn frequency_serializes_as_label() {
        let json = serde_json::to_string(&Frequency::AsNeeded).unwrap();
        assert_eq!(json, "\"As-Needed\"");
        let parsed: Frequency = serde_json::from_str("\"Daily\"").unwrap();
        assert_eq!(parsed, Frequency::Daily);
        assert!(serde_json::from_str::<Frequency>("\"Hourly\"").is_err());
    }
}
