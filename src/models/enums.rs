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

str_enum!(OrganType {
    Kidney => "kidney",
    Liver => "liver",
    Heart => "heart",
    Lung => "lung",
    Cornea => "cornea",
    Pancreas => "pancreas",
    Intestine => "intestine",
});

str_enum!(BloodGroup {
    ONegative => "O-",
    OPositive => "O+",
    ANegative => "A-",
    APositive => "A+",
    BNegative => "B-",
    BPositive => "B+",
    AbNegative => "AB-",
    AbPositive => "AB+",
});

impl BloodGroup {
    pub const ALL: [BloodGroup; 8] = [
        BloodGroup::ONegative,
        BloodGroup::OPositive,
        BloodGroup::ANegative,
        BloodGroup::APositive,
        BloodGroup::BNegative,
        BloodGroup::BPositive,
        BloodGroup::AbNegative,
        BloodGroup::AbPositive,
    ];
}

str_enum!(Gender {
    Male => "male",
    Female => "female",
    Other => "other",
});

str_enum!(RequestStatus {
    Pending => "pending",
    Matched => "matched",
    Fulfilled => "fulfilled",
    Rejected => "rejected",
});

str_enum!(AdminConfirmation {
    Pending => "pending",
    Fulfilled => "fulfilled",
    Rejected => "rejected",
});

str_enum!(UrgencyLevel {
    Low => "low",
    Medium => "medium",
    High => "high",
    Critical => "critical",
});

str_enum!(AdminRole {
    Admin => "admin",
    Hospital => "hospital",
    Medical => "medical",
});

str_enum!(MatchStatus {
    AwaitingApproval => "awaiting-approval",
    Approved => "approved",
    Rejected => "rejected",
    Completed => "completed",
});
