use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{BloodGroup, Gender};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Donor {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub age: u32,
    pub weight: f64,
    pub height: f64,
    pub gender: Gender,
    pub blood_group: BloodGroup,
    pub location: Option<String>,
    pub is_verified: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub age: u32,
    pub weight: f64,
    pub height: f64,
    pub gender: Gender,
    pub blood_group: BloodGroup,
    pub location: Option<String>,
    pub is_verified: bool,
    pub created_at: NaiveDateTime,
}

/// The clinical attributes the matching engine compares, read fresh from
/// the donor or recipient row rather than trusted from the request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalProfile {
    pub blood_group: BloodGroup,
    pub age: u32,
    pub weight: f64,
    pub height: f64,
    pub gender: Gender,
}

impl Donor {
    pub fn medical_profile(&self) -> MedicalProfile {
        MedicalProfile {
            blood_group: self.blood_group,
            age: self.age,
            weight: self.weight,
            height: self.height,
            gender: self.gender,
        }
    }
}

impl Recipient {
    pub fn medical_profile(&self) -> MedicalProfile {
        MedicalProfile {
            blood_group: self.blood_group,
            age: self.age,
            weight: self.weight,
            height: self.height,
            gender: self.gender,
        }
    }
}
