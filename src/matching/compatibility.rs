//! Donor/recipient compatibility rules.
//!
//! A pair is compatible when both requests are admin-confirmed, the donor's
//! blood group can be given to the recipient's, and the two profiles have
//! identical age, weight, height and gender.

use crate::models::enums::{AdminConfirmation, BloodGroup};
use crate::models::{DonorRequest, MedicalProfile, RecipientRequest};

use BloodGroup::*;

/// Recipient blood groups a donor blood group may be given to.
pub fn compatible_recipients(donor: BloodGroup) -> &'static [BloodGroup] {
    match donor {
        ONegative => &[
            ONegative, OPositive, ANegative, APositive, BNegative, BPositive, AbNegative,
            AbPositive,
        ],
        OPositive => &[OPositive, APositive, BPositive, AbPositive],
        ANegative => &[ANegative, APositive, AbNegative, AbPositive],
        APositive => &[APositive, AbPositive],
        BNegative => &[BNegative, BPositive, AbNegative, AbPositive],
        BPositive => &[BPositive, AbPositive],
        AbNegative => &[AbNegative, AbPositive],
        AbPositive => &[AbPositive],
    }
}

pub fn can_donate(donor: BloodGroup, recipient: BloodGroup) -> bool {
    compatible_recipients(donor).contains(&recipient)
}

/// Why a pair was rejected. Logged at debug level, never reported as an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Incompatibility {
    DonorUnconfirmed,
    RecipientUnconfirmed,
    BloodGroup {
        donor: BloodGroup,
        recipient: BloodGroup,
    },
    Age,
    Weight,
    Height,
    Gender,
}

/// Full compatibility check for one pair.
///
/// Confirmation is re-checked here even though the pools are filtered on
/// it: the blood groups come from the profiles, not the requests.
pub fn check_pair(
    donor_request: &DonorRequest,
    recipient_request: &RecipientRequest,
    donor: &MedicalProfile,
    recipient: &MedicalProfile,
) -> Result<(), Incompatibility> {
    if donor_request.admin_confirmation != AdminConfirmation::Fulfilled {
        return Err(Incompatibility::DonorUnconfirmed);
    }
    if recipient_request.admin_confirmation != AdminConfirmation::Fulfilled {
        return Err(Incompatibility::RecipientUnconfirmed);
    }
    if !can_donate(donor.blood_group, recipient.blood_group) {
        return Err(Incompatibility::BloodGroup {
            donor: donor.blood_group,
            recipient: recipient.blood_group,
        });
    }
    // Physique must match exactly.
    if donor.age != recipient.age {
        return Err(Incompatibility::Age);
    }
    if donor.weight != recipient.weight {
        return Err(Incompatibility::Weight);
    }
    if donor.height != recipient.height {
        return Err(Incompatibility::Height);
    }
    if donor.gender != recipient.gender {
        return Err(Incompatibility::Gender);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;
    use uuid::Uuid;

    use super::*;
    use crate::models::enums::*;

    /// ABO/Rh antigens carried by a blood group: (A, B, RhD).
    fn antigens(group: BloodGroup) -> (bool, bool, bool) {
        match group {
            ONegative => (false, false, false),
            OPositive => (false, false, true),
            ANegative => (true, false, false),
            APositive => (true, false, true),
            BNegative => (false, true, false),
            BPositive => (false, true, true),
            AbNegative => (true, true, false),
            AbPositive => (true, true, true),
        }
    }

    #[test]
    fn table_matches_antigen_rule_for_all_64_pairs() {
        // A donor is acceptable when it carries no antigen the recipient lacks.
        for donor in BloodGroup::ALL {
            for recipient in BloodGroup::ALL {
                let (da, db, dd) = antigens(donor);
                let (ra, rb, rd) = antigens(recipient);
                let expected = (!da || ra) && (!db || rb) && (!dd || rd);
                assert_eq!(
                    can_donate(donor, recipient),
                    expected,
                    "donor {donor} → recipient {recipient}"
                );
            }
        }
    }

    #[test]
    fn table_rows_match_transfusion_chart() {
        let chart: [(&str, &[&str]); 8] = [
            ("O-", &["O-", "O+", "A-", "A+", "B-", "B+", "AB-", "AB+"]),
            ("O+", &["O+", "A+", "B+", "AB+"]),
            ("A-", &["A-", "A+", "AB-", "AB+"]),
            ("A+", &["A+", "AB+"]),
            ("B-", &["B-", "B+", "AB-", "AB+"]),
            ("B+", &["B+", "AB+"]),
            ("AB-", &["AB-", "AB+"]),
            ("AB+", &["AB+"]),
        ];
        for (donor, recipients) in chart {
            let donor: BloodGroup = donor.parse().unwrap();
            for recipient in BloodGroup::ALL {
                assert_eq!(
                    can_donate(donor, recipient),
                    recipients.contains(&recipient.as_str()),
                    "donor {donor} → recipient {recipient}"
                );
            }
        }
    }

    #[test]
    fn universal_donor_and_recipient() {
        assert_eq!(compatible_recipients(ONegative).len(), 8);
        for donor in BloodGroup::ALL {
            assert!(can_donate(donor, AbPositive));
        }
        assert_eq!(compatible_recipients(AbPositive), &[AbPositive]);
    }

    #[test]
    fn compatibility_is_not_symmetric() {
        assert!(can_donate(ONegative, APositive));
        assert!(!can_donate(APositive, ONegative));
    }

    fn ts() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2024-03-01 08:00:00", "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn donor_request(confirmation: AdminConfirmation) -> DonorRequest {
        DonorRequest {
            id: Uuid::new_v4(),
            donor_id: Uuid::new_v4(),
            organ_type: OrganType::Kidney,
            blood_group: ONegative,
            status: RequestStatus::Pending,
            admin_confirmation: confirmation,
            admin_id: None,
            created_at: ts(),
            updated_at: ts(),
        }
    }

    fn recipient_request(confirmation: AdminConfirmation) -> RecipientRequest {
        RecipientRequest {
            id: Uuid::new_v4(),
            recipient_id: Uuid::new_v4(),
            organ_type: OrganType::Kidney,
            blood_group: APositive,
            urgency_level: UrgencyLevel::Critical,
            status: RequestStatus::Pending,
            admin_confirmation: confirmation,
            admin_id: None,
            created_at: ts(),
            updated_at: ts(),
        }
    }

    fn profile(blood_group: BloodGroup) -> MedicalProfile {
        MedicalProfile {
            blood_group,
            age: 30,
            weight: 70.0,
            height: 175.0,
            gender: Gender::Male,
        }
    }

    #[test]
    fn identical_compatible_profiles_pass() {
        let result = check_pair(
            &donor_request(AdminConfirmation::Fulfilled),
            &recipient_request(AdminConfirmation::Fulfilled),
            &profile(ONegative),
            &profile(APositive),
        );
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn unconfirmed_recipient_fails() {
        let result = check_pair(
            &donor_request(AdminConfirmation::Fulfilled),
            &recipient_request(AdminConfirmation::Pending),
            &profile(ONegative),
            &profile(APositive),
        );
        assert_eq!(result, Err(Incompatibility::RecipientUnconfirmed));
    }

    #[test]
    fn unconfirmed_donor_fails_first() {
        let result = check_pair(
            &donor_request(AdminConfirmation::Rejected),
            &recipient_request(AdminConfirmation::Pending),
            &profile(ONegative),
            &profile(APositive),
        );
        assert_eq!(result, Err(Incompatibility::DonorUnconfirmed));
    }

    #[test]
    fn profile_blood_group_overrides_request() {
        // Requests say O- → A+, but the recipient profile is now O-.
        let result = check_pair(
            &donor_request(AdminConfirmation::Fulfilled),
            &recipient_request(AdminConfirmation::Fulfilled),
            &profile(APositive),
            &profile(ONegative),
        );
        assert_eq!(
            result,
            Err(Incompatibility::BloodGroup {
                donor: APositive,
                recipient: ONegative
            })
        );
    }

    #[test]
    fn any_physique_difference_fails() {
        let dr = donor_request(AdminConfirmation::Fulfilled);
        let rr = recipient_request(AdminConfirmation::Fulfilled);
        let donor = profile(ONegative);

        let mut older = profile(APositive);
        older.age = 31;
        assert_eq!(check_pair(&dr, &rr, &donor, &older), Err(Incompatibility::Age));

        let mut heavier = profile(APositive);
        heavier.weight = 70.5;
        assert_eq!(check_pair(&dr, &rr, &donor, &heavier), Err(Incompatibility::Weight));

        let mut taller = profile(APositive);
        taller.height = 180.0;
        assert_eq!(check_pair(&dr, &rr, &donor, &taller), Err(Incompatibility::Height));

        let mut other = profile(APositive);
        other.gender = Gender::Female;
        assert_eq!(check_pair(&dr, &rr, &donor, &other), Err(Incompatibility::Gender));
    }
}
