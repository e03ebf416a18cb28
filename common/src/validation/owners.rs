use std::fmt;

use crate::model::owner::Owner;

use super::is_valid_email;

/// Allowed gap between the ownership total and 100.
pub const TOTAL_TOLERANCE: f64 = 0.01;

/// When an owner's percentage obliges them to sign.
///
/// Two variants of the business rule exist in the field (at or above 25 %
/// versus strictly above 25 %); the inclusive rule is the default.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignaturePolicy {
    pub threshold: f64,
    pub inclusive: bool,
}

impl Default for SignaturePolicy {
    fn default() -> Self {
        Self {
            threshold: 25.0,
            inclusive: true,
        }
    }
}

impl SignaturePolicy {
    pub fn strictly_above(threshold: f64) -> Self {
        Self {
            threshold,
            inclusive: false,
        }
    }

    pub fn requires_signature(&self, percentage: f64) -> bool {
        if self.inclusive {
            percentage >= self.threshold
        } else {
            percentage > self.threshold
        }
    }
}

/// First problem found in an owners list. Owner positions are 1-based in
/// messages, matching what the prospect sees on screen.
#[derive(Debug, Clone, PartialEq)]
pub enum OwnershipError {
    MissingName { position: usize },
    MissingEmail { position: usize },
    InvalidEmail { position: usize },
    MissingPercentage { position: usize },
    PercentageOutOfRange { position: usize, percentage: f64 },
    SignatureRequired { position: usize, name: String, percentage: f64 },
    TotalNotHundred { total: f64 },
}

impl fmt::Display for OwnershipError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OwnershipError::MissingName { position } => {
                write!(f, "Owner {position}: name is required")
            }
            OwnershipError::MissingEmail { position } => {
                write!(f, "Owner {position}: email is required")
            }
            OwnershipError::InvalidEmail { position } => {
                write!(f, "Owner {position}: please enter a valid email address")
            }
            OwnershipError::MissingPercentage { position } => {
                write!(f, "Owner {position}: ownership percentage is required")
            }
            OwnershipError::PercentageOutOfRange { position, percentage } => write!(
                f,
                "Owner {position}: ownership percentage must be greater than 0 and at most 100 (got {percentage}%)"
            ),
            OwnershipError::SignatureRequired { name, percentage, .. } => write!(
                f,
                "Signature required for {name} ({percentage}% ownership)"
            ),
            OwnershipError::TotalNotHundred { total } => write!(
                f,
                "Total ownership must equal 100% (currently {}%)",
                format_total(*total)
            ),
        }
    }
}

impl std::error::Error for OwnershipError {}

fn format_total(total: f64) -> String {
    let rounded = (total * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.0}")
    } else {
        format!("{rounded}")
    }
}

/// Sum of all parsable percentages; missing ones count as zero.
pub fn total_percentage(owners: &[Owner]) -> f64 {
    owners.iter().filter_map(|o| o.percentage).sum()
}

/// Validates the owners list, returning the first error in priority order.
///
/// Each owner is checked in list order for name, then email, then
/// percentage, then signature; the total is checked last, once every owner
/// is individually valid.
pub fn validate_owners(owners: &[Owner], policy: &SignaturePolicy) -> Option<OwnershipError> {
    for (idx, owner) in owners.iter().enumerate() {
        let position = idx + 1;

        if owner.name.trim().is_empty() {
            return Some(OwnershipError::MissingName { position });
        }
        if owner.email.trim().is_empty() {
            return Some(OwnershipError::MissingEmail { position });
        }
        if !is_valid_email(&owner.email) {
            return Some(OwnershipError::InvalidEmail { position });
        }
        let Some(percentage) = owner.percentage else {
            return Some(OwnershipError::MissingPercentage { position });
        };
        if !(percentage > 0.0 && percentage <= 100.0) {
            return Some(OwnershipError::PercentageOutOfRange { position, percentage });
        }
        if policy.requires_signature(percentage) && !owner.has_signature() {
            return Some(OwnershipError::SignatureRequired {
                position,
                name: owner.name.trim().to_string(),
                percentage,
            });
        }
    }

    let total = total_percentage(owners);
    if (total - 100.0).abs() > TOTAL_TOLERANCE {
        return Some(OwnershipError::TotalNotHundred { total });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner(name: &str, percentage: f64, signed: bool) -> Owner {
        Owner {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            percentage: Some(percentage),
            signature: signed.then(|| "data:image/png;base64,iVBORw0KGgo=".to_string()),
            ..Owner::default()
        }
    }

    #[test]
    fn two_signed_owners_summing_to_hundred_pass() {
        let owners = vec![owner("Ana", 60.0, true), owner("Ben", 40.0, true)];
        assert_eq!(validate_owners(&owners, &SignaturePolicy::default()), None);
    }

    #[test]
    fn unsigned_majority_owner_needs_signature() {
        let owners = vec![owner("Ana", 60.0, false)];
        let err = validate_owners(&owners, &SignaturePolicy::default()).unwrap();
        assert!(err.to_string().contains("Signature required"));
    }

    #[test]
    fn small_owner_may_skip_signature() {
        let owners = vec![owner("Ana", 80.0, true), owner("Ben", 20.0, false)];
        assert_eq!(validate_owners(&owners, &SignaturePolicy::default()), None);
    }

    #[test]
    fn threshold_boundary_depends_on_policy() {
        let owners = vec![owner("Ana", 75.0, true), owner("Ben", 25.0, false)];
        assert!(matches!(
            validate_owners(&owners, &SignaturePolicy::default()),
            Some(OwnershipError::SignatureRequired { position: 2, .. })
        ));
        assert_eq!(
            validate_owners(&owners, &SignaturePolicy::strictly_above(25.0)),
            None
        );
    }

    #[test]
    fn name_is_reported_before_later_problems() {
        let mut first = owner("", 60.0, false);
        first.email = "broken".into();
        let owners = vec![first, owner("Ben", 10.0, true)];
        assert_eq!(
            validate_owners(&owners, &SignaturePolicy::default()),
            Some(OwnershipError::MissingName { position: 1 })
        );
    }

    #[test]
    fn email_and_percentage_checks() {
        let mut bad_email = owner("Ana", 100.0, true);
        bad_email.email = "ana@nowhere".into();
        assert_eq!(
            validate_owners(&[bad_email], &SignaturePolicy::default()),
            Some(OwnershipError::InvalidEmail { position: 1 })
        );

        let mut no_pct = owner("Ana", 100.0, true);
        no_pct.percentage = None;
        assert_eq!(
            validate_owners(&[no_pct], &SignaturePolicy::default()),
            Some(OwnershipError::MissingPercentage { position: 1 })
        );

        let over = owner("Ana", 120.0, true);
        assert!(matches!(
            validate_owners(&[over], &SignaturePolicy::default()),
            Some(OwnershipError::PercentageOutOfRange { position: 1, .. })
        ));

        let zero = owner("Ana", 0.0, true);
        assert!(matches!(
            validate_owners(&[zero], &SignaturePolicy::default()),
            Some(OwnershipError::PercentageOutOfRange { .. })
        ));
    }

    #[test]
    fn total_uses_tolerance() {
        let owners = vec![
            owner("Ana", 33.33, true),
            owner("Ben", 33.33, true),
            owner("Cy", 33.34, true),
        ];
        assert_eq!(validate_owners(&owners, &SignaturePolicy::default()), None);

        let short = vec![owner("Ana", 50.0, true), owner("Ben", 40.0, true)];
        let err = validate_owners(&short, &SignaturePolicy::default()).unwrap();
        assert_eq!(err, OwnershipError::TotalNotHundred { total: 90.0 });
        assert_eq!(err.to_string(), "Total ownership must equal 100% (currently 90%)");
    }

    #[test]
    fn empty_list_fails_on_total() {
        assert_eq!(
            validate_owners(&[], &SignaturePolicy::default()),
            Some(OwnershipError::TotalNotHundred { total: 0.0 })
        );
    }
}
