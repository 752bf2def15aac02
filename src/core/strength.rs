// src/core/strength.rs
//
// Password strength estimation for the live indicator on the signon,
// registration and account forms. The estimate is a character-set
// diversity proxy, not true entropy: it multiplies the password length
// by the base-10 logarithm of the size of the character set the user
// drew from, and buckets the result into four categories.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use utoipa::ToSchema;

/// The four states of the strength indicator. Exactly one is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum StrengthCategory {
    Poor,
    Weak,
    Good,
    Strong,
}

impl std::fmt::Display for StrengthCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrengthCategory::Poor => write!(f, "Poor"),
            StrengthCategory::Weak => write!(f, "Weak"),
            StrengthCategory::Good => write!(f, "Good"),
            StrengthCategory::Strong => write!(f, "Strong"),
        }
    }
}

/// The two forms score identically but cut over to Strong at different
/// scores: the account-management form at 90, the registration form at
/// 100. Both cutoffs are load-bearing; callers pick theirs explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdPreset {
    #[serde(rename = "account")]
    AccountForm,
    #[serde(rename = "register")]
    RegistrationForm,
}

impl ThresholdPreset {
    fn strong_cutoff(&self) -> u32 {
        match self {
            ThresholdPreset::AccountForm => 90,
            ThresholdPreset::RegistrationForm => 100,
        }
    }

    /// Map a score onto a category. Every score lands in exactly one
    /// category: Strong above the cutoff, Good above 60, Weak from 30
    /// up, Poor below 30.
    pub fn categorize(&self, score: u32) -> StrengthCategory {
        if score > self.strong_cutoff() {
            StrengthCategory::Strong
        } else if score > 60 {
            StrengthCategory::Good
        } else if score >= 30 {
            StrengthCategory::Weak
        } else {
            StrengthCategory::Poor
        }
    }
}

/// Base-10 logarithm of the size of the character set the password
/// draws from. Each ASCII class contributes a fixed amount when present;
/// every distinct non-ASCII "code page" (block of 128 code points)
/// contributes once no matter how often it is used.
fn log_set_size(password: &str) -> f64 {
    let mut digits = false;
    let mut lower = false;
    let mut upper = false;
    let mut spec_ascii = false;
    let mut code_pages: HashSet<u32> = HashSet::new();

    for ch in password.chars() {
        let code = ch as u32;
        if ch.is_ascii_digit() {
            digits = true;
        } else if ch.is_ascii_uppercase() {
            upper = true;
        } else if ch.is_ascii_lowercase() {
            lower = true;
        } else if (32..=128).contains(&code) {
            spec_ascii = true;
        } else if code >= 128 {
            code_pages.insert(code / 128);
        }
    }

    let mut log_size = 0.0;
    if digits {
        log_size += 1.0;
    }
    if lower {
        log_size += 1.415;
    }
    if upper {
        log_size += 1.415;
    }
    if spec_ascii {
        log_size += 1.519;
    }
    log_size += code_pages.len() as f64 * 2.107;
    log_size
}

/// Score a candidate password. Length counts code points, not bytes.
pub fn score_password(password: &str) -> u32 {
    let length = password.chars().count() as f64;
    (length * log_set_size(password)).floor() as u32
}

/// Score and categorize in one step under the given preset.
pub fn evaluate(password: &str, preset: ThresholdPreset) -> (u32, StrengthCategory) {
    let score = score_password(password);
    (score, preset.categorize(score))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ThresholdPreset::{AccountForm, RegistrationForm};

    #[test]
    fn empty_password_is_poor() {
        assert_eq!(score_password(""), 0);
        assert_eq!(AccountForm.categorize(0), StrengthCategory::Poor);
        assert_eq!(RegistrationForm.categorize(0), StrengthCategory::Poor);
    }

    #[test]
    fn digits_only() {
        // 8 digits: 8 * 1.0 = 8
        assert_eq!(score_password("12345678"), 8);
        assert_eq!(evaluate("12345678", AccountForm).1, StrengthCategory::Poor);
    }

    #[test]
    fn lowercase_only() {
        // 8 lowercase: floor(8 * 1.415) = 11
        assert_eq!(score_password("abcdefgh"), 11);
        assert_eq!(evaluate("abcdefgh", RegistrationForm).1, StrengthCategory::Poor);
    }

    #[test]
    fn repetition_is_not_penalized() {
        assert_eq!(score_password("aaaaaaaa"), 11);
    }

    #[test]
    fn mixed_classes() {
        // digit + upper + lower + other ASCII over 12 code points:
        // floor(12 * (1.0 + 1.415 + 1.415 + 1.519)) = floor(64.188) = 64
        let (score, account) = evaluate("Ab3!Ab3!Ab3!", AccountForm);
        assert_eq!(score, 64);
        assert_eq!(account, StrengthCategory::Good);
        assert_eq!(RegistrationForm.categorize(score), StrengthCategory::Good);
    }

    #[test]
    fn space_counts_as_other_ascii() {
        // space is code 32, within the other-printable-ASCII range
        assert_eq!(score_password(" "), 1); // floor(1 * 1.519)
    }

    #[test]
    fn code_pages_count_once_each() {
        // 'é' (0xE9) and 'ü' (0xFC) share code page 1; 'б' (0x431) is
        // page 8. Two distinct pages over 4 code points.
        let score = score_password("ééбб");
        assert_eq!(score, (4.0_f64 * (2.107 * 2.0)).floor() as u32);
        // the same page used twice scores as one page
        assert_eq!(score_password("éé"), (2.0_f64 * 2.107).floor() as u32);
    }

    #[test]
    fn length_counts_code_points_not_bytes() {
        // 'é' is two bytes in UTF-8 but one code point
        assert_eq!(score_password("é"), 2); // floor(1 * 2.107)
    }

    #[test]
    fn presets_diverge_between_91_and_100() {
        for score in 91..=100 {
            assert_eq!(AccountForm.categorize(score), StrengthCategory::Strong);
            assert_eq!(RegistrationForm.categorize(score), StrengthCategory::Good);
        }
        assert_eq!(RegistrationForm.categorize(101), StrengthCategory::Strong);
    }

    #[test]
    fn category_coverage_has_no_gaps() {
        for preset in [AccountForm, RegistrationForm] {
            let mut last = preset.categorize(0);
            assert_eq!(last, StrengthCategory::Poor);
            for score in 1..=200 {
                let cat = preset.categorize(score);
                // categories only ever step upward as the score grows
                let rank = |c: StrengthCategory| match c {
                    StrengthCategory::Poor => 0,
                    StrengthCategory::Weak => 1,
                    StrengthCategory::Good => 2,
                    StrengthCategory::Strong => 3,
                };
                assert!(rank(cat) >= rank(last), "regressed at score {}", score);
                last = cat;
            }
            assert_eq!(last, StrengthCategory::Strong);
        }
    }

    #[test]
    fn boundary_scores() {
        for preset in [AccountForm, RegistrationForm] {
            assert_eq!(preset.categorize(29), StrengthCategory::Poor);
            assert_eq!(preset.categorize(30), StrengthCategory::Weak);
            assert_eq!(preset.categorize(60), StrengthCategory::Weak);
            assert_eq!(preset.categorize(61), StrengthCategory::Good);
        }
        assert_eq!(AccountForm.categorize(90), StrengthCategory::Good);
        assert_eq!(AccountForm.categorize(91), StrengthCategory::Strong);
        assert_eq!(RegistrationForm.categorize(100), StrengthCategory::Good);
        assert_eq!(RegistrationForm.categorize(101), StrengthCategory::Strong);
    }

    #[test]
    fn score_is_monotonic_in_length() {
        let mut pwd = String::new();
        let mut prev = 0;
        for _ in 0..64 {
            pwd.push('x');
            let score = score_password(&pwd);
            assert!(score >= prev);
            prev = score;
        }
    }

    #[test]
    fn scoring_is_pure() {
        let pwd = "Ab3!é with spaces";
        assert_eq!(score_password(pwd), score_password(pwd));
        assert_eq!(
            evaluate(pwd, AccountForm),
            evaluate(pwd, AccountForm)
        );
    }
}
