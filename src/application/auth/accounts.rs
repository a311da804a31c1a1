//! Account helpers for users created through an external identity provider

use rand::Rng;
use rand::seq::SliceRandom;

use crate::domain::auth::value_objects::Username;

/// Longest username derived from a provider profile
pub const DERIVED_USERNAME_MAX: usize = 20;
pub const GENERATED_PASSWORD_LENGTH: usize = 16;

const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
const SPECIAL: &[u8] = b"!@#$%^&*";

/// Reduce a display name or email local part to a username stem
///
/// Keeps ASCII letters and digits, truncated to 20 characters. An empty result
/// becomes `user`; a stem shorter than the username minimum gets `user`
/// appended.
pub fn sanitize_username(input: &str) -> String {
    let mut stem: String = input
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(DERIVED_USERNAME_MAX)
        .collect();

    if stem.is_empty() {
        return "user".to_string();
    }

    if stem.len() < Username::MIN_LENGTH {
        stem.push_str("user");
    }
    stem
}

/// Candidate usernames in the order they are tried: `stem`, `stem1`, `stem2`, ...
pub fn username_candidates(stem: &str) -> impl Iterator<Item = String> + '_ {
    std::iter::once(stem.to_string()).chain((1u32..).map(move |n| format!("{}{}", stem, n)))
}

/// Random password satisfying the account password policy
///
/// Contains at least one lowercase letter, uppercase letter, digit and one
/// of `!@#$%^&*`, shuffled.
pub fn generate_secure_password() -> String {
    let mut rng = rand::rng();
    let all: Vec<u8> = [LOWERCASE, UPPERCASE, DIGITS, SPECIAL].concat();

    let mut password: Vec<u8> = [LOWERCASE, UPPERCASE, DIGITS, SPECIAL]
        .iter()
        .map(|set| set[rng.random_range(0..set.len())])
        .collect();

    while password.len() < GENERATED_PASSWORD_LENGTH {
        password.push(all[rng.random_range(0..all.len())]);
    }

    password.shuffle(&mut rng);
    password.into_iter().map(char::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::auth::value_objects::Password;
    use proptest::prelude::*;

    #[test]
    fn test_sanitize_strips_symbols_and_spaces() {
        assert_eq!(sanitize_username("John Doe"), "JohnDoe");
        assert_eq!(sanitize_username("jane.doe+shop"), "janedoeshop");
        assert_eq!(sanitize_username("!!!"), "user");
        assert_eq!(sanitize_username(""), "user");
        assert_eq!(sanitize_username("Al"), "Aluser");
    }

    #[test]
    fn test_sanitize_truncates_to_twenty() {
        let name = "abcdefghijklmnopqrstuvwxyz";
        assert_eq!(sanitize_username(name), "abcdefghijklmnopqrst");
    }

    #[test]
    fn test_candidates_append_counter() {
        let tried: Vec<String> = username_candidates("planner").take(3).collect();
        assert_eq!(tried, vec!["planner", "planner1", "planner2"]);
    }

    #[test]
    fn test_generated_password_meets_policy() {
        for _ in 0..50 {
            let password = generate_secure_password();
            assert_eq!(password.len(), GENERATED_PASSWORD_LENGTH);
            assert!(password.bytes().any(|b| SPECIAL.contains(&b)));
            assert!(Password::validate(&password).is_ok());
        }
    }

    proptest! {
        #[test]
        fn sanitized_username_is_always_a_valid_username(input in ".*") {
            let stem = sanitize_username(&input);
            prop_assert!(stem.len() <= DERIVED_USERNAME_MAX + 4);
            prop_assert!(stem.chars().all(|c| c.is_ascii_alphanumeric()));
            prop_assert!(Username::new(stem).is_ok());
        }
    }
}
