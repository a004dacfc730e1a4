//! Virtual user state
//!
//! Each virtual user generates its identity and payload templates once at
//! start and keeps them for its whole lifetime. User ids are drawn from a
//! bounded range without collision checking, matching the behavior of the
//! system-under-test's original harness: duplicate identities surface as
//! "Email already Exists" responses, which the classifier accepts.

use rand::Rng;
use std::ops::RangeInclusive;
use stampede_http::FormField;

/// Range user ids are drawn from (collision-tolerant)
pub const USER_ID_RANGE: RangeInclusive<u32> = 1000..=9999;

/// Fixed password shared by all generated identities
pub const TEST_PASSWORD: &str = "securepassword123";

/// Registration form payload
#[derive(Debug, Clone)]
pub struct RegistrationPayload {
    pub full_name: String,
    pub user_name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
}

impl RegistrationPayload {
    fn for_user_id(user_id: u32) -> Self {
        Self {
            full_name: format!("Test User {}", user_id),
            user_name: format!("user{}", user_id),
            email: format!("user{}@test.com", user_id),
            password: TEST_PASSWORD.to_string(),
            phone: format!("987654{}", user_id),
        }
    }

    /// Form fields in the shape the registration endpoint expects
    pub fn form(&self) -> Vec<FormField> {
        vec![
            ("fullName", self.full_name.clone()),
            ("userName", self.user_name.clone()),
            ("email", self.email.clone()),
            ("password", self.password.clone()),
            ("phone", self.phone.clone()),
        ]
    }
}

/// Login form payload
#[derive(Debug, Clone)]
pub struct LoginPayload {
    pub user_name: String,
    pub email: String,
    pub password: String,
}

impl LoginPayload {
    /// Build login credentials for an arbitrary user id.
    ///
    /// Also used by the stress task, which draws a fresh random id per
    /// request instead of reusing the user's own identity.
    pub fn for_user_id(user_id: u32) -> Self {
        Self {
            user_name: format!("user{}", user_id),
            email: format!("user{}@test.com", user_id),
            password: TEST_PASSWORD.to_string(),
        }
    }

    /// Form fields in the shape the login endpoint expects
    pub fn form(&self) -> Vec<FormField> {
        vec![
            ("userName", self.user_name.clone()),
            ("email", self.email.clone()),
            ("password", self.password.clone()),
        ]
    }
}

/// Per-user data generated once at user start, immutable thereafter
#[derive(Debug, Clone)]
pub struct VirtualUserState {
    pub user_id: u32,
    pub registration: RegistrationPayload,
    pub login: LoginPayload,
}

impl VirtualUserState {
    /// Generate a fresh identity from the user's own RNG
    pub fn generate<R: Rng>(rng: &mut R) -> Self {
        let user_id = rng.random_range(USER_ID_RANGE);
        Self {
            user_id,
            registration: RegistrationPayload::for_user_id(user_id),
            login: LoginPayload::for_user_id(user_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_user_id_within_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let state = VirtualUserState::generate(&mut rng);
            assert!(USER_ID_RANGE.contains(&state.user_id));
        }
    }

    #[test]
    fn test_payloads_derive_from_user_id() {
        let mut rng = StdRng::seed_from_u64(7);
        let state = VirtualUserState::generate(&mut rng);
        let id = state.user_id;

        assert_eq!(state.registration.user_name, format!("user{}", id));
        assert_eq!(state.registration.email, format!("user{}@test.com", id));
        assert_eq!(state.registration.phone, format!("987654{}", id));
        assert_eq!(state.login.user_name, state.registration.user_name);
        assert_eq!(state.login.email, state.registration.email);
    }

    #[test]
    fn test_registration_form_field_names() {
        let payload = RegistrationPayload::for_user_id(1234);
        let names: Vec<&str> = payload.form().iter().map(|(k, _)| *k).collect();
        assert_eq!(names, ["fullName", "userName", "email", "password", "phone"]);
    }

    #[test]
    fn test_login_form_field_names() {
        let payload = LoginPayload::for_user_id(1234);
        let names: Vec<&str> = payload.form().iter().map(|(k, _)| *k).collect();
        assert_eq!(names, ["userName", "email", "password"]);
    }

    #[test]
    fn test_generation_is_reproducible_under_fixed_seed() {
        let a = VirtualUserState::generate(&mut StdRng::seed_from_u64(42));
        let b = VirtualUserState::generate(&mut StdRng::seed_from_u64(42));
        assert_eq!(a.user_id, b.user_id);
    }
}
