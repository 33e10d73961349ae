/// Canonical form of an email address for lookups and storage.
///
/// Sign-in must match sign-up regardless of how the user typed the
/// address, so both paths normalize before touching the database.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
