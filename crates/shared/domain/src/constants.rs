//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// Account Roles
// =============================================================================

/// Default role assigned to newly registered accounts
pub const ROLE_USER: &str = "user";

/// Librarian / administrator role
pub const ROLE_ADMIN: &str = "admin";

// =============================================================================
// Validation
// =============================================================================

/// Minimum password length requirement
pub const MIN_PASSWORD_LENGTH: u64 = 6;

/// Maximum password length requirement
pub const MAX_PASSWORD_LENGTH: u64 = 100;

/// Maximum display name length
pub const MAX_NAME_LENGTH: u64 = 100;

// =============================================================================
// Authentication
// =============================================================================

/// Access token lifetime in hours
pub const ACCESS_TOKEN_EXPIRATION_HOURS: i64 = 1;

/// Lifetime of single-purpose email verification tokens in hours
pub const VERIFICATION_TOKEN_EXPIRATION_HOURS: i64 = 24;

/// Minimum signing key length in bytes (HS256 needs a 256-bit key)
pub const MIN_JWT_KEY_LENGTH: usize = 32;

/// Seconds per hour (for token expiration calculation)
pub const SECONDS_PER_HOUR: i64 = 3600;

/// Authorization header prefix for Bearer tokens
pub const BEARER_TOKEN_PREFIX: &str = "Bearer ";

/// JWT token type identifier
pub const TOKEN_TYPE_BEARER: &str = "Bearer";

/// `purpose` claim carried by email verification tokens
pub const PURPOSE_EMAIL_VERIFICATION: &str = "email_verification";
