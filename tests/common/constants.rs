//! Shared constants for end-to-end tests
//!
//! Credentials the fake upstream accepts, and the minimal image payload
//! uploaded by the tests.

// ============================================================================
// Credentials
// ============================================================================

/// API key the fake model endpoint expects as a bearer token
pub const TEST_API_KEY: &str = "sk-test-key";

/// Client id the fake token endpoint accepts
pub const TEST_CLIENT_ID: &str = "test-client-id";

/// Client secret the fake token endpoint accepts
pub const TEST_CLIENT_SECRET: &str = "test-client-secret";

/// Token handed out by the fake token endpoint
pub const TEST_ACCESS_TOKEN: &str = "test-access-token";

// ============================================================================
// Payloads
// ============================================================================

/// PNG signature, enough for MIME sniffing
pub const PNG_BYTES: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// A model reply describing a streetwear outfit
pub const STREETWEAR_REPLY: &str = r#"{
  "image_description": "A person in a puffer jacket on a city street",
  "people_count": 1,
  "main_objects": ["jacket", "sneakers"],
  "main_character": "young man in oversized streetwear",
  "outfit_characteristics": ["oversized puffer", "cargo pants"],
  "background_aesthetics": ["urban", "night"],
  "music_genre": ["Trap", "R&B", "Grime"]
}"#;

// ============================================================================
// Timeouts
// ============================================================================

/// Maximum time to wait for a spawned server to answer
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Interval between readiness polls
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;

/// Per-request timeout for the test client
pub const REQUEST_TIMEOUT_SECS: u64 = 10;
