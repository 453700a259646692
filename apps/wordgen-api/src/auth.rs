//! Access token validation
//!
//! Uses HS256 with the configured secret key. Tokens carry the issuing
//! user's id and an expiry; there is no server-side session to look up.
//! Clients may send the raw token or prefix it with `Bearer `.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Access token expiry in seconds (3 hours)
pub const ACCESS_TOKEN_EXPIRY: u64 = 3 * 60 * 60;

/// JWT Header for HS256
#[derive(Debug, Serialize, Deserialize)]
struct JwtHeader {
    alg: String,
    typ: String,
}

impl Default for JwtHeader {
    fn default() -> Self {
        Self {
            alg: "HS256".to_string(),
            typ: "JWT".to_string(),
        }
    }
}

/// Claims carried by an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// The user the token was issued to
    pub user_id: String,
    /// Issued at (Unix timestamp)
    #[serde(default)]
    pub iat: u64,
    /// Expiration (Unix timestamp)
    pub exp: u64,
}

/// Encode claims to JWT using HS256
fn encode_jwt<T: Serialize>(claims: &T, secret: &str) -> Result<String, String> {
    // Encode header
    let header = JwtHeader::default();
    let header_json = serde_json::to_string(&header).map_err(|e| e.to_string())?;
    let header_b64 = URL_SAFE_NO_PAD.encode(header_json.as_bytes());

    // Encode payload
    let payload_json = serde_json::to_string(claims).map_err(|e| e.to_string())?;
    let payload_b64 = URL_SAFE_NO_PAD.encode(payload_json.as_bytes());

    // Create signing input
    let signing_input = format!("{}.{}", header_b64, payload_b64);

    // Sign with HMAC-SHA256
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|e| format!("HMAC error: {}", e))?;
    mac.update(signing_input.as_bytes());
    let signature = mac.finalize().into_bytes();
    let signature_b64 = URL_SAFE_NO_PAD.encode(&signature);

    Ok(format!("{}.{}", signing_input, signature_b64))
}

/// Decode and validate JWT using HS256
fn decode_jwt<T: DeserializeOwned>(token: &str, secret: &str) -> Result<T, String> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err("Invalid token format".to_string());
    }

    let header_b64 = parts[0];
    let payload_b64 = parts[1];
    let signature_b64 = parts[2];

    // Verify signature
    let signing_input = format!("{}.{}", header_b64, payload_b64);
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|e| format!("HMAC error: {}", e))?;
    mac.update(signing_input.as_bytes());

    let expected_signature = URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|_| "Invalid signature encoding")?;

    mac.verify_slice(&expected_signature)
        .map_err(|_| "Invalid signature")?;

    // Verify header
    let header_bytes = URL_SAFE_NO_PAD
        .decode(header_b64)
        .map_err(|_| "Invalid header encoding")?;
    let header: JwtHeader =
        serde_json::from_slice(&header_bytes).map_err(|_| "Invalid header format")?;

    if header.alg != "HS256" {
        return Err("Unsupported algorithm".to_string());
    }

    // Decode payload
    let payload_bytes = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|_| "Invalid payload encoding")?;
    let claims: T = serde_json::from_slice(&payload_bytes).map_err(|_| "Invalid payload format")?;

    Ok(claims)
}

/// Issue an access token for a user
///
/// # Arguments
/// * `user_id` - The user's unique identifier
/// * `secret` - The JWT signing secret
///
/// # Returns
/// * `Ok(String)` - The encoded JWT
/// * `Err(String)` - Error message if encoding fails
pub fn issue_token(user_id: &str, secret: &str) -> Result<String, String> {
    let now = chrono::Utc::now().timestamp() as u64;

    let claims = AccessTokenClaims {
        user_id: user_id.to_string(),
        iat: now,
        exp: now + ACCESS_TOKEN_EXPIRY,
    };

    encode_jwt(&claims, secret).map_err(|e| format!("Failed to issue token: {}", e))
}

/// Validate an access token and extract claims
pub fn validate_access_token(token: &str, secret: &str) -> Result<AccessTokenClaims, String> {
    let claims: AccessTokenClaims =
        decode_jwt(token, secret).map_err(|e| format!("Invalid access token: {}", e))?;

    // Check expiration
    let now = chrono::Utc::now().timestamp() as u64;
    if claims.exp < now {
        return Err("Access token expired".to_string());
    }

    Ok(claims)
}

/// Extract the token from an Authorization header value. A `Bearer `
/// prefix is accepted but not required.
pub fn token_from_header(auth_header: &str) -> &str {
    auth_header.strip_prefix("Bearer ").unwrap_or(auth_header)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_token_issue_and_validation() {
        let token = issue_token("user-123", TEST_SECRET).unwrap();

        let claims = validate_access_token(&token, TEST_SECRET).unwrap();

        assert_eq!(claims.user_id, "user-123");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_invalid_token() {
        let result = validate_access_token("invalid-token", TEST_SECRET);
        assert!(result.is_err());
    }

    #[test]
    fn test_wrong_secret() {
        let token = issue_token("user-123", TEST_SECRET).unwrap();

        let result = validate_access_token(&token, "wrong-secret");
        assert!(result.is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let claims = AccessTokenClaims {
            user_id: "user-123".to_string(),
            iat: 1_000,
            exp: 2_000,
        };
        let token = encode_jwt(&claims, TEST_SECRET).unwrap();

        let result = validate_access_token(&token, TEST_SECRET);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_iat_defaults_to_zero() {
        let exp = chrono::Utc::now().timestamp() as u64 + 60;
        let payload = format!("{{\"user_id\":\"u1\",\"exp\":{exp}}}");

        // Sign a payload without an iat claim.
        let header_b64 =
            URL_SAFE_NO_PAD.encode(serde_json::to_string(&JwtHeader::default()).unwrap());
        let payload_b64 = URL_SAFE_NO_PAD.encode(payload.as_bytes());
        let signing_input = format!("{}.{}", header_b64, payload_b64);
        let mut mac = HmacSha256::new_from_slice(TEST_SECRET.as_bytes()).unwrap();
        mac.update(signing_input.as_bytes());
        let signature_b64 = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        let token = format!("{}.{}", signing_input, signature_b64);

        let claims = validate_access_token(&token, TEST_SECRET).unwrap();
        assert_eq!(claims.user_id, "u1");
        assert_eq!(claims.iat, 0);
    }

    #[test]
    fn test_token_from_header_with_and_without_prefix() {
        assert_eq!(token_from_header("Bearer abc123"), "abc123");
        assert_eq!(token_from_header("abc123"), "abc123");
    }

    #[test]
    fn test_jwt_format() {
        let token = issue_token("user-123", TEST_SECRET).unwrap();

        // JWT should have 3 parts separated by dots
        let parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);

        // Header should decode to valid JSON with HS256
        let header_bytes = URL_SAFE_NO_PAD.decode(parts[0]).unwrap();
        let header: JwtHeader = serde_json::from_slice(&header_bytes).unwrap();
        assert_eq!(header.alg, "HS256");
        assert_eq!(header.typ, "JWT");
    }
}
