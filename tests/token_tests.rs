//! Token codec properties: round-trip, expiry, integrity

use chrono::Utc;
use hce_auth_core::{AccessClaims, Principal, Role, TokenCodec, TokenConfig, TokenError};

fn fixture_codec() -> TokenCodec {
    TokenCodec::new(TokenConfig {
        secret: "fixture-secret-for-tests".to_string(),
        access_ttl_minutes: 30,
    })
}

fn fixture_principal() -> Principal {
    Principal {
        document_id: 10203040,
        email: "laura@clinic.example".to_string(),
        full_name: Some("Laura Cifuentes".to_string()),
        password_hash: "$argon2id$unused".to_string(),
        role: Role::Clinician,
        created_at: Utc::now(),
    }
}

#[test]
fn claims_round_trip_before_expiry() {
    let codec = fixture_codec();
    let now = Utc::now().timestamp() as u64;
    let claims = AccessClaims {
        sub: "laura@clinic.example".to_string(),
        role: Some(Role::Clinician),
        exp: now + 600,
        iat: now,
    };

    let token = codec.encode(&claims).unwrap();
    assert_eq!(codec.decode(&token).unwrap(), claims);
}

#[test]
fn issued_token_carries_subject_role_and_ttl() {
    let codec = fixture_codec();
    let before = Utc::now().timestamp() as u64;
    let token = codec.issue(&fixture_principal()).unwrap();
    let claims = codec.decode(&token).unwrap();

    assert_eq!(claims.sub, "laura@clinic.example");
    assert_eq!(claims.role, Some(Role::Clinician));
    // Default TTL is 30 minutes.
    let expected = before + 30 * 60;
    assert!(claims.exp >= expected && claims.exp <= expected + 5);
}

#[test]
fn expired_token_is_classified_expired() {
    let codec = fixture_codec();
    let token = codec
        .issue_with_ttl(&fixture_principal(), chrono::Duration::seconds(-5))
        .unwrap();
    assert_eq!(codec.decode(&token), Err(TokenError::Expired));
}

#[test]
fn flipping_any_byte_fails_decoding() {
    let codec = fixture_codec();
    let token = codec.issue(&fixture_principal()).unwrap();

    for i in 0..token.len() {
        let original = token.as_bytes()[i];
        if original == b'.' {
            continue;
        }
        let mut bytes = token.clone().into_bytes();
        bytes[i] = if original == b'A' { b'B' } else { b'A' };
        let mutated = String::from_utf8(bytes).unwrap();
        if mutated == token {
            continue;
        }
        assert!(
            codec.decode(&mutated).is_err(),
            "byte {i} flipped but token still decoded"
        );
    }
}

#[test]
fn signature_mutation_is_classified_tampered() {
    let codec = fixture_codec();
    let token = codec.issue(&fixture_principal()).unwrap();

    // Flip the last character, inside the signature segment.
    let mut bytes = token.into_bytes();
    let last = *bytes.last().unwrap();
    *bytes.last_mut().unwrap() = if last == b'A' { b'B' } else { b'A' };
    let mutated = String::from_utf8(bytes).unwrap();

    assert_eq!(codec.decode(&mutated), Err(TokenError::Tampered));
}

#[test]
fn token_signed_with_different_secret_is_tampered() {
    let issuing = fixture_codec();
    let verifying = TokenCodec::new(TokenConfig {
        secret: "a-different-secret".to_string(),
        access_ttl_minutes: 30,
    });

    let token = issuing.issue(&fixture_principal()).unwrap();
    assert_eq!(verifying.decode(&token), Err(TokenError::Tampered));
}

#[test]
fn token_without_subject_is_malformed() {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde::Serialize;

    #[derive(Serialize)]
    struct NoSubject {
        exp: u64,
        iat: u64,
    }

    let now = Utc::now().timestamp() as u64;
    let token = encode(
        &Header::default(),
        &NoSubject {
            exp: now + 600,
            iat: now,
        },
        &EncodingKey::from_secret(b"fixture-secret-for-tests"),
    )
    .unwrap();

    assert_eq!(fixture_codec().decode(&token), Err(TokenError::Malformed));
}

#[test]
fn garbage_strings_never_decode() {
    let codec = fixture_codec();
    for junk in ["", "not-a-token", "a.b", "a.b.c.d", "ey.ey.ey"] {
        assert!(codec.decode(junk).is_err(), "{junk:?} decoded");
    }
}
