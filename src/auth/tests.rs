use super::*;
use jsonwebtoken::{EncodingKey, Header, encode};
use std::env;

const SECRET: &str = "supersecretjwtsecretforunittesting123";

fn set_env_vars() {
    unsafe {
        env::set_var("JWT_SECRET", SECRET);
    }
}

fn token(secret: &str, role: &str, exp: usize) -> String {
    let claims = SessionClaims {
        sub: "123e4567-e89b-12d3-a456-426614174000".to_string(),
        role: role.to_string(),
        email: Some("ops@example.com".to_string()),
        company_id: Some("cmp-lagos-01".to_string()),
        exp,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

fn parts_with(token: &str) -> Parts {
    let request = axum::http::Request::builder()
        .header(axum::http::header::AUTHORIZATION, format!("Bearer {token}"))
        .body(())
        .unwrap();
    request.into_parts().0
}

#[test]
fn test_validate_session_jwt_success() {
    set_env_vars();
    let claims = validate_session_jwt(&token(SECRET, "ADMIN", 9999999999))
        .expect("Valid token should pass");
    assert_eq!(claims.sub, "123e4567-e89b-12d3-a456-426614174000");
    assert_eq!(claims.role, "ADMIN");
}

#[test]
fn test_validate_session_jwt_expired() {
    set_env_vars();
    assert!(validate_session_jwt(&token(SECRET, "ADMIN", 1)).is_err());
}

#[test]
fn test_validate_session_jwt_invalid_signature() {
    set_env_vars();
    assert!(validate_session_jwt(&token("wrongsecret", "ADMIN", 9999999999)).is_err());
}

#[tokio::test]
async fn test_admin_extractor_rejects_client_roles() {
    set_env_vars();

    let mut parts = parts_with(&token(SECRET, "CLIENT_USER", 9999999999));
    let user = AuthUser::from_request_parts(&mut parts, &()).await.unwrap();
    assert_eq!(user.role, UserRole::ClientUser);
    assert_eq!(user.company_id.as_deref(), Some("cmp-lagos-01"));

    let mut parts = parts_with(&token(SECRET, "CLIENT_USER", 9999999999));
    let rejection = AdminUser::from_request_parts(&mut parts, &()).await.unwrap_err();
    assert_eq!(rejection.0, StatusCode::FORBIDDEN);

    let mut parts = parts_with(&token(SECRET, "SUPER_ADMIN", 9999999999));
    let admin = AdminUser::from_request_parts(&mut parts, &()).await.unwrap();
    assert_eq!(admin.0.role, UserRole::SuperAdmin);
}

#[tokio::test]
async fn test_unknown_role_is_unauthorized() {
    set_env_vars();
    let mut parts = parts_with(&token(SECRET, "authenticated", 9999999999));
    let rejection = AuthUser::from_request_parts(&mut parts, &()).await.unwrap_err();
    assert_eq!(rejection.0, StatusCode::UNAUTHORIZED);
}
