use axum::body::Body;
use hmac::{Hmac, Mac};
use http::Request;
use sha1::Sha1;
use sha2::Sha256;

use crate::tests::TEST_WEBHOOK_SECRET;

pub fn sign(body: &[u8]) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(TEST_WEBHOOK_SECRET.as_bytes()).unwrap();
    mac.update(body);
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}

pub fn sign_sha1(body: &[u8]) -> String {
    let mut mac = Hmac::<Sha1>::new_from_slice(TEST_WEBHOOK_SECRET.as_bytes()).unwrap();
    mac.update(body);
    format!("sha1={}", hex::encode(mac.finalize().into_bytes()))
}

pub fn create_webhook_request(event: &str, body: &str) -> Request<Body> {
    Request::post("/github")
        .header("x-github-event", event)
        .header("x-github-delivery", "72d3162e")
        .header("x-hub-signature-256", sign(body.as_bytes()))
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}
