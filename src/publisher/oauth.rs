//! OAuth 1.0a request signing (HMAC-SHA1) for X user-context endpoints.
//!
//! Only the signature and the `Authorization` header are produced here.
//! Multipart and JSON bodies are not part of the signature; query parameters
//! and any explicitly passed form parameters are.

use crate::config::XCredentials;
use crate::utils::redact;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use itertools::Itertools;
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use sha1::Sha1;
use std::fmt;
use url::Url;

type HmacSha1 = Hmac<Sha1>;

/// RFC 3986 percent-encoding: everything except `A-Z a-z 0-9 - . _ ~`.
pub fn percent_encode(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

/// Signature base string: `METHOD&enc(base_url)&enc(sorted params)`.
///
/// `params` must already include the `oauth_*` parameters (minus the
/// signature) and any query parameters.
pub fn signature_base_string(method: &str, base_url: &str, params: &[(String, String)]) -> String {
    let normalized = params
        .iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .sorted()
        .map(|(k, v)| format!("{k}={v}"))
        .join("&");
    format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        percent_encode(base_url),
        percent_encode(&normalized)
    )
}

/// Signs requests with one set of consumer and token credentials.
#[derive(Clone)]
pub struct OAuth1Signer {
    consumer_key: String,
    consumer_secret: String,
    token: String,
    token_secret: String,
}

impl fmt::Debug for OAuth1Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuth1Signer")
            .field("consumer_key", &redact(&self.consumer_key))
            .field("token", &redact(&self.token))
            .finish_non_exhaustive()
    }
}

impl OAuth1Signer {
    pub fn new(consumer_key: &str, consumer_secret: &str, token: &str, token_secret: &str) -> Self {
        Self {
            consumer_key: consumer_key.to_string(),
            consumer_secret: consumer_secret.to_string(),
            token: token.to_string(),
            token_secret: token_secret.to_string(),
        }
    }

    pub fn from_credentials(creds: &XCredentials) -> Self {
        Self::new(
            &creds.api_key,
            &creds.api_secret,
            &creds.access_token,
            &creds.access_token_secret,
        )
    }

    /// `Authorization` header value with a fresh nonce and the current time.
    pub fn authorization(&self, method: &str, url: &str, params: &[(&str, &str)]) -> Result<String, url::ParseError> {
        self.authorization_with(method, url, params, &nonce(), chrono::Utc::now().timestamp())
    }

    /// `Authorization` header value for a fixed nonce and timestamp.
    pub fn authorization_with(
        &self,
        method: &str,
        url: &str,
        params: &[(&str, &str)],
        nonce: &str,
        timestamp: i64,
    ) -> Result<String, url::ParseError> {
        let timestamp = timestamp.to_string();
        let mut oauth = vec![
            ("oauth_consumer_key", self.consumer_key.as_str()),
            ("oauth_nonce", nonce),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", timestamp.as_str()),
            ("oauth_token", self.token.as_str()),
            ("oauth_version", "1.0"),
        ];

        let signature = self.signature(method, url, params, &oauth)?;
        oauth.push(("oauth_signature", signature.as_str()));

        let fields = oauth
            .iter()
            .sorted_by_key(|(k, _)| *k)
            .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
            .join(", ");
        Ok(format!("OAuth {fields}"))
    }

    fn signature(
        &self,
        method: &str,
        url: &str,
        params: &[(&str, &str)],
        oauth: &[(&str, &str)],
    ) -> Result<String, url::ParseError> {
        let mut parsed = Url::parse(url)?;
        let mut all: Vec<(String, String)> = parsed
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        all.extend(
            params
                .iter()
                .chain(oauth)
                .map(|(k, v)| (k.to_string(), v.to_string())),
        );
        parsed.set_query(None);
        parsed.set_fragment(None);

        let base = signature_base_string(method, parsed.as_str(), &all);
        let key = format!(
            "{}&{}",
            percent_encode(&self.consumer_secret),
            percent_encode(&self.token_secret)
        );
        let mut mac = HmacSha1::new_from_slice(key.as_bytes()).expect("HMAC can take key of any size");
        mac.update(base.as_bytes());
        Ok(STANDARD.encode(mac.finalize().into_bytes()))
    }
}

fn nonce() -> String {
    rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Reference request from X's "Creating a signature" documentation.
    const URL: &str = "https://api.twitter.com/1.1/statuses/update.json?include_entities=true";
    const STATUS: &str = "Hello Ladies + Gentlemen, a signed OAuth request!";
    const NONCE: &str = "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg";
    const TIMESTAMP: i64 = 1318622958;

    fn signer() -> OAuth1Signer {
        OAuth1Signer::new(
            "xvz1evFS4wEEPTGEFPHBog",
            "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw",
            "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb",
            "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE",
        )
    }

    #[test]
    fn test_percent_encode_reserved() {
        assert_eq!(percent_encode("Ladies + Gentlemen!"), "Ladies%20%2B%20Gentlemen%21");
        assert_eq!(percent_encode("a-b.c_d~e"), "a-b.c_d~e");
    }

    #[test]
    fn test_signature_base_string_reference() {
        let params: Vec<(String, String)> = [
            ("status", STATUS),
            ("include_entities", "true"),
            ("oauth_consumer_key", "xvz1evFS4wEEPTGEFPHBog"),
            ("oauth_nonce", NONCE),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", "1318622958"),
            ("oauth_token", "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb"),
            ("oauth_version", "1.0"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let base = signature_base_string("post", "https://api.twitter.com/1.1/statuses/update.json", &params);
        assert_eq!(
            base,
            "POST&https%3A%2F%2Fapi.twitter.com%2F1.1%2Fstatuses%2Fupdate.json&include_entities%3Dtrue%26oauth_consumer_key%3Dxvz1evFS4wEEPTGEFPHBog%26oauth_nonce%3DkYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg%26oauth_signature_method%3DHMAC-SHA1%26oauth_timestamp%3D1318622958%26oauth_token%3D370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb%26oauth_version%3D1.0%26status%3DHello%2520Ladies%2520%252B%2520Gentlemen%252C%2520a%2520signed%2520OAuth%2520request%2521"
        );
    }

    #[test]
    fn test_authorization_reference_signature() {
        let header = signer()
            .authorization_with("POST", URL, &[("status", STATUS)], NONCE, TIMESTAMP)
            .unwrap();

        assert!(header.starts_with("OAuth oauth_consumer_key=\"xvz1evFS4wEEPTGEFPHBog\", "));
        assert!(header.contains("oauth_signature=\"hCtSmYh%2BiHYCEqBWrE7C7hYmtUk%3D\""));
        assert!(header.contains("oauth_timestamp=\"1318622958\""));
        assert!(header.ends_with("oauth_version=\"1.0\""));
    }

    #[test]
    fn test_fresh_nonce_per_call() {
        let a = signer().authorization("POST", "https://upload.twitter.com/1.1/media/upload.json", &[]).unwrap();
        let b = signer().authorization("POST", "https://upload.twitter.com/1.1/media/upload.json", &[]).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_nonce_shape() {
        let n = nonce();
        assert_eq!(n.len(), 32);
        assert!(n.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_invalid_url() {
        assert!(signer().authorization("POST", "not a url", &[]).is_err());
    }

    #[test]
    fn test_debug_hides_secrets() {
        let rendered = format!("{:?}", signer());
        assert!(!rendered.contains("kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw"));
        assert!(!rendered.contains("LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE"));
    }
}
