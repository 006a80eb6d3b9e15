use std::collections::HashMap;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use shelf_core::{CoreError, CoreResult, ImageStore, ImageUpload, SignedUrl};
use tokio::sync::RwLock;

type UrlSigner = Hmac<Sha256>;

/// Image store keeping objects in memory and signing read URLs.
pub struct MemoryImageStore {
    objects: RwLock<HashMap<String, ImageUpload>>,
    signer: UrlSigner,
    public_url: String,
}

impl MemoryImageStore {
    /// Create a store that signs URLs under `public_url` with an HMAC keyed by `secret`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] when the secret cannot key the MAC.
    pub fn new(public_url: impl Into<String>, secret: impl AsRef<[u8]>) -> CoreResult<Self> {
        let signer =
            UrlSigner::new_from_slice(secret.as_ref()).map_err(|_| CoreError::InvalidInput {
                field: "storage_secret",
                reason: "unusable as an hmac key",
            })?;
        let public_url = public_url.into();
        Ok(Self {
            objects: RwLock::new(HashMap::new()),
            signer,
            public_url: public_url.trim_end_matches('/').to_string(),
        })
    }

    fn mac(&self, key: &str, expires: i64) -> UrlSigner {
        let mut mac = self.signer.clone();
        mac.update(key.as_bytes());
        mac.update(b"\n");
        mac.update(expires.to_string().as_bytes());
        mac
    }

    fn token(&self, key: &str, expires: i64) -> String {
        URL_SAFE_NO_PAD.encode(self.mac(key, expires).finalize().into_bytes())
    }
}

const fn signature_mismatch() -> CoreError {
    CoreError::UrlRejected {
        reason: "signature mismatch",
    }
}

#[async_trait]
impl ImageStore for MemoryImageStore {
    async fn put(&self, key: &str, image: ImageUpload) -> CoreResult<()> {
        if image.bytes.is_empty() {
            return Err(CoreError::InvalidInput {
                field: "image",
                reason: "must not be empty",
            });
        }
        self.objects.write().await.insert(key.to_string(), image);
        Ok(())
    }

    async fn get(&self, key: &str) -> CoreResult<ImageUpload> {
        self.objects
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or(CoreError::NotFound {
                entity: "image",
                id: None,
            })
    }

    fn sign(&self, key: &str, expires_at: DateTime<Utc>) -> SignedUrl {
        let expires = expires_at.timestamp();
        SignedUrl {
            url: format!(
                "{}/storage/{key}?expires={expires}&token={}",
                self.public_url,
                self.token(key, expires)
            ),
            expires_at,
        }
    }

    fn verify(&self, key: &str, expires: i64, token: &str, now: DateTime<Utc>) -> CoreResult<()> {
        if now.timestamp() > expires {
            return Err(CoreError::UrlRejected { reason: "expired" });
        }
        let presented = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| signature_mismatch())?;
        self.mac(key, expires)
            .verify_slice(&presented)
            .map_err(|_| signature_mismatch())
    }
}
