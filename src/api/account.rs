//! Account
//!
//! The session context: credentials, default droplet settings and the three
//! lazily populated name caches. All resource fetches and droplet actions go
//! through here.

use super::cache::{NameCache, NameMap};
use super::error::{ApiError, Result};
use super::http::{sanitize_for_log, ApiHttpClient, Credentials};
use super::types::{
    Droplet, DropletRequest, DropletsResponse, EventResponse, Image, ImagesResponse, Region,
    RegionsResponse, Size, SizesResponse, SshKey, SshKeysResponse,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;

#[derive(Debug)]
pub struct Account {
    pub name: Option<String>,
    credentials: Credentials,
    http: ApiHttpClient,

    /// Defaults used to pre-fill new droplets
    pub region_id: Option<u64>,
    pub size_id: Option<u64>,
    pub image_id: Option<u64>,
    pub ssh_key_id: Option<u64>,

    image_names: NameCache,
    region_names: NameCache,
    size_names: NameCache,
}

impl Account {
    /// Create an account talking to the default API root
    pub fn new(client_id: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        Ok(Self::with_http(
            Credentials::new(client_id, api_key),
            ApiHttpClient::new()?,
        ))
    }

    /// Create an account on top of an existing HTTP client
    pub fn with_http(credentials: Credentials, http: ApiHttpClient) -> Self {
        Self {
            name: None,
            credentials,
            http,
            region_id: None,
            size_id: None,
            image_id: None,
            ssh_key_id: None,
            image_names: NameCache::new("image"),
            region_names: NameCache::new("region"),
            size_names: NameCache::new("size"),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.credentials.client_id
    }

    pub fn http(&self) -> &ApiHttpClient {
        &self.http
    }

    /// Fetch `path` and decode it as `T`
    async fn load<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = match self.http.get(path, &self.credentials).await {
            Ok(body) => body,
            Err(e) => {
                tracing::error!("{}", sanitize_for_log(e.body().unwrap_or_default()));
                return Err(e);
            }
        };

        serde_json::from_slice(&body).map_err(|e| {
            tracing::error!("{}", sanitize_for_log(&String::from_utf8_lossy(&body)));
            ApiError::Decode(e)
        })
    }

    /// List droplets, each pointing back at this account
    pub async fn droplets(self: &Arc<Self>) -> Result<Vec<Droplet>> {
        let rsp: DropletsResponse = self.load("/droplets").await?;
        let mut droplets = rsp.droplets;
        for droplet in &mut droplets {
            droplet.attach(self);
        }
        Ok(droplets)
    }

    pub async fn images(&self) -> Result<Vec<Image>> {
        let rsp: ImagesResponse = self.load("/images").await?;
        Ok(rsp.images)
    }

    pub async fn sizes(&self) -> Result<Vec<Size>> {
        let rsp: SizesResponse = self.load("/sizes").await?;
        Ok(rsp.sizes)
    }

    pub async fn regions(&self) -> Result<Vec<Region>> {
        let rsp: RegionsResponse = self.load("/regions").await?;
        Ok(rsp.regions)
    }

    pub async fn ssh_keys(&self) -> Result<Vec<SshKey>> {
        let rsp: SshKeysResponse = self.load("/ssh_keys").await?;
        Ok(rsp.ssh_keys)
    }

    // =========================================================================
    // Name caches
    // =========================================================================

    /// Image id -> name, fetched on first access
    pub async fn cached_images(&self) -> Result<&NameMap> {
        self.image_names
            .get_or_populate(|| async move {
                let images = self.images().await?;
                Ok::<_, ApiError>(images.into_iter().map(|i| (i.id, i.name)))
            })
            .await
    }

    /// Region id -> name, fetched on first access
    pub async fn cached_regions(&self) -> Result<&NameMap> {
        self.region_names
            .get_or_populate(|| async move {
                let regions = self.regions().await?;
                Ok::<_, ApiError>(regions.into_iter().map(|r| (r.id, r.name)))
            })
            .await
    }

    /// Size id -> name, fetched on first access
    pub async fn cached_sizes(&self) -> Result<&NameMap> {
        self.size_names
            .get_or_populate(|| async move {
                let sizes = self.sizes().await?;
                Ok::<_, ApiError>(sizes.into_iter().map(|s| (s.id, s.name)))
            })
            .await
    }

    /// Image name for `id`; `None` when the id is unknown
    pub async fn lookup_image(&self, id: u64) -> Result<Option<String>> {
        Ok(self.cached_images().await?.get(&id).cloned())
    }

    /// Region name for `id`; `None` when the id is unknown
    pub async fn lookup_region(&self, id: u64) -> Result<Option<String>> {
        Ok(self.cached_regions().await?.get(&id).cloned())
    }

    /// Size name for `id`; `None` when the id is unknown
    pub async fn lookup_size(&self, id: u64) -> Result<Option<String>> {
        Ok(self.cached_sizes().await?.get(&id).cloned())
    }

    /// Image name for `id`, or an empty string if unknown or the fetch failed.
    /// Use [`lookup_image`](Self::lookup_image) to see the error.
    pub async fn image_name(&self, id: u64) -> String {
        name_or_empty(self.lookup_image(id).await)
    }

    /// Region name for `id`, or an empty string if unknown or the fetch failed
    pub async fn region_name(&self, id: u64) -> String {
        name_or_empty(self.lookup_region(id).await)
    }

    /// Size name for `id`, or an empty string if unknown or the fetch failed
    pub async fn size_name(&self, id: u64) -> String {
        name_or_empty(self.lookup_size(id).await)
    }

    // =========================================================================
    // Droplet actions
    // =========================================================================

    /// Rebuild droplet `id` from image `image_id`
    pub async fn rebuild_droplet(&self, id: u64, image_id: u64) -> Result<EventResponse> {
        tracing::info!("rebuilding droplet {} with image {}", id, image_id);
        let path = format!("/droplets/{}/rebuild?image_id={}", id, image_id);
        let rsp: EventResponse = self.load(&path).await?;
        if !rsp.is_ok() {
            return Err(ApiError::RebuildFailed { response: rsp });
        }
        Ok(rsp)
    }

    /// Destroy droplet `id`
    pub async fn destroy_droplet(&self, id: u64) -> Result<EventResponse> {
        tracing::info!("destroying droplet {}", id);
        let rsp: EventResponse = self.load(&format!("/droplets/{}/destroy", id)).await?;
        if !rsp.is_ok() {
            return Err(ApiError::DestroyFailed {
                message: rsp.error_message.clone().unwrap_or_default(),
                response: rsp,
            });
        }
        Ok(rsp)
    }

    /// New droplet request pre-filled with this account's defaults
    pub fn default_droplet(&self) -> DropletRequest {
        let positive = |id: Option<u64>| id.filter(|id| *id > 0);
        DropletRequest {
            region_id: positive(self.region_id),
            size_id: positive(self.size_id),
            image_id: positive(self.image_id),
            ssh_key_id: positive(self.ssh_key_id),
            ..Default::default()
        }
    }
}

fn name_or_empty(lookup: Result<Option<String>>) -> String {
    match lookup {
        Ok(name) => name.unwrap_or_default(),
        Err(e) => {
            tracing::debug!("name lookup failed: {}", e);
            String::new()
        }
    }
}
