//! Resource records and response envelopes
//!
//! Every API response is wrapped in an envelope with a `status` field.
//! Only [`STATUS_OK`] marks success; anything else is a logical failure even
//! when the HTTP status was 2xx.

use super::account::Account;
use serde::{Deserialize, Deserializer};
use std::sync::{Arc, Weak};

/// Success sentinel of the `status` field
pub const STATUS_OK: &str = "OK";

/// Decode `null` the same as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A virtual machine
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Droplet {
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub image_id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub size_id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub region_id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub backups_active: bool,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub private_ip_address: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub locked: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default)]
    pub created_at: Option<String>,

    /// Account that fetched this droplet, set after decode
    #[serde(skip)]
    pub(crate) account: Option<Weak<Account>>,
}

impl Droplet {
    /// Account this droplet was listed from, while it is still alive
    pub fn account(&self) -> Option<Arc<Account>> {
        self.account.as_ref().and_then(Weak::upgrade)
    }

    pub(crate) fn attach(&mut self, account: &Arc<Account>) {
        self.account = Some(Arc::downgrade(account));
    }

    /// Region name via the owning account, empty when unresolvable
    pub async fn region_name(&self) -> String {
        match self.account() {
            Some(account) => account.region_name(self.region_id).await,
            None => String::new(),
        }
    }

    /// Size name via the owning account, empty when unresolvable
    pub async fn size_name(&self) -> String {
        match self.account() {
            Some(account) => account.size_name(self.size_id).await,
            None => String::new(),
        }
    }

    /// Image name via the owning account, empty when unresolvable
    pub async fn image_name(&self) -> String {
        match self.account() {
            Some(account) => account.image_name(self.image_id).await,
            None => String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Image {
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub distribution: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub public: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Size {
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Region {
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SshKey {
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct DropletsResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub droplets: Vec<Droplet>,
}

#[derive(Debug, Deserialize)]
pub struct ImagesResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<Image>,
}

#[derive(Debug, Deserialize)]
pub struct SizesResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sizes: Vec<Size>,
}

#[derive(Debug, Deserialize)]
pub struct RegionsResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub regions: Vec<Region>,
}

#[derive(Debug, Deserialize)]
pub struct SshKeysResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ssh_keys: Vec<SshKey>,
}

/// Response of a mutating droplet action
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EventResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default)]
    pub event_id: Option<u64>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl EventResponse {
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }
}

/// Body of a non-2xx response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub error_message: String,
}

/// Parameters for a new droplet, pre-filled from account defaults
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DropletRequest {
    pub name: String,
    pub region_id: Option<u64>,
    pub size_id: Option<u64>,
    pub image_id: Option<u64>,
    pub ssh_key_id: Option<u64>,
}
