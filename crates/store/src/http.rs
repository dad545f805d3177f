//! HTTP-backed remote gallery store client.
//!
//! Speaks the POST-JSON endpoint convention with a `{ data, error }`
//! response envelope. The caller principal travels as a bearer token; the
//! remote side derives the role from it and is the final arbiter of every
//! check. Transport timeouts and connection failures surface as
//! `TransientNetwork`; retry policy belongs to the caller.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use vitrine_common::{AppError, AppResult, ContentRef, StoreConfig};

use crate::store::GalleryStore;
use crate::{GalleryEntry, Principal, Role, UserProfile};

#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    data: Option<T>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[allow(dead_code)]
    code: String,
    message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateEntryRequest<'a> {
    media: &'a ContentRef,
    title: &'a str,
    description: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateEntryRequest<'a> {
    entry_id: &'a str,
    title: &'a str,
    description: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteEntryRequest<'a> {
    entry_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReorderEntriesRequest<'a> {
    entry_ids: &'a [String],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AssignRoleRequest<'a> {
    user: &'a Principal,
    role: Role,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GetProfileRequest<'a> {
    user: &'a Principal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveProfileRequest<'a> {
    profile: &'a UserProfile,
}

/// Remote gallery store reached over HTTP.
pub struct HttpStore {
    client: Client,
    base_url: Url,
}

impl HttpStore {
    /// Create a client for the configured remote store.
    pub fn new(config: &StoreConfig) -> AppResult<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| AppError::Config(format!("Invalid store URL: {e}")))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> AppResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| AppError::Internal(format!("Invalid endpoint path: {e}")))
    }

    async fn request<B, T>(
        &self,
        path: &str,
        caller: Option<&Principal>,
        body: &B,
    ) -> AppResult<Option<T>>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let mut request = self.client.post(self.endpoint(path)?).json(body);
        if let Some(principal) = caller {
            request = request.bearer_auth(principal.as_str());
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            let envelope: ApiEnvelope<T> = response.json().await?;
            Ok(envelope.data)
        } else {
            let message = response
                .json::<ApiEnvelope<serde_json::Value>>()
                .await
                .ok()
                .and_then(|envelope| envelope.error)
                .map_or_else(|| status.to_string(), |error| error.message);
            debug!(%status, path, "store call failed");
            Err(map_status(status, message))
        }
    }

    async fn post<B, T>(&self, path: &str, caller: Option<&Principal>, body: &B) -> AppResult<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        self.request(path, caller, body).await?.ok_or_else(|| {
            AppError::Internal(format!("Response from {path} is missing data"))
        })
    }

    async fn post_unit<B>(&self, path: &str, caller: Option<&Principal>, body: &B) -> AppResult<()>
    where
        B: Serialize + Sync,
    {
        self.request::<B, serde_json::Value>(path, caller, body)
            .await
            .map(|_| ())
    }
}

/// Map a remote status onto the error taxonomy.
fn map_status(status: StatusCode, message: String) -> AppError {
    match status {
        StatusCode::UNAUTHORIZED => AppError::AuthenticationRequired,
        StatusCode::FORBIDDEN => AppError::AuthorizationDenied(message),
        StatusCode::NOT_FOUND => AppError::NotFound(message),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            AppError::InvalidArgument(message)
        }
        status if status.is_server_error() => AppError::TransientNetwork(message),
        status => AppError::Internal(format!("{status}: {message}")),
    }
}

#[async_trait::async_trait]
impl GalleryStore for HttpStore {
    async fn list_entries(&self) -> AppResult<Vec<GalleryEntry>> {
        self.post("gallery/entries", None, &serde_json::json!({}))
            .await
    }

    async fn create_entry(
        &self,
        caller: &Principal,
        media: ContentRef,
        title: &str,
        description: &str,
    ) -> AppResult<()> {
        self.post_unit(
            "gallery/entries/create",
            Some(caller),
            &CreateEntryRequest {
                media: &media,
                title,
                description,
            },
        )
        .await
    }

    async fn update_entry(
        &self,
        caller: &Principal,
        id: &str,
        title: &str,
        description: &str,
    ) -> AppResult<()> {
        self.post_unit(
            "gallery/entries/update",
            Some(caller),
            &UpdateEntryRequest {
                entry_id: id,
                title,
                description,
            },
        )
        .await
    }

    async fn delete_entry(&self, caller: &Principal, id: &str) -> AppResult<()> {
        self.post_unit(
            "gallery/entries/delete",
            Some(caller),
            &DeleteEntryRequest { entry_id: id },
        )
        .await
    }

    async fn reorder_entries(&self, caller: &Principal, ids: &[String]) -> AppResult<()> {
        self.post_unit(
            "gallery/entries/reorder",
            Some(caller),
            &ReorderEntriesRequest { entry_ids: ids },
        )
        .await
    }

    async fn current_role(&self, caller: Option<&Principal>) -> AppResult<Role> {
        self.post("roles/current", caller, &serde_json::json!({}))
            .await
    }

    async fn assign_role(&self, caller: &Principal, user: &Principal, role: Role) -> AppResult<()> {
        self.post_unit(
            "roles/assign",
            Some(caller),
            &AssignRoleRequest { user, role },
        )
        .await
    }

    async fn current_admin(&self) -> AppResult<Principal> {
        self.post("roles/admin", None, &serde_json::json!({})).await
    }

    async fn get_profile(&self, user: &Principal) -> AppResult<Option<UserProfile>> {
        self.request("profiles/show", None, &GetProfileRequest { user })
            .await
    }

    async fn save_profile(&self, caller: &Principal, profile: UserProfile) -> AppResult<()> {
        self.post_unit(
            "profiles/save",
            Some(caller),
            &SaveProfileRequest { profile: &profile },
        )
        .await
    }
}
