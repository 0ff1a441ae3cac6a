//! API client for the pengajuan backend.
//!
//! `ApiClient` signs users in and exposes one typed method per backend
//! endpoint. Every authenticated call goes through the shared
//! `RequestDispatcher`, so token attachment and refresh live in one place.

use reqwest::{header, Client};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{ApiError, BackendResponse, PendingRequest, RequestDispatcher};
use crate::auth::{Credential, CredentialStore, SessionEvent, SignOutReason};
use crate::config::Config;
use crate::models::{
    Ack, Envelope, MasterDetail, MasterList, MasterProduk, MenuDetail, MenuItem, MenuList,
    NavigationMenu, Pengajuan, PengajuanDetail, PengajuanForm, PengajuanList, PengajuanStatus,
    User, UserDetail, UserForm, UserList,
};

// ============================================================================
// Constants
// ============================================================================

const LOGIN_PATH: &str = "/api/v1/auth/login";

const PRODUK_MASTER_PATH: &str = "/produk/master";
const PENGAJUAN_PATH: &str = "/pengajuan";
const PENGAJUAN_EDIT_PATH: &str = "/pengajuan/edit";
const SETTINGS_MENU_PATH: &str = "/settings/menu";
const SETTINGS_USERS_PATH: &str = "/settings/users";
const BASE_MENU_PATH: &str = "/base/menu";

#[derive(Debug, Serialize)]
struct StatusUpdate {
    status: PengajuanStatus,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// Login reply; failed logins may omit `data` entirely
#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    code: Option<u16>,
    #[serde(default, alias = "Status")]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<LoginData>,
}

#[derive(Debug, Deserialize)]
struct LoginData {
    username: String,
    #[serde(default)]
    nama: String,
    #[serde(default)]
    role: String,
    token: String,
    #[serde(rename = "refresh-token")]
    refresh_token: String,
}

/// API client for the pengajuan backend.
/// Clone is cheap - the dispatcher shares its HTTP client and credential store.
#[derive(Debug, Clone)]
pub struct ApiClient {
    dispatcher: RequestDispatcher,
}

impl ApiClient {
    /// Create a client for the backend named by `config`
    pub fn new(config: &Config, store: CredentialStore) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self::with_http_client(client, &config.base_url(), store))
    }

    pub fn with_http_client(client: Client, base_url: &str, store: CredentialStore) -> Self {
        Self {
            dispatcher: RequestDispatcher::new(client, base_url, store),
        }
    }

    pub fn dispatcher(&self) -> &RequestDispatcher {
        &self.dispatcher
    }

    pub fn store(&self) -> &CredentialStore {
        self.dispatcher.store()
    }

    /// Events telling the front end to return to sign-in
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<SessionEvent> {
        self.dispatcher.subscribe()
    }

    pub fn current_user(&self) -> Option<Credential> {
        self.store().get()
    }

    // ===== Session =====

    /// Sign in and store the resulting credential
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Credential, ApiError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(ApiError::InvalidCredentials);
        }

        let response = self
            .dispatcher
            .http()
            .post(self.dispatcher.url(LOGIN_PATH))
            .header(header::ACCEPT, "application/json")
            .json(&LoginRequest {
                username: username.trim(),
                password,
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::BAD_REQUEST {
            warn!(%status, "Login rejected");
            return Err(ApiError::InvalidCredentials);
        }
        if !status.is_success() {
            return Err(ApiError::from_status(status, &body));
        }

        let reply: LoginResponse = serde_json::from_str(&body)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse login response: {}", e)))?;
        let envelope = Envelope {
            code: reply.code,
            status: reply.status,
            message: reply.message,
            data: reply.data,
        };
        if !envelope.is_success() {
            warn!(message = ?envelope.message, "Login rejected by backend");
            return Err(ApiError::InvalidCredentials);
        }
        let data = envelope
            .data
            .ok_or_else(|| ApiError::InvalidResponse("Login response has no data".to_string()))?;

        let credential = Credential::new(
            data.username,
            data.nama,
            data.role,
            data.token,
            data.refresh_token,
        );
        self.store().set(credential.clone());
        info!(user = %credential.subject_id, role = %credential.role, "Login successful");
        Ok(credential)
    }

    /// Sign out. Returns whether a session was active.
    pub fn logout(&self) -> bool {
        self.dispatcher
            .invalidator()
            .invalidate(SignOutReason::SignedOut)
    }

    pub async fn dispatch(&self, request: PendingRequest) -> Result<BackendResponse, ApiError> {
        self.dispatcher.dispatch(request).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.dispatch(PendingRequest::get(path)).await?;
        let envelope: Envelope<T> = response.json()?;
        Ok(envelope.data)
    }

    async fn send_body<B: Serialize + ?Sized>(
        &self,
        request: PendingRequest,
        body: &B,
    ) -> Result<Ack, ApiError> {
        let response = self.dispatch(request.json(body)?).await?;
        Self::ack(&response)
    }

    async fn delete(&self, path: &str) -> Result<Ack, ApiError> {
        let response = self.dispatch(PendingRequest::delete(path)).await?;
        Self::ack(&response)
    }

    /// Mutations succeed on any 2xx; a non-JSON body becomes the message
    fn ack(response: &BackendResponse) -> Result<Ack, ApiError> {
        let body = response.body.trim();
        if body.is_empty() {
            return Ok(Ack::default());
        }
        Ok(response.json().unwrap_or_else(|_| Ack {
            message: Some(body.to_string()),
            ..Ack::default()
        }))
    }

    /// `{collection}/{id}`, rejecting ids that would change the path
    fn item_path(collection: &str, id: &str) -> Result<String, ApiError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(ApiError::InvalidRequest("ID is required".to_string()));
        }
        if id.contains(['/', '?', '#']) {
            return Err(ApiError::InvalidRequest(format!("Invalid ID: {}", id)));
        }
        Ok(format!("{}/{}", collection, id))
    }

    // ===== Navigation =====

    /// Fetch the sidebar navigation for the signed-in role
    pub async fn fetch_navigation(&self) -> Result<NavigationMenu, ApiError> {
        let list: MenuList = self.get(BASE_MENU_PATH).await?;
        debug!(items = list.menu.len(), "Navigation menu received");
        Ok(NavigationMenu::build(list.menu))
    }

    // ===== Produk Master =====

    pub async fn fetch_master_produk(&self) -> Result<Vec<MasterProduk>, ApiError> {
        let list: MasterList = self.get(PRODUK_MASTER_PATH).await?;
        Ok(list.produk)
    }

    pub async fn fetch_master_produk_by_id(&self, id: &str) -> Result<MasterProduk, ApiError> {
        let detail: MasterDetail = self.get(&Self::item_path(PRODUK_MASTER_PATH, id)?).await?;
        Ok(detail.master)
    }

    pub async fn create_master_produk(&self, produk: &MasterProduk) -> Result<Ack, ApiError> {
        self.send_body(PendingRequest::post(PRODUK_MASTER_PATH), produk)
            .await
    }

    pub async fn update_master_produk(&self, id: &str, produk: &MasterProduk) -> Result<Ack, ApiError> {
        let path = Self::item_path(PRODUK_MASTER_PATH, id)?;
        self.send_body(PendingRequest::put(path), produk).await
    }

    pub async fn delete_master_produk(&self, id: &str) -> Result<Ack, ApiError> {
        self.delete(&Self::item_path(PRODUK_MASTER_PATH, id)?).await
    }

    // ===== Pengajuan =====

    pub async fn fetch_pengajuan(&self) -> Result<Vec<Pengajuan>, ApiError> {
        let list: PengajuanList = self.get(PENGAJUAN_PATH).await?;
        Ok(list.pengajuan)
    }

    pub async fn fetch_pengajuan_detail(&self, id: &str) -> Result<PengajuanDetail, ApiError> {
        self.get(&Self::item_path(PENGAJUAN_EDIT_PATH, id)?).await
    }

    pub async fn create_pengajuan(&self, form: &PengajuanForm) -> Result<Ack, ApiError> {
        form.validate().map_err(ApiError::InvalidRequest)?;
        self.send_body(PendingRequest::post(PENGAJUAN_PATH), form).await
    }

    /// The backend updates submissions with a POST to the edit path
    pub async fn update_pengajuan(&self, id: &str, form: &PengajuanForm) -> Result<Ack, ApiError> {
        form.validate().map_err(ApiError::InvalidRequest)?;
        let path = Self::item_path(PENGAJUAN_EDIT_PATH, id)?;
        self.send_body(PendingRequest::post(path), form).await
    }

    /// Approve or reject a submission
    pub async fn update_pengajuan_status(
        &self,
        id: &str,
        status: PengajuanStatus,
    ) -> Result<Ack, ApiError> {
        let path = format!("{}/status", Self::item_path(PENGAJUAN_PATH, id)?);
        info!(id = %id.trim(), status = status.as_str(), "Updating pengajuan status");
        self.send_body(PendingRequest::put(path), &StatusUpdate { status })
            .await
    }

    // ===== Settings: Menu =====

    pub async fn fetch_menu_settings(&self) -> Result<Vec<MenuItem>, ApiError> {
        let list: MenuList = self.get(SETTINGS_MENU_PATH).await?;
        Ok(list.menu)
    }

    pub async fn fetch_menu_setting(&self, id: &str) -> Result<MenuItem, ApiError> {
        let detail: MenuDetail = self.get(&Self::item_path(SETTINGS_MENU_PATH, id)?).await?;
        Ok(detail.menu)
    }

    pub async fn create_menu_setting(&self, menu: &MenuItem) -> Result<Ack, ApiError> {
        self.send_body(PendingRequest::post(SETTINGS_MENU_PATH), menu)
            .await
    }

    pub async fn update_menu_setting(&self, id: &str, menu: &MenuItem) -> Result<Ack, ApiError> {
        let path = Self::item_path(SETTINGS_MENU_PATH, id)?;
        self.send_body(PendingRequest::put(path), menu).await
    }

    pub async fn delete_menu_setting(&self, id: &str) -> Result<Ack, ApiError> {
        self.delete(&Self::item_path(SETTINGS_MENU_PATH, id)?).await
    }

    // ===== Settings: Users =====

    pub async fn fetch_users(&self) -> Result<Vec<User>, ApiError> {
        let list: UserList = self.get(SETTINGS_USERS_PATH).await?;
        Ok(list.users)
    }

    pub async fn fetch_user(&self, id: &str) -> Result<User, ApiError> {
        let detail: UserDetail = self.get(&Self::item_path(SETTINGS_USERS_PATH, id)?).await?;
        Ok(detail.users)
    }

    pub async fn create_user(&self, form: &UserForm) -> Result<Ack, ApiError> {
        if form.password.as_deref().map_or(true, str::is_empty) {
            return Err(ApiError::InvalidRequest(
                "password is required for new users".to_string(),
            ));
        }
        self.send_body(PendingRequest::post(SETTINGS_USERS_PATH), form)
            .await
    }

    pub async fn update_user(&self, id: &str, form: &UserForm) -> Result<Ack, ApiError> {
        let path = Self::item_path(SETTINGS_USERS_PATH, id)?;
        self.send_body(PendingRequest::put(path), form).await
    }

    pub async fn delete_user(&self, id: &str) -> Result<Ack, ApiError> {
        self.delete(&Self::item_path(SETTINGS_USERS_PATH, id)?).await
    }
}
