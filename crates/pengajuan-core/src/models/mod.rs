//! Data models for the backend entities.
//!
//! - `Envelope`, `Ack`: the `{code, status, message, data}` wrapper every
//!   endpoint replies with
//! - `MasterProduk`: product master data
//! - `Pengajuan`, `PengajuanDetail`, `DetailItem`: product submissions
//! - `MenuItem`, `NavigationMenu`: menu configuration and sidebar navigation
//! - `User`, `UserForm`: user accounts

pub mod envelope;
pub mod menu;
pub mod pengajuan;
pub mod produk;
pub mod user;

pub use envelope::{Ack, Envelope};
pub use menu::{MenuDetail, MenuItem, MenuList, NavEntry, NavigationMenu};
pub use pengajuan::{
    DetailItem, Pengajuan, PengajuanDetail, PengajuanForm, PengajuanList, PengajuanStatus,
};
pub use produk::{MasterDetail, MasterList, MasterProduk};
pub use user::{User, UserDetail, UserForm, UserList};

/// The backend is loose about scalar types: ids, prices and flags arrive as
/// strings or numbers depending on the endpoint. These helpers normalize them
/// to strings.
pub(crate) mod lenient {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Int(i64),
        Float(f64),
        Bool(bool),
    }

    impl Scalar {
        fn into_string(self) -> String {
            match self {
                Scalar::Text(s) => s,
                Scalar::Int(n) => n.to_string(),
                Scalar::Float(f) => f.to_string(),
                Scalar::Bool(b) => if b { "1" } else { "0" }.to_string(),
            }
        }
    }

    pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(Option::<Scalar>::deserialize(deserializer)?
            .map(Scalar::into_string)
            .unwrap_or_default())
    }

    pub fn opt_string<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        Ok(Option::<Scalar>::deserialize(deserializer)?.map(Scalar::into_string))
    }
}

/// Whether a backend flag value ("1", "Y", "aktif", true...) means enabled
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "y" | "yes" | "true" | "aktif" | "active"
    )
}
