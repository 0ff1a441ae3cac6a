use serde::{Deserialize, Serialize};

use super::lenient;

/// Product master record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterProduk {
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub id_produk: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub nama: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub merk: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub satuan: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub harga: String,
}

impl MasterProduk {
    /// Price as a number, `None` when the backend sent something unparsable
    pub fn harga_value(&self) -> Option<f64> {
        self.harga.trim().parse().ok()
    }

    /// Key used by the pengajuan form to reference this product
    pub fn key(&self) -> &str {
        &self.id_produk
    }
}

/// `GET /produk/master` payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MasterList {
    #[serde(default)]
    pub produk: Vec<MasterProduk>,
}

/// `GET /produk/master/{id}` payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasterDetail {
    pub master: MasterProduk,
}
