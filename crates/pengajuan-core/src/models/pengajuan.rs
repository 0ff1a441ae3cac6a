use serde::{Deserialize, Serialize};

use super::lenient;

/// A submission as listed by `GET /pengajuan`, and the `pengajuan` record
/// inside the detail reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pengajuan {
    #[serde(deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub subject: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub keterangan: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub nama_user: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub jumlah_item: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub updated_at: Option<String>,
}

impl Pengajuan {
    /// Approval state, `None` while the submission is still pending
    pub fn decision(&self) -> Option<PengajuanStatus> {
        self.status.as_deref().and_then(PengajuanStatus::parse)
    }
}

/// Approval decision sent to `PUT /pengajuan/{id}/status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PengajuanStatus {
    Approved,
    Rejected,
}

impl PengajuanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PengajuanStatus::Approved => "approved",
            PengajuanStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "approved" => Some(PengajuanStatus::Approved),
            "rejected" => Some(PengajuanStatus::Rejected),
            _ => None,
        }
    }
}

/// One requested product line in a submission. Only `id_produk` and `harga`
/// are sent back when saving; the product columns are read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailItem {
    #[serde(deserialize_with = "lenient::string")]
    pub id_produk: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub harga: String,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub nama: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub merk: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub tipe: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub satuan: Option<String>,
}

impl DetailItem {
    /// A line for the submission form
    pub fn new(id_produk: impl Into<String>, harga: impl Into<String>) -> Self {
        Self {
            id_produk: id_produk.into(),
            harga: harga.into(),
            nama: None,
            merk: None,
            tipe: None,
            satuan: None,
        }
    }
}

/// `GET /pengajuan/edit/{id}` payload: the submission and its items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PengajuanDetail {
    pub pengajuan: Pengajuan,
    #[serde(default)]
    pub detail_item: Vec<DetailItem>,
}

impl PengajuanDetail {
    /// Sum of item prices. Items with unparsable prices are skipped.
    pub fn total_harga(&self) -> f64 {
        self.detail_item
            .iter()
            .filter_map(|item| item.harga.trim().parse::<f64>().ok())
            .sum()
    }
}

/// Body for creating or updating a submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PengajuanForm {
    pub subject: String,
    pub keterangan: String,
    pub detail_item: Vec<DetailItem>,
}

impl PengajuanForm {
    /// Client-side checks mirroring the dashboard form
    pub fn validate(&self) -> Result<(), String> {
        if self.subject.trim().is_empty() {
            return Err("subject is required".to_string());
        }
        if self.detail_item.is_empty() {
            return Err("at least one detail_item is required".to_string());
        }
        for (pos, item) in self.detail_item.iter().enumerate() {
            if item.id_produk.trim().is_empty() {
                return Err(format!("detail_item[{}] has no id_produk", pos));
            }
            if item.harga.trim().is_empty() {
                return Err(format!("detail_item[{}] has no harga", pos));
            }
        }
        Ok(())
    }
}

/// `GET /pengajuan` payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PengajuanList {
    #[serde(default)]
    pub pengajuan: Vec<Pengajuan>,
}
