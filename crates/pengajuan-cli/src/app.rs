//! Command execution for the pengajuan CLI.
//!
//! `App` wires the config, the session-file-backed credential store and the
//! `ApiClient` together, runs one command, and reports when the session was
//! ended along the way.

use std::io::{self, Write};

use anyhow::{bail, Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{info, warn};

use pengajuan_core::models::{
    Ack, MasterProduk, MenuItem, NavEntry, Pengajuan, PengajuanForm, PengajuanStatus, User,
    UserForm,
};
use pengajuan_core::{ApiClient, Config, CredentialStore, SessionEvent, SessionFile};

use crate::{Commands, CrudAction, PengajuanAction};
use crate::utils::{format_date, format_expiry, format_optional, format_rupiah, truncate_string};

// ============================================================================
// Constants
// ============================================================================

/// Column width for names in list output
const NAME_WIDTH: usize = 32;

/// Column width for free-text columns in list output
const TEXT_WIDTH: usize = 40;

/// Maximum length for username input.
const MAX_USERNAME_LENGTH: usize = 50;

// ============================================================================
// App
// ============================================================================

pub struct App {
    config: Config,
    api: ApiClient,
    events: broadcast::Receiver<SessionEvent>,
}

impl App {
    pub fn new() -> Result<Self> {
        let config = Config::load()?;
        let cache_dir = config.cache_dir()?;
        let store = CredentialStore::with_session_file(SessionFile::in_dir(cache_dir));
        let api = ApiClient::new(&config, store)?;
        let events = api.subscribe();

        info!(base_url = %config.base_url(), signed_in = api.store().is_authenticated(), "App initialized");
        Ok(Self { config, api, events })
    }

    pub async fn run(&mut self, command: Commands) -> Result<()> {
        let result = match command {
            Commands::Login { username } => self.login(username).await,
            Commands::Logout => {
                if !self.api.logout() {
                    println!("Not signed in.");
                }
                Ok(())
            }
            Commands::Whoami => self.whoami(),
            Commands::Nav => self.nav().await,
            Commands::Home => self.home().await,
            Commands::Produk { action } => self.produk(action).await,
            Commands::Pengajuan { action } => self.pengajuan(action).await,
            Commands::Menu { action } => self.menu(action).await,
            Commands::Users { action } => self.users(action).await,
        };
        self.report_session_events();
        result
    }

    /// Print why the session ended, if it did during this command
    fn report_session_events(&mut self) {
        loop {
            match self.events.try_recv() {
                Ok(SessionEvent::SignInRequired { reason }) => {
                    eprintln!("{}", reason.message());
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "Missed session events");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
    }

    // ===== Session =====

    async fn login(&mut self, username: Option<String>) -> Result<()> {
        let username = match username {
            Some(u) => u,
            None => Self::prompt_username(self.config.last_username.as_deref())?,
        };
        if username.is_empty() || username.len() > MAX_USERNAME_LENGTH {
            bail!("Username must be 1-{} characters", MAX_USERNAME_LENGTH);
        }
        let password = rpassword::prompt_password("Password: ")?;

        println!("Authenticating...");
        let credential = self.api.authenticate(&username, &password).await?;

        self.config.last_username = Some(username);
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }

        println!(
            "Signed in as {} ({}, role {})",
            credential.display_name, credential.subject_id, credential.role
        );
        Ok(())
    }

    fn prompt_username(last: Option<&str>) -> Result<String> {
        match last {
            Some(last) => print!("Username [{}]: ", last),
            None => print!("Username: "),
        }
        io::stdout().flush()?;

        let mut username = String::new();
        io::stdin().read_line(&mut username)?;
        let username = username.trim();
        Ok(match (username.is_empty(), last) {
            (true, Some(last)) => last.to_string(),
            _ => username.to_string(),
        })
    }

    fn whoami(&self) -> Result<()> {
        let Some(credential) = self.api.current_user() else {
            println!("Not signed in.");
            return Ok(());
        };

        println!("User:    {} ({})", credential.display_name, credential.subject_id);
        println!("Role:    {}", credential.role);
        println!(
            "Token:   {}",
            format_expiry(credential.minutes_until_expiry())
        );
        if credential.needs_refresh() {
            println!("         will be refreshed on the next request");
        }
        Ok(())
    }

    // ===== Navigation =====

    async fn nav(&self) -> Result<()> {
        let nav = self.api.fetch_navigation().await?;
        if nav.is_empty() {
            println!("No menu entries for this role.");
            return Ok(());
        }
        print_nav(&nav.entries, 0);
        Ok(())
    }

    /// Dashboard summary: products and submissions fetched concurrently
    async fn home(&self) -> Result<()> {
        let (produk, pengajuan) = futures::try_join!(
            self.api.fetch_master_produk(),
            self.api.fetch_pengajuan()
        )?;

        println!("Master produk: {}", produk.len());
        println!("Pengajuan:     {}", pengajuan.len());

        let mut recent = pengajuan;
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if !recent.is_empty() {
            println!();
            print_pengajuan(&recent[..recent.len().min(5)]);
        }
        Ok(())
    }

    // ===== Resources =====

    async fn produk(&self, action: CrudAction) -> Result<()> {
        match action {
            CrudAction::List => print_produk(&self.api.fetch_master_produk().await?),
            CrudAction::Show { id } => print_json(&self.api.fetch_master_produk_by_id(&id).await?)?,
            CrudAction::Add { json } => {
                let produk: MasterProduk = parse_body(&json)?;
                print_ack(&self.api.create_master_produk(&produk).await?, "Produk created");
            }
            CrudAction::Edit { id, json } => {
                let produk: MasterProduk = parse_body(&json)?;
                print_ack(&self.api.update_master_produk(&id, &produk).await?, "Produk updated");
            }
            CrudAction::Delete { id } => {
                print_ack(&self.api.delete_master_produk(&id).await?, "Produk deleted");
            }
        }
        Ok(())
    }

    async fn pengajuan(&self, action: PengajuanAction) -> Result<()> {
        match action {
            PengajuanAction::List => print_pengajuan(&self.api.fetch_pengajuan().await?),
            PengajuanAction::Show { id } => {
                let detail = self.api.fetch_pengajuan_detail(&id).await?;
                let record = &detail.pengajuan;
                println!("Subject:    {}", record.subject);
                println!("Keterangan: {}", record.keterangan);
                println!("Diajukan:   {}", format_optional(&record.nama_user, "-"));
                println!("Status:     {}", format_optional(&record.status, "-"));
                for item in &detail.detail_item {
                    println!(
                        "  {:<12} {:<NAME_WIDTH$} {:<16} {:<8} {:>16}",
                        item.id_produk,
                        truncate_string(item.nama.as_deref().unwrap_or(""), NAME_WIDTH),
                        truncate_string(item.merk.as_deref().unwrap_or(""), 16),
                        item.satuan.as_deref().unwrap_or(""),
                        format_rupiah(&item.harga)
                    );
                }
                println!("Total:      {}", format_rupiah(&detail.total_harga().to_string()));
            }
            PengajuanAction::Add { json } => {
                let form: PengajuanForm = parse_body(&json)?;
                print_ack(&self.api.create_pengajuan(&form).await?, "Pengajuan submitted");
            }
            PengajuanAction::Edit { id, json } => {
                let form: PengajuanForm = parse_body(&json)?;
                print_ack(&self.api.update_pengajuan(&id, &form).await?, "Pengajuan updated");
            }
            PengajuanAction::Approve { id } => {
                let ack = self.api.update_pengajuan_status(&id, PengajuanStatus::Approved).await?;
                print_ack(&ack, "Pengajuan approved");
            }
            PengajuanAction::Reject { id } => {
                let ack = self.api.update_pengajuan_status(&id, PengajuanStatus::Rejected).await?;
                print_ack(&ack, "Pengajuan rejected");
            }
        }
        Ok(())
    }

    async fn menu(&self, action: CrudAction) -> Result<()> {
        match action {
            CrudAction::List => print_menu(&self.api.fetch_menu_settings().await?),
            CrudAction::Show { id } => print_json(&self.api.fetch_menu_setting(&id).await?)?,
            CrudAction::Add { json } => {
                let menu: MenuItem = parse_body(&json)?;
                print_ack(&self.api.create_menu_setting(&menu).await?, "Menu created");
            }
            CrudAction::Edit { id, json } => {
                let menu: MenuItem = parse_body(&json)?;
                print_ack(&self.api.update_menu_setting(&id, &menu).await?, "Menu updated");
            }
            CrudAction::Delete { id } => {
                print_ack(&self.api.delete_menu_setting(&id).await?, "Menu deleted");
            }
        }
        Ok(())
    }

    async fn users(&self, action: CrudAction) -> Result<()> {
        match action {
            CrudAction::List => print_users(&self.api.fetch_users().await?),
            CrudAction::Show { id } => print_json(&self.api.fetch_user(&id).await?)?,
            CrudAction::Add { json } => {
                let form: UserForm = parse_body(&json)?;
                print_ack(&self.api.create_user(&form).await?, "User created");
            }
            CrudAction::Edit { id, json } => {
                let form: UserForm = parse_body(&json)?;
                print_ack(&self.api.update_user(&id, &form).await?, "User updated");
            }
            CrudAction::Delete { id } => {
                print_ack(&self.api.delete_user(&id).await?, "User deleted");
            }
        }
        Ok(())
    }
}

// ============================================================================
// Output
// ============================================================================

fn parse_body<T: DeserializeOwned>(json: &str) -> Result<T> {
    serde_json::from_str(json).context("Invalid JSON body")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_ack(ack: &Ack, default: &str) {
    println!("{}", ack.message_or(default));
}

fn print_nav(entries: &[NavEntry], depth: usize) {
    for entry in entries {
        let indent = "  ".repeat(depth);
        if entry.item.link.is_empty() {
            println!("{}{}", indent, entry.item.nama);
        } else {
            println!("{}{:<NAME_WIDTH$} {}", indent, entry.item.nama, entry.item.link);
        }
        print_nav(&entry.children, depth + 1);
    }
}

fn print_produk(produk: &[MasterProduk]) {
    if produk.is_empty() {
        println!("No products.");
        return;
    }
    for p in produk {
        println!(
            "{:<6} {:<12} {:<NAME_WIDTH$} {:<16} {:<8} {:>16}",
            format_optional(&p.id, "-"),
            p.id_produk,
            truncate_string(&p.nama, NAME_WIDTH),
            truncate_string(&p.merk, 16),
            p.satuan,
            format_rupiah(&p.harga)
        );
    }
}

fn print_pengajuan(pengajuan: &[Pengajuan]) {
    if pengajuan.is_empty() {
        println!("No submissions.");
        return;
    }
    for p in pengajuan {
        println!(
            "{:<6} {:<TEXT_WIDTH$} {:<20} {:>5} {:<10} {}",
            p.id,
            truncate_string(&p.subject, TEXT_WIDTH),
            truncate_string(p.nama_user.as_deref().unwrap_or("-"), 20),
            format_optional(&p.jumlah_item, "-"),
            format_optional(&p.status, "-"),
            p.created_at.as_deref().map(format_date).unwrap_or_default()
        );
    }
}

fn print_menu(menu: &[MenuItem]) {
    for m in menu {
        println!(
            "{:<6} {:<NAME_WIDTH$} {:<TEXT_WIDTH$} urut={:<4} parent={:<6} {}",
            format_optional(&m.id, "-"),
            truncate_string(&m.nama, NAME_WIDTH),
            truncate_string(&m.link, TEXT_WIDTH),
            m.urut,
            m.id_main,
            if m.is_active() { "active" } else { "inactive" }
        );
    }
}

fn print_users(users: &[User]) {
    for u in users {
        println!(
            "{:<6} {:<20} {:<NAME_WIDTH$} {:<16} {}",
            format_optional(&u.id, "-"),
            u.username,
            truncate_string(&u.nama, NAME_WIDTH),
            format_optional(&u.nama_role, "-"),
            if u.is_active() { "aktif" } else { "nonaktif" }
        );
    }
}
