mod common;

use pengajuan_core::models::{DetailItem, MasterProduk, PengajuanForm, PengajuanStatus, UserForm};
use pengajuan_core::{ApiError, CredentialStore, SessionEvent, SignOutReason};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{bearer, client, refresh_ok, store_with};

#[tokio::test]
async fn test_login_stores_credential() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .and(body_json(json!({"username": "admin", "password": "admin123456"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200,
            "status": "success",
            "data": {
                "username": "admin",
                "nama": "Aditya Singh",
                "role": "admin",
                "token": "A1",
                "refresh-token": "R1"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = CredentialStore::new();
    let api = client(&server, store.clone());

    let credential = api
        .authenticate(" admin ", "admin123456")
        .await
        .expect("login");
    assert_eq!(credential.display_name, "Aditya Singh");
    assert_eq!(credential.role, "admin");
    assert_eq!(store.get(), Some(credential));
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let server = MockServer::start().await;

    Mock::given(path("/api/v1/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "code": 401, "status": "error", "message": "User / Password tidak sesuai!"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = CredentialStore::new();
    let api = client(&server, store.clone());

    let err = api.authenticate("admin", "wrong").await.expect_err("rejected");
    assert!(matches!(err, ApiError::InvalidCredentials));
    assert!(!store.is_authenticated());
}

#[tokio::test]
async fn test_login_rejected_in_envelope() {
    let server = MockServer::start().await;

    Mock::given(path("/api/v1/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 404, "status": "error", "message": "User tidak ditemukan"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server, CredentialStore::new());
    let err = api.authenticate("ghost", "x").await.expect_err("rejected");
    assert!(matches!(err, ApiError::InvalidCredentials));
}

#[tokio::test]
async fn test_logout_signals_sign_in() {
    let server = MockServer::start().await;
    let store = store_with("A1", "R1");
    let api = client(&server, store.clone());
    let mut events = api.subscribe();

    assert!(api.logout());
    assert!(!store.is_authenticated());
    assert_eq!(
        events.try_recv().expect("event"),
        SessionEvent::SignInRequired {
            reason: SignOutReason::SignedOut
        }
    );

    // Second logout is a no-op
    assert!(!api.logout());
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_clients_sharing_a_store_see_each_others_events() {
    let server = MockServer::start().await;

    Mock::given(path("/pengajuan"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(path("/auth/refresh-token"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_with("A1", "R1");
    let dashboard = client(&server, store.clone());
    let background = client(&server, store.clone());
    let mut events = dashboard.subscribe();

    let err = background.fetch_pengajuan().await.expect_err("session ends");
    assert!(matches!(err, ApiError::SessionExpired));
    assert!(!store.is_authenticated());
    assert_eq!(
        events.try_recv().expect("event"),
        SessionEvent::SignInRequired {
            reason: SignOutReason::RefreshFailed
        }
    );
}

#[tokio::test]
async fn test_fetch_master_produk_after_refresh() {
    let server = MockServer::start().await;

    Mock::given(path("/produk/master"))
        .and(header("authorization", bearer("A1").as_str()))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(path("/auth/refresh-token"))
        .and(header("authorization", bearer("R1").as_str()))
        .respond_with(refresh_ok("A2", "R2"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(path("/produk/master"))
        .and(header("authorization", bearer("A2").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "produk": [
                { "id": 1, "id_produk": "P-001", "nama": "Kertas A4", "merk": "Sidu", "satuan": "rim", "harga": 52000 }
            ]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_with("A1", "R1");
    let api = client(&server, store.clone());

    let produk = api.fetch_master_produk().await.expect("list");
    assert_eq!(produk.len(), 1);
    assert_eq!(produk[0].nama, "Kertas A4");
    assert_eq!(produk[0].harga_value(), Some(52000.0));
    assert_eq!(store.get().map(|c| c.access_token), Some("A2".to_string()));
}

#[tokio::test]
async fn test_pengajuan_detail_and_update_paths() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pengajuan/edit/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": {
                "pengajuan": {
                    "id": 7,
                    "subject": "ATK Februari",
                    "keterangan": "rutin",
                    "nama_user": "Aditya Singh",
                    "jumlah_item": 2,
                    "status": "pending",
                    "created_at": "2024-02-01 08:30:00",
                    "updated_at": "2024-02-01 08:30:00"
                },
                "detail_item": [
                    { "id_produk": "P-001", "nama": "Kertas A4", "merk": "Sidu", "tipe": "70gsm", "satuan": "rim", "harga": 52000 },
                    { "id_produk": "P-002", "nama": "Pulpen", "merk": "Standard", "tipe": "AE7", "satuan": "pcs", "harga": 2500 }
                ]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/pengajuan/edit/7"))
        .and(body_json(json!({
            "subject": "ATK Februari",
            "keterangan": "revisi",
            "detail_item": [{ "id_produk": "P-001", "harga": "52000" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Pengajuan diperbarui"})))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server, store_with("A1", "R1"));

    let detail = api.fetch_pengajuan_detail("7").await.expect("detail");
    assert_eq!(detail.pengajuan.subject, "ATK Februari");
    assert_eq!(detail.pengajuan.nama_user.as_deref(), Some("Aditya Singh"));
    assert_eq!(detail.detail_item.len(), 2);
    assert_eq!(detail.detail_item[1].satuan.as_deref(), Some("pcs"));
    assert_eq!(detail.total_harga(), 54500.0);

    let form = PengajuanForm {
        subject: detail.pengajuan.subject.clone(),
        keterangan: "revisi".to_string(),
        detail_item: vec![DetailItem::new("P-001", detail.detail_item[0].harga.clone())],
    };
    let ack = api.update_pengajuan("7", &form).await.expect("update");
    assert_eq!(ack.message_or(""), "Pengajuan diperbarui");
}

#[tokio::test]
async fn test_pengajuan_approval_and_rejection() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/pengajuan/7/status"))
        .and(header("authorization", bearer("A1").as_str()))
        .and(body_json(json!({"status": "approved"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Pengajuan disetujui"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/pengajuan/8/status"))
        .and(body_json(json!({"status": "rejected"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Pengajuan ditolak"})))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server, store_with("A1", "R1"));

    let ack = api
        .update_pengajuan_status("7", PengajuanStatus::Approved)
        .await
        .expect("approve");
    assert_eq!(ack.message.as_deref(), Some("Pengajuan disetujui"));

    let ack = api
        .update_pengajuan_status("8", PengajuanStatus::Rejected)
        .await
        .expect("reject");
    assert_eq!(ack.message.as_deref(), Some("Pengajuan ditolak"));

    assert!(matches!(
        api.update_pengajuan_status("7/../9", PengajuanStatus::Approved).await,
        Err(ApiError::InvalidRequest(_))
    ));
}

#[tokio::test]
async fn test_master_produk_mutations() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/produk/master/3"))
        .and(body_json(json!({
            "id_produk": "P-003", "nama": "Map", "merk": "Bantex", "satuan": "pcs", "harga": "7000"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "updated"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/produk/master/3"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server, store_with("A1", "R1"));
    let produk = MasterProduk {
        id: None,
        id_produk: "P-003".to_string(),
        nama: "Map".to_string(),
        merk: "Bantex".to_string(),
        satuan: "pcs".to_string(),
        harga: "7000".to_string(),
    };

    let ack = api.update_master_produk("3", &produk).await.expect("update");
    assert_eq!(ack.message.as_deref(), Some("updated"));

    let ack = api.delete_master_produk("3").await.expect("delete");
    assert_eq!(ack.message, None);
}

#[tokio::test]
async fn test_fetch_navigation() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/base/menu"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "menu": [
                { "id": 1, "nama": "Produk", "link": "", "urut": 1, "active": "1", "id_main": 0 },
                { "id": 2, "nama": "Master", "link": "/produk/master", "urut": 1, "active": "1", "id_main": 1 },
                { "id": 3, "nama": "Users", "link": "/settings/users", "urut": 2, "active": "0", "id_main": 0 }
            ]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server, store_with("A1", "R1"));
    let nav = api.fetch_navigation().await.expect("navigation");

    assert_eq!(nav.entries.len(), 1);
    assert!(nav.allows("/produk/master"));
    assert!(!nav.allows("/settings/users"));
}

#[tokio::test]
async fn test_invalid_input_never_reaches_backend() {
    let server = MockServer::start().await;
    let api = client(&server, store_with("A1", "R1"));

    let form = UserForm {
        nama: "Budi".to_string(),
        username: "budi".to_string(),
        id_role: "2".to_string(),
        password: None,
        aktif: "1".to_string(),
    };
    assert!(matches!(
        api.create_user(&form).await,
        Err(ApiError::InvalidRequest(_))
    ));
    assert!(matches!(
        api.delete_menu_setting("").await,
        Err(ApiError::InvalidRequest(_))
    ));
    let empty_form = PengajuanForm {
        subject: "ATK".to_string(),
        keterangan: String::new(),
        detail_item: Vec::new(),
    };
    assert!(matches!(
        api.create_pengajuan(&empty_form).await,
        Err(ApiError::InvalidRequest(_))
    ));

    let received = server.received_requests().await.expect("recording enabled");
    assert!(received.is_empty());
}

#[tokio::test]
async fn test_signed_out_client_is_not_authenticated() {
    let server = MockServer::start().await;
    let api = client(&server, CredentialStore::new());

    let err = api.fetch_users().await.expect_err("no session");
    assert!(matches!(err, ApiError::NotAuthenticated));
    assert!(err.requires_sign_in());
}
