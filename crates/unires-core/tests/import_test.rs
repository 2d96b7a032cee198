#![allow(clippy::unwrap_used)]
// End-to-end import runs against a wiremock controller.

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use unires_api::{ControllerPlatform, LegacyClient, Method, TransportConfig};
use unires_core::{
    ApplyOptions, ControllerSettings, Outcome, PlatformHint, Session, TlsVerification, import,
    read_rows_from,
};

// ── Helpers ─────────────────────────────────────────────────────────

const CSV: &str = "VLAN,MAC,Client Name,IP\n\
                   1,0011.2233.4455,TV,192.168.1.50\n\
                   2,AA-BB-CC-DD-EE-FF,Cam,192.168.10.10\n";

fn ok(data: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "meta": { "rc": "ok" }, "data": data }))
}

fn unknown_user() -> ResponseTemplate {
    ResponseTemplate::new(400).set_body_json(json!({
        "meta": { "rc": "error", "msg": "api.err.UnknownUser" },
        "data": []
    }))
}

fn site_path(suffix: &str) -> String {
    format!("/api/s/default/{suffix}")
}

async fn controller() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(site_path("rest/networkconf")))
        .respond_with(ok(json!([
            { "_id": "net_a", "name": "LAN", "purpose": "corporate", "ip_subnet": "192.168.1.1/24" },
            { "_id": "net_b", "name": "Cameras", "purpose": "corporate", "vlan": 2,
              "vlan_enabled": true, "ip_subnet": "192.168.10.1/24" },
            { "_id": "wan", "name": "WAN", "purpose": "wan" }
        ])))
        .mount(&server)
        .await;

    server
}

async fn open(server: &MockServer, timeout: Duration) -> Session {
    let settings = ControllerSettings {
        url: Url::parse(&server.uri()).unwrap(),
        site: "default".into(),
        username: "admin".into(),
        password: "secret".to_string().into(),
        platform: PlatformHint::Classic,
        tls: TlsVerification::DangerAcceptInvalid,
        timeout,
    };
    Session::open(&settings).await.unwrap()
}

fn user(id: &str, mac: &str, network: &str, ip: &str, name: &str) -> serde_json::Value {
    json!({
        "_id": id, "mac": mac, "name": name, "network_id": network,
        "fixed_ip": ip, "use_fixedip": true, "note": "kept"
    })
}

async fn mount_lookup(server: &MockServer, mac: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(site_path(&format!("stat/user/{mac}"))))
        .respond_with(response)
        .mount(server)
        .await;
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_creates_both_rows_with_normalized_macs() {
    let server = controller().await;
    mount_lookup(&server, "00:11:22:33:44:55", unknown_user()).await;
    mount_lookup(&server, "aa:bb:cc:dd:ee:ff", unknown_user()).await;

    Mock::given(method("POST"))
        .and(path(site_path("rest/user")))
        .and(body_partial_json(json!({
            "mac": "00:11:22:33:44:55", "network_id": "net_a",
            "fixed_ip": "192.168.1.50", "name": "TV", "use_fixedip": true,
            "note": "Imported by unires"
        })))
        .respond_with(ok(json!([user("u1", "00:11:22:33:44:55", "net_a", "192.168.1.50", "TV")])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(site_path("rest/user")))
        .and(body_partial_json(json!({
            "mac": "aa:bb:cc:dd:ee:ff", "network_id": "net_b",
            "fixed_ip": "192.168.10.10", "name": "Cam"
        })))
        .respond_with(ok(json!([user("u2", "aa:bb:cc:dd:ee:ff", "net_b", "192.168.10.10", "Cam")])))
        .expect(1)
        .mount(&server)
        .await;

    let session = open(&server, Duration::from_secs(5)).await;
    let rows = read_rows_from(CSV.as_bytes(), "devices.csv").unwrap();
    let report = import(&session, &rows, ApplyOptions::default()).await.unwrap();
    session.close().await;

    let outcomes: Vec<_> = report.rows.iter().map(|r| r.outcome).collect();
    assert_eq!(outcomes, vec![Outcome::Created, Outcome::Created]);
    assert!(report.is_success());
    assert_eq!(report.summary().created, 2);
}

#[tokio::test]
async fn test_rerun_with_matching_records_writes_nothing() {
    let server = controller().await;
    mount_lookup(
        &server,
        "00:11:22:33:44:55",
        ok(json!([user("u1", "00:11:22:33:44:55", "net_a", "192.168.1.50", "TV")])),
    )
    .await;
    mount_lookup(
        &server,
        "aa:bb:cc:dd:ee:ff",
        ok(json!([user("u2", "aa:bb:cc:dd:ee:ff", "net_b", "192.168.10.10", "Cam")])),
    )
    .await;

    Mock::given(method("POST"))
        .and(path(site_path("rest/user")))
        .respond_with(ok(json!([])))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ok(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let session = open(&server, Duration::from_secs(5)).await;
    let rows = read_rows_from(CSV.as_bytes(), "devices.csv").unwrap();
    let report = import(&session, &rows, ApplyOptions::default()).await.unwrap();

    assert!(report.rows.iter().all(|r| r.outcome == Outcome::Unchanged));
    assert_eq!(report.summary().unchanged, 2);
}

#[tokio::test]
async fn test_existing_client_is_updated_and_keeps_its_note() {
    let server = controller().await;
    mount_lookup(
        &server,
        "00:11:22:33:44:55",
        ok(json!([user("u1", "00:11:22:33:44:55", "net_b", "192.168.10.99", "Old TV")])),
    )
    .await;

    Mock::given(method("PUT"))
        .and(path(site_path("rest/user/u1")))
        .and(body_partial_json(json!({
            "network_id": "net_a", "fixed_ip": "192.168.1.50", "name": "TV", "use_fixedip": true
        })))
        .respond_with(ok(json!([user("u1", "00:11:22:33:44:55", "net_a", "192.168.1.50", "TV")])))
        .expect(1)
        .mount(&server)
        .await;

    let session = open(&server, Duration::from_secs(5)).await;
    let rows = read_rows_from(
        "VLAN,MAC,Client Name,IP\n1,00:11:22:33:44:55,TV,192.168.1.50\n".as_bytes(),
        "one.csv",
    )
    .unwrap();
    let report = import(&session, &rows, ApplyOptions::default()).await.unwrap();
    assert_eq!(report.rows[0].outcome, Outcome::Updated);

    let requests = server.received_requests().await.unwrap();
    let put = requests.iter().find(|r| r.method.as_str() == "PUT").unwrap();
    let body: serde_json::Value = serde_json::from_slice(&put.body).unwrap();
    assert!(body.get("note").is_none());
    assert!(body.get("mac").is_none());
}

#[tokio::test]
async fn test_bad_rows_are_counted_and_the_batch_continues() {
    let server = controller().await;
    mount_lookup(&server, "00:11:22:33:44:55", unknown_user()).await;

    Mock::given(method("POST"))
        .and(path(site_path("rest/user")))
        .respond_with(ok(json!([user("u1", "00:11:22:33:44:55", "net_a", "192.168.1.50", "TV")])))
        .expect(1)
        .mount(&server)
        .await;

    let csv = "VLAN,MAC,Client Name,IP\n\
               1,00:11:22:33:44:66,Broken,999.1.1.1\n\
               30,00:11:22:33:44:77,Nowhere,192.168.30.5\n\
               1,00:11:22:33:44:55,TV,192.168.1.50\n";
    let session = open(&server, Duration::from_secs(5)).await;
    let rows = read_rows_from(csv.as_bytes(), "mixed.csv").unwrap();
    let report = import(&session, &rows, ApplyOptions::default()).await.unwrap();

    let outcomes: Vec<_> = report.rows.iter().map(|r| (r.line, r.outcome)).collect();
    assert_eq!(
        outcomes,
        vec![(2, Outcome::Failed), (3, Outcome::Skipped), (4, Outcome::Created)]
    );
    let summary = report.summary();
    assert_eq!((summary.failed, summary.skipped, summary.created), (1, 1, 1));
    assert!(report.rows[1].reason.as_deref().unwrap().contains("unknown VLAN 30"));
    assert!(!report.is_success());
}

#[tokio::test]
async fn test_server_error_fails_one_row_only() {
    let server = controller().await;
    mount_lookup(&server, "00:11:22:33:44:55", unknown_user()).await;
    mount_lookup(&server, "aa:bb:cc:dd:ee:ff", unknown_user()).await;

    Mock::given(method("POST"))
        .and(path(site_path("rest/user")))
        .and(body_partial_json(json!({ "mac": "00:11:22:33:44:55" })))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal failure"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(site_path("rest/user")))
        .and(body_partial_json(json!({ "mac": "aa:bb:cc:dd:ee:ff" })))
        .respond_with(ok(json!([user("u2", "aa:bb:cc:dd:ee:ff", "net_b", "192.168.10.10", "Cam")])))
        .expect(1)
        .mount(&server)
        .await;

    let session = open(&server, Duration::from_secs(5)).await;
    let rows = read_rows_from(CSV.as_bytes(), "devices.csv").unwrap();
    let report = import(&session, &rows, ApplyOptions::default()).await.unwrap();

    assert_eq!(report.rows[0].outcome, Outcome::Failed);
    assert!(report.rows[0].reason.as_deref().unwrap().contains("500"));
    assert_eq!(report.rows[1].outcome, Outcome::Created);
    assert_eq!(report.summary().failed, 1);
}

#[tokio::test]
async fn test_timeout_is_a_row_failure() {
    let server = controller().await;
    mount_lookup(
        &server,
        "00:11:22:33:44:55",
        unknown_user().set_delay(Duration::from_secs(2)),
    )
    .await;
    mount_lookup(
        &server,
        "aa:bb:cc:dd:ee:ff",
        ok(json!([user("u2", "aa:bb:cc:dd:ee:ff", "net_b", "192.168.10.10", "Cam")])),
    )
    .await;

    let session = open(&server, Duration::from_millis(300)).await;
    let rows = read_rows_from(CSV.as_bytes(), "devices.csv").unwrap();
    let report = import(&session, &rows, ApplyOptions::default()).await.unwrap();

    assert_eq!(report.rows[0].outcome, Outcome::Failed);
    assert_eq!(report.rows[1].outcome, Outcome::Unchanged);
}

#[tokio::test]
async fn test_dry_run_issues_no_writes() {
    let server = controller().await;
    mount_lookup(&server, "00:11:22:33:44:55", unknown_user()).await;
    mount_lookup(
        &server,
        "aa:bb:cc:dd:ee:ff",
        ok(json!([user("u2", "aa:bb:cc:dd:ee:ff", "net_a", "192.168.1.77", "Cam")])),
    )
    .await;

    Mock::given(method("POST"))
        .and(path(site_path("rest/user")))
        .respond_with(ok(json!([])))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ok(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let session = open(&server, Duration::from_secs(5)).await;
    let rows = read_rows_from(CSV.as_bytes(), "devices.csv").unwrap();
    let options = ApplyOptions {
        dry_run: true,
        ..ApplyOptions::default()
    };
    let report = import(&session, &rows, options).await.unwrap();

    let outcomes: Vec<_> = report.rows.iter().map(|r| r.outcome).collect();
    assert_eq!(outcomes, vec![Outcome::WouldCreate, Outcome::WouldUpdate]);
    assert!(report.summary().dry_run);
}

#[tokio::test]
async fn test_strict_subnet_skips_out_of_range_ip() {
    let server = controller().await;

    Mock::given(method("GET"))
        .and(path(site_path("stat/user/00:11:22:33:44:55")))
        .respond_with(unknown_user())
        .expect(0)
        .mount(&server)
        .await;

    let csv = "VLAN,MAC,Client Name,IP\n1,00:11:22:33:44:55,TV,10.9.9.9\n";
    let session = open(&server, Duration::from_secs(5)).await;
    let rows = read_rows_from(csv.as_bytes(), "subnet.csv").unwrap();
    let options = ApplyOptions {
        strict_subnet: true,
        ..ApplyOptions::default()
    };
    let report = import(&session, &rows, options).await.unwrap();

    assert_eq!(report.rows[0].outcome, Outcome::Skipped);
    assert!(report.rows[0].reason.as_deref().unwrap().contains("192.168.1.1/24"));
}

#[tokio::test]
async fn test_raw_request_through_session() {
    let server = controller().await;
    let client = LegacyClient::new(
        Url::parse(&server.uri()).unwrap(),
        "default".into(),
        ControllerPlatform::ClassicController,
        &TransportConfig::default(),
    )
    .unwrap();
    let session = Session::from_client(client);

    let data = session
        .request(Method::GET, "rest/networkconf", None)
        .await
        .unwrap();
    assert_eq!(data.len(), 3);
    assert_eq!(data[1]["name"], "Cameras");
}
