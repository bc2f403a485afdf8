//! Integration tests for the VM service against a mocked backend.

#[path = "common/api_fixtures.rs"]
mod api_fixtures;

use std::time::Duration;

use oneprovider::vm::{CreateInstanceRequest, DestroyInstanceRequest, UpdateHostnameRequest};
use oneprovider::{ClientError, RetryConfig, RetryError, VmError};
use rstest::{fixture, rstest};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer};

use api_fixtures::{API_KEY, CLIENT_KEY, embedded_error, ok_response, provider_for};

#[fixture]
fn fast_retry() -> RetryConfig {
    RetryConfig {
        max_retries: 4,
        initial_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(40),
        backoff_factor: 2.0,
    }
}

async fn mount_templates(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/vm/templates"))
        .and(header("Api-Key", API_KEY))
        .and(header("Client-Key", CLIENT_KEY))
        .respond_with(ok_response(json!([
            {
                "id": 100_029,
                "name": "Debian 12",
                "size": "4294967296",
                "display": {"name": "Debian", "display": "Debian 12", "description": "", "oca": 0}
            },
            {
                "id": 100_030,
                "name": "Ubuntu 24.04",
                "size": "5368709120",
                "display": {"name": "Ubuntu", "display": "Ubuntu 24.04", "description": "LTS", "oca": 0}
            },
            {
                "id": 100_031,
                "name": "ÉLITE Linux",
                "size": "6442450944",
                "display": {"name": "Élite", "display": "ÉLITE Linux", "description": "", "oca": 0}
            }
        ])))
        .mount(server)
        .await;
}

async fn mount_locations(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/vm/locations"))
        .respond_with(ok_response(json!({
            "Europe": [
                {"id": "34", "region": "Europe", "country": "FR", "city": "Paris",
                 "available_types": ["vps"], "available_sizes": [12, 13],
                 "available_ips": {"ipv4": "yes", "ipv6": "yes"}}
            ],
            "Africa": [
                {"id": "198", "region": "Africa", "country": "MA", "city": "Fez",
                 "available_types": ["vps"], "available_sizes": [12],
                 "available_ips": {"ipv4": "yes", "ipv6": "no"}}
            ]
        })))
        .mount(server)
        .await;
}

#[rstest]
#[case("Ubuntu 24.04", 100_030)]
#[case("ubuntu 24.04", 100_030)]
#[case("UBUNTU 24.04", 100_030)]
#[case("élite linux", 100_031)]
#[tokio::test]
async fn template_lookup_matches_name_ignoring_case(#[case] name: &str, #[case] expected: u64) {
    let server = MockServer::start().await;
    mount_templates(&server).await;

    let template = provider_for(&server)
        .vm
        .get_template_by_name(name)
        .await
        .unwrap_or_else(|err| panic!("template should resolve: {err}"));
    assert_eq!(template.id, expected);
}

#[tokio::test]
async fn template_lookup_decodes_full_record() {
    let server = MockServer::start().await;
    mount_templates(&server).await;

    let template = provider_for(&server)
        .vm
        .get_template_by_name("Ubuntu 24.04")
        .await
        .unwrap_or_else(|err| panic!("template should resolve: {err}"));
    assert_eq!(template.size, "5368709120");
    assert_eq!(template.display.description, "LTS");
}

#[tokio::test]
async fn template_lookup_returns_first_match_in_listing_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vm/templates"))
        .respond_with(ok_response(json!([
            {"id": 1, "name": "ubuntu 24.04", "size": "1"},
            {"id": 2, "name": "Ubuntu 24.04", "size": "2"}
        ])))
        .mount(&server)
        .await;

    let template = provider_for(&server)
        .vm
        .get_template_by_name("Ubuntu 24.04")
        .await
        .unwrap_or_else(|err| panic!("template should resolve: {err}"));
    assert_eq!(template.id, 1);
}

#[tokio::test]
async fn template_lookup_reports_missing_name() {
    let server = MockServer::start().await;
    mount_templates(&server).await;

    let err = provider_for(&server)
        .vm
        .get_template_by_name("does-not-exist")
        .await
        .expect_err("lookup should fail");
    assert!(
        err.to_string()
            .contains("template not found for name does-not-exist"),
        "unexpected error: {err}"
    );
    assert!(err.is_not_found());
}

#[tokio::test]
async fn template_lookup_wraps_backend_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vm/templates"))
        .respond_with(embedded_error(7, "quota exceeded"))
        .mount(&server)
        .await;

    let err = provider_for(&server)
        .vm
        .get_template_by_name("Ubuntu 24.04")
        .await
        .expect_err("lookup should fail");
    assert_eq!(
        err.to_string(),
        "vm: get template by name failed: client: api internal error 7: quota exceeded"
    );
}

#[tokio::test]
async fn location_lookup_scans_every_region() {
    let server = MockServer::start().await;
    mount_locations(&server).await;

    let location = provider_for(&server)
        .vm
        .get_location_by_city("Fez")
        .await
        .unwrap_or_else(|err| panic!("location should resolve: {err}"));
    assert_eq!(location.id, "198");
    assert_eq!(location.region, "Africa");
    assert_eq!(location.country, "MA");
    assert_eq!(location.available_sizes, vec![12]);
}

#[tokio::test]
async fn location_lookup_is_case_sensitive() {
    let server = MockServer::start().await;
    mount_locations(&server).await;

    let err = provider_for(&server)
        .vm
        .get_location_by_city("fez")
        .await
        .expect_err("lowercase city should not match");
    assert_eq!(
        err,
        VmError::LocationNotFound {
            city: String::from("fez"),
        }
    );
}

#[tokio::test]
async fn list_locations_groups_by_region() {
    let server = MockServer::start().await;
    mount_locations(&server).await;

    let regions = provider_for(&server)
        .vm
        .list_locations()
        .await
        .unwrap_or_else(|err| panic!("listing should succeed: {err}"));
    assert_eq!(
        regions.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["Africa", "Europe"]
    );
}

#[tokio::test]
async fn size_lookup_matches_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vm/sizes"))
        .respond_with(ok_response(json!([
            {"id": "12", "type": "VPS-S", "cores": "1", "ram": "1024", "disk": "20"},
            {"id": "13", "type": "VPS-M", "cores": "2", "ram": "2048", "disk": "40"}
        ])))
        .mount(&server)
        .await;

    let api = provider_for(&server);
    let size = api
        .vm
        .get_size_by_name("vps-m")
        .await
        .unwrap_or_else(|err| panic!("size should resolve: {err}"));
    assert_eq!(size.id, "13");

    let err = api
        .vm
        .get_size_by_name("VPS-XL")
        .await
        .expect_err("unknown size");
    assert_eq!(err.to_string(), "vm: size not found for name VPS-XL");
}

#[tokio::test]
async fn create_instance_posts_form_and_decodes_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/vm/create"))
        .and(header("Content-Type", "application/x-www-form-urlencoded"))
        .and(body_string(
            "hostname=web01&instance_size=12&location_id=198&ssh_keys%5B0%5D=key-a&template=100030",
        ))
        .respond_with(ok_response(json!({
            "message": "created",
            "id": "5501",
            "ip_address": "192.0.2.10",
            "hostname": "web01",
            "password": "s3cret"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let created = provider_for(&server)
        .vm
        .create_instance(&CreateInstanceRequest {
            location_id: 198,
            instance_size: 12,
            template: String::from("100030"),
            hostname: String::from("web01"),
            ssh_keys: vec![String::from("key-a")],
        })
        .await
        .unwrap_or_else(|err| panic!("create should succeed: {err}"));
    assert_eq!(created.id, "5501");
    assert_eq!(created.ip_address, "192.0.2.10");
    assert!(!format!("{created:?}").contains("s3cret"));
}

#[tokio::test]
async fn destroy_instance_returns_billing_summary() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/vm/destroy"))
        .and(body_string("confirm_close=true&vm_id=5501"))
        .respond_with(ok_response(json!({
            "message": "destroyed",
            "usageHours": "3",
            "bandwidthOverusage": "0",
            "bandwidthOverusageCost": "0.00",
            "additionalHoursForCharge": "0"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let summary = provider_for(&server)
        .vm
        .destroy_instance(&DestroyInstanceRequest {
            vm_id: String::from("5501"),
            confirm_close: true,
        })
        .await
        .unwrap_or_else(|err| panic!("destroy should succeed: {err}"));
    assert_eq!(summary.usage_hours, "3");
    assert_eq!(summary.bandwidth_overusage_cost, "0.00");
}

#[tokio::test]
async fn missing_instance_surfaces_sentinel() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vm/info/404"))
        .respond_with(embedded_error(42, "VM not found"))
        .mount(&server)
        .await;

    let err = provider_for(&server)
        .vm
        .get_instance_by_id("404")
        .await
        .expect_err("missing instance");
    assert_eq!(
        err,
        VmError::Request {
            action: "get instance by id",
            source: ClientError::EntityNotFound,
        }
    );
    assert!(err.is_not_found());
}

#[tokio::test]
async fn blank_hostname_is_rejected_without_network_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/vm/hostname"))
        .respond_with(ok_response(json!({"message": "ok"})))
        .expect(0)
        .mount(&server)
        .await;

    let err = provider_for(&server)
        .vm
        .update_instance_hostname(&UpdateHostnameRequest {
            vm_id: String::from("5501"),
            hostname: String::from("  "),
        })
        .await
        .expect_err("blank hostname");
    assert!(matches!(err, VmError::Validation(_)), "unexpected: {err:?}");
}

#[rstest]
#[tokio::test]
async fn wait_for_instance_retries_until_visible(fast_retry: RetryConfig) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vm/info/5501"))
        .respond_with(embedded_error(42, "VM not found"))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/vm/info/5501"))
        .respond_with(ok_response(json!({
            "server_info": {"ipaddress": "192.0.2.10", "hostname": "web01", "city": "Fez"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let info = provider_for(&server)
        .vm
        .wait_for_instance("5501", &fast_retry, &CancellationToken::new())
        .await
        .unwrap_or_else(|err| panic!("instance should appear: {err}"));
    assert_eq!(info.ip_address, "192.0.2.10");
    assert_eq!(info.city, "Fez");
}

#[rstest]
#[tokio::test]
async fn wait_for_instance_stops_on_business_error(fast_retry: RetryConfig) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vm/info/5501"))
        .respond_with(embedded_error(9, "forbidden"))
        .expect(1)
        .mount(&server)
        .await;

    let err = provider_for(&server)
        .vm
        .wait_for_instance("5501", &fast_retry, &CancellationToken::new())
        .await
        .expect_err("business error is permanent");
    assert_eq!(
        err,
        VmError::Request {
            action: "wait for instance",
            source: ClientError::Business {
                code: 9,
                message: String::from("forbidden"),
            },
        }
    );
}

#[rstest]
#[tokio::test]
async fn hostname_update_waits_for_read_back(fast_retry: RetryConfig) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/vm/hostname"))
        .and(body_string("hostname=frodosnewhouse&vm_id=5501"))
        .respond_with(ok_response(json!({"message": "hostname updated"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/vm/info/5501"))
        .respond_with(ok_response(json!({
            "server_info": {"ipaddress": "192.0.2.10", "hostname": "frodoshouse", "city": "Fez"}
        })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/vm/info/5501"))
        .respond_with(ok_response(json!({
            "server_info": {"ipaddress": "192.0.2.10", "hostname": "frodosnewhouse", "city": "Fez"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let info = provider_for(&server)
        .vm
        .update_instance_hostname_confirmed(
            &UpdateHostnameRequest {
                vm_id: String::from("5501"),
                hostname: String::from("frodosnewhouse"),
            },
            &fast_retry,
            &CancellationToken::new(),
        )
        .await
        .unwrap_or_else(|err| panic!("hostname should be confirmed: {err}"));
    assert_eq!(info.hostname, "frodosnewhouse");
}

#[rstest]
#[tokio::test]
async fn hostname_update_reports_unconfirmed_change(fast_retry: RetryConfig) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/vm/hostname"))
        .respond_with(ok_response(json!({"message": "hostname updated"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/vm/info/5501"))
        .respond_with(ok_response(json!({
            "server_info": {"ipaddress": "192.0.2.10", "hostname": "frodoshouse", "city": "Fez"}
        })))
        .expect(4)
        .mount(&server)
        .await;

    let err = provider_for(&server)
        .vm
        .update_instance_hostname_confirmed(
            &UpdateHostnameRequest {
                vm_id: String::from("5501"),
                hostname: String::from("frodosnewhouse"),
            },
            &fast_retry,
            &CancellationToken::new(),
        )
        .await
        .expect_err("stale read-back");
    assert_eq!(
        err,
        VmError::Unconfirmed {
            action: "update instance hostname",
            source: RetryError::Exhausted {
                attempts: 4,
                last_error: None,
            },
        }
    );
}
