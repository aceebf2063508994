//! End-to-end navigation through the shell.

mod common;

use std::sync::Arc;
use std::time::Duration;

use mockito::Matcher;

use common::{context_with, registration, CountingAccountSource, FakeLoader, StaticModule};
use mfe_shell::adapters::loaders::RemoteDynamicLoader;
use mfe_shell::application::{build_registry, build_shell, RemoteStatus, RouteOutcome, ShellApp, ShellState};
use mfe_shell::domain::models::config::Config;
use mfe_shell::domain::models::{ExposedRoute, Greeting, NavMeta};
use mfe_shell::services::RemoteRegistration;

fn shell_with(registrations: Vec<RemoteRegistration>, load_timeout: Duration) -> ShellApp {
    let registry = build_registry(registrations).unwrap();
    let ctx = context_with(
        CountingAccountSource::new(Duration::from_millis(50)),
        Duration::from_secs(1),
    );
    ShellApp::new(registry, ctx, load_timeout).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_bootstrap_then_ready() {
    let traffic = StaticModule::single("traffic", "Traffic", Some(1));
    let shell = shell_with(
        vec![registration(&traffic, FakeLoader::ok(traffic.clone()))],
        Duration::from_secs(5),
    );
    assert_eq!(shell.state(), ShellState::Bootstrapping);

    shell.start();
    shell.wait_ready().await;
    assert_eq!(shell.state(), ShellState::Ready);
    assert!(shell.context().account.cached().is_some());
}

#[tokio::test(start_paused = true)]
async fn test_failed_account_still_becomes_ready() {
    let traffic = StaticModule::single("traffic", "Traffic", Some(1));
    let registry = build_registry(vec![registration(&traffic, FakeLoader::ok(traffic.clone()))]).unwrap();
    let ctx = context_with(CountingAccountSource::failing(), Duration::from_secs(1));
    let shell = ShellApp::new(registry, ctx, Duration::from_secs(5)).unwrap();

    shell.start().await.unwrap();
    assert_eq!(shell.state(), ShellState::Ready);

    let nav = shell.navigate("/traffic").await;
    match nav.outcome {
        RouteOutcome::Page { view, .. } => assert_eq!(view.greeting, Greeting::Anonymous),
        other => panic!("expected page, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_failed_remote_only_affects_its_route() {
    let traffic = StaticModule::single("traffic", "Traffic", Some(1));
    let admin = StaticModule::single("admin", "Admin", Some(3));
    let admin_loader = FakeLoader::failing();
    let shell = shell_with(
        vec![
            registration(&traffic, FakeLoader::ok(traffic.clone())),
            registration(&admin, admin_loader.clone()),
        ],
        Duration::from_secs(5),
    );
    shell.start();
    shell.wait_ready().await;

    let failed = shell.navigate("/admin").await;
    assert!(matches!(
        failed.outcome,
        RouteOutcome::FailedToLoad { ref remote, .. } if remote == "admin"
    ));
    let html = shell.render_document(&failed).unwrap();
    assert!(html.contains("Failed to load"));

    let healthy = shell.navigate("/traffic").await;
    match &healthy.outcome {
        RouteOutcome::Page { route_id, view } => {
            assert_eq!(route_id, "traffic-home");
            assert_eq!(view.title, "Traffic");
        }
        other => panic!("expected page, got {other:?}"),
    }

    // Failed loads are retried on the next navigation.
    shell.navigate("/admin").await;
    assert_eq!(admin_loader.loads(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_slow_remote_shows_loading_then_page() {
    let reports = StaticModule::single("reports", "Reports", Some(2));
    let loader = FakeLoader::delayed(reports.clone(), Duration::from_secs(10));
    let shell = shell_with(vec![registration(&reports, loader.clone())], Duration::from_secs(1));

    let first = shell.navigate("/reports").await;
    assert_eq!(
        first.outcome,
        RouteOutcome::Loading {
            route_id: "reports-home".to_string()
        }
    );

    tokio::time::sleep(Duration::from_secs(10)).await;
    let second = shell.navigate("/reports").await;
    assert!(matches!(second.outcome, RouteOutcome::Page { .. }));
    assert_eq!(loader.loads(), 1, "the pending load is shared, not restarted");
}

#[tokio::test(start_paused = true)]
async fn test_stale_load_failure_keeps_newer_load() {
    let admin = StaticModule::single("admin", "Admin", Some(3));
    let loader = FakeLoader::failing_after(Duration::from_secs(10));
    let shell = shell_with(vec![registration(&admin, loader.clone())], Duration::from_secs(1));

    // t=0: first load starts; navigation gives up at t=1.
    shell.navigate("/admin").await;
    shell.shutdown();
    // t=1: a second load starts and will settle at t=11.
    shell.navigate("/admin").await;
    assert_eq!(loader.loads(), 2);

    // t=10.5: the first load has failed, the second is still pending.
    tokio::time::sleep(Duration::from_millis(8_500)).await;
    assert_eq!(shell.remote_status("admin"), RemoteStatus::Loading);

    shell.navigate("/admin").await;
    assert_eq!(loader.loads(), 2, "navigation joins the pending load");
}

#[tokio::test(start_paused = true)]
async fn test_start_warms_account_through_prefetch() {
    let source = CountingAccountSource::new(Duration::from_millis(50));
    let traffic = StaticModule::single("traffic", "Traffic", Some(1));
    let registry = build_registry(vec![registration(&traffic, FakeLoader::ok(traffic.clone()))]).unwrap();
    let shell = ShellApp::new(registry, context_with(source.clone(), Duration::from_secs(1)), Duration::from_secs(5)).unwrap();

    shell.start().await.unwrap();
    let nav = shell.navigate("/traffic").await;
    match nav.outcome {
        RouteOutcome::Page { view, .. } => assert_eq!(
            view.greeting,
            Greeting::Welcome {
                name: "Ada Lovelace".to_string()
            }
        ),
        other => panic!("expected page, got {other:?}"),
    }
    assert_eq!(source.calls(), 1, "pages reuse the warmed account");
}

#[tokio::test]
async fn test_silent_remote_fails_and_is_retried() {
    let url = common::silent_server().await;
    let loader = RemoteDynamicLoader::new("admin", url).with_timeout(Duration::from_millis(200));
    let routes = vec![ExposedRoute::new(
        "admin-home",
        "/admin",
        Some(NavMeta::new("Admin", Some(3))),
    )];
    let shell = shell_with(
        vec![RemoteRegistration::new("admin", Arc::new(loader), routes)],
        Duration::from_secs(2),
    );

    for _ in 0..2 {
        let nav = tokio::time::timeout(Duration::from_secs(5), shell.navigate("/admin"))
            .await
            .expect("navigation must not hang");
        assert!(matches!(
            nav.outcome,
            RouteOutcome::FailedToLoad { ref remote, .. } if remote == "admin"
        ));
        assert_eq!(shell.remote_status("admin"), RemoteStatus::NotLoaded);
    }
}

#[tokio::test(start_paused = true)]
async fn test_route_missing_and_not_found() {
    let admin = StaticModule::single("admin", "Admin", Some(3));
    let mut routes = admin.routes.clone();
    routes.push(ExposedRoute::new("admin-audit", "/admin/audit", None));
    let shell = shell_with(
        vec![RemoteRegistration::new("admin", FakeLoader::ok(admin.clone()), routes)],
        Duration::from_secs(5),
    );

    assert_eq!(
        shell.navigate("/admin/audit/").await.outcome,
        RouteOutcome::RouteMissing {
            route_id: "admin-audit".to_string()
        }
    );
    assert_eq!(
        shell.navigate("/nowhere").await.outcome,
        RouteOutcome::NotFound {
            path: "/nowhere".to_string()
        }
    );
    assert_eq!(shell.navigate("/").await.outcome, RouteOutcome::Home);
}

#[tokio::test(start_paused = true)]
async fn test_refresh_runs_page_refresh() {
    let traffic = StaticModule::single("traffic", "Traffic", Some(1));
    let shell = shell_with(
        vec![registration(&traffic, FakeLoader::ok(traffic.clone()))],
        Duration::from_secs(5),
    );

    let nav = shell.refresh("/traffic?tab=events").await;
    assert_eq!(nav.path, "/traffic");
    assert!(matches!(nav.outcome, RouteOutcome::Page { .. }));
    assert_eq!(traffic.page_refreshes("traffic-home"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_nav_follows_declared_order() {
    let a = StaticModule::single("a", "Third", Some(3));
    let b = StaticModule::single("b", "First", Some(1));
    let c = StaticModule::single("c", "Unordered", None);
    let d = StaticModule::single("d", "Second", Some(2));
    let shell = shell_with(
        [&a, &b, &c, &d]
            .into_iter()
            .map(|m| registration(m, FakeLoader::ok(Arc::clone(m))))
            .collect(),
        Duration::from_secs(5),
    );

    let labels: Vec<_> = shell.nav_items().into_iter().map(|n| n.label).collect();
    assert_eq!(labels, vec!["First", "Second", "Third", "Unordered"]);
}

const EMPTY_LIST: &str = "[]";

#[tokio::test]
async fn test_github_404_shows_banner_while_sibling_works() {
    common::setup_test_logging();
    let mut server = mockito::Server::new_async().await;
    for path in ["/repos/facebook/react/commits", "/repos/facebook/react/events"] {
        server
            .mock("GET", path)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(EMPTY_LIST)
            .create_async()
            .await;
    }
    server
        .mock("GET", "/repos/vercel/next.js/contributors")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body(r#"{"message":"Not Found"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/orgs/vercel")
        .with_status(404)
        .create_async()
        .await;

    let mut config = Config::default();
    config.github.api_base = server.url();
    config.account.simulated_delay_ms = 10;

    let shell = build_shell(&config).unwrap();
    shell.start();
    shell.wait_ready().await;

    let admin = shell.navigate("/admin").await;
    match &admin.outcome {
        RouteOutcome::Page { view, .. } => {
            let banner = view.error_banner.as_deref().unwrap();
            assert!(banner.contains("404"), "banner was {banner}");
        }
        other => panic!("expected admin page with banner, got {other:?}"),
    }

    let traffic = shell.navigate("/traffic").await;
    match &traffic.outcome {
        RouteOutcome::Page { view, .. } => {
            assert!(view.error_banner.is_none());
            assert_eq!(view.title, "GitHub Activity Tracker");
            assert_eq!(
                view.greeting,
                Greeting::Welcome {
                    name: "John Smith".to_string()
                }
            );
        }
        other => panic!("expected traffic page, got {other:?}"),
    }

    let html = shell.render_document(&traffic).unwrap();
    assert!(html.contains("GitHub Activity Tracker"));
    assert!(html.contains("John Smith"));
}
