//! End-to-end upgrade flows through the gate and the migration driver.

#![allow(clippy::expect_used)]

use construct_cli::application::ports::TemplateSource;
use construct_cli::application::services::migration::{Migrator, PackagesPolicy};
use construct_cli::application::services::rebuild_marker;
use construct_cli::application::services::version_gate::{self, GateDecision};
use construct_cli::domain::template::names;
use construct_cli::domain::version::{CURRENT_VERSION, PRE_VERSIONING_BASELINE};
use construct_cli::infra::fs::StdFs;
use construct_cli::infra::templates::EmbeddedTemplates;

use crate::helpers::{NoRuntime, Silent, read, scratch};

const LEGACY_CONFIG: &str = r#"
[runtime]
engine = "podman"
auto_update_check = "yes"

[network]
mode = "strict"
allowed_domains = ["api.anthropic.com", "github.com"]
blocked_ips = []

[telemetry]
enabled = true
"#;

#[tokio::test]
async fn test_pre_versioning_tree_migrates_from_baseline() {
    let (_dir, layout) = scratch();
    std::fs::write(layout.config_toml(), LEGACY_CONFIG).expect("seed");
    let templates = EmbeddedTemplates::load().expect("templates");

    let decision = version_gate::evaluate(&StdFs, &layout, CURRENT_VERSION).expect("gate");
    assert_eq!(
        decision,
        GateDecision::Migrate {
            from: PRE_VERSIONING_BASELINE.to_string()
        }
    );

    let migrator = Migrator::new(&StdFs, &templates, &NoRuntime, &Silent, &layout, CURRENT_VERSION);
    let report = migrator
        .migrate(PRE_VERSIONING_BASELINE, PackagesPolicy::Additive)
        .await
        .expect("migrate");
    assert_eq!(report.from, PRE_VERSIONING_BASELINE);
    assert_eq!(read(&layout.version_file()).trim(), CURRENT_VERSION);
    assert_eq!(read(&layout.config_toml().with_extension("toml.backup")), LEGACY_CONFIG);

    let doc: toml::Table = read(&layout.config_toml()).parse().expect("toml");
    assert_eq!(doc["runtime"]["engine"].as_str(), Some("podman"));
    // Incompatible type: the template default wins.
    assert_eq!(doc["runtime"]["auto_update_check"].as_bool(), Some(true));
    assert_eq!(doc["network"]["mode"].as_str(), Some("strict"));
    assert_eq!(
        doc["network"]["allowed_domains"]
            .as_array()
            .expect("array")
            .len(),
        2
    );
    assert!(doc["network"]["blocked_ips"].as_array().expect("array").is_empty());
    assert!(!doc.contains_key("telemetry"));
    assert!(doc.contains_key("sandbox"));

    assert!(rebuild_marker::get(&StdFs, &layout).expect("marker").present);
    assert_eq!(
        version_gate::evaluate(&StdFs, &layout, CURRENT_VERSION).expect("gate"),
        GateDecision::UpToDate
    );
}

#[tokio::test]
async fn test_sidecars_match_templates_after_migration() {
    let (_dir, layout) = scratch();
    std::fs::write(layout.version_file(), "0.0.1\n").expect("seed");
    std::fs::write(layout.config_toml(), "[runtime]\nengine = \"docker\"\n").expect("seed");
    let templates = EmbeddedTemplates::load().expect("templates");

    Migrator::new(&StdFs, &templates, &NoRuntime, &Silent, &layout, CURRENT_VERSION)
        .migrate("0.0.1", PackagesPolicy::Additive)
        .await
        .expect("migrate");

    for (name, sidecar) in [
        (names::CONFIG, layout.config_hash()),
        (names::PACKAGES, layout.packages_hash()),
        (names::ENTRYPOINT, layout.entrypoint_hash()),
    ] {
        let template = templates.get(name).expect("template");
        assert_eq!(read(&sidecar).trim(), template.sha256(), "{name}");
    }
    for template in templates.templates().iter().filter(|t| t.is_container_file()) {
        assert_eq!(
            std::fs::read(layout.resolve(template.dest)).expect("read"),
            template.bytes,
            "{}",
            template.dest
        );
    }
    assert!(layout.install_script().exists());
}

#[tokio::test]
async fn test_repeated_migration_keeps_config_stable() {
    let (_dir, layout) = scratch();
    std::fs::write(layout.config_toml(), LEGACY_CONFIG).expect("seed");
    let templates = EmbeddedTemplates::load().expect("templates");
    let migrator = Migrator::new(&StdFs, &templates, &NoRuntime, &Silent, &layout, CURRENT_VERSION);

    migrator
        .migrate(PRE_VERSIONING_BASELINE, PackagesPolicy::Additive)
        .await
        .expect("first");
    let first = read(&layout.config_toml());
    let packages = read(&layout.packages_toml());

    migrator
        .migrate(CURRENT_VERSION, PackagesPolicy::Additive)
        .await
        .expect("second");
    assert_eq!(read(&layout.config_toml()), first);
    assert_eq!(read(&layout.packages_toml()), packages);
}

#[test]
fn test_tree_from_newer_binary_is_left_alone() {
    let (_dir, layout) = scratch();
    std::fs::write(layout.version_file(), "99.0.0\n").expect("seed");
    std::fs::write(layout.config_toml(), "[runtime]\n").expect("seed");

    assert_eq!(
        version_gate::evaluate(&StdFs, &layout, CURRENT_VERSION).expect("gate"),
        GateDecision::UpToDate
    );
    assert_eq!(read(&layout.version_file()), "99.0.0\n");
}

#[test]
fn test_fresh_initialization_then_gate_is_quiet() {
    let (_dir, layout) = scratch();
    let templates = EmbeddedTemplates::load().expect("templates");
    assert_eq!(
        version_gate::evaluate(&StdFs, &layout, CURRENT_VERSION).expect("gate"),
        GateDecision::FreshInstall
    );

    let report = Migrator::new(&StdFs, &templates, &NoRuntime, &Silent, &layout, CURRENT_VERSION)
        .initialize()
        .expect("init");
    assert_eq!(report.files, templates.templates().len());
    assert!(layout.home_dir().is_dir());
    assert!(!layout.rebuild_marker().exists());
    assert_eq!(
        version_gate::evaluate(&StdFs, &layout, CURRENT_VERSION).expect("gate"),
        GateDecision::UpToDate
    );
}
