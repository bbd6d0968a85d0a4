use assert_cmd::Command;
use predicates::prelude::*;

const ENV_VARS: &[&str] = &[
    "PROVISIONING_NAMESPACE",
    "PROVISIONING_API_SERVER",
    "PROVISIONING_TOKEN_FILE",
    "PROVISIONING_CA_FILE",
    "PROVISIONING_INSECURE",
    "PROVISIONING_LOG_LEVEL",
    "PROVISIONING_LOG_FORMAT",
    "RUST_LOG",
];

fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("provisioning-secrets").unwrap();
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn kinds_lists_managed_secrets() {
    cmd()
        .arg("kinds")
        .assert()
        .success()
        .stdout(predicate::str::contains("metal3-mariadb-password"))
        .stdout(predicate::str::contains("metal3-ironic-password"))
        .stdout(predicate::str::contains("metal3-ironic-inspector-password"))
        .stdout(predicate::str::contains("inspector-user"));
}

#[test]
fn dry_run_creates_every_secret() {
    cmd()
        .args(["ensure", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 secret(s) created"))
        .stdout(predicate::str::contains("openshift-machine-api"));
}

#[test]
fn dry_run_honours_kind_filter() {
    cmd()
        .args(["-n", "metal3", "ensure", "--dry-run", "--kind", "ironic"])
        .assert()
        .success()
        .stdout(predicate::str::contains("metal3-ironic-password"))
        .stdout(predicate::str::contains("metal3-mariadb-password").not())
        .stdout(predicate::str::contains("1 secret(s) created"));
}

#[test]
fn invalid_namespace_fails() {
    cmd()
        .args(["-n", "Not_A_Namespace", "ensure", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn missing_config_file_fails() {
    cmd()
        .args(["--config", "/nonexistent/bootstrap.yml", "kinds"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn config_file_sets_namespace() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bootstrap.yml");
    std::fs::write(&path, "namespace: baremetal\n").unwrap();

    cmd()
        .arg("--config")
        .arg(&path)
        .args(["ensure", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("baremetal"));
}

#[test]
fn version_reports_name_and_version() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "provisioning-secrets {}",
            env!("CARGO_PKG_VERSION")
        )));
}
