use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn plan_lists_waves_and_outputs() {
  let env = TestEnv::from_fixture("minimal.toml");

  env
    .thumbstack_cmd()
    .arg("plan")
    .assert()
    .success()
    .stdout(predicate::str::contains("Plan: "))
    .stdout(predicate::str::contains("Wave 1:"))
    .stdout(predicate::str::contains("images_notification (notification_binding)"))
    .stdout(predicate::str::contains("list_url, presign_url"));
}

#[test]
fn plan_writes_nothing() {
  let env = TestEnv::from_fixture("minimal.toml");

  env.thumbstack_cmd().arg("plan").assert().success();

  assert!(!env.path("cdktf.out").exists());
}

#[test]
fn plan_json_orders_dependencies_first() {
  let env = TestEnv::from_fixture("minimal.toml");

  let output = env.thumbstack_cmd().args(["plan", "-o", "json"]).output().unwrap();
  assert!(output.status.success());

  let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  let waves = report["waves"].as_array().unwrap();
  let wave_of = |id: &str| {
    waves
      .iter()
      .position(|w| w.as_array().unwrap().iter().any(|e| e["id"] == id))
      .unwrap()
  };

  assert!(wave_of("images_bucket") < wave_of("images_notification"));
  assert!(wave_of("resize_lambda") < wave_of("images_notification"));
  assert_eq!(report["resources"]["aws_lambda_function"], 3);
  assert_eq!(report["hash"].as_str().unwrap().len(), 20);
}

#[test]
fn plan_hash_is_stable_across_runs() {
  let env = TestEnv::from_fixture("minimal.toml");

  let hash = || {
    let output = env.thumbstack_cmd().args(["plan", "-o", "json"]).output().unwrap();
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    report["hash"].as_str().unwrap().to_string()
  };

  assert_eq!(hash(), hash());
}

#[test]
fn plan_rejects_unknown_notification_target() {
  let env = TestEnv::from_fixture("bad_target.toml");

  env
    .thumbstack_cmd()
    .arg("plan")
    .assert()
    .failure()
    .stderr(predicate::str::contains("thumbnail_lambda"));
}

#[test]
fn plan_rejects_notify_without_target() {
  let env = TestEnv::from_fixture("missing_target.toml");

  env
    .thumbstack_cmd()
    .arg("plan")
    .assert()
    .failure()
    .stderr(predicate::str::contains("no target function"));
}
