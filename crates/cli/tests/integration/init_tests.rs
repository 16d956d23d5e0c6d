use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn init_then_plan_uses_template_defaults() {
  let env = TestEnv::empty();
  for function in super::common::DEFAULT_FUNCTIONS {
    env.write_function(function);
  }

  env.thumbstack_cmd().arg("init").assert().success();

  let content = std::fs::read_to_string(&env.config_path).unwrap();
  assert!(content.contains("[gateway]"));

  env
    .thumbstack_cmd()
    .arg("plan")
    .assert()
    .success()
    .stdout(predicate::str::contains("webapp_bucket"))
    .stdout(predicate::str::contains("presign_url"));
}

#[test]
fn init_does_not_overwrite() {
  let env = TestEnv::from_fixture("minimal.toml");

  env
    .thumbstack_cmd()
    .arg("init")
    .assert()
    .failure()
    .stderr(predicate::str::contains("already exists"));

  assert_eq!(
    std::fs::read_to_string(&env.config_path).unwrap(),
    super::common::fixture_content("minimal.toml")
  );
}
