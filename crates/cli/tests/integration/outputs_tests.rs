use predicates::prelude::*;

use super::common::{TestEnv, fixture_path};

#[test]
fn outputs_writes_env_file() {
  let env = TestEnv::empty();

  env
    .thumbstack_cmd()
    .arg("outputs")
    .arg("--from")
    .arg(fixture_path("engine_output.json"))
    .args(["--env-file", "outputs.env"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Wrote 2 output(s)"));

  let content = std::fs::read_to_string(env.path("outputs.env")).unwrap();
  assert_eq!(
    content,
    "list_url=http://list.lambda-url.us-east-1.localhost.localstack.cloud:4566/\n\
     presign_url=http://presign.lambda-url.us-east-1.localhost.localstack.cloud:4566/\n"
  );
}

#[test]
fn outputs_json_prints_values() {
  let env = TestEnv::empty();

  env
    .thumbstack_cmd()
    .arg("outputs")
    .arg("--from")
    .arg(fixture_path("engine_output.json"))
    .args(["-o", "json"])
    .assert()
    .success()
    .stdout(predicate::str::contains("\"presign_url\""));

  assert!(env.path(".env").exists());
}

#[test]
fn outputs_rejects_malformed_document() {
  let env = TestEnv::empty();
  env.write_file("output.json", "[1, 2, 3]");

  env
    .thumbstack_cmd()
    .args(["outputs", "--from", "output.json"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("invalid engine output document"));
}
