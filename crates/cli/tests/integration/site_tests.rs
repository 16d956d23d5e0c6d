use predicates::prelude::*;

use super::common::TestEnv;

fn site_env() -> TestEnv {
  let env = TestEnv::from_fixture("frontend.toml");
  env.write_file("website/site/index.html", "<html></html>");
  env
}

#[test]
fn deploy_fails_fast_without_env_file() {
  let env = site_env();

  env
    .thumbstack_cmd()
    .args(["site", "deploy", "--tool", "true"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("env file not found"));
}

#[test]
fn deploy_fails_on_malformed_env_file() {
  let env = site_env();
  env.write_file("website/.env.local", "S3_BUCKET_FRONTEND\n");

  env
    .thumbstack_cmd()
    .args(["site", "deploy", "--tool", "true"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("expected KEY=value"));
}

#[test]
fn destroy_fails_when_key_is_missing() {
  let env = site_env();
  env.write_file("website/.env.local", "OTHER=1\n");

  env
    .thumbstack_cmd()
    .args(["site", "destroy", "--tool", "true"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("does not define S3_BUCKET_FRONTEND"));
}

#[cfg(unix)]
#[test]
fn deploy_runs_tool_with_bucket() {
  let env = site_env();
  env.write_file("website/.env.local", "S3_BUCKET_FRONTEND=localstack-thumbnails-app-webapp\n");

  env
    .thumbstack_cmd()
    .args(["site", "deploy", "--tool", "true"])
    .assert()
    .success()
    .stdout(predicate::str::contains("s3://localstack-thumbnails-app-webapp"))
    .stdout(predicate::str::contains("Site deploy complete"));
}

#[cfg(unix)]
#[test]
fn failing_tool_exits_nonzero() {
  let env = site_env();
  env.write_file("website/.env.local", "S3_BUCKET_FRONTEND=localstack-thumbnails-app-webapp\n");

  env
    .thumbstack_cmd()
    .args(["site", "destroy", "--tool", "false"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Site destroy failed"));
}
