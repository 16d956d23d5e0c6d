use predicates::prelude::*;

use super::common::TestEnv;

const MANIFEST: &str = "cdktf.out/stacks/iac-assignment-backend/cdk.tf.json";

#[test]
fn synth_writes_manifest_and_archives() {
  let env = TestEnv::from_fixture("minimal.toml");

  env
    .thumbstack_cmd()
    .arg("synth")
    .assert()
    .success()
    .stdout(predicate::str::contains("Synthesized stack iac-assignment-backend"));

  let manifest: serde_json::Value =
    serde_json::from_str(&std::fs::read_to_string(env.path(MANIFEST)).unwrap()).unwrap();

  assert_eq!(
    manifest["resource"]["aws_s3_bucket"]["images_bucket"]["bucket"],
    "localstack-thumbnails-app-images"
  );
  assert_eq!(
    manifest["resource"]["aws_ssm_parameter"]["resized_bucket_ssm"]["name"],
    "/localstack-thumbnail-app/buckets/resized"
  );
  assert_eq!(
    manifest["output"]["presign_url"]["value"],
    "${aws_lambda_function_url.presign_latest.function_url}"
  );

  let filename = manifest["resource"]["aws_lambda_function"]["resize_lambda"]["filename"]
    .as_str()
    .unwrap();
  assert!(
    env
      .path("cdktf.out/stacks/iac-assignment-backend")
      .join(filename)
      .exists()
  );
}

#[test]
fn synth_is_byte_identical_across_runs() {
  let env = TestEnv::from_fixture("minimal.toml");

  env.thumbstack_cmd().arg("synth").assert().success();
  let first = std::fs::read(env.path(MANIFEST)).unwrap();

  env.thumbstack_cmd().arg("synth").assert().success();
  let second = std::fs::read(env.path(MANIFEST)).unwrap();

  assert_eq!(first, second);
}

#[test]
fn synth_out_dir_and_json_output() {
  let env = TestEnv::from_fixture("frontend.toml");
  let out = env.path("build");

  let output = env
    .thumbstack_cmd()
    .arg("synth")
    .arg("--out")
    .arg(&out)
    .args(["-o", "json"])
    .output()
    .unwrap();
  assert!(output.status.success());

  let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(result["stack"], "iac-assignment-backend");
  assert_eq!(result["archives"].as_array().unwrap().len(), 3);

  let manifest: serde_json::Value = serde_json::from_str(
    &std::fs::read_to_string(out.join("stacks/iac-assignment-backend/cdk.tf.json")).unwrap(),
  )
  .unwrap();
  assert_eq!(manifest["provider"]["aws"][0]["region"], "us-east-1");
  assert_eq!(
    manifest["resource"]["local_file"]["env"]["content"],
    "S3_BUCKET_FRONTEND=${aws_s3_bucket.webapp_bucket.bucket}"
  );
}

#[test]
fn source_edit_changes_function_hash() {
  let env = TestEnv::from_fixture("minimal.toml");
  let hash = || {
    env.thumbstack_cmd().arg("synth").assert().success();
    let manifest: serde_json::Value =
      serde_json::from_str(&std::fs::read_to_string(env.path(MANIFEST)).unwrap()).unwrap();
    manifest["resource"]["aws_lambda_function"]["presign_lambda"]["source_code_hash"]
      .as_str()
      .unwrap()
      .to_string()
  };

  let before = hash();
  env.write_file("lambdas/presign/handler.py", "def handler(event, context):\n    return 'v2'\n");
  let after = hash();

  assert_ne!(before, after);
}
