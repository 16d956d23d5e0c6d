//! Shared constants and defaults.
//!
//! Defaults mirror the LocalStack thumbnail application this stack was built
//! for, so an empty `stack.toml` produces the reference topology.

/// Length of truncated object hashes (manifest hashes).
pub const OBJ_HASH_PREFIX_LEN: usize = 20;

/// Config file used when neither a path nor the env var is given.
pub const DEFAULT_CONFIG_FILE: &str = "stack.toml";
pub const CONFIG_ENV_VAR: &str = "THUMBSTACK_CONFIG";

pub const DEFAULT_STACK_NAME: &str = "iac-assignment-backend";
pub const DEFAULT_BUCKET_PREFIX: &str = "localstack-thumbnails-app";
pub const DEFAULT_APP_PREFIX: &str = "localstack-thumbnail-app";
pub const DEFAULT_FUNCTIONS_ROOT: &str = "lambdas";

pub const DEFAULT_ROLE: &str = "arn:aws:iam::000000000000:role/lambda-role";
pub const DEFAULT_RUNTIME: &str = "python3.9";
pub const DEFAULT_HANDLER: &str = "handler.handler";
pub const DEFAULT_TIMEOUT_SECS: u32 = 10;

pub const RESIZE_FUNCTION: &str = "resize";
pub const RESIZE_MAX_EVENT_AGE_SECS: u32 = 3600;

pub const GATEWAY_MAX_EVENT_AGE_SECS: u32 = 300;
pub const GATEWAY_MAX_RETRY_ATTEMPTS: u32 = 2;

pub const DEFAULT_FAILURE_TOPIC: &str = "failed-resize-topic";
pub const DEFAULT_FAILURE_ENDPOINT: &str = "my-email@example.com";
pub const DEFAULT_FAILURE_PROTOCOL: &str = "email";

/// Event filter for notification bindings.
pub const OBJECT_CREATED_EVENT: &str = "s3:ObjectCreated:*";

/// Qualifier naming the unpublished, latest version of a function.
pub const LATEST_QUALIFIER: &str = "$LATEST";

/// Asynchronous invocation limits enforced by the cloud runtime.
pub const MAX_RETRY_ATTEMPTS_LIMIT: u32 = 2;
pub const MIN_EVENT_AGE_SECS: u32 = 60;
pub const MAX_EVENT_AGE_SECS: u32 = 21600;

/// Entries skipped when hashing and packaging function sources.
pub const ASSET_EXCLUDES: &[&str] = &["__pycache__", ".pytest_cache"];

pub const FRONTEND_ENV_KEY: &str = "S3_BUCKET_FRONTEND";
pub const DEFAULT_FRONTEND_ENV_FILE: &str = "website/.env.local";
pub const DEFAULT_INDEX_DOCUMENT: &str = "index.html";
pub const LOCALSTACK_WEBSITE_SUFFIX: &str = "s3-website.localhost.localstack.cloud:4566";

pub const DEFAULT_OUT_DIR: &str = "cdktf.out";
pub const MANIFEST_FILE: &str = "cdk.tf.json";
pub const ASSET_ARCHIVE_FILE: &str = "archive.zip";

pub const DEFAULT_SYNC_TOOL: &str = "awslocal";
pub const DEFAULT_SITE_DIR: &str = "website/site";
