//! Template content for `thumbstack init`.

/// Commented `stack.toml` spelling out every default.
pub const STACK_TOML_TEMPLATE: &str = r#"# thumbstack configuration
#
# Every value below is the default; delete what you do not need to change.

[stack]
name = "iac-assignment-backend"
# Physical bucket names: <bucket_prefix>-<bucket name>
bucket_prefix = "localstack-thumbnails-app"
# Discovery keys: /<app_prefix>/buckets/<bucket name>
app_prefix = "localstack-thumbnail-app"
# Function sources: <functions_root>/<function name>
functions_root = "lambdas"
# region = "eu-central-1"

[function]
role = "arn:aws:iam::000000000000:role/lambda-role"
runtime = "python3.9"
handler = "handler.handler"
timeout = 10
environment = { STAGE = "local" }

[resize]
name = "resize"
max_event_age = 3600
# Route failed resize invocations to the failure topic
dead_letter = false

[[buckets]]
name = "images"
notify = true
target = "resize"

[[buckets]]
name = "resized"
notify = false

[gateway]
functions = ["presign", "list"]
max_event_age = 300
max_retry_attempts = 2

[failure]
topic = "failed-resize-topic"
endpoint = "my-email@example.com"
protocol = "email"

[frontend]
bucket = "webapp"
index_document = "index.html"
env_file = "website/.env.local"
block_public_access = false
"#;
