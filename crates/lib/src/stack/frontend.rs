//! Static website hosting for the web client.
//!
//! A public website bucket plus the env file the site sync reads to find it,
//! and an output carrying the website URL.

use tracing::info;

use crate::config::FrontendConfig;
use crate::consts::{FRONTEND_ENV_KEY, LOCALSTACK_WEBSITE_SUFFIX};
use crate::resource::{
  BucketPublicAccess, BucketWebsite, Declaration, LocalFile, PublishedOutput, Resource, StorageBucket,
};

use super::bucket::BucketNaming;
use super::ids;

/// Declarations for the website bucket.
///
/// `env_file` is the absolute path the engine writes the env file to.
pub fn assemble_frontend(config: &FrontendConfig, naming: BucketNaming<'_>, env_file: String) -> Vec<Declaration> {
  let bucket_id = ids::bucket(&config.bucket);
  let bucket_name = bucket_id.attr("bucket").token();

  let declarations = vec![
    Declaration::new(
      bucket_id.clone(),
      Resource::StorageBucket(StorageBucket {
        bucket: naming.physical_name(&config.bucket),
      }),
    ),
    Declaration::new(
      ids::public_access(&config.bucket),
      Resource::BucketPublicAccess(BucketPublicAccess {
        bucket: bucket_id.attr("id").token(),
        block_public_acls: config.block_public_access,
        block_public_policy: config.block_public_access,
      }),
    ),
    Declaration::new(
      ids::website(&config.bucket),
      Resource::BucketWebsite(BucketWebsite {
        bucket: bucket_id.attr("id").token(),
        index_document: config.index_document.clone(),
      }),
    ),
    Declaration::new(
      ids::env_file(),
      Resource::LocalFile(LocalFile {
        filename: env_file,
        content: format!("{FRONTEND_ENV_KEY}={bucket_name}"),
      }),
    ),
    Declaration::new(
      ids::website_url_output(),
      Resource::PublishedOutput(PublishedOutput {
        value: format!("http://{bucket_name}.{LOCALSTACK_WEBSITE_SUFFIX}"),
      }),
    ),
  ];

  info!(bucket = %config.bucket, "assembled frontend website");
  declarations
}
