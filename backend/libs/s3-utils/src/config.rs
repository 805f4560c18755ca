/// S3 connection settings shared by every component that talks to object storage
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3Config {
    /// AWS region
    pub region: String,
    /// Custom endpoint (LocalStack, MinIO, ...)
    pub endpoint: Option<String>,
    /// Whether to use path-style URLs (false = virtual-hosted-style)
    pub force_path_style: bool,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            endpoint: None,
            force_path_style: false,
        }
    }
}

impl S3Config {
    /// Build the object URL for logging and diagnostics
    pub fn object_url(&self, bucket: &str, key: &str) -> String {
        match (&self.endpoint, self.force_path_style) {
            (Some(endpoint), _) => format!("{}/{}/{}", endpoint.trim_end_matches('/'), bucket, key),
            (None, true) => format!("https://s3.{}.amazonaws.com/{}/{}", self.region, bucket, key),
            (None, false) => format!("https://{}.s3.{}.amazonaws.com/{}", bucket, self.region, key),
        }
    }
}
