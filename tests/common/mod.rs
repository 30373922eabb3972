// tests/common/mod.rs

use std::sync::Arc;

use assetpipe::exec::PipelineContext;
use assetpipe::fs::RealFileSystem;
use assetpipe::pipeline::TaskRegistry;
use assetpipe_test_utils::fixtures::SiteFixture;

pub use assetpipe_test_utils::init_tracing;

/// Registry + execution context for a fixture, no live reload attached.
pub fn registry_and_ctx(site: &SiteFixture) -> (TaskRegistry, PipelineContext) {
    let cfg = site.config();
    let registry = TaskRegistry::from_config(&cfg).expect("building registry");
    let ctx = PipelineContext {
        fs: Arc::new(RealFileSystem),
        public_root: site.public_root(),
        reload: None,
    };
    (registry, ctx)
}
