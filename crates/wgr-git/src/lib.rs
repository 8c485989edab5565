//! # wgr-git
//!
//! Git collaborator for with-git-repo workflows, built on git2-rs.
//! Provides the narrow set of operations the commit workflow needs:
//! clone/open, identity config, branch checkout, staging, status,
//! commit and push.

mod error;
mod repository;
mod traits;

pub use error::{Error, Result};
pub use git2::Oid;
pub use repository::Repository;
pub use traits::GitOps;
