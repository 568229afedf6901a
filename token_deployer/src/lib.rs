pub mod artifact;
pub mod deployment;
pub mod error;
pub mod signer;
pub mod task;

pub use deployment::{ConstructorArgs, Deployment, DeploymentResult};
pub use error::{DeployError, FailureKind};
pub use task::DeployTask;
