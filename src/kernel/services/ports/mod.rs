//! Service ports: traits + data contracts.

pub mod config;
pub mod factory;
pub mod label;
pub mod model;
pub mod mutator;
pub mod persistence;
pub mod settings;

pub use config::SessionConfig;
pub use factory::{AddNodeCommand, InvalidFragmentError, NodeFactory};
pub use label::LabelProvider;
pub use model::{DetailTriple, ModelService, ModelUpdateError, ServiceError};
pub use mutator::{AddedFragment, DocumentMutator, MutationError};
pub use persistence::{DocumentRef, PersistenceCommitter, SaveError};
pub use settings::{JsonTreeSettings, Settings};
