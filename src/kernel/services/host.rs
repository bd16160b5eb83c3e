use std::sync::Arc;

use super::ports::{DocumentMutator, ModelService, NodeFactory, PersistenceCommitter};

/// Strategy objects a concrete editor injects into its session.
#[derive(Clone)]
pub struct Collaborators {
    pub factory: Arc<dyn NodeFactory>,
    pub model: Arc<dyn ModelService>,
    pub mutator: Arc<dyn DocumentMutator>,
    pub committer: Arc<dyn PersistenceCommitter>,
}

impl Collaborators {
    pub fn new(
        factory: Arc<dyn NodeFactory>,
        model: Arc<dyn ModelService>,
        mutator: Arc<dyn DocumentMutator>,
        committer: Arc<dyn PersistenceCommitter>,
    ) -> Self {
        Self {
            factory,
            model,
            mutator,
            committer,
        }
    }
}
