//! Facade-level configuration: worker rates, the default model, and the
//! ontology file (if any) to load at startup.

#[derive(Debug, Clone)]
pub struct KbConfig {
    pub reasoner_hz: u64,
    pub sweeper_hz: u64,
    pub default_model: String,
    pub initial_ontology: Option<std::path::PathBuf>,
}

impl Default for KbConfig {
    fn default() -> Self {
        Self {
            reasoner_hz: crate::reasoner::REASONER_HZ,
            sweeper_hz: crate::lifespan::SWEEP_HZ,
            default_model: crate::store::DEFAULT_MODEL.to_string(),
            initial_ontology: None,
        }
    }
}
