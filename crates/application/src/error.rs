use userscript_dom::DomError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("page error: {0}")]
    Dom(#[from] DomError),
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("module {module} requires the {capability} capability")]
    MissingCapability {
        module: &'static str,
        capability: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, AppError>;
