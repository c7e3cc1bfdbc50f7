//! bm-project: scenario file format, validation and compilation into a
//! runnable model.

pub mod compile;
pub mod schema;
pub mod validate;

pub use compile::{compile, run_options};
pub use schema::*;
pub use validate::{ValidationError, validate_scenario};

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Model error: {0}")]
    Model(#[from] bm_sim::SimError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn from_yaml_str(content: &str) -> ProjectResult<Scenario> {
    let scenario: Scenario = serde_yaml::from_str(content)?;
    validate_scenario(&scenario)?;
    Ok(scenario)
}

pub fn to_yaml_string(scenario: &Scenario) -> ProjectResult<String> {
    validate_scenario(scenario)?;
    Ok(serde_yaml::to_string(scenario)?)
}

pub fn load_yaml(path: &std::path::Path) -> ProjectResult<Scenario> {
    let content = std::fs::read_to_string(path)?;
    from_yaml_str(&content)
}

pub fn save_yaml(path: &std::path::Path, scenario: &Scenario) -> ProjectResult<()> {
    let content = to_yaml_string(scenario)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &std::path::Path) -> ProjectResult<Scenario> {
    let content = std::fs::read_to_string(path)?;
    let scenario: Scenario = serde_json::from_str(&content)?;
    validate_scenario(&scenario)?;
    Ok(scenario)
}

pub fn save_json(path: &std::path::Path, scenario: &Scenario) -> ProjectResult<()> {
    validate_scenario(scenario)?;
    let content = serde_json::to_string_pretty(scenario)?;
    std::fs::write(path, content)?;
    Ok(())
}
