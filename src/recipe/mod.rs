//! Declarative recipe loading and resolution.
//!
//! A recipe file (`cairn.yml`) describes provisioning actions with
//! shell-command bodies and declarative guards. Resolution compiles it into
//! an [`ActionGraph`](crate::graph::ActionGraph) the executor can run; the
//! document order of the `actions` list is the graph's insertion order.

mod resolve;
mod schema;

pub use resolve::resolve_recipe;
pub use schema::{ActionConfig, GuardConfig, Recipe, RetryConfig};

use std::path::Path;

use crate::error::{CairnError, Result};

/// Default recipe file name, looked up in the working directory.
pub const DEFAULT_RECIPE_FILE: &str = "cairn.yml";

/// Load a recipe from a YAML file.
pub fn load_recipe(path: &Path) -> Result<Recipe> {
    if !path.exists() {
        return Err(CairnError::RecipeNotFound {
            path: path.to_path_buf(),
        });
    }

    let contents = std::fs::read_to_string(path)?;
    let recipe: Recipe =
        serde_yaml::from_str(&contents).map_err(|e| CairnError::RecipeParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    recipe.validate()?;
    Ok(recipe)
}
