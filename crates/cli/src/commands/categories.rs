//! Category listing command.

use vitrine_client::CatalogStore;

use super::{CommandError, Output, ensure_categories, render};

/// Show the category listing with the active filter marked.
pub async fn list(store: &CatalogStore, output: Output) -> Result<(), CommandError> {
    ensure_categories(store).await?;

    let state = store.snapshot();
    let options = state.category_options();
    output.emit(&options, || render::categories(&options))
}
