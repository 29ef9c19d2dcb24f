//! Async board loading
//!
//! Reads the board file with tokio's filesystem API so a server-side caller
//! does not block its runtime while loading.

use crate::loader::board_file::{BoardDefinition, BoardLoader};
use crate::Result;
use std::path::Path;

/// Load and parse a board file without blocking the runtime
pub async fn load_board_async(path: &Path) -> Result<BoardDefinition> {
    let content = tokio::fs::read_to_string(path).await?;
    BoardLoader::parse(&content)
}
