// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::error::{Error, Result};

use super::open_queue;

pub async fn clear() -> Result<()> {
    let (queue, _, _) = open_queue()?;
    let count = queue.size().await?;
    queue.clear().await?;
    println!("Cleared {} mutation(s).", count);
    Ok(())
}

pub async fn drop_record(id: &str) -> Result<()> {
    let (queue, _, _) = open_queue()?;
    if !queue.remove(id).await? {
        return Err(Error::RecordNotFound(id.to_string()));
    }
    println!("Dropped {}", id);
    Ok(())
}
