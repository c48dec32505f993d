// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use outq_core::MutationRecord;

use crate::cli::OutputFormat;
use crate::error::Result;

use super::open_queue;

pub async fn run(output: OutputFormat) -> Result<()> {
    let (queue, _, _) = open_queue()?;
    let records = queue.list_all().await?;

    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
        OutputFormat::Text => {
            if records.is_empty() {
                println!("Queue is empty.");
            }
            for record in &records {
                println!("{}", format_record(record));
            }
        }
    }
    Ok(())
}

pub async fn size() -> Result<()> {
    let (queue, _, _) = open_queue()?;
    println!("{}", queue.size().await?);
    Ok(())
}

/// One-line summary, with the last error on a second line if present.
pub(crate) fn format_record(record: &MutationRecord) -> String {
    let mut line = format!(
        "{}  {:<6}  {}  {}",
        record.id,
        record.operation.kind().as_str(),
        record.resource,
        record.created_at.format("%Y-%m-%d %H:%M:%S")
    );
    if record.retry_count > 0 {
        line.push_str(&format!("  (retries: {})", record.retry_count));
    }
    if let Some(err) = &record.last_error {
        line.push_str(&format!("\n    last error: {}", err));
    }
    line
}

#[cfg(test)]
#[path = "list_tests.rs"]
mod tests;
