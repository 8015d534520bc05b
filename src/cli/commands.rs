//! One-shot backend subcommands.

use super::OneShot;
use crate::editor::EditorKind;
use anyhow::Result;
use iot_portal_client::{ControlAction, EntityClient, EntityRecord, Page, SearchParams};
use std::io::Write;

/// Run a subcommand and return the process exit code.
pub async fn run_one_shot(
    client: &EntityClient,
    shot: &OneShot,
    page_size: u32,
    out: &mut impl Write,
) -> Result<i32> {
    match shot {
        OneShot::List { kind, .. } => {
            let params = shot
                .search_params(page_size)
                .unwrap_or_else(|| SearchParams::page(page_size));
            list_cli(client, *kind, &params, out).await?;
        }
        OneShot::Remove { kind, id } => {
            remove_cli(client, *kind, *id, out).await?;
        }
        OneShot::Control { id, action } => {
            control_cli(client, *id, *action, out).await?;
        }
    }
    Ok(0)
}

/// Print one page of `kind` records, one JSON object per line.
pub async fn list_cli(
    client: &EntityClient,
    kind: EditorKind,
    params: &SearchParams,
    out: &mut impl Write,
) -> Result<Page> {
    let page = client.list(kind.segment(), params).await?;

    for record in &page.items {
        writeln!(out, "{}", summary_line(record))?;
    }
    writeln!(out, "{}", footer(&page, params))?;

    Ok(page)
}

/// Delete one record and confirm.
pub async fn remove_cli(
    client: &EntityClient,
    kind: EditorKind,
    id: u64,
    out: &mut impl Write,
) -> Result<()> {
    client.remove(kind.segment(), id).await?;
    log::info!("Removed {} #{}", kind, id);
    writeln!(out, "Removed {} #{}", kind, id)?;
    Ok(())
}

/// Start or stop one channel and confirm.
pub async fn control_cli(
    client: &EntityClient,
    id: u64,
    action: ControlAction,
    out: &mut impl Write,
) -> Result<()> {
    let segment = EditorKind::Channel.segment();
    client.control(segment, id, action).await?;
    log::info!("{} {} #{}", action, segment, id);
    writeln!(out, "Sent {} to {} #{}", action, segment, id)?;
    Ok(())
}

fn summary_line(record: &EntityRecord) -> String {
    match record.id() {
        Some(id) => format!("#{:<6} {}", id, record.without_id().into_value()),
        None => format!("{:<7} {}", "-", record.clone().into_value()),
    }
}

fn footer(page: &Page, params: &SearchParams) -> String {
    if page.items.is_empty() {
        return format!("No records (total {})", page.total);
    }
    let first = u64::from(params.offset) + 1;
    let last = u64::from(params.offset) + page.items.len() as u64;
    let more = if page.has_more(params) {
        format!(" (next: --offset {})", last)
    } else {
        String::new()
    };
    format!("Showing {}-{} of {}{}", first, last, page.total, more)
}
