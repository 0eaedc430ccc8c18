use leads_core::{
    ChannelState, ProcessingStatus, ResultRecord, ResultView, CHANNEL_ERROR_THRESHOLD,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::constants::*;

pub fn render(view: &ResultView) -> Vec<String> {
    let mut lines = Vec::with_capacity(view.records.len() + 7);
    lines.push(status_text(view));
    lines.push(page_info(view));

    let widths = [COL_NAME, COL_PROFILE, COL_MESSAGE];
    lines.push(border(&widths));
    lines.push(row(&widths, ["Name", "Profile", "Personalized Message"]));
    lines.push(border(&widths));
    if view.records.is_empty() {
        let inner: usize = widths.iter().map(|w| w + 3).sum::<usize>() - 3;
        lines.push(format!("| {} |", fit("No results available yet", inner)));
    } else {
        for record in &view.records {
            lines.push(record_row(&widths, record));
        }
    }
    lines.push(border(&widths));
    lines
}

pub fn status_text(view: &ResultView) -> String {
    match &view.channel {
        ChannelState::Idle => "Waiting to start".to_string(),
        ChannelState::Streaming { consecutive_errors } => {
            let mut text = match view.progress {
                Some(progress) => format!(
                    "Processing ({}): {} lead(s) processed, {}/{} campaign(s) complete",
                    status_label(progress.status),
                    progress.processed_count,
                    progress.completed_campaigns,
                    progress.total_campaigns
                ),
                None => "Connecting to live updates...".to_string(),
            };
            if view.retrying {
                text.push_str(&format!(
                    " | connection lost, retrying ({consecutive_errors}/{CHANNEL_ERROR_THRESHOLD})"
                ));
            }
            text
        }
        ChannelState::Polling => {
            "Live updates unavailable; fetching results in one request...".to_string()
        }
        ChannelState::Completed => format!("Completed: {} result(s)", view.total_records),
        ChannelState::Failed { error } => format!("Error: {error}"),
    }
}

pub fn page_info(view: &ResultView) -> String {
    if view.total_records == 0 {
        return format!("Page {} of {} (no results yet)", view.page, view.total_pages);
    }
    format!(
        "Page {} of {} (Showing {}-{} of {} results)",
        view.page, view.total_pages, view.first_index, view.last_index, view.total_records
    )
}

fn status_label(status: ProcessingStatus) -> &'static str {
    match status {
        ProcessingStatus::Initializing => "initializing",
        ProcessingStatus::Processing => "processing",
        ProcessingStatus::Completed => "completed",
        ProcessingStatus::Error => "error",
        ProcessingStatus::Unknown => "unknown",
    }
}

fn record_row(widths: &[usize; 3], record: &ResultRecord) -> String {
    row(
        widths,
        [
            or_placeholder(&record.name),
            or_placeholder(&record.profile_url),
            or_placeholder(&record.input_field),
        ],
    )
}

fn or_placeholder(text: &str) -> &str {
    if text.trim().is_empty() {
        EMPTY_CELL
    } else {
        text
    }
}

fn row(widths: &[usize; 3], cells: [&str; 3]) -> String {
    let cells: Vec<String> = widths
        .iter()
        .zip(cells)
        .map(|(width, cell)| fit(cell, *width))
        .collect();
    format!("| {} |", cells.join(" | "))
}

fn border(widths: &[usize; 3]) -> String {
    let segments: Vec<String> = widths.iter().map(|width| "-".repeat(width + 2)).collect();
    format!("+{}+", segments.join("+"))
}

/// Flatten whitespace, then truncate or pad to exactly `width` display cells.
fn fit(text: &str, width: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut out = String::new();
    let mut used = 0;
    if flat.width() <= width {
        out.push_str(&flat);
        used = flat.width();
    } else {
        let budget = width.saturating_sub(1);
        for ch in flat.chars() {
            let w = ch.width().unwrap_or(0);
            if used + w > budget {
                break;
            }
            out.push(ch);
            used += w;
        }
        if width > 0 {
            out.push(ELLIPSIS);
            used += 1;
        }
    }
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}
