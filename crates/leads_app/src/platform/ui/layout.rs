pub fn help_lines() -> Vec<String> {
    [
        "Commands (type and press Enter):",
        "  n  next page        p  previous page",
        "  r  redraw           e  export all results (JSON + CSV)",
        "  s  start a new run  q  quit",
    ]
    .iter()
    .map(|line| line.to_string())
    .collect()
}

pub fn banner(base_url: &str, campaigns: usize, streaming: bool) -> String {
    let mode = if streaming { "live updates" } else { "single request" };
    format!("Lead results from {base_url} for {campaigns} campaign(s), {mode}")
}
