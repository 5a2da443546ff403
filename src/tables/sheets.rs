// src/tables/sheets.rs
use url::Url;

const SHEETS_HOST: &str = "docs.google.com";

/// Converts a Google Sheets view/edit URL into its CSV export URL. The tab
/// comes from a `gid` in the query or fragment, defaulting to the first.
/// Returns `None` for anything that is not a spreadsheet URL.
pub fn google_sheet_csv_url(view_url: &str) -> Option<String> {
    let url = Url::parse(view_url).ok()?;
    if url.host_str() != Some(SHEETS_HOST) {
        return None;
    }

    let segments: Vec<&str> = url.path_segments()?.collect();
    let sheet_id = match segments.as_slice() {
        ["spreadsheets", "d", id, ..] if !id.is_empty() => *id,
        _ => return None,
    };

    let gid = url
        .query_pairs()
        .find(|(k, _)| k == "gid")
        .map(|(_, v)| v.into_owned())
        .or_else(|| {
            url.fragment().and_then(|fragment| {
                fragment
                    .split('&')
                    .find_map(|part| part.strip_prefix("gid="))
                    .map(str::to_string)
            })
        })
        .filter(|gid| !gid.is_empty())
        .unwrap_or_else(|| "0".to_string());

    Some(format!(
        "https://{}/spreadsheets/d/{}/export?format=csv&gid={}",
        SHEETS_HOST, sheet_id, gid
    ))
}
