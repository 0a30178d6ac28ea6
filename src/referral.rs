/// Markers that introduce a referral, in priority order.
const REFERRAL_MARKERS: [&str; 2] = ["Registrar WHOIS Server: ", "whois: "];

/// Pulls the next WHOIS server out of a raw response.
///
/// The first marker present anywhere in the text wins; the value runs to the
/// end of that line and is lowercased. Unknown formats yield `None` rather
/// than an error.
pub fn extract_server(data: &str) -> Option<String> {
    let (start, marker) = REFERRAL_MARKERS
        .iter()
        .find_map(|marker| data.find(marker).map(|start| (start, *marker)))?;

    let rest = &data[start + marker.len()..];
    let line = match rest.find('\n') {
        Some(end) => &rest[..end],
        None => rest,
    };

    let server = line.trim();
    if server.is_empty() {
        None
    } else {
        Some(server.to_lowercase())
    }
}
