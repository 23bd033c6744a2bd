/// Build a filesystem-safe `{title}_by_{artist}.mp3` name.
///
/// Every character outside `[A-Za-z0-9]` becomes `_` and the rest is
/// lower-cased. Empty inputs still produce `_by_.mp3`.
pub fn sanitize_filename(title: &str, artist: &str) -> String {
    format!("{}_by_{}.mp3", safe_part(title), safe_part(artist))
}

fn safe_part(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}
