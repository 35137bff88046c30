// YouTube watch/share links to embeddable player URLs

use url::Url;

const EMBED_BASE: &str = "https://www.youtube.com/embed/";

/// Embed URL for a YouTube link, or `None` for anything that isn't one.
///
/// `youtube.com/watch?v=<id>` takes the `v` parameter, `youtu.be/<id>` the path.
pub fn embed_url(video_url: &str) -> Option<String> {
    let parsed: Url = Url::parse(video_url.trim()).ok()?;

    let video_id: String = match parsed.host_str()? {
        "youtu.be" => parsed.path().trim_start_matches('/').to_string(),
        "www.youtube.com" | "youtube.com" => parsed
            .query_pairs()
            .find(|(key, value)| key == "v" && !value.is_empty())
            .map(|(_, value)| value.into_owned())?,
        _ => return None,
    };

    if video_id.is_empty() {
        return None;
    }
    Some(format!("{EMBED_BASE}{video_id}"))
}
