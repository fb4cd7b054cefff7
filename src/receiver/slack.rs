use aka_chatops::InboundCommand;
use lambda_http::http::HeaderMap;
use serde::Deserialize;

/// Header carrying the requesting user's UTC offset in seconds.
pub const TZ_OFFSET_HEADER: &str = "X-Aka-User-Tz-Offset";

/// Form fields of a slash command request that the processor needs.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SlashCommandForm {
    channel_id: String,
    channel_name: String,
    user_id: String,
    user_name: String,
    text: String,
    response_url: String,
}

pub fn parse_command(
    body: &str,
    headers: &HeaderMap,
) -> Result<InboundCommand, serde_urlencoded::de::Error> {
    let form: SlashCommandForm = serde_urlencoded::from_str(body)?;

    Ok(InboundCommand {
        channel_id: form.channel_id,
        channel_name: form.channel_name,
        response_url: form.response_url,
        user_id: form.user_id,
        user_name: form.user_name,
        text: form.text,
        credential: bearer_credential(headers),
        tz_offset: tz_offset(headers),
    })
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn bearer_credential(headers: &HeaderMap) -> Option<String> {
    header_str(headers, "Authorization")
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

fn tz_offset(headers: &HeaderMap) -> Option<i32> {
    header_str(headers, TZ_OFFSET_HEADER).and_then(|v| v.trim().parse().ok())
}
