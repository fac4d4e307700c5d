use chrono::Utc;
use rand::Rng;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const LOCAL_SUFFIX_LEN: usize = 6;

fn base36_suffix(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

/// `{prefix}-{unixMillis}-{base36}{ext}`, `ext` including its dot.
pub fn local_filename(prefix: &str, extension: Option<&str>) -> String {
    format!(
        "{}-{}-{}{}",
        prefix,
        Utc::now().timestamp_millis(),
        base36_suffix(LOCAL_SUFFIX_LEN),
        extension.unwrap_or("")
    )
}

/// `{prefix}-{unixMillis}-{0..=999}`
pub fn cloud_public_id(prefix: &str) -> String {
    format!(
        "{}-{}-{}",
        prefix,
        Utc::now().timestamp_millis(),
        rand::thread_rng().gen_range(0..1000)
    )
}
