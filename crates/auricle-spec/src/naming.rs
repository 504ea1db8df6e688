//! Suggested file names for exported impulse responses.

use crate::hrir::Channel;

/// Prefix shared by every exported impulse response file.
pub const FILE_NAME_PREFIX: &str = "custom_hrir";

/// Extension of exported WAV files.
pub const WAV_EXTENSION: &str = "wav";

/// Builds the suggested download name for an impulse response.
///
/// The format is `custom_hrir_<channel>_<timestamp>.<extension>`, where the
/// timestamp is milliseconds since the Unix epoch. A leading dot on the
/// extension is ignored.
///
/// # Example
/// ```
/// use auricle_spec::naming::suggested_file_name;
/// use auricle_spec::Channel;
///
/// let name = suggested_file_name(Channel::Right, 1_700_000_000_000, "wav");
/// assert_eq!(name, "custom_hrir_right_1700000000000.wav");
/// ```
pub fn suggested_file_name(channel: Channel, timestamp_ms: i64, extension: &str) -> String {
    let extension = extension.trim_start_matches('.');
    format!(
        "{}_{}_{}.{}",
        FILE_NAME_PREFIX,
        channel.as_str(),
        timestamp_ms,
        extension
    )
}

/// Builds the suggested WAV download name.
pub fn suggested_wav_name(channel: Channel, timestamp_ms: i64) -> String {
    suggested_file_name(channel, timestamp_ms, WAV_EXTENSION)
}
