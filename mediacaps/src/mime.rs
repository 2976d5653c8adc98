//! Media type constants recognized by the capability engine.

pub const VIDEO_AVC: &str = "video/avc";
pub const VIDEO_HEVC: &str = "video/hevc";
pub const VIDEO_MPEG2: &str = "video/mpeg2";
pub const VIDEO_MPEG4: &str = "video/mp4v-es";
pub const VIDEO_H263: &str = "video/3gpp";
pub const VIDEO_VP8: &str = "video/x-vnd.on2.vp8";
pub const VIDEO_VP9: &str = "video/x-vnd.on2.vp9";

pub const AUDIO_MPEG: &str = "audio/mpeg";
pub const AUDIO_AAC: &str = "audio/mp4a-latm";
pub const AUDIO_VORBIS: &str = "audio/vorbis";
pub const AUDIO_OPUS: &str = "audio/opus";
pub const AUDIO_AMR_NB: &str = "audio/3gpp";
pub const AUDIO_AMR_WB: &str = "audio/amr-wb";
pub const AUDIO_FLAC: &str = "audio/flac";
pub const AUDIO_G711_ALAW: &str = "audio/g711-alaw";
pub const AUDIO_G711_MLAW: &str = "audio/g711-mlaw";
pub const AUDIO_GSM: &str = "audio/gsm";
pub const AUDIO_RAW: &str = "audio/raw";

/// Whether a media type names an audio format.
pub fn is_audio(mime: &str) -> bool {
    starts_with_ignore_case(mime, "audio/")
}

/// Whether a media type names a video format.
pub fn is_video(mime: &str) -> bool {
    starts_with_ignore_case(mime, "video/")
}

/// Case-insensitive media type comparison.
pub fn equals(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len() && s[..prefix.len()].eq_ignore_ascii_case(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        assert!(is_video(VIDEO_AVC));
        assert!(is_audio(AUDIO_AAC));
        assert!(!is_audio(VIDEO_VP9));
        assert!(is_video("Video/AVC"));
    }

    #[test]
    fn mime_equality_ignores_case() {
        assert!(equals("video/avc", "Video/AVC"));
        assert!(!equals(VIDEO_AVC, VIDEO_HEVC));
    }
}
