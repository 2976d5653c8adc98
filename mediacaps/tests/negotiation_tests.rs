//! End-to-end format negotiation tests.
//!
//! Exercises the full path a client takes: build a [`CodecInfo`] from
//! declared profile/level lists and attribute maps, look up per-type
//! capabilities, and negotiate candidate formats against them.

use mediacaps::profile::{avc, h263};
use mediacaps::{mime, CodecCapabilities, CodecInfo, FormatMap, ProfileLevel, Rational};
use mediacaps_core::format::keys;

/// A decoder component handling AVC (Baseline 3.1 and High 4) plus AAC.
fn media_decoder() -> CodecInfo {
    let avc_pls = vec![
        ProfileLevel::new(avc::PROFILE_BASELINE, avc::LEVEL_31),
        ProfileLevel::new(avc::PROFILE_HIGH, avc::LEVEL_4),
    ];
    let video = CodecCapabilities::new(mime::VIDEO_AVC, false, avc_pls, vec![], &FormatMap::new())
        .expect("video caps");
    let audio =
        CodecCapabilities::new(mime::AUDIO_AAC, false, vec![], vec![], &FormatMap::new())
            .expect("audio caps");
    CodecInfo::new("c2.test.media.decoder", false, vec![video, audio])
}

fn video_format(width: i64, height: i64, frame_rate: i64) -> FormatMap {
    let mut format = FormatMap::new();
    format
        .set_str(keys::MIME, mime::VIDEO_AVC)
        .set_int(keys::WIDTH, width)
        .set_int(keys::HEIGHT, height)
        .set_int(keys::FRAME_RATE, frame_rate);
    format
}

// === Facade lookup ===

#[test]
fn test_facade_routes_by_media_type() {
    let info = media_decoder();
    assert_eq!(
        info.supported_types(),
        vec![mime::AUDIO_AAC, mime::VIDEO_AVC]
    );
    assert!(info.capabilities_for_type(mime::VIDEO_AVC).is_ok());
    assert!(info.capabilities_for_type(mime::AUDIO_OPUS).is_err());
}

// === Video negotiation ===

#[test]
fn test_level_4_sustains_1080p30_but_not_1080p60() {
    let caps = media_decoder()
        .capabilities_for_type(mime::VIDEO_AVC)
        .unwrap();
    assert!(caps.supports_format(&video_format(1920, 1088, 30)).unwrap());
    assert!(!caps.supports_format(&video_format(1920, 1088, 60)).unwrap());
    assert!(!caps.supports_format(&video_format(4096, 2304, 30)).unwrap());
}

#[test]
fn test_profile_claim_narrows_to_that_profiles_levels() {
    let caps = media_decoder()
        .capabilities_for_type(mime::VIDEO_AVC)
        .unwrap();
    // 1080p is fine for the component as a whole (High level 4)...
    let mut format = video_format(1920, 1088, 30);
    assert!(caps.supports_format(&format).unwrap());
    // ...but not when the caller pins the Baseline profile, whose highest
    // declared level is 3.1.
    format.set_int(keys::PROFILE, avc::PROFILE_BASELINE as i64);
    assert!(!caps.supports_format(&format).unwrap());
    format.set_int(keys::PROFILE, avc::PROFILE_HIGH as i64);
    assert!(caps.supports_format(&format).unwrap());
}

#[test]
fn test_bitrate_participates_in_negotiation() {
    let caps = media_decoder()
        .capabilities_for_type(mime::VIDEO_AVC)
        .unwrap();
    // High level 4 allows up to 25 Mbps
    let mut format = video_format(1920, 1088, 30);
    format.set_int(keys::BITRATE, 20_000_000);
    assert!(caps.supports_format(&format).unwrap());
    format.set_int(keys::BITRATE, 40_000_000);
    assert!(!caps.supports_format(&format).unwrap());
    // the larger of average and max bitrate is what counts
    format.set_int(keys::BITRATE, 1_000_000);
    format.set_int(keys::MAX_BITRATE, 40_000_000);
    assert!(!caps.supports_format(&format).unwrap());
}

#[test]
fn test_frame_rate_query_matches_negotiation() {
    let info = media_decoder();
    let caps = info.capabilities_for_type(mime::VIDEO_AVC).unwrap();
    let video = caps.video_capabilities().unwrap();
    let rates = video.supported_frame_rates_for(1920, 1088).unwrap();
    assert!(rates.contains(Rational::from_int(30)));
    assert!(!rates.contains(Rational::from_int(60)));
}

#[test]
fn test_size_queries_agree_with_point_support() {
    let info = media_decoder();
    let caps = info.capabilities_for_type(mime::VIDEO_AVC).unwrap();
    let video = caps.video_capabilities().unwrap();

    let widths = video.supported_widths_for(1088).unwrap();
    assert!(widths.contains(1920));
    assert!(video.supports(widths.upper(), 1088, None));
    // one block past the upper bound must fail
    let (block_width, _) = video.block_size();
    assert!(!video.supports(widths.upper() + block_width, 1088, None));

    let heights = video.supported_heights_for(1920).unwrap();
    assert!(heights.contains(1088));
    assert!(video.supports(1920, heights.upper(), None));
}

#[test]
fn test_h263_level45_is_pinned_to_its_grid() {
    let pls = vec![ProfileLevel::new(h263::PROFILE_BASELINE, h263::LEVEL_45)];
    let caps = CodecCapabilities::new(mime::VIDEO_H263, false, pls, vec![], &FormatMap::new())
        .unwrap();
    let mut format = FormatMap::new();
    format
        .set_int(keys::WIDTH, 176)
        .set_int(keys::HEIGHT, 144)
        .set_int(keys::FRAME_RATE, 15);
    assert!(caps.supports_format(&format).unwrap());
    format.set_int(keys::WIDTH, 352).set_int(keys::HEIGHT, 288);
    assert!(!caps.supports_format(&format).unwrap());
}

// === Audio negotiation ===

#[test]
fn test_aac_sample_rates_are_discrete() {
    let caps = media_decoder()
        .capabilities_for_type(mime::AUDIO_AAC)
        .unwrap();
    let mut format = FormatMap::new();
    format
        .set_int(keys::SAMPLE_RATE, 44_100)
        .set_int(keys::CHANNEL_COUNT, 2);
    assert!(caps.supports_format(&format).unwrap());
    format.set_int(keys::SAMPLE_RATE, 44_000);
    assert!(!caps.supports_format(&format).unwrap());
    format.set_int(keys::SAMPLE_RATE, 96_000);
    assert!(caps.supports_format(&format).unwrap());
}

#[test]
fn test_channel_count_is_capped() {
    let caps = media_decoder()
        .capabilities_for_type(mime::AUDIO_AAC)
        .unwrap();
    let audio = caps.audio_capabilities().unwrap();
    assert_eq!(audio.max_input_channel_count(), 48);

    let mut format = FormatMap::new();
    format.set_int(keys::CHANNEL_COUNT, 48);
    assert!(caps.supports_format(&format).unwrap());
    format.set_int(keys::CHANNEL_COUNT, 49);
    assert!(!caps.supports_format(&format).unwrap());
}

#[test]
fn test_amr_is_single_rate_mono() {
    let caps =
        CodecCapabilities::new(mime::AUDIO_AMR_NB, false, vec![], vec![], &FormatMap::new())
            .unwrap();
    let mut format = FormatMap::new();
    format
        .set_int(keys::SAMPLE_RATE, 8_000)
        .set_int(keys::CHANNEL_COUNT, 1);
    assert!(caps.supports_format(&format).unwrap());
    format.set_int(keys::SAMPLE_RATE, 16_000);
    assert!(!caps.supports_format(&format).unwrap());
}

// === Encoder negotiation ===

#[test]
fn test_flac_encoder_validates_compression_levels() {
    let caps = CodecCapabilities::new(mime::AUDIO_FLAC, true, vec![], vec![], &FormatMap::new())
        .unwrap();
    let mut format = FormatMap::new();
    format.set_int(keys::FLAC_COMPRESSION_LEVEL, 5);
    assert!(caps.supports_format(&format).unwrap());
    format.set_int(keys::FLAC_COMPRESSION_LEVEL, 9);
    assert!(!caps.supports_format(&format).unwrap());
    // conflicting alias keys are a malformed query, not a mismatch
    format.set_int(keys::FLAC_COMPRESSION_LEVEL, 5);
    format.set_int(keys::COMPLEXITY, 3);
    assert!(caps.supports_format(&format).is_err());
}

// === Regular-codec filtering ===

#[test]
fn test_regular_subset_through_the_facade() {
    let mut secure = FormatMap::new();
    secure.set_int("feature-secure-playback", 1);
    let avc_pls = vec![ProfileLevel::new(avc::PROFILE_BASELINE, avc::LEVEL_31)];
    let video =
        CodecCapabilities::new(mime::VIDEO_AVC, false, avc_pls, vec![], &secure).unwrap();
    let audio =
        CodecCapabilities::new(mime::AUDIO_AAC, false, vec![], vec![], &FormatMap::new())
            .unwrap();
    let info = CodecInfo::new("c2.test.secure.decoder", false, vec![video, audio]);

    let regular = info.regular_subset().expect("audio entry is regular");
    assert_eq!(regular.supported_types(), vec![mime::AUDIO_AAC]);
    assert!(regular.capabilities_for_type(mime::VIDEO_AVC).is_err());
}
