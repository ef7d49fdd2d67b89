mod common;

use common::{tone, SAMPLE_RATE};
use emoprep::config::FeatureConfig;
use emoprep::{AudioClip, FeatureExtractor, FeatureSelection};

const HOP: usize = 512;

fn clip_of_len(len: usize) -> AudioClip {
    let mut samples = tone(330.0, SAMPLE_RATE, len as f32 / SAMPLE_RATE as f32 + 0.1);
    samples.truncate(len);
    assert_eq!(samples.len(), len);
    AudioClip::new(samples, SAMPLE_RATE)
}

#[test]
fn frame_count_matches_centered_framing() {
    let extractor = FeatureExtractor::default();
    assert_eq!(extractor.config().hop_length, HOP);
    for len in [274 * HOP - 1, 274 * HOP, 274 * HOP + 1, 274 * HOP + HOP - 1] {
        let features = extractor
            .analyze(&clip_of_len(len), FeatureSelection::ALL)
            .unwrap();
        assert_eq!(features.frame_count, 1 + len / HOP, "len {len}");
        assert_eq!(features.mfcc.as_ref().unwrap().ncols(), features.frame_count);
        assert_eq!(features.chroma.as_ref().unwrap().ncols(), features.frame_count);
        assert_eq!(features.mel.as_ref().unwrap().ncols(), features.frame_count);
    }
}

#[test]
fn matrix_width_is_exactly_target_at_and_below_it() {
    let extractor = FeatureExtractor::default();
    let target = FeatureConfig::default().target_frames;
    // 274 frames (padded by one), then exactly 275 frames twice
    for len in [274 * HOP - 1, 274 * HOP, 274 * HOP + 1] {
        let matrices = extractor
            .extract_matrix(&clip_of_len(len), FeatureSelection::ALL)
            .unwrap();
        assert_eq!(matrices.combined.dim(), (180, target), "len {len}");
        assert_eq!(matrices.mfcc.unwrap().ncols(), target);
        assert_eq!(matrices.chroma.unwrap().ncols(), target);
        assert_eq!(matrices.mel.unwrap().ncols(), target);
    }
}

#[test]
fn longer_clips_pass_through_untruncated() {
    let extractor = FeatureExtractor::default();
    let len = 300 * HOP;
    let matrices = extractor
        .extract_matrix(&clip_of_len(len), FeatureSelection::ALL)
        .unwrap();
    assert_eq!(matrices.combined.dim(), (180, 301));
    assert_eq!(matrices.mel.unwrap().dim(), (128, 301));
}

#[test]
fn oversized_hop_is_rejected_before_analysis() {
    let config = FeatureConfig {
        hop_length: 5000,
        ..FeatureConfig::default()
    };
    assert!(FeatureExtractor::new(config).is_err());
}
