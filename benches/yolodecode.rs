use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use yolodecode::lowlevel::combine_prototypes;
use yolodecode::{DecodeConfig, Decoder, ImageSize, Mode, OwnedTensor};

const SLOTS: usize = 8400;
const CLASSES: usize = 80;
const PROTOS: usize = 32;

// Deterministic pseudo-random value in [0, 1) from a slot/channel pair.
fn hash01(slot: usize, ch: usize) -> f32 {
    let v = (slot.wrapping_mul(2654435761) ^ ch.wrapping_mul(40503)) & 0xFFFF;
    v as f32 / 65536.0
}

fn make_rows(mask_channels: usize) -> Vec<Vec<f32>> {
    (0..SLOTS)
        .map(|slot| {
            let mut row = vec![
                hash01(slot, 0) * 640.0,
                hash01(slot, 1) * 640.0,
                8.0 + hash01(slot, 2) * 120.0,
                8.0 + hash01(slot, 3) * 120.0,
            ];
            // Sparse confident classes, like real outputs.
            row.extend((0..CLASSES).map(|c| hash01(slot, c + 4).powi(8)));
            row.extend((0..mask_channels).map(|c| hash01(slot, c + 100) * 2.0 - 1.0));
            row
        })
        .collect()
}

fn make_protos() -> OwnedTensor {
    let data = (0..160 * 160 * PROTOS)
        .map(|i| hash01(i, 7) * 2.0 - 1.0)
        .collect();
    OwnedTensor::new(data, [1, 160, 160, PROTOS]).unwrap()
}

fn bench_decoder(c: &mut Criterion) {
    let det_output = OwnedTensor::from_rows(&make_rows(0)).unwrap();
    let detector = Decoder::new(DecodeConfig {
        score_threshold: 0.25,
        iou_threshold: 0.45,
        ..DecodeConfig::default()
    })
    .unwrap();

    c.bench_function("detect_8400x80", |b| {
        b.iter(|| black_box(detector.detect(det_output.view()).unwrap()));
    });

    let seg_output = OwnedTensor::from_rows(&make_rows(PROTOS)).unwrap();
    let protos = make_protos();
    let seg_cfg = DecodeConfig {
        mode: Mode::Segmentation {
            class_count: Some(CLASSES),
        },
        score_threshold: 0.5,
        iou_threshold: 0.45,
        ..DecodeConfig::default()
    };
    let segmenter = Decoder::new(seg_cfg.clone()).unwrap();
    let image = ImageSize::new(640, 480);

    c.bench_function("segment_8400x80_protos32", |b| {
        b.iter(|| {
            black_box(
                segmenter
                    .segment(seg_output.view(), protos.view(), image)
                    .unwrap(),
            )
        });
    });

    if cfg!(feature = "rayon") {
        let segmenter_par = Decoder::new(DecodeConfig {
            parallel: true,
            ..seg_cfg
        })
        .unwrap();
        c.bench_function("segment_8400x80_protos32_parallel", |b| {
            b.iter(|| {
                black_box(
                    segmenter_par
                        .segment(seg_output.view(), protos.view(), image)
                        .unwrap(),
                )
            });
        });
    }

    let coeffs: Vec<f32> = (0..PROTOS).map(|c| hash01(c, 3) - 0.5).collect();
    c.bench_function("combine_prototypes_160x160x32", |b| {
        b.iter(|| black_box(combine_prototypes(protos.view(), &coeffs).unwrap()));
    });
}

criterion_group!(benches, bench_decoder);
criterion_main!(benches);
