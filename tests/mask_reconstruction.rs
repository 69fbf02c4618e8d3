use yolodecode::lowlevel::{
    combine_prototypes, reconstruct, sample_bilinear, sigmoid, upsample_bilinear, ScoreGrid,
};
use yolodecode::{BoundingBox, DecodeError, DetectionCandidate, MaskParams, OwnedTensor};

fn seg_candidate(bbox: BoundingBox, coeffs: Vec<f32>) -> DetectionCandidate {
    DetectionCandidate {
        mask_coeffs: Some(coeffs),
        ..DetectionCandidate::new(bbox, 0.9, 0)
    }
}

#[test]
fn zero_coefficients_at_half_threshold_fill_the_box() {
    // sigmoid(0) == 0.5 everywhere; the threshold is inclusive.
    let protos = OwnedTensor::new(vec![1.0, -2.0, 3.0, 0.5, -1.0, 2.0, 0.25, 4.0], [1, 2, 2, 2])
        .unwrap();
    let params = MaskParams {
        input_width: 4,
        input_height: 4,
        threshold: 0.5,
    };
    let bbox = BoundingBox::new(1.0, 1.0, 3.0, 3.0);
    let masks = reconstruct(
        &[seg_candidate(bbox, vec![0.0, 0.0])],
        protos.view(),
        8,
        8,
        &params,
    )
    .unwrap();

    let mask = &masks[0];
    assert_eq!((mask.width(), mask.height()), (8, 8));
    // Box scaled by 2 covers pixels [2, 6) on both axes.
    assert_eq!(mask.area(), 16);
    for y in 0..8 {
        for x in 0..8 {
            let inside = (2..6).contains(&x) && (2..6).contains(&y);
            assert_eq!(mask.get(x, y), Some(inside), "pixel ({x}, {y})");
        }
    }
}

#[test]
fn strongly_negative_masks_stay_empty() {
    let protos = OwnedTensor::new(vec![-10.0; 4], [1, 2, 2, 1]).unwrap();
    let masks = reconstruct(
        &[seg_candidate(BoundingBox::new(0.0, 0.0, 640.0, 640.0), vec![1.0])],
        protos.view(),
        16,
        16,
        &MaskParams::default(),
    )
    .unwrap();
    assert_eq!(masks[0].area(), 0);
}

#[test]
fn box_outside_the_image_produces_empty_mask() {
    let protos = OwnedTensor::new(vec![10.0; 4], [1, 2, 2, 1]).unwrap();
    let masks = reconstruct(
        &[seg_candidate(BoundingBox::new(700.0, 700.0, 800.0, 800.0), vec![1.0])],
        protos.view(),
        32,
        32,
        &MaskParams::default(),
    )
    .unwrap();
    assert_eq!(masks[0].area(), 0);
}

#[test]
fn infinite_box_corner_clamps_to_the_image() {
    let protos = OwnedTensor::new(vec![10.0; 4], [1, 2, 2, 1]).unwrap();
    let params = MaskParams {
        input_width: 8,
        input_height: 8,
        threshold: 0.5,
    };
    let bbox = BoundingBox::new(0.0, 0.0, f32::INFINITY, f32::INFINITY);
    let masks = reconstruct(&[seg_candidate(bbox, vec![1.0])], protos.view(), 8, 8, &params)
        .unwrap();
    assert_eq!(masks[0].area(), 64);
}

#[test]
fn one_bad_candidate_fails_the_batch() {
    let protos = OwnedTensor::zeros([1, 2, 2, 2]).unwrap();
    let bbox = BoundingBox::new(0.0, 0.0, 4.0, 4.0);
    let err = reconstruct(
        &[
            seg_candidate(bbox, vec![0.0, 0.0]),
            seg_candidate(bbox, vec![0.0]),
        ],
        protos.view(),
        4,
        4,
        &MaskParams::default(),
    )
    .err()
    .unwrap();
    assert_eq!(
        err,
        DecodeError::Reconstruction {
            coefficients: 1,
            prototypes: 2
        }
    );
}

#[test]
fn combination_is_a_per_pixel_dot_product() {
    // Two pixels (1 x 2 grid) with three prototypes each.
    let protos = OwnedTensor::new(vec![1.0, 2.0, 3.0, -1.0, 0.0, 4.0], [1, 1, 2, 3]).unwrap();
    let grid = combine_prototypes(protos.view(), &[0.5, 1.0, -1.0]).unwrap();
    assert_eq!((grid.width(), grid.height()), (2, 1));
    assert!((grid.get(0, 0).unwrap() - -0.5).abs() < 1e-6);
    assert!((grid.get(1, 0).unwrap() - -4.5).abs() < 1e-6);
}

#[test]
fn bilinear_is_identity_at_integer_coordinates() {
    let grid = ScoreGrid::new((0..12).map(|v| v as f32).collect(), 4, 3).unwrap();
    for y in 0..3 {
        for x in 0..4 {
            assert_eq!(
                sample_bilinear(&grid, x as f32, y as f32),
                grid.get(x, y)
            );
        }
    }
}

#[test]
fn upsampling_preserves_constant_grids() {
    let grid = ScoreGrid::filled(3, 3, 0.25).unwrap();
    let out = upsample_bilinear(&grid, 10, 7).unwrap();
    assert_eq!((out.width(), out.height()), (10, 7));
    assert!(out.data().iter().all(|&v| (v - 0.25).abs() < 1e-6));
}

#[test]
fn sigmoid_stays_in_unit_interval() {
    assert_eq!(sigmoid(0.0), 0.5);
    let mut x = -15.0f32;
    while x <= 15.0 {
        let v = sigmoid(x);
        assert!(v > 0.0 && v < 1.0, "sigmoid({x}) = {v}");
        x += 0.5;
    }
}
