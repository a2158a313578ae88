#![allow(dead_code)]

use image::{DynamicImage, GrayImage, Luma};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point as ImgPoint;

/// Black grayscale image with one or more solid white quadrilaterals.
pub fn quads_image(width: u32, height: u32, quads: &[[(i32, i32); 4]]) -> DynamicImage {
    let mut img = GrayImage::new(width, height);
    for corners in quads {
        let polygon: Vec<ImgPoint<i32>> = corners
            .iter()
            .map(|&(x, y)| ImgPoint::new(x, y))
            .collect();
        draw_polygon_mut(&mut img, &polygon, Luma([255u8]));
    }
    DynamicImage::ImageLuma8(img)
}

pub fn quad_image(width: u32, height: u32, corners: [(i32, i32); 4]) -> DynamicImage {
    quads_image(width, height, &[corners])
}

pub fn black_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageLuma8(GrayImage::new(width, height))
}

/// Assert a detected point lies within `tolerance` pixels of the expectation.
pub fn assert_near(actual: quadfind::Point, expected: (f64, f64), tolerance: f64, label: &str) {
    let distance = (actual.x - expected.0).hypot(actual.y - expected.1);
    assert!(
        distance <= tolerance,
        "{} at ({:.1}, {:.1}) is {:.1} px from expected ({:.1}, {:.1})",
        label,
        actual.x,
        actual.y,
        distance,
        expected.0,
        expected.1
    );
}
