// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Skeletonization — iterative Zhang-Suen thinning of a binary image down to
// 1-pixel-wide stroke centerlines, plus endpoint detection on the result.
//
// Per iteration the algorithm runs two marking sub-passes; a foreground
// pixel is removed when its 8-neighbour foreground count lies in [2, 6],
// its ordered 0→1 neighbour-transition count is exactly 1, and the two
// corner-avoidance products for that sub-pass are zero. Iteration stops at
// the first pass that removes nothing.

use image::GrayImage;

/// Thin every stroke of a binary image (foreground > 0) to its centerline.
///
/// Topology-preserving: connected strokes stay connected. Border pixels are
/// never candidates, matching the 1-pixel guard band of the classic
/// formulation.
pub fn zhang_suen_thin(binary: &GrayImage) -> GrayImage {
    let (width, height) = binary.dimensions();
    let w = width as usize;
    let h = height as usize;

    let mut grid: Vec<u8> = binary.pixels().map(|p| u8::from(p.0[0] > 0)).collect();

    if w >= 3 && h >= 3 {
        loop {
            let mut changed = false;
            for pass in 0..2 {
                let mut markers = Vec::new();
                for y in 1..h - 1 {
                    for x in 1..w - 1 {
                        let idx = y * w + x;
                        if grid[idx] == 0 {
                            continue;
                        }
                        // Neighbours p2..p9, clockwise from north.
                        let p2 = grid[idx - w];
                        let p3 = grid[idx - w + 1];
                        let p4 = grid[idx + 1];
                        let p5 = grid[idx + w + 1];
                        let p6 = grid[idx + w];
                        let p7 = grid[idx + w - 1];
                        let p8 = grid[idx - 1];
                        let p9 = grid[idx - w - 1];

                        let neighbours =
                            u32::from(p2) + u32::from(p3) + u32::from(p4) + u32::from(p5)
                                + u32::from(p6) + u32::from(p7) + u32::from(p8) + u32::from(p9);
                        if !(2..=6).contains(&neighbours) {
                            continue;
                        }

                        let ring = [p2, p3, p4, p5, p6, p7, p8, p9];
                        let mut transitions = 0;
                        for i in 0..8 {
                            if ring[i] == 0 && ring[(i + 1) % 8] == 1 {
                                transitions += 1;
                            }
                        }
                        if transitions != 1 {
                            continue;
                        }

                        let (c1, c2) = if pass == 0 {
                            (p2 * p4 * p6, p4 * p6 * p8)
                        } else {
                            (p2 * p4 * p8, p2 * p6 * p8)
                        };
                        if c1 == 0 && c2 == 0 {
                            markers.push(idx);
                        }
                    }
                }
                if !markers.is_empty() {
                    changed = true;
                    for idx in markers {
                        grid[idx] = 0;
                    }
                }
            }
            if !changed {
                break;
            }
        }
    }

    GrayImage::from_raw(width, height, grid.into_iter().map(|v| v * 255).collect())
        .expect("thinned buffer has the input's dimensions")
}

/// Skeleton endpoints: skeleton pixels with exactly one skeleton 8-neighbour
/// (the 1s-kernel-with-centre-10 convolution summing to 11). Returned as
/// (x, y) pairs.
pub fn skeleton_endpoints(skeleton: &GrayImage) -> Vec<(u32, u32)> {
    let (width, height) = skeleton.dimensions();
    let on = |x: i64, y: i64| -> u32 {
        if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
            0
        } else {
            u32::from(skeleton.get_pixel(x as u32, y as u32).0[0] > 0)
        }
    };

    let mut endpoints = Vec::new();
    for y in 0..height {
        for x in 0..width {
            if skeleton.get_pixel(x, y).0[0] == 0 {
                continue;
            }
            let (xi, yi) = (x as i64, y as i64);
            let neighbours = on(xi - 1, yi - 1)
                + on(xi, yi - 1)
                + on(xi + 1, yi - 1)
                + on(xi - 1, yi)
                + on(xi + 1, yi)
                + on(xi - 1, yi + 1)
                + on(xi, yi + 1)
                + on(xi + 1, yi + 1);
            if neighbours == 1 {
                endpoints.push((x, y));
            }
        }
    }
    endpoints
}
