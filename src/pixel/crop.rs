//! Stage 4: center crop.

/// Crops `img` (width `src_w`, height `src_h`) to `target_w` columns,
/// centered. If `target_w >= src_w`, returns the image unchanged (property
/// 6 in the spec) with its original width.
pub fn center_crop(img: &[u8], src_w: usize, src_h: usize, target_w: usize) -> (Vec<u8>, usize) {
    assert_eq!(img.len(), src_w * src_h, "image buffer does not match dimensions");

    if target_w >= src_w {
        return (img.to_vec(), src_w);
    }

    let offset = (src_w - target_w) / 2;
    let mut out = Vec::with_capacity(target_w * src_h);
    for row in img.chunks_exact(src_w) {
        out.extend_from_slice(&row[offset..offset + target_w]);
    }
    (out, target_w)
}
