use std::sync::Arc;

use bannercraft::{
    CanvasSize, Color, EditState, LayerCache, LayerImage, LayerSlot, Renderer, Template,
};

fn digest(bytes: &[u8]) -> u64 {
    // FNV-1a, enough to compare frames for equality.
    let mut state = 0xcbf2_9ce4_8422_2325u64;
    for &b in bytes {
        state ^= u64::from(b);
        state = state.wrapping_mul(0x0000_0100_0000_01b3);
    }
    state
}

fn renderer(width: u32, height: u32) -> Option<Renderer> {
    let canvas = CanvasSize::new(width, height).unwrap();
    match Renderer::with_system_font(canvas) {
        Ok(r) => Some(r),
        Err(err) => {
            eprintln!("skipping: {err}");
            None
        }
    }
}

fn solid_layer(width: u32, height: u32, rgba: [u8; 4]) -> LayerImage {
    let px = [
        ((u16::from(rgba[0]) * u16::from(rgba[3]) + 127) / 255) as u8,
        ((u16::from(rgba[1]) * u16::from(rgba[3]) + 127) / 255) as u8,
        ((u16::from(rgba[2]) * u16::from(rgba[3]) + 127) / 255) as u8,
        rgba[3],
    ];
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for _ in 0..width * height {
        data.extend_from_slice(&px);
    }
    LayerImage {
        width,
        height,
        rgba8_premul: Arc::new(data),
    }
}

fn test_template() -> Template {
    serde_json::from_value(serde_json::json!({
        "urls": { "mask": "m.png", "stroke": "s.png", "design_pattern": "d.png" },
        "caption": {
            "font_size": 12, "text_color": "#ffffff", "alignment": "left",
            "max_characters_per_line": 16, "position": { "x": 4, "y": 16 }
        },
        "cta": {
            "font_size": 12, "text_color": "#ffffff", "background_color": "#000000",
            "wrap_length": 10, "position": { "x": 32, "y": 44 }
        },
        "image_mask": { "x": 8, "y": 8, "width": 16, "height": 16 }
    }))
    .unwrap()
}

fn pixel(frame: &bannercraft::FrameRgba, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * frame.width + x) * 4) as usize;
    [
        frame.data[i],
        frame.data[i + 1],
        frame.data[i + 2],
        frame.data[i + 3],
    ]
}

#[test]
fn no_template_renders_uniform_background() {
    let Some(mut r) = renderer(64, 64) else { return };
    let state = EditState {
        background_color: Color::parse("#0369a1").unwrap(),
        ..EditState::default()
    };

    let frame = r.render(&state, None, &LayerCache::default()).unwrap();
    assert_eq!((frame.width, frame.height), (64, 64));
    assert!(frame.premultiplied);
    for px in frame.data.chunks_exact(4) {
        assert_eq!(px, &[0x03, 0x69, 0xa1, 0xff]);
    }
}

#[test]
fn rendering_is_idempotent() {
    let Some(mut r) = renderer(64, 64) else { return };
    let template = test_template();

    let mut layers = LayerCache::default();
    layers.set(LayerSlot::Mask, solid_layer(64, 64, [200, 0, 0, 255]));
    layers.set(LayerSlot::Upload, solid_layer(2, 2, [0, 200, 0, 255]));

    let state = EditState {
        caption: "hello world from the test".to_string(),
        cta: "Shop Now".to_string(),
        background_color: Color::rgb(10, 20, 30),
        ..EditState::default()
    };

    let a = r.render(&state, Some(&template), &layers).unwrap();
    let b = r.render(&state, Some(&template), &layers).unwrap();
    assert_eq!(digest(&a.data), digest(&b.data));
    assert!(a.data.iter().any(|&x| x != 0));
}

#[test]
fn later_template_layers_occlude_earlier_ones() {
    let Some(mut r) = renderer(32, 32) else { return };
    let template = test_template();

    let mut layers = LayerCache::default();
    layers.set(LayerSlot::Mask, solid_layer(32, 32, [255, 0, 0, 255]));
    layers.set(LayerSlot::DesignPattern, solid_layer(32, 32, [0, 0, 255, 255]));

    let frame = r
        .render(&EditState::default(), Some(&template), &layers)
        .unwrap();
    // Design pattern draws after the mask and wins everywhere they overlap
    // (the upload mask rect is empty here).
    assert_eq!(pixel(&frame, 0, 0), [0, 0, 255, 255]);
    assert_eq!(pixel(&frame, 31, 31), [0, 0, 255, 255]);
}

#[test]
fn uploaded_image_is_scaled_into_the_mask_rect_on_top() {
    let Some(mut r) = renderer(32, 32) else { return };
    let template = test_template(); // mask rect x,y=8 w,h=16

    let mut layers = LayerCache::default();
    layers.set(LayerSlot::DesignPattern, solid_layer(32, 32, [0, 0, 255, 255]));
    // A 1x1 source must stretch to fill the whole 16x16 rect.
    layers.set(LayerSlot::Upload, solid_layer(1, 1, [0, 255, 0, 255]));

    let frame = r
        .render(&EditState::default(), Some(&template), &layers)
        .unwrap();
    assert_eq!(pixel(&frame, 9, 9), [0, 255, 0, 255]);
    assert_eq!(pixel(&frame, 22, 22), [0, 255, 0, 255]);
    // Outside the mask rect the design pattern still shows.
    assert_eq!(pixel(&frame, 2, 2), [0, 0, 255, 255]);
    assert_eq!(pixel(&frame, 30, 30), [0, 0, 255, 255]);
}

#[test]
fn missing_layers_degrade_to_background_only() {
    let Some(mut r) = renderer(48, 48) else { return };
    let template = test_template();
    let state = EditState {
        background_color: Color::rgb(50, 60, 70),
        ..EditState::default()
    };

    // Template present but nothing decoded yet and no text: identical to the
    // background-only frame.
    let with_template = r
        .render(&state, Some(&template), &LayerCache::default())
        .unwrap();
    let without = r.render(&state, None, &LayerCache::default()).unwrap();
    assert_eq!(digest(&with_template.data), digest(&without.data));
}

#[test]
fn caption_and_cta_change_pixels() {
    let Some(mut r) = renderer(64, 64) else { return };
    let template = test_template();
    let blank = EditState::default();
    let layers = LayerCache::default();

    let empty = r.render(&blank, Some(&template), &layers).unwrap();

    let with_caption = EditState {
        caption: "hi there".to_string(),
        ..EditState::default()
    };
    let captioned = r.render(&with_caption, Some(&template), &layers).unwrap();
    assert_ne!(digest(&empty.data), digest(&captioned.data));

    let with_cta = EditState {
        cta: "Go".to_string(),
        ..EditState::default()
    };
    let cta_frame = r.render(&with_cta, Some(&template), &layers).unwrap();
    assert_ne!(digest(&empty.data), digest(&cta_frame.data));

    // The CTA pill paints its background color, so some pixel near the CTA
    // anchor must be dark (text pixels there may be white, pill pixels black).
    let mut found_dark = false;
    for y in 39..50 {
        for x in 27..38 {
            let px = pixel(&cta_frame, x, y);
            found_dark |= px[0] < 64 && px[1] < 64 && px[2] < 64;
        }
    }
    assert!(found_dark);
}
