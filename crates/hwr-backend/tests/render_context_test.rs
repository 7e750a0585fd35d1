mod common;

use common::{init_logger, ready_context, Call, RecordingApi};
use hwr_backend::{
    RenderContext, RendererConfig, ScreenTexture, ShaderSlot, SpecialState, WarpGrid,
    SCREEN_VERTS,
};
use hwr_core::renderer::{
    ClearMask, OutVertex, Point2, PolyFlags, PrimitiveTopology, RenderError, Rgba8, SurfaceInfo,
    TextureFlags, TextureFormat, TextureInfo, TextureKey, TextureParameter, TextureWrap,
};

const TRIANGLE: [OutVertex; 3] = [
    OutVertex::new(0.0, 0.0, 1.0, 0.0, 0.0),
    OutVertex::new(1.0, 0.0, 1.0, 1.0, 0.0),
    OutVertex::new(0.0, 1.0, 1.0, 0.0, 1.0),
];

fn sized_context() -> RenderContext<RecordingApi> {
    let mut ctx = ready_context(RendererConfig::default());
    ctx.set_model_view(640, 400);
    ctx.api_mut().clear_calls();
    ctx
}

fn bind_fade_mask(ctx: &mut RenderContext<RecordingApi>) -> hwr_core::renderer::TextureId {
    let mask = [128u8; 16];
    let info = TextureInfo {
        key: TextureKey(0xFADE),
        width: 4,
        height: 4,
        format: TextureFormat::Alpha8,
        flags: TextureFlags::EMPTY,
        data: &mask,
    };
    ctx.set_texture(Some(&info)).unwrap();
    ctx.textures().get(TextureKey(0xFADE)).unwrap().id
}

#[test]
fn init_reports_the_backend() {
    init_logger();
    let mut ctx = RenderContext::new(RecordingApi::new(), RendererConfig::default());
    let info = ctx.init().unwrap();
    assert_eq!(info.name, "Recording");
    assert_eq!(ctx.info(), Some(&info));
    assert!(ctx.textures().placeholder().is_some());
    assert_eq!(ctx.shaders().current(), Some(ShaderSlot::Default));
}

#[test]
fn init_failure_is_propagated() {
    init_logger();
    let api = RecordingApi::failing_initialize();
    let mut ctx = RenderContext::new(api, RendererConfig::default());
    let err = ctx.init().unwrap_err();
    assert!(matches!(err, RenderError::InitializationFailed(_)));
    assert!(ctx.info().is_none());

    ctx.draw_polygon(None, &TRIANGLE, PolyFlags::EMPTY);
    assert!(ctx.api().calls.is_empty());
}

#[test]
fn draws_before_init_are_skipped() {
    init_logger();
    let mut ctx = RenderContext::new(RecordingApi::new(), RendererConfig::default());
    ctx.draw_polygon(None, &TRIANGLE, PolyFlags::EMPTY);
    ctx.draw_indexed(None, &TRIANGLE, PolyFlags::EMPTY, &[0, 1, 2]);
    ctx.draw_2d_line(Point2::new(0.0, 0.0), Point2::new(1.0, 1.0), Rgba8::WHITE);
    ctx.draw_intermission_bg();
    ctx.do_screen_wipe();
    assert!(ctx.api().calls.is_empty());
}

#[test]
fn model_view_size_change_drops_captures() {
    let mut ctx = sized_context();
    ctx.make_screen_texture().unwrap();
    let capture = ctx.screen_textures().get(ScreenTexture::Screen).unwrap();

    ctx.set_model_view(640, 400);
    assert!(!ctx.api().calls.contains(&Call::DeleteTexture(capture)));
    assert!(ctx.api().calls.contains(&Call::Viewport(0, 0, 640, 400)));

    ctx.set_model_view(800, 600);
    assert!(ctx.api().calls.contains(&Call::DeleteTexture(capture)));
    assert_eq!(ctx.screen_textures().get(ScreenTexture::Screen), None);
    assert_eq!(ctx.screen_size(), (800, 600));
}

#[test]
fn clip_rect_flips_to_bottom_up_viewport() {
    let mut ctx = sized_context();
    ctx.clip_rect(10, 20, 110, 220, 4.0);
    assert_eq!(ctx.api().calls.first(), Some(&Call::Viewport(10, 180, 100, 200)));
    assert_eq!(ctx.near_clip(), 4.0);
}

#[test]
fn polygon_wrap_overrides_are_restored() {
    let mut ctx = sized_context();
    ctx.draw_polygon(None, &TRIANGLE, PolyFlags::FORCE_WRAP_X);

    let calls = &ctx.api().calls;
    let draw = calls
        .iter()
        .position(|c| *c == Call::DrawArrays(PrimitiveTopology::TriangleFan, 0, 3))
        .unwrap();
    let forced = calls
        .iter()
        .position(|c| *c == Call::TexParameter(TextureParameter::WrapS(TextureWrap::Repeat)))
        .unwrap();
    let restored = calls
        .iter()
        .position(|c| *c == Call::TexParameter(TextureParameter::WrapS(TextureWrap::ClampToEdge)))
        .unwrap();
    assert!(forced < draw);
    assert!(draw < restored);
}

#[test]
fn modulated_draws_upload_surface_colors() {
    let mut ctx = sized_context();
    let surface = SurfaceInfo {
        poly_color: Rgba8::new(255, 0, 0, 51),
        ..SurfaceInfo::default()
    };

    ctx.draw_polygon(Some(&surface), &TRIANGLE, PolyFlags::TRANSLUCENT | PolyFlags::MODULATED);
    assert_eq!(ctx.api().vec4_uploads("PolyColor"), vec![[1.0, 0.0, 0.0, 0.2]]);

    ctx.api_mut().clear_calls();
    ctx.draw_polygon(Some(&surface), &TRIANGLE, PolyFlags::TRANSLUCENT);
    assert_eq!(ctx.api().vec4_uploads("PolyColor"), vec![[1.0; 4]]);
}

#[test]
fn indexed_draws_use_the_index_list() {
    let mut ctx = sized_context();
    ctx.draw_indexed(None, &TRIANGLE, PolyFlags::EMPTY, &[0, 1, 2, 2, 1, 0]);
    assert!(ctx
        .api()
        .calls
        .contains(&Call::DrawElements(PrimitiveTopology::TriangleList, 6)));
}

#[test]
fn lines_are_drawn_untextured_in_their_color() {
    let mut ctx = sized_context();
    bind_fade_mask(&mut ctx);
    let placeholder = ctx.textures().placeholder().unwrap();
    ctx.api_mut().clear_calls();

    ctx.draw_2d_line(
        Point2::new(-0.5, 0.0),
        Point2::new(0.5, 0.0),
        Rgba8::new(0, 255, 0, 255),
    );
    let calls = &ctx.api().calls;
    assert!(calls.contains(&Call::BindTexture(placeholder)));
    assert!(calls.contains(&Call::DrawArrays(PrimitiveTopology::TriangleFan, 0, 4)));
    assert_eq!(
        ctx.api().vec4_uploads("PolyColor"),
        vec![[0.0, 1.0, 0.0, 1.0]]
    );
}

#[test]
fn clear_masks_follow_the_request() {
    let mut ctx = sized_context();
    ctx.clear(true, true, Some([0.25, 0.5, 0.75, 1.0]));
    let calls = &ctx.api().calls;
    assert!(calls.contains(&Call::ClearColor([0.25, 0.5, 0.75, 1.0])));
    assert!(calls.contains(&Call::Clear(ClearMask::COLOR | ClearMask::DEPTH)));
}

#[test]
fn first_capture_allocates_then_later_ones_copy_in_place() {
    let mut ctx = sized_context();
    ctx.make_screen_texture().unwrap();
    assert_eq!(ctx.api().count(|c| matches!(c, Call::CreateTexture(_))), 1);
    assert!(ctx.api().calls.contains(&Call::CopyTexImage(1024)));
    let capture = ctx.screen_textures().get(ScreenTexture::Screen).unwrap();
    assert_eq!(ctx.textures().bound(), Some(capture));

    ctx.api_mut().clear_calls();
    ctx.make_screen_texture().unwrap();
    assert_eq!(ctx.api().count(|c| matches!(c, Call::CreateTexture(_))), 0);
    assert_eq!(
        ctx.api().calls,
        vec![Call::BindTexture(capture), Call::CopyTexSubImage(1024)]
    );
}

#[test]
fn intermission_background_draws_the_capture() {
    let mut ctx = sized_context();
    ctx.make_screen_texture().unwrap();
    bind_fade_mask(&mut ctx);
    let capture = ctx.screen_textures().get(ScreenTexture::Screen).unwrap();
    ctx.api_mut().clear_calls();

    ctx.draw_intermission_bg();
    assert!(ctx.api().calls.contains(&Call::BindTexture(capture)));
    assert_eq!(ctx.api().draws(), 1);
}

#[test]
fn wipe_samples_three_texture_units() {
    let mut ctx = sized_context();
    ctx.start_screen_wipe().unwrap();
    ctx.end_screen_wipe().unwrap();
    let start = ctx.screen_textures().get(ScreenTexture::StartWipe).unwrap();
    let end = ctx.screen_textures().get(ScreenTexture::EndWipe).unwrap();
    let mask = bind_fade_mask(&mut ctx);
    ctx.api_mut().clear_calls();

    ctx.do_screen_wipe();
    let calls = &ctx.api().calls;
    let first_unit = calls
        .iter()
        .position(|c| *c == Call::ActiveTexture(0))
        .unwrap();
    assert_eq!(
        calls[first_unit..first_unit + 6],
        [
            Call::ActiveTexture(0),
            Call::BindTexture(start),
            Call::ActiveTexture(1),
            Call::BindTexture(end),
            Call::ActiveTexture(2),
            Call::BindTexture(mask),
        ]
    );
    assert_eq!(ctx.api().draws(), 1);

    let samplers: Vec<(String, i32)> = calls
        .iter()
        .filter_map(|c| match c {
            Call::Uniform1i(loc, v) => Some((ctx.api().uniform_name(*loc)?.to_owned(), *v)),
            _ => None,
        })
        .collect();
    assert_eq!(
        samplers,
        vec![
            ("StartScreen".to_owned(), 0),
            ("EndScreen".to_owned(), 1),
            ("FadeMask".to_owned(), 2),
        ]
    );

    assert_eq!(ctx.shaders().current(), Some(ShaderSlot::Default));
    assert_eq!(ctx.textures().bound(), Some(start));
}

#[test]
fn tinted_wipe_uploads_its_direction() {
    let mut ctx = sized_context();
    ctx.start_screen_wipe().unwrap();
    ctx.end_screen_wipe().unwrap();
    bind_fade_mask(&mut ctx);
    ctx.api_mut().clear_calls();

    ctx.do_tinted_wipe(true, false);
    let api = ctx.api();
    let flag = |name: &str| {
        api.calls.iter().find_map(|c| match c {
            Call::Uniform1i(loc, v) if api.uniform_name(*loc) == Some(name) => Some(*v),
            _ => None,
        })
    };
    assert_eq!(flag("IsFadingIn"), Some(1));
    assert_eq!(flag("IsToWhite"), Some(0));
    assert_eq!(api.draws(), 1);
}

#[test]
fn final_present_letterboxes_into_the_window() {
    let mut ctx = sized_context();
    ctx.make_screen_final_texture().unwrap();
    ctx.api_mut().clear_calls();

    ctx.draw_final_texture(1280, 720);
    let calls = &ctx.api().calls;
    assert_eq!(calls.first(), Some(&Call::Viewport(0, 0, 1280, 720)));
    assert!(calls.contains(&Call::ClearColor([0.0, 0.0, 0.0, 1.0])));
    assert_eq!(ctx.api().draws(), 1);
}

#[test]
fn post_image_redraw_covers_the_grid() {
    let mut ctx = sized_context();
    ctx.make_screen_texture().unwrap();
    ctx.api_mut().clear_calls();

    let mut grid: WarpGrid = [[[0.0; 2]; SCREEN_VERTS]; SCREEN_VERTS];
    for (x, column) in grid.iter_mut().enumerate() {
        for (y, point) in column.iter_mut().enumerate() {
            *point = [x as f32 - 4.5, y as f32 - 4.5];
        }
    }
    ctx.post_image_redraw(&grid);

    let cells = (SCREEN_VERTS - 1) * (SCREEN_VERTS - 1);
    assert_eq!(ctx.api().draws(), 1 + cells);
    assert_eq!(
        ctx.api().vec4_uploads("PolyColor"),
        vec![[0.0, 0.0, 0.0, 1.0], [1.0; 4]]
    );
}

#[test]
fn special_states_toggle_switches() {
    let mut ctx = sized_context();
    assert!(!ctx.model_lighting());
    ctx.set_special_state(SpecialState::ModelLighting(true));
    assert!(ctx.model_lighting());

    ctx.set_special_state(SpecialState::Shaders(true));
    ctx.set_shader(ShaderSlot::Sprite);
    assert_eq!(ctx.shaders().current(), Some(ShaderSlot::Sprite));
}

#[test]
fn shutdown_releases_everything() {
    let mut ctx = sized_context();
    bind_fade_mask(&mut ctx);
    ctx.make_screen_texture().unwrap();
    ctx.render_sky_dome(TextureKey(1), 256, 128, &Default::default())
        .unwrap();

    ctx.shutdown();
    let api = ctx.api();
    assert!(api.live_textures.is_empty());
    assert!(api.buffers.is_empty());
    assert!(api.programs.is_empty());
}
