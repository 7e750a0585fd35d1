mod common;

use common::{init_logger, ready_context, Call, RecordingApi};
use hwr_backend::{RenderContext, RendererConfig, ShaderRegistry, ShaderSlot, TransformState};
use hwr_core::renderer::{OutVertex, PolyFlags, SceneTransform, SurfaceInfo};

const QUAD: [OutVertex; 4] = [
    OutVertex::new(-1.0, -1.0, 1.0, 0.0, 0.0),
    OutVertex::new(-1.0, 1.0, 1.0, 0.0, 1.0),
    OutVertex::new(1.0, 1.0, 1.0, 1.0, 1.0),
    OutVertex::new(1.0, -1.0, 1.0, 1.0, 0.0),
];

fn shaders_on() -> RendererConfig {
    RendererConfig {
        shaders_enabled: true,
        ..RendererConfig::default()
    }
}

fn draws_with(ctx: &mut RenderContext<RecordingApi>, slot: ShaderSlot) -> usize {
    ctx.set_shader(slot);
    ctx.api_mut().clear_calls();
    ctx.draw_polygon(None, &QUAD, PolyFlags::EMPTY);
    ctx.api().draws()
}

#[test]
fn every_builtin_program_links() {
    let ctx = ready_context(shaders_on());
    for slot in ShaderSlot::ALL {
        let program = ctx.shaders().program(slot).unwrap();
        assert!(program.program.is_some(), "{slot:?} did not link");
        assert!(!program.custom);
    }
    assert_eq!(ctx.shaders().current(), Some(ShaderSlot::Default));
}

#[test]
fn broken_custom_shader_only_disables_its_slot() {
    init_logger();
    let mut ctx = RenderContext::new(RecordingApi::failing_on("BROKEN"), shaders_on());
    ctx.init().unwrap();

    let k = ShaderSlot::Wall.index();
    ctx.load_custom_shader(k, "void main() { BROKEN }", true)
        .unwrap();
    let linked = ctx.init_custom_shaders();
    assert_eq!(linked, ShaderSlot::ALL.len() - 1);

    let broken = ctx.shaders().program(ShaderSlot::Wall).unwrap();
    assert!(broken.program.is_none());

    let before = ShaderSlot::from_index(k - 1).unwrap();
    let after = ShaderSlot::from_index(k + 1).unwrap();
    assert_eq!(draws_with(&mut ctx, before), 1);
    assert_eq!(draws_with(&mut ctx, ShaderSlot::Wall), 0);
    assert_eq!(draws_with(&mut ctx, after), 1);
}

#[test]
fn inert_slot_keeps_its_cached_transform() {
    init_logger();
    let mut ctx = RenderContext::new(RecordingApi::failing_on("BROKEN"), shaders_on());
    ctx.init().unwrap();
    ctx.load_custom_shader(ShaderSlot::Wall.index(), "void main() { BROKEN }", true)
        .unwrap();
    ctx.init_custom_shaders();
    ctx.set_shader(ShaderSlot::Wall);
    let cached = ctx.shaders().program(ShaderSlot::Wall).unwrap().clone();

    ctx.api_mut().clear_calls();
    ctx.set_transform(Some(&SceneTransform {
        x: 12.0,
        angle_y: 45.0,
        ..SceneTransform::default()
    }));

    let wall = ctx.shaders().program(ShaderSlot::Wall).unwrap();
    assert_eq!(wall.projection, cached.projection);
    assert_eq!(wall.view, cached.view);
    assert_eq!(ctx.api().count(|c| matches!(c, Call::UniformMatrix4(_))), 0);
}

#[test]
fn custom_source_marks_the_slot() {
    let mut ctx = ready_context(shaders_on());
    let source = "uniform vec4 PolyColor; void main() {}";
    ctx.load_custom_shader(ShaderSlot::Sprite.index(), source, true)
        .unwrap();
    assert_eq!(ctx.init_custom_shaders(), ShaderSlot::ALL.len());

    assert!(ctx.shaders().program(ShaderSlot::Sprite).unwrap().custom);
    assert!(!ctx.shaders().program(ShaderSlot::Floor).unwrap().custom);
}

#[test]
fn custom_shader_numbers_are_range_checked() {
    let mut ctx = ready_context(RendererConfig::default());
    assert!(ctx.load_custom_shader(0, "void main() {}", false).is_err());
    assert!(ctx.load_custom_shader(17, "void main() {}", false).is_err());
    assert!(ctx.load_custom_shader(16, "void main() {}", false).is_ok());
}

#[test]
fn unchanged_transform_is_not_reuploaded() {
    let mut ctx = ready_context(RendererConfig::default());
    let scene = SceneTransform {
        x: 64.0,
        y: -32.0,
        z: 48.0,
        angle_y: 90.0,
        ..SceneTransform::default()
    };

    ctx.set_transform(Some(&scene));
    assert!(ctx.api().count(|c| matches!(c, Call::UniformMatrix4(_))) > 0);

    ctx.api_mut().clear_calls();
    ctx.set_transform(Some(&scene));
    assert_eq!(ctx.api().count(|c| matches!(c, Call::UniformMatrix4(_))), 0);
}

#[test]
fn disabled_shaders_stay_on_the_base_program() {
    let mut ctx = ready_context(RendererConfig::default());
    ctx.set_shader(ShaderSlot::Wall);
    assert_eq!(ctx.shaders().current(), Some(ShaderSlot::Default));
    assert_eq!(ctx.api().count(|c| matches!(c, Call::UseProgram(_))), 0);
}

#[test]
fn switching_programs_syncs_the_transform() {
    let mut ctx = ready_context(shaders_on());
    ctx.set_transform(Some(&SceneTransform::default()));
    ctx.api_mut().clear_calls();

    ctx.set_shader(ShaderSlot::Floor);
    assert_eq!(ctx.api().count(|c| matches!(c, Call::UseProgram(Some(_)))), 1);
    assert_eq!(ctx.api().matrix_uploads("projection"), 1);
    assert_eq!(ctx.api().matrix_uploads("view"), 1);
    assert_eq!(ctx.api().matrix_uploads("model"), 1);

    ctx.api_mut().clear_calls();
    ctx.set_shader(ShaderSlot::Floor);
    assert!(ctx.api().calls.is_empty());

    // The base program already holds this transform.
    ctx.set_shader(ShaderSlot::Default);
    assert_eq!(ctx.api().count(|c| matches!(c, Call::UseProgram(_))), 1);
    assert_eq!(ctx.api().count(|c| matches!(c, Call::UniformMatrix4(_))), 0);
}

#[test]
fn unset_shader_resets_poly_color() {
    let mut ctx = ready_context(shaders_on());
    ctx.set_shader(ShaderSlot::Sprite);
    ctx.api_mut().clear_calls();

    ctx.unset_shader();
    assert_eq!(ctx.shaders().current(), Some(ShaderSlot::Default));
    assert_eq!(ctx.api().vec4_uploads("PolyColor"), vec![[1.0; 4]]);
}

#[test]
fn killed_shaders_make_draws_no_ops() {
    let mut ctx = ready_context(shaders_on());
    ctx.kill_shaders();
    assert!(ctx.api().programs.is_empty());
    assert_eq!(ctx.shaders().current(), None);

    ctx.api_mut().clear_calls();
    ctx.draw_polygon(None, &QUAD, PolyFlags::EMPTY);
    ctx.set_shader(ShaderSlot::Floor);
    ctx.draw_polygon(None, &QUAD, PolyFlags::EMPTY);
    assert_eq!(ctx.api().draws(), 0);

    assert_eq!(ctx.init_custom_shaders(), ShaderSlot::ALL.len());
    ctx.api_mut().clear_calls();
    ctx.draw_polygon(None, &QUAD, PolyFlags::EMPTY);
    assert_eq!(ctx.api().draws(), 1);
}

#[test]
fn relinking_releases_the_old_programs() {
    let mut ctx = ready_context(shaders_on());
    let before = ctx.api().programs.len();
    ctx.init_custom_shaders();
    assert_eq!(ctx.api().programs.len(), before);
    assert_eq!(ctx.api().count(|c| matches!(c, Call::DeleteProgram(_))), before);
}

#[test]
fn water_receives_level_time_in_seconds() {
    let mut ctx = ready_context(shaders_on());
    ctx.set_shader(ShaderSlot::Water);
    ctx.set_shader_info(70);
    ctx.api_mut().clear_calls();

    let surface = SurfaceInfo::default();
    ctx.draw_polygon(Some(&surface), &QUAD, PolyFlags::MODULATED);

    let api = ctx.api();
    let level_time: Vec<f32> = api
        .calls
        .iter()
        .filter_map(|c| match c {
            Call::Uniform1f(loc, v) if api.uniform_name(*loc) == Some("LevelTime") => Some(*v),
            _ => None,
        })
        .collect();
    assert_eq!(level_time, vec![2.0]);
    assert_eq!(api.vec4_uploads("TintColor"), vec![[0.0; 4]]);
}

#[test]
fn uploads_are_skipped_before_compile() {
    init_logger();
    let mut api = RecordingApi::new();
    let mut registry = ShaderRegistry::new(16, true);
    registry.upload_poly_color(&mut api, [1.0; 4]);
    assert_eq!(registry.sync_transform(&mut api, &TransformState::default()), 0);
    assert!(!registry.can_draw());
    assert!(api.calls.is_empty());
}
