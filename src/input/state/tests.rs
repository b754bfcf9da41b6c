use super::*;
use crate::config::{Config, SpawnMode};
use crate::engine::{
    Camera, JointSystem, Particle, ParticleId, ParticleSystem, PreviewBuffer, SandboxJoints,
    SandboxSystem, color::WHITE,
};
use crate::history::UndoKind;
use crate::input::{Key, ModifierFlags, MouseButton, PointerEvent, Tool};
use crate::util;
use glam::Vec2;
use std::time::{Duration, Instant};

fn create_test_input_state() -> InputState {
    InputState::sandbox(&Config::default()).unwrap()
}

fn at(base: Instant, ms: u64) -> Instant {
    base + Duration::from_millis(ms)
}

fn pointer(x: f32, y: f32, timestamp: Instant) -> PointerEvent {
    PointerEvent::new(Vec2::new(x, y), timestamp)
}

fn add_particle(state: &mut InputState, x: f32, y: f32, size: f32) -> ParticleId {
    state
        .system_mut()
        .unwrap()
        .add_particle(Particle::new(Vec2::new(x, y), size, 1.0, WHITE))
}

fn particle(state: &InputState, id: ParticleId) -> Particle {
    state.system().unwrap().particle(id).unwrap().clone()
}

fn live_count(state: &InputState) -> usize {
    state
        .system()
        .unwrap()
        .particles()
        .iter()
        .filter(|p| p.is_live())
        .count()
}

fn joint_count(state: &InputState) -> usize {
    state.joints().unwrap().joints().len()
}

fn preview(state: &InputState) -> &PreviewBuffer {
    state.renderer().unwrap()
}

fn click(state: &mut InputState, x: f32, y: f32, timestamp: Instant) {
    state.on_pointer_down(pointer(x, y, timestamp));
    state.on_pointer_up(pointer(x, y, timestamp));
}

#[test]
fn test_click_spawns_default_particle() {
    let mut state = create_test_input_state();
    let t0 = Instant::now();

    click(&mut state, 100.0, 100.0, t0);

    let particles = state.system().unwrap().particles();
    assert_eq!(particles.len(), 1);
    assert_eq!(particles[0].position, Vec2::new(100.0, 100.0));
    assert_eq!(particles[0].size, 10.0);
    assert_eq!(particles[0].mass, 1.0);
    assert_eq!(state.history().undo_len(), 1);
    assert_eq!(state.history().last().unwrap().kind, UndoKind::SpawnSingle);
    assert_eq!(state.sub_mode(), SubMode::Idle);
    assert!(preview(&state).is_clear());
}

#[test]
fn test_drag_sizes_particle_with_area_mass() {
    let mut state = create_test_input_state();
    let t0 = Instant::now();

    state.on_pointer_down(pointer(0.0, 0.0, t0));
    state.on_pointer_move(pointer(40.0, 0.0, at(t0, 16)));
    state.on_pointer_up(pointer(40.0, 0.0, at(t0, 32)));

    let p = &state.system().unwrap().particles()[0];
    assert_eq!(p.position, Vec2::ZERO);
    assert_eq!(p.size, 20.0);
    assert!((p.mass - 12.566_371).abs() < 1e-4);
}

#[test]
fn test_small_drag_below_threshold_uses_defaults() {
    let mut state = create_test_input_state();
    let t0 = Instant::now();

    state.on_pointer_down(pointer(0.0, 0.0, t0));
    state.on_pointer_move(pointer(3.0, 0.0, at(t0, 16)));
    state.on_pointer_up(pointer(3.0, 0.0, at(t0, 32)));

    let p = &state.system().unwrap().particles()[0];
    assert_eq!(p.size, 10.0);
    assert_eq!(p.mass, 1.0);
}

#[test]
fn test_drag_back_inside_threshold_restores_defaults() {
    let mut state = create_test_input_state();
    let t0 = Instant::now();

    state.on_pointer_down(pointer(0.0, 0.0, t0));
    state.on_pointer_move(pointer(40.0, 0.0, at(t0, 16)));
    assert_eq!(preview(&state).particle.unwrap().size, 20.0);
    state.on_pointer_move(pointer(1.0, 0.0, at(t0, 32)));
    assert_eq!(preview(&state).particle.unwrap().size, 10.0);
    state.on_pointer_up(pointer(1.0, 0.0, at(t0, 48)));

    let p = &state.system().unwrap().particles()[0];
    assert_eq!(p.size, 10.0);
    assert_eq!(p.mass, 1.0);
}

#[test]
fn test_drag_exactly_at_threshold_counts() {
    let mut state = create_test_input_state();
    let t0 = Instant::now();

    // Default threshold is 5 px; the drag clamps up to min_size
    state.on_pointer_down(pointer(0.0, 0.0, t0));
    state.on_pointer_move(pointer(5.0, 0.0, at(t0, 16)));
    state.on_pointer_up(pointer(5.0, 0.0, at(t0, 32)));

    let p = &state.system().unwrap().particles()[0];
    assert_eq!(p.size, 3.0);
    assert!((p.mass - util::area_mass(3.0)).abs() < 1e-6);
}

#[test]
fn test_drag_size_limit_scales_with_zoom() {
    let mut state = create_test_input_state();
    state.attach_renderer(PreviewBuffer::with_camera(Camera {
        offset: Vec2::ZERO,
        zoom: 2.0,
    }));
    let t0 = Instant::now();

    // 200 screen px at zoom 2 is 100 world units; radius 50 exceeds 50 / 2
    state.on_pointer_down(pointer(0.0, 0.0, t0));
    state.on_pointer_move(pointer(200.0, 0.0, at(t0, 16)));
    state.on_pointer_up(pointer(200.0, 0.0, at(t0, 32)));

    assert_eq!(state.system().unwrap().particles()[0].size, 25.0);
}

#[test]
fn test_preview_mass_matches_committed_mass() {
    let mut state = create_test_input_state();
    let t0 = Instant::now();

    state.on_pointer_down(pointer(0.0, 0.0, t0));
    state.on_pointer_move(pointer(30.0, 40.0, at(t0, 16)));
    let shown = preview(&state).particle.unwrap();
    assert!(!preview(&state).dashed);
    state.on_pointer_up(pointer(30.0, 40.0, at(t0, 32)));

    let committed = &state.system().unwrap().particles()[0];
    assert_eq!(shown.size, committed.size);
    assert_eq!(shown.mass, committed.mass);
    assert_eq!(committed.mass, util::area_mass(25.0));
}

#[test]
fn test_ctrl_at_press_aims_velocity_with_defaults() {
    let mut state = create_test_input_state();
    let t0 = Instant::now();

    state.on_pointer_down(pointer(0.0, 0.0, t0).with_modifiers(ModifierFlags::CTRL));
    assert_eq!(state.sub_mode(), SubMode::Velocity);
    assert_eq!(state.gesture().intent, DragIntent::Velocity);

    state.on_pointer_move(pointer(40.0, 0.0, at(t0, 16)).with_modifiers(ModifierFlags::CTRL));
    assert!(preview(&state).dashed);
    assert_eq!(preview(&state).velocity, Some(Vec2::new(40.0, 0.0)));

    state.on_pointer_up(pointer(40.0, 0.0, at(t0, 32)).with_modifiers(ModifierFlags::CTRL));

    let p = &state.system().unwrap().particles()[0];
    assert_eq!(p.position, Vec2::ZERO);
    assert_eq!(p.size, 10.0);
    assert_eq!(p.mass, 1.0);
    assert_eq!(p.velocity, Vec2::new(40.0, 0.0));
}

#[test]
fn test_ctrl_mid_drag_keeps_dragged_size() {
    let mut state = create_test_input_state();
    let t0 = Instant::now();

    state.on_pointer_down(pointer(0.0, 0.0, t0));
    state.on_pointer_move(pointer(40.0, 0.0, at(t0, 16)));
    state.on_pointer_move(pointer(40.0, 10.0, at(t0, 32)).with_modifiers(ModifierFlags::CTRL));
    assert_eq!(state.sub_mode(), SubMode::Velocity);
    let shown = preview(&state).particle.unwrap();
    assert_eq!(shown.size, 20.0);

    state.on_pointer_up(pointer(40.0, 10.0, at(t0, 48)));

    let p = &state.system().unwrap().particles()[0];
    assert_eq!(p.size, 20.0);
    assert_eq!(p.mass, util::area_mass(20.0));
    assert_eq!(p.mass, shown.mass);
    assert_eq!(p.velocity, Vec2::new(40.0, 10.0));
}

#[test]
fn test_releasing_ctrl_returns_to_sizing() {
    let mut state = create_test_input_state();
    let t0 = Instant::now();

    state.on_pointer_down(pointer(0.0, 0.0, t0));
    state.on_key_press(Key::Ctrl, at(t0, 5));
    assert_eq!(state.sub_mode(), SubMode::Velocity);
    state.on_key_release(Key::Ctrl, at(t0, 10));
    assert_eq!(state.sub_mode(), SubMode::Sizing);
    assert!(preview(&state).velocity.is_none());
}

#[test]
fn test_shift_stream_spawns_on_interval() {
    let mut state = create_test_input_state();
    let t0 = Instant::now();

    state.on_pointer_down(pointer(0.0, 0.0, t0).with_modifiers(ModifierFlags::SHIFT));
    assert_eq!(state.sub_mode(), SubMode::Streaming);
    assert_eq!(live_count(&state), 1);

    assert_eq!(state.advance(at(t0, 50)), 0);
    assert_eq!(state.advance(at(t0, 100)), 1);
    assert_eq!(state.advance(at(t0, 200)), 1);
    state.on_pointer_up(pointer(0.0, 0.0, at(t0, 250)));

    assert_eq!(live_count(&state), 3);
    assert_eq!(state.history().undo_len(), 1);
    let record = state.history().last().unwrap();
    assert_eq!(record.kind, UndoKind::SpawnBatch);
    assert_eq!(record.particles.len(), 3);

    // Timer is gone after release
    assert_eq!(state.advance(at(t0, 1000)), 0);
    assert!(state.next_stream_deadline().is_none());
    assert_eq!(live_count(&state), 3);
}

#[test]
fn test_shift_release_ends_stream_but_keeps_press() {
    let mut state = create_test_input_state();
    let t0 = Instant::now();

    state.on_pointer_down(pointer(0.0, 0.0, t0));
    state.on_pointer_move(pointer(30.0, 0.0, at(t0, 10)).with_modifiers(ModifierFlags::SHIFT));
    assert_eq!(state.sub_mode(), SubMode::Streaming);
    assert_eq!(state.advance(at(t0, 110)), 1);

    state.on_pointer_move(pointer(60.0, 0.0, at(t0, 150)));
    assert_eq!(state.sub_mode(), SubMode::Idle);
    assert!(state.gesture().pointer_down);
    assert_eq!(state.history().undo_len(), 1);
    assert_eq!(state.advance(at(t0, 500)), 0);

    state.on_pointer_up(pointer(60.0, 0.0, at(t0, 600)));
    assert_eq!(live_count(&state), 2);
    assert_eq!(state.history().undo_len(), 1);
}

#[test]
fn test_shift_while_sizing_freezes_preview_size() {
    let mut state = create_test_input_state();
    let t0 = Instant::now();

    state.on_pointer_down(pointer(0.0, 0.0, t0));
    state.on_pointer_move(pointer(40.0, 0.0, at(t0, 10)));
    state.on_key_press(Key::Shift, at(t0, 20));
    state.spawn.default_size = 99.0;
    state.advance(at(t0, 120));
    state.on_pointer_up(pointer(40.0, 0.0, at(t0, 130)));

    for p in state.system().unwrap().particles() {
        assert_eq!(p.size, 20.0);
        assert_eq!(p.mass, util::area_mass(20.0));
    }
}

#[test]
fn test_pointer_leave_stops_stream() {
    let mut state = create_test_input_state();
    let t0 = Instant::now();

    state.on_pointer_down(pointer(0.0, 0.0, t0).with_modifiers(ModifierFlags::SHIFT));
    state.advance(at(t0, 100));
    state.on_pointer_leave();

    assert_eq!(state.sub_mode(), SubMode::Idle);
    assert!(!state.gesture().pointer_down);
    assert_eq!(state.history().last().unwrap().particles.len(), 2);
    assert_eq!(state.advance(at(t0, 1000)), 0);
}

#[test]
fn test_stream_mode_follows_pointer_and_reads_config_live() {
    let mut state = create_test_input_state();
    state.spawn.mode = SpawnMode::Stream;
    let t0 = Instant::now();

    state.on_pointer_down(pointer(0.0, 0.0, t0));
    state.on_pointer_move(pointer(50.0, 0.0, at(t0, 50)));
    state.spawn.default_size = 4.0;
    state.advance(at(t0, 100));
    state.on_pointer_up(pointer(50.0, 0.0, at(t0, 120)));

    let particles = state.system().unwrap().particles();
    assert_eq!(particles.len(), 2);
    assert_eq!(particles[0].position, Vec2::ZERO);
    assert_eq!(particles[1].position, Vec2::new(50.0, 0.0));
    assert_eq!(particles[1].size, 4.0);
    assert_eq!(state.history().last().unwrap().kind, UndoKind::SpawnBatch);
}

#[test]
fn test_emitter_stays_at_press_point() {
    let mut state = create_test_input_state();
    state.set_tool(Tool::Emitter);
    let t0 = Instant::now();

    state.on_pointer_down(pointer(10.0, 10.0, t0));
    state.on_pointer_move(pointer(80.0, 80.0, at(t0, 50)));
    state.advance(at(t0, 300));
    state.on_pointer_up(pointer(80.0, 80.0, at(t0, 350)));

    let particles = state.system().unwrap().particles();
    assert_eq!(particles.len(), 4);
    assert!(
        particles
            .iter()
            .all(|p| p.position == Vec2::new(10.0, 10.0))
    );
}

#[test]
fn test_tool_switch_mid_stream_flushes_batch() {
    let mut state = create_test_input_state();
    let t0 = Instant::now();

    state.on_pointer_down(pointer(0.0, 0.0, t0).with_modifiers(ModifierFlags::SHIFT));
    state.advance(at(t0, 100));
    state.set_tool(Tool::Remove);

    assert_eq!(state.sub_mode(), SubMode::Idle);
    assert_eq!(state.history().last().unwrap().particles.len(), 2);
    assert_eq!(state.advance(at(t0, 1000)), 0);
}

#[test]
fn test_draw_tool_lays_jointed_chain() {
    let mut state = create_test_input_state();
    state.set_tool(Tool::Draw);
    let t0 = Instant::now();
    let counter_before = state.system().unwrap().id_counter();

    state.on_pointer_down(pointer(0.0, 0.0, t0));
    state.on_pointer_move(pointer(10.0, 0.0, at(t0, 10)));
    assert_eq!(live_count(&state), 1);
    state.on_pointer_move(pointer(25.0, 0.0, at(t0, 20)));
    state.on_pointer_move(pointer(50.0, 0.0, at(t0, 30)));
    state.on_pointer_up(pointer(50.0, 0.0, at(t0, 40)));

    assert_eq!(live_count(&state), 3);
    assert_eq!(joint_count(&state), 2);
    let record = state.history().last().unwrap();
    assert_eq!(record.kind, UndoKind::DrawBatch);
    assert_eq!(record.particles.len(), 3);
    assert_eq!(record.joints.len(), 2);

    assert!(state.undo());
    assert_eq!(live_count(&state), 0);
    assert_eq!(joint_count(&state), 0);
    assert_eq!(state.system().unwrap().id_counter(), counter_before);
}

#[test]
fn test_shape_stamp_joins_every_pair() {
    let mut state = create_test_input_state();
    state.set_tool(Tool::Shape);
    let t0 = Instant::now();

    click(&mut state, 0.0, 0.0, t0);

    assert_eq!(live_count(&state), 4);
    assert_eq!(joint_count(&state), 6);
    for p in state.system().unwrap().particles() {
        assert!((p.position.length() - 50.0).abs() < 1e-3);
    }
    assert_eq!(state.history().last().unwrap().kind, UndoKind::ShapeSpawn);

    assert!(state.undo());
    assert_eq!(live_count(&state), 0);
    assert!(state.redo());
    assert_eq!(live_count(&state), 4);
    assert_eq!(joint_count(&state), 6);
}

#[test]
fn test_removal_brush_records_particles_and_joints() {
    let mut state = create_test_input_state();
    let a = add_particle(&mut state, 0.0, 0.0, 5.0);
    let b = add_particle(&mut state, 10.0, 0.0, 5.0);
    let c = add_particle(&mut state, 100.0, 0.0, 5.0);
    state.joints_mut().unwrap().create_joint(a, b, 10.0);
    state.joints_mut().unwrap().create_joint(b, c, 90.0);
    state.set_tool(Tool::Remove);
    let t0 = Instant::now();

    state.on_pointer_down(pointer(0.0, 0.0, t0));
    assert!(preview(&state).removal.is_some());
    state.on_pointer_move(pointer(2.0, 0.0, at(t0, 10)));
    state.on_pointer_up(pointer(2.0, 0.0, at(t0, 20)));

    assert_eq!(particle(&state, a).mass, 0.0);
    assert_eq!(particle(&state, b).size, 0.0);
    assert!(particle(&state, c).is_live());
    let record = state.history().last().unwrap();
    assert_eq!(record.kind, UndoKind::RemoveBatch);
    assert_eq!(record.particles.len(), 2);
    assert_eq!(record.joints.len(), 2);
    assert!(preview(&state).removal.is_none());

    // Engine compaction happens before undo
    let dead = state.system_mut().unwrap().compact();
    for id in dead {
        state.joints_mut().unwrap().remove_joints_for_particle(id);
    }
    assert_eq!(joint_count(&state), 0);

    assert!(state.undo());
    assert_eq!(particle(&state, a).mass, 1.0);
    assert_eq!(particle(&state, b).size, 5.0);
    assert_eq!(joint_count(&state), 2);
}

#[test]
fn test_removal_undo_before_compaction_survives_redo() {
    let mut state = create_test_input_state();
    let a = add_particle(&mut state, 0.0, 0.0, 5.0);
    let b = add_particle(&mut state, 30.0, 0.0, 5.0);
    state.joints_mut().unwrap().create_joint(a, b, 30.0);
    state.set_tool(Tool::Remove);

    click(&mut state, 0.0, 0.0, Instant::now());
    assert_eq!(particle(&state, a).mass, 0.0);
    assert!(particle(&state, b).is_live());

    // Marked particle is overwritten in place, its joint is not duplicated
    assert!(state.undo());
    assert_eq!(state.system().unwrap().particles().len(), 2);
    assert_eq!(particle(&state, a).mass, 1.0);
    assert_eq!(particle(&state, a).size, 5.0);
    assert_eq!(joint_count(&state), 1);

    assert!(state.redo());
    assert!(state.system().unwrap().particle(a).is_none());
    assert_eq!(joint_count(&state), 0);
    assert_eq!(live_count(&state), 1);

    assert!(state.undo());
    assert_eq!(state.system().unwrap().particles().len(), 2);
    assert!(particle(&state, a).is_live());
    assert_eq!(joint_count(&state), 1);
    assert!(state.joints().unwrap().has_joint(b, a));
}

#[test]
fn test_removal_with_no_hits_records_nothing() {
    let mut state = create_test_input_state();
    add_particle(&mut state, 500.0, 500.0, 5.0);
    state.set_tool(Tool::Remove);
    let t0 = Instant::now();

    state.on_pointer_down(pointer(0.0, 0.0, t0));
    state.on_pointer_up(pointer(0.0, 0.0, at(t0, 10)));

    assert!(!state.can_undo());
}

#[test]
fn test_single_removal_is_remove_single() {
    let mut state = create_test_input_state();
    add_particle(&mut state, 0.0, 0.0, 5.0);
    state.set_tool(Tool::Remove);

    click(&mut state, 0.0, 0.0, Instant::now());

    assert_eq!(state.history().last().unwrap().kind, UndoKind::RemoveSingle);
}

#[test]
fn test_joint_tool_rejects_duplicate_pair() {
    let mut state = create_test_input_state();
    let a = add_particle(&mut state, 0.0, 0.0, 5.0);
    let b = add_particle(&mut state, 100.0, 0.0, 5.0);
    state.set_tool(Tool::Joint);
    let t0 = Instant::now();

    click(&mut state, 0.0, 0.0, t0);
    assert_eq!(state.sub_mode(), SubMode::JointSelecting);
    assert_eq!(preview(&state).selected, Some(a));
    click(&mut state, 100.0, 0.0, at(t0, 100));
    assert_eq!(joint_count(&state), 1);
    assert_eq!(state.sub_mode(), SubMode::Idle);

    click(&mut state, 0.0, 0.0, at(t0, 200));
    click(&mut state, 100.0, 0.0, at(t0, 300));
    assert_eq!(joint_count(&state), 1);
    assert_eq!(state.sub_mode(), SubMode::Idle);
    assert_eq!(state.history().undo_len(), 1);
    assert!(state.joints().unwrap().has_joint(b, a));
}

#[test]
fn test_joint_tool_chains_with_shift() {
    let mut state = create_test_input_state();
    let a = add_particle(&mut state, 0.0, 0.0, 5.0);
    let b = add_particle(&mut state, 50.0, 0.0, 5.0);
    let c = add_particle(&mut state, 100.0, 0.0, 5.0);
    state.set_tool(Tool::Joint);
    let t0 = Instant::now();
    let shift = |x: f32, t| pointer(x, 0.0, t).with_modifiers(ModifierFlags::SHIFT);

    state.on_pointer_down(shift(0.0, t0));
    state.on_pointer_up(shift(0.0, t0));
    state.on_pointer_down(shift(50.0, at(t0, 10)));
    state.on_pointer_up(shift(50.0, at(t0, 10)));
    assert_eq!(preview(&state).selected, Some(b));
    state.on_pointer_down(shift(100.0, at(t0, 20)));
    state.on_pointer_up(shift(100.0, at(t0, 20)));

    let joints = state.joints().unwrap();
    assert!(joints.has_joint(a, b));
    assert!(joints.has_joint(b, c));
    assert_eq!(joints.joints()[0].rest_length, 50.0);
}

#[test]
fn test_joint_selection_survives_hover_and_clears_on_empty_click() {
    let mut state = create_test_input_state();
    let a = add_particle(&mut state, 0.0, 0.0, 5.0);
    state.set_tool(Tool::Joint);
    let t0 = Instant::now();

    click(&mut state, 0.0, 0.0, t0);
    state.on_pointer_move(pointer(40.0, 40.0, at(t0, 10)));
    let line = preview(&state).joint.unwrap();
    assert_eq!(line.particle, a);
    assert_eq!(line.target, Vec2::new(40.0, 40.0));

    click(&mut state, 300.0, 300.0, at(t0, 20));
    assert_eq!(state.sub_mode(), SubMode::Idle);
    assert_eq!(preview(&state).selected, None);
}

#[test]
fn test_stale_joint_selection_is_dropped() {
    let mut state = create_test_input_state();
    let a = add_particle(&mut state, 0.0, 0.0, 5.0);
    let b = add_particle(&mut state, 100.0, 0.0, 5.0);
    state.set_tool(Tool::Joint);
    let t0 = Instant::now();

    click(&mut state, 0.0, 0.0, t0);
    state.system_mut().unwrap().particle_mut(a).unwrap().mass = 0.0;
    click(&mut state, 100.0, 0.0, at(t0, 10));

    assert_eq!(joint_count(&state), 0);
    assert_eq!(preview(&state).selected, Some(b));
}

#[test]
fn test_hover_highlights_particle_for_picking_tools() {
    let mut state = create_test_input_state();
    let a = add_particle(&mut state, 0.0, 0.0, 5.0);
    state.set_tool(Tool::Grab);
    let t0 = Instant::now();

    state.on_pointer_move(pointer(3.0, 0.0, t0));
    assert_eq!(state.highlighted(), Some(a));
    assert_eq!(preview(&state).highlighted, Some(a));
    state.on_pointer_move(pointer(200.0, 0.0, at(t0, 10)));
    assert_eq!(state.highlighted(), None);
}

#[test]
fn test_escape_clears_joint_selection_before_anything_else() {
    let mut state = create_test_input_state();
    add_particle(&mut state, 0.0, 0.0, 5.0);
    state.set_tool(Tool::Joint);
    let t0 = Instant::now();

    click(&mut state, 0.0, 0.0, t0);
    state.on_key_press(Key::Escape, at(t0, 10));

    assert_eq!(state.sub_mode(), SubMode::Idle);
    assert_eq!(preview(&state).selected, None);
}

#[test]
fn test_escape_cancels_pending_spawn() {
    let mut state = create_test_input_state();
    let t0 = Instant::now();

    state.on_pointer_down(pointer(0.0, 0.0, t0));
    state.on_pointer_move(pointer(40.0, 0.0, at(t0, 10)));
    state.on_key_press(Key::Escape, at(t0, 20));
    assert!(preview(&state).is_clear());
    state.on_pointer_up(pointer(40.0, 0.0, at(t0, 30)));

    assert_eq!(live_count(&state), 0);
    assert!(!state.can_undo());
}

#[test]
fn test_right_click_cancels_like_escape() {
    let mut state = create_test_input_state();
    let t0 = Instant::now();

    state.on_pointer_down(pointer(0.0, 0.0, t0));
    state.on_pointer_down(pointer(0.0, 0.0, at(t0, 10)).with_button(MouseButton::Right));
    state.on_pointer_up(pointer(0.0, 0.0, at(t0, 20)));

    assert_eq!(live_count(&state), 0);
}

#[test]
fn test_grab_throws_with_pointer_velocity() {
    let mut state = create_test_input_state();
    let a = add_particle(&mut state, 0.0, 0.0, 10.0);
    state.set_tool(Tool::Grab);
    let t0 = Instant::now();

    state.on_pointer_down(pointer(2.0, 0.0, t0));
    assert!(particle(&state, a).grabbed);
    state.on_pointer_move(pointer(12.0, 0.0, at(t0, 100)));
    assert_eq!(particle(&state, a).position, Vec2::new(10.0, 0.0));
    state.on_pointer_up(pointer(13.0, 0.0, at(t0, 110)));

    let p = particle(&state, a);
    assert!(!p.grabbed);
    assert_eq!(p.position, Vec2::new(11.0, 0.0));
    assert!((p.velocity.x - 100.0).abs() < 1e-2);
    assert_eq!(p.velocity.y, 0.0);
    assert!(!state.can_undo());
}

#[test]
fn test_grab_held_still_before_release_is_not_thrown() {
    let mut state = create_test_input_state();
    let a = add_particle(&mut state, 0.0, 0.0, 10.0);
    state.set_tool(Tool::Grab);
    let t0 = Instant::now();

    state.on_pointer_down(pointer(0.0, 0.0, t0));
    state.on_pointer_move(pointer(10.0, 0.0, at(t0, 10)));
    state.on_pointer_up(pointer(10.0, 0.0, at(t0, 5000)));

    let p = particle(&state, a);
    assert_eq!(p.position, Vec2::new(10.0, 0.0));
    assert_eq!(p.velocity, Vec2::ZERO);
}

#[test]
fn test_grab_release_moves_particle_to_release_point() {
    let mut state = create_test_input_state();
    let a = add_particle(&mut state, 0.0, 0.0, 10.0);
    state.set_tool(Tool::Grab);
    let t0 = Instant::now();

    state.on_pointer_down(pointer(0.0, 0.0, t0));
    state.on_pointer_up(pointer(0.0, 20.0, at(t0, 100)));

    let p = particle(&state, a);
    assert_eq!(p.position, Vec2::new(0.0, 20.0));
    assert!((p.velocity.y - 200.0).abs() < 1e-2);
}

#[test]
fn test_grab_of_removed_particle_is_dropped() {
    let mut state = create_test_input_state();
    let a = add_particle(&mut state, 0.0, 0.0, 10.0);
    state.set_tool(Tool::Grab);
    let t0 = Instant::now();

    state.on_pointer_down(pointer(0.0, 0.0, t0));
    assert_eq!(state.sub_mode(), SubMode::Grabbing);
    state.system_mut().unwrap().remove_particle(a);
    state.on_pointer_move(pointer(20.0, 0.0, at(t0, 10)));
    assert_eq!(state.sub_mode(), SubMode::Idle);
    state.on_pointer_up(pointer(20.0, 0.0, at(t0, 20)));

    assert!(state.system().unwrap().particles().is_empty());
    assert!(!state.can_undo());
}

#[test]
fn test_grab_of_marked_particle_releases_it_unthrown() {
    let mut state = create_test_input_state();
    let a = add_particle(&mut state, 0.0, 0.0, 10.0);
    state.set_tool(Tool::Grab);
    let t0 = Instant::now();

    state.on_pointer_down(pointer(0.0, 0.0, t0));
    state.system_mut().unwrap().particle_mut(a).unwrap().mass = 0.0;
    state.on_pointer_move(pointer(20.0, 0.0, at(t0, 10)));
    state.on_pointer_up(pointer(30.0, 0.0, at(t0, 20)));

    let p = particle(&state, a);
    assert_eq!(state.sub_mode(), SubMode::Idle);
    assert!(!p.grabbed);
    assert_eq!(p.position, Vec2::ZERO);
    assert_eq!(p.velocity, Vec2::ZERO);
}

#[test]
fn test_pinned_particle_is_not_thrown() {
    let mut state = create_test_input_state();
    let a = add_particle(&mut state, 0.0, 0.0, 10.0);
    state.system_mut().unwrap().particle_mut(a).unwrap().pinned = true;
    state.set_tool(Tool::Grab);
    let t0 = Instant::now();

    state.on_pointer_down(pointer(0.0, 0.0, t0));
    state.on_pointer_move(pointer(30.0, 0.0, at(t0, 50)));
    state.on_pointer_up(pointer(30.0, 0.0, at(t0, 60)));

    let p = particle(&state, a);
    assert_eq!(p.position, Vec2::new(30.0, 0.0));
    assert_eq!(p.velocity, Vec2::ZERO);
}

#[test]
fn test_pin_toggle_round_trips_through_history() {
    let mut state = create_test_input_state();
    let a = add_particle(&mut state, 0.0, 0.0, 10.0);
    state.set_tool(Tool::Pin);

    click(&mut state, 0.0, 0.0, Instant::now());
    assert!(particle(&state, a).pinned);
    assert_eq!(state.history().last().unwrap().kind, UndoKind::PinToggle);

    assert!(state.undo());
    assert!(!particle(&state, a).pinned);
    assert!(state.redo());
    assert!(particle(&state, a).pinned);
}

#[test]
fn test_undo_on_empty_history() {
    let mut state = create_test_input_state();
    assert!(!state.can_undo());
    assert!(!state.undo());
    assert!(!state.can_undo());
    assert!(!state.can_redo());
    assert_eq!(live_count(&state), 0);
}

#[test]
fn test_undo_redo_restores_exact_state_and_counter() {
    let mut state = create_test_input_state();
    let t0 = Instant::now();

    click(&mut state, 0.0, 0.0, t0);
    state.on_pointer_down(pointer(50.0, 0.0, at(t0, 10)).with_modifiers(ModifierFlags::SHIFT));
    state.advance(at(t0, 110));
    state.on_pointer_up(pointer(50.0, 0.0, at(t0, 120)));

    let after: Vec<Particle> = state.system().unwrap().particles().to_vec();
    let counter_after = state.system().unwrap().id_counter();

    assert!(state.undo());
    assert_eq!(live_count(&state), 1);
    assert_eq!(state.system().unwrap().id_counter(), 2);
    assert!(state.redo());

    let mut restored: Vec<Particle> = state.system().unwrap().particles().to_vec();
    restored.sort_by_key(|p| p.id);
    assert_eq!(restored, after);
    assert_eq!(state.system().unwrap().id_counter(), counter_after);
}

#[test]
fn test_new_record_clears_redo() {
    let mut state = create_test_input_state();
    let t0 = Instant::now();

    click(&mut state, 0.0, 0.0, t0);
    assert!(state.undo());
    assert!(state.can_redo());
    click(&mut state, 10.0, 0.0, at(t0, 10));
    assert!(!state.can_redo());
}

#[test]
fn test_clear_system_is_undoable() {
    let mut state = create_test_input_state();
    let a = add_particle(&mut state, 0.0, 0.0, 5.0);
    let b = add_particle(&mut state, 20.0, 0.0, 5.0);
    state.joints_mut().unwrap().create_joint(a, b, 20.0);

    state.clear_system();
    assert_eq!(live_count(&state), 0);
    assert_eq!(joint_count(&state), 0);
    assert_eq!(state.history().last().unwrap().kind, UndoKind::SystemClear);

    assert!(state.undo());
    assert_eq!(live_count(&state), 2);
    assert_eq!(joint_count(&state), 1);
    assert!(state.redo());
    assert_eq!(live_count(&state), 0);
}

#[test]
fn test_remove_selected_joints() {
    let mut state = create_test_input_state();
    let a = add_particle(&mut state, 0.0, 0.0, 5.0);
    let b = add_particle(&mut state, 50.0, 0.0, 5.0);
    let c = add_particle(&mut state, 0.0, 50.0, 5.0);
    state.joints_mut().unwrap().create_joint(a, b, 50.0);
    state.joints_mut().unwrap().create_joint(a, c, 50.0);
    state.set_tool(Tool::Joint);

    click(&mut state, 0.0, 0.0, Instant::now());
    state.handle_action(crate::config::Action::RemoveSelectedJoints);

    assert_eq!(joint_count(&state), 0);
    assert_eq!(state.history().last().unwrap().kind, UndoKind::JointRemove);
    assert!(state.undo());
    assert_eq!(joint_count(&state), 2);
}

#[test]
fn test_undo_mid_drag_discards_pending_spawn() {
    let mut state = create_test_input_state();
    let t0 = Instant::now();

    click(&mut state, 0.0, 0.0, t0);
    state.on_pointer_down(pointer(100.0, 0.0, at(t0, 10)));
    state.on_pointer_move(pointer(140.0, 0.0, at(t0, 20)));
    state.on_key_press(Key::Ctrl, at(t0, 30));
    state.on_key_press(Key::Char('z'), at(t0, 40));

    assert_eq!(state.sub_mode(), SubMode::Idle);
    assert!(state.system().unwrap().particles().is_empty());
    assert!(preview(&state).is_clear());
    assert!(!state.can_undo());
    assert_eq!(state.history().redo_len(), 1);

    // The rest of the press is inert
    state.on_key_release(Key::Ctrl, at(t0, 50));
    state.on_pointer_up(pointer(140.0, 0.0, at(t0, 60)));
    assert!(state.system().unwrap().particles().is_empty());
}

#[test]
fn test_keybindings_drive_history_and_tools() {
    let mut state = create_test_input_state();
    let t0 = Instant::now();

    click(&mut state, 0.0, 0.0, t0);
    state.on_key_press(Key::Ctrl, at(t0, 10));
    state.on_key_press(Key::Char('z'), at(t0, 20));
    state.on_key_release(Key::Ctrl, at(t0, 30));
    assert_eq!(live_count(&state), 0);

    state.on_key_press(Key::Char('j'), at(t0, 40));
    assert_eq!(state.tool(), Tool::Joint);
    state.on_key_press(Key::Char('m'), at(t0, 50));
    assert_eq!(state.spawn.mode, SpawnMode::Stream);
}

#[test]
fn test_handlers_are_no_ops_without_collaborators() {
    let config = Config::default();
    let mut state: InputState = InputState::from_config(&config).unwrap();
    let t0 = Instant::now();

    state.on_pointer_down(pointer(0.0, 0.0, t0));
    state.on_pointer_move(pointer(10.0, 0.0, at(t0, 10)));
    state.on_pointer_up(pointer(10.0, 0.0, at(t0, 20)));
    assert_eq!(state.advance(at(t0, 500)), 0);
    assert!(!state.undo());
    assert!(!state.gesture().pointer_down);

    state.attach(SandboxSystem::new(), SandboxJoints::new(), PreviewBuffer::new());
    click(&mut state, 0.0, 0.0, at(t0, 600));
    assert_eq!(live_count(&state), 1);
}

#[test]
fn test_pointer_up_without_down_is_ignored() {
    let mut state = create_test_input_state();
    state.on_pointer_up(pointer(0.0, 0.0, Instant::now()));
    assert_eq!(live_count(&state), 0);
    assert!(!state.can_undo());
}

#[test]
fn test_palette_colors_cycle_per_spawn() {
    let mut state = create_test_input_state();
    state.spawn.color_mode = crate::config::ColorMode::Palette;
    let t0 = Instant::now();

    for i in 0..3 {
        click(&mut state, i as f32 * 30.0, 0.0, at(t0, i * 10));
    }

    let particles = state.system().unwrap().particles();
    assert_eq!(particles[0].color, state.spawn.color_at(0));
    assert_eq!(particles[1].color, state.spawn.color_at(1));
    assert_ne!(particles[0].color, particles[1].color);
}
